//! Genebits - Gene Subset Algebra for Microarray Exploration
//!
//! Genebits represents subsets of genes as packed bit vectors indexed by a
//! dense gene id (the MID), combines them with word-parallel set operators,
//! converts them to and from ordered gene lists, and keeps a table of named,
//! user-visible sets that can be addressed by number or by name.
//!
//! # Architecture
//!
//! - **GeneBitSet**: fixed-capacity membership vector over 64-bit words with
//!   cached count and highest member, plus a resumable enumeration cursor
//! - **Set algebra**: union, intersection and asymmetric difference into a
//!   destination that may alias an operand
//! - **Gene list bridge**: bit set ⇄ ordered gene list via a dense
//!   [`GeneCatalog`]
//! - **BitSetRegistry**: 1-based table of named sets with exact or
//!   unique-prefix name resolution
//!
//! # Examples
//!
//! ## Basic GeneBitSet Usage
//!
//! ```
//! use genebits::GeneBitSet;
//!
//! let mut bs = GeneBitSet::new("up-regulated", 128);
//! bs.add_item(5).unwrap();
//! bs.add_item(70).unwrap();
//! assert!(!bs.add_item(5).unwrap());
//!
//! assert_eq!(bs.count(), 2);
//! assert_eq!(bs.highest(), Some(70));
//!
//! bs.reset();
//! assert_eq!(bs.next_id(), Some(5));
//! assert_eq!(bs.next_id(), Some(70));
//! assert_eq!(bs.next_id(), None);
//! ```
//!
//! ## Named Sets
//!
//! ```
//! use genebits::{BitSetRegistry, GeneCatalog, RegistryConfig, SetOp};
//!
//! # fn main() -> genebits::Result<()> {
//! let mut registry = BitSetRegistry::new(RegistryConfig::new(2, 128))?;
//! let catalog = GeneCatalog::new(128);
//!
//! registry.create_empty("alpha")?;
//! registry.bitset("alpha")?.borrow_mut().add_item(1)?;
//! registry.create_empty("beta")?;
//! assert!(registry.create_empty("gamma").is_err());
//!
//! registry.apply_binary_op("alpha", "beta", "beta", SetOp::Union, &catalog)?;
//! assert_eq!(registry.bitset("2")?.borrow().to_vec(), vec![1]);
//! # Ok(())
//! # }
//! ```
//!
//! # Logging
//!
//! The crate emits `tracing` events (registry changes at `debug`, rejected
//! requests at `warn`) and never installs a subscriber.

// Module declarations
pub mod config;
pub mod error;
pub mod gene;
pub mod gene_bitset;
pub mod gene_list_bridge;
pub mod registry;
pub mod set_algebra;

// Re-exports for convenient access
pub use config::{RegistryConfig, DEFAULT_MAX_GENES, MAX_USER_BS};
pub use error::{GeneBitsError, Result};
pub use gene::{Gene, GeneCatalog, GeneList, SharedGeneList};
pub use gene_bitset::{GeneBitSet, Members, SharedBitSet, Word, BITS_PER_WORD};
pub use gene_list_bridge::{CopyMode, ListFill};
pub use registry::{BitSetRegistry, NamedSet, SlotIndex};
pub use set_algebra::{SetAlgebra, SetOp};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = "Genebits";

/// Get version string
pub fn version() -> String {
    format!("{} v{}", NAME, VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let ver = version();
        assert!(ver.contains("Genebits"));
        assert!(ver.contains(VERSION));
    }

    #[test]
    fn test_re_exports() {
        let _bs = GeneBitSet::new("x", 32);
        let _result: Result<()> = Ok(());
        assert_eq!(BITS_PER_WORD, 64);
        assert_eq!(MAX_USER_BS, 300);
    }
}
