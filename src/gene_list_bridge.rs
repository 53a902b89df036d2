//! Conversion between gene bit sets and ordered gene lists.
//!
//! A bit set becomes a list by enumerating its members in ascending MID order
//! and looking each one up in the [`GeneCatalog`]. MIDs without a catalog
//! entry are skipped, so a list can come out shorter than the set; the
//! returned [`ListFill`] reports both numbers.
//!
//! # Examples
//!
//! ```
//! use genebits::{gene_list_bridge, Gene, GeneBitSet, GeneCatalog};
//!
//! let catalog = GeneCatalog::from_genes(10, vec![Gene::new(1, "A"), Gene::new(4, "B")]).unwrap();
//! let mut bs = GeneBitSet::from_ids("hits", 10, &[1, 3, 4]).unwrap();
//! let mut genes = Vec::new();
//!
//! let fill = gene_list_bridge::to_gene_list(&mut bs, &catalog, &mut genes);
//! assert_eq!(fill.requested, 3);
//! assert_eq!(fill.appended, 2);
//! assert_eq!(genes[1].name(), "B");
//! ```

use crate::error::{GeneBitsError, Result};
use crate::gene::{Gene, GeneCatalog, GeneList};
use crate::gene_bitset::{GeneBitSet, SharedBitSet};
use std::rc::Rc;
use tracing::debug;

/// Outcome of materializing a bit set as a gene list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListFill {
    /// Members in the bit set
    pub requested: usize,
    /// Genes actually appended
    pub appended: usize,
}

impl ListFill {
    /// Number of members skipped for lack of a catalog entry.
    pub fn missing(&self) -> usize {
        self.requested - self.appended
    }

    pub fn is_complete(&self) -> bool {
        self.requested == self.appended
    }
}

/// How [`copy_gene_list_to_bitset`] fills the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyMode {
    /// Copy the list's own bit set word for word
    RawWords,
    /// Clear the destination and add the MID of every gene in the list
    Reconstruct,
}

/// Replace `target` with the catalog genes for each member of `bitset`.
///
/// Drives the bit set's enumeration cursor, which is left exhausted.
pub fn to_gene_list(
    bitset: &mut GeneBitSet,
    catalog: &GeneCatalog,
    target: &mut Vec<Rc<Gene>>,
) -> ListFill {
    let requested = bitset.count();
    target.clear();
    target.reserve(requested);

    bitset.reset();
    while let Some(mid) = bitset.next_id() {
        if let Some(gene) = catalog.get(mid) {
            target.push(Rc::clone(gene));
        }
    }

    let fill = ListFill {
        requested,
        appended: target.len(),
    };
    if !fill.is_complete() {
        debug!(
            set = bitset.name(),
            missing = fill.missing(),
            "skipped members without catalog entry"
        );
    }
    fill
}

/// Rebuild `count` and `highest` from the words and refill `target` in the
/// same scan.
///
/// Returns the number of genes written to `target`.
pub fn recompute_with_list(
    bitset: &mut GeneBitSet,
    catalog: &GeneCatalog,
    target: &mut Vec<Rc<Gene>>,
) -> usize {
    bitset.recompute_count_and_highest();
    target.clear();
    target.extend(bitset.iter().filter_map(|mid| catalog.get(mid).cloned()));
    target.len()
}

/// Load `src` into `dst`'s bit set (unless it already is that set) and
/// materialize `dst`'s gene sequence from it.
pub fn copy_bitset_to_gene_list(
    dst: &mut GeneList,
    src: &SharedBitSet,
    catalog: &GeneCatalog,
) -> Result<ListFill> {
    if !Rc::ptr_eq(dst.bitset(), src) {
        dst.bitset().borrow_mut().copy_contents_from(&src.borrow())?;
    }
    let bitset = Rc::clone(dst.bitset());
    let mut bitset = bitset.borrow_mut();
    Ok(to_gene_list(&mut bitset, catalog, &mut dst.genes))
}

/// Fill `dst` from the gene list `src`.
///
/// In [`CopyMode::RawWords`] the list's bit set is copied directly, which is
/// only right when it matches the gene sequence. [`CopyMode::Reconstruct`]
/// rebuilds `dst` from the sequence itself; every MID is checked against
/// `dst`'s capacity before anything is cleared.
pub fn copy_gene_list_to_bitset(dst: &SharedBitSet, src: &GeneList, mode: CopyMode) -> Result<()> {
    match mode {
        CopyMode::RawWords => {
            if Rc::ptr_eq(dst, src.bitset()) {
                return Ok(());
            }
            dst.borrow_mut().copy_contents_from(&src.bitset().borrow())
        }
        CopyMode::Reconstruct => {
            let mut dst = dst.borrow_mut();
            let capacity = dst.capacity();
            if let Some(gene) = src.genes().iter().find(|g| g.mid() > capacity) {
                return Err(GeneBitsError::IdOutOfRange {
                    id: gene.mid(),
                    capacity,
                });
            }
            dst.clear();
            for gene in src.genes() {
                dst.add_item(gene.mid())?;
            }
            Ok(())
        }
    }
}

/// Raw copy of members, count and highest id from `src` into `dst`.
pub fn copy_bitset_to_bitset(dst: &mut GeneBitSet, src: &GeneBitSet) -> Result<()> {
    dst.copy_contents_from(src)
}
