//! Registry configuration.
//!
//! [`RegistryConfig`] fixes the size of the named-set table, the gene
//! universe every registry-created set spans, and the built-in sets that sit
//! in the first slots and cannot be removed. It loads from JSON with every
//! field optional.
//!
//! # Example
//!
//! ```
//! use genebits::RegistryConfig;
//!
//! let config = RegistryConfig::from_json(
//!     r#"{ "max_genes": 8000, "builtin_names": ["All genes", "Filtered genes"] }"#,
//! ).unwrap();
//! assert_eq!(config.max_user_sets, 300);
//! assert_eq!(config.builtin_names.len(), 2);
//! ```

use crate::error::{GeneBitsError, Result};
use serde::{Deserialize, Serialize};

/// Default number of registry slots.
pub const MAX_USER_BS: usize = 300;

/// Default largest MID for registry-created sets.
pub const DEFAULT_MAX_GENES: usize = 20_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Number of addressable slots, numbered from 1
    pub max_user_sets: usize,

    /// Largest MID held by sets the registry allocates itself
    pub max_genes: usize,

    /// Sets created in slots `1..=n` at startup; protected from removal
    pub builtin_names: Vec<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_user_sets: MAX_USER_BS,
            max_genes: DEFAULT_MAX_GENES,
            builtin_names: Vec::new(),
        }
    }
}

impl RegistryConfig {
    pub fn new(max_user_sets: usize, max_genes: usize) -> Self {
        Self {
            max_user_sets,
            max_genes,
            builtin_names: Vec::new(),
        }
    }

    pub fn with_builtins<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.builtin_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: RegistryConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check slot count and built-in names.
    pub fn validate(&self) -> Result<()> {
        if self.max_user_sets == 0 {
            return Err(GeneBitsError::InvalidParameter(
                "max_user_sets must be at least 1".into(),
            ));
        }
        if self.max_genes == usize::MAX {
            return Err(GeneBitsError::InvalidParameter(
                "max_genes must be below usize::MAX".into(),
            ));
        }
        if self.builtin_names.len() > self.max_user_sets {
            return Err(GeneBitsError::InvalidParameter(format!(
                "{} built-in sets exceed {} slots",
                self.builtin_names.len(),
                self.max_user_sets
            )));
        }
        for (i, name) in self.builtin_names.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(GeneBitsError::InvalidParameter(format!(
                    "built-in set {} has an empty name",
                    i + 1
                )));
            }
            if self.builtin_names[..i]
                .iter()
                .any(|other| other.to_lowercase() == name.to_lowercase())
            {
                return Err(GeneBitsError::InvalidParameter(format!(
                    "duplicate built-in set name '{}'",
                    name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let config = RegistryConfig::default();
        assert_eq!(config.max_user_sets, MAX_USER_BS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = RegistryConfig::new(10, 500).with_builtins(["All", "Filtered"]);
        let json = config.to_json().unwrap();
        assert_eq!(RegistryConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid() {
        assert!(RegistryConfig::new(0, 10).validate().is_err());
        assert!(RegistryConfig::new(1, usize::MAX).validate().is_err());
        assert!(RegistryConfig::new(1, 10)
            .with_builtins(["a", "b"])
            .validate()
            .is_err());
        assert!(RegistryConfig::new(5, 10)
            .with_builtins(["All", "all"])
            .validate()
            .is_err());
        assert!(matches!(
            RegistryConfig::from_json("{ not json"),
            Err(GeneBitsError::Config(_))
        ));
    }
}
