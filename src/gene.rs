//! Genes, the dense gene catalog, and ordered gene lists.
//!
//! These are the collaborators a [`GeneBitSet`] is converted to and from.
//! The catalog maps every MID in `[0, max_genes]` to a gene or to nothing;
//! a [`GeneList`] is an ordered sequence of genes paired with the bit set
//! that mirrors its membership.

use crate::error::{GeneBitsError, Result};
use crate::gene_bitset::{GeneBitSet, SharedBitSet};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// A gene addressed by its MID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gene {
    mid: usize,
    name: String,
}

impl Gene {
    pub fn new(mid: usize, name: impl Into<String>) -> Self {
        Self {
            mid,
            name: name.into(),
        }
    }

    /// Dense gene id.
    #[inline]
    pub fn mid(&self) -> usize {
        self.mid
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Dense table from MID to gene. Read-only for everything in this crate.
#[derive(Debug, Clone)]
pub struct GeneCatalog {
    genes: Vec<Option<Rc<Gene>>>,
}

impl GeneCatalog {
    /// Create an empty catalog for MIDs `0..=max_genes`.
    ///
    /// # Panics
    ///
    /// Panics if `max_genes` is `usize::MAX`.
    pub fn new(max_genes: usize) -> Self {
        assert!(max_genes < usize::MAX, "GeneCatalog max_genes must be below usize::MAX");
        Self {
            genes: vec![None; max_genes + 1],
        }
    }

    /// Build a catalog from genes, rejecting any MID above `max_genes`.
    pub fn from_genes(max_genes: usize, genes: impl IntoIterator<Item = Gene>) -> Result<Self> {
        if max_genes == usize::MAX {
            return Err(GeneBitsError::InvalidParameter(
                "max_genes must be below usize::MAX".into(),
            ));
        }
        let mut catalog = Self::new(max_genes);
        for gene in genes {
            catalog.insert(gene)?;
        }
        Ok(catalog)
    }

    /// Store `gene` at its MID, replacing any previous entry.
    pub fn insert(&mut self, gene: Gene) -> Result<Rc<Gene>> {
        let mid = gene.mid();
        let max_genes = self.max_genes();
        let slot = self
            .genes
            .get_mut(mid)
            .ok_or(GeneBitsError::IdOutOfRange {
                id: mid,
                capacity: max_genes,
            })?;
        let gene = Rc::new(gene);
        *slot = Some(Rc::clone(&gene));
        Ok(gene)
    }

    /// Gene at `mid`, if any.
    #[inline]
    pub fn get(&self, mid: usize) -> Option<&Rc<Gene>> {
        self.genes.get(mid).and_then(Option::as_ref)
    }

    /// Largest addressable MID.
    pub fn max_genes(&self) -> usize {
        self.genes.len() - 1
    }

    /// Number of MIDs with a gene.
    pub fn len(&self) -> usize {
        self.genes.iter().filter(|g| g.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.iter().all(Option::is_none)
    }
}

/// A gene list shared between a registry slot and its viewers.
pub type SharedGeneList = Rc<RefCell<GeneList>>;

/// Ordered list of genes with the bit set mirroring its membership.
///
/// The gene sequence and the bit set can drift apart when genes are pushed
/// by hand; [`crate::gene_list_bridge::copy_gene_list_to_bitset`] in
/// reconstruct mode rebuilds the bit set from the sequence.
#[derive(Debug, Clone)]
pub struct GeneList {
    name: String,
    pub(crate) genes: Vec<Rc<Gene>>,
    bitset: SharedBitSet,
}

impl GeneList {
    /// Empty list backed by a fresh bit set of the same name.
    pub fn new(name: impl Into<String>, max_genes: usize) -> Self {
        let name = name.into();
        let bitset = GeneBitSet::new(name.clone(), max_genes).into_shared();
        Self {
            name,
            genes: Vec::new(),
            bitset,
        }
    }

    /// Empty list viewing an existing shared bit set.
    pub fn with_bitset(name: impl Into<String>, bitset: SharedBitSet) -> Self {
        Self {
            name: name.into(),
            genes: Vec::new(),
            bitset,
        }
    }

    pub fn into_shared(self) -> SharedGeneList {
        Rc::new(RefCell::new(self))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn genes(&self) -> &[Rc<Gene>] {
        &self.genes
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn bitset(&self) -> &SharedBitSet {
        &self.bitset
    }

    /// Append a gene to the sequence only; the bit set is not touched.
    pub fn push(&mut self, gene: Rc<Gene>) {
        self.genes.push(gene);
    }

    /// Drop every gene from the sequence and the bit set.
    pub fn clear(&mut self) {
        self.genes.clear();
        self.bitset.borrow_mut().clear();
    }

    /// MIDs of the sequence, in list order.
    pub fn mids(&self) -> Vec<usize> {
        self.genes.iter().map(|g| g.mid()).collect()
    }
}
