//! BitSetRegistry - the table of user-visible named gene sets.
//!
//! Slots are numbered from 1 up to `max_user_sets`; slot 0 never holds a set.
//! Callers address a slot either by its number or by name, where a name may
//! be given exactly (ignoring case) or as a prefix that matches exactly one
//! occupied slot.
//!
//! Each occupied slot holds a [`NamedSet`] record. Every mutation replaces
//! the whole record in one assignment, so a slot is never observed with a new
//! name but an old bit set or list.
//!
//! # Example
//!
//! ```
//! use genebits::{BitSetRegistry, GeneBitSet, GeneCatalog, RegistryConfig, SetOp};
//!
//! # fn main() -> genebits::Result<()> {
//! let mut registry = BitSetRegistry::new(RegistryConfig::new(10, 128))?;
//! let catalog = GeneCatalog::new(128);
//!
//! let up = GeneBitSet::from_ids("up", 128, &[1, 2, 3])?.into_shared();
//! let hits = GeneBitSet::from_ids("hits", 128, &[2, 3, 4])?.into_shared();
//! registry.create_or_reuse("up", &up)?;
//! registry.create_or_reuse("hits", &hits)?;
//!
//! let dest = registry.apply_binary_op("up", "hi", "both", SetOp::Intersection, &catalog)?;
//! assert_eq!(registry.entry(dest).unwrap().bitset().borrow().to_vec(), vec![2, 3]);
//! # Ok(())
//! # }
//! ```

use crate::config::RegistryConfig;
use crate::error::{GeneBitsError, Result};
use crate::gene::{GeneCatalog, GeneList, SharedGeneList};
use crate::gene_bitset::{GeneBitSet, SharedBitSet};
use crate::gene_list_bridge::copy_bitset_to_gene_list;
use crate::set_algebra::{SetAlgebra, SetOp};
use std::rc::Rc;
use tracing::{debug, warn};

/// 1-based registry slot number.
pub type SlotIndex = usize;

/// Case-insensitive name equality used for every registry lookup.
fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// One occupied registry slot.
#[derive(Debug, Clone)]
pub struct NamedSet {
    name: String,
    bitset: SharedBitSet,
    gene_list: Option<SharedGeneList>,
    assigned_from: Option<String>,
}

impl NamedSet {
    fn new(name: impl Into<String>, bitset: SharedBitSet) -> Self {
        Self {
            name: name.into(),
            bitset,
            gene_list: None,
            assigned_from: None,
        }
    }

    /// Registered name. May differ from the bit set's own name when the set
    /// is shared with a gene list.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bitset(&self) -> &SharedBitSet {
        &self.bitset
    }

    /// Gene list refreshed whenever this slot is the target of a set
    /// operation.
    pub fn gene_list(&self) -> Option<&SharedGeneList> {
        self.gene_list.as_ref()
    }

    /// Name of the gene list last assigned into this slot.
    pub fn assigned_from(&self) -> Option<&str> {
        self.assigned_from.as_deref()
    }
}

/// Fixed-size table of named bit sets.
///
/// Owns the [`SetAlgebra`] scratch context used by
/// [`BitSetRegistry::apply_binary_op`].
#[derive(Debug)]
pub struct BitSetRegistry {
    /// Slot 0 is never used
    slots: Vec<Option<NamedSet>>,

    /// Number of occupied slots
    active: usize,

    /// Slots `1..=num_builtin` are protected
    num_builtin: usize,

    /// Capacity of sets the registry allocates itself
    max_genes: usize,

    algebra: SetAlgebra,
}

impl BitSetRegistry {
    /// Create a registry and populate its built-in slots.
    pub fn new(config: RegistryConfig) -> Result<Self> {
        config.validate()?;
        let mut registry = Self {
            slots: vec![None; config.max_user_sets + 1],
            active: 0,
            num_builtin: 0,
            max_genes: config.max_genes,
            algebra: SetAlgebra::new(),
        };
        for name in &config.builtin_names {
            registry.create_empty(name)?;
        }
        registry.num_builtin = config.builtin_names.len();
        debug!(
            max_user_sets = config.max_user_sets,
            builtin = registry.num_builtin,
            "created bit set registry"
        );
        Ok(registry)
    }

    #[inline]
    pub fn max_user_sets(&self) -> usize {
        self.slots.len() - 1
    }

    /// Number of occupied slots.
    #[inline]
    pub fn active_count(&self) -> usize {
        self.active
    }

    #[inline]
    pub fn num_builtin(&self) -> usize {
        self.num_builtin
    }

    #[inline]
    pub fn max_genes(&self) -> usize {
        self.max_genes
    }

    pub fn is_full(&self) -> bool {
        self.active >= self.max_user_sets()
    }

    /// Occupied slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotIndex, &NamedSet)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(index, slot)| slot.as_ref().map(|entry| (index, entry)))
    }

    /// Names of occupied slots in index order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.iter().map(|(_, entry)| entry.name())
    }

    /// Record in slot `index`, if occupied.
    pub fn entry(&self, index: SlotIndex) -> Option<&NamedSet> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Resolve `query` to a slot index.
    ///
    /// A decimal number in `1..=active_count()` is returned as-is, whether or
    /// not that slot is occupied. Otherwise occupied slots are scanned for a
    /// case-insensitive exact name match, which wins immediately. Without
    /// `exact`, a prefix shared by exactly one slot also resolves; a prefix
    /// shared by several is [`GeneBitsError::AmbiguousName`].
    pub fn find_by_name_or_index(&self, query: &str, exact: bool) -> Result<SlotIndex> {
        if let Ok(index) = query.parse::<usize>() {
            if (1..=self.active).contains(&index) {
                return Ok(index);
            }
        }

        let wanted = query.to_lowercase();
        let mut prefix_hit = None;
        let mut prefix_matches = 0;
        for (index, entry) in self.iter() {
            let name = entry.name.to_lowercase();
            if name == wanted {
                return Ok(index);
            }
            if !exact && name.starts_with(&wanted) {
                prefix_matches += 1;
                prefix_hit.get_or_insert(index);
            }
        }

        match (prefix_matches, prefix_hit) {
            (1, Some(index)) => Ok(index),
            (0, _) => Err(GeneBitsError::NotFound(query.to_string())),
            (matches, _) => Err(GeneBitsError::AmbiguousName {
                query: query.to_string(),
                matches,
            }),
        }
    }

    /// Record for `query`, resolved by number, exact name or unique prefix.
    pub fn get(&self, query: &str) -> Result<&NamedSet> {
        let index = self.find_by_name_or_index(query, false)?;
        self.entry(index).ok_or(GeneBitsError::EmptySlot(index))
    }

    /// Shared bit set for `query`.
    pub fn bitset(&self, query: &str) -> Result<SharedBitSet> {
        Ok(Rc::clone(self.get(query)?.bitset()))
    }

    fn exact_slot(&self, name: &str) -> Option<usize> {
        self.iter()
            .find(|(_, entry)| same_name(&entry.name, name))
            .map(|(index, _)| index)
    }

    fn first_empty(&self) -> Option<usize> {
        self.slots
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, slot)| slot.is_none())
            .map(|(index, _)| index)
    }

    // =========================================================================
    // Slot Lifecycle
    // =========================================================================

    /// Register `candidate` under `name`.
    ///
    /// Returns the existing slot if one already holds `name`. Otherwise the
    /// first empty slot receives either `candidate` itself, when its own name
    /// is `name`, or a new bit set holding a copy of its members.
    pub fn create_or_reuse(&mut self, name: &str, candidate: &SharedBitSet) -> Result<SlotIndex> {
        self.insert_with(name, || {
            let source = candidate.borrow();
            if same_name(source.name(), name) {
                return Ok(Rc::clone(candidate));
            }
            let mut bitset = GeneBitSet::new(name, source.capacity());
            bitset.copy_contents_from(&source)?;
            Ok(bitset.into_shared())
        })
    }

    /// Register an empty set of the registry's gene capacity under `name`,
    /// or return the slot already holding `name`.
    pub fn create_empty(&mut self, name: &str) -> Result<SlotIndex> {
        let max_genes = self.max_genes;
        self.insert_with(name, || Ok(GeneBitSet::new(name, max_genes).into_shared()))
    }

    fn insert_with(
        &mut self,
        name: &str,
        make: impl FnOnce() -> Result<SharedBitSet>,
    ) -> Result<SlotIndex> {
        if name.trim().is_empty() {
            return Err(GeneBitsError::InvalidParameter(
                "bit set name must not be empty".into(),
            ));
        }
        if let Some(index) = self.exact_slot(name) {
            debug!(index, name, "reusing named bit set");
            return Ok(index);
        }

        let max = self.max_user_sets();
        let index = match self.first_empty() {
            Some(index) if self.active < max => index,
            _ => {
                warn!(name, max, "too many named bit sets, remove one first");
                return Err(GeneBitsError::RegistryFull { max });
            }
        };

        let bitset = make()?;
        self.slots[index] = Some(NamedSet::new(name, bitset));
        self.active += 1;
        debug!(index, name, active = self.active, "created named bit set");
        Ok(index)
    }

    /// Store `list`'s members in the slot named `name`, creating it if needed.
    ///
    /// If the list's bit set already carries the slot's name the slot adopts
    /// it by reference, otherwise the members are copied. The slot keeps its
    /// registered name either way and records `list` as its source.
    pub fn assign_gene_list(&mut self, name: &str, list: &GeneList) -> Result<SlotIndex> {
        let index = self.create_or_reuse(name, list.bitset())?;
        let entry = self.entry(index).ok_or(GeneBitsError::EmptySlot(index))?;

        let adopt = Rc::ptr_eq(&entry.bitset, list.bitset())
            || same_name(list.bitset().borrow().name(), &entry.name);
        let bitset = if adopt {
            Rc::clone(list.bitset())
        } else {
            entry
                .bitset
                .borrow_mut()
                .copy_contents_from(&list.bitset().borrow())?;
            Rc::clone(&entry.bitset)
        };

        let record = NamedSet {
            name: entry.name.clone(),
            bitset,
            gene_list: entry.gene_list.clone(),
            assigned_from: Some(list.name().to_string()),
        };
        debug!(index, name = record.name(), list = list.name(), adopt, "assigned gene list");
        self.slots[index] = Some(record);
        Ok(index)
    }

    /// Attach `list` to the slot for `query` so set operations targeting the
    /// slot refresh it.
    pub fn associate_gene_list(&mut self, query: &str, list: SharedGeneList) -> Result<SlotIndex> {
        let index = self.find_by_name_or_index(query, false)?;
        let entry = self.entry(index).ok_or(GeneBitsError::EmptySlot(index))?;
        let record = NamedSet {
            gene_list: Some(list),
            ..entry.clone()
        };
        self.slots[index] = Some(record);
        Ok(index)
    }

    /// Free the slot for `query`. Other slots keep their indices.
    pub fn remove(&mut self, query: &str) -> Result<()> {
        let index = self.find_by_name_or_index(query, true)?;
        self.check_unprotected(index)?;
        let removed = self
            .slots
            .get_mut(index)
            .and_then(Option::take)
            .ok_or(GeneBitsError::EmptySlot(index))?;
        self.active -= 1;
        debug!(index, name = removed.name(), active = self.active, "removed named bit set");
        Ok(())
    }

    /// Give the slot for `query` a new name.
    ///
    /// Fails for built-in slots and when another slot already holds
    /// `new_name`. The bit set's own name follows only if it matched the old
    /// slot name.
    pub fn rename(&mut self, query: &str, new_name: &str) -> Result<SlotIndex> {
        if new_name.trim().is_empty() {
            return Err(GeneBitsError::InvalidParameter(
                "bit set name must not be empty".into(),
            ));
        }
        let index = self.find_by_name_or_index(query, true)?;
        self.check_unprotected(index)?;
        let entry = self.entry(index).ok_or(GeneBitsError::EmptySlot(index))?;
        if self.exact_slot(new_name).is_some_and(|other| other != index) {
            return Err(GeneBitsError::InvalidParameter(format!(
                "bit set name '{}' already in use",
                new_name
            )));
        }

        {
            let mut bitset = entry.bitset.borrow_mut();
            if bitset.name() == entry.name {
                bitset.set_name(new_name);
            }
        }
        let record = NamedSet {
            name: new_name.to_string(),
            ..entry.clone()
        };
        debug!(index, from = entry.name(), to = new_name, "renamed named bit set");
        self.slots[index] = Some(record);
        Ok(index)
    }

    fn check_unprotected(&self, index: usize) -> Result<()> {
        if index <= self.num_builtin {
            let name = self
                .entry(index)
                .map(|entry| entry.name.clone())
                .unwrap_or_default();
            warn!(index, name = name.as_str(), "refusing to modify built-in bit set");
            return Err(GeneBitsError::ProtectedSlot { index, name });
        }
        Ok(())
    }

    // =========================================================================
    // Set Operations
    // =========================================================================

    /// Compute `a op b` into the set named `dest`, creating it if needed.
    ///
    /// Operands resolve by number, exact name or unique prefix; `dest` by
    /// number or exact name. Any operand may name the destination. A new
    /// destination takes the capacity of `a`. If the destination has an
    /// associated gene list it is rebuilt from the result using `catalog`.
    ///
    /// The result is built before anything is written, so on error no slot
    /// is created and neither the destination nor its gene list changes.
    pub fn apply_binary_op(
        &mut self,
        a: &str,
        b: &str,
        dest: &str,
        op: SetOp,
        catalog: &GeneCatalog,
    ) -> Result<SlotIndex> {
        let lhs = self.bitset(a)?;
        let rhs = self.bitset(b)?;
        let existing = match self.find_by_name_or_index(dest, true) {
            Ok(index) => self.entry(index).cloned().map(|entry| (index, entry)),
            Err(GeneBitsError::NotFound(_)) => None,
            Err(err) => return Err(err),
        };

        let capacity = match &existing {
            Some((_, target)) => target.bitset().borrow().capacity(),
            None => lhs.borrow().capacity(),
        };
        let mut result = GeneBitSet::new(dest, capacity);
        self.algebra
            .apply(op, &lhs.borrow(), &rhs.borrow(), &mut result)?;

        let dest_index = match existing {
            Some((index, target)) => {
                if let Some(list) = target.gene_list() {
                    let list = list.borrow();
                    if !Rc::ptr_eq(list.bitset(), target.bitset()) {
                        check_fits(&result, &list.bitset().borrow())?;
                    }
                }
                target.bitset().borrow_mut().copy_contents_from(&result)?;
                if let Some(list) = target.gene_list() {
                    copy_bitset_to_gene_list(&mut list.borrow_mut(), target.bitset(), catalog)?;
                }
                index
            }
            None => self.create_or_reuse(dest, &result.into_shared())?,
        };
        debug!(
            a,
            b,
            dest,
            op = %op,
            index = dest_index,
            "applied set operation"
        );
        Ok(dest_index)
    }
}

/// Fail unless every member of `result` fits in `target`.
fn check_fits(result: &GeneBitSet, target: &GeneBitSet) -> Result<()> {
    match result.highest() {
        Some(id) if id > target.capacity() => Err(GeneBitsError::IdOutOfRange {
            id,
            capacity: target.capacity(),
        }),
        _ => Ok(()),
    }
}
