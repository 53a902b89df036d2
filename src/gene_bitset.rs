//! GeneBitSet - packed membership vector over gene ids (MIDs).
//!
//! A `GeneBitSet` records which genes out of a fixed universe `[0, capacity]`
//! belong to a subset. Storage is a `bitvec` vector of 64-bit words, so the
//! Boolean set operators in [`crate::set_algebra`] run one word at a time.
//!
//! # Design
//!
//! - Uses `BitVec<u64, Lsb0>` of length `capacity + 1`, giving
//!   `capacity / 64 + 1` storage words
//! - Caches the member `count` and the highest member id; every mutator keeps
//!   both consistent with the words, bulk word writers call
//!   [`GeneBitSet::recompute_count_and_highest`]
//! - Carries a stateful enumeration cursor (`reset` / `next_id`) in addition
//!   to the borrowing [`Members`] iterator
//!
//! # Examples
//!
//! ```
//! use genebits::GeneBitSet;
//!
//! let mut bs = GeneBitSet::new("filtered", 127);
//! assert_eq!(bs.add_item(5).unwrap(), true);
//! assert_eq!(bs.add_item(70).unwrap(), true);
//! assert_eq!(bs.add_item(5).unwrap(), false);
//! assert_eq!(bs.count(), 2);
//! assert_eq!(bs.highest(), Some(70));
//! assert_eq!(bs.to_vec(), vec![5, 70]);
//! ```

use crate::error::{GeneBitsError, Result};
use bitvec::prelude::*;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::ops::{BitAnd, BitOr, Sub};
use std::rc::Rc;

/// Word type for bit storage (64-bit unsigned integer)
pub type Word = u64;

/// Number of bits per word
pub const BITS_PER_WORD: usize = 64;

/// A bit set shared between a registry slot and the gene lists that view it.
pub type SharedBitSet = Rc<RefCell<GeneBitSet>>;

/// Get word index from bit position
#[inline(always)]
const fn get_word_idx(bit_pos: usize) -> usize {
    bit_pos >> 6 // bit_pos / 64
}

/// Get bit index within word from bit position
#[inline(always)]
const fn get_bit_idx(bit_pos: usize) -> usize {
    bit_pos & 63 // bit_pos % 64
}

/// Fixed-capacity set of gene ids with cached count and highest member.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "StoredBitSet")]
pub struct GeneBitSet {
    /// User-visible name
    name: String,

    /// Membership bits, one per id in `[0, capacity]`
    bv: BitVec<Word, Lsb0>,

    /// Number of members
    count: usize,

    /// Largest member id, `None` when empty
    highest: Option<usize>,

    /// Enumeration position for `next_id`
    #[serde(skip)]
    cursor: usize,
}

/// Serialized form accepted on input. Cached counters in the input are
/// ignored and rebuilt from the bits.
#[derive(Deserialize)]
struct StoredBitSet {
    name: String,
    bv: BitVec<Word, Lsb0>,
}

impl TryFrom<StoredBitSet> for GeneBitSet {
    type Error = GeneBitsError;

    fn try_from(stored: StoredBitSet) -> Result<Self> {
        if stored.bv.is_empty() {
            return Err(GeneBitsError::InvalidParameter(
                "bit set storage must hold at least one bit".into(),
            ));
        }
        // fresh storage keeps bits past the end of `bv` clear
        let mut bv = BitVec::repeat(false, stored.bv.len());
        bv.copy_from_bitslice(&stored.bv);
        let mut bs = Self {
            name: stored.name,
            bv,
            count: 0,
            highest: None,
            cursor: 0,
        };
        bs.recompute_count_and_highest();
        Ok(bs)
    }
}

impl GeneBitSet {
    /// Create an empty set able to hold ids `0..=capacity`.
    ///
    /// # Examples
    ///
    /// ```
    /// use genebits::GeneBitSet;
    ///
    /// let bs = GeneBitSet::new("all", 128);
    /// assert_eq!(bs.capacity(), 128);
    /// assert_eq!(bs.num_words(), 3);
    /// assert!(bs.is_empty());
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is `usize::MAX`. Use [`GeneBitSet::try_new`] for
    /// capacities that come from outside the program.
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        assert!(capacity < usize::MAX, "GeneBitSet capacity must be below usize::MAX");
        Self {
            name: name.into(),
            bv: BitVec::repeat(false, capacity + 1),
            count: 0,
            highest: None,
            cursor: 0,
        }
    }

    /// Create an empty set, rejecting a capacity of `usize::MAX`.
    pub fn try_new(name: impl Into<String>, capacity: usize) -> Result<Self> {
        if capacity == usize::MAX {
            return Err(GeneBitsError::InvalidParameter(format!(
                "capacity {} leaves no room for id range 0..=capacity",
                capacity
            )));
        }
        Ok(Self::new(name, capacity))
    }

    /// Create a set holding `ids`.
    ///
    /// Duplicates are collapsed. Fails without building anything if an id
    /// exceeds `capacity`.
    pub fn from_ids(name: impl Into<String>, capacity: usize, ids: &[usize]) -> Result<Self> {
        if let Some(&id) = ids.iter().find(|&&id| id > capacity) {
            return Err(GeneBitsError::IdOutOfRange { id, capacity });
        }
        let mut bs = Self::try_new(name, capacity)?;
        for &id in ids {
            bs.add_item(id)?;
        }
        Ok(bs)
    }

    /// Wrap the set for sharing with a registry slot or gene list.
    pub fn into_shared(self) -> SharedBitSet {
        Rc::new(RefCell::new(self))
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Largest representable id.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.bv.len() - 1
    }

    /// Number of storage words.
    #[inline(always)]
    pub fn num_words(&self) -> usize {
        self.bv.as_raw_slice().len()
    }

    /// Number of members.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Largest member id, or `None` if the set is empty.
    #[inline]
    pub fn highest(&self) -> Option<usize> {
        self.highest
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    fn check_range(&self, id: usize) -> Result<()> {
        if id >= self.bv.len() {
            return Err(GeneBitsError::IdOutOfRange {
                id,
                capacity: self.capacity(),
            });
        }
        Ok(())
    }

    // =========================================================================
    // Item Operations
    // =========================================================================

    /// Set bit `id` without checking for a prior member.
    ///
    /// `count` is incremented unconditionally, so the caller must know `id`
    /// is not already present. Use [`GeneBitSet::add_item`] otherwise.
    #[inline]
    pub fn set_item(&mut self, id: usize) -> Result<()> {
        self.check_range(id)?;
        self.bv.set(id, true);
        self.count += 1;
        self.highest = Some(self.highest.map_or(id, |h| h.max(id)));
        Ok(())
    }

    /// Insert `id` if absent.
    ///
    /// Returns `Ok(false)` and leaves the set untouched when `id` is already
    /// a member.
    pub fn add_item(&mut self, id: usize) -> Result<bool> {
        self.check_range(id)?;
        if self.bv[id] {
            return Ok(false);
        }
        self.set_item(id)?;
        Ok(true)
    }

    /// Remove `id` if present.
    ///
    /// Removal rescans the whole vector since the highest member may shrink.
    pub fn remove_item(&mut self, id: usize) -> Result<bool> {
        self.check_range(id)?;
        if !self.bv[id] {
            return Ok(false);
        }
        self.bv.set(id, false);
        self.recompute_count_and_highest();
        Ok(true)
    }

    /// Membership test. Out-of-range ids are reported as absent.
    #[inline]
    pub fn is_member(&self, id: usize) -> bool {
        id < self.bv.len() && self.bv[id]
    }

    /// Remove all members.
    pub fn clear(&mut self) {
        self.bv.fill(false);
        self.count = 0;
        self.highest = None;
        self.cursor = 0;
    }

    /// Rebuild `count` and `highest` from the words.
    pub fn recompute_count_and_highest(&mut self) {
        let words = self.bv.as_raw_slice();
        self.count = words.iter().map(|w| w.count_ones() as usize).sum();
        self.highest = words
            .iter()
            .enumerate()
            .rev()
            .find(|(_, &w)| w != 0)
            .map(|(i, &w)| i * BITS_PER_WORD + (BITS_PER_WORD - 1 - w.leading_zeros() as usize));
    }

    // =========================================================================
    // Enumeration
    // =========================================================================

    /// Rewind the enumeration cursor to id 0.
    #[inline]
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Next member at or after the cursor, advancing past it.
    ///
    /// Returns `None` once the cursor has moved beyond the highest member.
    /// Only one cursor exists per set; two interleaved enumerations over the
    /// same set see each other's progress. Use [`GeneBitSet::iter`] when that
    /// matters.
    pub fn next_id(&mut self) -> Option<usize> {
        let highest = self.highest?;
        if self.cursor > highest {
            return None;
        }
        let found = self.find_next_set(self.cursor).filter(|&id| id <= highest);
        match found {
            Some(id) => self.cursor = id + 1,
            None => self.cursor = highest + 1,
        }
        found
    }

    /// First set bit at position `beg` or later.
    fn find_next_set(&self, beg: usize) -> Option<usize> {
        let words = self.bv.as_raw_slice();
        let mut word_idx = get_word_idx(beg);
        if word_idx >= words.len() {
            return None;
        }
        let mut word = words[word_idx] & (Word::MAX << get_bit_idx(beg));
        loop {
            if word != 0 {
                return Some(word_idx * BITS_PER_WORD + word.trailing_zeros() as usize);
            }
            word_idx += 1;
            if word_idx >= words.len() {
                return None;
            }
            word = words[word_idx];
        }
    }

    /// Iterate members in ascending order without touching the cursor.
    pub fn iter(&self) -> Members<'_> {
        let words = self.bv.as_raw_slice();
        Members {
            words,
            word_idx: 0,
            current: words.first().copied().unwrap_or(0),
        }
    }

    /// Members in ascending order.
    pub fn to_vec(&self) -> Vec<usize> {
        let mut ids = Vec::with_capacity(self.count);
        ids.extend(self.iter());
        ids
    }

    // =========================================================================
    // Word Access
    // =========================================================================

    /// Read-only access to the storage words.
    #[inline]
    pub fn words(&self) -> &[Word] {
        self.bv.as_raw_slice()
    }

    /// Mutable access to the storage words.
    ///
    /// Callers must keep bits above `capacity` clear and call
    /// `recompute_count_and_highest` afterwards.
    #[inline]
    pub(crate) fn words_mut(&mut self) -> &mut [Word] {
        self.bv.as_raw_mut_slice()
    }

    /// Overwrite this set's members, count and highest id with `src`'s.
    ///
    /// The name and capacity of `self` are kept. Fails without modifying
    /// anything if `src` has a member above `self.capacity()`.
    pub fn copy_contents_from(&mut self, src: &GeneBitSet) -> Result<()> {
        if let Some(h) = src.highest {
            if h > self.capacity() {
                return Err(GeneBitsError::IdOutOfRange {
                    id: h,
                    capacity: self.capacity(),
                });
            }
        }
        let src_words = src.words();
        let dst_words = self.words_mut();
        let n = dst_words.len().min(src_words.len());
        dst_words[..n].copy_from_slice(&src_words[..n]);
        dst_words[n..].fill(0);
        self.count = src.count;
        self.highest = src.highest;
        self.cursor = 0;
        Ok(())
    }

    /// Word-wise combination of `self` and `rhs` into a fresh, unnamed set.
    fn combine(&self, rhs: &GeneBitSet, f: impl Fn(Word, Word) -> Word) -> GeneBitSet {
        assert_eq!(
            self.capacity(),
            rhs.capacity(),
            "GeneBitSets must have same capacity"
        );
        let mut result = GeneBitSet::new(String::new(), self.capacity());
        for ((r, &a), &b) in result
            .words_mut()
            .iter_mut()
            .zip(self.words())
            .zip(rhs.words())
        {
            *r = f(a, b);
        }
        result.recompute_count_and_highest();
        result
    }
}

/// Ascending iterator over the members of a [`GeneBitSet`].
pub struct Members<'a> {
    words: &'a [Word],
    word_idx: usize,
    current: Word,
}

impl Iterator for Members<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        while self.current == 0 {
            self.word_idx += 1;
            if self.word_idx >= self.words.len() {
                return None;
            }
            self.current = self.words[self.word_idx];
        }
        let bit = self.current.trailing_zeros() as usize;
        // clear lowest set bit
        self.current &= self.current - 1;
        Some(self.word_idx * BITS_PER_WORD + bit)
    }
}

impl<'a> IntoIterator for &'a GeneBitSet {
    type Item = usize;
    type IntoIter = Members<'a>;

    fn into_iter(self) -> Members<'a> {
        self.iter()
    }
}

// =============================================================================
// Set Operators
// =============================================================================

impl BitOr for &GeneBitSet {
    type Output = GeneBitSet;

    /// Union. Panics if capacities differ; see `set_algebra::apply` for the
    /// checked form.
    fn bitor(self, rhs: Self) -> GeneBitSet {
        self.combine(rhs, |a, b| a | b)
    }
}

impl BitAnd for &GeneBitSet {
    type Output = GeneBitSet;

    /// Intersection. Panics if capacities differ.
    fn bitand(self, rhs: Self) -> GeneBitSet {
        self.combine(rhs, |a, b| a & b)
    }
}

impl Sub for &GeneBitSet {
    type Output = GeneBitSet;

    /// Asymmetric difference: members of `self` not in `rhs`.
    fn sub(self, rhs: Self) -> GeneBitSet {
        self.combine(rhs, |a, b| a & !b)
    }
}

impl PartialEq for GeneBitSet {
    /// Same capacity and same members. Names and cursors are ignored.
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.bv.len() == other.bv.len() && self.words() == other.words()
    }
}

impl Eq for GeneBitSet {}
