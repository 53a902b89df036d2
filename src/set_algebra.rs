//! Set algebra - word-parallel union, intersection and difference.
//!
//! Every operator has the shape `op(a, b, dest)`: compute `a op b` and store
//! it in `dest`. The result is first built in a scratch vector and then
//! copied into `dest`, so `dest` may be the same set as `a` or `b` when the
//! operands are [`SharedBitSet`]s (see [`SetAlgebra::apply_shared`]).
//!
//! The scratch vector belongs to a [`SetAlgebra`] value owned by the caller,
//! typically the registry. It is allocated on first use, sized to the first
//! operand seen, and reused afterwards. The free functions [`apply`],
//! [`union`], [`intersection`] and [`difference`] use a call-local context
//! instead.
//!
//! # Examples
//!
//! ```
//! use genebits::{set_algebra, GeneBitSet};
//!
//! let a = GeneBitSet::from_ids("a", 64, &[1, 2, 3]).unwrap();
//! let b = GeneBitSet::from_ids("b", 64, &[2, 3, 4]).unwrap();
//! let mut dest = GeneBitSet::new("dest", 64);
//!
//! set_algebra::difference(&a, &b, &mut dest).unwrap();
//! assert_eq!(dest.to_vec(), vec![1]);
//! ```

use crate::error::{GeneBitsError, Result};
use crate::gene_bitset::{GeneBitSet, SharedBitSet, Word, BITS_PER_WORD};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

/// Binary set operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetOp {
    /// Members of either operand
    Union,
    /// Members of both operands
    Intersection,
    /// Members of the first operand that are not in the second
    Difference,
}

impl SetOp {
    /// Parse an operator name as typed by a user.
    ///
    /// Accepts `union`/`or`, `intersection`/`and`, `difference`/`minus`,
    /// ignoring case.
    pub fn from_name(name: &str) -> Option<SetOp> {
        match name.trim().to_lowercase().as_str() {
            "union" | "or" => Some(SetOp::Union),
            "intersection" | "and" => Some(SetOp::Intersection),
            "difference" | "minus" => Some(SetOp::Difference),
            _ => None,
        }
    }

    /// Infix symbol used when displaying an expression.
    pub fn symbol(self) -> &'static str {
        match self {
            SetOp::Union => "|",
            SetOp::Intersection => "&",
            SetOp::Difference => "-",
        }
    }

    #[inline(always)]
    fn eval(self, a: Word, b: Word) -> Word {
        match self {
            SetOp::Union => a | b,
            SetOp::Intersection => a & b,
            SetOp::Difference => a & !b,
        }
    }
}

impl fmt::Display for SetOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SetOp::Union => "union",
            SetOp::Intersection => "intersection",
            SetOp::Difference => "difference",
        };
        f.write_str(s)
    }
}

/// Scratch context for binary set operations.
///
/// Not reentrant: each `apply*` call runs to completion before the next
/// begins, which `&mut self` enforces.
#[derive(Debug, Default)]
pub struct SetAlgebra {
    scratch: Option<GeneBitSet>,
}

impl SetAlgebra {
    pub fn new() -> Self {
        Self { scratch: None }
    }

    /// Capacity of the scratch vector, `None` before the first operation.
    pub fn scratch_capacity(&self) -> Option<usize> {
        self.scratch.as_ref().map(GeneBitSet::capacity)
    }

    /// Compute `a op b` into `dest`.
    ///
    /// Word count is taken from `a`; `b` must have at least as many words
    /// and `dest` must be able to hold every resulting member. On error
    /// `dest` is left unmodified.
    pub fn apply(
        &mut self,
        op: SetOp,
        a: &GeneBitSet,
        b: &GeneBitSet,
        dest: &mut GeneBitSet,
    ) -> Result<()> {
        let result = self.compute(op, a, b)?;
        dest.copy_contents_from(result)
    }

    /// Compute `dest = dest op other`.
    pub fn apply_assign(
        &mut self,
        op: SetOp,
        dest: &mut GeneBitSet,
        other: &GeneBitSet,
    ) -> Result<()> {
        let result = self.compute(op, dest, other)?;
        dest.copy_contents_from(result)
    }

    /// Compute `a op b` into `dest` where any of the three may be the same
    /// shared set.
    ///
    /// The operands are only borrowed while the scratch result is built, and
    /// released before `dest` is borrowed mutably.
    pub fn apply_shared(
        &mut self,
        op: SetOp,
        a: &SharedBitSet,
        b: &SharedBitSet,
        dest: &SharedBitSet,
    ) -> Result<()> {
        let result = {
            let a = a.borrow();
            let b = b.borrow();
            self.compute(op, &a, &b)?
        };
        dest.borrow_mut().copy_contents_from(result)
    }

    /// Build `a op b` in the scratch vector and return it.
    fn compute(&mut self, op: SetOp, a: &GeneBitSet, b: &GeneBitSet) -> Result<&GeneBitSet> {
        let num_words = a.num_words();
        if b.num_words() < num_words {
            return Err(GeneBitsError::CapacityMismatch {
                required: num_words,
                available: b.num_words(),
            });
        }

        let scratch = self.scratch_for(a);
        let out = scratch.words_mut();
        for ((w, &x), &y) in out.iter_mut().zip(a.words()).zip(b.words()) {
            *w = op.eval(x, y);
        }
        out[num_words..].fill(0);
        // bits of `b` beyond `a`'s capacity in the last shared word
        if let Some(last) = out.get_mut(num_words - 1) {
            let valid = a.capacity() % BITS_PER_WORD + 1;
            if valid < BITS_PER_WORD {
                *last &= ((1 as Word) << valid) - 1;
            }
        }
        scratch.recompute_count_and_highest();
        Ok(scratch)
    }

    /// Scratch vector able to hold `a`'s words, allocated on first use.
    fn scratch_for(&mut self, a: &GeneBitSet) -> &mut GeneBitSet {
        let fits = self
            .scratch
            .as_ref()
            .is_some_and(|s| s.num_words() >= a.num_words());
        if !fits {
            trace!(capacity = a.capacity(), "allocating set algebra scratch vector");
            self.scratch = Some(GeneBitSet::new("scratch", a.capacity()));
        }
        self.scratch.get_or_insert_with(|| GeneBitSet::new("scratch", a.capacity()))
    }
}

/// `dest = a op b` using a call-local scratch vector.
pub fn apply(op: SetOp, a: &GeneBitSet, b: &GeneBitSet, dest: &mut GeneBitSet) -> Result<()> {
    SetAlgebra::new().apply(op, a, b, dest)
}

/// `dest = a | b` using a call-local scratch vector.
pub fn union(a: &GeneBitSet, b: &GeneBitSet, dest: &mut GeneBitSet) -> Result<()> {
    SetAlgebra::new().apply(SetOp::Union, a, b, dest)
}

/// `dest = a & b` using a call-local scratch vector.
pub fn intersection(a: &GeneBitSet, b: &GeneBitSet, dest: &mut GeneBitSet) -> Result<()> {
    SetAlgebra::new().apply(SetOp::Intersection, a, b, dest)
}

/// `dest = a - b`: members of `a` absent from `b`.
///
/// This is not a symmetric difference; members of `b` missing from `a` never
/// appear in the result.
pub fn difference(a: &GeneBitSet, b: &GeneBitSet, dest: &mut GeneBitSet) -> Result<()> {
    SetAlgebra::new().apply(SetOp::Difference, a, b, dest)
}
