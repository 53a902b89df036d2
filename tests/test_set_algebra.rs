//! Tests for union, intersection and asymmetric difference.

use genebits::set_algebra::{difference, intersection, union};
use genebits::{GeneBitSet, GeneBitsError, SetAlgebra, SetOp};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn set(name: &str, ids: &[usize]) -> GeneBitSet {
    GeneBitSet::from_ids(name, 255, ids).unwrap()
}

// =============================================================================
// Operators
// =============================================================================

#[test]
fn test_union_intersection_difference() {
    let a = set("a", &[1, 2, 3]);
    let b = set("b", &[2, 3, 4]);
    let mut dest = GeneBitSet::new("dest", 255);

    union(&a, &b, &mut dest).unwrap();
    assert_eq!(dest.to_vec(), vec![1, 2, 3, 4]);

    intersection(&a, &b, &mut dest).unwrap();
    assert_eq!(dest.to_vec(), vec![2, 3]);

    difference(&a, &b, &mut dest).unwrap();
    assert_eq!(dest.to_vec(), vec![1]);

    difference(&b, &a, &mut dest).unwrap();
    assert_eq!(dest.to_vec(), vec![4]);
}

#[test]
fn test_difference_with_self_is_empty() {
    let a = set("a", &[0, 100, 255]);
    let mut dest = set("dest", &[9]);
    difference(&a, &a, &mut dest).unwrap();
    assert!(dest.is_empty());
    assert_eq!(dest.highest(), None);
}

#[test]
fn test_result_keeps_destination_name() {
    let a = set("a", &[1]);
    let b = set("b", &[2]);
    let mut dest = GeneBitSet::new("dest", 255);
    union(&a, &b, &mut dest).unwrap();
    assert_eq!(dest.name(), "dest");
}

#[test]
fn test_shared_destination_aliases_operand() {
    let a = set("a", &[1, 2, 3]).into_shared();
    let b = set("b", &[2, 3, 4]).into_shared();
    let mut algebra = SetAlgebra::new();

    algebra
        .apply_shared(SetOp::Difference, &a, &b, &a)
        .unwrap();
    assert_eq!(a.borrow().to_vec(), vec![1]);

    algebra.apply_shared(SetOp::Union, &b, &b, &b).unwrap();
    assert_eq!(b.borrow().to_vec(), vec![2, 3, 4]);

    algebra
        .apply_shared(SetOp::Intersection, &a, &b, &b)
        .unwrap();
    assert!(b.borrow().is_empty());
}

#[test]
fn test_destination_too_small() {
    let a = set("a", &[200]);
    let b = set("b", &[1]);
    let mut dest = GeneBitSet::from_ids("small", 100, &[5]).unwrap();
    let err = union(&a, &b, &mut dest).unwrap_err();
    assert!(matches!(err, GeneBitsError::IdOutOfRange { id: 200, capacity: 100 }));
    assert_eq!(dest.to_vec(), vec![5]);
}

#[test]
fn test_apply_by_op() {
    let a = set("a", &[10, 20]);
    let b = set("b", &[20, 30]);
    let mut dest = GeneBitSet::new("dest", 255);
    let mut algebra = SetAlgebra::new();
    for (op, expected) in [
        (SetOp::Union, vec![10, 20, 30]),
        (SetOp::Intersection, vec![20]),
        (SetOp::Difference, vec![10]),
    ] {
        algebra.apply(op, &a, &b, &mut dest).unwrap();
        assert_eq!(dest.to_vec(), expected, "{}", op);
        assert_eq!(dest.count(), expected.len());
    }
}

// =============================================================================
// Property-Based Tests
// =============================================================================

fn ids() -> impl Strategy<Value = BTreeSet<usize>> {
    prop::collection::btree_set(0usize..256, 0..60)
}

fn build(ids: &BTreeSet<usize>) -> GeneBitSet {
    let ids: Vec<usize> = ids.iter().copied().collect();
    set("p", &ids)
}

proptest! {
    #[test]
    fn prop_union_matches_reference(x in ids(), y in ids()) {
        let (a, b) = (build(&x), build(&y));
        let mut ab = GeneBitSet::new("ab", 255);
        let mut ba = GeneBitSet::new("ba", 255);
        union(&a, &b, &mut ab).unwrap();
        union(&b, &a, &mut ba).unwrap();

        let expected: Vec<usize> = x.union(&y).copied().collect();
        prop_assert_eq!(ab.to_vec(), expected);
        prop_assert_eq!(&ab, &ba);
    }

    #[test]
    fn prop_intersection_matches_reference(x in ids(), y in ids()) {
        let (a, b) = (build(&x), build(&y));
        let mut ab = GeneBitSet::new("ab", 255);
        let mut ba = GeneBitSet::new("ba", 255);
        intersection(&a, &b, &mut ab).unwrap();
        intersection(&b, &a, &mut ba).unwrap();

        let expected: Vec<usize> = x.intersection(&y).copied().collect();
        prop_assert_eq!(ab.to_vec(), expected);
        prop_assert_eq!(&ab, &ba);
    }

    #[test]
    fn prop_difference_is_asymmetric(x in ids(), y in ids()) {
        let (a, b) = (build(&x), build(&y));
        let mut dest = GeneBitSet::new("d", 255);
        difference(&a, &b, &mut dest).unwrap();

        let expected: Vec<usize> = x.difference(&y).copied().collect();
        prop_assert_eq!(dest.to_vec(), expected);
        prop_assert_eq!(dest.count(), x.difference(&y).count());
        prop_assert_eq!(dest.highest(), x.difference(&y).last().copied());
        prop_assert!(dest.iter().all(|id| !b.is_member(id)));
    }

    #[test]
    fn prop_operators_agree_with_engine(x in ids(), y in ids()) {
        let (a, b) = (build(&x), build(&y));
        let mut dest = GeneBitSet::new("d", 255);
        difference(&a, &b, &mut dest).unwrap();
        prop_assert_eq!(&dest, &(&a - &b));
        union(&a, &b, &mut dest).unwrap();
        prop_assert_eq!(&dest, &(&a | &b));
        intersection(&a, &b, &mut dest).unwrap();
        prop_assert_eq!(&dest, &(&a & &b));
    }
}
