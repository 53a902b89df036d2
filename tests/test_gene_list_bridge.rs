//! Tests for converting between bit sets and gene lists.

use genebits::gene_list_bridge::{
    copy_bitset_to_bitset, copy_bitset_to_gene_list, copy_gene_list_to_bitset,
    recompute_with_list, to_gene_list,
};
use genebits::{CopyMode, Gene, GeneBitSet, GeneCatalog, GeneList, ListFill};
use proptest::prelude::*;
use std::rc::Rc;

const MAX_GENES: usize = 500;

/// Catalog with a gene at every MID except multiples of 7.
fn catalog() -> GeneCatalog {
    GeneCatalog::from_genes(
        MAX_GENES,
        (0..=MAX_GENES)
            .filter(|mid| mid % 7 != 0)
            .map(|mid| Gene::new(mid, format!("gene-{}", mid))),
    )
    .unwrap()
}

// =============================================================================
// Bit Set -> Gene List
// =============================================================================

#[test]
fn test_to_gene_list_ascending() {
    let catalog = catalog();
    let mut bs = GeneBitSet::from_ids("s", MAX_GENES, &[400, 3, 22]).unwrap();
    let mut genes = Vec::new();
    let fill = to_gene_list(&mut bs, &catalog, &mut genes);
    assert!(fill.is_complete());
    let names: Vec<&str> = genes.iter().map(|g| g.name()).collect();
    assert_eq!(names, vec!["gene-3", "gene-22", "gene-400"]);
}

#[test]
fn test_to_gene_list_reports_skipped() {
    let catalog = catalog();
    let mut bs = GeneBitSet::from_ids("s", MAX_GENES, &[7, 8, 14]).unwrap();
    let mut genes = Vec::new();
    let fill = to_gene_list(&mut bs, &catalog, &mut genes);
    assert_eq!(
        fill,
        ListFill {
            requested: 3,
            appended: 1
        }
    );
    assert_eq!(genes.len(), 1);
    assert_eq!(fill.missing(), 2);
}

#[test]
fn test_copy_bitset_to_gene_list_copies_words() {
    let catalog = catalog();
    let src = GeneBitSet::from_ids("src", MAX_GENES, &[1, 2, 3]).unwrap().into_shared();
    let mut list = GeneList::new("list", MAX_GENES);
    list.bitset().borrow_mut().add_item(99).unwrap();

    let fill = copy_bitset_to_gene_list(&mut list, &src, &catalog).unwrap();
    assert_eq!(fill.appended, 3);
    assert_eq!(list.mids(), vec![1, 2, 3]);
    assert_eq!(list.bitset().borrow().to_vec(), vec![1, 2, 3]);
    assert_eq!(list.bitset().borrow().name(), "list");
    assert!(!Rc::ptr_eq(list.bitset(), &src));
}

#[test]
fn test_recompute_with_list_after_bulk_copy() {
    let catalog = catalog();
    let src = GeneBitSet::from_ids("src", MAX_GENES, &[5, 6, 7]).unwrap();
    let mut dst = GeneBitSet::new("dst", MAX_GENES);
    copy_bitset_to_bitset(&mut dst, &src).unwrap();

    let mut genes = Vec::new();
    assert_eq!(recompute_with_list(&mut dst, &catalog, &mut genes), 2);
    assert_eq!(dst.count(), 3);
    assert_eq!(dst.highest(), Some(7));
}

// =============================================================================
// Gene List -> Bit Set
// =============================================================================

#[test]
fn test_raw_copy_uses_list_bitset() {
    let catalog = catalog();
    let mut list = GeneList::new("list", MAX_GENES);
    list.bitset().borrow_mut().add_item(10).unwrap();
    // hand edit that the bit set does not know about
    list.push(Rc::clone(catalog.get(11).unwrap()));

    let dst = GeneBitSet::new("dst", MAX_GENES).into_shared();
    copy_gene_list_to_bitset(&dst, &list, CopyMode::RawWords).unwrap();
    assert_eq!(dst.borrow().to_vec(), vec![10]);

    copy_gene_list_to_bitset(&dst, &list, CopyMode::Reconstruct).unwrap();
    assert_eq!(dst.borrow().to_vec(), vec![11]);
}

#[test]
fn test_reconstruct_into_list_own_bitset() {
    let catalog = catalog();
    let mut list = GeneList::new("list", MAX_GENES);
    list.push(Rc::clone(catalog.get(20).unwrap()));
    list.push(Rc::clone(catalog.get(4).unwrap()));
    list.push(Rc::clone(catalog.get(20).unwrap()));

    let own = Rc::clone(list.bitset());
    copy_gene_list_to_bitset(&own, &list, CopyMode::Reconstruct).unwrap();
    assert_eq!(own.borrow().to_vec(), vec![4, 20]);
    assert_eq!(own.borrow().count(), 2);

    copy_gene_list_to_bitset(&own, &list, CopyMode::RawWords).unwrap();
    assert_eq!(own.borrow().to_vec(), vec![4, 20]);
}

#[test]
fn test_raw_copy_into_smaller_bitset() {
    let mut list = GeneList::new("list", MAX_GENES);
    list.bitset().borrow_mut().add_item(450).unwrap();
    let dst = GeneBitSet::from_ids("dst", 100, &[1]).unwrap().into_shared();
    assert!(copy_gene_list_to_bitset(&dst, &list, CopyMode::RawWords).is_err());
    assert_eq!(dst.borrow().to_vec(), vec![1]);
}

// =============================================================================
// Property-Based Tests
// =============================================================================

proptest! {
    #[test]
    fn prop_round_trip(ids in prop::collection::btree_set(0usize..=MAX_GENES, 0..100)) {
        let catalog = catalog();
        let ids: Vec<usize> = ids.into_iter().filter(|mid| mid % 7 != 0).collect();
        let src = GeneBitSet::from_ids("src", MAX_GENES, &ids).unwrap().into_shared();

        let mut list = GeneList::new("list", MAX_GENES);
        let fill = copy_bitset_to_gene_list(&mut list, &src, &catalog).unwrap();
        prop_assert!(fill.is_complete());

        let back = GeneBitSet::new("back", MAX_GENES).into_shared();
        copy_gene_list_to_bitset(&back, &list, CopyMode::Reconstruct).unwrap();
        prop_assert_eq!(&*back.borrow(), &*src.borrow());
        prop_assert_eq!(back.borrow().to_vec(), ids);
    }
}
