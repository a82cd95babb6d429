#![cfg(test)]

use super::*;
#[cfg(feature = "hash")]
use crate::collections::hash::HashSet;
#[cfg(feature = "tree")]
use crate::collections::tree::TreeSet;

#[test]
#[cfg(feature = "tree")]
fn test_tree_set_algebra() {
    let a = TreeSet::from([1, 2, 3, 4]);
    let b = TreeSet::from([3, 4, 5]);

    assert!(a.difference(&b).eq(&[1, 2]), "Difference should follow the order of self.");
    assert!(a.intersection(&b).eq(&[3, 4]));
    assert!(a.union(&b).eq(&[1, 2, 3, 4, 5]), "Union should yield every value once.");
    assert!(a.symmetric_difference(&b).eq(&[1, 2, 5]));

    assert!(TreeSet::from([3, 4]).is_subset(&a));
    assert!(!b.is_subset(&a));
    assert!(a.is_superset(&TreeSet::new()), "Every set is a superset of the empty set.");
    assert!(!a.is_disjoint(&b));
    assert!(a.is_disjoint(&TreeSet::from([9])));

    assert!(a.clone().into_difference(b.clone()).eq([1, 2]));
    assert!(a.into_intersection(b).eq([3, 4]));
}

#[test]
#[cfg(feature = "hash")]
fn test_hash_set_algebra() {
    let a: HashSet<i32> = (0..10).collect();
    let b: HashSet<i32> = (5..15).collect();

    let mut union: Vec<_> = a.union(&b).copied().collect();
    union.sort();
    assert_eq!(union, (0..15).collect::<Vec<_>>(), "Union should yield every value once.");

    let mut symmetric: Vec<_> = a.symmetric_difference(&b).copied().collect();
    symmetric.sort();
    assert_eq!(symmetric, [0, 1, 2, 3, 4, 10, 11, 12, 13, 14]);

    assert_eq!(a.intersection(&b).count(), 5);
    assert!(a.difference(&b).all(|value| *value < 5));

    let small: HashSet<i32> = (6..8).collect();
    assert!(small.is_subset(&a) && small.is_subset(&b));
    assert!(a.is_superset(&small));
    assert!(!a.is_subset(&b));

    let mut owned: Vec<_> = a.into_intersection(b).collect();
    owned.sort();
    assert_eq!(owned, [5, 6, 7, 8, 9]);
}

#[test]
#[cfg(feature = "tree")]
fn test_membership_filters() {
    let a = TreeSet::from([1, 2, 3]);
    let b = TreeSet::from([2, 3, 4, 5, 6]);

    let difference = a.difference(&b);
    assert_eq!(difference.keep(), Keep::Missing);
    assert_eq!(difference.size_hint(), (0, Some(3)), "Only self bounds a difference.");
    assert_eq!(a.intersection(&b).keep(), Keep::Shared);

    assert!(!b.is_subset(&a), "A larger set can't be a subset.");
    assert!(b.is_disjoint(&TreeSet::from([7])) && TreeSet::from([7]).is_disjoint(&b));
    assert!(TreeSet::<i32>::new().is_disjoint(&b));
    assert!(Set::is_empty(&TreeSet::<i32>::new()));

    let owned = b.clone().into_difference(a.clone());
    assert_eq!(owned.keep(), Keep::Missing);
    assert!(owned.eq([4, 5, 6]));
}

#[test]
#[cfg(feature = "hash")]
fn test_membership_with_collisions() {
    use crate::util::hash::BadHasherBuilder;

    let mut a: HashSet<i32, _> = HashSet::with_hasher(BadHasherBuilder);
    let mut b: HashSet<i32, _> = HashSet::with_hasher(BadHasherBuilder);
    a.extend(0..8);
    b.extend(4..12);

    let mut shared: Vec<_> = a.intersection(&b).copied().collect();
    shared.sort();
    assert_eq!(shared, [4, 5, 6, 7], "Membership should hold within a single chain.");
    assert_eq!(a.symmetric_difference(&b).count(), 8);
    assert!(!a.is_disjoint(&b));
    assert_eq!(Set::len(&a), 8);
}
