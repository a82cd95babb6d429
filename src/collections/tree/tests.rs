#![cfg(test)]

use std::collections::{BTreeMap, BTreeSet};
use std::iter;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::*;
use crate::alloc::{CountingAllocator, Propagating};
use crate::collections::key::{CompareBy, Greater, Less};
use crate::util::drop::CountedDrop;
use crate::util::error::ContainerError;
use crate::util::panic::assert_panics;

#[test]
fn test_sorted_iteration() {
    let set = TreeSet::from([5, 3, 8, 1, 4, 7, 9]);
    set.tree.check_invariants();

    assert!(
        set.iter().eq(&[1, 3, 4, 5, 7, 8, 9]),
        "Values should be iterated in ascending order."
    );
    assert!(
        set.iter().rev().eq(&[9, 8, 7, 5, 4, 3, 1]),
        "Reverse iteration should yield descending order."
    );
    assert_eq!(set.iter().len(), 7);
    assert_eq!(set.first(), Some(&1));
    assert_eq!(set.last(), Some(&9));
}

#[test]
fn test_unique_insert() {
    let mut set = TreeSet::new();
    assert!(set.insert(4).1, "Inserting into an empty set should succeed.");

    let (cursor, inserted) = set.insert(4);
    assert!(!inserted, "A duplicate value shouldn't be inserted.");
    assert_eq!(cursor.read(), Some(&4), "The cursor should point at the existing value.");
    assert_eq!(set.len(), 1, "The length shouldn't change for a duplicate.");

    let mut map = TreeMap::new();
    map.insert(1, "a");
    let (mut cursor, inserted) = map.insert(1, "b");
    assert!(!inserted);
    assert_eq!(cursor.value(), Some(&"a"), "An existing value should be kept.");

    *cursor.value_mut().expect("cursor should point at an entry") = "c";
    assert_eq!(map.get(&1), Some(&"c"), "Values should be writable through a cursor.");
}

#[test]
fn test_set_of_pairs_cursor() {
    let mut set = TreeSet::from([(1, 1), (1, 3)]);
    let (cursor, inserted) = set.insert((1, 2));
    assert!(inserted);
    assert_eq!(cursor.key(), Some(&1));
    assert_eq!(cursor.value(), Some(&2), "Pairs should still be readable through a cursor.");

    set.tree.check_invariants();
    assert!(set.iter().eq(&[(1, 1), (1, 2), (1, 3)]), "A set of pairs orders by the whole pair.");
    assert!(set.contains(&(1, 2)));

    let mut map = TreeMap::from([(1, 1)]);
    *map.find_mut(&1).value_mut().expect("key 1 is present") = 9;
    assert_eq!(map[&1], 9, "Map cursors should still write values.");
}

#[test]
fn test_many_equal_keys() {
    let mut set = TreeMultiSet::new();
    set.extend(0..1000);
    set.extend(iter::repeat_n(42, 49));
    set.tree.check_invariants();

    assert_eq!(set.len(), 1049);
    assert_eq!(set.count(&42), 50, "Every copy of a repeated value should be counted.");
    assert_eq!(set.equal_range(&42).len(), 50);
    assert!(
        set.equal_range(&42).all(|value| *value == 42),
        "The equal range should only contain equal values."
    );
    assert_eq!(set.lower_bound(&42).read_prev(), Some(&41));
    assert_eq!(set.upper_bound(&42).read(), Some(&43));

    assert_eq!(set.remove(&42), 50, "Erasing a key should remove every copy.");
    assert!(!set.contains(&42));
    set.tree.check_invariants();
}

#[test]
fn test_equal_keys_keep_insertion_order() {
    let mut map = TreeMultiMap::new();
    for (i, key) in [3, 1, 3, 2, 3, 1].into_iter().enumerate() {
        map.insert(key, i);
    }

    assert!(
        map.equal_range(&3).map(|(_, value)| *value).eq([0, 2, 4]),
        "Equal keys should iterate in insertion order."
    );
    assert!(map.keys().eq(&[1, 1, 2, 3, 3, 3]));
    assert_eq!(map.get(&1), Some(&1), "get should return the first inserted value.");
    assert_eq!(map.remove_entry(&3), Some((3, 0)), "The first entry should be removed first.");
    assert!(map.equal_range(&3).map(|(_, value)| *value).eq([2, 4]));
}

#[test]
fn test_erase_root() {
    let mut set = TreeSet::from([4, 2, 6, 1, 3, 5, 7]);
    let root = set.tree.root.map(|node| *node.value()).expect("tree should have a root");

    assert!(set.remove(&root), "The root value should be removed.");
    set.tree.check_invariants();
    assert_eq!(set.len(), 6);
    assert!(
        set.iter().copied().eq((1..=7).filter(|value| *value != root)),
        "Every other value should remain."
    );
}

#[test]
fn test_erase_everything() {
    let mut set: TreeSet<u32> = (0..100).collect();

    let mut cursor = set.cursor_front_mut();
    while cursor.remove_current().is_some() {}
    assert!(cursor.is_end(), "Removing the last value should leave the cursor at the end.");

    assert!(set.is_empty(), "Erasing every value should leave the set empty.");
    assert_eq!(set.first(), None);
    assert_eq!(set.last(), None);
    set.tree.check_invariants();

    set.insert(1);
    assert!(set.iter().eq(&[1]), "The set should still be usable after being emptied.");
}

#[test]
fn test_randomized_invariants() {
    let mut rng = SmallRng::seed_from_u64(0x5EED);
    let mut set = TreeSet::new();
    let mut multi = TreeMultiSet::new();
    let mut keys = BTreeSet::<u32>::new();
    let mut counts = BTreeMap::<u32, usize>::new();

    for _ in 0..2000 {
        let key = rng.random_range(0..200);
        if rng.random_bool(0.6) {
            assert_eq!(set.insert(key).1, keys.insert(key));
            multi.insert(key);
            *counts.entry(key).or_default() += 1;
        } else {
            assert_eq!(set.remove(&key), keys.remove(&key), "Removal should match the model.");
            assert_eq!(multi.take(&key).is_some(), counts.contains_key(&key));
            if let Some(count) = counts.get_mut(&key) {
                *count -= 1;
                if *count == 0 {
                    counts.remove(&key);
                }
            }
        }

        set.tree.check_invariants();
        multi.tree.check_invariants();
    }

    assert!(set.iter().eq(keys.iter()), "The set should hold every live key once.");
    assert_eq!(multi.len(), counts.values().sum::<usize>());
    for (key, count) in &counts {
        assert_eq!(multi.count(key), *count, "The multiset should count every copy.");
    }
}

#[test]
fn test_cursor_movement() {
    let set = TreeSet::from([1, 2, 3]);
    let mut cursor = set.cursor_front();
    assert_eq!(cursor.read(), Some(&1));
    assert_eq!(cursor.read_prev(), None, "The end sits before the first value.");

    cursor.move_prev();
    assert!(cursor.is_end());
    assert_eq!(cursor.read_next(), Some(&1), "The value after the end is the first value.");
    assert_eq!(cursor.read_prev(), Some(&3), "The value before the end is the last value.");

    cursor.move_prev();
    assert_eq!(cursor.read(), Some(&3));
    cursor.move_next().move_next();
    assert_eq!(cursor.read(), Some(&1), "Moving past the end should wrap around.");

    let empty = TreeSet::<i32>::new();
    let mut cursor = empty.cursor_back();
    assert!(cursor.is_end());
    assert!(cursor.move_next().is_end(), "An empty set only has the end position.");
}

#[test]
fn test_bounds_and_range() {
    let set = TreeSet::from([10, 20, 30, 40]);

    assert_eq!(set.lower_bound(&20).read(), Some(&20));
    assert_eq!(set.upper_bound(&20).read(), Some(&30));
    assert_eq!(set.lower_bound(&25).read(), Some(&30));
    assert!(set.lower_bound(&41).is_end(), "No value is at least 41.");
    assert!(set.find(&25).is_end(), "Missing values should be found at the end.");

    let first = set.lower_bound(&15);
    let last = set.upper_bound(&30);
    assert!(set.range(&first, &last).eq(&[20, 30]));
    assert_eq!(set.range(&first, &first).len(), 0, "An empty range should yield nothing.");
    assert_eq!(set.range(&first, &set.find(&99)).len(), 3, "The end cursor bounds the range.");
    assert_eq!(set.equal_range(&25).len(), 0);
}

#[test]
fn test_custom_comparators() {
    let set = TreeSet::<i32, Greater>::from_iter([2, 5, 1]);
    assert!(set.iter().eq(&[5, 2, 1]), "Greater should sort in descending order.");

    let shorter = CompareBy(|a: &&str, b: &&str| a.len() < b.len());
    let mut by_len: TreeMultiSet<&str, _> = TreeMultiSet::with_comparator(shorter);
    by_len.extend(["ccc", "a", "bb", "dd"]);
    assert!(by_len.iter().eq(&["a", "bb", "dd", "ccc"]));
    assert_eq!(by_len.count(&"xx"), 2, "Keys are equal when neither sorts before the other.");
}

#[test]
fn test_borrowed_lookup() {
    let mut map = TreeMap::new();
    map.insert(String::from("one"), 1);
    map.insert(String::from("two"), 2);

    assert_eq!(map.get("one"), Some(&1), "Lookups should accept borrowed keys.");
    assert!(map.contains("two"));
    assert_eq!(map["two"], 2);
    assert_eq!(map.remove("one"), Some(1));
    assert_eq!(map.len(), 1);
}

#[test]
fn test_map_accessors() {
    let mut map = TreeMap::from([(1, 10), (2, 20)]);

    assert_eq!(map.at(&1), Ok(&10));
    assert_eq!(map.at(&3), Err(KeyNotFound), "A missing key should be an error.");
    *map.at_mut(&2).expect("key 2 is present") += 1;
    assert_eq!(map[&2], 21);

    let mut calls = 0;
    *map.get_or_insert_with(3, || {
        calls += 1;
        30
    }) += 1;
    map.get_or_insert_with(3, || {
        calls += 1;
        0
    });
    assert_eq!(calls, 1, "The value should only be made for a missing key.");
    assert_eq!(map[&3], 31);

    *map.get_or_insert_default(4) += 4;
    assert_eq!(map.get(&4), Some(&4));

    for value in map.values_mut() {
        *value *= 2;
    }
    assert!(map.values().eq(&[20, 42, 62, 8]));
    assert!(map.keys().rev().eq(&[4, 3, 2, 1]));

    map.retain(|key, _| key % 2 == 0);
    assert!(map.keys().eq(&[2, 4]));

    assert_panics!(
        {
            let _ = map[&1];
        },
        "Indexing with a missing key should panic."
    );
}

#[test]
fn test_container_error() {
    fn copy_forward(
        map: &mut TreeMap<i32, i32, Less, CountingAllocator>,
        key: i32,
    ) -> Result<i32, ContainerError> {
        let value = *map.at(&key)?;
        map.try_insert(key + 1, value)?;
        Ok(value)
    }

    let alloc: CountingAllocator = CountingAllocator::new();
    let mut map = TreeMap::new_in(alloc.clone());
    map.insert(1, 100);

    assert_eq!(copy_forward(&mut map, 1), Ok(100));
    assert!(copy_forward(&mut map, 5).is_err_and(|error| error.is_key_not_found()));

    alloc.fail_after(0);
    assert!(
        copy_forward(&mut map, 2).is_err_and(|error| error.is_alloc_error()),
        "Allocation failures should convert into the container error."
    );
    alloc.stop_failing();
}

#[test]
fn test_drop_values() {
    let counter = CountedDrop::counter();
    let mut map = TreeMap::new();
    for i in 0..10 {
        map.insert(i, CountedDrop::new(&counter));
    }

    map.insert(0, CountedDrop::new(&counter));
    assert_eq!(counter.get(), 1, "A rejected duplicate should be dropped.");

    drop(map.remove(&3));
    drop(map.pop_last());
    assert_eq!(counter.get(), 3, "Removed values should be handed back, not leaked.");

    let mut iter = map.into_iter();
    iter.next();
    iter.next_back();
    drop(iter);
    assert_eq!(counter.get(), 11, "Dropping an owning iterator should drop everything left.");
}

#[test]
fn test_clone() {
    let set: TreeSet<i32> = (0..50).collect();
    let copy = set.clone();

    copy.tree.check_invariants();
    assert_eq!(set, copy);
    assert_eq!(
        format!("{:?}", set.tree),
        format!("{:?}", copy.tree),
        "A clone should have the same shape and colors."
    );

    let mut other = TreeSet::from([100]);
    other.clone_from(&set);
    assert_eq!(other, set, "clone_from should replace the contents.");
    other.tree.check_invariants();
}

#[test]
fn test_debug() {
    let set = TreeSet::from([2, 1, 3]);
    assert_eq!(format!("{:?}", set), "{1, 2, 3}");
    assert_eq!(
        format!("{:?}", set.tree),
        concat!(
            "┌    ┌    -\n┌    (Red 1)\n┌    └    -\n",
            "(Black 2)\n",
            "└    ┌    -\n└    (Red 3)\n└    └    -",
        )
    );

    let map = TreeMap::from([(1, "a")]);
    assert_eq!(format!("{:?}", map), r#"{1: "a"}"#);
}

#[test]
fn test_ordering_and_hash() {
    use std::hash::{BuildHasher, RandomState};

    let a = TreeSet::from([1, 2, 3]);
    let b = TreeSet::from([3, 2, 1]);
    let c = TreeSet::from([1, 2, 4]);

    assert_eq!(a, b, "Sets with the same values should be equal.");
    assert!(a < c, "Sets should compare lexicographically.");

    let state = RandomState::new();
    assert_eq!(state.hash_one(&a), state.hash_one(&b), "Equal sets should hash equally.");
}

#[test]
fn test_comparator_panic() {
    let mut set: TreeSet<i32, _> = TreeSet::with_comparator(CompareBy(|a: &i32, b: &i32| {
        if *a == 13 || *b == 13 {
            panic!("unlucky");
        }
        a < b
    }));
    set.extend([1, 5, 9, 20]);

    assert_panics!({
        set.insert(13);
    });
    assert!(set.iter().eq(&[1, 5, 9, 20]), "A panicking comparator should leave the set as is.");
    set.tree.check_invariants();
}

#[test]
fn test_allocations_released() {
    let alloc: CountingAllocator = CountingAllocator::new();
    let mut set = TreeSet::new_in(alloc.clone());
    set.extend(0..20);
    assert_eq!(alloc.live(), 20, "Every value should have its own node.");

    set.remove(&5);
    set.retain(|value| value % 2 == 0);
    assert_eq!(alloc.live(), set.len(), "Erased nodes should be released.");

    let copy = set.clone();
    assert_eq!(alloc.live(), 2 * set.len(), "A clone should share the allocator.");
    drop(copy);

    set.clear();
    assert_eq!(alloc.live(), 0, "Clearing should release every node.");

    set.extend(0..5);
    drop(set);
    assert_eq!(alloc.live(), 0, "Dropping should release every node.");
}

#[test]
fn test_allocation_failure() {
    let alloc: CountingAllocator = CountingAllocator::new();
    let mut set = TreeSet::new_in(alloc.clone());
    set.extend(0..10);

    alloc.fail_after(0);
    assert!(
        set.try_insert(10).is_err_and(|error| error.is_out_of_memory()),
        "A failed allocation should be reported."
    );
    assert_eq!(set.len(), 10, "A failed insert should leave the set unchanged.");
    assert!(set.try_insert(5).is_ok_and(|(_, inserted)| !inserted), "Duplicates don't allocate.");

    alloc.fail_after(4);
    assert!(set.try_clone().is_err(), "A clone should fail part way.");
    assert_eq!(alloc.live(), 10, "A failed clone should release what it allocated.");

    assert_panics!({
        set.insert(11);
    });
    alloc.stop_failing();
    set.tree.check_invariants();
    assert_eq!(set.len(), 10);
}

#[test]
fn test_assign_relocates_between_allocators() {
    let a: CountingAllocator = CountingAllocator::new();
    let b: CountingAllocator = CountingAllocator::new();
    let mut target = TreeSet::new_in(a.clone());
    target.extend([100, 200]);
    let mut source = TreeSet::new_in(b.clone());
    source.extend(0..5);

    target.assign(source);
    assert!(target.iter().eq(&[0, 1, 2, 3, 4]));
    assert_eq!(*target.allocator(), a, "A sticky allocator should stay with its set.");
    assert_eq!(a.live(), 5, "Every value should be relocated into the target's allocator.");
    assert_eq!(b.live(), 0, "The source's nodes should be released.");

    let mut same = TreeSet::new_in(a.clone());
    same.extend(10..13);
    target.assign(same);
    assert_eq!(a.live(), 3, "Equal allocators should hand the nodes over.");
    assert_eq!(a.total(), 2 + 5 + 3, "Stealing nodes shouldn't allocate.");
}

#[test]
fn test_propagating_allocators() {
    let a: CountingAllocator<Propagating> = CountingAllocator::new();
    let b: CountingAllocator<Propagating> = CountingAllocator::new();

    let mut left = TreeMap::new_in(a.clone());
    left.insert(1, ());
    let mut right = TreeMap::new_in(b.clone());
    right.extend([(2, ()), (3, ())]);

    left.swap(&mut right);
    assert_eq!(*left.allocator(), b, "Propagating allocators should be swapped.");
    assert_eq!(*right.allocator(), a);
    assert!(left.keys().eq(&[2, 3]));

    right.clone_from(&left);
    assert_eq!(*right.allocator(), b, "Copy-assignment should adopt the source's allocator.");
    assert_eq!(a.live(), 0);
    assert_eq!(b.live(), 4);

    left.assign(right);
    assert_eq!(b.live(), 2, "Move-assignment should adopt the source's nodes.");
}

#[test]
#[cfg(debug_assertions)]
fn test_swap_unequal_sticky_allocators() {
    let mut left = TreeSet::new_in(CountingAllocator::<crate::alloc::Sticky>::new());
    let mut right = TreeSet::new_in(CountingAllocator::<crate::alloc::Sticky>::new());
    left.insert(1);
    right.insert(2);

    assert_panics!({
        left.swap(&mut right);
    });
    assert!(left.iter().eq(&[1]), "A rejected swap shouldn't move anything.");
}
