#![cfg(test)]

use std::collections::HashMap as StdHashMap;
use std::hash::RandomState;
use std::iter;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::prime::{self, PRIMES};
use super::*;
use crate::alloc::{CountingAllocator, Propagating};
use crate::collections::key::EqualBy;
use crate::util::drop::CountedDrop;
use crate::util::hash::{BadHasherBuilder, ManualHash};
use crate::util::panic::assert_panics;

#[test]
fn test_next_prime() {
    assert!(PRIMES.is_sorted(), "The bucket counts should be in ascending order.");
    assert_eq!(prime::next_prime(0), 53);
    assert_eq!(prime::next_prime(53), 53, "A tabled prime should be returned as is.");
    assert_eq!(prime::next_prime(54), 97);
    assert_eq!(prime::next_prime(1000), 1543);
    assert_eq!(
        prime::next_prime(usize::MAX),
        4294967291,
        "Requests past the table should clamp to the largest prime."
    );
}

#[test]
fn test_unique_map_keeps_first_value() {
    let map = HashMap::from([(1, "a"), (2, "b"), (1, "c")]);
    map.table.check_invariants();

    assert_eq!(map.len(), 2, "A repeated key shouldn't add an entry.");
    assert_eq!(map[&1], "a", "The first value for a key should be kept.");
    assert_eq!(map.get(&2), Some(&"b"));
    assert!(map.at(&3).is_err());
    assert_eq!(map.bucket_count(), 53);
}

#[test]
fn test_load_factor_bound() {
    let mut set = HashSet::new();
    assert_eq!(set.bucket_count(), 53, "A new set should start with the smallest prime.");

    for i in 0..53 {
        set.insert(i);
    }
    assert_eq!(set.bucket_count(), 53, "Filling up to the load factor shouldn't rehash.");

    set.insert(53);
    assert_eq!(set.bucket_count(), 97, "Going over the load factor should rehash.");

    set.extend(54..1000);
    assert!(set.load_factor() <= set.max_load_factor());
    assert!(PRIMES.contains(&set.bucket_count()));
    assert_eq!(set.len(), 1000);
    set.table.check_invariants();
}

#[test]
fn test_rehash() {
    let mut set: HashSet<i32> = (0..100).collect();
    let buckets = set.bucket_count();

    set.rehash(10);
    assert_eq!(set.bucket_count(), buckets, "Too few buckets should be ignored.");

    set.rehash(1000);
    assert_eq!(set.bucket_count(), 1543);
    set.rehash(1000);
    assert_eq!(set.bucket_count(), 1543, "Rehashing to the same count should do nothing.");
    set.table.check_invariants();

    set.rehash(150);
    assert_eq!(set.bucket_count(), 193, "Rehashing may shrink while the elements still fit.");
    assert_eq!(set.len(), 100);

    set.reserve(500);
    assert!(500.0 / set.bucket_count() as f32 <= set.max_load_factor());
    set.table.check_invariants();
}

#[test]
fn test_max_load_factor() {
    let mut set = HashSet::new();
    set.set_max_load_factor(0.0);
    set.set_max_load_factor(-1.0);
    set.set_max_load_factor(f32::NAN);
    assert_eq!(set.max_load_factor(), DEFAULT_MAX_LOAD_FACTOR, "Invalid factors are ignored.");

    set.set_max_load_factor(0.5);
    assert_eq!(set.max_load_factor(), 0.5);
    set.extend(0..40);
    assert!(set.load_factor() <= 0.5, "Inserts should respect the new maximum.");
    assert_eq!(set.bucket_count(), 97);

    set.set_max_load_factor(4.0);
    set.extend(40..200);
    assert_eq!(set.bucket_count(), 97, "A higher maximum should let chains grow.");
    set.table.check_invariants();
}

#[test]
fn test_collisions() {
    let mut set = HashSet::with_hasher(BadHasherBuilder);
    set.extend([0_u64, 53, 106, 159, 1]);
    set.table.check_invariants();

    assert_eq!(set.bucket(&53), 0);
    assert_eq!(set.bucket_size(0), 4, "Colliding values should share a chain.");
    assert_eq!(set.bucket_size(1), 1);
    assert!(set.contains(&106));
    assert!(!set.contains(&212), "A colliding but absent value shouldn't be found.");

    assert!(set.remove(&53));
    assert_eq!(set.bucket_size(0), 3);
    assert!(set.bucket_iter(0).all(|value| value % 53 == 0));

    let mut map = HashMap::with_hasher(BadHasherBuilder);
    for i in 0..4 {
        map.insert(ManualHash::new(7, i), i);
    }
    assert_eq!(map.len(), 4, "Equal hashes with unequal keys should all be stored.");
    assert_eq!(map.get(&ManualHash::new(7, 2)), Some(&2));
    map.table.check_invariants();
}

#[test]
fn test_multiset_groups() {
    let mut set = HashMultiSet::new();
    set.extend(0..1000);
    set.extend(iter::repeat_n(42, 49));
    set.table.check_invariants();

    assert_eq!(set.len(), 1049);
    assert_eq!(set.count(&42), 50, "Every copy of a repeated value should be counted.");
    assert_eq!(set.equal_range(&42).len(), 50);
    assert!(set.equal_range(&42).all(|value| *value == 42));
    assert!(set.equal_range(&5000).next().is_none());

    assert_eq!(set.remove(&42), 50, "Removing a value should remove every copy.");
    assert!(!set.contains(&42));
    set.table.check_invariants();
}

#[test]
fn test_multimap_insertion_order() {
    let mut map = HashMultiMap::with_hasher(BadHasherBuilder);
    for (i, key) in [3_u32, 1, 3, 56, 3, 1].into_iter().enumerate() {
        map.insert(key, i);
    }
    map.rehash(500);
    map.table.check_invariants();

    assert!(
        map.equal_range(&3).map(|(_, value)| *value).eq([0, 2, 4]),
        "Equal keys should keep insertion order, even across a rehash."
    );
    assert_eq!(map.get(&1), Some(&1), "get should return the first entry for a key.");
    assert_eq!(map.remove_entry(&3), Some((3, 0)));
    assert_eq!(map.erase(&1), 2);
    assert_eq!(map.len(), 3);
}

#[test]
fn test_cursor_erase_everything() {
    let mut set: HashSet<i32> = (0..200).collect();
    let mut cursor = set.cursor_front_mut();
    let mut removed = 0;
    while cursor.remove_current().is_some() {
        removed += 1;
    }
    assert!(cursor.is_end());

    assert_eq!(removed, 200, "Removing at a cursor should step to the next element.");
    assert!(set.is_empty());
    assert!(set.iter().next().is_none());
    set.table.check_invariants();
}

#[test]
fn test_cursor_movement() {
    let mut set = HashSet::with_hasher(BadHasherBuilder);
    set.extend([2_u8, 55, 7]);

    let mut cursor = set.cursor_front();
    assert_eq!(cursor.bucket(), Some(2));
    assert_eq!(cursor.read(), Some(&55), "Newer values sit at the head of their chain.");
    assert_eq!(cursor.read_next(), Some(&2));
    cursor.move_next().move_next();
    assert_eq!(cursor.read(), Some(&7));
    cursor.move_next();
    assert!(cursor.is_end());
    assert_eq!(cursor.bucket(), None);
    cursor.move_next();
    assert_eq!(cursor.read(), Some(&55), "Moving past the end should wrap to the front.");

    assert!(set.find(&9).is_end());
    assert_eq!(set.find(&7).read(), Some(&7));
}

#[test]
fn test_set_of_pairs_cursor() {
    let mut set = HashSet::from([(1, 1), (1, 3)]);
    let (cursor, inserted) = set.insert((1, 2));
    assert!(inserted);
    assert_eq!(cursor.key(), Some(&1));
    assert_eq!(cursor.value(), Some(&2), "Pairs should still be readable through a cursor.");

    set.table.check_invariants();
    assert!(set.contains(&(1, 2)), "A stored pair should stay reachable by its hash.");
    assert_eq!(set.len(), 3);

    let mut map = HashMap::from([(1, 1)]);
    *map.find_mut(&1).value_mut().expect("key 1 is present") = 9;
    assert_eq!(map[&1], 9, "Map cursors should still write values.");
}

#[test]
fn test_retain() {
    let mut map: HashMap<i32, i32> = (0..100).map(|i| (i, i * i)).collect();
    map.retain(|key, _| key % 3 == 0);
    map.table.check_invariants();

    assert_eq!(map.len(), 34);
    assert!(map.keys().all(|key| key % 3 == 0));

    for value in map.values_mut() {
        *value = -*value;
    }
    assert_eq!(map.get(&9), Some(&-81));
    assert_eq!(map.values().sum::<i32>(), -(0..100).step_by(3).map(|i| i * i).sum::<i32>());
}

#[test]
fn test_map_accessors() {
    let mut map = HashMap::new();
    assert_eq!(*map.get_or_insert_with(1, || 10), 10);
    assert_eq!(*map.get_or_insert_with(1, || unreachable!()), 10, "make shouldn't be called.");
    *map.get_or_insert_default(2) += 5;
    assert_eq!(map[&2], 5);

    *map.at_mut(&1).expect("key 1 was inserted") += 1;
    assert_eq!(map.at(&1), Ok(&11));
    assert_eq!(map.at(&3), Err(KeyNotFound));
    assert_eq!(map.get_key_value(&2), Some((&2, &5)));

    for (_, value) in map.iter_mut() {
        *value *= 2;
    }
    assert_eq!(map.remove(&1), Some(22));
    assert_eq!(map.remove(&1), None);
    assert_eq!(map.count(&2), 1);
    assert_eq!(map.erase(&2), 1);
    assert!(map.is_empty());

    let words = HashMap::from([(String::from("one"), 1), (String::from("two"), 2)]);
    assert_eq!(words.get("two"), Some(&2), "Lookups should accept borrowed keys.");
    assert!(words.contains("one"));
}

#[test]
fn test_custom_key_eq() {
    let case_insensitive = EqualBy(|a: &ManualHash<&str>, b: &ManualHash<&str>| {
        a.clone().value().eq_ignore_ascii_case(b.clone().value())
    });
    let mut set = HashSet::with_hasher_and_key_eq(RandomState::new(), case_insensitive);

    assert!(set.insert(ManualHash::new(1, "apple")).1);
    assert!(!set.insert(ManualHash::new(1, "APPLE")).1, "Keys should use the custom equality.");
    assert!(set.insert(ManualHash::new(2, "pear")).1);
    assert!(set.contains(&ManualHash::new(2, "Pear")));
    assert_eq!(set.len(), 2);
}

#[test]
fn test_drop_values() {
    let counter = CountedDrop::counter();
    let mut map = HashMap::new();
    for i in 0..10 {
        map.insert(i, CountedDrop::new(&counter));
    }

    map.insert(0, CountedDrop::new(&counter));
    assert_eq!(counter.get(), 1, "A rejected duplicate should be dropped.");

    drop(map.remove(&3));
    map.retain(|key, _| *key != 4);
    assert_eq!(counter.get(), 3, "Removed values should be dropped exactly once.");

    map.rehash(1000);
    assert_eq!(counter.get(), 3, "Rehashing shouldn't drop anything.");

    let mut iter = map.into_iter();
    iter.next();
    assert_eq!(iter.len(), 7);
    drop(iter);
    assert_eq!(counter.get(), 11, "Dropping an owning iterator should drop everything left.");
}

#[test]
fn test_clone() {
    let mut set: HashSet<i32> = (0..100).collect();
    set.rehash(400);
    let copy = set.clone();

    copy.table.check_invariants();
    assert_eq!(set, copy);
    assert_eq!(copy.bucket_count(), set.bucket_count());
    assert!(set.iter().eq(copy.iter()), "A clone should have the same layout.");
    assert_eq!(format!("{:?}", set.table), format!("{:?}", copy.table));

    let mut other = HashSet::from([1000]);
    other.clone_from(&set);
    assert_eq!(other, set, "clone_from should replace the contents.");
}

#[test]
fn test_equality() {
    let a = HashMultiSet::from([1, 2, 2, 3]);
    let b = HashMultiSet::from([2, 3, 2, 1]);
    let c = HashMultiSet::from([1, 1, 2, 3]);
    assert_eq!(a, b, "Multisets with the same counts should be equal.");
    assert_ne!(a, c, "Different counts for a value should compare unequal.");

    let left = HashMultiMap::from([(1, 'x'), (1, 'y'), (2, 'z')]);
    let right = HashMultiMap::from([(2, 'z'), (1, 'y'), (1, 'x')]);
    let other = HashMultiMap::from([(2, 'z'), (1, 'x'), (1, 'x')]);
    assert_eq!(left, right, "Groups should compare as permutations.");
    assert_ne!(left, other);

    let mut big: HashSet<i32> = (0..10).collect();
    big.rehash(1000);
    assert_eq!(big, (0..10).collect(), "Bucket counts shouldn't affect equality.");
}

#[test]
fn test_debug() {
    let set = HashSet::from([7]);
    assert_eq!(format!("{:?}", set), "{7}");

    let map = HashMap::from([(1, "a")]);
    assert_eq!(format!("{:?}", map), r#"{1: "a"}"#);

    let multi = HashMultiSet::from([4, 4]);
    assert_eq!(format!("{:?}", multi), "[4, 4]");
}

#[test]
fn test_allocations_released() {
    let alloc: CountingAllocator = CountingAllocator::new();
    let mut set = HashSet::new_in(alloc.clone());
    assert_eq!(alloc.live(), 1, "A new set should only allocate its bucket array.");

    set.extend(0..100);
    assert_eq!(alloc.live(), 101, "Every value should have its own node.");

    set.remove(&5);
    set.retain(|value| value % 2 == 0);
    assert_eq!(alloc.live(), set.len() + 1, "Erased nodes should be released.");

    let copy = set.clone();
    assert_eq!(alloc.live(), 2 * (set.len() + 1), "A clone should share the allocator.");
    drop(copy);

    set.clear();
    assert_eq!(alloc.live(), 1, "Clearing should keep only the bucket array.");

    set.extend(0..5);
    drop(set);
    assert_eq!(alloc.live(), 0, "Dropping should release everything.");
}

#[test]
fn test_allocation_failure() {
    let alloc: CountingAllocator = CountingAllocator::new();
    let mut set = HashSet::new_in(alloc.clone());
    set.extend(0..53);

    alloc.fail_after(0);
    assert!(
        set.try_insert(53).is_err_and(|error| error.is_out_of_memory()),
        "A failed rehash should be reported."
    );
    assert_eq!(set.bucket_count(), 53, "A failed rehash should keep the old buckets.");
    assert!(set.try_insert(5).is_ok_and(|(_, inserted)| !inserted), "Duplicates don't allocate.");

    alloc.fail_after(1);
    assert!(set.try_insert(53).is_err(), "The node allocation should fail after the rehash.");
    assert_eq!(set.bucket_count(), 97);
    assert_eq!(set.len(), 53, "A failed insert should leave the elements unchanged.");

    alloc.fail_after(0);
    assert!(set.try_rehash(5000).is_err());
    assert!(set.try_clone().is_err());
    assert_eq!(alloc.live(), 54, "A failed clone should release what it allocated.");

    assert_panics!({
        set.insert(100);
    });
    alloc.stop_failing();
    set.table.check_invariants();
    assert_eq!(set.len(), 53);
}

#[test]
fn test_assign_relocates_between_allocators() {
    let a: CountingAllocator = CountingAllocator::new();
    let b: CountingAllocator = CountingAllocator::new();
    let mut target = HashMultiSet::new_in(a.clone());
    target.extend([100, 200]);
    let mut source = HashMultiSet::new_in(b.clone());
    source.extend([1, 2, 2, 3]);

    target.assign(source);
    target.table.check_invariants();
    let mut values: Vec<_> = target.iter().copied().collect();
    values.sort();
    assert_eq!(values, [1, 2, 2, 3]);
    assert_eq!(*target.allocator(), a, "A sticky allocator should stay with its set.");
    assert_eq!(a.live(), 5, "Every value should be relocated into the target's allocator.");
    assert_eq!(b.live(), 0, "The source's storage should be released.");

    let mut same = HashMultiSet::new_in(a.clone());
    same.extend(10..13);
    let total = a.total();
    target.assign(same);
    assert_eq!(a.live(), 4, "Equal allocators should hand the storage over.");
    assert_eq!(a.total(), total, "Stealing storage shouldn't allocate.");
}

#[test]
fn test_propagating_allocators() {
    let a: CountingAllocator<Propagating> = CountingAllocator::new();
    let b: CountingAllocator<Propagating> = CountingAllocator::new();

    let mut left = HashMap::new_in(a.clone());
    left.insert(1, ());
    let mut right = HashMap::new_in(b.clone());
    right.extend([(2, ()), (3, ())]);

    left.swap(&mut right);
    assert_eq!(*left.allocator(), b, "Propagating allocators should be swapped.");
    assert_eq!(*right.allocator(), a);
    assert!(left.contains(&2) && left.contains(&3));

    right.clone_from(&left);
    assert_eq!(*right.allocator(), b, "Copy-assignment should adopt the source's allocator.");
    assert_eq!(a.live(), 0);
    assert_eq!(b.live(), 6);

    left.assign(right);
    assert_eq!(b.live(), 3, "Move-assignment should adopt the source's storage.");
}

#[test]
fn test_randomized_invariants() {
    let mut rng = SmallRng::seed_from_u64(0x5eed);
    let mut set = HashMultiSet::new();
    let mut model: StdHashMap<u16, usize> = StdHashMap::new();

    for _ in 0..5000 {
        let value = rng.random_range(0..300_u16);
        match rng.random_range(0..4) {
            0 => {
                let expected = model.remove(&value).unwrap_or(0);
                assert_eq!(set.remove(&value), expected);
            },
            1 => {
                let taken = set.take(&value);
                if let Some(count) = model.get_mut(&value) {
                    assert_eq!(taken, Some(value));
                    *count -= 1;
                    if *count == 0 {
                        model.remove(&value);
                    }
                } else {
                    assert_eq!(taken, None);
                }
            },
            _ => {
                set.insert(value);
                *model.entry(value).or_default() += 1;
            },
        }
    }

    set.table.check_invariants();
    assert_eq!(set.len(), model.values().sum::<usize>());
    for (value, count) in &model {
        assert_eq!(set.count(value), *count, "Counts should match the model for {}.", value);
    }
}
