use std::borrow::Borrow;
use std::fmt::{self, Debug, Formatter};
use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;
use std::mem;
use std::ptr;

use super::buckets::Buckets;
use super::iter::next_occupied;
use super::node::{HashNode, Link, NodePtr};
use super::prime::{self, MAX_BUCKETS};
use super::{Cursor, CursorMut, IntoIter, Iter, LocalIter};
use crate::alloc::{AllocError, AllocTraits, Allocator, Global, MoveStrategy, NodeGuard};
use crate::collections::key::{KeyEq, KeyOf};
use crate::util::option::OptionExtension;
use crate::util::result::ResultExtension;

/// The default maximum load factor: on average, one element per bucket.
pub const DEFAULT_MAX_LOAD_FACTOR: f32 = 1.0;

/// A hash table with separate chaining, the engine behind [`HashMap`](super::HashMap),
/// [`HashMultiMap`](super::HashMultiMap), [`HashSet`](super::HashSet) and
/// [`HashMultiSet`](super::HashMultiSet).
///
/// The table stores whole values of type `T` and reads the key out of each with `X`. Keys are
/// hashed with a hasher built by `S` and compared with `E`. The bucket array and every node are
/// allocated through `A`, rebound to the type being allocated.
///
/// The bucket count is always one of a fixed table of primes, starting at 53. Each node keeps the
/// hash of its key, so growing the table relinks nodes without hashing anything again.
///
/// # Invariants
/// - Elements with equal keys are adjacent within a single chain, in insertion order.
/// - After an insertion, `len / bucket_count <= max_load_factor` (unless the bucket count is
///   already the largest prime).
///
/// # Time Complexity
/// For this analysis of time complexity, variables are defined as follows:
/// - `n`: The number of items in the table.
/// - `b`: The number of buckets.
/// - `k`: The number of items with a key equal to the one in question.
///
/// | Method | Complexity |
/// |-|-|
/// | `len` | `O(1)` |
/// | `try_insert_unique` | `O(1)`*, `O(n + b)` |
/// | `try_insert_equal` | `O(k)`*, `O(n + b)` |
/// | `find` | `O(1)`* |
/// | `equal_range` / `count` | `O(k)`* |
/// | `remove` | `O(1)`* |
/// | `erase` | `O(k)`* |
/// | `try_rehash` | `O(n + b)` |
/// | `iter` | `O(n + b)` |
///
/// \* Expected, with a reasonable hasher. Insertions take `O(n + b)` when they trigger a rehash.
pub struct HashTable<T, X, S, E, A: Allocator = Global> {
    pub(crate) buckets: Buckets<T>,
    pub(crate) len: usize,
    pub(crate) max_load_factor: f32,
    pub(crate) hasher: S,
    pub(crate) key_eq: E,
    pub(crate) traits: AllocTraits<HashNode<T>, A>,
    pub(crate) _phantom: PhantomData<(T, fn() -> X)>,
}

impl<T, X, S, E, A: Allocator> HashTable<T, X, S, E, A> {
    /// Creates an empty table with at least `buckets` buckets.
    ///
    /// The bucket array is allocated immediately; if that fails the process aborts. See
    /// [`HashTable::try_with_buckets_in`] for a fallible version.
    pub fn with_buckets_in(buckets: usize, hasher: S, key_eq: E, alloc: A) -> Self {
        let traits = AllocTraits::new(alloc);
        let buckets = Buckets::new_or_abort(prime::next_prime(buckets), &traits.rebind());
        Self::from_parts(buckets, hasher, key_eq, traits)
    }

    /// Creates an empty table with at least `buckets` buckets.
    ///
    /// # Errors
    /// Returns an [`AllocError`] if the bucket array can't be allocated.
    pub fn try_with_buckets_in(
        buckets: usize,
        hasher: S,
        key_eq: E,
        alloc: A,
    ) -> Result<Self, AllocError> {
        let traits = AllocTraits::new(alloc);
        let buckets = Buckets::try_new(prime::next_prime(buckets), &traits.rebind())?;
        Ok(Self::from_parts(buckets, hasher, key_eq, traits))
    }

    fn from_parts(
        buckets: Buckets<T>,
        hasher: S,
        key_eq: E,
        traits: AllocTraits<HashNode<T>, A>,
    ) -> Self {
        HashTable {
            buckets,
            len: 0,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
            hasher,
            key_eq,
            traits,
            _phantom: PhantomData,
        }
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The largest number of elements the allocator could theoretically provide nodes for.
    pub const fn max_size(&self) -> usize {
        AllocTraits::<HashNode<T>, A>::max_size()
    }

    pub const fn allocator(&self) -> &A {
        self.traits.allocator()
    }

    pub const fn hasher(&self) -> &S {
        &self.hasher
    }

    pub const fn key_eq(&self) -> &E {
        &self.key_eq
    }

    pub const fn bucket_count(&self) -> usize {
        self.buckets.size()
    }

    pub const fn max_bucket_count(&self) -> usize {
        MAX_BUCKETS
    }

    /// Returns the number of elements in bucket `index`.
    ///
    /// # Panics
    /// Panics if `index` is not less than the bucket count.
    pub fn bucket_size(&self, index: usize) -> usize {
        self.bucket_iter(index).count()
    }

    /// Iterates over the chain of bucket `index`.
    ///
    /// # Panics
    /// Panics if `index` is not less than the bucket count.
    pub fn bucket_iter(&self, index: usize) -> LocalIter<'_, T> {
        LocalIter::new(self.buckets[index])
    }

    /// The average number of elements per bucket.
    pub fn load_factor(&self) -> f32 {
        self.len as f32 / self.bucket_count() as f32
    }

    pub const fn max_load_factor(&self) -> f32 {
        self.max_load_factor
    }

    /// Sets the load factor above which an insertion grows the table. NaN, zero and negative
    /// values are ignored.
    ///
    /// The table isn't rehashed straight away; the next insertion restores the bound.
    pub fn set_max_load_factor(&mut self, max_load_factor: f32) {
        if max_load_factor > 0.0 {
            self.max_load_factor = max_load_factor;
        } else {
            debug!("ignoring invalid max load factor {}", max_load_factor);
        }
    }

    pub fn iter(&self) -> Iter<'_, T> {
        let (bucket, current) = next_occupied(&self.buckets, 0);
        Iter::new(&self.buckets, bucket, current, self.len)
    }

    pub fn cursor_front(&self) -> Cursor<'_, T, X, S, E, A> {
        let (bucket, current) = next_occupied(&self.buckets, 0);
        Cursor::new(self, bucket, current)
    }

    pub fn cursor_front_mut(&mut self) -> CursorMut<'_, T, X, S, E, A> {
        let (bucket, current) = next_occupied(&self.buckets, 0);
        CursorMut::new(self, bucket, current)
    }

    /// Removes every element, keeping the bucket array, hasher and allocator.
    pub fn clear(&mut self) {
        if mem::take(&mut self.len) == 0 {
            return;
        }

        trace!("tearing down hash table of {} buckets", self.bucket_count());
        for bucket in 0..self.buckets.size() {
            let mut current = self.buckets[bucket].take();
            while let Some(node) = current {
                current = node.next();
                self.destroy_node(node);
            }
        }
    }

    /// Keeps only the elements for which `keep` returns true, visiting them in iteration order.
    pub fn retain<F: FnMut(&T) -> bool>(&mut self, mut keep: F) {
        for bucket in 0..self.buckets.size() {
            let mut prev: Link<T> = None;
            let mut current = self.buckets[bucket];
            while let Some(node) = current {
                current = node.next();
                if keep(node.value()) {
                    prev = Some(node);
                } else {
                    match prev {
                        Some(prev) => prev.set_next(current),
                        None => self.buckets[bucket] = current,
                    }
                    self.len -= 1;
                    self.destroy_node(node);
                }
            }
        }
    }

    /// Exchanges the contents of two tables, including their hashers and key equality. Allocators
    /// are exchanged only if they propagate on swap; otherwise they must compare equal.
    pub fn swap(&mut self, other: &mut HashTable<T, X, S, E, A>) {
        self.traits.swap(&mut other.traits);
        self.swap_contents(other);
    }

    /// Exchanges everything but the allocators. Both tables' storage must be interchangeable.
    fn swap_contents(&mut self, other: &mut HashTable<T, X, S, E, A>) {
        mem::swap(&mut self.buckets, &mut other.buckets);
        mem::swap(&mut self.len, &mut other.len);
        mem::swap(&mut self.max_load_factor, &mut other.max_load_factor);
        mem::swap(&mut self.hasher, &mut other.hasher);
        mem::swap(&mut self.key_eq, &mut other.key_eq);
    }

    /// Rebuilds the bucket array with at least `n` buckets, if that leaves room for every element
    /// under the maximum load factor. Asking for fewer buckets than that does nothing.
    ///
    /// # Errors
    /// Returns an [`AllocError`] if the new bucket array can't be allocated. The table is
    /// unchanged.
    pub fn try_rehash(&mut self, n: usize) -> Result<(), AllocError> {
        if n as f32 <= self.len as f32 / self.max_load_factor {
            return Ok(());
        }

        let count = prime::next_prime(n);
        if count == self.bucket_count() {
            return Ok(());
        }

        trace!(
            "rehashing {} elements from {} to {} buckets",
            self.len,
            self.bucket_count(),
            count
        );
        let bucket_traits = self.traits.rebind::<Link<T>>();
        let mut fresh = Buckets::try_new(count, &bucket_traits)?;

        // Walking the old chains in order and appending to the new ones keeps equal keys together.
        for bucket in 0..self.buckets.size() {
            let mut current = self.buckets[bucket];
            while let Some(node) = current {
                current = node.next();
                node.set_next(None);
                append(&mut fresh[index_for(node.hash(), count)], node);
            }
        }

        let old = mem::replace(&mut self.buckets, fresh);
        // SAFETY: The old array came from an equal allocator and is dropped right after.
        unsafe { old.release(&bucket_traits) };
        Ok(())
    }

    /// # Panics
    /// Panics if the bucket array can't be allocated.
    pub fn rehash(&mut self, n: usize) {
        self.try_rehash(n).throw()
    }

    /// Makes room for `n` elements in total without exceeding the maximum load factor.
    ///
    /// # Errors
    /// Returns an [`AllocError`] if the new bucket array can't be allocated.
    pub fn try_reserve(&mut self, n: usize) -> Result<(), AllocError> {
        self.try_rehash(self.required_buckets(n))
    }

    /// # Panics
    /// Panics if the bucket array can't be allocated.
    pub fn reserve(&mut self, n: usize) {
        self.try_reserve(n).throw()
    }

    /// The number of buckets needed to hold `n` elements.
    fn required_buckets(&self, n: usize) -> usize {
        (n as f32 / self.max_load_factor).ceil() as usize
    }

    /// Grows the bucket array if one more element would exceed the maximum load factor.
    fn try_grow_for_one(&mut self) -> Result<(), AllocError> {
        let needed = self.len + 1;
        if needed as f32 > self.max_load_factor * self.bucket_count() as f32 {
            self.try_rehash(self.required_buckets(needed))?;
        }
        Ok(())
    }

    /// Allocates a node for `value` and links it at the head of its chain, growing the table first
    /// if needed. The caller has checked that the key isn't present.
    fn try_link_front(&mut self, hash: u64, value: T) -> Result<(usize, NodePtr<T>), AllocError> {
        self.try_grow_for_one()?;
        let node = NodePtr(NodeGuard::new(&self.traits, HashNode::new(value, hash))?.into_raw());

        let bucket = index_for(hash, self.bucket_count());
        node.set_next(self.buckets[bucket]);
        self.buckets[bucket] = Some(node);
        self.len += 1;
        Ok((bucket, node))
    }

    /// Detaches `node`, which must be in the chain of `bucket`.
    fn unlink(&mut self, bucket: usize, node: NodePtr<T>) {
        if self.buckets[bucket] == Some(node) {
            self.buckets[bucket] = node.next();
        } else {
            // SAFETY: The node is in this chain but not at its head, so the chain has a node
            // before it.
            let mut prev = unsafe { self.buckets[bucket].unreachable() };
            while prev.next() != Some(node) {
                // SAFETY: The node is further along the chain.
                prev = unsafe { prev.next().unreachable() };
            }
            prev.set_next(node.next());
        }
        self.len -= 1;
    }

    /// Detaches `node` from the chain of `bucket` and returns its value, releasing the node.
    pub(crate) fn remove_node(&mut self, bucket: usize, node: NodePtr<T>) -> T {
        self.unlink(bucket, node);
        self.take_node(node)
    }

    /// Reads the value out of an unlinked node and releases its storage.
    pub(crate) fn take_node(&self, node: NodePtr<T>) -> T {
        // SAFETY: The node is unlinked, so nothing else refers to it. The value is read out exactly
        // once and the storage released without running its destructor again.
        unsafe {
            let value = ptr::read(&raw const (*node.as_non_null().as_ptr()).value);
            self.traits.deallocate(node.as_non_null(), 1);
            value
        }
    }

    fn destroy_node(&self, node: NodePtr<T>) {
        // SAFETY: The node is no longer reachable from the table and was allocated by self.traits.
        unsafe {
            self.traits.destroy(node.as_non_null());
            self.traits.deallocate(node.as_non_null(), 1);
        }
    }

    /// Move-assigns `source` into `self`, following the allocator's move propagation.
    ///
    /// When the allocators neither propagate nor compare equal, every element is moved into a node
    /// allocated by `self`'s allocator, reusing the hashes cached in the source's nodes.
    ///
    /// # Errors
    /// Returns an [`AllocError`] if relocating fails. `self` then holds the elements relocated so
    /// far; the rest are dropped.
    pub fn try_assign(&mut self, mut source: HashTable<T, X, S, E, A>) -> Result<(), AllocError>
    where
        X: KeyOf<T>,
        E: KeyEq<X::Key>,
    {
        match self.traits.move_strategy(&source.traits) {
            MoveStrategy::Adopt => {
                *self = source;
            },
            MoveStrategy::Steal => {
                self.clear();
                self.swap_contents(&mut source);
            },
            MoveStrategy::Relocate => {
                self.clear();
                mem::swap(&mut self.hasher, &mut source.hasher);
                mem::swap(&mut self.key_eq, &mut source.key_eq);
                self.max_load_factor = source.max_load_factor;
                self.try_reserve(source.len)?;

                for bucket in 0..source.buckets.size() {
                    while let Some(node) = source.buckets[bucket] {
                        source.buckets[bucket] = node.next();
                        source.len -= 1;
                        let hash = node.hash();
                        let value = source.take_node(node);
                        self.try_insert_equal_hashed(hash, value)?;
                    }
                }
            },
        }
        Ok(())
    }

    /// The last element in the chain of `bucket` whose key equals `key`.
    fn last_equal(&self, bucket: usize, hash: u64, key: &X::Key) -> Link<T>
    where
        X: KeyOf<T>,
        E: KeyEq<X::Key>,
    {
        let mut last = None;
        let mut current = self.buckets[bucket];
        while let Some(node) = current {
            if self.key_matches::<X::Key>(node, hash, key) {
                last = Some(node);
            } else if last.is_some() {
                break;
            }
            current = node.next();
        }
        last
    }

    /// Links a new node for `value` after the last element with an equal key, or at the head of
    /// its chain if there is none. The table grows before the chain is scanned.
    pub(crate) fn try_insert_equal_hashed(
        &mut self,
        hash: u64,
        value: T,
    ) -> Result<(usize, NodePtr<T>), AllocError>
    where
        X: KeyOf<T>,
        E: KeyEq<X::Key>,
    {
        self.try_grow_for_one()?;
        let bucket = index_for(hash, self.bucket_count());

        // The guard keeps the node owned until it is linked, in case comparing keys panics.
        let guard = NodeGuard::new(&self.traits, HashNode::new(value, hash))?;
        let pending = NodePtr(guard.as_ptr());
        let last = self.last_equal(bucket, hash, X::key(pending.value()));
        let node = NodePtr(guard.into_raw());

        match last {
            Some(prev) => {
                node.set_next(prev.next());
                prev.set_next(Some(node));
            },
            None => {
                node.set_next(self.buckets[bucket]);
                self.buckets[bucket] = Some(node);
            },
        }
        self.len += 1;
        Ok((bucket, node))
    }

    /// Whether `node` holds a key equal to `key`, which hashes to `hash`.
    fn key_matches<Q>(&self, node: NodePtr<T>, hash: u64, key: &Q) -> bool
    where
        X: KeyOf<T>,
        X::Key: Borrow<Q>,
        E: KeyEq<Q>,
        Q: ?Sized,
    {
        node.hash() == hash
            && <E as KeyEq<Q>>::equal(&self.key_eq, X::key(node.value()).borrow(), key)
    }

    /// Counts the run of elements equal to `key` starting at `first`.
    fn run_len<Q>(&self, first: Link<T>, hash: u64, key: &Q) -> usize
    where
        X: KeyOf<T>,
        X::Key: Borrow<Q>,
        E: KeyEq<Q>,
        Q: ?Sized,
    {
        let mut count = 0;
        let mut current = first;
        while let Some(node) = current
            && self.key_matches(node, hash, key)
        {
            count += 1;
            current = node.next();
        }
        count
    }

    #[cfg(test)]
    /// Checks the structural invariants of the table, panicking with a description of the first
    /// violation found.
    pub(crate) fn check_invariants(&self)
    where
        X: KeyOf<T>,
        E: KeyEq<X::Key>,
    {
        let mut count = 0;
        for (index, head) in self.buckets.iter().enumerate() {
            let mut current = *head;
            while let Some(node) = current {
                assert_eq!(
                    index_for(node.hash(), self.bucket_count()),
                    index,
                    "Every node should sit in the bucket its hash selects."
                );
                count += 1;
                current = node.next();
            }
        }
        assert_eq!(count, self.len, "The chains should hold exactly len elements.");
        assert!(
            prime::PRIMES.contains(&self.bucket_count()),
            "The bucket count should always be a tabled prime."
        );

        // Equal keys are adjacent: once a run of a key ends, it never appears again in the chain.
        for head in self.buckets.iter() {
            let mut current = *head;
            while let Some(node) = current {
                let run = self.run_len::<X::Key>(Some(node), node.hash(), X::key(node.value()));
                let mut rest = (0..run).fold(Some(node), |link, _| link.and_then(NodePtr::next));
                while let Some(other) = rest {
                    assert!(
                        !self.key_matches::<X::Key>(other, node.hash(), X::key(node.value())),
                        "Elements with equal keys should be adjacent."
                    );
                    rest = other.next();
                }
                current = node.next();
            }
        }
    }
}

impl<T, X, S, E, A> HashTable<T, X, S, E, A>
where
    X: KeyOf<T>,
    X::Key: Hash,
    S: BuildHasher,
    E: KeyEq<X::Key>,
    A: Allocator,
{
    fn hash_key<Q: Hash + ?Sized>(&self, key: &Q) -> u64 {
        self.hasher.hash_one(key)
    }

    /// The index of the bucket `key` belongs in.
    pub fn bucket<Q>(&self, key: &Q) -> usize
    where
        X::Key: Borrow<Q>,
        Q: Hash + ?Sized,
    {
        index_for(self.hash_key(key), self.bucket_count())
    }

    /// Finds the bucket for `key` and the first element in it with an equal key.
    fn locate<Q>(&self, key: &Q) -> (usize, u64, Link<T>)
    where
        X::Key: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        let hash = self.hash_key(key);
        let bucket = index_for(hash, self.bucket_count());
        let mut current = self.buckets[bucket];
        while let Some(node) = current {
            if self.key_matches(node, hash, key) {
                return (bucket, hash, Some(node));
            }
            current = node.next();
        }
        (bucket, hash, None)
    }

    pub(crate) fn try_insert_unique_node(
        &mut self,
        value: T,
    ) -> Result<(usize, NodePtr<T>, bool), AllocError> {
        let (bucket, hash, found) = self.locate::<X::Key>(X::key(&value));
        match found {
            Some(existing) => Ok((bucket, existing, false)),
            None => {
                let (bucket, node) = self.try_link_front(hash, value)?;
                Ok((bucket, node, true))
            },
        }
    }

    /// Looks up `key` and only builds a value out of it if no equal key is present. `make` must
    /// produce a value whose key is equal to `key`.
    pub(crate) fn try_insert_unique_with<F>(
        &mut self,
        key: X::Key,
        make: F,
    ) -> Result<(usize, NodePtr<T>, bool), AllocError>
    where
        F: FnOnce(X::Key) -> T,
    {
        let (bucket, hash, found) = self.locate::<X::Key>(&key);
        match found {
            Some(existing) => Ok((bucket, existing, false)),
            None => {
                let (bucket, node) = self.try_link_front(hash, make(key))?;
                Ok((bucket, node, true))
            },
        }
    }

    pub(crate) fn try_insert_equal_node(
        &mut self,
        value: T,
    ) -> Result<(usize, NodePtr<T>), AllocError> {
        let hash = self.hash_key(X::key(&value));
        self.try_insert_equal_hashed(hash, value)
    }

    /// Inserts `value` unless an element with an equal key is already present.
    ///
    /// Returns a cursor at the inserted element and true, or a cursor at the existing element and
    /// false. In the latter case `value` is dropped.
    ///
    /// # Errors
    /// Returns an [`AllocError`] if the node or a larger bucket array can't be allocated; the
    /// elements of the table are unchanged.
    pub fn try_insert_unique(
        &mut self,
        value: T,
    ) -> Result<(CursorMut<'_, T, X, S, E, A>, bool), AllocError> {
        let (bucket, node, inserted) = self.try_insert_unique_node(value)?;
        Ok((CursorMut::new(self, bucket, Some(node)), inserted))
    }

    /// Inserts `value` after every element with an equal key.
    ///
    /// # Errors
    /// Returns an [`AllocError`] if the node or a larger bucket array can't be allocated; the
    /// elements of the table are unchanged.
    pub fn try_insert_equal(
        &mut self,
        value: T,
    ) -> Result<CursorMut<'_, T, X, S, E, A>, AllocError> {
        let (bucket, node) = self.try_insert_equal_node(value)?;
        Ok(CursorMut::new(self, bucket, Some(node)))
    }

    pub fn find<Q>(&self, key: &Q) -> Cursor<'_, T, X, S, E, A>
    where
        X::Key: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        match self.locate(key) {
            (bucket, _, Some(node)) => Cursor::new(self, bucket, Some(node)),
            _ => Cursor::new(self, self.bucket_count(), None),
        }
    }

    pub fn find_mut<Q>(&mut self, key: &Q) -> CursorMut<'_, T, X, S, E, A>
    where
        X::Key: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        match self.locate(key) {
            (bucket, _, Some(node)) => CursorMut::new(self, bucket, Some(node)),
            _ => {
                let end = self.bucket_count();
                CursorMut::new(self, end, None)
            },
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&T>
    where
        X::Key: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        self.locate(key).2.map(|node| node.value())
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        X::Key: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        self.locate(key).2.is_some()
    }

    /// Iterates over every element with a key equal to `key`. They are always adjacent.
    pub fn equal_range<Q>(&self, key: &Q) -> Iter<'_, T>
    where
        X::Key: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        let (bucket, hash, first) = self.locate(key);
        Iter::new(&self.buckets, bucket, first, self.run_len(first, hash, key))
    }

    pub fn count<Q>(&self, key: &Q) -> usize
    where
        X::Key: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        let (_, hash, first) = self.locate(key);
        self.run_len(first, hash, key)
    }

    /// Removes the first element with a key equal to `key` and returns it.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<T>
    where
        X::Key: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        let (bucket, _, found) = self.locate(key);
        found.map(|node| self.remove_node(bucket, node))
    }

    /// Erases every element with a key equal to `key`, returning how many there were.
    pub fn erase<Q>(&mut self, key: &Q) -> usize
    where
        X::Key: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        let hash = self.hash_key(key);
        let bucket = index_for(hash, self.bucket_count());

        let mut erased = 0;
        let mut prev: Link<T> = None;
        let mut current = self.buckets[bucket];
        while let Some(node) = current {
            current = node.next();
            if self.key_matches(node, hash, key) {
                match prev {
                    Some(prev) => prev.set_next(current),
                    None => self.buckets[bucket] = current,
                }
                self.len -= 1;
                self.destroy_node(node);
                erased += 1;
            } else if erased > 0 {
                break;
            } else {
                prev = Some(node);
            }
        }
        erased
    }

    /// Compares two tables with unique keys: equal lengths, and every element of `self` has an
    /// equal element in `other`.
    pub(crate) fn eq_unique(&self, other: &HashTable<T, X, S, E, A>) -> bool
    where
        T: PartialEq,
    {
        self.len == other.len
            && self
                .iter()
                .all(|value| other.get::<X::Key>(X::key(value)).is_some_and(|found| found == value))
    }

    /// Compares two tables with repeated keys: every group of equal keys in `self` must be a
    /// permutation of the corresponding group in `other`.
    pub(crate) fn eq_multi(&self, other: &HashTable<T, X, S, E, A>) -> bool
    where
        T: PartialEq,
    {
        if self.len != other.len {
            return false;
        }

        self.iter().all(|value| {
            let mine = self.equal_range::<X::Key>(X::key(value));
            // Only compare each group once, from its first element.
            if mine.clone().next().is_some_and(|first| !ptr::eq(first, value)) {
                return true;
            }

            let theirs = other.equal_range::<X::Key>(X::key(value));
            mine.len() == theirs.len() && is_permutation(mine, theirs)
        })
    }
}

impl<T: Clone, X, S: Clone, E: Clone, A: Allocator> HashTable<T, X, S, E, A> {
    /// Creates a copy of the table with the same buckets, chain order and maximum load factor,
    /// using the allocator selected by [`Allocator::select_on_copy`].
    ///
    /// # Errors
    /// Returns an [`AllocError`] if any allocation fails. Everything allocated for the copy is
    /// released.
    pub fn try_clone(&self) -> Result<HashTable<T, X, S, E, A>, AllocError> {
        self.try_clone_in(self.traits.select_on_copy().into_allocator())
    }

    /// Creates a copy of the table using `alloc`.
    ///
    /// # Errors
    /// Returns an [`AllocError`] if any allocation fails.
    pub fn try_clone_in(&self, alloc: A) -> Result<HashTable<T, X, S, E, A>, AllocError> {
        let mut table = HashTable::try_with_buckets_in(
            self.bucket_count(),
            self.hasher.clone(),
            self.key_eq.clone(),
            alloc,
        )?;
        table.max_load_factor = self.max_load_factor;
        table.copy_from(self)?;
        Ok(table)
    }

    /// Copy-assigns `source` into `self`, adopting its allocator if the allocator propagates on
    /// copy.
    ///
    /// # Errors
    /// Returns an [`AllocError`] if any allocation fails, in which case `self` is unchanged.
    pub fn try_clone_from(&mut self, source: &HashTable<T, X, S, E, A>) -> Result<(), AllocError> {
        let mut traits = self.traits.clone();
        traits.copy_assign(&source.traits);
        *self = source.try_clone_in(traits.into_allocator())?;
        Ok(())
    }

    /// Copies every chain of `source` into the same bucket of `self`, which must be empty and have
    /// the same bucket count. Nodes are linked as they are made, so a failure leaves `self` whole.
    fn copy_from(&mut self, source: &HashTable<T, X, S, E, A>) -> Result<(), AllocError> {
        debug_assert!(self.is_empty() && self.bucket_count() == source.bucket_count());

        for bucket in 0..source.buckets.size() {
            let mut tail: Link<T> = None;
            let mut current = source.buckets[bucket];
            while let Some(source_node) = current {
                let value = HashNode::new(source_node.value().clone(), source_node.hash());
                let node = NodePtr(NodeGuard::new(&self.traits, value)?.into_raw());
                match tail {
                    Some(tail) => tail.set_next(Some(node)),
                    None => self.buckets[bucket] = Some(node),
                }
                tail = Some(node);
                self.len += 1;
                current = source_node.next();
            }
        }
        Ok(())
    }
}

impl<T, X, S, E, A: Allocator> Drop for HashTable<T, X, S, E, A> {
    fn drop(&mut self) {
        self.clear();
        // SAFETY: The buckets were allocated by this allocator and are never used again.
        unsafe { self.buckets.release(&self.traits.rebind()) };
    }
}

impl<T, X, S, E, A: Allocator> IntoIterator for HashTable<T, X, S, E, A> {
    type Item = T;

    type IntoIter = IntoIter<T, X, S, E, A>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            table: self,
            bucket: 0,
        }
    }
}

impl<'a, T, X, S, E, A: Allocator> IntoIterator for &'a HashTable<T, X, S, E, A> {
    type Item = &'a T;

    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// SAFETY: The table owns its nodes and bucket array exclusively, like a Box would.
unsafe impl<T: Send, X, S: Send, E: Send, A: Allocator + Send> Send
    for HashTable<T, X, S, E, A>
{
}

// SAFETY: Shared access to the table only hands out shared references to values.
unsafe impl<T: Sync, X, S: Sync, E: Sync, A: Allocator + Sync> Sync
    for HashTable<T, X, S, E, A>
{
}

impl<T: Debug, X, S, E, A: Allocator> Debug for HashTable<T, X, S, E, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashTable")
            .field("len", &self.len)
            .field("bucket_count", &self.bucket_count())
            .field("max_load_factor", &self.max_load_factor)
            .field_with("buckets", |f| {
                let mut buckets = f.debug_map();
                for (index, head) in self.buckets.iter().enumerate() {
                    if head.is_some() {
                        buckets.entry(&index, &LocalIter::new(*head));
                    }
                }
                buckets.finish()
            })
            .finish()
    }
}

const fn index_for(hash: u64, bucket_count: usize) -> usize {
    (hash % bucket_count as u64) as usize
}

/// Appends `node` to the end of the chain starting at `head`.
fn append<T>(head: &mut Link<T>, node: NodePtr<T>) {
    match *head {
        Some(mut tail) => {
            while let Some(next) = tail.next() {
                tail = next;
            }
            tail.set_next(Some(node));
        },
        None => *head = Some(node),
    }
}

fn is_permutation<T: PartialEq>(lhs: Iter<'_, T>, rhs: Iter<'_, T>) -> bool {
    lhs.clone().all(|value| {
        lhs.clone().filter(|other| *other == value).count()
            == rhs.clone().filter(|other| *other == value).count()
    })
}
