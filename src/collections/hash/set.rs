use std::borrow::Borrow;
use std::fmt::{self, Debug, Formatter};
use std::hash::{BuildHasher, Hash, RandomState};

use super::{Cursor, CursorMut, HashTable, IntoIter, Iter, LocalIter, MIN_BUCKETS};
use crate::alloc::{AllocError, Allocator, Global};
use crate::collections::key::{EqualTo, Identity, KeyEq};
use crate::util::result::ResultExtension;

/// A set of unique values which relies on the values implementing [`Hash`], or on a custom hasher
/// builder `S` and key equality `E`.
///
/// Values are stored in bucket chains, one allocation per value plus one for the bucket array,
/// through the allocator `A`. The bucket array is allocated when the set is created, so unlike the
/// tree containers even an empty HashSet owns memory.
///
/// It is a logic error for a value to be modified in a way that changes its hash or equality
/// while it is in the set.
///
/// # Time Complexity
/// For this analysis of time complexity, variables are defined as follows:
/// - `n`: The number of items in the HashSet.
///
/// | Method | Complexity |
/// |-|-|
/// | `len` | `O(1)` |
/// | `insert` | `O(1)`**, `O(n)` |
/// | `contains` | `O(1)`* |
/// | `remove` | `O(1)`* |
/// | `rehash` / `reserve` | `O(n)` |
///
/// \* In the event of a hash collision, these take additional time to walk the bucket's chain.
///
/// \** If the new value would push the load factor over the maximum, `insert` rehashes first and
/// takes `O(n)`.
///
/// # Examples
/// ```
/// # use allocated_std::collections::hash::HashSet;
/// let mut set = HashSet::from(["a", "b"]);
/// assert!(!set.insert("a").1);
/// assert!(set.contains("b"));
/// assert_eq!(set.bucket_count(), 53);
/// ```
pub struct HashSet<T, S = RandomState, E = EqualTo, A: Allocator = Global> {
    pub(crate) table: HashTable<T, Identity, S, E, A>,
}

impl<T> HashSet<T> {
    /// Creates an empty HashSet with the default hasher and the minimum number of buckets.
    pub fn new() -> HashSet<T> {
        HashSet::with_hasher(RandomState::new())
    }

    /// Creates an empty HashSet with at least `buckets` buckets.
    pub fn with_buckets(buckets: usize) -> HashSet<T> {
        HashSet::with_buckets_and_hasher_in(buckets, RandomState::new(), EqualTo, Global)
    }
}

impl<T, A: Allocator> HashSet<T, RandomState, EqualTo, A> {
    /// Creates an empty HashSet which allocates through `alloc`.
    pub fn new_in(alloc: A) -> HashSet<T, RandomState, EqualTo, A> {
        HashSet::with_buckets_and_hasher_in(MIN_BUCKETS, RandomState::new(), EqualTo, alloc)
    }
}

impl<T, S> HashSet<T, S> {
    pub fn with_hasher(hasher: S) -> HashSet<T, S> {
        HashSet::with_hasher_and_key_eq(hasher, EqualTo)
    }
}

impl<T, S, E> HashSet<T, S, E> {
    pub fn with_hasher_and_key_eq(hasher: S, key_eq: E) -> HashSet<T, S, E> {
        HashSet::with_buckets_and_hasher_in(MIN_BUCKETS, hasher, key_eq, Global)
    }
}

impl<T, S, E, A: Allocator> HashSet<T, S, E, A> {
    /// Creates an empty HashSet with at least `buckets` buckets, using the provided functors and
    /// allocator.
    ///
    /// The bucket array is allocated immediately and the process aborts if that fails. See
    /// [`HashSet::try_with_buckets_and_hasher_in`] for a fallible version.
    pub fn with_buckets_and_hasher_in(
        buckets: usize,
        hasher: S,
        key_eq: E,
        alloc: A,
    ) -> HashSet<T, S, E, A> {
        HashSet {
            table: HashTable::with_buckets_in(buckets, hasher, key_eq, alloc),
        }
    }

    /// # Errors
    /// Returns an [`AllocError`] if the bucket array can't be allocated.
    pub fn try_with_buckets_and_hasher_in(
        buckets: usize,
        hasher: S,
        key_eq: E,
        alloc: A,
    ) -> Result<HashSet<T, S, E, A>, AllocError> {
        Ok(HashSet {
            table: HashTable::try_with_buckets_in(buckets, hasher, key_eq, alloc)?,
        })
    }

    pub const fn len(&self) -> usize {
        self.table.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub const fn max_size(&self) -> usize {
        self.table.max_size()
    }

    pub const fn allocator(&self) -> &A {
        self.table.allocator()
    }

    pub const fn hasher(&self) -> &S {
        self.table.hasher()
    }

    pub const fn key_eq(&self) -> &E {
        self.table.key_eq()
    }

    pub const fn bucket_count(&self) -> usize {
        self.table.bucket_count()
    }

    pub const fn max_bucket_count(&self) -> usize {
        self.table.max_bucket_count()
    }

    /// # Panics
    /// Panics if `index` is not less than the bucket count.
    pub fn bucket_size(&self, index: usize) -> usize {
        self.table.bucket_size(index)
    }

    /// Iterates over the values in bucket `index`.
    ///
    /// # Panics
    /// Panics if `index` is not less than the bucket count.
    pub fn bucket_iter(&self, index: usize) -> LocalIter<'_, T> {
        self.table.bucket_iter(index)
    }

    pub fn load_factor(&self) -> f32 {
        self.table.load_factor()
    }

    pub const fn max_load_factor(&self) -> f32 {
        self.table.max_load_factor()
    }

    /// Sets the maximum load factor. NaN and values which aren't positive are ignored.
    pub fn set_max_load_factor(&mut self, max_load_factor: f32) {
        self.table.set_max_load_factor(max_load_factor);
    }

    /// Returns an iterator over the values, in no particular order.
    pub fn iter(&self) -> Iter<'_, T> {
        self.table.iter()
    }

    pub fn cursor_front(&self) -> Cursor<'_, T, Identity, S, E, A> {
        self.table.cursor_front()
    }

    pub fn cursor_front_mut(&mut self) -> CursorMut<'_, T, Identity, S, E, A> {
        self.table.cursor_front_mut()
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }

    pub fn retain<F: FnMut(&T) -> bool>(&mut self, keep: F) {
        self.table.retain(keep);
    }

    /// Exchanges the contents of two sets. The allocators are exchanged too if they propagate on
    /// swap, otherwise they must be equal.
    pub fn swap(&mut self, other: &mut HashSet<T, S, E, A>) {
        self.table.swap(&mut other.table);
    }

    /// Rebuilds the set with at least `buckets` buckets, unless that would be too few for the
    /// values it holds.
    ///
    /// # Panics
    /// Panics if the bucket array can't be allocated.
    pub fn rehash(&mut self, buckets: usize) {
        self.table.rehash(buckets);
    }

    /// # Errors
    /// Returns an [`AllocError`] if the bucket array can't be allocated; the set is unchanged.
    pub fn try_rehash(&mut self, buckets: usize) -> Result<(), AllocError> {
        self.table.try_rehash(buckets)
    }

    /// Makes room for `len` values in total without exceeding the maximum load factor.
    ///
    /// # Panics
    /// Panics if the bucket array can't be allocated.
    pub fn reserve(&mut self, len: usize) {
        self.table.reserve(len);
    }

    /// # Errors
    /// Returns an [`AllocError`] if the bucket array can't be allocated; the set is unchanged.
    pub fn try_reserve(&mut self, len: usize) -> Result<(), AllocError> {
        self.table.try_reserve(len)
    }
}

impl<T: Hash, S: BuildHasher, E: KeyEq<T>, A: Allocator> HashSet<T, S, E, A> {
    /// Inserts `value` if the set doesn't already contain an equal value. Returns a cursor at the
    /// value in the set, and whether `value` was inserted.
    ///
    /// # Panics
    /// Panics if the allocator fails to allocate a node or a larger bucket array.
    pub fn insert(&mut self, value: T) -> (CursorMut<'_, T, Identity, S, E, A>, bool) {
        self.table.try_insert_unique(value).throw()
    }

    /// # Errors
    /// Returns an [`AllocError`] if the node or a larger bucket array can't be allocated; the
    /// values in the set are unchanged.
    pub fn try_insert(
        &mut self,
        value: T,
    ) -> Result<(CursorMut<'_, T, Identity, S, E, A>, bool), AllocError> {
        self.table.try_insert_unique(value)
    }

    /// Returns a cursor at the value equal to `value`, or at the end if there is none.
    pub fn find<Q>(&self, value: &Q) -> Cursor<'_, T, Identity, S, E, A>
    where
        T: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        self.table.find(value)
    }

    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        self.table.get(value)
    }

    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        self.table.contains(value)
    }

    /// Returns the number of values equal to `value`, which is at most one.
    pub fn count<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        usize::from(self.contains(value))
    }

    pub fn equal_range<Q>(&self, value: &Q) -> Iter<'_, T>
    where
        T: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        self.table.equal_range(value)
    }

    /// Returns the index of the bucket `value` belongs in.
    pub fn bucket<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: Hash + ?Sized,
    {
        self.table.bucket(value)
    }

    /// Removes the value equal to `value` and returns it.
    pub fn take<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        self.table.remove(value)
    }

    /// Removes the value equal to `value`, returning true if there was one.
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        self.table.erase(value) != 0
    }

    /// Move-assigns `source` into `self`. If the allocators neither propagate on move nor compare
    /// equal, each value is moved into a node from `self`'s allocator.
    ///
    /// # Panics
    /// Panics if relocating a value fails to allocate.
    pub fn assign(&mut self, source: HashSet<T, S, E, A>) {
        self.table.try_assign(source.table).throw()
    }
}

impl<T: Clone, S: Clone, E: Clone, A: Allocator> HashSet<T, S, E, A> {
    /// Creates a copy of the set which allocates through `alloc`.
    ///
    /// # Panics
    /// Panics if an allocation fails.
    pub fn clone_in(&self, alloc: A) -> HashSet<T, S, E, A> {
        HashSet {
            table: self.table.try_clone_in(alloc).throw(),
        }
    }

    /// # Errors
    /// Returns an [`AllocError`] if an allocation fails.
    pub fn try_clone(&self) -> Result<HashSet<T, S, E, A>, AllocError> {
        Ok(HashSet {
            table: self.table.try_clone()?,
        })
    }
}

impl<T: Clone, S: Clone, E: Clone, A: Allocator> Clone for HashSet<T, S, E, A> {
    fn clone(&self) -> Self {
        self.try_clone().throw()
    }

    fn clone_from(&mut self, source: &Self) {
        self.table.try_clone_from(&source.table).throw()
    }
}

impl<T, S: Default, E: Default, A: Allocator + Default> Default for HashSet<T, S, E, A> {
    fn default() -> Self {
        HashSet::with_buckets_and_hasher_in(MIN_BUCKETS, S::default(), E::default(), A::default())
    }
}

impl<T: Hash, S: BuildHasher, E: KeyEq<T>, A: Allocator> Extend<T> for HashSet<T, S, E, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T, S, E, A> Extend<&'a T> for HashSet<T, S, E, A>
where
    T: Hash + Copy + 'a,
    S: BuildHasher,
    E: KeyEq<T>,
    A: Allocator,
{
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T, S, E, A> FromIterator<T> for HashSet<T, S, E, A>
where
    T: Hash,
    S: BuildHasher + Default,
    E: KeyEq<T> + Default,
    A: Allocator + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = HashSet::default();
        set.extend(iter);
        set
    }
}

impl<T: Hash + Eq, const N: usize> From<[T; N]> for HashSet<T> {
    fn from(values: [T; N]) -> Self {
        let mut set = HashSet::with_buckets(N);
        set.extend(values);
        set
    }
}

impl<T, S, E, A: Allocator> IntoIterator for HashSet<T, S, E, A> {
    type Item = T;

    type IntoIter = IntoIter<T, Identity, S, E, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.table.into_iter()
    }
}

impl<'a, T, S, E, A: Allocator> IntoIterator for &'a HashSet<T, S, E, A> {
    type Item = &'a T;

    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Two sets are equal if they hold the same values, regardless of their bucket layout.
impl<T, S, E, A> PartialEq for HashSet<T, S, E, A>
where
    T: Hash + PartialEq,
    S: BuildHasher,
    E: KeyEq<T>,
    A: Allocator,
{
    fn eq(&self, other: &Self) -> bool {
        self.table.eq_unique(&other.table)
    }
}

impl<T, S, E, A> Eq for HashSet<T, S, E, A>
where
    T: Hash + Eq,
    S: BuildHasher,
    E: KeyEq<T>,
    A: Allocator,
{
}

impl<T: Debug, S, E, A: Allocator> Debug for HashSet<T, S, E, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// An unordered collection of values in which equal values may repeat.
///
/// Equal values are always stored next to each other, in insertion order, so
/// [`HashMultiSet::equal_range`] is a single contiguous run.
///
/// # Examples
/// ```
/// # use allocated_std::collections::hash::HashMultiSet;
/// let mut set = HashMultiSet::from([3, 1, 3]);
/// set.insert(3);
/// assert_eq!(set.count(&3), 3);
/// assert_eq!(set.equal_range(&3).len(), 3);
/// ```
pub struct HashMultiSet<T, S = RandomState, E = EqualTo, A: Allocator = Global> {
    pub(crate) table: HashTable<T, Identity, S, E, A>,
}

impl<T> HashMultiSet<T> {
    pub fn new() -> HashMultiSet<T> {
        HashMultiSet::with_hasher(RandomState::new())
    }

    pub fn with_buckets(buckets: usize) -> HashMultiSet<T> {
        HashMultiSet::with_buckets_and_hasher_in(buckets, RandomState::new(), EqualTo, Global)
    }
}

impl<T, A: Allocator> HashMultiSet<T, RandomState, EqualTo, A> {
    pub fn new_in(alloc: A) -> HashMultiSet<T, RandomState, EqualTo, A> {
        HashMultiSet::with_buckets_and_hasher_in(MIN_BUCKETS, RandomState::new(), EqualTo, alloc)
    }
}

impl<T, S> HashMultiSet<T, S> {
    pub fn with_hasher(hasher: S) -> HashMultiSet<T, S> {
        HashMultiSet::with_hasher_and_key_eq(hasher, EqualTo)
    }
}

impl<T, S, E> HashMultiSet<T, S, E> {
    pub fn with_hasher_and_key_eq(hasher: S, key_eq: E) -> HashMultiSet<T, S, E> {
        HashMultiSet::with_buckets_and_hasher_in(MIN_BUCKETS, hasher, key_eq, Global)
    }
}

impl<T, S, E, A: Allocator> HashMultiSet<T, S, E, A> {
    pub fn with_buckets_and_hasher_in(
        buckets: usize,
        hasher: S,
        key_eq: E,
        alloc: A,
    ) -> HashMultiSet<T, S, E, A> {
        HashMultiSet {
            table: HashTable::with_buckets_in(buckets, hasher, key_eq, alloc),
        }
    }

    /// # Errors
    /// Returns an [`AllocError`] if the bucket array can't be allocated.
    pub fn try_with_buckets_and_hasher_in(
        buckets: usize,
        hasher: S,
        key_eq: E,
        alloc: A,
    ) -> Result<HashMultiSet<T, S, E, A>, AllocError> {
        Ok(HashMultiSet {
            table: HashTable::try_with_buckets_in(buckets, hasher, key_eq, alloc)?,
        })
    }

    pub const fn len(&self) -> usize {
        self.table.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub const fn max_size(&self) -> usize {
        self.table.max_size()
    }

    pub const fn allocator(&self) -> &A {
        self.table.allocator()
    }

    pub const fn hasher(&self) -> &S {
        self.table.hasher()
    }

    pub const fn key_eq(&self) -> &E {
        self.table.key_eq()
    }

    pub const fn bucket_count(&self) -> usize {
        self.table.bucket_count()
    }

    pub const fn max_bucket_count(&self) -> usize {
        self.table.max_bucket_count()
    }

    /// # Panics
    /// Panics if `index` is not less than the bucket count.
    pub fn bucket_size(&self, index: usize) -> usize {
        self.table.bucket_size(index)
    }

    /// # Panics
    /// Panics if `index` is not less than the bucket count.
    pub fn bucket_iter(&self, index: usize) -> LocalIter<'_, T> {
        self.table.bucket_iter(index)
    }

    pub fn load_factor(&self) -> f32 {
        self.table.load_factor()
    }

    pub const fn max_load_factor(&self) -> f32 {
        self.table.max_load_factor()
    }

    pub fn set_max_load_factor(&mut self, max_load_factor: f32) {
        self.table.set_max_load_factor(max_load_factor);
    }

    pub fn iter(&self) -> Iter<'_, T> {
        self.table.iter()
    }

    pub fn cursor_front(&self) -> Cursor<'_, T, Identity, S, E, A> {
        self.table.cursor_front()
    }

    pub fn cursor_front_mut(&mut self) -> CursorMut<'_, T, Identity, S, E, A> {
        self.table.cursor_front_mut()
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }

    pub fn retain<F: FnMut(&T) -> bool>(&mut self, keep: F) {
        self.table.retain(keep);
    }

    pub fn swap(&mut self, other: &mut HashMultiSet<T, S, E, A>) {
        self.table.swap(&mut other.table);
    }

    /// # Panics
    /// Panics if the bucket array can't be allocated.
    pub fn rehash(&mut self, buckets: usize) {
        self.table.rehash(buckets);
    }

    /// # Errors
    /// Returns an [`AllocError`] if the bucket array can't be allocated; the set is unchanged.
    pub fn try_rehash(&mut self, buckets: usize) -> Result<(), AllocError> {
        self.table.try_rehash(buckets)
    }

    /// # Panics
    /// Panics if the bucket array can't be allocated.
    pub fn reserve(&mut self, len: usize) {
        self.table.reserve(len);
    }

    /// # Errors
    /// Returns an [`AllocError`] if the bucket array can't be allocated; the set is unchanged.
    pub fn try_reserve(&mut self, len: usize) -> Result<(), AllocError> {
        self.table.try_reserve(len)
    }
}

impl<T: Hash, S: BuildHasher, E: KeyEq<T>, A: Allocator> HashMultiSet<T, S, E, A> {
    /// Inserts `value` after any values equal to it, returning a cursor at the new value.
    ///
    /// # Panics
    /// Panics if the allocator fails to allocate a node or a larger bucket array.
    pub fn insert(&mut self, value: T) -> CursorMut<'_, T, Identity, S, E, A> {
        self.table.try_insert_equal(value).throw()
    }

    /// # Errors
    /// Returns an [`AllocError`] if the node or a larger bucket array can't be allocated; the
    /// values in the set are unchanged.
    pub fn try_insert(
        &mut self,
        value: T,
    ) -> Result<CursorMut<'_, T, Identity, S, E, A>, AllocError> {
        self.table.try_insert_equal(value)
    }

    /// Returns a cursor at the first value equal to `value`, or at the end if there is none.
    pub fn find<Q>(&self, value: &Q) -> Cursor<'_, T, Identity, S, E, A>
    where
        T: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        self.table.find(value)
    }

    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        self.table.get(value)
    }

    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        self.table.contains(value)
    }

    pub fn count<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        self.table.count(value)
    }

    /// Returns an iterator over every value equal to `value`, in insertion order.
    pub fn equal_range<Q>(&self, value: &Q) -> Iter<'_, T>
    where
        T: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        self.table.equal_range(value)
    }

    pub fn bucket<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: Hash + ?Sized,
    {
        self.table.bucket(value)
    }

    /// Removes the first value equal to `value` and returns it.
    pub fn take<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        self.table.remove(value)
    }

    /// Removes every value equal to `value`, returning how many were removed.
    pub fn remove<Q>(&mut self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        self.table.erase(value)
    }

    /// Move-assigns `source` into `self`, see [`HashSet::assign`].
    ///
    /// # Panics
    /// Panics if relocating a value fails to allocate.
    pub fn assign(&mut self, source: HashMultiSet<T, S, E, A>) {
        self.table.try_assign(source.table).throw()
    }
}

impl<T: Clone, S: Clone, E: Clone, A: Allocator> HashMultiSet<T, S, E, A> {
    /// # Panics
    /// Panics if an allocation fails.
    pub fn clone_in(&self, alloc: A) -> HashMultiSet<T, S, E, A> {
        HashMultiSet {
            table: self.table.try_clone_in(alloc).throw(),
        }
    }

    /// # Errors
    /// Returns an [`AllocError`] if an allocation fails.
    pub fn try_clone(&self) -> Result<HashMultiSet<T, S, E, A>, AllocError> {
        Ok(HashMultiSet {
            table: self.table.try_clone()?,
        })
    }
}

impl<T: Clone, S: Clone, E: Clone, A: Allocator> Clone for HashMultiSet<T, S, E, A> {
    fn clone(&self) -> Self {
        self.try_clone().throw()
    }

    fn clone_from(&mut self, source: &Self) {
        self.table.try_clone_from(&source.table).throw()
    }
}

impl<T, S: Default, E: Default, A: Allocator + Default> Default for HashMultiSet<T, S, E, A> {
    fn default() -> Self {
        HashMultiSet::with_buckets_and_hasher_in(
            MIN_BUCKETS,
            S::default(),
            E::default(),
            A::default(),
        )
    }
}

impl<T: Hash, S: BuildHasher, E: KeyEq<T>, A: Allocator> Extend<T> for HashMultiSet<T, S, E, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T, S, E, A> Extend<&'a T> for HashMultiSet<T, S, E, A>
where
    T: Hash + Copy + 'a,
    S: BuildHasher,
    E: KeyEq<T>,
    A: Allocator,
{
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T, S, E, A> FromIterator<T> for HashMultiSet<T, S, E, A>
where
    T: Hash,
    S: BuildHasher + Default,
    E: KeyEq<T> + Default,
    A: Allocator + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = HashMultiSet::default();
        set.extend(iter);
        set
    }
}

impl<T: Hash + Eq, const N: usize> From<[T; N]> for HashMultiSet<T> {
    fn from(values: [T; N]) -> Self {
        let mut set = HashMultiSet::with_buckets(N);
        set.extend(values);
        set
    }
}

impl<T, S, E, A: Allocator> IntoIterator for HashMultiSet<T, S, E, A> {
    type Item = T;

    type IntoIter = IntoIter<T, Identity, S, E, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.table.into_iter()
    }
}

impl<'a, T, S, E, A: Allocator> IntoIterator for &'a HashMultiSet<T, S, E, A> {
    type Item = &'a T;

    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Two multisets are equal if every group of equal values in one is a permutation of the
/// corresponding group in the other.
impl<T, S, E, A> PartialEq for HashMultiSet<T, S, E, A>
where
    T: Hash + PartialEq,
    S: BuildHasher,
    E: KeyEq<T>,
    A: Allocator,
{
    fn eq(&self, other: &Self) -> bool {
        self.table.eq_multi(&other.table)
    }
}

impl<T, S, E, A> Eq for HashMultiSet<T, S, E, A>
where
    T: Hash + Eq,
    S: BuildHasher,
    E: KeyEq<T>,
    A: Allocator,
{
}

impl<T: Debug, S, E, A: Allocator> Debug for HashMultiSet<T, S, E, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
