use std::borrow::Borrow;
use std::fmt::{self, Debug, Formatter};
use std::hash::{BuildHasher, Hash, RandomState};
use std::marker::PhantomData;
use std::ops::Index;

use super::{
    Cursor, CursorMut, HashTable, IntoIter, Iter, IterMut, Keys, LocalIter, MIN_BUCKETS, Values,
    ValuesMut,
};
use crate::alloc::{AllocError, Allocator, Global};
use crate::collections::key::{EqualTo, First, KeyEq};
use crate::util::error::KeyNotFound;
use crate::util::result::ResultExtension;

/// A map from unique keys to values which relies on the keys implementing [`Hash`], or on a custom
/// hasher builder `S` and key equality `E`.
///
/// Entries are stored as `(K, V)` pairs in bucket chains, one allocation per entry plus one for
/// the bucket array, through the allocator `A`. Inserting a key which is already present keeps the
/// existing value.
///
/// It is a logic error for a key to be manipulated in a way that changes its hash while it is in
/// the map. Because of this, HashMap's API prevents mutable access to its keys.
///
/// # Time Complexity
/// For this analysis of time complexity, variables are defined as follows:
/// - `n`: The number of entries in the HashMap.
///
/// | Method | Complexity |
/// |-|-|
/// | `len` | `O(1)` |
/// | `insert` | `O(1)`**, `O(n)` |
/// | `get` / `at` | `O(1)`* |
/// | `get_or_insert_with` | `O(1)`**, `O(n)` |
/// | `remove` | `O(1)`* |
/// | `rehash` / `reserve` | `O(n)` |
///
/// \* In the event of a hash collision, these take additional time to walk the bucket's chain.
///
/// \** If the new entry would push the load factor over the maximum, the map rehashes first and
/// the insertion takes `O(n)`.
///
/// # Examples
/// ```
/// # use allocated_std::collections::hash::HashMap;
/// let map = HashMap::from([(1, "a"), (2, "b"), (1, "c")]);
/// assert_eq!(map.len(), 2);
/// assert_eq!(map[&1], "a");
/// assert!(map.at(&3).is_err());
/// ```
pub struct HashMap<K, V, S = RandomState, E = EqualTo, A: Allocator = Global> {
    pub(crate) table: HashTable<(K, V), First, S, E, A>,
}

impl<K, V> HashMap<K, V> {
    /// Creates an empty HashMap with the default hasher and the minimum number of buckets.
    pub fn new() -> HashMap<K, V> {
        HashMap::with_hasher(RandomState::new())
    }

    /// Creates an empty HashMap with at least `buckets` buckets.
    pub fn with_buckets(buckets: usize) -> HashMap<K, V> {
        HashMap::with_buckets_and_hasher_in(buckets, RandomState::new(), EqualTo, Global)
    }
}

impl<K, V, A: Allocator> HashMap<K, V, RandomState, EqualTo, A> {
    /// Creates an empty HashMap which allocates through `alloc`.
    pub fn new_in(alloc: A) -> HashMap<K, V, RandomState, EqualTo, A> {
        HashMap::with_buckets_and_hasher_in(MIN_BUCKETS, RandomState::new(), EqualTo, alloc)
    }
}

impl<K, V, S> HashMap<K, V, S> {
    pub fn with_hasher(hasher: S) -> HashMap<K, V, S> {
        HashMap::with_hasher_and_key_eq(hasher, EqualTo)
    }
}

impl<K, V, S, E> HashMap<K, V, S, E> {
    pub fn with_hasher_and_key_eq(hasher: S, key_eq: E) -> HashMap<K, V, S, E> {
        HashMap::with_buckets_and_hasher_in(MIN_BUCKETS, hasher, key_eq, Global)
    }
}

impl<K, V, S, E, A: Allocator> HashMap<K, V, S, E, A> {
    /// Creates an empty HashMap with at least `buckets` buckets, using the provided functors and
    /// allocator.
    ///
    /// The bucket array is allocated immediately and the process aborts if that fails. See
    /// [`HashMap::try_with_buckets_and_hasher_in`] for a fallible version.
    pub fn with_buckets_and_hasher_in(
        buckets: usize,
        hasher: S,
        key_eq: E,
        alloc: A,
    ) -> HashMap<K, V, S, E, A> {
        HashMap {
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
    ) -> Result<HashMap<K, V, S, E, A>, AllocError> {
        Ok(HashMap {
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

    /// Iterates over the entries in bucket `index`.
    ///
    /// # Panics
    /// Panics if `index` is not less than the bucket count.
    pub fn bucket_iter(&self, index: usize) -> LocalIter<'_, (K, V)> {
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

    /// Returns an iterator over the entries, in no particular order.
    pub fn iter(&self) -> Iter<'_, (K, V)> {
        self.table.iter()
    }

    /// Returns an iterator over the entries, with mutable access to the values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.table.iter(),
            _phantom: PhantomData,
        }
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys(self.iter())
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values(self.iter())
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut(self.iter_mut())
    }

    pub fn cursor_front(&self) -> Cursor<'_, (K, V), First, S, E, A> {
        self.table.cursor_front()
    }

    pub fn cursor_front_mut(&mut self) -> CursorMut<'_, (K, V), First, S, E, A> {
        self.table.cursor_front_mut()
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Keeps only the entries for which `keep` returns true.
    pub fn retain<F: FnMut(&K, &V) -> bool>(&mut self, mut keep: F) {
        self.table.retain(|(key, value)| keep(key, value));
    }

    /// Exchanges the contents of two maps. The allocators are exchanged too if they propagate on
    /// swap, otherwise they must be equal.
    pub fn swap(&mut self, other: &mut HashMap<K, V, S, E, A>) {
        self.table.swap(&mut other.table);
    }

    /// Rebuilds the map with at least `buckets` buckets, unless that would be too few for the
    /// entries it holds.
    ///
    /// # Panics
    /// Panics if the bucket array can't be allocated.
    pub fn rehash(&mut self, buckets: usize) {
        self.table.rehash(buckets);
    }

    /// # Errors
    /// Returns an [`AllocError`] if the bucket array can't be allocated; the map is unchanged.
    pub fn try_rehash(&mut self, buckets: usize) -> Result<(), AllocError> {
        self.table.try_rehash(buckets)
    }

    /// Makes room for `len` entries in total without exceeding the maximum load factor.
    ///
    /// # Panics
    /// Panics if the bucket array can't be allocated.
    pub fn reserve(&mut self, len: usize) {
        self.table.reserve(len);
    }

    /// # Errors
    /// Returns an [`AllocError`] if the bucket array can't be allocated; the map is unchanged.
    pub fn try_reserve(&mut self, len: usize) -> Result<(), AllocError> {
        self.table.try_reserve(len)
    }
}

impl<K: Hash, V, S: BuildHasher, E: KeyEq<K>, A: Allocator> HashMap<K, V, S, E, A> {
    /// Inserts the entry if the map doesn't already contain `key`. Returns a cursor at the entry
    /// for `key`, and whether the new entry was inserted. An existing value is left untouched.
    ///
    /// # Panics
    /// Panics if the allocator fails to allocate a node or a larger bucket array.
    pub fn insert(&mut self, key: K, value: V) -> (CursorMut<'_, (K, V), First, S, E, A>, bool) {
        self.table.try_insert_unique((key, value)).throw()
    }

    /// # Errors
    /// Returns an [`AllocError`] if the node or a larger bucket array can't be allocated; the
    /// entries of the map are unchanged.
    pub fn try_insert(
        &mut self,
        key: K,
        value: V,
    ) -> Result<(CursorMut<'_, (K, V), First, S, E, A>, bool), AllocError> {
        self.table.try_insert_unique((key, value))
    }

    /// Returns a mutable reference to the value for `key`, inserting the result of `make` first if
    /// the key is absent. `make` is only called when an entry is inserted.
    ///
    /// # Panics
    /// Panics if the allocator fails to allocate a node or a larger bucket array.
    pub fn get_or_insert_with<F: FnOnce() -> V>(&mut self, key: K, make: F) -> &mut V {
        self.try_get_or_insert_with(key, make).throw()
    }

    /// Returns a mutable reference to the value for `key`, inserting [`V::default`](Default) first
    /// if the key is absent.
    ///
    /// # Panics
    /// Panics if the allocator fails to allocate a node or a larger bucket array.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.get_or_insert_with(key, V::default)
    }

    /// # Errors
    /// Returns an [`AllocError`] if the key is absent and the entry can't be allocated.
    pub fn try_get_or_insert_with<F: FnOnce() -> V>(
        &mut self,
        key: K,
        make: F,
    ) -> Result<&mut V, AllocError> {
        let (_, node, _) = self.table.try_insert_unique_with(key, |key| (key, make()))?;
        Ok(&mut node.value_mut().1)
    }

    /// Returns a cursor at the entry for `key`, or at the end if there is none.
    pub fn find<Q>(&self, key: &Q) -> Cursor<'_, (K, V), First, S, E, A>
    where
        K: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        self.table.find(key)
    }

    pub fn find_mut<Q>(&mut self, key: &Q) -> CursorMut<'_, (K, V), First, S, E, A>
    where
        K: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        self.table.find_mut(key)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        self.table.get(key).map(|(_, value)| value)
    }

    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        self.table.get(key).map(|(key, value)| (key, value))
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        self.table.find_mut(key).into_value_mut()
    }

    /// Returns the value for `key`.
    ///
    /// # Errors
    /// Returns [`KeyNotFound`] if the map has no entry for `key`.
    pub fn at<Q>(&self, key: &Q) -> Result<&V, KeyNotFound>
    where
        K: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        self.get(key).ok_or(KeyNotFound)
    }

    /// # Errors
    /// Returns [`KeyNotFound`] if the map has no entry for `key`.
    pub fn at_mut<Q>(&mut self, key: &Q) -> Result<&mut V, KeyNotFound>
    where
        K: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        self.get_mut(key).ok_or(KeyNotFound)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        self.table.contains(key)
    }

    /// Returns the number of entries for `key`, which is at most one.
    pub fn count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        usize::from(self.contains(key))
    }

    pub fn equal_range<Q>(&self, key: &Q) -> Iter<'_, (K, V)>
    where
        K: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        self.table.equal_range(key)
    }

    /// Returns the index of the bucket `key` belongs in.
    pub fn bucket<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
    {
        self.table.bucket(key)
    }

    /// Removes the entry for `key`, returning it if it exists.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        self.table.remove(key)
    }

    /// Removes the entry for `key`, returning the value if it exists.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes the entry for `key`, returning how many entries were removed.
    pub fn erase<Q>(&mut self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        self.table.erase(key)
    }

    /// Move-assigns `source` into `self`. If the allocators neither propagate on move nor compare
    /// equal, each entry is moved into a node from `self`'s allocator.
    ///
    /// # Panics
    /// Panics if relocating an entry fails to allocate.
    pub fn assign(&mut self, source: HashMap<K, V, S, E, A>) {
        self.table.try_assign(source.table).throw()
    }
}

impl<K: Clone, V: Clone, S: Clone, E: Clone, A: Allocator> HashMap<K, V, S, E, A> {
    /// Creates a copy of the map which allocates through `alloc`.
    ///
    /// # Panics
    /// Panics if an allocation fails.
    pub fn clone_in(&self, alloc: A) -> HashMap<K, V, S, E, A> {
        HashMap {
            table: self.table.try_clone_in(alloc).throw(),
        }
    }

    /// # Errors
    /// Returns an [`AllocError`] if an allocation fails.
    pub fn try_clone(&self) -> Result<HashMap<K, V, S, E, A>, AllocError> {
        Ok(HashMap {
            table: self.table.try_clone()?,
        })
    }
}

impl<K: Clone, V: Clone, S: Clone, E: Clone, A: Allocator> Clone for HashMap<K, V, S, E, A> {
    fn clone(&self) -> Self {
        self.try_clone().throw()
    }

    fn clone_from(&mut self, source: &Self) {
        self.table.try_clone_from(&source.table).throw()
    }
}

impl<K, V, S: Default, E: Default, A: Allocator + Default> Default for HashMap<K, V, S, E, A> {
    fn default() -> Self {
        HashMap::with_buckets_and_hasher_in(MIN_BUCKETS, S::default(), E::default(), A::default())
    }
}

impl<K, Q, V, S, E, A> Index<&Q> for HashMap<K, V, S, E, A>
where
    K: Hash + Borrow<Q>,
    S: BuildHasher,
    E: KeyEq<K> + KeyEq<Q>,
    A: Allocator,
    Q: Hash + ?Sized,
{
    type Output = V;

    fn index(&self, key: &Q) -> &V {
        self.at(key).throw()
    }
}

impl<K: Hash, V, S: BuildHasher, E: KeyEq<K>, A: Allocator> Extend<(K, V)>
    for HashMap<K, V, S, E, A>
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V, S, E, A> FromIterator<(K, V)> for HashMap<K, V, S, E, A>
where
    K: Hash,
    S: BuildHasher + Default,
    E: KeyEq<K> + Default,
    A: Allocator + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = HashMap::default();
        map.extend(iter);
        map
    }
}

impl<K: Hash + Eq, V, const N: usize> From<[(K, V); N]> for HashMap<K, V> {
    fn from(entries: [(K, V); N]) -> Self {
        let mut map = HashMap::with_buckets(N);
        map.extend(entries);
        map
    }
}

impl<K, V, S, E, A: Allocator> IntoIterator for HashMap<K, V, S, E, A> {
    type Item = (K, V);

    type IntoIter = IntoIter<(K, V), First, S, E, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.table.into_iter()
    }
}

impl<'a, K, V, S, E, A: Allocator> IntoIterator for &'a HashMap<K, V, S, E, A> {
    type Item = &'a (K, V);

    type IntoIter = Iter<'a, (K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Two maps are equal if they hold the same entries, regardless of their bucket layout.
impl<K, V, S, E, A> PartialEq for HashMap<K, V, S, E, A>
where
    K: Hash + PartialEq,
    V: PartialEq,
    S: BuildHasher,
    E: KeyEq<K>,
    A: Allocator,
{
    fn eq(&self, other: &Self) -> bool {
        self.table.eq_unique(&other.table)
    }
}

impl<K, V, S, E, A> Eq for HashMap<K, V, S, E, A>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
    E: KeyEq<K>,
    A: Allocator,
{
}

impl<K: Debug, V: Debug, S, E, A: Allocator> Debug for HashMap<K, V, S, E, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter().map(|(key, value)| (key, value))).finish()
    }
}

/// An unordered map in which keys may repeat.
///
/// Entries with equal keys are always stored next to each other, in insertion order, so
/// [`HashMultiMap::equal_range`] is a single contiguous run.
///
/// # Examples
/// ```
/// # use allocated_std::collections::hash::HashMultiMap;
/// let mut map = HashMultiMap::new();
/// map.insert(1, "one");
/// map.insert(2, "two");
/// map.insert(1, "uno");
///
/// assert!(map.equal_range(&1).map(|(_, value)| *value).eq(["one", "uno"]));
/// ```
pub struct HashMultiMap<K, V, S = RandomState, E = EqualTo, A: Allocator = Global> {
    pub(crate) table: HashTable<(K, V), First, S, E, A>,
}

impl<K, V> HashMultiMap<K, V> {
    pub fn new() -> HashMultiMap<K, V> {
        HashMultiMap::with_hasher(RandomState::new())
    }

    pub fn with_buckets(buckets: usize) -> HashMultiMap<K, V> {
        HashMultiMap::with_buckets_and_hasher_in(buckets, RandomState::new(), EqualTo, Global)
    }
}

impl<K, V, A: Allocator> HashMultiMap<K, V, RandomState, EqualTo, A> {
    pub fn new_in(alloc: A) -> HashMultiMap<K, V, RandomState, EqualTo, A> {
        HashMultiMap::with_buckets_and_hasher_in(MIN_BUCKETS, RandomState::new(), EqualTo, alloc)
    }
}

impl<K, V, S> HashMultiMap<K, V, S> {
    pub fn with_hasher(hasher: S) -> HashMultiMap<K, V, S> {
        HashMultiMap::with_hasher_and_key_eq(hasher, EqualTo)
    }
}

impl<K, V, S, E> HashMultiMap<K, V, S, E> {
    pub fn with_hasher_and_key_eq(hasher: S, key_eq: E) -> HashMultiMap<K, V, S, E> {
        HashMultiMap::with_buckets_and_hasher_in(MIN_BUCKETS, hasher, key_eq, Global)
    }
}

impl<K, V, S, E, A: Allocator> HashMultiMap<K, V, S, E, A> {
    pub fn with_buckets_and_hasher_in(
        buckets: usize,
        hasher: S,
        key_eq: E,
        alloc: A,
    ) -> HashMultiMap<K, V, S, E, A> {
        HashMultiMap {
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
    ) -> Result<HashMultiMap<K, V, S, E, A>, AllocError> {
        Ok(HashMultiMap {
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
    pub fn bucket_iter(&self, index: usize) -> LocalIter<'_, (K, V)> {
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

    pub fn iter(&self) -> Iter<'_, (K, V)> {
        self.table.iter()
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.table.iter(),
            _phantom: PhantomData,
        }
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys(self.iter())
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values(self.iter())
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut(self.iter_mut())
    }

    pub fn cursor_front(&self) -> Cursor<'_, (K, V), First, S, E, A> {
        self.table.cursor_front()
    }

    pub fn cursor_front_mut(&mut self) -> CursorMut<'_, (K, V), First, S, E, A> {
        self.table.cursor_front_mut()
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }

    pub fn retain<F: FnMut(&K, &V) -> bool>(&mut self, mut keep: F) {
        self.table.retain(|(key, value)| keep(key, value));
    }

    pub fn swap(&mut self, other: &mut HashMultiMap<K, V, S, E, A>) {
        self.table.swap(&mut other.table);
    }

    /// # Panics
    /// Panics if the bucket array can't be allocated.
    pub fn rehash(&mut self, buckets: usize) {
        self.table.rehash(buckets);
    }

    /// # Errors
    /// Returns an [`AllocError`] if the bucket array can't be allocated; the map is unchanged.
    pub fn try_rehash(&mut self, buckets: usize) -> Result<(), AllocError> {
        self.table.try_rehash(buckets)
    }

    /// # Panics
    /// Panics if the bucket array can't be allocated.
    pub fn reserve(&mut self, len: usize) {
        self.table.reserve(len);
    }

    /// # Errors
    /// Returns an [`AllocError`] if the bucket array can't be allocated; the map is unchanged.
    pub fn try_reserve(&mut self, len: usize) -> Result<(), AllocError> {
        self.table.try_reserve(len)
    }
}

impl<K: Hash, V, S: BuildHasher, E: KeyEq<K>, A: Allocator> HashMultiMap<K, V, S, E, A> {
    /// Inserts the entry after any entries with an equal key, returning a cursor at it.
    ///
    /// # Panics
    /// Panics if the allocator fails to allocate a node or a larger bucket array.
    pub fn insert(&mut self, key: K, value: V) -> CursorMut<'_, (K, V), First, S, E, A> {
        self.table.try_insert_equal((key, value)).throw()
    }

    /// # Errors
    /// Returns an [`AllocError`] if the node or a larger bucket array can't be allocated; the
    /// entries of the map are unchanged.
    pub fn try_insert(
        &mut self,
        key: K,
        value: V,
    ) -> Result<CursorMut<'_, (K, V), First, S, E, A>, AllocError> {
        self.table.try_insert_equal((key, value))
    }

    /// Returns a cursor at the first entry for `key`, or at the end if there is none.
    pub fn find<Q>(&self, key: &Q) -> Cursor<'_, (K, V), First, S, E, A>
    where
        K: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        self.table.find(key)
    }

    pub fn find_mut<Q>(&mut self, key: &Q) -> CursorMut<'_, (K, V), First, S, E, A>
    where
        K: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        self.table.find_mut(key)
    }

    /// Returns the value of the first entry for `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        self.table.get(key).map(|(_, value)| value)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        self.table.contains(key)
    }

    pub fn count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        self.table.count(key)
    }

    /// Returns an iterator over every entry for `key`, in insertion order.
    pub fn equal_range<Q>(&self, key: &Q) -> Iter<'_, (K, V)>
    where
        K: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        self.table.equal_range(key)
    }

    pub fn bucket<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
    {
        self.table.bucket(key)
    }

    /// Removes the first entry for `key` and returns it.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        self.table.remove(key)
    }

    /// Removes every entry for `key`, returning how many were removed.
    pub fn erase<Q>(&mut self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        E: KeyEq<Q>,
        Q: Hash + ?Sized,
    {
        self.table.erase(key)
    }

    /// Move-assigns `source` into `self`, see [`HashMap::assign`].
    ///
    /// # Panics
    /// Panics if relocating an entry fails to allocate.
    pub fn assign(&mut self, source: HashMultiMap<K, V, S, E, A>) {
        self.table.try_assign(source.table).throw()
    }
}

impl<K: Clone, V: Clone, S: Clone, E: Clone, A: Allocator> HashMultiMap<K, V, S, E, A> {
    /// # Panics
    /// Panics if an allocation fails.
    pub fn clone_in(&self, alloc: A) -> HashMultiMap<K, V, S, E, A> {
        HashMultiMap {
            table: self.table.try_clone_in(alloc).throw(),
        }
    }

    /// # Errors
    /// Returns an [`AllocError`] if an allocation fails.
    pub fn try_clone(&self) -> Result<HashMultiMap<K, V, S, E, A>, AllocError> {
        Ok(HashMultiMap {
            table: self.table.try_clone()?,
        })
    }
}

impl<K: Clone, V: Clone, S: Clone, E: Clone, A: Allocator> Clone for HashMultiMap<K, V, S, E, A> {
    fn clone(&self) -> Self {
        self.try_clone().throw()
    }

    fn clone_from(&mut self, source: &Self) {
        self.table.try_clone_from(&source.table).throw()
    }
}

impl<K, V, S: Default, E: Default, A: Allocator + Default> Default
    for HashMultiMap<K, V, S, E, A>
{
    fn default() -> Self {
        HashMultiMap::with_buckets_and_hasher_in(
            MIN_BUCKETS,
            S::default(),
            E::default(),
            A::default(),
        )
    }
}

impl<K: Hash, V, S: BuildHasher, E: KeyEq<K>, A: Allocator> Extend<(K, V)>
    for HashMultiMap<K, V, S, E, A>
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V, S, E, A> FromIterator<(K, V)> for HashMultiMap<K, V, S, E, A>
where
    K: Hash,
    S: BuildHasher + Default,
    E: KeyEq<K> + Default,
    A: Allocator + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = HashMultiMap::default();
        map.extend(iter);
        map
    }
}

impl<K: Hash + Eq, V, const N: usize> From<[(K, V); N]> for HashMultiMap<K, V> {
    fn from(entries: [(K, V); N]) -> Self {
        let mut map = HashMultiMap::with_buckets(N);
        map.extend(entries);
        map
    }
}

impl<K, V, S, E, A: Allocator> IntoIterator for HashMultiMap<K, V, S, E, A> {
    type Item = (K, V);

    type IntoIter = IntoIter<(K, V), First, S, E, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.table.into_iter()
    }
}

impl<'a, K, V, S, E, A: Allocator> IntoIterator for &'a HashMultiMap<K, V, S, E, A> {
    type Item = &'a (K, V);

    type IntoIter = Iter<'a, (K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Two multimaps are equal if, for every key, their entries for that key are permutations of each
/// other.
impl<K, V, S, E, A> PartialEq for HashMultiMap<K, V, S, E, A>
where
    K: Hash + PartialEq,
    V: PartialEq,
    S: BuildHasher,
    E: KeyEq<K>,
    A: Allocator,
{
    fn eq(&self, other: &Self) -> bool {
        self.table.eq_multi(&other.table)
    }
}

impl<K, V, S, E, A> Eq for HashMultiMap<K, V, S, E, A>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
    E: KeyEq<K>,
    A: Allocator,
{
}

impl<K: Debug, V: Debug, S, E, A: Allocator> Debug for HashMultiMap<K, V, S, E, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
