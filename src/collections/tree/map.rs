use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt::{self, Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::ops::Index;

use super::{Cursor, CursorMut, IntoIter, Iter, IterMut, Keys, RbTree, Values, ValuesMut};
use crate::alloc::{AllocError, Allocator, Global};
use crate::collections::key::{Compare, First, Less};
use crate::util::error::KeyNotFound;
use crate::util::result::ResultExtension;

/// A map from unique keys to values, kept in key order by a comparator `C` (ascending [`Ord`] order
/// by default).
///
/// Entries are stored as `(K, V)` pairs in a red-black tree, one allocation per entry, through the
/// allocator `A`. Unlike [`std::collections::BTreeMap::insert`], inserting a key which is already
/// present keeps the existing value; use the returned cursor or [`TreeMap::get_mut`] to overwrite
/// it.
///
/// It is a logic error for a key to be modified in a way that changes its order relative to the
/// other keys while it is in the map. TreeMap's API prevents mutable access to its keys.
///
/// # Time Complexity
/// For this analysis of time complexity, variables are defined as follows:
/// - `n`: The number of entries in the TreeMap.
///
/// | Method | Complexity |
/// |-|-|
/// | `len` | `O(1)` |
/// | `first` / `last` | `O(1)` |
/// | `insert` | `O(log n)` |
/// | `get` / `at` | `O(log n)` |
/// | `get_or_insert_with` | `O(log n)` |
/// | `remove` | `O(log n)` |
/// | `clone` | `O(n)` |
///
/// # Examples
/// ```
/// # use allocated_std::collections::tree::TreeMap;
/// let mut map = TreeMap::new();
/// map.insert("b", 2);
/// map.insert("a", 1);
/// *map.get_or_insert_default("c") += 3;
///
/// assert!(map.keys().eq(&["a", "b", "c"]));
/// assert_eq!(map[&"c"], 3);
/// assert!(map.at(&"d").is_err());
/// ```
pub struct TreeMap<K, V, C = Less, A: Allocator = Global> {
    pub(crate) tree: RbTree<(K, V), First, C, A>,
}

impl<K, V> TreeMap<K, V> {
    /// Creates an empty TreeMap using the global allocator. No memory is allocated until the first
    /// insertion.
    pub const fn new() -> TreeMap<K, V> {
        TreeMap::with_comparator(Less)
    }
}

impl<K, V, A: Allocator> TreeMap<K, V, Less, A> {
    /// Creates an empty TreeMap which allocates through `alloc`.
    pub const fn new_in(alloc: A) -> TreeMap<K, V, Less, A> {
        TreeMap::with_comparator_in(Less, alloc)
    }
}

impl<K, V, C> TreeMap<K, V, C> {
    pub const fn with_comparator(compare: C) -> TreeMap<K, V, C> {
        TreeMap::with_comparator_in(compare, Global)
    }
}

impl<K, V, C, A: Allocator> TreeMap<K, V, C, A> {
    pub const fn with_comparator_in(compare: C, alloc: A) -> TreeMap<K, V, C, A> {
        TreeMap {
            tree: RbTree::new_in(compare, alloc),
        }
    }

    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub const fn max_size(&self) -> usize {
        self.tree.max_size()
    }

    pub const fn allocator(&self) -> &A {
        self.tree.allocator()
    }

    pub const fn comparator(&self) -> &C {
        self.tree.comparator()
    }

    /// Returns an iterator over the entries in key order.
    pub fn iter(&self) -> Iter<'_, (K, V)> {
        self.tree.iter()
    }

    /// Returns an iterator over the entries in key order, with mutable access to the values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(self.tree.leftmost, self.tree.rightmost, self.tree.len)
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

    /// Returns the entry with the smallest key.
    pub fn first(&self) -> Option<&(K, V)> {
        self.tree.first()
    }

    /// Returns the entry with the largest key.
    pub fn last(&self) -> Option<&(K, V)> {
        self.tree.last()
    }

    pub fn pop_first(&mut self) -> Option<(K, V)> {
        self.tree.pop_first()
    }

    pub fn pop_last(&mut self) -> Option<(K, V)> {
        self.tree.pop_last()
    }

    pub fn cursor_front(&self) -> Cursor<'_, (K, V), First, C, A> {
        self.tree.cursor_front()
    }

    pub fn cursor_back(&self) -> Cursor<'_, (K, V), First, C, A> {
        self.tree.cursor_back()
    }

    pub fn cursor_front_mut(&mut self) -> CursorMut<'_, (K, V), First, C, A> {
        self.tree.cursor_front_mut()
    }

    /// Returns an iterator over the entries from `first` up to (excluding) `last`.
    pub fn range(
        &self,
        first: &Cursor<'_, (K, V), First, C, A>,
        last: &Cursor<'_, (K, V), First, C, A>,
    ) -> Iter<'_, (K, V)> {
        self.tree.range(first, last)
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Keeps only the entries for which `keep` returns true.
    pub fn retain<F: FnMut(&K, &V) -> bool>(&mut self, mut keep: F) {
        self.tree.retain(|(key, value)| keep(key, value));
    }

    /// Exchanges the contents of two maps. The allocators are exchanged too if they propagate on
    /// swap, otherwise they must be equal.
    pub fn swap(&mut self, other: &mut TreeMap<K, V, C, A>) {
        self.tree.swap(&mut other.tree);
    }
}

impl<K, V, C: Compare<K>, A: Allocator> TreeMap<K, V, C, A> {
    /// Inserts the entry if the map doesn't already contain `key`. Returns a cursor at the entry
    /// for `key`, and whether the new entry was inserted. An existing value is left untouched.
    ///
    /// # Panics
    /// Panics if the allocator fails to allocate a node.
    pub fn insert(&mut self, key: K, value: V) -> (CursorMut<'_, (K, V), First, C, A>, bool) {
        self.tree.try_insert_unique((key, value)).throw()
    }

    /// # Errors
    /// Returns an [`AllocError`] if the node can't be allocated; the map is unchanged.
    pub fn try_insert(
        &mut self,
        key: K,
        value: V,
    ) -> Result<(CursorMut<'_, (K, V), First, C, A>, bool), AllocError> {
        self.tree.try_insert_unique((key, value))
    }

    /// Returns a mutable reference to the value for `key`, inserting the result of `make` first if
    /// the key is absent. `make` is only called when an entry is inserted.
    ///
    /// # Panics
    /// Panics if the allocator fails to allocate a node.
    pub fn get_or_insert_with<F: FnOnce() -> V>(&mut self, key: K, make: F) -> &mut V {
        self.try_get_or_insert_with(key, make).throw()
    }

    /// Returns a mutable reference to the value for `key`, inserting [`V::default`](Default) first
    /// if the key is absent.
    ///
    /// # Panics
    /// Panics if the allocator fails to allocate a node.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.get_or_insert_with(key, V::default)
    }

    /// # Errors
    /// Returns an [`AllocError`] if the key is absent and the node can't be allocated.
    pub fn try_get_or_insert_with<F: FnOnce() -> V>(
        &mut self,
        key: K,
        make: F,
    ) -> Result<&mut V, AllocError> {
        let (node, _) = self.tree.try_insert_unique_with(key, |key| (key, make()))?;
        Ok(&mut node.value_mut().1)
    }

    /// Returns a cursor at the entry for `key`, or at the end if there is none.
    pub fn find<Q>(&self, key: &Q) -> Cursor<'_, (K, V), First, C, A>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.find(key)
    }

    pub fn find_mut<Q>(&mut self, key: &Q) -> CursorMut<'_, (K, V), First, C, A>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.find_mut(key)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.get(key).map(|(_, value)| value)
    }

    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.get(key).map(|(key, value)| (key, value))
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.find_mut(key).into_value_mut()
    }

    /// Returns the value for `key`.
    ///
    /// # Errors
    /// Returns [`KeyNotFound`] if the map has no entry for `key`.
    pub fn at<Q>(&self, key: &Q) -> Result<&V, KeyNotFound>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.get(key).ok_or(KeyNotFound)
    }

    /// # Errors
    /// Returns [`KeyNotFound`] if the map has no entry for `key`.
    pub fn at_mut<Q>(&mut self, key: &Q) -> Result<&mut V, KeyNotFound>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.get_mut(key).ok_or(KeyNotFound)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.contains(key)
    }

    /// Returns the number of entries for `key`, which is at most one.
    pub fn count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        usize::from(self.contains(key))
    }

    pub fn equal_range<Q>(&self, key: &Q) -> Iter<'_, (K, V)>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.equal_range(key)
    }

    /// Returns a cursor at the first entry whose key doesn't sort before `key`.
    pub fn lower_bound<Q>(&self, key: &Q) -> Cursor<'_, (K, V), First, C, A>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.lower_bound(key)
    }

    /// Returns a cursor at the first entry whose key sorts after `key`.
    pub fn upper_bound<Q>(&self, key: &Q) -> Cursor<'_, (K, V), First, C, A>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.upper_bound(key)
    }

    /// Removes the entry for `key`, returning it if it exists.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.remove(key)
    }

    /// Removes the entry for `key`, returning the value if it exists.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes the entry for `key`, returning how many entries were removed.
    pub fn erase<Q>(&mut self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.erase(key)
    }

    /// Move-assigns `source` into `self`. If the allocators neither propagate on move nor compare
    /// equal, each entry is moved into a node from `self`'s allocator.
    ///
    /// # Panics
    /// Panics if relocating an entry fails to allocate.
    pub fn assign(&mut self, source: TreeMap<K, V, C, A>) {
        self.tree.try_assign(source.tree).throw()
    }
}

impl<K: Clone, V: Clone, C: Clone, A: Allocator> TreeMap<K, V, C, A> {
    /// Creates a copy of the map which allocates through `alloc`.
    ///
    /// # Panics
    /// Panics if a node can't be allocated.
    pub fn clone_in(&self, alloc: A) -> TreeMap<K, V, C, A> {
        TreeMap {
            tree: self.tree.try_clone_in(alloc).throw(),
        }
    }

    /// # Errors
    /// Returns an [`AllocError`] if a node can't be allocated.
    pub fn try_clone(&self) -> Result<TreeMap<K, V, C, A>, AllocError> {
        Ok(TreeMap {
            tree: self.tree.try_clone()?,
        })
    }
}

impl<K: Clone, V: Clone, C: Clone, A: Allocator> Clone for TreeMap<K, V, C, A> {
    fn clone(&self) -> Self {
        self.try_clone().throw()
    }

    fn clone_from(&mut self, source: &Self) {
        self.tree.try_clone_from(&source.tree).throw()
    }
}

impl<K, V, C: Default, A: Allocator + Default> Default for TreeMap<K, V, C, A> {
    fn default() -> Self {
        TreeMap::with_comparator_in(C::default(), A::default())
    }
}

impl<K, Q, V, C, A> Index<&Q> for TreeMap<K, V, C, A>
where
    K: Borrow<Q>,
    C: Compare<K> + Compare<Q>,
    A: Allocator,
    Q: ?Sized,
{
    type Output = V;

    fn index(&self, key: &Q) -> &V {
        self.at(key).throw()
    }
}

impl<K, V, C: Compare<K>, A: Allocator> Extend<(K, V)> for TreeMap<K, V, C, A> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V, C, A> FromIterator<(K, V)> for TreeMap<K, V, C, A>
where
    C: Compare<K> + Default,
    A: Allocator + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = TreeMap::default();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for TreeMap<K, V> {
    fn from(entries: [(K, V); N]) -> Self {
        TreeMap::from_iter(entries)
    }
}

impl<K, V, C, A: Allocator> IntoIterator for TreeMap<K, V, C, A> {
    type Item = (K, V);

    type IntoIter = IntoIter<(K, V), First, C, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.tree.into_iter()
    }
}

impl<'a, K, V, C, A: Allocator> IntoIterator for &'a TreeMap<K, V, C, A> {
    type Item = &'a (K, V);

    type IntoIter = Iter<'a, (K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: PartialEq, V: PartialEq, C, A: Allocator> PartialEq for TreeMap<K, V, C, A> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, C, A: Allocator> Eq for TreeMap<K, V, C, A> {}

impl<K: PartialOrd, V: PartialOrd, C, A: Allocator> PartialOrd for TreeMap<K, V, C, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<K: Ord, V: Ord, C, A: Allocator> Ord for TreeMap<K, V, C, A> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<K: Hash, V: Hash, C, A: Allocator> Hash for TreeMap<K, V, C, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for entry in self.iter() {
            entry.hash(state);
        }
    }
}

impl<K: Debug, V: Debug, C, A: Allocator> Debug for TreeMap<K, V, C, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter().map(|(key, value)| (key, value))).finish()
    }
}

/// An ordered map in which keys may repeat, kept in key order by a comparator `C`.
///
/// Entries with equal keys are kept in insertion order: a new entry goes after every entry with an
/// equal key.
///
/// # Examples
/// ```
/// # use allocated_std::collections::tree::TreeMultiMap;
/// let mut map = TreeMultiMap::new();
/// map.insert(1, "one");
/// map.insert(2, "two");
/// map.insert(1, "uno");
///
/// assert!(map.equal_range(&1).map(|(_, value)| *value).eq(["one", "uno"]));
/// ```
pub struct TreeMultiMap<K, V, C = Less, A: Allocator = Global> {
    pub(crate) tree: RbTree<(K, V), First, C, A>,
}

impl<K, V> TreeMultiMap<K, V> {
    pub const fn new() -> TreeMultiMap<K, V> {
        TreeMultiMap::with_comparator(Less)
    }
}

impl<K, V, A: Allocator> TreeMultiMap<K, V, Less, A> {
    pub const fn new_in(alloc: A) -> TreeMultiMap<K, V, Less, A> {
        TreeMultiMap::with_comparator_in(Less, alloc)
    }
}

impl<K, V, C> TreeMultiMap<K, V, C> {
    pub const fn with_comparator(compare: C) -> TreeMultiMap<K, V, C> {
        TreeMultiMap::with_comparator_in(compare, Global)
    }
}

impl<K, V, C, A: Allocator> TreeMultiMap<K, V, C, A> {
    pub const fn with_comparator_in(compare: C, alloc: A) -> TreeMultiMap<K, V, C, A> {
        TreeMultiMap {
            tree: RbTree::new_in(compare, alloc),
        }
    }

    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub const fn max_size(&self) -> usize {
        self.tree.max_size()
    }

    pub const fn allocator(&self) -> &A {
        self.tree.allocator()
    }

    pub const fn comparator(&self) -> &C {
        self.tree.comparator()
    }

    pub fn iter(&self) -> Iter<'_, (K, V)> {
        self.tree.iter()
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(self.tree.leftmost, self.tree.rightmost, self.tree.len)
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

    pub fn first(&self) -> Option<&(K, V)> {
        self.tree.first()
    }

    pub fn last(&self) -> Option<&(K, V)> {
        self.tree.last()
    }

    pub fn pop_first(&mut self) -> Option<(K, V)> {
        self.tree.pop_first()
    }

    pub fn pop_last(&mut self) -> Option<(K, V)> {
        self.tree.pop_last()
    }

    pub fn cursor_front(&self) -> Cursor<'_, (K, V), First, C, A> {
        self.tree.cursor_front()
    }

    pub fn cursor_back(&self) -> Cursor<'_, (K, V), First, C, A> {
        self.tree.cursor_back()
    }

    pub fn cursor_front_mut(&mut self) -> CursorMut<'_, (K, V), First, C, A> {
        self.tree.cursor_front_mut()
    }

    pub fn range(
        &self,
        first: &Cursor<'_, (K, V), First, C, A>,
        last: &Cursor<'_, (K, V), First, C, A>,
    ) -> Iter<'_, (K, V)> {
        self.tree.range(first, last)
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }

    pub fn retain<F: FnMut(&K, &V) -> bool>(&mut self, mut keep: F) {
        self.tree.retain(|(key, value)| keep(key, value));
    }

    pub fn swap(&mut self, other: &mut TreeMultiMap<K, V, C, A>) {
        self.tree.swap(&mut other.tree);
    }
}

impl<K, V, C: Compare<K>, A: Allocator> TreeMultiMap<K, V, C, A> {
    /// Inserts the entry after any entries with an equal key, returning a cursor at it.
    ///
    /// # Panics
    /// Panics if the allocator fails to allocate a node.
    pub fn insert(&mut self, key: K, value: V) -> CursorMut<'_, (K, V), First, C, A> {
        self.tree.try_insert_equal((key, value)).throw()
    }

    /// # Errors
    /// Returns an [`AllocError`] if the node can't be allocated; the map is unchanged.
    pub fn try_insert(
        &mut self,
        key: K,
        value: V,
    ) -> Result<CursorMut<'_, (K, V), First, C, A>, AllocError> {
        self.tree.try_insert_equal((key, value))
    }

    /// Returns a cursor at the first entry for `key`, or at the end if there is none.
    pub fn find<Q>(&self, key: &Q) -> Cursor<'_, (K, V), First, C, A>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.find(key)
    }

    pub fn find_mut<Q>(&mut self, key: &Q) -> CursorMut<'_, (K, V), First, C, A>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.find_mut(key)
    }

    /// Returns the value of the first entry for `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.get(key).map(|(_, value)| value)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.contains(key)
    }

    pub fn count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.count(key)
    }

    /// Returns an iterator over every entry for `key`, in insertion order.
    pub fn equal_range<Q>(&self, key: &Q) -> Iter<'_, (K, V)>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.equal_range(key)
    }

    pub fn lower_bound<Q>(&self, key: &Q) -> Cursor<'_, (K, V), First, C, A>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.lower_bound(key)
    }

    pub fn upper_bound<Q>(&self, key: &Q) -> Cursor<'_, (K, V), First, C, A>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.upper_bound(key)
    }

    /// Removes the first entry for `key` and returns it.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.remove(key)
    }

    /// Removes every entry for `key`, returning how many were removed.
    pub fn erase<Q>(&mut self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.erase(key)
    }

    /// Move-assigns `source` into `self`, see [`TreeMap::assign`].
    ///
    /// # Panics
    /// Panics if relocating an entry fails to allocate.
    pub fn assign(&mut self, source: TreeMultiMap<K, V, C, A>) {
        self.tree.try_assign(source.tree).throw()
    }
}

impl<K: Clone, V: Clone, C: Clone, A: Allocator> TreeMultiMap<K, V, C, A> {
    /// # Panics
    /// Panics if a node can't be allocated.
    pub fn clone_in(&self, alloc: A) -> TreeMultiMap<K, V, C, A> {
        TreeMultiMap {
            tree: self.tree.try_clone_in(alloc).throw(),
        }
    }

    /// # Errors
    /// Returns an [`AllocError`] if a node can't be allocated.
    pub fn try_clone(&self) -> Result<TreeMultiMap<K, V, C, A>, AllocError> {
        Ok(TreeMultiMap {
            tree: self.tree.try_clone()?,
        })
    }
}

impl<K: Clone, V: Clone, C: Clone, A: Allocator> Clone for TreeMultiMap<K, V, C, A> {
    fn clone(&self) -> Self {
        self.try_clone().throw()
    }

    fn clone_from(&mut self, source: &Self) {
        self.tree.try_clone_from(&source.tree).throw()
    }
}

impl<K, V, C: Default, A: Allocator + Default> Default for TreeMultiMap<K, V, C, A> {
    fn default() -> Self {
        TreeMultiMap::with_comparator_in(C::default(), A::default())
    }
}

impl<K, V, C: Compare<K>, A: Allocator> Extend<(K, V)> for TreeMultiMap<K, V, C, A> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V, C, A> FromIterator<(K, V)> for TreeMultiMap<K, V, C, A>
where
    C: Compare<K> + Default,
    A: Allocator + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = TreeMultiMap::default();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for TreeMultiMap<K, V> {
    fn from(entries: [(K, V); N]) -> Self {
        TreeMultiMap::from_iter(entries)
    }
}

impl<K, V, C, A: Allocator> IntoIterator for TreeMultiMap<K, V, C, A> {
    type Item = (K, V);

    type IntoIter = IntoIter<(K, V), First, C, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.tree.into_iter()
    }
}

impl<'a, K, V, C, A: Allocator> IntoIterator for &'a TreeMultiMap<K, V, C, A> {
    type Item = &'a (K, V);

    type IntoIter = Iter<'a, (K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: PartialEq, V: PartialEq, C, A: Allocator> PartialEq for TreeMultiMap<K, V, C, A> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, C, A: Allocator> Eq for TreeMultiMap<K, V, C, A> {}

impl<K: PartialOrd, V: PartialOrd, C, A: Allocator> PartialOrd for TreeMultiMap<K, V, C, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<K: Ord, V: Ord, C, A: Allocator> Ord for TreeMultiMap<K, V, C, A> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<K: Hash, V: Hash, C, A: Allocator> Hash for TreeMultiMap<K, V, C, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for entry in self.iter() {
            entry.hash(state);
        }
    }
}

impl<K: Debug, V: Debug, C, A: Allocator> Debug for TreeMultiMap<K, V, C, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
