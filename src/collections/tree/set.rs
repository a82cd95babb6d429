use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt::{self, Debug, Formatter};
use std::hash::{Hash, Hasher};

use super::{Cursor, CursorMut, IntoIter, Iter, RbTree};
use crate::alloc::{AllocError, Allocator, Global};
use crate::collections::key::{Compare, Identity, Less};
use crate::util::result::ResultExtension;

/// A set of unique values, kept in order by a comparator `C` (ascending [`Ord`] order by default).
///
/// Values are stored in a red-black tree, one allocation per value, through the allocator `A`.
/// Inserting a value equal to one already present leaves the set unchanged.
///
/// It is a logic error for a value to be modified in a way that changes its order relative to the
/// other values while it is in the set.
///
/// # Time Complexity
/// For this analysis of time complexity, variables are defined as follows:
/// - `n`: The number of items in the TreeSet.
///
/// | Method | Complexity |
/// |-|-|
/// | `len` | `O(1)` |
/// | `first` / `last` | `O(1)` |
/// | `insert` | `O(log n)` |
/// | `contains` | `O(log n)` |
/// | `remove` | `O(log n)` |
/// | `clone` | `O(n)` |
///
/// # Examples
/// ```
/// # use allocated_std::collections::tree::TreeSet;
/// let set = TreeSet::from([5, 3, 8, 1, 4, 7, 9]);
/// assert!(set.iter().eq(&[1, 3, 4, 5, 7, 8, 9]));
/// ```
pub struct TreeSet<T, C = Less, A: Allocator = Global> {
    pub(crate) tree: RbTree<T, Identity, C, A>,
}

impl<T> TreeSet<T> {
    /// Creates an empty TreeSet using the global allocator. No memory is allocated until the first
    /// insertion.
    pub const fn new() -> TreeSet<T> {
        TreeSet::with_comparator(Less)
    }
}

impl<T, A: Allocator> TreeSet<T, Less, A> {
    /// Creates an empty TreeSet which allocates through `alloc`.
    pub const fn new_in(alloc: A) -> TreeSet<T, Less, A> {
        TreeSet::with_comparator_in(Less, alloc)
    }
}

impl<T, C> TreeSet<T, C> {
    pub const fn with_comparator(compare: C) -> TreeSet<T, C> {
        TreeSet::with_comparator_in(compare, Global)
    }
}

impl<T, C, A: Allocator> TreeSet<T, C, A> {
    pub const fn with_comparator_in(compare: C, alloc: A) -> TreeSet<T, C, A> {
        TreeSet {
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

    /// Returns an iterator over the values in ascending order.
    pub fn iter(&self) -> Iter<'_, T> {
        self.tree.iter()
    }

    /// Returns the smallest value.
    pub fn first(&self) -> Option<&T> {
        self.tree.first()
    }

    /// Returns the largest value.
    pub fn last(&self) -> Option<&T> {
        self.tree.last()
    }

    pub fn pop_first(&mut self) -> Option<T> {
        self.tree.pop_first()
    }

    pub fn pop_last(&mut self) -> Option<T> {
        self.tree.pop_last()
    }

    pub fn cursor_front(&self) -> Cursor<'_, T, Identity, C, A> {
        self.tree.cursor_front()
    }

    pub fn cursor_back(&self) -> Cursor<'_, T, Identity, C, A> {
        self.tree.cursor_back()
    }

    pub fn cursor_front_mut(&mut self) -> CursorMut<'_, T, Identity, C, A> {
        self.tree.cursor_front_mut()
    }

    /// Returns an iterator over the values from `first` up to (excluding) `last`.
    pub fn range(
        &self,
        first: &Cursor<'_, T, Identity, C, A>,
        last: &Cursor<'_, T, Identity, C, A>,
    ) -> Iter<'_, T> {
        self.tree.range(first, last)
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Keeps only the values for which `keep` returns true.
    pub fn retain<F: FnMut(&T) -> bool>(&mut self, keep: F) {
        self.tree.retain(keep);
    }

    /// Exchanges the contents of two sets. The allocators are exchanged too if they propagate on
    /// swap, otherwise they must be equal.
    pub fn swap(&mut self, other: &mut TreeSet<T, C, A>) {
        self.tree.swap(&mut other.tree);
    }
}

impl<T, C: Compare<T>, A: Allocator> TreeSet<T, C, A> {
    /// Inserts `value` if the set doesn't already contain an equal value. Returns a cursor at the
    /// value in the set, and whether `value` was inserted.
    ///
    /// # Panics
    /// Panics if the allocator fails to allocate a node.
    pub fn insert(&mut self, value: T) -> (CursorMut<'_, T, Identity, C, A>, bool) {
        self.tree.try_insert_unique(value).throw()
    }

    /// Inserts `value` if the set doesn't already contain an equal value, returning an error if the
    /// allocation fails.
    ///
    /// # Errors
    /// Returns an [`AllocError`] if the node can't be allocated; the set is unchanged.
    pub fn try_insert(
        &mut self,
        value: T,
    ) -> Result<(CursorMut<'_, T, Identity, C, A>, bool), AllocError> {
        self.tree.try_insert_unique(value)
    }

    /// Returns a cursor at the value equal to `value`, or at the end if there is none.
    pub fn find<Q>(&self, value: &Q) -> Cursor<'_, T, Identity, C, A>
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.find(value)
    }

    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.get(value)
    }

    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.contains(value)
    }

    /// Returns the number of values equal to `value`, which is at most one.
    pub fn count<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        usize::from(self.contains(value))
    }

    pub fn equal_range<Q>(&self, value: &Q) -> Iter<'_, T>
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.equal_range(value)
    }

    /// Returns a cursor at the first value which doesn't sort before `value`.
    pub fn lower_bound<Q>(&self, value: &Q) -> Cursor<'_, T, Identity, C, A>
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.lower_bound(value)
    }

    /// Returns a cursor at the first value which sorts after `value`.
    pub fn upper_bound<Q>(&self, value: &Q) -> Cursor<'_, T, Identity, C, A>
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.upper_bound(value)
    }

    /// Removes the value equal to `value` and returns it.
    pub fn take<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.remove(value)
    }

    /// Removes the value equal to `value`, returning true if there was one.
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.erase(value) != 0
    }

    /// Move-assigns `source` into `self`. If the allocators neither propagate on move nor compare
    /// equal, each value is moved into a node from `self`'s allocator.
    ///
    /// # Panics
    /// Panics if relocating a value fails to allocate.
    pub fn assign(&mut self, source: TreeSet<T, C, A>) {
        self.tree.try_assign(source.tree).throw()
    }
}

impl<T: Clone, C: Clone, A: Allocator> TreeSet<T, C, A> {
    /// Creates a copy of the set which allocates through `alloc`.
    ///
    /// # Panics
    /// Panics if a node can't be allocated.
    pub fn clone_in(&self, alloc: A) -> TreeSet<T, C, A> {
        TreeSet {
            tree: self.tree.try_clone_in(alloc).throw(),
        }
    }

    /// # Errors
    /// Returns an [`AllocError`] if a node can't be allocated.
    pub fn try_clone(&self) -> Result<TreeSet<T, C, A>, AllocError> {
        Ok(TreeSet {
            tree: self.tree.try_clone()?,
        })
    }
}

impl<T: Clone, C: Clone, A: Allocator> Clone for TreeSet<T, C, A> {
    fn clone(&self) -> Self {
        self.try_clone().throw()
    }

    fn clone_from(&mut self, source: &Self) {
        self.tree.try_clone_from(&source.tree).throw()
    }
}

impl<T, C: Default, A: Allocator + Default> Default for TreeSet<T, C, A> {
    fn default() -> Self {
        TreeSet::with_comparator_in(C::default(), A::default())
    }
}

impl<T, C: Compare<T>, A: Allocator> Extend<T> for TreeSet<T, C, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T: Copy + 'a, C: Compare<T>, A: Allocator> Extend<&'a T> for TreeSet<T, C, A> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T, C: Compare<T> + Default, A: Allocator + Default> FromIterator<T> for TreeSet<T, C, A> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = TreeSet::default();
        set.extend(iter);
        set
    }
}

impl<T: Ord, const N: usize> From<[T; N]> for TreeSet<T> {
    fn from(values: [T; N]) -> Self {
        TreeSet::from_iter(values)
    }
}

impl<T, C, A: Allocator> IntoIterator for TreeSet<T, C, A> {
    type Item = T;

    type IntoIter = IntoIter<T, Identity, C, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.tree.into_iter()
    }
}

impl<'a, T, C, A: Allocator> IntoIterator for &'a TreeSet<T, C, A> {
    type Item = &'a T;

    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: PartialEq, C, A: Allocator> PartialEq for TreeSet<T, C, A> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq, C, A: Allocator> Eq for TreeSet<T, C, A> {}

impl<T: PartialOrd, C, A: Allocator> PartialOrd for TreeSet<T, C, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord, C, A: Allocator> Ord for TreeSet<T, C, A> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: Hash, C, A: Allocator> Hash for TreeSet<T, C, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for value in self.iter() {
            value.hash(state);
        }
    }
}

impl<T: Debug, C, A: Allocator> Debug for TreeSet<T, C, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// An ordered collection of values in which equal values may repeat, kept in order by a comparator
/// `C`.
///
/// Equal values are kept in insertion order: a new value goes after every value equal to it.
///
/// # Examples
/// ```
/// # use allocated_std::collections::tree::TreeMultiSet;
/// let mut set = TreeMultiSet::from([3, 1, 3]);
/// set.insert(3);
/// assert_eq!(set.count(&3), 3);
/// assert_eq!(set.len(), 4);
/// ```
pub struct TreeMultiSet<T, C = Less, A: Allocator = Global> {
    pub(crate) tree: RbTree<T, Identity, C, A>,
}

impl<T> TreeMultiSet<T> {
    pub const fn new() -> TreeMultiSet<T> {
        TreeMultiSet::with_comparator(Less)
    }
}

impl<T, A: Allocator> TreeMultiSet<T, Less, A> {
    pub const fn new_in(alloc: A) -> TreeMultiSet<T, Less, A> {
        TreeMultiSet::with_comparator_in(Less, alloc)
    }
}

impl<T, C> TreeMultiSet<T, C> {
    pub const fn with_comparator(compare: C) -> TreeMultiSet<T, C> {
        TreeMultiSet::with_comparator_in(compare, Global)
    }
}

impl<T, C, A: Allocator> TreeMultiSet<T, C, A> {
    pub const fn with_comparator_in(compare: C, alloc: A) -> TreeMultiSet<T, C, A> {
        TreeMultiSet {
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

    pub fn iter(&self) -> Iter<'_, T> {
        self.tree.iter()
    }

    pub fn first(&self) -> Option<&T> {
        self.tree.first()
    }

    pub fn last(&self) -> Option<&T> {
        self.tree.last()
    }

    pub fn pop_first(&mut self) -> Option<T> {
        self.tree.pop_first()
    }

    pub fn pop_last(&mut self) -> Option<T> {
        self.tree.pop_last()
    }

    pub fn cursor_front(&self) -> Cursor<'_, T, Identity, C, A> {
        self.tree.cursor_front()
    }

    pub fn cursor_back(&self) -> Cursor<'_, T, Identity, C, A> {
        self.tree.cursor_back()
    }

    pub fn cursor_front_mut(&mut self) -> CursorMut<'_, T, Identity, C, A> {
        self.tree.cursor_front_mut()
    }

    pub fn range(
        &self,
        first: &Cursor<'_, T, Identity, C, A>,
        last: &Cursor<'_, T, Identity, C, A>,
    ) -> Iter<'_, T> {
        self.tree.range(first, last)
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }

    pub fn retain<F: FnMut(&T) -> bool>(&mut self, keep: F) {
        self.tree.retain(keep);
    }

    pub fn swap(&mut self, other: &mut TreeMultiSet<T, C, A>) {
        self.tree.swap(&mut other.tree);
    }
}

impl<T, C: Compare<T>, A: Allocator> TreeMultiSet<T, C, A> {
    /// Inserts `value` after any values equal to it, returning a cursor at the new value.
    ///
    /// # Panics
    /// Panics if the allocator fails to allocate a node.
    pub fn insert(&mut self, value: T) -> CursorMut<'_, T, Identity, C, A> {
        self.tree.try_insert_equal(value).throw()
    }

    /// # Errors
    /// Returns an [`AllocError`] if the node can't be allocated; the set is unchanged.
    pub fn try_insert(&mut self, value: T) -> Result<CursorMut<'_, T, Identity, C, A>, AllocError> {
        self.tree.try_insert_equal(value)
    }

    /// Returns a cursor at the first value equal to `value`, or at the end if there is none.
    pub fn find<Q>(&self, value: &Q) -> Cursor<'_, T, Identity, C, A>
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.find(value)
    }

    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.get(value)
    }

    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.contains(value)
    }

    pub fn count<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.count(value)
    }

    /// Returns an iterator over every value equal to `value`, in insertion order.
    pub fn equal_range<Q>(&self, value: &Q) -> Iter<'_, T>
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.equal_range(value)
    }

    pub fn lower_bound<Q>(&self, value: &Q) -> Cursor<'_, T, Identity, C, A>
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.lower_bound(value)
    }

    pub fn upper_bound<Q>(&self, value: &Q) -> Cursor<'_, T, Identity, C, A>
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.upper_bound(value)
    }

    /// Removes the first value equal to `value` and returns it.
    pub fn take<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.remove(value)
    }

    /// Removes every value equal to `value`, returning how many were removed.
    pub fn remove<Q>(&mut self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.erase(value)
    }

    /// Move-assigns `source` into `self`, see [`TreeSet::assign`].
    ///
    /// # Panics
    /// Panics if relocating a value fails to allocate.
    pub fn assign(&mut self, source: TreeMultiSet<T, C, A>) {
        self.tree.try_assign(source.tree).throw()
    }
}

impl<T: Clone, C: Clone, A: Allocator> TreeMultiSet<T, C, A> {
    /// # Panics
    /// Panics if a node can't be allocated.
    pub fn clone_in(&self, alloc: A) -> TreeMultiSet<T, C, A> {
        TreeMultiSet {
            tree: self.tree.try_clone_in(alloc).throw(),
        }
    }

    /// # Errors
    /// Returns an [`AllocError`] if a node can't be allocated.
    pub fn try_clone(&self) -> Result<TreeMultiSet<T, C, A>, AllocError> {
        Ok(TreeMultiSet {
            tree: self.tree.try_clone()?,
        })
    }
}

impl<T: Clone, C: Clone, A: Allocator> Clone for TreeMultiSet<T, C, A> {
    fn clone(&self) -> Self {
        self.try_clone().throw()
    }

    fn clone_from(&mut self, source: &Self) {
        self.tree.try_clone_from(&source.tree).throw()
    }
}

impl<T, C: Default, A: Allocator + Default> Default for TreeMultiSet<T, C, A> {
    fn default() -> Self {
        TreeMultiSet::with_comparator_in(C::default(), A::default())
    }
}

impl<T, C: Compare<T>, A: Allocator> Extend<T> for TreeMultiSet<T, C, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T: Copy + 'a, C: Compare<T>, A: Allocator> Extend<&'a T> for TreeMultiSet<T, C, A> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T, C: Compare<T> + Default, A: Allocator + Default> FromIterator<T>
    for TreeMultiSet<T, C, A>
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = TreeMultiSet::default();
        set.extend(iter);
        set
    }
}

impl<T: Ord, const N: usize> From<[T; N]> for TreeMultiSet<T> {
    fn from(values: [T; N]) -> Self {
        TreeMultiSet::from_iter(values)
    }
}

impl<T, C, A: Allocator> IntoIterator for TreeMultiSet<T, C, A> {
    type Item = T;

    type IntoIter = IntoIter<T, Identity, C, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.tree.into_iter()
    }
}

impl<'a, T, C, A: Allocator> IntoIterator for &'a TreeMultiSet<T, C, A> {
    type Item = &'a T;

    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: PartialEq, C, A: Allocator> PartialEq for TreeMultiSet<T, C, A> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq, C, A: Allocator> Eq for TreeMultiSet<T, C, A> {}

impl<T: PartialOrd, C, A: Allocator> PartialOrd for TreeMultiSet<T, C, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord, C, A: Allocator> Ord for TreeMultiSet<T, C, A> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: Hash, C, A: Allocator> Hash for TreeMultiSet<T, C, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for value in self.iter() {
            value.hash(state);
        }
    }
}

impl<T: Debug, C, A: Allocator> Debug for TreeMultiSet<T, C, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
