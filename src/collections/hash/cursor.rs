use std::fmt::{self, Debug, Formatter};

use super::HashTable;
use super::iter::next_occupied;
use super::node::{Link, NodePtr};
use crate::alloc::Allocator;
use crate::collections::key::First;

/// A read-only position within a [`HashTable`].
///
/// Hash table cursors only move forward, in iteration order. As with the tree cursors, the end
/// position sits past the last element, and moving forward from it wraps around to the first.
pub struct Cursor<'a, T, X, S, E, A: Allocator> {
    pub(crate) table: &'a HashTable<T, X, S, E, A>,
    pub(crate) bucket: usize,
    pub(crate) current: Link<T>,
}

impl<'a, T, X, S, E, A: Allocator> Cursor<'a, T, X, S, E, A> {
    pub(crate) const fn new(
        table: &'a HashTable<T, X, S, E, A>,
        bucket: usize,
        current: Link<T>,
    ) -> Self {
        Cursor {
            table,
            bucket,
            current,
        }
    }

    /// Returns true if the cursor points at the end rather than an element.
    pub const fn is_end(&self) -> bool {
        self.current.is_none()
    }

    /// Returns the element at the cursor.
    pub fn read(&self) -> Option<&'a T> {
        self.current.map(|node| node.value())
    }

    pub fn read_next(&self) -> Option<&'a T> {
        let (_, next) = step(&self.table.buckets, self.bucket, self.current);
        next.map(|node| node.value())
    }

    pub fn move_next(&mut self) -> &mut Self {
        (self.bucket, self.current) = step(&self.table.buckets, self.bucket, self.current);
        self
    }

    /// The index of the bucket holding the element at the cursor.
    pub const fn bucket(&self) -> Option<usize> {
        match self.current {
            Some(_) => Some(self.bucket),
            None => None,
        }
    }
}

impl<'a, K, V, X, S, E, A: Allocator> Cursor<'a, (K, V), X, S, E, A> {
    pub fn key(&self) -> Option<&'a K> {
        self.read().map(|(key, _)| key)
    }

    pub fn value(&self) -> Option<&'a V> {
        self.read().map(|(_, value)| value)
    }
}

impl<T, X, S, E, A: Allocator> Clone for Cursor<'_, T, X, S, E, A> {
    fn clone(&self) -> Self {
        Cursor::new(self.table, self.bucket, self.current)
    }
}

impl<T, X, S, E, A: Allocator> PartialEq for Cursor<'_, T, X, S, E, A> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.table, other.table) && self.current == other.current
    }
}

impl<T: Debug, X, S, E, A: Allocator> Debug for Cursor<'_, T, X, S, E, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cursor").field(&self.read()).finish()
    }
}

/// A position within a [`HashTable`] which can remove the element it points at.
///
/// Cursors over maps give mutable access to the mapped value, never to the key, since changing a
/// key would change its hash.
///
/// A set of pairs hashes the whole pair, so its cursors only read:
/// ```compile_fail
/// # use allocated_std::collections::hash::HashSet;
/// let mut set = HashSet::from([(1, 2)]);
/// *set.insert((1, 3)).0.value_mut().unwrap() = 9;
/// ```
pub struct CursorMut<'a, T, X, S, E, A: Allocator> {
    pub(crate) table: &'a mut HashTable<T, X, S, E, A>,
    pub(crate) bucket: usize,
    pub(crate) current: Link<T>,
}

impl<'a, T, X, S, E, A: Allocator> CursorMut<'a, T, X, S, E, A> {
    pub(crate) const fn new(
        table: &'a mut HashTable<T, X, S, E, A>,
        bucket: usize,
        current: Link<T>,
    ) -> Self {
        CursorMut {
            table,
            bucket,
            current,
        }
    }

    pub const fn is_end(&self) -> bool {
        self.current.is_none()
    }

    pub fn read(&self) -> Option<&T> {
        self.current.map(|node| node.value())
    }

    /// Consumes the cursor, returning a reference to the element for the rest of the borrow.
    pub fn into_ref(self) -> Option<&'a T> {
        self.current.map(|node| node.value())
    }

    pub fn move_next(&mut self) -> &mut Self {
        (self.bucket, self.current) = step(&self.table.buckets, self.bucket, self.current);
        self
    }

    /// Removes the element at the cursor and returns it, moving the cursor to the next element. At
    /// the end, nothing is removed.
    pub fn remove_current(&mut self) -> Option<T> {
        let node = self.current?;
        let bucket = self.bucket;
        (self.bucket, self.current) = step(&self.table.buckets, bucket, Some(node));
        Some(self.table.remove_node(bucket, node))
    }

    /// Returns a read-only cursor at the same position.
    pub fn as_cursor(&self) -> Cursor<'_, T, X, S, E, A> {
        Cursor::new(self.table, self.bucket, self.current)
    }
}

impl<'a, K, V, X, S, E, A: Allocator> CursorMut<'a, (K, V), X, S, E, A> {
    pub fn key(&self) -> Option<&K> {
        self.read().map(|(key, _)| key)
    }

    pub fn value(&self) -> Option<&V> {
        self.read().map(|(_, value)| value)
    }
}

/// Mutable access to values is only given out for maps, where the value isn't part of the key.
impl<'a, K, V, S, E, A: Allocator> CursorMut<'a, (K, V), First, S, E, A> {
    pub fn value_mut(&mut self) -> Option<&mut V> {
        self.current.map(|node| &mut node.value_mut().1)
    }

    /// Consumes the cursor, returning the mapped value for the rest of the borrow.
    pub fn into_value_mut(self) -> Option<&'a mut V> {
        self.current.map(|node| &mut NodePtr::value_mut(node).1)
    }
}

impl<T: Debug, X, S, E, A: Allocator> Debug for CursorMut<'_, T, X, S, E, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CursorMut").field(&self.read()).finish()
    }
}

/// The position after `current` in iteration order, wrapping from the end to the first element.
fn step<T>(buckets: &[Link<T>], bucket: usize, current: Link<T>) -> (usize, Link<T>) {
    match current {
        Some(node) => match node.next() {
            Some(next) => (bucket, Some(next)),
            None => next_occupied(buckets, bucket + 1),
        },
        None => next_occupied(buckets, 0),
    }
}
