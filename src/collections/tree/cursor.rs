use std::fmt::{self, Debug, Formatter};

use super::RbTree;
use super::node::{Link, NodePtr};
use crate::alloc::Allocator;
use crate::collections::key::First;

/// A read-only position within an [`RbTree`].
///
/// A cursor either points at an element or at the end, which sits both one past the last element
/// and one before the first. Moving forward from the end wraps around to the first element and
/// moving backward wraps to the last, the same way the cursors of [`std::collections::LinkedList`]
/// do.
pub struct Cursor<'a, T, X, C, A: Allocator> {
    pub(crate) tree: &'a RbTree<T, X, C, A>,
    pub(crate) current: Link<T>,
}

impl<'a, T, X, C, A: Allocator> Cursor<'a, T, X, C, A> {
    pub(crate) const fn new(tree: &'a RbTree<T, X, C, A>, current: Link<T>) -> Self {
        Cursor {
            tree,
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
        self.next_node().map(|node| node.value())
    }

    pub fn read_prev(&self) -> Option<&'a T> {
        self.prev_node().map(|node| node.value())
    }

    pub fn move_next(&mut self) -> &mut Self {
        self.current = self.next_node();
        self
    }

    pub fn move_prev(&mut self) -> &mut Self {
        self.current = self.prev_node();
        self
    }

    fn next_node(&self) -> Link<T> {
        match self.current {
            Some(node) => node.successor(),
            None => self.tree.leftmost,
        }
    }

    fn prev_node(&self) -> Link<T> {
        match self.current {
            Some(node) => node.predecessor(),
            None => self.tree.rightmost,
        }
    }
}

impl<'a, K, V, X, C, A: Allocator> Cursor<'a, (K, V), X, C, A> {
    pub fn key(&self) -> Option<&'a K> {
        self.read().map(|(key, _)| key)
    }

    pub fn value(&self) -> Option<&'a V> {
        self.read().map(|(_, value)| value)
    }
}

impl<T, X, C, A: Allocator> Clone for Cursor<'_, T, X, C, A> {
    fn clone(&self) -> Self {
        Cursor::new(self.tree, self.current)
    }
}

impl<T, X, C, A: Allocator> PartialEq for Cursor<'_, T, X, C, A> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.current == other.current
    }
}

impl<T: Debug, X, C, A: Allocator> Debug for Cursor<'_, T, X, C, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cursor").field(&self.read()).finish()
    }
}

/// A position within an [`RbTree`] which can remove the element it points at.
///
/// Elements can't be modified through the cursor in general, because that could change their
/// order. Cursors over maps give mutable access to the mapped value.
///
/// A set of pairs stores the whole pair as its key, so its cursors only read:
/// ```compile_fail
/// # use allocated_std::collections::tree::TreeSet;
/// let mut set = TreeSet::from([(1, 2)]);
/// *set.insert((1, 3)).0.value_mut().unwrap() = 9;
/// ```
pub struct CursorMut<'a, T, X, C, A: Allocator> {
    pub(crate) tree: &'a mut RbTree<T, X, C, A>,
    pub(crate) current: Link<T>,
}

impl<'a, T, X, C, A: Allocator> CursorMut<'a, T, X, C, A> {
    pub(crate) const fn new(tree: &'a mut RbTree<T, X, C, A>, current: Link<T>) -> Self {
        CursorMut {
            tree,
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
        self.current = match self.current {
            Some(node) => node.successor(),
            None => self.tree.leftmost,
        };
        self
    }

    pub fn move_prev(&mut self) -> &mut Self {
        self.current = match self.current {
            Some(node) => node.predecessor(),
            None => self.tree.rightmost,
        };
        self
    }

    /// Removes the element at the cursor and returns it, moving the cursor to the next element. At
    /// the end, nothing is removed.
    pub fn remove_current(&mut self) -> Option<T> {
        let node = self.current?;
        self.current = node.successor();
        Some(self.tree.remove_node(node))
    }

    /// Returns a read-only cursor at the same position.
    pub fn as_cursor(&self) -> Cursor<'_, T, X, C, A> {
        Cursor::new(self.tree, self.current)
    }
}

impl<'a, K, V, X, C, A: Allocator> CursorMut<'a, (K, V), X, C, A> {
    pub fn key(&self) -> Option<&K> {
        self.read().map(|(key, _)| key)
    }

    pub fn value(&self) -> Option<&V> {
        self.read().map(|(_, value)| value)
    }
}

/// Mutable access to values is only given out for maps, where the value isn't part of the key.
impl<'a, K, V, C, A: Allocator> CursorMut<'a, (K, V), First, C, A> {
    pub fn value_mut(&mut self) -> Option<&mut V> {
        self.current.map(|node| &mut node.value_mut().1)
    }

    /// Consumes the cursor, returning the mapped value for the rest of the borrow.
    pub fn into_value_mut(self) -> Option<&'a mut V> {
        self.current.map(|node| &mut NodePtr::value_mut(node).1)
    }
}

impl<T: Debug, X, C, A: Allocator> Debug for CursorMut<'_, T, X, C, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CursorMut").field(&self.read()).finish()
    }
}
