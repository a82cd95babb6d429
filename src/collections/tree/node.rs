use std::ptr::NonNull;

pub(crate) type Link<T> = Option<NodePtr<T>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Color {
    Red,
    Black,
}

use Color::*;

pub(crate) struct Node<T> {
    pub value: T,
    pub color: Color,
    pub parent: Link<T>,
    pub left: Link<T>,
    pub right: Link<T>,
}

impl<T> Node<T> {
    /// A new node is red and unlinked, ready to be attached as a leaf.
    pub const fn new(value: T) -> Node<T> {
        Node {
            value,
            color: Red,
            parent: None,
            left: None,
            right: None,
        }
    }
}

// NOTE: A NodePtr always points to a live node owned by exactly one tree. The accessors below rely
// on that, and on the tree (through &self or &mut self) controlling who may read or write the node.

#[derive(Debug)]
pub(crate) struct NodePtr<T>(pub NonNull<Node<T>>);

impl<T> NodePtr<T> {
    pub const fn value<'a>(self) -> &'a T {
        // SAFETY: The node is live, see the note above.
        unsafe { &(*self.0.as_ptr()).value }
    }

    #[allow(clippy::mut_from_ref)]
    pub fn value_mut<'a>(self) -> &'a mut T {
        // SAFETY: The node is live and the caller holds the tree mutably.
        unsafe { &mut (*self.0.as_ptr()).value }
    }

    pub const fn color(self) -> Color {
        // SAFETY: The node is live.
        unsafe { (*self.0.as_ptr()).color }
    }

    pub fn set_color(self, color: Color) {
        // SAFETY: The node is live and only links and colors are written through this pointer.
        unsafe { (*self.0.as_ptr()).color = color }
    }

    pub const fn parent(self) -> Link<T> {
        // SAFETY: The node is live.
        unsafe { (*self.0.as_ptr()).parent }
    }

    pub fn set_parent(self, parent: Link<T>) {
        // SAFETY: The node is live.
        unsafe { (*self.0.as_ptr()).parent = parent }
    }

    pub const fn left(self) -> Link<T> {
        // SAFETY: The node is live.
        unsafe { (*self.0.as_ptr()).left }
    }

    pub fn set_left(self, left: Link<T>) {
        // SAFETY: The node is live.
        unsafe { (*self.0.as_ptr()).left = left }
    }

    pub const fn right(self) -> Link<T> {
        // SAFETY: The node is live.
        unsafe { (*self.0.as_ptr()).right }
    }

    pub fn set_right(self, right: Link<T>) {
        // SAFETY: The node is live.
        unsafe { (*self.0.as_ptr()).right = right }
    }

    pub const fn as_non_null(self) -> NonNull<Node<T>> {
        self.0
    }

    /// The leftmost node of the subtree rooted here.
    pub fn minimum(self) -> NodePtr<T> {
        let mut node = self;
        while let Some(left) = node.left() {
            node = left;
        }
        node
    }

    /// The rightmost node of the subtree rooted here.
    pub fn maximum(self) -> NodePtr<T> {
        let mut node = self;
        while let Some(right) = node.right() {
            node = right;
        }
        node
    }

    /// The in-order successor: the minimum of the right subtree, or else the first ancestor
    /// reached by climbing out of a left subtree. None means this is the last node.
    pub fn successor(self) -> Link<T> {
        if let Some(right) = self.right() {
            return Some(right.minimum());
        }

        let mut node = self;
        let mut parent = node.parent();
        while let Some(p) = parent
            && p.right() == Some(node)
        {
            node = p;
            parent = p.parent();
        }
        parent
    }

    /// The in-order predecessor, mirroring [`NodePtr::successor`]. None means this is the first
    /// node.
    pub fn predecessor(self) -> Link<T> {
        if let Some(left) = self.left() {
            return Some(left.maximum());
        }

        let mut node = self;
        let mut parent = node.parent();
        while let Some(p) = parent
            && p.left() == Some(node)
        {
            node = p;
            parent = p.parent();
        }
        parent
    }
}

impl<T> Clone for NodePtr<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for NodePtr<T> {}

impl<T> PartialEq for NodePtr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for NodePtr<T> {}

/// Nil links count as black.
pub(crate) const fn color_of<T>(link: Link<T>) -> Color {
    match link {
        Some(node) => node.color(),
        None => Black,
    }
}

pub(crate) const fn is_red<T>(link: Link<T>) -> bool {
    matches!(color_of(link), Red)
}

pub(crate) const fn is_black<T>(link: Link<T>) -> bool {
    matches!(color_of(link), Black)
}
