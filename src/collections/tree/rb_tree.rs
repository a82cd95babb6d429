use std::borrow::Borrow;
use std::fmt::{self, Debug, Formatter};
use std::marker::PhantomData;
use std::mem;
use std::ptr;

use super::node::{Color, Link, Node, NodePtr, is_black};
use super::{Cursor, CursorMut, IntoIter, Iter};
use crate::alloc::{AllocError, AllocTraits, Allocator, Global, MoveStrategy, NodeGuard};
use crate::collections::key::{Compare, KeyOf};
use crate::util::option::OptionExtension;

use Color::*;

/// A red-black tree, the engine behind [`TreeMap`](super::TreeMap),
/// [`TreeMultiMap`](super::TreeMultiMap), [`TreeSet`](super::TreeSet) and
/// [`TreeMultiSet`](super::TreeMultiSet).
///
/// The tree stores whole values of type `T`, ordered by the key that `X` extracts from each value
/// under the comparator `C`. Every node is allocated individually through `A`, rebound to the node
/// type. It supports both unique keys ([`RbTree::try_insert_unique`]) and repeated keys
/// ([`RbTree::try_insert_equal`]); the facades only choose which to call.
///
/// Nil is represented by [`None`] links rather than a shared sentinel node. The tree itself holds
/// the root and caches the leftmost and rightmost nodes, so the first and last values are `O(1)`
/// and the one-past-the-end position is a cursor pointing at nothing.
///
/// # Invariants
/// - The root is black.
/// - A red node has no red children.
/// - Every path from a node down to a nil link passes through the same number of black nodes.
/// - An in-order walk yields keys in non-decreasing order under `C`.
///
/// Nodes never move in memory once linked, so erasing one element only invalidates positions
/// referring to that element.
///
/// # Time Complexity
/// For this analysis of time complexity, variables are defined as follows:
/// - `n`: The number of items in the tree.
/// - `k`: The number of items with a key equal to the one in question.
///
/// | Method | Complexity |
/// |-|-|
/// | `len` | `O(1)` |
/// | `first` / `last` | `O(1)` |
/// | `try_insert_unique` | `O(log n)` |
/// | `try_insert_equal` | `O(log n)` |
/// | `find` | `O(log n)` |
/// | `lower_bound` / `upper_bound` | `O(log n)` |
/// | `equal_range` / `count` | `O(log n + k)` |
/// | `remove` | `O(log n)` |
/// | `erase` | `O(log n + k)` |
/// | `try_clone` | `O(n)` |
pub struct RbTree<T, X, C, A: Allocator = Global> {
    pub(crate) root: Link<T>,
    pub(crate) leftmost: Link<T>,
    pub(crate) rightmost: Link<T>,
    pub(crate) len: usize,
    pub(crate) compare: C,
    pub(crate) traits: AllocTraits<Node<T>, A>,
    pub(crate) _phantom: PhantomData<(T, fn() -> X)>,
}

/// Where a new node should be attached: as the `left` or right child of `parent`, or as the root if
/// `parent` is None.
#[derive(Debug)]
pub(crate) struct Slot<T> {
    pub parent: Link<T>,
    pub left: bool,
}

impl<T, X, C, A: Allocator> RbTree<T, X, C, A> {
    /// Creates an empty tree. No memory is allocated until the first insertion.
    pub const fn new_in(compare: C, alloc: A) -> RbTree<T, X, C, A> {
        RbTree {
            root: None,
            leftmost: None,
            rightmost: None,
            len: 0,
            compare,
            traits: AllocTraits::new(alloc),
            _phantom: PhantomData,
        }
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The largest number of elements the tree could theoretically hold.
    pub const fn max_size(&self) -> usize {
        AllocTraits::<Node<T>, A>::max_size()
    }

    pub const fn allocator(&self) -> &A {
        self.traits.allocator()
    }

    pub const fn comparator(&self) -> &C {
        &self.compare
    }

    pub fn first(&self) -> Option<&T> {
        self.leftmost.map(|node| node.value())
    }

    pub fn last(&self) -> Option<&T> {
        self.rightmost.map(|node| node.value())
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.leftmost, self.rightmost, self.len)
    }

    /// Returns an iterator over the elements from `first` up to (excluding) `last`.
    ///
    /// `first` must not come after `last`. Both cursors must belong to this tree; this is only
    /// checked in debug builds.
    pub fn range(
        &self,
        first: &Cursor<'_, T, X, C, A>,
        last: &Cursor<'_, T, X, C, A>,
    ) -> Iter<'_, T> {
        debug_assert!(
            ptr::eq(first.tree, self) && ptr::eq(last.tree, self),
            "Range bounds from another tree!"
        );
        self.iter_between(first.current, last.current)
    }

    /// Iterates over `[first, last)`, counting its length up front.
    pub(crate) fn iter_between(&self, first: Link<T>, last: Link<T>) -> Iter<'_, T> {
        let mut len = 0;
        let mut current = first;
        while current != last
            && let Some(node) = current
        {
            current = node.successor();
            len += 1;
        }

        let back = match last {
            Some(node) => node.predecessor(),
            None => self.rightmost,
        };
        Iter::new(first, back, len)
    }

    /// Returns a cursor at the first element, or at the end if the tree is empty.
    pub fn cursor_front(&self) -> Cursor<'_, T, X, C, A> {
        Cursor::new(self, self.leftmost)
    }

    /// Returns a cursor at the last element, or at the end if the tree is empty.
    pub fn cursor_back(&self) -> Cursor<'_, T, X, C, A> {
        Cursor::new(self, self.rightmost)
    }

    pub fn cursor_front_mut(&mut self) -> CursorMut<'_, T, X, C, A> {
        let current = self.leftmost;
        CursorMut::new(self, current)
    }

    pub fn cursor_back_mut(&mut self) -> CursorMut<'_, T, X, C, A> {
        let current = self.rightmost;
        CursorMut::new(self, current)
    }

    /// Removes and returns the first element.
    pub fn pop_first(&mut self) -> Option<T> {
        let node = self.leftmost?;
        Some(self.remove_node(node))
    }

    /// Removes and returns the last element.
    pub fn pop_last(&mut self) -> Option<T> {
        let node = self.rightmost?;
        Some(self.remove_node(node))
    }

    /// Removes every element, keeping the allocator and comparator.
    pub fn clear(&mut self) {
        // Reset the header first, so that a panicking destructor can at worst leak nodes.
        let root = self.root.take();
        self.leftmost = None;
        self.rightmost = None;
        self.len = 0;

        if root.is_some() {
            trace!("tearing down tree");
        }
        self.destroy_subtree(root);
    }

    /// Keeps only the elements for which `keep` returns true, visiting them in order.
    pub fn retain<F: FnMut(&T) -> bool>(&mut self, mut keep: F) {
        let mut cursor = self.cursor_front_mut();
        while let Some(value) = cursor.read() {
            if keep(value) {
                cursor.move_next();
            } else {
                cursor.remove_current();
            }
        }
    }

    /// Exchanges the contents of two trees, including their comparators. Allocators are exchanged
    /// only if they propagate on swap; otherwise they must compare equal.
    pub fn swap(&mut self, other: &mut RbTree<T, X, C, A>) {
        self.traits.swap(&mut other.traits);
        mem::swap(&mut self.root, &mut other.root);
        mem::swap(&mut self.leftmost, &mut other.leftmost);
        mem::swap(&mut self.rightmost, &mut other.rightmost);
        mem::swap(&mut self.len, &mut other.len);
        mem::swap(&mut self.compare, &mut other.compare);
    }

    /// Moves every node of `source` into `self`, which must be empty.
    fn steal_nodes(&mut self, source: &mut RbTree<T, X, C, A>) {
        debug_assert!(self.root.is_none());
        self.root = source.root.take();
        self.leftmost = source.leftmost.take();
        self.rightmost = source.rightmost.take();
        self.len = mem::take(&mut source.len);
    }

    /// Detaches `node` and returns its value, releasing the node's storage.
    pub(crate) fn remove_node(&mut self, node: NodePtr<T>) -> T {
        self.unlink(node);
        // SAFETY: The node is unlinked, so nothing else refers to it. The value is read out exactly
        // once and the storage released without running its destructor again.
        unsafe {
            let value = ptr::read(&raw const (*node.as_non_null().as_ptr()).value);
            self.traits.deallocate(node.as_non_null(), 1);
            value
        }
    }

    /// Detaches `node` and destroys it.
    pub(crate) fn erase_node(&mut self, node: NodePtr<T>) {
        self.unlink(node);
        self.destroy_node(node);
    }

    /// Erases every node in `[first, last)`.
    pub(crate) fn erase_range(&mut self, first: Link<T>, last: Link<T>) -> usize {
        if first == self.leftmost && last.is_none() {
            let count = self.len;
            self.clear();
            return count;
        }

        let mut count = 0;
        let mut current = first;
        while current != last
            && let Some(node) = current
        {
            current = node.successor();
            self.erase_node(node);
            count += 1;
        }
        count
    }

    fn destroy_node(&self, node: NodePtr<T>) {
        // SAFETY: The node is no longer reachable from the tree and was allocated by self.traits.
        unsafe {
            self.traits.destroy(node.as_non_null());
            self.traits.deallocate(node.as_non_null(), 1);
        }
    }

    /// Post-order teardown: recurse into right subtrees, loop down left spines.
    fn destroy_subtree(&self, mut link: Link<T>) {
        while let Some(node) = link {
            self.destroy_subtree(node.right());
            link = node.left();
            self.destroy_node(node);
        }
    }

    /// Attaches the red node `node` at `slot`, then restores the red-black properties.
    pub(crate) fn link(&mut self, node: NodePtr<T>, slot: Slot<T>) {
        node.set_parent(slot.parent);

        match slot.parent {
            None => {
                self.root = Some(node);
                self.leftmost = Some(node);
                self.rightmost = Some(node);
            },
            Some(parent) if slot.left => {
                parent.set_left(Some(node));
                // A new minimum can only be attached to the left of the old one.
                if self.leftmost == Some(parent) {
                    self.leftmost = Some(node);
                }
            },
            Some(parent) => {
                parent.set_right(Some(node));
                if self.rightmost == Some(parent) {
                    self.rightmost = Some(node);
                }
            },
        }

        self.insert_fixup(node);
        self.len += 1;
    }

    /// Replaces `old` with `new` in the child links of `parent`, or as the root.
    fn replace_child(&mut self, parent: Link<T>, old: NodePtr<T>, new: Link<T>) {
        match parent {
            None => self.root = new,
            Some(p) if p.left() == Some(old) => p.set_left(new),
            Some(p) => p.set_right(new),
        }
    }

    fn rotate_left(&mut self, x: NodePtr<T>) {
        // SAFETY: Rotations are only applied where the fixup cases guarantee a right child.
        let y = unsafe { x.right().unreachable() };

        x.set_right(y.left());
        if let Some(inner) = y.left() {
            inner.set_parent(Some(x));
        }

        y.set_parent(x.parent());
        self.replace_child(x.parent(), x, Some(y));

        y.set_left(Some(x));
        x.set_parent(Some(y));
    }

    fn rotate_right(&mut self, x: NodePtr<T>) {
        // SAFETY: Rotations are only applied where the fixup cases guarantee a left child.
        let y = unsafe { x.left().unreachable() };

        x.set_left(y.right());
        if let Some(inner) = y.right() {
            inner.set_parent(Some(x));
        }

        y.set_parent(x.parent());
        self.replace_child(x.parent(), x, Some(y));

        y.set_right(Some(x));
        x.set_parent(Some(y));
    }

    fn insert_fixup(&mut self, mut node: NodePtr<T>) {
        while let Some(mut parent) = node.parent()
            && parent.color() == Red
        {
            // SAFETY: The root is black, so a red parent always has a parent of its own.
            let grandparent = unsafe { parent.parent().unreachable() };

            if grandparent.left() == Some(parent) {
                let uncle = grandparent.right();
                if let Some(uncle) = uncle
                    && uncle.color() == Red
                {
                    parent.set_color(Black);
                    uncle.set_color(Black);
                    grandparent.set_color(Red);
                    node = grandparent;
                } else {
                    if parent.right() == Some(node) {
                        // Inner child: rotate it to the outside first.
                        node = parent;
                        self.rotate_left(node);
                        // SAFETY: node was just rotated below its old child.
                        parent = unsafe { node.parent().unreachable() };
                    }
                    parent.set_color(Black);
                    grandparent.set_color(Red);
                    self.rotate_right(grandparent);
                }
            } else {
                let uncle = grandparent.left();
                if let Some(uncle) = uncle
                    && uncle.color() == Red
                {
                    parent.set_color(Black);
                    uncle.set_color(Black);
                    grandparent.set_color(Red);
                    node = grandparent;
                } else {
                    if parent.left() == Some(node) {
                        node = parent;
                        self.rotate_right(node);
                        // SAFETY: node was just rotated below its old child.
                        parent = unsafe { node.parent().unreachable() };
                    }
                    parent.set_color(Black);
                    grandparent.set_color(Red);
                    self.rotate_left(grandparent);
                }
            }
        }

        if let Some(root) = self.root {
            root.set_color(Black);
        }
    }

    /// Moves `new` into the position of `old`, as far as `old`'s parent is concerned.
    fn transplant(&mut self, old: NodePtr<T>, new: Link<T>) {
        self.replace_child(old.parent(), old, new);
        if let Some(new) = new {
            new.set_parent(old.parent());
        }
    }

    /// Detaches `node` from the tree and rebalances. The node's own links are left stale.
    fn unlink(&mut self, node: NodePtr<T>) {
        if self.leftmost == Some(node) {
            self.leftmost = node.successor();
        }
        if self.rightmost == Some(node) {
            self.rightmost = node.predecessor();
        }

        let mut removed_color = node.color();
        // The node that moves into the vacated position, and its parent (tracked separately,
        // because the replacement may be nil).
        let replacement;
        let replacement_parent;

        match (node.left(), node.right()) {
            (None, right) => {
                replacement = right;
                replacement_parent = node.parent();
                self.transplant(node, right);
            },
            (left, None) => {
                replacement = left;
                replacement_parent = node.parent();
                self.transplant(node, left);
            },
            (Some(left), Some(right)) => {
                // Splice in the successor node itself, so that no value changes address.
                let successor = right.minimum();
                removed_color = successor.color();
                replacement = successor.right();

                if successor.parent() == Some(node) {
                    replacement_parent = Some(successor);
                } else {
                    replacement_parent = successor.parent();
                    self.transplant(successor, successor.right());
                    successor.set_right(Some(right));
                    right.set_parent(Some(successor));
                }

                self.transplant(node, Some(successor));
                successor.set_left(Some(left));
                left.set_parent(Some(successor));
                successor.set_color(node.color());
            },
        }

        if removed_color == Black {
            self.erase_fixup(replacement, replacement_parent);
        }

        self.len -= 1;
    }

    fn erase_fixup(&mut self, mut node: Link<T>, mut parent: Link<T>) {
        while node != self.root
            && is_black(node)
            && let Some(p) = parent
        {
            if p.left() == node {
                // SAFETY: node's side is one black short, so its sibling's side has at least one
                // black node.
                let mut sibling = unsafe { p.right().unreachable() };

                if sibling.color() == Red {
                    sibling.set_color(Black);
                    p.set_color(Red);
                    self.rotate_left(p);
                    // SAFETY: As above, after rotating the old sibling's child into its place.
                    sibling = unsafe { p.right().unreachable() };
                }

                if is_black(sibling.left()) && is_black(sibling.right()) {
                    sibling.set_color(Red);
                    node = Some(p);
                    parent = p.parent();
                } else {
                    if is_black(sibling.right()) {
                        // Near nephew red, far nephew black: rotate the red one outwards.
                        if let Some(near) = sibling.left() {
                            near.set_color(Black);
                        }
                        sibling.set_color(Red);
                        self.rotate_right(sibling);
                        // SAFETY: The near nephew has just become the sibling.
                        sibling = unsafe { p.right().unreachable() };
                    }

                    sibling.set_color(p.color());
                    p.set_color(Black);
                    if let Some(far) = sibling.right() {
                        far.set_color(Black);
                    }
                    self.rotate_left(p);
                    node = self.root;
                    parent = None;
                }
            } else {
                // SAFETY: See the mirrored case above.
                let mut sibling = unsafe { p.left().unreachable() };

                if sibling.color() == Red {
                    sibling.set_color(Black);
                    p.set_color(Red);
                    self.rotate_right(p);
                    // SAFETY: See the mirrored case above.
                    sibling = unsafe { p.left().unreachable() };
                }

                if is_black(sibling.right()) && is_black(sibling.left()) {
                    sibling.set_color(Red);
                    node = Some(p);
                    parent = p.parent();
                } else {
                    if is_black(sibling.left()) {
                        if let Some(near) = sibling.right() {
                            near.set_color(Black);
                        }
                        sibling.set_color(Red);
                        self.rotate_left(sibling);
                        // SAFETY: See the mirrored case above.
                        sibling = unsafe { p.left().unreachable() };
                    }

                    sibling.set_color(p.color());
                    p.set_color(Black);
                    if let Some(far) = sibling.left() {
                        far.set_color(Black);
                    }
                    self.rotate_right(p);
                    node = self.root;
                    parent = None;
                }
            }
        }

        if let Some(node) = node {
            node.set_color(Black);
        }
    }

    /// Move-assigns `source` into `self`, following the allocator's move propagation.
    ///
    /// When the allocators neither propagate nor compare equal, every element is moved into a node
    /// allocated by `self`'s allocator.
    ///
    /// # Errors
    /// Returns an [`AllocError`] if relocating an element fails. `self` then holds the elements
    /// relocated so far; the rest are dropped.
    pub fn try_assign(&mut self, mut source: RbTree<T, X, C, A>) -> Result<(), AllocError>
    where
        X: KeyOf<T>,
        C: Compare<X::Key>,
    {
        match self.traits.move_strategy(&source.traits) {
            MoveStrategy::Adopt => {
                *self = source;
            },
            MoveStrategy::Steal => {
                self.clear();
                self.steal_nodes(&mut source);
                mem::swap(&mut self.compare, &mut source.compare);
            },
            MoveStrategy::Relocate => {
                self.clear();
                mem::swap(&mut self.compare, &mut source.compare);
                while let Some(value) = source.pop_first() {
                    self.try_insert_equal_node(value)?;
                }
            },
        }
        Ok(())
    }

    #[cfg(test)]
    /// Checks every structural invariant of the tree, panicking with a description of the first
    /// violation found.
    pub(crate) fn check_invariants(&self)
    where
        X: KeyOf<T>,
        C: Compare<X::Key>,
    {
        fn black_height<T, X: KeyOf<T>, C: Compare<X::Key>>(
            link: Link<T>,
            parent: Link<T>,
            compare: &C,
        ) -> usize {
            let Some(node) = link else { return 1 };

            assert!(node.parent() == parent, "Parent link should point back to the parent.");
            if node.color() == Red {
                assert!(is_black(node.left()), "A red node's left child should be black.");
                assert!(is_black(node.right()), "A red node's right child should be black.");
            }
            if let Some(left) = node.left() {
                assert!(
                    !compare.less(X::key(node.value()), X::key(left.value())),
                    "A left child shouldn't sort after its parent."
                );
            }
            if let Some(right) = node.right() {
                assert!(
                    !compare.less(X::key(right.value()), X::key(node.value())),
                    "A right child shouldn't sort before its parent."
                );
            }

            let left = black_height::<T, X, C>(node.left(), Some(node), compare);
            let right = black_height::<T, X, C>(node.right(), Some(node), compare);
            assert_eq!(left, right, "Paths should pass through the same number of black nodes.");

            left + usize::from(node.color() == Black)
        }

        assert!(!super::node::is_red(self.root), "The root should be black.");
        black_height::<T, X, C>(self.root, None, &self.compare);

        assert!(self.leftmost == self.root.map(NodePtr::minimum), "Leftmost should be cached.");
        assert!(self.rightmost == self.root.map(NodePtr::maximum), "Rightmost should be cached.");

        let mut count = 0;
        let mut previous: Option<&T> = None;
        let mut current = self.leftmost;
        while let Some(node) = current {
            if let Some(previous) = previous {
                assert!(
                    !self.compare.less(X::key(node.value()), X::key(previous)),
                    "An in-order walk should yield non-decreasing keys."
                );
            }
            previous = Some(node.value());
            current = node.successor();
            count += 1;
        }
        assert_eq!(count, self.len, "The length should match the number of reachable nodes.");
    }
}

impl<T, X: KeyOf<T>, C: Compare<X::Key>, A: Allocator> RbTree<T, X, C, A> {
    /// Finds where a value with `key` belongs if keys are unique. Returns the node already holding
    /// an equal key as the error.
    pub(crate) fn unique_slot<Q>(&self, key: &Q) -> Result<Slot<T>, NodePtr<T>>
    where
        X::Key: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let mut parent = None;
        let mut left = true;
        let mut current = self.root;

        while let Some(node) = current {
            parent = Some(node);
            left = self.key_less(key, node.value());
            current = if left { node.left() } else { node.right() };
        }

        // The only node which could hold an equal key is the in-order predecessor of the slot.
        let candidate = match parent {
            Some(p) if left => p.predecessor(),
            other => other,
        };

        match candidate {
            Some(existing) if !self.value_less(existing.value(), key) => Err(existing),
            _ => Ok(Slot {
                parent,
                left,
            }),
        }
    }

    /// Finds where a value with `key` belongs if keys may repeat: after every equal key, so that
    /// equal keys keep their insertion order.
    pub(crate) fn equal_slot(&self, key: &X::Key) -> Slot<T> {
        let mut parent = None;
        let mut left = true;
        let mut current = self.root;

        while let Some(node) = current {
            parent = Some(node);
            left = self.compare.less(key, X::key(node.value()));
            current = if left { node.left() } else { node.right() };
        }

        Slot {
            parent,
            left,
        }
    }

    /// Allocates a node for `value` and links it at `slot`.
    pub(crate) fn try_insert_at(
        &mut self,
        slot: Slot<T>,
        value: T,
    ) -> Result<NodePtr<T>, AllocError> {
        let node = NodePtr(NodeGuard::new(&self.traits, Node::new(value))?.into_raw());
        self.link(node, slot);
        Ok(node)
    }

    pub(crate) fn try_insert_unique_node(
        &mut self,
        value: T,
    ) -> Result<(NodePtr<T>, bool), AllocError> {
        match self.unique_slot::<X::Key>(X::key(&value)) {
            Ok(slot) => Ok((self.try_insert_at(slot, value)?, true)),
            Err(existing) => Ok((existing, false)),
        }
    }

    /// Looks up `key` and only builds a value out of it if no equal key is present. `make` must
    /// produce a value whose key is equal to `key`.
    pub(crate) fn try_insert_unique_with<F>(
        &mut self,
        key: X::Key,
        make: F,
    ) -> Result<(NodePtr<T>, bool), AllocError>
    where
        F: FnOnce(X::Key) -> T,
    {
        match self.unique_slot::<X::Key>(&key) {
            Ok(slot) => Ok((self.try_insert_at(slot, make(key))?, true)),
            Err(existing) => Ok((existing, false)),
        }
    }

    pub(crate) fn try_insert_equal_node(&mut self, value: T) -> Result<NodePtr<T>, AllocError> {
        let slot = self.equal_slot(X::key(&value));
        self.try_insert_at(slot, value)
    }

    /// Inserts `value` unless an element with an equal key is already present.
    ///
    /// Returns a cursor at the inserted element and true, or a cursor at the existing element and
    /// false. In the latter case `value` is dropped.
    ///
    /// # Errors
    /// Returns an [`AllocError`] if the node can't be allocated; the tree is unchanged.
    pub fn try_insert_unique(
        &mut self,
        value: T,
    ) -> Result<(CursorMut<'_, T, X, C, A>, bool), AllocError> {
        let (node, inserted) = self.try_insert_unique_node(value)?;
        Ok((CursorMut::new(self, Some(node)), inserted))
    }

    /// Inserts `value` after every element with an equal key.
    ///
    /// # Errors
    /// Returns an [`AllocError`] if the node can't be allocated; the tree is unchanged.
    pub fn try_insert_equal(&mut self, value: T) -> Result<CursorMut<'_, T, X, C, A>, AllocError> {
        let node = self.try_insert_equal_node(value)?;
        Ok(CursorMut::new(self, Some(node)))
    }

    /// Whether the key of `value` sorts before `key`.
    fn value_less<Q>(&self, value: &T, key: &Q) -> bool
    where
        X::Key: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        <C as Compare<Q>>::less(&self.compare, X::key(value).borrow(), key)
    }

    /// Whether `key` sorts before the key of `value`.
    fn key_less<Q>(&self, key: &Q, value: &T) -> bool
    where
        X::Key: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        <C as Compare<Q>>::less(&self.compare, key, X::key(value).borrow())
    }

    /// The first node whose key doesn't sort before `key`.
    pub(crate) fn lower_bound_node<Q>(&self, key: &Q) -> Link<T>
    where
        X::Key: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let mut bound = None;
        let mut current = self.root;

        while let Some(node) = current {
            if self.value_less(node.value(), key) {
                current = node.right();
            } else {
                bound = Some(node);
                current = node.left();
            }
        }
        bound
    }

    /// The first node whose key sorts after `key`.
    pub(crate) fn upper_bound_node<Q>(&self, key: &Q) -> Link<T>
    where
        X::Key: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let mut bound = None;
        let mut current = self.root;

        while let Some(node) = current {
            if self.key_less(key, node.value()) {
                bound = Some(node);
                current = node.left();
            } else {
                current = node.right();
            }
        }
        bound
    }

    /// The first node with a key equal to `key`.
    pub(crate) fn find_node<Q>(&self, key: &Q) -> Link<T>
    where
        X::Key: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        match self.lower_bound_node(key) {
            Some(node) if !self.key_less(key, node.value()) => Some(node),
            _ => None,
        }
    }

    /// Returns a cursor at the first element with a key equal to `key`, or at the end.
    pub fn find<Q>(&self, key: &Q) -> Cursor<'_, T, X, C, A>
    where
        X::Key: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        Cursor::new(self, self.find_node(key))
    }

    pub fn find_mut<Q>(&mut self, key: &Q) -> CursorMut<'_, T, X, C, A>
    where
        X::Key: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let node = self.find_node(key);
        CursorMut::new(self, node)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&T>
    where
        X::Key: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.find_node(key).map(|node| node.value())
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        X::Key: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.find_node(key).is_some()
    }

    /// Returns a cursor at the first element whose key doesn't sort before `key`.
    pub fn lower_bound<Q>(&self, key: &Q) -> Cursor<'_, T, X, C, A>
    where
        X::Key: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        Cursor::new(self, self.lower_bound_node(key))
    }

    /// Returns a cursor at the first element whose key sorts after `key`.
    pub fn upper_bound<Q>(&self, key: &Q) -> Cursor<'_, T, X, C, A>
    where
        X::Key: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        Cursor::new(self, self.upper_bound_node(key))
    }

    /// Returns an iterator over every element with a key equal to `key`, which is the range from
    /// [`lower_bound`](RbTree::lower_bound) up to (excluding) [`upper_bound`](RbTree::upper_bound).
    pub fn equal_range<Q>(&self, key: &Q) -> Iter<'_, T>
    where
        X::Key: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.iter_between(self.lower_bound_node(key), self.upper_bound_node(key))
    }

    pub fn count<Q>(&self, key: &Q) -> usize
    where
        X::Key: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.equal_range(key).len()
    }

    /// Removes the first element with a key equal to `key` and returns it.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<T>
    where
        X::Key: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let node = self.find_node(key)?;
        Some(self.remove_node(node))
    }

    /// Removes every element with a key equal to `key`, returning how many were removed.
    pub fn erase<Q>(&mut self, key: &Q) -> usize
    where
        X::Key: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let first = self.lower_bound_node(key);
        let last = self.upper_bound_node(key);
        self.erase_range(first, last)
    }
}

impl<T: Clone, X, C: Clone, A: Allocator> RbTree<T, X, C, A> {
    /// Creates a copy of the tree with the same shape and colors, using the allocator selected by
    /// [`Allocator::select_on_copy`].
    ///
    /// # Errors
    /// Returns an [`AllocError`] if any node can't be allocated. Everything allocated for the copy
    /// is released.
    pub fn try_clone(&self) -> Result<RbTree<T, X, C, A>, AllocError> {
        self.try_clone_in(self.traits.select_on_copy().into_allocator())
    }

    /// Creates a copy of the tree using `alloc`.
    ///
    /// # Errors
    /// Returns an [`AllocError`] if any node can't be allocated.
    pub fn try_clone_in(&self, alloc: A) -> Result<RbTree<T, X, C, A>, AllocError> {
        let mut tree = RbTree::new_in(self.compare.clone(), alloc);
        tree.copy_from(self)?;
        Ok(tree)
    }

    /// Copy-assigns `source` into `self`, adopting its allocator if the allocator propagates on
    /// copy.
    ///
    /// # Errors
    /// Returns an [`AllocError`] if any node can't be allocated, leaving `self` empty.
    pub fn try_clone_from(&mut self, source: &RbTree<T, X, C, A>) -> Result<(), AllocError> {
        self.clear();
        self.traits.copy_assign(&source.traits);
        self.compare = source.compare.clone();
        self.copy_from(source)
    }

    /// Copies the structure of `source` into `self`, which must be empty.
    fn copy_from(&mut self, source: &RbTree<T, X, C, A>) -> Result<(), AllocError> {
        debug_assert!(self.root.is_none());
        let Some(source_root) = source.root else { return Ok(()) };

        // Clears the partial copy if a clone panics or an allocation fails.
        let guard = ClearOnDrop(self);

        let root = guard.0.clone_node(source_root)?;
        guard.0.root = Some(root);
        guard.0.copy_children(source_root, root)?;

        let tree = guard.disarm();
        tree.leftmost = Some(root.minimum());
        tree.rightmost = Some(root.maximum());
        tree.len = source.len;
        Ok(())
    }

    /// Copies the children of `source` below `target`: recursing into right subtrees and looping
    /// down left spines. Every node is attached as soon as it exists, so a failure part way leaves
    /// nothing unreachable.
    fn copy_children(
        &mut self,
        mut source: NodePtr<T>,
        mut target: NodePtr<T>,
    ) -> Result<(), AllocError> {
        loop {
            if let Some(source_right) = source.right() {
                let right = self.clone_node(source_right)?;
                right.set_parent(Some(target));
                target.set_right(Some(right));
                self.copy_children(source_right, right)?;
            }

            match source.left() {
                Some(source_left) => {
                    let left = self.clone_node(source_left)?;
                    left.set_parent(Some(target));
                    target.set_left(Some(left));
                    source = source_left;
                    target = left;
                },
                None => return Ok(()),
            }
        }
    }

    fn clone_node(&self, source: NodePtr<T>) -> Result<NodePtr<T>, AllocError> {
        let mut node = Node::new(source.value().clone());
        node.color = source.color();
        Ok(NodePtr(NodeGuard::new(&self.traits, node)?.into_raw()))
    }
}

struct ClearOnDrop<'a, T, X, C, A: Allocator>(&'a mut RbTree<T, X, C, A>);

impl<'a, T, X, C, A: Allocator> ClearOnDrop<'a, T, X, C, A> {
    fn disarm(self) -> &'a mut RbTree<T, X, C, A> {
        let this = mem::ManuallyDrop::new(self);
        // SAFETY: self is never dropped, so the reference is moved out exactly once.
        unsafe { ptr::read(&this.0) }
    }
}

impl<T, X, C, A: Allocator> Drop for ClearOnDrop<'_, T, X, C, A> {
    fn drop(&mut self) {
        self.0.clear();
    }
}

impl<T, X, C, A: Allocator> Drop for RbTree<T, X, C, A> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T, X, C, A: Allocator> IntoIterator for RbTree<T, X, C, A> {
    type Item = T;

    type IntoIter = IntoIter<T, X, C, A>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            tree: self,
        }
    }
}

impl<'a, T, X, C, A: Allocator> IntoIterator for &'a RbTree<T, X, C, A> {
    type Item = &'a T;

    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// SAFETY: The tree owns its nodes exclusively, like a Box<Node<T>> would.
unsafe impl<T: Send, X, C: Send, A: Allocator + Send> Send for RbTree<T, X, C, A> {}

// SAFETY: Shared access to the tree only hands out shared references to values.
unsafe impl<T: Sync, X, C: Sync, A: Allocator + Sync> Sync for RbTree<T, X, C, A> {}

impl<T: Debug, X, C, A: Allocator> Debug for RbTree<T, X, C, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", draw_branch(self.root))
    }
}

/// Draws a subtree sideways, left children above their parent and right children below.
fn draw_branch<T: Debug>(link: Link<T>) -> String {
    match link {
        Some(node) => format!(
            "{}\n({:?} {:?})\n{}",
            indent(draw_branch(node.left()), "┌    "),
            node.color(),
            node.value(),
            indent(draw_branch(node.right()), "└    "),
        ),
        None => String::from("-"),
    }
}

fn indent(branch: String, prefix: &str) -> String {
    branch.lines().fold(String::new(), |mut out, line| {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(prefix);
        out.push_str(line);
        out
    })
}
