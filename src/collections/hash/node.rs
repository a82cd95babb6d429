use std::ptr::NonNull;

pub(crate) type Link<T> = Option<NodePtr<T>>;

/// An entry in a bucket chain. The hash of the key is computed once on insertion and kept, so
/// rehashing and chain scans never call back into the hasher.
pub(crate) struct HashNode<T> {
    pub value: T,
    pub hash: u64,
    pub next: Link<T>,
}

impl<T> HashNode<T> {
    pub const fn new(value: T, hash: u64) -> HashNode<T> {
        HashNode {
            value,
            hash,
            next: None,
        }
    }
}

// NOTE: A NodePtr always points to a live node owned by exactly one table, which controls access
// to it through &self or &mut self.

#[derive(Debug)]
pub(crate) struct NodePtr<T>(pub NonNull<HashNode<T>>);

impl<T> NodePtr<T> {
    pub const fn value<'a>(self) -> &'a T {
        // SAFETY: The node is live, see the note above.
        unsafe { &(*self.0.as_ptr()).value }
    }

    #[allow(clippy::mut_from_ref)]
    pub fn value_mut<'a>(self) -> &'a mut T {
        // SAFETY: The node is live and the caller holds the table mutably.
        unsafe { &mut (*self.0.as_ptr()).value }
    }

    pub const fn hash(self) -> u64 {
        // SAFETY: The node is live.
        unsafe { (*self.0.as_ptr()).hash }
    }

    pub const fn next(self) -> Link<T> {
        // SAFETY: The node is live.
        unsafe { (*self.0.as_ptr()).next }
    }

    pub fn set_next(self, next: Link<T>) {
        // SAFETY: The node is live and only the link is written through this pointer.
        unsafe { (*self.0.as_ptr()).next = next }
    }

    pub const fn as_non_null(self) -> NonNull<HashNode<T>> {
        self.0
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
