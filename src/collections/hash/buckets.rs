use std::fmt::{self, Debug, Formatter};
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;
use std::slice;

use super::node::Link;
use crate::alloc::{AllocError, AllocTraits, Allocator};

/// The bucket array of a hash table: a fixed number of chain heads, allocated in one block through
/// the table's allocator.
///
/// Buckets don't free themselves, because they don't hold the allocator. The owning table calls
/// [`Buckets::release`] with the same allocator it allocated them with.
pub(crate) struct Buckets<T> {
    ptr: NonNull<Link<T>>,
    size: usize,
}

impl<T> Buckets<T> {
    /// Allocates `size` empty buckets.
    ///
    /// # Errors
    /// Returns an [`AllocError`] if the array can't be allocated.
    pub fn try_new<A: Allocator>(
        size: usize,
        traits: &AllocTraits<Link<T>, A>,
    ) -> Result<Buckets<T>, AllocError> {
        let ptr = traits.allocate(size)?;
        // SAFETY: ptr was just allocated for size links.
        Ok(unsafe { Self::init(ptr, size) })
    }

    /// Allocates `size` empty buckets, aborting if the allocator fails.
    pub fn new_or_abort<A: Allocator>(size: usize, traits: &AllocTraits<Link<T>, A>) -> Buckets<T> {
        let ptr = traits.allocate_or_abort(size);
        // SAFETY: ptr was just allocated for size links.
        unsafe { Self::init(ptr, size) }
    }

    /// # Safety
    /// `ptr` must be allocated for `size` links.
    unsafe fn init(ptr: NonNull<Link<T>>, size: usize) -> Buckets<T> {
        for i in 0..size {
            // SAFETY: i is within the allocation, and Link is Copy so nothing is overwritten.
            unsafe { ptr.add(i).write(None) };
        }

        Buckets {
            ptr,
            size,
        }
    }

    /// Frees the array. The chains must already have been destroyed or moved elsewhere.
    ///
    /// # Safety
    /// `traits` must use an allocator equal to the one the buckets were allocated with, and the
    /// buckets must not be used again.
    pub unsafe fn release<A: Allocator>(&self, traits: &AllocTraits<Link<T>, A>) {
        // SAFETY: Upheld by the caller, the size is the one allocated.
        unsafe { traits.deallocate(self.ptr, self.size) }
    }

    pub const fn size(&self) -> usize {
        self.size
    }
}

impl<T> Deref for Buckets<T> {
    type Target = [Link<T>];

    fn deref(&self) -> &Self::Target {
        // SAFETY: Every bucket is initialized on allocation.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.size) }
    }
}

impl<T> DerefMut for Buckets<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY: Every bucket is initialized on allocation.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.size) }
    }
}

impl<T> Debug for Buckets<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buckets")
            .field("size", &self.size)
            .field("occupied", &self.iter().filter(|head| head.is_some()).count())
            .finish()
    }
}
