use std::mem;
use std::ptr::NonNull;

use super::{AllocError, AllocTraits, Allocator};

/// Owns exactly one allocation and the value constructed in it, until the value is handed over
/// to a container with [`NodeGuard::into_raw`].
///
/// If the guard is dropped first (an early return or a panic while the container is still deciding
/// where the node goes), the value is destroyed and the storage released through the same
/// allocator.
pub struct NodeGuard<'a, T, A: Allocator> {
    traits: &'a AllocTraits<T, A>,
    ptr: NonNull<T>,
    constructed: bool,
}

impl<'a, T, A: Allocator> NodeGuard<'a, T, A> {
    /// Allocates storage for one `T` and constructs `value` in it.
    ///
    /// # Errors
    /// Returns an [`AllocError`] if the allocation fails, in which case `value` is dropped.
    pub fn new(traits: &'a AllocTraits<T, A>, value: T) -> Result<NodeGuard<'a, T, A>, AllocError> {
        let ptr = traits.allocate(1)?;
        let mut guard = NodeGuard {
            traits,
            ptr,
            constructed: false,
        };

        // SAFETY: ptr is freshly allocated for one T. If the construct hook panics, the guard only
        // releases the storage.
        unsafe { traits.construct(ptr, value) };
        guard.constructed = true;

        Ok(guard)
    }

    pub const fn as_ptr(&self) -> NonNull<T> {
        self.ptr
    }

    pub fn get_mut(&mut self) -> &mut T {
        // SAFETY: The value is constructed and uniquely owned by the guard.
        unsafe { self.ptr.as_mut() }
    }

    /// Disarms the guard, transferring ownership of the allocation and value to the caller.
    pub fn into_raw(self) -> NonNull<T> {
        let ptr = self.ptr;
        mem::forget(self);
        ptr
    }
}

impl<T, A: Allocator> Drop for NodeGuard<'_, T, A> {
    fn drop(&mut self) {
        // SAFETY: The guard still owns ptr, which holds a value iff constructed is set.
        unsafe {
            if self.constructed {
                self.traits.destroy(self.ptr);
            }
            self.traits.deallocate(self.ptr, 1);
        }
    }
}
