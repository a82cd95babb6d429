use std::alloc::Layout;
use std::fmt::{self, Debug, Formatter};
use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;

use super::{AllocError, Allocator, CapacityOverflow, Propagation, allocate_or_abort};
use crate::util::result::ResultExtension;

const MAX_SIZE: usize = isize::MAX as usize;

/// A typed view over an [`Allocator`], and the only way containers talk to one.
///
/// `AllocTraits<T, A>` normalizes an allocator into a uniform call surface for a single element
/// type: allocation counts are in elements rather than bytes, construction and destruction go
/// through the allocator's optional hooks, and the propagation policy is turned into concrete
/// decisions for copy-assignment, move-assignment and swapping.
///
/// Containers need to allocate nodes rather than the values users see. [`AllocTraits::rebind`]
/// produces a view for another type that shares the same allocator instance, so equality and
/// propagation carry over.
pub struct AllocTraits<T, A: Allocator> {
    alloc: A,
    _phantom: PhantomData<fn() -> T>,
}

/// What a move-assignment should do with the source container's storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveStrategy {
    /// Adopt the source's allocator along with its storage.
    Adopt,
    /// The allocators are equal: take the storage, keeping the destination's allocator.
    Steal,
    /// The allocators differ and don't propagate: move each element into storage allocated by the
    /// destination's allocator.
    Relocate,
}

impl<T, A: Allocator> AllocTraits<T, A> {
    pub const fn new(alloc: A) -> AllocTraits<T, A> {
        AllocTraits {
            alloc,
            _phantom: PhantomData,
        }
    }

    /// Returns the underlying allocator.
    pub const fn allocator(&self) -> &A {
        &self.alloc
    }

    pub fn into_allocator(self) -> A {
        self.alloc
    }

    /// Returns the propagation policy of `A`.
    pub const fn propagation() -> Propagation {
        A::PROPAGATION
    }

    /// The maximum number of `T`s a single allocation could hold.
    pub const fn max_size() -> usize {
        match size_of::<T>() {
            0 => usize::MAX,
            size => MAX_SIZE / size,
        }
    }

    /// Creates the [`Layout`] for `n` contiguous elements.
    ///
    /// # Errors
    /// Returns [`CapacityOverflow`] if the layout would exceed [`isize::MAX`] bytes.
    pub fn layout(n: usize) -> Result<Layout, AllocError> {
        Layout::array::<T>(n).map_err(|_| CapacityOverflow.into())
    }

    /// Allocates uninitialized storage for `n` contiguous elements.
    ///
    /// # Errors
    /// Returns an [`AllocError`] if the layout overflows or the allocator fails.
    pub fn allocate(&self, n: usize) -> Result<NonNull<T>, AllocError> {
        let layout = Self::layout(n)?;
        match self.alloc.allocate(layout) {
            Ok(ptr) => Ok(ptr.cast()),
            Err(error) => {
                debug!("allocation of {} elements failed: {}", n, error);
                Err(error)
            },
        }
    }

    /// Allocates uninitialized storage for `n` contiguous elements, aborting on failure.
    ///
    /// # Panics
    /// Panics if the layout for `n` elements would exceed [`isize::MAX`] bytes.
    pub fn allocate_or_abort(&self, n: usize) -> NonNull<T> {
        let layout = Self::layout(n).throw();
        allocate_or_abort(&self.alloc, layout).cast()
    }

    /// Releases storage for `n` elements.
    ///
    /// # Safety
    /// `ptr` must have come from [`allocate`](Self::allocate) (or `allocate_or_abort`) with the
    /// same `n`, on an allocator equal to this one. Any elements must already be destroyed.
    pub unsafe fn deallocate(&self, ptr: NonNull<T>, n: usize) {
        // SAFETY: The layout was valid when the memory was allocated.
        let layout = unsafe { Layout::array::<T>(n).unwrap_unchecked() };
        // SAFETY: Upheld by the caller.
        unsafe { self.alloc.deallocate(ptr.cast(), layout) }
    }

    /// Moves `value` into the storage at `ptr`, through the allocator's `construct` hook.
    ///
    /// # Safety
    /// `ptr` must be allocated, properly aligned and not currently hold a live value.
    pub unsafe fn construct(&self, ptr: NonNull<T>, value: T) {
        // SAFETY: Upheld by the caller.
        unsafe { self.alloc.construct(ptr, value) }
    }

    /// Drops the value at `ptr`, through the allocator's `destroy` hook.
    ///
    /// # Safety
    /// `ptr` must hold a live value which is never used again.
    pub unsafe fn destroy(&self, ptr: NonNull<T>) {
        // SAFETY: Upheld by the caller.
        unsafe { self.alloc.destroy(ptr) }
    }

    /// Produces a view over the same allocator for another element type.
    pub fn rebind<U>(&self) -> AllocTraits<U, A> {
        AllocTraits::new(self.alloc.clone())
    }

    /// Returns true if storage allocated through `self` may be released through `other`.
    pub fn equals(&self, other: &AllocTraits<T, A>) -> bool {
        A::PROPAGATION.always_equal || self.alloc == other.alloc
    }

    /// The allocator view a copy of this container should use.
    pub fn select_on_copy(&self) -> AllocTraits<T, A> {
        AllocTraits::new(self.alloc.select_on_copy())
    }

    /// Applies copy-assignment propagation: adopts the allocator of `source` if the policy says to.
    /// Returns true if the allocator was replaced.
    ///
    /// The caller must release any storage held under the old allocator before calling this.
    pub fn copy_assign(&mut self, source: &AllocTraits<T, A>) -> bool {
        if A::PROPAGATION.on_copy && !self.equals(source) {
            self.alloc = source.alloc.clone();
            true
        } else {
            false
        }
    }

    /// Decides how a move-assignment from a container using `source` should treat its storage.
    pub fn move_strategy(&self, source: &AllocTraits<T, A>) -> MoveStrategy {
        let strategy = if A::PROPAGATION.on_move {
            MoveStrategy::Adopt
        } else if self.equals(source) {
            MoveStrategy::Steal
        } else {
            MoveStrategy::Relocate
        };
        trace!("move-assign strategy: {:?}", strategy);
        strategy
    }

    /// Applies swap propagation to the allocators of two containers being swapped.
    ///
    /// If the policy doesn't propagate on swap, the allocators must compare equal; this is a
    /// precondition which is only checked in debug builds.
    pub fn swap(&mut self, other: &mut AllocTraits<T, A>) {
        if A::PROPAGATION.on_swap {
            trace!("swapping allocators");
            mem::swap(&mut self.alloc, &mut other.alloc);
        } else {
            debug_assert!(
                self.equals(other),
                "Swapped containers with unequal, non-propagating allocators!"
            );
        }
    }
}

impl<T, A: Allocator> Clone for AllocTraits<T, A> {
    fn clone(&self) -> Self {
        AllocTraits::new(self.alloc.clone())
    }
}

impl<T, A: Allocator + Default> Default for AllocTraits<T, A> {
    fn default() -> Self {
        AllocTraits::new(A::default())
    }
}

impl<T, A: Allocator + Debug> Debug for AllocTraits<T, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("AllocTraits")
            .field("alloc", &self.alloc)
            .field("propagation", &A::PROPAGATION)
            .finish()
    }
}
