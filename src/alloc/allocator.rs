use std::alloc::{self, Layout};
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::ptr::{self, NonNull};

use derive_more::{Display, Error, From, IsVariant, TryInto};

/// How a container treats its allocator when the container itself is copied, moved or swapped.
///
/// Every container consults these flags (through [`AllocTraits`](super::AllocTraits)) in its
/// `clone_from`, `assign` and `swap` methods:
/// - `on_copy`: copy-assignment adopts the source's allocator.
/// - `on_move`: move-assignment adopts the source's allocator (and with it, the source's storage).
/// - `on_swap`: swapping two containers swaps their allocators. If this is false, swapping two
///   containers with unequal allocators is a precondition violation.
/// - `always_equal`: all instances of the allocator are interchangeable, so no runtime equality
///   check is needed before moving storage from one container to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Propagation {
    pub on_copy: bool,
    pub on_move: bool,
    pub on_swap: bool,
    pub always_equal: bool,
}

impl Propagation {
    /// The policy of a stateless allocator: storage may always move, allocators are never copied.
    pub const DEFAULT: Propagation = Propagation {
        on_copy: false,
        on_move: true,
        on_swap: false,
        always_equal: true,
    };

    /// The allocator follows its container everywhere.
    pub const ALWAYS: Propagation = Propagation {
        on_copy: true,
        on_move: true,
        on_swap: true,
        always_equal: false,
    };

    /// The allocator stays with the container it was created for.
    pub const NEVER: Propagation = Propagation {
        on_copy: false,
        on_move: false,
        on_swap: false,
        always_equal: false,
    };
}

/// A source of raw memory for containers.
///
/// Allocators are untyped: they hand out memory for a [`Layout`]. The element type is attached by
/// [`AllocTraits`](super::AllocTraits), which is what containers use directly.
///
/// `construct` and `destroy` are optional hooks; the defaults write the value in place and run its
/// destructor.
///
/// # Safety
/// Memory returned by `allocate` must be valid for reads and writes of `layout.size()` bytes,
/// aligned to `layout.align()`, and must stay valid until passed to `deallocate` on this
/// allocator or any allocator comparing equal to it.
pub unsafe trait Allocator: Clone + PartialEq {
    /// The propagation policy containers apply to this allocator.
    const PROPAGATION: Propagation = Propagation::DEFAULT;

    /// Allocates memory for the provided `layout`.
    ///
    /// # Errors
    /// Returns an [`AllocError`] if the memory can't be provided.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Releases memory previously obtained from `allocate`.
    ///
    /// # Safety
    /// `ptr` must have been returned by `allocate` on an allocator equal to `self`, with the same
    /// `layout`, and must not have been deallocated already.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

    /// Moves `value` into the uninitialized memory at `ptr`.
    ///
    /// # Safety
    /// `ptr` must be valid for writes and properly aligned for `T`.
    unsafe fn construct<T>(&self, ptr: NonNull<T>, value: T) {
        // SAFETY: Upheld by the caller.
        unsafe { ptr.write(value) }
    }

    /// Runs the destructor of the value at `ptr`, leaving the memory uninitialized.
    ///
    /// # Safety
    /// `ptr` must point to an initialized `T` which isn't used again.
    unsafe fn destroy<T>(&self, ptr: NonNull<T>) {
        // SAFETY: Upheld by the caller.
        unsafe { ptr.drop_in_place() }
    }

    /// Returns the allocator a copy of a container should use.
    fn select_on_copy(&self) -> Self {
        self.clone()
    }
}

/// The default allocator, backed by the global heap.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Global;

// SAFETY: Memory comes straight from the global allocator, which upholds the same contract.
unsafe impl Allocator for Global {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        if layout.size() == 0 {
            return Ok(dangling_for(layout));
        }

        // SAFETY: Zero-sized layouts have been guarded against.
        NonNull::new(unsafe { alloc::alloc(layout) }).ok_or_else(|| OutOfMemory { layout }.into())
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() != 0 {
            // SAFETY: The caller guarantees ptr was allocated by Global with this layout.
            unsafe { alloc::dealloc(ptr.as_ptr(), layout) }
        }
    }
}

/// A well-aligned, non-null pointer for zero-sized allocations.
pub(crate) const fn dangling_for(layout: Layout) -> NonNull<u8> {
    // SAFETY: Alignment is never zero.
    unsafe { NonNull::new_unchecked(ptr::without_provenance_mut(layout.align())) }
}

/// Allocates memory for `layout` from `alloc`, terminating the process if that isn't possible.
///
/// This is the bottom of the allocation stack, used where an API has no way to report failure
/// (such as the initial bucket array of a hash table created with `new`).
///
/// # Errors
/// In the event of an allocation error, this function calls [`alloc::handle_alloc_error`] as
/// recommended, which prints a diagnostic and aborts rather than unwinding.
pub fn allocate_or_abort<A: Allocator>(alloc: &A, layout: Layout) -> NonNull<u8> {
    match alloc.allocate(layout) {
        Ok(ptr) => ptr,
        Err(_error) => {
            debug!("fatal allocation failure: {}", _error);
            alloc::handle_alloc_error(layout)
        },
    }
}

/// The size of a requested allocation overflowed [`isize::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityOverflow;

impl Display for CapacityOverflow {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Capacity overflow!")
    }
}

impl Error for CapacityOverflow {}

/// The allocator couldn't provide memory for `layout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfMemory {
    pub layout: Layout,
}

impl Display for OutOfMemory {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Out of memory allocating {} bytes (align {})!",
            self.layout.size(),
            self.layout.align()
        )
    }
}

impl Error for OutOfMemory {}

/// The error raised by fallible allocation paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error, From, TryInto, IsVariant)]
pub enum AllocError {
    CapacityOverflow(CapacityOverflow),
    OutOfMemory(OutOfMemory),
}
