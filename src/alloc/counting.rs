use std::alloc::Layout;
use std::cell::Cell;
use std::fmt::{self, Debug, Formatter};
use std::marker::PhantomData;
use std::ptr::NonNull;
use std::rc::Rc;

use super::{AllocError, Allocator, Global, OutOfMemory, Propagation};

/// Chooses the [`Propagation`] of a [`CountingAllocator`] at the type level.
pub trait PropagationPolicy {
    const PROPAGATION: Propagation;
}

/// The allocator follows its container on copy, move and swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Propagating;

impl PropagationPolicy for Propagating {
    const PROPAGATION: Propagation = Propagation::ALWAYS;
}

/// The allocator never leaves the container it was created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sticky;

impl PropagationPolicy for Sticky {
    const PROPAGATION: Propagation = Propagation::NEVER;
}

#[derive(Debug, Default)]
struct Stats {
    live: Cell<usize>,
    live_bytes: Cell<usize>,
    total: Cell<usize>,
    fail_after: Cell<Option<usize>>,
}

/// A stateful allocator over [`Global`] which keeps count of the memory it hands out.
///
/// Clones share their counters and compare equal to each other; separately created instances
/// never compare equal. It can also be told to start failing after a number of successful
/// allocations, to exercise allocation-failure paths.
///
/// ```
/// # use allocated_std::alloc::CountingAllocator;
/// # use allocated_std::collections::tree::TreeSet;
/// let alloc: CountingAllocator = CountingAllocator::new();
/// let mut set = TreeSet::new_in(alloc.clone());
/// set.insert(1);
/// set.insert(2);
/// assert_eq!(alloc.live(), 2);
///
/// drop(set);
/// assert_eq!(alloc.live(), 0);
/// ```
pub struct CountingAllocator<P: PropagationPolicy = Sticky> {
    stats: Rc<Stats>,
    _phantom: PhantomData<P>,
}

impl<P: PropagationPolicy> CountingAllocator<P> {
    pub fn new() -> CountingAllocator<P> {
        CountingAllocator {
            stats: Rc::default(),
            _phantom: PhantomData,
        }
    }

    /// The number of allocations which haven't been released yet.
    pub fn live(&self) -> usize {
        self.stats.live.get()
    }

    /// The number of bytes which haven't been released yet.
    pub fn live_bytes(&self) -> usize {
        self.stats.live_bytes.get()
    }

    /// The number of successful allocations over the allocator's lifetime.
    pub fn total(&self) -> usize {
        self.stats.total.get()
    }

    /// Makes every allocation after the next `n` successful ones fail.
    pub fn fail_after(&self, n: usize) {
        self.stats.fail_after.set(Some(n));
    }

    /// Stops injecting failures.
    pub fn stop_failing(&self) {
        self.stats.fail_after.set(None);
    }
}

impl<P: PropagationPolicy> Default for CountingAllocator<P> {
    fn default() -> Self {
        CountingAllocator::new()
    }
}

impl<P: PropagationPolicy> Clone for CountingAllocator<P> {
    fn clone(&self) -> Self {
        CountingAllocator {
            stats: Rc::clone(&self.stats),
            _phantom: PhantomData,
        }
    }
}

impl<P: PropagationPolicy> PartialEq for CountingAllocator<P> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.stats, &other.stats)
    }
}

impl<P: PropagationPolicy> Eq for CountingAllocator<P> {}

impl<P: PropagationPolicy> Debug for CountingAllocator<P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("CountingAllocator")
            .field("live", &self.live())
            .field("live_bytes", &self.live_bytes())
            .field("total", &self.total())
            .finish()
    }
}

// SAFETY: All memory comes from Global, which upholds the contract.
unsafe impl<P: PropagationPolicy> Allocator for CountingAllocator<P> {
    const PROPAGATION: Propagation = P::PROPAGATION;

    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        match self.stats.fail_after.get() {
            Some(0) => return Err(OutOfMemory { layout }.into()),
            Some(n) => self.stats.fail_after.set(Some(n - 1)),
            None => {},
        }

        let ptr = Global.allocate(layout)?;
        self.stats.live.set(self.stats.live.get() + 1);
        self.stats.live_bytes.set(self.stats.live_bytes.get() + layout.size());
        self.stats.total.set(self.stats.total.get() + 1);
        Ok(ptr)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.stats.live.set(self.stats.live.get() - 1);
        self.stats.live_bytes.set(self.stats.live_bytes.get() - layout.size());
        // SAFETY: The caller guarantees ptr came from allocate on an equal allocator, which got it
        // from Global with the same layout.
        unsafe { Global.deallocate(ptr, layout) }
    }
}
