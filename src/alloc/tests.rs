#![cfg(test)]

use std::alloc::Layout;

use super::*;
use crate::util::drop::CountedDrop;
use crate::util::panic::assert_panics;

#[test]
fn test_allocate_and_release() {
    let alloc: CountingAllocator = CountingAllocator::new();
    let traits: AllocTraits<u64, _> = AllocTraits::new(alloc.clone());

    let ptr = traits.allocate(4).expect("allocating 4 elements should succeed");
    assert_eq!(alloc.live(), 1);
    assert_eq!(alloc.live_bytes(), 32, "Counts should be in elements, not bytes.");

    // SAFETY: ptr holds room for 4 u64s, freshly allocated by traits.
    unsafe {
        for i in 0..4 {
            traits.construct(ptr.add(i), i as u64 * 10);
        }
        assert_eq!(*ptr.add(3).as_ptr(), 30);
        traits.deallocate(ptr, 4);
    }
    assert_eq!(alloc.live(), 0);
    assert_eq!(alloc.total(), 1);
}

#[test]
fn test_capacity_overflow() {
    let traits: AllocTraits<u64, Global> = AllocTraits::default();
    assert_eq!(AllocTraits::<u64, Global>::max_size(), isize::MAX as usize / 8);
    assert_eq!(AllocTraits::<(), Global>::max_size(), usize::MAX);

    assert!(
        traits.allocate(usize::MAX / 4).is_err_and(|error| error.is_capacity_overflow()),
        "Oversized requests should be reported before reaching the allocator."
    );
    assert_panics!({
        traits.allocate_or_abort(usize::MAX / 4);
    });
}

#[test]
fn test_zero_sized() {
    let layout = Layout::new::<()>();
    let ptr = Global.allocate(layout).expect("zero-sized allocations can't fail");
    assert_eq!(ptr.as_ptr() as usize, layout.align(), "Zero-sized allocations should dangle.");
    // SAFETY: ptr came from Global with the same layout.
    unsafe { Global.deallocate(ptr, layout) };
}

#[test]
fn test_fail_after() {
    let alloc: CountingAllocator = CountingAllocator::new();
    let traits: AllocTraits<u8, _> = AllocTraits::new(alloc.clone());

    alloc.fail_after(1);
    let first = traits.allocate(1).expect("the first allocation should succeed");
    assert!(traits.allocate(1).is_err_and(|error| error.is_out_of_memory()));
    assert!(traits.allocate(1).is_err(), "Failures should persist until stopped.");

    alloc.stop_failing();
    let second = traits.allocate(1).expect("allocation should recover");
    assert_eq!(alloc.live(), 2);
    assert_eq!(alloc.total(), 2, "Failed allocations shouldn't be counted.");

    // SAFETY: Both pointers came from traits with n = 1.
    unsafe {
        traits.deallocate(first, 1);
        traits.deallocate(second, 1);
    }
}

#[test]
fn test_rebind_shares_allocator() {
    let alloc: CountingAllocator = CountingAllocator::new();
    let traits: AllocTraits<u8, _> = AllocTraits::new(alloc.clone());
    let rebound: AllocTraits<[u64; 2], _> = traits.rebind();

    assert_eq!(rebound.allocator(), traits.allocator());
    assert!(traits.equals(&rebound.rebind()), "A rebound view should compare equal.");

    let ptr = rebound.allocate(1).expect("allocation should succeed");
    assert_eq!(alloc.live_bytes(), 16);
    // SAFETY: ptr came from rebound with n = 1.
    unsafe { rebound.deallocate(ptr, 1) };
}

#[test]
fn test_node_guard() {
    let alloc: CountingAllocator = CountingAllocator::new();
    let traits = AllocTraits::new(alloc.clone());
    let counter = CountedDrop::counter();

    let guard = NodeGuard::new(&traits, CountedDrop::new(&counter))
        .expect("allocation should succeed");
    assert_eq!(alloc.live(), 1);
    drop(guard);
    assert_eq!(counter.get(), 1, "An unclaimed guard should drop its value.");
    assert_eq!(alloc.live(), 0, "An unclaimed guard should release its storage.");

    let mut guard = NodeGuard::new(&traits, CountedDrop::new(&counter))
        .expect("allocation should succeed");
    let _ = guard.get_mut();
    let ptr = guard.into_raw();
    assert_eq!(counter.get(), 1, "A claimed value should stay alive.");

    // SAFETY: ptr was handed over by the guard and holds a live value.
    unsafe {
        traits.destroy(ptr);
        traits.deallocate(ptr, 1);
    }
    assert_eq!(counter.get(), 2);
    assert_eq!(alloc.live(), 0);

    alloc.fail_after(0);
    assert!(NodeGuard::new(&traits, CountedDrop::new(&counter)).is_err());
    assert_eq!(counter.get(), 3, "The value should be dropped if allocation fails.");
}

#[test]
fn test_move_strategy() {
    let global: AllocTraits<u8, Global> = AllocTraits::default();
    assert_eq!(global.move_strategy(&AllocTraits::default()), MoveStrategy::Adopt);

    let a: AllocTraits<u8, CountingAllocator> = AllocTraits::default();
    let b: AllocTraits<u8, CountingAllocator> = AllocTraits::default();
    assert_eq!(a.move_strategy(&a.clone()), MoveStrategy::Steal);
    assert_eq!(a.move_strategy(&b), MoveStrategy::Relocate);

    let p: AllocTraits<u8, CountingAllocator<Propagating>> = AllocTraits::default();
    let q: AllocTraits<u8, CountingAllocator<Propagating>> = AllocTraits::default();
    assert_eq!(p.move_strategy(&q), MoveStrategy::Adopt);
}

#[test]
fn test_copy_assign_and_swap() {
    let mut a: AllocTraits<u8, CountingAllocator> = AllocTraits::default();
    let b: AllocTraits<u8, CountingAllocator> = AllocTraits::default();
    assert!(!a.copy_assign(&b), "Sticky allocators shouldn't be copied.");
    assert_ne!(a.allocator(), b.allocator());

    let mut p: AllocTraits<u8, CountingAllocator<Propagating>> = AllocTraits::default();
    let mut q: AllocTraits<u8, CountingAllocator<Propagating>> = AllocTraits::default();
    let (p_alloc, q_alloc) = (p.allocator().clone(), q.allocator().clone());
    p.swap(&mut q);
    assert_eq!(*p.allocator(), q_alloc, "Propagating allocators should be swapped.");
    assert_eq!(*q.allocator(), p_alloc);
    assert!(p.copy_assign(&q));
    assert_eq!(*p.allocator(), p_alloc);
    assert!(!p.copy_assign(&q), "Equal allocators don't need replacing.");

    let mut c = a.clone();
    a.swap(&mut c);
    assert_eq!(a.allocator(), c.allocator());
}

#[test]
#[cfg(debug_assertions)]
fn test_swap_unequal_sticky() {
    let mut a: AllocTraits<u8, CountingAllocator> = AllocTraits::default();
    let mut b: AllocTraits<u8, CountingAllocator> = AllocTraits::default();
    assert_panics!({
        a.swap(&mut b);
    });
}

#[test]
fn test_debug() {
    let alloc: CountingAllocator = CountingAllocator::new();
    assert_eq!(
        format!("{:?}", alloc),
        "CountingAllocator { live: 0, live_bytes: 0, total: 0 }"
    );
    assert_eq!(format!("{}", AllocError::from(CapacityOverflow)), "Capacity overflow!");
}
