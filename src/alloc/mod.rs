//! Allocator-aware memory management shared by every container in the crate.
//!
//! # Layers
//! - [`Allocator`]: raw memory by [`Layout`](std::alloc::Layout), with optional `construct` and
//!   `destroy` hooks and a [`Propagation`] policy. [`Global`] is the default.
//! - [`AllocTraits`]: the typed adapter containers actually call. It counts in elements, rebinds
//!   to node types and turns the propagation policy into decisions.
//! - [`NodeGuard`]: one allocation plus one construction, released automatically unless handed
//!   over to a container.
//! - [`allocate_or_abort`]: the primitive helper for paths which can't report failure.
//!
//! # Failure
//! Allocation failure on the [`AllocTraits`] path is an [`AllocError`], returned by the `try_`
//! methods of containers and raised as a panic by their infallible counterparts.
//! [`allocate_or_abort`] treats failure as fatal instead.

mod allocator;
mod counting;
mod guard;
mod traits;

pub use allocator::*;
pub use counting::*;
pub use guard::*;
pub use traits::*;

mod tests;
