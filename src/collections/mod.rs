//! Allocator-aware associative containers.
//!
//! # Purpose
//! Two engines, a red-black tree and a chained hash table, each back four containers: a set and a
//! map, in unique and multi-key flavours. Every container takes an
//! [`Allocator`](crate::alloc::Allocator) type parameter and honours its propagation policy when
//! copied, moved or swapped.
//!
//! # Method
//! The engines store whole values and read keys out of them with a [`KeyOf`](key::KeyOf)
//! strategy, so the set and map facades are thin wrappers which only decide how keys are
//! extracted and whether duplicates are allowed. Ordering and equality come from the functor
//! traits in [`key`].

pub mod key;

#[cfg(feature = "hash")]
#[doc(cfg(feature = "hash"))]
pub mod hash;
#[cfg(feature = "traits")]
#[doc(cfg(feature = "traits"))]
pub mod traits;
#[cfg(feature = "tree")]
#[doc(cfg(feature = "tree"))]
pub mod tree;

#[doc(inline)]
pub use crate::util::error::{ContainerError, KeyNotFound};
