//! This crate is my attempt at writing allocator-aware associative containers: ordered ones on a
//! red-black tree and unordered ones on a chained hash table.
//!
//! # Purpose
//! The standard library's collections all allocate from the global heap. The containers here take
//! an allocator as a type parameter instead, and follow its propagation policy when they are
//! copied, moved or swapped: a container either carries its allocator along, keeps it, or moves
//! its elements into memory from the allocator it already has.
//!
//! # Layout
//! - [`alloc`]: the [`Allocator`](alloc::Allocator) trait, the typed
//!   [`AllocTraits`](alloc::AllocTraits) adapter containers talk to, and
//!   [`NodeGuard`](alloc::NodeGuard) for exception-safe node construction.
//! - [`collections::tree`]: [`TreeSet`](collections::tree::TreeSet),
//!   [`TreeMultiSet`](collections::tree::TreeMultiSet), [`TreeMap`](collections::tree::TreeMap)
//!   and [`TreeMultiMap`](collections::tree::TreeMultiMap).
//! - [`collections::hash`]: [`HashSet`](collections::hash::HashSet),
//!   [`HashMultiSet`](collections::hash::HashMultiSet), [`HashMap`](collections::hash::HashMap)
//!   and [`HashMultiMap`](collections::hash::HashMultiMap).
//! - [`collections::traits`]: set algebra shared by the set types.
//!
//! # Error Handling
//! Specifically for a standard library, it is more ergonomic for functions to panic in some cases,
//! because users don't want to be forced to handle an error every time they insert into a map. So
//! every allocating method comes in two flavours: `insert` panics if the allocator fails, while
//! `try_insert` returns an [`AllocError`](alloc::AllocError) and leaves the container as it was.
//!
//! When this crate employs errors via [`Result`]s, it does so in a method that is strongly typed,
//! using enums for static dispatch rather than dynamic, with structs (often ZSTs) that implement
//! [`Error`](std::error::Error).
//!
//! # Features
//! - `tree`, `hash` and `traits` gate their modules, all enabled by `collections-all` (the
//!   default).
//! - `logging` routes internal diagnostics (rehashes, allocation failures, allocator propagation)
//!   through the [`log`](https://docs.rs/log) crate. Without it they compile to nothing.
//!
//! # Dependencies
//! This crate depends on some derive macros because they're helpful and remove the need for some
//! very repetitive programming, and optionally on `log`.
#![feature(debug_closure_helpers)]
#![feature(doc_cfg)]

// #![warn(missing_docs)]
#![warn(clippy::missing_safety_doc)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(clippy::missing_const_for_fn)]
#![warn(clippy::missing_panics_doc)]
#![warn(clippy::unwrap_used)]
#![allow(clippy::module_inception)]

#[macro_use]
pub(crate) mod util;

pub mod alloc;
#[cfg(feature = "collections")]
pub mod collections;
