//! Traits shared by the associative containers.
//!
//! [`Set`] provides set algebra (union, intersection, difference and subset tests) for
//! [`TreeSet`](super::tree::TreeSet) and [`HashSet`](super::hash::HashSet) alike.

mod set;
mod tests;

pub use set::*;
