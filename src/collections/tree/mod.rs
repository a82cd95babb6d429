//! Ordered associative containers built on a red-black tree: [`TreeSet`], [`TreeMultiSet`],
//! [`TreeMap`] and [`TreeMultiMap`].
//!
//! All four share one engine, [`RbTree`], which stores whole values and reads keys out of them
//! with a [`KeyOf`](super::key::KeyOf) strategy. Sets store `T` and use
//! [`Identity`](super::key::Identity); maps store `(K, V)` and use [`First`](super::key::First).
//! The unique containers insert with [`RbTree::try_insert_unique`] and the multi containers with
//! [`RbTree::try_insert_equal`].
//!
//! Positions are exposed as [`Cursor`]s, which can also sit at the end of the container. Erasing
//! an element never moves other elements, so cursors to them stay valid (as far as the borrow
//! checker lets them live).

mod cursor;
mod iter;
mod map;
pub(crate) mod node;
mod rb_tree;
mod set;
mod tests;

pub use cursor::*;
pub use iter::*;
pub use map::*;
pub use rb_tree::RbTree;
pub use set::*;

#[doc(inline)]
pub use crate::util::error::KeyNotFound;
