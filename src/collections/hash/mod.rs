//! Unordered associative containers built on a chained hash table: [`HashSet`],
//! [`HashMultiSet`], [`HashMap`] and [`HashMultiMap`].
//!
//! All four share [`HashTable`], an array of buckets, each the head of a singly linked chain of
//! nodes. The bucket count is always taken from a fixed table of primes, and the table rehashes
//! into the next prime up whenever an insertion would push [`HashTable::load_factor`] over the
//! maximum load factor.
//!
//! Every node caches the hash of its key, so rehashing never calls the hasher again. Elements with
//! equal keys are kept next to each other in their chain, which makes
//! [`HashMultiSet::equal_range`] and [`HashMultiMap::equal_range`] a single contiguous run.

mod buckets;
mod cursor;
mod iter;
mod map;
pub(crate) mod node;
mod prime;
mod set;
mod table;
mod tests;

pub use cursor::*;
pub use iter::{IntoIter, Iter, IterMut, Keys, LocalIter, Values, ValuesMut};
pub use map::*;
pub(crate) use prime::MIN_BUCKETS;
pub use set::*;
pub use table::{DEFAULT_MAX_LOAD_FACTOR, HashTable};

#[doc(inline)]
pub use crate::util::error::KeyNotFound;
