//! Strategies shared by the tree and hash engines: how a key is read out of a stored value, how
//! keys are ordered and how they are compared for equality.
//!
//! The engines store whole values (`T` for sets, `(K, V)` for maps) and use a [`KeyOf`] strategy
//! to find the key within them, so that one engine serves both kinds of container.
use std::cmp::Ordering;
use std::fmt::{self, Debug, Formatter};

/// Extracts the key from a stored value.
pub trait KeyOf<T> {
    type Key;

    fn key(value: &T) -> &Self::Key;
}

/// The whole value is the key, as in a set.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity;

impl<T> KeyOf<T> for Identity {
    type Key = T;

    fn key(value: &T) -> &T {
        value
    }
}

/// The first element of a pair is the key, as in a map.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct First;

impl<K, V> KeyOf<(K, V)> for First {
    type Key = K;

    fn key(value: &(K, V)) -> &K {
        &value.0
    }
}

/// A strict weak ordering over `K`.
///
/// `less(a, b)` must be irreflexive and transitive, and incomparability (neither `less(a, b)` nor
/// `less(b, a)`) must be transitive. Two keys are considered equal when they are incomparable.
pub trait Compare<K: ?Sized> {
    fn less(&self, lhs: &K, rhs: &K) -> bool;
}

/// Orders keys by their [`Ord`] implementation, smallest first.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Less;

impl<K: Ord + ?Sized> Compare<K> for Less {
    fn less(&self, lhs: &K, rhs: &K) -> bool {
        lhs.cmp(rhs) == Ordering::Less
    }
}

/// Orders keys by their [`Ord`] implementation, largest first.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Greater;

impl<K: Ord + ?Sized> Compare<K> for Greater {
    fn less(&self, lhs: &K, rhs: &K) -> bool {
        lhs.cmp(rhs) == Ordering::Greater
    }
}

/// Orders keys with a closure returning true if its first argument sorts before its second.
#[derive(Clone, Copy)]
pub struct CompareBy<F>(pub F);

impl<K: ?Sized, F: Fn(&K, &K) -> bool> Compare<K> for CompareBy<F> {
    fn less(&self, lhs: &K, rhs: &K) -> bool {
        (self.0)(lhs, rhs)
    }
}

impl<F> Debug for CompareBy<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "CompareBy(..)")
    }
}

/// An equivalence relation over `K`, used by the hash engine alongside the hasher.
///
/// Keys which are equal must hash to the same value.
pub trait KeyEq<K: ?Sized> {
    fn equal(&self, lhs: &K, rhs: &K) -> bool;
}

/// Compares keys with their [`Eq`] implementation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EqualTo;

impl<K: Eq + ?Sized> KeyEq<K> for EqualTo {
    fn equal(&self, lhs: &K, rhs: &K) -> bool {
        lhs == rhs
    }
}

/// Compares keys with a closure.
#[derive(Clone, Copy)]
pub struct EqualBy<F>(pub F);

impl<K: ?Sized, F: Fn(&K, &K) -> bool> KeyEq<K> for EqualBy<F> {
    fn equal(&self, lhs: &K, rhs: &K) -> bool {
        (self.0)(lhs, rhs)
    }
}

impl<F> Debug for EqualBy<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "EqualBy(..)")
    }
}
