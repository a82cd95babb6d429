#[cfg(feature = "hash")]
use std::hash::{BuildHasher, Hash};
use std::iter::{Chain, FusedIterator};
use std::marker::PhantomData;

#[cfg(any(feature = "tree", feature = "hash"))]
use crate::alloc::Allocator;
#[cfg(feature = "hash")]
use crate::collections::hash::{self, HashSet};
#[cfg(feature = "tree")]
use crate::collections::key::Compare;
#[cfg(feature = "hash")]
use crate::collections::key::KeyEq;
#[cfg(feature = "tree")]
use crate::collections::tree::{self, TreeSet};

/// Set algebra over containers with unique values.
///
/// Implementors provide membership, size and iteration. Every combinator walks one set and tests
/// membership in the other, so ordered and unordered sets behave alike. Borrowed combinators
/// yield values in the iteration order of `self`, followed by those of `other` where applicable.
pub trait Set<T>: IntoIterator<Item = T> + Sized {
    type Iter<'a>: Iterator<Item = &'a T>
    where
        Self: 'a,
        T: 'a;

    fn contains(&self, item: &T) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an iterator over all values in the set, as references.
    fn iter<'a>(&'a self) -> Self::Iter<'a>;

    /// Consumes both sets, yielding the values of `self` missing from `other`. (`self \ other`)
    fn into_difference(self, other: Self) -> IntoDifference<Self, T> {
        IntoMembership::new(self, other, Keep::Missing)
    }

    /// Yields the values of `self` missing from `other`. (`self \ other`)
    fn difference<'a>(&'a self, other: &'a Self) -> Difference<'a, Self, T> {
        Membership::new(self, other, Keep::Missing)
    }

    /// Yields the values held by exactly one of `self` and `other`. (`self △ other`)
    fn symmetric_difference<'a>(&'a self, other: &'a Self) -> SymmetricDifference<'a, Self, T> {
        self.difference(other).chain(other.difference(self))
    }

    /// Consumes both sets, yielding the values of `self` also held by `other`. (`self ∩ other`)
    fn into_intersection(self, other: Self) -> IntoIntersection<Self, T> {
        IntoMembership::new(self, other, Keep::Shared)
    }

    /// Yields the values of `self` also held by `other`. (`self ∩ other`)
    fn intersection<'a>(&'a self, other: &'a Self) -> Intersection<'a, Self, T> {
        Membership::new(self, other, Keep::Shared)
    }

    /// Yields every value of `self`, then the values only `other` holds. (`self ∪ other`)
    fn union<'a>(&'a self, other: &'a Self) -> Union<'a, Self, T> {
        self.iter().chain(other.difference(self))
    }

    /// Returns true if `other` holds every value of `self`. (`self ⊆ other`)
    fn is_subset(&self, other: &Self) -> bool {
        self.len() <= other.len() && self.iter().all(|item| other.contains(item))
    }

    /// Returns true if `self` holds every value of `other`. (`self ⊇ other`)
    fn is_superset(&self, other: &Self) -> bool {
        other.is_subset(self)
    }

    /// Returns true if `self` and `other` have no values in common.
    fn is_disjoint(&self, other: &Self) -> bool {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        !small.iter().any(|item| large.contains(item))
    }
}

#[cfg(feature = "tree")]
impl<T, C: Compare<T>, A: Allocator> Set<T> for TreeSet<T, C, A> {
    type Iter<'a>
        = tree::Iter<'a, T>
    where
        Self: 'a,
        T: 'a;

    fn contains(&self, item: &T) -> bool {
        TreeSet::contains(self, item)
    }

    fn len(&self) -> usize {
        TreeSet::len(self)
    }

    fn iter<'a>(&'a self) -> Self::Iter<'a> {
        TreeSet::iter(self)
    }
}

#[cfg(feature = "hash")]
impl<T, S, E, A> Set<T> for HashSet<T, S, E, A>
where
    T: Hash,
    S: BuildHasher,
    E: KeyEq<T>,
    A: Allocator,
{
    type Iter<'a>
        = hash::Iter<'a, T>
    where
        Self: 'a,
        T: 'a;

    fn contains(&self, item: &T) -> bool {
        HashSet::contains(self, item)
    }

    fn len(&self) -> usize {
        HashSet::len(self)
    }

    fn iter<'a>(&'a self) -> Self::Iter<'a> {
        HashSet::iter(self)
    }
}

/// Which outcome of the membership test a filtering iterator lets through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keep {
    /// Values the other set also holds.
    Shared,
    /// Values the other set lacks.
    Missing,
}

impl Keep {
    const fn admits(self, present: bool) -> bool {
        match self {
            Keep::Shared => present,
            Keep::Missing => !present,
        }
    }
}

/// Walks one set by reference, keeping values by their membership in another.
pub struct Membership<'a, S: Set<T>, T: 'a> {
    values: S::Iter<'a>,
    against: &'a S,
    keep: Keep,
}

impl<'a, S: Set<T>, T: 'a> Membership<'a, S, T> {
    fn new(this: &'a S, against: &'a S, keep: Keep) -> Self {
        Membership {
            values: this.iter(),
            against,
            keep,
        }
    }

    pub const fn keep(&self) -> Keep {
        self.keep
    }
}

impl<'a, S: Set<T>, T: 'a> Iterator for Membership<'a, S, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let (against, keep) = (self.against, self.keep);
        self.values.find(|item| keep.admits(against.contains(item)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.values.size_hint().1)
    }
}

impl<'a, S: Set<T>, T: 'a> FusedIterator for Membership<'a, S, T> where
    S::Iter<'a>: FusedIterator
{
}

/// Owning counterpart of [`Membership`]; both sets are consumed and the kept values moved out.
pub struct IntoMembership<S: Set<T>, T> {
    values: S::IntoIter,
    against: S,
    keep: Keep,
    _item: PhantomData<fn() -> T>,
}

impl<S: Set<T>, T> IntoMembership<S, T> {
    fn new(this: S, against: S, keep: Keep) -> Self {
        IntoMembership {
            values: this.into_iter(),
            against,
            keep,
            _item: PhantomData,
        }
    }

    pub const fn keep(&self) -> Keep {
        self.keep
    }
}

impl<S: Set<T>, T> Iterator for IntoMembership<S, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let (against, keep) = (&self.against, self.keep);
        self.values.find(|item| keep.admits(against.contains(item)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.values.size_hint().1)
    }
}

impl<S: Set<T>, T> FusedIterator for IntoMembership<S, T> where S::IntoIter: FusedIterator {}

pub type Difference<'a, S, T> = Membership<'a, S, T>;
pub type Intersection<'a, S, T> = Membership<'a, S, T>;
pub type IntoDifference<S, T> = IntoMembership<S, T>;
pub type IntoIntersection<S, T> = IntoMembership<S, T>;
pub type SymmetricDifference<'a, S, T> = Chain<Membership<'a, S, T>, Membership<'a, S, T>>;
pub type Union<'a, S, T> = Chain<<S as Set<T>>::Iter<'a>, Membership<'a, S, T>>;
