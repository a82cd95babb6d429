use std::fmt::{self, Debug, Formatter};
use std::iter::FusedIterator;
use std::marker::PhantomData;

use super::HashTable;
use super::node::Link;
use crate::alloc::Allocator;

/// Finds the first non-empty bucket at or after `from`, returning its index and head. Returns the
/// bucket count and None if there are no more elements.
pub(crate) fn next_occupied<T>(buckets: &[Link<T>], from: usize) -> (usize, Link<T>) {
    buckets
        .iter()
        .enumerate()
        .skip(from)
        .find_map(|(index, head)| head.map(|node| (index, Some(node))))
        .unwrap_or((buckets.len(), None))
}

/// An iterator over the elements of a hash table, bucket by bucket and along each chain.
///
/// Equal keys are always adjacent within a chain, so this also serves for
/// [`HashTable::equal_range`], by starting at the first match and stopping after the run.
pub struct Iter<'a, T> {
    pub(crate) buckets: &'a [Link<T>],
    pub(crate) bucket: usize,
    pub(crate) current: Link<T>,
    pub(crate) len: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) const fn new(
        buckets: &'a [Link<T>],
        bucket: usize,
        current: Link<T>,
        len: usize,
    ) -> Iter<'a, T> {
        Iter {
            buckets,
            bucket,
            current,
            len,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }

        let node = self.current?;
        self.len -= 1;
        match node.next() {
            Some(next) => self.current = Some(next),
            None => (self.bucket, self.current) = next_occupied(self.buckets, self.bucket + 1),
        }
        Some(node.value())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter::new(self.buckets, self.bucket, self.current, self.len)
    }
}

impl<T: Debug> Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// An iterator over the entries of a hash map, with mutable access to the values.
pub struct IterMut<'a, K, V> {
    pub(crate) inner: Iter<'a, (K, V)>,
    pub(crate) _phantom: PhantomData<&'a mut (K, V)>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.inner.current?;
        self.inner.next()?;
        let (key, value) = node.value_mut();
        Some((&*key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// An iterator along the chain of a single bucket.
pub struct LocalIter<'a, T> {
    pub(crate) current: Link<T>,
    pub(crate) _phantom: PhantomData<&'a T>,
}

impl<'a, T> LocalIter<'a, T> {
    pub(crate) const fn new(head: Link<T>) -> LocalIter<'a, T> {
        LocalIter {
            current: head,
            _phantom: PhantomData,
        }
    }
}

impl<'a, T> Iterator for LocalIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.current?;
        self.current = node.next();
        Some(node.value())
    }
}

impl<T> FusedIterator for LocalIter<'_, T> {}

impl<T> Clone for LocalIter<'_, T> {
    fn clone(&self) -> Self {
        LocalIter::new(self.current)
    }
}

impl<T: Debug> Debug for LocalIter<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// An owning iterator, which releases each node as its element is taken.
pub struct IntoIter<T, X, S, E, A: Allocator> {
    pub(crate) table: HashTable<T, X, S, E, A>,
    pub(crate) bucket: usize,
}

impl<T, X, S, E, A: Allocator> Iterator for IntoIter<T, X, S, E, A> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        while self.bucket < self.table.bucket_count() {
            if let Some(node) = self.table.buckets[self.bucket] {
                self.table.buckets[self.bucket] = node.next();
                self.table.len -= 1;
                return Some(self.table.take_node(node));
            }
            self.bucket += 1;
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.len(), Some(self.table.len()))
    }
}

impl<T, X, S, E, A: Allocator> ExactSizeIterator for IntoIter<T, X, S, E, A> {}

impl<T, X, S, E, A: Allocator> FusedIterator for IntoIter<T, X, S, E, A> {}

pub struct Keys<'a, K, V>(pub(crate) Iter<'a, (K, V)>);

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

pub struct Values<'a, K, V>(pub(crate) Iter<'a, (K, V)>);

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

pub struct ValuesMut<'a, K, V>(pub(crate) IterMut<'a, K, V>);

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}
