//! # Cyclic Sequence
//!
//! An ordered container with modulo-wrapped indexing, used to walk polygon
//! loops without special-casing the wrap-around from the last element back
//! to the first.

use std::ops::Index;

use serde::{Deserialize, Serialize};

/// A sequence whose indices wrap around in both directions.
///
/// # Example
///
/// ```rust
/// use mesh_kernel::cyclic::CyclicSequence;
///
/// let face = CyclicSequence::new(vec![10, 11, 12, 13]);
/// assert_eq!(face[4], 10);
/// assert_eq!(face[-1], 13);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CyclicSequence<T> {
    items: Vec<T>,
}

impl<T> CyclicSequence<T> {
    /// Wraps a list.
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the sequence is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Normalizes any index into `0..len`.
    ///
    /// # Panics
    ///
    /// Panics on an empty sequence.
    #[inline]
    pub fn wrap(&self, index: isize) -> usize {
        index.rem_euclid(self.items.len() as isize) as usize
    }

    /// Rotates left in place so that the element at `count` becomes the first.
    pub fn rotate(&mut self, count: isize) {
        if !self.items.is_empty() {
            let k = self.wrap(count);
            self.items.rotate_left(k);
        }
    }

    /// Underlying elements in order.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Unwraps into the underlying list.
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T: Clone> CyclicSequence<T> {
    /// `count` consecutive elements starting at `start`, wrapping past the end.
    pub fn slice_wrapping(&self, start: isize, count: usize) -> Vec<T> {
        if self.items.is_empty() {
            return Vec::new();
        }
        (0..count as isize)
            .map(|k| self.items[self.wrap(start + k)].clone())
            .collect()
    }
}

impl<T: PartialEq> CyclicSequence<T> {
    /// Drops consecutive repeats, including a last element equal to the first.
    pub fn dedup(&mut self) {
        self.items.dedup();
        while self.items.len() > 1 && self.items.first() == self.items.last() {
            self.items.pop();
        }
    }
}

impl<T> Index<isize> for CyclicSequence<T> {
    type Output = T;

    fn index(&self, index: isize) -> &T {
        &self.items[self.wrap(index)]
    }
}

impl<T> From<Vec<T>> for CyclicSequence<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_indexing() {
        let seq = CyclicSequence::new(vec![0, 1, 2]);
        assert_eq!(seq[3], 0);
        assert_eq!(seq[-1], 2);
        assert_eq!(seq[-4], 2);
        assert_eq!(seq[7], 1);
    }

    #[test]
    fn test_empty_slice_is_empty() {
        let seq: CyclicSequence<usize> = CyclicSequence::new(Vec::new());
        assert!(seq.is_empty());
        assert!(seq.slice_wrapping(0, 2).is_empty());
    }

    #[test]
    fn test_rotate() {
        let mut seq = CyclicSequence::new(vec![0, 1, 2, 3]);
        seq.rotate(2);
        assert_eq!(seq.as_slice(), &[2, 3, 0, 1]);
        seq.rotate(-1);
        assert_eq!(seq.as_slice(), &[1, 2, 3, 0]);
    }

    #[test]
    fn test_slice_wrapping() {
        let seq = CyclicSequence::new(vec![0, 1, 2, 3]);
        assert_eq!(seq.slice_wrapping(3, 3), vec![3, 0, 1]);
        assert_eq!(seq.slice_wrapping(-1, 6), vec![3, 0, 1, 2, 3, 0]);
    }

    #[test]
    fn test_dedup_wraps() {
        let mut seq = CyclicSequence::new(vec![4, 4, 1, 2, 2, 4]);
        seq.dedup();
        assert_eq!(seq.as_slice(), &[4, 1, 2]);

        let mut single = CyclicSequence::new(vec![3, 3, 3]);
        single.dedup();
        assert_eq!(single.as_slice(), &[3]);
    }
}
