//! # Index Utilities
//!
//! Small list helpers shared by the selection and topology code.

use std::collections::HashSet;
use std::hash::Hash;

/// Unordered key for an edge between two vertex indices.
#[inline]
pub fn edge_key(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Removes duplicates, keeping the first occurrence of each value.
///
/// # Example
///
/// ```rust
/// use mesh_kernel::indices::dedup_preserve_order;
///
/// assert_eq!(dedup_preserve_order(&[3, 1, 3, 2, 1]), vec![3, 1, 2]);
/// ```
pub fn dedup_preserve_order<T: Copy + Eq + Hash>(items: &[T]) -> Vec<T> {
    let mut seen = HashSet::with_capacity(items.len());
    items.iter().copied().filter(|x| seen.insert(*x)).collect()
}

/// Returns `items` without any value contained in `remove`.
pub fn without<T: Copy + Eq + Hash>(items: &[T], remove: &[T]) -> Vec<T> {
    let remove: HashSet<T> = remove.iter().copied().collect();
    items.iter().copied().filter(|x| !remove.contains(x)).collect()
}

/// Converts a closed loop to its edges: `[0, 1, 2] -> [[0, 1], [1, 2], [2, 0]]`.
pub fn to_edges<T: Copy>(items: &[T]) -> Vec<[T; 2]> {
    let n = items.len();
    (0..n).map(|i| [items[i], items[(i + 1) % n]]).collect()
}

/// Adds `offset` to every index.
pub fn offset_all(items: &[usize], offset: usize) -> Vec<usize> {
    items.iter().map(|i| i + offset).collect()
}
