use std::cmp::Ordering;

use num::Float;
use serde::{Deserialize, Serialize};

/// Sparse vector that stores only non-zero elements.
///
/// Holds parallel `indices` / `values` arrays; `indices` is kept strictly
/// ascending so two vectors can be combined with a single merge pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseVec<N> {
    indices: Vec<u32>,
    values: Vec<N>,
    /// logical dimension
    len: usize,
}

impl<N> SparseVec<N>
where
    N: Float,
{
    pub fn new(len: usize) -> Self {
        Self {
            indices: Vec::new(),
            values: Vec::new(),
            len,
        }
    }

    /// Build from (index, value) pairs in any order.
    /// Zero values are dropped; repeated indices are summed.
    pub fn from_pairs<I>(len: usize, pairs: I) -> Self
    where
        I: IntoIterator<Item = (u32, N)>,
    {
        let mut pairs: Vec<(u32, N)> = pairs.into_iter().collect();
        pairs.sort_unstable_by_key(|(idx, _)| *idx);
        let mut vec = Self::new(len);
        vec.indices.reserve(pairs.len());
        vec.values.reserve(pairs.len());
        for (idx, val) in pairs {
            debug_assert!((idx as usize) < len, "index {idx} out of dimension {len}");
            match vec.indices.last() {
                Some(&last) if last == idx => {
                    if let Some(acc) = vec.values.last_mut() {
                        *acc = *acc + val;
                    }
                }
                _ => {
                    vec.indices.push(idx);
                    vec.values.push(val);
                }
            }
        }
        vec.prune_zeros();
        vec
    }

    fn prune_zeros(&mut self) {
        let mut keep = 0;
        for i in 0..self.values.len() {
            if !self.values[i].is_zero() {
                self.indices[keep] = self.indices[i];
                self.values[keep] = self.values[i];
                keep += 1;
            }
        }
        self.indices.truncate(keep);
        self.values.truncate(keep);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// number of stored (non-zero) elements
    #[inline]
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Element at `index`, zero when not stored
    pub fn get(&self, index: usize) -> N {
        match u32::try_from(index) {
            Ok(idx) => self
                .indices
                .binary_search(&idx)
                .map(|pos| self.values[pos])
                .unwrap_or_else(|_| N::zero()),
            Err(_) => N::zero(),
        }
    }

    /// Iterate over stored (index, value) pairs in ascending index order
    #[inline]
    pub fn raw_iter(&self) -> impl Iterator<Item = (usize, N)> + '_ {
        self.indices
            .iter()
            .zip(self.values.iter())
            .map(|(&idx, &val)| (idx as usize, val))
    }

    /// Dot product by merging the two index lists
    pub fn dot(&self, other: &Self) -> N {
        debug_assert_eq!(self.len, other.len, "dot product of vectors with different dimensions");
        let mut result = N::zero();
        let (mut i, mut j) = (0, 0);
        while i < self.indices.len() && j < other.indices.len() {
            match self.indices[i].cmp(&other.indices[j]) {
                Ordering::Equal => {
                    result = result + self.values[i] * other.values[j];
                    i += 1;
                    j += 1;
                }
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
            }
        }
        result
    }

    #[inline]
    pub fn norm_sq(&self) -> N {
        self.values.iter().fold(N::zero(), |acc, &v| acc + v * v)
    }

    #[inline]
    pub fn norm(&self) -> N {
        self.norm_sq().sqrt()
    }

    /// Multiply each stored element by the dense weight at its index
    pub fn hadamard_dense(&mut self, weights: &[N]) {
        for (idx, val) in self.indices.iter().zip(self.values.iter_mut()) {
            *val = *val * weights.get(*idx as usize).copied().unwrap_or_else(N::zero);
        }
        self.prune_zeros();
    }

    /// Scale to unit L2 norm; a zero vector stays zero
    pub fn normalize_l2(&mut self) {
        let norm = self.norm();
        if norm > N::zero() {
            for val in &mut self.values {
                *val = *val / norm;
            }
        }
    }

    pub fn shrink_to_fit(&mut self) {
        self.indices.shrink_to_fit();
        self.values.shrink_to_fit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_pairs_sorts_merges_and_drops_zeros() {
        let v = SparseVec::from_pairs(6, vec![(4, 1.0), (1, 2.0), (4, 0.5), (2, 0.0)]);
        assert_eq!(v.nnz(), 2);
        assert_eq!(v.raw_iter().collect::<Vec<_>>(), vec![(1, 2.0), (4, 1.5)]);
        assert_eq!(v.get(4), 1.5);
        assert_eq!(v.get(3), 0.0);
        assert_eq!(v.get(usize::MAX), 0.0);
    }

    #[test]
    fn dot_only_counts_shared_indices() {
        let a = SparseVec::from_pairs(5, vec![(0, 1.0_f64), (2, 2.0), (4, 3.0)]);
        let b = SparseVec::from_pairs(5, vec![(1, 5.0_f64), (2, 4.0), (4, -1.0)]);
        assert_eq!(a.dot(&b), 5.0);
        assert_eq!(a.dot(&b), b.dot(&a));
        assert_eq!(a.dot(&SparseVec::new(5)), 0.0);
    }

    #[test]
    fn normalize_l2_gives_unit_norm() {
        let mut v = SparseVec::from_pairs(3, vec![(0, 3.0_f32), (2, 4.0)]);
        v.normalize_l2();
        assert!((v.norm() - 1.0).abs() < 1e-6);
        assert!((v.get(0) - 0.6).abs() < 1e-6);

        let mut zero: SparseVec<f32> = SparseVec::new(3);
        zero.normalize_l2();
        assert_eq!(zero.nnz(), 0);
    }

    #[test]
    fn hadamard_dense_weights_elements() {
        let mut v = SparseVec::from_pairs(3, vec![(0, 2.0_f64), (1, 1.0), (2, 3.0)]);
        v.hadamard_dense(&[0.5, 0.0, 2.0]);
        assert_eq!(v.raw_iter().collect::<Vec<_>>(), vec![(0, 1.0), (2, 6.0)]);
    }
}
