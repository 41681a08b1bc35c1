pub mod plot;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::similarity::DissimilarityMatrix;

/// Number of output dimensions
pub const DIMS: usize = 2;

/// Classical (Torgerson) multidimensional scaling into two dimensions.
///
/// The squared dissimilarities are double-centred into a Gram matrix whose
/// two leading eigenpairs give the coordinates (`eigenvector * sqrt(λ)`).
/// Eigenpairs come from power iteration on the Gram matrix shifted to be
/// positive semi-definite, so the result is deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mds {
    pub max_iter: usize,
    /// stop once an iteration moves the eigenvector by less than this
    pub tolerance: f64,
}

impl Default for Mds {
    fn default() -> Self {
        Self {
            max_iter: 10_000,
            tolerance: 1e-12,
        }
    }
}

/// Two-dimensional coordinates, row `i` belongs to document `i`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    pub coords: Vec<[f64; DIMS]>,
    /// eigenvalue behind each axis, non-negative parts only contribute
    pub eigenvalues: [f64; DIMS],
}

impl Embedding {
    #[inline]
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Euclidean distance between two embedded documents
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        let (a, b) = (self.coords[i], self.coords[j]);
        ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt()
    }
}

/// tiny deterministic PRNG (xorshift32) for start vectors
struct Rng(u32);

impl Rng {
    fn next_f64(&mut self) -> f64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        x as f64 / u32::MAX as f64 - 0.5
    }
}

impl Mds {
    pub fn fit(&self, dissimilarity: &DissimilarityMatrix) -> Embedding {
        let n = dissimilarity.len();
        let gram = double_centre(dissimilarity);
        // Gershgorin bound: gram + shift * I has no negative eigenvalues
        let shift = gram
            .iter()
            .map(|row| row.iter().map(|v| v.abs()).sum::<f64>())
            .fold(0.0, f64::max);

        let mut coords = vec![[0.0; DIMS]; n];
        let mut eigenvalues = [0.0; DIMS];
        let mut found: Vec<Vec<f64>> = Vec::with_capacity(DIMS);
        let mut rng = Rng(0x1234_5678);

        for axis in 0..DIMS {
            let start: Vec<f64> = (0..n).map(|_| rng.next_f64()).collect();
            let Some((vector, lambda)) = self.leading_eigenpair(&gram, shift, start, &found) else {
                debug!(axis, "no remaining eigen direction");
                break;
            };
            let scale = lambda.max(0.0).sqrt();
            for (coord, v) in coords.iter_mut().zip(&vector) {
                coord[axis] = v * scale;
            }
            eigenvalues[axis] = lambda;
            found.push(vector);
        }
        debug!(docs = n, ?eigenvalues, "mds embedding computed");
        Embedding { coords, eigenvalues }
    }

    /// Largest eigenpair of `gram` orthogonal to the all-ones vector and to
    /// every vector in `found`. `None` when that subspace is empty.
    fn leading_eigenpair(&self, gram: &[Vec<f64>], shift: f64, start: Vec<f64>, found: &[Vec<f64>]) -> Option<(Vec<f64>, f64)> {
        let mut v = start;
        deflate(&mut v, found);
        if !normalize(&mut v) {
            return None;
        }
        for _ in 0..self.max_iter {
            let mut w = mat_vec(gram, &v);
            for (wi, vi) in w.iter_mut().zip(&v) {
                *wi += shift * vi;
            }
            deflate(&mut w, found);
            if !normalize(&mut w) {
                return None;
            }
            let moved = w.iter().zip(&v).map(|(a, b)| (a - b).powi(2)).sum::<f64>().sqrt();
            v = w;
            if moved < self.tolerance {
                break;
            }
        }
        let gv = mat_vec(gram, &v);
        let lambda: f64 = gv.iter().zip(&v).map(|(a, b)| a * b).sum();
        // fix the sign so the largest component is positive
        if let Some(peak) = v.iter().copied().max_by(|a, b| a.abs().total_cmp(&b.abs())) {
            if peak < 0.0 {
                v.iter_mut().for_each(|x| *x = -*x);
            }
        }
        Some((v, lambda))
    }
}

/// `-1/2 * J D² J` with `J` the centring matrix
fn double_centre(d: &DissimilarityMatrix) -> Vec<Vec<f64>> {
    let n = d.len();
    let sq: Vec<Vec<f64>> = (0..n).map(|i| (0..n).map(|j| d.get(i, j).powi(2)).collect()).collect();
    let row_mean: Vec<f64> = sq.iter().map(|row| row.iter().sum::<f64>() / n as f64).collect();
    let grand_mean = row_mean.iter().sum::<f64>() / n.max(1) as f64;
    (0..n)
        .map(|i| {
            (0..n)
                .map(|j| -0.5 * (sq[i][j] - row_mean[i] - row_mean[j] + grand_mean))
                .collect()
        })
        .collect()
}

fn mat_vec(m: &[Vec<f64>], v: &[f64]) -> Vec<f64> {
    m.iter().map(|row| row.iter().zip(v).map(|(a, b)| a * b).sum()).collect()
}

/// Remove the mean (the all-ones direction) and the components along `found`
fn deflate(v: &mut [f64], found: &[Vec<f64>]) {
    if v.is_empty() {
        return;
    }
    let mean = v.iter().sum::<f64>() / v.len() as f64;
    v.iter_mut().for_each(|x| *x -= mean);
    for u in found {
        let proj: f64 = v.iter().zip(u).map(|(a, b)| a * b).sum();
        v.iter_mut().zip(u).for_each(|(x, ui)| *x -= proj * ui);
    }
}

/// Scale to unit length; false when the vector is numerically zero
fn normalize(v: &mut [f64]) -> bool {
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm < 1e-12 {
        return false;
    }
    v.iter_mut().for_each(|x| *x /= norm);
    true
}
