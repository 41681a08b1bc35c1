use std::fmt::{self, Debug};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{Error, Result},
    vectorizer::{TfIdfMatrix, Weight},
};

/// Symmetric n×n matrix of pairwise cosine similarities.
///
/// Values lie in `[-1, 1]` and the diagonal is exactly 1, including for
/// documents without a single term (whose off-diagonal entries are 0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatrix {
    n: usize,
    /// row-major
    values: Vec<f64>,
}

impl SimilarityMatrix {
    /// Cosine similarity between every pair of rows of `matrix`
    ///
    /// # Arguments
    /// * `matrix` - TF-IDF rows, one per document
    ///
    /// # Returns
    /// `matrix.doc_num()` × `matrix.doc_num()` similarities
    pub fn cosine<N: Weight>(matrix: &TfIdfMatrix<N>) -> Self {
        let rows = &matrix.rows;
        let n = rows.len();
        let norms: Vec<f64> = rows.par_iter().map(|row| row.norm().into()).collect();

        let values: Vec<f64> = (0..n)
            .into_par_iter()
            .flat_map_iter(|i| {
                let rows = &rows;
                let norms = &norms;
                (0..n).map(move |j| {
                    if i == j {
                        return 1.0;
                    }
                    let denom = norms[i] * norms[j];
                    if denom <= 0.0 {
                        return 0.0;
                    }
                    let dot: f64 = rows[i].dot(&rows[j]).into();
                    (dot / denom).clamp(-1.0, 1.0)
                })
            })
            .collect();
        debug!(docs = n, "similarity matrix computed");
        Self { n, values }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// # Panics
    /// When `i` or `j` is not below `len()`
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.n && j < self.n, "({i}, {j}) outside a {0}x{0} matrix", self.n);
        self.values[i * self.n + j]
    }

    /// Similarities of document `i` to every document, itself included
    #[inline]
    pub fn row(&self, i: usize) -> Option<&[f64]> {
        (i < self.n).then(|| &self.values[i * self.n..(i + 1) * self.n])
    }

    /// `1 - similarity`, the input MDS expects
    pub fn dissimilarity(&self) -> DissimilarityMatrix {
        DissimilarityMatrix {
            n: self.n,
            values: self.values.iter().map(|s| 1.0 - s).collect(),
        }
    }

    /// Every other document ranked by similarity to `doc`
    ///
    /// # Errors
    /// [`Error::IndexOutOfRange`] when `doc` is not below `len()`
    pub fn neighbours(&self, doc: usize) -> Result<Hits> {
        let row = self.row(doc).ok_or(Error::IndexOutOfRange { index: doc, len: self.n })?;
        let mut hits = Hits::new(
            row.iter()
                .enumerate()
                .filter(|(idx, _)| *idx != doc)
                .map(|(idx, score)| (idx, *score))
                .collect(),
        );
        hits.sort_by_score();
        Ok(hits)
    }
}

/// Symmetric n×n dissimilarity matrix with a zero diagonal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DissimilarityMatrix {
    n: usize,
    values: Vec<f64>,
}

impl DissimilarityMatrix {
    /// Build from a square matrix of rows
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n = rows.len();
        if let Some(bad) = rows.iter().position(|row| row.len() != n) {
            return Err(Error::IndexOutOfRange { index: bad, len: n });
        }
        Ok(Self {
            n,
            values: rows.into_iter().flatten().collect(),
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.n && j < self.n, "({i}, {j}) outside a {0}x{0} matrix", self.n);
        self.values[i * self.n + j]
    }
}

/// Ranked documents
pub struct Hits {
    /// (document index, score)
    pub list: Vec<(usize, f64)>,
}

impl Hits {
    pub fn new(list: Vec<(usize, f64)>) -> Self {
        Hits { list }
    }

    /// Sort by descending score, dropping NaN scores
    pub fn sort_by_score(&mut self) -> &mut Self {
        self.list.retain(|(_, s)| !s.is_nan());
        self.list.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        self
    }

    pub fn top(&self, k: usize) -> &[(usize, f64)] {
        &self.list[..k.min(self.list.len())]
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

impl Debug for Hits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Hits [")?;
            for (doc, score) in &self.list {
                writeln!(f, "    {}: {:.6}", doc, score)?;
            }
            write!(f, "]")
        } else {
            f.debug_list().entries(&self.list).finish()
        }
    }
}
