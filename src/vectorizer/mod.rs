pub mod doc_freq;
pub mod stopwords;
pub mod tfidf;
pub mod token;

use std::{fmt::Debug, marker::PhantomData};

use indexmap::IndexSet;
use num::{Float, FromPrimitive};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    utils::sparse::SparseVec,
    vectorizer::{
        doc_freq::DocumentFrequency,
        stopwords::{StopWords, StopwordFilter},
        tfidf::{DefaultTFIDFEngine, TFIDFEngine},
        token::TokenFrequency,
    },
};

/// Numeric type of TF-IDF weights (`f32` or `f64`)
pub trait Weight: Float + FromPrimitive + Into<f64> + Debug + Send + Sync + 'static {}

impl<T> Weight for T where T: Float + FromPrimitive + Into<f64> + Debug + Send + Sync + 'static {}

/// Shortest token kept, in characters
pub const DEFAULT_MIN_TOKEN_CHARS: usize = 2;

/// Word tokens of `text`: runs of alphanumeric characters or `_`
#[inline]
pub fn tokenize(text: &str, min_chars: usize) -> impl Iterator<Item = &str> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(move |token| !token.is_empty() && token.chars().count() >= min_chars)
}

/// TF-IDF Vectorizer
///
/// Converts a list of documents into a document-by-term matrix of TF-IDF
/// weights. Rows are L2-normalized, so the dot product of two rows is their
/// cosine similarity.
///
/// `TfIdfVectorizer<N, E>` has the following generic parameters:
/// - `N`: weight type (`f32`, `f64`)
/// - `E`: TF-IDF calculation engine (e.g. `DefaultTFIDFEngine`)
#[derive(Debug, Clone)]
pub struct TfIdfVectorizer<N = f64, E = DefaultTFIDFEngine>
where
    N: Weight,
    E: TFIDFEngine<N>,
{
    stop_words: StopwordFilter,
    min_token_chars: usize,
    _marker: PhantomData<fn() -> (N, E)>,
}

impl<N, E> Default for TfIdfVectorizer<N, E>
where
    N: Weight,
    E: TFIDFEngine<N>,
{
    fn default() -> Self {
        Self::new(StopWords::None)
    }
}

impl<N, E> TfIdfVectorizer<N, E>
where
    N: Weight,
    E: TFIDFEngine<N>,
{
    pub fn new(stop_words: StopWords) -> Self {
        Self::with_filter(StopwordFilter::new(stop_words))
    }

    pub fn with_filter(stop_words: StopwordFilter) -> Self {
        Self {
            stop_words,
            min_token_chars: DEFAULT_MIN_TOKEN_CHARS,
            _marker: PhantomData,
        }
    }

    pub fn min_token_chars(mut self, min_chars: usize) -> Self {
        self.min_token_chars = min_chars.max(1);
        self
    }

    /// Token counts of one document after stop-word removal
    ///
    /// # Arguments
    /// * `text` - normalized document text
    ///
    /// # Returns
    /// Lowercased token counts, stop words excluded
    pub fn token_frequency(&self, text: &str) -> TokenFrequency {
        tokenize(text, self.min_token_chars)
            .map(str::to_lowercase)
            .filter(|token| !self.stop_words.is_stopword(token))
            .collect()
    }

    /// Learn the vocabulary and IDF of `docs` and return their TF-IDF matrix.
    ///
    /// # Arguments
    /// * `docs` - documents, tokenized in parallel
    ///
    /// # Returns
    /// Matrix whose row `i` belongs to `docs[i]`
    pub fn fit_transform<S>(&self, docs: &[S]) -> TfIdfMatrix<N>
    where
        S: AsRef<str> + Sync,
    {
        let freqs: Vec<TokenFrequency> = docs
            .par_iter()
            .map(|doc| self.token_frequency(doc.as_ref()))
            .collect();

        let mut df = DocumentFrequency::new();
        for freq in &freqs {
            df.add_set(&freq.token_set_ref_str());
        }
        let vocabulary: IndexSet<Box<str>> = df.sorted_terms().into_iter().collect();
        let idf = E::idf_vec(&df, &vocabulary);

        let rows: Vec<SparseVec<N>> = freqs
            .par_iter()
            .map(|freq| {
                let mut row = E::tf_vec(freq, &vocabulary);
                row.hadamard_dense(&idf);
                row.normalize_l2();
                row.shrink_to_fit();
                row
            })
            .collect();
        debug!(docs = rows.len(), terms = vocabulary.len(), "tf-idf matrix built");

        TfIdfMatrix { vocabulary, idf, rows }
    }
}

/// Document-by-term TF-IDF weights
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfIdfMatrix<N = f64>
where
    N: Weight,
{
    /// term dimension in dictionary order
    pub vocabulary: IndexSet<Box<str>>,
    /// IDF per term
    pub idf: Vec<N>,
    /// one L2-normalized row per document
    pub rows: Vec<SparseVec<N>>,
}

impl<N> TfIdfMatrix<N>
where
    N: Weight,
{
    /// Number of documents (rows)
    #[inline]
    pub fn doc_num(&self) -> usize {
        self.rows.len()
    }

    /// Number of vocabulary terms (columns)
    #[inline]
    pub fn term_num(&self) -> usize {
        self.vocabulary.len()
    }

    /// Sparse TF-IDF row of document `doc`
    #[inline]
    pub fn row(&self, doc: usize) -> Option<&SparseVec<N>> {
        self.rows.get(doc)
    }

    /// Weight of `term` in document `doc`, zero when either is unknown
    pub fn weight(&self, doc: usize, term: &str) -> N {
        match (self.rows.get(doc), self.vocabulary.get_index_of(term)) {
            (Some(row), Some(col)) => row.get(col),
            _ => N::zero(),
        }
    }

    /// The `k` highest-weighted terms of document `doc`
    ///
    /// # Arguments
    /// * `doc` - row index
    /// * `k` - maximum number of terms
    ///
    /// # Returns
    /// (term, weight) by descending weight, ties in dictionary order; empty
    /// for an unknown document
    pub fn top_terms(&self, doc: usize, k: usize) -> Vec<(&str, N)> {
        let Some(row) = self.rows.get(doc) else {
            return Vec::new();
        };
        let mut terms: Vec<(&str, N)> = row
            .raw_iter()
            .filter_map(|(col, weight)| self.vocabulary.get_index(col).map(|term| (&**term, weight)))
            .collect();
        terms.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.0.cmp(b.0)));
        terms.truncate(k);
        terms
    }
}
