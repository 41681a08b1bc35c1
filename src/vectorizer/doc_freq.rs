use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Document count and per-term document frequency over a corpus.
///
/// It does not store document text; it only manages:
/// - the number of documents added
/// - the number of documents each term appears in
///
/// It is the base data for IDF calculation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentFrequency {
    doc_num: u64,
    term_counts: HashMap<Box<str>, u64>,
}

impl DocumentFrequency {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one document's distinct terms
    pub fn add_set<T>(&mut self, terms: &[T])
    where
        T: AsRef<str>,
    {
        self.doc_num += 1;
        for term in terms {
            *self.term_counts.entry(term.as_ref().into()).or_insert(0) += 1;
        }
    }

    /// Number of documents in the corpus
    #[inline]
    pub fn get_doc_num(&self) -> u64 {
        self.doc_num
    }

    /// Number of documents containing `term`
    #[inline]
    pub fn get_term_count(&self, term: &str) -> u64 {
        self.term_counts.get(term).copied().unwrap_or(0)
    }

    /// All terms in dictionary order
    pub fn sorted_terms(&self) -> Vec<Box<str>> {
        let mut terms: Vec<Box<str>> = self.term_counts.keys().cloned().collect();
        terms.sort_unstable();
        terms
    }
}
