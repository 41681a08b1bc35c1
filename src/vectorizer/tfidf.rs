use indexmap::IndexSet;

use crate::{
    utils::sparse::SparseVec,
    vectorizer::{doc_freq::DocumentFrequency, token::TokenFrequency, Weight},
};

/// Pluggable TF and IDF weighting.
///
/// `TfIdfVectorizer<N, E>` calls the engine once for the IDF vector of the
/// whole vocabulary and once per document for its TF vector; the vectorizer
/// multiplies the two and L2-normalizes each row.
pub trait TFIDFEngine<N>
where
    N: Weight,
{
    /// IDF vector, one entry per vocabulary term
    /// # Arguments
    /// * `df` - document frequencies of the corpus
    /// * `vocabulary` - term dimension, position = column index
    fn idf_vec(df: &DocumentFrequency, vocabulary: &IndexSet<Box<str>>) -> Vec<N>;

    /// Sparse TF vector of one document over `vocabulary`.
    /// Tokens outside the vocabulary are ignored.
    fn tf_vec(freq: &TokenFrequency, vocabulary: &IndexSet<Box<str>>) -> SparseVec<N>;
}

/// Raw-count TF with smoothed IDF: `ln((1 + n) / (1 + df)) + 1`
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTFIDFEngine;

/// Sublinear TF `1 + ln(count)` with the same smoothed IDF
#[derive(Debug, Clone, Copy, Default)]
pub struct SublinearTFIDFEngine;

#[inline]
fn smooth_idf<N: Weight>(df: &DocumentFrequency, vocabulary: &IndexSet<Box<str>>) -> Vec<N> {
    let doc_num = df.get_doc_num() as f64;
    vocabulary
        .iter()
        .map(|term| {
            let doc_freq = df.get_term_count(term) as f64;
            N::from_f64(((1.0 + doc_num) / (1.0 + doc_freq)).ln() + 1.0).unwrap_or_else(N::zero)
        })
        .collect()
}

#[inline]
fn tf_by<N, F>(freq: &TokenFrequency, vocabulary: &IndexSet<Box<str>>, weight: F) -> SparseVec<N>
where
    N: Weight,
    F: Fn(u32) -> f64,
{
    let pairs = freq.iter().filter_map(|(token, count)| {
        let col = vocabulary.get_index_of(token)?;
        Some((col as u32, N::from_f64(weight(count)).unwrap_or_else(N::zero)))
    });
    SparseVec::from_pairs(vocabulary.len(), pairs)
}

impl<N> TFIDFEngine<N> for DefaultTFIDFEngine
where
    N: Weight,
{
    fn idf_vec(df: &DocumentFrequency, vocabulary: &IndexSet<Box<str>>) -> Vec<N> {
        smooth_idf(df, vocabulary)
    }

    fn tf_vec(freq: &TokenFrequency, vocabulary: &IndexSet<Box<str>>) -> SparseVec<N> {
        tf_by(freq, vocabulary, |count| count as f64)
    }
}

impl<N> TFIDFEngine<N> for SublinearTFIDFEngine
where
    N: Weight,
{
    fn idf_vec(df: &DocumentFrequency, vocabulary: &IndexSet<Box<str>>) -> Vec<N> {
        smooth_idf(df, vocabulary)
    }

    fn tf_vec(freq: &TokenFrequency, vocabulary: &IndexSet<Box<str>>) -> SparseVec<N> {
        tf_by(freq, vocabulary, |count| if count == 0 { 0.0 } else { 1.0 + (count as f64).ln() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab(terms: &[&str]) -> IndexSet<Box<str>> {
        terms.iter().map(|t| Box::<str>::from(*t)).collect()
    }

    #[test]
    fn smoothed_idf_values() {
        let mut df = DocumentFrequency::new();
        df.add_set(&["a", "b"]);
        df.add_set(&["a"]);
        let idf: Vec<f64> = <DefaultTFIDFEngine as TFIDFEngine<f64>>::idf_vec(&df, &vocab(&["a", "b"]));
        // a: ln(3/3) + 1, b: ln(3/2) + 1
        assert!((idf[0] - 1.0).abs() < 1e-12);
        assert!((idf[1] - (1.5_f64.ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn raw_and_sublinear_tf() {
        let freq: TokenFrequency = ["a", "a", "a", "c", "unknown"].into_iter().collect();
        let v = vocab(&["a", "b", "c"]);

        let raw: SparseVec<f64> = <DefaultTFIDFEngine as TFIDFEngine<f64>>::tf_vec(&freq, &v);
        assert_eq!(raw.raw_iter().collect::<Vec<_>>(), vec![(0, 3.0), (2, 1.0)]);

        let sub: SparseVec<f32> = <SublinearTFIDFEngine as TFIDFEngine<f32>>::tf_vec(&freq, &v);
        assert!((sub.get(0) - (1.0 + 3.0_f32.ln())).abs() < 1e-6);
        assert_eq!(sub.get(2), 1.0);
        assert_eq!(sub.get(1), 0.0);
    }
}
