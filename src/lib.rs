/// This crate accumulates plain-text documents and compares them with TF-IDF
/// cosine similarity, projecting the corpus onto a 2-D map.
pub mod error;
pub mod text;
pub mod store;
pub mod vectorizer;
pub mod similarity;
pub mod embedding;
pub mod fetch;
pub mod pipeline;
pub mod utils;

/// Error and Result types
/// Every fallible operation of this crate returns `text_similarity::Result`.
/// Missing markers, a disagreeing or locked store, an empty corpus, I/O,
/// codec and download failures are the variants of `Error`.
pub use error::{Error, Result};

/// Text Normalizer
/// Selects the region between a begin and an end marker (Project Gutenberg
/// sentinels by default) and cleans it:
/// - lowercase
/// - ASCII digits and punctuation removed
/// - line breaks and tabs turned into spaces
///
/// `NormalizedText` is the only input the corpus store accepts.
pub use text::{clean, normalize, read_lines, MarkerConfig, NormalizedText};

/// Corpus Store
/// Ordered list of normalized documents paired with a map from position to
/// title. Appending an exact duplicate is a no-op.
///
/// # Persistence
/// `StoreFiles` saves the two halves as CBOR artifacts and loads them back
/// as a pair. Writers are serialized through a lock file.
pub use store::{AppendOutcome, CorpusStore, StoreFiles, StoreLock};

/// TF-IDF Vectorizer
/// Converts the corpus into a document-by-term matrix of TF-IDF weights.
///
/// `TfIdfVectorizer<N, E>` has the following generic parameters:
/// - `N`: weight type (f32, f64)
/// - `E`: TF-IDF calculation engine (e.g., DefaultTFIDFEngine)
///
/// Stop words can be removed with `StopWords::English`.
pub use vectorizer::{TfIdfMatrix, TfIdfVectorizer};

/// Token Frequency structure
/// Counts token occurrences within a single document. It is the base data
/// for TF (Term Frequency) calculation.
pub use vectorizer::token::TokenFrequency;

/// TF IDF Calculation Engine Trait
/// Defines how TF and IDF vectors are computed. By implementing this trait
/// you can plug other weighting schemes into `TfIdfVectorizer<N, E>`.
///
/// Provided engines:
/// - `DefaultTFIDFEngine`: raw counts, smoothed IDF
/// - `SublinearTFIDFEngine`: `1 + ln(count)`, smoothed IDF
pub use vectorizer::tfidf::{DefaultTFIDFEngine, SublinearTFIDFEngine, TFIDFEngine};

/// Stop-word settings
pub use vectorizer::stopwords::StopWords;

/// Similarity
/// Pairwise cosine similarity of the TF-IDF rows, its `1 - s` dissimilarity,
/// and `Hits`, a ranked list of neighbouring documents.
pub use similarity::{DissimilarityMatrix, Hits, SimilarityMatrix};

/// Embedding
/// Classical multidimensional scaling of the dissimilarity matrix into two
/// dimensions, and a labelled scatter plot of the result.
pub use embedding::{plot::ScatterPlot, Embedding, Mds};

/// Download a source text to a local file
pub use fetch::fetch_source;

/// Pipeline
/// Wires the steps together against one on-disk store:
/// normalize -> store -> vectorize -> compare -> embed.
pub use pipeline::{analyze_store, Analysis, Pipeline};
