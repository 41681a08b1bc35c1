pub mod persist;

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::{error::{Error, Result}, text::NormalizedText};

pub use persist::{StoreFiles, StoreLock};

/// Result of offering a document to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The text was new and now lives at `index`
    Inserted { index: usize },
    /// The exact text was already stored at `index`; nothing changed
    Duplicate { index: usize },
}

impl AppendOutcome {
    #[inline]
    pub fn index(&self) -> usize {
        match *self {
            AppendOutcome::Inserted { index } | AppendOutcome::Duplicate { index } => index,
        }
    }

    #[inline]
    pub fn is_inserted(&self) -> bool {
        matches!(self, AppendOutcome::Inserted { .. })
    }
}

/// Ordered collection of normalized documents plus their labels.
///
/// Holds two structures that always move together:
/// - `texts`: the corpus, insertion order is the document position
/// - `labels`: position -> user-supplied title
///
/// The key set of `labels` is exactly `0..texts.len()` and no two texts are
/// equal. The only mutation is [`CorpusStore::append_if_new`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorpusStore {
    texts: Vec<String>,
    labels: IndexMap<usize, String>,
}

impl CorpusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from its two persisted halves, checking they agree
    ///
    /// # Arguments
    /// * `texts` - corpus in position order
    /// * `labels` - position -> title
    ///
    /// # Errors
    /// [`Error::StoreInconsistent`] when the label keys are not exactly
    /// `0..texts.len()` or two texts are equal.
    pub fn from_parts(texts: Vec<String>, labels: IndexMap<usize, String>) -> Result<Self> {
        if labels.len() != texts.len() {
            return Err(Error::StoreInconsistent {
                reason: format!("{} texts but {} labels", texts.len(), labels.len()),
            });
        }
        if let Some(missing) = (0..texts.len()).find(|idx| !labels.contains_key(idx)) {
            return Err(Error::StoreInconsistent {
                reason: format!("no label for document {missing}"),
            });
        }
        let mut seen = HashSet::with_capacity(texts.len());
        if let Some(dup) = texts.iter().position(|text| !seen.insert(text.as_str())) {
            return Err(Error::StoreInconsistent {
                reason: format!("document {dup} is a duplicate"),
            });
        }
        Ok(Self { texts, labels })
    }

    /// Append `text` under `title` unless the exact text is already stored.
    ///
    /// Takes the store by value and hands it back, so callers thread one
    /// explicit value through a session instead of sharing state.
    ///
    /// # Arguments
    /// * `text` - normalized document
    /// * `title` - label for the new position, ignored for a duplicate
    ///
    /// # Returns
    /// The store after the call and where the text lives in it
    pub fn append_if_new(mut self, text: NormalizedText, title: impl Into<String>) -> (Self, AppendOutcome) {
        if let Some(index) = self.position(text.as_str()) {
            return (self, AppendOutcome::Duplicate { index });
        }
        let index = self.texts.len();
        self.texts.push(text.into_string());
        self.labels.insert(index, title.into());
        (self, AppendOutcome::Inserted { index })
    }

    /// Position of an exact text match
    #[inline]
    pub fn position(&self, text: &str) -> Option<usize> {
        self.texts.iter().position(|stored| stored == text)
    }

    /// Number of stored documents
    #[inline]
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Corpus in position order, the input of the vectorizer
    #[inline]
    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    /// Position -> title map; its keys are exactly `0..len()`
    #[inline]
    pub fn labels(&self) -> &IndexMap<usize, String> {
        &self.labels
    }

    /// Title of the document at `index`, `None` past the end
    #[inline]
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(&index).map(String::as_str)
    }

    /// (position, label, text) in corpus order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str, &str)> + '_ {
        self.texts
            .iter()
            .enumerate()
            .map(|(idx, text)| (idx, self.label(idx).unwrap_or_default(), text.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::clean;

    fn keys_match_positions(store: &CorpusStore) -> bool {
        let mut keys: Vec<usize> = store.labels().keys().copied().collect();
        keys.sort_unstable();
        keys == (0..store.len()).collect::<Vec<_>>()
    }

    #[test]
    fn first_insert_initializes_both_halves() {
        let (store, outcome) = CorpusStore::new().append_if_new(clean("Alpha beta"), "A");
        assert_eq!(outcome, AppendOutcome::Inserted { index: 0 });
        assert_eq!(store.texts(), ["alpha beta"]);
        assert_eq!(store.label(0), Some("A"));
    }

    #[test]
    fn distinct_texts_get_sequential_labels() {
        let store = CorpusStore::new();
        let (store, _) = store.append_if_new(clean("text a"), "A");
        let (store, outcome) = store.append_if_new(clean("text b"), "B");
        assert_eq!(outcome, AppendOutcome::Inserted { index: 1 });
        assert_eq!(store.texts(), ["text a", "text b"]);
        let labels: Vec<(usize, &str)> = store.labels().iter().map(|(k, v)| (*k, v.as_str())).collect();
        assert_eq!(labels, vec![(0, "A"), (1, "B")]);
    }

    #[test]
    fn duplicate_text_is_a_no_op() {
        let (store, _) = CorpusStore::new().append_if_new(clean("same words"), "first");
        let (store, _) = store.append_if_new(clean("other words"), "second");
        let before = store.clone();
        let (store, outcome) = store.append_if_new(clean("same words"), "renamed");
        assert_eq!(outcome, AppendOutcome::Duplicate { index: 0 });
        assert!(!outcome.is_inserted());
        assert_eq!(store, before);
        assert_eq!(store.label(0), Some("first"));
    }

    #[test]
    fn label_keys_track_positions_after_every_insert() {
        let docs = ["one", "two", "one", "three", "two", "four"];
        let mut store = CorpusStore::new();
        for (i, doc) in docs.iter().enumerate() {
            let (next, _) = store.append_if_new(clean(doc), format!("title {i}"));
            store = next;
            assert!(keys_match_positions(&store), "after insert {i}");
        }
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn iter_pairs_labels_with_texts() {
        let (store, _) = CorpusStore::new().append_if_new(clean("x y"), "X");
        let (store, _) = store.append_if_new(clean("z"), "Z");
        let rows: Vec<_> = store.iter().collect();
        assert_eq!(rows, vec![(0, "X", "x y"), (1, "Z", "z")]);
    }

    #[test]
    fn from_parts_rejects_mismatched_halves() {
        let texts = vec!["a".to_string(), "b".to_string()];
        let mut labels = IndexMap::new();
        labels.insert(0, "A".to_string());
        assert!(matches!(
            CorpusStore::from_parts(texts.clone(), labels.clone()),
            Err(Error::StoreInconsistent { .. })
        ));

        labels.insert(5, "B".to_string());
        assert!(matches!(
            CorpusStore::from_parts(texts.clone(), labels),
            Err(Error::StoreInconsistent { .. })
        ));

        let mut labels = IndexMap::new();
        labels.insert(1, "B".to_string());
        labels.insert(0, "A".to_string());
        let store = CorpusStore::from_parts(texts, labels).unwrap();
        assert_eq!(store.label(1), Some("B"));
    }

    #[test]
    fn from_parts_rejects_duplicate_texts() {
        let texts = vec!["a".to_string(), "a".to_string()];
        let labels: IndexMap<usize, String> = [(0, "A".to_string()), (1, "B".to_string())].into_iter().collect();
        assert!(matches!(
            CorpusStore::from_parts(texts, labels),
            Err(Error::StoreInconsistent { .. })
        ));
    }
}
