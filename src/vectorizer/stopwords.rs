//! Stop-word filtering
//!
//! The English list is the NLTK list shipped with the `stop-words` crate
//! (built with its `nltk` feature only).

use std::{collections::HashSet, fmt};

use serde::{Deserialize, Serialize};
use stop_words::{get, LANGUAGE};

/// Stop-word setting accepted by the vectorizer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopWords {
    /// Keep every token
    #[default]
    None,
    /// Drop common English words
    English,
}

impl fmt::Display for StopWords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopWords::None => f.write_str("none"),
            StopWords::English => f.write_str("english"),
        }
    }
}

/// Set of words removed from token streams
#[derive(Debug, Clone, Default)]
pub struct StopwordFilter {
    stopwords: HashSet<String>,
}

impl StopwordFilter {
    /// # Arguments
    /// * `setting` - which list to load
    ///
    /// # Returns
    /// An empty filter for `StopWords::None`, the NLTK list for `English`
    pub fn new(setting: StopWords) -> Self {
        match setting {
            StopWords::None => Self::default(),
            StopWords::English => Self {
                stopwords: get(LANGUAGE::English).iter().map(|s| s.to_lowercase()).collect(),
            },
        }
    }

    /// Tokens are already lowercase, so the lookup is exact
    #[inline]
    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    pub fn len(&self) -> usize {
        self.stopwords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stopwords.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_list_has_common_words() {
        let filter = StopwordFilter::new(StopWords::English);
        assert!(filter.is_stopword("the"));
        assert!(filter.is_stopword("and"));
        assert!(!filter.is_stopword("whale"));
    }

    #[test]
    fn english_list_is_the_nltk_one() {
        let filter = StopwordFilter::new(StopWords::English);
        assert_eq!(filter.len(), 179);
        for content_word in ["man", "men", "said", "world", "good", "great", "little"] {
            assert!(!filter.is_stopword(content_word), "{content_word} filtered");
        }
    }

    #[test]
    fn none_filters_nothing() {
        let filter = StopwordFilter::new(StopWords::None);
        assert!(filter.is_empty());
        assert!(!filter.is_stopword("the"));
    }

    #[test]
    fn display_names() {
        assert_eq!(StopWords::English.to_string(), "english");
        assert_eq!(StopWords::None.to_string(), "none");
    }
}
