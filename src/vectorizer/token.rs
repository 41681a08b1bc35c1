use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Token occurrence counts for one document.
///
/// Keeps the count of each token and the total number of tokens, which is
/// the base data for TF calculation. Tokens keep first-seen order.
///
/// # Examples
/// ```
/// use text_similarity::TokenFrequency;
/// let freq: TokenFrequency = ["whale", "sea", "whale"].into_iter().collect();
/// assert_eq!(freq.token_count("whale"), 2);
/// assert_eq!(freq.token_sum(), 3);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenFrequency {
    #[serde(with = "indexmap::map::serde_seq")]
    counts: IndexMap<String, u32>,
    total: u64,
}

impl TokenFrequency {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `token`
    ///
    /// # Arguments
    /// * `token` - owned token, stored as the key on first sight
    #[inline]
    pub fn record(&mut self, token: String) {
        *self.counts.entry(token).or_default() += 1;
        self.total += 1;
    }

    /// Occurrences of `token`, zero when absent
    #[inline]
    pub fn token_count(&self, token: &str) -> u32 {
        self.counts.get(token).copied().unwrap_or(0)
    }

    /// Total number of tokens recorded
    #[inline]
    pub fn token_sum(&self) -> u64 {
        self.total
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Distinct tokens, borrowed, in first-seen order
    #[inline]
    pub fn token_set_ref_str(&self) -> Vec<&str> {
        self.counts.keys().map(String::as_str).collect()
    }

    /// (token, count) pairs in first-seen order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.counts.iter().map(|(token, &count)| (token.as_str(), count))
    }
}

impl<S: Into<String>> Extend<S> for TokenFrequency {
    fn extend<I: IntoIterator<Item = S>>(&mut self, tokens: I) {
        for token in tokens {
            self.record(token.into());
        }
    }
}

impl<S: Into<String>> FromIterator<S> for TokenFrequency {
    fn from_iter<I: IntoIterator<Item = S>>(tokens: I) -> Self {
        let mut freq = Self::new();
        freq.extend(tokens);
        freq
    }
}
