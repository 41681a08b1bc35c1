use std::{fmt, fs, path::Path};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Boundary, Error, Result};

/// Project Gutenberg header sentinel
pub const GUTENBERG_BEGIN: &str = "***";
/// Project Gutenberg footer sentinel
pub const GUTENBERG_END: &str = "*** END OF";

/// Marker lines that bound the region of a text to analyze.
///
/// A `None` marker falls back to the Project Gutenberg sentinels
/// ([`GUTENBERG_BEGIN`] / [`GUTENBERG_END`]). Markers match by
/// case-sensitive substring containment, and the first matching line wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerConfig {
    pub begin_marker: Option<String>,
    pub end_marker: Option<String>,
}

impl MarkerConfig {
    /// Gutenberg sentinels on both ends
    pub fn gutenberg() -> Self {
        Self::default()
    }

    pub fn new<B, E>(begin_marker: Option<B>, end_marker: Option<E>) -> Self
    where
        B: Into<String>,
        E: Into<String>,
    {
        Self {
            begin_marker: begin_marker.map(Into::into),
            end_marker: end_marker.map(Into::into),
        }
    }

    #[inline]
    pub fn begin(&self) -> &str {
        self.begin_marker.as_deref().unwrap_or(GUTENBERG_BEGIN)
    }

    #[inline]
    pub fn end(&self) -> &str {
        self.end_marker.as_deref().unwrap_or(GUTENBERG_END)
    }
}

/// Lowercase, digit-free, punctuation-free text ready to be vectorized.
///
/// Only produced by [`normalize`] and [`clean`], so any value of this type has
/// already been through the cleaning steps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedText(String);

impl NormalizedText {
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_string(self) -> String {
        self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read a file into lines, keeping each line's terminator.
///
/// `\r\n` and a lone `\r` both become `\n` first, so every line ends in
/// `\n` whatever the file's line endings. Keeping the `\n` lets a marker
/// such as `"Beginning.\n"` match a whole line rather than any line that
/// merely starts with it.
///
/// # Arguments
/// * `path` - UTF-8 text file
///
/// # Returns
/// The lines in file order; the last one has no terminator when the file
/// does not end with a line break.
pub fn read_lines<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)?.replace("\r\n", "\n").replace('\r', "\n");
    Ok(content.split_inclusive('\n').map(str::to_owned).collect())
}

/// Position of the first line in `lines[from..]` containing `marker`
#[inline]
fn find_marker<S: AsRef<str>>(lines: &[S], from: usize, marker: &str) -> Option<usize> {
    lines
        .get(from..)?
        .iter()
        .position(|line| line.as_ref().contains(marker))
        .map(|offset| from + offset)
}

/// Extract the region between the begin and end markers and clean it.
///
/// The region starts on the line after the begin marker and stops right
/// before the first end marker found after that point.
///
/// # Arguments
/// * `lines` - raw lines, terminators included
/// * `markers` - begin/end markers, Gutenberg sentinels when absent
///
/// # Errors
/// [`Error::BoundaryNotFound`] when either marker is missing from the
/// scanned range.
pub fn normalize<S: AsRef<str>>(lines: &[S], markers: &MarkerConfig) -> Result<NormalizedText> {
    let begin_marker = markers.begin();
    let begin_line = find_marker(lines, 0, begin_marker).ok_or_else(|| Error::BoundaryNotFound {
        boundary: Boundary::Begin,
        marker: begin_marker.to_owned(),
    })?;
    let start = begin_line + 1;

    let end_marker = markers.end();
    let end = find_marker(lines, start, end_marker).ok_or_else(|| Error::BoundaryNotFound {
        boundary: Boundary::End,
        marker: end_marker.to_owned(),
    })?;
    debug!(begin_line, end_line = end, "selected region");

    let mut raw = String::new();
    for line in &lines[start..end] {
        raw.push_str(line.as_ref());
    }
    Ok(clean(&raw))
}

/// Apply the cleaning steps to already-selected text.
///
/// Lowercases, drops ASCII digits and ASCII punctuation, and turns each
/// `\r`, `\n` and `\t` into a single space. Running it twice gives the same
/// result as running it once.
pub fn clean(text: &str) -> NormalizedText {
    let lowered = text.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        match c {
            c if c.is_ascii_digit() || c.is_ascii_punctuation() => {}
            '\r' | '\n' | '\t' => out.push(' '),
            c => out.push(c),
        }
    }
    NormalizedText(out)
}
