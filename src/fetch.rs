use std::{fs, path::Path};

use tracing::info;

use crate::error::Result;

/// Download `url` and write the response body verbatim to `path`.
///
/// Non-success HTTP statuses are errors. Returns the number of bytes written.
pub fn fetch_source<P: AsRef<Path>>(url: &str, path: P) -> Result<u64> {
    let body = reqwest::blocking::get(url)?.error_for_status()?.bytes()?;
    fs::write(path.as_ref(), &body)?;
    info!(url, path = %path.as_ref().display(), bytes = body.len(), "source fetched");
    Ok(body.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn malformed_url_is_a_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.txt");
        let err = fetch_source("not a url", &path).unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));
        assert!(!path.exists());
    }
}
