use std::{
    ffi::OsString,
    fs::{self, File, OpenOptions},
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    error::{Error, Result},
    store::{AppendOutcome, CorpusStore},
    text::NormalizedText,
};

/// Default file name of the corpus artifact
pub const CORPUS_FILE: &str = "texts_to_analyze";
/// Default file name of the label artifact
pub const LABELS_FILE: &str = "labels";
/// Lock file created next to the corpus artifact while a write is in flight
pub const LOCK_FILE: &str = ".store.lock";

/// Locations of the two persisted store artifacts.
///
/// The corpus (`Vec<String>`) and the labels (`IndexMap<usize, String>`) are
/// serialized separately with CBOR and always loaded and saved as a pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreFiles {
    pub corpus_path: PathBuf,
    pub labels_path: PathBuf,
}

impl Default for StoreFiles {
    fn default() -> Self {
        Self::in_dir(".")
    }
}

impl StoreFiles {
    /// Default artifact names inside `dir`
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            corpus_path: dir.join(CORPUS_FILE),
            labels_path: dir.join(LABELS_FILE),
        }
    }

    /// Directory holding the corpus artifact
    pub fn dir(&self) -> &Path {
        self.corpus_path.parent().unwrap_or_else(|| Path::new("."))
    }

    pub fn lock_path(&self) -> PathBuf {
        self.dir().join(LOCK_FILE)
    }

    /// Load the store.
    ///
    /// Both artifacts absent gives an empty store; exactly one present is
    /// [`Error::StoreInconsistent`], as is a label map whose keys are not the
    /// corpus positions.
    pub fn load(&self) -> Result<CorpusStore> {
        let corpus_exists = self.corpus_path.try_exists()?;
        let labels_exists = self.labels_path.try_exists()?;
        match (corpus_exists, labels_exists) {
            (false, false) => {
                debug!(path = %self.corpus_path.display(), "no store yet");
                Ok(CorpusStore::new())
            }
            (true, true) => {
                let texts: Vec<String> = read_artifact(&self.corpus_path)?;
                let labels: IndexMap<usize, String> = read_artifact(&self.labels_path)?;
                debug!(docs = texts.len(), "store loaded");
                CorpusStore::from_parts(texts, labels)
            }
            (true, false) => Err(half_missing(&self.corpus_path, &self.labels_path)),
            (false, true) => Err(half_missing(&self.labels_path, &self.corpus_path)),
        }
    }

    /// Persist both artifacts.
    ///
    /// Both temp files are fully written before either is renamed into
    /// place, so a failed write leaves the previous pair intact. The two
    /// renames are separate steps: if the second one fails the corpus is
    /// already replaced, and the next [`StoreFiles::load`] reports the
    /// mismatch as [`Error::StoreInconsistent`]. Temp files are removed on
    /// every error path.
    ///
    /// # Arguments
    /// * `store` - the store to write
    pub fn save(&self, store: &CorpusStore) -> Result<()> {
        let dir = self.dir();
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
        let corpus_tmp = temp_path(&self.corpus_path);
        let labels_tmp = temp_path(&self.labels_path);
        let written = write_artifact(&corpus_tmp, store.texts())
            .and_then(|()| write_artifact(&labels_tmp, store.labels()))
            .and_then(|()| fs::rename(&corpus_tmp, &self.corpus_path).map_err(Error::from))
            .and_then(|()| fs::rename(&labels_tmp, &self.labels_path).map_err(Error::from));
        if let Err(e) = written {
            for tmp in [&corpus_tmp, &labels_tmp] {
                if let Err(rm) = fs::remove_file(tmp) {
                    if rm.kind() != io::ErrorKind::NotFound {
                        warn!(path = %tmp.display(), error = %rm, "failed to remove temp artifact");
                    }
                }
            }
            return Err(e);
        }
        debug!(docs = store.len(), path = %self.corpus_path.display(), "store saved");
        Ok(())
    }

    /// Take the store lock
    pub fn lock(&self) -> Result<StoreLock> {
        let dir = self.dir();
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
        StoreLock::acquire(self.lock_path())
    }

    /// Lock, load, append and save in one step.
    ///
    /// A duplicate text leaves both artifacts untouched. Returns the store as
    /// it stands after the call.
    pub fn add_document(&self, text: NormalizedText, title: impl Into<String>) -> Result<(CorpusStore, AppendOutcome)> {
        let _lock = self.lock()?;
        let title = title.into();
        let (store, outcome) = self.load()?.append_if_new(text, title.as_str());
        match outcome {
            AppendOutcome::Inserted { index } => {
                self.save(&store)?;
                info!(index, title = %title, docs = store.len(), "document added");
            }
            AppendOutcome::Duplicate { index } => {
                warn!(index, existing = store.label(index).unwrap_or_default(), "document already in corpus, skipped");
            }
        }
        Ok((store, outcome))
    }
}

/// Exclusive lock held as a file created with create-new semantics.
///
/// Removed again when dropped. A lock left behind by a crashed process has
/// to be deleted by hand.
#[derive(Debug)]
pub struct StoreLock {
    path: PathBuf,
}

impl StoreLock {
    pub fn acquire(path: PathBuf) -> Result<Self> {
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                writeln!(file, "{}", std::process::id())?;
                Ok(Self { path })
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(Error::StoreLocked { path }),
            Err(e) => Err(e.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "failed to release store lock");
        }
    }
}

fn half_missing(present: &Path, missing: &Path) -> Error {
    Error::StoreInconsistent {
        reason: format!("{} exists but {} is missing", present.display(), missing.display()),
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_cbor::from_reader(reader)?)
}

fn write_artifact<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_cbor::to_writer(&mut writer, &value)?;
    writer.flush()?;
    writer.into_inner().map_err(|e| e.into_error())?.sync_all()?;
    Ok(())
}
