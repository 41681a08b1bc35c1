//! End-to-end flow: normalize a source file into the store, then vectorize,
//! compare and embed the whole corpus.

use std::path::Path;

use tracing::info;

use crate::{
    embedding::{plot::ScatterPlot, Embedding, Mds},
    error::{Error, Result},
    similarity::SimilarityMatrix,
    store::{AppendOutcome, CorpusStore, StoreFiles},
    text::{normalize, read_lines, MarkerConfig},
    vectorizer::{stopwords::StopWords, TfIdfMatrix, TfIdfVectorizer},
};

/// Everything computed from one snapshot of the corpus
#[derive(Debug, Clone)]
pub struct Analysis {
    pub store: CorpusStore,
    pub matrix: TfIdfMatrix<f64>,
    pub similarity: SimilarityMatrix,
    pub embedding: Embedding,
}

impl Analysis {
    pub fn plot(&self) -> Result<ScatterPlot> {
        ScatterPlot::new(&self.embedding, &self.store)
    }
}

/// Vectorize, compare and embed every document of `store`
pub fn analyze_store(store: CorpusStore, stop_words: StopWords, mds: &Mds) -> Result<Analysis> {
    if store.is_empty() {
        return Err(Error::EmptyCorpus);
    }
    let matrix = TfIdfVectorizer::<f64>::new(stop_words).fit_transform(store.texts());
    let similarity = SimilarityMatrix::cosine(&matrix);
    let embedding = mds.fit(&similarity.dissimilarity());
    info!(docs = store.len(), terms = matrix.term_num(), %stop_words, "corpus analyzed");
    Ok(Analysis {
        store,
        matrix,
        similarity,
        embedding,
    })
}

/// Operations against one on-disk store
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    pub files: StoreFiles,
    pub mds: Mds,
}

impl Pipeline {
    pub fn new(files: StoreFiles) -> Self {
        Self {
            files,
            mds: Mds::default(),
        }
    }

    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self::new(StoreFiles::in_dir(dir))
    }

    /// Normalize the file at `path` and add it to the store under `title`
    ///
    /// # Arguments
    /// * `path` - source text file
    /// * `title` - label for a newly stored document
    /// * `markers` - region to keep
    ///
    /// # Returns
    /// The store after the call and where the text lives in it
    pub fn add<P: AsRef<Path>>(&self, path: P, title: &str, markers: &MarkerConfig) -> Result<(CorpusStore, AppendOutcome)> {
        let lines = read_lines(path)?;
        let text = normalize(&lines, markers)?;
        self.files.add_document(text, title)
    }

    /// Current store contents.
    ///
    /// Reads do not take the store lock, so any number of readers can run
    /// next to each other and next to a writer. A read that lands between a
    /// writer's two renames sees mismatched artifacts and fails with
    /// [`Error::StoreInconsistent`]; running it again sees the new pair.
    pub fn load(&self) -> Result<CorpusStore> {
        self.files.load()
    }

    /// Analyze the stored corpus
    pub fn analyze(&self, stop_words: StopWords) -> Result<Analysis> {
        analyze_store(self.load()?, stop_words, &self.mds)
    }

    /// Add then analyze. A duplicate source still yields an analysis.
    pub fn run<P: AsRef<Path>>(
        &self,
        path: P,
        title: &str,
        markers: &MarkerConfig,
        stop_words: StopWords,
    ) -> Result<(AppendOutcome, Analysis)> {
        let (store, outcome) = self.add(path, title, markers)?;
        let analysis = analyze_store(store, stop_words, &self.mds)?;
        Ok((outcome, analysis))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    const WHALE: &str = "header\n*** START OF BOOK ***\nThe whale swam in the sea.\nA ship sailed the sea.\n*** END OF BOOK ***\nfooter\n";
    const STORM: &str = "*** START\nThe ship met a storm at sea!\n*** END OF IT\n";
    const GARDEN: &str = "*** START\nRoses grew in the quiet garden, 1850.\n*** END OF IT\n";

    fn write_source(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn add_normalizes_between_markers() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_source(dir.path(), "whale.txt", WHALE);
        let pipeline = Pipeline::in_dir(dir.path().join("store"));
        let (store, outcome) = pipeline.add(&src, "Whale", &MarkerConfig::gutenberg()).unwrap();
        assert_eq!(outcome, AppendOutcome::Inserted { index: 0 });
        assert_eq!(store.texts(), ["the whale swam in the sea a ship sailed the sea "]);
        assert_eq!(pipeline.load().unwrap(), store);
    }

    #[test]
    fn missing_marker_leaves_store_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_source(dir.path(), "plain.txt", "no markers here\n");
        let pipeline = Pipeline::in_dir(dir.path());
        let err = pipeline.add(&src, "Plain", &MarkerConfig::gutenberg()).unwrap_err();
        assert!(matches!(err, Error::BoundaryNotFound { .. }));
        assert!(pipeline.load().unwrap().is_empty());
    }

    #[test]
    fn reads_do_not_wait_for_the_writer_lock() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::in_dir(dir.path());
        pipeline
            .add(write_source(dir.path(), "a.txt", WHALE), "Whale", &MarkerConfig::gutenberg())
            .unwrap();
        let _held = pipeline.files.lock().unwrap();
        assert_eq!(pipeline.load().unwrap().len(), 1);
        assert_eq!(pipeline.analyze(StopWords::None).unwrap().store.len(), 1);
        // writers still exclude each other
        let err = pipeline
            .add(write_source(dir.path(), "b.txt", STORM), "Storm", &MarkerConfig::gutenberg())
            .unwrap_err();
        assert!(matches!(err, Error::StoreLocked { .. }));
    }

    #[test]
    fn analyze_empty_store_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Pipeline::in_dir(dir.path()).analyze(StopWords::None).unwrap_err();
        assert!(matches!(err, Error::EmptyCorpus));
    }

    #[test]
    fn run_builds_consistent_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::in_dir(dir.path());
        let markers = MarkerConfig::gutenberg();
        pipeline.add(write_source(dir.path(), "a.txt", WHALE), "Whale", &markers).unwrap();
        pipeline.add(write_source(dir.path(), "b.txt", STORM), "Storm", &markers).unwrap();
        let (outcome, analysis) = pipeline
            .run(write_source(dir.path(), "c.txt", GARDEN), "Garden", &markers, StopWords::English)
            .unwrap();
        assert_eq!(outcome, AppendOutcome::Inserted { index: 2 });
        assert_eq!(analysis.store.len(), 3);
        assert_eq!(analysis.matrix.doc_num(), 3);
        assert_eq!(analysis.similarity.len(), 3);
        assert_eq!(analysis.embedding.len(), 3);

        // the two sea stories are closer to each other than to the garden
        let sim = &analysis.similarity;
        assert!(sim.get(0, 1) > sim.get(0, 2));
        assert!(sim.get(0, 1) > sim.get(1, 2));

        let plot = analysis.plot().unwrap();
        let labels: Vec<&str> = plot.points.iter().map(|(label, _)| label.as_str()).collect();
        assert_eq!(labels, vec!["Whale", "Storm", "Garden"]);
    }

    #[test]
    fn run_with_duplicate_source_still_analyzes() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::in_dir(dir.path());
        let src = write_source(dir.path(), "a.txt", WHALE);
        let markers = MarkerConfig::gutenberg();
        pipeline.add(&src, "Whale", &markers).unwrap();
        let (outcome, analysis) = pipeline.run(&src, "Whale again", &markers, StopWords::None).unwrap();
        assert_eq!(outcome, AppendOutcome::Duplicate { index: 0 });
        assert_eq!(analysis.store.label(0), Some("Whale"));
        assert_eq!(analysis.similarity.get(0, 0), 1.0);
    }
}
