// ============================================================
// Layer 6 — Embedded Corpus Cache
// ============================================================
// Loading a large pretrained table and vectorizing every
// document is by far the slowest step of an evaluation, and its
// result only depends on the corpus, the embedding file and the
// tokenizer settings. So the vectorized corpus is written to the
// output directory and reused while those inputs are unchanged.
//
// Files:
//   <output_dir>/
//     embedded_corpus.bin      ← EmbeddedCorpus (flat f32 dump)
//     labels.json              ← label per embedded document
//     experiment_config.json   ← config of the run that wrote it
//     fingerprint.json         ← corpus digest + embedding file stat
//
// Paths alone are not enough: a file edited in place keeps its
// path. The fingerprint hashes every document text and records
// the embedding file's length and modification time, and any
// difference makes the cache stale.
//
// The cache holds the corpus BEFORE empty-document handling and
// length normalization, so changing those policies (or any
// classifier setting) never invalidates it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::UNIX_EPOCH,
};

use crate::application::evaluate_use_case::ExperimentConfig;
use crate::domain::document::Corpus;
use crate::domain::traits::Persistable;
use crate::embedding::corpus::EmbeddedCorpus;

const CORPUS_FILE:      &str = "embedded_corpus.bin";
const LABELS_FILE:      &str = "labels.json";
const CONFIG_FILE:      &str = "experiment_config.json";
const FINGERPRINT_FILE: &str = "fingerprint.json";

// ─── InputFingerprint ────────────────────────────────────────────────────────

/// Content-level identity of the inputs a cached corpus was built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFingerprint {
    /// blake3 over categories, then source, label and text of every document
    pub corpus_digest:         String,
    pub embedding_len:         u64,
    /// Nanoseconds since the Unix epoch; None where the platform has no mtime
    pub embedding_modified_ns: Option<u64>,
}

impl InputFingerprint {
    pub fn compute(corpus: &Corpus, embeddings: impl AsRef<Path>) -> Result<Self> {
        let embeddings = embeddings.as_ref();
        let meta = fs::metadata(embeddings).with_context(|| {
            format!("Cannot open embedding file '{}'", embeddings.display())
        })?;
        let embedding_modified_ns = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .and_then(|d| u64::try_from(d.as_nanos()).ok());

        Ok(Self {
            corpus_digest: corpus_digest(corpus),
            embedding_len: meta.len(),
            embedding_modified_ns,
        })
    }
}

/// Every field is length-prefixed so no two corpora share a byte stream.
fn corpus_digest(corpus: &Corpus) -> String {
    let mut hasher = blake3::Hasher::new();
    let mut field = |bytes: &[u8]| {
        hasher.update(&(bytes.len() as u64).to_le_bytes());
        hasher.update(bytes);
    };
    field(&(corpus.categories().len() as u64).to_le_bytes());
    for category in corpus.categories() {
        field(category.as_bytes());
    }
    for (doc, &label) in corpus.documents().iter().zip(corpus.labels()) {
        field(doc.source.as_bytes());
        field(&(label as u64).to_le_bytes());
        field(doc.text.as_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

// ─── CorpusCache ─────────────────────────────────────────────────────────────

pub struct CorpusCache {
    dir: PathBuf,
}

impl CorpusCache {
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create output directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn save_config(&self, cfg: &ExperimentConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved experiment config to '{}'", path.display());
        Ok(())
    }

    fn load_config(&self) -> Result<ExperimentConfig> {
        let path = self.dir.join(CONFIG_FILE);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read config from '{}'", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("'{}' is not a valid experiment config", path.display()))
    }

    fn load_fingerprint(&self) -> Result<InputFingerprint> {
        let path = self.dir.join(FINGERPRINT_FILE);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read fingerprint from '{}'", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("'{}' is not a valid input fingerprint", path.display()))
    }

    /// Store a freshly vectorized corpus together with the config
    /// and input fingerprint that produced it.
    pub fn save(
        &self,
        cfg:         &ExperimentConfig,
        fingerprint: &InputFingerprint,
        corpus:      &EmbeddedCorpus,
        labels:      &[usize],
    ) -> Result<()> {
        corpus.save(&self.dir.join(CORPUS_FILE))?;

        let path = self.dir.join(LABELS_FILE);
        fs::write(&path, serde_json::to_string(labels)?)
            .with_context(|| format!("Cannot write labels to '{}'", path.display()))?;

        let path = self.dir.join(FINGERPRINT_FILE);
        fs::write(&path, serde_json::to_string_pretty(fingerprint)?)
            .with_context(|| format!("Cannot write fingerprint to '{}'", path.display()))?;

        self.save_config(cfg)?;
        tracing::info!("Cached embedded corpus in '{}'", self.dir.display());
        Ok(())
    }

    /// Return the cached corpus if it was produced from the same
    /// settings as `cfg`, the same input contents as `fingerprint`,
    /// and its labels equal `labels`.
    /// A missing or stale cache is `Ok(None)`; a corrupt one is an error.
    pub fn load_if_fresh(
        &self,
        cfg:         &ExperimentConfig,
        fingerprint: &InputFingerprint,
        labels:      &[usize],
    ) -> Result<Option<EmbeddedCorpus>> {
        let corpus_path = self.dir.join(CORPUS_FILE);
        let labels_path = self.dir.join(LABELS_FILE);
        let present = [CORPUS_FILE, LABELS_FILE, CONFIG_FILE, FINGERPRINT_FILE]
            .iter()
            .all(|f| self.dir.join(f).exists());
        if !present {
            tracing::debug!("No embedded corpus cache in '{}'", self.dir.display());
            return Ok(None);
        }

        let stored = self.load_config()?;
        if !stored.same_embedding_inputs(cfg) {
            tracing::info!("Embedded corpus cache is stale; recomputing");
            return Ok(None);
        }

        let stored = self.load_fingerprint()?;
        if stored != *fingerprint {
            tracing::info!("Corpus or embedding file changed since the cache was written; recomputing");
            return Ok(None);
        }

        let json = fs::read_to_string(&labels_path)
            .with_context(|| format!("Cannot read labels from '{}'", labels_path.display()))?;
        let cached_labels: Vec<usize> = serde_json::from_str(&json)
            .with_context(|| format!("'{}' is not a label list", labels_path.display()))?;
        if cached_labels != labels {
            tracing::info!("Corpus labels changed since the cache was written; recomputing");
            return Ok(None);
        }

        let corpus = EmbeddedCorpus::load(&corpus_path)?;
        if corpus.len() != labels.len() {
            tracing::warn!(
                "Cached corpus has {} documents but {} labels; recomputing",
                corpus.len(),
                labels.len(),
            );
            return Ok(None);
        }

        tracing::info!(
            "Reusing embedded corpus from '{}' ({} documents)",
            corpus_path.display(),
            corpus.len(),
        );
        Ok(Some(corpus))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::Document;
    use tempfile::TempDir;

    fn corpus() -> EmbeddedCorpus {
        EmbeddedCorpus::new(2, vec![vec![vec![1.0, 2.0]], vec![vec![3.0, 4.0], vec![5.0, 6.0]]])
            .unwrap()
    }

    fn texts(a: &str, b: &str) -> Corpus {
        Corpus::new(
            vec![Document::new("x/1", a), Document::new("y/1", b)],
            vec![0, 1],
            vec!["x".into(), "y".into()],
        )
        .unwrap()
    }

    fn fingerprint() -> InputFingerprint {
        InputFingerprint {
            corpus_digest:         corpus_digest(&texts("bank loan", "goal team")),
            embedding_len:         10,
            embedding_modified_ns: Some(1),
        }
    }

    #[test]
    fn test_fresh_cache_is_reused() {
        let dir = TempDir::new().unwrap();
        let cfg = ExperimentConfig::default();
        let cache = CorpusCache::new(dir.path()).unwrap();
        cache.save(&cfg, &fingerprint(), &corpus(), &[0, 1]).unwrap();

        let mut tweaked = cfg.clone();
        tweaked.folds = 3;
        let loaded = cache.load_if_fresh(&tweaked, &fingerprint(), &[0, 1]).unwrap().unwrap();
        assert_eq!(loaded.into_documents(), corpus().into_documents());
    }

    #[test]
    fn test_stale_inputs_miss() {
        let dir = TempDir::new().unwrap();
        let cfg = ExperimentConfig::default();
        let cache = CorpusCache::new(dir.path()).unwrap();
        cache.save(&cfg, &fingerprint(), &corpus(), &[0, 1]).unwrap();

        let mut other = cfg.clone();
        other.min_token_len = 5;
        assert!(cache.load_if_fresh(&other, &fingerprint(), &[0, 1]).unwrap().is_none());
        assert!(cache.load_if_fresh(&cfg, &fingerprint(), &[1, 0]).unwrap().is_none());
    }

    #[test]
    fn test_empty_directory_misses() {
        let dir = TempDir::new().unwrap();
        let cache = CorpusCache::new(dir.path()).unwrap();
        assert!(cache.load_if_fresh(&ExperimentConfig::default(), &fingerprint(), &[]).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_corpus_is_an_error() {
        let dir = TempDir::new().unwrap();
        let cfg = ExperimentConfig::default();
        let cache = CorpusCache::new(dir.path()).unwrap();
        cache.save(&cfg, &fingerprint(), &corpus(), &[0, 1]).unwrap();
        fs::write(dir.path().join(CORPUS_FILE), b"garbage").unwrap();
        assert!(cache.load_if_fresh(&cfg, &fingerprint(), &[0, 1]).is_err());
    }

    #[test]
    fn test_edited_inputs_at_same_paths_miss() {
        let dir = TempDir::new().unwrap();
        let cfg = ExperimentConfig::default();
        let cache = CorpusCache::new(dir.path()).unwrap();
        cache.save(&cfg, &fingerprint(), &corpus(), &[0, 1]).unwrap();

        // same sources and labels, texts swapped between the categories
        let mut swapped = fingerprint();
        swapped.corpus_digest = corpus_digest(&texts("goal team", "bank loan"));
        assert!(cache.load_if_fresh(&cfg, &swapped, &[0, 1]).unwrap().is_none());

        let mut rewritten = fingerprint();
        rewritten.embedding_len = 11;
        assert!(cache.load_if_fresh(&cfg, &rewritten, &[0, 1]).unwrap().is_none());

        let mut touched = fingerprint();
        touched.embedding_modified_ns = Some(2);
        assert!(cache.load_if_fresh(&cfg, &touched, &[0, 1]).unwrap().is_none());

        assert!(cache.load_if_fresh(&cfg, &fingerprint(), &[0, 1]).unwrap().is_some());
    }

    #[test]
    fn test_fingerprint_tracks_file_contents() {
        let dir = TempDir::new().unwrap();
        let table = dir.path().join("vectors.txt");
        fs::write(&table, "cat 1 2\n").unwrap();
        let corpus = texts("bank loan", "goal team");

        let before = InputFingerprint::compute(&corpus, &table).unwrap();
        assert_eq!(before, InputFingerprint::compute(&corpus, &table).unwrap());

        fs::write(&table, "cat 1 2\ndog 3 4\n").unwrap();
        assert_ne!(before, InputFingerprint::compute(&corpus, &table).unwrap());

        let edited = texts("bank loan rate", "goal team");
        assert_ne!(
            InputFingerprint::compute(&corpus, &table).unwrap().corpus_digest,
            InputFingerprint::compute(&edited, &table).unwrap().corpus_digest,
        );

        assert!(InputFingerprint::compute(&corpus, dir.path().join("missing.bin")).is_err());
    }
}
