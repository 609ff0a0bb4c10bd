// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
// Orchestrates one full experiment in order:
//
//   Step 1: Load the labelled corpus        (Layer 4 - data)
//   Step 2: Reuse or build embedded corpus  (Layer 6 - infra)
//           load table → tokenize → match → vectorize
//                                           (Layer 4b - embedding)
//   Step 3: Handle empty documents          (policy)
//   Step 4: Normalize lengths + average     (Layer 4b - embedding)
//   Step 5: Build folds                     (Layer 4 - data)
//   Step 6: Cross-validate both classifiers (Layer 5 - ml)
//   Step 7: Log per-fold accuracies         (Layer 6 - infra)
//
// Both classifiers are scored on the same folds. Naive Bayes
// sees the raw text of each document, logistic regression sees
// its averaged embedding row.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::data::{
    loader::CategoryDirLoader,
    preprocessor::RegexNormalizer,
    splitter::{make_folds, FoldStrategy},
};
use crate::domain::{
    document::Corpus,
    error::PipelineError,
    traits::{DocumentNormalizer, DocumentSource},
};
use crate::embedding::{
    averager::average_documents,
    corpus::EmbeddedCorpus,
    matcher::match_vocabulary,
    normalizer::{normalize_lengths, LengthPolicy},
    vectorizer::vectorize_corpus,
};
use crate::infra::{
    corpus_cache::{CorpusCache, InputFingerprint},
    embedding_store::{EmbeddingFormat, EmbeddingStore},
    metrics::FoldMetricsLogger,
};
use crate::ml::{
    cross_validation::{cross_validate, CvReport},
    naive_bayes::MultinomialNaiveBayes,
    trainer::{LogisticRegression, LogisticRegressionSettings},
};

// ─── Experiment Configuration ────────────────────────────────────────────────
/// What to do with documents that end up with no in-vocabulary
/// tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmptyDocumentPolicy {
    /// Stop the run with an error naming the first such document.
    #[default]
    Abort,
    /// Remove such documents (and their labels) before evaluation.
    Drop,
}

/// Every knob of an `evaluate` run. Saved next to the cached
/// corpus so a later run can tell whether the cache still applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub corpus_dir:       String,
    pub embeddings:       String,
    pub embedding_format: EmbeddingFormat,
    pub embedding_limit:  Option<usize>,
    pub output_dir:       String,
    pub folds:            usize,
    pub fold_strategy:    FoldStrategy,
    pub shuffle_seed:     Option<u64>,
    pub logistic:         LogisticRegressionSettings,
    pub length_policy:    LengthPolicy,
    pub empty_documents:  EmptyDocumentPolicy,
    pub min_token_len:    usize,
    pub strip_headers:    bool,
    pub lowercase:        bool,
    pub use_cache:        bool,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            corpus_dir:       "data/corpus".to_string(),
            embeddings:       "data/embeddings.bin".to_string(),
            embedding_format: EmbeddingFormat::Auto,
            embedding_limit:  None,
            output_dir:       "output".to_string(),
            folds:            10,
            fold_strategy:    FoldStrategy::Stratified,
            shuffle_seed:     None,
            logistic:         LogisticRegressionSettings::default(),
            length_policy:    LengthPolicy::TruncateToMin,
            empty_documents:  EmptyDocumentPolicy::Abort,
            min_token_len:    2,
            strip_headers:    false,
            lowercase:        true,
            use_cache:        true,
        }
    }
}

impl ExperimentConfig {
    /// True if both configs vectorize the corpus identically,
    /// i.e. a corpus cached under one is valid under the other.
    pub fn same_embedding_inputs(&self, other: &ExperimentConfig) -> bool {
        self.corpus_dir       == other.corpus_dir
            && self.embeddings       == other.embeddings
            && self.embedding_format == other.embedding_format
            && self.embedding_limit  == other.embedding_limit
            && self.min_token_len    == other.min_token_len
            && self.strip_headers    == other.strip_headers
            && self.lowercase        == other.lowercase
    }

    /// Name used for this run in the metrics CSV.
    pub fn experiment_name(&self) -> String {
        Path::new(&self.corpus_dir)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.corpus_dir.clone())
    }

    pub fn normalizer(&self) -> RegexNormalizer {
        RegexNormalizer::new(self.min_token_len)
            .with_strip_headers(self.strip_headers)
            .with_lowercase(self.lowercase)
    }
}

/// Outcome of one evaluation.
#[derive(Debug, Clone)]
pub struct EvaluationSummary {
    pub documents:    usize,
    pub dropped:      usize,
    pub categories:   Vec<String>,
    /// Documents per category after empty-document handling
    pub class_counts: Vec<usize>,
    pub reports:      Vec<CvReport>,
    pub metrics_csv:  PathBuf,
}

// ─── EvaluateUseCase ─────────────────────────────────────────────────────────
pub struct EvaluateUseCase {
    config: ExperimentConfig,
}

impl EvaluateUseCase {
    pub fn new(config: ExperimentConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<EvaluationSummary> {
        let cfg = &self.config;

        // ── Step 1: Load the labelled corpus ──────────────────────────────────
        let mut corpus = CategoryDirLoader::new(&cfg.corpus_dir).load_corpus()?;
        if corpus.is_empty() {
            return Err(PipelineError::EmptyCorpus.into());
        }

        // ── Step 2: Embedded corpus (cached or fresh) ─────────────────────────
        let cache = CorpusCache::new(&cfg.output_dir)?;
        let fingerprint = InputFingerprint::compute(&corpus, &cfg.embeddings)?;
        let cached = if cfg.use_cache {
            cache.load_if_fresh(cfg, &fingerprint, corpus.labels())?
        } else {
            None
        };
        let mut embedded = match cached {
            Some(embedded) => embedded,
            None => {
                // cache files and experiment_config.json describe the same run
                let embedded = embed_corpus(cfg, &corpus)?;
                cache.save(cfg, &fingerprint, &embedded, corpus.labels())?;
                embedded
            }
        };
        cache.save_config(cfg)?;

        // ── Step 3: Empty documents ───────────────────────────────────────────
        let dropped = apply_empty_policy(cfg.empty_documents, &mut corpus, &mut embedded)?;

        // ── Step 4: Fixed-length rows ─────────────────────────────────────────
        let dim = embedded.dim();
        let normalized = normalize_lengths(embedded.into_documents(), cfg.length_policy, dim)?;
        let features = average_documents(&normalized, dim)?;

        // ── Step 5: Folds ─────────────────────────────────────────────────────
        let folds = make_folds(cfg.fold_strategy, corpus.labels(), cfg.folds, cfg.shuffle_seed)?;
        tracing::info!("Built {} {:?} folds", folds.len(), cfg.fold_strategy);

        // ── Step 6: Cross-validate ────────────────────────────────────────────
        let num_classes = corpus.categories().len();
        let texts = corpus.texts();

        let nb = cross_validate(
            &mut MultinomialNaiveBayes::default(),
            &texts,
            corpus.labels(),
            num_classes,
            &folds,
        )?;
        tracing::info!("{}", nb);

        let lr = cross_validate(
            &mut LogisticRegression::new(cfg.logistic.clone()),
            &features,
            corpus.labels(),
            num_classes,
            &folds,
        )?;
        tracing::info!("{}", lr);

        // ── Step 7: Metrics ───────────────────────────────────────────────────
        let logger = FoldMetricsLogger::new(&cfg.output_dir)?;
        let name = cfg.experiment_name();
        logger.log(&name, &nb)?;
        logger.log(&name, &lr)?;

        Ok(EvaluationSummary {
            documents:    corpus.len(),
            dropped,
            categories:   corpus.categories().to_vec(),
            class_counts: corpus.class_counts(),
            reports:      vec![nb, lr],
            metrics_csv:  logger.csv_path().to_path_buf(),
        })
    }
}

/// Load the embedding table and vectorize every document.
fn embed_corpus(cfg: &ExperimentConfig, corpus: &Corpus) -> Result<EmbeddedCorpus> {
    let table = EmbeddingStore::new(&cfg.embeddings, cfg.embedding_format, cfg.embedding_limit)
        .load()?;

    let tokens = cfg.normalizer().tokenize_all(&corpus.texts());
    let matched = match_vocabulary(&tokens, &table)?;
    let documents = vectorize_corpus(&tokens, &table, &matched.matched)?;
    Ok(EmbeddedCorpus::new(table.dim(), documents)?)
}

/// Apply `policy` to documents without vectors. Returns how many
/// were dropped.
pub fn apply_empty_policy(
    policy:   EmptyDocumentPolicy,
    corpus:   &mut Corpus,
    embedded: &mut EmbeddedCorpus,
) -> Result<usize> {
    let empty = embedded.empty_indices();
    let Some(&first) = empty.first() else {
        return Ok(0);
    };

    match policy {
        EmptyDocumentPolicy::Abort => Err(PipelineError::EmptyDocument { index: first })
            .with_context(|| {
                format!(
                    "{} document(s) have no in-vocabulary tokens, first '{}'; \
                     rerun with --empty-documents drop to skip them",
                    empty.len(),
                    corpus.documents()[first].source,
                )
            }),
        EmptyDocumentPolicy::Drop => {
            for &i in &empty {
                tracing::warn!("Dropping '{}': no in-vocabulary tokens", corpus.documents()[i].source);
            }
            let keep: Vec<usize> = (0..embedded.len())
                .filter(|i| empty.binary_search(i).is_err())
                .collect();
            corpus.retain_indices(&keep);
            embedded.retain_indices(&keep);
            tracing::warn!("Dropped {} empty documents, {} remain", empty.len(), keep.len());
            if keep.is_empty() {
                return Err(PipelineError::EmptyCorpus.into());
            }
            Ok(empty.len())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{document::Document, traits::Persistable};
    use std::fs;
    use tempfile::TempDir;

    fn pair() -> (Corpus, EmbeddedCorpus) {
        let corpus = Corpus::new(
            vec![Document::new("a/1", "x"), Document::new("b/1", "y"), Document::new("a/2", "z")],
            vec![0, 1, 0],
            vec!["a".into(), "b".into()],
        )
        .unwrap();
        let embedded =
            EmbeddedCorpus::new(1, vec![vec![vec![1.0]], vec![], vec![vec![3.0]]]).unwrap();
        (corpus, embedded)
    }

    #[test]
    fn test_abort_on_empty_document() {
        let (mut corpus, mut embedded) = pair();
        let err = apply_empty_policy(EmptyDocumentPolicy::Abort, &mut corpus, &mut embedded)
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<PipelineError>(),
            Some(&PipelineError::EmptyDocument { index: 1 })
        );
        assert_eq!(corpus.len(), 3);
    }

    #[test]
    fn test_drop_keeps_labels_aligned() {
        let (mut corpus, mut embedded) = pair();
        let dropped =
            apply_empty_policy(EmptyDocumentPolicy::Drop, &mut corpus, &mut embedded).unwrap();
        assert_eq!(dropped, 1);
        assert_eq!(corpus.labels(), &[0, 0]);
        assert_eq!(embedded.len(), 2);
        assert_eq!(corpus.documents()[1].source, "a/2");
    }

    #[test]
    fn test_cache_key_ignores_classifier_settings() {
        let a = ExperimentConfig::default();
        let mut b = a.clone();
        b.logistic.epochs = 5;
        b.length_policy = LengthPolicy::PadWithZeros;
        assert!(a.same_embedding_inputs(&b));
        b.strip_headers = true;
        assert!(!a.same_embedding_inputs(&b));

        let mut c = a.clone();
        c.lowercase = false;
        assert!(!a.same_embedding_inputs(&c));
    }

    #[test]
    fn test_config_json_round_trip() {
        let mut cfg = ExperimentConfig::default();
        cfg.length_policy = LengthPolicy::TruncateToPercentile(25.0);
        cfg.shuffle_seed = Some(7);
        let json = serde_json::to_string(&cfg).unwrap();
        assert_eq!(serde_json::from_str::<ExperimentConfig>(&json).unwrap(), cfg);
    }

    /// Two clearly separated topics, each word present in a tiny
    /// text-format embedding table.
    fn write_fixture(root: &Path) -> ExperimentConfig {
        let sport = ["goal match team score", "team wins match", "score goal goal team"];
        let money = ["bank loan rate", "rate bank money", "money loan bank rate"];
        for (cat, docs) in [("money", money), ("sport", sport)] {
            let dir = root.join("corpus").join(cat);
            fs::create_dir_all(&dir).unwrap();
            for rep in 0..3 {
                for (i, text) in docs.iter().enumerate() {
                    fs::write(dir.join(format!("{rep}-{i}.txt")), text).unwrap();
                }
            }
        }
        let vectors = "goal 1 0\nmatch 0.9 0.1\nteam 1 0.2\nscore 0.8 0\nwins 0.9 0\n\
                       bank 0 1\nloan 0.1 0.9\nrate 0 0.8\nmoney 0.2 1\n";
        fs::write(root.join("vectors.txt"), vectors).unwrap();

        ExperimentConfig {
            corpus_dir:   root.join("corpus").to_string_lossy().into_owned(),
            embeddings:   root.join("vectors.txt").to_string_lossy().into_owned(),
            output_dir:   root.join("out").to_string_lossy().into_owned(),
            folds:        3,
            shuffle_seed: Some(1),
            logistic:     LogisticRegressionSettings { regularization: 1.0, epochs: 100, lr: 0.1 },
            ..ExperimentConfig::default()
        }
    }

    #[test]
    fn test_end_to_end_on_separable_corpus() {
        let root = TempDir::new().unwrap();
        let cfg = write_fixture(root.path());

        let summary = EvaluateUseCase::new(cfg.clone()).execute().unwrap();
        assert_eq!(summary.documents, 18);
        assert_eq!(summary.categories, vec!["money", "sport"]);
        assert_eq!(summary.class_counts, vec![9, 9]);
        assert_eq!(summary.reports.len(), 2);
        for report in &summary.reports {
            assert_eq!(report.fold_accuracies.len(), 3);
            assert!(report.mean() > 0.9, "{report}");
        }

        let out = Path::new(&cfg.output_dir);
        assert!(out.join("embedded_corpus.bin").exists());
        assert!(out.join("experiment_config.json").exists());
        assert_eq!(summary.metrics_csv, out.join("cv_results.csv"));
        let csv = fs::read_to_string(&summary.metrics_csv).unwrap();
        assert_eq!(csv.lines().count(), 1 + 2 * 3);

        let again = EvaluateUseCase::new(cfg.clone()).execute().unwrap();
        assert_eq!(again.reports[0].fold_accuracies, summary.reports[0].fold_accuracies);
    }

    #[test]
    fn test_cache_follows_file_edits_at_same_paths() {
        let root = TempDir::new().unwrap();
        let cfg = write_fixture(root.path());
        EvaluateUseCase::new(cfg.clone()).execute().unwrap();

        // Swap the texts of the two categories in place; paths and labels stay
        let corpus_dir = root.path().join("corpus");
        for entry in fs::read_dir(corpus_dir.join("money")).unwrap() {
            let name = entry.unwrap().file_name();
            let money = corpus_dir.join("money").join(&name);
            let sport = corpus_dir.join("sport").join(&name);
            let money_text = fs::read_to_string(&money).unwrap();
            fs::write(&money, fs::read_to_string(&sport).unwrap()).unwrap();
            fs::write(&sport, money_text).unwrap();
        }
        EvaluateUseCase::new(cfg.clone()).execute().unwrap();

        let reloaded = CategoryDirLoader::new(&cfg.corpus_dir).load_corpus().unwrap();
        let fresh = embed_corpus(&cfg, &reloaded).unwrap();
        let cached = EmbeddedCorpus::load(&Path::new(&cfg.output_dir).join("embedded_corpus.bin"))
            .unwrap();
        assert_eq!(cached.into_documents(), fresh.into_documents());

        // A rewritten embedding file invalidates it as well
        let vectors = "goal 0 1\nmatch 0.1 0.9\nteam 0.2 1\nscore 0 0.8\nwins 0 0.9\n\
                       bank 1 0\nloan 0.9 0.1\nrate 0.8 0\nmoney 1 0.2\nextra 5 5\n";
        fs::write(&cfg.embeddings, vectors).unwrap();
        EvaluateUseCase::new(cfg.clone()).execute().unwrap();

        let fresh = embed_corpus(&cfg, &reloaded).unwrap();
        let cached = EmbeddedCorpus::load(&Path::new(&cfg.output_dir).join("embedded_corpus.bin"))
            .unwrap();
        assert_eq!(cached.into_documents(), fresh.into_documents());
    }
}
