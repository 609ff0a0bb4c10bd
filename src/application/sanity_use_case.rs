// ============================================================
// Layer 2 — SanityUseCase
// ============================================================
// Runs the same evaluation on data whose labels carry no
// information, to confirm the harness reports chance accuracy
// rather than leaking labels:
//
//   Step 1: Load the embedding table            (Layer 6 - infra)
//   Step 2: Generate random documents from its
//           vocabulary, labels drawn uniformly  (Layer 4 - data)
//   Step 3: Embed, normalize, average           (Layer 4b - embedding)
//   Step 4: Cross-validate both classifiers     (Layer 5 - ml)
//   Step 5: Cross-validate logistic regression
//           on pure noise feature rows          (Layer 5 - ml)
//
// Every report should land near 1 / classes.

use anyhow::{bail, Result};

use crate::data::{
    preprocessor::RegexNormalizer,
    random_text::{random_features, RandomTextGenerator},
    splitter::{make_folds, FoldStrategy},
};
use crate::domain::traits::{DocumentNormalizer, DocumentSource};
use crate::embedding::{
    averager::average_documents,
    corpus::EmbeddedCorpus,
    matcher::match_vocabulary,
    normalizer::{normalize_lengths, LengthPolicy},
    table::EmbeddingTable,
    vectorizer::vectorize_corpus,
};
use crate::infra::embedding_store::{EmbeddingFormat, EmbeddingStore};
use crate::ml::{
    cross_validation::{cross_validate, CvReport},
    naive_bayes::MultinomialNaiveBayes,
    trainer::{LogisticRegression, LogisticRegressionSettings},
};

use super::evaluate_use_case::{apply_empty_policy, EmptyDocumentPolicy};

#[derive(Debug, Clone)]
pub struct SanityConfig {
    pub embeddings:       String,
    pub embedding_format: EmbeddingFormat,
    pub embedding_limit:  Option<usize>,
    pub documents:        usize,
    pub classes:          usize,
    pub doc_len:          usize,
    pub seed:             u64,
    pub folds:            usize,
    pub logistic:         LogisticRegressionSettings,
}

#[derive(Debug, Clone)]
pub struct SanitySummary {
    /// Expected accuracy of a classifier that learned nothing
    pub chance:  f64,
    pub reports: Vec<CvReport>,
}

pub struct SanityUseCase {
    config: SanityConfig,
}

impl SanityUseCase {
    pub fn new(config: SanityConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<SanitySummary> {
        let cfg = &self.config;
        let table = EmbeddingStore::new(&cfg.embeddings, cfg.embedding_format, cfg.embedding_limit)
            .load()?;
        self.run_with_table(&table)
    }

    /// Everything after the table is loaded; split out so tests can
    /// hand in a small in-memory table.
    pub fn run_with_table(&self, table: &EmbeddingTable) -> Result<SanitySummary> {
        let cfg = &self.config;
        let normalizer = RegexNormalizer::default();

        // ── Step 2: Random corpus over words the tokenizer keeps intact ──────
        let mut words: Vec<String> = table
            .words()
            .filter(|w| normalizer.tokenize(w).as_slice() == [*w])
            .map(str::to_string)
            .collect();
        if words.is_empty() {
            bail!("No embedding word survives tokenization; cannot build a random corpus");
        }
        words.sort_unstable();
        tracing::info!("Drawing random documents from {} words", words.len());

        let mut corpus =
            RandomTextGenerator::new(words, cfg.documents, cfg.classes, cfg.doc_len, cfg.seed)
                .load_corpus()?;

        // ── Step 3: Embed ─────────────────────────────────────────────────────
        let tokens = normalizer.tokenize_all(&corpus.texts());
        let matched = match_vocabulary(&tokens, table)?;
        let documents = vectorize_corpus(&tokens, table, &matched.matched)?;
        let mut embedded = EmbeddedCorpus::new(table.dim(), documents)?;
        apply_empty_policy(EmptyDocumentPolicy::Drop, &mut corpus, &mut embedded)?;

        let dim = embedded.dim();
        let normalized = normalize_lengths(embedded.into_documents(), LengthPolicy::TruncateToMin, dim)?;
        let features = average_documents(&normalized, dim)?;

        // ── Step 4: Both classifiers on random text ───────────────────────────
        let folds = make_folds(FoldStrategy::Stratified, corpus.labels(), cfg.folds, Some(cfg.seed))?;
        let mut reports = Vec::with_capacity(3);

        reports.push(cross_validate(
            &mut MultinomialNaiveBayes::default(),
            &corpus.texts(),
            corpus.labels(),
            cfg.classes,
            &folds,
        )?);
        reports.push(cross_validate(
            &mut LogisticRegression::new(cfg.logistic.clone()),
            &features,
            corpus.labels(),
            cfg.classes,
            &folds,
        )?);

        // ── Step 5: Logistic regression on noise rows ─────────────────────────
        let (rows, labels) = random_features(cfg.documents, dim, cfg.classes, cfg.seed);
        let noise_folds = make_folds(FoldStrategy::Stratified, &labels, cfg.folds, Some(cfg.seed))?;
        let mut noise = cross_validate(
            &mut LogisticRegression::new(cfg.logistic.clone()),
            &rows,
            &labels,
            cfg.classes,
            &noise_folds,
        )?;
        noise.classifier = "Logistic Regression (random features)".to_string();
        reports.push(noise);

        for r in &reports {
            tracing::info!("{}", r);
        }
        Ok(SanitySummary { chance: 1.0 / cfg.classes as f64, reports })
    }
}
