// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The seams of the system. Each trait has at least one
// implementation elsewhere and is what the application layer
// programs against:
//
//   DocumentSource      → CategoryDirLoader, RandomTextGenerator
//   DocumentNormalizer  → RegexNormalizer
//   Classifier<X>       → MultinomialNaiveBayes (X = String)
//                         LogisticRegression    (X = Vec<f32>)
//   Persistable         → EmbeddedCorpus

use anyhow::Result;

use crate::domain::document::Corpus;

// ─── DocumentSource ───────────────────────────────────────────────────────────
/// Anything that can produce a labelled corpus.
pub trait DocumentSource {
    /// Load every document with its label.
    fn load_corpus(&self) -> Result<Corpus>;
}

// ─── DocumentNormalizer ───────────────────────────────────────────────────────
/// Turns raw text into the token sequence fed to the embedding
/// pipeline. Cleaning heuristics are corpus-specific, so they
/// live behind this trait instead of inside the vectorizer.
pub trait DocumentNormalizer {
    fn tokenize(&self, text: &str) -> Vec<String>;

    /// Tokenize every text, preserving order.
    fn tokenize_all(&self, texts: &[String]) -> Vec<Vec<String>> {
        texts.iter().map(|t| self.tokenize(t)).collect()
    }
}

// ─── Classifier ───────────────────────────────────────────────────────────────
/// A supervised classifier over samples of type `X`.
///
/// `fit` may be called more than once; each call starts from
/// scratch so one instance can be reused across folds.
pub trait Classifier<X> {
    /// Short human-readable name used in reports.
    fn name(&self) -> &str;

    /// Learn from `samples[i]` labelled `labels[i]`.
    /// `num_classes` is the size of the label space, which can
    /// exceed the labels present in one training fold.
    fn fit(&mut self, samples: &[X], labels: &[usize], num_classes: usize) -> Result<()>;

    /// Predict one label per sample.
    fn predict(&self, samples: &[X]) -> Result<Vec<usize>>;
}

// ─── Persistable ──────────────────────────────────────────────────────────────
/// Any component whose state can be saved and restored from disk.
pub trait Persistable: Sized {
    /// Save this component's state to the given path
    fn save(&self, path: &std::path::Path) -> Result<()>;

    /// Load a component's state from the given path.
    fn load(path: &std::path::Path) -> Result<Self>;
}
