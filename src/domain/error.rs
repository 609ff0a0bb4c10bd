// ============================================================
// Layer 3 — Pipeline Errors
// ============================================================
// Precondition violations in the embedding pipeline.
// None of these are recoverable inside the core: they all
// propagate up to the run driver and abort the experiment,
// because accuracy numbers computed past one of them would
// be meaningless.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    /// The tokenized corpus has no tokens at all, so coverage
    /// (matched ÷ vocabulary) is undefined.
    #[error("corpus vocabulary is empty; nothing to match against the embedding table")]
    EmptyVocabulary,

    /// Not a single corpus token has an embedding.
    #[error("no corpus token appears in the embedding table (vocabulary size {vocabulary})")]
    NoMatchedVocabulary { vocabulary: usize },

    /// A matched token was missing from the table: the caller
    /// passed a vocabulary that was not intersected with it.
    #[error("token '{0}' is in the matched vocabulary but not in the embedding table")]
    TokenNotInTable(String),

    /// A document has zero vectors where at least one is required.
    #[error("document {index} has no in-vocabulary tokens")]
    EmptyDocument { index: usize },

    #[error("vector of length {found} where the embedding dimension is {expected}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("{samples} samples but {labels} labels")]
    LabelMismatch { samples: usize, labels: usize },

    #[error("label {label} is out of range for {categories} categories")]
    UnknownLabel { label: usize, categories: usize },

    #[error("cannot run {folds}-fold cross-validation on {samples} samples")]
    TooFewSamples { folds: usize, samples: usize },

    #[error("length percentile must be in (0, 100], got {0}")]
    InvalidPercentile(f64),

    #[error("corpus is empty")]
    EmptyCorpus,
}
