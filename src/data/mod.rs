// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from raw files on disk to index-level fold splits.
//
//   corpus directory (one subdirectory per category)
//       │
//       ▼
//   CategoryDirLoader   → reads files, decodes text, assigns labels
//       │
//       ▼
//   RegexNormalizer     → cleans text and splits it into tokens
//       │
//       ▼
//   (embedding pipeline, classifiers)
//       │
//       ▼
//   make_folds          → k cross-validation (train, test) splits
//
// RandomTextGenerator stands in for the loader in the sanity
// experiment.

/// Loads a labelled corpus from category subdirectories
pub mod loader;

/// Cleans raw text into token sequences
pub mod preprocessor;

/// Label-independent random corpora and feature rows
pub mod random_text;

/// Plain and stratified k-fold splits
pub mod splitter;
