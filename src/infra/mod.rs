// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything that touches the filesystem on behalf of the
// use cases:
//
//   embedding_store.rs — Pretrained word vectors
//                        Reads word2vec binary or text files
//                        into an EmbeddingTable, optionally only
//                        the first N words.
//
//   corpus_cache.rs    — Embedded corpus cache
//                        Saves the vectorized corpus, its labels
//                        and the ExperimentConfig as JSON, and
//                        reuses them while the corpus, embedding
//                        and tokenizer settings are unchanged.
//
//   metrics.rs         — Cross-validation metrics logging
//                        Appends per-fold accuracies to a CSV
//                        file for later comparison.
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            Rust Book §12 (I/O and File Handling)

/// word2vec binary / text embedding loader
pub mod embedding_store;

/// Embedded corpus cache keyed on ExperimentConfig
pub mod corpus_cache;

/// Per-fold accuracy CSV logger
pub mod metrics;
