// ============================================================
// Layer 4b — Embedding Pipeline
// ============================================================
// Turns tokenized documents into fixed-length feature rows:
//
//   tokenized corpus
//       │
//       ▼
//   match_vocabulary   → corpus vocabulary ∩ table keys (+ coverage)
//       │
//       ▼
//   vectorize          → one vector per matched token, in order
//       │
//       ▼
//   normalize_lengths  → every document gets the same length
//       │
//       ▼
//   average_documents  → one D-dimensional row per document
//
// The EmbeddingTable is passed by shared reference into every
// step. It is built once by the loader and never mutated, so
// no step owns it and any step can be tested with a tiny
// in-memory table.

/// Token → vector lookup table
pub mod table;

/// Corpus vocabulary ∩ table keys, with coverage
pub mod matcher;

/// Token sequence → vector sequence
pub mod vectorizer;

/// Length policies that make embedded documents rectangular
pub mod normalizer;

/// Vector sequence → mean vector
pub mod averager;

/// Embedded corpus container and its flat binary array format
pub mod corpus;

/// One embedded document: a vector per recognised token.
pub type EmbeddedDocument = Vec<Vec<f32>>;
