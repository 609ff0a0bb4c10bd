// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust structs, enums and traits that define the core
// concepts of the system.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, traits and errors
//
// Everything else (loading, embedding, classification) is
// written against the types declared here, so each piece can
// be unit-tested without a pretrained embedding file on disk.

// Documents, labels and the aligned corpus container
pub mod document;

// Typed precondition errors raised by the embedding pipeline
pub mod error;

// Core abstractions (traits) that other layers implement
pub mod traits;
