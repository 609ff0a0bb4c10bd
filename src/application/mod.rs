// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish
// one user-facing goal per use case.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No printing here (that's Layer 1); use cases return
//     summaries and the CLI formats them
//   - No direct file parsing (that's Layer 4 and 6)
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Full cross-validated comparison of both classifiers
pub mod evaluate_use_case;

// Vocabulary coverage of a corpus against an embedding table
pub mod coverage_use_case;

// Random-label experiment that should score at chance
pub mod sanity_use_case;
