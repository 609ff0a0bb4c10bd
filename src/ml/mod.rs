// ============================================================
// Layer 5 — ML / Classifier Layer
// ============================================================
// Both classifiers and the cross-validation harness that scores
// them. Only model.rs and trainer.rs import burn; the Naive Bayes
// baseline is plain Rust over sparse counts.
//
//   naive_bayes.rs       — count vectorizer + multinomial Naive
//                          Bayes over raw text
//
//   model.rs             — logistic regression as a single burn
//                          Linear layer + softmax cross-entropy
//
//   trainer.rs           — full-batch Adam training on the
//                          Autodiff<NdArray> backend, wrapped as a
//                          Classifier over dense rows
//
//   cross_validation.rs  — fit/score per fold, mean ± 2·std
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)

/// Count-based baseline over raw text
pub mod naive_bayes;

/// Logistic regression model definition
pub mod model;

/// Logistic regression training loop and Classifier impl
pub mod trainer;

/// k-fold evaluation and accuracy reports
pub mod cross_validation;
