// ============================================================
// Length Normalizer
// ============================================================
// Makes every embedded document in a corpus the same length so
// the corpus forms a rectangular N × L × D array.
//
// Policies:
//   TruncateToMin          keep the first `min` vectors of every
//                          document; never pads. One document with
//                          zero vectors reduces ALL documents to
//                          zero vectors (the averager then fails).
//   PadWithZeros           pad every document with zero vectors up
//                          to the longest one.
//   TruncateToPercentile   target = nearest-rank p-th percentile of
//                          the lengths; truncate longer documents,
//                          zero-pad shorter ones.
//
// The padding policies reject empty documents: padding one would
// turn "no signal" into an all-zero document.
//
// All policies are idempotent: on a corpus whose documents all
// have length L, every policy picks target L and changes nothing.

use serde::{Deserialize, Serialize};

use crate::domain::error::PipelineError;
use crate::embedding::EmbeddedDocument;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "policy", content = "percentile")]
pub enum LengthPolicy {
    #[default]
    TruncateToMin,
    PadWithZeros,
    TruncateToPercentile(f64),
}

impl LengthPolicy {
    /// The common length this policy picks for the given lengths.
    pub fn target_length(&self, lengths: &[usize]) -> Result<usize, PipelineError> {
        if lengths.is_empty() {
            return Ok(0);
        }
        match *self {
            LengthPolicy::TruncateToMin => Ok(lengths.iter().copied().min().unwrap_or(0)),
            LengthPolicy::PadWithZeros  => Ok(lengths.iter().copied().max().unwrap_or(0)),
            LengthPolicy::TruncateToPercentile(p) => {
                if !(p > 0.0 && p <= 100.0) {
                    return Err(PipelineError::InvalidPercentile(p));
                }
                let mut sorted = lengths.to_vec();
                sorted.sort_unstable();
                // nearest-rank: smallest value with at least p% of lengths ≤ it
                let rank = ((p / 100.0) * sorted.len() as f64).ceil() as usize;
                Ok(sorted[rank.clamp(1, sorted.len()) - 1])
            }
        }
    }

    fn pads(&self) -> bool {
        !matches!(self, LengthPolicy::TruncateToMin)
    }
}

/// Apply `policy` to every document. `dim` is the embedding
/// dimension, used for zero padding.
pub fn normalize_lengths(
    mut documents: Vec<EmbeddedDocument>,
    policy:        LengthPolicy,
    dim:           usize,
) -> Result<Vec<EmbeddedDocument>, PipelineError> {
    if policy.pads() {
        if let Some(index) = documents.iter().position(Vec::is_empty) {
            return Err(PipelineError::EmptyDocument { index });
        }
    }

    let lengths: Vec<usize> = documents.iter().map(Vec::len).collect();
    let target = policy.target_length(&lengths)?;

    let mut truncated = 0usize;
    let mut padded    = 0usize;
    for doc in &mut documents {
        if doc.len() > target {
            doc.truncate(target);
            truncated += 1;
        } else if doc.len() < target {
            // only reachable for the padding policies
            doc.resize(target, vec![0.0; dim]);
            padded += 1;
        }
    }

    tracing::info!(
        "Normalized {} documents to length {} ({:?}): {} truncated, {} padded",
        documents.len(),
        target,
        policy,
        truncated,
        padded,
    );
    if target == 0 && !documents.is_empty() {
        tracing::warn!("Normalized length is 0; at least one document has no recognised tokens");
    }
    Ok(documents)
}
