// ============================================================
// Layer 3 — Document and Corpus Domain Types
// ============================================================
// A Document is one raw text loaded from disk.
// A Corpus is the ordered collection of documents for one
// experiment, together with a PARALLEL label sequence.
//
// The single invariant that matters here:
//   documents[i] is labelled labels[i], for every i, always.
//
// Every operation that removes documents goes through
// Corpus::retain_indices so the two sequences can never drift.

use serde::{Deserialize, Serialize};

use crate::domain::error::PipelineError;

/// A raw document loaded from disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// The relative path the text came from, kept for diagnostics
    pub source: String,

    /// The decoded text content before tokenisation
    pub text: String,
}

impl Document {
    /// Create a new Document with a source path and text content.
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text:   text.into(),
        }
    }
}

/// Documents plus their category labels.
///
/// `labels[i]` is an index into `categories`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Corpus {
    documents:  Vec<Document>,
    labels:     Vec<usize>,
    categories: Vec<String>,
}

impl Corpus {
    /// Build a corpus, checking that documents and labels line up
    /// and that every label names a known category.
    pub fn new(
        documents:  Vec<Document>,
        labels:     Vec<usize>,
        categories: Vec<String>,
    ) -> Result<Self, PipelineError> {
        if documents.len() != labels.len() {
            return Err(PipelineError::LabelMismatch {
                samples: documents.len(),
                labels:  labels.len(),
            });
        }
        if let Some(&bad) = labels.iter().find(|&&l| l >= categories.len()) {
            return Err(PipelineError::UnknownLabel {
                label:      bad,
                categories: categories.len(),
            });
        }
        Ok(Self { documents, labels, categories })
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Raw texts in corpus order.
    pub fn texts(&self) -> Vec<String> {
        self.documents.iter().map(|d| d.text.clone()).collect()
    }

    /// Number of documents per category, indexed by label.
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.categories.len()];
        for &l in &self.labels {
            counts[l] += 1;
        }
        counts
    }

    /// Keep only the documents at `keep` (ascending indices),
    /// dropping their labels in the same step.
    pub fn retain_indices(&mut self, keep: &[usize]) {
        let documents = keep.iter().map(|&i| self.documents[i].clone()).collect();
        let labels    = keep.iter().map(|&i| self.labels[i]).collect();
        self.documents = documents;
        self.labels    = labels;
    }
}
