// ============================================================
// Layer 5 — Count Vectorizer + Multinomial Naive Bayes
// ============================================================
// The count-based baseline. Works directly on RAW text:
//
//   raw text ──CountVectorizer──► sparse token counts
//            ──MultinomialNB────► argmax_c  log P(c) + Σ_w n_w · log P(w|c)
//
// The vectorizer lowercases and keeps every run of two or more
// word characters (\b\w\w+\b). Its vocabulary is fitted on the
// training fold only; tokens first seen at prediction time have
// no column and are ignored.
//
// Smoothing: additive (Laplace) with alpha = 1.0 by default,
//   P(w|c) = (N_cw + alpha) / (N_c + alpha · |V|)
//
// A class with no training documents in a fold gets
// log P(c) = -inf and is never predicted for that fold.

use anyhow::{bail, Result};
use regex::Regex;
use std::collections::HashMap;

use crate::domain::error::PipelineError;
use crate::domain::traits::Classifier;

/// One document as (column, count) pairs, columns ascending.
pub type SparseCounts = Vec<(usize, u32)>;

#[derive(Debug, Clone)]
pub struct CountVectorizer {
    token_pattern: Regex,
    vocabulary:    HashMap<String, usize>,
}

impl CountVectorizer {
    pub fn new() -> Self {
        Self {
            token_pattern: Regex::new(r"\b\w\w+\b").expect("static regex"),
            vocabulary:    HashMap::new(),
        }
    }

    fn tokens<'a>(&'a self, text: &'a str) -> impl Iterator<Item = String> + 'a {
        self.token_pattern
            .find_iter(text)
            .map(|m| m.as_str().to_lowercase())
    }

    /// Learn the vocabulary of `texts`, replacing any previous one.
    pub fn fit(&mut self, texts: &[String]) {
        let mut vocabulary = HashMap::new();
        for text in texts {
            for token in self.tokens(text) {
                let next = vocabulary.len();
                vocabulary.entry(token).or_insert(next);
            }
        }
        self.vocabulary = vocabulary;
    }

    /// Count known tokens of one text.
    pub fn transform(&self, text: &str) -> SparseCounts {
        let mut counts: HashMap<usize, u32> = HashMap::new();
        for token in self.tokens(text) {
            if let Some(&col) = self.vocabulary.get(&token) {
                *counts.entry(col).or_insert(0) += 1;
            }
        }
        let mut row: SparseCounts = counts.into_iter().collect();
        row.sort_unstable();
        row
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }
}

impl Default for CountVectorizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Count vectorizer + multinomial Naive Bayes, fitted together.
#[derive(Debug, Clone)]
pub struct MultinomialNaiveBayes {
    alpha:            f64,
    vectorizer:       CountVectorizer,
    class_log_prior:  Vec<f64>,
    /// `[class][column]` log P(column | class)
    feature_log_prob: Vec<Vec<f64>>,
}

impl MultinomialNaiveBayes {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            vectorizer:       CountVectorizer::new(),
            class_log_prior:  Vec::new(),
            feature_log_prob: Vec::new(),
        }
    }

    fn joint_log_likelihood(&self, row: &SparseCounts) -> Vec<f64> {
        self.class_log_prior
            .iter()
            .zip(&self.feature_log_prob)
            .map(|(&prior, flp)| {
                prior + row.iter().map(|&(col, n)| f64::from(n) * flp[col]).sum::<f64>()
            })
            .collect()
    }
}

impl Default for MultinomialNaiveBayes {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Classifier<String> for MultinomialNaiveBayes {
    fn name(&self) -> &str {
        "Naive Bayes (token counts)"
    }

    fn fit(&mut self, samples: &[String], labels: &[usize], num_classes: usize) -> Result<()> {
        if samples.len() != labels.len() {
            return Err(PipelineError::LabelMismatch {
                samples: samples.len(),
                labels:  labels.len(),
            }
            .into());
        }
        if samples.is_empty() {
            bail!("Cannot fit Naive Bayes on zero documents");
        }

        self.vectorizer.fit(samples);
        let v = self.vectorizer.vocabulary_size();

        let mut class_docs   = vec![0usize; num_classes];
        let mut class_counts = vec![vec![0.0f64; v]; num_classes];
        for (text, &label) in samples.iter().zip(labels) {
            class_docs[label] += 1;
            for (col, n) in self.vectorizer.transform(text) {
                class_counts[label][col] += f64::from(n);
            }
        }

        let n = samples.len() as f64;
        self.class_log_prior = class_docs
            .iter()
            .map(|&c| if c == 0 { f64::NEG_INFINITY } else { (c as f64 / n).ln() })
            .collect();

        let alpha = self.alpha;
        self.feature_log_prob = class_counts
            .into_iter()
            .map(|counts| {
                let total: f64 = counts.iter().sum::<f64>() + alpha * v as f64;
                counts.into_iter().map(|c| ((c + alpha) / total).ln()).collect()
            })
            .collect();

        tracing::debug!(
            "Naive Bayes fitted: {} documents, {} features, {} classes",
            samples.len(),
            v,
            num_classes,
        );
        Ok(())
    }

    fn predict(&self, samples: &[String]) -> Result<Vec<usize>> {
        if self.class_log_prior.is_empty() {
            bail!("Naive Bayes used before fit");
        }
        Ok(samples
            .iter()
            .map(|text| argmax(&self.joint_log_likelihood(&self.vectorizer.transform(text))))
            .collect())
    }
}

/// Index of the largest value; the first one wins ties.
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0usize;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}
