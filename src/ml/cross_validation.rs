// ============================================================
// Layer 5 — Cross-Validation Evaluator
// ============================================================
// Fits a fresh model on each fold's training indices and scores
// accuracy on its held-out indices. The reported metric is the
// mean fold accuracy ± twice the (population) standard
// deviation across folds.

use anyhow::Result;
use std::fmt;

use crate::data::splitter::Fold;
use crate::domain::error::PipelineError;
use crate::domain::traits::Classifier;

/// Per-fold accuracies of one classifier on one experiment.
#[derive(Debug, Clone, PartialEq)]
pub struct CvReport {
    pub classifier:      String,
    /// Fraction correct per fold, in [0, 1]
    pub fold_accuracies: Vec<f64>,
}

impl CvReport {
    pub fn mean(&self) -> f64 {
        if self.fold_accuracies.is_empty() {
            return 0.0;
        }
        self.fold_accuracies.iter().sum::<f64>() / self.fold_accuracies.len() as f64
    }

    /// Population standard deviation (ddof = 0).
    pub fn std_dev(&self) -> f64 {
        if self.fold_accuracies.is_empty() {
            return 0.0;
        }
        let mean = self.mean();
        let var = self
            .fold_accuracies
            .iter()
            .map(|a| (a - mean).powi(2))
            .sum::<f64>()
            / self.fold_accuracies.len() as f64;
        var.sqrt()
    }
}

impl fmt::Display for CvReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<40} accuracy: {:.2}% (+/- {:.2}%)",
            self.classifier,
            self.mean() * 100.0,
            self.std_dev() * 2.0 * 100.0,
        )
    }
}

/// Fraction of positions where `predicted` equals `actual`.
pub fn accuracy(predicted: &[usize], actual: &[usize]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let correct = predicted.iter().zip(actual).filter(|(p, a)| p == a).count();
    correct as f64 / actual.len() as f64
}

/// Run `classifier` over every fold.
pub fn cross_validate<X, C>(
    classifier:  &mut C,
    samples:     &[X],
    labels:      &[usize],
    num_classes: usize,
    folds:       &[Fold],
) -> Result<CvReport>
where
    X: Clone,
    C: Classifier<X>,
{
    if samples.len() != labels.len() {
        return Err(PipelineError::LabelMismatch {
            samples: samples.len(),
            labels:  labels.len(),
        }
        .into());
    }

    let pick = |idx: &[usize]| -> (Vec<X>, Vec<usize>) {
        (
            idx.iter().map(|&i| samples[i].clone()).collect(),
            idx.iter().map(|&i| labels[i]).collect(),
        )
    };

    let mut fold_accuracies = Vec::with_capacity(folds.len());
    for (k, fold) in folds.iter().enumerate() {
        let (train_x, train_y) = pick(&fold.train);
        let (test_x, test_y)   = pick(&fold.test);

        classifier.fit(&train_x, &train_y, num_classes)?;
        let predicted = classifier.predict(&test_x)?;
        let acc = accuracy(&predicted, &test_y);

        tracing::debug!(
            "{} fold {}/{}: {:.2}% on {} samples",
            classifier.name(),
            k + 1,
            folds.len(),
            acc * 100.0,
            test_y.len(),
        );
        fold_accuracies.push(acc);
    }

    Ok(CvReport { classifier: classifier.name().to_string(), fold_accuracies })
}
