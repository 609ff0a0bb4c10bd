// ============================================================
// Layer 5 — Logistic Regression Training
// ============================================================
// Full-batch training of LogisticRegressionModel with Adam.
//
// Key Burn insight:
//   - Training uses TrainBackend (Autodiff<NdArray>) for gradients
//   - model.valid() returns the model on EvalBackend (NdArray)
//   - Prediction tensors must be built on EvalBackend too
//   - argmax(1) returns [batch,1] so we flatten before reading
//
// Objective (same scaling as the usual C-parameterised form):
//
//   ½‖W‖² + C · Σ_i CE_i      divided by C·n  ⇒
//   mean CE + ‖W‖² / (2·C·n)
//
// so a larger C means weaker regularisation.
//
// Reference: Kingma & Ba (2015) Adam

use anyhow::{bail, Result};
use burn::{
    backend::{ndarray::NdArrayDevice, Autodiff, NdArray},
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::domain::error::PipelineError;
use crate::domain::traits::Classifier;
use crate::ml::model::{LogisticRegressionConfig, LogisticRegressionModel};

type TrainBackend = Autodiff<NdArray>;
type EvalBackend  = NdArray;

/// Hyperparameters of the embedding-based classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegressionSettings {
    /// Inverse regularisation strength (C)
    pub regularization: f64,
    /// Full-batch optimisation steps
    pub epochs:         usize,
    /// Adam learning rate
    pub lr:             f64,
}

impl Default for LogisticRegressionSettings {
    fn default() -> Self {
        Self { regularization: 1.0, epochs: 300, lr: 0.05 }
    }
}

/// Logistic regression over dense feature rows.
pub struct LogisticRegression {
    settings: LogisticRegressionSettings,
    device:   NdArrayDevice,
    model:    Option<LogisticRegressionModel<EvalBackend>>,
}

impl LogisticRegression {
    pub fn new(settings: LogisticRegressionSettings) -> Self {
        Self { settings, device: NdArrayDevice::default(), model: None }
    }
}

/// Stack rows into a [rows, dim] tensor, checking they are rectangular.
fn features_tensor<B: Backend>(rows: &[Vec<f32>], device: &B::Device) -> Result<Tensor<B, 2>> {
    let dim = rows.first().map_or(0, Vec::len);
    if let Some(bad) = rows.iter().find(|r| r.len() != dim) {
        return Err(PipelineError::DimensionMismatch { expected: dim, found: bad.len() }.into());
    }
    let flat: Vec<f32> = rows.iter().flatten().copied().collect();
    Ok(Tensor::<B, 1>::from_floats(flat.as_slice(), device).reshape([rows.len(), dim]))
}

impl Classifier<Vec<f32>> for LogisticRegression {
    fn name(&self) -> &str {
        "Logistic Regression (mean embeddings)"
    }

    fn fit(&mut self, samples: &[Vec<f32>], labels: &[usize], num_classes: usize) -> Result<()> {
        if samples.len() != labels.len() {
            return Err(PipelineError::LabelMismatch {
                samples: samples.len(),
                labels:  labels.len(),
            }
            .into());
        }
        if samples.is_empty() {
            bail!("Cannot fit logistic regression on zero samples");
        }
        let cfg = &self.settings;
        if cfg.regularization <= 0.0 {
            bail!("Regularization strength C must be positive, got {}", cfg.regularization);
        }

        let x = features_tensor::<TrainBackend>(samples, &self.device)?;
        let targets: Vec<i32> = labels.iter().map(|&l| l as i32).collect();
        let y = Tensor::<TrainBackend, 1, Int>::from_ints(targets.as_slice(), &self.device);

        let num_features = samples[0].len();
        let mut model: LogisticRegressionModel<TrainBackend> =
            LogisticRegressionConfig::new(num_features, num_classes).init(&self.device);
        let mut optim = AdamConfig::new().with_epsilon(1e-8).init();
        let l2 = 1.0 / (2.0 * cfg.regularization * samples.len() as f64);

        for epoch in 1..=cfg.epochs {
            let loss = model.forward_loss(x.clone(), y.clone(), l2);

            if epoch == 1 || epoch == cfg.epochs || epoch % 100 == 0 {
                let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
                tracing::debug!("epoch {:>4}/{} loss={:.5}", epoch, cfg.epochs, loss_val);
            }

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        self.model = Some(model.valid());
        Ok(())
    }

    fn predict(&self, samples: &[Vec<f32>]) -> Result<Vec<usize>> {
        let Some(model) = self.model.as_ref() else {
            bail!("Logistic regression used before fit");
        };
        if samples.is_empty() {
            return Ok(Vec::new());
        }
        let x = features_tensor::<EvalBackend>(samples, &self.device)?;
        Ok(model
            .predict(x)
            .into_data()
            .iter::<i64>()
            .map(|c| c as usize)
            .collect())
    }
}
