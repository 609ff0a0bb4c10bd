// ============================================================
// Layer 5 — Logistic Regression Model
// ============================================================
// Multinomial logistic regression expressed as a burn Module:
//
//   features [batch, D] ──Linear(D → C)──► logits [batch, C]
//   loss = softmax cross-entropy (mean) + l2 · Σ W²
//
// Reference: Burn Book §3 (Building Blocks)

use burn::{
    nn::{loss::CrossEntropyLossConfig, Initializer, Linear, LinearConfig},
    prelude::*,
};

// Config derive brings its own Clone + serde impls.
#[derive(Config, Debug)]
pub struct LogisticRegressionConfig {
    pub num_features: usize,
    pub num_classes:  usize,
}

impl LogisticRegressionConfig {
    /// Zero-initialised weights: the objective is convex, so training
    /// from zeros is deterministic and loses nothing.
    pub fn init<B: Backend>(&self, device: &B::Device) -> LogisticRegressionModel<B> {
        let linear = LinearConfig::new(self.num_features, self.num_classes)
            .with_initializer(Initializer::Zeros)
            .init(device);
        LogisticRegressionModel { linear }
    }
}

/// Multinomial logistic regression: one linear layer whose logits
/// go through softmax cross-entropy.
#[derive(Module, Debug)]
pub struct LogisticRegressionModel<B: Backend> {
    pub linear: Linear<B>,
}

impl<B: Backend> LogisticRegressionModel<B> {
    /// features: [batch, num_features] → logits: [batch, num_classes]
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        self.linear.forward(features)
    }

    /// Σ w² over the weight matrix; the bias is not penalised.
    pub fn weight_penalty(&self) -> Tensor<B, 1> {
        let w = self.linear.weight.val();
        (w.clone() * w).sum()
    }

    /// Mean cross-entropy + `l2` · Σ w².
    pub fn forward_loss(
        &self,
        features: Tensor<B, 2>,
        targets:  Tensor<B, 1, Int>,
        l2:       f64,
    ) -> Tensor<B, 1> {
        let logits = self.forward(features);
        let ce = CrossEntropyLossConfig::new().init(&logits.device());
        ce.forward(logits, targets) + self.weight_penalty().mul_scalar(l2)
    }

    /// Most likely class per row: [batch] (Int)
    pub fn predict(&self, features: Tensor<B, 2>) -> Tensor<B, 1, Int> {
        self.forward(features).argmax(1).flatten::<1>(0, 1)
    }
}
