//! Bundled classifiers.
//!
//! [`LogisticRegression`] is a sparse linear baseline that trains directly on
//! [`EncodedFeatures`]:
//! - token sequences become L1-normalized bags of tokens (padding ignored)
//! - category codes become one-hot vectors
//!
//! # Example
//!
//! ```
//! use patclass::classification::LogisticRegression;
//! use patclass::features::EncodedFeatures;
//! use patclass::traits::{Classifier, TrainingConfig};
//!
//! let x = EncodedFeatures::categories(vec![0, 1, 0, 1], 2).unwrap();
//! let y = vec![0, 1, 0, 1];
//! let config = TrainingConfig {
//!     num_epochs: 50,
//!     learning_rate: 1.0,
//!     ..TrainingConfig::default()
//! };
//!
//! let clf = LogisticRegression::new();
//! let model = clf.fit(&x, &y, &config).unwrap();
//! assert_eq!(clf.predict(&model, &x).unwrap(), y);
//! ```

use crate::error::{PatclassError, Result};
use crate::features::EncodedFeatures;
use crate::text::PAD_ID;
use crate::traits::{Classifier, TrainingConfig};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which encoding a model was fitted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    TokenIds,
    Categories,
}

impl FeatureKind {
    fn of(x: &EncodedFeatures) -> Self {
        match x {
            EncodedFeatures::TokenIds { .. } => Self::TokenIds,
            EncodedFeatures::Categories { .. } => Self::Categories,
        }
    }
}

/// Fitted weights of a [`LogisticRegression`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub kind: FeatureKind,
    pub weights: Vec<f32>,
    pub intercept: f32,
    /// Mean log loss on the training set after each epoch
    pub loss_history: Vec<f32>,
}

impl LogisticModel {
    /// Width of the feature space the model expects.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.weights.len()
    }
}

/// Binary logistic regression trained with seeded mini-batch gradient descent.
///
/// Uses sigmoid activation and binary cross-entropy loss with an L2 penalty
/// of `weight_decay` on the weights (the intercept is not penalized).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    threshold: f32,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

/// One record as `(feature, value)` pairs.
type SparseRow = Vec<(usize, f32)>;

impl LogisticRegression {
    /// Creates a classifier with decision threshold 0.5.
    #[must_use]
    pub fn new() -> Self {
        Self { threshold: 0.5 }
    }

    /// Sets the probability at or above which a record is labeled 1.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Sigmoid activation function: σ(z) = 1 / (1 + e^(-z))
    fn sigmoid(z: f32) -> f32 {
        1.0 / (1.0 + (-z).exp())
    }

    fn sparse_rows(x: &EncodedFeatures) -> Vec<SparseRow> {
        match x {
            EncodedFeatures::TokenIds { sequences, .. } => sequences
                .iter()
                .map(|seq| {
                    let mut counts: Vec<(usize, f32)> = Vec::new();
                    for &id in seq.iter().filter(|&&id| id != PAD_ID) {
                        let id = id as usize;
                        match counts.iter_mut().find(|(f, _)| *f == id) {
                            Some((_, c)) => *c += 1.0,
                            None => counts.push((id, 1.0)),
                        }
                    }
                    let total: f32 = counts.iter().map(|(_, c)| c).sum();
                    if total > 0.0 {
                        for (_, c) in &mut counts {
                            *c /= total;
                        }
                    }
                    counts
                })
                .collect(),
            EncodedFeatures::Categories { codes, .. } => {
                codes.iter().map(|&code| vec![(code, 1.0)]).collect()
            }
        }
    }

    fn decision(weights: &[f32], intercept: f32, row: &[(usize, f32)]) -> f32 {
        row.iter()
            .fold(intercept, |z, &(f, v)| z + weights.get(f).copied().unwrap_or(0.0) * v)
    }

    fn log_loss(weights: &[f32], intercept: f32, rows: &[SparseRow], y: &[usize]) -> f32 {
        const EPS: f32 = 1e-7;
        let total: f32 = rows
            .iter()
            .zip(y)
            .map(|(row, &label)| {
                let p = Self::sigmoid(Self::decision(weights, intercept, row)).clamp(EPS, 1.0 - EPS);
                if label == 1 {
                    -p.ln()
                } else {
                    -(1.0 - p).ln()
                }
            })
            .sum();
        total / rows.len() as f32
    }

    fn check_compatible(model: &LogisticModel, x: &EncodedFeatures) -> Result<()> {
        if FeatureKind::of(x) != model.kind {
            return Err(PatclassError::Classifier(format!(
                "model was fitted on {:?} features, got {:?}",
                model.kind,
                FeatureKind::of(x)
            )));
        }
        if x.dimension() != model.n_features() {
            return Err(PatclassError::Classifier(format!(
                "model expects {} features, got {}",
                model.n_features(),
                x.dimension()
            )));
        }
        Ok(())
    }

    /// Probability of class 1 for each record.
    ///
    /// # Errors
    ///
    /// Returns [`PatclassError::Classifier`] if `x` has a different encoding
    /// or width than the training features.
    pub fn predict_proba(&self, model: &LogisticModel, x: &EncodedFeatures) -> Result<Vec<f32>> {
        Self::check_compatible(model, x)?;
        Ok(Self::sparse_rows(x)
            .iter()
            .map(|row| Self::sigmoid(Self::decision(&model.weights, model.intercept, row)))
            .collect())
    }
}

impl Classifier for LogisticRegression {
    type Model = LogisticModel;

    fn fit(&self, x: &EncodedFeatures, y: &[usize], config: &TrainingConfig) -> Result<LogisticModel> {
        config.validate()?;
        if x.len() != y.len() {
            return Err(PatclassError::LengthMismatch {
                predicted: x.len(),
                truth: y.len(),
            });
        }
        if x.is_empty() {
            return Err(PatclassError::empty_input("training features"));
        }
        if let Some(&bad) = y.iter().find(|&&label| label > 1) {
            let mut labels: Vec<usize> = y.to_vec();
            labels.sort_unstable();
            labels.dedup();
            debug!(label = bad, "non-binary training label");
            return Err(PatclassError::UnsupportedLabelCardinality { labels });
        }

        let rows = Self::sparse_rows(x);
        let mut weights = vec![0.0_f32; x.dimension()];
        let mut intercept = 0.0_f32;
        let mut order: Vec<usize> = (0..rows.len()).collect();
        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut loss_history = Vec::with_capacity(config.num_epochs);

        for epoch in 0..config.num_epochs {
            order.shuffle(&mut rng);
            for batch in order.chunks(config.batch_size) {
                let mut grad: Vec<(usize, f32)> = Vec::new();
                let mut intercept_grad = 0.0_f32;
                for &i in batch {
                    let row = &rows[i];
                    let error = Self::sigmoid(Self::decision(&weights, intercept, row)) - y[i] as f32;
                    intercept_grad += error;
                    grad.extend(row.iter().map(|&(f, v)| (f, error * v)));
                }

                let n = batch.len() as f32;
                let shrink = 1.0 - config.learning_rate * config.weight_decay;
                if shrink != 1.0 {
                    for w in &mut weights {
                        *w *= shrink;
                    }
                }
                for (f, g) in grad {
                    if let Some(w) = weights.get_mut(f) {
                        *w -= config.learning_rate * g / n;
                    }
                }
                intercept -= config.learning_rate * intercept_grad / n;
            }

            let loss = Self::log_loss(&weights, intercept, &rows, y);
            if !loss.is_finite() {
                return Err(PatclassError::Classifier(format!(
                    "training diverged at epoch {epoch}"
                )));
            }
            debug!(epoch, loss, "logistic regression epoch");
            loss_history.push(loss);
        }

        Ok(LogisticModel {
            kind: FeatureKind::of(x),
            weights,
            intercept,
            loss_history,
        })
    }

    fn predict(&self, model: &LogisticModel, x: &EncodedFeatures) -> Result<Vec<usize>> {
        Ok(self
            .predict_proba(model, x)?
            .into_iter()
            .map(|p| usize::from(p >= self.threshold))
            .collect())
    }

    fn name(&self) -> &str {
        "logistic_regression"
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
