//! The trainable classifier seam.
//!
//! Pipelines only see [`Classifier`]; a transformer fine-tuner, a linear
//! model or a test double can be swapped in without touching the stages
//! around it.

use crate::error::{PatclassError, Result};
use crate::features::EncodedFeatures;
use serde::{Deserialize, Serialize};

/// Hyperparameters passed to [`Classifier::fit`].
///
/// Implementations read the fields that apply to them and ignore the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Passes over the training set
    pub num_epochs: usize,
    /// Records per gradient step
    pub batch_size: usize,
    /// L2 penalty applied at every step
    pub weight_decay: f32,
    pub learning_rate: f32,
    /// Seed for batch order and initialization
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            num_epochs: 3,
            batch_size: 16,
            weight_decay: 0.01,
            learning_rate: 0.1,
            seed: 42,
        }
    }
}

impl TrainingConfig {
    /// Rejects values no training loop can use.
    ///
    /// # Errors
    ///
    /// Returns [`PatclassError::InvalidHyperparameter`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.num_epochs == 0 {
            return Err(PatclassError::invalid_hyperparameter(
                "num_epochs",
                self.num_epochs,
                ">0",
            ));
        }
        if self.batch_size == 0 {
            return Err(PatclassError::invalid_hyperparameter(
                "batch_size",
                self.batch_size,
                ">0",
            ));
        }
        if !(self.weight_decay >= 0.0 && self.weight_decay.is_finite()) {
            return Err(PatclassError::invalid_hyperparameter(
                "weight_decay",
                self.weight_decay,
                ">=0 and finite",
            ));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(PatclassError::invalid_hyperparameter(
                "learning_rate",
                self.learning_rate,
                ">0 and finite",
            ));
        }
        Ok(())
    }
}

/// A trainable binary classifier.
///
/// `fit` consumes encoded training features and labels (0 or 1) and returns
/// an opaque fitted model; `predict` maps features to labels with that model.
/// Failures internal to the implementation should be reported as
/// [`PatclassError::Classifier`].
///
/// # Examples
///
/// ```
/// use patclass::features::EncodedFeatures;
/// use patclass::traits::{Classifier, TrainingConfig};
/// use patclass::Result;
///
/// /// Always predicts the most frequent training label.
/// struct Majority;
///
/// impl Classifier for Majority {
///     type Model = usize;
///
///     fn fit(&self, _x: &EncodedFeatures, y: &[usize], _config: &TrainingConfig) -> Result<usize> {
///         let positives = y.iter().filter(|&&l| l == 1).count();
///         Ok(usize::from(positives * 2 > y.len()))
///     }
///
///     fn predict(&self, model: &usize, x: &EncodedFeatures) -> Result<Vec<usize>> {
///         Ok(vec![*model; x.len()])
///     }
/// }
///
/// let x = EncodedFeatures::categories(vec![0, 1, 1], 2).unwrap();
/// let model = Majority.fit(&x, &[1, 1, 0], &TrainingConfig::default()).unwrap();
/// assert_eq!(Majority.predict(&model, &x).unwrap(), vec![1, 1, 1]);
/// ```
pub trait Classifier {
    /// Fitted model artifact.
    type Model: Serialize;

    /// Fits a model to training data.
    ///
    /// # Errors
    ///
    /// Returns an error if the inputs are inconsistent or training fails.
    fn fit(&self, x: &EncodedFeatures, y: &[usize], config: &TrainingConfig) -> Result<Self::Model>;

    /// Predicts a label for every record in `x`.
    ///
    /// # Errors
    ///
    /// Returns an error if `x` does not match what the model was fitted on.
    fn predict(&self, model: &Self::Model, x: &EncodedFeatures) -> Result<Vec<usize>>;

    /// Short name recorded in reports and artifacts.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
            .rsplit("::")
            .next()
            .unwrap_or("classifier")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = TrainingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.num_epochs, 3);
        assert_eq!(config.batch_size, 16);
    }

    #[test]
    fn test_invalid_configs() {
        let cases = [
            TrainingConfig {
                num_epochs: 0,
                ..TrainingConfig::default()
            },
            TrainingConfig {
                batch_size: 0,
                ..TrainingConfig::default()
            },
            TrainingConfig {
                weight_decay: -0.1,
                ..TrainingConfig::default()
            },
            TrainingConfig {
                learning_rate: 0.0,
                ..TrainingConfig::default()
            },
            TrainingConfig {
                learning_rate: f32::NAN,
                ..TrainingConfig::default()
            },
        ];
        for config in cases {
            assert!(
                matches!(
                    config.validate(),
                    Err(PatclassError::InvalidHyperparameter { .. })
                ),
                "{config:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: TrainingConfig = toml::from_str("num_epochs = 5").expect("parse");
        assert_eq!(config.num_epochs, 5);
        assert_eq!(config.batch_size, 16);
    }

    struct Echo;

    impl Classifier for Echo {
        type Model = ();

        fn fit(&self, _x: &EncodedFeatures, _y: &[usize], _c: &TrainingConfig) -> Result<()> {
            Ok(())
        }

        fn predict(&self, _model: &(), x: &EncodedFeatures) -> Result<Vec<usize>> {
            match x {
                EncodedFeatures::Categories { codes, .. } => Ok(codes.clone()),
                EncodedFeatures::TokenIds { .. } => {
                    Err(PatclassError::Classifier("tokens unsupported".to_string()))
                }
            }
        }
    }

    #[test]
    fn test_default_name() {
        assert_eq!(Echo.name(), "Echo");
    }

    #[test]
    fn test_collaborator_errors_pass_through() {
        let x = EncodedFeatures::token_ids(vec![vec![0]], 1).expect("valid");
        let err = Echo.predict(&(), &x).unwrap_err();
        assert_eq!(err.to_string(), "Classifier error: tokens unsupported");
    }
}
