//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use patclass::prelude::*;
//! ```

pub use crate::classification::{LogisticModel, LogisticRegression};
pub use crate::data::{load_dataset, Dataset, Record};
pub use crate::error::PatclassError;
pub use crate::features::{EncodedFeatures, EncodedSubset};
pub use crate::metrics::{evaluate, ConfusionMatrix, MetricsReport};
pub use crate::model_selection::train_test_split;
pub use crate::pipeline::{Pipeline, PipelineConfig, PipelineKind, PipelineReport};
pub use crate::preprocessing::{CategoryEncoder, ClassBalancer, NormalizeSpec, Normalizer};
pub use crate::text::SequenceEncoder;
pub use crate::traits::{Classifier, TrainingConfig};
