//! Evaluation metrics for binary patent classifiers.
//!
//! Accuracy, precision, recall and F1-score derived from a confusion matrix.

pub mod classification;

pub use classification::{evaluate, ConfusionMatrix, MetricsReport};
