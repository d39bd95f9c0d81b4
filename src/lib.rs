//! Patclass: data preparation and evaluation for binary patent classifiers.
//!
//! Patclass turns a raw patent export into balanced, encoded train and test
//! sets, hands them to any [`Classifier`], and scores the predictions.
//!
//! # Quick Start
//!
//! ```no_run
//! use patclass::prelude::*;
//!
//! let config = PipelineConfig::new("patents.csv").with_kind(PipelineKind::Text);
//! let report = Pipeline::new(config).run(&LogisticRegression::new())?;
//!
//! println!("{}", report.metrics);
//! # Ok::<(), patclass::PatclassError>(())
//! ```
//!
//! # Modules
//!
//! - [`data`]: Dataset container and file loading (CSV, TSV, JSON lines)
//! - [`preprocessing`]: Normalization, class balancing, category encoding
//! - [`model_selection`]: Seeded train/test splitting
//! - [`text`]: Word tokenization, vocabulary, fixed-length id sequences
//! - [`features`]: Encoded feature containers
//! - [`traits`]: The [`Classifier`] interface and training settings
//! - [`classification`]: Sparse logistic regression baseline
//! - [`metrics`]: Accuracy, precision, recall, F1
//! - [`pipeline`]: Stage orchestration and configuration

pub mod classification;
pub mod data;
pub mod error;
pub mod features;
pub mod metrics;
pub mod model_selection;
pub mod pipeline;
pub mod prelude;
pub mod preprocessing;
pub mod text;
pub mod traits;

pub use error::{PatclassError, Result};
pub use traits::{Classifier, TrainingConfig};
