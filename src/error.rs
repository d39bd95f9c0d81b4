//! Error types for patclass operations.
//!
//! Every failure carries enough context (column, row index, counts) to
//! diagnose the offending input without re-running the pipeline.

use std::fmt;

/// Main error type for patclass operations.
///
/// # Examples
///
/// ```
/// use patclass::error::PatclassError;
///
/// let err = PatclassError::LengthMismatch {
///     predicted: 4,
///     truth: 5,
/// };
/// assert!(err.to_string().contains("length mismatch"));
/// ```
#[derive(Debug)]
pub enum PatclassError {
    /// I/O error (file not found, permission denied, etc.).
    Io(std::io::Error),

    /// Input file is malformed or uses an unsupported format.
    FormatError {
        /// Error description, including the line number when known
        message: String,
    },

    /// A required column is missing from the dataset.
    Schema {
        /// Column name
        column: String,
        /// What needed the column
        context: String,
    },

    /// A composite feature could not be derived for a record.
    Derivation {
        /// Zero-based row index in the input dataset
        row: usize,
        /// Error description
        message: String,
    },

    /// The label column does not hold exactly the two classes {0, 1}.
    UnsupportedLabelCardinality {
        /// Distinct labels found, sorted
        labels: Vec<usize>,
    },

    /// Split fraction outside the open interval (0, 1).
    InvalidFraction {
        /// Provided value
        value: f64,
    },

    /// A category was not seen when the encoder was fitted.
    UnknownCategory {
        /// Zero-based row index in the transformed slice
        row: usize,
        /// The unseen category
        category: String,
    },

    /// Predicted and true label sequences differ in length.
    LengthMismatch {
        /// Number of predicted labels
        predicted: usize,
        /// Number of true labels
        truth: usize,
    },

    /// Invalid hyperparameter value provided.
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// An operation received no data to work on.
    EmptyInput {
        /// What was empty
        context: String,
    },

    /// A transformer or model was used before being fitted.
    NotFitted {
        /// Component name
        what: String,
    },

    /// Opaque failure reported by a classifier implementation.
    Classifier(String),

    /// Serialization/deserialization error.
    Serialization(String),
}

impl fmt::Display for PatclassError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatclassError::Io(e) => write!(f, "I/O error: {e}"),
            PatclassError::FormatError { message } => {
                write!(f, "Invalid dataset format: {message}")
            }
            PatclassError::Schema { column, context } => {
                write!(f, "Schema error: column '{column}' is missing ({context})")
            }
            PatclassError::Derivation { row, message } => {
                write!(f, "Cannot derive feature for row {row}: {message}")
            }
            PatclassError::UnsupportedLabelCardinality { labels } => {
                write!(
                    f,
                    "Unsupported label cardinality: expected labels {{0, 1}}, found {labels:?}"
                )
            }
            PatclassError::InvalidFraction { value } => {
                write!(
                    f,
                    "Invalid test fraction: {value}, expected a value in (0, 1)"
                )
            }
            PatclassError::UnknownCategory { row, category } => {
                write!(
                    f,
                    "Unknown category '{category}' at row {row}: not seen during fit"
                )
            }
            PatclassError::LengthMismatch { predicted, truth } => {
                write!(
                    f,
                    "Label length mismatch: {predicted} predicted vs {truth} true"
                )
            }
            PatclassError::InvalidHyperparameter {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid hyperparameter: {param} = {value}, expected {constraint}"
                )
            }
            PatclassError::EmptyInput { context } => write!(f, "Empty input: {context}"),
            PatclassError::NotFitted { what } => write!(f, "{what} is not fitted"),
            PatclassError::Classifier(msg) => write!(f, "Classifier error: {msg}"),
            PatclassError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
        }
    }
}

impl std::error::Error for PatclassError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PatclassError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PatclassError {
    fn from(err: std::io::Error) -> Self {
        PatclassError::Io(err)
    }
}

impl From<serde_json::Error> for PatclassError {
    fn from(err: serde_json::Error) -> Self {
        PatclassError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for PatclassError {
    fn from(err: toml::de::Error) -> Self {
        PatclassError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for PatclassError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(csv::Position::line);
        match (err.into_kind(), line) {
            (csv::ErrorKind::Io(e), _) => PatclassError::Io(e),
            (kind, Some(line)) => PatclassError::FormatError {
                message: format!("line {line}: {kind:?}"),
            },
            (kind, None) => PatclassError::FormatError {
                message: format!("{kind:?}"),
            },
        }
    }
}

impl PatclassError {
    /// Create a schema error for a missing column
    #[must_use]
    pub fn missing_column(column: &str, context: &str) -> Self {
        Self::Schema {
            column: column.to_string(),
            context: context.to_string(),
        }
    }

    /// Create an empty input error
    #[must_use]
    pub fn empty_input(context: &str) -> Self {
        Self::EmptyInput {
            context: context.to_string(),
        }
    }

    /// Create an invalid hyperparameter error
    #[must_use]
    pub fn invalid_hyperparameter(param: &str, value: impl fmt::Display, constraint: &str) -> Self {
        Self::InvalidHyperparameter {
            param: param.to_string(),
            value: value.to_string(),
            constraint: constraint.to_string(),
        }
    }

    /// Whether the run must abort on this error.
    ///
    /// Derivation and unknown-category errors are per-record; the caller may
    /// drop or report the record and continue.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            PatclassError::Derivation { .. } | PatclassError::UnknownCategory { .. }
        )
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, PatclassError>;
