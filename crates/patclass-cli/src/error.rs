//! Error types for patclass-cli

use patclass::PatclassError;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

/// Result type alias for CLI operations
pub(crate) type Result<T> = std::result::Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug)]
pub(crate) enum CliError {
    /// Dataset or config file not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Input records are malformed or unusable
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Settings rejected before any work started
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The classifier failed to fit or predict
    #[error("Training failed: {0}")]
    Training(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other library error
    #[error("{0}")]
    Patclass(String),
}

impl CliError {
    /// Numeric process status for this error
    pub(crate) fn code(&self) -> u8 {
        match self {
            Self::Patclass(_) => 1,
            Self::FileNotFound(_) => 3,
            Self::InvalidData(_) => 4,
            Self::InvalidConfig(_) => 5,
            Self::Training(_) => 6,
            Self::Io(_) => 7,
        }
    }

    /// Get exit code for this error
    pub(crate) fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.code())
    }
}

impl From<PatclassError> for CliError {
    fn from(e: PatclassError) -> Self {
        match e {
            PatclassError::Io(io) => Self::Io(io),
            PatclassError::FormatError { .. }
            | PatclassError::Schema { .. }
            | PatclassError::Derivation { .. }
            | PatclassError::UnsupportedLabelCardinality { .. }
            | PatclassError::UnknownCategory { .. }
            | PatclassError::EmptyInput { .. } => Self::InvalidData(e.to_string()),
            PatclassError::InvalidFraction { .. } | PatclassError::InvalidHyperparameter { .. } => {
                Self::InvalidConfig(e.to_string())
            }
            PatclassError::Classifier(_) | PatclassError::NotFitted { .. } => {
                Self::Training(e.to_string())
            }
            _ => Self::Patclass(e.to_string()),
        }
    }
}
