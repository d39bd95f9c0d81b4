//! Pipeline configuration, loadable from TOML.

use crate::data::LABEL_COLUMN;
use crate::error::{PatclassError, Result};
use crate::model_selection::test_size;
use crate::traits::TrainingConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Which feature the classifier learns from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineKind {
    /// Title and abstract text, encoded as token id sequences
    #[default]
    Text,
    /// The four-character CPC prefix, encoded as a category code
    Category,
}

impl fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Category => write!(f, "category"),
        }
    }
}

impl FromStr for PipelineKind {
    type Err = PatclassError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "category" => Ok(Self::Category),
            other => Err(PatclassError::invalid_hyperparameter(
                "kind",
                other,
                "one of: text, category",
            )),
        }
    }
}

/// Settings for one pipeline run.
///
/// Every field has a default, so a TOML file only needs `dataset`:
///
/// ```toml
/// dataset = "data/patents.csv"
/// kind = "category"
/// test_fraction = 0.25
///
/// [training]
/// num_epochs = 5
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Input file (csv, tsv, jsonl or json)
    pub dataset: PathBuf,
    pub kind: PipelineKind,
    pub label_column: String,
    /// Share of the balanced dataset held out for evaluation
    pub test_fraction: f64,
    /// Seeds balancing, splitting and training
    pub seed: u64,
    pub max_sequence_length: usize,
    pub min_token_frequency: usize,
    pub max_vocab_size: Option<usize>,
    /// Shuffle rows after downsampling
    pub shuffle_balanced: bool,
    /// Directory that receives `model.json`
    pub output_dir: PathBuf,
    pub training: TrainingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dataset: PathBuf::new(),
            kind: PipelineKind::default(),
            label_column: LABEL_COLUMN.to_string(),
            test_fraction: 0.2,
            seed: 42,
            max_sequence_length: 64,
            min_token_frequency: 1,
            max_vocab_size: None,
            shuffle_balanced: false,
            output_dir: PathBuf::from("./results"),
            training: TrainingConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Default settings for `dataset`.
    #[must_use]
    pub fn new(dataset: impl Into<PathBuf>) -> Self {
        Self {
            dataset: dataset.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: PipelineKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_test_fraction(mut self, test_fraction: f64) -> Self {
        self.test_fraction = test_fraction;
        self
    }

    #[must_use]
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    #[must_use]
    pub fn with_training(mut self, training: TrainingConfig) -> Self {
        self.training = training;
        self
    }

    /// Reads a TOML file. Relative `dataset` and `output_dir` paths resolve
    /// against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns [`PatclassError::Io`] if the file cannot be read and
    /// [`PatclassError::Serialization`] if it is not valid TOML for this type.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        Ok(match path.parent() {
            Some(base) => config.relative_to(base),
            None => config,
        })
    }

    /// Parses TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`PatclassError::Serialization`] on malformed TOML.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    fn relative_to(mut self, base: &Path) -> Self {
        if !self.dataset.as_os_str().is_empty() && self.dataset.is_relative() {
            self.dataset = base.join(&self.dataset);
        }
        if self.output_dir.is_relative() {
            self.output_dir = base.join(&self.output_dir);
        }
        self
    }

    /// Training settings with the pipeline seed applied.
    #[must_use]
    pub fn training_config(&self) -> TrainingConfig {
        TrainingConfig {
            seed: self.seed,
            ..self.training.clone()
        }
    }

    /// Checks every setting before any work starts.
    ///
    /// # Errors
    ///
    /// Returns [`PatclassError::InvalidFraction`] or
    /// [`PatclassError::InvalidHyperparameter`] for the first bad setting.
    pub fn validate(&self) -> Result<()> {
        if self.dataset.as_os_str().is_empty() {
            return Err(PatclassError::invalid_hyperparameter(
                "dataset",
                "\"\"",
                "a file path",
            ));
        }
        if self.label_column.is_empty() {
            return Err(PatclassError::invalid_hyperparameter(
                "label_column",
                "\"\"",
                "a column name",
            ));
        }
        test_size(0, self.test_fraction)?;
        if self.kind == PipelineKind::Text && self.max_sequence_length == 0 {
            return Err(PatclassError::invalid_hyperparameter(
                "max_sequence_length",
                0,
                ">0",
            ));
        }
        self.training.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.kind, PipelineKind::Text);
        assert_eq!(config.label_column, "labels");
        assert_eq!(config.test_fraction, 0.2);
        assert_eq!(config.seed, 42);
        assert_eq!(config.max_sequence_length, 64);
        assert_eq!(config.output_dir, PathBuf::from("./results"));
        assert!(config.max_vocab_size.is_none());
        assert!(!config.shuffle_balanced);
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config = PipelineConfig::from_toml_str(
            r#"
            dataset = "patents.csv"
            kind = "category"

            [training]
            num_epochs = 7
            "#,
        )
        .expect("parse");
        assert_eq!(config.dataset, PathBuf::from("patents.csv"));
        assert_eq!(config.kind, PipelineKind::Category);
        assert_eq!(config.training.num_epochs, 7);
        assert_eq!(config.training.batch_size, 16);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_toml_is_serialization_error() {
        let err = PipelineConfig::from_toml_str("kind = \"audio\"").unwrap_err();
        assert!(matches!(err, PatclassError::Serialization(_)));
    }

    #[test]
    fn test_from_toml_file_missing() {
        let err = PipelineConfig::from_toml_file("/nonexistent/patclass.toml").unwrap_err();
        assert!(matches!(err, PatclassError::Io(_)));
    }

    #[test]
    fn test_from_toml_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("run.toml");
        std::fs::write(&path, "dataset = \"d.csv\"\nseed = 9\n").expect("write");
        let config = PipelineConfig::from_toml_file(&path).expect("load");
        assert_eq!(config.seed, 9);
        assert_eq!(config.dataset, dir.path().join("d.csv"));
        assert_eq!(config.output_dir, dir.path().join("./results"));
    }

    #[test]
    fn test_from_toml_file_keeps_absolute_paths() {
        let dir = tempfile::tempdir().expect("tempdir");
        let data = dir.path().join("data").join("d.csv");
        let out = dir.path().join("out");
        let path = dir.path().join("run.toml");
        std::fs::write(
            &path,
            format!(
                "dataset = {:?}\noutput_dir = {:?}\n",
                data.display().to_string(),
                out.display().to_string()
            ),
        )
        .expect("write");
        let config = PipelineConfig::from_toml_file(&path).expect("load");
        assert_eq!(config.dataset, data);
        assert_eq!(config.output_dir, out);
    }

    #[test]
    fn test_from_toml_file_without_dataset_stays_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("run.toml");
        std::fs::write(&path, "seed = 3\n").expect("write");
        let config = PipelineConfig::from_toml_file(&path).expect("load");
        assert!(config.dataset.as_os_str().is_empty());
    }

    #[test]
    fn test_validate_rejects() {
        assert!(PipelineConfig::default().validate().is_err());

        let base = PipelineConfig::new("d.csv");
        assert!(base.validate().is_ok());
        assert!(matches!(
            base.clone().with_test_fraction(1.0).validate(),
            Err(PatclassError::InvalidFraction { .. })
        ));

        let mut no_len = base.clone();
        no_len.max_sequence_length = 0;
        assert!(no_len.validate().is_err());
        assert!(no_len.with_kind(PipelineKind::Category).validate().is_ok());

        let bad_training = base.with_training(TrainingConfig {
            batch_size: 0,
            ..TrainingConfig::default()
        });
        assert!(matches!(
            bad_training.validate(),
            Err(PatclassError::InvalidHyperparameter { .. })
        ));
    }

    #[test]
    fn test_training_config_uses_pipeline_seed() {
        let config = PipelineConfig::new("d.csv").with_seed(5);
        assert_eq!(config.training_config().seed, 5);
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("TEXT".parse::<PipelineKind>().expect("parse"), PipelineKind::Text);
        assert_eq!(
            "category".parse::<PipelineKind>().expect("parse"),
            PipelineKind::Category
        );
        assert!("image".parse::<PipelineKind>().is_err());
        assert_eq!(PipelineKind::Category.to_string(), "category");
    }
}
