//! Run command implementation
//!
//! Runs one pipeline end to end with the bundled logistic regression and
//! prints stage counts and scores.

use super::require_file;
use crate::error::{CliError, Result};
use crate::output;
use clap::Args;
use patclass::classification::LogisticRegression;
use patclass::pipeline::{Pipeline, PipelineConfig, PipelineKind, PipelineReport};
use patclass::PatclassError;
use std::path::PathBuf;
use tracing::info;

/// Flags of `patclass run`; each one overrides the config file.
#[derive(Args, Debug, Default)]
pub(crate) struct RunArgs {
    /// Dataset file (csv, tsv, jsonl or json)
    #[arg(value_name = "DATASET")]
    pub dataset: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Feature to learn from: text or category
    #[arg(long)]
    pub kind: Option<PipelineKind>,

    /// Seed for balancing, splitting and training
    #[arg(long)]
    pub seed: Option<u64>,

    /// Share of records held out for evaluation
    #[arg(long)]
    pub test_fraction: Option<f64>,

    /// Directory that receives model.json
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Passes over the training set
    #[arg(long)]
    pub epochs: Option<usize>,

    #[arg(long)]
    pub batch_size: Option<usize>,

    #[arg(long)]
    pub learning_rate: Option<f32>,

    #[arg(long)]
    pub weight_decay: Option<f32>,

    /// Token ids per text record
    #[arg(long)]
    pub max_sequence_length: Option<usize>,

    #[arg(long)]
    pub min_token_frequency: Option<usize>,

    #[arg(long)]
    pub max_vocab_size: Option<usize>,

    /// Shuffle rows after downsampling
    #[arg(long)]
    pub shuffle_balanced: bool,
}

impl RunArgs {
    /// Config file values with command line overrides applied.
    pub(crate) fn to_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => {
                require_file(path)?;
                info!(path = %path.display(), "loading config");
                PipelineConfig::from_toml_file(path).map_err(|e| match e {
                    PatclassError::Serialization(msg) => {
                        CliError::InvalidConfig(format!("{}: {msg}", path.display()))
                    }
                    other => CliError::from(other),
                })?
            }
            None => PipelineConfig::default(),
        };

        if let Some(dataset) = &self.dataset {
            config.dataset.clone_from(dataset);
        }
        if let Some(kind) = self.kind {
            config.kind = kind;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(fraction) = self.test_fraction {
            config.test_fraction = fraction;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir.clone_from(dir);
        }
        if let Some(epochs) = self.epochs {
            config.training.num_epochs = epochs;
        }
        if let Some(batch_size) = self.batch_size {
            config.training.batch_size = batch_size;
        }
        if let Some(lr) = self.learning_rate {
            config.training.learning_rate = lr;
        }
        if let Some(wd) = self.weight_decay {
            config.training.weight_decay = wd;
        }
        if let Some(len) = self.max_sequence_length {
            config.max_sequence_length = len;
        }
        if let Some(freq) = self.min_token_frequency {
            config.min_token_frequency = freq;
        }
        if self.max_vocab_size.is_some() {
            config.max_vocab_size = self.max_vocab_size;
        }
        if self.shuffle_balanced {
            config.shuffle_balanced = true;
        }

        if config.dataset.as_os_str().is_empty() {
            return Err(CliError::InvalidConfig(
                "no dataset given: pass a path or set `dataset` in the config file".to_string(),
            ));
        }
        Ok(config)
    }
}

pub(crate) fn run(args: &RunArgs, json: bool, quiet: bool) -> Result<()> {
    let config = args.to_config()?;
    require_file(&config.dataset)?;

    let report = Pipeline::new(config).run(&LogisticRegression::new())?;

    if json {
        output::json(&report)
    } else {
        if !quiet {
            print_report(&report);
        }
        Ok(())
    }
}

fn print_report(report: &PipelineReport) {
    output::section("Pipeline");
    output::kv("kind", report.kind);
    output::kv("classifier", &report.classifier);

    output::section("Records");
    output::kv("loaded", report.loaded_rows);
    output::kv("duplicates", report.normalize.duplicates);
    output::kv("derivation failures", report.normalize.derivation_failures);
    output::kv("incomplete", report.normalize.null_rows);
    output::kv("normalized", report.normalize.output_rows);
    output::kv(
        "classes (0 / 1)",
        format!(
            "{} / {}",
            report.class_counts.negative, report.class_counts.positive
        ),
    );
    output::kv("balanced", report.balanced_rows);
    output::kv("train", report.train_rows);
    output::kv("test", report.test_rows);
    output::kv("features", report.n_features);

    output::section("Metrics");
    output::metrics(&report.metrics);
    if report.test_rows == 0 {
        output::warning("test set is empty, scores are zero");
    }

    output::section("Artifact");
    output::kv("model", report.artifact.display());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let args = RunArgs {
            dataset: Some(PathBuf::from("d.csv")),
            kind: Some(PipelineKind::Category),
            epochs: Some(9),
            shuffle_balanced: true,
            ..RunArgs::default()
        };
        let config = args.to_config().expect("config");
        assert_eq!(config.dataset, PathBuf::from("d.csv"));
        assert_eq!(config.kind, PipelineKind::Category);
        assert_eq!(config.training.num_epochs, 9);
        assert!(config.shuffle_balanced);
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn test_flags_override_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("run.toml");
        std::fs::write(&path, "dataset = \"a.csv\"\nseed = 1\ntest_fraction = 0.3\n")
            .expect("write");
        let args = RunArgs {
            config: Some(path),
            seed: Some(2),
            ..RunArgs::default()
        };
        let config = args.to_config().expect("config");
        assert_eq!(config.dataset, dir.path().join("a.csv"));
        assert_eq!(config.seed, 2);
        assert_eq!(config.test_fraction, 0.3);
    }

    #[test]
    fn test_malformed_config_is_invalid_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("run.toml");
        std::fs::write(&path, "dataset = \"a.csv\"\nkind = \"audio\"\n").expect("write");
        let args = RunArgs {
            config: Some(path),
            ..RunArgs::default()
        };
        let err = args.to_config().unwrap_err();
        assert_eq!(err.code(), 5);
        assert!(err.to_string().contains("run.toml"), "{err}");
    }

    #[test]
    fn test_missing_dataset_rejected() {
        let err = RunArgs::default().to_config().unwrap_err();
        assert_eq!(err.code(), 5);
    }
}
