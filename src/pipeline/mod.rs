//! End-to-end preparation, training and evaluation.
//!
//! A [`Pipeline`] runs every stage in order:
//!
//! 1. load the dataset
//! 2. normalize with the preset for the configured [`PipelineKind`]
//! 3. downsample the majority class
//! 4. split into train and test subsets
//! 5. encode features (vocabulary or category codes)
//! 6. fit the classifier and write `model.json`
//! 7. predict on the test subset and compute metrics
//!
//! All randomness comes from one `StdRng` seeded from the config.

mod config;

pub use config::{PipelineConfig, PipelineKind};

use crate::data::{load_dataset, Dataset};
use crate::error::{PatclassError, Result};
use crate::features::{EncodedFeatures, EncodedSubset};
use crate::metrics::{evaluate, MetricsReport};
use crate::model_selection::train_test_split;
use crate::preprocessing::{
    CategoryEncoder, ClassBalancer, ClassCounts, NormalizeSpec, NormalizeStats, Normalizer,
};
use crate::text::SequenceEncoder;
use crate::traits::Classifier;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Column produced by the text preset.
pub const TEXT_COLUMN: &str = "text";

/// Column holding the CPC prefix used by the category pipeline.
pub const CATEGORY_COLUMN: &str = "cpc_first_4";

/// File name of the written model artifact.
pub const MODEL_FILE: &str = "model.json";

/// Fitted feature encoder, saved next to the model.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeatureEncoder {
    Sequence(SequenceEncoder),
    Category(CategoryEncoder),
}

impl FeatureEncoder {
    fn encode(&self, dataset: &Dataset) -> Result<EncodedFeatures> {
        match self {
            Self::Sequence(encoder) => {
                let texts = non_null(dataset, TEXT_COLUMN)?;
                EncodedFeatures::token_ids(encoder.encode_batch(&texts)?, encoder.vocab_size())
            }
            Self::Category(encoder) => {
                let values = non_null(dataset, CATEGORY_COLUMN)?;
                EncodedFeatures::categories(encoder.transform(&values)?, encoder.n_categories())
            }
        }
    }
}

/// Contents of `model.json`.
#[derive(Serialize)]
struct ModelArtifact<'a, M: Serialize> {
    classifier: &'a str,
    kind: PipelineKind,
    label_column: &'a str,
    encoder: &'a FeatureEncoder,
    model: &'a M,
}

/// Row counts after each stage plus the final scores.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub kind: PipelineKind,
    pub classifier: String,
    pub loaded_rows: usize,
    pub normalize: NormalizeStats,
    /// Class counts before balancing
    pub class_counts: ClassCounts,
    pub balanced_rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    /// Vocabulary size or number of categories
    pub n_features: usize,
    pub artifact: PathBuf,
    pub metrics: MetricsReport,
}

/// Encoded train and test data ready for a classifier.
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub train: EncodedSubset,
    pub test: EncodedSubset,
    pub encoder: FeatureEncoder,
    pub loaded_rows: usize,
    pub normalize: NormalizeStats,
    pub class_counts: ClassCounts,
    pub balanced_rows: usize,
}

/// Runs the configured stages against a [`Classifier`].
///
/// # Examples
///
/// ```no_run
/// use patclass::classification::LogisticRegression;
/// use patclass::pipeline::{Pipeline, PipelineConfig, PipelineKind};
///
/// let config = PipelineConfig::new("patents.csv").with_kind(PipelineKind::Category);
/// let report = Pipeline::new(config).run(&LogisticRegression::new())?;
/// println!("{}", report.metrics);
/// # Ok::<(), patclass::PatclassError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Loads, normalizes, balances, splits and encodes the dataset.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any stage.
    pub fn prepare(&self) -> Result<PreparedData> {
        let config = &self.config;
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.seed);

        let raw = load_dataset(&config.dataset)?;
        let loaded_rows = raw.n_rows();

        let spec = match config.kind {
            PipelineKind::Text => NormalizeSpec::text(),
            PipelineKind::Category => NormalizeSpec::category(),
        };
        let (normalized, normalize) = Normalizer::new(spec).normalize_with_stats(&raw)?;

        let balanced = ClassBalancer::new()
            .with_label_column(&config.label_column)
            .with_shuffle(config.shuffle_balanced)
            .balance(&normalized, &mut rng)?;
        let class_counts = balanced.counts_before();
        let balanced = balanced.into_dataset();
        let balanced_rows = balanced.n_rows();

        // Category codes come from the whole balanced set so test rows are known.
        let category_encoder = match config.kind {
            PipelineKind::Category => {
                let mut encoder = CategoryEncoder::new();
                encoder.fit(&non_null(&balanced, CATEGORY_COLUMN)?)?;
                Some(encoder)
            }
            PipelineKind::Text => None,
        };

        let split = train_test_split(&balanced, config.test_fraction, &mut rng)?;

        let encoder = match category_encoder {
            Some(encoder) => FeatureEncoder::Category(encoder),
            None => {
                let mut encoder = SequenceEncoder::new(config.max_sequence_length)
                    .with_min_frequency(config.min_token_frequency)
                    .with_max_vocab_size(config.max_vocab_size);
                encoder.fit(&non_null(&split.train, TEXT_COLUMN)?)?;
                FeatureEncoder::Sequence(encoder)
            }
        };

        let train = encode_subset(&encoder, &split.train, &config.label_column)?;
        let test = encode_subset(&encoder, &split.test, &config.label_column)?;
        info!(
            kind = %config.kind,
            n_features = train.features.dimension(),
            train = train.len(),
            test = test.len(),
            "encoded features"
        );

        Ok(PreparedData {
            train,
            test,
            encoder,
            loaded_rows,
            normalize,
            class_counts,
            balanced_rows,
        })
    }

    /// Runs every stage and writes the model artifact.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any stage, including errors from
    /// `classifier`, unchanged.
    pub fn run<C: Classifier>(&self, classifier: &C) -> Result<PipelineReport> {
        let config = &self.config;
        let prepared = self.prepare()?;

        info!(classifier = classifier.name(), "training");
        let model = classifier.fit(
            &prepared.train.features,
            &prepared.train.labels,
            &config.training_config(),
        )?;

        let artifact = write_artifact(
            &config.output_dir,
            &ModelArtifact {
                classifier: classifier.name(),
                kind: config.kind,
                label_column: &config.label_column,
                encoder: &prepared.encoder,
                model: &model,
            },
        )?;

        let predictions = classifier.predict(&model, &prepared.test.features)?;
        let metrics = evaluate(&predictions, &prepared.test.labels)?;
        info!(
            accuracy = metrics.accuracy,
            precision = metrics.precision,
            recall = metrics.recall,
            f1 = metrics.f1,
            "evaluation finished"
        );

        Ok(PipelineReport {
            kind: config.kind,
            classifier: classifier.name().to_string(),
            loaded_rows: prepared.loaded_rows,
            normalize: prepared.normalize,
            class_counts: prepared.class_counts,
            balanced_rows: prepared.balanced_rows,
            train_rows: prepared.train.len(),
            test_rows: prepared.test.len(),
            n_features: prepared.train.features.dimension(),
            artifact,
            metrics,
        })
    }
}

fn encode_subset(encoder: &FeatureEncoder, dataset: &Dataset, label_column: &str) -> Result<EncodedSubset> {
    let features = encoder.encode(dataset)?;
    let labels = dataset.labels(label_column)?;
    EncodedSubset::new(features, labels)
}

/// Values of `column`, which normalization guarantees are non-null.
fn non_null<'a>(dataset: &'a Dataset, column: &str) -> Result<Vec<&'a str>> {
    dataset
        .column(column)?
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value.ok_or_else(|| PatclassError::FormatError {
                message: format!("row {row}: null value in column '{column}'"),
            })
        })
        .collect()
}

fn write_artifact<M: Serialize>(output_dir: &Path, artifact: &ModelArtifact<'_, M>) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(MODEL_FILE);
    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(&mut writer, artifact)?;
    writer.flush()?;
    debug!(path = %path.display(), "wrote model artifact");
    Ok(path)
}
