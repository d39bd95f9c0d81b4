//! Inspect command implementation
//!
//! Loads and normalizes a dataset and reports what balancing would do,
//! without training anything.

use super::require_file;
use crate::error::Result;
use crate::output;
use patclass::data::load_dataset;
use patclass::pipeline::PipelineKind;
use patclass::preprocessing::{ClassCounts, NormalizeSpec, NormalizeStats, Normalizer};
use serde::Serialize;
use std::path::Path;

/// Dataset summary for JSON output
#[derive(Serialize)]
struct InspectResult {
    file: String,
    kind: PipelineKind,
    columns: Vec<String>,
    normalize: NormalizeStats,
    class_counts: ClassCounts,
    imbalance_ratio: f64,
    /// Rows left after downsampling
    balanced_rows: usize,
}

pub(crate) fn run(path: &Path, kind: PipelineKind, label_column: &str, json: bool) -> Result<()> {
    require_file(path)?;

    let raw = load_dataset(path)?;
    let spec = match kind {
        PipelineKind::Text => NormalizeSpec::text(),
        PipelineKind::Category => NormalizeSpec::category(),
    };
    let (normalized, normalize) = Normalizer::new(spec).normalize_with_stats(&raw)?;
    let class_counts = ClassCounts::from_labels(&normalized.labels(label_column)?)?;

    let result = InspectResult {
        file: path.display().to_string(),
        kind,
        columns: raw.columns().to_vec(),
        normalize,
        class_counts,
        imbalance_ratio: class_counts.imbalance_ratio(),
        balanced_rows: 2 * class_counts.minority(),
    };

    if json {
        return output::json(&result);
    }

    output::section(&result.file);
    output::kv("columns", result.columns.join(", "));
    output::kv("records", result.normalize.input_rows);
    output::kv("duplicates", result.normalize.duplicates);
    output::kv("derivation failures", result.normalize.derivation_failures);
    output::kv("incomplete", result.normalize.null_rows);
    output::kv("normalized", result.normalize.output_rows);

    output::section("Class balance");
    output::kv("label 0", class_counts.negative);
    output::kv("label 1", class_counts.positive);
    output::kv("imbalance", format!("{:.2}:1", result.imbalance_ratio));
    output::kv("after balancing", result.balanced_rows);
    if result.balanced_rows * 10 < result.normalize.output_rows {
        output::warning("balancing keeps fewer than 10% of the records");
    }
    Ok(())
}
