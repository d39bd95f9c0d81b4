//! Record normalization: feature derivation, deduplication, column pruning
//! and null filtering.

use crate::data::{Cell, Dataset};
use crate::error::{PatclassError, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info, warn};

/// Computes a composite column from other columns of the same row.
pub trait FeatureDeriver: fmt::Debug {
    /// Name of the column to write.
    fn output(&self) -> &str;

    /// Columns read by [`derive`](Self::derive), in the order they are passed.
    fn inputs(&self) -> &[String];

    /// Derives the value for one row.
    ///
    /// # Errors
    ///
    /// Returns a message if the row's inputs cannot produce a value.
    fn derive(&self, inputs: &[Option<&str>]) -> std::result::Result<String, String>;
}

/// Joins several text columns with a separator.
///
/// # Examples
///
/// ```
/// use patclass::preprocessing::{ConcatColumns, FeatureDeriver};
///
/// let concat = ConcatColumns::new(&["title", "abstract"], " ", "text");
/// let text = concat.derive(&[Some("Pump"), Some("A rotary pump.")]).unwrap();
/// assert_eq!(text, "Pump A rotary pump.");
/// assert!(concat.derive(&[Some("Pump"), None]).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct ConcatColumns {
    inputs: Vec<String>,
    separator: String,
    output: String,
}

impl ConcatColumns {
    #[must_use]
    pub fn new(inputs: &[&str], separator: &str, output: &str) -> Self {
        Self {
            inputs: inputs.iter().map(|s| (*s).to_string()).collect(),
            separator: separator.to_string(),
            output: output.to_string(),
        }
    }
}

impl FeatureDeriver for ConcatColumns {
    fn output(&self) -> &str {
        &self.output
    }

    fn inputs(&self) -> &[String] {
        &self.inputs
    }

    fn derive(&self, inputs: &[Option<&str>]) -> std::result::Result<String, String> {
        let mut parts = Vec::with_capacity(inputs.len());
        for (name, value) in self.inputs.iter().zip(inputs) {
            match value {
                Some(v) => parts.push(*v),
                None => return Err(format!("'{name}' is null")),
            }
        }
        Ok(parts.join(&self.separator))
    }
}

/// Takes the first `length` characters of a column, e.g. the CPC subclass
/// (`F04B`) from a full code (`F04B1/00`).
///
/// # Examples
///
/// ```
/// use patclass::preprocessing::{FeatureDeriver, PrefixColumn};
///
/// let prefix = PrefixColumn::new("code", 4, "cpc_first_4");
/// assert_eq!(prefix.derive(&[Some("H01L21/30")]).unwrap(), "H01L");
/// assert!(prefix.derive(&[Some("H01")]).is_err());
/// assert!(prefix.derive(&[None]).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct PrefixColumn {
    inputs: Vec<String>,
    length: usize,
    output: String,
}

impl PrefixColumn {
    #[must_use]
    pub fn new(input: &str, length: usize, output: &str) -> Self {
        Self {
            inputs: vec![input.to_string()],
            length,
            output: output.to_string(),
        }
    }
}

impl FeatureDeriver for PrefixColumn {
    fn output(&self) -> &str {
        &self.output
    }

    fn inputs(&self) -> &[String] {
        &self.inputs
    }

    fn derive(&self, inputs: &[Option<&str>]) -> std::result::Result<String, String> {
        let name = &self.inputs[0];
        let value = inputs
            .first()
            .copied()
            .flatten()
            .ok_or_else(|| format!("'{name}' is null"))?;
        let prefix: String = value.chars().take(self.length).collect();
        if prefix.chars().count() < self.length {
            return Err(format!(
                "'{name}' value '{value}' is shorter than {} characters",
                self.length
            ));
        }
        Ok(prefix)
    }
}

/// Column handling for one normalization pass.
#[derive(Debug)]
pub struct NormalizeSpec {
    /// Columns identifying a duplicate; empty disables deduplication
    pub dedup_key: Vec<String>,
    /// Columns removed after deduplication; absent names are skipped
    pub drop_columns: Vec<String>,
    /// Optional composite column, computed before deduplication and
    /// recomputed in place if it already exists
    pub derive: Option<Box<dyn FeatureDeriver>>,
}

impl NormalizeSpec {
    /// Text pipeline: one record per (title, abstract), `text = title + " " + abstract`.
    #[must_use]
    pub fn text() -> Self {
        Self {
            dedup_key: vec!["title".to_string(), "abstract".to_string()],
            drop_columns: vec![
                "ucid".to_string(),
                "code".to_string(),
                "cpc_first_4".to_string(),
            ],
            derive: Some(Box::new(ConcatColumns::new(
                &["title", "abstract"],
                " ",
                "text",
            ))),
        }
    }

    /// Category pipeline: one record per (title, abstract, ucid, cpc_first_4),
    /// `cpc_first_4` recomputed from `code`, without the full CPC code.
    #[must_use]
    pub fn category() -> Self {
        Self {
            dedup_key: vec![
                "title".to_string(),
                "abstract".to_string(),
                "ucid".to_string(),
                "cpc_first_4".to_string(),
            ],
            drop_columns: vec!["code".to_string()],
            derive: Some(Box::new(PrefixColumn::new("code", 4, "cpc_first_4"))),
        }
    }
}

/// Row counts removed by each normalization step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeStats {
    pub input_rows: usize,
    pub duplicates: usize,
    pub derivation_failures: usize,
    pub null_rows: usize,
    pub output_rows: usize,
}

/// Applies a [`NormalizeSpec`] to datasets.
///
/// # Examples
///
/// ```
/// use patclass::data::Dataset;
/// use patclass::preprocessing::{NormalizeSpec, Normalizer};
///
/// let cell = |s: &str| Some(s.to_string());
/// let ds = Dataset::new(
///     ["ucid", "title", "abstract", "code", "cpc_first_4", "labels"]
///         .iter()
///         .map(|c| c.to_string())
///         .collect(),
///     vec![
///         vec![cell("1"), cell("Pump"), cell("A pump."), cell("F04B1"), cell("F04B"), cell("0")],
///         vec![cell("2"), cell("Pump"), cell("A pump."), cell("F04B2"), cell("F04B"), cell("0")],
///     ],
/// )
/// .unwrap();
///
/// let out = Normalizer::new(NormalizeSpec::text()).normalize(&ds).unwrap();
/// assert_eq!(out.n_rows(), 1);
/// assert_eq!(out.column("text").unwrap(), vec![Some("Pump A pump.")]);
/// ```
#[derive(Debug)]
pub struct Normalizer {
    spec: NormalizeSpec,
}

impl Normalizer {
    #[must_use]
    pub fn new(spec: NormalizeSpec) -> Self {
        Self { spec }
    }

    #[must_use]
    pub fn spec(&self) -> &NormalizeSpec {
        &self.spec
    }

    /// Normalizes a dataset, returning a new one.
    ///
    /// Steps run in this order: derive, deduplicate, drop columns, drop
    /// incomplete rows. Derivation is skipped when its inputs are gone but
    /// its output column is present, as in already normalized data.
    ///
    /// # Errors
    ///
    /// * [`PatclassError::Schema`] if a dedup key or derivation input column is absent
    /// * [`PatclassError::Derivation`] if derivation fails for every record
    pub fn normalize(&self, dataset: &Dataset) -> Result<Dataset> {
        self.normalize_with_stats(dataset).map(|(ds, _)| ds)
    }

    /// Normalizes a dataset and reports how many rows each step removed.
    ///
    /// # Errors
    ///
    /// Same as [`normalize`](Self::normalize).
    pub fn normalize_with_stats(&self, dataset: &Dataset) -> Result<(Dataset, NormalizeStats)> {
        let mut stats = NormalizeStats {
            input_rows: dataset.n_rows(),
            ..NormalizeStats::default()
        };

        let derived = match self.active_deriver(dataset)? {
            Some(deriver) => {
                let out = derive_column(dataset, deriver)?;
                stats.derivation_failures = dataset.n_rows() - out.n_rows();
                out
            }
            None => dataset.clone(),
        };

        self.check_dedup_key(&derived)?;
        let deduped = self.deduplicate(&derived)?;
        stats.duplicates = derived.n_rows() - deduped.n_rows();

        let pruned = deduped.without_columns(&self.spec.drop_columns);

        let complete = pruned.filter(|_, row| row.iter().all(Option::is_some));
        stats.null_rows = pruned.n_rows() - complete.n_rows();
        stats.output_rows = complete.n_rows();

        info!(
            input = stats.input_rows,
            duplicates = stats.duplicates,
            derivation_failures = stats.derivation_failures,
            null_rows = stats.null_rows,
            output = stats.output_rows,
            "normalized dataset"
        );
        Ok((complete, stats))
    }

    fn active_deriver(&self, dataset: &Dataset) -> Result<Option<&dyn FeatureDeriver>> {
        let Some(deriver) = self.spec.derive.as_deref() else {
            return Ok(None);
        };
        let missing = deriver.inputs().iter().find(|c| !dataset.has_column(c));
        match missing {
            None => Ok(Some(deriver)),
            Some(_) if dataset.has_column(deriver.output()) => {
                debug!(column = deriver.output(), "derivation inputs absent, keeping existing column");
                Ok(None)
            }
            Some(column) => Err(PatclassError::missing_column(
                column,
                &format!("input of derived column '{}'", deriver.output()),
            )),
        }
    }

    fn check_dedup_key(&self, dataset: &Dataset) -> Result<()> {
        for column in &self.spec.dedup_key {
            if !dataset.has_column(column) {
                return Err(PatclassError::missing_column(column, "deduplication key"));
            }
        }
        Ok(())
    }

    /// Keeps the first row seen for every key; null cells compare equal.
    fn deduplicate(&self, dataset: &Dataset) -> Result<Dataset> {
        if self.spec.dedup_key.is_empty() {
            return Ok(dataset.clone());
        }

        let key_idx = self
            .spec
            .dedup_key
            .iter()
            .map(|c| dataset.column_index(c))
            .collect::<Result<Vec<_>>>()?;

        let mut seen: HashSet<Vec<Cell>> = HashSet::with_capacity(dataset.n_rows());
        Ok(dataset.filter(|_, row| {
            let key: Vec<Cell> = key_idx.iter().map(|&i| row[i].clone()).collect();
            seen.insert(key)
        }))
    }
}

fn derive_column(dataset: &Dataset, deriver: &dyn FeatureDeriver) -> Result<Dataset> {
    let input_idx = deriver
        .inputs()
        .iter()
        .map(|c| dataset.column_index(c))
        .collect::<Result<Vec<_>>>()?;

    let mut values: Vec<Cell> = Vec::with_capacity(dataset.n_rows());
    let mut failures = 0usize;
    let mut first_failure: Option<PatclassError> = None;

    for (row_idx, row) in dataset.rows().enumerate() {
        let inputs: Vec<Option<&str>> = input_idx.iter().map(|&i| row[i].as_deref()).collect();
        match deriver.derive(&inputs) {
            Ok(value) => values.push(Some(value)),
            Err(message) => {
                debug!(row = row_idx, %message, "derivation failed, dropping record");
                failures += 1;
                first_failure.get_or_insert(PatclassError::Derivation {
                    row: row_idx,
                    message,
                });
                values.push(None);
            }
        }
    }

    if failures > 0 && failures == dataset.n_rows() {
        if let Some(PatclassError::Derivation { row, message }) = first_failure {
            return Err(PatclassError::Derivation {
                row,
                message: format!(
                    "'{}' could not be derived for any of {failures} records (first failure: {message})",
                    deriver.output()
                ),
            });
        }
    }
    if failures > 0 {
        warn!(
            column = deriver.output(),
            dropped = failures,
            "dropped records whose derived feature could not be computed"
        );
    }

    let with_output = dataset.with_column(deriver.output(), values)?;
    let out_idx = with_output.column_index(deriver.output())?;
    Ok(with_output.filter(|_, row| row[out_idx].is_some()))
}

#[cfg(test)]
#[path = "normalize_tests.rs"]
mod tests;
