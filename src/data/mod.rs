//! Tabular dataset container for patent records.
//!
//! A [`Dataset`] is a small row-oriented table of nullable string cells with
//! named columns. Every transformation returns a new `Dataset`; nothing is
//! mutated in place. Heavy data wrangling belongs in a dataframe library, this
//! type only covers what the preparation stages need.

mod loader;

pub use loader::{load_dataset, load_records, DatasetFormat};

use crate::error::{PatclassError, Result};
use serde::{Deserialize, Serialize};

/// A single nullable cell.
pub type Cell = Option<String>;

/// Columns every input file must provide.
pub const REQUIRED_COLUMNS: [&str; 6] = ["ucid", "title", "abstract", "code", "cpc_first_4", "labels"];

/// Name of the binary label column.
pub const LABEL_COLUMN: &str = "labels";

/// An ordered table of rows sharing one schema.
///
/// # Examples
///
/// ```
/// use patclass::data::Dataset;
///
/// let ds = Dataset::new(
///     vec!["title".to_string(), "labels".to_string()],
///     vec![
///         vec![Some("Widget".to_string()), Some("0".to_string())],
///         vec![Some("Gadget".to_string()), Some("1".to_string())],
///     ],
/// )
/// .expect("rows match the schema");
/// assert_eq!(ds.shape(), (2, 2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDataset")]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

/// Unchecked wire form; deserialization goes through [`Dataset::new`].
#[derive(Deserialize)]
struct RawDataset {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl TryFrom<RawDataset> for Dataset {
    type Error = PatclassError;

    fn try_from(raw: RawDataset) -> Result<Self> {
        Self::new(raw.columns, raw.rows)
    }
}

impl Dataset {
    /// Creates a dataset from column names and rows.
    ///
    /// # Errors
    ///
    /// Returns an error if a row's width differs from the number of columns,
    /// or if column names are empty or duplicated.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        for (i, name) in columns.iter().enumerate() {
            if name.is_empty() {
                return Err(PatclassError::FormatError {
                    message: format!("column {i} has an empty name"),
                });
            }
            if columns[..i].contains(name) {
                return Err(PatclassError::FormatError {
                    message: format!("duplicate column name '{name}'"),
                });
            }
        }

        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(PatclassError::FormatError {
                message: format!(
                    "row {idx} has {} cells, expected {}",
                    row.len(),
                    columns.len()
                ),
            });
        }

        Ok(Self { columns, rows })
    }

    /// Creates an empty dataset with the given schema.
    #[must_use]
    pub fn empty(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Builds a dataset with the standard record schema.
    #[must_use]
    pub fn from_records(records: &[Record]) -> Self {
        Self {
            columns: REQUIRED_COLUMNS.iter().map(|c| (*c).to_string()).collect(),
            rows: records.iter().map(Record::to_row).collect(),
        }
    }

    /// Returns the shape as (`n_rows`, `n_cols`).
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the column names in schema order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Returns the position of a column.
    ///
    /// # Errors
    ///
    /// Returns [`PatclassError::Schema`] if the column doesn't exist.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| PatclassError::missing_column(name, "column lookup"))
    }

    /// Returns every cell of a column in row order.
    ///
    /// # Errors
    ///
    /// Returns [`PatclassError::Schema`] if the column doesn't exist.
    pub fn column(&self, name: &str) -> Result<Vec<Option<&str>>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|row| row[idx].as_deref()).collect())
    }

    /// Returns the row at `idx`, if any.
    #[must_use]
    pub fn row(&self, idx: usize) -> Option<&[Cell]> {
        self.rows.get(idx).map(Vec::as_slice)
    }

    /// Iterates over rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Parses the label column into class ids.
    ///
    /// # Errors
    ///
    /// Returns [`PatclassError::Schema`] if the column is missing and
    /// [`PatclassError::FormatError`] if a label is null or not a
    /// non-negative integer.
    pub fn labels(&self, column: &str) -> Result<Vec<usize>> {
        let idx = self
            .column_index(column)
            .map_err(|_| PatclassError::missing_column(column, "label column"))?;

        self.rows
            .iter()
            .enumerate()
            .map(|(row_idx, row)| parse_label(row[idx].as_deref(), row_idx))
            .collect()
    }

    /// Returns a new dataset holding the rows at `indices`, in that order.
    ///
    /// # Panics
    ///
    /// Panics if an index is out of bounds.
    #[must_use]
    pub fn take(&self, indices: &[usize]) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }

    /// Returns a new dataset holding the rows that satisfy `keep`.
    #[must_use]
    pub fn filter<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(usize, &[Cell]) -> bool,
    {
        Self {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .enumerate()
                .filter(|(i, row)| keep(*i, row))
                .map(|(_, row)| row.clone())
                .collect(),
        }
    }

    /// Returns a new dataset without the named columns.
    ///
    /// Names that are not in the schema are ignored.
    #[must_use]
    pub fn without_columns(&self, names: &[String]) -> Self {
        let keep: Vec<usize> = (0..self.columns.len())
            .filter(|&i| !names.contains(&self.columns[i]))
            .collect();

        Self {
            columns: keep.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| keep.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        }
    }

    /// Returns a new dataset with `values` stored under `name`.
    ///
    /// An existing column of the same name is overwritten in place; otherwise
    /// the column is appended.
    ///
    /// # Errors
    ///
    /// Returns an error if `values` does not have one cell per row.
    pub fn with_column(&self, name: &str, values: Vec<Cell>) -> Result<Self> {
        if values.len() != self.rows.len() {
            return Err(PatclassError::LengthMismatch {
                predicted: values.len(),
                truth: self.rows.len(),
            });
        }

        let mut out = self.clone();
        match self.columns.iter().position(|c| c == name) {
            Some(idx) => {
                for (row, value) in out.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                out.columns.push(name.to_string());
                for (row, value) in out.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(out)
    }

    /// Appends the rows of `other` after the rows of `self`.
    ///
    /// # Errors
    ///
    /// Returns an error if the schemas differ.
    pub fn concat(&self, other: &Self) -> Result<Self> {
        if self.columns != other.columns {
            return Err(PatclassError::FormatError {
                message: format!(
                    "cannot concatenate datasets with schemas {:?} and {:?}",
                    self.columns, other.columns
                ),
            });
        }
        let mut rows = self.rows.clone();
        rows.extend(other.rows.iter().cloned());
        Ok(Self {
            columns: self.columns.clone(),
            rows,
        })
    }

    /// Converts rows into typed [`Record`]s.
    ///
    /// # Errors
    ///
    /// Returns [`PatclassError::Schema`] if a record column is missing and
    /// [`PatclassError::FormatError`] if a label cannot be parsed.
    pub fn to_records(&self) -> Result<Vec<Record>> {
        let idx: Vec<usize> = REQUIRED_COLUMNS
            .iter()
            .map(|c| {
                self.column_index(c)
                    .map_err(|_| PatclassError::missing_column(c, "record conversion"))
            })
            .collect::<Result<_>>()?;

        self.rows
            .iter()
            .enumerate()
            .map(|(row_idx, row)| {
                let label = parse_label(row[idx[5]].as_deref(), row_idx)?;
                let label = u8::try_from(label).map_err(|_| PatclassError::FormatError {
                    message: format!("row {row_idx}: label {label} out of range"),
                })?;
                Ok(Record {
                    ucid: row[idx[0]].clone(),
                    title: row[idx[1]].clone(),
                    abstract_text: row[idx[2]].clone(),
                    code: row[idx[3]].clone(),
                    cpc_first_4: row[idx[4]].clone(),
                    label,
                })
            })
            .collect()
    }
}

fn parse_label(cell: Option<&str>, row: usize) -> Result<usize> {
    let raw = cell.ok_or_else(|| PatclassError::FormatError {
        message: format!("row {row}: label is null"),
    })?;
    let trimmed = raw.trim();
    // Exports from dataframe tools may write integer labels as floats.
    let trimmed = trimmed.strip_suffix(".0").unwrap_or(trimmed);
    trimmed.parse::<usize>().map_err(|_| PatclassError::FormatError {
        message: format!("row {row}: label '{raw}' is not a non-negative integer"),
    })
}

/// One patent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Publication identifier
    pub ucid: Option<String>,
    pub title: Option<String>,
    /// Abstract text
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    /// Full CPC code (unused downstream)
    pub code: Option<String>,
    /// First four characters of the CPC code
    pub cpc_first_4: Option<String>,
    /// Binary label
    #[serde(rename = "labels")]
    pub label: u8,
}

impl Record {
    fn to_row(&self) -> Vec<Cell> {
        vec![
            self.ucid.clone(),
            self.title.clone(),
            self.abstract_text.clone(),
            self.code.clone(),
            self.cpc_first_4.clone(),
            Some(self.label.to_string()),
        ]
    }
}
