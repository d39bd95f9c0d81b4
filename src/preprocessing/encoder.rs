//! Categorical feature encoding.

use crate::error::{PatclassError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Maps category strings to dense integer codes.
///
/// Codes are assigned in sorted category order, so fitting the same set of
/// categories always yields the same mapping. Fit once on the full balanced
/// dataset before splitting; categories unseen at fit time are rejected
/// rather than mapped to a default.
///
/// # Examples
///
/// ```
/// use patclass::preprocessing::CategoryEncoder;
///
/// let mut encoder = CategoryEncoder::new();
/// encoder.fit(&["H04L", "A61K", "H04L", "G06F"]).unwrap();
/// assert_eq!(encoder.n_categories(), 3);
/// assert_eq!(encoder.transform(&["A61K", "H04L"]).unwrap(), vec![0, 2]);
/// assert!(encoder.transform(&["B65D"]).is_err());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryEncoder {
    categories: Option<Vec<String>>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl CategoryEncoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.categories.is_some()
    }

    /// Learns the category set.
    ///
    /// # Errors
    ///
    /// Returns [`PatclassError::EmptyInput`] if `values` is empty.
    pub fn fit<S: AsRef<str>>(&mut self, values: &[S]) -> Result<()> {
        if values.is_empty() {
            return Err(PatclassError::empty_input("cannot fit category encoder"));
        }
        let distinct: BTreeSet<&str> = values.iter().map(AsRef::as_ref).collect();
        let categories: Vec<String> = distinct.into_iter().map(str::to_string).collect();
        self.index = build_index(&categories);
        self.categories = Some(categories);
        Ok(())
    }

    /// Encodes every value, failing on the first unseen category.
    ///
    /// # Errors
    ///
    /// * [`PatclassError::NotFitted`] before [`fit`](Self::fit)
    /// * [`PatclassError::UnknownCategory`] with the offending row
    pub fn transform<S: AsRef<str>>(&self, values: &[S]) -> Result<Vec<usize>> {
        self.transform_each(values)?.into_iter().collect()
    }

    /// Encodes every value independently so each unseen category can be
    /// reported.
    ///
    /// # Errors
    ///
    /// Returns [`PatclassError::NotFitted`] before [`fit`](Self::fit); per-row
    /// failures are returned inside the vector.
    pub fn transform_each<S: AsRef<str>>(&self, values: &[S]) -> Result<Vec<Result<usize>>> {
        if !self.is_fitted() {
            return Err(PatclassError::NotFitted {
                what: "CategoryEncoder".to_string(),
            });
        }
        Ok(values
            .iter()
            .enumerate()
            .map(|(row, value)| self.code(value.as_ref(), row))
            .collect())
    }

    /// Fits and transforms in one step.
    ///
    /// # Errors
    ///
    /// Same as [`fit`](Self::fit).
    pub fn fit_transform<S: AsRef<str>>(&mut self, values: &[S]) -> Result<Vec<usize>> {
        self.fit(values)?;
        self.transform(values)
    }

    /// Category strings in code order.
    #[must_use]
    pub fn categories(&self) -> &[String] {
        self.categories.as_deref().unwrap_or(&[])
    }

    #[must_use]
    pub fn n_categories(&self) -> usize {
        self.categories().len()
    }

    /// Maps a code back to its category.
    #[must_use]
    pub fn inverse(&self, code: usize) -> Option<&str> {
        self.categories().get(code).map(String::as_str)
    }

    fn code(&self, value: &str, row: usize) -> Result<usize> {
        // The index is not serialized; fall back to a search after deserialization.
        if let Some(&code) = self.index.get(value) {
            return Ok(code);
        }
        self.categories()
            .binary_search_by(|c| c.as_str().cmp(value))
            .map_err(|_| PatclassError::UnknownCategory {
                row,
                category: value.to_string(),
            })
    }
}

fn build_index(categories: &[String]) -> HashMap<String, usize> {
    categories
        .iter()
        .enumerate()
        .map(|(i, c)| (c.clone(), i))
        .collect()
}
