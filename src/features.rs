//! Encoded feature containers handed to classifiers.

use crate::error::{PatclassError, Result};
use serde::{Deserialize, Serialize};

/// Numeric features for a batch of records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EncodedFeatures {
    /// Fixed-length token id sequences, one per record
    TokenIds {
        sequences: Vec<Vec<u32>>,
        /// Number of distinct ids, padding included
        vocab_size: usize,
    },
    /// One category code per record
    Categories {
        codes: Vec<usize>,
        n_categories: usize,
    },
}

impl EncodedFeatures {
    /// Validates and wraps token sequences.
    ///
    /// # Errors
    ///
    /// Returns [`PatclassError::FormatError`] if an id is outside the vocabulary.
    pub fn token_ids(sequences: Vec<Vec<u32>>, vocab_size: usize) -> Result<Self> {
        for (row, seq) in sequences.iter().enumerate() {
            if let Some(&id) = seq.iter().find(|&&id| id as usize >= vocab_size) {
                return Err(PatclassError::FormatError {
                    message: format!("row {row}: token id {id} outside vocabulary of {vocab_size}"),
                });
            }
        }
        Ok(Self::TokenIds {
            sequences,
            vocab_size,
        })
    }

    /// Validates and wraps category codes.
    ///
    /// # Errors
    ///
    /// Returns [`PatclassError::UnknownCategory`] if a code is out of range.
    pub fn categories(codes: Vec<usize>, n_categories: usize) -> Result<Self> {
        if let Some((row, &code)) = codes.iter().enumerate().find(|(_, &c)| c >= n_categories) {
            return Err(PatclassError::UnknownCategory {
                row,
                category: format!("code {code}"),
            });
        }
        Ok(Self::Categories {
            codes,
            n_categories,
        })
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::TokenIds { sequences, .. } => sequences.len(),
            Self::Categories { codes, .. } => codes.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Width of the sparse feature space a linear model sees.
    #[must_use]
    pub fn dimension(&self) -> usize {
        match self {
            Self::TokenIds { vocab_size, .. } => *vocab_size,
            Self::Categories { n_categories, .. } => *n_categories,
        }
    }
}

/// Features and labels for one subset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSubset {
    pub features: EncodedFeatures,
    pub labels: Vec<usize>,
}

impl EncodedSubset {
    /// Pairs features with labels.
    ///
    /// # Errors
    ///
    /// Returns [`PatclassError::LengthMismatch`] if the counts differ.
    pub fn new(features: EncodedFeatures, labels: Vec<usize>) -> Result<Self> {
        if features.len() != labels.len() {
            return Err(PatclassError::LengthMismatch {
                predicted: features.len(),
                truth: labels.len(),
            });
        }
        Ok(Self { features, labels })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
