//! Majority-class downsampling for binary datasets.

use crate::data::{Dataset, LABEL_COLUMN};
use crate::error::{PatclassError, Result};
use rand::seq::{index, SliceRandom};
use rand::Rng;
use serde::Serialize;
use tracing::info;

/// Rows per class, indexed by label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassCounts {
    pub negative: usize,
    pub positive: usize,
}

impl ClassCounts {
    /// Counts labels, rejecting anything that is not exactly {0, 1}.
    ///
    /// # Errors
    ///
    /// Returns [`PatclassError::UnsupportedLabelCardinality`] unless both 0
    /// and 1 occur and nothing else does.
    pub fn from_labels(labels: &[usize]) -> Result<Self> {
        let mut counts = Self::default();
        let mut others: Vec<usize> = Vec::new();
        for &label in labels {
            match label {
                0 => counts.negative += 1,
                1 => counts.positive += 1,
                other if !others.contains(&other) => others.push(other),
                _ => {}
            }
        }

        if !others.is_empty() || counts.negative == 0 || counts.positive == 0 {
            let mut found = others;
            if counts.negative > 0 {
                found.push(0);
            }
            if counts.positive > 0 {
                found.push(1);
            }
            found.sort_unstable();
            return Err(PatclassError::UnsupportedLabelCardinality { labels: found });
        }
        Ok(counts)
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.negative + self.positive
    }

    #[must_use]
    pub fn minority(&self) -> usize {
        self.negative.min(self.positive)
    }

    /// Majority-to-minority ratio.
    #[must_use]
    pub fn imbalance_ratio(&self) -> f64 {
        let minority = self.minority();
        if minority == 0 {
            return f64::INFINITY;
        }
        self.negative.max(self.positive) as f64 / minority as f64
    }

    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.negative == self.positive
    }
}

/// A dataset with equal class counts.
///
/// Rows are the minority class in input order followed by the sampled
/// majority rows in input order, unless the balancer shuffles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalancedDataset {
    dataset: Dataset,
    before: ClassCounts,
    per_class: usize,
}

impl BalancedDataset {
    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    #[must_use]
    pub fn into_dataset(self) -> Dataset {
        self.dataset
    }

    /// Class counts of the input.
    #[must_use]
    pub fn counts_before(&self) -> ClassCounts {
        self.before
    }

    /// Rows kept for each class.
    #[must_use]
    pub fn per_class(&self) -> usize {
        self.per_class
    }
}

/// Downsamples the majority class to the size of the minority class.
///
/// # Examples
///
/// ```
/// use patclass::data::Dataset;
/// use patclass::preprocessing::ClassBalancer;
/// use rand::SeedableRng;
///
/// let rows = (0..10)
///     .map(|i| vec![Some(i.to_string()), Some(if i == 3 { "1" } else { "0" }.to_string())])
///     .collect();
/// let ds = Dataset::new(vec!["id".to_string(), "labels".to_string()], rows).unwrap();
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(42);
/// let balanced = ClassBalancer::new().balance(&ds, &mut rng).unwrap();
/// assert_eq!(balanced.dataset().n_rows(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct ClassBalancer {
    label_column: String,
    shuffle: bool,
}

impl Default for ClassBalancer {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassBalancer {
    /// Balances on the `labels` column without shuffling.
    #[must_use]
    pub fn new() -> Self {
        Self {
            label_column: LABEL_COLUMN.to_string(),
            shuffle: false,
        }
    }

    #[must_use]
    pub fn with_label_column(mut self, column: &str) -> Self {
        self.label_column = column.to_string();
        self
    }

    /// Shuffle the balanced rows with the same generator.
    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    #[must_use]
    pub fn label_column(&self) -> &str {
        &self.label_column
    }

    /// Balances `dataset`, drawing the majority sample from `rng`.
    ///
    /// An already balanced dataset is returned unchanged and `rng` is not
    /// advanced.
    ///
    /// # Errors
    ///
    /// * [`PatclassError::EmptyInput`] for an empty dataset
    /// * [`PatclassError::Schema`] if the label column is missing
    /// * [`PatclassError::FormatError`] if a label is not an integer
    /// * [`PatclassError::UnsupportedLabelCardinality`] unless labels are exactly {0, 1}
    pub fn balance<R: Rng + ?Sized>(&self, dataset: &Dataset, rng: &mut R) -> Result<BalancedDataset> {
        if dataset.is_empty() {
            return Err(PatclassError::empty_input("cannot balance an empty dataset"));
        }

        let labels = dataset.labels(&self.label_column)?;
        let counts = ClassCounts::from_labels(&labels)?;
        let per_class = counts.minority();

        if counts.is_balanced() {
            info!(per_class, "dataset already balanced");
            return Ok(BalancedDataset {
                dataset: dataset.clone(),
                before: counts,
                per_class,
            });
        }

        let minority_label = usize::from(counts.positive < counts.negative);
        let (minority, majority): (Vec<usize>, Vec<usize>) =
            (0..labels.len()).partition(|&i| labels[i] == minority_label);

        let mut sampled: Vec<usize> = index::sample(rng, majority.len(), per_class)
            .into_iter()
            .map(|i| majority[i])
            .collect();
        sampled.sort_unstable();

        let mut order = minority;
        order.extend(sampled);
        if self.shuffle {
            order.shuffle(rng);
        }

        info!(
            negative = counts.negative,
            positive = counts.positive,
            per_class,
            ratio = counts.imbalance_ratio(),
            "downsampled majority class"
        );

        Ok(BalancedDataset {
            dataset: dataset.take(&order),
            before: counts,
            per_class,
        })
    }
}
