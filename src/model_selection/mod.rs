//! Train/test splitting.
//!
//! Randomness always comes from a caller-owned generator, so a pipeline
//! seeded once reproduces the same partition on every run.

use crate::data::Dataset;
use crate::error::{PatclassError, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{info, warn};

/// Disjoint train and test subsets of one dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Dataset,
    pub test: Dataset,
    /// Source row of every train row
    pub train_indices: Vec<usize>,
    /// Source row of every test row
    pub test_indices: Vec<usize>,
}

/// Number of test rows for a dataset of `n_samples`: `round(test_fraction * n)`.
///
/// # Errors
///
/// Returns [`PatclassError::InvalidFraction`] unless `0 < test_fraction < 1`.
pub fn test_size(n_samples: usize, test_fraction: f64) -> Result<usize> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(PatclassError::InvalidFraction {
            value: test_fraction,
        });
    }
    Ok((n_samples as f64 * test_fraction).round() as usize)
}

/// Splits a dataset into random train and test subsets.
///
/// Both subsets are in shuffled order. `|test| == round(test_fraction * |dataset|)`.
///
/// # Arguments
///
/// * `dataset` - Rows to partition
/// * `test_fraction` - Proportion of rows for the test subset, in (0, 1)
/// * `rng` - Seeded generator
///
/// # Errors
///
/// Returns [`PatclassError::InvalidFraction`] for a fraction outside (0, 1).
///
/// # Example
///
/// ```rust
/// use patclass::data::Dataset;
/// use patclass::model_selection::train_test_split;
/// use rand::SeedableRng;
///
/// let rows = (0..10).map(|i| vec![Some(i.to_string())]).collect();
/// let ds = Dataset::new(vec!["id".to_string()], rows).unwrap();
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(42);
/// let split = train_test_split(&ds, 0.2, &mut rng).unwrap();
/// assert_eq!(split.train.n_rows(), 8);
/// assert_eq!(split.test.n_rows(), 2);
/// ```
pub fn train_test_split<R: Rng + ?Sized>(
    dataset: &Dataset,
    test_fraction: f64,
    rng: &mut R,
) -> Result<TrainTestSplit> {
    let n_samples = dataset.n_rows();
    let n_test = test_size(n_samples, test_fraction)?;
    let n_train = n_samples - n_test;

    if n_samples > 0 && (n_test == 0 || n_train == 0) {
        warn!(
            n_samples,
            n_train, n_test, "split leaves one subset empty"
        );
    }

    let indices = shuffle_indices(n_samples, rng);
    let (train_indices, test_indices) = indices.split_at(n_train);

    info!(n_train, n_test, test_fraction, "split dataset");
    Ok(TrainTestSplit {
        train: dataset.take(train_indices),
        test: dataset.take(test_indices),
        train_indices: train_indices.to_vec(),
        test_indices: test_indices.to_vec(),
    })
}

/// Shuffles `0..n_samples` with the given generator.
pub fn shuffle_indices<R: Rng + ?Sized>(n_samples: usize, rng: &mut R) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n_samples).collect();
    indices.shuffle(rng);
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn numbered(n: usize) -> Dataset {
        let rows = (0..n).map(|i| vec![Some(i.to_string())]).collect();
        Dataset::new(vec!["id".to_string()], rows).expect("valid")
    }

    fn ids(ds: &Dataset) -> Vec<String> {
        ds.column("id")
            .expect("id")
            .into_iter()
            .map(|c| c.unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn test_train_test_split_basic() {
        let ds = numbered(10);
        let split = train_test_split(&ds, 0.2, &mut StdRng::seed_from_u64(42)).expect("split");
        assert_eq!(split.train.n_rows(), 8, "Training set should have 8 samples");
        assert_eq!(split.test.n_rows(), 2, "Test set should have 2 samples");
    }

    #[test]
    fn test_split_is_a_partition() {
        let ds = numbered(37);
        let split = train_test_split(&ds, 0.3, &mut StdRng::seed_from_u64(5)).expect("split");

        let train: HashSet<String> = ids(&split.train).into_iter().collect();
        let test: HashSet<String> = ids(&split.test).into_iter().collect();
        assert!(train.is_disjoint(&test));
        assert_eq!(train.len() + test.len(), 37);
        assert_eq!(test.len(), 11); // round(11.1)
    }

    #[test]
    fn test_indices_match_rows() {
        let ds = numbered(12);
        let split = train_test_split(&ds, 0.25, &mut StdRng::seed_from_u64(9)).expect("split");
        assert_eq!(split.test, ds.take(&split.test_indices));
        assert_eq!(split.train, ds.take(&split.train_indices));
    }

    #[test]
    fn test_train_test_split_reproducibility() {
        let ds = numbered(20);
        let a = train_test_split(&ds, 0.2, &mut StdRng::seed_from_u64(42)).expect("split");
        let b = train_test_split(&ds, 0.2, &mut StdRng::seed_from_u64(42)).expect("split");
        assert_eq!(a, b);
    }

    #[test]
    fn test_train_test_split_different_seeds() {
        let ds = numbered(50);
        let a = train_test_split(&ds, 0.2, &mut StdRng::seed_from_u64(1)).expect("split");
        let b = train_test_split(&ds, 0.2, &mut StdRng::seed_from_u64(2)).expect("split");
        assert_ne!(a.test_indices, b.test_indices);
    }

    #[test]
    fn test_invalid_fraction() {
        let ds = numbered(10);
        for fraction in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
            let err = train_test_split(&ds, fraction, &mut StdRng::seed_from_u64(42)).unwrap_err();
            assert!(
                matches!(err, PatclassError::InvalidFraction { .. }),
                "fraction {fraction} should be rejected"
            );
        }
    }

    #[test]
    fn test_rounding_to_empty_test_set() {
        let ds = numbered(2);
        let split = train_test_split(&ds, 0.2, &mut StdRng::seed_from_u64(42)).expect("split");
        assert_eq!(split.test.n_rows(), 0);
        assert_eq!(split.train.n_rows(), 2);
    }

    #[test]
    fn test_size_rounding() {
        assert_eq!(test_size(10, 0.25).expect("valid"), 3); // 2.5 rounds away from zero
        assert_eq!(test_size(0, 0.5).expect("valid"), 0);
    }
}
