//! Binary classification metrics with label 1 as the positive class.

use crate::error::{PatclassError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Counts of the four prediction outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub true_negatives: usize,
}

/// Returns `num / den`, or 0 when `den` is zero.
fn ratio(num: usize, den: usize) -> f32 {
    if den == 0 {
        0.0
    } else {
        num as f32 / den as f32
    }
}

impl ConfusionMatrix {
    /// Tallies outcomes over paired labels.
    ///
    /// # Errors
    ///
    /// Returns [`PatclassError::LengthMismatch`] if the slices differ in length
    /// and [`PatclassError::UnsupportedLabelCardinality`] if either holds a
    /// label other than 0 or 1.
    pub fn from_predictions(predicted: &[usize], truth: &[usize]) -> Result<Self> {
        if predicted.len() != truth.len() {
            return Err(PatclassError::LengthMismatch {
                predicted: predicted.len(),
                truth: truth.len(),
            });
        }
        if predicted.iter().chain(truth).any(|&label| label > 1) {
            let mut labels: Vec<usize> = predicted.iter().chain(truth).copied().collect();
            labels.sort_unstable();
            labels.dedup();
            return Err(PatclassError::UnsupportedLabelCardinality { labels });
        }

        let mut cm = Self::default();
        for (&p, &t) in predicted.iter().zip(truth) {
            match (p == 1, t == 1) {
                (true, true) => cm.true_positives += 1,
                (true, false) => cm.false_positives += 1,
                (false, true) => cm.false_negatives += 1,
                (false, false) => cm.true_negatives += 1,
            }
        }
        Ok(cm)
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.false_negatives + self.true_negatives
    }

    /// (TP + TN) / total
    #[must_use]
    pub fn accuracy(&self) -> f32 {
        ratio(self.true_positives + self.true_negatives, self.total())
    }

    /// TP / (TP + FP)
    #[must_use]
    pub fn precision(&self) -> f32 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    /// TP / (TP + FN)
    #[must_use]
    pub fn recall(&self) -> f32 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    /// Harmonic mean of precision and recall.
    #[must_use]
    pub fn f1(&self) -> f32 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }
}

/// Accuracy, precision, recall and F1 of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub accuracy: f32,
    pub precision: f32,
    pub recall: f32,
    pub f1: f32,
    pub confusion: ConfusionMatrix,
}

impl MetricsReport {
    /// Number of evaluated records.
    #[must_use]
    pub fn support(&self) -> usize {
        self.confusion.total()
    }
}

impl From<ConfusionMatrix> for MetricsReport {
    fn from(confusion: ConfusionMatrix) -> Self {
        Self {
            accuracy: confusion.accuracy(),
            precision: confusion.precision(),
            recall: confusion.recall(),
            f1: confusion.f1(),
            confusion,
        }
    }
}

impl fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "accuracy  {:.4}", self.accuracy)?;
        writeln!(f, "precision {:.4}", self.precision)?;
        writeln!(f, "recall    {:.4}", self.recall)?;
        write!(f, "f1        {:.4}", self.f1)
    }
}

/// Scores predicted labels against ground truth.
///
/// Zero denominators yield 0, so the result never contains NaN. An empty
/// input scores 0 everywhere.
///
/// # Errors
///
/// Returns [`PatclassError::LengthMismatch`] if the slices differ in length.
///
/// # Examples
///
/// ```
/// use patclass::metrics::evaluate;
///
/// let report = evaluate(&[1, 0, 1, 1], &[1, 0, 0, 1]).unwrap();
/// assert_eq!(report.accuracy, 0.75);
/// assert_eq!(report.recall, 1.0);
/// assert!((report.f1 - 0.8).abs() < 1e-6);
/// ```
pub fn evaluate(predicted: &[usize], truth: &[usize]) -> Result<MetricsReport> {
    ConfusionMatrix::from_predictions(predicted, truth).map(MetricsReport::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-3,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_mixed_predictions() {
        let report = evaluate(&[1, 0, 1, 1], &[1, 0, 0, 1]).expect("evaluate");
        assert_eq!(
            report.confusion,
            ConfusionMatrix {
                true_positives: 2,
                false_positives: 1,
                false_negatives: 0,
                true_negatives: 1,
            }
        );
        assert_close(report.accuracy, 0.75);
        assert_close(report.precision, 0.667);
        assert_close(report.recall, 1.0);
        assert_close(report.f1, 0.8);
        assert_eq!(report.support(), 4);
    }

    #[test]
    fn test_all_correct() {
        let truth = [1, 0, 1, 0, 1];
        let report = evaluate(&truth, &truth).expect("evaluate");
        assert_eq!(report.accuracy, 1.0);
        assert_eq!(report.precision, 1.0);
        assert_eq!(report.recall, 1.0);
        assert_eq!(report.f1, 1.0);
    }

    #[test]
    fn test_no_positives_is_zero_not_nan() {
        let report = evaluate(&[0, 0, 0], &[0, 0, 0]).expect("evaluate");
        assert_eq!(report.accuracy, 1.0);
        assert_eq!(report.precision, 0.0);
        assert_eq!(report.recall, 0.0);
        assert_eq!(report.f1, 0.0);
    }

    #[test]
    fn test_all_wrong() {
        let report = evaluate(&[1, 1, 0], &[0, 0, 1]).expect("evaluate");
        assert_eq!(report.accuracy, 0.0);
        assert_eq!(report.precision, 0.0);
        assert_eq!(report.recall, 0.0);
        assert_eq!(report.f1, 0.0);
    }

    #[test]
    fn test_empty_input() {
        let report = evaluate(&[], &[]).expect("evaluate");
        assert_eq!(report.accuracy, 0.0);
        assert_eq!(report.support(), 0);
        assert!(!report.f1.is_nan());
    }

    #[test]
    fn test_length_mismatch() {
        let err = evaluate(&[1, 0], &[1]).unwrap_err();
        assert!(matches!(
            err,
            PatclassError::LengthMismatch {
                predicted: 2,
                truth: 1
            }
        ));
    }

    #[test]
    fn test_non_binary_prediction_rejected() {
        let err = evaluate(&[1, 2, 0], &[1, 0, 0]).unwrap_err();
        match err {
            PatclassError::UnsupportedLabelCardinality { labels } => {
                assert_eq!(labels, vec![0, 1, 2]);
            }
            other => panic!("expected cardinality error, got {other:?}"),
        }
    }

    #[test]
    fn test_non_binary_truth_rejected() {
        assert!(evaluate(&[0, 1], &[0, 3]).is_err());
    }

    #[test]
    fn test_display_table() {
        let report = evaluate(&[1, 0, 1, 1], &[1, 0, 0, 1]).expect("evaluate");
        let text = report.to_string();
        assert_eq!(text.lines().count(), 4);
        assert!(text.starts_with("accuracy  0.7500"));
        assert!(text.contains("f1        0.8000"));
    }

    #[test]
    fn test_report_serializes() {
        let report = evaluate(&[1], &[1]).expect("evaluate");
        let json = serde_json::to_value(report).expect("serialize");
        assert_eq!(json["accuracy"], 1.0);
        assert_eq!(json["confusion"]["true_positives"], 1);
    }
}
