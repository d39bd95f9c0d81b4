//! Tests for classification module.

use super::*;

fn config(epochs: usize) -> TrainingConfig {
    TrainingConfig {
        num_epochs: epochs,
        batch_size: 4,
        weight_decay: 0.0,
        learning_rate: 1.0,
        seed: 7,
    }
}

#[test]
fn test_sigmoid() {
    assert!((LogisticRegression::sigmoid(0.0) - 0.5).abs() < 1e-6);
    assert!(LogisticRegression::sigmoid(10.0) > 0.99);
    assert!(LogisticRegression::sigmoid(-10.0) < 0.01);
}

#[test]
fn test_sparse_rows_bag_of_tokens() {
    let x = EncodedFeatures::token_ids(vec![vec![2, 3, 2, 0, 0]], 4).expect("valid");
    let rows = LogisticRegression::sparse_rows(&x);
    assert_eq!(rows.len(), 1);
    let mut row = rows[0].clone();
    row.sort_by_key(|(f, _)| *f);
    assert_eq!(row.len(), 2);
    assert_eq!(row[0].0, 2);
    assert!((row[0].1 - 2.0 / 3.0).abs() < 1e-6);
    assert!((row[1].1 - 1.0 / 3.0).abs() < 1e-6);
}

#[test]
fn test_all_padding_row_is_empty() {
    let x = EncodedFeatures::token_ids(vec![vec![0, 0, 0]], 2).expect("valid");
    assert!(LogisticRegression::sparse_rows(&x)[0].is_empty());
}

#[test]
fn test_learns_separable_categories() {
    let x = EncodedFeatures::categories(vec![0, 1, 2, 0, 1, 2, 0, 1], 3).expect("valid");
    let y = vec![1, 0, 1, 1, 0, 1, 1, 0];
    let clf = LogisticRegression::new();
    let model = clf.fit(&x, &y, &config(100)).expect("fit");
    assert_eq!(clf.predict(&model, &x).expect("predict"), y);
    assert_eq!(model.n_features(), 3);
    assert_eq!(model.kind, FeatureKind::Categories);
}

#[test]
fn test_learns_separable_tokens() {
    // id 2 marks positives, id 3 negatives, id 4 is shared noise
    let x = EncodedFeatures::token_ids(
        vec![
            vec![2, 4, 0, 0],
            vec![3, 4, 0, 0],
            vec![2, 2, 4, 0],
            vec![3, 3, 4, 0],
            vec![2, 0, 0, 0],
            vec![3, 0, 0, 0],
        ],
        5,
    )
    .expect("valid");
    let y = vec![1, 0, 1, 0, 1, 0];
    let clf = LogisticRegression::new();
    let model = clf.fit(&x, &y, &config(200)).expect("fit");
    assert_eq!(clf.predict(&model, &x).expect("predict"), y);
}

#[test]
fn test_loss_decreases() {
    let x = EncodedFeatures::categories(vec![0, 1, 0, 1], 2).expect("valid");
    let y = vec![0, 1, 0, 1];
    let model = LogisticRegression::new()
        .fit(&x, &y, &config(20))
        .expect("fit");
    assert_eq!(model.loss_history.len(), 20);
    let first = model.loss_history[0];
    let last = model.loss_history[19];
    assert!(last < first, "loss went from {first} to {last}");
}

#[test]
fn test_fit_is_deterministic_per_seed() {
    let x = EncodedFeatures::categories(vec![0, 1, 2, 1, 0, 2, 1], 3).expect("valid");
    let y = vec![0, 1, 1, 0, 0, 1, 1];
    let clf = LogisticRegression::new();
    let cfg = TrainingConfig {
        batch_size: 2,
        ..TrainingConfig::default()
    };
    let a = clf.fit(&x, &y, &cfg).expect("fit");
    let b = clf.fit(&x, &y, &cfg).expect("fit");
    assert_eq!(a, b);
}

#[test]
fn test_weight_decay_shrinks_weights() {
    let x = EncodedFeatures::categories(vec![0, 1, 0, 1], 2).expect("valid");
    let y = vec![0, 1, 0, 1];
    let clf = LogisticRegression::new();
    let free = clf.fit(&x, &y, &config(30)).expect("fit");
    let decayed = clf
        .fit(
            &x,
            &y,
            &TrainingConfig {
                weight_decay: 0.5,
                ..config(30)
            },
        )
        .expect("fit");
    let norm = |m: &LogisticModel| m.weights.iter().map(|w| w * w).sum::<f32>();
    assert!(norm(&decayed) < norm(&free));
}

#[test]
fn test_fit_rejects_bad_inputs() {
    let clf = LogisticRegression::new();
    let x = EncodedFeatures::categories(vec![0, 1], 2).expect("valid");

    assert!(matches!(
        clf.fit(&x, &[0], &config(1)),
        Err(PatclassError::LengthMismatch { .. })
    ));
    assert!(matches!(
        clf.fit(&x, &[0, 2], &config(1)),
        Err(PatclassError::UnsupportedLabelCardinality { .. })
    ));
    assert!(matches!(
        clf.fit(&x, &[0, 1], &config(0)),
        Err(PatclassError::InvalidHyperparameter { .. })
    ));

    let empty = EncodedFeatures::categories(Vec::new(), 2).expect("valid");
    assert!(matches!(
        clf.fit(&empty, &[], &config(1)),
        Err(PatclassError::EmptyInput { .. })
    ));
}

#[test]
fn test_predict_rejects_incompatible_features() {
    let clf = LogisticRegression::new();
    let x = EncodedFeatures::categories(vec![0, 1], 2).expect("valid");
    let model = clf.fit(&x, &[0, 1], &config(1)).expect("fit");

    let wider = EncodedFeatures::categories(vec![2], 3).expect("valid");
    assert!(matches!(
        clf.predict(&model, &wider),
        Err(PatclassError::Classifier(_))
    ));

    let tokens = EncodedFeatures::token_ids(vec![vec![1]], 2).expect("valid");
    assert!(matches!(
        clf.predict(&model, &tokens),
        Err(PatclassError::Classifier(_))
    ));
}

#[test]
fn test_threshold_controls_labels() {
    let model = LogisticModel {
        kind: FeatureKind::Categories,
        weights: vec![0.0, 0.0],
        intercept: 0.0,
        loss_history: Vec::new(),
    };
    let x = EncodedFeatures::categories(vec![0, 1], 2).expect("valid");
    assert_eq!(
        LogisticRegression::new().predict(&model, &x).expect("predict"),
        vec![1, 1]
    );
    assert_eq!(
        LogisticRegression::new()
            .with_threshold(0.6)
            .predict(&model, &x)
            .expect("predict"),
        vec![0, 0]
    );
}

#[test]
fn test_model_serde() {
    let x = EncodedFeatures::categories(vec![0, 1], 2).expect("valid");
    let model = LogisticRegression::new()
        .fit(&x, &[0, 1], &config(2))
        .expect("fit");
    let json = serde_json::to_string(&model).expect("serialize");
    let back: LogisticModel = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, model);
}
