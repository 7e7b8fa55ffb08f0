use kira_smncnv::math::metrics::{ConfusionMatrix, is_constant};

#[test]
fn perfect_prediction() {
    let pairs = [(0, 0), (1, 1), (2, 2), (3, 3), (4, 4), (2, 2)];
    let cm = ConfusionMatrix::from_pairs(pairs);
    assert!((cm.mcc() - 1.0).abs() < 1e-12);
    assert!((cm.accuracy() - 1.0).abs() < 1e-12);
    assert!((cm.f1_macro() - 1.0).abs() < 1e-12);
    assert_eq!(cm.total(), 6);
}

#[test]
fn constant_prediction_has_zero_mcc() {
    let cm = ConfusionMatrix::from_pairs([(0, 2), (1, 2), (2, 2)]);
    assert_eq!(cm.mcc(), 0.0);
    assert!((cm.accuracy() - 1.0 / 3.0).abs() < 1e-12);
}

#[test]
fn binary_case_matches_classic_mcc() {
    // tp=3 fn=1 fp=1 tn=3 -> (9 - 1) / sqrt(4*4*4*4) = 0.5
    let pairs = [
        (1, 1),
        (1, 1),
        (1, 1),
        (1, 2),
        (2, 1),
        (2, 2),
        (2, 2),
        (2, 2),
    ];
    let cm = ConfusionMatrix::from_pairs(pairs);
    assert!((cm.mcc() - 0.5).abs() < 1e-12);
}

#[test]
fn f1_macro_ignores_absent_classes() {
    let cm = ConfusionMatrix::from_pairs([(1, 1), (2, 1)]);
    // class 1: tp=1, t=1, p=2 -> 2/3; class 2: tp=0 -> 0
    assert!((cm.f1_macro() - (2.0 / 3.0) / 2.0).abs() < 1e-12);
}

#[test]
fn rows_are_truth() {
    let cm = ConfusionMatrix::from_pairs([(0, 4), (0, 4), (3, 1)]);
    let rows = cm.to_rows();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0][4], 2);
    assert_eq!(rows[3][1], 1);
}

#[test]
fn constant_labels() {
    assert!(is_constant(&[]));
    assert!(is_constant(&[2, 2, 2]));
    assert!(!is_constant(&[2, 3]));
}
