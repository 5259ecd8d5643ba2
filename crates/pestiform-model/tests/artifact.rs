use pestiform_model::{Classifier, DecisionTree, ModelError};
use std::io::Write;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/stump.json");

fn row(exact_mol_wt: f64, xlogp: f64) -> Vec<f64> {
    let mut row = vec![0.0; 53];
    row[0] = exact_mol_wt;
    row[22] = xlogp;
    row
}

#[test]
fn test_load_fixture() {
    let tree = DecisionTree::load(FIXTURE).unwrap();
    assert_eq!(tree.n_features(), 53);
    assert_eq!(tree.node_count(), 5);
    assert_eq!(tree.classes(), &[1, 2]);

    let names = tree.feature_names().unwrap();
    assert_eq!(names[0], "ExactMolWt");
    assert_eq!(names[22], "XLogP");
    assert_eq!(names[52], "ConformerCount3D");
}

#[test]
fn test_fixture_predictions() {
    let tree = DecisionTree::load(FIXTURE).unwrap();
    assert_eq!(tree.predict(&row(180.04, 1.2)).unwrap(), 2);
    assert_eq!(tree.predict(&row(352.97, 3.0)).unwrap(), 1);
    assert_eq!(tree.predict(&row(352.97, 6.9)).unwrap(), 2);
}

#[test]
fn test_missing_file() {
    let err = DecisionTree::load("/nonexistent/model_DT.json").unwrap_err();
    assert!(matches!(err, ModelError::Io { .. }));
}

#[test]
fn test_corrupt_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"\x80\x04\x95 not json").unwrap();
    let err = DecisionTree::load(file.path()).unwrap_err();
    assert!(matches!(err, ModelError::Io { .. } | ModelError::Decode(_)));
}

#[test]
fn test_reload_is_equal() {
    let tree = DecisionTree::load(FIXTURE).unwrap();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(serde_json::to_string(&tree).unwrap().as_bytes()).unwrap();
    assert_eq!(DecisionTree::load(file.path()).unwrap(), tree);
}
