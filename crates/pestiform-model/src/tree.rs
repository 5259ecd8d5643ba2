//! Decision tree in scikit-learn's flat array layout.
//!
//! The artifact is the JSON export of a fitted `DecisionTreeClassifier`:
//!
//! ```json
//! {
//!   "n_features": 53,
//!   "classes": [1, 2],
//!   "children_left":  [1, -1, -1],
//!   "children_right": [2, -1, -1],
//!   "feature":        [0, -2, -2],
//!   "threshold":      [250.0, -2.0, -2.0],
//!   "value":          [[4.0, 6.0], [0.0, 5.0], [4.0, 1.0]],
//!   "feature_names":  ["ExactMolWt", ...]
//! }
//! ```
//!
//! Node 0 is the root. A node is a leaf when both children are `-1`.
//! `value[i]` holds the per-class weights of node `i`, aligned with `classes`.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::ModelError;
use crate::Classifier;

const LEAF: i64 = -1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    n_features: usize,
    classes: Vec<i64>,
    children_left: Vec<i64>,
    children_right: Vec<i64>,
    feature: Vec<i64>,
    threshold: Vec<f64>,
    value: Vec<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    feature_names: Option<Vec<String>>,
}

impl DecisionTree {
    /// Read and validate a tree artifact from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tree = Self::from_json(&raw)?;
        info!(
            path = %path.display(),
            nodes = tree.node_count(),
            features = tree.n_features,
            "Loaded decision tree"
        );
        Ok(tree)
    }

    pub fn from_json(raw: &str) -> Result<Self, ModelError> {
        let tree: Self = serde_json::from_str(raw)?;
        tree.validate()?;
        Ok(tree)
    }

    pub fn node_count(&self) -> usize {
        self.children_left.len()
    }

    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    pub fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    /// Structural checks. Children must come after their parent, which is
    /// how scikit-learn numbers nodes and rules out cycles.
    pub fn validate(&self) -> Result<(), ModelError> {
        let n = self.node_count();
        if n == 0 {
            return Err(ModelError::Invalid("tree has no nodes".into()));
        }
        if self.classes.is_empty() {
            return Err(ModelError::Invalid("tree has no classes".into()));
        }
        if self.n_features == 0 {
            return Err(ModelError::Invalid("n_features must be positive".into()));
        }
        for (name, len) in [
            ("children_right", self.children_right.len()),
            ("feature", self.feature.len()),
            ("threshold", self.threshold.len()),
            ("value", self.value.len()),
        ] {
            if len != n {
                return Err(ModelError::Invalid(format!(
                    "{} has {} entries, children_left has {}",
                    name, len, n
                )));
            }
        }
        if let Some(names) = &self.feature_names {
            if names.len() != self.n_features {
                return Err(ModelError::Invalid(format!(
                    "{} feature names for {} features",
                    names.len(),
                    self.n_features
                )));
            }
        }

        for node in 0..n {
            if self.value[node].len() != self.classes.len() {
                return Err(ModelError::Invalid(format!(
                    "node {} has {} class weights, expected {}",
                    node,
                    self.value[node].len(),
                    self.classes.len()
                )));
            }

            let (left, right) = (self.children_left[node], self.children_right[node]);
            match (left == LEAF, right == LEAF) {
                (true, true) => continue,
                (false, false) => {}
                _ => return Err(ModelError::Invalid(format!("node {} has a single child", node))),
            }
            for child in [left, right] {
                let in_range = usize::try_from(child).is_ok_and(|c| c > node && c < n);
                if !in_range {
                    return Err(ModelError::Invalid(format!("node {} has bad child {}", node, child)));
                }
            }
            if !usize::try_from(self.feature[node]).is_ok_and(|f| f < self.n_features) {
                return Err(ModelError::Invalid(format!(
                    "node {} splits on feature {}",
                    node, self.feature[node]
                )));
            }
            if !self.threshold[node].is_finite() {
                return Err(ModelError::Invalid(format!("node {} has a non-finite threshold", node)));
            }
        }
        Ok(())
    }

    /// Refuse a model trained on a different column layout. Artifacts
    /// without names are accepted on width alone.
    pub fn check_feature_names(&self, schema: &[&str]) -> Result<(), ModelError> {
        if schema.len() != self.n_features {
            return Err(ModelError::FeatureCount { expected: self.n_features, found: schema.len() });
        }
        let Some(names) = &self.feature_names else {
            return Ok(());
        };
        match names.iter().zip(schema).position(|(a, b)| a != b) {
            Some(index) => Err(ModelError::SchemaMismatch {
                index,
                expected: names[index].clone(),
                found: schema[index].to_string(),
            }),
            None => Ok(()),
        }
    }

    fn leaf_for(&self, row: &[f64]) -> usize {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            let f = self.feature[node] as usize;
            // scikit-learn evaluates splits on float32 inputs
            let x = f64::from(row[f] as f32);
            let next = if x <= self.threshold[node] {
                self.children_left[node]
            } else {
                self.children_right[node]
            };
            node = next as usize;
        }
        node
    }
}

impl Classifier for DecisionTree {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, row: &[f64]) -> Result<i64, ModelError> {
        if row.len() != self.n_features {
            return Err(ModelError::FeatureCount { expected: self.n_features, found: row.len() });
        }
        if let Some(i) = row.iter().position(|v| !v.is_finite()) {
            return Err(ModelError::NonFinite(i));
        }

        let weights = &self.value[self.leaf_for(row)];
        // First maximum wins ties, as numpy's argmax does
        let best = weights
            .iter()
            .enumerate()
            .fold(0, |best, (i, w)| if *w > weights[best] { i } else { best });
        Ok(self.classes[best])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stump() -> serde_json::Value {
        json!({
            "n_features": 2,
            "classes": [1, 2],
            "children_left":  [1, -1, 3, -1, -1],
            "children_right": [2, -1, 4, -1, -1],
            "feature":        [0, -2, 1, -2, -2],
            "threshold":      [10.0, -2.0, 0.5, -2.0, -2.0],
            "value":          [[5.0, 5.0], [0.0, 3.0], [5.0, 2.0], [1.0, 2.0], [4.0, 0.0]]
        })
    }

    fn tree(v: serde_json::Value) -> Result<DecisionTree, ModelError> {
        DecisionTree::from_json(&v.to_string())
    }

    #[test]
    fn test_predict_walks_to_leaf() {
        let t = tree(stump()).unwrap();
        assert_eq!(t.predict(&[3.0, 9.0]).unwrap(), 2);
        assert_eq!(t.predict(&[10.0, 9.0]).unwrap(), 2); // <= goes left
        assert_eq!(t.predict(&[11.0, 0.0]).unwrap(), 2);
        assert_eq!(t.predict(&[11.0, 1.0]).unwrap(), 1);
    }

    #[test]
    fn test_float32_split() {
        // 10.0000001 rounds to 10.0 in f32, so it still goes left
        let t = tree(stump()).unwrap();
        assert_eq!(t.predict(&[10.000_000_1, 1.0]).unwrap(), 2);
    }

    #[test]
    fn test_tie_takes_first_class() {
        let mut v = stump();
        v["value"][1] = json!([2.0, 2.0]);
        assert_eq!(tree(v).unwrap().predict(&[0.0, 0.0]).unwrap(), 1);
    }

    #[test]
    fn test_row_width_and_nan() {
        let t = tree(stump()).unwrap();
        assert!(matches!(
            t.predict(&[1.0]).unwrap_err(),
            ModelError::FeatureCount { expected: 2, found: 1 }
        ));
        assert!(matches!(t.predict(&[1.0, f64::NAN]).unwrap_err(), ModelError::NonFinite(1)));
    }

    #[test]
    fn test_rejects_malformed_trees() {
        let mut v = stump();
        v["threshold"] = json!([10.0]);
        assert!(matches!(tree(v).unwrap_err(), ModelError::Invalid(_)));

        let mut v = stump();
        v["children_left"][2] = json!(0); // back edge
        assert!(matches!(tree(v).unwrap_err(), ModelError::Invalid(_)));

        let mut v = stump();
        v["children_right"][0] = json!(-1);
        assert!(matches!(tree(v).unwrap_err(), ModelError::Invalid(_)));

        let mut v = stump();
        v["feature"][2] = json!(7);
        assert!(matches!(tree(v).unwrap_err(), ModelError::Invalid(_)));

        let mut v = stump();
        v["value"][4] = json!([1.0]);
        assert!(matches!(tree(v).unwrap_err(), ModelError::Invalid(_)));

        assert!(matches!(tree(json!({"n_features": 2})).unwrap_err(), ModelError::Decode(_)));
    }

    #[test]
    fn test_feature_name_check() {
        let mut v = stump();
        v["feature_names"] = json!(["ExactMolWt", "XLogP"]);
        let t = tree(v).unwrap();
        assert!(t.check_feature_names(&["ExactMolWt", "XLogP"]).is_ok());
        assert!(matches!(
            t.check_feature_names(&["ExactMolWt", "TPSA"]).unwrap_err(),
            ModelError::SchemaMismatch { index: 1, .. }
        ));
        assert!(matches!(
            t.check_feature_names(&["ExactMolWt"]).unwrap_err(),
            ModelError::FeatureCount { .. }
        ));

        // Unnamed artifacts only need the right width
        let unnamed = tree(stump()).unwrap();
        assert!(unnamed.check_feature_names(&["a", "b"]).is_ok());
    }
}
