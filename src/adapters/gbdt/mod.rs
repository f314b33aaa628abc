//! Gradient-boosted tree ensemble: Implementation of BinaryClassifier.
//!
//! Evaluates a binary-objective tree ensemble exported as JSON by the
//! training pipeline. Each tree is a flat node array; a split sends `x <=
//! threshold` left and NaN to its default side. The ensemble's raw score is
//! `base_score + sum(leaves)` and the positive-class probability is its
//! logistic sigmoid.

use serde::{Deserialize, Serialize};

use crate::ports::{BinaryClassifier, ClassifierError, ModelMetadata};

/// Only export format understood by this adapter.
pub const FORMAT_VERSION: u32 = 1;

fn default_true() -> bool {
    true
}

/// A decision tree node (split or leaf).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        /// Column index into the feature row
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        /// Side taken when the feature value is NaN
        #[serde(default = "default_true")]
        default_left: bool,
    },
    Leaf {
        leaf: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    fn eval(&self, row: &[f64]) -> f64 {
        let mut idx = 0usize;
        loop {
            // Structure is validated at load: children are in range and
            // strictly after their parent, so this terminates.
            match &self.nodes[idx] {
                Node::Leaf { leaf } => return *leaf,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    default_left,
                } => {
                    let x = row[*feature];
                    let go_left = if x.is_nan() {
                        *default_left
                    } else {
                        x <= *threshold
                    };
                    idx = if go_left { *left } else { *right };
                }
            }
        }
    }

    fn validate(&self, tree_idx: usize, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err(format!("tree {tree_idx} has no nodes"));
        }

        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Leaf { leaf } => {
                    if !leaf.is_finite() {
                        return Err(format!("tree {tree_idx} node {i}: leaf is not finite"));
                    }
                }
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    if *feature >= n_features {
                        return Err(format!(
                            "tree {tree_idx} node {i}: feature {feature} >= n_features {n_features}"
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(format!(
                            "tree {tree_idx} node {i}: threshold is not finite"
                        ));
                    }
                    for child in [*left, *right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(format!(
                                "tree {tree_idx} node {i}: child index {child} is invalid"
                            ));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Serialized ensemble as written by the training pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GbdtModel {
    pub format_version: u32,
    pub objective: String,
    pub n_features: usize,
    #[serde(default)]
    pub base_score: f64,
    pub trees: Vec<Tree>,
    #[serde(default)]
    pub metadata: Option<ModelMetadata>,
}

/// Validated tree ensemble ready for scoring.
#[derive(Debug, Clone)]
pub struct GbdtClassifier {
    model: GbdtModel,
}

impl GbdtClassifier {
    /// Validate an exported model.
    ///
    /// # Errors
    /// Returns a description of the first structural problem found.
    pub fn from_model(model: GbdtModel) -> Result<Self, String> {
        if model.format_version != FORMAT_VERSION {
            return Err(format!(
                "unsupported format_version {} (expected {FORMAT_VERSION})",
                model.format_version
            ));
        }
        if model.objective != "binary" {
            return Err(format!(
                "unsupported objective '{}' (expected 'binary')",
                model.objective
            ));
        }
        if model.n_features == 0 {
            return Err("n_features must be greater than 0".into());
        }
        if !model.base_score.is_finite() {
            return Err("base_score is not finite".into());
        }
        if model.trees.is_empty() {
            return Err("model has no trees".into());
        }
        for (i, tree) in model.trees.iter().enumerate() {
            tree.validate(i, model.n_features)?;
        }

        Ok(Self { model })
    }

    /// Parse and validate a JSON export.
    ///
    /// # Errors
    /// Returns a description of the parse or validation failure.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let model: GbdtModel = serde_json::from_str(json).map_err(|e| e.to_string())?;
        Self::from_model(model)
    }

    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.model.trees.len()
    }

    #[must_use]
    pub fn metadata(&self) -> Option<&ModelMetadata> {
        self.model.metadata.as_ref()
    }

    /// Sum of base score and every tree's leaf.
    ///
    /// # Errors
    /// Returns `ClassifierError::FeatureCount` on a row of the wrong width.
    pub fn raw_score(&self, row: &[f64]) -> Result<f64, ClassifierError> {
        if row.len() != self.model.n_features {
            return Err(ClassifierError::FeatureCount {
                expected: self.model.n_features,
                actual: row.len(),
            });
        }

        Ok(self
            .model
            .trees
            .iter()
            .fold(self.model.base_score, |acc, tree| acc + tree.eval(row)))
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl BinaryClassifier for GbdtClassifier {
    fn n_features(&self) -> usize {
        self.model.n_features
    }

    fn predict_proba(&self, row: &[f64]) -> Result<[f64; 2], ClassifierError> {
        let p = sigmoid(self.raw_score(row)?);
        if !p.is_finite() {
            return Err(ClassifierError::InvalidOutput(
                "probability is not finite".into(),
            ));
        }
        Ok([1.0 - p, p])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(feature: usize, threshold: f64, left: usize, right: usize) -> Node {
        Node::Split {
            feature,
            threshold,
            left,
            right,
            default_left: true,
        }
    }

    fn leaf(value: f64) -> Node {
        Node::Leaf { leaf: value }
    }

    fn stump(feature: usize, threshold: f64, lo: f64, hi: f64) -> Tree {
        Tree {
            nodes: vec![split(feature, threshold, 1, 2), leaf(lo), leaf(hi)],
        }
    }

    fn model(trees: Vec<Tree>, n_features: usize) -> GbdtModel {
        GbdtModel {
            format_version: FORMAT_VERSION,
            objective: "binary".into(),
            n_features,
            base_score: 0.0,
            trees,
            metadata: None,
        }
    }

    #[test]
    fn test_threshold_boundary_goes_left() {
        let clf = GbdtClassifier::from_model(model(vec![stump(0, 50.0, -1.0, 1.0)], 1))
            .expect("valid");
        assert_eq!(clf.raw_score(&[30.0]).unwrap(), -1.0);
        assert_eq!(clf.raw_score(&[50.0]).unwrap(), -1.0);
        assert_eq!(clf.raw_score(&[50.1]).unwrap(), 1.0);
    }

    #[test]
    fn test_nan_follows_default_side() {
        let mut tree = stump(0, 0.5, -1.0, 1.0);
        let clf = GbdtClassifier::from_model(model(vec![tree.clone()], 1)).expect("valid");
        assert_eq!(clf.raw_score(&[f64::NAN]).unwrap(), -1.0);

        if let Node::Split { default_left, .. } = &mut tree.nodes[0] {
            *default_left = false;
        }
        let clf = GbdtClassifier::from_model(model(vec![tree], 1)).expect("valid");
        assert_eq!(clf.raw_score(&[f64::NAN]).unwrap(), 1.0);
    }

    #[test]
    fn test_scores_sum_and_sigmoid() {
        let mut m = model(
            vec![stump(0, 0.5, -0.5, 0.5), stump(1, 10.0, -0.25, 0.25)],
            2,
        );
        m.base_score = 0.25;
        let clf = GbdtClassifier::from_model(m).expect("valid");

        assert!((clf.raw_score(&[1.0, 20.0]).unwrap() - 1.0).abs() < 1e-12);
        let [neg, pos] = clf.predict_proba(&[0.0, 0.0]).unwrap();
        // 0.25 - 0.5 - 0.25 = -0.5
        assert!((pos - sigmoid(-0.5)).abs() < 1e-12);
        assert!((neg + pos - 1.0).abs() < 1e-12);
        assert_eq!(clf.predict(&[0.0, 0.0]).unwrap(), 0);
        assert_eq!(clf.predict(&[1.0, 20.0]).unwrap(), 1);
    }

    #[test]
    fn test_wrong_width_is_rejected() {
        let clf = GbdtClassifier::from_model(model(vec![stump(0, 0.5, 0.0, 1.0)], 2))
            .expect("valid");
        assert!(matches!(
            clf.predict_proba(&[1.0]),
            Err(ClassifierError::FeatureCount {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_validation_rejects_bad_structure() {
        // Cycle back to the root.
        let cyclic = Tree {
            nodes: vec![split(0, 0.5, 1, 0), leaf(1.0)],
        };
        assert!(GbdtClassifier::from_model(model(vec![cyclic], 1)).is_err());

        // Feature index outside the row.
        assert!(GbdtClassifier::from_model(model(vec![stump(3, 0.5, 0.0, 1.0)], 2)).is_err());

        // Child index past the end.
        let dangling = Tree {
            nodes: vec![split(0, 0.5, 1, 5), leaf(1.0)],
        };
        assert!(GbdtClassifier::from_model(model(vec![dangling], 1)).is_err());

        assert!(GbdtClassifier::from_model(model(vec![], 1)).is_err());
        assert!(GbdtClassifier::from_model(model(vec![Tree { nodes: vec![] }], 1)).is_err());

        let mut multiclass = model(vec![stump(0, 0.5, 0.0, 1.0)], 1);
        multiclass.objective = "multiclass".into();
        assert!(GbdtClassifier::from_model(multiclass).is_err());
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "format_version": 1,
            "objective": "binary",
            "n_features": 2,
            "base_score": -0.1,
            "trees": [
                {"nodes": [
                    {"feature": 1, "threshold": 2.5, "left": 1, "right": 2},
                    {"leaf": -0.4},
                    {"leaf": 0.6}
                ]}
            ],
            "metadata": {"algorithm": "LightGBM", "metrics": {"accuracy": 0.86, "precision": 0.84, "recall": 0.87, "f1": 0.85}}
        }"#;
        let clf = GbdtClassifier::from_json(json).expect("parse");
        assert_eq!(clf.n_trees(), 1);
        assert_eq!(clf.n_features(), 2);
        assert!((clf.raw_score(&[0.0, 3.0]).unwrap() - 0.5).abs() < 1e-12);
        let metrics = clf.metadata().and_then(|m| m.metrics).expect("metrics");
        assert!((metrics.recall - 0.87).abs() < f64::EPSILON);

        assert!(GbdtClassifier::from_json("{not json").is_err());
    }
}
