//! Regression tree ensembles.

use co2cast_core::LoadError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// Boosted ensemble: `base_score + Σ leaves`.
    #[default]
    Sum,
    /// Bagged ensemble: average of leaves, plus `base_score`.
    Mean,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    /// Rows with `x[feature] <= threshold` go left.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// Nodes stored root-first. Children always come after their parent, so
/// traversal strictly advances and terminates.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn new(nodes: Vec<Node>, n_features: usize) -> Result<Self, String> {
        if nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        for (id, node) in nodes.iter().enumerate() {
            match *node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= n_features {
                        return Err(format!(
                            "node {} splits on feature {} of {}",
                            id, feature, n_features
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {} has a non-finite threshold", id));
                    }
                    for child in [left, right] {
                        if child <= id || child >= nodes.len() {
                            return Err(format!("node {} has invalid child {}", id, child));
                        }
                    }
                }
                Node::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(format!("leaf {} has a non-finite value", id));
                    }
                }
            }
        }

        Ok(Self { nodes })
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut id = 0;
        loop {
            match self.nodes[id] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    id = if row[feature] <= threshold { left } else { right };
                }
            }
        }
    }

    fn count_splits(&self, counts: &mut [f64]) {
        for node in &self.nodes {
            if let Node::Split { feature, .. } = node {
                counts[*feature] += 1.0;
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Forest {
    trees: Vec<Tree>,
    aggregation: Aggregation,
    base_score: f64,
}

impl Forest {
    pub fn new(trees: Vec<Tree>, aggregation: Aggregation, base_score: f64) -> Result<Self, LoadError> {
        if trees.is_empty() {
            return Err(LoadError::Malformed("forest has no trees".to_string()));
        }
        if !base_score.is_finite() {
            return Err(LoadError::Malformed("base_score must be finite".to_string()));
        }
        Ok(Self {
            trees,
            aggregation,
            base_score,
        })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_nodes(&self) -> usize {
        self.trees.iter().map(Tree::n_nodes).sum()
    }

    /// `row` must hold one value per feature, already validated by the caller.
    pub fn predict(&self, row: &[f64]) -> f64 {
        let total: f64 = self.trees.iter().map(|t| t.predict(row)).sum();
        match self.aggregation {
            Aggregation::Sum => self.base_score + total,
            Aggregation::Mean => self.base_score + total / self.trees.len() as f64,
        }
    }

    /// Split counts per feature, normalized to sum to 1.
    pub fn split_importances(&self, n_features: usize) -> Vec<f64> {
        let mut counts = vec![0.0; n_features];
        for tree in &self.trees {
            tree.count_splits(&mut counts);
        }

        let total: f64 = counts.iter().sum();
        if total > 0.0 {
            counts.iter_mut().for_each(|c| *c /= total);
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(feature: usize, threshold: f64, left: f64, right: f64) -> Tree {
        Tree::new(
            vec![
                Node::Split {
                    feature,
                    threshold,
                    left: 1,
                    right: 2,
                },
                Node::Leaf { value: left },
                Node::Leaf { value: right },
            ],
            2,
        )
        .unwrap()
    }

    #[test]
    fn test_single_leaf_tree() {
        let tree = Tree::new(vec![Node::Leaf { value: 3.5 }], 1).unwrap();
        assert_eq!(tree.predict(&[100.0]), 3.5);
    }

    #[test]
    fn test_sum_aggregation_adds_base_score() {
        let forest = Forest::new(
            vec![stump(0, 1.0, 1.0, 2.0), stump(1, 1.0, 10.0, 20.0)],
            Aggregation::Sum,
            0.5,
        )
        .unwrap();
        assert_eq!(forest.predict(&[0.0, 5.0]), 0.5 + 1.0 + 20.0);
        assert_eq!(forest.n_nodes(), 6);
    }

    #[test]
    fn test_empty_forest_rejected() {
        assert!(Forest::new(vec![], Aggregation::Mean, 0.0).is_err());
    }

    #[test]
    fn test_self_loop_rejected() {
        let nodes = vec![Node::Split {
            feature: 0,
            threshold: 0.0,
            left: 0,
            right: 0,
        }];
        assert!(Tree::new(nodes, 1).unwrap_err().contains("invalid child"));
    }

    #[test]
    fn test_out_of_bounds_child_rejected() {
        let nodes = vec![
            Node::Split {
                feature: 0,
                threshold: 0.0,
                left: 1,
                right: 9,
            },
            Node::Leaf { value: 1.0 },
        ];
        assert!(Tree::new(nodes, 1).is_err());
    }

    #[test]
    fn test_split_importances_without_splits() {
        let forest = Forest::new(
            vec![Tree::new(vec![Node::Leaf { value: 1.0 }], 3).unwrap()],
            Aggregation::Mean,
            0.0,
        )
        .unwrap();
        assert_eq!(forest.split_importances(3), vec![0.0, 0.0, 0.0]);
    }
}
