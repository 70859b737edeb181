use serde::Deserialize;
use std::{collections::HashSet, fs, path::Path};

use crate::error::ModelError;

const LEAF: i64 = -1;

/// On-disk layout of an exported gradient-boosting regressor.
#[derive(Deserialize)]
struct ArtifactJson {
    feature_names: Vec<String>,
    init: f64,
    learning_rate: f64,
    trees: Vec<TreeJson>,
}

#[derive(Deserialize)]
struct TreeJson {
    children_left: Vec<i64>,
    children_right: Vec<i64>,
    feature: Vec<i64>,
    threshold: Vec<f64>,
    value: Vec<f64>,
}

#[derive(Debug, Clone, Copy)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf(f64),
}

#[derive(Debug)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn from_json(idx: usize, t: TreeJson, n_features: usize) -> Result<Self, ModelError> {
        let n = t.children_left.len();
        if n == 0 {
            return Err(malformed(idx, "has no nodes"));
        }
        if [t.children_right.len(), t.feature.len(), t.threshold.len(), t.value.len()]
            .iter()
            .any(|&len| len != n)
        {
            return Err(malformed(idx, "node arrays differ in length"));
        }

        let mut nodes = Vec::with_capacity(n);
        for i in 0..n {
            let (l, r) = (t.children_left[i], t.children_right[i]);
            if l == LEAF && r == LEAF {
                if !t.value[i].is_finite() {
                    return Err(malformed(idx, &format!("node {} has a non-finite value", i)));
                }
                nodes.push(Node::Leaf(t.value[i]));
                continue;
            }
            // children always come after their parent, so traversal terminates
            let child = |c: i64| -> Option<usize> {
                usize::try_from(c).ok().filter(|&c| c > i && c < n)
            };
            let (Some(left), Some(right)) = (child(l), child(r)) else {
                return Err(malformed(idx, &format!("node {} has invalid children ({}, {})", i, l, r)));
            };
            let feature = usize::try_from(t.feature[i])
                .ok()
                .filter(|&f| f < n_features)
                .ok_or_else(|| {
                    malformed(idx, &format!("node {} splits on unknown feature {}", i, t.feature[i]))
                })?;
            if !t.threshold[i].is_finite() {
                return Err(malformed(idx, &format!("node {} has a non-finite threshold", i)));
            }
            nodes.push(Node::Split {
                feature,
                threshold: t.threshold[i],
                left,
                right,
            });
        }
        Ok(Self { nodes })
    }

    fn eval(&self, x: &[f64]) -> f64 {
        let mut i = 0;
        loop {
            match self.nodes[i] {
                Node::Leaf(v) => return v,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => i = if x[feature] <= threshold { left } else { right },
            }
        }
    }
}

fn malformed(tree: usize, what: &str) -> ModelError {
    ModelError::Malformed(format!("tree {} {}", tree, what))
}

/// A gradient-boosted regression tree ensemble, immutable once loaded.
#[derive(Debug)]
pub struct PricingModel {
    feature_names: Vec<String>,
    init: f64,
    learning_rate: f64,
    trees: Vec<Tree>,
}

impl PricingModel {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let txt = fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&txt)
    }

    pub fn from_json_str(txt: &str) -> Result<Self, ModelError> {
        let raw: ArtifactJson = serde_json::from_str(txt)?;

        if raw.feature_names.is_empty() {
            return Err(ModelError::Malformed("feature_names is empty".into()));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = raw.feature_names.iter().find(|n| !seen.insert(n.as_str())) {
            return Err(ModelError::Malformed(format!("duplicate feature name `{}`", dup)));
        }
        if !raw.init.is_finite() || !raw.learning_rate.is_finite() {
            return Err(ModelError::Malformed("init and learning_rate must be finite".into()));
        }

        let n_features = raw.feature_names.len();
        let trees = raw
            .trees
            .into_iter()
            .enumerate()
            .map(|(i, t)| Tree::from_json(i, t, n_features))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            feature_names: raw.feature_names,
            init: raw.init,
            learning_rate: raw.learning_rate,
            trees,
        })
    }

    /// Column order the model was trained on.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Predicts a single row. `x` must follow [`Self::feature_names`] order.
    pub fn predict(&self, x: &[f64]) -> Result<f64, ModelError> {
        if x.len() != self.feature_names.len() {
            return Err(ModelError::DimensionMismatch {
                got: x.len(),
                expected: self.feature_names.len(),
            });
        }
        if let Some(i) = x.iter().position(|v| !v.is_finite()) {
            return Err(ModelError::NonFiniteInput(self.feature_names[i].clone()));
        }

        let raw: f64 = self.trees.iter().map(|t| t.eval(x)).sum();
        let y = self.init + self.learning_rate * raw;
        if !y.is_finite() {
            return Err(ModelError::NonFiniteOutput);
        }
        Ok(y)
    }
}
