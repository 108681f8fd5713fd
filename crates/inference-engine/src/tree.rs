//! Regression Tree Growing
//!
//! Exact greedy CART over dense rows, shared by both ensembles. A node's
//! score is `Σ_k S_k² / (n + λ)` where `S_k` is the sum of target `k` over the
//! node's rows. With `λ = 0` the split gain equals the reduction in squared
//! error (bagged trees); with `λ > 0` and residual targets it is the
//! second-order boosting gain under squared loss, where every row has unit
//! hessian.

use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

/// Smallest gain considered an improvement
const MIN_GAIN: f64 = 1e-12;

/// Tree growing parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowerParams {
    /// Maximum depth; `None` grows until leaves are pure or too small
    pub max_depth: Option<usize>,
    /// Minimum rows required to attempt a split
    pub min_samples_split: usize,
    /// Minimum rows in each child
    pub min_samples_leaf: usize,
    /// L2 regularization on leaf values
    pub reg_lambda: f64,
}

impl Default for GrowerParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            reg_lambda: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: Vec<f64>,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

/// Fitted multi-output regression tree stored as a node arena.
///
/// Rows with `x[feature] <= threshold` go left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
    n_outputs: usize,
}

impl RegressionTree {
    /// Grow a tree on the given rows (duplicates allowed, as in bootstrap samples)
    pub fn grow(
        inputs: ArrayView2<'_, f64>,
        targets: ArrayView2<'_, f64>,
        rows: &[usize],
        params: &GrowerParams,
    ) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            n_outputs: targets.ncols(),
        };
        let mut rows = rows.to_vec();
        let grower = Grower {
            inputs,
            targets,
            params,
        };
        grower.build(&mut tree.nodes, &mut rows, 0);
        tree
    }

    /// Leaf values reached by `row`
    pub fn predict(&self, row: ArrayView1<'_, f64>) -> &[f64] {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    id = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn n_outputs(&self) -> usize {
        self.n_outputs
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    /// Length of the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], id: usize) -> usize {
            match &nodes[id] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }
}

struct Grower<'a, 'b, 'c> {
    inputs: ArrayView2<'a, f64>,
    targets: ArrayView2<'b, f64>,
    params: &'c GrowerParams,
}

impl Grower<'_, '_, '_> {
    fn build(&self, nodes: &mut Vec<Node>, rows: &mut [usize], depth: usize) -> usize {
        let sums = self.target_sums(rows);
        let id = nodes.len();
        nodes.push(Node::Leaf {
            value: self.leaf_value(&sums, rows.len()),
        });

        let depth_left = self.params.max_depth.map_or(true, |max| depth < max);
        if !depth_left || rows.len() < self.params.min_samples_split.max(2) {
            return id;
        }
        let Some(split) = self.best_split(rows, &sums) else {
            return id;
        };

        let mid = partition(rows, |r| self.inputs[[r, split.feature]] <= split.threshold);
        let (left_rows, right_rows) = rows.split_at_mut(mid);
        let left = self.build(nodes, left_rows, depth + 1);
        let right = self.build(nodes, right_rows, depth + 1);

        nodes[id] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        id
    }

    fn target_sums(&self, rows: &[usize]) -> Vec<f64> {
        let mut sums = vec![0.0; self.targets.ncols()];
        for &r in rows {
            for (s, &y) in sums.iter_mut().zip(self.targets.row(r)) {
                *s += y;
            }
        }
        sums
    }

    fn leaf_value(&self, sums: &[f64], count: usize) -> Vec<f64> {
        let denom = count as f64 + self.params.reg_lambda;
        if denom <= 0.0 {
            return vec![0.0; sums.len()];
        }
        sums.iter().map(|s| s / denom).collect()
    }

    fn score(&self, sums: impl Iterator<Item = f64>, count: usize) -> f64 {
        let denom = count as f64 + self.params.reg_lambda;
        if denom <= 0.0 {
            return 0.0;
        }
        sums.map(|s| s * s).sum::<f64>() / denom
    }

    fn best_split(&self, rows: &[usize], parent: &[f64]) -> Option<SplitCandidate> {
        let n = rows.len();
        let min_leaf = self.params.min_samples_leaf.max(1);
        let parent_score = self.score(parent.iter().copied(), n);

        let mut best: Option<SplitCandidate> = None;
        let mut order = rows.to_vec();
        let mut left = vec![0.0; parent.len()];

        for feature in 0..self.inputs.ncols() {
            let column = self.inputs.column(feature);
            order.sort_by(|&a, &b| column[a].total_cmp(&column[b]));
            left.fill(0.0);

            for i in 0..n - 1 {
                for (s, &y) in left.iter_mut().zip(self.targets.row(order[i])) {
                    *s += y;
                }

                let here = column[order[i]];
                let next = column[order[i + 1]];
                if here == next {
                    continue;
                }
                let n_left = i + 1;
                let n_right = n - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                let right = parent.iter().zip(&left).map(|(p, l)| p - l);
                let gain = self.score(left.iter().copied(), n_left) + self.score(right, n_right)
                    - parent_score;

                if gain > MIN_GAIN && best.map_or(true, |b| gain > b.gain) {
                    let mut threshold = here + (next - here) / 2.0;
                    if threshold >= next {
                        threshold = here;
                    }
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        gain,
                    });
                }
            }
        }

        best
    }
}

/// Move rows matching `goes_left` to the front; returns the boundary
fn partition(rows: &mut [usize], goes_left: impl Fn(usize) -> bool) -> usize {
    let mut mid = 0;
    for i in 0..rows.len() {
        if goes_left(rows[i]) {
            rows.swap(i, mid);
            mid += 1;
        }
    }
    mid
}
