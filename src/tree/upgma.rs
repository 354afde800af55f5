use thiserror::Error;
use tracing::debug;

use crate::parsing::phylip::PhylipMatrix;
use crate::parsing::reader::ParseError;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("cannot build a tree without taxa")]
    NoTaxa,

    #[error("distance between '{0}' and '{1}' is not a finite number")]
    InvalidDistance(String, String),
}

#[derive(Debug, Clone, PartialEq)]
struct TreeNode {
    name: Option<String>,
    height: f64,
    children: Vec<(usize, f64)>,
}

/// Rooted ultrametric tree built by UPGMA
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    nodes: Vec<TreeNode>,
    root: usize,
}

impl Tree {
    /// Number of leaves
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.children.is_empty()).count()
    }

    /// Height of the root above the leaves
    pub fn height(&self) -> f64 {
        self.nodes[self.root].height
    }

    /// Render as a Newick string terminated by `;`.
    #[must_use]
    pub fn to_newick(&self) -> String {
        let mut out = String::new();
        self.write_node(self.root, &mut out);
        out.push(';');
        out
    }

    fn write_node(&self, index: usize, out: &mut String) {
        let node = &self.nodes[index];
        if let Some(name) = &node.name {
            out.push_str(&newick_label(name));
            return;
        }
        out.push('(');
        for (k, &(child, length)) in node.children.iter().enumerate() {
            if k > 0 {
                out.push(',');
            }
            self.write_node(child, out);
            out.push_str(&format!(":{length:.6}"));
        }
        out.push(')');
    }
}

/// Characters with a meaning in Newick are replaced by `_`
fn newick_label(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            '(' | ')' | '[' | ']' | ':' | ';' | ',' | '\'' => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect()
}

struct Cluster {
    node: usize,
    size: usize,
}

/// Build a UPGMA tree from a square distance matrix.
///
/// Only the upper triangle is read. At each step the two closest clusters merge into
/// a node at half their distance; distances to the merged cluster are the
/// size-weighted average of the distances to its two parts.
///
/// # Errors
///
/// Returns `TreeError::NoTaxa` on an empty matrix and `TreeError::InvalidDistance`
/// if a distance is NaN or infinite.
pub fn upgma(matrix: &PhylipMatrix) -> Result<Tree, TreeError> {
    let n = matrix.names.len();
    if n == 0 {
        return Err(TreeError::NoTaxa);
    }

    let mut dist = vec![vec![0.0f64; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = matrix.rows[i][j];
            if !d.is_finite() {
                return Err(TreeError::InvalidDistance(
                    matrix.names[i].clone(),
                    matrix.names[j].clone(),
                ));
            }
            dist[i][j] = d;
            dist[j][i] = d;
        }
    }

    let mut nodes: Vec<TreeNode> = matrix
        .names
        .iter()
        .map(|name| TreeNode {
            name: Some(name.clone()),
            height: 0.0,
            children: Vec::new(),
        })
        .collect();

    // slot i of `dist` belongs to clusters[i]; merged clusters are set to None
    let mut clusters: Vec<Option<Cluster>> = (0..n).map(|i| Some(Cluster { node: i, size: 1 })).collect();

    for _ in 1..n {
        let Some((a, b)) = closest_pair(&dist, &clusters) else {
            break;
        };
        let (Some(ca), Some(cb)) = (clusters[a].take(), clusters[b].take()) else {
            break;
        };

        let height = dist[a][b] / 2.0;
        let branch = |child: usize| (height - nodes[child].height).max(0.0);
        let children = vec![(ca.node, branch(ca.node)), (cb.node, branch(cb.node))];
        debug!("joining clusters {a} and {b} at height {height:.6}");

        nodes.push(TreeNode {
            name: None,
            height,
            children,
        });

        let size = ca.size + cb.size;
        for k in 0..n {
            if clusters[k].is_none() || k == a {
                continue;
            }
            let merged = (dist[a][k] * ca.size as f64 + dist[b][k] * cb.size as f64) / size as f64;
            dist[a][k] = merged;
            dist[k][a] = merged;
        }
        clusters[a] = Some(Cluster {
            node: nodes.len() - 1,
            size,
        });
    }

    let root = clusters
        .iter()
        .flatten()
        .map(|c| c.node)
        .next()
        .unwrap_or(nodes.len() - 1);

    Ok(Tree { nodes, root })
}

fn closest_pair(dist: &[Vec<f64>], clusters: &[Option<Cluster>]) -> Option<(usize, usize)> {
    let active: Vec<usize> = (0..clusters.len()).filter(|&i| clusters[i].is_some()).collect();
    let mut best: Option<(usize, usize)> = None;

    for (x, &i) in active.iter().enumerate() {
        for &j in &active[x + 1..] {
            if best.map_or(true, |(bi, bj)| dist[i][j] < dist[bi][bj]) {
                best = Some((i, j));
            }
        }
    }
    best
}
