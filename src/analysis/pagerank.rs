//! Weighted PageRank by power iteration.

use crate::graph::SimilarityGraph;

#[derive(Debug, Clone, Copy)]
pub struct PageRankParams {
    pub damping: f64,
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for PageRankParams {
    fn default() -> Self {
        PageRankParams {
            damping: 0.85,
            max_iterations: 100,
            tolerance: 1e-6,
        }
    }
}

/// Stationary distribution of a damped random walk that leaves each node
/// along its edges in proportion to edge weight.
///
/// Nodes without edges hand their mass to every node uniformly, so the
/// scores of any non-empty graph sum to 1. Iteration stops once the L1
/// change drops below `n * tolerance`; if that never happens within
/// `max_iterations` the last iterate is returned.
pub fn pagerank(graph: &SimilarityGraph, params: PageRankParams) -> Vec<f64> {
    let n = graph.node_count();
    if n == 0 {
        return Vec::new();
    }

    let uniform = 1.0 / n as f64;
    let neighbors: Vec<Vec<(usize, f64)>> = (0..n).map(|i| graph.neighbors(i)).collect();
    let out_weight: Vec<f64> = neighbors
        .iter()
        .map(|edges| edges.iter().map(|(_, w)| w).sum())
        .collect();

    let mut ranks = vec![uniform; n];
    let mut converged = false;

    for iteration in 1..=params.max_iterations {
        let dangling: f64 = (0..n)
            .filter(|&i| out_weight[i] <= 0.0)
            .map(|i| ranks[i])
            .sum();
        let base = (1.0 - params.damping) * uniform + params.damping * dangling * uniform;

        let mut next = vec![base; n];
        for (u, edges) in neighbors.iter().enumerate() {
            if out_weight[u] <= 0.0 {
                continue;
            }
            for &(v, w) in edges {
                next[v] += params.damping * ranks[u] * w / out_weight[u];
            }
        }

        let change: f64 = next.iter().zip(&ranks).map(|(a, b)| (a - b).abs()).sum();
        ranks = next;

        if change < n as f64 * params.tolerance {
            log::debug!("PageRank converged after {} iterations", iteration);
            converged = true;
            break;
        }
    }

    if !converged {
        log::warn!(
            "PageRank did not converge within {} iterations",
            params.max_iterations
        );
    }

    let total: f64 = ranks.iter().sum();
    if total > 0.0 {
        ranks.iter_mut().for_each(|r| *r /= total);
    }

    ranks
}

// -- Tests -------------------------------------------------------------------
