//! Betweenness and closeness centrality.
//!
//! Both are built on Brandes' single-source shortest path pass: breadth
//! first when every edge costs one hop, Dijkstra when an edge costs the
//! inverse of its similarity weight.

use std::{
    cmp::Ordering,
    collections::{BinaryHeap, VecDeque},
};

use crate::{config::CentralityWeighting, graph::SimilarityGraph};

/// Shortest path structure from one source.
struct ShortestPaths {
    /// Nodes in non-decreasing distance order.
    order: Vec<usize>,
    predecessors: Vec<Vec<usize>>,
    /// Number of shortest paths from the source.
    sigma: Vec<f64>,
    distance: Vec<Option<f64>>,
}

#[derive(Copy, Clone, PartialEq)]
struct State {
    cost: f64,
    node: usize,
}

impl Eq for State {}

// Min-heap on cost, then node index.
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn edge_cost(weighting: CentralityWeighting, weight: f64) -> f64 {
    match weighting {
        CentralityWeighting::Unweighted => 1.0,
        CentralityWeighting::InverseWeight => 1.0 / weight,
    }
}

fn shortest_paths(
    graph: &SimilarityGraph,
    source: usize,
    weighting: CentralityWeighting,
) -> ShortestPaths {
    match weighting {
        CentralityWeighting::Unweighted => breadth_first(graph, source),
        CentralityWeighting::InverseWeight => dijkstra(graph, source, weighting),
    }
}

fn breadth_first(graph: &SimilarityGraph, source: usize) -> ShortestPaths {
    let n = graph.node_count();
    let mut paths = ShortestPaths {
        order: Vec::with_capacity(n),
        predecessors: vec![Vec::new(); n],
        sigma: vec![0.0; n],
        distance: vec![None; n],
    };
    paths.sigma[source] = 1.0;
    paths.distance[source] = Some(0.0);

    let mut queue = VecDeque::from([source]);
    while let Some(v) = queue.pop_front() {
        paths.order.push(v);
        let dv = paths.distance[v].unwrap_or_default();
        for (w, _) in graph.neighbors(v) {
            if paths.distance[w].is_none() {
                paths.distance[w] = Some(dv + 1.0);
                queue.push_back(w);
            }
            if paths.distance[w] == Some(dv + 1.0) {
                paths.sigma[w] += paths.sigma[v];
                paths.predecessors[w].push(v);
            }
        }
    }

    paths
}

fn dijkstra(
    graph: &SimilarityGraph,
    source: usize,
    weighting: CentralityWeighting,
) -> ShortestPaths {
    let n = graph.node_count();
    let mut paths = ShortestPaths {
        order: Vec::with_capacity(n),
        predecessors: vec![Vec::new(); n],
        sigma: vec![0.0; n],
        distance: vec![None; n],
    };
    let mut settled = vec![false; n];
    paths.sigma[source] = 1.0;
    paths.distance[source] = Some(0.0);

    let mut heap = BinaryHeap::new();
    heap.push(State {
        cost: 0.0,
        node: source,
    });

    while let Some(State { cost, node: v }) = heap.pop() {
        if settled[v] {
            continue;
        }
        settled[v] = true;
        paths.order.push(v);

        for (w, weight) in graph.neighbors(v) {
            if settled[w] {
                continue;
            }
            let candidate = cost + edge_cost(weighting, weight);
            match paths.distance[w] {
                Some(current) if candidate > current => {}
                Some(current) if candidate == current => {
                    paths.sigma[w] += paths.sigma[v];
                    paths.predecessors[w].push(v);
                }
                _ => {
                    paths.distance[w] = Some(candidate);
                    paths.sigma[w] = paths.sigma[v];
                    paths.predecessors[w] = vec![v];
                    heap.push(State {
                        cost: candidate,
                        node: w,
                    });
                }
            }
        }
    }

    paths
}

/// Normalised betweenness: the share of shortest paths between other pairs
/// that pass through each node, scaled by `1 / ((n - 1)(n - 2))`.
///
/// Graphs with two nodes or fewer score every node 0.
pub fn betweenness(graph: &SimilarityGraph, weighting: CentralityWeighting) -> Vec<f64> {
    let n = graph.node_count();
    let mut scores = vec![0.0; n];
    if n <= 2 {
        return scores;
    }

    for source in 0..n {
        let paths = shortest_paths(graph, source, weighting);
        let mut delta = vec![0.0; n];

        for &w in paths.order.iter().rev() {
            for &v in &paths.predecessors[w] {
                delta[v] += paths.sigma[v] / paths.sigma[w] * (1.0 + delta[w]);
            }
            if w != source {
                scores[w] += delta[w];
            }
        }
    }

    let scale = 1.0 / ((n - 1) as f64 * (n - 2) as f64);
    scores.iter_mut().for_each(|s| *s *= scale);

    scores
}

/// Closeness with the Wasserman-Faust correction for disconnected graphs:
/// `(r - 1) / sum(d) * (r - 1) / (n - 1)` where `r` counts the nodes
/// reachable from (and including) each node. Nodes reaching nobody score 0.
pub fn closeness(graph: &SimilarityGraph, weighting: CentralityWeighting) -> Vec<f64> {
    let n = graph.node_count();

    (0..n)
        .map(|source| {
            let paths = shortest_paths(graph, source, weighting);
            let reached: Vec<f64> = paths.distance.iter().flatten().copied().collect();
            let total: f64 = reached.iter().sum();
            let others = (reached.len() - 1) as f64;

            if total > 0.0 && n > 1 {
                (others / total) * (others / (n - 1) as f64)
            } else {
                0.0
            }
        })
        .collect()
}

// -- Tests -------------------------------------------------------------------
