//! Greedy modularity communities (Clauset-Newman-Moore).
//!
//! Every node starts alone. The pair of linked communities whose merge
//! raises modularity the most is merged, until no merge raises it. Equal
//! gains go to the lowest `(lower index, higher index)` pair and the merged
//! community keeps the lower index, so the result depends only on node
//! order.

use std::collections::BTreeMap;

use crate::{config::CommunityWeighting, graph::SimilarityGraph};

/// Community id per node plus the modularity of the partition.
#[derive(Debug, Clone, PartialEq)]
pub struct CommunityPartition {
    /// Dense ids; larger communities get smaller ids.
    pub membership: Vec<usize>,
    pub modularity: f64,
}

impl CommunityPartition {
    pub fn community_count(&self) -> usize {
        self.membership.iter().max().map_or(0, |m| m + 1)
    }
}

fn edge_weight(weighting: CommunityWeighting, weight: f64) -> f64 {
    match weighting {
        CommunityWeighting::Unweighted => 1.0,
        CommunityWeighting::Weighted => weight,
    }
}

pub fn greedy_modularity(
    graph: &SimilarityGraph,
    weighting: CommunityWeighting,
) -> CommunityPartition {
    let n = graph.node_count();
    let edges: Vec<(usize, usize, f64)> = graph
        .edge_list()
        .into_iter()
        .map(|(a, b, w)| (a, b, edge_weight(weighting, w)))
        .collect();
    let total: f64 = edges.iter().map(|e| e.2).sum();

    // Communities keyed by their lowest member.
    let mut members: BTreeMap<usize, Vec<usize>> = (0..n).map(|i| (i, vec![i])).collect();

    if total > 0.0 {
        let mut share = vec![0.0; n];
        for &(a, b, w) in &edges {
            share[a] += w / (2.0 * total);
            share[b] += w / (2.0 * total);
        }

        let mut gain: BTreeMap<usize, BTreeMap<usize, f64>> = BTreeMap::new();
        for &(a, b, w) in &edges {
            let dq = w / total - 2.0 * share[a] * share[b];
            gain.entry(a).or_default().insert(b, dq);
            gain.entry(b).or_default().insert(a, dq);
        }

        while let Some((i, j, dq)) = best_merge(&gain) {
            if dq <= 0.0 {
                break;
            }
            log::debug!("Merging community {} into {} (gain {:.6})", j, i, dq);
            merge(&mut gain, &mut share, i, j);
            let absorbed = members.remove(&j).unwrap_or_default();
            members.entry(i).or_default().extend(absorbed);
        }
    }

    let mut communities: Vec<Vec<usize>> = members.into_values().collect();
    communities.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a[0].cmp(&b[0])));

    let mut membership = vec![0; n];
    for (id, community) in communities.iter().enumerate() {
        for &node in community {
            membership[node] = id;
        }
    }

    CommunityPartition {
        modularity: modularity(graph, &membership, weighting),
        membership,
    }
}

/// Largest gain, scanning pairs in ascending order so the first maximum wins.
fn best_merge(gain: &BTreeMap<usize, BTreeMap<usize, f64>>) -> Option<(usize, usize, f64)> {
    let mut best: Option<(usize, usize, f64)> = None;
    for (&i, row) in gain {
        for (&j, &dq) in row.range(i + 1..) {
            if best.map_or(true, |(_, _, b)| dq > b) {
                best = Some((i, j, dq));
            }
        }
    }

    best
}

/// Folds community `j` into `i` (with `i < j`), updating every gain that
/// involves either of them.
fn merge(gain: &mut BTreeMap<usize, BTreeMap<usize, f64>>, share: &mut [f64], i: usize, j: usize) {
    let row_i = gain.remove(&i).unwrap_or_default();
    let row_j = gain.remove(&j).unwrap_or_default();

    let mut merged = BTreeMap::new();
    for &k in row_i.keys().chain(row_j.keys()) {
        if k == i || k == j || merged.contains_key(&k) {
            continue;
        }
        let dq = match (row_i.get(&k), row_j.get(&k)) {
            (Some(a), Some(b)) => a + b,
            (Some(a), None) => a - 2.0 * share[j] * share[k],
            (None, Some(b)) => b - 2.0 * share[i] * share[k],
            (None, None) => continue,
        };
        merged.insert(k, dq);
    }

    for row in gain.values_mut() {
        row.remove(&i);
        row.remove(&j);
    }
    for (&k, &dq) in &merged {
        gain.entry(k).or_default().insert(i, dq);
    }
    gain.insert(i, merged);

    share[i] += share[j];
    share[j] = 0.0;
}

/// Newman modularity of a partition; 0 for graphs without edges.
pub fn modularity(
    graph: &SimilarityGraph,
    membership: &[usize],
    weighting: CommunityWeighting,
) -> f64 {
    let edges = graph.edge_list();
    let total: f64 = edges.iter().map(|e| edge_weight(weighting, e.2)).sum();
    if total <= 0.0 {
        return 0.0;
    }

    let count = membership.iter().max().map_or(0, |m| m + 1);
    let mut internal = vec![0.0; count];
    let mut degree = vec![0.0; count];
    for &(a, b, w) in &edges {
        let w = edge_weight(weighting, w);
        degree[membership[a]] += w;
        degree[membership[b]] += w;
        if membership[a] == membership[b] {
            internal[membership[a]] += w;
        }
    }

    internal
        .iter()
        .zip(&degree)
        .map(|(l, d)| l / total - (d / (2.0 * total)).powi(2))
        .sum()
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tests::graph_from_edges;

    fn two_triangles() -> SimilarityGraph {
        graph_from_edges(
            6,
            &[
                (0, 1, 1.0),
                (1, 2, 1.0),
                (0, 2, 1.0),
                (3, 4, 1.0),
                (4, 5, 1.0),
                (3, 5, 1.0),
                (2, 3, 1.0),
            ],
        )
    }

    #[test]
    fn should_split_bridged_triangles() {
        let partition = greedy_modularity(&two_triangles(), CommunityWeighting::Unweighted);

        assert_eq!(partition.membership, vec![0, 0, 0, 1, 1, 1]);
        assert_eq!(partition.community_count(), 2);
        // Two triangles joined by one edge: 2 * (3/7 - (7/14)^2)
        assert!((partition.modularity - (6.0 / 7.0 - 0.5)).abs() < 1e-12);
    }

    #[test]
    fn should_group_linked_pair_apart_from_isolated_node() {
        let graph = graph_from_edges(3, &[(0, 1, 0.8)]);

        let partition = greedy_modularity(&graph, CommunityWeighting::Unweighted);

        assert_eq!(partition.membership[0], partition.membership[1]);
        assert_ne!(partition.membership[0], partition.membership[2]);
        assert_eq!(partition.membership, vec![0, 0, 1]);
    }

    #[test]
    fn should_keep_every_node_alone_without_edges() {
        let graph = graph_from_edges(3, &[]);
        let partition = greedy_modularity(&graph, CommunityWeighting::Unweighted);

        assert_eq!(partition.membership, vec![0, 1, 2]);
        assert_eq!(partition.modularity, 0.0);
    }

    #[test]
    fn should_handle_empty_graph() {
        let partition = greedy_modularity(&graph_from_edges(0, &[]), CommunityWeighting::Weighted);

        assert!(partition.membership.is_empty());
        assert_eq!(partition.community_count(), 0);
    }

    #[test]
    fn should_not_lower_modularity_below_singletons() {
        let graph = two_triangles();
        let singletons: Vec<usize> = (0..6).collect();

        let partition = greedy_modularity(&graph, CommunityWeighting::Unweighted);

        let baseline = modularity(&graph, &singletons, CommunityWeighting::Unweighted);
        assert!(partition.modularity > baseline);
    }

    #[test]
    fn should_respect_edge_weights_when_weighted() {
        // Path 0 - 1 - 2 - 3 with a weak middle link.
        let graph = graph_from_edges(4, &[(0, 1, 5.0), (1, 2, 0.1), (2, 3, 5.0)]);

        let partition = greedy_modularity(&graph, CommunityWeighting::Weighted);

        assert_eq!(partition.membership, vec![0, 0, 1, 1]);
    }

    #[test]
    fn should_be_deterministic() {
        let graph = two_triangles();
        let first = greedy_modularity(&graph, CommunityWeighting::Unweighted);
        let second = greedy_modularity(&graph, CommunityWeighting::Unweighted);
        assert_eq!(first, second);
    }
}
