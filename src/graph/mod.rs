//! Undirected similarity graph over locations.

pub mod builder;

use petgraph::{
    graph::{NodeIndex, UnGraph},
    visit::EdgeRef,
};

use crate::table::{AttributeValues, Location};

pub use builder::build_graph;

/// Attributes carried by a graph node, copied from its table row.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
    pub location: Location,
    pub values: AttributeValues,
}

/// Weighted undirected graph without self-loops or parallel edges.
///
/// Node indices follow table order and are the keys every analysis result
/// is indexed by. The structure is frozen once built.
#[derive(Debug, Clone, Default)]
pub struct SimilarityGraph {
    graph: UnGraph<NodeData, f64>,
}

impl SimilarityGraph {
    pub(crate) fn from_inner(graph: UnGraph<NodeData, f64>) -> Self {
        SimilarityGraph { graph }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeData> {
        self.graph.node_indices().map(move |i| &self.graph[i])
    }

    #[cfg(test)]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.graph
            .node_indices()
            .find(|&i| self.graph[i].location.name == name)
            .map(|i| i.index())
    }

    /// Neighbours of `idx` with edge weights, ordered by index.
    pub fn neighbors(&self, idx: usize) -> Vec<(usize, f64)> {
        let node = NodeIndex::new(idx);
        let mut neighbors: Vec<(usize, f64)> = self
            .graph
            .edges(node)
            .map(|e| {
                let other = if e.source() == node { e.target() } else { e.source() };
                (other.index(), *e.weight())
            })
            .collect();
        neighbors.sort_by_key(|(i, _)| *i);

        neighbors
    }

    /// Edge weight between two named nodes, if they are linked.
    #[cfg(test)]
    pub fn edge_weight(&self, a: &str, b: &str) -> Option<f64> {
        let a = NodeIndex::new(self.index_of(a)?);
        let b = NodeIndex::new(self.index_of(b)?);
        self.graph.find_edge(a, b).map(|e| self.graph[e])
    }

    /// All edges as `(lower index, higher index, weight)`, sorted.
    pub fn edge_list(&self) -> Vec<(usize, usize, f64)> {
        let mut edges: Vec<(usize, usize, f64)> = self
            .graph
            .edge_references()
            .map(|e| {
                let (a, b) = (e.source().index(), e.target().index());
                (a.min(b), a.max(b), *e.weight())
            })
            .collect();
        edges.sort_by(|x, y| (x.0, x.1).cmp(&(y.0, y.1)));

        edges
    }
}
