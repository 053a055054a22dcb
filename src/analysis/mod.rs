//! Structural metrics over a similarity graph.
//!
//! Each measure reads the frozen graph and returns its own vector indexed by
//! node; nothing is written back into the graph. The result assembler merges
//! them per node.

pub mod centrality;
pub mod community;
pub mod pagerank;

pub use centrality::{betweenness, closeness};
pub use community::{greedy_modularity, CommunityPartition};
pub use pagerank::{pagerank, PageRankParams};

use crate::{config::AnalysisConfig, graph::SimilarityGraph};

/// Every per-node measure, each indexed like the graph's nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeMetrics {
    pub betweenness: Vec<f64>,
    pub closeness: Vec<f64>,
    pub pagerank: Vec<f64>,
    pub communities: CommunityPartition,
}

pub fn analyze(graph: &SimilarityGraph, config: &AnalysisConfig) -> NodeMetrics {
    let params = PageRankParams {
        damping: config.pagerank_damping,
        max_iterations: config.pagerank_max_iterations,
        tolerance: config.pagerank_tolerance,
    };

    let metrics = NodeMetrics {
        betweenness: betweenness(graph, config.centrality),
        closeness: closeness(graph, config.centrality),
        pagerank: pagerank(graph, params),
        communities: greedy_modularity(graph, config.community),
    };

    log::info!(
        "Found {} communities (modularity {:.4})",
        metrics.communities.community_count(),
        metrics.communities.modularity
    );

    metrics
}
