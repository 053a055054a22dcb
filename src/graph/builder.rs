//! Turns an attribute table into a similarity graph.
//!
//! Two locations are linked when they are close on the plain (lat, lon)
//! plane and close in the primary attribute. Distance is Euclidean on raw
//! degrees, not geodesic.

use anyhow::{anyhow, Result};
use petgraph::graph::UnGraph;

use crate::{
    graph::{NodeData, SimilarityGraph},
    table::AttributeTable,
};

/// Added to the weight denominator so coincident pairs stay finite.
pub const WEIGHT_EPSILON: f64 = 1e-9;

pub fn build_graph(
    table: &AttributeTable,
    distance_threshold: f64,
    attribute_threshold: f64,
    primary_attribute: &str,
) -> Result<SimilarityGraph> {
    let rows = table.rows();
    let mut graph = UnGraph::with_capacity(rows.len(), 0);

    let mut primary = Vec::with_capacity(rows.len());
    let mut indices = Vec::with_capacity(rows.len());
    for row in rows {
        let value = row.value(primary_attribute).ok_or_else(|| {
            anyhow!(
                "Row `{}` has no primary attribute `{}`",
                row.name(),
                primary_attribute
            )
        })?;
        primary.push(value);
        indices.push(graph.add_node(NodeData {
            location: row.location.clone(),
            values: row.values.clone(),
        }));
    }

    for i in 0..rows.len() {
        for j in (i + 1)..rows.len() {
            let (a, b) = (&rows[i].location, &rows[j].location);
            let distance = euclidean((a.lat, a.lon), (b.lat, b.lon));
            let attr_diff = (primary[i] - primary[j]).abs();

            if distance < distance_threshold && attr_diff < attribute_threshold {
                let weight = 1.0 / (distance + attr_diff + WEIGHT_EPSILON);
                log::debug!("Linking `{}` - `{}` (weight {:.4})", a.name, b.name, weight);
                graph.add_edge(indices[i], indices[j], weight);
            }
        }
    }

    log::info!(
        "Built similarity graph: {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    Ok(SimilarityGraph::from_inner(graph))
}

fn euclidean(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

// -- Tests -------------------------------------------------------------------
