//! Network and statistics documents handed to the serving layer, and
//! saving them to disk as JSON.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::{anyhow, Result};
use serde::{ser::SerializeMap, Serialize, Serializer};

use crate::{
    analysis::NodeMetrics,
    graph::SimilarityGraph,
    statistics::{AttributeSummary, StatisticsSummary, TopEntry},
    table::AttributeValues,
};

/// One network document entry per graph node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeRecord {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub pagerank: f64,
    pub community: usize,
    pub betweenness: f64,
    pub closeness: f64,
    /// Raw tracked values of the location, for popups and legends.
    pub attributes: AttributeValues,
}

/// Merges per-node metrics with node identity, in graph order.
pub fn network_document(
    graph: &SimilarityGraph,
    metrics: &NodeMetrics,
) -> Result<Vec<NodeRecord>> {
    let n = graph.node_count();
    let lengths = [
        metrics.pagerank.len(),
        metrics.betweenness.len(),
        metrics.closeness.len(),
        metrics.communities.membership.len(),
    ];
    if lengths.iter().any(|&len| len != n) {
        return Err(anyhow!(
            "Metrics cover {:?} nodes but the graph has {}",
            lengths,
            n
        ));
    }

    let records = graph
        .nodes()
        .enumerate()
        .map(|(i, node)| NodeRecord {
            name: node.location.name.clone(),
            lat: node.location.lat,
            lon: node.location.lon,
            pagerank: metrics.pagerank[i],
            community: metrics.communities.membership[i],
            betweenness: metrics.betweenness[i],
            closeness: metrics.closeness[i],
            attributes: node.values.clone(),
        })
        .collect();

    Ok(records)
}

/// `{top_<label>: [{name, <attribute>: value}, ...], average_<label>: number | null, ...}`
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsDocument {
    summary: StatisticsSummary,
}

impl StatisticsDocument {
    pub fn new(summary: StatisticsSummary) -> Self {
        StatisticsDocument { summary }
    }
}

impl Serialize for StatisticsDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let attributes = &self.summary.attributes;
        let mut map = serializer.serialize_map(Some(attributes.len() * 2))?;
        for summary in attributes {
            map.serialize_entry(&format!("top_{}", summary.label), &TopList(summary))?;
            map.serialize_entry(&format!("average_{}", summary.label), &summary.mean)?;
        }
        map.end()
    }
}

struct TopList<'a>(&'a AttributeSummary);

struct TopRecord<'a> {
    attribute: &'a str,
    entry: &'a TopEntry,
}

impl Serialize for TopList<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.top.iter().map(|entry| TopRecord {
            attribute: &self.0.attribute,
            entry,
        }))
    }
}

impl Serialize for TopRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("name", &self.entry.name)?;
        map.serialize_entry(self.attribute, &self.entry.value)?;
        map.end()
    }
}

/// Writes any serialisable document as pretty JSON.
pub fn save_json<T: Serialize + ?Sized>(document: &T, file_path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(file_path)?);
    serde_json::to_writer_pretty(&mut writer, document)?;
    writer.flush()?;
    log::info!("Saved {}", file_path.display());

    Ok(())
}

// -- Tests -------------------------------------------------------------------
