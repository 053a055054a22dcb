//! Top-k rankings and means per tracked attribute.

use crate::{config::TrackedAttribute, table::AttributeTable};

#[derive(Debug, Clone, PartialEq)]
pub struct TopEntry {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSummary {
    pub attribute: String,
    pub label: String,
    /// At most `k` rows, highest value first, ties in table order.
    pub top: Vec<TopEntry>,
    /// `None` when the table holds no values for the attribute.
    pub mean: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatisticsSummary {
    pub attributes: Vec<AttributeSummary>,
}

pub fn summarize(
    table: &AttributeTable,
    attributes: &[TrackedAttribute],
    k: usize,
) -> StatisticsSummary {
    let attributes = attributes
        .iter()
        .map(|attribute| summarize_attribute(table, attribute, k))
        .collect();

    StatisticsSummary { attributes }
}

fn summarize_attribute(
    table: &AttributeTable,
    attribute: &TrackedAttribute,
    k: usize,
) -> AttributeSummary {
    let mut entries: Vec<TopEntry> = table
        .rows()
        .iter()
        .filter_map(|row| {
            row.value(&attribute.name).map(|value| TopEntry {
                name: row.name().to_string(),
                value,
            })
        })
        .collect();

    let mean = if entries.is_empty() {
        log::warn!("No data for attribute `{}`", attribute.name);
        None
    } else {
        Some(entries.iter().map(|e| e.value).sum::<f64>() / entries.len() as f64)
    };

    // Stable, so equal values keep table order.
    entries.sort_by(|a, b| b.value.total_cmp(&a.value));
    entries.truncate(k);

    AttributeSummary {
        attribute: attribute.name.clone(),
        label: attribute.label().to_string(),
        top: entries,
        mean,
    }
}
