//! Per-location attribute table.

pub mod builder;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use builder::build_table;

/// A fixed, named geographic point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub fn new(name: &str, lat: f64, lon: f64) -> Self {
        Location {
            name: name.to_string(),
            lat,
            lon,
        }
    }
}

/// Attribute values keyed by attribute name.
pub type AttributeValues = BTreeMap<String, f64>;

/// One complete row: a location plus every tracked attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeRow {
    pub location: Location,
    pub values: AttributeValues,
}

impl AttributeRow {
    pub fn name(&self) -> &str {
        &self.location.name
    }

    pub fn value(&self, attribute: &str) -> Option<f64> {
        self.values.get(attribute).copied()
    }
}

/// Complete rows in configuration order, unique by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeTable {
    rows: Vec<AttributeRow>,
}

impl AttributeTable {
    /// Builds a table from rows, keeping the first row seen for each name.
    pub fn from_rows(rows: Vec<AttributeRow>) -> Self {
        let mut table = AttributeTable::default();
        for row in rows {
            if table.get(row.name()).is_some() {
                log::warn!("Duplicate row for `{}` ignored", row.name());
                continue;
            }
            table.rows.push(row);
        }

        table
    }

    pub fn rows(&self) -> &[AttributeRow] {
        &self.rows
    }

    pub fn get(&self, name: &str) -> Option<&AttributeRow> {
        self.rows.iter().find(|r| r.name() == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn row(name: &str, lat: f64, lon: f64, values: &[(&str, f64)]) -> AttributeRow {
        AttributeRow {
            location: Location::new(name, lat, lon),
            values: values.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    #[test]
    fn should_drop_duplicate_names() {
        let table = AttributeTable::from_rows(vec![
            row("A", 0.0, 0.0, &[("wind_speed", 1.0)]),
            row("B", 1.0, 1.0, &[("wind_speed", 2.0)]),
            row("A", 5.0, 5.0, &[("wind_speed", 9.0)]),
        ]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("A").unwrap().value("wind_speed"), Some(1.0));
        assert_eq!(table.rows()[1].name(), "B");
    }

    #[test]
    fn should_report_empty() {
        let table = AttributeTable::from_rows(vec![]);
        assert!(table.is_empty());
        assert!(table.get("A").is_none());
    }
}
