//! End-to-end run: fetch the table, then build the network and statistics
//! documents from it.

use anyhow::Result;
use indicatif::ProgressBar;

use crate::{
    analysis::analyze,
    config::Config,
    fetch::Fetch,
    graph::{build_graph, SimilarityGraph},
    output::{network_document, NodeRecord, StatisticsDocument},
    statistics::summarize,
    table::{build_table, AttributeTable},
};

/// Similarity graph and network document of one run.
#[derive(Debug)]
pub struct Network {
    pub graph: SimilarityGraph,
    pub records: Vec<NodeRecord>,
}

/// Validates the configuration, then fetches every configured location.
pub async fn fetch_table<F: Fetch>(
    config: &Config,
    fetcher: &F,
    progress_bar: Option<&ProgressBar>,
) -> Result<AttributeTable> {
    config.validate()?;

    let table = build_table(
        fetcher,
        &config.locations,
        &config.attributes,
        config.fetch.concurrency,
        progress_bar,
    )
    .await;

    Ok(table)
}

pub fn build_network(config: &Config, table: &AttributeTable) -> Result<Network> {
    let graph = build_graph(
        table,
        config.distance_threshold,
        config.attribute_threshold,
        &config.primary_attribute,
    )?;
    let metrics = analyze(&graph, &config.analysis);
    let records = network_document(&graph, &metrics)?;

    Ok(Network { graph, records })
}

pub fn build_statistics(config: &Config, table: &AttributeTable) -> StatisticsDocument {
    StatisticsDocument::new(summarize(table, &config.attributes, config.top_k))
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        config::TrackedAttribute,
        table::{builder::tests::StaticFetcher, Location},
    };

    fn scenario_config() -> Config {
        Config {
            distance_threshold: 5.0,
            attribute_threshold: 3.0,
            primary_attribute: "wind_speed".to_string(),
            attributes: vec![
                TrackedAttribute::new("wind_speed", "wind_speed_10m", Some("wind")),
                TrackedAttribute::new("clouds", "cloud_cover", Some("solar")),
            ],
            locations: vec![
                Location::new("A", 45.0, 25.0),
                Location::new("B", 45.5, 25.5),
                Location::new("C", 45.0, 40.0),
                Location::new("D", 10.0, 10.0),
            ],
            ..Config::default()
        }
    }

    fn scenario_fetcher(with_d: bool) -> StaticFetcher {
        let mut fetcher = StaticFetcher::new(&[
            ("A", &[("wind_speed", 2.0), ("clouds", 40.0)]),
            ("B", &[("wind_speed", 2.5), ("clouds", 60.0)]),
            ("C", &[("wind_speed", 20.0), ("clouds", 10.0)]),
        ]);
        if with_d {
            let values = [("wind_speed".to_string(), 4.0), ("clouds".to_string(), 90.0)];
            fetcher.values.insert("D".to_string(), values.into_iter().collect());
        }

        fetcher
    }

    fn record<'a>(records: &'a [NodeRecord], name: &str) -> &'a NodeRecord {
        records.iter().find(|r| r.name == name).unwrap()
    }

    #[tokio::test]
    async fn should_link_pair_and_isolate_outlier() {
        let config = scenario_config();

        let table = fetch_table(&config, &scenario_fetcher(false), None).await.unwrap();
        let network = build_network(&config, &table).unwrap();

        assert_eq!(network.graph.edge_count(), 1);
        assert!(network.graph.edge_weight("A", "B").is_some());

        let records = &network.records;
        let (a, b, c) = (record(records, "A"), record(records, "B"), record(records, "C"));
        assert!((a.pagerank - b.pagerank).abs() < 1e-9);
        assert!(c.pagerank < a.pagerank);
        assert_eq!(a.community, b.community);
        assert_ne!(a.community, c.community);
        assert_eq!((c.betweenness, c.closeness), (0.0, 0.0));

        assert_eq!(c.attributes["wind_speed"], 20.0);
        assert_eq!(c.attributes["clouds"], 10.0);

        let total: f64 = records.iter().map(|r| r.pagerank).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn should_emit_each_surviving_location_once() {
        let config = scenario_config();

        let table = fetch_table(&config, &scenario_fetcher(false), None).await.unwrap();
        let network = build_network(&config, &table).unwrap();

        let mut names: Vec<&str> = network.records.iter().map(|r| r.name.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(network.records.len(), table.len());
    }

    #[tokio::test]
    async fn should_only_add_recovered_location_on_rerun() {
        let config = scenario_config();

        let failed = fetch_table(&config, &scenario_fetcher(false), None).await.unwrap();
        let first = build_network(&config, &failed).unwrap();
        let again = build_network(&config, &failed).unwrap();
        assert_eq!(first.records, again.records);

        let recovered = fetch_table(&config, &scenario_fetcher(true), None).await.unwrap();
        let second = build_network(&config, &recovered).unwrap();

        assert_eq!(second.records.len(), first.records.len() + 1);
        assert_eq!(second.graph.edge_count(), first.graph.edge_count());
        for name in ["A", "B", "C"] {
            assert_eq!(
                record(&first.records, name).community,
                record(&second.records, name).community
            );
        }
        assert!(second.records.iter().any(|r| r.name == "D"));
    }

    #[tokio::test]
    async fn should_report_no_data_for_empty_table() {
        let config = scenario_config();

        let table = fetch_table(&config, &StaticFetcher::new(&[]), None).await.unwrap();
        let network = build_network(&config, &table).unwrap();
        let statistics = build_statistics(&config, &table);

        assert!(network.records.is_empty());
        assert_eq!(serde_json::to_value(&network.records).unwrap(), json!([]));
        assert_eq!(
            serde_json::to_value(&statistics).unwrap(),
            json!({
                "top_wind": [], "average_wind": null,
                "top_solar": [], "average_solar": null
            })
        );
    }

    #[tokio::test]
    async fn should_summarise_statistics_independently_of_graph() {
        let config = scenario_config();

        let table = fetch_table(&config, &scenario_fetcher(true), None).await.unwrap();
        let value = serde_json::to_value(build_statistics(&config, &table)).unwrap();

        assert_eq!(value["top_wind"][0], json!({ "name": "C", "wind_speed": 20.0 }));
        assert_eq!(value["top_solar"][0], json!({ "name": "D", "clouds": 90.0 }));
        assert_eq!(value["average_solar"], json!(50.0));
    }

    #[tokio::test]
    async fn should_fail_fast_on_invalid_config() {
        let mut config = scenario_config();
        config.attribute_threshold = -1.0;

        let result = fetch_table(&config, &scenario_fetcher(true), None).await;

        assert!(result.is_err());
    }
}
