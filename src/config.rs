//! Run configuration: locations, thresholds, tracked attributes and
//! analysis settings. Loaded from TOML and validated before any fetch.

use std::{collections::HashSet, path::Path};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::table::Location;

/// Errors raised while loading or validating a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// A numeric attribute tracked for every location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedAttribute {
    /// Column name used in rows and output documents.
    pub name: String,
    /// Provider variable the value is read from.
    pub variable: String,
    /// Key used in the statistics document (`top_<label>`, `average_<label>`).
    #[serde(default)]
    pub label: Option<String>,
}

impl TrackedAttribute {
    pub fn new(name: &str, variable: &str, label: Option<&str>) -> Self {
        TrackedAttribute {
            name: name.to_string(),
            variable: variable.to_string(),
            label: label.map(str::to_string),
        }
    }

    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// Which Open-Meteo endpoint supplies attribute values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    /// Current conditions.
    #[default]
    Current,
    /// Mean of daily archive values over a date range.
    Archive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default)]
    pub provider: Provider,
    /// Maximum number of in-flight location fetches.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            provider: Provider::default(),
            concurrency: default_concurrency(),
            start_date: None,
            end_date: None,
        }
    }
}

/// Edge cost used by betweenness and closeness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CentralityWeighting {
    /// Every edge costs one hop.
    #[default]
    Unweighted,
    /// An edge costs `1 / weight`, so similar pairs are close.
    InverseWeight,
}

/// Edge weight used by community detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommunityWeighting {
    #[default]
    Unweighted,
    Weighted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub centrality: CentralityWeighting,
    #[serde(default)]
    pub community: CommunityWeighting,
    #[serde(default = "default_damping")]
    pub pagerank_damping: f64,
    #[serde(default = "default_max_iterations")]
    pub pagerank_max_iterations: usize,
    #[serde(default = "default_tolerance")]
    pub pagerank_tolerance: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            centrality: CentralityWeighting::default(),
            community: CommunityWeighting::default(),
            pagerank_damping: default_damping(),
            pagerank_max_iterations: default_max_iterations(),
            pagerank_tolerance: default_tolerance(),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Maximum Euclidean distance, in degrees, between linked locations.
    pub distance_threshold: f64,
    /// Maximum primary attribute difference between linked locations.
    pub attribute_threshold: f64,
    /// Attribute compared when deciding and weighting edges.
    pub primary_attribute: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    pub attributes: Vec<TrackedAttribute>,
    pub locations: Vec<Location>,
}

fn default_concurrency() -> usize {
    4
}

fn default_damping() -> f64 {
    0.85
}

fn default_max_iterations() -> usize {
    100
}

fn default_tolerance() -> f64 {
    1e-6
}

fn default_top_k() -> usize {
    5
}

impl Default for Config {
    /// The Romanian renewable-site survey the service was first deployed for.
    fn default() -> Self {
        Config {
            distance_threshold: 10.0,
            attribute_threshold: 5.0,
            primary_attribute: "wind_speed".to_string(),
            top_k: default_top_k(),
            analysis: AnalysisConfig::default(),
            fetch: FetchConfig::default(),
            attributes: vec![
                TrackedAttribute::new("wind_speed", "wind_speed_10m", Some("wind")),
                TrackedAttribute::new("clouds", "cloud_cover", Some("solar")),
            ],
            locations: vec![
                Location::new("Bucharest", 44.4268, 26.1025),
                Location::new("Cluj-Napoca", 46.7712, 23.6236),
                Location::new("Iasi", 47.1585, 27.6014),
                Location::new("Constanta", 44.1598, 28.6348),
                Location::new("Timisoara", 45.7489, 21.2087),
                Location::new("Brasov", 45.6580, 25.6012),
                Location::new("Oradea", 47.0722, 21.9218),
                Location::new("Sibiu", 45.7988, 24.1548),
                Location::new("Pitesti", 44.8577, 24.8711),
                Location::new("Bacau", 46.5820, 26.9113),
                Location::new("Targu Mures", 46.5455, 24.5579),
                Location::new("Baia Mare", 47.6576, 23.5832),
                Location::new("Deva", 45.8730, 22.9115),
                Location::new("Focsani", 45.6980, 27.1837),
                Location::new("Resita", 45.3075, 21.8924),
            ],
        }
    }
}

impl Config {
    /// Load and validate configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;

        Ok(config)
    }

    /// Checks every constraint a run depends on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_threshold("distance_threshold", self.distance_threshold)?;
        check_threshold("attribute_threshold", self.attribute_threshold)?;

        if self.attributes.is_empty() {
            return invalid("at least one tracked attribute is required");
        }

        let mut names = HashSet::new();
        let mut labels = HashSet::new();
        for attribute in &self.attributes {
            if attribute.name.is_empty() || attribute.variable.is_empty() {
                return invalid("attribute name and variable must not be empty");
            }
            if !names.insert(attribute.name.as_str()) {
                return invalid(&format!("duplicate attribute `{}`", attribute.name));
            }
            if !labels.insert(attribute.label()) {
                return invalid(&format!("duplicate attribute label `{}`", attribute.label()));
            }
        }

        if !names.contains(self.primary_attribute.as_str()) {
            return invalid(&format!(
                "primary attribute `{}` is not a tracked attribute",
                self.primary_attribute
            ));
        }

        if self.top_k == 0 {
            return invalid("top_k must be at least 1");
        }

        let mut seen = HashSet::new();
        for location in &self.locations {
            if location.name.is_empty() {
                return invalid("location name must not be empty");
            }
            if !seen.insert(location.name.as_str()) {
                return invalid(&format!("duplicate location `{}`", location.name));
            }
            if !(-90.0..=90.0).contains(&location.lat) || !(-180.0..=180.0).contains(&location.lon)
            {
                return invalid(&format!("location `{}` is out of range", location.name));
            }
        }

        let analysis = &self.analysis;
        if !(analysis.pagerank_damping > 0.0 && analysis.pagerank_damping < 1.0) {
            return invalid("pagerank_damping must lie in (0, 1)");
        }
        if analysis.pagerank_max_iterations == 0 {
            return invalid("pagerank_max_iterations must be at least 1");
        }
        if !(analysis.pagerank_tolerance > 0.0 && analysis.pagerank_tolerance.is_finite()) {
            return invalid("pagerank_tolerance must be positive");
        }

        if self.fetch.concurrency == 0 {
            return invalid("fetch concurrency must be at least 1");
        }
        if self.fetch.provider == Provider::Archive {
            match (self.fetch.start_date, self.fetch.end_date) {
                (Some(start), Some(end)) if start <= end => {}
                (Some(_), Some(_)) => return invalid("start_date must not be after end_date"),
                _ => return invalid("archive provider requires start_date and end_date"),
            }
        }

        Ok(())
    }
}

fn check_threshold(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        invalid(&format!("{} must be a finite non-negative number", name))
    }
}

fn invalid<T>(message: &str) -> Result<T, ConfigError> {
    Err(ConfigError::Validation(message.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
distance_threshold = 2.5
attribute_threshold = 3.0
primary_attribute = "wind_speed"

[[attributes]]
name = "wind_speed"
variable = "wind_speed_10m"
label = "wind"

[[locations]]
name = "A"
lat = 45.0
lon = 25.0
"#;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.locations.len(), 15);
        assert_eq!(config.attributes[1].label(), "solar");
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = Config::parse(MINIMAL).unwrap();

        assert_eq!(config.distance_threshold, 2.5);
        assert_eq!(config.top_k, 5);
        assert_eq!(config.fetch.provider, Provider::Current);
        assert_eq!(config.fetch.concurrency, 4);
        assert_eq!(config.analysis.centrality, CentralityWeighting::Unweighted);
        assert_eq!(config.analysis.pagerank_damping, 0.85);
        assert_eq!(config.locations[0], Location::new("A", 45.0, 25.0));
    }

    #[test]
    fn test_parse_analysis_and_archive_sections() {
        let sections = r#"
[analysis]
centrality = "inverse_weight"
community = "weighted"

[fetch]
provider = "archive"
start_date = "2023-11-01"
end_date = "2024-11-02"

[[attributes]]"#;
        let toml = MINIMAL.replacen("[[attributes]]", sections, 1);

        let config = Config::parse(&toml).unwrap();

        assert_eq!(config.analysis.centrality, CentralityWeighting::InverseWeight);
        assert_eq!(config.analysis.community, CommunityWeighting::Weighted);
        assert_eq!(config.fetch.provider, Provider::Archive);
        assert_eq!(config.fetch.start_date, NaiveDate::from_ymd_opt(2023, 11, 1));
    }

    #[test]
    fn test_reject_negative_threshold() {
        let err = Config::parse(&MINIMAL.replace("2.5", "-1.0")).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_reject_unknown_primary_attribute() {
        let err = Config::parse(&MINIMAL.replace(
            "primary_attribute = \"wind_speed\"",
            "primary_attribute = \"clouds\"",
        ))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(msg) if msg.contains("clouds")));
    }

    #[test]
    fn test_reject_empty_attribute_list() {
        let mut config = Config::default();
        config.attributes.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_reject_duplicate_locations() {
        let mut config = Config::default();
        config.locations.push(Location::new("Iasi", 47.0, 27.0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reject_archive_without_dates() {
        let mut config = Config::default();
        config.fetch.provider = Provider::Archive;
        assert!(config.validate().is_err());

        config.fetch.start_date = NaiveDate::from_ymd_opt(2024, 2, 1);
        config.fetch.end_date = NaiveDate::from_ymd_opt(2024, 1, 1);
        assert!(config.validate().is_err());
    }

    fn assert_invalid(config: &Config) {
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_reject_duplicate_attribute_labels() {
        let mut config = Config::default();
        config.attributes[1].label = Some("wind".to_string());
        assert_invalid(&config);
    }

    #[test]
    fn test_reject_zero_top_k() {
        let mut config = Config::default();
        config.top_k = 0;
        assert_invalid(&config);
    }

    #[test]
    fn test_reject_empty_location_name() {
        let mut config = Config::default();
        config.locations[0].name.clear();
        assert_invalid(&config);
    }

    #[test]
    fn test_reject_coordinates_out_of_range() {
        let coordinates = [
            (90.5, 25.0),
            (-91.0, 25.0),
            (45.0, 180.5),
            (45.0, -181.0),
            (f64::NAN, 25.0),
        ];
        for (lat, lon) in coordinates {
            let mut config = Config::default();
            config.locations[0] = Location::new("Bucharest", lat, lon);
            assert_invalid(&config);
        }
    }

    #[test]
    fn test_reject_damping_outside_open_interval() {
        for damping in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
            let mut config = Config::default();
            config.analysis.pagerank_damping = damping;
            assert_invalid(&config);
        }
    }

    #[test]
    fn test_reject_zero_pagerank_iterations() {
        let mut config = Config::default();
        config.analysis.pagerank_max_iterations = 0;
        assert_invalid(&config);
    }

    #[test]
    fn test_reject_bad_pagerank_tolerance() {
        for tolerance in [0.0, -1e-6, f64::INFINITY, f64::NAN] {
            let mut config = Config::default();
            config.analysis.pagerank_tolerance = tolerance;
            assert_invalid(&config);
        }
    }

    #[test]
    fn test_reject_zero_concurrency() {
        let mut config = Config::default();
        config.fetch.concurrency = 0;
        assert_invalid(&config);
    }

    #[test]
    fn test_reject_malformed_toml() {
        let err = Config::parse("distance_threshold = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
