use std::path::PathBuf;

use anyhow::Result;

use crate::cli::load_config;

/// Validates the configuration and describes what a run would use.
pub fn check(config_path: Option<&PathBuf>) -> Result<String> {
    let config = load_config(config_path)?;

    let attributes: Vec<&str> = config.attributes.iter().map(|a| a.name.as_str()).collect();

    Ok(format!(
        "{} locations, attributes [{}], primary `{}`, distance < {}, attribute difference < {}",
        config.locations.len(),
        attributes.join(", "),
        config.primary_attribute,
        config.distance_threshold,
        config.attribute_threshold
    ))
}
