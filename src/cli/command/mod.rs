pub mod check;
pub mod network;
pub mod run;
pub mod statistics;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use chrono::{Datelike, Local};

use crate::{
    cli::create_progress_bar,
    config::Config,
    fetch::OpenMeteoClient,
    pipeline::fetch_table,
    table::AttributeTable,
};

pub use check::check;
pub use network::network;
pub use run::run;
pub use statistics::statistics;

/// Dated output file name, e.g. `weathernet-network-2024-11-02.json`.
pub fn make_json_file_name(output_dir: Option<&Path>, document: &str) -> Result<PathBuf> {
    let today = Local::now();
    let file_name = format!(
        "weathernet-{}-{}-{:02}-{:02}.json",
        document,
        today.year(),
        today.month(),
        today.day()
    );

    let dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => dirs::home_dir().ok_or_else(|| anyhow!("No home directory found"))?,
    };

    Ok(dir.join(file_name))
}

/// Fetches the attribute table from Open-Meteo with a progress bar.
async fn fetch_from_open_meteo(config: &Config) -> Result<AttributeTable> {
    let client = OpenMeteoClient::new(&config.fetch);
    let pb = create_progress_bar(
        config.locations.len() as u64,
        "Fetching weather data...".to_string(),
    );

    let table = fetch_table(config, &client, Some(&pb)).await?;
    pb.finish_with_message(format!("Fetched {} locations", table.len()));
    if table.is_empty() {
        log::warn!("No location returned complete data");
    }

    Ok(table)
}

// -- Tests -------------------------------------------------------------------
