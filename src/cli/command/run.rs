use anyhow::Result;

use crate::{
    cli::{create_spinner, load_config, Options},
    output::save_json,
    pipeline::{build_network, build_statistics},
};

use super::{fetch_from_open_meteo, make_json_file_name, network::display};

/// Fetches once and writes both documents from the same table.
pub async fn run(options: &Options) -> Result<Vec<String>> {
    let config = load_config(options.config.as_ref())?;
    let table = fetch_from_open_meteo(&config).await?;

    let bar = create_spinner("Analysing similarity network...".to_string());
    let network = build_network(&config, &table)?;
    let statistics = build_statistics(&config, &table);
    bar.finish_with_message("Analysis complete");

    let network_file = make_json_file_name(options.output.as_deref(), "network")?;
    save_json(&network.records, &network_file)?;

    let statistics_file = make_json_file_name(options.output.as_deref(), "statistics")?;
    save_json(&statistics, &statistics_file)?;

    Ok(vec![display(&network_file), display(&statistics_file)])
}
