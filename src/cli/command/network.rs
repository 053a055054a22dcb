use std::path::Path;

use anyhow::Result;

use crate::{
    cli::{create_spinner, load_config, Options},
    output::save_json,
    pipeline::build_network,
};

use super::{fetch_from_open_meteo, make_json_file_name};

pub async fn network(options: &Options) -> Result<String> {
    let config = load_config(options.config.as_ref())?;
    let table = fetch_from_open_meteo(&config).await?;

    let bar = create_spinner("Analysing similarity network...".to_string());
    let network = build_network(&config, &table)?;
    bar.finish_with_message(format!(
        "Network analysed: {} nodes, {} edges",
        network.graph.node_count(),
        network.graph.edge_count()
    ));

    let file_name = make_json_file_name(options.output.as_deref(), "network")?;
    save_json(&network.records, &file_name)?;

    Ok(display(&file_name))
}

pub(super) fn display(path: &Path) -> String {
    path.to_string_lossy().to_string()
}
