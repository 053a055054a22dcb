use anyhow::Result;

use crate::{
    cli::{load_config, Options},
    output::save_json,
    pipeline::build_statistics,
};

use super::{fetch_from_open_meteo, make_json_file_name, network::display};

pub async fn statistics(options: &Options) -> Result<String> {
    let config = load_config(options.config.as_ref())?;
    let table = fetch_from_open_meteo(&config).await?;

    let document = build_statistics(&config, &table);
    let file_name = make_json_file_name(options.output.as_deref(), "statistics")?;
    save_json(&document, &file_name)?;

    Ok(display(&file_name))
}
