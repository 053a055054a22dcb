//! Command line interface.

pub mod command;

use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::Config;

#[derive(Parser)]
#[command(version, about, long_about = None)]
/// Contains the commands
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the network and statistics documents
    Run(Options),
    /// Build the network document
    Network(Options),
    /// Build the statistics document
    Statistics(Options),
    /// Validate a configuration without fetching anything
    Check {
        /// TOML configuration file (defaults to the built-in locations)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args)]
pub struct Options {
    /// TOML configuration file (defaults to the built-in locations)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Directory the documents are written to (defaults to the home directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Loads the configuration file if one is given, otherwise the defaults.
pub fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(path)?,
        None => {
            log::info!("No config file specified, using defaults");
            let config = Config::default();
            config.validate()?;
            config
        }
    };

    Ok(config)
}

/// Creates a spinner.
pub fn create_spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner().with_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));

    bar
}

/// Creates a progress bar.
pub fn create_progress_bar(size: u64, message: String) -> ProgressBar {
    ProgressBar::new(size).with_message(message).with_style(
        ProgressStyle::with_template("[{eta_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("##-"),
    )
}
