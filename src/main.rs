mod analysis;
mod cli;
mod config;
mod fetch;
mod graph;
mod output;
mod pipeline;
mod statistics;
mod table;

use anyhow::{Error, Result};
use clap::Parser;
use cli::{command, Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::init_from_env(env);

    let cli = Cli::parse();

    match &cli.command {
        Commands::Run(options) => {
            for filename in exit_on_error(command::run(options).await) {
                println!("File saved to `{}`", filename);
            }
        }
        Commands::Network(options) => {
            let filename = exit_on_error(command::network(options).await);
            println!("File saved to `{}`", filename);
        }
        Commands::Statistics(options) => {
            let filename = exit_on_error(command::statistics(options).await);
            println!("File saved to `{}`", filename);
        }
        Commands::Check { config } => {
            let summary = exit_on_error(command::check(config.as_ref()));
            println!("Configuration OK: {}", summary);
        }
    }

    Ok(())
}

fn exit_on_error<T>(result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
