use std::sync::Arc;

use clap::Parser;

use recovery_api::cli::{Cli, Command};
use recovery_api::config::{load_config, print_schema};
use recovery_api::startup::run;
use recovery_api::utils::logger::init_logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if matches!(cli.command, Command::Schema) {
        if let Err(e) = print_schema() {
            eprintln!("Error printing schema: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Error loading configuration from '{}': {}",
                cli.config.display(),
                e
            );
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(Arc::new(config), cli.command).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
