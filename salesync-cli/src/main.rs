mod api;
mod cli;
mod config;
mod error;
mod export;
mod pipeline;
mod report;

use anyhow::Result;
use clap::Parser;

use cli::commands::{
    handle_export_command, handle_preview_command, handle_stores_command, handle_upload_command,
};
use cli::{Cli, Commands};
use config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = AppConfig::load(cli.config.as_deref())?;
    log::debug!(
        "Loaded config: {} store(s), mode {}",
        config.stores.len(),
        config.report.mode.label()
    );

    let success = match cli.command {
        Commands::Upload(args) => handle_upload_command(args, config).await?,
        Commands::Preview(args) => handle_preview_command(args, config)?,
        Commands::Export(args) => handle_export_command(args, config)?,
        Commands::Stores => {
            handle_stores_command(&config)?;
            true
        }
    };

    if !success {
        std::process::exit(1);
    }
    Ok(())
}
