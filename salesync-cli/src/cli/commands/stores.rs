//! `salesync stores`

use anyhow::Result;
use colored::*;

use crate::config::AppConfig;

pub fn handle_stores_command(config: &AppConfig) -> Result<()> {
    let registry = config.store_registry();
    if registry.entries().is_empty() {
        println!("{}", "No stores configured.".yellow());
        println!("Add [[stores]] entries with a name and tab to your config file.");
        return Ok(());
    }

    let width = registry
        .entries()
        .iter()
        .map(|e| e.name.chars().count())
        .max()
        .unwrap_or(0);

    println!("{}", "Configured stores:".bold());
    for entry in registry.entries() {
        println!(
            "  {:<width$}  {} {}",
            entry.name.bright_green(),
            "->".dimmed(),
            entry.tab.cyan(),
            width = width
        );
    }
    Ok(())
}
