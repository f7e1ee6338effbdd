//! `salesync upload`: run the full pipeline for one or more stores

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use colored::*;

use super::read_input;
use crate::api::SheetsClient;
use crate::cli::ReportArgs;
use crate::config::{AppConfig, StoreRegistry};
use crate::pipeline::{Schedule, Upload, UploadResult, UploadStatus, run_uploads};

#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Store and its export as NAME=FILE; repeat for several stores
    #[arg(long = "store", value_name = "NAME=FILE", value_parser = parse_store_file, required = true)]
    pub stores: Vec<StoreFile>,

    /// Run uploads concurrently instead of one after another
    #[arg(long)]
    pub concurrent: bool,

    /// Upper bound on concurrent uploads (implies --concurrent)
    #[arg(long, value_name = "N")]
    pub max_concurrent: Option<usize>,

    #[command(flatten)]
    pub report: ReportArgs,
}

/// One `--store NAME=FILE` argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreFile {
    pub name: String,
    pub file: PathBuf,
}

fn parse_store_file(raw: &str) -> Result<StoreFile, String> {
    let (name, file) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=FILE, got '{}'", raw))?;
    let name = name.trim();
    let file = file.trim();
    if name.is_empty() || file.is_empty() {
        return Err(format!("expected NAME=FILE, got '{}'", raw));
    }
    Ok(StoreFile {
        name: name.to_string(),
        file: PathBuf::from(file),
    })
}

/// Returns false when any upload failed to write
pub async fn handle_upload_command(args: UploadArgs, mut config: AppConfig) -> Result<bool> {
    args.report.apply(&mut config);
    if args.concurrent || args.max_concurrent.is_some() {
        config.concurrency.enabled = true;
    }
    if let Some(max) = args.max_concurrent {
        config.concurrency.max_concurrent_uploads = max;
    }

    let uploads = collect_uploads(&args.stores, &config.store_registry())?;
    let client = SheetsClient::from_config(&config.remote)
        .context("Cannot reach the destination spreadsheet")?;
    log::info!("Publishing to spreadsheet {}", client.spreadsheet_id());
    let pipeline = config.pipeline_config();
    let schedule = if config.concurrency.enabled {
        Schedule::concurrent(config.concurrency.max_concurrent_uploads)
    } else {
        Schedule::Sequential
    };

    let started = Instant::now();
    let results = run_uploads(&pipeline, &client, &uploads, schedule).await;

    for result in &results {
        print_result(result);
    }

    let failed = results.iter().filter(|r| !r.is_written()).count();
    let unstyled = results
        .iter()
        .filter(|r| matches!(&r.result, Ok(s) if !s.is_fully_styled()))
        .count();
    println!();
    println!(
        "{} upload(s) in {:.1}s: {} ok, {} unstyled, {} failed",
        results.len(),
        started.elapsed().as_secs_f64(),
        (results.len() - failed - unstyled).to_string().bright_green(),
        unstyled.to_string().yellow(),
        failed.to_string().bright_red()
    );

    Ok(failed == 0)
}

/// Read every input up front; an unreadable file aborts the run before any upload
fn collect_uploads(stores: &[StoreFile], registry: &StoreRegistry) -> Result<Vec<Upload>> {
    stores
        .iter()
        .map(|store| {
            let (file_name, bytes) = read_input(&store.file)?;
            Ok(Upload {
                store_name: store.name.clone(),
                tab: registry.tab_for(&store.name),
                file_name,
                bytes,
            })
        })
        .collect()
}

fn print_result(result: &UploadResult) {
    let label = format!("{} ({})", result.store_name, result.file_name);
    match &result.result {
        Ok(summary) => match &summary.status {
            UploadStatus::Formatted { .. } => println!(
                "{} {} -> {}: {} row(s), {} categor{}",
                "✓".bright_green(),
                label,
                summary.tab.cyan(),
                summary.data_rows,
                summary.categories,
                if summary.categories == 1 { "y" } else { "ies" }
            ),
            UploadStatus::WrittenNotStyled { reason } => println!(
                "{} {} -> {}: written, not styled ({})",
                "!".yellow(),
                label,
                summary.tab.cyan(),
                reason
            ),
        },
        Err(e) if e.is_local() => println!(
            "{} {}: {} {}",
            "✗".bright_red(),
            label,
            e,
            "(nothing sent)".dimmed()
        ),
        Err(e) => println!(
            "{} {} -> {}: {}",
            "✗".bright_red(),
            label,
            result.tab.cyan(),
            e
        ),
    }
}
