//! `salesync export`: render a report into a local workbook

use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use clap::Args;
use colored::*;

use super::read_input;
use crate::cli::ReportArgs;
use crate::config::AppConfig;
use crate::export::{DEFAULT_SHEET_NAME, export_report_to_excel};
use crate::pipeline::prepare_report;

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Sales export to convert
    pub file: PathBuf,

    /// Output workbook
    #[arg(short, long, value_name = "PATH", default_value = "report.xlsx")]
    pub out: PathBuf,

    /// Worksheet name in the output workbook
    #[arg(long, default_value = DEFAULT_SHEET_NAME)]
    pub sheet: String,

    #[command(flatten)]
    pub report: ReportArgs,
}

pub fn handle_export_command(args: ExportArgs, mut config: AppConfig) -> Result<bool> {
    args.report.apply(&mut config);
    let pipeline = config.pipeline_config();
    let (file_name, bytes) = read_input(&args.file)?;

    let prepared = match prepare_report(&pipeline, &file_name, &bytes, Local::now()) {
        Ok(prepared) => prepared,
        Err(e) => {
            println!("{} {}", "✗".bright_red(), e);
            return Ok(false);
        }
    };

    export_report_to_excel(&prepared.rows, &pipeline.palette, &args.sheet, &args.out)?;
    println!(
        "{} {} data row(s) in {} categor{} written to {}",
        "✓".bright_green(),
        prepared.rows.data_row_count(),
        prepared.categories,
        if prepared.categories == 1 { "y" } else { "ies" },
        args.out.display().to_string().cyan()
    );
    Ok(true)
}
