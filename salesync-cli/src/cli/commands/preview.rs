//! `salesync preview`: build a report and print it without any remote call

use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use clap::Args;
use colored::*;

use super::read_input;
use crate::cli::ReportArgs;
use crate::config::AppConfig;
use crate::pipeline::{PreparedReport, prepare_report};
use crate::report::{ReportRow, ReportRowSet};

#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Sales export (.csv, .tsv, .txt, .xlsx, .xls, .ods, ...)
    pub file: PathBuf,

    #[command(flatten)]
    pub report: ReportArgs,
}

/// Returns false when the file could not be turned into a report
pub fn handle_preview_command(args: PreviewArgs, mut config: AppConfig) -> Result<bool> {
    args.report.apply(&mut config);
    let pipeline = config.pipeline_config();
    let (file_name, bytes) = read_input(&args.file)?;

    match prepare_report(&pipeline, &file_name, &bytes, Local::now()) {
        Ok(prepared) => {
            print!("{}", render_table(&prepared.rows));
            println!();
            print_stats(&file_name, &prepared, pipeline.mode.label());
            Ok(true)
        }
        Err(e) => {
            println!("{} {}", "✗".bright_red(), e);
            Ok(false)
        }
    }
}

fn print_stats(file_name: &str, prepared: &PreparedReport, mode: &str) {
    let stats = &prepared.stats;
    println!("{} {} ({} mode)", "Source:".bold(), file_name.cyan(), mode);
    println!(
        "  rows seen {}, kept {}, dropped {}, defaulted {}",
        stats.rows_seen,
        stats.rows_kept.to_string().bright_green(),
        if stats.rows_dropped > 0 {
            stats.rows_dropped.to_string().yellow()
        } else {
            stats.rows_dropped.to_string().normal()
        },
        stats.rows_defaulted
    );
    println!(
        "  {} categor{}, {} data row(s), {} separator(s), {} report row(s)",
        prepared.categories,
        if prepared.categories == 1 { "y" } else { "ies" },
        prepared.rows.data_row_count(),
        prepared.rows.separator_count(),
        prepared.rows.len()
    );
}

/// Plain-text table; the banner spans the full width
fn render_table(rows: &ReportRowSet) -> String {
    let mut widths = [0usize; 3];
    for row in rows.rows() {
        if matches!(row, ReportRow::Banner(_)) {
            continue;
        }
        for (col, cell) in row.to_strings().iter().enumerate().take(3) {
            widths[col] = widths[col].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for row in rows.rows() {
        let line = match row {
            ReportRow::Banner(text) => text.bold().to_string(),
            ReportRow::Separator => String::new(),
            _ => {
                let cells = row.to_strings();
                let padded = format!(
                    "{:<w0$}  {:<w1$}  {:>w2$}",
                    cells[0],
                    cells[1],
                    cells[2],
                    w0 = widths[0],
                    w1 = widths[1],
                    w2 = widths[2]
                );
                if matches!(row, ReportRow::Header) {
                    padded.bold().to_string()
                } else {
                    padded
                }
            }
        };
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportBuilder;
    use crate::report::aggregate::CategoryGroup;
    use crate::report::resolver::ResolvedItem;

    #[test]
    fn test_render_table_aligns_columns() {
        colored::control::set_override(false);
        let groups = vec![
            CategoryGroup {
                category: "Drinks".to_string(),
                items: vec![ResolvedItem::new("Latte", "Drinks", 12)],
            },
            CategoryGroup {
                category: "Food".to_string(),
                items: vec![ResolvedItem::new("Bagel", "Food", 3)],
            },
        ];
        let table = render_table(&ReportBuilder::new().build(&groups));
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "Product Name  Product Category  Total Items Sold");
        assert_eq!(lines[1], "Latte         Drinks                          12");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "Bagel         Food                             3");
    }
}
