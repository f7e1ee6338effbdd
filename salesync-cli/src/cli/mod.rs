//! Command-line surface

pub mod commands;

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::config::AppConfig;
use crate::report::ResolveMode;

pub use commands::{ExportArgs, PreviewArgs, UploadArgs};

#[derive(Parser, Debug)]
#[command(
    name = "salesync",
    version,
    about = "Turn point-of-sale exports into per-store sales reports on a shared spreadsheet"
)]
pub struct Cli {
    /// Raise log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (default: <config dir>/salesync/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Publish one report per store to the destination spreadsheet
    Upload(UploadArgs),
    /// Build a report locally and print it; nothing is sent
    Preview(PreviewArgs),
    /// Render a report into a local .xlsx file
    Export(ExportArgs),
    /// List configured stores and their tabs
    Stores,
}

/// Report options shared by every command that builds a report
#[derive(Args, Debug, Clone, Default)]
pub struct ReportArgs {
    /// Row resolution policy: strict drops incomplete rows, lenient fills them
    #[arg(long, value_name = "MODE")]
    pub mode: Option<ResolveMode>,

    /// Merge categories that differ only by letter case
    #[arg(long)]
    pub case_fold: bool,

    /// Omit the "Processed at ..." title row
    #[arg(long)]
    pub no_banner: bool,
}

impl ReportArgs {
    /// Flags win over file and environment settings
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(mode) = self.mode {
            config.report.mode = mode;
        }
        if self.case_fold {
            config.report.case_fold_categories = true;
        }
        if self.no_banner {
            config.report.banner = false;
        }
    }
}
