//! Upload orchestration
//!
//! One upload runs parse → resolve → aggregate → build rows → write →
//! metadata → style, strictly in that order. Several uploads share nothing but
//! the read-only [`PipelineConfig`] and the [`SheetStore`](crate::api::SheetStore).

pub mod limiter;
pub mod runner;
pub mod upload;

use crate::api::formatting::Palette;
use crate::error::PipelineError;
use crate::report::{GroupingPolicy, ResolveMode, ResolveStats};

pub use runner::{Schedule, UploadResult, run_uploads};
pub use upload::{PreparedReport, prepare_report, process_upload};

/// Everything a pipeline run needs besides the store
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub mode: ResolveMode,
    pub grouping: GroupingPolicy,
    pub banner: bool,
    pub timestamp_format: String,
    /// A1 cells cleared on the tab before writing
    pub clear_range: String,
    pub palette: Palette,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        crate::config::AppConfig::default().pipeline_config()
    }
}

/// One file destined for one report tab
#[derive(Debug, Clone)]
pub struct Upload {
    /// Store name as given by the user
    pub store_name: String,
    /// Destination tab title, passed through unvalidated
    pub tab: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// How far a successful upload got
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    /// Rows written and styling applied
    Formatted { operations: usize },
    /// Rows written, styling failed; the data is visible but unstyled
    WrittenNotStyled { reason: PipelineError },
}

/// What an upload did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSummary {
    pub tab: String,
    pub rows_written: usize,
    pub data_rows: usize,
    pub categories: usize,
    pub stats: ResolveStats,
    pub status: UploadStatus,
}

impl UploadSummary {
    pub fn is_fully_styled(&self) -> bool {
        matches!(self.status, UploadStatus::Formatted { .. })
    }
}
