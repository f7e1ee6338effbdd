//! Failure taxonomy for a single upload

use thiserror::Error;

/// Why an upload did not reach the remote spreadsheet (or did not get styled)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// File kind could not be inferred from its name
    #[error("unsupported file format for '{file_name}': {detail}")]
    UnsupportedFormat { file_name: String, detail: String },

    /// Bytes are structurally invalid for the declared kind
    #[error("failed to parse '{file_name}': {detail}")]
    ParseFailure { file_name: String, detail: String },

    /// Strict mode left no usable rows
    #[error("no usable rows: {detail}")]
    MissingRequiredField { detail: String },

    /// Transport or API failure while clearing or writing rows
    #[error("failed to write rows to tab '{tab}': {detail}")]
    RemoteWriteFailure { tab: String, detail: String },

    /// Transport or API failure while querying metadata or applying styles
    #[error("failed to format tab '{tab}': {detail}")]
    RemoteFormattingFailure { tab: String, detail: String },
}

impl PipelineError {
    /// Short machine-friendly kind label
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat { .. } => "unsupported_format",
            Self::ParseFailure { .. } => "parse_failure",
            Self::MissingRequiredField { .. } => "missing_required_field",
            Self::RemoteWriteFailure { .. } => "remote_write_failure",
            Self::RemoteFormattingFailure { .. } => "remote_formatting_failure",
        }
    }

    /// Whether the failure happened before anything was sent to the remote store
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFormat { .. }
                | Self::ParseFailure { .. }
                | Self::MissingRequiredField { .. }
        )
    }
}
