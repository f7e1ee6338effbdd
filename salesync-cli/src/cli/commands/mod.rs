//! Subcommand arguments and handlers

pub mod export;
pub mod preview;
pub mod stores;
pub mod upload;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

pub use export::{ExportArgs, handle_export_command};
pub use preview::{PreviewArgs, handle_preview_command};
pub use stores::handle_stores_command;
pub use upload::{UploadArgs, handle_upload_command};

/// Read an input export; the file name carries the format
pub(crate) fn read_input(path: &Path) -> Result<(String, Vec<u8>)> {
    if !path.exists() {
        anyhow::bail!("Input file does not exist: {}", path.display());
    }
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read input file: {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok((file_name, bytes))
}
