//! Remote spreadsheet primitives used by the upload pipeline

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use super::formatting::FormattingOp;
use super::models::SpreadsheetMetadata;

/// The four remote calls an upload needs
///
/// Implementations are shared across concurrently running uploads and must
/// not keep per-upload state. Failures are opaque; the caller decides which
/// pipeline step they belong to.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Blank every cell of an A1 range
    async fn clear_range(&self, range: &str) -> Result<()>;

    /// Overwrite cells starting at the range's top-left cell, row by row
    async fn write_rows(&self, range: &str, rows: Vec<Vec<Value>>) -> Result<()>;

    /// Tab ids, titles and active bandings of the whole document
    async fn fetch_metadata(&self) -> Result<SpreadsheetMetadata>;

    /// Apply styling operations atomically, in order
    async fn batch_update(&self, ops: &[FormattingOp]) -> Result<()>;
}

/// Quote a tab title for A1 notation (`'North Edsa'`, `'Bob''s'`)
pub fn quote_tab(tab: &str) -> String {
    format!("'{}'", tab.replace('\'', "''"))
}

/// `'{tab}'!{cells}`
pub fn a1_range(tab: &str, cells: &str) -> String {
    format!("{}!{}", quote_tab(tab), cells)
}
