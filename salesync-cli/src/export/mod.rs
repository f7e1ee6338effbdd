//! Local renderings of a report, for checking output without touching the remote sheet

pub mod xlsx;

pub use xlsx::{DEFAULT_SHEET_NAME, export_report_to_excel};
