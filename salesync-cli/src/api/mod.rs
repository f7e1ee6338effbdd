//! Remote spreadsheet access
//!
//! [`SheetStore`] is the seam the pipeline talks to; [`SheetsClient`] implements
//! it against the Google Sheets v4 REST API. Styling requests and the plan
//! that orders them live in [`formatting`].

pub mod client;
pub mod formatting;
pub mod models;
pub mod store;

#[cfg(test)]
pub mod memory;

pub use client::SheetsClient;
pub use store::{SheetStore, a1_range};
