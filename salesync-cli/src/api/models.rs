//! Spreadsheet metadata models returned by the Sheets API

use serde::{Deserialize, Serialize};

/// Rectangular cell range on one tab, 0-based, end-exclusive
///
/// Unset bounds are unbounded, matching the Sheets `GridRange` object. The API
/// omits `sheetId` when it is 0, hence the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRange {
    #[serde(default)]
    pub sheet_id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_row_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_row_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_column_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_column_index: Option<u32>,
}

impl GridRange {
    /// Fully bounded range
    pub fn bounded(sheet_id: i32, rows: std::ops::Range<u32>, cols: std::ops::Range<u32>) -> Self {
        Self {
            sheet_id,
            start_row_index: Some(rows.start),
            end_row_index: Some(rows.end),
            start_column_index: Some(cols.start),
            end_column_index: Some(cols.end),
        }
    }

    /// Whether the two ranges share at least one cell
    pub fn overlaps(&self, other: &GridRange) -> bool {
        self.sheet_id == other.sheet_id
            && spans_overlap(
                (self.start_row_index, self.end_row_index),
                (other.start_row_index, other.end_row_index),
            )
            && spans_overlap(
                (self.start_column_index, self.end_column_index),
                (other.start_column_index, other.end_column_index),
            )
    }
}

fn spans_overlap(a: (Option<u32>, Option<u32>), b: (Option<u32>, Option<u32>)) -> bool {
    let (a_start, a_end) = (a.0.unwrap_or(0), a.1.unwrap_or(u32::MAX));
    let (b_start, b_end) = (b.0.unwrap_or(0), b.1.unwrap_or(u32::MAX));
    a_start < b_end && b_start < a_end
}

/// Subset of the `Spreadsheet` resource requested by the metadata query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetMetadata {
    #[serde(default)]
    pub sheets: Vec<SheetMetadata>,
}

impl SpreadsheetMetadata {
    /// Find a tab by its exact display title
    pub fn find_sheet(&self, title: &str) -> Option<&SheetMetadata> {
        self.sheets.iter().find(|s| s.properties.title == title)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetMetadata {
    pub properties: SheetProperties,
    #[serde(default)]
    pub banded_ranges: Vec<BandedRangeInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    #[serde(default)]
    pub sheet_id: i32,
    #[serde(default)]
    pub title: String,
}

/// An active banding on a tab
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BandedRangeInfo {
    pub banded_range_id: i32,
    #[serde(default)]
    pub range: GridRange,
}
