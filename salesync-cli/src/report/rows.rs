//! Assemble the 2-D row set written to a report tab

use serde_json::{Value, json};

use super::aggregate::CategoryGroup;

pub const HEADER: [&str; 3] = ["Product Name", "Product Category", "Total Items Sold"];

/// Number of columns every non-banner row spans
pub const REPORT_WIDTH: u32 = 3;

/// One row of the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportRow {
    /// Single-cell title carrying the processing timestamp
    Banner(String),
    Header,
    Data {
        name: String,
        category: String,
        sold: u64,
    },
    /// Blank row between category blocks
    Separator,
}

impl ReportRow {
    /// Cell values as sent to the remote store
    pub fn to_values(&self) -> Vec<Value> {
        match self {
            ReportRow::Banner(text) => vec![json!(text)],
            ReportRow::Header => HEADER.iter().map(|h| json!(h)).collect(),
            ReportRow::Data {
                name,
                category,
                sold,
            } => vec![json!(name), json!(category), json!(sold)],
            ReportRow::Separator => vec![json!(""), json!(""), json!("")],
        }
    }

    /// Cell values rendered as text (preview tables)
    pub fn to_strings(&self) -> Vec<String> {
        match self {
            ReportRow::Banner(text) => vec![text.clone()],
            ReportRow::Header => HEADER.iter().map(|h| h.to_string()).collect(),
            ReportRow::Data {
                name,
                category,
                sold,
            } => vec![name.clone(), category.clone(), sold.to_string()],
            ReportRow::Separator => vec![String::new(); 3],
        }
    }
}

/// Layout facts the formatting plan needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportShape {
    /// All rows, banner included
    pub total_rows: u32,
    /// Rows above the column header (0 or 1)
    pub banner_rows: u32,
    pub width: u32,
}

/// Ordered rows of one report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportRowSet {
    rows: Vec<ReportRow>,
}

impl ReportRowSet {
    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Rows after the column header
    #[cfg(test)]
    pub fn body(&self) -> &[ReportRow] {
        let start = self
            .rows
            .iter()
            .position(|r| *r == ReportRow::Header)
            .map(|idx| idx + 1)
            .unwrap_or(0);
        &self.rows[start..]
    }

    pub fn data_row_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| matches!(r, ReportRow::Data { .. }))
            .count()
    }

    pub fn separator_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| matches!(r, ReportRow::Separator))
            .count()
    }

    pub fn shape(&self) -> ReportShape {
        let banner_rows = self
            .rows
            .iter()
            .take_while(|r| matches!(r, ReportRow::Banner(_)))
            .count();
        ReportShape {
            total_rows: self.rows.len() as u32,
            banner_rows: banner_rows as u32,
            width: REPORT_WIDTH,
        }
    }

    /// Payload for the remote write primitive
    pub fn to_values(&self) -> Vec<Vec<Value>> {
        self.rows.iter().map(ReportRow::to_values).collect()
    }
}

/// Builds a [`ReportRowSet`] from already-ordered groups
#[derive(Debug, Clone, Default)]
pub struct ReportBuilder {
    banner: Option<String>,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend a title row reading `Processed at {timestamp}`
    pub fn with_banner(mut self, timestamp: impl AsRef<str>) -> Self {
        self.banner = Some(format!("Processed at {}", timestamp.as_ref()));
        self
    }

    pub fn build(&self, groups: &[CategoryGroup]) -> ReportRowSet {
        let data_rows: usize = groups.iter().map(|g| g.items.len()).sum();
        let mut rows = Vec::with_capacity(data_rows + groups.len() + 2);

        if let Some(banner) = &self.banner {
            rows.push(ReportRow::Banner(banner.clone()));
        }
        rows.push(ReportRow::Header);

        for (idx, group) in groups.iter().enumerate() {
            if idx > 0 {
                rows.push(ReportRow::Separator);
            }
            rows.extend(group.items.iter().map(|item| ReportRow::Data {
                name: item.name.clone(),
                category: item.category.clone(),
                sold: item.sold,
            }));
        }

        ReportRowSet { rows }
    }
}
