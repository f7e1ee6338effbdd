//! Map heterogeneous export columns onto canonical sales fields
//!
//! Sales exports disagree on header spelling ("Product Name", "product name",
//! "ProductName", "Total Items Sold", "Items sold", ...). Columns are bound to
//! canonical fields by an ordered list of [`ColumnMatcher`]s evaluated against a
//! normalized label (lowercase, whitespace removed). The first matcher that
//! accepts a column claims it; a claimed column is never bound twice.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::source::RawRecord;
use super::value::RawValue;
use crate::error::PipelineError;

/// Name used when lenient mode has no product name
pub const UNKNOWN_PRODUCT: &str = "Unknown Product";
/// Category used when lenient mode has no category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Canonical field a column can resolve to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    Name,
    Category,
    Sold,
}

impl CanonicalField {
    pub fn label(&self) -> &'static str {
        match self {
            CanonicalField::Name => "product name",
            CanonicalField::Category => "product category",
            CanonicalField::Sold => "items sold",
        }
    }
}

/// Policy for rows that cannot yield all three fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolveMode {
    /// Drop incomplete rows
    #[default]
    Strict,
    /// Fill incomplete rows with sentinels
    Lenient,
}

impl ResolveMode {
    pub fn label(&self) -> &'static str {
        match self {
            ResolveMode::Strict => "strict",
            ResolveMode::Lenient => "lenient",
        }
    }
}

impl std::str::FromStr for ResolveMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(ResolveMode::Strict),
            "lenient" => Ok(ResolveMode::Lenient),
            other => Err(format!("unknown resolve mode '{}' (expected strict or lenient)", other)),
        }
    }
}

/// A canonical sales line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedItem {
    pub name: String,
    pub category: String,
    pub sold: u64,
}

impl ResolvedItem {
    pub fn new(name: impl Into<String>, category: impl Into<String>, sold: u64) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            sold,
        }
    }
}

/// Predicate binding a column label to a canonical field
#[derive(Debug, Clone, Copy)]
pub struct ColumnMatcher {
    pub field: CanonicalField,
    /// Every keyword must appear in the normalized label
    pub keywords: &'static [&'static str],
}

impl ColumnMatcher {
    pub fn matches(&self, normalized_label: &str) -> bool {
        self.keywords.iter().all(|k| normalized_label.contains(k))
    }
}

/// Matchers in evaluation order
pub const DEFAULT_MATCHERS: &[ColumnMatcher] = &[
    ColumnMatcher {
        field: CanonicalField::Name,
        keywords: &["product", "name"],
    },
    ColumnMatcher {
        field: CanonicalField::Category,
        keywords: &["category"],
    },
    ColumnMatcher {
        field: CanonicalField::Sold,
        keywords: &["sold"],
    },
];

/// Lowercase and strip all whitespace
pub fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Column labels bound to each canonical field for one record shape
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnBinding {
    pub name: Option<String>,
    pub category: Option<String>,
    pub sold: Option<String>,
}

impl ColumnBinding {
    /// Bind the labels of `record` using `matchers` in order
    pub fn bind(record: &RawRecord, matchers: &[ColumnMatcher]) -> Self {
        let labels: Vec<(&str, String)> = record
            .iter()
            .map(|(label, _)| (label, normalize_label(label)))
            .collect();
        let mut claimed = vec![false; labels.len()];
        let mut binding = ColumnBinding::default();

        for matcher in matchers {
            if binding.slot(matcher.field).is_some() {
                continue;
            }
            let hit = labels
                .iter()
                .enumerate()
                .find(|(idx, (_, normalized))| !claimed[*idx] && matcher.matches(normalized));
            if let Some((idx, (label, _))) = hit {
                claimed[idx] = true;
                *binding.slot_mut(matcher.field) = Some(label.to_string());
            }
        }

        binding
    }

    fn slot(&self, field: CanonicalField) -> &Option<String> {
        match field {
            CanonicalField::Name => &self.name,
            CanonicalField::Category => &self.category,
            CanonicalField::Sold => &self.sold,
        }
    }

    fn slot_mut(&mut self, field: CanonicalField) -> &mut Option<String> {
        match field {
            CanonicalField::Name => &mut self.name,
            CanonicalField::Category => &mut self.category,
            CanonicalField::Sold => &mut self.sold,
        }
    }

    /// Canonical fields with no bound column
    pub fn missing(&self) -> Vec<CanonicalField> {
        [
            CanonicalField::Name,
            CanonicalField::Category,
            CanonicalField::Sold,
        ]
        .into_iter()
        .filter(|f| self.slot(*f).is_none())
        .collect()
    }

    fn value<'a>(&self, record: &'a RawRecord, field: CanonicalField) -> Option<&'a RawValue> {
        self.slot(field).as_deref().and_then(|label| record.get(label))
    }
}

/// Counters describing one resolution pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    pub rows_seen: usize,
    pub rows_kept: usize,
    pub rows_dropped: usize,
    pub rows_defaulted: usize,
}

/// Output of [`FieldResolver::resolve`]
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub items: Vec<ResolvedItem>,
    pub stats: ResolveStats,
}

/// Turns raw records into [`ResolvedItem`]s under a single [`ResolveMode`]
#[derive(Debug, Clone)]
pub struct FieldResolver {
    mode: ResolveMode,
    matchers: &'static [ColumnMatcher],
}

impl FieldResolver {
    pub fn new(mode: ResolveMode) -> Self {
        Self {
            mode,
            matchers: DEFAULT_MATCHERS,
        }
    }

    /// Resolve every record; strict mode fails only when nothing survives
    pub fn resolve(&self, records: &[RawRecord]) -> Result<Resolution, PipelineError> {
        let mut resolution = Resolution::default();
        let mut bound_labels: Option<Vec<String>> = None;
        let mut current = ColumnBinding::default();
        let mut last_missing = Vec::new();

        for (row_idx, record) in records.iter().enumerate() {
            resolution.stats.rows_seen += 1;

            // Records from one file share a header; rebind only if the shape changes.
            let labels: Vec<String> = record.iter().map(|(l, _)| l.to_string()).collect();
            if bound_labels.as_ref() != Some(&labels) {
                current = ColumnBinding::bind(record, self.matchers);
                bound_labels = Some(labels);
            }

            match self.resolve_one(record, &current) {
                RowOutcome::Kept(item) => {
                    resolution.stats.rows_kept += 1;
                    resolution.items.push(item);
                }
                RowOutcome::Defaulted(item, fields) => {
                    debug!(
                        "Row {}: defaulted {}",
                        row_idx + 1,
                        describe_fields(&fields)
                    );
                    resolution.stats.rows_kept += 1;
                    resolution.stats.rows_defaulted += 1;
                    resolution.items.push(item);
                }
                RowOutcome::Dropped(fields) => {
                    debug!(
                        "Row {}: dropped, unusable {}",
                        row_idx + 1,
                        describe_fields(&fields)
                    );
                    resolution.stats.rows_dropped += 1;
                    last_missing = current.missing();
                }
            }
        }

        info!(
            "Resolved {} of {} row(s) in {} mode ({} dropped, {} defaulted)",
            resolution.stats.rows_kept,
            resolution.stats.rows_seen,
            self.mode.label(),
            resolution.stats.rows_dropped,
            resolution.stats.rows_defaulted
        );

        if self.mode == ResolveMode::Strict && resolution.items.is_empty() {
            let detail = if resolution.stats.rows_seen == 0 {
                "input contains no data rows".to_string()
            } else if !last_missing.is_empty() {
                format!(
                    "no column found for {} in {} row(s)",
                    describe_fields(&last_missing),
                    resolution.stats.rows_seen
                )
            } else {
                format!(
                    "all {} row(s) lack a usable product name, category or sold count",
                    resolution.stats.rows_seen
                )
            };
            return Err(PipelineError::MissingRequiredField { detail });
        }

        Ok(resolution)
    }

    fn resolve_one(&self, record: &RawRecord, binding: &ColumnBinding) -> RowOutcome {
        let name = binding
            .value(record, CanonicalField::Name)
            .and_then(RawValue::as_text);
        let category = binding
            .value(record, CanonicalField::Category)
            .and_then(RawValue::as_text);
        let sold = binding
            .value(record, CanonicalField::Sold)
            .and_then(RawValue::as_count);

        let mut missing = Vec::new();
        if name.is_none() {
            missing.push(CanonicalField::Name);
        }
        if category.is_none() {
            missing.push(CanonicalField::Category);
        }
        if sold.is_none() {
            missing.push(CanonicalField::Sold);
        }

        match (self.mode, name, category, sold) {
            (_, Some(name), Some(category), Some(sold)) => {
                RowOutcome::Kept(ResolvedItem::new(name, category, sold))
            }
            (ResolveMode::Strict, ..) => RowOutcome::Dropped(missing),
            (ResolveMode::Lenient, name, category, sold) => RowOutcome::Defaulted(
                ResolvedItem::new(
                    name.unwrap_or_else(|| UNKNOWN_PRODUCT.to_string()),
                    category.unwrap_or_else(|| UNCATEGORIZED.to_string()),
                    sold.unwrap_or(0),
                ),
                missing,
            ),
        }
    }
}

enum RowOutcome {
    Kept(ResolvedItem),
    Defaulted(ResolvedItem, Vec<CanonicalField>),
    Dropped(Vec<CanonicalField>),
}

fn describe_fields(fields: &[CanonicalField]) -> String {
    fields
        .iter()
        .map(|f| f.label())
        .collect::<Vec<_>>()
        .join(", ")
}
