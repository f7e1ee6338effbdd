//! Run a single upload end to end

use std::fmt::Write as _;

use chrono::{DateTime, Local};
use log::{debug, info, warn};

use super::{PipelineConfig, Upload, UploadStatus, UploadSummary};
use crate::api::formatting::{FormattingPlan, SheetTarget};
use crate::api::{SheetStore, a1_range};
use crate::error::PipelineError;
use crate::report::{
    FieldResolver, ReportBuilder, ReportRowSet, ResolveStats, SourceKind, aggregate,
    parse_records,
};

const FALLBACK_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Anchor cell of every report
const ANCHOR_CELL: &str = "A1";

/// Local half of the pipeline: rows ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedReport {
    pub rows: ReportRowSet,
    pub stats: ResolveStats,
    pub categories: usize,
}

/// Parse, resolve, aggregate and lay out one file; no remote calls
pub fn prepare_report(
    config: &PipelineConfig,
    file_name: &str,
    bytes: &[u8],
    processed_at: DateTime<Local>,
) -> Result<PreparedReport, PipelineError> {
    let kind = SourceKind::from_file_name(file_name)?;
    let records = parse_records(file_name, bytes, kind)?;
    let resolution = FieldResolver::new(config.mode).resolve(&records)?;
    let groups = aggregate(resolution.items, config.grouping);

    let mut builder = ReportBuilder::new();
    if config.banner {
        builder = builder.with_banner(format_timestamp(processed_at, &config.timestamp_format));
    }
    let rows = builder.build(&groups);

    debug!(
        "Prepared {} row(s) in {} categor{} from '{}'",
        rows.len(),
        groups.len(),
        if groups.len() == 1 { "y" } else { "ies" },
        file_name
    );
    for group in &groups {
        debug!(
            "  {}: {} item(s), {} sold",
            group.category,
            group.items.len(),
            group.total_sold()
        );
    }

    Ok(PreparedReport {
        rows,
        stats: resolution.stats,
        categories: groups.len(),
    })
}

/// Render `at` with a user-supplied chrono format, falling back on bad formats
pub fn format_timestamp(at: DateTime<Local>, format: &str) -> String {
    let mut rendered = String::new();
    if write!(rendered, "{}", at.format(format)).is_ok() {
        return rendered;
    }
    warn!(
        "Invalid timestamp format '{}', using '{}'",
        format, FALLBACK_TIMESTAMP_FORMAT
    );
    at.format(FALLBACK_TIMESTAMP_FORMAT).to_string()
}

/// Run one upload against `store`
///
/// Local failures abort before any remote call. A write failure aborts before
/// styling. A styling failure after a successful write is reported as
/// [`UploadStatus::WrittenNotStyled`] rather than an error.
pub async fn process_upload(
    config: &PipelineConfig,
    store: &dyn SheetStore,
    upload: &Upload,
) -> Result<UploadSummary, PipelineError> {
    let run_id = short_run_id();
    info!(
        "[{}] Processing '{}' for store '{}' -> tab '{}'",
        run_id, upload.file_name, upload.store_name, upload.tab
    );

    let prepared = prepare_report(config, &upload.file_name, &upload.bytes, Local::now())
        .inspect_err(|e| warn!("[{}] {} ({})", run_id, e, e.kind()))?;

    write_rows(config, store, &upload.tab, &prepared.rows)
        .await
        .inspect_err(|e| warn!("[{}] {} ({})", run_id, e, e.kind()))?;
    info!(
        "[{}] Wrote {} row(s) to tab '{}'",
        run_id,
        prepared.rows.len(),
        upload.tab
    );

    let status = match apply_formatting(config, store, &upload.tab, &prepared.rows).await {
        Ok(operations) => {
            info!(
                "[{}] Applied {} formatting request(s) to tab '{}'",
                run_id, operations, upload.tab
            );
            UploadStatus::Formatted { operations }
        }
        Err(reason) => {
            warn!("[{}] Rows written but not styled: {}", run_id, reason);
            UploadStatus::WrittenNotStyled { reason }
        }
    };

    Ok(UploadSummary {
        tab: upload.tab.clone(),
        rows_written: prepared.rows.len(),
        data_rows: prepared.rows.data_row_count(),
        categories: prepared.categories,
        stats: prepared.stats,
        status,
    })
}

async fn write_rows(
    config: &PipelineConfig,
    store: &dyn SheetStore,
    tab: &str,
    rows: &ReportRowSet,
) -> Result<(), PipelineError> {
    let failure = |e: anyhow::Error| PipelineError::RemoteWriteFailure {
        tab: tab.to_string(),
        detail: format!("{:#}", e),
    };

    store
        .clear_range(&a1_range(tab, &config.clear_range))
        .await
        .map_err(failure)?;
    store
        .write_rows(&a1_range(tab, ANCHOR_CELL), rows.to_values())
        .await
        .map_err(failure)?;
    Ok(())
}

async fn apply_formatting(
    config: &PipelineConfig,
    store: &dyn SheetStore,
    tab: &str,
    rows: &ReportRowSet,
) -> Result<usize, PipelineError> {
    let failure = |detail: String| PipelineError::RemoteFormattingFailure {
        tab: tab.to_string(),
        detail,
    };

    let metadata = store
        .fetch_metadata()
        .await
        .map_err(|e| failure(format!("{:#}", e)))?;
    let sheet = metadata
        .find_sheet(tab)
        .ok_or_else(|| failure("tab not found in spreadsheet metadata".to_string()))?;

    let plan = FormattingPlan::build(
        &rows.shape(),
        &SheetTarget::at_origin(sheet.properties.sheet_id),
        &sheet.banded_ranges,
        &config.palette,
    );
    debug!(
        "Formatting plan for '{}': {} request(s), {} stale banding(s) removed",
        tab,
        plan.len(),
        plan.removal_count()
    );
    if plan.is_empty() {
        return Ok(0);
    }

    store
        .batch_update(plan.ops())
        .await
        .map_err(|e| failure(format!("{:#}", e)))?;
    Ok(plan.len())
}

fn short_run_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::memory::{MemoryStore, Primitive, StoreCall};
    use crate::api::formatting::FormattingOp;
    use crate::api::models::{
        BandedRangeInfo, GridRange, SheetMetadata, SheetProperties, SpreadsheetMetadata,
    };
    use crate::report::{ResolveMode, ReportRow};
    use serde_json::json;

    const CSV: &str = "Product Name,Product Category,Total Items Sold\n\
                       A,Drinks,5\n\
                       B,Drinks,10\n\
                       C,Snacks,3\n";

    fn upload(file_name: &str, body: &str) -> Upload {
        Upload {
            store_name: "Rockwell".to_string(),
            tab: "Rockwell".to_string(),
            file_name: file_name.to_string(),
            bytes: body.as_bytes().to_vec(),
        }
    }

    fn no_banner() -> PipelineConfig {
        PipelineConfig {
            banner: false,
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn test_prepare_report_scenario() {
        let prepared = prepare_report(&no_banner(), "sales.csv", CSV.as_bytes(), Local::now())
            .unwrap();

        let body: Vec<_> = prepared.rows.body().iter().map(ReportRow::to_values).collect();
        assert_eq!(
            body,
            vec![
                vec![json!("B"), json!("Drinks"), json!(10)],
                vec![json!("A"), json!("Drinks"), json!(5)],
                vec![json!(""), json!(""), json!("")],
                vec![json!("C"), json!("Snacks"), json!(3)],
            ]
        );
        assert_eq!(prepared.categories, 2);
    }

    #[test]
    fn test_prepare_report_missing_sold_column() {
        let csv = "Product Name,Product Category\nLatte,Drinks\n";

        let err = prepare_report(&no_banner(), "s.csv", csv.as_bytes(), Local::now()).unwrap_err();
        assert_eq!(err.kind(), "missing_required_field");

        let lenient = PipelineConfig {
            mode: ResolveMode::Lenient,
            ..no_banner()
        };
        let prepared = prepare_report(&lenient, "s.csv", csv.as_bytes(), Local::now()).unwrap();
        assert_eq!(
            prepared.rows.body(),
            &[ReportRow::Data {
                name: "Latte".to_string(),
                category: "Drinks".to_string(),
                sold: 0
            }]
        );
    }

    #[test]
    fn test_banner_uses_configured_format() {
        let config = PipelineConfig {
            timestamp_format: "%Y".to_string(),
            ..PipelineConfig::default()
        };
        let at = Local::now();
        let prepared = prepare_report(&config, "s.csv", CSV.as_bytes(), at).unwrap();
        assert_eq!(
            prepared.rows.rows()[0],
            ReportRow::Banner(format!("Processed at {}", at.format("%Y")))
        );
    }

    #[test]
    fn test_invalid_timestamp_format_falls_back() {
        let at = Local::now();
        assert_eq!(
            format_timestamp(at, "%Q-broken"),
            at.format(FALLBACK_TIMESTAMP_FORMAT).to_string()
        );
    }

    #[tokio::test]
    async fn test_full_upload_is_formatted() {
        let store = MemoryStore::with_tabs(&[("Rockwell", 31)]);
        let summary = process_upload(&PipelineConfig::default(), &store, &upload("s.csv", CSV))
            .await
            .unwrap();

        assert_eq!(summary.status, UploadStatus::Formatted { operations: 2 });
        assert_eq!(summary.rows_written, 6);
        assert_eq!(summary.data_rows, 3);

        let calls = store.calls();
        assert_eq!(calls[0], StoreCall::Clear("'Rockwell'!A1:Z1000".to_string()));
        match &calls[1] {
            StoreCall::Write { range, rows } => {
                assert_eq!(range, "'Rockwell'!A1");
                assert_eq!(rows.len(), 6);
                assert_eq!(rows[1], vec![json!("Product Name"), json!("Product Category"), json!("Total Items Sold")]);
            }
            other => panic!("expected write, got {:?}", other),
        }
        assert_eq!(calls[2], StoreCall::Metadata);
        assert!(matches!(&calls[3], StoreCall::BatchUpdate(ops) if ops.len() == 2));
    }

    #[tokio::test]
    async fn test_stale_banding_removed_first() {
        let metadata = SpreadsheetMetadata {
            sheets: vec![SheetMetadata {
                properties: SheetProperties {
                    sheet_id: 4,
                    title: "Rockwell".to_string(),
                },
                banded_ranges: vec![BandedRangeInfo {
                    banded_range_id: 901,
                    range: GridRange::bounded(4, 1..80, 0..3),
                }],
            }],
        };
        let store = MemoryStore::with_metadata(metadata);

        process_upload(&PipelineConfig::default(), &store, &upload("s.csv", CSV))
            .await
            .unwrap();

        let ops = store
            .calls()
            .into_iter()
            .find_map(|c| match c {
                StoreCall::BatchUpdate(ops) => Some(ops),
                _ => None,
            })
            .unwrap();
        assert_eq!(ops[0], FormattingOp::delete_banding(901));
        assert!(matches!(ops.last(), Some(FormattingOp::AddBanding { .. })));
    }

    #[tokio::test]
    async fn test_local_failure_makes_no_remote_calls() {
        let store = MemoryStore::with_tabs(&[("Rockwell", 0)]);

        let err = process_upload(&PipelineConfig::default(), &store, &upload("s.pdf", CSV))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "unsupported_format");
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_write_failure_skips_formatting() {
        let store = MemoryStore::with_tabs(&[("Rockwell", 0)]).fail_on(Primitive::Write);

        let err = process_upload(&PipelineConfig::default(), &store, &upload("s.csv", CSV))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "remote_write_failure");
        assert!(!store.calls().contains(&StoreCall::Metadata));
    }

    #[tokio::test]
    async fn test_metadata_failure_is_written_not_styled() {
        let store = MemoryStore::with_tabs(&[("Rockwell", 0)]).fail_on(Primitive::Metadata);

        let summary = process_upload(&PipelineConfig::default(), &store, &upload("s.csv", CSV))
            .await
            .unwrap();
        match &summary.status {
            UploadStatus::WrittenNotStyled { reason } => {
                assert_eq!(reason.kind(), "remote_formatting_failure");
            }
            other => panic!("expected written-not-styled, got {:?}", other),
        }
        assert!(!summary.is_fully_styled());
    }

    #[tokio::test]
    async fn test_batch_failure_is_written_not_styled() {
        let store = MemoryStore::with_tabs(&[("Rockwell", 7)]).fail_on(Primitive::BatchUpdate);

        let summary = process_upload(&PipelineConfig::default(), &store, &upload("s.csv", CSV))
            .await
            .unwrap();
        match &summary.status {
            UploadStatus::WrittenNotStyled { reason } => {
                assert_eq!(reason.kind(), "remote_formatting_failure");
            }
            other => panic!("expected written-not-styled, got {:?}", other),
        }
        assert_eq!(summary.rows_written, 6);

        let calls = store.calls();
        assert!(calls.iter().any(|c| matches!(c, StoreCall::Write { .. })));
        assert!(matches!(calls.last(), Some(StoreCall::BatchUpdate(ops)) if ops.len() == 2));
    }

    #[tokio::test]
    async fn test_unknown_tab_is_written_not_styled() {
        let store = MemoryStore::with_tabs(&[("Greenhills", 2)]);

        let summary = process_upload(&PipelineConfig::default(), &store, &upload("s.csv", CSV))
            .await
            .unwrap();
        assert!(matches!(summary.status, UploadStatus::WrittenNotStyled { .. }));
    }
}
