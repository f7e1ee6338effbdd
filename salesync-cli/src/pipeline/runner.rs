//! Run a batch of uploads, one after another or with bounded concurrency

use futures::future::join_all;
use log::{debug, info};

use super::limiter::UploadLimiter;
use super::{PipelineConfig, Upload, UploadSummary, process_upload};
use crate::api::SheetStore;
use crate::error::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    Sequential,
    Concurrent { max_in_flight: usize },
}

impl Schedule {
    pub fn concurrent(max_in_flight: usize) -> Self {
        Schedule::Concurrent {
            max_in_flight: max_in_flight.max(1),
        }
    }
}

/// Outcome of one upload in a batch
#[derive(Debug, Clone)]
pub struct UploadResult {
    pub store_name: String,
    pub tab: String,
    pub file_name: String,
    pub result: Result<UploadSummary, PipelineError>,
}

impl UploadResult {
    fn new(upload: &Upload, result: Result<UploadSummary, PipelineError>) -> Self {
        Self {
            store_name: upload.store_name.clone(),
            tab: upload.tab.clone(),
            file_name: upload.file_name.clone(),
            result,
        }
    }

    /// Rows reached the sheet, styled or not
    pub fn is_written(&self) -> bool {
        self.result.is_ok()
    }
}

/// Run every upload; results come back in input order
///
/// A failing upload never stops the others.
pub async fn run_uploads(
    config: &PipelineConfig,
    store: &dyn SheetStore,
    uploads: &[Upload],
    schedule: Schedule,
) -> Vec<UploadResult> {
    info!("Running {} upload(s) ({:?})", uploads.len(), schedule);

    match schedule {
        Schedule::Sequential => {
            let mut results = Vec::with_capacity(uploads.len());
            for upload in uploads {
                let result = process_upload(config, store, upload).await;
                results.push(UploadResult::new(upload, result));
            }
            results
        }
        Schedule::Concurrent { max_in_flight } => {
            let limiter = UploadLimiter::new(max_in_flight);
            debug!("Up to {} upload(s) in flight", limiter.max_in_flight());
            let tasks = uploads.iter().map(|upload| {
                let limiter = limiter.clone();
                async move {
                    let _permit = limiter.acquire().await;
                    let result = process_upload(config, store, upload).await;
                    UploadResult::new(upload, result)
                }
            });
            let results = join_all(tasks).await;

            let stats = limiter.stats();
            debug!(
                "Upload limiter: {} started, {} waited for a slot, {}/{} slots free",
                stats.uploads_started, stats.uploads_waited, stats.available, stats.max_in_flight
            );
            results
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::memory::{MemoryStore, Primitive, StoreCall};

    const CSV: &str = "Product Name,Product Category,Total Items Sold\nA,Drinks,5\n";

    fn upload(store: &str, file_name: &str) -> Upload {
        Upload {
            store_name: store.to_string(),
            tab: store.to_string(),
            file_name: file_name.to_string(),
            bytes: CSV.as_bytes().to_vec(),
        }
    }

    #[tokio::test]
    async fn test_sequential_keeps_going_after_failure() {
        let store = MemoryStore::with_tabs(&[("Rockwell", 1), ("Greenhills", 2)]);
        let uploads = vec![
            upload("Rockwell", "a.csv"),
            upload("Podium", "b.pdf"),
            upload("Greenhills", "c.csv"),
        ];

        let results =
            run_uploads(&PipelineConfig::default(), &store, &uploads, Schedule::Sequential).await;

        assert_eq!(results.len(), 3);
        assert!(results[0].is_written());
        assert!(!results[1].is_written());
        assert!(results[2].is_written());
        assert_eq!(results[2].tab, "Greenhills");
    }

    #[tokio::test]
    async fn test_concurrent_results_in_input_order() {
        let store = MemoryStore::with_tabs(&[("One", 1), ("Two", 2), ("Three", 3)]);
        let uploads = vec![
            upload("One", "1.csv"),
            upload("Two", "2.csv"),
            upload("Three", "3.csv"),
        ];

        let results = run_uploads(
            &PipelineConfig::default(),
            &store,
            &uploads,
            Schedule::concurrent(2),
        )
        .await;

        let tabs: Vec<_> = results.iter().map(|r| r.tab.as_str()).collect();
        assert_eq!(tabs, vec!["One", "Two", "Three"]);
        assert!(results.iter().all(|r| r.is_written()));

        let batches = store
            .calls()
            .iter()
            .filter(|c| matches!(c, StoreCall::BatchUpdate(_)))
            .count();
        assert_eq!(batches, 3);
    }

    #[tokio::test]
    async fn test_concurrent_write_failures_are_isolated() {
        let store = MemoryStore::with_tabs(&[("One", 1)]).fail_on(Primitive::Clear);
        let uploads = vec![upload("One", "1.csv"), upload("Two", "2.txt")];

        let results = run_uploads(
            &PipelineConfig::default(),
            &store,
            &uploads,
            Schedule::concurrent(4),
        )
        .await;

        for result in &results {
            let err = result.result.as_ref().unwrap_err();
            assert_eq!(err.kind(), "remote_write_failure");
        }
    }

    #[test]
    fn test_concurrent_schedule_clamps_zero() {
        assert_eq!(
            Schedule::concurrent(0),
            Schedule::Concurrent { max_in_flight: 1 }
        );
    }
}
