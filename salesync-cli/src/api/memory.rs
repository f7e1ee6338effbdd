//! In-memory [`SheetStore`] used by pipeline tests

use std::collections::HashSet;
use std::sync::Mutex;

use anyhow::{Result, bail};
use async_trait::async_trait;
use serde_json::Value;

use super::formatting::FormattingOp;
use super::models::{SheetMetadata, SheetProperties, SpreadsheetMetadata};
use super::store::SheetStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Clear,
    Write,
    Metadata,
    BatchUpdate,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Clear(String),
    Write { range: String, rows: Vec<Vec<Value>> },
    Metadata,
    BatchUpdate(Vec<FormattingOp>),
}

/// Records every call; selected primitives can be made to fail
#[derive(Debug, Default)]
pub struct MemoryStore {
    metadata: Mutex<SpreadsheetMetadata>,
    calls: Mutex<Vec<StoreCall>>,
    failing: Mutex<HashSet<Primitive>>,
}

impl MemoryStore {
    pub fn with_tabs(tabs: &[(&str, i32)]) -> Self {
        let sheets = tabs
            .iter()
            .map(|(title, id)| SheetMetadata {
                properties: SheetProperties {
                    sheet_id: *id,
                    title: title.to_string(),
                },
                banded_ranges: Vec::new(),
            })
            .collect();
        Self {
            metadata: Mutex::new(SpreadsheetMetadata { sheets }),
            ..Self::default()
        }
    }

    pub fn with_metadata(metadata: SpreadsheetMetadata) -> Self {
        Self {
            metadata: Mutex::new(metadata),
            ..Self::default()
        }
    }

    pub fn fail_on(self, primitive: Primitive) -> Self {
        self.failing.lock().unwrap().insert(primitive);
        self
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: StoreCall, primitive: Primitive) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.failing.lock().unwrap().contains(&primitive) {
            bail!("simulated {:?} failure", primitive);
        }
        Ok(())
    }
}

#[async_trait]
impl SheetStore for MemoryStore {
    async fn clear_range(&self, range: &str) -> Result<()> {
        self.record(StoreCall::Clear(range.to_string()), Primitive::Clear)
    }

    async fn write_rows(&self, range: &str, rows: Vec<Vec<Value>>) -> Result<()> {
        self.record(
            StoreCall::Write {
                range: range.to_string(),
                rows,
            },
            Primitive::Write,
        )
    }

    async fn fetch_metadata(&self) -> Result<SpreadsheetMetadata> {
        self.record(StoreCall::Metadata, Primitive::Metadata)?;
        Ok(self.metadata.lock().unwrap().clone())
    }

    async fn batch_update(&self, ops: &[FormattingOp]) -> Result<()> {
        self.record(StoreCall::BatchUpdate(ops.to_vec()), Primitive::BatchUpdate)
    }
}
