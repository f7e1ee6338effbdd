//! Decode uploaded sales exports into header-keyed records
//!
//! Two source kinds are understood:
//! - delimited text (`.csv`, `.txt`, `.tsv`) read with the `csv` crate
//! - spreadsheet containers (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`) read with `calamine`
//!
//! In both cases the first row is the header and labels are kept verbatim.

use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use log::debug;

use super::value::RawValue;
use crate::error::PipelineError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// How the uploaded bytes are encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Delimited text with the given field separator
    Delimited { delimiter: u8 },
    /// Spreadsheet container; the first sheet is read
    Spreadsheet,
}

impl SourceKind {
    /// Infer the source kind from a file name's extension
    pub fn from_file_name(file_name: &str) -> Result<Self, PipelineError> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .ok_or_else(|| PipelineError::UnsupportedFormat {
                file_name: file_name.to_string(),
                detail: "file has no extension".to_string(),
            })?;

        match extension.as_str() {
            "csv" | "txt" => Ok(SourceKind::Delimited { delimiter: b',' }),
            "tsv" => Ok(SourceKind::Delimited { delimiter: b'\t' }),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "xla" | "ods" => Ok(SourceKind::Spreadsheet),
            other => Err(PipelineError::UnsupportedFormat {
                file_name: file_name.to_string(),
                detail: format!("unrecognized extension '.{}'", other),
            }),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Delimited { .. } => "delimited text",
            SourceKind::Spreadsheet => "spreadsheet",
        }
    }
}

/// One decoded input row, keyed by header label in column order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    fields: Vec<(String, RawValue)>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a labelled cell, keeping column order
    pub fn push(&mut self, label: impl Into<String>, value: RawValue) {
        self.fields.push((label.into(), value));
    }

    /// Builder-style variant of [`RawRecord::push`]
    #[cfg(test)]
    pub fn with(mut self, label: impl Into<String>, value: RawValue) -> Self {
        self.push(label, value);
        self
    }

    /// Iterate `(label, value)` pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.fields.iter().map(|(l, v)| (l.as_str(), v))
    }

    /// Value under an exact label
    pub fn get(&self, label: &str) -> Option<&RawValue> {
        self.fields
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v)
    }

    /// True when every cell is empty (padding rows in spreadsheets)
    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|(_, v)| v.is_empty())
    }
}

/// Decode `bytes` into records using the first row as header
pub fn parse_records(
    file_name: &str,
    bytes: &[u8],
    kind: SourceKind,
) -> Result<Vec<RawRecord>, PipelineError> {
    let records = match kind {
        SourceKind::Delimited { delimiter } => parse_delimited(file_name, bytes, delimiter)?,
        SourceKind::Spreadsheet => parse_spreadsheet(file_name, bytes)?,
    };

    debug!(
        "Decoded {} record(s) from '{}' ({})",
        records.len(),
        file_name,
        kind.label()
    );
    Ok(records)
}

fn parse_failure(file_name: &str, detail: impl Into<String>) -> PipelineError {
    PipelineError::ParseFailure {
        file_name: file_name.to_string(),
        detail: detail.into(),
    }
}

fn parse_delimited(
    file_name: &str,
    bytes: &[u8],
    delimiter: u8,
) -> Result<Vec<RawRecord>, PipelineError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    // The csv reader accepts a quoted field left open at EOF as one long value.
    if let Some(line) = unterminated_quote_line(bytes, delimiter) {
        return Err(parse_failure(
            file_name,
            format!("unterminated quoted field starting on line {}", line),
        ));
    }

    // Ragged rows are rejected
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(false)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| parse_failure(file_name, format!("invalid header row: {}", e)))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.is_empty() {
        return Ok(Vec::new());
    }

    let mut records = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let row = result.map_err(|e| {
            parse_failure(file_name, format!("data row {}: {}", row_idx + 1, e))
        })?;

        let mut record = RawRecord::new();
        for (label, field) in headers.iter().zip(row.iter()) {
            record.push(label.clone(), RawValue::Text(field.to_string()));
        }

        if !record.is_blank() {
            records.push(record);
        }
    }

    Ok(records)
}

#[derive(Clone, Copy)]
enum QuoteScan {
    FieldStart,
    Unquoted,
    Quoted,
    QuoteInQuoted,
}

/// Line of a quoted field still open at end of input, following the csv
/// reader's rules: a quote opens a field only at its start and `""` escapes.
fn unterminated_quote_line(bytes: &[u8], delimiter: u8) -> Option<usize> {
    let mut state = QuoteScan::FieldStart;
    let mut line = 1;
    let mut opened_at = 0;

    for &b in bytes {
        let boundary = b == delimiter || b == b'\n' || b == b'\r';
        state = match state {
            QuoteScan::FieldStart if b == b'"' => {
                opened_at = line;
                QuoteScan::Quoted
            }
            QuoteScan::FieldStart | QuoteScan::Unquoted | QuoteScan::QuoteInQuoted
                if boundary =>
            {
                QuoteScan::FieldStart
            }
            QuoteScan::FieldStart | QuoteScan::Unquoted => QuoteScan::Unquoted,
            QuoteScan::Quoted if b == b'"' => QuoteScan::QuoteInQuoted,
            QuoteScan::Quoted => QuoteScan::Quoted,
            QuoteScan::QuoteInQuoted if b == b'"' => QuoteScan::Quoted,
            QuoteScan::QuoteInQuoted => QuoteScan::Unquoted,
        };
        if b == b'\n' {
            line += 1;
        }
    }

    match state {
        QuoteScan::Quoted => Some(opened_at),
        _ => None,
    }
}

fn parse_spreadsheet(file_name: &str, bytes: &[u8]) -> Result<Vec<RawRecord>, PipelineError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| parse_failure(file_name, format!("unreadable workbook: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| parse_failure(file_name, "workbook has no sheets"))?
        .map_err(|e| parse_failure(file_name, format!("unreadable first sheet: {}", e)))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(header_label).collect(),
        None => return Ok(Vec::new()),
    };

    let mut records = Vec::new();
    for row in rows {
        let mut record = RawRecord::new();
        for (col, label) in headers.iter().enumerate() {
            let value = row.get(col).map(cell_to_value).unwrap_or_default();
            record.push(label.clone(), value);
        }

        if !record.is_blank() {
            records.push(record);
        }
    }

    Ok(records)
}

fn header_label(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        other => cell_to_value(other).to_string(),
    }
}

fn cell_to_value(cell: &Data) -> RawValue {
    match cell {
        Data::Empty => RawValue::Empty,
        Data::String(s) => RawValue::Text(s.clone()),
        Data::Int(i) => RawValue::Number(*i as f64),
        Data::Float(f) => RawValue::Number(*f),
        Data::Bool(b) => RawValue::Text(b.to_string()),
        Data::DateTime(dt) => RawValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => RawValue::Text(s.clone()),
        Data::DurationIso(s) => RawValue::Text(s.clone()),
        Data::Error(_) => RawValue::Empty,
    }
}
