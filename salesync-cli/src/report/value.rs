//! Loosely-typed cell values as decoded from a sales export

use serde::{Deserialize, Serialize};

/// A single decoded cell, before any interpretation by the resolver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", content = "value")]
pub enum RawValue {
    /// Empty cell
    #[default]
    Empty,
    /// Text exactly as decoded
    Text(String),
    /// Numeric cell (spreadsheet sources only)
    Number(f64),
}

impl RawValue {
    /// Check if this cell carries nothing useful
    pub fn is_empty(&self) -> bool {
        match self {
            RawValue::Empty => true,
            RawValue::Text(s) => s.trim().is_empty(),
            RawValue::Number(_) => false,
        }
    }

    /// Trimmed text content, if any
    ///
    /// Numbers are rendered the way a spreadsheet shows them, so a product
    /// literally named `2024` still resolves.
    pub fn as_text(&self) -> Option<String> {
        match self {
            RawValue::Empty => None,
            RawValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            RawValue::Number(n) => Some(format_number(*n)),
        }
    }

    /// Numeric coercion, `None` when the value is not a finite number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            RawValue::Empty => None,
            RawValue::Number(n) if n.is_finite() => Some(*n),
            RawValue::Number(_) => None,
            RawValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }

    /// Coerce to a sold count: truncated toward zero, must be non-negative
    pub fn as_count(&self) -> Option<u64> {
        let truncated = self.as_number()?.trunc();
        if truncated < 0.0 || truncated > u64::MAX as f64 {
            return None;
        }
        Some(truncated as u64)
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl std::fmt::Display for RawValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawValue::Empty => write!(f, "(empty)"),
            RawValue::Text(s) => write!(f, "{}", s),
            RawValue::Number(n) => write!(f, "{}", format_number(*n)),
        }
    }
}
