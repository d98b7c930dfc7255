//! Cell-level converters. Each one takes the raw cell text and returns the
//! typed value, or `None` when the cell is empty or does not parse.

use crate::error::ConversionFault;
use crate::models::{ColumnType, Value};

pub const DEFAULT_TEXT_LEN: usize = 50;

// Decimal commas are rewritten to periods before parsing. Thousands
// separators are not understood: "1,234.56" becomes "1.234.56" and fails.
fn normalize(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.replace(',', "."))
}

pub fn parse_float(raw: &str) -> Option<f64> {
    normalize(raw)?.parse::<f64>().ok()
}

/// Parses as a float and truncates toward zero, so "3,0" and "3.9" both give 3.
pub fn parse_int(raw: &str) -> Result<Option<i64>, ConversionFault> {
    let value = match parse_float(raw) {
        Some(v) if !v.is_nan() => v,
        _ => return Ok(None),
    };

    if value.is_infinite() {
        return Err(ConversionFault(
            "cannot convert float infinity to integer".to_string(),
        ));
    }

    // Finite values past the i64 range saturate; the range check of the
    // caller or the column constraint refuses them.
    Ok(Some(value.trunc() as i64))
}

pub fn parse_tinyint(raw: &str) -> Result<Option<u8>, ConversionFault> {
    Ok(parse_int(raw)?.and_then(|v| u8::try_from(v).ok()))
}

pub fn truncate_text(raw: &str, max_len: usize) -> Option<String> {
    if raw.trim().is_empty() {
        return None;
    }
    Some(raw.chars().take(max_len).collect())
}

impl ColumnType {
    pub fn convert(&self, raw: &str) -> Result<Option<Value>, ConversionFault> {
        let value = match self {
            ColumnType::Float => parse_float(raw).map(Value::Float),
            ColumnType::TinyInt => parse_tinyint(raw)?.map(Value::TinyInt),
            ColumnType::SmallInt | ColumnType::Int => parse_int(raw)?.map(Value::Int),
            ColumnType::Text { max_len } => truncate_text(raw, *max_len).map(Value::Text),
        };
        Ok(value)
    }
}
