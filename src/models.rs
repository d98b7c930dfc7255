use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use smallvec::SmallVec;

/// Header name → cell text, as produced by the CSV reader. Cells the file
/// does not carry are simply absent.
pub type RawRecord = HashMap<String, String>;

/// Target type of a column. Each variant selects its converter. Variants are
/// named after the SQL column types: `TinyInt` is the 0..=255 type,
/// `SmallInt` the 16-bit one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Float,
    /// 0..=255
    TinyInt,
    /// 16-bit integer column; converted like `Int`, width enforced by the sink.
    SmallInt,
    /// 32-bit integer column; width enforced by the sink.
    Int,
    Text { max_len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDefinition {
    pub name: &'static str,
    pub column_type: ColumnType,
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Float(f64),
    TinyInt(u8),
    Int(i64),
    Text(String),
}

/// Converted values in schema declaration order. `None` is SQL NULL.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypedRecord {
    pub values: Vec<(&'static str, Option<Value>)>,
}

impl TypedRecord {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(name, _)| *name == column)
            .and_then(|(_, value)| value.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub column: String,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.column, self.message)
    }
}

pub type FieldErrors = SmallVec<[FieldError; 4]>;

#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub record: TypedRecord,
    pub valid: bool,
    pub field_errors: FieldErrors,
    /// Trimmed raw text of every schema column, keyed by column name.
    pub raw_values: HashMap<&'static str, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectSample {
    pub row_number: usize,
    pub field_errors: FieldErrors,
    /// Raw text of the required fields, in required-field order.
    pub raw_values: Vec<(String, String)>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub inserted: usize,
    pub rejected: usize,
    pub total: usize,
}
