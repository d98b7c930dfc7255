use std::collections::HashMap;

use tracing::trace;

use crate::models::{FieldError, FieldErrors, RawRecord, TypedRecord, ValidationResult};
use crate::services::schema::Schema;

/// Converts one raw record column by column in schema order.
///
/// Only required columns can fail a row by converting to nothing; an
/// unparseable optional column is stored as NULL. A converter fault is
/// always recorded and therefore always fails the row.
pub fn validate_row(schema: &Schema, raw: &RawRecord) -> ValidationResult {
    let mut record = TypedRecord::default();
    let mut field_errors = FieldErrors::new();
    let mut raw_values = HashMap::with_capacity(schema.columns().len());

    for column in schema.columns() {
        let raw_value = raw.get(column.name).map(|v| v.trim()).unwrap_or("");

        let converted = match column.column_type.convert(raw_value) {
            Ok(value) => value,
            Err(fault) => {
                trace!("Converter fault on {}: {}", column.name, fault);
                field_errors.push(FieldError {
                    column: column.name.to_string(),
                    message: fault.to_string(),
                });
                None
            }
        };

        if converted.is_none() && schema.is_required(column.name) {
            field_errors.push(FieldError {
                column: column.name.to_string(),
                message: format!("Missing or invalid (raw value: '{}')", raw_value),
            });
        }

        raw_values.insert(column.name, raw_value.to_string());
        record.values.push((column.name, converted));
    }

    ValidationResult {
        record,
        valid: field_errors.is_empty(),
        field_errors,
        raw_values,
    }
}
