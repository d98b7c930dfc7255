use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{ImportSummary, RejectSample};
use crate::services::loader::LoadOutcome;

const MAX_DISPLAY_LEN: usize = 100;
const EMPTY_PLACEHOLDER: &str = "[EMPTY]";

#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub source: String,
    pub finished_at: DateTime<Utc>,
    pub summary: ImportSummary,
    pub samples: Vec<RejectSample>,
}

impl ImportReport {
    pub fn new(source: impl Into<String>, outcome: LoadOutcome) -> Self {
        Self {
            source: source.into(),
            finished_at: Utc::now(),
            summary: outcome.summary,
            samples: outcome.samples,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn display_value(raw: &str) -> String {
    if raw.is_empty() {
        EMPTY_PLACEHOLDER.to_string()
    } else if raw.chars().count() > MAX_DISPLAY_LEN {
        format!("{}...", raw.chars().take(MAX_DISPLAY_LEN).collect::<String>())
    } else {
        raw.to_string()
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "✓ Import Summary:")?;
        writeln!(f, "  Rows inserted: {}", self.summary.inserted)?;
        writeln!(f, "  Rows rejected: {}", self.summary.rejected)?;
        writeln!(f, "  Total rows: {}", self.summary.total)?;

        if self.samples.is_empty() {
            return Ok(());
        }

        writeln!(f)?;
        writeln!(f, "Sample of rejected rows (first {}):", self.samples.len())?;
        for sample in &self.samples {
            writeln!(f)?;
            writeln!(f, "  Row {}", sample.row_number)?;
            writeln!(f, "  Validation errors:")?;
            for error in &sample.field_errors {
                writeln!(f, "  {}", error)?;
            }
            writeln!(f, "  Raw values:")?;
            for (field, raw) in &sample.raw_values {
                writeln!(f, "    {}: {}", field, display_value(raw))?;
            }
        }
        Ok(())
    }
}
