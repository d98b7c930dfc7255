use std::io::Write;

use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::models::{ImportSummary, RawRecord, RejectSample, ValidationResult};
use crate::services::schema::Schema;
use crate::services::sink::Sink;
use crate::services::validator::validate_row;

pub const DEFAULT_SAMPLE_LIMIT: usize = 20;
const PROGRESS_INTERVAL: usize = 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome {
    pub summary: ImportSummary,
    pub samples: Vec<RejectSample>,
}

/// Routes every row to the sink or the reject tally, in input order.
pub struct BatchLoader<'a, S: Sink, W: Write> {
    schema: &'a Schema,
    sink: &'a mut S,
    console: W,
    sample_limit: usize,
}

impl<'a, S: Sink, W: Write> BatchLoader<'a, S, W> {
    pub fn new(schema: &'a Schema, sink: &'a mut S, console: W, sample_limit: usize) -> Self {
        Self { schema, sink, console, sample_limit }
    }

    /// `rows` pairs each record with its spreadsheet row number.
    pub fn load(&mut self, rows: &[(usize, RawRecord)]) -> Result<LoadOutcome, AppError> {
        info!("Validating and inserting {} rows", rows.len());

        let mut summary = ImportSummary::default();
        let mut samples = Vec::new();

        for (idx, (row_number, raw)) in rows.iter().enumerate() {
            if idx % PROGRESS_INTERVAL == 0 {
                debug!("Processing row {}/{}", idx, rows.len());
            }

            let result = validate_row(self.schema, raw);

            if !result.valid {
                summary.rejected += 1;
                if samples.len() < self.sample_limit {
                    samples.push(self.sample(*row_number, result));
                }
                continue;
            }

            match self.sink.insert(&result.record) {
                Ok(()) => summary.inserted += 1,
                Err(e) => {
                    summary.rejected += 1;
                    warn!("Row {} rejected by database: {}", row_number, e);
                    writeln!(self.console, "✗ Row {}: {}", row_number, e)?;
                }
            }
        }

        self.sink.commit_all()?;

        summary.total = summary.inserted + summary.rejected;
        info!(
            "Load finished: {} inserted, {} rejected, {} total",
            summary.inserted, summary.rejected, summary.total
        );

        Ok(LoadOutcome { summary, samples })
    }

    fn sample(&self, row_number: usize, result: ValidationResult) -> RejectSample {
        let raw_values = self
            .schema
            .required_fields()
            .iter()
            .map(|field| {
                let raw = result.raw_values.get(field).cloned().unwrap_or_default();
                (field.to_string(), raw)
            })
            .collect();

        RejectSample {
            row_number,
            field_errors: result.field_errors,
            raw_values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SinkError;
    use crate::models::{TypedRecord, Value};
    use crate::services::sink::SqliteSink;
    use crate::services::validator::tests::valid_listing;

    #[derive(Default)]
    struct RecordingSink {
        rows: Vec<TypedRecord>,
        refuse_city: Option<&'static str>,
        commits: usize,
    }

    impl Sink for RecordingSink {
        fn insert(&mut self, record: &TypedRecord) -> Result<(), SinkError> {
            if let (Some(city), Some(Value::Text(actual))) =
                (self.refuse_city, record.get("city_name"))
            {
                if actual == city {
                    return Err(SinkError::Rejected("constraint violation".into()));
                }
            }
            self.rows.push(record.clone());
            Ok(())
        }

        fn commit_all(&mut self) -> Result<(), AppError> {
            self.commits += 1;
            Ok(())
        }
    }

    struct FailingCommit;

    impl Sink for FailingCommit {
        fn insert(&mut self, _record: &TypedRecord) -> Result<(), SinkError> {
            Ok(())
        }

        fn commit_all(&mut self) -> Result<(), AppError> {
            Err(AppError::DatabaseError("disk I/O error".into()))
        }
    }

    fn numbered(records: Vec<RawRecord>) -> Vec<(usize, RawRecord)> {
        records.into_iter().enumerate().map(|(i, r)| (i + 2, r)).collect()
    }

    fn with(field: &str, value: &str) -> RawRecord {
        let mut raw = valid_listing();
        raw.insert(field.to_string(), value.to_string());
        raw
    }

    #[test]
    fn header_plus_three_rows_scenario() {
        let schema = Schema::olx_house_price();
        let mut sink = RecordingSink::default();
        let rows = numbered(vec![valid_listing(), with("price", ""), with("rooms", "256")]);

        let outcome = BatchLoader::new(&schema, &mut sink, Vec::new(), DEFAULT_SAMPLE_LIMIT)
            .load(&rows)
            .unwrap();

        assert_eq!(outcome.summary, ImportSummary { inserted: 1, rejected: 2, total: 3 });
        let sampled: Vec<usize> = outcome.samples.iter().map(|s| s.row_number).collect();
        assert_eq!(sampled, vec![3, 4]);
        assert_eq!(sink.rows.len(), 1);
        assert_eq!(sink.commits, 1);
    }

    #[test]
    fn invalid_optional_field_still_inserts() {
        let schema = Schema::olx_house_price();
        let mut sink = RecordingSink::default();
        let rows = numbered(vec![with("floor", "ground")]);

        let outcome = BatchLoader::new(&schema, &mut sink, Vec::new(), DEFAULT_SAMPLE_LIMIT)
            .load(&rows)
            .unwrap();

        assert_eq!(outcome.summary.inserted, 1);
        assert_eq!(sink.rows[0].get("floor"), None);
    }

    #[test]
    fn sample_list_is_capped() {
        let schema = Schema::olx_house_price();
        let mut sink = RecordingSink::default();
        let rows = numbered((0..45).map(|_| with("latitude", "north")).collect());

        let outcome = BatchLoader::new(&schema, &mut sink, Vec::new(), DEFAULT_SAMPLE_LIMIT)
            .load(&rows)
            .unwrap();

        assert_eq!(outcome.summary.rejected, 45);
        assert_eq!(outcome.samples.len(), DEFAULT_SAMPLE_LIMIT);
        assert_eq!(outcome.samples[0].row_number, 2);
        assert_eq!(outcome.samples[19].row_number, 21);
    }

    #[test]
    fn sample_holds_required_raw_values_in_order() {
        let schema = Schema::olx_house_price();
        let mut sink = RecordingSink::default();
        let rows = numbered(vec![with("year", "n/a")]);

        let outcome = BatchLoader::new(&schema, &mut sink, Vec::new(), DEFAULT_SAMPLE_LIMIT)
            .load(&rows)
            .unwrap();

        let sample = &outcome.samples[0];
        let fields: Vec<&str> = sample.raw_values.iter().map(|(f, _)| f.as_str()).collect();
        assert_eq!(fields, schema.required_fields().to_vec());
        assert!(sample.raw_values.contains(&("year".to_string(), "n/a".to_string())));
        assert_eq!(sample.field_errors.len(), 1);
    }

    #[test]
    fn sink_failure_is_reported_inline_and_not_sampled() {
        let schema = Schema::olx_house_price();
        let mut sink = RecordingSink { refuse_city: Some("Gdańsk"), ..Default::default() };
        let rows = numbered(vec![valid_listing(), with("city_name", "Gdańsk"), valid_listing()]);
        let mut console = Vec::new();

        let outcome = BatchLoader::new(&schema, &mut sink, &mut console, DEFAULT_SAMPLE_LIMIT)
            .load(&rows)
            .unwrap();

        assert_eq!(outcome.summary, ImportSummary { inserted: 2, rejected: 1, total: 3 });
        assert!(outcome.samples.is_empty());
        assert_eq!(String::from_utf8(console).unwrap(), "✗ Row 3: constraint violation\n");
    }

    #[test]
    fn counts_always_add_up() {
        let schema = Schema::olx_house_price();
        let mut sink = RecordingSink { refuse_city: Some("Łódź"), ..Default::default() };
        let mut records = Vec::new();
        for i in 0..100 {
            records.push(match i % 4 {
                0 => valid_listing(),
                1 => with("market", ""),
                2 => with("city_name", "Łódź"),
                _ => with("area", "big"),
            });
        }
        let rows = numbered(records);

        let outcome = BatchLoader::new(&schema, &mut sink, Vec::new(), DEFAULT_SAMPLE_LIMIT)
            .load(&rows)
            .unwrap();

        let summary = outcome.summary;
        assert_eq!(summary.inserted + summary.rejected, rows.len());
        assert_eq!(summary.total, rows.len());
        assert_eq!(summary.inserted, 50);
    }

    #[test]
    fn empty_input_still_commits() {
        let schema = Schema::olx_house_price();
        let mut sink = RecordingSink::default();

        let outcome = BatchLoader::new(&schema, &mut sink, Vec::new(), DEFAULT_SAMPLE_LIMIT)
            .load(&[])
            .unwrap();

        assert_eq!(outcome.summary, ImportSummary::default());
        assert_eq!(sink.commits, 1);
    }

    #[test]
    fn commit_failure_is_fatal() {
        let schema = Schema::olx_house_price();
        let rows = numbered(vec![valid_listing()]);

        let err = BatchLoader::new(&schema, &mut FailingCommit, Vec::new(), DEFAULT_SAMPLE_LIMIT)
            .load(&rows)
            .unwrap_err();

        assert!(matches!(err, AppError::DatabaseError(_)));
    }

    #[test]
    fn loads_into_sqlite_in_input_order() {
        let schema = Schema::olx_house_price();
        let mut sink = SqliteSink::open_in_memory().unwrap();
        sink.ensure_table(&schema, "olx_house_price").unwrap();
        let rows = numbered(vec![
            with("city_name", "Kraków"),
            with("year", "99999"),
            with("population", "1e30"),
            with("city_name", "Poznań"),
        ]);
        let mut console = Vec::new();

        let outcome = BatchLoader::new(&schema, &mut sink, &mut console, DEFAULT_SAMPLE_LIMIT)
            .load(&rows)
            .unwrap();

        assert_eq!(outcome.summary, ImportSummary { inserted: 2, rejected: 2, total: 4 });
        assert!(outcome.samples.is_empty());
        let console = String::from_utf8(console).unwrap();
        assert!(console.starts_with("✗ Row 3: "));
        assert!(console.contains("✗ Row 4: "));

        let mut stmt = sink
            .connection()
            .prepare("SELECT city_name FROM olx_house_price ORDER BY rowid")
            .unwrap();
        let cities: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(cities, vec!["Kraków", "Poznań"]);
    }
}
