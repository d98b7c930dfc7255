use std::path::Path;

use rusqlite::types::{Null, ToSqlOutput};
use rusqlite::Connection;
use tracing::{debug, error, info};

use crate::error::{AppError, SinkError};
use crate::models::{TypedRecord, Value};
use crate::services::schema::Schema;

/// Destination for validated rows.
pub trait Sink {
    /// Persist one row. An error here rejects only this row.
    fn insert(&mut self, record: &TypedRecord) -> Result<(), SinkError>;

    /// Make every accepted row durable. Failure is fatal for the run.
    fn commit_all(&mut self) -> Result<(), AppError>;
}

/// Writes rows into a SQLite table inside a single transaction.
pub struct SqliteSink {
    conn: Connection,
    insert_sql: Option<String>,
}

impl SqliteSink {
    pub fn open(path: &Path) -> Result<Self, AppError> {
        info!("Opening database at {}", path.display());
        let conn = Connection::open(path).map_err(|e| {
            error!("Failed to open database {}: {}", path.display(), e);
            AppError::DatabaseError(e.to_string())
        })?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, AppError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            error!("Failed to open in-memory database: {}", e);
            AppError::DatabaseError(e.to_string())
        })?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, AppError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        debug!("Database connection ready");
        Ok(Self { conn, insert_sql: None })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Creates the target table unless a setup script already did, and
    /// points subsequent inserts at it.
    pub fn ensure_table(&mut self, schema: &Schema, table_name: &str) -> Result<(), AppError> {
        let create_table_sql = schema.create_table_sql(table_name);
        debug!("Create table SQL: {}", create_table_sql);

        self.conn.execute(&create_table_sql, []).map_err(|e| {
            error!("Failed to create table {}: {}", table_name, e);
            AppError::DatabaseError(e.to_string())
        })?;

        let insert_sql = schema.insert_sql(table_name);
        debug!("Insert SQL template: {}", insert_sql);
        self.insert_sql = Some(insert_sql);
        Ok(())
    }

    pub fn row_count(&self, table_name: &str) -> Result<i64, AppError> {
        let sql = format!("SELECT COUNT(*) FROM \"{}\"", table_name.replace('"', "\"\""));
        Ok(self.conn.query_row(&sql, [], |row| row.get(0))?)
    }

    /// Releases the connection. Rows not yet committed are rolled back.
    pub fn close(self) -> Result<(), AppError> {
        self.conn.close().map_err(|(_, e)| {
            error!("Failed to close database: {}", e);
            AppError::DatabaseError(e.to_string())
        })?;
        info!("Database connection closed");
        Ok(())
    }
}

fn to_sql(value: &Option<Value>) -> ToSqlOutput<'_> {
    match value {
        None => ToSqlOutput::from(Null),
        Some(Value::Float(v)) => ToSqlOutput::from(*v),
        Some(Value::TinyInt(v)) => ToSqlOutput::from(i64::from(*v)),
        Some(Value::Int(v)) => ToSqlOutput::from(*v),
        Some(Value::Text(v)) => ToSqlOutput::from(v.as_str()),
    }
}

impl Sink for SqliteSink {
    fn insert(&mut self, record: &TypedRecord) -> Result<(), SinkError> {
        let insert_sql = self
            .insert_sql
            .as_deref()
            .ok_or_else(|| SinkError::Rejected("target table not prepared".to_string()))?;

        if self.conn.is_autocommit() {
            self.conn.execute_batch("BEGIN")?;
        }

        let params: Vec<ToSqlOutput> = record.values.iter().map(|(_, v)| to_sql(v)).collect();
        let param_refs: Vec<&dyn rusqlite::ToSql> =
            params.iter().map(|p| p as &dyn rusqlite::ToSql).collect();

        let mut stmt = self.conn.prepare_cached(insert_sql)?;
        stmt.execute(param_refs.as_slice())?;
        Ok(())
    }

    fn commit_all(&mut self) -> Result<(), AppError> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("COMMIT").map_err(|e| {
                error!("Failed to commit inserted rows: {}", e);
                AppError::DatabaseError(e.to_string())
            })?;
        }
        info!("Committed inserted rows");
        Ok(())
    }
}
