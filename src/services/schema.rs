use std::collections::HashMap;

use crate::models::{ColumnDefinition, ColumnType};
use crate::services::converters::DEFAULT_TEXT_LEN;

const TEXT: ColumnType = ColumnType::Text { max_len: DEFAULT_TEXT_LEN };

/// Ordered column definitions plus the subset whose conversion must succeed.
/// Built once at startup and passed by reference; never mutated.
#[derive(Debug, Clone)]
pub struct Schema {
    columns: Vec<ColumnDefinition>,
    required: Vec<&'static str>,
    index: HashMap<&'static str, usize>,
}

impl Schema {
    pub fn new(columns: Vec<ColumnDefinition>, required: Vec<&'static str>) -> Self {
        let index = columns
            .iter()
            .enumerate()
            .map(|(idx, column)| (column.name, idx))
            .collect();

        Self { columns, required, index }
    }

    /// The listing table schema.
    pub fn olx_house_price() -> Self {
        let column = |name: &'static str, column_type: ColumnType, nullable: bool| {
            ColumnDefinition { name, column_type, nullable }
        };

        Self::new(
            vec![
                column("price", ColumnType::Float, false),
                column("price_per_meter", ColumnType::Float, false),
                column("offer_type", TEXT, false),
                column("floor", ColumnType::TinyInt, true),
                column("area", ColumnType::Float, true),
                column("rooms", ColumnType::TinyInt, false),
                column("offer_type_of_building", TEXT, true),
                column("market", TEXT, false),
                column("city_name", TEXT, false),
                column("voivodeship", TEXT, false),
                column("month", TEXT, false),
                column("year", ColumnType::SmallInt, false),
                column("population", ColumnType::Int, false),
                column("longitude", ColumnType::Float, false),
                column("latitude", ColumnType::Float, false),
            ],
            vec![
                "price",
                "price_per_meter",
                "rooms",
                "year",
                "population",
                "longitude",
                "latitude",
                "offer_type",
                "market",
                "city_name",
                "voivodeship",
            ],
        )
    }

    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.index.get(name).map(|&idx| &self.columns[idx])
    }

    /// Required columns in reporting order.
    pub fn required_fields(&self) -> &[&'static str] {
        &self.required
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.contains(&name)
    }

    pub fn create_table_sql(&self, table_name: &str) -> String {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|column| {
                let name = quote_ident(column.name);
                let definition = match column.column_type {
                    ColumnType::Float => "REAL".to_string(),
                    ColumnType::TinyInt => {
                        format!("INTEGER CHECK ({} BETWEEN 0 AND 255)", name)
                    }
                    ColumnType::SmallInt => {
                        format!("INTEGER CHECK ({} BETWEEN -32768 AND 32767)", name)
                    }
                    ColumnType::Int => format!(
                        "INTEGER CHECK ({} BETWEEN -2147483648 AND 2147483647)",
                        name
                    ),
                    ColumnType::Text { max_len } => {
                        format!("TEXT CHECK (length({}) <= {})", name, max_len)
                    }
                };
                let null = if column.nullable { "NULL" } else { "NOT NULL" };
                format!("{} {} {}", name, definition, null)
            })
            .collect();

        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            quote_ident(table_name),
            columns.join(", ")
        )
    }

    pub fn insert_sql(&self, table_name: &str) -> String {
        let columns: Vec<String> = self.columns.iter().map(|c| quote_ident(c.name)).collect();
        let placeholders = vec!["?"; columns.len()].join(", ");

        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(table_name),
            columns.join(", "),
            placeholders
        )
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
