use std::path::PathBuf;

use anyhow::Result;
use dotenvy::dotenv;

use crate::cli::Cli;
use crate::error::AppError;
use crate::services::loader::DEFAULT_SAMPLE_LIMIT;

fn default_csv_file() -> PathBuf {
    PathBuf::from("olx_house_price_Q122.csv")
}

fn default_database() -> PathBuf {
    PathBuf::from("olx_qa.db")
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub csv_file: PathBuf,
    pub database: PathBuf,
    pub table_name: String,
    pub setup_script: PathBuf,
    pub schema_script: PathBuf,
    pub data_script: PathBuf,
    pub run_scripts: bool,
    pub sample_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            csv_file: default_csv_file(),
            database: default_database(),
            table_name: "olx_house_price".to_string(),
            setup_script: PathBuf::from("OlxImportTable.sql"),
            schema_script: PathBuf::from("OlxSchema.sql"),
            data_script: PathBuf::from("OlxData.sql"),
            run_scripts: true,
            sample_limit: DEFAULT_SAMPLE_LIMIT,
        }
    }
}

impl Config {
    pub fn new() -> Result<Self> {
        // Load .env file first
        dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(v) = lookup("LISTING_IMPORT_CSV") {
            config.csv_file = PathBuf::from(v);
        }
        if let Some(v) = lookup("LISTING_IMPORT_DB") {
            config.database = PathBuf::from(v);
        }
        if let Some(v) = lookup("LISTING_IMPORT_TABLE") {
            config.table_name = v;
        }
        if let Some(v) = lookup("LISTING_IMPORT_SETUP_SQL") {
            config.setup_script = PathBuf::from(v);
        }
        if let Some(v) = lookup("LISTING_IMPORT_SCHEMA_SQL") {
            config.schema_script = PathBuf::from(v);
        }
        if let Some(v) = lookup("LISTING_IMPORT_DATA_SQL") {
            config.data_script = PathBuf::from(v);
        }
        if let Some(v) = lookup("LISTING_IMPORT_SAMPLE_LIMIT") {
            config.sample_limit = v
                .parse()
                .map_err(|e| {
                    AppError::ConfigError(format!("Invalid LISTING_IMPORT_SAMPLE_LIMIT '{}': {}", v, e))
                })?;
        }

        Ok(config)
    }

    /// Command-line flags win over the environment.
    pub fn apply_cli(mut self, cli: &Cli) -> Self {
        if let Some(path) = &cli.csv {
            self.csv_file = path.clone();
        }
        if let Some(path) = &cli.database {
            self.database = path.clone();
        }
        if let Some(table) = &cli.table {
            self.table_name = table.clone();
        }
        if let Some(path) = &cli.setup_sql {
            self.setup_script = path.clone();
        }
        if let Some(path) = &cli.schema_sql {
            self.schema_script = path.clone();
        }
        if let Some(path) = &cli.data_sql {
            self.data_script = path.clone();
        }
        if let Some(limit) = cli.sample_limit {
            self.sample_limit = limit;
        }
        if cli.skip_scripts {
            self.run_scripts = false;
        }
        self
    }
}

pub fn load_config(cli: &Cli) -> Result<Config> {
    Ok(Config::new()?.apply_cli(cli))
}
