//! Command-line arguments. Every flag is optional and overrides the
//! matching `LISTING_IMPORT_*` environment variable.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Import real-estate listings from CSV into a SQLite table
#[derive(Parser, Debug)]
#[command(name = "listing_import")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// CSV file to import
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// SQLite database file
    #[arg(long)]
    pub database: Option<PathBuf>,

    /// Target table
    #[arg(long)]
    pub table: Option<String>,

    /// Script run before the load
    #[arg(long)]
    pub setup_sql: Option<PathBuf>,

    /// Script run after the load
    #[arg(long)]
    pub schema_sql: Option<PathBuf>,

    /// Script run after the schema script
    #[arg(long)]
    pub data_sql: Option<PathBuf>,

    /// Do not run any of the SQL scripts
    #[arg(long)]
    pub skip_scripts: bool,

    /// Maximum number of rejected rows to show
    #[arg(long)]
    pub sample_limit: Option<usize>,

    /// Report output format
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
