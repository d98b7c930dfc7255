use std::io::Write;
use std::process::ExitCode;

use anyhow::Result;
use tracing::{error, info};

mod cli;
mod config;
mod error;
mod logging;
mod models;
mod services;

use cli::{Cli, ReportFormat};
use error::AppError;
use services::{
    csv_reader,
    loader::BatchLoader,
    report::ImportReport,
    schema::Schema,
    scripts,
    sink::SqliteSink,
};

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    match try_main(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Import failed: {:#}", e);
            eprintln!("\n✗ Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn try_main(cli: &Cli) -> Result<()> {
    // Initialize logging
    logging::init_logging()?;

    // Load configuration
    let config = config::load_config(cli)?;
    info!("Importing {} into {}", config.csv_file.display(), config.database.display());

    let schema = Schema::olx_house_price();
    let report = run_import(&config, &schema, cli.format)?;

    match cli.format {
        ReportFormat::Text => print!("{}", report),
        ReportFormat::Json => println!("{}", report.to_json()?),
    }

    info!("Import completed successfully");
    Ok(())
}

/// Connect, load, run the follow-up scripts and close. The connection is
/// dropped on every early return, which rolls back anything uncommitted.
fn run_import(
    config: &config::Config,
    schema: &Schema,
    format: ReportFormat,
) -> Result<ImportReport, AppError> {
    let mut sink = SqliteSink::open(&config.database)?;

    if config.run_scripts {
        scripts::run_script(sink.connection(), &config.setup_script, "table setup script")?;
    }
    sink.ensure_table(schema, &config.table_name)?;

    let rows = csv_reader::read_records(&config.csv_file)?;

    // Keep stdout clean for machine-readable output
    let console: Box<dyn Write> = match format {
        ReportFormat::Text => Box::new(std::io::stdout()),
        ReportFormat::Json => Box::new(std::io::stderr()),
    };
    let outcome = BatchLoader::new(schema, &mut sink, console, config.sample_limit).load(&rows)?;

    let stored = sink.row_count(&config.table_name)?;
    info!("Table {} contains {} rows", config.table_name, stored);

    if config.run_scripts {
        scripts::run_script(sink.connection(), &config.schema_script, "schema script")?;
        scripts::run_script(sink.connection(), &config.data_script, "data script")?;
    }

    sink.close()?;

    Ok(ImportReport::new(config.csv_file.display().to_string(), outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const HEADER: &str = "price,price_per_meter,offer_type,floor,area,rooms,offer_type_of_building,market,city_name,voivodeship,month,year,population,longitude,latitude";

    fn config_in(dir: &std::path::Path, csv: &str) -> config::Config {
        let csv_file = dir.join("listings.csv");
        fs::write(&csv_file, csv).unwrap();
        config::Config {
            csv_file,
            database: dir.join("olx.db"),
            run_scripts: false,
            ..config::Config::default()
        }
    }

    #[test]
    fn imports_a_file_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let csv = format!(
            "{}\n\
             450000,\"8653,85\",Private,2,52,2,Housing Block,primary,Warszawa,Mazowieckie,January,2022,1790658,21.01,52.22\n\
             ,5000,Private,,40,2,,primary,Kraków,Małopolskie,January,2022,779115,19.94,50.06\n\
             300000,6000,Private,,50,256,,aftermarket,Gdańsk,Pomorskie,January,2022,470907,18.64,54.35\n",
            HEADER
        );
        let config = config_in(dir.path(), &csv);

        let report = run_import(&config, &Schema::olx_house_price(), ReportFormat::Json).unwrap();

        assert_eq!(report.summary.inserted, 1);
        assert_eq!(report.summary.rejected, 2);
        assert_eq!(report.summary.total, 3);
        let rows: Vec<usize> = report.samples.iter().map(|s| s.row_number).collect();
        assert_eq!(rows, vec![3, 4]);

        let sink = SqliteSink::open(&config.database).unwrap();
        assert_eq!(sink.row_count("olx_house_price").unwrap(), 1);
    }

    #[test]
    fn runs_scripts_around_the_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(
            dir.path(),
            &format!("{}\n1,1,a,1,1,1,b,c,d,e,f,2022,10,1.0,2.0\n", HEADER),
        );
        config.run_scripts = true;
        config.setup_script = dir.path().join("setup.sql");
        config.schema_script = dir.path().join("schema.sql");
        config.data_script = dir.path().join("data.sql");
        fs::write(&config.setup_script, "DROP TABLE IF EXISTS olx_house_price;\nGO\n").unwrap();
        fs::write(&config.schema_script, "CREATE TABLE city (name TEXT PRIMARY KEY);\nGO\n").unwrap();
        fs::write(
            &config.data_script,
            "INSERT INTO city SELECT DISTINCT city_name FROM olx_house_price;\nGO\n",
        )
        .unwrap();

        let report = run_import(&config, &Schema::olx_house_price(), ReportFormat::Json).unwrap();
        assert_eq!(report.summary.inserted, 1);

        let sink = SqliteSink::open(&config.database).unwrap();
        let city: String = sink
            .connection()
            .query_row("SELECT name FROM city", [], |row| row.get(0))
            .unwrap();
        assert_eq!(city, "d");
    }

    #[test]
    fn missing_csv_aborts_before_loading() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path(), "");
        config.csv_file = dir.path().join("absent.csv");

        let err = run_import(&config, &Schema::olx_house_price(), ReportFormat::Json).unwrap_err();
        assert!(matches!(err, AppError::InputNotFound(_)));
    }

    #[test]
    fn missing_setup_script_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path(), HEADER);
        config.run_scripts = true;
        config.setup_script = dir.path().join("OlxImportTable.sql");

        let err = run_import(&config, &Schema::olx_house_price(), ReportFormat::Json).unwrap_err();
        assert!(matches!(err, AppError::InputNotFound(_)));
    }
}
