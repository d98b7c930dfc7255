pub mod converters;
pub mod csv_reader;
pub mod loader;
pub mod report;
pub mod schema;
pub mod scripts;
pub mod sink;
pub mod validator;
