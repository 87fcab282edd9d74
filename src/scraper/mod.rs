//! Running the external Beatport scraper and importing what it writes.

mod csv_import;
mod runner;

pub use csv_import::{
    csv_file_name, date_from_file_name, import_csv_file, read_observations,
    CsvImportError, ImportReport, RejectedRow, CSV_FILE_PREFIX,
};
pub use runner::{ScrapeError, ScrapeOutcome, ScrapeRunner};
