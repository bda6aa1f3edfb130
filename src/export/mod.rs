pub mod csv_export;

use anyhow::Result;

use crate::core::model::Dataset;

pub use csv_export::{read_raw_csv, RawCsvExporter, VoterCsvExporter};

pub trait Exporter {
    fn export(&self, dataset: &Dataset) -> Result<()>;
}
