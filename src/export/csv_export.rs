use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::model::{CardRecord, Dataset};
use crate::export::Exporter;
use crate::normalize::normalize_dataset;

/// Writes the raw extraction output as `extracted_data.csv`, one row per
/// detected card.
#[derive(Debug, Clone)]
pub struct RawCsvExporter {
    out_dir: PathBuf,
}

impl RawCsvExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }

    pub fn path(&self) -> PathBuf {
        self.out_dir.join("extracted_data.csv")
    }
}

impl Exporter for RawCsvExporter {
    fn export(&self, dataset: &Dataset) -> Result<()> {
        fs::create_dir_all(&self.out_dir)?;
        let path = self.path();
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        for record in &dataset.records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Read a previously written raw CSV back into a [`Dataset`].
pub fn read_raw_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut dataset = Dataset::new();
    for row in reader.deserialize() {
        let record: CardRecord = row.with_context(|| format!("malformed row in {}", path.display()))?;
        dataset.push(record);
    }
    Ok(dataset)
}

/// Normalizes the dataset and writes the voter spreadsheet (`voters.csv`),
/// sorted by part serial number.
#[derive(Debug, Clone)]
pub struct VoterCsvExporter {
    out_dir: PathBuf,
}

impl VoterCsvExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }

    pub fn path(&self) -> PathBuf {
        self.out_dir.join("voters.csv")
    }
}

impl Exporter for VoterCsvExporter {
    fn export(&self, dataset: &Dataset) -> Result<()> {
        fs::create_dir_all(&self.out_dir)?;
        let path = self.path();
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;

        writer.write_record([
            "Part S.No",
            "Voter Full Name",
            "Relative's Name",
            "Relation Type",
            "Age",
            "Gender",
            "House No",
            "EPIC No",
        ])?;

        for voter in normalize_dataset(dataset) {
            writer.write_record([
                voter
                    .part_serial_no
                    .map(|n| n.to_string())
                    .unwrap_or_default(),
                voter.full_name,
                voter.relative_name,
                voter.relation.map(|r| r.code().to_string()).unwrap_or_default(),
                voter.age.map(|a| a.to_string()).unwrap_or_default(),
                voter.gender.map(|g| g.code().to_string()).unwrap_or_default(),
                voter.house_no,
                voter.epic_no,
            ])?;
        }
        writer.flush()?;
        Ok(())
    }
}
