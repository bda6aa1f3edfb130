use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};
use image::RgbImage;

use crate::ocr::{OcrEngine, OcrMode};

/// OCR adapter shelling out to the `tesseract` binary.
///
/// Each call writes the region to a PNG under the work directory and reads
/// recognized text from tesseract's stdout. The binary path and language are
/// explicit configuration, not process-wide state, so a test double can stand
/// in for the whole engine.
#[derive(Debug)]
pub struct TesseractOcr {
    binary: PathBuf,
    lang: String,
    work_dir: PathBuf,
    counter: AtomicU64,
}

impl TesseractOcr {
    pub fn new(work_dir: PathBuf) -> Self {
        Self {
            binary: PathBuf::from("tesseract"),
            lang: "eng".to_string(),
            work_dir,
            counter: AtomicU64::new(0),
        }
    }

    pub fn with_binary(mut self, binary: PathBuf) -> Self {
        self.binary = binary;
        self
    }

    pub fn with_lang(mut self, lang: String) -> Self {
        self.lang = lang;
        self
    }

    fn write_region(&self, region: &RgbImage) -> Result<PathBuf> {
        fs::create_dir_all(&self.work_dir)?;
        let id = self.counter.fetch_add(1, Ordering::Relaxed);
        let path = self
            .work_dir
            .join(format!("region_{}_{id}.png", std::process::id()));
        region
            .save(&path)
            .with_context(|| format!("failed to write OCR region to {}", path.display()))?;
        Ok(path)
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, region: &RgbImage, mode: OcrMode) -> Result<String> {
        let path = self.write_region(region)?;

        let mut cmd = Command::new(&self.binary);
        cmd.arg(&path).arg("stdout").arg("-l").arg(&self.lang);
        match mode {
            OcrMode::TextBlock => {
                cmd.args(["--psm", "6"]);
            }
            OcrMode::DigitLine => {
                cmd.args(["--psm", "10", "--oem", "3"])
                    .args(["-c", "tessedit_char_whitelist=0123456789"]);
            }
        }

        let output = cmd
            .output()
            .with_context(|| "failed to invoke tesseract; is it installed?")?;
        let _ = fs::remove_file(&path);

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("tesseract failed with status {}: {stderr}", output.status);
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
