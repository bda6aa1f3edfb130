//! Page rasterization via poppler.
//!
//! PDF input is rendered to per-page PNGs with `pdftoppm`; already-rendered
//! pages can instead be supplied as a directory of images. Rasterization is
//! an external collaborator of the extraction core.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct PageRenderer {
    out_dir: PathBuf,
    dpi: u32,
}

impl PageRenderer {
    pub fn new(out_dir: PathBuf, dpi: u32) -> Self {
        Self { out_dir, dpi }
    }

    /// Render every page of `pdf_path` to PNG, returning the image paths in
    /// page order.
    pub fn render_pages(&self, pdf_path: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.out_dir)?;
        let prefix = self.out_dir.join("page");
        let prefix_str = prefix
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("non-UTF8 output path not supported"))?;

        let status = Command::new("pdftoppm")
            .arg("-png")
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg(pdf_path)
            .arg(prefix_str)
            .status()
            .with_context(|| "failed to invoke pdftoppm; is poppler-utils installed?")?;

        if !status.success() {
            anyhow::bail!("pdftoppm failed with status: {status}");
        }

        // pdftoppm writes `page-<n>.png` with zero-padded page numbers, so a
        // name sort recovers page order.
        let mut pages: Vec<PathBuf> = fs::read_dir(&self.out_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.extension().is_some_and(|ext| ext == "png")
                    && p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with("page-"))
            })
            .collect();
        pages.sort();

        if pages.is_empty() {
            anyhow::bail!("pdftoppm produced no pages for {}", pdf_path.display());
        }
        Ok(pages)
    }
}

/// Page count of a PDF, via `pdfinfo`.
pub fn page_count(pdf_path: &Path) -> Result<usize> {
    let output = Command::new("pdfinfo")
        .arg(pdf_path)
        .output()
        .with_context(|| format!("failed to invoke pdfinfo on {}", pdf_path.display()))?;

    if !output.status.success() {
        anyhow::bail!("pdfinfo failed with status: {}", output.status);
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    for line in stdout.lines() {
        if let Some(rest) = line.strip_prefix("Pages:") {
            let num_str = rest.trim();
            let pages: usize = num_str.parse().with_context(|| {
                format!("failed to parse page count from 'Pages:' line: {num_str}")
            })?;
            return Ok(pages);
        }
    }

    anyhow::bail!(
        "pdfinfo output did not contain a 'Pages:' line for {}",
        pdf_path.display()
    )
}

/// Image files in `dir`, name-sorted, for pre-rendered page input.
pub fn collect_page_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut pages: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("failed to read image directory {}", dir.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| {
                    matches!(ext.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg" | "tif" | "tiff")
                })
        })
        .collect();
    pages.sort();

    if pages.is_empty() {
        anyhow::bail!("no page images found in {}", dir.display());
    }
    Ok(pages)
}
