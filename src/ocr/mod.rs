pub mod tesseract;

use anyhow::Result;
use image::RgbImage;

pub use tesseract::TesseractOcr;

/// Recognition configuration for one cropped region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcrMode {
    /// A uniform block of text, no layout assumptions.
    TextBlock,
    /// A single token of digits (serial numbers).
    DigitLine,
}

/// Text recognition capability, injected into the pipeline at construction.
///
/// Implementations are treated as opaque and potentially slow; callers that
/// cannot afford a failed region degrade errors to empty text rather than
/// propagating them.
pub trait OcrEngine {
    fn recognize(&self, region: &RgbImage, mode: OcrMode) -> Result<String>;
}
