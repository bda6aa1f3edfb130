//! Field cropping and OCR for one cleaned card image.
//!
//! All crop offsets come from the [`CardLayout`] template; the OCR engine is
//! an injected capability. Engine failures never escape this module: a region
//! that cannot be recognized becomes an empty field.

use image::{GrayImage, RgbImage};

use crate::core::geometry::{crop, BoxRect};
use crate::core::layout::CardLayout;
use crate::ocr::{OcrEngine, OcrMode};

pub struct FieldExtractor<'a> {
    engine: &'a dyn OcrEngine,
    layout: &'a CardLayout,
}

impl<'a> FieldExtractor<'a> {
    pub fn new(engine: &'a dyn OcrEngine, layout: &'a CardLayout) -> Self {
        Self { engine, layout }
    }

    /// Serial number from the inner sub-box.
    ///
    /// The digits are printed at the right edge of the sub-box, so after a
    /// contrast boost the rightmost ink column anchors a fixed-width crop
    /// window. A blank sub-box yields an empty string without touching the
    /// engine. The rightmost-column rule is a heuristic carried over from the
    /// source template; it assumes no trailing noise right of the digits.
    pub fn extract_serial(&self, card: &RgbImage, inner: &BoxRect) -> String {
        let roi = crop(card, inner);
        if roi.width() == 0 || roi.height() == 0 {
            return String::new();
        }
        let boosted = enhance_contrast(&roi, self.layout.serial_contrast_factor);
        let ink = ink_mask(&boosted, self.layout.serial_ink_threshold);

        let Some(rightmost) = rightmost_ink_column(&ink) else {
            return String::new();
        };
        let (start, end) = serial_window(rightmost, boosted.width(), self.layout);
        let window = crop(
            &boosted,
            &BoxRect::new(start, 0, end - start, boosted.height()),
        );

        self.recognize_or_empty(&window, OcrMode::DigitLine)
    }

    /// Identifier strip right of the inner sub-box, spanning its height.
    pub fn extract_top_right(&self, card: &RgbImage, inner: &BoxRect) -> String {
        let x = inner.width + self.layout.top_right_margin;
        if x >= card.width() {
            return String::new();
        }
        let rect = BoxRect::new(x, 0, card.width() - x, inner.height);
        let roi = crop(card, &rect);
        if roi.width() == 0 || roi.height() == 0 {
            return String::new();
        }
        self.recognize_or_empty(&roi, OcrMode::TextBlock)
    }

    /// The main text block below the inner sub-box, split into exactly
    /// `lines_per_card` trimmed lines (padded with empty strings, truncated
    /// if the engine returns more).
    pub fn extract_lines(&self, card: &RgbImage, inner: &BoxRect) -> Vec<String> {
        let margin = self.layout.text_margin;
        let y = inner.bottom() + margin;
        let width = card.width() * self.layout.text_width_num / self.layout.text_width_denom;
        let height = card.height().saturating_sub(y + margin);

        let text = if height == 0 || width <= margin {
            String::new()
        } else {
            let rect = BoxRect::new(margin, y, width, height);
            let roi = crop(card, &rect);
            self.recognize_or_empty(&roi, OcrMode::TextBlock)
        };

        pad_lines(&text, self.layout.lines_per_card)
    }

    fn recognize_or_empty(&self, region: &RgbImage, mode: OcrMode) -> String {
        match self.engine.recognize(region, mode) {
            Ok(text) => text.trim().to_string(),
            Err(_) => String::new(),
        }
    }
}

/// Linear contrast enhancement about the mean intensity, matching
/// `out = mean + (px - mean) * factor` per channel.
fn enhance_contrast(image: &RgbImage, factor: f32) -> RgbImage {
    let gray = image::imageops::grayscale(image);
    let total: u64 = gray.pixels().map(|p| p.0[0] as u64).sum();
    let count = (gray.width() * gray.height()) as u64;
    let mean = if count > 0 {
        total as f32 / count as f32
    } else {
        0.0
    };

    let mut out = image.clone();
    for p in out.pixels_mut() {
        for c in 0..3 {
            let v = mean + (p.0[c] as f32 - mean) * factor;
            p.0[c] = v.clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// Binary ink mask: pixels at or below `threshold` intensity become 255.
fn ink_mask(image: &RgbImage, threshold: u8) -> GrayImage {
    let gray = image::imageops::grayscale(image);
    imageproc::contrast::threshold(
        &gray,
        threshold,
        imageproc::contrast::ThresholdType::BinaryInverted,
    )
}

/// Index of the rightmost column containing any ink, if one exists.
fn rightmost_ink_column(ink: &GrayImage) -> Option<u32> {
    (0..ink.width())
        .rev()
        .find(|&x| (0..ink.height()).any(|y| ink.get_pixel(x, y).0[0] != 0))
}

/// Half-open column window `[start, end)` around the rightmost ink column.
fn serial_window(rightmost: u32, width: u32, layout: &CardLayout) -> (u32, u32) {
    let start = rightmost.saturating_sub(layout.serial_window_width);
    let end = (rightmost + layout.serial_tail).min(width);
    (start, end.max(start + 1))
}

/// Split raw OCR text into trimmed non-empty lines, padded or truncated to
/// exactly `n` entries.
pub fn pad_lines(text: &str, n: usize) -> Vec<String> {
    let mut lines: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
    lines.resize(n, String::new());
    lines.truncate(n);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use image::Rgb;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    /// Deterministic engine: returns canned text per mode and records the
    /// dimensions of every region it sees.
    struct StubOcr {
        digits: String,
        text: String,
        seen: RefCell<Vec<(u32, u32, OcrMode)>>,
    }

    impl StubOcr {
        fn new(digits: &str, text: &str) -> Self {
            Self {
                digits: digits.to_string(),
                text: text.to_string(),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl OcrEngine for StubOcr {
        fn recognize(&self, region: &RgbImage, mode: OcrMode) -> Result<String> {
            self.seen
                .borrow_mut()
                .push((region.width(), region.height(), mode));
            Ok(match mode {
                OcrMode::DigitLine => self.digits.clone(),
                OcrMode::TextBlock => self.text.clone(),
            })
        }
    }

    struct FailingOcr;

    impl OcrEngine for FailingOcr {
        fn recognize(&self, _region: &RgbImage, _mode: OcrMode) -> Result<String> {
            anyhow::bail!("engine down")
        }
    }

    fn strip_with_ink(width: u32, height: u32, cols: std::ops::RangeInclusive<u32>) -> RgbImage {
        let mut img = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
        for x in cols {
            for y in 0..height {
                img.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }
        img
    }

    #[test]
    fn rightmost_column_and_window_match_template_rules() {
        let layout = CardLayout::default();
        let strip = strip_with_ink(100, 10, 40..=45);
        let ink = ink_mask(&strip, layout.serial_ink_threshold);

        let rightmost = rightmost_ink_column(&ink).unwrap();
        assert_eq!(rightmost, 45);
        let (start, end) = serial_window(rightmost, 100, &layout);
        assert_eq!((start, end), (15, 50));
    }

    #[test]
    fn window_clamps_at_image_edges() {
        let layout = CardLayout::default();
        assert_eq!(serial_window(10, 100, &layout), (0, 15));
        assert_eq!(serial_window(98, 100, &layout), (68, 100));
    }

    #[test]
    fn blank_serial_box_skips_ocr() {
        let layout = CardLayout::default();
        let stub = StubOcr::new("42", "");
        let extractor = FieldExtractor::new(&stub, &layout);

        let card = RgbImage::from_pixel(120, 80, Rgb([255, 255, 255]));
        let inner = BoxRect::new(0, 0, 40, 20);
        assert_eq!(extractor.extract_serial(&card, &inner), "");
        assert!(stub.seen.borrow().is_empty());
    }

    #[test]
    fn serial_crop_uses_digit_mode() {
        let layout = CardLayout::default();
        let stub = StubOcr::new("17", "ignored");
        let extractor = FieldExtractor::new(&stub, &layout);

        let mut card = RgbImage::from_pixel(120, 80, Rgb([255, 255, 255]));
        // Ink in the serial box at columns 30..=34.
        for x in 30..35 {
            for y in 5..15 {
                card.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }
        let inner = BoxRect::new(0, 0, 40, 20);
        assert_eq!(extractor.extract_serial(&card, &inner), "17");

        let seen = stub.seen.borrow();
        assert_eq!(seen.len(), 1);
        let (w, h, mode) = seen[0];
        assert_eq!(mode, OcrMode::DigitLine);
        assert_eq!(h, 20);
        // Window [34-30, 34+5) = [4, 39).
        assert_eq!(w, 35);
    }

    #[test]
    fn top_right_crop_spans_inner_height() {
        let layout = CardLayout::default();
        let stub = StubOcr::new("", "ABC1234567");
        let extractor = FieldExtractor::new(&stub, &layout);

        let card = RgbImage::from_pixel(200, 100, Rgb([255, 255, 255]));
        let inner = BoxRect::new(0, 0, 60, 25);
        assert_eq!(extractor.extract_top_right(&card, &inner), "ABC1234567");

        let seen = stub.seen.borrow();
        let (w, h, mode) = seen[0];
        assert_eq!(mode, OcrMode::TextBlock);
        assert_eq!((w, h), (200 - 60 - 10, 25));
    }

    #[test]
    fn line_assembly_pads_and_truncates_to_four() {
        assert_eq!(pad_lines("", 4), vec!["", "", "", ""]);
        assert_eq!(
            pad_lines("Name : A\n\n  House: 7  \n", 4),
            vec!["Name : A", "House: 7", "", ""]
        );
        let ten = (1..=10)
            .map(|i| format!("line {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        let out = pad_lines(&ten, 4);
        assert_eq!(out.len(), 4);
        assert_eq!(out[3], "line 4");
    }

    #[test]
    fn engine_failure_degrades_to_empty_fields() {
        let layout = CardLayout::default();
        let extractor = FieldExtractor::new(&FailingOcr, &layout);

        let mut card = RgbImage::from_pixel(120, 80, Rgb([255, 255, 255]));
        for x in 20..30 {
            card.put_pixel(x, 10, Rgb([0, 0, 0]));
        }
        let inner = BoxRect::new(0, 0, 40, 20);

        assert_eq!(extractor.extract_serial(&card, &inner), "");
        assert_eq!(extractor.extract_top_right(&card, &inner), "");
        assert_eq!(extractor.extract_lines(&card, &inner), vec!["", "", "", ""]);
    }
}
