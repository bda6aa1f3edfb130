use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use image::{Rgb, RgbImage};

use rollscan::core::layout::CardLayout;
use rollscan::ocr::{OcrEngine, OcrMode};
use rollscan::pipeline::{extract_dataset, process_page, PipelineConfig};

fn temp_output_dir(prefix: &str) -> PathBuf {
    let mut out = std::env::temp_dir();
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis();
    let pid = std::process::id();
    out.push(format!("{prefix}-{pid}-{now}"));
    out
}

/// Deterministic OCR stand-in: canned digits for digit mode, a canned
/// four-line card body for text mode.
struct StubOcr;

const CARD_BODY: &str =
    "Name : Asha Devi\nFather's Name : Ram Singh\nHouse Number : 5\nAge : 30 Gender : Female";

impl OcrEngine for StubOcr {
    fn recognize(&self, _region: &RgbImage, mode: OcrMode) -> Result<String> {
        Ok(match mode {
            OcrMode::DigitLine => "12".to_string(),
            OcrMode::TextBlock => CARD_BODY.to_string(),
        })
    }
}

const INK: Rgb<u8> = Rgb([0, 0, 0]);
const PAPER: Rgb<u8> = Rgb([255, 255, 255]);

fn draw_outline(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, stroke: u32) {
    for dy in 0..h {
        for dx in 0..w {
            let on_edge = dx < stroke || dy < stroke || dx >= w - stroke || dy >= h - stroke;
            if on_edge {
                img.put_pixel(x + dx, y + dy, INK);
            }
        }
    }
}

fn fill_block(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32) {
    for dy in 0..h {
        for dx in 0..w {
            img.put_pixel(x + dx, y + dy, INK);
        }
    }
}

/// One voter card: outlined box, serial sub-box in the top-left corner with
/// digit ink at its right edge, four text bars below.
fn draw_card(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32) {
    draw_outline(img, x, y, w, h, 3);
    // Serial sub-box, inset so it stays a separate contour from the border.
    draw_outline(img, x + 10, y + 10, 60, 30, 3);
    fill_block(img, x + 10 + 44, y + 10 + 8, 10, 14);
    // Four text lines.
    for i in 0..4u32 {
        fill_block(img, x + 15, y + 55 + i * 22, w / 2, 10);
    }
}

fn synthetic_two_card_page() -> RgbImage {
    let mut img = RgbImage::from_pixel(800, 600, PAPER);
    draw_card(&mut img, 50, 50, 350, 250);
    draw_card(&mut img, 430, 330, 300, 200);
    img
}

#[test]
fn two_card_page_yields_two_records_in_area_order() {
    let page = synthetic_two_card_page();
    let result = process_page(&page, 1, &StubOcr, &CardLayout::default());

    assert_eq!(result.skipped, 0);
    assert_eq!(result.records.len(), 2);

    // Box 1 is the larger card, box 2 the smaller one.
    assert_eq!(result.records[0].box_idx, 1);
    assert_eq!(result.records[1].box_idx, 2);

    for record in &result.records {
        assert_eq!(record.page, 1);
        assert_eq!(record.number, "12");
        assert_eq!(record.line1, "Name : Asha Devi");
        assert_eq!(record.line2, "Father's Name : Ram Singh");
        assert_eq!(record.line3, "House Number : 5");
        assert_eq!(record.line4, "Age : 30 Gender : Female");
        assert!(!record.top_right_text.is_empty());
    }

    assert_eq!(result.annotated.dimensions(), page.dimensions());
}

#[test]
fn blank_page_yields_empty_dataset_without_error() {
    let page = RgbImage::from_pixel(400, 300, PAPER);
    let result = process_page(&page, 1, &StubOcr, &CardLayout::default());

    assert_eq!(result.boxes, 0);
    assert_eq!(result.skipped, 0);
    assert!(result.records.is_empty());
}

#[test]
fn card_without_inner_box_is_skipped_and_counted() {
    // One connected component shaped so its bounding box's top-left third is
    // empty: a right-edge bar joined to a bottom bar.
    let mut page = RgbImage::from_pixel(400, 300, PAPER);
    fill_block(&mut page, 280, 50, 20, 200);
    fill_block(&mut page, 80, 230, 220, 20);

    let result = process_page(&page, 1, &StubOcr, &CardLayout::default());
    assert_eq!(result.boxes, 1);
    assert_eq!(result.skipped, 1);
    assert!(result.records.is_empty());
}

#[test]
fn pipeline_over_image_directory_isolates_bad_pages() -> Result<()> {
    let root = temp_output_dir("rollscan-pipeline");
    let input = root.join("pages");
    let output = root.join("out");
    fs::create_dir_all(&input)?;

    // A corrupt page sorting first, then a real one.
    fs::write(input.join("a_corrupt.png"), b"not a png")?;
    synthetic_two_card_page().save(input.join("b_page.png"))?;

    let mut config = PipelineConfig::new(input, output.clone(), 300);
    config.quiet = true;

    let extraction = extract_dataset(&config, &StubOcr)?;

    assert_eq!(extraction.summary.failed_pages, 1);
    assert_eq!(extraction.summary.pages, 1);
    assert_eq!(extraction.summary.cards, 2);
    assert_eq!(extraction.summary.skipped, 0);
    assert_eq!(extraction.dataset.len(), 2);
    // The decodable image was page 2 of the input sequence.
    assert!(extraction.dataset.records.iter().all(|r| r.page == 2));

    assert!(output.join("debug/page_2_boxes.png").exists());

    let _ = fs::remove_dir_all(&root);
    Ok(())
}
