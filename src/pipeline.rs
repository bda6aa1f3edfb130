use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::core::geometry::{crop, BoxRect};
use crate::core::layout::CardLayout;
use crate::core::model::{CardRecord, Dataset, RunSummary};
use crate::extract::FieldExtractor;
use crate::ocr::OcrEngine;
use crate::render::{collect_page_images, PageRenderer};
use crate::segment::{binarize, find_inner_box, find_outer_boxes, remove_watermark};

const OUTER_BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const INNER_BOX_COLOR: Rgb<u8> = Rgb([0, 0, 255]);

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// A PDF file or a directory of pre-rendered page images.
    pub input: PathBuf,
    pub output: PathBuf,
    pub dpi: u32,
    pub layout: CardLayout,
    pub quiet: bool,
}

impl PipelineConfig {
    pub fn new(input: PathBuf, output: PathBuf, dpi: u32) -> Self {
        Self {
            input,
            output,
            dpi,
            layout: CardLayout::default(),
            quiet: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Extraction {
    pub dataset: Dataset,
    pub summary: RunSummary,
}

/// Outcome of segmenting and reading a single page.
#[derive(Debug, Clone)]
pub struct PageResult {
    pub records: Vec<CardRecord>,
    pub boxes: usize,
    pub skipped: usize,
    /// Original page with outer (green) and inner (blue) box overlays, for
    /// human review only.
    pub annotated: RgbImage,
}

/// Run the full extraction over every page of the input.
///
/// Pages are processed strictly in order. A page whose image cannot be
/// decoded is counted and skipped; only a completely unreadable input (no
/// pages at all) aborts the run. Per-page annotated images land under
/// `<output>/debug/`.
pub fn extract_dataset(config: &PipelineConfig, engine: &dyn OcrEngine) -> Result<Extraction> {
    let page_paths = if config.input.is_dir() {
        collect_page_images(&config.input)?
    } else {
        let renderer = PageRenderer::new(config.output.join("pages"), config.dpi);
        renderer.render_pages(&config.input)?
    };

    let debug_dir = config.output.join("debug");
    fs::create_dir_all(&debug_dir)?;

    let mut dataset = Dataset::new();
    let mut summary = RunSummary::default();

    for (i, path) in page_paths.iter().enumerate() {
        let page_no = i + 1;
        let image = match load_page(path) {
            Ok(image) => image,
            Err(err) => {
                eprintln!("[!] page {page_no}: {err:#}");
                summary.failed_pages += 1;
                continue;
            }
        };

        let result = process_page(&image, page_no, engine, &config.layout);
        if !config.quiet {
            println!(
                "[*] page {page_no}: {} boxes, {} cards, {} skipped",
                result.boxes,
                result.records.len(),
                result.skipped
            );
        }

        let annotated_path = debug_dir.join(format!("page_{page_no}_boxes.png"));
        result
            .annotated
            .save(&annotated_path)
            .with_context(|| format!("failed to write {}", annotated_path.display()))?;

        summary.pages += 1;
        summary.cards += result.records.len();
        summary.skipped += result.skipped;
        for record in result.records {
            dataset.push(record);
        }
    }

    Ok(Extraction { dataset, summary })
}

fn load_page(path: &Path) -> Result<RgbImage> {
    let image = image::open(path)
        .with_context(|| format!("failed to decode page image {}", path.display()))?;
    Ok(image.to_rgb8())
}

/// Segment one page and read every detected card.
///
/// Cards are visited in the locator's order (largest area first) and numbered
/// 1-based within the page, skipped cards included, so box indices are stable
/// identifiers. A card without a locatable serial sub-box produces no record.
pub fn process_page(
    image: &RgbImage,
    page_no: usize,
    engine: &dyn OcrEngine,
    layout: &CardLayout,
) -> PageResult {
    let mask = binarize(image);
    let outer_boxes = find_outer_boxes(&mask, layout);

    let mut annotated = image.clone();
    let mut records = Vec::new();
    let mut skipped = 0usize;
    let extractor = FieldExtractor::new(engine, layout);

    for (j, outer) in outer_boxes.iter().enumerate() {
        if outer.is_empty() {
            skipped += 1;
            continue;
        }
        draw_box(&mut annotated, outer, OUTER_BOX_COLOR);

        let card_mask =
            image::imageops::crop_imm(&mask, outer.x, outer.y, outer.width, outer.height)
                .to_image();
        let Some(inner) = find_inner_box(&card_mask, layout) else {
            skipped += 1;
            continue;
        };

        let card = crop(image, outer);
        let clean = remove_watermark(&card, layout);

        let number = extractor.extract_serial(&clean, &inner);
        let top_right_text = extractor.extract_top_right(&clean, &inner);
        let lines = extractor.extract_lines(&clean, &inner);

        draw_box(
            &mut annotated,
            &inner.translate(outer.x, outer.y),
            INNER_BOX_COLOR,
        );

        records.push(CardRecord {
            page: page_no,
            box_idx: j + 1,
            number,
            top_right_text,
            line1: lines.first().cloned().unwrap_or_default(),
            line2: lines.get(1).cloned().unwrap_or_default(),
            line3: lines.get(2).cloned().unwrap_or_default(),
            line4: lines.get(3).cloned().unwrap_or_default(),
        });
    }

    PageResult {
        records,
        boxes: outer_boxes.len(),
        skipped,
        annotated,
    }
}

fn draw_box(image: &mut RgbImage, rect: &BoxRect, color: Rgb<u8>) {
    if rect.is_empty() {
        return;
    }
    draw_hollow_rect_mut(
        image,
        Rect::at(rect.x as i32, rect.y as i32).of_size(rect.width, rect.height),
        color,
    );
}
