use image::GrayImage;
use imageproc::contours::{find_contours, Contour};

use crate::core::geometry::BoxRect;
use crate::core::layout::CardLayout;

/// Bounding boxes of the top-level external contours in `mask`, ordered by
/// descending traced-polygon area.
///
/// Sorting uses the contour's own area, not the bounding box's: a thin open
/// stroke (a severed card border, say) covers a large bounding box but traces
/// almost no area, and must not outrank a genuine box outline.
fn external_bounding_boxes(mask: &GrayImage) -> Vec<BoxRect> {
    let contours = find_contours::<u32>(mask);
    let mut ranked: Vec<(f64, BoxRect)> = contours
        .iter()
        .filter(|c| c.parent.is_none())
        .filter_map(|c| Some((contour_area(c), bounding_rect(c)?)))
        .collect();
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
    ranked.into_iter().map(|(_, rect)| rect).collect()
}

/// Shoelace area of a traced contour polygon. Closed outlines score their
/// enclosed area; thin open strokes score near zero.
pub(crate) fn contour_area(contour: &Contour<u32>) -> f64 {
    let pts = &contour.points;
    if pts.len() < 3 {
        return 0.0;
    }
    let mut twice_area = 0.0f64;
    for i in 0..pts.len() {
        let a = pts[i];
        let b = pts[(i + 1) % pts.len()];
        twice_area += a.x as f64 * b.y as f64 - b.x as f64 * a.y as f64;
    }
    (twice_area / 2.0).abs()
}

fn bounding_rect(contour: &Contour<u32>) -> Option<BoxRect> {
    let first = contour.points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in &contour.points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Some(BoxRect::new(
        min_x,
        min_y,
        max_x - min_x + 1,
        max_y - min_y + 1,
    ))
}

/// Candidate card boxes on a whole-page mask.
///
/// Keeps at most `layout.max_cards_per_page` boxes, ordered by descending
/// area; pages with fewer contours simply yield fewer boxes. Noise contours
/// beyond the cap are dropped.
pub fn find_outer_boxes(mask: &GrayImage, layout: &CardLayout) -> Vec<BoxRect> {
    let mut boxes = external_bounding_boxes(mask);
    boxes.truncate(layout.max_cards_per_page);
    boxes
        .into_iter()
        .map(|b| b.clamp_to(mask.width(), mask.height()))
        .collect()
}

/// The serial-number sub-box of one card, if present.
///
/// The search is restricted to the top-left third of the card's local binary
/// crop; the largest contour there wins. Coordinates stay in the card's local
/// frame. `None` means the card has no locatable serial box and is skipped by
/// the caller (a counted outcome, not an error).
pub fn find_inner_box(card_mask: &GrayImage, layout: &CardLayout) -> Option<BoxRect> {
    let w = card_mask.width() / layout.inner_search_divisor;
    let h = card_mask.height() / layout.inner_search_divisor;
    if w == 0 || h == 0 {
        return None;
    }
    let top_left = image::imageops::crop_imm(card_mask, 0, 0, w, h).to_image();
    external_bounding_boxes(&top_left).into_iter().next()
}
