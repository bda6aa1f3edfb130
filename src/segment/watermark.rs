use image::{GrayImage, Luma, RgbImage};
use imageproc::contours::{find_contours, Contour};
use imageproc::distance_transform::Norm;
use imageproc::drawing::draw_polygon_mut;
use imageproc::morphology::dilate;
use imageproc::point::Point;

use crate::core::layout::CardLayout;
use crate::segment::boxes::contour_area;

/// Remove the faint repeating background pattern from a card crop.
///
/// Watermark pixels sit in a mid-gray intensity band between dark ink and
/// white paper. The band mask is dilated to merge fragmented strokes, blobs
/// above the area floor become an inpainting mask, and the masked region is
/// filled from surrounding texture. Best-effort: faint genuine ink in the
/// same intensity band can be lost, a known limitation of the template.
pub fn remove_watermark(image: &RgbImage, layout: &CardLayout) -> RgbImage {
    let gray = image::imageops::grayscale(image);
    let marks = band_mask(
        &gray,
        layout.watermark_intensity_floor,
        layout.watermark_threshold,
    );
    let dilated = dilate(&marks, Norm::LInf, layout.watermark_dilate_radius);

    let blobs: Vec<Contour<u32>> = find_contours::<u32>(&dilated)
        .into_iter()
        .filter(|c| c.parent.is_none())
        .filter(|c| contour_area(c) > layout.watermark_min_area)
        .collect();

    if blobs.is_empty() {
        return image.clone();
    }

    let mut mask = GrayImage::new(image.width(), image.height());
    for blob in &blobs {
        fill_contour(&mut mask, blob);
    }

    inpaint(image, &mask, layout.inpaint_radius)
}

/// Binary mask of pixels inside the `[floor, ceiling]` intensity band.
fn band_mask(gray: &GrayImage, floor: u8, ceiling: u8) -> GrayImage {
    let mut mask = GrayImage::new(gray.width(), gray.height());
    for (x, y, p) in gray.enumerate_pixels() {
        if p.0[0] >= floor && p.0[0] <= ceiling {
            mask.put_pixel(x, y, Luma([255]));
        }
    }
    mask
}

fn fill_contour(mask: &mut GrayImage, contour: &Contour<u32>) {
    let mut poly: Vec<Point<i32>> = contour
        .points
        .iter()
        .map(|p| Point::new(p.x as i32, p.y as i32))
        .collect();
    // draw_polygon_mut rejects a closing point equal to the first.
    if poly.len() > 1 && poly.first() == poly.last() {
        poly.pop();
    }
    if poly.len() < 3 {
        for p in &poly {
            mask.put_pixel(p.x as u32, p.y as u32, Luma([255]));
        }
        return;
    }
    draw_polygon_mut(mask, &poly, Luma([255]));
}

/// Fill masked pixels from surrounding known texture, peeling the mask
/// boundary inward until nothing is left. Each filled pixel takes the mean of
/// the known pixels within `radius` (Chebyshev).
fn inpaint(image: &RgbImage, mask: &GrayImage, radius: u32) -> RgbImage {
    let (width, height) = image.dimensions();
    let mut out = image.clone();
    let mut unknown: Vec<(u32, u32)> = mask
        .enumerate_pixels()
        .filter(|(_, _, p)| p.0[0] != 0)
        .map(|(x, y, _)| (x, y))
        .collect();
    let mut known = vec![true; (width * height) as usize];
    for &(x, y) in &unknown {
        known[(y * width + x) as usize] = false;
    }

    let r = radius.max(1) as i64;
    while !unknown.is_empty() {
        let mut filled = Vec::new();
        let mut remaining = Vec::new();

        for &(x, y) in &unknown {
            let mut sum = [0u64; 3];
            let mut count = 0u64;
            for dy in -r..=r {
                for dx in -r..=r {
                    let nx = x as i64 + dx;
                    let ny = y as i64 + dy;
                    if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                        continue;
                    }
                    if known[(ny as u32 * width + nx as u32) as usize] {
                        let p = out.get_pixel(nx as u32, ny as u32);
                        sum[0] += p.0[0] as u64;
                        sum[1] += p.0[1] as u64;
                        sum[2] += p.0[2] as u64;
                        count += 1;
                    }
                }
            }
            if count > 0 {
                let px = image::Rgb([
                    (sum[0] / count) as u8,
                    (sum[1] / count) as u8,
                    (sum[2] / count) as u8,
                ]);
                filled.push((x, y, px));
            } else {
                remaining.push((x, y));
            }
        }

        if filled.is_empty() {
            // Fully masked image; nothing known to sample from.
            break;
        }
        for &(x, y, px) in &filled {
            out.put_pixel(x, y, px);
            known[(y * width + x) as usize] = true;
        }
        unknown = remaining;
    }

    out
}
