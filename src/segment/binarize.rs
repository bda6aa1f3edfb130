use image::{GrayImage, RgbImage};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use imageproc::filter::median_filter;

/// Turn a color page image into a binary mask suitable for contour
/// detection: ink and card borders become foreground (255), paper 0.
///
/// Grayscale, a 3x3 median filter to knock out scan speckle without smearing
/// edges, then an Otsu split with inverted polarity. Deterministic; a uniform
/// page produces an all-background mask.
pub fn binarize(image: &RgbImage) -> GrayImage {
    let gray = image::imageops::grayscale(image);
    let denoised = median_filter(&gray, 1, 1);
    let level = otsu_level(&denoised);
    threshold(&denoised, level, ThresholdType::BinaryInverted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn ink_becomes_foreground() {
        // White page with a dark 8x8 block.
        let mut img = RgbImage::from_pixel(32, 32, Rgb([255, 255, 255]));
        for y in 10..18 {
            for x in 10..18 {
                img.put_pixel(x, y, Rgb([10, 10, 10]));
            }
        }
        let mask = binarize(&img);
        assert_eq!(mask.get_pixel(14, 14).0[0], 255);
        assert_eq!(mask.get_pixel(2, 2).0[0], 0);
    }

    #[test]
    fn uniform_page_yields_empty_mask() {
        let img = RgbImage::from_pixel(16, 16, Rgb([255, 255, 255]));
        let mask = binarize(&img);
        assert!(mask.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn mask_values_are_binary() {
        let mut img = RgbImage::from_pixel(20, 20, Rgb([200, 200, 200]));
        img.put_pixel(5, 5, Rgb([0, 0, 0]));
        let mask = binarize(&img);
        assert!(mask.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }
}
