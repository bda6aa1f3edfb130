use serde::{Deserialize, Serialize};

/// Geometry and filter constants for one electoral-roll card template.
///
/// The source documents are printed from a fixed template at a fixed DPI, so
/// every crop offset is a constant of the template rather than something
/// re-derived per card. Keeping them in one versioned structure lets a future
/// template revision ship as a new `CardLayout` value instead of code edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardLayout {
    /// Template revision tag.
    pub version: String,

    /// Cap on candidate card boxes kept per page.
    pub max_cards_per_page: usize,
    /// The serial sub-box is searched in the top-left `1/n` of the card,
    /// in both dimensions.
    pub inner_search_divisor: u32,

    /// Intensity threshold separating faint watermark marks from dark ink.
    pub watermark_threshold: u8,
    /// Lower bound of the watermark intensity band; darker pixels are treated
    /// as genuine ink and left alone.
    pub watermark_intensity_floor: u8,
    /// Chebyshev dilation radius merging fragmented watermark strokes.
    pub watermark_dilate_radius: u8,
    /// Minimum contour area (px^2) for a blob to count as watermark.
    pub watermark_min_area: f64,
    /// Neighborhood radius used when filling the watermark mask.
    pub inpaint_radius: u32,

    /// Linear contrast gain applied to the serial sub-box before binarizing.
    pub serial_contrast_factor: f32,
    /// Binarization threshold for locating ink columns in the serial box.
    pub serial_ink_threshold: u8,
    /// Width of the crop window around the rightmost ink column.
    pub serial_window_width: u32,
    /// Extra columns kept past the rightmost ink column.
    pub serial_tail: u32,

    /// Horizontal gap between the serial sub-box and the identifier strip.
    pub top_right_margin: u32,
    /// Margin around the main text block crop.
    pub text_margin: u32,
    /// The main text block spans `text_width_num / text_width_denom` of the
    /// card width.
    pub text_width_num: u32,
    pub text_width_denom: u32,
    /// Expected number of text lines per card.
    pub lines_per_card: usize,
}

impl Default for CardLayout {
    fn default() -> Self {
        Self {
            version: "v1".to_string(),
            max_cards_per_page: 30,
            inner_search_divisor: 3,
            watermark_threshold: 180,
            watermark_intensity_floor: 100,
            watermark_dilate_radius: 2,
            watermark_min_area: 100.0,
            inpaint_radius: 3,
            serial_contrast_factor: 2.0,
            serial_ink_threshold: 200,
            serial_window_width: 30,
            serial_tail: 5,
            top_right_margin: 10,
            text_margin: 5,
            text_width_num: 2,
            text_width_denom: 3,
            lines_per_card: 4,
        }
    }
}
