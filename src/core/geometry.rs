use image::RgbImage;
use serde::{Deserialize, Serialize};

/// Axis-aligned pixel rectangle, relative to some parent image.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoxRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoxRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Shift into an enclosing frame. Inner-box local coordinates become page
    /// coordinates by translating by the outer box origin.
    pub fn translate(&self, dx: u32, dy: u32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Clip to a parent of the given dimensions, so that
    /// `right() <= parent_width` and `bottom() <= parent_height`.
    pub fn clamp_to(&self, parent_width: u32, parent_height: u32) -> Self {
        let x = self.x.min(parent_width);
        let y = self.y.min(parent_height);
        Self {
            x,
            y,
            width: self.width.min(parent_width - x),
            height: self.height.min(parent_height - y),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Copy the sub-image covered by `rect` (clamped to the image bounds).
pub fn crop(image: &RgbImage, rect: &BoxRect) -> RgbImage {
    let rect = rect.clamp_to(image.width(), image.height());
    image::imageops::crop_imm(image, rect.x, rect.y, rect.width, rect.height).to_image()
}
