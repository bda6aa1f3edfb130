//! Page segmentation: binarization, card/sub-box location, watermark removal.

pub mod binarize;
pub mod boxes;
pub mod watermark;

pub use binarize::binarize;
pub use boxes::{find_inner_box, find_outer_boxes};
pub use watermark::remove_watermark;
