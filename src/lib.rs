pub mod core;
pub mod export;
pub mod extract;
pub mod normalize;
pub mod ocr;
pub mod pipeline;
pub mod render;
pub mod segment;

pub use core::layout::CardLayout;
pub use core::model::{CardRecord, Dataset, RunSummary, VoterRecord};
