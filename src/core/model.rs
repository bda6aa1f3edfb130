use serde::{Deserialize, Serialize};

/// Raw OCR output for one detected voter card.
///
/// `page` and `box_idx` are 1-based; boxes are numbered in the order the
/// locator returns them (largest area first). Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardRecord {
    pub page: usize,
    #[serde(rename = "box")]
    pub box_idx: usize,
    pub number: String,
    pub top_right_text: String,
    pub line1: String,
    pub line2: String,
    pub line3: String,
    pub line4: String,
}

impl CardRecord {
    pub fn lines(&self) -> [&str; 4] {
        [&self.line1, &self.line2, &self.line3, &self.line4]
    }

    /// True when every raw field is empty (nothing usable was recognized).
    pub fn is_blank(&self) -> bool {
        self.number.is_empty()
            && self.top_right_text.is_empty()
            && self.lines().iter().all(|l| l.is_empty())
    }
}

/// Ordered collection of card records across all pages; the sole output of
/// the extraction stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub records: Vec<CardRecord>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: CardRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Diagnostic counters accumulated over one extraction run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunSummary {
    /// Pages processed to completion.
    pub pages: usize,
    /// Cards with a located serial sub-box, emitted as records.
    pub cards: usize,
    /// Outer boxes dropped because no serial sub-box was found.
    pub skipped: usize,
    /// Pages whose image could not be decoded.
    pub failed_pages: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RelationType {
    #[serde(rename = "FTHR")]
    Father,
    #[serde(rename = "HSBN")]
    Husband,
    #[serde(rename = "OTHR")]
    Other,
}

impl RelationType {
    pub fn code(&self) -> &'static str {
        match self {
            RelationType::Father => "FTHR",
            RelationType::Husband => "HSBN",
            RelationType::Other => "OTHR",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Gender {
    M,
    F,
}

impl Gender {
    pub fn code(&self) -> &'static str {
        match self {
            Gender::M => "M",
            Gender::F => "F",
        }
    }
}

/// Typed voter record produced by the normalizer from a raw [`CardRecord`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoterRecord {
    pub part_serial_no: Option<u32>,
    pub full_name: String,
    pub relative_name: String,
    pub relation: Option<RelationType>,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub house_no: String,
    pub epic_no: String,
}
