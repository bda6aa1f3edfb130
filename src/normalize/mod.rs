//! Raw-field normalization: regex parsing of OCR text into typed voter
//! fields.
//!
//! Input is the raw [`CardRecord`] contract (`number`, `top_right_text`,
//! `line1..line4`); output is a [`VoterRecord`]. The patterns tolerate the
//! common OCR confusions on this template (`:` read as `!`, `l` or `+`,
//! "Age" as "Agee", "Gender" with swapped letters).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::model::{CardRecord, Dataset, Gender, RelationType, VoterRecord};

static NON_ALPHA: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z\s]").unwrap());
static NON_ALNUM_HYPHEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9\s-]").unwrap());
static NON_EPIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Z0-9]").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static NAME_AFTER_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:name|others)\s*(.*)").unwrap());
static HOUSE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"house\s*number.*?[:\s](.*)").unwrap());
static AGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)Ag[ee]\s*[:!l+]\s*(\d+)").unwrap());
static GENDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)Gen[de]r\s*[:!l+]\s*(\w+)").unwrap());

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// EPIC identifier: the top-right text stripped to uppercase letters and
/// digits.
pub fn extract_epic(text: &str) -> String {
    NON_EPIC.replace_all(text, "").to_string()
}

/// Voter name from the "Name : ..." line. Everything after the first word
/// (the label), letters only, title-cased.
pub fn extract_and_format_name(text: &str) -> String {
    let cleaned = collapse_whitespace(&NON_ALPHA.replace_all(text, ""));
    let mut parts = cleaned.split(' ');
    let _label = parts.next();
    title_case(&parts.collect::<Vec<_>>().join(" "))
}

/// Relative's name and relation code from the "Father's/Husband's Name : ..."
/// line.
pub fn extract_name_and_relation(text: &str) -> (String, Option<RelationType>) {
    let cleaned = collapse_whitespace(&NON_ALPHA.replace_all(text, " ")).to_lowercase();

    let name = NAME_AFTER_LABEL
        .captures(&cleaned)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();
    let name = title_case(&name);

    let relation = if cleaned.contains("father") {
        Some(RelationType::Father)
    } else if cleaned.contains("husband") {
        Some(RelationType::Husband)
    } else if cleaned.contains("others") {
        Some(RelationType::Other)
    } else {
        None
    };

    (name, relation)
}

/// House number from the "House Number : ..." line. An empty entry or a bare
/// hyphen is preserved as-is; anything else is trimmed of spaces and hyphens.
pub fn extract_house_number(text: &str) -> String {
    let cleaned = collapse_whitespace(&NON_ALNUM_HYPHEN.replace_all(text, " ")).to_lowercase();

    match HOUSE_NUMBER.captures(&cleaned).and_then(|c| c.get(1)) {
        Some(m) => {
            let entry = m.as_str().trim();
            if entry.is_empty() || entry == "-" {
                entry.to_string()
            } else {
                entry.trim_matches([' ', '-']).to_string()
            }
        }
        None => String::new(),
    }
}

/// Digits of the serial field before any decimal point, as an integer.
pub fn clean_number(value: &str) -> Option<u32> {
    let before_decimal = value.split('.').next().unwrap_or("");
    let digits: String = before_decimal.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

pub fn extract_age(text: &str) -> Option<u32> {
    AGE.captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

pub fn extract_gender(text: &str) -> Option<Gender> {
    if let Some(m) = GENDER.captures(text).and_then(|c| c.get(1)) {
        let word = m.as_str().to_lowercase();
        // "fe" first: "female" also contains "ma".
        if word.contains("fe") {
            return Some(Gender::F);
        }
        if word.contains("ma") {
            return Some(Gender::M);
        }
    }

    // Lenient fallback for badly mangled gender lines.
    let lower = text.to_lowercase();
    static WORD_MA: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bma").unwrap());
    static WORD_FE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bfe").unwrap());
    if WORD_MA.is_match(&lower) {
        Some(Gender::M)
    } else if WORD_FE.is_match(&lower) {
        Some(Gender::F)
    } else {
        None
    }
}

pub fn normalize_record(record: &CardRecord) -> VoterRecord {
    let (relative_name, relation) = extract_name_and_relation(&record.line2);
    VoterRecord {
        part_serial_no: clean_number(&record.number),
        full_name: extract_and_format_name(&record.line1),
        relative_name,
        relation,
        age: extract_age(&record.line4),
        gender: extract_gender(&record.line4),
        house_no: extract_house_number(&record.line3),
        epic_no: extract_epic(&record.top_right_text),
    }
}

/// Normalize every record, dropping rows whose raw fields are all empty, and
/// sort by part serial number (unparsable serials last).
pub fn normalize_dataset(dataset: &Dataset) -> Vec<VoterRecord> {
    let mut voters: Vec<VoterRecord> = dataset
        .records
        .iter()
        .filter(|r| !r.is_blank())
        .map(normalize_record)
        .collect();
    voters.sort_by_key(|v| v.part_serial_no.map_or(u64::MAX, |n| n as u64));
    voters
}
