// src/extractors/parts.rs
//! Part-row extraction from a page's detected text table.
//!
//! The quantity matrix itself is not reliably present as text; the table
//! only tells us WHICH parts appear on the page and in what order. That
//! order is what anchors rows onto the template grid later.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::document::TableRow;

/// Valid part numbers: non-empty, uppercase letters, digits and hyphens.
static PART_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9\-]+$").expect("Failed to compile PART_NUMBER_RE"));

/// One detected part row, immutable after extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartRow {
    /// 1-based page number the row was detected on.
    pub page: u32,
    /// Grid slot assigned during row partitioning (bottom-indexed).
    pub template_row: usize,
    pub description: String,
    pub part_number: String,
}

pub fn is_valid_part_number(candidate: &str) -> bool {
    PART_NUMBER_RE.is_match(candidate)
}

/// Candidate (description, part number) pulled out of a table row's first
/// cell. `template_row` is filled in by the grid partitioner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartCandidate {
    pub description: String,
    pub part_number: String,
}

/// Extracts the ordered part list from a page table.
///
/// The first table row is the printed column header and is skipped. For
/// every later row the first cell, when present, is split on its internal
/// line break: exactly two lines read as (description, part number);
/// anything else has no part number. Rows whose candidate part number
/// fails validation are silently dropped; that is how decorative and
/// section rows are filtered out.
pub fn extract_parts(table: &[TableRow], page: u32) -> Vec<PartCandidate> {
    let mut parts = Vec::new();

    for row in table.iter().skip(1) {
        let Some(Some(first_cell)) = row.first().map(|c| c.as_ref()) else {
            continue;
        };

        let lines: Vec<&str> = first_cell.split('\n').collect();
        let (description, candidate) = if lines.len() == 2 {
            (lines[0].trim(), Some(lines[1].trim()))
        } else {
            (lines[0].trim(), None)
        };

        match candidate {
            Some(number) if is_valid_part_number(number) => {
                parts.push(PartCandidate {
                    description: description.to_string(),
                    part_number: number.to_string(),
                });
            }
            _ => {
                tracing::debug!(
                    "Page {}: skipping table row without valid part number: {:?}",
                    page,
                    first_cell
                );
            }
        }
    }

    tracing::info!("Page {}: extracted {} part rows", page, parts.len());
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn extracts_description_and_part_number_pairs_in_order() {
        let table = vec![
            vec![cell("PART / DESCRIPTION")], // header row, skipped
            vec![cell("Crank Case Assy\n5YP-E5150-00"), None],
            vec![cell("Gear Shift Lever\nB65-F8110-10")],
        ];
        let parts = extract_parts(&table, 1);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].description, "Crank Case Assy");
        assert_eq!(parts[0].part_number, "5YP-E5150-00");
        assert_eq!(parts[1].part_number, "B65-F8110-10");
    }

    #[test]
    fn rows_without_two_lines_or_valid_numbers_are_skipped() {
        let table = vec![
            vec![cell("HEADER")],
            vec![cell("*** FIRM SECTION ***")],              // one line only
            vec![cell("Desc\nlowercase-rejected")],          // invalid number
            vec![cell("Desc\nAB 12")],                       // space rejected
            vec![cell("Desc\nAB-12\nextra")],                // three lines
            vec![None, cell("ignored")],                     // empty first cell
            vec![],                                          // empty row
            vec![cell("Kept\nAB-12")],
        ];
        let parts = extract_parts(&table, 2);
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].description, "Kept");
        assert_eq!(parts[0].part_number, "AB-12");
    }

    #[test]
    fn empty_table_yields_no_parts() {
        assert!(extract_parts(&[], 1).is_empty());
        // A table with only the header row.
        assert!(extract_parts(&[vec![cell("HEADER")]], 1).is_empty());
    }

    #[test]
    fn part_number_pattern_accepts_only_uppercase_digits_hyphen() {
        assert!(is_valid_part_number("5YP-E5150-00"));
        assert!(is_valid_part_number("A"));
        assert!(is_valid_part_number("123-456"));
        assert!(!is_valid_part_number(""));
        assert!(!is_valid_part_number("ab-12"));
        assert!(!is_valid_part_number("AB_12"));
        assert!(!is_valid_part_number("AB 12"));
    }
}
