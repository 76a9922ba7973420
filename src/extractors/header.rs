// src/extractors/header.rs
//! Header parsing for page one: schedule number, firm-period window, and
//! customer identity.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::config::CustomerRegistry;
use crate::utils::error::HeaderError;

// --- Marker patterns (Lazy Static) ---
static SCHEDULE_NO_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Purchase Schedule No[.:]?\s*(\S+)")
        .expect("Failed to compile SCHEDULE_NO_RE")
});

static FIRM_PERIOD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Firm Period\s*:\s*(.+)").expect("Failed to compile FIRM_PERIOD_RE")
});

const FIRM_DATE_FORMAT: &str = "%d-%m-%Y";
const FIRM_RANGE_SEPARATOR: &str = " to ";

/// Identity and firm-period window recovered from the page-one text.
///
/// Every field is optional: a document with a missing marker still gets a
/// (degraded) header and extraction continues for diagnostics. A firm
/// period that is present but malformed is remembered in `firm_error`;
/// record expansion refuses to run on such a header.
#[derive(Debug, Clone, Serialize)]
pub struct Header {
    pub schedule_no: Option<String>,
    pub customer_name: Option<String>,
    pub customer_code: Option<String>,
    pub firm_start: Option<NaiveDate>,
    pub firm_end: Option<NaiveDate>,
    /// Raw firm-period text as printed, kept for diagnostics.
    pub firm_period_raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firm_error: Option<String>,
}

impl Header {
    /// The inclusive firm-period window, or the error record expansion
    /// must observe.
    pub fn firm_window(&self) -> Result<(NaiveDate, NaiveDate), HeaderError> {
        if let Some(err) = &self.firm_error {
            return Err(HeaderError::MalformedFirmPeriod(err.clone()));
        }
        match (self.firm_start, self.firm_end) {
            (Some(start), Some(end)) => Ok((start, end)),
            _ => Err(HeaderError::MissingFirmPeriod),
        }
    }
}

/// Parses the header from page-one text. Pure function of the text and the
/// registry; never fails outright, see [`Header`] for the degraded states.
pub fn parse_header(text: &str, registry: &CustomerRegistry) -> Header {
    let schedule_no = SCHEDULE_NO_RE
        .captures(text)
        .map(|c| c[1].to_string());
    if schedule_no.is_none() {
        tracing::warn!("No 'Purchase Schedule No' marker found in header text");
    }

    let mut firm_start = None;
    let mut firm_end = None;
    let mut firm_period_raw = None;
    let mut firm_error = None;

    if let Some(captures) = FIRM_PERIOD_RE.captures(text) {
        let raw = captures[1].trim().to_string();
        match parse_firm_period(&raw) {
            Ok((start, end)) => {
                firm_start = Some(start);
                firm_end = Some(end);
            }
            Err(e) => {
                tracing::warn!("Malformed firm period '{}': {}", raw, e);
                firm_error = Some(e);
            }
        }
        firm_period_raw = Some(raw);
    } else {
        tracing::warn!("No 'Firm Period' marker found in header text");
    }

    let customer = registry.lookup(text);
    if customer.is_none() {
        tracing::warn!("No registered customer name found in header text");
    }

    Header {
        schedule_no,
        customer_name: customer.map(|c| c.name.clone()),
        customer_code: customer.map(|c| c.code.clone()),
        firm_start,
        firm_end,
        firm_period_raw,
        firm_error,
    }
}

/// Splits `<start> to <end>` and parses both sides as DD-MM-YYYY.
fn parse_firm_period(raw: &str) -> Result<(NaiveDate, NaiveDate), String> {
    let (start_str, end_str) = raw
        .split_once(FIRM_RANGE_SEPARATOR)
        .ok_or_else(|| format!("expected '<start>{FIRM_RANGE_SEPARATOR}<end>'"))?;

    let start = NaiveDate::parse_from_str(start_str.trim(), FIRM_DATE_FORMAT)
        .map_err(|e| format!("bad start date '{}': {e}", start_str.trim()))?;
    let end = NaiveDate::parse_from_str(end_str.trim(), FIRM_DATE_FORMAT)
        .map_err(|e| format!("bad end date '{}': {e}", end_str.trim()))?;

    if start > end {
        return Err(format!("start {start} is after end {end}"));
    }
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CustomerEntry;

    fn registry() -> CustomerRegistry {
        CustomerRegistry {
            entries: vec![CustomerEntry {
                name: "Hong Leong Yamaha Motor Sdn Bhd".into(),
                code: "46829-P".into(),
            }],
        }
    }

    const PAGE_ONE: &str = "\
Hong Leong Yamaha Motor Sdn Bhd
Purchase Schedule No.: PS-20251001
Firm Period : 01-10-2025 to 15-10-2025
Delivery Instruction";

    #[test]
    fn recovers_all_header_fields() {
        let header = parse_header(PAGE_ONE, &registry());
        assert_eq!(header.schedule_no.as_deref(), Some("PS-20251001"));
        assert_eq!(
            header.customer_name.as_deref(),
            Some("Hong Leong Yamaha Motor Sdn Bhd")
        );
        assert_eq!(header.customer_code.as_deref(), Some("46829-P"));

        let (start, end) = header.firm_window().unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 10, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 10, 15).unwrap());
        assert!(start <= end);
    }

    #[test]
    fn schedule_marker_is_case_insensitive_and_tolerates_punctuation() {
        let header = parse_header("purchase schedule no: X-9", &registry());
        assert_eq!(header.schedule_no.as_deref(), Some("X-9"));

        let header = parse_header("Purchase Schedule No PS77", &registry());
        assert_eq!(header.schedule_no.as_deref(), Some("PS77"));
    }

    #[test]
    fn missing_markers_yield_degraded_header() {
        let header = parse_header("nothing useful here", &registry());
        assert!(header.schedule_no.is_none());
        assert!(header.customer_name.is_none());
        assert!(header.firm_period_raw.is_none());
        assert!(matches!(
            header.firm_window(),
            Err(HeaderError::MissingFirmPeriod)
        ));
    }

    #[test]
    fn malformed_firm_period_is_observed_by_firm_window() {
        let header = parse_header("Firm Period : sometime soon", &registry());
        assert!(header.firm_error.is_some());
        assert_eq!(header.firm_period_raw.as_deref(), Some("sometime soon"));
        assert!(matches!(
            header.firm_window(),
            Err(HeaderError::MalformedFirmPeriod(_))
        ));

        // Parseable dates, but the window is inverted.
        let header = parse_header("Firm Period : 15-10-2025 to 01-10-2025", &registry());
        assert!(matches!(
            header.firm_window(),
            Err(HeaderError::MalformedFirmPeriod(_))
        ));
    }

    #[test]
    fn empty_text_is_fully_degraded_not_an_error() {
        let header = parse_header("", &registry());
        assert!(header.schedule_no.is_none());
        assert!(header.firm_start.is_none());
        assert!(header.firm_end.is_none());
    }
}
