// src/extractors/records.rs
//! Date-aligned record expansion: zips each part's quantity vector against
//! the firm-period calendar.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use super::parts::PartRow;
use super::pipeline::ExtractionSummary;
use crate::extractors::header::Header;
use crate::utils::error::HeaderError;

/// One normalized (part, date, quantity) record, the pipeline's output
/// unit. Serializes with ISO-8601 dates for both JSON and CSV export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuantityRecord {
    pub schedule_no: Option<String>,
    pub date: NaiveDate,
    pub customer_name: Option<String>,
    pub customer_code: Option<String>,
    pub part_description: String,
    pub part_number: String,
    pub quantity: u32,
}

/// The inclusive day range `[start, end]`, strictly increasing by one day.
pub fn firm_date_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let days = (end - start).num_days();
    (0..=days).map(|i| start + Duration::days(i)).collect()
}

/// Expands every (part, quantity vector) pair into one record per firm
/// day, propagating the header identity into each record.
///
/// Refuses to run without a valid firm window: that is the one stage a
/// header failure is fatal to. A vector shorter than the window pads the
/// trailing dates with 0; a longer vector is truncated and the surplus
/// counted as a warning — either way the part yields exactly one record
/// per firm day.
pub fn expand_records(
    header: &Header,
    parts: &[(PartRow, Vec<u32>)],
    summary: &mut ExtractionSummary,
) -> Result<Vec<QuantityRecord>, HeaderError> {
    let (start, end) = header.firm_window()?;
    let dates = firm_date_range(start, end);

    let mut records = Vec::with_capacity(parts.len() * dates.len());
    for (part, quantities) in parts {
        if quantities.len() > dates.len() {
            let surplus = quantities.len() - dates.len();
            tracing::warn!(
                "Part {}: {} decoded value(s) beyond the {}-day firm window dropped",
                part.part_number,
                surplus,
                dates.len()
            );
            summary.truncated_vectors += 1;
        }

        for (idx, date) in dates.iter().enumerate() {
            let quantity = quantities.get(idx).copied().unwrap_or(0);
            records.push(QuantityRecord {
                schedule_no: header.schedule_no.clone(),
                date: *date,
                customer_name: header.customer_name.clone(),
                customer_code: header.customer_code.clone(),
                part_description: part.description.clone(),
                part_number: part.part_number.clone(),
                quantity,
            });
        }
    }

    summary.records_emitted += records.len();
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CustomerRegistry;
    use crate::extractors::header::parse_header;

    fn header_for(firm: &str) -> Header {
        parse_header(
            &format!("Purchase Schedule No.: PS-1\nFirm Period : {firm}"),
            &CustomerRegistry::default(),
        )
    }

    fn part(number: &str) -> PartRow {
        PartRow {
            page: 1,
            template_row: 12,
            description: "Widget".into(),
            part_number: number.into(),
        }
    }

    #[test]
    fn date_range_is_inclusive_and_steps_by_one_day() {
        let start = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 10, 15).unwrap();
        let dates = firm_date_range(start, end);
        assert_eq!(dates.len(), 15);
        assert_eq!(dates[0], start);
        assert_eq!(*dates.last().unwrap(), end);
        for pair in dates.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::days(1));
        }

        // Single-day window still yields one date.
        assert_eq!(firm_date_range(start, start).len(), 1);
    }

    #[test]
    fn sixteen_values_against_fifteen_days_truncate_with_warning() {
        let header = header_for("01-10-2025 to 15-10-2025");
        let quantities: Vec<u32> = (1..=16).collect();
        let mut summary = ExtractionSummary::default();

        let records = expand_records(&header, &[(part("AB-1"), quantities)], &mut summary).unwrap();
        assert_eq!(records.len(), 15);
        assert_eq!(summary.truncated_vectors, 1);
        // The 16th decoded value never surfaces.
        assert_eq!(records.last().unwrap().quantity, 15);
        assert_eq!(
            records.last().unwrap().date,
            NaiveDate::from_ymd_opt(2025, 10, 15).unwrap()
        );
    }

    #[test]
    fn short_vectors_pad_trailing_dates_with_zero() {
        let header = header_for("01-10-2025 to 05-10-2025");
        let mut summary = ExtractionSummary::default();
        let records = expand_records(&header, &[(part("AB-1"), vec![3, 9])], &mut summary).unwrap();

        assert_eq!(records.len(), 5); // never fewer than the firm length
        assert_eq!(summary.truncated_vectors, 0);
        let quantities: Vec<u32> = records.iter().map(|r| r.quantity).collect();
        assert_eq!(quantities, vec![3, 9, 0, 0, 0]);
        // Dates cover the window exactly once each.
        let mut dates: Vec<NaiveDate> = records.iter().map(|r| r.date).collect();
        dates.dedup();
        assert_eq!(dates.len(), 5);
    }

    #[test]
    fn header_identity_propagates_into_every_record() {
        let header = header_for("01-10-2025 to 03-10-2025");
        let mut summary = ExtractionSummary::default();
        let records =
            expand_records(&header, &[(part("AB-1"), vec![1, 2, 3])], &mut summary).unwrap();
        for record in &records {
            assert_eq!(record.schedule_no.as_deref(), Some("PS-1"));
            assert_eq!(record.part_number, "AB-1");
            assert_eq!(record.part_description, "Widget");
        }
    }

    #[test]
    fn expansion_refuses_to_run_without_a_firm_window() {
        let header = header_for("later this month");
        let mut summary = ExtractionSummary::default();
        assert!(matches!(
            expand_records(&header, &[(part("AB-1"), vec![1])], &mut summary),
            Err(HeaderError::MalformedFirmPeriod(_))
        ));

        let header = parse_header("no markers at all", &CustomerRegistry::default());
        assert!(matches!(
            expand_records(&header, &[], &mut summary),
            Err(HeaderError::MissingFirmPeriod)
        ));
    }
}
