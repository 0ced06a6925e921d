//! Report ordering for the series x-axis.

use serde::{Deserialize, Serialize};

use crate::models::Report;

/// How reports are ordered before series extraction.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SeriesOrder {
    /// Keep the collection's input order
    #[default]
    InputOrder,
    /// Sort by `report_date`; undated reports follow dated ones
    ReportDate,
}

/// Return the reports in the requested order.
///
/// Date ordering is stable: reports with equal dates, and all undated
/// reports, keep their relative input order.
pub fn order_reports(reports: &[Report], order: SeriesOrder) -> Vec<Report> {
    let mut ordered = reports.to_vec();
    if order == SeriesOrder::ReportDate {
        ordered.sort_by_key(|r| (r.report_date.is_none(), r.report_date));
    }
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dated(file: &str, date: Option<(i32, u32, u32)>) -> Report {
        let mut report = Report::new(file);
        report.report_date = date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d));
        report
    }

    fn files(reports: &[Report]) -> Vec<&str> {
        reports.iter().map(|r| r.file.as_str()).collect()
    }

    #[test]
    fn test_input_order_unchanged() {
        let reports = vec![
            dated("b", Some((2025, 5, 1))),
            dated("a", Some((2024, 1, 1))),
        ];
        assert_eq!(files(&order_reports(&reports, SeriesOrder::InputOrder)), vec!["b", "a"]);
    }

    #[test]
    fn test_date_order_undated_last_and_stable() {
        let reports = vec![
            dated("undated-1", None),
            dated("late", Some((2025, 5, 1))),
            dated("early", Some((2024, 1, 1))),
            dated("undated-2", None),
            dated("late-dup", Some((2025, 5, 1))),
        ];

        let ordered = order_reports(&reports, SeriesOrder::ReportDate);
        assert_eq!(
            files(&ordered),
            vec!["early", "late", "late-dup", "undated-1", "undated-2"]
        );
    }

    #[test]
    fn test_order_deserializes_snake_case() {
        let order: SeriesOrder = serde_json::from_str(r#""report_date""#).unwrap();
        assert_eq!(order, SeriesOrder::ReportDate);
    }
}
