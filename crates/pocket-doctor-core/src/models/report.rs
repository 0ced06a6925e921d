//! Report models.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use super::parameter::{Gender, Parameter};

/// One blood-test document's extracted, structured content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Report {
    /// Source document identifier (usually the file name)
    #[serde(default, alias = "file_id")]
    pub file: String,
    /// Date printed on the report, if one was found
    #[serde(default, deserialize_with = "lenient_date")]
    pub report_date: Option<NaiveDate>,
    /// Recorded sex of the patient; `None` when the field is absent or null
    #[serde(default)]
    pub gender: Option<Gender>,
    /// Measurements in extraction order
    #[serde(default, deserialize_with = "parameter_list")]
    pub parameters: Vec<Parameter>,
    /// Brief summary written by the extractor
    #[serde(default)]
    pub summary: String,
    /// Composite 0-100 deviation score
    #[serde(default)]
    pub general_health_score: Option<f64>,
    /// Follow-up advice for single-report extractions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up_advice: Option<String>,
}

impl Report {
    /// Create an empty report for a source document.
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            ..Self::default()
        }
    }

    /// Look up a parameter by exact name. The last occurrence wins.
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().rev().find(|p| p.name == name)
    }
}

/// An ordered sequence of reports plus the combined advice.
///
/// Report order is input order; it is the x-axis of every series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ReportCollection {
    #[serde(default)]
    pub reports: Vec<Report>,
    #[serde(default)]
    pub overall_follow_up_advice: String,
}

impl ReportCollection {
    /// Create a collection from reports in the given order.
    pub fn new(reports: Vec<Report>) -> Self {
        Self {
            reports,
            overall_follow_up_advice: String::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Health scores in report order.
    pub fn scores(&self) -> Vec<Option<f64>> {
        self.reports
            .iter()
            .map(|r| r.general_health_score)
            .collect()
    }
}

/// Unparseable dates become `None` instead of failing the document.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()))
}

/// `null` reads as no parameters. A malformed entry fails the whole report.
fn parameter_list<'de, D>(deserializer: D) -> Result<Vec<Parameter>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Parameter>>::deserialize(deserializer)?.unwrap_or_default())
}
