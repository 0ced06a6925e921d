//! Multi-report analysis.
//!
//! Pipeline: Ordering → Harmonization → Series Extraction → Range
//! Classification, with the health score computed per report alongside.

mod classify;
mod normalizer;
mod ordering;
mod scoring;
mod series;
mod trend;

pub use classify::*;
pub use normalizer::*;
pub use ordering::*;
pub use scoring::*;
pub use series::*;
pub use trend::*;

use serde::Serialize;

use crate::models::{Bounds, Gender, ReferenceTable, Report, ReportCollection};

/// Classification of one parameter across all reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterAnalysis {
    pub name: String,
    pub classification: Classification,
    /// Reference band to shade, if known
    pub band: Option<Bounds>,
}

impl ParameterAnalysis {
    pub fn is_extreme(&self) -> bool {
        self.classification.is_extreme()
    }
}

/// Result of analysing a report collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    /// Reports in the order used for every series
    pub reports: Vec<Report>,
    pub series: ParameterSeries,
    pub genders: Vec<Option<Gender>>,
    /// One entry per parameter with at least one value
    pub parameters: Vec<ParameterAnalysis>,
    /// Computed health score per report
    pub scores: Vec<Option<f64>>,
}

impl Analysis {
    pub fn report_count(&self) -> usize {
        self.reports.len()
    }

    /// Parameters with at least one outlier.
    pub fn extreme_parameters(&self) -> impl Iterator<Item = &ParameterAnalysis> {
        self.parameters.iter().filter(|p| p.is_extreme())
    }
}

/// Coordinates the full analysis pipeline over one reference table.
pub struct Analyzer<'a> {
    table: &'a ReferenceTable,
    normalizer: UnitNormalizer,
    order: SeriesOrder,
}

impl<'a> Analyzer<'a> {
    /// Create an analyzer that keeps input order.
    pub fn new(table: &'a ReferenceTable) -> Self {
        Self {
            table,
            normalizer: UnitNormalizer::for_table(table),
            order: SeriesOrder::default(),
        }
    }

    /// Set the report ordering.
    pub fn with_order(mut self, order: SeriesOrder) -> Self {
        self.order = order;
        self
    }

    /// Replace the unit normalizer.
    pub fn with_normalizer(mut self, normalizer: UnitNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn table(&self) -> &ReferenceTable {
        self.table
    }

    /// Get the normalizer for direct access.
    pub fn normalizer(&self) -> &UnitNormalizer {
        &self.normalizer
    }

    /// Health score for one parameter list.
    pub fn health_score(&self, parameters: &[crate::models::Parameter]) -> Option<f64> {
        compute_health_score(parameters, self.table, &self.normalizer)
    }

    /// Attach computed health scores to every report in place.
    pub fn score_collection(&self, collection: &mut ReportCollection) {
        attach_health_scores(collection, self.table, &self.normalizer);
    }

    /// Series keyed by table name, in the units the intervals use.
    pub fn series(&self, reports: &[Report]) -> ParameterSeries {
        extract_series(&harmonize_reports(reports, self.table, &self.normalizer))
    }

    /// Run ordering, series extraction, classification and scoring.
    pub fn analyze(&self, collection: &ReportCollection) -> Analysis {
        let reports = order_reports(&collection.reports, self.order);
        let series = self.series(&reports);
        let genders = extract_genders(&reports);

        let parameters = series
            .iter()
            .filter(|(name, _)| !series.is_all_missing(name))
            .map(|(name, values)| ParameterAnalysis {
                name: name.to_string(),
                classification: classify(values, &genders, name, self.table),
                band: range_band(name, &genders, self.table),
            })
            .collect::<Vec<_>>();

        let scores = reports
            .iter()
            .map(|r| self.health_score(&r.parameters))
            .collect();

        tracing::info!(
            reports = reports.len(),
            parameters = parameters.len(),
            extreme = parameters.iter().filter(|p| p.is_extreme()).count(),
            "Analysed report collection"
        );

        Analysis {
            reports,
            series,
            genders,
            parameters,
            scores,
        }
    }
}
