//! Health score: a bounded 0-100 indicator of how far a report deviates from
//! population norms.
//!
//! `score = max(0, 100 - 10 * mean(|value - mean| / sd))`, rounded to one
//! decimal. A relative indicator only, never a diagnosis.

use crate::models::{Parameter, ReferenceTable, ReportCollection};

use super::normalizer::UnitNormalizer;

/// Score of a report whose parameters all sit exactly on the mean.
pub const MAX_SCORE: f64 = 100.0;

/// Points subtracted per unit of mean absolute z-score.
const Z_PENALTY: f64 = 10.0;

/// Absolute z-scores of every parameter that has a usable distribution.
///
/// Values are converted to the distribution's unit first. Parameters with no
/// table entry or a non-positive sd are skipped.
pub fn z_scores(
    parameters: &[Parameter],
    table: &ReferenceTable,
    normalizer: &UnitNormalizer,
) -> Vec<f64> {
    parameters
        .iter()
        .filter_map(|p| {
            let canonical = table.resolve_name(&p.name)?;
            let dist = table.distribution(canonical)?;
            if dist.sd <= 0.0 || dist.sd.is_nan() {
                return None;
            }
            let (value, unit) = normalizer.normalize(canonical, p.value, &p.unit);
            if !unit.eq_ignore_ascii_case(&dist.unit) && !p.unit.trim().is_empty() {
                tracing::debug!(
                    parameter = %p.name,
                    unit = %p.unit,
                    expected = %dist.unit,
                    "No conversion to reference unit; scoring raw value"
                );
            }
            Some(((value - dist.mean) / dist.sd).abs())
        })
        .collect()
}

/// Compute the health score for one report's parameters.
///
/// Returns `None` when no parameter could be scored.
pub fn compute_health_score(
    parameters: &[Parameter],
    table: &ReferenceTable,
    normalizer: &UnitNormalizer,
) -> Option<f64> {
    let z = z_scores(parameters, table, normalizer);
    if z.is_empty() {
        return None;
    }

    let mean_z = z.iter().sum::<f64>() / z.len() as f64;
    let score = (MAX_SCORE - Z_PENALTY * mean_z).max(0.0);
    Some((score * 10.0).round() / 10.0)
}

/// Replace every report's `general_health_score` with the computed one.
pub fn attach_health_scores(
    collection: &mut ReportCollection,
    table: &ReferenceTable,
    normalizer: &UnitNormalizer,
) {
    for report in &mut collection.reports {
        report.general_health_score = compute_health_score(&report.parameters, table, normalizer);
    }
}

impl ReportCollection {
    /// Fill every report's `general_health_score` with the computed one.
    pub fn attach_health_scores(&mut self, table: &ReferenceTable, normalizer: &UnitNormalizer) {
        attach_health_scores(self, table, normalizer);
    }
}
