//! Series extraction: pivots per-report parameter lists into aligned series.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::models::{Gender, Parameter, ReferenceEntry, ReferenceTable, Report};

use super::normalizer::UnitNormalizer;

/// Parameter name → one value per report (`None` = missing), index-aligned
/// with the report collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParameterSeries {
    series: BTreeMap<String, Vec<Option<f64>>>,
}

impl ParameterSeries {
    pub fn get(&self, name: &str) -> Option<&[Option<f64>]> {
        self.series.get(name).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Option<f64>])> {
        self.series
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Length shared by every series (0 when there are no parameters).
    pub fn report_count(&self) -> usize {
        self.series.values().next().map_or(0, Vec::len)
    }

    /// True if the parameter is unknown or has no value in any report.
    pub fn is_all_missing(&self, name: &str) -> bool {
        self.get(name)
            .map_or(true, |values| values.iter().all(Option::is_none))
    }
}

/// Pivot reports into per-parameter series.
///
/// Every series has exactly `reports.len()` entries; entry `i` belongs to
/// report `i`. If a report lists a name twice the later value is used.
pub fn extract_series(reports: &[Report]) -> ParameterSeries {
    let names: BTreeSet<&str> = reports
        .iter()
        .flat_map(|r| r.parameters.iter().map(|p| p.name.as_str()))
        .collect();

    let mut series: BTreeMap<String, Vec<Option<f64>>> = names
        .iter()
        .map(|name| (name.to_string(), Vec::with_capacity(reports.len())))
        .collect();

    for report in reports {
        let lookup: HashMap<&str, f64> = report
            .parameters
            .iter()
            .map(|p| (p.name.as_str(), p.value))
            .collect();

        for (name, values) in series.iter_mut() {
            values.push(lookup.get(name.as_str()).copied());
        }
    }

    tracing::debug!(
        parameters = series.len(),
        reports = reports.len(),
        "Extracted parameter series"
    );

    ParameterSeries { series }
}

/// Copy reports with every known parameter renamed to its table key and
/// converted into the unit its interval is written in.
///
/// Unknown names, blank units and units with no conversion keep their
/// reported value.
pub fn harmonize_reports(
    reports: &[Report],
    table: &ReferenceTable,
    normalizer: &UnitNormalizer,
) -> Vec<Report> {
    reports
        .iter()
        .map(|report| {
            let mut report = report.clone();
            for parameter in &mut report.parameters {
                harmonize_parameter(parameter, table, normalizer);
            }
            report
        })
        .collect()
}

fn harmonize_parameter(parameter: &mut Parameter, table: &ReferenceTable, normalizer: &UnitNormalizer) {
    let Some(canonical) = table.resolve_name(&parameter.name) else {
        return;
    };
    parameter.name = canonical.to_string();

    let Some(unit) = table.get(canonical).and_then(ReferenceEntry::interval_unit) else {
        return;
    };
    if parameter.unit.trim().is_empty() {
        return;
    }

    match normalizer.convert(canonical, parameter.value, &parameter.unit, unit) {
        Some(value) => {
            parameter.value = value;
            parameter.unit = unit.to_string();
        }
        None => tracing::debug!(
            parameter = %parameter.name,
            unit = %parameter.unit,
            expected = %unit,
            "No conversion to interval unit; keeping reported value"
        ),
    }
}

/// Recorded gender per report, aligned like the series.
pub fn extract_genders(reports: &[Report]) -> Vec<Option<Gender>> {
    reports.iter().map(|r| r.gender).collect()
}
