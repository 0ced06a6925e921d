//! Property tests for series extraction, scoring and classification.

use pocket_doctor_core::analysis::{classify, compute_health_score, extract_series, UnitNormalizer};
use pocket_doctor_core::models::{Gender, Parameter, ReferenceTable, Report};
use proptest::prelude::*;

const NAMES: [&str; 6] = ["Hemoglobin", "LDL", "HDL", "Glucose", "CRP", "Ferritin"];

fn arb_parameter() -> impl Strategy<Value = Parameter> {
    (0..NAMES.len(), 0.0..500.0f64).prop_map(|(i, value)| Parameter::new(NAMES[i], value, ""))
}

fn arb_report() -> impl Strategy<Value = Report> {
    prop::collection::vec(arb_parameter(), 0..6).prop_map(|parameters| Report {
        parameters,
        ..Report::new("r.txt")
    })
}

fn arb_gender() -> impl Strategy<Value = Option<Gender>> {
    prop_oneof![
        Just(None),
        Just(Some(Gender::Male)),
        Just(Some(Gender::Female)),
        Just(Some(Gender::Unknown)),
    ]
}

proptest! {
    #[test]
    fn series_align_with_reports(reports in prop::collection::vec(arb_report(), 0..8)) {
        let series = extract_series(&reports);

        for (name, values) in series.iter() {
            prop_assert_eq!(values.len(), reports.len());

            for (i, value) in values.iter().enumerate() {
                let expected = reports[i].parameter(name).map(|p| p.value);
                prop_assert_eq!(*value, expected);
            }
        }
    }

    #[test]
    fn every_reported_name_has_a_series(reports in prop::collection::vec(arb_report(), 1..8)) {
        let series = extract_series(&reports);

        for report in &reports {
            for parameter in &report.parameters {
                prop_assert!(series.get(&parameter.name).is_some());
                prop_assert!(!series.is_all_missing(&parameter.name));
            }
        }
    }

    #[test]
    fn health_score_is_bounded(parameters in prop::collection::vec(arb_parameter(), 0..10)) {
        let table = ReferenceTable::clinical_defaults();
        let normalizer = UnitNormalizer::for_table(&table);

        if let Some(score) = compute_health_score(&parameters, &table, &normalizer) {
            prop_assert!((0.0..=100.0).contains(&score));
        } else {
            prop_assert!(parameters.iter().all(|p| table.distribution(&p.name).is_none()));
        }
    }

    #[test]
    fn classification_partitions_known_points(
        points in prop::collection::vec((prop::option::of(0.0..300.0f64), arb_gender()), 0..12)
    ) {
        let table = ReferenceTable::clinical_defaults();
        let (values, genders): (Vec<_>, Vec<_>) = points.iter().cloned().unzip();

        let classification = classify(&values, &genders, "Hemoglobin", &table);
        let expected = points.iter().filter(|(v, g)| v.is_some() && g.is_some()).count();

        prop_assert_eq!(classification.normal.len() + classification.outliers.len(), expected);

        let within = |index: usize, value: f64| match genders[index] {
            Some(Gender::Male) => (130.0..=170.0).contains(&value),
            _ => (120.0..=150.0).contains(&value),
        };
        for point in &classification.normal {
            prop_assert!(within(point.index, point.value));
        }
        for point in &classification.outliers {
            prop_assert!(!within(point.index, point.value));
        }
    }
}
