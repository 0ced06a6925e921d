//! Chart output tests.

use std::fs;

use pocket_doctor_core::models::{Gender, Parameter, ReferenceTable, Report, ReportCollection};
use pocket_doctor_core::{plot_collection, PipelineConfig};

fn collection() -> ReportCollection {
    let reports = [
        (Some(Gender::Female), 1.0, 130.0),
        (Some(Gender::Female), 5.0, 128.0),
        (None, 2.0, 140.0),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (gender, crp, hemoglobin))| Report {
        gender,
        parameters: vec![
            Parameter::new("CRP", crp, "mg/L"),
            Parameter::new("Hemoglobin", hemoglobin, "g/L"),
        ],
        ..Report::new(format!("{}.txt", i + 1))
    })
    .collect();

    ReportCollection::new(reports)
}

#[test]
fn test_plot_routes_charts_by_classification() {
    let dir = tempfile::tempdir().unwrap();
    let table = ReferenceTable::clinical_defaults();
    let config = PipelineConfig::default();

    let written = plot_collection(&collection(), &table, &config, Some(dir.path())).unwrap();

    assert_eq!(written.len(), 3);
    assert!(dir.path().join("extreme").join("CRP.svg").is_file());
    assert!(dir.path().join("normal").join("Hemoglobin.svg").is_file());

    let combined = fs::read_to_string(dir.path().join("combined.svg")).unwrap();
    assert!(combined.contains("Blood Analysis Parameter Trends Across Reports"));

    let hemoglobin = fs::read_to_string(dir.path().join("normal").join("Hemoglobin.svg")).unwrap();
    assert!(hemoglobin.contains("Reference 120–150"));
}

#[test]
fn test_plot_twice_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let table = ReferenceTable::clinical_defaults();
    let config = PipelineConfig::default();

    let first = plot_collection(&collection(), &table, &config, Some(dir.path())).unwrap();
    let second = plot_collection(&collection(), &table, &config, Some(dir.path())).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_custom_group_names() {
    let dir = tempfile::tempdir().unwrap();
    let table = ReferenceTable::clinical_defaults();
    let config = PipelineConfig::from_json_str(
        r#"{"normal_dir_name": "ok", "extreme_dir_name": "flagged"}"#,
    )
    .unwrap();

    plot_collection(&collection(), &table, &config, Some(dir.path())).unwrap();

    assert!(dir.path().join("flagged").join("CRP.svg").is_file());
    assert!(dir.path().join("ok").join("Hemoglobin.svg").is_file());
}
