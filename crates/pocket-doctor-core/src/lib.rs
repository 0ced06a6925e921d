//! Pocket Doctor Core Library
//!
//! Longitudinal analysis of structured blood-test reports.
//!
//! # Architecture
//!
//! ```text
//! Scan → OCR detections → text ──(pocket-doctor-llm)──▶ Report JSON
//!                                                           │
//!                                                  [ReportCollection]
//!                                                           │
//!                         ┌─────────────────────────────────┼──────────────────┐
//!                         │                                 │                  │
//!                         ▼                                 ▼                  ▼
//!                  Series extraction               Health score         Score trends
//!                  (one slot per report)        (z-score vs. table)   (↑ ↓ → per step)
//!                         │
//!                         ▼
//!                 Range classification
//!              (gender-aware, inclusive)
//!                         │
//!               ┌─────────┴─────────┐
//!               ▼                   ▼
//!         normal/*.svg        extreme/*.svg
//! ```
//!
//! # Modules
//!
//! - [`models`]: Report, parameter and reference-table types
//! - [`analysis`]: Series extraction, scoring, classification and trends
//! - [`render`]: SVG charts and the output directory layout
//! - [`ocr`]: Detection types and layout-preserving text reconstruction
//! - [`store`]: JSON persistence for reports
//! - [`config`]: Pipeline configuration

pub mod analysis;
pub mod config;
pub mod models;
pub mod ocr;
pub mod render;
pub mod store;

// Re-export commonly used types
pub use analysis::{Analysis, Analyzer, ParameterSeries, SeriesOrder, Trend, UnitNormalizer};
pub use config::{ConfigError, LlmConfig, PipelineConfig};
pub use models::{Bounds, Gender, Parameter, ReferenceTable, Report, ReportCollection};
pub use ocr::{Detection, OcrEngine, OcrError};
pub use render::{OutputLayout, RenderError};
pub use store::StoreError;

/// Any failure from the core library.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ocr(#[from] OcrError),

    #[error("Invalid reference table: {0}")]
    Reference(#[source] serde_json::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Load a reference table from a JSON file.
pub fn load_reference_table(path: &std::path::Path) -> CoreResult<ReferenceTable> {
    let data = std::fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let table = ReferenceTable::from_json(&data).map_err(CoreError::Reference)?;
    tracing::debug!(path = %path.display(), entries = table.len(), "Loaded reference table");
    Ok(table)
}

/// Analyse a collection and write one trend chart per parameter, plus the
/// combined chart at `root/combined.svg`.
///
/// Returns the written chart paths.
pub fn plot_collection(
    collection: &ReportCollection,
    table: &ReferenceTable,
    config: &PipelineConfig,
    root: Option<&std::path::Path>,
) -> CoreResult<Vec<std::path::PathBuf>> {
    let analysis = Analyzer::new(table)
        .with_order(config.series_order)
        .analyze(collection);

    let layout = config.output_layout(root);
    layout.prepare()?;

    let mut written = Vec::with_capacity(analysis.parameters.len() + 1);
    for parameter in &analysis.parameters {
        let chart = render::render_trend(
            &parameter.name,
            &parameter.classification,
            parameter.band,
            analysis.report_count(),
        );
        written.push(layout.write_trend(&chart)?);
    }

    let combined_path = root.unwrap_or(config.output_dir.as_path()).join("combined.svg");
    render::write_svg(&combined_path, &render::render_combined(&analysis.series))?;
    written.push(combined_path);

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_reference_table_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reference.json");

        assert!(matches!(
            load_reference_table(&path),
            Err(CoreError::Store(StoreError::Read { .. }))
        ));

        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(
            load_reference_table(&path),
            Err(CoreError::Reference(_))
        ));
    }
}
