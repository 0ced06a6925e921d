//! Chart rendering.
//!
//! Chart builders are pure: they take classified data and return SVG text.
//! Writing files is a separate step through [`OutputLayout`], whose
//! directories are created once by the caller via [`OutputLayout::prepare`].

mod canvas;
mod charts;
mod overlay;

pub use canvas::*;
pub use charts::*;
pub use overlay::*;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Rendering errors.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type RenderResult<T> = Result<T, RenderError>;

/// The two fixed output groups for per-parameter charts.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputLayout {
    normal_dir: PathBuf,
    extreme_dir: PathBuf,
}

impl OutputLayout {
    /// Layout with `root/normal_name` and `root/extreme_name`.
    pub fn new(root: impl AsRef<Path>, normal_name: &str, extreme_name: &str) -> Self {
        let root = root.as_ref();
        Self {
            normal_dir: root.join(normal_name),
            extreme_dir: root.join(extreme_name),
        }
    }

    /// Layout with the default `normal` and `extreme` group names.
    pub fn under(root: impl AsRef<Path>) -> Self {
        Self::new(root, "normal", "extreme")
    }

    /// Create both output directories. Safe to call repeatedly.
    pub fn prepare(&self) -> RenderResult<()> {
        for dir in [&self.normal_dir, &self.extreme_dir] {
            fs::create_dir_all(dir).map_err(|source| RenderError::CreateDir {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Directory for a chart, chosen solely by its classification.
    pub fn dir_for(&self, extreme: bool) -> &Path {
        if extreme {
            &self.extreme_dir
        } else {
            &self.normal_dir
        }
    }

    /// Write a trend chart into its group and return the path.
    ///
    /// Does not create directories; call [`OutputLayout::prepare`] first.
    pub fn write_trend(&self, chart: &TrendChart) -> RenderResult<PathBuf> {
        let path = self
            .dir_for(chart.extreme)
            .join(chart_file_name(&chart.parameter));
        write_svg(&path, &chart.svg)?;
        Ok(path)
    }
}

/// File name for a parameter's chart: spaces and path separators become `_`.
pub fn chart_file_name(parameter: &str) -> String {
    let stem: String = parameter
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            c => c,
        })
        .collect();
    format!("{stem}.svg")
}

/// Write an SVG document, overwriting any existing file.
pub fn write_svg(path: &Path, svg: &str) -> RenderResult<()> {
    fs::write(path, svg).map_err(|source| RenderError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "Wrote chart");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart(name: &str, extreme: bool) -> TrendChart {
        TrendChart {
            parameter: name.to_string(),
            extreme,
            svg: "<svg/>".to_string(),
        }
    }

    #[test]
    fn test_chart_file_name() {
        assert_eq!(chart_file_name("White Blood Cells"), "White_Blood_Cells.svg");
        assert_eq!(chart_file_name("LDL/HDL"), "LDL_HDL.svg");
    }

    #[test]
    fn test_prepare_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout::under(dir.path());

        layout.prepare().unwrap();
        layout.prepare().unwrap();

        assert!(dir.path().join("normal").is_dir());
        assert!(dir.path().join("extreme").is_dir());
    }

    #[test]
    fn test_write_trend_routes_by_classification() {
        let dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout::under(dir.path());
        layout.prepare().unwrap();

        let normal = layout.write_trend(&chart("HDL", false)).unwrap();
        let extreme = layout.write_trend(&chart("CRP", true)).unwrap();

        assert_eq!(normal, dir.path().join("normal").join("HDL.svg"));
        assert_eq!(extreme, dir.path().join("extreme").join("CRP.svg"));
        assert_eq!(std::fs::read_to_string(extreme).unwrap(), "<svg/>");
    }

    #[test]
    fn test_write_without_prepare_fails() {
        let dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout::under(dir.path().join("missing"));

        let err = layout.write_trend(&chart("CRP", true)).unwrap_err();
        assert!(matches!(err, RenderError::Write { .. }));
    }
}
