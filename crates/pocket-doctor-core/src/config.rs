//! Pipeline configuration.
//!
//! Every field has a default, so a config file only needs the keys it
//! changes. Missing file means defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::SeriesOrder;
use crate::ocr::LayoutOptions;
use crate::render::OutputLayout;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Settings for the chat-completions endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    /// Environment variable holding the API key
    pub api_key_env: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4".to_string(),
            temperature: 0.3,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub series_order: SeriesOrder,
    /// Root directory for per-parameter charts
    pub output_dir: PathBuf,
    pub normal_dir_name: String,
    pub extreme_dir_name: String,
    pub llm: LlmConfig,
    pub ocr: LayoutOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            series_order: SeriesOrder::default(),
            output_dir: PathBuf::from("plots/figures"),
            normal_dir_name: "normal".to_string(),
            extreme_dir_name: "extreme".to_string(),
            llm: LlmConfig::default(),
            ocr: LayoutOptions::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&data)?;
        tracing::debug!(path = %path.display(), "Loaded pipeline config");
        Ok(config)
    }

    /// Chart layout under `root`, or under `output_dir` when `root` is `None`.
    pub fn output_layout(&self, root: Option<&Path>) -> OutputLayout {
        OutputLayout::new(
            root.unwrap_or(self.output_dir.as_path()),
            &self.normal_dir_name,
            &self.extreme_dir_name,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.series_order, SeriesOrder::InputOrder);
        assert_eq!(config.output_dir, PathBuf::from("plots/figures"));
        assert_eq!(config.llm.model, "gpt-4");
        assert_eq!(config.llm.temperature, 0.3);
        assert_eq!(config.ocr.line_threshold, 15.0);
        assert_eq!(config.ocr.space_scale, 10);
    }

    #[test]
    fn test_partial_json() {
        let config = PipelineConfig::from_json_str(
            r#"{"series_order": "report_date", "llm": {"model": "gpt-4o"}, "ocr": {"space_scale": 8}}"#,
        )
        .unwrap();

        assert_eq!(config.series_order, SeriesOrder::ReportDate);
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.base_url, "https://api.openai.com/v1");
        assert_eq!(config.ocr.space_scale, 8);
        assert_eq!(config.ocr.line_threshold, 15.0);
        assert_eq!(config.extreme_dir_name, "extreme");
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            PipelineConfig::from_json_str(r#"{"series_order": "random"}"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_output_layout() {
        let config = PipelineConfig {
            extreme_dir_name: "flagged".to_string(),
            ..Default::default()
        };

        let layout = config.output_layout(Some(Path::new("out")));
        assert_eq!(layout.dir_for(true), Path::new("out/flagged"));
        assert_eq!(
            config.output_layout(None).dir_for(false),
            Path::new("plots/figures/normal")
        );
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"output_dir": "charts"}"#).unwrap();

        let config = PipelineConfig::load(&path).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("charts"));
        assert!(PipelineConfig::load(&dir.path().join("missing.json")).is_err());
    }
}
