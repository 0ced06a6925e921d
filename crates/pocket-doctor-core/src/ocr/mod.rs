//! OCR boundary.
//!
//! The OCR engine itself is an external collaborator behind [`OcrEngine`].
//! This module owns the structured detection type and turns detections into
//! text for the LLM extractor.

mod layout;

pub use layout::*;

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OCR errors.
#[derive(Error, Debug)]
pub enum OcrError {
    #[error("OCR engine error: {0}")]
    Engine(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type OcrResult<T> = Result<T, OcrError>;

/// A polygon vertex in image pixels. Serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
}

impl From<[f64; 2]> for Vertex {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Vertex> for [f64; 2] {
    fn from(v: Vertex) -> Self {
        [v.x, v.y]
    }
}

/// One detected text region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Quadrilateral around the text, clockwise from top-left
    #[serde(rename = "bbox")]
    pub polygon: [Vertex; 4],
    pub text: String,
    /// Recognition confidence (0.0 - 1.0)
    pub confidence: f64,
}

impl Detection {
    /// Create an axis-aligned detection.
    pub fn from_rect(x: f64, y: f64, width: f64, height: f64, text: &str, confidence: f64) -> Self {
        Self {
            polygon: [
                Vertex { x, y },
                Vertex { x: x + width, y },
                Vertex {
                    x: x + width,
                    y: y + height,
                },
                Vertex { x, y: y + height },
            ],
            text: text.to_string(),
            confidence,
        }
    }

    /// Mean y of the polygon.
    pub fn center_y(&self) -> f64 {
        self.polygon.iter().map(|v| v.y).sum::<f64>() / self.polygon.len() as f64
    }

    /// Leftmost x of the polygon.
    pub fn min_x(&self) -> f64 {
        self.polygon
            .iter()
            .map(|v| v.x)
            .fold(f64::INFINITY, f64::min)
    }
}

/// Parse detections exported as JSON (`[{"bbox", "text", "confidence"}]`).
pub fn detections_from_json(json: &str) -> OcrResult<Vec<Detection>> {
    Ok(serde_json::from_str(json)?)
}

/// Text detection engine.
pub trait OcrEngine {
    /// Detect text regions in an image.
    fn detect(&self, image: &Path) -> OcrResult<Vec<Detection>>;
}

/// Engine returning canned detections (for testing and replaying exports).
#[derive(Debug, Clone, Default)]
pub struct MockOcrEngine {
    detections: Vec<Detection>,
}

impl MockOcrEngine {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self { detections }
    }
}

impl OcrEngine for MockOcrEngine {
    fn detect(&self, image: &Path) -> OcrResult<Vec<Detection>> {
        tracing::debug!(image = %image.display(), count = self.detections.len(), "Mock OCR detection");
        Ok(self.detections.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_json_shape() {
        let json = r#"[{"text": "Гемоглобин", "bbox": [[10, 20], [110, 20], [110, 40], [10, 40]], "confidence": 0.93}]"#;
        let detections = detections_from_json(json).unwrap();

        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].text, "Гемоглобин");
        assert_eq!(detections[0].polygon[2], Vertex { x: 110.0, y: 40.0 });
        assert_eq!(detections[0].center_y(), 30.0);
        assert_eq!(detections[0].min_x(), 10.0);

        let back = serde_json::to_value(&detections[0]).unwrap();
        assert_eq!(back["bbox"][0], serde_json::json!([10.0, 20.0]));
    }

    #[test]
    fn test_bad_detection_json() {
        assert!(detections_from_json(r#"[{"text": "x"}]"#).is_err());
    }

    #[test]
    fn test_mock_engine() {
        let engine = MockOcrEngine::new(vec![Detection::from_rect(0.0, 0.0, 10.0, 10.0, "CRP", 0.9)]);
        let detections = engine.detect(Path::new("scan.png")).unwrap();
        assert_eq!(detections[0].text, "CRP");
    }
}
