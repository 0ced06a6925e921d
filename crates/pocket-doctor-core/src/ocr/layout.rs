//! Turning detections into text.

use serde::{Deserialize, Serialize};

use super::Detection;

/// Parameters for layout-preserving text reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Max vertical distance (px) between detections on the same line
    pub line_threshold: f64,
    /// Pixels per space character
    pub space_scale: u32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            line_threshold: 15.0,
            space_scale: 10,
        }
    }
}

/// Non-blank detection texts, trimmed, one per line.
pub fn detections_to_text(detections: &[Detection]) -> String {
    detections
        .iter()
        .map(|d| d.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Rebuild text with the visual layout roughly preserved.
///
/// Detections are sorted top to bottom and grouped into a line while each
/// one's mean y stays within `line_threshold` of the previous one. Within a
/// line, detections are ordered by left edge and separated by spaces
/// proportional to the horizontal gap.
pub fn detections_to_structured_text(detections: &[Detection], options: &LayoutOptions) -> String {
    let mut entries: Vec<(f64, f64, &str)> = detections
        .iter()
        .map(|d| (d.center_y(), d.min_x(), d.text.as_str()))
        .collect();
    entries.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut lines: Vec<Vec<(f64, f64, &str)>> = Vec::new();
    let mut current: Vec<(f64, f64, &str)> = Vec::new();
    let mut last_y: Option<f64> = None;

    for entry in entries {
        let same_line = last_y.map_or(true, |y| (entry.0 - y).abs() <= options.line_threshold);
        if !same_line {
            lines.push(std::mem::take(&mut current));
        }
        current.push(entry);
        last_y = Some(entry.0);
    }
    if !current.is_empty() {
        lines.push(current);
    }

    let scale = f64::from(options.space_scale.max(1));

    lines
        .into_iter()
        .map(|mut line| {
            line.sort_by(|a, b| a.1.total_cmp(&b.1));

            let mut text = String::new();
            let mut last_x = 0.0;
            for (_, x, word) in line {
                let spaces = ((x - last_x) / scale).trunc() as i64;
                text.push_str(&" ".repeat(spaces.max(1) as usize));
                text.push_str(word);

                let half_width = (word.chars().count() as u64 * u64::from(options.space_scale)) / 2;
                last_x = x + half_width as f64;
            }
            text.trim().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_skips_blank() {
        let detections = vec![
            Detection::from_rect(0.0, 0.0, 10.0, 10.0, "  Hemoglobin ", 0.9),
            Detection::from_rect(0.0, 20.0, 10.0, 10.0, "   ", 0.2),
            Detection::from_rect(0.0, 40.0, 10.0, 10.0, "126 g/L", 0.8),
        ];

        assert_eq!(detections_to_text(&detections), "Hemoglobin\n126 g/L");
    }

    #[test]
    fn test_structured_same_line() {
        let detections = vec![
            Detection::from_rect(200.0, 96.0, 30.0, 10.0, "126", 0.9),
            Detection::from_rect(10.0, 95.0, 100.0, 10.0, "Hemoglobin", 0.9),
        ];

        let text = detections_to_structured_text(&detections, &LayoutOptions::default());

        // last_x after "Hemoglobin" = 10 + 10*10/2 = 60 → (200 - 60) / 10 = 14 spaces
        assert_eq!(text, format!("Hemoglobin{}126", " ".repeat(14)));
    }

    #[test]
    fn test_structured_splits_lines() {
        let detections = vec![
            Detection::from_rect(10.0, 100.0, 50.0, 10.0, "LDL", 0.9),
            Detection::from_rect(10.0, 10.0, 50.0, 10.0, "Report", 0.9),
            Detection::from_rect(10.0, 112.0, 50.0, 10.0, "HDL", 0.9),
        ];

        let text = detections_to_structured_text(&detections, &LayoutOptions::default());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Report");
        assert!(lines[1].starts_with("LDL"));
        assert!(lines[1].ends_with("HDL"));
    }

    #[test]
    fn test_structured_empty() {
        assert_eq!(detections_to_structured_text(&[], &LayoutOptions::default()), "");
    }
}
