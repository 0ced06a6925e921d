//! OCR detection overlay.

use crate::ocr::Detection;

use super::canvas::{Canvas, SvgCanvas, TextStyle};

const BOX_COLOR: &str = "#00c853";
const LABEL_COLOR: &str = "#ff1744";

/// Draw every detection's polygon and text over the source image.
///
/// `image_href` is written as-is into the SVG, so it should be a path
/// relative to where the SVG is saved, or a data URI.
pub fn render_detection_overlay(
    image_href: &str,
    width: f64,
    height: f64,
    detections: &[Detection],
) -> String {
    let mut canvas = SvgCanvas::image(width, height).with_background(image_href);
    let label_style = TextStyle::new(LABEL_COLOR, 16.0);

    for detection in detections {
        let vertices: Vec<(f64, f64)> = detection.polygon.iter().map(|v| (v.x, v.y)).collect();
        canvas.polygon(&vertices, BOX_COLOR);

        let top_left = detection.polygon[0];
        canvas.text(top_left.x, top_left.y - 10.0, &detection.text, &label_style);
    }

    canvas.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_draws_each_detection() {
        let detections = vec![
            Detection::from_rect(10.0, 30.0, 100.0, 20.0, "Гемоглобин", 0.9),
            Detection::from_rect(10.0, 60.0, 40.0, 20.0, "<126>", 0.8),
        ];

        let svg = render_detection_overlay("scan.png", 640.0, 480.0, &detections);

        assert_eq!(svg.matches("<polygon").count(), 2);
        assert!(svg.contains(">Гемоглобин</text>"));
        assert!(svg.contains(">&lt;126&gt;</text>"));
        assert!(svg.contains("x='10.0' y='20.0'"));
    }
}
