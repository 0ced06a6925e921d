//! Trend, combined and score-strip charts.

use crate::analysis::{score_trends, Classification, ParameterSeries};
use crate::models::Bounds;

use super::canvas::{Axes, Canvas, Marker, SeriesStyle, SvgCanvas, TextStyle};

const TREND_WIDTH: f64 = 900.0;
const TREND_HEIGHT: f64 = 520.0;
const COMBINED_WIDTH: f64 = 1200.0;
const COMBINED_HEIGHT: f64 = 760.0;
const STRIP_CELL_WIDTH: f64 = 120.0;
const STRIP_HEIGHT: f64 = 200.0;

const NORMAL_COLOR: &str = "#2e7d32";
const OUTLIER_COLOR: &str = "#c62828";
const CONNECTOR_COLOR: &str = "#90a4ae";

/// Line colours for the combined chart, cycled.
const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// A rendered per-parameter trend chart.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendChart {
    pub parameter: String,
    /// Whether any point was out of range; picks the output group
    pub extreme: bool,
    pub svg: String,
}

/// Render one parameter's trend with normal and outlier points styled apart
/// and the reference band shaded when known.
pub fn render_trend(
    name: &str,
    classification: &Classification,
    band: Option<Bounds>,
    report_count: usize,
) -> TrendChart {
    let points = classification.points();
    let values = points
        .iter()
        .map(|p| p.value)
        .chain(band.iter().flat_map(|b| [b.lower, b.upper]));
    let axes = Axes::for_values(report_count, values);

    let mut canvas = SvgCanvas::chart(TREND_WIDTH, TREND_HEIGHT, axes).with_title(&format!("{name} Trend"));

    if let Some(bounds) = band {
        canvas.shade_band(
            bounds,
            &format!("Reference {}–{}", bounds.lower, bounds.upper),
        );
    }

    let to_xy = |p: &crate::analysis::Point| ((p.index + 1) as f64, p.value);

    let connector: Vec<(f64, f64)> = points.iter().map(to_xy).collect();
    canvas.series(
        &connector,
        &SeriesStyle::new(CONNECTOR_COLOR, Marker::None).with_line(),
    );

    let normal: Vec<(f64, f64)> = classification.normal.iter().map(to_xy).collect();
    canvas.series(
        &normal,
        &SeriesStyle::new(NORMAL_COLOR, Marker::Circle).labeled("Within range"),
    );

    let outliers: Vec<(f64, f64)> = classification.outliers.iter().map(to_xy).collect();
    canvas.series(
        &outliers,
        &SeriesStyle::new(OUTLIER_COLOR, Marker::Diamond).labeled("Out of range"),
    );

    TrendChart {
        parameter: name.to_string(),
        extreme: classification.is_extreme(),
        svg: canvas.finish(),
    }
}

/// Render every parameter on one chart over the shared report-index axis.
///
/// Reference ranges are ignored; gaps in a series break its line.
pub fn render_combined(series: &ParameterSeries) -> String {
    let values = series
        .iter()
        .flat_map(|(_, values)| values.iter().flatten().copied());
    let axes = Axes::for_values(series.report_count(), values);

    let mut canvas = SvgCanvas::chart(COMBINED_WIDTH, COMBINED_HEIGHT, axes)
        .with_title("Blood Analysis Parameter Trends Across Reports");

    let plotted = series
        .iter()
        .filter(|(name, _)| !series.is_all_missing(name));

    for (i, (name, values)) in plotted.enumerate() {
        let style = SeriesStyle::new(PALETTE[i % PALETTE.len()], Marker::Circle)
            .labeled(name)
            .with_line();

        for segment in segments(values) {
            canvas.series(&segment, &style);
        }
    }

    canvas.finish()
}

/// Split a series into runs of consecutive present values.
fn segments(values: &[Option<f64>]) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();

    for (index, value) in values.iter().enumerate() {
        match value {
            Some(v) => current.push(((index + 1) as f64, *v)),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Render health scores as a horizontal strip of `score glyph` labels.
///
/// Returns `None` when there are no scores.
pub fn render_score_strip(scores: &[f64]) -> Option<String> {
    if scores.is_empty() {
        return None;
    }

    let count = scores.len() as f64;
    let width = (count * STRIP_CELL_WIDTH).max(2.0 * STRIP_CELL_WIDTH);
    let mut canvas = SvgCanvas::image(width, STRIP_HEIGHT).with_title("General Health Scores");

    for (i, (score, trend)) in scores.iter().zip(score_trends(scores)).enumerate() {
        let x = (i as f64 + 1.0) / (count + 1.0) * width;
        let label = format!("{} {}", score.round() as i64, trend.glyph());
        canvas.text(
            x,
            STRIP_HEIGHT / 2.0 + 10.0,
            &label,
            &TextStyle::new(trend.color(), 28.0).centered(),
        );
    }

    Some(canvas.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{extract_series, Point};
    use crate::models::{Parameter, Report};

    fn classification() -> Classification {
        Classification {
            normal: vec![Point { index: 0, value: 1.0 }],
            outliers: vec![Point { index: 2, value: 5.0 }],
        }
    }

    #[test]
    fn test_trend_styles_and_band() {
        let chart = render_trend("CRP", &classification(), Some(Bounds::new(0.0, 3.0)), 3);

        assert!(chart.extreme);
        assert_eq!(chart.parameter, "CRP");
        assert!(chart.svg.contains("CRP Trend"));
        assert!(chart.svg.contains("Reference 0–3"));
        assert_eq!(chart.svg.matches("<circle").count(), 1);
        assert!(chart.svg.contains(OUTLIER_COLOR));
        assert!(chart.svg.contains("Out of range"));
    }

    #[test]
    fn test_trend_without_band() {
        let only_normal = Classification {
            normal: vec![Point { index: 0, value: 1.0 }],
            outliers: vec![],
        };
        let chart = render_trend("Ferritin", &only_normal, None, 1);

        assert!(!chart.extreme);
        assert!(!chart.svg.contains("Reference"));
        assert!(!chart.svg.contains("Out of range"));
    }

    #[test]
    fn test_segments_break_on_missing() {
        let runs = segments(&[Some(1.0), Some(2.0), None, Some(4.0), None]);
        assert_eq!(runs, vec![vec![(1.0, 1.0), (2.0, 2.0)], vec![(4.0, 4.0)]]);
    }

    #[test]
    fn test_combined_has_every_parameter() {
        let mut first = Report::new("1.txt");
        first.parameters = vec![
            Parameter::new("CRP", 1.0, "mg/L"),
            Parameter::new("LDL", 2.0, "mmol/L"),
        ];
        let mut second = Report::new("2.txt");
        second.parameters = vec![Parameter::new("CRP", 2.0, "mg/L")];

        let svg = render_combined(&extract_series(&[first, second]));

        assert!(svg.contains(">CRP</text>"));
        assert!(svg.contains(">LDL</text>"));
        assert!(svg.contains("Blood Analysis Parameter Trends Across Reports"));
    }

    #[test]
    fn test_score_strip() {
        let svg = render_score_strip(&[80.0, 85.0, 85.0, 70.0]).unwrap();

        assert!(svg.contains(">80 →</text>"));
        assert!(svg.contains(">85 ↑</text>"));
        assert!(svg.contains(">70 ↓</text>"));
        assert!(svg.contains("fill='green'"));
        assert!(svg.contains("fill='red'"));
    }

    #[test]
    fn test_score_strip_empty() {
        assert!(render_score_strip(&[]).is_none());
    }
}
