//! Drawing primitives and the bundled SVG implementation.

use std::fmt::Write;

use crate::models::Bounds;

const FONT_FAMILY: &str = "DejaVu Sans, Segoe UI, sans-serif";

const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 170.0;
const MARGIN_TOP: f64 = 56.0;
const MARGIN_BOTTOM: f64 = 56.0;

/// Y-axis tick count on charts.
const Y_TICKS: usize = 5;

/// Point marker shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Circle,
    Diamond,
    None,
}

/// Style of one plotted series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesStyle {
    /// Legend label
    pub label: Option<String>,
    pub color: String,
    pub marker: Marker,
    /// Join points with a line
    pub line: bool,
}

impl SeriesStyle {
    pub fn new(color: &str, marker: Marker) -> Self {
        Self {
            label: None,
            color: color.to_string(),
            marker,
            line: false,
        }
    }

    pub fn labeled(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn with_line(mut self) -> Self {
        self.line = true;
        self
    }
}

/// Style of a text label.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub color: String,
    pub size: f64,
    /// Center the text on its anchor point
    pub centered: bool,
}

impl TextStyle {
    pub fn new(color: &str, size: f64) -> Self {
        Self {
            color: color.to_string(),
            size,
            centered: false,
        }
    }

    pub fn centered(mut self) -> Self {
        self.centered = true;
        self
    }
}

/// Rendering primitives consumed by the chart builders.
///
/// Coordinates are in data space; how they map to pixels is up to the canvas.
pub trait Canvas {
    /// Shade a horizontal band between two y values and label it.
    fn shade_band(&mut self, bounds: Bounds, label: &str);

    /// Draw a series of points in the given style.
    fn series(&mut self, points: &[(f64, f64)], style: &SeriesStyle);

    /// Draw a closed polygon outline.
    fn polygon(&mut self, vertices: &[(f64, f64)], stroke: &str);

    /// Draw a text label.
    fn text(&mut self, x: f64, y: f64, text: &str, style: &TextStyle);

    /// Produce the finished document.
    fn finish(&self) -> String;
}

/// Axis ranges of a chart frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axes {
    pub x: (f64, f64),
    pub y: (f64, f64),
}

impl Axes {
    /// Axes for report indices `1..=count` and a padded value range.
    pub fn for_values(count: usize, values: impl IntoIterator<Item = f64>) -> Self {
        let (mut lo, mut hi) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });

        if !lo.is_finite() || !hi.is_finite() {
            lo = 0.0;
            hi = 1.0;
        }
        if (hi - lo).abs() < f64::EPSILON {
            lo -= 1.0;
            hi += 1.0;
        }
        let pad = (hi - lo) * 0.1;

        Self {
            x: (0.5, count.max(1) as f64 + 0.5),
            y: (lo - pad, hi + pad),
        }
    }
}

#[derive(Debug, Clone)]
enum Frame {
    /// Data space with axes, margins and a flipped y axis
    Chart {
        axes: Axes,
        x_label: String,
        y_label: String,
    },
    /// Pixel space, no axes
    Image,
}

/// SVG implementation of [`Canvas`].
#[derive(Debug, Clone)]
pub struct SvgCanvas {
    width: f64,
    height: f64,
    frame: Frame,
    title: Option<String>,
    background: Option<String>,
    body: String,
    legend: Vec<(String, String)>,
}

impl SvgCanvas {
    /// A chart with axes over the given data ranges.
    pub fn chart(width: f64, height: f64, axes: Axes) -> Self {
        Self {
            width,
            height,
            frame: Frame::Chart {
                axes,
                x_label: "Report Index".to_string(),
                y_label: "Value".to_string(),
            },
            title: None,
            background: None,
            body: String::new(),
            legend: Vec::new(),
        }
    }

    /// A pixel-space canvas, optionally drawn over a background image.
    pub fn image(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            frame: Frame::Image,
            title: None,
            background: None,
            body: String::new(),
            legend: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Reference an image drawn underneath everything else.
    pub fn with_background(mut self, href: &str) -> Self {
        self.background = Some(href.to_string());
        self
    }

    fn plot_area(&self) -> (f64, f64, f64, f64) {
        match self.frame {
            Frame::Chart { .. } => (
                MARGIN_LEFT,
                MARGIN_TOP,
                self.width - MARGIN_LEFT - MARGIN_RIGHT,
                self.height - MARGIN_TOP - MARGIN_BOTTOM,
            ),
            Frame::Image => (0.0, 0.0, self.width, self.height),
        }
    }

    /// Map a data point to pixels.
    fn map(&self, x: f64, y: f64) -> (f64, f64) {
        match &self.frame {
            Frame::Chart { axes, .. } => {
                let (left, top, w, h) = self.plot_area();
                let px = left + (x - axes.x.0) / (axes.x.1 - axes.x.0) * w;
                let py = top + h - (y - axes.y.0) / (axes.y.1 - axes.y.0) * h;
                (px, py)
            }
            Frame::Image => (x, y),
        }
    }

    fn add_legend(&mut self, label: &str, color: &str) {
        if !self.legend.iter().any(|(l, _)| l == label) {
            self.legend.push((label.to_string(), color.to_string()));
        }
    }

    fn write_axes(&self, svg: &mut String) {
        let Frame::Chart {
            axes,
            x_label,
            y_label,
        } = &self.frame
        else {
            return;
        };
        let (left, top, w, h) = self.plot_area();

        let _ = writeln!(
            svg,
            "  <rect x='{left:.1}' y='{top:.1}' width='{w:.1}' height='{h:.1}' fill='none' stroke='#444'/>"
        );

        // Report indices are integers
        let first = axes.x.0.ceil() as i64;
        let last = axes.x.1.floor() as i64;
        for tick in first..=last {
            let (px, _) = self.map(tick as f64, axes.y.0);
            let _ = writeln!(
                svg,
                "  <line x1='{px:.1}' y1='{top:.1}' x2='{px:.1}' y2='{:.1}' stroke='#ddd'/>",
                top + h
            );
            let _ = writeln!(
                svg,
                "  <text x='{px:.1}' y='{:.1}' fill='#333' font-family='{FONT_FAMILY}' font-size='12' text-anchor='middle'>{tick}</text>",
                top + h + 18.0
            );
        }

        for i in 0..=Y_TICKS {
            let value = axes.y.0 + (axes.y.1 - axes.y.0) * i as f64 / Y_TICKS as f64;
            let (_, py) = self.map(axes.x.0, value);
            let _ = writeln!(
                svg,
                "  <line x1='{left:.1}' y1='{py:.1}' x2='{:.1}' y2='{py:.1}' stroke='#ddd'/>",
                left + w
            );
            let _ = writeln!(
                svg,
                "  <text x='{:.1}' y='{:.1}' fill='#333' font-family='{FONT_FAMILY}' font-size='12' text-anchor='end'>{}</text>",
                left - 8.0,
                py + 4.0,
                format_tick(value)
            );
        }

        let _ = writeln!(
            svg,
            "  <text x='{:.1}' y='{:.1}' fill='#222' font-family='{FONT_FAMILY}' font-size='14' text-anchor='middle'>{}</text>",
            left + w / 2.0,
            self.height - 14.0,
            escape_text(x_label)
        );
        let _ = writeln!(
            svg,
            "  <text x='18' y='{:.1}' fill='#222' font-family='{FONT_FAMILY}' font-size='14' text-anchor='middle' transform='rotate(-90 18 {:.1})'>{}</text>",
            top + h / 2.0,
            top + h / 2.0,
            escape_text(y_label)
        );
    }

    fn write_legend(&self, svg: &mut String) {
        if self.legend.is_empty() {
            return;
        }
        let (left, top, w, _) = self.plot_area();
        let x = left + w + 16.0;

        for (i, (label, color)) in self.legend.iter().enumerate() {
            let y = top + 12.0 + i as f64 * 22.0;
            let _ = writeln!(
                svg,
                "  <rect x='{x:.1}' y='{:.1}' width='14' height='14' fill='{}'/>",
                y - 11.0,
                escape_text(color)
            );
            let _ = writeln!(
                svg,
                "  <text x='{:.1}' y='{y:.1}' fill='#222' font-family='{FONT_FAMILY}' font-size='13'>{}</text>",
                x + 20.0,
                escape_text(label)
            );
        }
    }
}

impl Canvas for SvgCanvas {
    fn shade_band(&mut self, bounds: Bounds, label: &str) {
        let (x0, x1) = match &self.frame {
            Frame::Chart { axes, .. } => axes.x,
            Frame::Image => (0.0, self.width),
        };
        let (left, y_top) = self.map(x0, bounds.upper);
        let (right, y_bottom) = self.map(x1, bounds.lower);
        let height = (y_bottom - y_top).max(0.0);

        let _ = writeln!(
            self.body,
            "  <rect x='{left:.1}' y='{y_top:.1}' width='{:.1}' height='{height:.1}' fill='#9e9e9e' fill-opacity='0.18' stroke='#777' stroke-dasharray='6 4'/>",
            right - left
        );
        let _ = writeln!(
            self.body,
            "  <text x='{:.1}' y='{:.1}' fill='#555' font-family='{FONT_FAMILY}' font-size='11'>{}</text>",
            left + 6.0,
            y_top + 13.0,
            escape_text(label)
        );
        self.add_legend(label, "#bdbdbd");
    }

    fn series(&mut self, points: &[(f64, f64)], style: &SeriesStyle) {
        if points.is_empty() {
            return;
        }
        let mapped: Vec<(f64, f64)> = points.iter().map(|&(x, y)| self.map(x, y)).collect();
        let color = escape_text(&style.color);

        if style.line && mapped.len() > 1 {
            let path = mapped
                .iter()
                .map(|(x, y)| format!("{x:.1},{y:.1}"))
                .collect::<Vec<_>>()
                .join(" ");
            let _ = writeln!(
                self.body,
                "  <polyline points='{path}' fill='none' stroke='{color}' stroke-width='2'/>"
            );
        }

        for (x, y) in &mapped {
            match style.marker {
                Marker::Circle => {
                    let _ = writeln!(
                        self.body,
                        "  <circle cx='{x:.1}' cy='{y:.1}' r='5' fill='{color}'/>"
                    );
                }
                Marker::Diamond => {
                    let _ = writeln!(
                        self.body,
                        "  <polygon points='{:.1},{:.1} {:.1},{:.1} {:.1},{:.1} {:.1},{:.1}' fill='{color}'/>",
                        x, y - 7.0, x + 7.0, y, x, y + 7.0, x - 7.0, y
                    );
                }
                Marker::None => {}
            }
        }

        if let Some(label) = &style.label {
            self.add_legend(label, &style.color);
        }
    }

    fn polygon(&mut self, vertices: &[(f64, f64)], stroke: &str) {
        if vertices.is_empty() {
            return;
        }
        let points = vertices
            .iter()
            .map(|&(x, y)| {
                let (px, py) = self.map(x, y);
                format!("{px:.1},{py:.1}")
            })
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(
            self.body,
            "  <polygon points='{points}' fill='none' stroke='{}' stroke-width='2'/>",
            escape_text(stroke)
        );
    }

    fn text(&mut self, x: f64, y: f64, text: &str, style: &TextStyle) {
        let (px, py) = self.map(x, y);
        let anchor = if style.centered { "middle" } else { "start" };
        let _ = writeln!(
            self.body,
            "  <text x='{px:.1}' y='{py:.1}' fill='{}' font-family='{FONT_FAMILY}' font-size='{:.0}' text-anchor='{anchor}' dominant-baseline='middle'>{}</text>",
            escape_text(&style.color),
            style.size,
            escape_text(text)
        );
    }

    fn finish(&self) -> String {
        let mut svg = String::new();

        let _ = writeln!(
            svg,
            "<svg xmlns='http://www.w3.org/2000/svg' xmlns:xlink='http://www.w3.org/1999/xlink' width='{:.0}' height='{:.0}' viewBox='0 0 {:.0} {:.0}' role='img'>",
            self.width, self.height, self.width, self.height
        );

        match &self.background {
            Some(href) => {
                let _ = writeln!(
                    svg,
                    "  <image href='{}' xlink:href='{}' x='0' y='0' width='{:.0}' height='{:.0}'/>",
                    escape_text(href),
                    escape_text(href),
                    self.width,
                    self.height
                );
            }
            None => {
                let _ = writeln!(
                    svg,
                    "  <rect width='{:.0}' height='{:.0}' fill='#ffffff'/>",
                    self.width, self.height
                );
            }
        }

        if let Some(title) = &self.title {
            let _ = writeln!(
                svg,
                "  <text x='{:.1}' y='32' fill='#111' font-family='{FONT_FAMILY}' font-size='20' font-weight='600' text-anchor='middle'>{}</text>",
                self.width / 2.0,
                escape_text(title)
            );
        }

        self.write_axes(&mut svg);
        svg.push_str(&self.body);
        self.write_legend(&mut svg);
        svg.push_str("</svg>\n");
        svg
    }
}

fn format_tick(value: f64) -> String {
    if value.abs() >= 100.0 {
        format!("{value:.0}")
    } else if value.abs() >= 10.0 {
        format!("{value:.1}")
    } else {
        format!("{value:.2}")
    }
}

/// Escape text for use in SVG content and attributes.
pub fn escape_text(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\'', "&apos;")
        .replace('"', "&quot;")
}
