//! Direction of consecutive health scores.

use serde::Serialize;

/// Change relative to the previous score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub fn glyph(&self) -> &'static str {
        match self {
            Trend::Up => "↑",
            Trend::Down => "↓",
            Trend::Flat => "→",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Trend::Up => "green",
            Trend::Down => "red",
            Trend::Flat => "gray",
        }
    }
}

/// Trend of each score against the one before it.
///
/// Scores are compared as rounded integers, the form they are displayed in.
/// The first score compares against itself and is always `Flat`.
pub fn score_trends(scores: &[f64]) -> Vec<Trend> {
    let rounded: Vec<i64> = scores.iter().map(|s| s.round() as i64).collect();

    rounded
        .iter()
        .enumerate()
        .map(|(i, score)| {
            let prev = if i > 0 { rounded[i - 1] } else { *score };
            match score.cmp(&prev) {
                std::cmp::Ordering::Greater => Trend::Up,
                std::cmp::Ordering::Less => Trend::Down,
                std::cmp::Ordering::Equal => Trend::Flat,
            }
        })
        .collect()
}
