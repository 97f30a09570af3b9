//! Geometry for the compact trend lines on hero cards.
//!
//! Everything here is pure: the component measures its container, builds a
//! [`Surface`], and turns the resulting [`Sparkline`] into SVG.

use super::constants::{
    DEFAULT_SURFACE_HEIGHT, DEFAULT_SURFACE_WIDTH, SPARKLINE_HEIGHT, SPARKLINE_MAX_WIDTH,
    SPARKLINE_PADDING,
};

pub const UP_COLOR: &str = "#10b981";
pub const DOWN_COLOR: &str = "#f59e0b";
pub const NEUTRAL_COLOR: &str = "#6b7280";
pub const PLACEHOLDER_COLOR: &str = "#d1d5db";
pub const LINE_WIDTH: f64 = 2.0;
pub const PLACEHOLDER_LINE_WIDTH: f64 = 1.0;
pub const PLACEHOLDER_DASH: &str = "2 2";
pub const MARKER_RADIUS: f64 = 2.0;

/// Pixel box a sparkline is drawn into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
}

impl Default for Surface {
    fn default() -> Self {
        Surface {
            width: DEFAULT_SURFACE_WIDTH,
            height: DEFAULT_SURFACE_HEIGHT,
        }
    }
}

impl Surface {
    /// Sizes the surface from the container's current width. A container that
    /// has not been laid out yet keeps the default surface.
    pub fn fit(container_width: f64) -> Surface {
        if container_width > 0.0 && container_width.is_finite() {
            Surface {
                width: (container_width - SPARKLINE_PADDING)
                    .min(SPARKLINE_MAX_WIDTH)
                    .max(0.0),
                height: SPARKLINE_HEIGHT,
            }
        } else {
            Surface::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Neutral,
}

impl Trend {
    /// Direction between the first and last sample.
    pub fn between(first: f64, last: f64) -> Trend {
        if last > first {
            Trend::Up
        } else if last < first {
            Trend::Down
        } else {
            Trend::Neutral
        }
    }

    pub fn of_change(change: Option<f64>) -> Trend {
        match change {
            Some(value) if value > 0.0 => Trend::Up,
            Some(value) if value < 0.0 => Trend::Down,
            _ => Trend::Neutral,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Trend::Up => UP_COLOR,
            Trend::Down => DOWN_COLOR,
            Trend::Neutral => NEUTRAL_COLOR,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// What a hero card has available to plot.
#[derive(Debug, Clone, PartialEq)]
pub enum SparklineInput {
    Series(Vec<f64>),
    Change(Option<f64>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Sparkline {
    /// Dashed midline shown when fewer than two samples exist.
    Placeholder { surface: Surface, y: f64 },
    Line {
        surface: Surface,
        points: Vec<Point>,
        marker: Point,
        trend: Trend,
    },
}

impl Sparkline {
    pub fn render(input: &SparklineInput, surface: Surface) -> Sparkline {
        match input {
            SparklineInput::Series(values) => plot_series(values, surface),
            SparklineInput::Change(change) => plot_change(*change, surface),
        }
    }

    pub fn surface(&self) -> Surface {
        match self {
            Sparkline::Placeholder { surface, .. } | Sparkline::Line { surface, .. } => *surface,
        }
    }

    /// SVG `points` attribute for the stroked path.
    pub fn svg_points(&self) -> String {
        match self {
            Sparkline::Placeholder { surface, y } => {
                format!("0.00,{y:.2} {:.2},{y:.2}", surface.width)
            }
            Sparkline::Line { points, .. } => points
                .iter()
                .map(|point| format!("{:.2},{:.2}", point.x, point.y))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    pub fn stroke(&self) -> &'static str {
        match self {
            Sparkline::Placeholder { .. } => PLACEHOLDER_COLOR,
            Sparkline::Line { trend, .. } => trend.color(),
        }
    }
}

/// Plots a series scaled into the surface. `range` falls back to 1 for a
/// flat series, which is drawn on the midline.
pub fn plot_series(values: &[f64], surface: Surface) -> Sparkline {
    let values: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let (Some(&first), Some(&last)) = (values.first(), values.last()) else {
        return placeholder(surface);
    };
    if values.len() < 2 {
        return placeholder(surface);
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let spread = max - min;
    let range = if spread == 0.0 { 1.0 } else { spread };
    let project = |value: f64| -> f64 {
        if spread == 0.0 {
            surface.height / 2.0
        } else {
            surface.height - ((value - min) / range) * surface.height
        }
    };

    let steps = (values.len() - 1) as f64;
    let points: Vec<Point> = values
        .iter()
        .enumerate()
        .map(|(idx, value)| Point {
            x: (idx as f64 / steps) * surface.width,
            y: project(*value),
        })
        .collect();

    Sparkline::Line {
        surface,
        points,
        marker: Point {
            x: surface.width,
            y: project(last),
        },
        trend: Trend::between(first, last),
    }
}

/// Fixed three-point glyph used when only the daily change is known.
pub fn plot_change(change: Option<f64>, surface: Surface) -> Sparkline {
    let Surface { width, height } = surface;
    let trend = Trend::of_change(change);
    let points = match trend {
        Trend::Up => vec![
            Point { x: 0.0, y: height * 0.8 },
            Point { x: width * 0.7, y: height * 0.3 },
            Point { x: width, y: height * 0.2 },
        ],
        Trend::Down => vec![
            Point { x: 0.0, y: height * 0.2 },
            Point { x: width * 0.7, y: height * 0.7 },
            Point { x: width, y: height * 0.8 },
        ],
        Trend::Neutral => vec![
            Point { x: 0.0, y: height / 2.0 },
            Point { x: width, y: height / 2.0 },
        ],
    };
    let marker_y = match trend {
        Trend::Up => height * 0.2,
        Trend::Down => height * 0.8,
        Trend::Neutral => height / 2.0,
    };

    Sparkline::Line {
        surface,
        points,
        marker: Point { x: width, y: marker_y },
        trend,
    }
}

fn placeholder(surface: Surface) -> Sparkline {
    Sparkline::Placeholder {
        surface,
        y: surface.height / 2.0,
    }
}
