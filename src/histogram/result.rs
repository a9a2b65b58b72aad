//! Plot-ready output types.

use serde::{Deserialize, Serialize};

/// Lower bound of the Y axis on a logarithmic plot (one second, in minutes).
pub const LOG_Y_MIN: f64 = 1.0 / 60.0;

/// Left edge of the X axis for zone columns.
pub const ZONE_AXIS_MIN: f64 = -0.99;

/// One (x, y) coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotPoint {
    pub x: f64,
    pub y: f64,
}

impl PlotPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// How the points of a curve are meant to be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveStyle {
    /// Stepped line, one point per bin
    #[default]
    Steps,
    /// Rectangles, four points per zone
    Columns,
}

/// Scalar summary a caller needs to scale the plot.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlotBounds {
    /// Left edge of the data
    pub min_x: f64,
    /// Right edge of the data (last anchor)
    pub max_x: f64,
    /// Right edge after dropping trailing bins with insignificant time
    pub truncated_max_x: f64,
    /// Largest y over the full and selected curves
    pub max_y: f64,
}

impl PlotBounds {
    /// Y axis range with 10% headroom.
    pub fn y_range(&self, log_y: bool) -> (f64, f64) {
        let min = if log_y { LOG_Y_MIN } else { 0.0 };
        (min, self.max_y * 1.1)
    }
}

/// A distribution, plus the selected-interval subset when one exists.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DistributionResult {
    pub style: CurveStyle,
    pub full: Vec<PlotPoint>,
    pub selected: Option<Vec<PlotPoint>>,
    pub bounds: PlotBounds,
}

impl DistributionResult {
    /// The "nothing to show" result.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.full.is_empty()
    }
}

/// Zip separate x and y vectors into points.
pub fn zip_points(x: &[f64], y: &[f64]) -> Vec<PlotPoint> {
    x.iter()
        .zip(y.iter())
        .map(|(x, y)| PlotPoint::new(*x, *y))
        .collect()
}

/// Largest y in a point slice, zero when empty.
pub fn max_y(points: &[PlotPoint]) -> f64 {
    points.iter().map(|p| p.y).fold(0.0, f64::max)
}
