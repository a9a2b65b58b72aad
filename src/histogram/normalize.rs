//! Absolute time to percentage conversion.

/// Values at or below this (in minutes, ~0.6s) are float residue, not time.
pub const NOISE_FLOOR: f64 = 0.01;

/// Point density of a curve, which decides how percentages must be scaled
/// so the visual area sums to 100%.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// One point per bin
    Stepped,
    /// Four points per zone, two of them at the column height
    Columns,
}

impl Shape {
    pub fn factor(self) -> f64 {
        match self {
            Shape::Stepped => 1.0,
            Shape::Columns => 2.0,
        }
    }
}

/// Convert totals into percentages of the grand total.
///
/// Values at or below [`NOISE_FLOOR`] are returned untouched. If the total is
/// not positive the input is returned as is.
pub fn percentify(values: &[f64], factor: f64) -> Vec<f64> {
    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        return values.to_vec();
    }
    values
        .iter()
        .map(|v| {
            if *v > NOISE_FLOOR {
                factor * (v / total) * 100.0
            } else {
                *v
            }
        })
        .collect()
}
