//! Metric/imperial conversion for distributed series.
//!
//! Ride data is stored in metric units. Torque and speed are the only
//! series whose value axis changes with the unit preference; everything
//! else passes through untouched.

use crate::histogram::series::SeriesKind;
use serde::{Deserialize, Serialize};

/// N·m to ft·lbf.
pub const TORQUE_IMPERIAL_FACTOR: f64 = 0.737_562_15;

/// km/h to mph.
pub const SPEED_IMPERIAL_FACTOR: f64 = 0.621_371_19;

/// Unit system preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Metric units (km/h, N·m)
    #[default]
    Metric,
    /// Imperial units (mph, ft·lbf)
    Imperial,
}

impl Units {
    /// Build from the "use metric units" flag most callers carry around.
    pub fn from_metric_flag(use_metric: bool) -> Self {
        if use_metric {
            Units::Metric
        } else {
            Units::Imperial
        }
    }

    pub fn is_metric(self) -> bool {
        self == Units::Metric
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Units::Metric => write!(f, "Metric"),
            Units::Imperial => write!(f, "Imperial"),
        }
    }
}

/// How a series reacts to the unit preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// Same value in both systems
    None,
    /// N·m ↔ ft·lbf
    Torque,
    /// km/h ↔ mph
    Speed,
}

impl Conversion {
    /// Multiplier applied to a stored (metric) value.
    pub fn factor(self, units: Units) -> f64 {
        match (self, units) {
            (_, Units::Metric) | (Conversion::None, _) => 1.0,
            (Conversion::Torque, Units::Imperial) => TORQUE_IMPERIAL_FACTOR,
            (Conversion::Speed, Units::Imperial) => SPEED_IMPERIAL_FACTOR,
        }
    }
}

/// Conversion factor for a series under the given unit system.
pub fn factor(series: SeriesKind, units: Units) -> f64 {
    series.spec().conversion.factor(units)
}

/// Scale a raw stored value into the requested unit system.
///
/// Apply this exactly once per value, before discretisation.
pub fn scale(series: SeriesKind, raw: f64, units: Units) -> f64 {
    raw * factor(series, units)
}
