//! Series dispatch table.
//!
//! Everything the engine needs to know about a measurement channel lives in
//! one [`SeriesSpec`] row, looked up by [`SeriesKind`].

use crate::histogram::units::Conversion;
use crate::ride::types::RideSample;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Measurement channel being distributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    /// Power in watts
    #[default]
    Power,
    /// Power relative to athlete weight
    PowerPerKg,
    /// Alternative (altitude-corrected) power
    AltPower,
    /// Pedal torque
    Torque,
    /// Heart rate
    HeartRate,
    /// Cadence
    Cadence,
    /// Speed
    Speed,
}

/// Which zone configuration a zonable series uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneKind {
    Power,
    HeartRate,
}

/// Reads the stored (metric) value of a series from a sample.
pub type SampleAccessor = fn(&RideSample, f64) -> Option<f64>;

/// Static description of a series.
#[derive(Debug, Clone, Copy)]
pub struct SeriesSpec {
    /// Physical value represented by one raw index
    pub delta: f64,
    /// Sample value accessor (second argument is athlete weight in kg)
    pub value: SampleAccessor,
    /// Zone configuration used when zoning is requested
    pub zone_kind: Option<ZoneKind>,
    /// Unit conversion behaviour
    pub conversion: Conversion,
    /// Human readable name
    pub name: &'static str,
    /// Unit label in metric
    pub metric_unit: &'static str,
    /// Unit label in imperial
    pub imperial_unit: &'static str,
}

fn power(s: &RideSample, _: f64) -> Option<f64> {
    s.power
}

fn power_per_kg(s: &RideSample, weight_kg: f64) -> Option<f64> {
    if weight_kg > 0.0 {
        s.power.map(|w| w / weight_kg)
    } else {
        None
    }
}

fn alt_power(s: &RideSample, _: f64) -> Option<f64> {
    s.alt_power
}

fn torque(s: &RideSample, _: f64) -> Option<f64> {
    s.torque
}

fn heart_rate(s: &RideSample, _: f64) -> Option<f64> {
    s.heart_rate
}

fn cadence(s: &RideSample, _: f64) -> Option<f64> {
    s.cadence
}

fn speed(s: &RideSample, _: f64) -> Option<f64> {
    s.speed
}

// Indexed by `SeriesKind as usize`.
static SERIES_TABLE: [SeriesSpec; 7] = [
    SeriesSpec {
        delta: 1.0,
        value: power,
        zone_kind: Some(ZoneKind::Power),
        conversion: Conversion::None,
        name: "Power",
        metric_unit: "watts",
        imperial_unit: "watts",
    },
    SeriesSpec {
        delta: 0.01,
        value: power_per_kg,
        zone_kind: Some(ZoneKind::Power),
        conversion: Conversion::None,
        name: "Power",
        metric_unit: "watts/kg",
        imperial_unit: "watts/kg",
    },
    SeriesSpec {
        delta: 1.0,
        value: alt_power,
        zone_kind: None,
        conversion: Conversion::None,
        name: "aPower",
        metric_unit: "watts",
        imperial_unit: "watts",
    },
    SeriesSpec {
        delta: 0.1,
        value: torque,
        zone_kind: None,
        conversion: Conversion::Torque,
        name: "Torque",
        metric_unit: "N-m",
        imperial_unit: "ft-lbf",
    },
    SeriesSpec {
        delta: 1.0,
        value: heart_rate,
        zone_kind: Some(ZoneKind::HeartRate),
        conversion: Conversion::None,
        name: "Heartrate",
        metric_unit: "bpm",
        imperial_unit: "bpm",
    },
    SeriesSpec {
        delta: 1.0,
        value: cadence,
        zone_kind: None,
        conversion: Conversion::None,
        name: "Cadence",
        metric_unit: "rpm",
        imperial_unit: "rpm",
    },
    SeriesSpec {
        delta: 0.1,
        value: speed,
        zone_kind: None,
        conversion: Conversion::Speed,
        name: "Speed",
        metric_unit: "kph",
        imperial_unit: "mph",
    },
];

impl SeriesKind {
    /// All series in table order.
    pub const ALL: [SeriesKind; 7] = [
        SeriesKind::Power,
        SeriesKind::PowerPerKg,
        SeriesKind::AltPower,
        SeriesKind::Torque,
        SeriesKind::HeartRate,
        SeriesKind::Cadence,
        SeriesKind::Speed,
    ];

    /// Look up the dispatch row for this series.
    pub fn spec(self) -> &'static SeriesSpec {
        &SERIES_TABLE[self as usize]
    }

    /// Value per raw index.
    pub fn delta(self) -> f64 {
        self.spec().delta
    }

    /// Zone configuration, if the series can be zoned.
    pub fn zone_kind(self) -> Option<ZoneKind> {
        self.spec().zone_kind
    }

    pub fn is_zonable(self) -> bool {
        self.zone_kind().is_some()
    }

    /// Stored value of this series in a sample.
    pub fn sample_value(self, sample: &RideSample, weight_kg: f64) -> Option<f64> {
        (self.spec().value)(sample, weight_kg)
    }

    /// Axis label for the value axis.
    pub fn axis_label(self, units: crate::histogram::units::Units, zoned: bool) -> String {
        let spec = self.spec();
        if zoned {
            if let Some(kind) = spec.zone_kind {
                return match kind {
                    ZoneKind::Power => "Power zone".to_string(),
                    ZoneKind::HeartRate => "Heartrate zone".to_string(),
                };
            }
        }
        let unit = if units.is_metric() {
            spec.metric_unit
        } else {
            spec.imperial_unit
        };
        format!("{} ({})", spec.name, unit)
    }
}

impl std::fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SeriesKind::Power => "power",
            SeriesKind::PowerPerKg => "power_per_kg",
            SeriesKind::AltPower => "alt_power",
            SeriesKind::Torque => "torque",
            SeriesKind::HeartRate => "heart_rate",
            SeriesKind::Cadence => "cadence",
            SeriesKind::Speed => "speed",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for SeriesKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "power" | "watts" => Ok(SeriesKind::Power),
            "power_per_kg" | "wkg" => Ok(SeriesKind::PowerPerKg),
            "alt_power" | "apower" => Ok(SeriesKind::AltPower),
            "torque" | "nm" => Ok(SeriesKind::Torque),
            "heart_rate" | "hr" => Ok(SeriesKind::HeartRate),
            "cadence" | "cad" => Ok(SeriesKind::Cadence),
            "speed" | "kph" => Ok(SeriesKind::Speed),
            other => Err(format!("unknown series '{}'", other)),
        }
    }
}
