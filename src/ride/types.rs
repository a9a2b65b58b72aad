//! Ride, cache and metric documents consumed by the histogram engine.

use crate::histogram::selection::Interval;
use crate::histogram::series::SeriesKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

fn default_recording_interval() -> f64 {
    1.0
}

/// A single recorded data point. Missing channels are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RideSample {
    /// Seconds since ride start
    pub secs: f64,
    /// Power in watts
    #[serde(default)]
    pub power: Option<f64>,
    /// Alternative power in watts
    #[serde(default)]
    pub alt_power: Option<f64>,
    /// Pedal torque in N·m
    #[serde(default)]
    pub torque: Option<f64>,
    /// Heart rate in BPM
    #[serde(default)]
    pub heart_rate: Option<f64>,
    /// Cadence in RPM
    #[serde(default)]
    pub cadence: Option<f64>,
    /// Speed in km/h
    #[serde(default)]
    pub speed: Option<f64>,
}

/// A recorded ride.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ride {
    /// Unique identifier
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// Ride start time
    pub start_time: DateTime<Utc>,
    /// Seconds between samples
    #[serde(default = "default_recording_interval")]
    pub recording_interval_secs: f64,
    /// Athlete weight on the day, in kg
    #[serde(default)]
    pub weight_kg: f64,
    /// Samples in time order
    #[serde(default)]
    pub samples: Vec<RideSample>,
    /// Intervals marked on the ride
    #[serde(default)]
    pub intervals: Vec<Interval>,
}

impl Ride {
    /// Create an empty ride starting at `start_time`, sampled every second.
    pub fn new(start_time: DateTime<Utc>, weight_kg: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            start_time,
            recording_interval_secs: 1.0,
            weight_kg,
            samples: Vec::new(),
            intervals: Vec::new(),
        }
    }

    /// Does the ride carry any non-zero value for `series`?
    pub fn is_data_present(&self, series: SeriesKind) -> bool {
        self.samples.iter().any(|s| {
            series
                .sample_value(s, self.weight_kg)
                .is_some_and(|v| v != 0.0)
        })
    }

    /// Total recorded duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 * self.recording_interval_secs
    }
}

/// Number of zone slots a distribution cache keeps.
pub const CACHE_ZONE_SLOTS: usize = 10;

/// Pre-aggregated distributions for one ride or a date range, normalized
/// to one-second samples.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DistributionCache {
    /// Display name (used as the curve name in compare mode)
    #[serde(default)]
    pub name: String,
    /// Seconds spent at each raw index, per series
    #[serde(default)]
    pub distributions: HashMap<SeriesKind, Vec<f64>>,
    /// Seconds per power zone
    #[serde(default)]
    pub power_zone_secs: Vec<f64>,
    /// Seconds per heart rate zone
    #[serde(default)]
    pub hr_zone_secs: Vec<f64>,
}

impl DistributionCache {
    /// Distribution for a series, empty if none was cached.
    pub fn distribution(&self, series: SeriesKind) -> &[f64] {
        self.distributions
            .get(&series)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}

/// One ride's contribution to a metric distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Value of the distributed metric (x axis)
    pub value: f64,
    /// Value of the totalled metric (y axis)
    pub total: f64,
}

/// How to read a metric's values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricSpec {
    /// Decimal places the metric is reported with
    #[serde(default)]
    pub precision: u32,
    /// Distributed metric is in seconds (shown in minutes)
    #[serde(default)]
    pub value_in_seconds: bool,
    /// Totalled metric is in seconds (summed in minutes)
    #[serde(default)]
    pub total_in_seconds: bool,
    /// "No data" sentinel, records carrying it are ignored
    #[serde(default)]
    pub skip_value: Option<f64>,
}

/// A metric distribution document: the metric description plus one record
/// per ride.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricDocument {
    #[serde(default)]
    pub spec: MetricSpec,
    #[serde(default)]
    pub records: Vec<MetricRecord>,
}
