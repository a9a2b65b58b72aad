//! Interval selection predicate.

use serde::{Deserialize, Serialize};

/// A ride interval, as marked by the user or an auto-detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Start, seconds from ride start
    pub start: f64,
    /// Stop, seconds from ride start
    pub stop: f64,
    /// Whether the interval is currently highlighted
    #[serde(default)]
    pub selected: bool,
}

impl Interval {
    pub fn new(name: impl Into<String>, start: f64, stop: f64, selected: bool) -> Self {
        Self {
            name: name.into(),
            start,
            stop,
            selected,
        }
    }

    /// Does a sample starting at `time` and lasting `duration` overlap this interval?
    pub fn overlaps(&self, time: f64, duration: f64) -> bool {
        time + duration > self.start && time < self.stop
    }
}

/// True if the sample overlaps any selected interval.
pub fn is_selected(time: f64, duration: f64, intervals: &[Interval]) -> bool {
    intervals
        .iter()
        .any(|interval| interval.selected && interval.overlaps(time, duration))
}
