//! Time-in-zone aggregation and column layout.

use crate::histogram::counts::CountArray;
use crate::histogram::result::PlotPoint;
use crate::metrics::zones::ZoneLookup;

/// Share of a zone slot given to columns; the rest is the gap between slots.
pub const SLOT_FILL: f64 = 0.90;

/// Where a column sits inside its zone slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnLayout {
    /// Offset of the column's left edge from the slot's left edge
    pub offset: f64,
    /// Column width
    pub width: f64,
}

impl ColumnLayout {
    /// One data set: the column fills 90% of the slot, centred.
    pub fn single() -> Self {
        Self {
            offset: (1.0 - SLOT_FILL) / 2.0,
            width: SLOT_FILL,
        }
    }

    /// Data set `position` of `active` shown side by side.
    ///
    /// Each set gets `0.9 / active` of the slot and keeps 10% of that free
    /// towards its neighbour.
    pub fn compare(position: usize, active: usize) -> Self {
        let active = active.max(1) as f64;
        let share = SLOT_FILL / active;
        Self {
            offset: position as f64 * share,
            width: share * SLOT_FILL,
        }
    }
}

/// Aggregates value-indexed counts into zones.
#[derive(Debug, Clone, Copy)]
pub struct ZoneAggregator<'a, Z: ZoneLookup> {
    zones: &'a Z,
    /// Series units per raw index
    delta: f64,
    /// Minutes represented by one count
    dt: f64,
    include_zeros: bool,
}

impl<'a, Z: ZoneLookup> ZoneAggregator<'a, Z> {
    pub fn new(zones: &'a Z, delta: f64, dt: f64, include_zeros: bool) -> Self {
        Self {
            zones,
            delta,
            dt,
            include_zeros,
        }
    }

    /// Counts per zone, indexed by zone number.
    pub fn zone_counts(&self, counts: &CountArray) -> CountArray {
        let mut out = CountArray::from_counts(vec![0.0; self.zones.num_zones()]);
        for (index, amount) in counts.as_slice().iter().enumerate() {
            if *amount == 0.0 || (index == 0 && !self.include_zeros) {
                continue;
            }
            if let Some(zone) = self.zones.which_zone(index as f64 * self.delta) {
                out.add(zone, *amount);
            }
        }
        out
    }

    /// Time per zone in minutes, exactly `num_zones()` entries.
    pub fn aggregate(&self, counts: &CountArray) -> Vec<f64> {
        self.zone_counts(counts)
            .as_slice()
            .iter()
            .map(|c| c * self.dt)
            .collect()
    }
}

/// Column coordinates for per-zone heights: four points per zone,
/// `(left,0) (left,h) (right,h) (right,0)`, zone `i` centred on `x = i`.
pub fn columns(heights: &[f64], layout: ColumnLayout) -> Vec<PlotPoint> {
    let mut points = Vec::with_capacity(heights.len() * 4);
    for (i, h) in heights.iter().enumerate() {
        let left = i as f64 - 0.5 + layout.offset;
        let right = left + layout.width;
        points.push(PlotPoint::new(left, 0.0));
        points.push(PlotPoint::new(left, *h));
        points.push(PlotPoint::new(right, *h));
        points.push(PlotPoint::new(right, 0.0));
    }
    points
}
