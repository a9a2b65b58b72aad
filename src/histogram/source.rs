//! Building count arrays from the three kinds of input.
//!
//! - a ride's samples, in one pass that fills every series and the
//!   selected-interval subset in lockstep
//! - a pre-aggregated distribution cache
//! - one scalar metric value per ride, for metric distributions

use crate::histogram::aggregator::ZoneAggregator;
use crate::histogram::counts::{index_for, CountArray};
use crate::histogram::selection::is_selected;
use crate::histogram::series::{SeriesKind, ZoneKind};
use crate::histogram::units::{self, Units};
use crate::metrics::zones::{ZoneLookup, ZoneSchedule, ZoneTable};
use crate::ride::types::{DistributionCache, MetricRecord, MetricSpec, Ride, RideSample, CACHE_ZONE_SLOTS};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Metric values are clamped to this magnitude to bound the array size.
pub const METRIC_CLAMP: f64 = 100_000.0;

/// Where the counts came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// A single ride's samples
    #[default]
    Ride,
    /// A pre-aggregated distribution cache
    Cache,
    /// Per-ride metric values
    Metric,
}

/// Full counts and, where interval selection applies, the selected subset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesCounts {
    pub full: CountArray,
    pub selected: Option<CountArray>,
}

impl SeriesCounts {
    fn arena() -> Self {
        Self {
            full: CountArray::with_arena(),
            selected: Some(CountArray::with_arena()),
        }
    }

    // One slot counting samples whose value was exactly zero.
    fn zero_tally() -> Self {
        Self {
            full: CountArray::from_counts(vec![0.0]),
            selected: Some(CountArray::from_counts(vec![0.0])),
        }
    }

    fn without_selection(full: CountArray) -> Self {
        Self {
            full,
            selected: None,
        }
    }

    fn record(&mut self, index: usize, selected: bool) {
        if self.full.increment(index) && selected {
            if let Some(sel) = self.selected.as_mut() {
                sel.increment(index);
            }
        }
    }
}

/// Zone counts with and without the samples whose value was exactly zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneCounts {
    pub with_zeros: SeriesCounts,
    pub without_zeros: SeriesCounts,
}

impl ZoneCounts {
    /// Counts that do not depend on the zero policy.
    fn fixed(counts: SeriesCounts) -> Self {
        Self {
            with_zeros: counts.clone(),
            without_zeros: counts,
        }
    }

    pub fn get(&self, include_zeros: bool) -> &SeriesCounts {
        if include_zeros {
            &self.with_zeros
        } else {
            &self.without_zeros
        }
    }
}

/// Metric-mode counts with their own value axis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricAxis {
    pub counts: CountArray,
    /// Metric units per raw index
    pub delta: f64,
    /// Metric value of raw index 0
    pub origin: f64,
}

/// Count arrays for one data set, ready for binning or zoning.
#[derive(Debug, Clone, Default)]
pub struct HistData {
    id: Uuid,
    source: SourceKind,
    /// Minutes represented by one count
    dt: f64,
    series: HashMap<SeriesKind, SeriesCounts>,
    zones: HashMap<ZoneKind, ZoneCounts>,
    present: HashSet<SeriesKind>,
    metric: Option<MetricAxis>,
}

impl HistData {
    /// One pass over a ride's samples.
    ///
    /// Every series is discretized at its own delta after unit conversion.
    /// Power and heart rate zone counts use the tables valid on the ride's
    /// start date, and are kept both with and without exact-zero samples so
    /// the zero policy can be chosen when distributing.
    pub fn from_ride(ride: &Ride, power_zones: &ZoneSchedule, hr_zones: &ZoneSchedule, units: Units) -> Self {
        let dt = ride.recording_interval_secs / 60.0;
        let ride_date = ride.start_time.date_naive();
        let power_table = power_zones.table_for(ride_date);
        let hr_table = hr_zones.table_for(ride_date);

        let mut series: HashMap<SeriesKind, SeriesCounts> = SeriesKind::ALL
            .iter()
            .map(|kind| (*kind, SeriesCounts::arena()))
            .collect();
        let mut zeros: HashMap<SeriesKind, SeriesCounts> = [SeriesKind::Power, SeriesKind::HeartRate]
            .into_iter()
            .map(|kind| (kind, SeriesCounts::zero_tally()))
            .collect();

        for sample in &ride.samples {
            let selected = is_selected(sample.secs, ride.recording_interval_secs, &ride.intervals);
            for kind in SeriesKind::ALL {
                let Some(raw) = stored_value(kind, sample, ride.weight_kg) else {
                    continue;
                };
                let value = units::scale(kind, raw, units);
                if value == 0.0 {
                    if let Some(tally) = zeros.get_mut(&kind) {
                        tally.record(0, selected);
                    }
                }
                if let (Some(index), Some(counts)) = (index_for(value, kind.delta()), series.get_mut(&kind)) {
                    counts.record(index, selected);
                }
            }
        }

        let mut zones = HashMap::new();
        for (zone_kind, table, base) in [
            (ZoneKind::Power, power_table, SeriesKind::Power),
            (ZoneKind::HeartRate, hr_table, SeriesKind::HeartRate),
        ] {
            if let (Some(table), Some(counts)) = (table, series.get(&base)) {
                zones.insert(zone_kind, zone_series(table, base, counts, zeros.get(&base)));
            }
        }

        let present = SeriesKind::ALL
            .iter()
            .copied()
            .filter(|kind| ride.is_data_present(*kind))
            .collect();

        tracing::debug!(
            ride = %ride.id,
            samples = ride.samples.len(),
            intervals = ride.intervals.len(),
            "Built ride histogram data"
        );

        Self {
            id: ride.id,
            source: SourceKind::Ride,
            dt,
            series,
            zones,
            present,
            metric: None,
        }
    }

    /// Counts from a pre-aggregated cache.
    ///
    /// The cache is normalized to one-second samples. Interval selection has
    /// no meaning for long-term data, so there are no selected arrays.
    pub fn from_cache(cache: &DistributionCache, units: Units) -> Self {
        let mut series = HashMap::new();
        let mut present = HashSet::new();

        for kind in SeriesKind::ALL {
            let counts = CountArray::from_distribution(cache.distribution(kind));
            let counts = counts.rescale_axis(units::factor(kind, units));
            if !counts.is_blank() {
                present.insert(kind);
            }
            series.insert(kind, SeriesCounts::without_selection(counts));
        }

        let mut zones = HashMap::new();
        for (kind, secs) in [
            (ZoneKind::Power, &cache.power_zone_secs),
            (ZoneKind::HeartRate, &cache.hr_zone_secs),
        ] {
            zones.insert(kind, ZoneCounts::fixed(SeriesCounts::without_selection(zone_slots(secs))));
        }

        tracing::debug!(name = %cache.name, series = present.len(), "Built cache histogram data");

        Self {
            id: Uuid::new_v4(),
            source: SourceKind::Cache,
            dt: 1.0 / 60.0,
            series,
            zones,
            present,
            metric: None,
        }
    }

    /// Distribution of a metric across rides, totalling another metric.
    ///
    /// Non-finite values count as zero and values equal to
    /// [`MetricSpec::skip_value`] are skipped. Values are scaled by
    /// `10^precision` and the axis is clamped to ±[`METRIC_CLAMP`]. The
    /// array is sized to the data, not to the build arena.
    pub fn from_metrics(records: &[MetricRecord], spec: &MetricSpec) -> Self {
        let multiplier = 10f64.powi(spec.precision as i32);

        let scaled = |record: &MetricRecord| -> Option<f64> {
            let mut v = record.value;
            if spec.skip_value.is_some_and(|skip| v == skip) {
                return None;
            }
            if !v.is_finite() {
                v = 0.0;
            }
            if spec.value_in_seconds {
                v /= 60.0;
            }
            Some(v * multiplier)
        };

        let (mut min, mut max) = (0.0f64, 0.0f64);
        for v in records.iter().filter_map(scaled) {
            max = max.max(v);
            min = min.min(v);
        }
        let max = max.min(METRIC_CLAMP).trunc();
        let min = min.max(-METRIC_CLAMP).trunc();

        let mut totals = vec![0.0; 1 + (max - min) as usize];

        for record in records {
            let Some(v) = scaled(record) else {
                continue;
            };
            let v = v.trunc();
            if v < min || v > max {
                continue;
            }
            let mut total = if record.total.is_finite() { record.total } else { 0.0 };
            if spec.total_in_seconds {
                total /= 60.0;
            }
            totals[(v - min) as usize] += total;
        }
        let counts = CountArray::from_counts(totals);

        let delta = 1.0 / multiplier;
        let present = if counts.is_blank() {
            HashSet::new()
        } else {
            SeriesKind::ALL.iter().copied().collect()
        };

        tracing::debug!(records = records.len(), min, max, "Built metric histogram data");

        Self {
            id: Uuid::new_v4(),
            source: SourceKind::Metric,
            dt: 1.0,
            series: HashMap::new(),
            zones: HashMap::new(),
            present,
            metric: Some(MetricAxis {
                counts,
                delta,
                origin: min * delta,
            }),
        }
    }

    /// Identity token of the underlying data.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn source(&self) -> SourceKind {
        self.source
    }

    /// Minutes represented by one count.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Counts for a series.
    pub fn series(&self, kind: SeriesKind) -> Option<&SeriesCounts> {
        self.series.get(&kind)
    }

    /// Zone counts. Exact-zero samples are only counted with `include_zeros`;
    /// cache zone times are pre-aggregated and ignore it.
    pub fn zones(&self, kind: ZoneKind, include_zeros: bool) -> Option<&SeriesCounts> {
        self.zones.get(&kind).map(|zones| zones.get(include_zeros))
    }

    /// Metric-mode axis, only for [`SourceKind::Metric`].
    pub fn metric(&self) -> Option<&MetricAxis> {
        self.metric.as_ref()
    }

    /// Does the data hold anything for `kind`?
    pub fn is_present(&self, kind: SeriesKind) -> bool {
        self.present.contains(&kind)
    }
}

// Absent channels count in the zero bucket, like a recorded zero.
fn stored_value(kind: SeriesKind, sample: &RideSample, weight_kg: f64) -> Option<f64> {
    match kind.sample_value(sample, weight_kg) {
        Some(v) => Some(v),
        None if kind == SeriesKind::PowerPerKg && weight_kg <= 0.0 => None,
        None => Some(0.0),
    }
}

// Index 0 holds values below one delta, so exact zeros are taken back out
// of the zone that index 0 falls in rather than dropping the whole bucket.
fn zone_series(table: &ZoneTable, base: SeriesKind, counts: &SeriesCounts, zeros: Option<&SeriesCounts>) -> ZoneCounts {
    let aggregator = ZoneAggregator::new(table, base.delta(), 1.0, true);
    let with_zeros = SeriesCounts {
        full: aggregator.zone_counts(&counts.full),
        selected: counts.selected.as_ref().map(|sel| aggregator.zone_counts(sel)),
    };

    let zero_zone = table.which_zone(0.0);
    let remove_zeros = |zoned: &CountArray, tally: Option<&CountArray>| {
        let mut out = zoned.as_slice().to_vec();
        if let (Some(zone), Some(tally)) = (zero_zone, tally) {
            if let Some(slot) = out.get_mut(zone) {
                *slot -= tally.get(0);
            }
        }
        CountArray::from_counts(out)
    };
    let without_zeros = SeriesCounts {
        full: remove_zeros(&with_zeros.full, zeros.map(|z| &z.full)),
        selected: with_zeros
            .selected
            .as_ref()
            .map(|sel| remove_zeros(sel, zeros.and_then(|z| z.selected.as_ref()))),
    };

    ZoneCounts {
        with_zeros,
        without_zeros,
    }
}

fn zone_slots(secs: &[f64]) -> CountArray {
    let mut slots: Vec<f64> = secs.iter().take(CACHE_ZONE_SLOTS).copied().collect();
    slots.resize(CACHE_ZONE_SLOTS, 0.0);
    CountArray::from_counts(slots)
}
