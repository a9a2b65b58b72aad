//! Power and heart rate zone tables.
//!
//! A [`ZoneTable`] is an ordered list of contiguous `[low, high)` ranges,
//! optionally valid only for a date range. A [`ZoneSchedule`] holds the
//! tables an athlete has used over time and picks the one valid on a ride's
//! date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when building zone tables.
#[derive(Debug, Error, PartialEq)]
pub enum ZoneError {
    /// A table needs at least one zone.
    #[error("Zone table is empty")]
    Empty,

    /// Boundaries must be finite and strictly ascending.
    #[error("Invalid zone boundary at zone {zone}: {reason}")]
    InvalidBoundary { zone: usize, reason: String },

    /// The date range ends before it starts.
    #[error("Zone range ends ({to}) before it starts ({from})")]
    InvalidDateRange { from: NaiveDate, to: NaiveDate },
}

/// Result type for zone construction.
pub type ZoneResult<T> = Result<T, ZoneError>;

/// Answers "which zone does this value fall in".
pub trait ZoneLookup {
    /// Zone index (0-based) for `value`, None if it is below every zone.
    fn which_zone(&self, value: f64) -> Option<usize>;

    /// Number of zones.
    fn num_zones(&self) -> usize;
}

/// One zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    /// Zone name
    pub name: String,
    /// Inclusive lower bound
    pub low: f64,
    /// Exclusive upper bound (None = no upper limit)
    pub high: Option<f64>,
}

impl Zone {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && self.high.map_or(true, |high| value < high)
    }
}

/// Ordered zones, optionally bound to a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ZoneTableDef")]
pub struct ZoneTable {
    /// First day the table applies (None = since forever)
    #[serde(default)]
    pub from: Option<NaiveDate>,
    /// Last day the table applies (None = still current)
    #[serde(default)]
    pub to: Option<NaiveDate>,
    zones: Vec<Zone>,
}

/// Unvalidated form of [`ZoneTable`] as it appears in documents.
#[derive(Deserialize)]
struct ZoneTableDef {
    #[serde(default)]
    from: Option<NaiveDate>,
    #[serde(default)]
    to: Option<NaiveDate>,
    zones: Vec<Zone>,
}

impl TryFrom<ZoneTableDef> for ZoneTable {
    type Error = ZoneError;

    fn try_from(def: ZoneTableDef) -> ZoneResult<Self> {
        ZoneTable::new(def.zones)?.with_dates(def.from, def.to)
    }
}

impl ZoneTable {
    /// Build from explicit zones, validating boundaries.
    pub fn new(zones: Vec<Zone>) -> ZoneResult<Self> {
        if zones.is_empty() {
            return Err(ZoneError::Empty);
        }
        for (i, zone) in zones.iter().enumerate() {
            if !zone.low.is_finite() {
                return Err(ZoneError::InvalidBoundary {
                    zone: i,
                    reason: "lower bound is not finite".to_string(),
                });
            }
            if let Some(high) = zone.high {
                if !(high > zone.low) {
                    return Err(ZoneError::InvalidBoundary {
                        zone: i,
                        reason: format!("upper bound {} not above lower bound {}", high, zone.low),
                    });
                }
            }
            if let Some(next) = zones.get(i + 1) {
                if next.low <= zone.low {
                    return Err(ZoneError::InvalidBoundary {
                        zone: i + 1,
                        reason: format!("lower bound {} not above previous {}", next.low, zone.low),
                    });
                }
                if zone.high.map_or(true, |high| high > next.low) {
                    return Err(ZoneError::InvalidBoundary {
                        zone: i,
                        reason: "overlaps the next zone".to_string(),
                    });
                }
            }
        }
        Ok(Self {
            from: None,
            to: None,
            zones,
        })
    }

    /// Build contiguous zones from their lower bounds; the last zone is open.
    pub fn from_lower_bounds(lows: &[f64]) -> ZoneResult<Self> {
        let zones = lows
            .iter()
            .enumerate()
            .map(|(i, low)| Zone {
                name: format!("Z{}", i + 1),
                low: *low,
                high: lows.get(i + 1).copied(),
            })
            .collect();
        Self::new(zones)
    }

    /// Restrict the table to a date range.
    pub fn with_dates(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> ZoneResult<Self> {
        if let (Some(from), Some(to)) = (from, to) {
            if to < from {
                return Err(ZoneError::InvalidDateRange { from, to });
            }
        }
        self.from = from;
        self.to = to;
        Ok(self)
    }

    /// Does this table apply on `date`?
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }

    /// All zones in order.
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Zone by index.
    pub fn zone(&self, index: usize) -> Option<&Zone> {
        self.zones.get(index)
    }

    /// Coggan 7-zone power table from FTP.
    pub fn coggan_power(ftp: u16) -> Self {
        let ftp = ftp as f64;
        let bounds: [(&str, f64); 7] = [
            ("Active Recovery", 0.0),
            ("Endurance", 0.55),
            ("Tempo", 0.75),
            ("Threshold", 0.90),
            ("VO2max", 1.05),
            ("Anaerobic", 1.20),
            ("Neuromuscular", 1.50),
        ];
        named_table(&bounds, |pct| (ftp * pct).round())
    }

    /// Karvonen 5-zone heart rate table.
    ///
    /// Target HR = ((max_hr - resting_hr) × %intensity) + resting_hr. Heart
    /// rates below 50% of the reserve fall outside every zone.
    pub fn karvonen_hr(max_hr: u8, resting_hr: u8) -> Self {
        let hrr = max_hr.saturating_sub(resting_hr) as f64;
        let bounds: [(&str, f64); 5] = [
            ("Recovery", 0.50),
            ("Aerobic", 0.60),
            ("Tempo", 0.70),
            ("Threshold", 0.80),
            ("Maximum", 0.90),
        ];
        named_table(&bounds, |pct| (hrr * pct + resting_hr as f64).round())
    }
}

// Contiguous table from (name, fraction) pairs. Bounds that collapse onto
// each other (tiny FTP or HR reserve) are nudged up so the table stays valid.
fn named_table(bounds: &[(&str, f64)], value: impl Fn(f64) -> f64) -> ZoneTable {
    let mut lows: Vec<f64> = Vec::with_capacity(bounds.len());
    for (_, pct) in bounds {
        let mut low = value(*pct);
        if let Some(prev) = lows.last() {
            if low <= *prev {
                low = prev + 1.0;
            }
        }
        lows.push(low);
    }
    let zones = bounds
        .iter()
        .enumerate()
        .map(|(i, (name, _))| Zone {
            name: name.to_string(),
            low: lows[i],
            high: lows.get(i + 1).copied(),
        })
        .collect();
    ZoneTable {
        from: None,
        to: None,
        zones,
    }
}

impl ZoneLookup for ZoneTable {
    fn which_zone(&self, value: f64) -> Option<usize> {
        if !value.is_finite() {
            return None;
        }
        self.zones.iter().position(|zone| zone.contains(value))
    }

    fn num_zones(&self) -> usize {
        self.zones.len()
    }
}

/// Zone tables over time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<ZoneTable>", into = "Vec<ZoneTable>")]
pub struct ZoneSchedule {
    tables: Vec<ZoneTable>,
}

impl From<Vec<ZoneTable>> for ZoneSchedule {
    fn from(tables: Vec<ZoneTable>) -> Self {
        Self::new(tables)
    }
}

impl From<ZoneSchedule> for Vec<ZoneTable> {
    fn from(schedule: ZoneSchedule) -> Self {
        schedule.tables
    }
}

impl ZoneSchedule {
    pub fn new(mut tables: Vec<ZoneTable>) -> Self {
        tables.sort_by_key(|t| t.from);
        Self { tables }
    }

    /// A schedule with one table valid on every date.
    pub fn single(table: ZoneTable) -> Self {
        Self {
            tables: vec![table],
        }
    }

    /// Index of the table valid on `date`. Later tables win on overlap.
    pub fn which_range(&self, date: NaiveDate) -> Option<usize> {
        self.tables.iter().rposition(|t| t.covers(date))
    }

    /// Table valid on `date`.
    pub fn table_for(&self, date: NaiveDate) -> Option<&ZoneTable> {
        self.which_range(date).map(|i| &self.tables[i])
    }

    /// Table by index.
    pub fn table(&self, index: usize) -> Option<&ZoneTable> {
        self.tables.get(index)
    }

    /// Number of zones in the table at `index`, zero if there is none.
    pub fn num_zones(&self, index: usize) -> usize {
        self.table(index).map_or(0, |t| t.num_zones())
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }
}
