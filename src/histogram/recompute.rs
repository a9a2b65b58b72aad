//! Deciding when a distribution must be rebuilt.
//!
//! Rebuilding count arrays is a full pass over the data, so callers keep the
//! [`RecomputeKey`] of the last build and only rebuild when it changes.

use crate::histogram::binner::BinConfig;
use crate::histogram::series::SeriesKind;
use crate::histogram::source::{HistData, SourceKind};
use crate::histogram::units::Units;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Everything a computed distribution depends on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecomputeKey {
    pub source: SourceKind,
    /// Identity of the underlying data (ride, cache or metric set)
    pub data_id: Uuid,
    pub series: SeriesKind,
    pub zoned: bool,
    pub bin_width: f64,
    pub include_zeros: bool,
    pub percent: bool,
    pub units: Units,
    /// Minutes per sample
    pub dt: f64,
    pub log_y: bool,
    pub shade_zones: bool,
}

/// Display-only settings that still invalidate a rendered plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DisplayFlags {
    pub log_y: bool,
    pub shade_zones: bool,
}

impl RecomputeKey {
    /// Key for computing `series` of `data` under `config`.
    pub fn new(data: &HistData, series: SeriesKind, config: &BinConfig, units: Units, display: DisplayFlags) -> Self {
        Self {
            source: data.source(),
            data_id: data.id(),
            series,
            zoned: config.zoned,
            bin_width: config.bin_width,
            include_zeros: config.include_zeros,
            percent: config.percent,
            units,
            dt: data.dt(),
            log_y: display.log_y,
            shade_zones: display.shade_zones,
        }
    }
}

/// True unless `previous` exists and every tracked field equals `next`.
pub fn should_recompute(previous: Option<&RecomputeKey>, next: &RecomputeKey) -> bool {
    previous != Some(next)
}

/// Remembers the key of the last build.
#[derive(Debug, Clone, Default)]
pub struct RecomputeGate {
    last: Option<RecomputeKey>,
}

impl RecomputeGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if a rebuild is due for `key`, and records it as built.
    /// `force` always rebuilds.
    pub fn check(&mut self, key: RecomputeKey, force: bool) -> bool {
        let due = force || should_recompute(self.last.as_ref(), &key);
        if due {
            tracing::debug!(series = %key.series, source = ?key.source, force, "Recomputing distribution");
            self.last = Some(key);
        }
        due
    }

    /// Forget the last key so the next check rebuilds.
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    pub fn last(&self) -> Option<&RecomputeKey> {
        self.last.as_ref()
    }
}
