//! Linear binning of count arrays.
//!
//! A [`Binner`] folds adjacent raw indices into bins of a configurable
//! physical width and returns stepped-curve coordinates: a leading anchor at
//! the origin, one point per bin placed at the bin's upper bound, and a
//! trailing anchor so the line returns to the baseline.

use crate::histogram::counts::CountArray;
use serde::{Deserialize, Serialize};

/// Minimum y of every bin, so a log-scale axis never receives zero.
pub const LOG_FLOOR: f64 = 1e-9;

/// Upper limit on raw indices per bin. Keeps bin bounds and the trailing
/// anchor within `usize` for absurdly wide bins.
pub const MAX_STEP: usize = usize::MAX / 4;

/// Binning configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinConfig {
    /// Bin width in series units (watts, bpm, ...)
    pub bin_width: f64,
    /// Count samples whose value is zero
    pub include_zeros: bool,
    /// Report percent of total time instead of minutes
    pub percent: bool,
    /// Aggregate into training zones where the series supports it
    pub zoned: bool,
}

impl Default for BinConfig {
    fn default() -> Self {
        Self {
            bin_width: 1.0,
            include_zeros: false,
            percent: false,
            zoned: false,
        }
    }
}

impl BinConfig {
    /// Copy of this config with an invalid bin width replaced by 1.
    pub fn sanitized(mut self) -> Self {
        self.bin_width = sanitize_width(self.bin_width);
        self
    }
}

/// Bin width must be positive; anything else becomes 1.
pub fn sanitize_width(width: f64) -> f64 {
    if width.is_finite() && width > 0.0 {
        width
    } else {
        1.0
    }
}

/// Binned coordinates before pairing into points.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Bins {
    /// X of each point, anchors included
    pub x: Vec<f64>,
    /// Time per point for the full data
    pub full: Vec<f64>,
    /// Time per point for the selected subset
    pub selected: Option<Vec<f64>>,
}

impl Bins {
    /// Number of real bins (anchors excluded).
    pub fn bin_count(&self) -> usize {
        self.x.len().saturating_sub(2)
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// X of the highest bin whose full time reaches `threshold`, scanning
    /// down from the last real bin. Falls back to the leading anchor.
    pub fn truncated_max_x(&self, threshold: f64) -> f64 {
        let mut index = self.bin_count();
        while index > 0 && self.full[index] < threshold {
            index -= 1;
        }
        self.x.get(index).copied().unwrap_or(0.0)
    }
}

/// Folds raw indices into fixed-width bins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Binner {
    /// Bin width in series units
    width: f64,
    /// Series units per raw index
    delta: f64,
    /// Minutes represented by one count
    dt: f64,
    /// Keep index 0 in the first bin
    include_zeros: bool,
    /// Value of raw index 0
    origin: f64,
}

impl Binner {
    /// Create a binner; a non-positive width is coerced to 1.
    pub fn new(width: f64, delta: f64, dt: f64, include_zeros: bool) -> Self {
        Self {
            width: sanitize_width(width),
            delta,
            dt,
            include_zeros,
            origin: 0.0,
        }
    }

    /// Shift the value axis so raw index 0 sits at `origin`.
    pub fn with_origin(mut self, origin: f64) -> Self {
        self.origin = origin;
        self
    }

    /// Raw indices per bin, at least one and at most [`MAX_STEP`].
    pub fn step(&self) -> usize {
        let step = (self.width / self.delta).round();
        if step.is_finite() && step >= 1.0 {
            (step as usize).min(MAX_STEP)
        } else {
            1
        }
    }

    /// Number of bins for an array of `len` indices, counted in raw-index
    /// steps, plus one so a partial final bin is never dropped.
    pub fn bin_count(&self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        (len - 1).div_ceil(self.step()) + 1
    }

    /// Bin `full`, and `selected` through the same bounds.
    ///
    /// Returns empty bins when `full` has nothing to show.
    pub fn bin(&self, full: &CountArray, selected: Option<&CountArray>) -> Bins {
        if full.is_blank() {
            return Bins::default();
        }

        let len = full.len();
        let step = self.step();
        let count = self.bin_count(len);

        let mut x = vec![0.0; count + 2];
        let mut total = vec![0.0; count + 2];
        let mut total_selected = selected.map(|_| vec![0.0; count + 2]);

        for i in 1..=count {
            let high = i * step;
            let mut low = high - step;
            if low == 0 && !self.include_zeros {
                low = 1;
            }

            x[i] = self.origin + high as f64 * self.delta;
            total[i] = LOG_FLOOR;
            if let Some(ts) = total_selected.as_mut() {
                ts[i] = LOG_FLOOR;
            }

            for index in low..high.min(len) {
                total[i] += self.dt * full.get(index);
                if let (Some(ts), Some(sel)) = (total_selected.as_mut(), selected) {
                    ts[i] += self.dt * sel.get(index);
                }
            }
        }

        let last = count + 1;
        x[0] = self.origin;
        x[last] = self.origin + (last * step) as f64 * self.delta;
        total[0] = LOG_FLOOR;
        total[last] = LOG_FLOOR;
        if let Some(ts) = total_selected.as_mut() {
            ts[0] = LOG_FLOOR;
            ts[last] = LOG_FLOOR;
        }

        Bins {
            x,
            full: total,
            selected: total_selected,
        }
    }
}
