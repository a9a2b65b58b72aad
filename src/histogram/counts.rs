//! Per-index count arrays.
//!
//! A [`CountArray`] holds the amount observed at each discretized value:
//! index 5 of a power array is "time spent at 5 watts". Arrays reserve a
//! fixed arena up front and grow inside it as higher indices appear.

use serde::{Deserialize, Serialize};

/// Maximum number of discrete indices an array may hold.
pub const MAX_INDEX: usize = 4096;

/// Counts indexed by discretized value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountArray {
    counts: Vec<f64>,
}

impl CountArray {
    /// Create an empty array without reserving the arena.
    pub fn new() -> Self {
        Self { counts: Vec::new() }
    }

    /// Create an empty array with the full arena reserved, for build passes.
    pub fn with_arena() -> Self {
        Self {
            counts: Vec::with_capacity(MAX_INDEX),
        }
    }

    /// Wrap existing counts. Negative and non-finite entries become zero.
    pub fn from_counts(counts: Vec<f64>) -> Self {
        let counts = counts
            .into_iter()
            .map(|c| if c.is_finite() && c > 0.0 { c } else { 0.0 })
            .collect();
        Self { counts }
    }

    /// Convert a pre-aggregated distribution into whole counts.
    ///
    /// Fractions are truncated and the array ends at the highest non-zero
    /// entry, so an all-zero distribution becomes an empty array.
    pub fn from_distribution(distribution: &[f64]) -> Self {
        let mut counts: Vec<f64> = distribution
            .iter()
            .map(|v| if v.is_finite() && *v > 0.0 { v.trunc() } else { 0.0 })
            .collect();
        let len = counts.iter().rposition(|c| *c != 0.0).map_or(0, |i| i + 1);
        counts.truncate(len);
        Self { counts }
    }

    /// Add one observation at `index`. Returns false if it is outside the arena.
    pub fn increment(&mut self, index: usize) -> bool {
        self.add(index, 1.0)
    }

    /// Add `amount` at `index`, extending the array within the arena.
    pub fn add(&mut self, index: usize, amount: f64) -> bool {
        if index >= MAX_INDEX {
            return false;
        }
        if index >= self.counts.len() {
            self.counts.resize(index + 1, 0.0);
        }
        self.counts[index] += amount;
        true
    }

    /// Amount at `index`, zero beyond the end.
    pub fn get(&self, index: usize) -> f64 {
        self.counts.get(index).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.counts
    }

    /// Sum of all amounts.
    pub fn total(&self) -> f64 {
        self.counts.iter().sum()
    }

    /// True if there is nothing to show.
    pub fn is_blank(&self) -> bool {
        self.counts.iter().all(|c| *c == 0.0)
    }

    /// First index at or after `from` whose amount exceeds `threshold`.
    pub fn first_above(&self, from: usize, threshold: f64) -> Option<usize> {
        self.counts
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, c)| **c > threshold)
            .map(|(i, _)| i)
    }

    /// Rescale the value axis by `factor`, moving each amount to
    /// `floor(index * factor)`. Used when a cached metric distribution must
    /// be shown in imperial units.
    pub fn rescale_axis(&self, factor: f64) -> Self {
        if factor == 1.0 {
            return self.clone();
        }
        let mut out = CountArray::with_arena();
        for (i, amount) in self.counts.iter().enumerate() {
            if *amount == 0.0 {
                continue;
            }
            if let Some(index) = index_for(i as f64 * factor, 1.0) {
                out.add(index, *amount);
            }
        }
        out
    }
}

/// Discretize a physical value into a raw index, or None when it falls
/// outside `[0, MAX_INDEX)`.
pub fn index_for(value: f64, delta: f64) -> Option<usize> {
    if !value.is_finite() || delta <= 0.0 {
        return None;
    }
    // absorb representation error, e.g. 0.3 / 0.1 == 2.9999999999999996
    let index = (value / delta + 1e-9).floor();
    if index >= 0.0 && index < MAX_INDEX as f64 {
        Some(index as usize)
    } else {
        None
    }
}
