//! RideHist - ride data distributions
//!
//! Bins cycling ride data (power, heart rate, cadence, speed, torque) into
//! time-at-value histograms, aggregates time in training zones, and compares
//! distributions across rides or date ranges.

pub mod histogram;
pub mod metrics;
pub mod ride;
pub mod storage;

// Re-export commonly used types
pub use histogram::{BinConfig, DistributionResult, HistData, HistogramEngine, SeriesKind, Units};
pub use metrics::zones::{ZoneSchedule, ZoneTable};
pub use ride::types::Ride;
pub use storage::config::AppConfig;
