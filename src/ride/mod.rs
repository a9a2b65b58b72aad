//! Ride data consumed by the histogram engine.

pub mod types;

pub use types::{DistributionCache, MetricDocument, MetricRecord, MetricSpec, Ride, RideSample};
