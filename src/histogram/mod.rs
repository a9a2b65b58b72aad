//! Histogram binning and zone aggregation.
//!
//! Data flows one way: a source builder fills [`HistData`] count arrays, the
//! [`HistogramEngine`] bins or zones them for one series, and the result is a
//! set of plot points plus [`PlotBounds`].

pub mod aggregator;
pub mod binner;
pub mod counts;
pub mod engine;
pub mod normalize;
pub mod recompute;
pub mod result;
pub mod selection;
pub mod series;
pub mod source;
pub mod units;

pub use aggregator::{ColumnLayout, ZoneAggregator};
pub use binner::{BinConfig, Binner, Bins};
pub use counts::{CountArray, MAX_INDEX};
pub use engine::{CompareCurve, CompareResult, CompareSet, HistogramEngine};
pub use normalize::{percentify, Shape};
pub use recompute::{should_recompute, DisplayFlags, RecomputeGate, RecomputeKey};
pub use result::{CurveStyle, DistributionResult, PlotBounds, PlotPoint};
pub use selection::{is_selected, Interval};
pub use series::{SeriesKind, ZoneKind};
pub use source::{HistData, SeriesCounts, SourceKind, ZoneCounts};
pub use units::Units;
