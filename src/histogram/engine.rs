//! Turns [`HistData`] into plot-ready distributions.

use crate::histogram::aggregator::{columns, ColumnLayout};
use crate::histogram::binner::{BinConfig, Binner, Bins};
use crate::histogram::counts::CountArray;
use crate::histogram::normalize::{percentify, Shape};
use crate::histogram::result::{max_y, zip_points, CurveStyle, DistributionResult, PlotBounds, PlotPoint, ZONE_AXIS_MIN};
use crate::histogram::series::SeriesKind;
use crate::histogram::source::{HistData, SeriesCounts, SourceKind};
use serde::{Deserialize, Serialize};

/// Bins below this many minutes (or percent) do not extend the X axis.
pub const TRUNCATE_THRESHOLD: f64 = 0.1;

/// Heart rate counts at or below this do not move the left edge of the plot.
pub const HR_CROP_THRESHOLD: f64 = 0.1;

/// One data set in compare mode.
#[derive(Debug, Clone)]
pub struct CompareSet {
    pub name: String,
    /// Unchecked sets are computed but take no column slot and do not
    /// contribute to the Y range.
    pub checked: bool,
    pub data: HistData,
}

impl CompareSet {
    pub fn new(name: impl Into<String>, data: HistData) -> Self {
        Self {
            name: name.into(),
            checked: true,
            data,
        }
    }
}

/// One curve of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareCurve {
    pub name: String,
    pub checked: bool,
    pub style: CurveStyle,
    pub points: Vec<PlotPoint>,
}

/// Several data sets' distributions over a shared axis.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompareResult {
    pub curves: Vec<CompareCurve>,
    pub bounds: PlotBounds,
}

/// Computes distributions of one series under one configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramEngine {
    series: SeriesKind,
    config: BinConfig,
}

impl HistogramEngine {
    pub fn new(series: SeriesKind, config: BinConfig) -> Self {
        Self {
            series,
            config: config.sanitized(),
        }
    }

    pub fn series(&self) -> SeriesKind {
        self.series
    }

    pub fn config(&self) -> BinConfig {
        self.config
    }

    /// Configuration actually applied to `data`. Metric distributions are
    /// never zoned, never include zeros and are always absolute.
    pub fn effective_config(&self, data: &HistData) -> BinConfig {
        let mut config = self.config;
        if data.source() == SourceKind::Metric {
            config.zoned = false;
            config.include_zeros = false;
            config.percent = false;
        }
        config
    }

    fn is_zoned(&self, config: &BinConfig) -> bool {
        config.zoned && self.series.is_zonable()
    }

    /// Distribution of a single data set, with its selected-interval subset
    /// when the data has one.
    pub fn distribution(&self, data: &HistData) -> DistributionResult {
        let config = self.effective_config(data);

        if self.is_zoned(&config) {
            let Some(counts) = self.zone_counts(data, &config) else {
                return DistributionResult::empty();
            };
            return self.zoned_distribution(data, counts, ColumnLayout::single(), &config);
        }

        let Some(bins) = self.bins(data, &config) else {
            return DistributionResult::empty();
        };

        let bins = Bins {
            full: normalize(&bins.full, Shape::Stepped, &config),
            selected: bins
                .selected
                .as_deref()
                .map(|sel| normalize(sel, Shape::Stepped, &config)),
            x: bins.x,
        };
        let truncated_max_x = bins.truncated_max_x(TRUNCATE_THRESHOLD);
        let full = zip_points(&bins.x, &bins.full);
        let selected = bins.selected.as_ref().map(|sel| zip_points(&bins.x, sel));

        let mut top = max_y(&full);
        if let Some(sel) = selected.as_ref() {
            top = top.max(max_y(sel));
        }

        DistributionResult {
            style: CurveStyle::Steps,
            bounds: PlotBounds {
                min_x: self.min_x(data, &config),
                max_x: bins.x.last().copied().unwrap_or(0.0),
                truncated_max_x,
                max_y: top,
            },
            full,
            selected,
        }
    }

    /// Distributions of several data sets side by side.
    ///
    /// Stepped curves share the X axis up to the widest significant bin;
    /// zoned columns of checked sets are laid out next to each other in
    /// each zone slot.
    pub fn compare(&self, sets: &[CompareSet]) -> CompareResult {
        let active = sets.iter().filter(|set| set.checked).count();
        let mut position = 0;
        let mut curves = Vec::with_capacity(sets.len());
        let mut bounds: Option<PlotBounds> = None;

        for set in sets {
            let config = self.effective_config(&set.data);
            let result = if self.is_zoned(&config) {
                let layout = ColumnLayout::compare(position, active);
                self.zone_counts(&set.data, &config)
                    .map(|counts| self.zoned_distribution(&set.data, counts, layout, &config))
                    .unwrap_or_default()
            } else {
                self.distribution(&set.data)
            };

            if set.checked {
                position += 1;
            }

            if !result.is_empty() {
                let b = result.bounds;
                let merged = bounds.get_or_insert(PlotBounds {
                    min_x: b.min_x,
                    max_x: 0.0,
                    truncated_max_x: 0.0,
                    max_y: 0.0,
                });
                merged.min_x = merged.min_x.min(b.min_x);
                merged.truncated_max_x = merged.truncated_max_x.max(b.truncated_max_x);
                merged.max_x = merged.truncated_max_x;
                if set.checked {
                    merged.max_y = merged.max_y.max(b.max_y);
                }
            }

            curves.push(CompareCurve {
                name: set.name.clone(),
                checked: set.checked,
                style: result.style,
                points: result.full,
            });
        }

        tracing::debug!(series = %self.series, sets = sets.len(), active, "Compared distributions");

        CompareResult {
            curves,
            bounds: bounds.unwrap_or_default(),
        }
    }

    /// Value-indexed counts for the engine's series, None when there is
    /// nothing to show.
    fn value_counts<'a>(&self, data: &'a HistData) -> Option<&'a SeriesCounts> {
        if !data.is_present(self.series) {
            return None;
        }
        data.series(self.series).filter(|counts| !counts.full.is_empty())
    }

    fn zone_counts<'a>(&self, data: &'a HistData, config: &BinConfig) -> Option<&'a SeriesCounts> {
        if !data.is_present(self.series) {
            return None;
        }
        let kind = self.series.zone_kind()?;
        data.zones(kind, config.include_zeros)
            .filter(|counts| !counts.full.is_empty())
    }

    fn bins(&self, data: &HistData, config: &BinConfig) -> Option<Bins> {
        let bins = if let Some(metric) = data.metric() {
            Binner::new(config.bin_width, metric.delta, data.dt(), config.include_zeros)
                .with_origin(metric.origin)
                .bin(&metric.counts, None)
        } else {
            let counts = self.value_counts(data)?;
            let selected = counts.selected.as_ref().filter(|sel| !sel.is_blank());
            Binner::new(config.bin_width, self.series.delta(), data.dt(), config.include_zeros)
                .bin(&counts.full, selected)
        };
        (!bins.is_empty()).then_some(bins)
    }

    fn zoned_distribution(
        &self,
        data: &HistData,
        counts: &SeriesCounts,
        layout: ColumnLayout,
        config: &BinConfig,
    ) -> DistributionResult {
        let dt = data.dt();
        let full = zone_columns(&counts.full, dt, layout, config);
        let selected = counts
            .selected
            .as_ref()
            .filter(|sel| !sel.is_blank())
            .map(|sel| zone_columns(sel, dt, layout, config));

        let mut top = max_y(&full);
        if let Some(sel) = selected.as_ref() {
            top = top.max(max_y(sel));
        }
        let slots = counts.full.len() as f64;

        DistributionResult {
            style: CurveStyle::Columns,
            full,
            selected,
            bounds: PlotBounds {
                min_x: ZONE_AXIS_MIN,
                max_x: slots,
                truncated_max_x: slots,
                max_y: top,
            },
        }
    }

    // Heart rate rarely starts near zero, so crop the axis to the first
    // significant reading unless zeros were asked for.
    fn min_x(&self, data: &HistData, config: &BinConfig) -> f64 {
        if self.series != SeriesKind::HeartRate || config.include_zeros {
            return 0.0;
        }
        data.series(SeriesKind::HeartRate)
            .and_then(|hr| hr.full.first_above(1, HR_CROP_THRESHOLD))
            .map_or(0.0, |index| index as f64 * SeriesKind::HeartRate.delta())
    }
}

fn normalize(values: &[f64], shape: Shape, config: &BinConfig) -> Vec<f64> {
    if config.percent {
        percentify(values, shape.factor())
    } else {
        values.to_vec()
    }
}

fn zone_columns(counts: &CountArray, dt: f64, layout: ColumnLayout, config: &BinConfig) -> Vec<PlotPoint> {
    let heights: Vec<f64> = counts.as_slice().iter().map(|c| c * dt).collect();
    let points = columns(&heights, layout);
    if !config.percent {
        return points;
    }
    let y: Vec<f64> = points.iter().map(|p| p.y).collect();
    let y = percentify(&y, Shape::Columns.factor());
    points
        .iter()
        .zip(y)
        .map(|(p, y)| PlotPoint::new(p.x, y))
        .collect()
}
