//! Unit tests for the histogram engine.

use chrono::{TimeZone, Utc};
use ridehist::histogram::binner::BinConfig;
use ridehist::histogram::engine::{CompareSet, HistogramEngine};
use ridehist::histogram::result::{CurveStyle, LOG_Y_MIN, ZONE_AXIS_MIN};
use ridehist::histogram::series::SeriesKind;
use ridehist::histogram::source::HistData;
use ridehist::histogram::units::Units;
use ridehist::metrics::zones::{ZoneSchedule, ZoneTable};
use ridehist::ride::types::{DistributionCache, MetricRecord, MetricSpec, Ride, RideSample};

fn cache(name: &str, power: Vec<f64>, zones: Vec<f64>) -> DistributionCache {
    let mut cache = DistributionCache {
        name: name.to_string(),
        power_zone_secs: zones,
        ..Default::default()
    };
    cache.distributions.insert(SeriesKind::Power, power);
    cache
}

fn zoned() -> BinConfig {
    BinConfig {
        zoned: true,
        ..Default::default()
    }
}

#[test]
fn test_compare_column_layout() {
    let sets: Vec<CompareSet> = ["a", "b", "c"]
        .iter()
        .map(|name| {
            let c = cache(name, vec![0.0, 60.0], vec![60.0, 60.0, 60.0]);
            CompareSet::new(*name, HistData::from_cache(&c, Units::Metric))
        })
        .collect();
    let result = HistogramEngine::new(SeriesKind::Power, zoned()).compare(&sets);

    let share = 0.9 / 3.0;
    let width = share * 0.9;
    for (position, curve) in result.curves.iter().enumerate() {
        assert_eq!(curve.style, CurveStyle::Columns);
        // the third zone slot starts at 1.5
        let left = curve.points[8].x;
        let right = curve.points[10].x;
        assert!((left - (1.5 + position as f64 * share)).abs() < 1e-9);
        assert!((right - left - width).abs() < 1e-9);
    }
    assert_eq!(result.bounds.min_x, ZONE_AXIS_MIN);
}

#[test]
fn test_unchecked_sets_take_no_slot_or_height() {
    let tall = cache("tall", vec![0.0, 60.0], vec![6000.0]);
    let short = cache("short", vec![0.0, 60.0], vec![60.0]);
    let mut sets = vec![
        CompareSet::new("tall", HistData::from_cache(&tall, Units::Metric)),
        CompareSet::new("short", HistData::from_cache(&short, Units::Metric)),
    ];
    sets[0].checked = false;

    let result = HistogramEngine::new(SeriesKind::Power, zoned()).compare(&sets);
    assert_eq!(result.curves.len(), 2);
    assert!(!result.curves[0].checked);
    // the only checked set sits in the first position with the full width
    let left = result.curves[1].points[0].x;
    assert!((left - -0.5).abs() < 1e-9);
    assert!((result.curves[1].points[2].x - left - 0.81).abs() < 1e-9);
    assert!((result.bounds.max_y - 1.0).abs() < 1e-9);
}

#[test]
fn test_compare_stepped_uses_widest_significant_bin() {
    let mut low = vec![0.0; 101];
    low[100] = 600.0;
    let mut high = vec![0.0; 301];
    high[300] = 600.0;
    high[200] = 600.0;
    let sets = vec![
        CompareSet::new("low", HistData::from_cache(&cache("low", low, vec![]), Units::Metric)),
        CompareSet::new("high", HistData::from_cache(&cache("high", high, vec![]), Units::Metric)),
    ];
    let config = BinConfig {
        bin_width: 10.0,
        ..Default::default()
    };
    let result = HistogramEngine::new(SeriesKind::Power, config).compare(&sets);

    assert!(result.curves.iter().all(|c| c.style == CurveStyle::Steps));
    // index 300 lands in the bin ending at 310
    assert_eq!(result.bounds.max_x, 310.0);
    assert!((result.bounds.max_y - 10.0).abs() < 1e-6);
}

#[test]
fn test_y_range_headroom() {
    let data = HistData::from_cache(&cache("one", vec![0.0, 600.0], vec![]), Units::Metric);
    let result = HistogramEngine::new(SeriesKind::Power, BinConfig::default()).distribution(&data);

    let (lo, hi) = result.bounds.y_range(false);
    assert_eq!(lo, 0.0);
    assert!((hi - result.bounds.max_y * 1.1).abs() < 1e-12);
    assert_eq!(result.bounds.y_range(true).0, LOG_Y_MIN);
}

#[test]
fn test_empty_inputs_give_empty_results() {
    let empty = HistData::from_cache(&DistributionCache::default(), Units::Metric);
    for config in [BinConfig::default(), zoned()] {
        let result = HistogramEngine::new(SeriesKind::Power, config).distribution(&empty);
        assert!(result.is_empty());
        assert!(result.selected.is_none());
    }

    let ride = Ride::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(), 70.0);
    let data = HistData::from_ride(&ride, &ZoneSchedule::default(), &ZoneSchedule::default(), Units::Metric);
    assert!(HistogramEngine::new(SeriesKind::HeartRate, BinConfig::default()).distribution(&data).is_empty());
}

#[test]
fn test_invalid_bin_width_behaves_as_one() {
    let data = HistData::from_cache(&cache("one", vec![0.0, 60.0, 60.0], vec![]), Units::Metric);
    let unit = HistogramEngine::new(SeriesKind::Power, BinConfig::default()).distribution(&data);
    for width in [0.0, -5.0, f64::NAN] {
        let config = BinConfig {
            bin_width: width,
            ..Default::default()
        };
        assert_eq!(HistogramEngine::new(SeriesKind::Power, config).distribution(&data), unit);
    }
}

#[test]
fn test_power_per_kg_zones_use_power_table() {
    let mut ride = Ride::new(Utc.with_ymd_and_hms(2024, 2, 2, 6, 0, 0).unwrap(), 80.0);
    ride.samples = (0..120)
        .map(|i| RideSample {
            secs: i as f64,
            power: Some(if i < 60 { 100.0 } else { 220.0 }),
            ..Default::default()
        })
        .collect();
    let power = ZoneSchedule::single(ZoneTable::coggan_power(200));
    let data = HistData::from_ride(&ride, &power, &ZoneSchedule::default(), Units::Metric);

    let watts = HistogramEngine::new(SeriesKind::Power, zoned()).distribution(&data);
    let wkg = HistogramEngine::new(SeriesKind::PowerPerKg, zoned()).distribution(&data);
    assert_eq!(watts.full, wkg.full);
    // one minute in Z1, one minute in Z5
    assert!((watts.full[1].y - 1.0).abs() < 1e-9);
    assert!((watts.full[4 * 4 + 1].y - 1.0).abs() < 1e-9);
}

fn power_ride(watts: &[f64]) -> Ride {
    let mut ride = Ride::new(Utc.with_ymd_and_hms(2024, 3, 9, 7, 0, 0).unwrap(), 75.0);
    ride.samples = watts
        .iter()
        .enumerate()
        .map(|(i, w)| RideSample {
            secs: i as f64,
            power: Some(*w),
            ..Default::default()
        })
        .collect();
    ride
}

#[test]
fn test_zoned_zero_policy_follows_engine_config() {
    let ride = power_ride(&[0.0, 0.0, 100.0, 100.0]);
    let power = ZoneSchedule::single(ZoneTable::coggan_power(200));
    let data = HistData::from_ride(&ride, &power, &ZoneSchedule::default(), Units::Metric);

    let minutes = |zoned: bool, include_zeros: bool| -> f64 {
        let config = BinConfig {
            zoned,
            include_zeros,
            ..Default::default()
        };
        let result = HistogramEngine::new(SeriesKind::Power, config).distribution(&data);
        if zoned {
            result.full.iter().skip(1).step_by(4).map(|p| p.y).sum()
        } else {
            result.full.iter().map(|p| p.y).sum()
        }
    };

    assert!((minutes(true, true) - 4.0 / 60.0).abs() < 1e-6);
    assert!((minutes(true, false) - 2.0 / 60.0).abs() < 1e-6);
    assert!((minutes(true, true) - minutes(false, true)).abs() < 1e-6);
    assert!((minutes(true, false) - minutes(false, false)).abs() < 1e-6);
}

#[test]
fn test_huge_bin_width_does_not_overflow() {
    let config = BinConfig {
        bin_width: 1e300,
        ..Default::default()
    };
    let engine = HistogramEngine::new(SeriesKind::Power, config);

    let ride = power_ride(&[0.0, 100.0, 250.0]);
    let data = HistData::from_ride(&ride, &ZoneSchedule::default(), &ZoneSchedule::default(), Units::Metric);
    let result = engine.distribution(&data);
    assert!(!result.is_empty());
    assert!((result.full[1].y - 2.0 / 60.0).abs() < 1e-6);
    assert!(result.full.iter().all(|p| p.x.is_finite()));

    let records = vec![MetricRecord { value: 12.5, total: 30.0 }, MetricRecord { value: 40.0, total: 10.0 }];
    let spec = MetricSpec {
        precision: 1,
        ..Default::default()
    };
    let result = engine.distribution(&HistData::from_metrics(&records, &spec));
    assert!(!result.is_empty());
    assert!((result.full[1].y - 40.0).abs() < 1e-6);
    assert!(result.full.iter().all(|p| p.x.is_finite()));
}
