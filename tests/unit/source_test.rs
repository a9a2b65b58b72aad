//! Unit tests for building count arrays from rides, caches and metrics.

use chrono::{TimeZone, Utc};
use ridehist::histogram::selection::Interval;
use ridehist::histogram::series::{SeriesKind, ZoneKind};
use ridehist::histogram::source::{HistData, SourceKind};
use ridehist::histogram::units::{self, Units};
use ridehist::metrics::zones::{ZoneSchedule, ZoneTable};
use ridehist::ride::types::{DistributionCache, MetricRecord, MetricSpec, Ride, RideSample};

fn sample(secs: f64, watts: f64, hr: f64, cadence: f64, torque: f64) -> RideSample {
    RideSample {
        secs,
        power: Some(watts),
        heart_rate: Some(hr),
        cadence: Some(cadence),
        torque: Some(torque),
        speed: Some(32.5),
        ..Default::default()
    }
}

fn test_ride() -> Ride {
    let mut ride = Ride::new(Utc.with_ymd_and_hms(2024, 4, 20, 7, 30, 0).unwrap(), 70.0);
    ride.samples = (0..600)
        .map(|i| {
            let t = i as f64;
            sample(t, 150.0 + (i % 120) as f64, 120.0 + (i % 40) as f64, 85.0 + (i % 10) as f64, 20.0 + (i % 30) as f64 * 0.1)
        })
        .collect();
    ride.intervals = vec![
        Interval::new("first", 60.0, 120.0, true),
        Interval::new("second", 300.0, 420.0, true),
        Interval::new("ignored", 500.0, 550.0, false),
    ];
    ride
}

fn build(ride: &Ride, units: Units) -> HistData {
    let power = ZoneSchedule::single(ZoneTable::coggan_power(250));
    let hr = ZoneSchedule::single(ZoneTable::karvonen_hr(185, 48));
    HistData::from_ride(ride, &power, &hr, units)
}

#[test]
fn test_selected_never_exceeds_full() {
    let data = build(&test_ride(), Units::Metric);

    for kind in SeriesKind::ALL {
        let counts = data.series(kind).unwrap();
        let selected = counts.selected.as_ref().unwrap();
        assert!(selected.len() <= counts.full.len(), "{}", kind);
        for i in 0..counts.full.len() {
            assert!(selected.get(i) <= counts.full.get(i), "{} index {}", kind, i);
        }
    }
    for kind in [ZoneKind::Power, ZoneKind::HeartRate] {
        for include_zeros in [false, true] {
            let zones = data.zones(kind, include_zeros).unwrap();
            let selected = zones.selected.as_ref().unwrap();
            for i in 0..zones.full.len() {
                assert!(selected.get(i) <= zones.full.get(i));
            }
        }
    }
}

#[test]
fn test_selected_counts_match_intervals() {
    let data = build(&test_ride(), Units::Metric);
    let power = data.series(SeriesKind::Power).unwrap();
    // samples 60..=119 and 300..=419
    assert_eq!(power.selected.as_ref().unwrap().total(), 180.0);
    assert_eq!(power.full.total(), 600.0);
}

#[test]
fn test_every_sample_is_zoned_once() {
    let data = build(&test_ride(), Units::Metric);
    // no zero samples, so the zero policy changes nothing
    for include_zeros in [false, true] {
        assert_eq!(data.zones(ZoneKind::Power, include_zeros).unwrap().full.total(), 600.0);
        // the lowest heart rates sit below the first Karvonen zone
        assert!(data.zones(ZoneKind::HeartRate, include_zeros).unwrap().full.total() <= 600.0);
    }
}

#[test]
fn test_torque_imperial_round_trip() {
    let metric = units::scale(SeriesKind::Torque, 42.0, Units::Metric);
    let imperial = units::scale(SeriesKind::Torque, 42.0, Units::Imperial);
    assert_eq!(metric, 42.0);
    let back = imperial / units::factor(SeriesKind::Torque, Units::Imperial);
    assert!((back - 42.0).abs() < 1e-9);
}

#[test]
fn test_imperial_ride_reindexes_torque() {
    let ride = test_ride();
    let metric = build(&ride, Units::Metric);
    let imperial = build(&ride, Units::Imperial);

    let metric_torque = metric.series(SeriesKind::Torque).unwrap();
    let imperial_torque = imperial.series(SeriesKind::Torque).unwrap();
    assert_eq!(metric_torque.full.total(), imperial_torque.full.total());
    assert!(imperial_torque.full.len() < metric_torque.full.len());
    // power is not converted
    assert_eq!(metric.series(SeriesKind::Power).unwrap().full, imperial.series(SeriesKind::Power).unwrap().full);
}

#[test]
fn test_build_is_deterministic() {
    let ride = test_ride();
    let first = build(&ride, Units::Metric);
    let second = build(&ride, Units::Metric);
    assert_eq!(first.id(), second.id());
    for kind in SeriesKind::ALL {
        assert_eq!(first.series(kind), second.series(kind));
    }
}

#[test]
fn test_values_beyond_arena_are_skipped() {
    let mut ride = Ride::new(Utc::now(), 70.0);
    ride.samples = vec![
        RideSample {
            secs: 0.0,
            power: Some(5000.0),
            ..Default::default()
        },
        RideSample {
            secs: 1.0,
            power: Some(300.0),
            ..Default::default()
        },
    ];
    let data = HistData::from_ride(&ride, &ZoneSchedule::default(), &ZoneSchedule::default(), Units::Metric);
    let power = data.series(SeriesKind::Power).unwrap();
    assert_eq!(power.full.total(), 1.0);
    assert_eq!(power.full.get(300), 1.0);
}

#[test]
fn test_cache_truncation_keeps_highest_value() {
    let mut cache = DistributionCache::default();
    cache.distributions.insert(SeriesKind::HeartRate, vec![0.0, 5.0, 0.0, 7.9, 0.0, 0.0]);
    let data = HistData::from_cache(&cache, Units::Metric);
    let hr = data.series(SeriesKind::HeartRate).unwrap();
    assert_eq!(hr.full.len(), 4);
    // fractions are truncated to whole seconds
    assert_eq!(hr.full.get(3), 7.0);
    assert_eq!(data.source(), SourceKind::Cache);
}

#[test]
fn test_cache_imperial_speed() {
    let mut cache = DistributionCache::default();
    let mut speed = vec![0.0; 401];
    speed[400] = 60.0; // 40 km/h
    cache.distributions.insert(SeriesKind::Speed, speed);
    let data = HistData::from_cache(&cache, Units::Imperial);
    let mph = data.series(SeriesKind::Speed).unwrap();
    // 24.85 mph
    assert_eq!(mph.full.get(248), 60.0);
    assert_eq!(mph.full.total(), 60.0);
}

#[test]
fn test_metric_sentinels_and_non_finite_values() {
    let records = vec![
        MetricRecord { value: 250.0, total: 3600.0 },
        MetricRecord { value: f64::INFINITY, total: 600.0 },
        MetricRecord { value: -1.0, total: 1200.0 },
        MetricRecord { value: 260.4, total: 1800.0 },
    ];
    let spec = MetricSpec {
        precision: 0,
        value_in_seconds: false,
        total_in_seconds: true,
        skip_value: Some(-1.0),
    };
    let data = HistData::from_metrics(&records, &spec);
    let axis = data.metric().unwrap();

    assert_eq!(data.source(), SourceKind::Metric);
    assert_eq!(axis.counts.len(), 261);
    assert_eq!(axis.counts.get(0), 10.0);
    assert_eq!(axis.counts.get(250), 60.0);
    assert_eq!(axis.counts.get(260), 30.0);
    assert_eq!(axis.counts.total(), 100.0);
}

#[test]
fn test_metric_negative_values_shift_origin() {
    let records = vec![MetricRecord { value: -2.0, total: 1.0 }, MetricRecord { value: 3.0, total: 2.0 }];
    let data = HistData::from_metrics(&records, &MetricSpec::default());
    let axis = data.metric().unwrap();
    assert_eq!(axis.origin, -2.0);
    assert_eq!(axis.counts.len(), 6);
    assert_eq!(axis.counts.get(0), 1.0);
    assert_eq!(axis.counts.get(5), 2.0);
}
