//! Integration tests for ride, cache and metric documents on disk.

use chrono::{TimeZone, Utc};
use ridehist::histogram::binner::BinConfig;
use ridehist::histogram::engine::HistogramEngine;
use ridehist::histogram::selection::Interval;
use ridehist::histogram::series::SeriesKind;
use ridehist::histogram::source::HistData;
use ridehist::histogram::units::Units;
use ridehist::metrics::zones::{ZoneSchedule, ZoneTable};
use ridehist::ride::types::{DistributionCache, MetricDocument, MetricRecord, Ride, RideSample};
use ridehist::storage::documents::{load_cache, load_metrics, load_ride, save_to_file, StorageError};
use tempfile::TempDir;

fn sample_ride() -> Ride {
    let mut ride = Ride::new(Utc.with_ymd_and_hms(2024, 8, 10, 6, 45, 0).unwrap(), 72.0);
    ride.samples = (0..1800)
        .map(|i| RideSample {
            secs: i as f64,
            power: Some(180.0 + (i % 60) as f64),
            heart_rate: Some(135.0 + (i % 20) as f64),
            cadence: Some(88.0),
            speed: Some(31.0),
            ..Default::default()
        })
        .collect();
    ride.intervals.push(Interval::new("tempo", 600.0, 900.0, true));
    ride
}

#[test]
fn test_ride_file_to_distribution() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rides").join("morning.json");
    let ride = sample_ride();
    save_to_file(&ride, &path).unwrap();

    let loaded = load_ride(&path).unwrap();
    assert_eq!(loaded.id, ride.id);
    assert_eq!(loaded.samples.len(), 1800);

    let power = ZoneSchedule::single(ZoneTable::coggan_power(240));
    let data = HistData::from_ride(&loaded, &power, &ZoneSchedule::default(), Units::Metric);
    let config = BinConfig {
        bin_width: 10.0,
        ..Default::default()
    };
    let result = HistogramEngine::new(SeriesKind::Power, config).distribution(&data);

    let minutes: f64 = result.full.iter().map(|p| p.y).sum();
    assert!((minutes - 30.0).abs() < 1e-6);
    let selected: f64 = result.selected.as_ref().unwrap().iter().map(|p| p.y).sum();
    assert!((selected - 5.0).abs() < 1e-6);
}

#[test]
fn test_cache_file_name_defaults_to_stem() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("season-2024.json");
    let mut cache = DistributionCache::default();
    cache.distributions.insert(SeriesKind::Cadence, vec![0.0, 0.0, 120.0]);
    save_to_file(&cache, &path).unwrap();

    let loaded = load_cache(&path).unwrap();
    assert_eq!(loaded.name, "season-2024");
    assert_eq!(loaded.distribution(SeriesKind::Cadence), &[0.0, 0.0, 120.0]);
}

#[test]
fn test_metric_file_to_distribution() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("if.json");
    let json = r#"{
        "spec": { "precision": 2, "total_in_seconds": true },
        "records": [
            { "value": 0.75, "total": 3600 },
            { "value": 0.82, "total": 5400 },
            { "value": 0.75, "total": 1800 }
        ]
    }"#;
    std::fs::write(&path, json).unwrap();

    let doc: MetricDocument = load_metrics(&path).unwrap();
    assert_eq!(doc.records.len(), 3);
    assert_eq!(doc.records[0], MetricRecord { value: 0.75, total: 3600.0 });

    let data = HistData::from_metrics(&doc.records, &doc.spec);
    let config = BinConfig {
        bin_width: 0.05,
        ..Default::default()
    };
    let result = HistogramEngine::new(SeriesKind::Power, config).distribution(&data);
    let total: f64 = result.full.iter().map(|p| p.y).sum();
    assert!((total - 180.0).abs() < 1e-6);
}

#[test]
fn test_malformed_document_reports_serde_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ \"samples\": 12 }").unwrap();
    assert!(matches!(load_ride(&path), Err(StorageError::SerdeError(_))));
}
