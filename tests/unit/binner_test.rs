//! Unit tests for linear binning.

use ridehist::histogram::binner::{Binner, LOG_FLOOR};
use ridehist::histogram::counts::CountArray;

const DT: f64 = 1.0 / 60.0;

fn floors(bins: &ridehist::histogram::Bins) -> f64 {
    bins.full.len() as f64 * LOG_FLOOR
}

#[test]
fn test_concrete_power_scenario() {
    let counts = CountArray::from_counts(vec![0.0, 0.0, 5.0, 10.0, 3.0]);
    let bins = Binner::new(2.0, 1.0, DT, false).bin(&counts, None);

    // leading anchor, bins ending at 2, 4 and 6, trailing anchor
    assert_eq!(bins.x, vec![0.0, 2.0, 4.0, 6.0, 8.0]);
    assert!((bins.full[1] - LOG_FLOOR).abs() < 1e-15);
    assert!((bins.full[2] - (15.0 / 60.0 + LOG_FLOOR)).abs() < 1e-12);
    assert!((bins.full[3] - (3.0 / 60.0 + LOG_FLOOR)).abs() < 1e-12);
    assert_eq!(bins.full[0], LOG_FLOOR);
    assert_eq!(bins.full[4], LOG_FLOOR);
}

#[test]
fn test_binning_conserves_time() {
    let raw: Vec<f64> = (0..397).map(|i| ((i * 37) % 11) as f64).collect();
    let counts = CountArray::from_counts(raw);
    let expected = DT * counts.total();

    for width in [1.0, 2.0, 3.0, 5.0, 7.5, 10.0, 25.0, 500.0] {
        let bins = Binner::new(width, 1.0, DT, true).bin(&counts, None);
        let sum: f64 = bins.full.iter().sum::<f64>() - floors(&bins);
        assert!((sum - expected).abs() < 1e-6, "width {}: {} != {}", width, sum, expected);
    }
}

#[test]
fn test_excluded_zeros_are_not_counted() {
    let counts = CountArray::from_counts(vec![100.0, 1.0, 2.0, 3.0]);
    let bins = Binner::new(2.0, 1.0, 1.0, false).bin(&counts, None);
    let sum: f64 = bins.full.iter().sum::<f64>() - floors(&bins);
    assert!((sum - 6.0).abs() < 1e-6);
}

#[test]
fn test_fractional_delta_conserves_time() {
    // torque at 0.1 N-m per index, 2 N-m bins
    let raw: Vec<f64> = (0..250).map(|i| (i % 7) as f64).collect();
    let counts = CountArray::from_counts(raw);
    let binner = Binner::new(2.0, 0.1, DT, true);
    assert_eq!(binner.step(), 20);

    let bins = binner.bin(&counts, None);
    let sum: f64 = bins.full.iter().sum::<f64>() - floors(&bins);
    assert!((sum - DT * counts.total()).abs() < 1e-6);
    // the trailing anchor stays right of the last bin
    let last = bins.x.len() - 1;
    assert!(bins.x[last] > bins.x[last - 1]);
}

#[test]
fn test_binning_is_deterministic() {
    let raw: Vec<f64> = (0..1000).map(|i| ((i * 7919) % 13) as f64).collect();
    let counts = CountArray::from_counts(raw);
    let selected = CountArray::from_counts(vec![0.0, 1.0, 1.0]);
    let binner = Binner::new(5.0, 1.0, DT, false);

    let first = binner.bin(&counts, Some(&selected));
    let second = binner.bin(&counts, Some(&selected));
    assert_eq!(first, second);
}

#[test]
fn test_partial_final_bin_is_kept() {
    let mut raw = vec![0.0; 11];
    raw[10] = 60.0;
    let bins = Binner::new(4.0, 1.0, DT, true).bin(&CountArray::from_counts(raw), None);
    let sum: f64 = bins.full.iter().sum::<f64>() - floors(&bins);
    assert!((sum - 1.0).abs() < 1e-6);
}
