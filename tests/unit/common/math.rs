//! Unit tests for series math helpers

use signalcast::common::math::{ema_span, sma, true_range, wilder_series};

#[test]
fn test_sma_uses_trailing_window() {
    assert_eq!(sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3), Some(4.0));
    assert_eq!(sma(&[1.0, 2.0], 3), None);
    assert_eq!(sma(&[1.0, 2.0], 0), None);
}

#[test]
fn test_ema_span_is_seeded_with_first_value() {
    // alpha = 0.5: 1 -> 1.5 -> 2.25
    let ema = ema_span(&[1.0, 2.0, 3.0], 3).unwrap();
    assert!((ema - 2.25).abs() < 1e-12);
    assert_eq!(ema_span(&[7.0], 10), Some(7.0));
    assert_eq!(ema_span(&[], 10), None);
}

#[test]
fn test_true_range_takes_largest_gap() {
    assert_eq!(true_range(10.0, 8.0, 11.0), 3.0);
    assert_eq!(true_range(10.0, 8.0, 9.0), 2.0);
    assert_eq!(true_range(10.0, 8.0, 5.0), 5.0);
}

#[test]
fn test_wilder_series_seeds_with_sma() {
    let out = wilder_series(&[1.0, 2.0, 3.0, 4.0], 2);
    assert_eq!(out.len(), 3);
    assert!((out[0] - 1.5).abs() < 1e-12);
    assert!((out[1] - 2.25).abs() < 1e-12);
    assert!((out[2] - 3.125).abs() < 1e-12);
    assert!(wilder_series(&[1.0], 2).is_empty());
}
