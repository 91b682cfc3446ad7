//! Unit tests for parabolic SAR

use crate::support::trending_candles;
use signalcast::indicators::structure::{calculate_parabolic_sar, calculate_parabolic_sar_default};
use signalcast::models::Vote;

#[test]
fn test_psar_needs_two_candles() {
    let candles = trending_candles(1, 100.0, 1.0);
    assert!(calculate_parabolic_sar_default(&candles).is_none());
}

#[test]
fn test_psar_trails_below_rising_market() {
    let candles = trending_candles(30, 100.0, 1.0);
    let psar = calculate_parabolic_sar_default(&candles).unwrap();
    assert!(psar.rising);
    assert_eq!(psar.vote(), Vote::Buy);
    assert!(psar.value < candles.last().unwrap().low);
    assert!(psar.acceleration <= 0.2 + 1e-12);
}

#[test]
fn test_psar_sits_above_falling_market() {
    let candles = trending_candles(30, 200.0, -1.0);
    let psar = calculate_parabolic_sar(&candles, 0.02, 0.2).unwrap();
    assert!(!psar.rising);
    assert_eq!(psar.vote(), Vote::Sell);
    assert!(psar.value > candles.last().unwrap().high);
}
