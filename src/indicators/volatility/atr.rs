//! ATR (Average True Range) indicator

use crate::common::math;
use crate::models::indicators::Candle;

/// True range for every candle after the first.
pub fn true_ranges(candles: &[Candle]) -> Vec<f64> {
    candles
        .windows(2)
        .map(|pair| math::true_range(pair[1].high, pair[1].low, pair[0].close))
        .collect()
}

/// Wilder-smoothed ATR series. Element `i` belongs to candle `i + period`.
pub fn atr_series(candles: &[Candle], period: u32) -> Vec<f64> {
    math::wilder_series(&true_ranges(candles), period as usize)
}

/// Latest ATR; needs at least `period + 1` candles.
pub fn calculate_atr(candles: &[Candle], period: u32) -> Option<f64> {
    if period == 0 || candles.len() < period as usize + 1 {
        return None;
    }
    atr_series(candles, period).last().copied()
}

/// Calculate ATR with default period (14)
pub fn calculate_atr_default(candles: &[Candle]) -> Option<f64> {
    calculate_atr(candles, 14)
}
