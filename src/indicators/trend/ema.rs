//! EMA (Exponential Moving Average) indicator

use crate::common::math;
use crate::models::indicators::{Candle, Reading};

/// Trailing EMA of closes for a specific span.
///
/// Returns `None` when the history is shorter than `period`.
pub fn calculate_ema(candles: &[Candle], period: u32) -> Option<f64> {
    if period == 0 || candles.len() < period as usize {
        return None;
    }

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    math::ema_span(&closes, period as usize)
}

/// EMA as a snapshot reading; the marker stands in for short histories.
pub fn ema_reading(candles: &[Candle], period: u32) -> Reading {
    Reading::from_option(calculate_ema(candles, period))
}

/// Readings for the 50/100/200 stack, in that order.
pub fn ema_stack(candles: &[Candle]) -> [Reading; 3] {
    [
        ema_reading(candles, 50),
        ema_reading(candles, 100),
        ema_reading(candles, 200),
    ]
}
