//! Support and Resistance levels detection

use crate::models::indicators::Candle;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SupportResistance {
    pub support: f64,
    pub resistance: f64,
}

/// Lowest low and highest high of the last `lookback` candles.
///
/// Shorter histories use whatever candles exist.
pub fn calculate_support_resistance(candles: &[Candle], lookback: usize) -> Option<SupportResistance> {
    if candles.is_empty() || lookback == 0 {
        return None;
    }

    let recent = &candles[candles.len().saturating_sub(lookback)..];
    let support = recent.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
    let resistance = recent
        .iter()
        .map(|c| c.high)
        .fold(f64::NEG_INFINITY, f64::max);

    if !support.is_finite() || !resistance.is_finite() {
        return None;
    }

    Some(SupportResistance {
        support,
        resistance,
    })
}

/// Calculate support/resistance with default lookback (20)
pub fn calculate_support_resistance_default(candles: &[Candle]) -> Option<SupportResistance> {
    calculate_support_resistance(candles, 20)
}
