//! SuperTrend indicator

use crate::indicators::volatility::atr_series;
use crate::models::indicators::{Candle, Vote};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuperTrend {
    /// Active band: lower band in an uptrend, upper band in a downtrend.
    pub value: f64,
    /// 1 for uptrend, -1 for downtrend.
    pub trend: i8,
    pub upper_band: f64,
    pub lower_band: f64,
}

impl SuperTrend {
    pub fn vote(&self) -> Vote {
        if self.trend > 0 {
            Vote::Buy
        } else {
            Vote::Sell
        }
    }
}

/// SuperTrend over Wilder ATR.
///
/// Bands ratchet: the lower band only rises while the trend is up and the
/// upper band only falls while it is down. The trend flips when a close
/// crosses the previous opposite band.
pub fn calculate_supertrend(candles: &[Candle], period: u32, multiplier: f64) -> Option<SuperTrend> {
    if period == 0 || candles.len() < period as usize + 1 {
        return None;
    }

    let atr = atr_series(candles, period);
    // atr[k] belongs to candle k + period
    let start = period as usize;
    let mut trend: i8 = 1;
    let mut upper = f64::NAN;
    let mut lower = f64::NAN;

    for (k, atr_value) in atr.iter().enumerate() {
        let candle = &candles[start + k];
        let hl2 = (candle.high + candle.low) / 2.0;
        let basic_upper = hl2 + multiplier * atr_value;
        let basic_lower = hl2 - multiplier * atr_value;

        if k == 0 {
            upper = basic_upper;
            lower = basic_lower;
            continue;
        }

        if candle.close > upper {
            trend = 1;
        } else if candle.close < lower {
            trend = -1;
        }

        let prev_upper = upper;
        let prev_lower = lower;
        upper = basic_upper;
        lower = basic_lower;
        if trend > 0 && lower < prev_lower {
            lower = prev_lower;
        }
        if trend < 0 && upper > prev_upper {
            upper = prev_upper;
        }
    }

    if !upper.is_finite() || !lower.is_finite() {
        return None;
    }

    Some(SuperTrend {
        value: if trend > 0 { lower } else { upper },
        trend,
        upper_band: upper,
        lower_band: lower,
    })
}

/// Calculate SuperTrend with default parameters (10, 3)
pub fn calculate_supertrend_default(candles: &[Candle]) -> Option<SuperTrend> {
    calculate_supertrend(candles, 10, 3.0)
}
