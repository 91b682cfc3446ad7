//! Parabolic SAR (stop and reverse)

use crate::models::indicators::{Candle, Vote};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParabolicSar {
    pub value: f64,
    pub rising: bool,
    pub extreme_point: f64,
    pub acceleration: f64,
}

impl ParabolicSar {
    pub fn vote(&self) -> Vote {
        if self.rising {
            Vote::Buy
        } else {
            Vote::Sell
        }
    }
}

/// Wilder's parabolic SAR walked across the whole series.
pub fn calculate_parabolic_sar(candles: &[Candle], step: f64, max_step: f64) -> Option<ParabolicSar> {
    if candles.len() < 2 {
        return None;
    }

    let first = &candles[0];
    let mut rising = candles[1].close >= first.close;
    let mut sar = if rising { first.low } else { first.high };
    let mut ep = if rising { first.high } else { first.low };
    let mut af = step;

    for i in 1..candles.len() {
        let candle = &candles[i];
        sar += af * (ep - sar);

        if rising {
            sar = sar.min(candles[i - 1].low);
            if i >= 2 {
                sar = sar.min(candles[i - 2].low);
            }
            if candle.low < sar {
                rising = false;
                sar = ep;
                ep = candle.low;
                af = step;
            } else if candle.high > ep {
                ep = candle.high;
                af = (af + step).min(max_step);
            }
        } else {
            sar = sar.max(candles[i - 1].high);
            if i >= 2 {
                sar = sar.max(candles[i - 2].high);
            }
            if candle.high > sar {
                rising = true;
                sar = ep;
                ep = candle.high;
                af = step;
            } else if candle.low < ep {
                ep = candle.low;
                af = (af + step).min(max_step);
            }
        }
    }

    Some(ParabolicSar {
        value: sar,
        rising,
        extreme_point: ep,
        acceleration: af,
    })
}

/// Calculate parabolic SAR with default parameters (0.02, 0.2)
pub fn calculate_parabolic_sar_default(candles: &[Candle]) -> Option<ParabolicSar> {
    calculate_parabolic_sar(candles, 0.02, 0.2)
}
