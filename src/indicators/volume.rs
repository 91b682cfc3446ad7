//! Traded volume statistics

use crate::common::math;
use crate::models::indicators::{Candle, Reading};

pub const AVERAGE_VOLUME_PERIOD: usize = 20;

/// Latest volume and its trailing mean over `period` candles (latest included).
pub fn volume_readings(candles: &[Candle], period: usize) -> (Reading, Reading) {
    let latest = Reading::from_option(candles.last().map(|c| c.volume));
    if candles.len() < period {
        return (latest, Reading::InsufficientData);
    }
    let volumes: Vec<f64> = candles.iter().map(|c| c.volume).collect();
    (latest, Reading::from_option(math::sma(&volumes, period)))
}
