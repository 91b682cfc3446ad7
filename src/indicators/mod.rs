//! Locally computed indicators over candle history.

pub mod structure;
pub mod trend;
pub mod volatility;
pub mod volume;

use crate::models::indicators::{Candle, Vote};

/// Optional overlay capabilities, resolved once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorCapabilities {
    pub overlays: bool,
}

impl Default for IndicatorCapabilities {
    fn default() -> Self {
        Self { overlays: true }
    }
}

/// ATR(14), SuperTrend(10, 3.0) and PSAR(0.02, 0.2) for one candle series.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Overlays {
    pub atr: Option<f64>,
    pub supertrend_vote: Option<Vote>,
    pub parabolic_sar_vote: Option<Vote>,
}

impl Overlays {
    pub fn compute(candles: &[Candle]) -> Self {
        Self {
            atr: volatility::calculate_atr_default(candles),
            supertrend_vote: structure::calculate_supertrend_default(candles).map(|st| st.vote()),
            parabolic_sar_vote: structure::calculate_parabolic_sar_default(candles)
                .map(|psar| psar.vote()),
        }
    }
}
