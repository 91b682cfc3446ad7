use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::models::Timeframe;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        open_time: DateTime<Utc>,
    ) -> Self {
        Self {
            open_time,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// A numeric indicator value, or the marker for "not enough history".
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Reading {
    Value(f64),
    #[default]
    InsufficientData,
}

const INSUFFICIENT_MARKER: &str = "insufficient_data";

impl Reading {
    /// Non-finite inputs collapse into the marker.
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Reading::Value(value)
        } else {
            Reading::InsufficientData
        }
    }

    pub fn from_option(value: Option<f64>) -> Self {
        value.map(Reading::new).unwrap_or(Reading::InsufficientData)
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Reading::Value(v) => Some(*v),
            Reading::InsufficientData => None,
        }
    }

    pub fn is_insufficient(&self) -> bool {
        matches!(self, Reading::InsufficientData)
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Value(v) => write!(f, "{:.2}", v),
            Reading::InsufficientData => f.write_str("insufficient data"),
        }
    }
}

impl Serialize for Reading {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Reading::Value(v) => serializer.serialize_f64(*v),
            Reading::InsufficientData => serializer.serialize_str(INSUFFICIENT_MARKER),
        }
    }
}

impl<'de> Deserialize<'de> for Reading {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(v) => Ok(Reading::new(v)),
            Raw::Text(t) if t == INSUFFICIENT_MARKER => Ok(Reading::InsufficientData),
            Raw::Text(t) => Err(D::Error::custom(format!(
                "expected a number or '{}', got '{}'",
                INSUFFICIENT_MARKER, t
            ))),
        }
    }
}

/// Discrete contribution of one indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Vote {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Trend {
    Bullish,
    Bearish,
}

impl Trend {
    /// More buy-side moving averages than sell-side ones reads as bullish;
    /// an even split reads as bearish.
    pub fn from_counts(buy_count: u32, sell_count: u32) -> Self {
        if buy_count > sell_count {
            Trend::Bullish
        } else {
            Trend::Bearish
        }
    }
}

/// Upstream five-level rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    StrongBuy,
    Buy,
    Neutral,
    Sell,
    StrongSell,
}

impl Recommendation {
    /// Maps an aggregate rating score in [-1, 1] to its label.
    pub fn from_score(score: f64) -> Self {
        if score > 0.5 {
            Recommendation::StrongBuy
        } else if score > 0.1 {
            Recommendation::Buy
        } else if score >= -0.1 {
            Recommendation::Neutral
        } else if score >= -0.5 {
            Recommendation::Sell
        } else {
            Recommendation::StrongSell
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::StrongBuy => "STRONG_BUY",
            Recommendation::Buy => "BUY",
            Recommendation::Neutral => "NEUTRAL",
            Recommendation::Sell => "SELL",
            Recommendation::StrongSell => "STRONG_SELL",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingAverageSummary {
    pub recommendation: Recommendation,
    pub buy_count: u32,
    pub sell_count: u32,
    #[serde(default)]
    pub neutral_count: u32,
}

/// Oscillator readings reported by the technical-summary provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryIndicatorValues {
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub stoch_rsi_k: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalSummary {
    pub recommendation: Recommendation,
    pub indicator_values: SummaryIndicatorValues,
    pub moving_averages: MovingAverageSummary,
}

/// Normalized indicator record for one instrument and timeframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub recommendation: Recommendation,
    pub momentum: Reading,
    pub macd: Reading,
    pub stoch_rsi: Reading,
    pub ema50: Reading,
    pub ema100: Reading,
    pub ema200: Reading,
    pub trend: Trend,
    pub volume: Reading,
    pub avg_volume20: Reading,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub atr: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub supertrend_vote: Option<Vote>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub parabolic_sar_vote: Option<Vote>,
    pub moving_average_summary: MovingAverageSummary,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub last_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub support: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub resistance: Option<f64>,
    /// Display levels over the most recent candles only.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub recent_support: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub recent_resistance: Option<f64>,
    pub built_at: DateTime<Utc>,
}

impl IndicatorSnapshot {
    /// Snapshot carrying only the summary-derived fields; every candle-derived
    /// field starts as a marker.
    pub fn from_summary(symbol: &str, timeframe: Timeframe, summary: &TechnicalSummary) -> Self {
        let ma = &summary.moving_averages;
        Self {
            symbol: symbol.to_string(),
            timeframe,
            recommendation: summary.recommendation,
            momentum: Reading::from_option(summary.indicator_values.rsi),
            macd: Reading::from_option(summary.indicator_values.macd),
            stoch_rsi: Reading::from_option(summary.indicator_values.stoch_rsi_k),
            ema50: Reading::InsufficientData,
            ema100: Reading::InsufficientData,
            ema200: Reading::InsufficientData,
            trend: Trend::from_counts(ma.buy_count, ma.sell_count),
            volume: Reading::InsufficientData,
            avg_volume20: Reading::InsufficientData,
            atr: None,
            supertrend_vote: None,
            parabolic_sar_vote: None,
            moving_average_summary: ma.clone(),
            last_price: None,
            support: None,
            resistance: None,
            recent_support: None,
            recent_resistance: None,
            built_at: Utc::now(),
        }
    }
}
