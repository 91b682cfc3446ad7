use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Candle interval an analysis is run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "1d")]
    D1,
}

impl Timeframe {
    pub const ALL: [Timeframe; 4] = [Timeframe::M15, Timeframe::H1, Timeframe::H4, Timeframe::D1];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::M15 => "15m",
            Timeframe::H1 => "1h",
            Timeframe::H4 => "4h",
            Timeframe::D1 => "1d",
        }
    }

    /// Interval parameter understood by the Binance klines endpoint.
    pub fn binance_interval(&self) -> &'static str {
        self.as_str()
    }

    /// Column suffix used by the TradingView scanner (daily has none).
    pub fn tradingview_suffix(&self) -> &'static str {
        match self {
            Timeframe::M15 => "|15",
            Timeframe::H1 => "|60",
            Timeframe::H4 => "|240",
            Timeframe::D1 => "",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::M15 => "15 minutes",
            Timeframe::H1 => "1 hour",
            Timeframe::H4 => "4 hours",
            Timeframe::D1 => "1 day",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTimeframe(pub String);

impl fmt::Display for UnknownTimeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown timeframe '{}'", self.0)
    }
}

impl std::error::Error for UnknownTimeframe {}

impl FromStr for Timeframe {
    type Err = UnknownTimeframe;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "15m" => Ok(Timeframe::M15),
            "1h" | "60m" => Ok(Timeframe::H1),
            "4h" | "240m" => Ok(Timeframe::H4),
            "1d" | "d" => Ok(Timeframe::D1),
            other => Err(UnknownTimeframe(other.to_string())),
        }
    }
}

/// The three horizons combined into one recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Horizons {
    pub short: Timeframe,
    pub medium: Timeframe,
    pub long: Timeframe,
}

impl Horizons {
    pub fn as_array(&self) -> [Timeframe; 3] {
        [self.short, self.medium, self.long]
    }
}

impl Default for Horizons {
    fn default() -> Self {
        Self {
            short: Timeframe::M15,
            medium: Timeframe::H1,
            long: Timeframe::H4,
        }
    }
}
