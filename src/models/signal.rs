use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum TradeSignal {
    Buy,
    Sell,
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum SignalDirection {
    Long,
    Short,
}

impl fmt::Display for SignalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalDirection::Long => f.write_str("LONG"),
            SignalDirection::Short => f.write_str("SHORT"),
        }
    }
}

/// Why the engine settled on its signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    Consensus,
    NoConsensus,
    BullishSignalInBearishMarket,
    BearishSignalInBullishMarket,
    InsufficientData,
}

impl DecisionReason {
    pub fn description(&self) -> &'static str {
        match self {
            DecisionReason::Consensus => "at least two indicators agree",
            DecisionReason::NoConsensus => "fewer than two indicators agree",
            DecisionReason::BullishSignalInBearishMarket => "bullish signal in bearish market",
            DecisionReason::BearishSignalInBullishMarket => "bearish signal in bullish market",
            DecisionReason::InsufficientData => "insufficient data",
        }
    }

    pub fn is_veto(&self) -> bool {
        matches!(
            self,
            DecisionReason::BullishSignalInBearishMarket
                | DecisionReason::BearishSignalInBullishMarket
        )
    }
}

impl fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Advisory leverage range; not derived from the indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeverageBand {
    pub min: u8,
    pub max: u8,
}

impl LeverageBand {
    pub const ADVISORY: LeverageBand = LeverageBand { min: 5, max: 10 };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResult {
    pub signal: TradeSignal,
    pub reason: DecisionReason,
    pub direction: SignalDirection,
    /// Integer percent in [50, 100].
    pub confidence: u8,
    pub buy_votes: u8,
    pub sell_votes: u8,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub leverage: LeverageBand,
}
