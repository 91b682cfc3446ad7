//! Shared data models spanning the engine layers.

pub mod indicators;
pub mod recommendation;
pub mod signal;
pub mod timeframe;

pub use indicators::{
    Candle, IndicatorSnapshot, MovingAverageSummary, Reading, Recommendation,
    SummaryIndicatorValues, TechnicalSummary, Trend, Vote,
};
pub use recommendation::{
    CombinedRecommendation, MergeRule, Narration, OverallDirection, TimeframeAnalysis,
    TimeframeForecast, TimeframeReport, RISK_DISCLAIMER,
};
pub use signal::{DecisionReason, DecisionResult, LeverageBand, SignalDirection, TradeSignal};
pub use timeframe::{Horizons, Timeframe, UnknownTimeframe};
