use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::indicators::IndicatorSnapshot;
use crate::models::signal::{DecisionResult, SignalDirection};
use crate::models::Timeframe;

pub const RISK_DISCLAIMER: &str = "Confirm the entry with a signal before acting. Do not use high \
leverage on a weak trend. This is an automated indicator summary, not financial advice.";

/// Outcome of one narration call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Narration {
    Generated { text: String },
    Failed { error: String },
}

impl Narration {
    pub fn text(&self) -> Option<&str> {
        match self {
            Narration::Generated { text } => Some(text),
            Narration::Failed { .. } => None,
        }
    }
}

/// Snapshot and decision for one timeframe, before any narration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframeAnalysis {
    pub snapshot: IndicatorSnapshot,
    pub decision: DecisionResult,
}

impl TimeframeAnalysis {
    pub fn timeframe(&self) -> Timeframe {
        self.snapshot.timeframe
    }
}

/// Single-timeframe forecast with its detailed explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframeForecast {
    #[serde(flatten)]
    pub analysis: TimeframeAnalysis,
    pub narration: Narration,
    pub disclaimer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TimeframeReport {
    Available {
        timeframe: Timeframe,
        analysis: TimeframeAnalysis,
        narration: Narration,
    },
    Unavailable {
        timeframe: Timeframe,
        reason: String,
    },
}

impl TimeframeReport {
    pub fn timeframe(&self) -> Timeframe {
        match self {
            TimeframeReport::Available { timeframe, .. } => *timeframe,
            TimeframeReport::Unavailable { timeframe, .. } => *timeframe,
        }
    }

    pub fn decision(&self) -> Option<&DecisionResult> {
        match self {
            TimeframeReport::Available { analysis, .. } => Some(&analysis.decision),
            TimeframeReport::Unavailable { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeRule {
    Majority,
    HighestConfidence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallDirection {
    pub direction: SignalDirection,
    pub confidence: u8,
    pub agreeing: usize,
    pub considered: usize,
    pub rule: MergeRule,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedRecommendation {
    pub symbol: String,
    pub generated_at: DateTime<Utc>,
    pub timeframes: Vec<TimeframeReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall: Option<OverallDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combined_narration: Option<Narration>,
    pub disclaimer: String,
}

impl CombinedRecommendation {
    pub fn report(&self, timeframe: Timeframe) -> Option<&TimeframeReport> {
        self.timeframes.iter().find(|r| r.timeframe() == timeframe)
    }
}
