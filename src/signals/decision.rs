//! Multi-indicator voting that turns a snapshot into a trade decision.
//!
//! Six inputs vote in a fixed order: RSI, MACD, the EMA 50/100/200 stack,
//! volume against its 20-candle mean, SuperTrend and parabolic SAR. Two
//! independent computations run over those votes:
//!
//! * the **signal** needs at least two agreeing votes and is vetoed to
//!   `Hold` whenever a vote contradicts the moving-average trend;
//! * the **direction/confidence** pair is a plain majority, never vetoed,
//!   floored at 50%.
//!
//! The engine is pure and deterministic; missing inputs abstain.

use crate::models::indicators::{IndicatorSnapshot, Trend, Vote};
use crate::models::signal::{
    DecisionReason, DecisionResult, LeverageBand, SignalDirection, TradeSignal,
};

pub const RSI_OVERSOLD: f64 = 35.0;
pub const RSI_OVERBOUGHT: f64 = 65.0;
pub const MIN_AGREEING_VOTES: usize = 2;
pub const CONFIDENCE_FLOOR: u8 = 50;
pub const ATR_STOP_MULTIPLIER: f64 = 1.5;
pub const FALLBACK_STOP_PCT: f64 = 0.015;
pub const MIN_STOP_PCT: f64 = 0.005;
pub const REWARD_TO_RISK: f64 = 2.0;

/// One input's contribution: `None` when its data is missing, `Some(None)`
/// when present but abstaining.
pub type Ballot = Option<Option<Vote>>;

fn rsi_ballot(snapshot: &IndicatorSnapshot) -> Ballot {
    snapshot.momentum.value().map(|rsi| {
        if rsi < RSI_OVERSOLD {
            Some(Vote::Buy)
        } else if rsi > RSI_OVERBOUGHT {
            Some(Vote::Sell)
        } else {
            None
        }
    })
}

fn macd_ballot(snapshot: &IndicatorSnapshot) -> Ballot {
    snapshot.macd.value().map(|macd| {
        if macd > 0.0 {
            Some(Vote::Buy)
        } else if macd < 0.0 {
            Some(Vote::Sell)
        } else {
            None
        }
    })
}

fn ema_stack_ballot(snapshot: &IndicatorSnapshot) -> Ballot {
    let (fast, mid, slow) = match (
        snapshot.ema50.value(),
        snapshot.ema100.value(),
        snapshot.ema200.value(),
    ) {
        (Some(a), Some(b), Some(c)) => (a, b, c),
        _ => return None,
    };
    Some(if fast > mid && mid > slow {
        Some(Vote::Buy)
    } else if fast < mid && mid < slow {
        Some(Vote::Sell)
    } else {
        None
    })
}

fn volume_ballot(snapshot: &IndicatorSnapshot) -> Ballot {
    let (volume, average) = match (snapshot.volume.value(), snapshot.avg_volume20.value()) {
        (Some(v), Some(a)) => (v, a),
        _ => return None,
    };
    Some(if volume > average {
        Some(Vote::Buy)
    } else if volume < average {
        Some(Vote::Sell)
    } else {
        None
    })
}

/// Overlays only participate when they actually vote.
fn overlay_ballot(vote: Option<Vote>) -> Ballot {
    vote.map(Some)
}

/// Ballots in evaluation order.
pub fn collect_ballots(snapshot: &IndicatorSnapshot) -> [Ballot; 6] {
    [
        rsi_ballot(snapshot),
        macd_ballot(snapshot),
        ema_stack_ballot(snapshot),
        volume_ballot(snapshot),
        overlay_ballot(snapshot.supertrend_vote),
        overlay_ballot(snapshot.parabolic_sar_vote),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VoteTally {
    pub buy: usize,
    pub sell: usize,
    /// Inputs whose data was present, abstentions included.
    pub participants: usize,
    pub last_vote: Option<Vote>,
}

pub fn tally(ballots: &[Ballot]) -> VoteTally {
    ballots
        .iter()
        .flatten()
        .fold(VoteTally::default(), |mut acc, ballot| {
            acc.participants += 1;
            match ballot {
                Some(Vote::Buy) => {
                    acc.buy += 1;
                    acc.last_vote = Some(Vote::Buy);
                }
                Some(Vote::Sell) => {
                    acc.sell += 1;
                    acc.last_vote = Some(Vote::Sell);
                }
                None => {}
            }
            acc
        })
}

fn signal_from(trend: Trend, tally: &VoteTally) -> (TradeSignal, DecisionReason) {
    if trend == Trend::Bearish && tally.buy > 0 {
        return (TradeSignal::Hold, DecisionReason::BullishSignalInBearishMarket);
    }
    if trend == Trend::Bullish && tally.sell > 0 {
        return (TradeSignal::Hold, DecisionReason::BearishSignalInBullishMarket);
    }
    if tally.participants == 0 {
        return (TradeSignal::Hold, DecisionReason::InsufficientData);
    }
    if tally.buy >= MIN_AGREEING_VOTES {
        (TradeSignal::Buy, DecisionReason::Consensus)
    } else if tally.sell >= MIN_AGREEING_VOTES {
        (TradeSignal::Sell, DecisionReason::Consensus)
    } else {
        (TradeSignal::Hold, DecisionReason::NoConsensus)
    }
}

/// Majority direction with a percentage confidence floored at 50.
///
/// A tie follows the last vote cast; with no votes at all the result is
/// Long at 50, an arbitrary default kept for compatibility.
pub fn direction_and_confidence(tally: &VoteTally) -> (SignalDirection, u8) {
    if tally.participants == 0 {
        return (SignalDirection::Long, CONFIDENCE_FLOOR);
    }

    let majority = tally.buy.max(tally.sell) as f64;
    let pct = (100.0 * majority / tally.participants as f64).round() as u8;
    let confidence = pct.max(CONFIDENCE_FLOOR);

    let direction = if tally.buy > tally.sell {
        SignalDirection::Long
    } else if tally.sell > tally.buy {
        SignalDirection::Short
    } else {
        match tally.last_vote {
            Some(Vote::Sell) => SignalDirection::Short,
            _ => SignalDirection::Long,
        }
    };

    (direction, confidence)
}

/// Stop-loss and take-profit distances; `None` when the price is unknown.
pub fn risk_anchors(price: Option<f64>, atr: Option<f64>, support: Option<f64>) -> Option<(f64, f64)> {
    let price = price.filter(|p| p.is_finite() && *p > 0.0)?;

    let by_volatility = match atr.filter(|a| a.is_finite() && *a > 0.0) {
        Some(atr) => atr * ATR_STOP_MULTIPLIER,
        None => price * FALLBACK_STOP_PCT,
    };
    let by_support = match support.filter(|s| s.is_finite()) {
        Some(support) => (price - support).abs(),
        None => by_volatility,
    };

    let stop_loss = by_volatility.min(by_support).max(price * MIN_STOP_PCT);
    Some((stop_loss, stop_loss * REWARD_TO_RISK))
}

/// Decides the trade signal for a snapshot.
///
/// `resistance` is accepted for symmetry with the support level but does not
/// move the risk anchors.
pub fn decide(
    snapshot: &IndicatorSnapshot,
    current_price: Option<f64>,
    support: Option<f64>,
    _resistance: Option<f64>,
) -> DecisionResult {
    let ballots = collect_ballots(snapshot);
    let tally = tally(&ballots);
    let (signal, reason) = signal_from(snapshot.trend, &tally);
    let (direction, confidence) = direction_and_confidence(&tally);
    let anchors = risk_anchors(current_price, snapshot.atr, support);

    DecisionResult {
        signal,
        reason,
        direction,
        confidence,
        buy_votes: tally.buy as u8,
        sell_votes: tally.sell as u8,
        stop_loss: anchors.map(|(sl, _)| sl),
        take_profit: anchors.map(|(_, tp)| tp),
        leverage: LeverageBand::ADVISORY,
    }
}

/// [`decide`] fed with the price levels carried by the snapshot itself.
pub fn decide_snapshot(snapshot: &IndicatorSnapshot) -> DecisionResult {
    decide(
        snapshot,
        snapshot.last_price,
        snapshot.support,
        snapshot.resistance,
    )
}
