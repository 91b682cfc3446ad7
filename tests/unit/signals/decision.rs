//! Unit tests for the signal decision engine

use crate::support::blank_snapshot;
use signalcast::models::{
    DecisionReason, IndicatorSnapshot, LeverageBand, Reading, SignalDirection, TradeSignal,
    Trend, Vote,
};
use signalcast::signals::decision::{decide, decide_snapshot, risk_anchors};

fn bullish_stack(trend: Trend) -> IndicatorSnapshot {
    let mut s = blank_snapshot(trend);
    s.momentum = Reading::Value(25.0);
    s.macd = Reading::Value(10.0);
    s.ema50 = Reading::Value(300.0);
    s.ema100 = Reading::Value(200.0);
    s.ema200 = Reading::Value(100.0);
    s.volume = Reading::Value(2_000.0);
    s.avg_volume20 = Reading::Value(1_000.0);
    s
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_full_bullish_agreement_in_bullish_market() {
    let result = decide(&bullish_stack(Trend::Bullish), None, None, None);
    assert_eq!(result.signal, TradeSignal::Buy);
    assert_eq!(result.reason, DecisionReason::Consensus);
    assert_eq!(result.direction, SignalDirection::Long);
    assert_eq!(result.confidence, 100);
    assert_eq!(result.buy_votes, 4);
    assert_eq!(result.sell_votes, 0);
}

#[test]
fn test_bullish_votes_in_bearish_market_are_vetoed() {
    let result = decide(&bullish_stack(Trend::Bearish), None, None, None);
    assert_eq!(result.signal, TradeSignal::Hold);
    assert_eq!(result.reason, DecisionReason::BullishSignalInBearishMarket);
    assert!(result.reason.is_veto());
    // Direction and confidence are still reported under a veto.
    assert_eq!(result.direction, SignalDirection::Long);
    assert_eq!(result.confidence, 100);
}

#[test]
fn test_veto_dominates_three_buy_votes() {
    let mut s = bullish_stack(Trend::Bearish);
    s.volume = Reading::InsufficientData;
    let result = decide(&s, Some(100.0), None, None);
    assert_eq!(result.buy_votes, 3);
    assert_eq!(result.sell_votes, 0);
    assert_eq!(result.signal, TradeSignal::Hold);
}

#[test]
fn test_single_sell_vote_vetoes_bullish_market() {
    let mut s = bullish_stack(Trend::Bullish);
    s.macd = Reading::Value(-1.0);
    let result = decide(&s, None, None, None);
    assert_eq!(result.signal, TradeSignal::Hold);
    assert_eq!(result.reason, DecisionReason::BearishSignalInBullishMarket);
    assert_eq!(result.direction, SignalDirection::Long);
    assert_eq!(result.confidence, 75);
}

#[test]
fn test_rsi_oversold_with_one_more_buy_is_enough() {
    let mut s = blank_snapshot(Trend::Bullish);
    s.momentum = Reading::Value(30.0);
    s.parabolic_sar_vote = Some(Vote::Buy);
    let result = decide(&s, None, None, None);
    assert_eq!(result.signal, TradeSignal::Buy);
    assert_eq!(result.buy_votes, 2);
}

#[test]
fn test_sell_consensus_in_bearish_market() {
    let mut s = blank_snapshot(Trend::Bearish);
    s.momentum = Reading::Value(80.0);
    s.macd = Reading::Value(-5.0);
    let result = decide(&s, None, None, None);
    assert_eq!(result.signal, TradeSignal::Sell);
    assert_eq!(result.reason, DecisionReason::Consensus);
    assert_eq!(result.direction, SignalDirection::Short);
    assert_eq!(result.confidence, 100);
}

#[test]
fn test_single_vote_is_no_consensus() {
    let mut s = blank_snapshot(Trend::Bullish);
    s.momentum = Reading::Value(20.0);
    let result = decide(&s, None, None, None);
    assert_eq!(result.signal, TradeSignal::Hold);
    assert_eq!(result.reason, DecisionReason::NoConsensus);
    assert_eq!(result.confidence, 100);
}

#[test]
fn test_abstaining_inputs_still_participate() {
    let mut s = blank_snapshot(Trend::Bullish);
    s.momentum = Reading::Value(50.0);
    s.macd = Reading::Value(1.0);
    let result = decide(&s, None, None, None);
    assert_eq!(result.buy_votes, 1);
    assert_eq!(result.direction, SignalDirection::Long);
    assert_eq!(result.confidence, 50);
}

#[test]
fn test_overlays_only_count_when_voting() {
    let mut s = blank_snapshot(Trend::Bullish);
    s.supertrend_vote = Some(Vote::Buy);
    s.parabolic_sar_vote = Some(Vote::Buy);
    let result = decide(&s, None, None, None);
    assert_eq!(result.signal, TradeSignal::Buy);
    assert_eq!(result.confidence, 100);
}

#[test]
fn test_tied_votes_follow_last_vote() {
    let mut s = blank_snapshot(Trend::Bearish);
    s.momentum = Reading::Value(25.0);
    s.macd = Reading::Value(-3.0);
    let result = decide(&s, None, None, None);
    assert_eq!(result.direction, SignalDirection::Short);
    assert_eq!(result.confidence, 50);
}

/// Zero votes default to Long at 50%. The choice is arbitrary and kept only
/// for compatibility with existing consumers.
#[test]
fn test_known_arbitrary_default_without_votes() {
    let result = decide(&blank_snapshot(Trend::Bullish), None, None, None);
    assert_eq!(result.signal, TradeSignal::Hold);
    assert_eq!(result.reason, DecisionReason::InsufficientData);
    assert_eq!(result.direction, SignalDirection::Long);
    assert_eq!(result.confidence, 50);
}

#[test]
fn test_empty_history_has_no_risk_anchors() {
    let s = blank_snapshot(Trend::Bearish);
    assert!(s.ema50.is_insufficient());
    assert!(s.ema100.is_insufficient());
    assert!(s.ema200.is_insufficient());
    let result = decide(&s, None, None, None);
    assert_eq!(result.stop_loss, None);
    assert_eq!(result.take_profit, None);
    assert_eq!(result.leverage, LeverageBand::ADVISORY);
}

#[test]
fn test_risk_anchors_prefer_tighter_support() {
    let (sl, tp) = risk_anchors(Some(100.0), Some(2.0), Some(98.0)).unwrap();
    assert!(close(sl, 2.0));
    assert!(close(tp, 4.0));
}

#[test]
fn test_risk_anchors_use_atr_when_support_is_far() {
    let (sl, tp) = risk_anchors(Some(100.0), Some(2.0), Some(80.0)).unwrap();
    assert!(close(sl, 3.0));
    assert!(close(tp, 6.0));
}

#[test]
fn test_risk_anchors_fall_back_to_percentage() {
    let (sl, _) = risk_anchors(Some(100.0), None, None).unwrap();
    assert!(close(sl, 1.5));
}

#[test]
fn test_stop_loss_never_below_half_percent() {
    let (sl, tp) = risk_anchors(Some(100.0), None, Some(99.9)).unwrap();
    assert!(close(sl, 0.5));
    assert!(close(tp, 1.0));
}

#[test]
fn test_unknown_or_invalid_price_has_no_anchors() {
    assert!(risk_anchors(None, Some(2.0), Some(98.0)).is_none());
    assert!(risk_anchors(Some(0.0), Some(2.0), None).is_none());
    assert!(risk_anchors(Some(f64::NAN), None, None).is_none());
}

#[test]
fn test_resistance_does_not_move_anchors() {
    let mut s = bullish_stack(Trend::Bullish);
    s.atr = Some(2.0);
    let without = decide(&s, Some(100.0), Some(97.0), None);
    let with = decide(&s, Some(100.0), Some(97.0), Some(101.0));
    assert_eq!(without, with);
}

#[test]
fn test_decide_snapshot_uses_snapshot_levels() {
    let mut s = bullish_stack(Trend::Bullish);
    s.last_price = Some(100.0);
    s.support = Some(98.0);
    s.atr = Some(2.0);
    let result = decide_snapshot(&s);
    assert!(close(result.stop_loss.unwrap(), 2.0));
    assert!(close(result.take_profit.unwrap(), 4.0));
}

#[test]
fn test_decision_is_deterministic() {
    let mut s = bullish_stack(Trend::Bullish);
    s.atr = Some(1.25);
    let a = decide(&s, Some(101.0), Some(99.0), Some(104.0));
    let b = decide(&s, Some(101.0), Some(99.0), Some(104.0));
    assert_eq!(a, b);
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn test_confidence_and_anchor_bounds_hold_across_inputs() {
    let rsis = [None, Some(10.0), Some(50.0), Some(90.0)];
    let macds = [None, Some(-1.0), Some(0.0), Some(1.0)];
    let overlays = [None, Some(Vote::Buy), Some(Vote::Sell)];
    let trends = [Trend::Bullish, Trend::Bearish];

    for rsi in rsis {
        for macd in macds {
            for overlay in overlays {
                for trend in trends {
                    let mut s = blank_snapshot(trend);
                    s.momentum = Reading::from_option(rsi);
                    s.macd = Reading::from_option(macd);
                    s.supertrend_vote = overlay;
                    s.atr = Some(0.2);
                    let r = decide(&s, Some(250.0), Some(249.0), None);
                    assert!((50..=100).contains(&r.confidence));
                    let sl = r.stop_loss.unwrap();
                    assert!(sl >= 250.0 * 0.005 - 1e-12);
                    assert!(close(r.take_profit.unwrap(), 2.0 * sl));
                }
            }
        }
    }
}
