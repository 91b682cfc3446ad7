//! Unit tests for the snapshot builder

use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::support::{candle_at, flat_candles, summary, trending_candles, StaticPrices, StaticSummaries};
use signalcast::error::ForecastError;
use signalcast::indicators::IndicatorCapabilities;
use signalcast::models::{Reading, Timeframe, Trend, Vote};
use signalcast::signals::decision::decide_snapshot;
use signalcast::signals::snapshot::{assemble, SnapshotBuilder};

fn builder(prices: StaticPrices, summaries: StaticSummaries, overlays: bool) -> SnapshotBuilder {
    SnapshotBuilder::new(
        Arc::new(prices),
        Arc::new(summaries),
        IndicatorCapabilities { overlays },
        300,
    )
}

#[tokio::test]
async fn test_snapshot_combines_summary_and_candles() {
    let b = builder(
        StaticPrices::new(trending_candles(250, 100.0, 1.0)),
        StaticSummaries::new(summary(Some(62.0), Some(1.5), 10, 4)),
        true,
    );

    let s = b.build("BTCUSDT", Timeframe::H1).await.unwrap();
    assert_eq!(s.symbol, "BTCUSDT");
    assert_eq!(s.timeframe, Timeframe::H1);
    assert_eq!(s.momentum, Reading::Value(62.0));
    assert_eq!(s.macd, Reading::Value(1.5));
    assert_eq!(s.trend, Trend::Bullish);
    assert!(s.ema50.value().is_some());
    assert!(s.ema200.value().is_some());
    assert_eq!(s.volume, Reading::Value(1_000.0));
    assert_eq!(s.avg_volume20, Reading::Value(1_000.0));
    assert!(s.atr.is_some());
    assert_eq!(s.supertrend_vote, Some(Vote::Buy));
    assert_eq!(s.parabolic_sar_vote, Some(Vote::Buy));
    assert_eq!(s.last_price, Some(349.0));
    assert!(s.support.unwrap() < s.resistance.unwrap());
}

#[tokio::test]
async fn test_summary_failure_is_data_unavailable() {
    let b = builder(
        StaticPrices::new(trending_candles(50, 100.0, 1.0)),
        StaticSummaries::new(summary(None, None, 0, 0)).failing_on(Timeframe::H4),
        true,
    );

    let err = b.build("ETHUSDT", Timeframe::H4).await.unwrap_err();
    match err {
        ForecastError::DataUnavailable {
            symbol, timeframe, ..
        } => {
            assert_eq!(symbol, "ETHUSDT");
            assert_eq!(timeframe, Timeframe::H4);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_price_history_failure_degrades_to_markers() {
    let prices = StaticPrices::failing();
    let b = builder(prices, StaticSummaries::new(summary(Some(30.0), None, 2, 9)), true);

    let s = b.build("BTCUSDT", Timeframe::M15).await.unwrap();
    assert_eq!(s.momentum, Reading::Value(30.0));
    assert!(s.ema50.is_insufficient());
    assert!(s.ema100.is_insufficient());
    assert!(s.ema200.is_insufficient());
    assert!(s.volume.is_insufficient());
    assert!(s.avg_volume20.is_insufficient());
    assert_eq!(s.atr, None);
    assert_eq!(s.supertrend_vote, None);
    assert_eq!(s.last_price, None);
    assert_eq!(s.support, None);
    assert_eq!(s.recent_support, None);
}

#[tokio::test]
async fn test_empty_history_matches_unavailable_history() {
    let summaries = summary(Some(55.0), Some(-0.2), 3, 3);
    let empty = builder(StaticPrices::new(Vec::new()), StaticSummaries::new(summaries.clone()), true)
        .build("BTCUSDT", Timeframe::H1)
        .await
        .unwrap();
    let failing = builder(StaticPrices::failing(), StaticSummaries::new(summaries), true)
        .build("BTCUSDT", Timeframe::H1)
        .await
        .unwrap();

    let mut empty = empty;
    empty.built_at = failing.built_at;
    assert_eq!(empty, failing);
}

#[tokio::test]
async fn test_candle_limit_is_forwarded() {
    let prices = Arc::new(StaticPrices::new(trending_candles(400, 100.0, 1.0)));
    let b = SnapshotBuilder::new(
        prices.clone(),
        Arc::new(StaticSummaries::new(summary(None, None, 0, 0))),
        IndicatorCapabilities::default(),
        120,
    );

    let s = b.build("BTCUSDT", Timeframe::H1).await.unwrap();
    assert_eq!(prices.calls.load(Ordering::SeqCst), 1);
    // 120 candles: enough for EMA100 but not EMA200.
    assert!(s.ema100.value().is_some());
    assert!(s.ema200.is_insufficient());
}

#[test]
fn test_overlays_skipped_when_capability_disabled() {
    let candles = trending_candles(100, 100.0, 1.0);
    let s = assemble(
        "BTCUSDT",
        Timeframe::H1,
        &summary(None, None, 0, 0),
        &candles,
        IndicatorCapabilities { overlays: false },
    );
    assert_eq!(s.atr, None);
    assert_eq!(s.supertrend_vote, None);
    assert_eq!(s.parabolic_sar_vote, None);
    assert!(s.ema50.value().is_some());
}

#[test]
fn test_stop_loss_anchors_on_whole_window_support() {
    let mut candles = flat_candles(300, 100.0, 1_000.0);
    candles[0] = candle_at(0, 100.0, 100.0, 50.0, 100.0, 1_000.0);
    for (i, candle) in candles.iter_mut().enumerate().skip(280) {
        *candle = candle_at(i, 100.0, 100.0, 99.9, 100.0, 1_000.0);
    }

    let s = assemble(
        "BTCUSDT",
        Timeframe::H1,
        &summary(None, None, 0, 0),
        &candles,
        IndicatorCapabilities { overlays: false },
    );
    assert_eq!(s.support, Some(50.0));
    assert_eq!(s.resistance, Some(100.0));
    assert_eq!(s.recent_support, Some(99.9));
    assert_eq!(s.recent_resistance, Some(100.0));

    // Support is 50 away, so the 1.5% volatility fallback is the tighter anchor.
    let result = decide_snapshot(&s);
    assert!((result.stop_loss.unwrap() - 1.5).abs() < 1e-9);
    assert!((result.take_profit.unwrap() - 3.0).abs() < 1e-9);
}
