//! Unit tests for shared model types

use serde_json::json;
use signalcast::models::{Horizons, Reading, Recommendation, Timeframe, Trend};

#[test]
fn test_reading_collapses_non_finite_values() {
    assert_eq!(Reading::new(f64::NAN), Reading::InsufficientData);
    assert_eq!(Reading::new(f64::INFINITY), Reading::InsufficientData);
    assert_eq!(Reading::from_option(None), Reading::InsufficientData);
    assert_eq!(Reading::new(42.0).value(), Some(42.0));
}

#[test]
fn test_reading_serializes_marker_as_string() {
    assert_eq!(serde_json::to_value(Reading::Value(1.5)).unwrap(), json!(1.5));
    assert_eq!(
        serde_json::to_value(Reading::InsufficientData).unwrap(),
        json!("insufficient_data")
    );
    let parsed: Reading = serde_json::from_value(json!("insufficient_data")).unwrap();
    assert!(parsed.is_insufficient());
    assert!(serde_json::from_value::<Reading>(json!("n/a")).is_err());
}

#[test]
fn test_reading_display() {
    assert_eq!(Reading::Value(64.123).to_string(), "64.12");
    assert_eq!(Reading::InsufficientData.to_string(), "insufficient data");
}

#[test]
fn test_timeframe_parsing() {
    assert_eq!("15m".parse::<Timeframe>().unwrap(), Timeframe::M15);
    assert_eq!("1H".parse::<Timeframe>().unwrap(), Timeframe::H1);
    assert_eq!("4h".parse::<Timeframe>().unwrap(), Timeframe::H4);
    assert!("2h".parse::<Timeframe>().is_err());
    assert_eq!(Timeframe::H4.to_string(), "4h");
    assert_eq!(serde_json::to_value(Timeframe::M15).unwrap(), json!("15m"));
}

#[test]
fn test_timeframe_upstream_mappings() {
    assert_eq!(Timeframe::M15.binance_interval(), "15m");
    assert_eq!(Timeframe::H1.tradingview_suffix(), "|60");
    assert_eq!(Timeframe::H4.tradingview_suffix(), "|240");
    assert_eq!(Timeframe::D1.tradingview_suffix(), "");
}

#[test]
fn test_default_horizons() {
    assert_eq!(
        Horizons::default().as_array(),
        [Timeframe::M15, Timeframe::H1, Timeframe::H4]
    );
}

#[test]
fn test_recommendation_thresholds() {
    assert_eq!(Recommendation::from_score(0.6), Recommendation::StrongBuy);
    assert_eq!(Recommendation::from_score(0.5), Recommendation::Buy);
    assert_eq!(Recommendation::from_score(0.1), Recommendation::Neutral);
    assert_eq!(Recommendation::from_score(-0.1), Recommendation::Neutral);
    assert_eq!(Recommendation::from_score(-0.5), Recommendation::Sell);
    assert_eq!(Recommendation::from_score(-0.51), Recommendation::StrongSell);
}

#[test]
fn test_trend_from_moving_average_counts() {
    assert_eq!(Trend::from_counts(8, 6), Trend::Bullish);
    assert_eq!(Trend::from_counts(6, 8), Trend::Bearish);
    // An even split is not bullish.
    assert_eq!(Trend::from_counts(7, 7), Trend::Bearish);
}
