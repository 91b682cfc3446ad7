//! Series math used by the indicator modules.

/// Simple moving average of the last `period` values.
pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Span-weighted exponential average, seeded with the first value and without
/// bias adjustment: `alpha = 2 / (span + 1)`.
pub fn ema_span(values: &[f64], span: usize) -> Option<f64> {
    if span == 0 {
        return None;
    }
    let (first, rest) = values.split_first()?;
    let alpha = 2.0 / (span as f64 + 1.0);
    Some(
        rest.iter()
            .fold(*first, |prev, value| alpha * value + (1.0 - alpha) * prev),
    )
}

pub fn true_range(high: f64, low: f64, prev_close: f64) -> f64 {
    let hl = high - low;
    let hc = (high - prev_close).abs();
    let lc = (low - prev_close).abs();
    hl.max(hc).max(lc)
}

/// Wilder smoothing over the whole series: seeded with the SMA of the first
/// `period` values, then `prev + (value - prev) / period`. Element `i` of the
/// output corresponds to input `i + period - 1`.
pub fn wilder_series(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }
    let seed = values[..period].iter().sum::<f64>() / period as f64;
    let mut out = Vec::with_capacity(values.len() - period + 1);
    out.push(seed);
    let mut prev = seed;
    for value in &values[period..] {
        prev += (value - prev) / period as f64;
        out.push(prev);
    }
    out
}
