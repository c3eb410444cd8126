//! Trend smoothing: 7-day SMA to flatten day-of-week reporting noise, then a
//! light EMA on top. The EMA weight is kept high because the SMA already
//! introduces lag.

use super::{ema, sma};

/// SMA window, in days.
pub const SMA_WINDOW: usize = 7;

/// Weight of the newest sample in the EMA pass.
pub const EMA_WEIGHT: f64 = 0.3;

/// SMA(7) followed by EMA(0.3), rounded to the nearest integer.
///
/// Output length always equals input length.
pub fn smooth(series: &[i64]) -> Vec<i64> {
    let values: Vec<f64> = series.iter().map(|&v| v as f64).collect();
    ema(&sma(&values, SMA_WINDOW), EMA_WEIGHT)
        .into_iter()
        .map(|v| v.round() as i64)
        .collect()
}
