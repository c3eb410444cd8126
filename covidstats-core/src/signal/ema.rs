//! Exponential Moving Average (EMA).
//!
//! Recursive: `EMA[t] = weight * x[t] + (1 - weight) * EMA[t-1]`, seeded
//! with `EMA[-1] = 0`. Seeding at zero means the first few outputs ramp up
//! from zero rather than starting at `x[0]`.

/// Exponential smoothing with the given weight for the newest sample.
pub fn ema(values: &[f64], weight: f64) -> Vec<f64> {
    let mut prev = 0.0;
    values
        .iter()
        .map(|&v| {
            let next = prev * (1.0 - weight) + v * weight;
            prev = next;
            next
        })
        .collect()
}
