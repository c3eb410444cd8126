//! Scale a series into `0.0..=1.0` for charting.

/// Map the last `count` values of `series` linearly onto `0.0..=1.0`.
///
/// A flat series maps to all zeros.
pub fn normalize(series: &[i64], count: usize) -> Vec<f64> {
    let tail = &series[series.len().saturating_sub(count)..];
    let (Some(&min), Some(&max)) = (tail.iter().min(), tail.iter().max()) else {
        return Vec::new();
    };
    let range = max as f64 - min as f64;
    if range == 0.0 {
        return vec![0.0; tail.len()];
    }
    tail.iter().map(|&v| (v as f64 - min as f64) / range).collect()
}
