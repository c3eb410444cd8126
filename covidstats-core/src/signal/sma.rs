//! Simple Moving Average (SMA) with a shrinking warm-up window.
//!
//! `out[i]` is the mean of `values[i+1-window..=i]`. Before a full window of
//! history exists, the mean covers only `values[0..=i]`, so the output has
//! no NaN warm-up region and is as long as the input.

/// Rolling mean over `window` samples.
pub fn sma(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut result = Vec::with_capacity(values.len());
    let mut sum = 0.0;

    for (i, &v) in values.iter().enumerate() {
        sum += v;
        if i >= window {
            sum -= values[i - window];
        }
        let len = (i + 1).min(window);
        result.push(sum / len as f64);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn sma_3_basic() {
        let result = sma(&[10.0, 11.0, 12.0, 13.0, 14.0], 3);
        assert_eq!(result.len(), 5);
        // Warm-up: mean of what is available
        assert_approx(result[0], 10.0, DEFAULT_EPSILON);
        assert_approx(result[1], 10.5, DEFAULT_EPSILON);
        // Full window from index 2
        assert_approx(result[2], 11.0, DEFAULT_EPSILON);
        assert_approx(result[3], 12.0, DEFAULT_EPSILON);
        assert_approx(result[4], 13.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_7_partial_window() {
        let values: Vec<f64> = (1..=9).map(|v| v as f64).collect();
        let result = sma(&values, 7);
        // mean(1..=6) = 3.5
        assert_approx(result[5], 3.5, DEFAULT_EPSILON);
        // mean(1..=7) = 4.0
        assert_approx(result[6], 4.0, DEFAULT_EPSILON);
        // mean(3..=9) = 6.0
        assert_approx(result[8], 6.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_1_is_identity() {
        let result = sma(&[100.0, 200.0, 300.0], 1);
        assert_eq!(result, vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn sma_empty() {
        assert!(sma(&[], 7).is_empty());
    }
}
