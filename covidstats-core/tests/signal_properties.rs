//! Property tests for the signal transforms.
//!
//! Uses proptest to verify:
//! 1. Length — `delta` drops exactly one sample, `smooth` keeps every sample
//! 2. Inverse — `delta` undoes a running sum
//! 3. Convergence — a constant series smooths to that constant

use covidstats_core::signal::{delta, normalize, smooth};
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_series() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(-1_000_000i64..1_000_000, 1..200)
}

fn arb_daily_counts() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(0i64..50_000, 1..120)
}

proptest! {
    #[test]
    fn delta_is_one_shorter(series in arb_series()) {
        prop_assert_eq!(delta(&series).unwrap().len(), series.len() - 1);
    }

    #[test]
    fn smooth_keeps_length(series in arb_series()) {
        prop_assert_eq!(smooth(&series).len(), series.len());
    }

    #[test]
    fn delta_inverts_running_sum(daily in arb_daily_counts()) {
        let cumulative: Vec<i64> = daily
            .iter()
            .scan(0i64, |acc, &d| {
                *acc += d;
                Some(*acc)
            })
            .collect();
        prop_assert_eq!(delta(&cumulative).unwrap(), daily[1..].to_vec());
    }

    #[test]
    fn constant_series_converges(k in -10_000i64..10_000, len in 64usize..128) {
        let out = smooth(&vec![k; len]);
        prop_assert_eq!(*out.last().unwrap(), k);
    }

    #[test]
    fn smoothing_stays_within_input_range(daily in arb_daily_counts()) {
        // The EMA seed is zero, so the lower bound is min(0, min(input)).
        let lo = daily.iter().copied().min().unwrap().min(0);
        let hi = daily.iter().copied().max().unwrap().max(0);
        for v in smooth(&daily) {
            prop_assert!(v >= lo && v <= hi, "{v} outside [{lo}, {hi}]");
        }
    }

    #[test]
    fn normalize_is_bounded(series in arb_series(), count in 1usize..40) {
        let out = normalize(&series, count);
        prop_assert_eq!(out.len(), series.len().min(count));
        for v in out {
            prop_assert!((0.0..=1.0).contains(&v));
        }
    }
}

#[test]
fn constant_series_after_warmup() {
    // With k = 1 the EMA error 0.7^(i+1) drops below one half from i = 1.
    let out = smooth(&[1; 10]);
    assert!(out[1..].iter().all(|&v| v == 1), "{out:?}");
}
