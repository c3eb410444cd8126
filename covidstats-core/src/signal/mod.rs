//! Signal transforms over daily cumulative count series.
//!
//! Everything here is a pure function of its input: no I/O, no shared state.
//! The stat builder composes them as `delta(series)` for the raw daily
//! changes and `delta(smooth(series))` for the trend line.

pub mod delta;
pub mod ema;
pub mod normalize;
pub mod sma;
pub mod smooth;

pub use delta::delta;
pub use ema::ema;
pub use normalize::normalize;
pub use sma::sma;
pub use smooth::{smooth, EMA_WEIGHT, SMA_WINDOW};

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for signal tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
