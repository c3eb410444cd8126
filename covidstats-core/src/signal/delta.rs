//! Day-over-day differences of a cumulative series.

use crate::error::StatError;

/// `delta[i] = series[i + 1] - series[i]`.
///
/// The output is one element shorter than the input. Negative values are
/// kept: upstream corrections can lower a cumulative total. Differences
/// beyond the `i64` range saturate.
pub fn delta(series: &[i64]) -> Result<Vec<i64>, StatError> {
    if series.is_empty() {
        return Err(StatError::InvalidInput("delta of an empty series".into()));
    }
    Ok(series.windows(2).map(|w| w[1].saturating_sub(w[0])).collect())
}
