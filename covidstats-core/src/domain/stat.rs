//! The derived, display-ready record for one location.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Derived stats for one location at one point in time.
///
/// Rebuilt wholesale from a snapshot on every refresh; never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stat {
    pub computed_at: DateTime<Utc>,
    pub caption: String,
    pub sub_caption: Option<String>,

    pub total_cases: i64,
    /// New cases in the most recent day.
    pub delta_cases: i64,
    /// Cumulative cases, oldest first.
    pub cases_series: Vec<i64>,
    pub cases_delta_series: Vec<i64>,
    pub cases_delta_smooth_series: Vec<i64>,

    pub total_deaths: i64,
    pub delta_deaths: i64,
    pub deaths_series: Vec<i64>,
    pub deaths_delta_series: Vec<i64>,
    pub deaths_delta_smooth_series: Vec<i64>,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Stat {
    /// Placeholder rendered when a location is unknown or its data is too
    /// short to derive anything from.
    pub fn empty(computed_at: DateTime<Utc>) -> Self {
        Self {
            computed_at,
            caption: String::new(),
            sub_caption: None,
            total_cases: 0,
            delta_cases: 0,
            cases_series: Vec::new(),
            cases_delta_series: Vec::new(),
            cases_delta_smooth_series: Vec::new(),
            total_deaths: 0,
            delta_deaths: 0,
            deaths_series: Vec::new(),
            deaths_delta_series: Vec::new(),
            deaths_delta_smooth_series: Vec::new(),
            latitude: None,
            longitude: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cases_series.is_empty() && self.deaths_series.is_empty()
    }
}
