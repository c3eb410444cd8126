//! Stat builder: location metadata + raw snapshot → `Stat`.

use crate::data::catalog::LocationCatalog;
use crate::domain::{LocationMeta, RawSnapshot, Stat};
use crate::error::StatError;
use crate::signal::{delta, smooth};
use chrono::{DateTime, Utc};

/// Derive a `Stat` from one snapshot.
///
/// Both cumulative series need at least two samples; the trend series are
/// `delta(smooth(cumulative))`, smoothing before differencing.
pub fn build_stat(
    meta: &LocationMeta,
    snapshot: &RawSnapshot,
    computed_at: DateTime<Utc>,
) -> Result<Stat, StatError> {
    let (total_cases, delta_cases) = last_two(&snapshot.cumulative_confirmed, "confirmed")?;
    let (total_deaths, delta_deaths) = last_two(&snapshot.cumulative_deaths, "deaths")?;
    let (caption, sub_caption) = meta.captions();

    Ok(Stat {
        computed_at,
        caption,
        sub_caption,
        total_cases,
        delta_cases,
        cases_series: snapshot.cumulative_confirmed.clone(),
        cases_delta_series: delta(&snapshot.cumulative_confirmed)?,
        cases_delta_smooth_series: delta(&smooth(&snapshot.cumulative_confirmed))?,
        total_deaths,
        delta_deaths,
        deaths_series: snapshot.cumulative_deaths.clone(),
        deaths_delta_series: delta(&snapshot.cumulative_deaths)?,
        deaths_delta_smooth_series: delta(&smooth(&snapshot.cumulative_deaths))?,
        latitude: meta.latitude,
        longitude: meta.longitude,
    })
}

/// Like [`build_stat`], but degenerate snapshots yield an empty placeholder
/// that still carries the location's captions.
pub fn build_stat_or_empty(
    meta: &LocationMeta,
    snapshot: &RawSnapshot,
    computed_at: DateTime<Utc>,
) -> Stat {
    match build_stat(meta, snapshot, computed_at) {
        Ok(stat) => stat,
        Err(e) => {
            log::warn!("{}: {e}; using empty stat", meta.code);
            placeholder(meta, computed_at)
        }
    }
}

/// Empty stat carrying the location's captions.
pub fn placeholder(meta: &LocationMeta, computed_at: DateTime<Utc>) -> Stat {
    let (caption, sub_caption) = meta.captions();
    Stat {
        caption,
        sub_caption,
        latitude: meta.latitude,
        longitude: meta.longitude,
        ..Stat::empty(computed_at)
    }
}

/// Look `code` up in the catalog and build its stat; an unknown code gives
/// an empty placeholder captioned with the code itself.
pub fn build_stat_for_code(
    catalog: &LocationCatalog,
    code: &str,
    snapshot: &RawSnapshot,
    computed_at: DateTime<Utc>,
) -> Stat {
    match catalog.get(code) {
        Ok(meta) => build_stat_or_empty(meta, snapshot, computed_at),
        Err(e) => {
            log::warn!("{e}; using empty stat");
            Stat {
                caption: code.to_string(),
                ..Stat::empty(computed_at)
            }
        }
    }
}

/// `(last, last - previous)` of a cumulative series.
fn last_two(series: &[i64], name: &str) -> Result<(i64, i64), StatError> {
    match series {
        [.., prev, last] => Ok((*last, last.saturating_sub(*prev))),
        _ => Err(StatError::InsufficientData(format!(
            "{name} series has {} sample(s), need at least 2",
            series.len()
        ))),
    }
}
