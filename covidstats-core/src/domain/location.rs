//! Location metadata from the bundled reference dataset.

use serde::{Deserialize, Deserializer, Serialize};

/// One tracked location.
///
/// The JSON field names follow the reference dataset (`admin`,
/// `proviceState`, `lat`, `long`). `code` is the key the entry is stored
/// under and is filled in by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationMeta {
    #[serde(skip)]
    pub code: String,
    #[serde(default)]
    pub title: String,
    /// County or other second-level area (US only).
    #[serde(rename = "admin", default)]
    pub admin_area: Option<String>,
    #[serde(rename = "proviceState", default)]
    pub province_or_state: Option<String>,
    #[serde(rename = "countryRegion", default)]
    pub country_region: String,
    #[serde(rename = "lat", default, deserialize_with = "coordinate")]
    pub latitude: Option<f64>,
    #[serde(rename = "long", default, deserialize_with = "coordinate")]
    pub longitude: Option<f64>,
}

impl LocationMeta {
    /// Caption and optional sub-caption shown for this location.
    ///
    /// US entries are either a state (no admin area) or a county within a
    /// state. Elsewhere the entry is a country or a province within one.
    pub fn captions(&self) -> (String, Option<String>) {
        let province = non_empty(&self.province_or_state);
        if self.country_region == "US" {
            match non_empty(&self.admin_area) {
                None => (province.unwrap_or_default().to_string(), None),
                Some(admin) => (admin.to_string(), province.map(str::to_string)),
            }
        } else {
            match province {
                None => (self.country_region.clone(), None),
                Some(province) => (province.to_string(), Some(self.country_region.clone())),
            }
        }
    }

    /// Label used in location listings and search: most specific first.
    pub fn display_label(&self) -> String {
        match (non_empty(&self.admin_area), non_empty(&self.province_or_state)) {
            (Some(admin), province) => format!(
                "{admin}, {}, {}",
                province.unwrap_or_default(),
                self.country_region
            ),
            (None, Some(province)) => format!("{province}, {}", self.country_region),
            (None, None) => self.country_region.clone(),
        }
    }

    /// Sort key for listings: country, then province, then admin area.
    pub fn sort_key(&self) -> String {
        format!(
            "{}, {}, {}",
            self.country_region,
            self.province_or_state.as_deref().unwrap_or_default(),
            self.admin_area.as_deref().unwrap_or_default()
        )
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Coordinates appear as strings in the dataset; accept numbers too.
fn coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
