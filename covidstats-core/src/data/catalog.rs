//! Location catalog: the read-only reference dataset keyed by location code.
//!
//! Loaded once at startup and shared (behind an `Arc`) by every stat source.

use crate::domain::LocationMeta;
use crate::error::StatError;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// On-disk shape of the reference dataset.
#[derive(Debug, Deserialize)]
struct GlobalDataset {
    #[serde(default)]
    time: Option<DateTime<Utc>>,
    #[serde(default)]
    version: Option<u32>,
    globals: HashMap<String, LocationMeta>,
}

/// A user-visible label and the code it resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationLabel {
    pub label: String,
    pub code: String,
}

#[derive(Debug, Clone, Default)]
pub struct LocationCatalog {
    generated_at: Option<DateTime<Utc>>,
    entries: HashMap<String, LocationMeta>,
    listing: Vec<LocationLabel>,
}

impl LocationCatalog {
    pub fn from_entries(entries: impl IntoIterator<Item = LocationMeta>) -> Self {
        let entries: HashMap<String, LocationMeta> =
            entries.into_iter().map(|m| (m.code.clone(), m)).collect();
        let listing = build_listing(&entries);
        Self {
            generated_at: None,
            entries,
            listing,
        }
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, StatError> {
        let dataset: GlobalDataset =
            serde_json::from_slice(bytes).map_err(|e| StatError::Catalog(e.to_string()))?;
        if let Some(version) = dataset.version {
            log::debug!("reference dataset version {version}");
        }
        let mut catalog = Self::from_entries(dataset.globals.into_iter().map(|(code, mut meta)| {
            meta.code = code;
            meta
        }));
        catalog.generated_at = dataset.time;
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self, StatError> {
        let bytes = std::fs::read(path)
            .map_err(|e| StatError::Catalog(format!("read {}: {e}", path.display())))?;
        let catalog = Self::from_json(&bytes)?;
        log::debug!(
            "loaded {} locations from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn get(&self, code: &str) -> Result<&LocationMeta, StatError> {
        self.entries
            .get(code)
            .ok_or_else(|| StatError::LocationNotFound {
                code: code.to_string(),
            })
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entries.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// When the dataset was generated, if it says.
    pub fn generated_at(&self) -> Option<DateTime<Utc>> {
        self.generated_at
    }

    /// Every location, labelled and sorted by country, province, admin area.
    pub fn listing(&self) -> &[LocationLabel] {
        &self.listing
    }

    /// Entries whose label contains every whitespace-separated chunk of
    /// `query`, case-insensitively. An empty query matches everything.
    pub fn search(&self, query: &str) -> Vec<&LocationLabel> {
        let chunks: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        self.listing
            .iter()
            .filter(|entry| {
                let label = entry.label.to_lowercase();
                chunks.iter().all(|chunk| label.contains(chunk.as_str()))
            })
            .collect()
    }
}

fn build_listing(entries: &HashMap<String, LocationMeta>) -> Vec<LocationLabel> {
    let mut sorted: Vec<(String, &String, &LocationMeta)> = entries
        .iter()
        .map(|(code, meta)| (meta.sort_key(), code, meta))
        .collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
    sorted
        .into_iter()
        .map(|(_, code, meta)| LocationLabel {
            label: meta.display_label(),
            code: code.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATASET: &str = r#"{
        "time": "2020-10-16T00:00:00Z",
        "version": 1,
        "globals": {
            "Massachusetts": {"title":"Massachusetts","proviceState":"Massachusetts","countryRegion":"US","lat":"42.23","long":"-71.53"},
            "25025.0": {"title":"Suffolk","admin":"Suffolk","proviceState":"Massachusetts","countryRegion":"US"},
            "Mexico": {"title":"Mexico","proviceState":"","countryRegion":"Mexico"},
            "Ontario": {"title":"Ontario","proviceState":"Ontario","countryRegion":"Canada"}
        }
    }"#;

    fn catalog() -> LocationCatalog {
        LocationCatalog::from_json(DATASET.as_bytes()).unwrap()
    }

    #[test]
    fn lookup_fills_code() {
        let c = catalog();
        assert_eq!(c.len(), 4);
        assert_eq!(c.get("25025.0").unwrap().code, "25025.0");
        assert_eq!(c.get("Massachusetts").unwrap().latitude, Some(42.23));
        assert!(c.generated_at().is_some());
    }

    #[test]
    fn missing_code_is_not_found() {
        assert_eq!(
            catalog().get("Atlantis").unwrap_err(),
            StatError::LocationNotFound {
                code: "Atlantis".into()
            }
        );
    }

    #[test]
    fn listing_is_sorted_by_country() {
        let c = catalog();
        let labels: Vec<&str> = c.listing().iter().map(|l| l.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Ontario, Canada",
                "Mexico",
                "Massachusetts, US",
                "Suffolk, Massachusetts, US",
            ]
        );
    }

    #[test]
    fn search_matches_every_chunk() {
        let c = catalog();
        let hits = c.search("mass SUF");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].code, "25025.0");

        assert_eq!(c.search("massachusetts").len(), 2);
        assert_eq!(c.search("").len(), 4);
        assert!(c.search("nowhere").is_empty());
    }

    #[test]
    fn malformed_dataset_is_an_error() {
        assert!(matches!(
            LocationCatalog::from_json(b"{}"),
            Err(StatError::Catalog(_))
        ));
    }
}
