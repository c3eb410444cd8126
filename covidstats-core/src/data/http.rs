//! HTTP snapshot transport.
//!
//! A plain GET of `{base_url}{code}`: no query parameters, no auth headers,
//! no retries. Each request runs on its own short-lived worker thread and
//! reports back through the completion callback.

use super::provider::{FetchCallback, FetchOutcome, SnapshotTransport};
use crate::error::StatError;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Default snapshot service.
pub const DEFAULT_BASE_URL: &str = "https://tirania.org/covid-data/";

pub struct HttpTransport {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, StatError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("covidstats/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StatError::Transport(format!("failed to build HTTP client: {e}")))?;

        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self { client, base_url })
    }

    /// URL of the envelope for `code`.
    pub fn snapshot_url(&self, code: &str) -> String {
        format!("{}{code}", self.base_url)
    }

    fn get(client: &reqwest::blocking::Client, url: &str) -> FetchOutcome {
        let resp = client
            .get(url)
            .send()
            .map_err(|e| StatError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(StatError::Transport(format!("HTTP {status} for {url}")));
        }

        let body = resp
            .bytes()
            .map_err(|e| StatError::Transport(format!("reading body of {url}: {e}")))?;

        Ok((!body.is_empty()).then(|| body.to_vec()))
    }
}

impl SnapshotTransport for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }

    fn fetch(&self, code: &str, on_complete: FetchCallback) {
        let client = self.client.clone();
        let url = self.snapshot_url(code);
        log::debug!("GET {url}");

        // Keep the callback reachable if the spawn itself fails so it still
        // runs exactly once.
        let slot = Arc::new(Mutex::new(Some(on_complete)));
        let worker_slot = slot.clone();

        let spawned = thread::Builder::new()
            .name(format!("covidstats-fetch-{code}"))
            .spawn(move || {
                let outcome = Self::get(&client, &url);
                let callback = worker_slot.lock().ok().and_then(|mut s| s.take());
                if let Some(callback) = callback {
                    callback(outcome);
                }
            });

        if let Err(e) = spawned {
            let callback = slot.lock().ok().and_then(|mut s| s.take());
            if let Some(callback) = callback {
                callback(Err(StatError::Transport(format!(
                    "failed to spawn fetch thread: {e}"
                ))));
            }
        }
    }
}
