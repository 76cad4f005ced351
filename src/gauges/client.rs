use crate::error::SyncError;
use crate::gauges::state::SyncState;
use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::env;
use std::time::Duration;

const DEFAULT_API_BASE: &str = "https://secure.gaug.es/gauges";
const TOKEN_HEADER: &str = "X-Gauges-Token";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// One raw per-day, per-path view delta as reported by the analytics API.
#[derive(Debug, Clone, Deserialize)]
pub struct PageHit {
    pub path: String,
    pub host: String,
    pub views: u64,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    content: Vec<PageHit>,
}

/// Seam between the sync engine and the transport. Production code talks to
/// the Gauges API; tests substitute a fake.
pub trait ViewSource {
    fn fetch(&self, date: NaiveDate) -> Result<Vec<PageHit>, SyncError>;
}

/// Blocking Gauges API client for a single gauge. Fetches exactly one
/// calendar date per call and never retries; retry policy belongs to the
/// caller.
#[derive(Debug)]
pub struct GaugesClient {
    http: Client,
    base_url: String,
    token: String,
    gauge_id: String,
}

fn resolve_api_base() -> String {
    match env::var("POPSYNC_API_BASE") {
        Ok(v) if !v.trim().is_empty() => v.trim().trim_end_matches('/').to_string(),
        _ => DEFAULT_API_BASE.to_string(),
    }
}

impl GaugesClient {
    pub fn new(state: &SyncState) -> Result<Self, SyncError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|err| SyncError::ConfigInvalid(format!("http client: {err}")))?;
        Ok(Self {
            http,
            base_url: resolve_api_base(),
            token: state.token.clone(),
            gauge_id: state.gauge_id.clone(),
        })
    }

    fn content_url(&self, date: NaiveDate) -> String {
        format!(
            "{}/{}/content?date={}",
            self.base_url,
            self.gauge_id,
            date.format("%Y-%m-%d")
        )
    }
}

impl ViewSource for GaugesClient {
    fn fetch(&self, date: NaiveDate) -> Result<Vec<PageHit>, SyncError> {
        let url = self.content_url(date);
        let response = self
            .http
            .get(&url)
            .header(TOKEN_HEADER, &self.token)
            .send()
            .map_err(|err| SyncError::Remote {
                date,
                reason: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Remote {
                date,
                reason: format!("{url} returned {status}"),
            });
        }

        let body = response.text().map_err(|err| SyncError::Remote {
            date,
            reason: err.to_string(),
        })?;
        parse_content(date, &body)
    }
}

fn parse_content(date: NaiveDate, body: &str) -> Result<Vec<PageHit>, SyncError> {
    let parsed: ContentResponse =
        serde_json::from_str(body).map_err(|err| SyncError::Parse {
            date,
            reason: err.to_string(),
        })?;
    Ok(parsed.content)
}
