//! HTTP catalog provider for the Art Institute of Chicago public API.
//!
//! `GET {base}/artworks/{external_id}` answers with `{"data": {...}}` for known
//! artworks and 404 for unknown ones.

use crate::catalog::{CatalogLookup, CatalogProvider};
use crate::model::place::ExternalId;
use log::{debug, warn};
use serde_json::Value;
use std::time::{Duration, Instant};

pub const DEFAULT_CATALOG_API_BASE: &str = "https://api.artic.edu/api/v1";
pub const DEFAULT_CATALOG_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("tripplan/", env!("CARGO_PKG_VERSION"));

/// Blocking catalog client with bounded timeouts.
pub struct HttpCatalogProvider {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpCatalogProvider {
    /// Creates a provider for `base_url` with the given per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .timeout_write(timeout)
            .user_agent(USER_AGENT)
            .build();
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { agent, base_url }
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn artwork_url(&self, external_id: ExternalId) -> String {
        format!("{}/artworks/{external_id}", self.base_url)
    }
}

impl CatalogProvider for HttpCatalogProvider {
    fn lookup(&self, external_id: ExternalId) -> CatalogLookup {
        let started_at = Instant::now();
        let outcome = match self.agent.get(&self.artwork_url(external_id)).call() {
            Ok(response) => match response.into_json::<Value>() {
                Ok(body) => lookup_from_body(&body),
                Err(err) => CatalogLookup::Unreachable(format!("malformed body: {err}")),
            },
            Err(ureq::Error::Status(404, _)) => CatalogLookup::NotFound,
            Err(ureq::Error::Status(status, _)) => {
                CatalogLookup::Unreachable(format!("unexpected status {status}"))
            }
            Err(ureq::Error::Transport(transport)) => {
                CatalogLookup::Unreachable(format!("transport: {}", transport.kind()))
            }
        };

        match &outcome {
            CatalogLookup::Unreachable(reason) => warn!(
                "event=catalog_lookup module=catalog status=error external_id={external_id} duration_ms={} error_code=catalog_unreachable error={reason}",
                started_at.elapsed().as_millis()
            ),
            other => debug!(
                "event=catalog_lookup module=catalog status=ok external_id={external_id} outcome={} duration_ms={}",
                other.as_str(),
                started_at.elapsed().as_millis()
            ),
        }
        outcome
    }
}

fn lookup_from_body(body: &Value) -> CatalogLookup {
    match body.get("data") {
        Some(Value::Null) | None => CatalogLookup::NotFound,
        Some(_) => CatalogLookup::Found,
    }
}
