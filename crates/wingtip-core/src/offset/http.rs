//! Blocking HTTP document fetcher.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use super::source::DocumentFetcher;
use crate::error::{Error, Result};

/// Per-request timeout for offset documents
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Class dumps run to several megabytes, above ureq's default body limit
const MAX_DOCUMENT_BYTES: u64 = 64 * 1024 * 1024;

#[derive(Clone)]
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let user_agent = format!(
            "wingtip/{} ({})",
            env!("CARGO_PKG_VERSION"),
            std::env::consts::OS
        );
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .user_agent(user_agent)
            .build();
        Self {
            agent: config.into(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentFetcher for HttpFetcher {
    fn fetch_json(&self, document: &str, url: &str) -> Result<Value> {
        debug!(document, url, "GET");

        let mut response = self.agent.get(url).call().map_err(|e| Error::Http {
            document: document.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                document: document.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .body_mut()
            .with_config()
            .limit(MAX_DOCUMENT_BYTES)
            .read_to_string()
            .map_err(|e| Error::Http {
                document: document.to_string(),
                message: e.to_string(),
            })?;

        Ok(serde_json::from_str(&body)?)
    }
}
