//! Upstream exporter scrape.
//!
//! Fetches the co-located exporter's `/metrics` payload as opaque text. The
//! payload is forwarded verbatim; the agent never parses it.

use std::time::Duration;

/// Error type for upstream scrape failures. Recoverable per cycle.
#[derive(Debug)]
pub enum ScrapeError {
    /// Transport-level failure (connect, timeout, read).
    Transport(reqwest::Error),
    /// The exporter answered with a non-success status.
    Status(reqwest::StatusCode),
}

impl std::fmt::Display for ScrapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScrapeError::Transport(e) => write!(f, "upstream scrape failed: {}", e),
            ScrapeError::Status(status) => {
                write!(f, "upstream scrape returned status {}", status)
            }
        }
    }
}

impl std::error::Error for ScrapeError {}

impl From<reqwest::Error> for ScrapeError {
    fn from(e: reqwest::Error) -> Self {
        ScrapeError::Transport(e)
    }
}

/// Source of the upstream metrics payload.
pub trait Upstream {
    /// Fetches the current payload, or fails for this cycle.
    fn fetch(&self) -> Result<String, ScrapeError>;
}

/// HTTP scraper against a fixed local exporter URL.
pub struct UpstreamScraper {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl UpstreamScraper {
    /// Creates a scraper with a bounded per-request timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

impl Upstream for UpstreamScraper {
    fn fetch(&self) -> Result<String, ScrapeError> {
        let response = self.client.get(&self.endpoint).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status(status));
        }
        Ok(response.text()?)
    }
}
