//! Batch envelope and delivery to the remote collector.
//!
//! Each cycle composes one immutable [`Batch`] and hands it to a [`Sink`].
//! Batches are never retained or queued; a failed delivery is simply retried
//! by the next cycle's fresh batch.

use crate::config::AgentConfig;
use serde::Serialize;

/// One outbound unit. Field names match the collector's wire format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Batch {
    pub target_ip: String,
    pub program: String,
    /// Upstream payload followed by locally rendered exposition text.
    pub metrics_str: String,
    /// Push interval in seconds, echoed so the collector can detect gaps.
    pub period: u64,
}

impl Batch {
    /// Composes a batch from the cycle's two text payloads and the envelope
    /// metadata. An empty combined payload is still a valid batch.
    pub fn compose(upstream_text: &str, local_text: &str, config: &AgentConfig) -> Self {
        Self {
            target_ip: config.device_ip.clone(),
            program: config.program_label.clone(),
            metrics_str: format!("{}{}", upstream_text, local_text),
            period: config.period_seconds,
        }
    }
}

/// Error type for delivery failures. Recoverable per cycle.
#[derive(Debug)]
pub enum DeliveryError {
    /// Transport-level failure (connect, timeout, write).
    Transport(reqwest::Error),
    /// The collector answered with a non-success status.
    Status(reqwest::StatusCode),
}

impl std::fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryError::Transport(e) => write!(f, "push failed: {}", e),
            DeliveryError::Status(status) => write!(f, "push returned status {}", status),
        }
    }
}

impl std::error::Error for DeliveryError {}

impl From<reqwest::Error> for DeliveryError {
    fn from(e: reqwest::Error) -> Self {
        DeliveryError::Transport(e)
    }
}

/// Destination for composed batches.
pub trait Sink {
    /// Delivers one batch, or fails for this cycle.
    fn deliver(&self, batch: &Batch) -> Result<(), DeliveryError>;
}

/// HTTP sink POSTing JSON batches to the remote collector.
pub struct HttpPusher {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpPusher {
    /// Creates a pusher with a bounded per-request timeout.
    pub fn new(
        endpoint: impl Into<String>,
        timeout: std::time::Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

impl Sink for HttpPusher {
    fn deliver(&self, batch: &Batch) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "*/*")
            .json(batch)
            .send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Status(status));
        }
        Ok(())
    }
}
