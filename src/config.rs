//! Agent configuration.
//!
//! Built once at startup by the binary and treated as read-only by the core.

use std::time::Duration;

/// Read-only configuration for the push agent.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Remote collector endpoint receiving the JSON batch.
    pub remote_endpoint: String,
    /// Local exporter endpoint scraped each cycle.
    pub local_scrape_endpoint: String,
    /// IP address reported in the batch envelope as `target_ip`.
    pub device_ip: String,
    /// Push interval in seconds. Must be >= 1.
    pub period_seconds: u64,
    /// Program name reported in the batch envelope.
    pub program_label: String,
    /// Timeout applied to each HTTP call (scrape and push).
    pub http_timeout: Duration,
}

impl AgentConfig {
    /// Validates invariants that would otherwise surface as runtime misbehavior.
    pub fn validate(&self) -> Result<(), String> {
        if self.period_seconds == 0 {
            return Err("period must be at least 1 second".to_string());
        }
        if self.device_ip.is_empty() {
            return Err("device IP is empty".to_string());
        }
        if self.remote_endpoint.is_empty() {
            return Err("remote endpoint is empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AgentConfig {
        AgentConfig {
            remote_endpoint: "http://collector:8080/push".to_string(),
            local_scrape_endpoint: "http://localhost:9100/metrics".to_string(),
            device_ip: "10.1.2.3".to_string(),
            period_seconds: 60,
            program_label: "edge-node".to_string(),
            http_timeout: Duration::from_secs(10),
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn zero_period_rejected() {
        let mut config = base_config();
        config.period_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_device_ip_rejected() {
        let mut config = base_config();
        config.device_ip = String::new();
        assert!(config.validate().is_err());
    }
}
