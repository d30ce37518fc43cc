//! metricpush — host metrics push agent.
//!
//! Provides:
//! - `collector` — process table sampling via `ps aux`
//! - `exposition` — Prometheus text-format rendering of process gauges
//! - `scrape` — upstream exporter scrape (local `/metrics` endpoint)
//! - `push` — batch envelope and HTTP delivery to the remote collector
//! - `agent` — per-cycle pipeline and drift-corrected scheduling loop
//! - `config` — read-only agent configuration
//! - `util` — device IP discovery helpers

pub mod agent;
pub mod collector;
pub mod config;
pub mod exposition;
pub mod push;
pub mod scrape;
pub mod util;
