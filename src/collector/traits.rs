//! Abstraction over the process listing to enable testing and mocking.

use std::io;
use std::process::Command;

/// Produces the raw process-table text consumed by the sampler.
///
/// The production implementation shells out to `ps aux`; tests use
/// [`crate::collector::MockProcessSource`] with canned output.
pub trait ProcessSource {
    /// Returns the full process listing, header line included.
    fn list_processes(&self) -> io::Result<String>;
}

/// Real process source that invokes the system `ps aux`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PsProcessSource;

impl PsProcessSource {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessSource for PsProcessSource {
    fn list_processes(&self) -> io::Result<String> {
        let output = Command::new("ps").arg("aux").output()?;
        if !output.status.success() {
            return Err(io::Error::other(format!(
                "ps aux exited with {}",
                output.status
            )));
        }
        Ok(decode_listing(&output.stdout))
    }
}

/// Decodes raw `ps` output for parsing.
///
/// Command lines are raw bytes on Linux, so a single process with a
/// non-UTF-8 name must not invalidate the whole listing. Invalid sequences
/// become U+FFFD and only affect their own row's display text.
pub fn decode_listing(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
