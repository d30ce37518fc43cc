//! In-memory process source for testing the sampler without running `ps`.

use crate::collector::traits::ProcessSource;
use std::io;

/// Process source that returns canned `ps aux` output.
#[derive(Debug, Clone, Default)]
pub struct MockProcessSource {
    output: Option<String>,
}

impl MockProcessSource {
    /// Creates a source that fails every listing attempt.
    pub fn failing() -> Self {
        Self { output: None }
    }

    /// Creates a source returning the given listing verbatim.
    pub fn with_output(output: impl Into<String>) -> Self {
        Self {
            output: Some(output.into()),
        }
    }

    /// Canned listing resembling a small idle system.
    pub fn typical_system() -> Self {
        Self::with_output(
            "USER         PID %CPU %MEM    VSZ   RSS TTY      STAT START   TIME COMMAND\n\
             root           1  0.0  0.1 168404 11808 ?        Ss   Jan01   1:02 /sbin/init\n\
             root         812  0.3  1.2  15420  8912 ?        Ss   Jan01   0:00 /usr/sbin/sshd -D\n\
             daemon       944  0.0  0.0   3996  2180 ?        Ss   Jan01   0:00 /usr/sbin/atd -f\n",
        )
    }
}

impl ProcessSource for MockProcessSource {
    fn list_processes(&self) -> io::Result<String> {
        match &self.output {
            Some(text) => Ok(text.clone()),
            None => Err(io::Error::other("mock process source failure")),
        }
    }
}
