//! Process table collection.
//!
//! The sampler reads the output of the system process listing and turns each
//! row into a [`ProcessRecord`]. The raw listing comes from a [`ProcessSource`]
//! so tests (and non-Unix development hosts) can substitute canned output for
//! a real `ps aux` invocation.

mod mock;
mod sampler;
mod traits;

pub use mock::MockProcessSource;
pub use sampler::{CollectError, ProcessRecord, ProcessSampler, truncate_command};
pub use traits::{ProcessSource, PsProcessSource, decode_listing};
