//! Helper utilities.

use std::io;
use std::process::Command;

/// Picks the first address in a `hostname -I` style listing that starts with
/// the given prefix.
pub fn pick_ip(output: &str, prefix: &str) -> Option<String> {
    output
        .split_whitespace()
        .find(|addr| addr.starts_with(prefix))
        .map(|addr| addr.to_string())
}

/// Discovers the device IP by prefix match over the host's address list.
pub fn discover_device_ip(prefix: &str) -> io::Result<Option<String>> {
    let output = Command::new("hostname").arg("-I").output()?;
    if !output.status.success() {
        return Err(io::Error::other(format!(
            "hostname -I exited with {}",
            output.status
        )));
    }
    let text = String::from_utf8_lossy(&output.stdout);
    Ok(pick_ip(&text, prefix))
}
