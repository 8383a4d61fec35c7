//! Access log records as emitted by the proxy, one JSON object per line.

use std::io::BufRead;

use serde::{Deserialize, Serialize};

use super::DiscoveryError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessLog {
    /// Epoch milliseconds.
    pub timestamp: i64,
    /// Milliseconds.
    pub duration: u64,
    pub status_code: u16,
    pub method: String,
    /// Host and path, without scheme.
    pub url: String,
    #[serde(default)]
    pub consumer_tag: Option<String>,
    /// `type/version` of the client interceptor that reported the call.
    #[serde(default)]
    pub interceptor: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
    /// Calls made by the gateway itself.
    #[serde(default)]
    pub internal: bool,
}

impl AccessLog {
    /// URL without query string or fragment.
    pub fn path_url(&self) -> &str {
        self.url
            .split(|c: char| c == '?' || c == '#')
            .next()
            .unwrap_or_default()
    }
}

/// Decode JSON lines, skipping blank ones.
pub fn read_access_logs<R: BufRead>(reader: R) -> Result<Vec<AccessLog>, DiscoveryError> {
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| DiscoveryError::Decode {
            line: index + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}
