//! Lookup service configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use statdns_core::defaults::{default_lookup_base_url, default_lookup_timeout_secs};

use crate::error::DnsError;

/// Remote lookup service configuration.
///
/// When omitted from config files, all fields use defaults (StatDNS over
/// plain HTTP, 10 second timeout, HTTP status not checked).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsConfig {
    /// Base URL of the lookup service. The hostname and the `a` record path
    /// are appended to it: `{base_url}/{hostname}/a`.
    #[serde(default = "default_lookup_base_url")]
    pub base_url: String,

    /// Timeout for one lookup request (connect, headers and body), in seconds.
    #[serde(default = "default_lookup_timeout_secs")]
    pub timeout_secs: u64,

    /// Reject non-2xx responses with [`DnsError::Status`].
    ///
    /// Off by default: the body of an error response is handed to the JSON
    /// decoder and fails there as [`DnsError::Decode`].
    #[serde(default)]
    pub check_status: bool,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            base_url: default_lookup_base_url(),
            timeout_secs: default_lookup_timeout_secs(),
            check_status: false,
        }
    }
}

impl DnsConfig {
    /// Lookup request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check that the configuration is usable.
    pub fn validate(&self) -> Result<(), DnsError> {
        let base = self.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(DnsError::Config(format!(
                "dns.base_url must start with http:// or https://, got {base:?}"
            )));
        }
        if self.timeout_secs == 0 {
            return Err(DnsError::Config("dns.timeout_secs must be > 0".into()));
        }
        Ok(())
    }
}
