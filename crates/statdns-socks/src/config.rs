//! Proxy configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use statdns_core::LoggingConfig;
use statdns_core::defaults::{
    default_connect_timeout_secs, default_handshake_timeout_secs, default_idle_timeout_secs,
    default_listen_addr,
};
use statdns_dns::DnsConfig;

use crate::error::ProxyError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default)]
    pub proxy: ProxySettings,
    /// Remote lookup service used for every hostname.
    #[serde(default)]
    pub dns: DnsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// SOCKS5 listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxySettings {
    /// Local SOCKS5 listen address, e.g. "127.0.0.1:9001".
    #[serde(default = "default_listen_addr")]
    pub listen: String,

    /// Time allowed for method negotiation plus the request.
    #[serde(default = "default_handshake_timeout_secs")]
    pub handshake_timeout_secs: u64,

    /// Time allowed for the outbound TCP connect.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Relay idle timeout.
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
            handshake_timeout_secs: default_handshake_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            idle_timeout_secs: default_idle_timeout_secs(),
        }
    }
}

impl ProxySettings {
    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.handshake_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

/// Load configuration from a file path.
///
/// Supports TOML, JSON, and JSONC formats (detected by extension).
pub fn load_proxy_config(path: &Path) -> Result<ProxyConfig, ProxyError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ProxyError::Config(format!("failed to read config: {e}")))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "json" | "jsonc" => {
            let stripped = json_comments::StripComments::new(content.as_bytes());
            serde_json::from_reader(stripped)
                .map_err(|e| ProxyError::Config(format!("JSON parse error: {e}")))
        }
        _ => toml::from_str(&content)
            .map_err(|e| ProxyError::Config(format!("TOML parse error: {e}"))),
    }
}

/// Reject configurations the proxy cannot run with.
pub fn validate_config(config: &ProxyConfig) -> Result<(), ProxyError> {
    if config.proxy.listen.trim().is_empty() {
        return Err(ProxyError::Config("proxy.listen is empty".into()));
    }
    if config.proxy.handshake_timeout_secs == 0 {
        return Err(ProxyError::Config(
            "proxy.handshake_timeout_secs must be > 0".into(),
        ));
    }
    if config.proxy.connect_timeout_secs == 0 {
        return Err(ProxyError::Config(
            "proxy.connect_timeout_secs must be > 0".into(),
        ));
    }
    if config.proxy.idle_timeout_secs == 0 {
        return Err(ProxyError::Config(
            "proxy.idle_timeout_secs must be > 0".into(),
        ));
    }
    config
        .dns
        .validate()
        .map_err(|e| ProxyError::Config(e.to_string()))
}
