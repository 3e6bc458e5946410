//! Default configuration values.
//!
//! Centralized default constants for use across all crates.

// ============================================================================
// Lookup Service Defaults
// ============================================================================

/// Default base URL of the HTTP DNS lookup service.
pub const DEFAULT_LOOKUP_BASE_URL: &str = "http://api.statdns.com";
/// Path segment selecting A records on the lookup service.
pub const LOOKUP_RECORD_PATH: &str = "a";
/// Record type of alias answers, skipped when scanning for an address.
pub const ALIAS_RECORD_TYPE: &str = "CNAME";
/// Default lookup request timeout in seconds.
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// Proxy Defaults
// ============================================================================

/// Default SOCKS5 listen address.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:9001";
/// Default SOCKS5 handshake timeout in seconds.
pub const DEFAULT_HANDSHAKE_TIMEOUT_SECS: u64 = 10;
/// Default outbound TCP connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// Default relay idle timeout in seconds.
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;
/// Default relay buffer size (16 KiB).
pub const DEFAULT_RELAY_BUFFER_SIZE: usize = 16384;

// ============================================================================
// Serde default functions
// ============================================================================

pub fn default_lookup_base_url() -> String {
    DEFAULT_LOOKUP_BASE_URL.to_string()
}

pub fn default_lookup_timeout_secs() -> u64 {
    DEFAULT_LOOKUP_TIMEOUT_SECS
}

pub fn default_listen_addr() -> String {
    DEFAULT_LISTEN_ADDR.to_string()
}

pub fn default_handshake_timeout_secs() -> u64 {
    DEFAULT_HANDSHAKE_TIMEOUT_SECS
}

pub fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

pub fn default_idle_timeout_secs() -> u64 {
    DEFAULT_IDLE_TIMEOUT_SECS
}
