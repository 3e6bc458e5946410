//! Resolution errors.

use std::time::Duration;

/// Errors from resolving a hostname through the lookup service.
#[derive(Debug, thiserror::Error)]
pub enum DnsError {
    /// The lookup request could not be completed.
    #[error("lookup request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The lookup service did not answer within the configured timeout.
    #[error("lookup request timed out after {0:?}")]
    Timeout(Duration),

    /// The lookup service answered with a non-success status
    /// (only reported when status checking is enabled).
    #[error("lookup service returned HTTP {0}")]
    Status(u16),

    /// The response body is not a lookup result.
    #[error("failed to decode lookup response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The lookup result contains no address record.
    #[error("no records exist for {0}")]
    NoRecords(String),

    /// The chosen address record does not hold an IP address.
    #[error("record for {name} has invalid address {rdata:?}")]
    InvalidRecord { name: String, rdata: String },

    /// The hostname cannot be looked up.
    #[error("invalid hostname: {0:?}")]
    InvalidName(String),

    /// The HTTP client could not be built.
    #[error("lookup client error: {0}")]
    Client(String),

    /// The lookup configuration is unusable.
    #[error("invalid lookup config: {0}")]
    Config(String),
}

impl DnsError {
    /// The lookup service was unreachable, slow, or refused the request.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout(_) | Self::Status(_))
    }

    /// The response body did not decode.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }

    /// The lookup succeeded but held no usable address record.
    pub fn is_no_records(&self) -> bool {
        matches!(self, Self::NoRecords(_))
    }
}
