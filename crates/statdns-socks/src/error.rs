//! Proxy error types.

use std::fmt;

use statdns_dns::DnsError;

/// Errors that can occur in the SOCKS5 proxy.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SOCKS5 error: {0}")]
    Socks5(Socks5Error),

    #[error("resolution failed: {0}")]
    Resolve(#[from] DnsError),

    #[error("config error: {0}")]
    Config(String),
}

/// SOCKS5 protocol errors.
#[derive(Debug)]
pub enum Socks5Error {
    InvalidVersion(u8),
    NoAcceptableMethods,
    UnsupportedCommand(u8),
    UnsupportedAddressType(u8),
    InvalidDomain,
    HandshakeTimeout,
    /// The client stream failed or ended mid-handshake.
    Io(std::io::Error),
}

impl fmt::Display for Socks5Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidVersion(v) => write!(f, "invalid SOCKS version: 0x{v:02x}"),
            Self::NoAcceptableMethods => write!(f, "no acceptable authentication methods"),
            Self::UnsupportedCommand(c) => write!(f, "unsupported command: 0x{c:02x}"),
            Self::UnsupportedAddressType(a) => write!(f, "unsupported address type: 0x{a:02x}"),
            Self::InvalidDomain => write!(f, "domain name is not valid UTF-8"),
            Self::HandshakeTimeout => write!(f, "handshake timed out"),
            Self::Io(e) => write!(f, "handshake I/O error: {e}"),
        }
    }
}

impl std::error::Error for Socks5Error {}

impl From<std::io::Error> for Socks5Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<Socks5Error> for ProxyError {
    fn from(e: Socks5Error) -> Self {
        Self::Socks5(e)
    }
}
