//! # statdns
//!
//! A SOCKS5 proxy that resolves hostnames through a remote HTTP DNS lookup
//! service instead of the local system resolver.
//!
//! ## Crates
//!
//! - [`statdns_core`] - Default values, logging setup and relay primitives
//! - [`statdns_dns`] - Lookup client, response model and the pluggable resolver
//! - [`statdns_socks`] - SOCKS5 engine and CLI

pub use statdns_core as core;
pub use statdns_dns as dns;
pub use statdns_socks as socks;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use statdns_dns::{DnsConfig, DnsError, Resolve, StatDnsResolver};
    pub use statdns_socks::{CancellationToken, ProxyConfig, ProxyError, run, serve};
}
