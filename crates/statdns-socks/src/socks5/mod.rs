//! SOCKS5 server-side protocol handling (RFC 1928, no-auth subset).

pub mod handshake;

pub use handshake::{Socks5Request, TargetAddr};
