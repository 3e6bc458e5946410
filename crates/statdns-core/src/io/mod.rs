//! I/O utilities for relaying proxied connections.

mod relay;

pub use relay::{RelayStats, relay_bidirectional};
