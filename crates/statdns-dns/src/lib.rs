//! Name resolution through a remote HTTP DNS lookup service.
//!
//! Instead of the local system resolver, every hostname is looked up by
//! fetching `{base_url}/{hostname}/a` from a JSON lookup service (by default
//! [StatDNS](http://api.statdns.com)). The first answer that is not an alias
//! (`CNAME`) record is returned as the address.
//!
//! # Usage
//!
//! ```rust,no_run
//! use statdns_dns::{DnsConfig, Resolve, StatDnsResolver};
//!
//! # async fn example() -> Result<(), statdns_dns::DnsError> {
//! let config = DnsConfig::default();
//! let resolver = StatDnsResolver::new(&config)?;
//!
//! let ip = resolver.resolve("example.com").await?;
//! println!("resolved: {ip}");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod record;
pub mod resolver;

pub use client::{HttpLookupClient, LookupClient};
pub use config::DnsConfig;
pub use error::DnsError;
pub use record::{DnsAnswer, DnsQuestion, DnsResult};
pub use resolver::{Resolve, StatDnsResolver};
