//! Pluggable resolver trait and the lookup-service implementation.

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use statdns_core::defaults::LOOKUP_RECORD_PATH;
use tracing::debug;

use crate::client::{HttpLookupClient, LookupClient};
use crate::config::DnsConfig;
use crate::error::DnsError;
use crate::record::DnsResult;

/// Name resolution strategy used by the proxy engine.
///
/// Implementations must be thread-safe (`Send + Sync`) as they are called
/// concurrently from every connection task.
#[async_trait]
pub trait Resolve: Send + Sync {
    /// Resolve `name` to a single IP address.
    async fn resolve(&self, name: &str) -> Result<IpAddr, DnsError>;
}

#[async_trait]
impl<R: Resolve + ?Sized> Resolve for Arc<R> {
    #[inline]
    async fn resolve(&self, name: &str) -> Result<IpAddr, DnsError> {
        (**self).resolve(name).await
    }
}

#[async_trait]
impl<R: Resolve + ?Sized> Resolve for Box<R> {
    #[inline]
    async fn resolve(&self, name: &str) -> Result<IpAddr, DnsError> {
        (**self).resolve(name).await
    }
}

/// Resolver that asks the remote lookup service for A records.
///
/// Stateless between calls: every `resolve` fetches a fresh response, and
/// nothing is cached.
#[derive(Debug, Clone)]
pub struct StatDnsResolver<C = HttpLookupClient> {
    client: C,
    base_url: String,
}

impl StatDnsResolver<HttpLookupClient> {
    /// Build a resolver backed by [`HttpLookupClient`].
    pub fn new(config: &DnsConfig) -> Result<Self, DnsError> {
        config.validate()?;
        let client = HttpLookupClient::from_config(config)?;
        Ok(Self::with_client(client, &config.base_url))
    }
}

impl<C: LookupClient> StatDnsResolver<C> {
    /// Build a resolver around any [`LookupClient`].
    pub fn with_client(client: C, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    /// Lookup URL for `name`: `{base_url}/{name}/a`.
    pub fn lookup_url(&self, name: &str) -> Result<String, DnsError> {
        // Dot segments and backslashes are normalized away by URL parsing.
        if matches!(name, "" | "." | "..")
            || name.chars().any(|c| {
                matches!(c, '/' | '\\' | '?' | '#' | '%') || c.is_whitespace() || c.is_control()
            })
        {
            return Err(DnsError::InvalidName(name.to_string()));
        }
        Ok(format!("{}/{name}/{LOOKUP_RECORD_PATH}", self.base_url))
    }

    /// Fetch and decode the lookup result for `name`.
    pub async fn lookup(&self, name: &str) -> Result<DnsResult, DnsError> {
        let url = self.lookup_url(name)?;
        let body = self.client.fetch(&url).await?;
        DnsResult::from_slice(&body)
    }
}

#[async_trait]
impl<C: LookupClient> Resolve for StatDnsResolver<C> {
    async fn resolve(&self, name: &str) -> Result<IpAddr, DnsError> {
        let result = self.lookup(name).await?;

        let record = result
            .first_address_record()
            .ok_or_else(|| DnsError::NoRecords(name.to_string()))?;

        let ip = record
            .rdata
            .trim()
            .parse::<IpAddr>()
            .map_err(|_| DnsError::InvalidRecord {
                name: record.name.clone(),
                rdata: record.rdata.clone(),
            })?;

        debug!(host = %name, record = %record.name, ttl = record.ttl, ip = %ip, "dns resolved");
        Ok(ip)
    }
}
