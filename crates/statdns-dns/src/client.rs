//! Remote lookup client: fetches raw response bodies from the lookup service.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use statdns_core::{PROJECT_NAME, VERSION};
use tracing::debug;

use crate::config::DnsConfig;
use crate::error::DnsError;

/// Fetches the body behind a fully formed lookup URL.
///
/// Implementations must be thread-safe (`Send + Sync`): the proxy calls the
/// resolver from one task per connection.
#[async_trait]
pub trait LookupClient: Send + Sync {
    /// Issue one GET for `url` and return the whole response body.
    async fn fetch(&self, url: &str) -> Result<Bytes, DnsError>;
}

#[async_trait]
impl<C: LookupClient + ?Sized> LookupClient for Arc<C> {
    #[inline]
    async fn fetch(&self, url: &str) -> Result<Bytes, DnsError> {
        (**self).fetch(url).await
    }
}

/// [`LookupClient`] backed by `reqwest`.
///
/// One request per call, no retries, no caching. The request is bounded by
/// `timeout`; dropping the returned future aborts it.
#[derive(Debug, Clone)]
pub struct HttpLookupClient {
    client: Client,
    timeout: Duration,
    check_status: bool,
}

impl HttpLookupClient {
    /// Build a client with the given request timeout.
    ///
    /// With `check_status` unset, non-2xx bodies are returned like any other.
    pub fn new(timeout: Duration, check_status: bool) -> Result<Self, DnsError> {
        // Lookups never go through an environment-configured proxy.
        let client = Client::builder()
            .user_agent(format!("{PROJECT_NAME}/{VERSION}"))
            .timeout(timeout)
            .no_proxy()
            .build()
            .map_err(|e| DnsError::Client(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            timeout,
            check_status,
        })
    }

    /// Build a client from lookup configuration.
    pub fn from_config(config: &DnsConfig) -> Result<Self, DnsError> {
        Self::new(config.timeout(), config.check_status)
    }

    fn classify(&self, err: reqwest::Error) -> DnsError {
        if err.is_timeout() {
            DnsError::Timeout(self.timeout)
        } else {
            DnsError::Transport(err)
        }
    }
}

#[async_trait]
impl LookupClient for HttpLookupClient {
    async fn fetch(&self, url: &str) -> Result<Bytes, DnsError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if self.check_status && !status.is_success() {
            return Err(DnsError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(|e| self.classify(e))?;
        debug!(url = %url, status = status.as_u16(), bytes = body.len(), "lookup fetched");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve `response` verbatim to every connection.
    async fn serve_raw(response: String) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let response = response.clone();
                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    let _ = stream.read(&mut buf).await;
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });
        addr
    }

    fn http_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    #[tokio::test]
    async fn fetch_returns_body() {
        let addr = serve_raw(http_response("200 OK", r#"{"answer":[]}"#)).await;
        let client = HttpLookupClient::new(Duration::from_secs(5), false).unwrap();

        let body = client
            .fetch(&format!("http://{addr}/example.com/a"))
            .await
            .unwrap();
        assert_eq!(&body[..], br#"{"answer":[]}"#);
    }

    #[tokio::test]
    async fn request_identifies_the_proxy() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let head = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let n = stream.read(&mut buf).await.unwrap();
            let _ = stream
                .write_all(http_response("200 OK", "{}").as_bytes())
                .await;
            String::from_utf8_lossy(&buf[..n]).to_ascii_lowercase()
        });

        let client = HttpLookupClient::new(Duration::from_secs(5), false).unwrap();
        client.fetch(&format!("http://{addr}/x/a")).await.unwrap();

        let head = head.await.unwrap();
        assert!(head.starts_with("get /x/a http/1.1\r\n"), "{head}");
        assert!(
            head.contains(&format!("user-agent: statdns/{VERSION}\r\n")),
            "{head}"
        );
    }

    #[tokio::test]
    async fn error_status_body_is_passed_through_by_default() {
        let addr = serve_raw(http_response("503 Service Unavailable", "try later")).await;
        let client = HttpLookupClient::new(Duration::from_secs(5), false).unwrap();

        let body = client.fetch(&format!("http://{addr}/x/a")).await.unwrap();
        assert_eq!(&body[..], b"try later");
    }

    #[tokio::test]
    async fn error_status_is_rejected_when_checked() {
        let addr = serve_raw(http_response("503 Service Unavailable", "try later")).await;
        let client = HttpLookupClient::new(Duration::from_secs(5), true).unwrap();

        let err = client.fetch(&format!("http://{addr}/x/a")).await.unwrap_err();
        assert!(matches!(err, DnsError::Status(503)));
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn refused_connection_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpLookupClient::new(Duration::from_secs(5), false).unwrap();
        let err = client.fetch(&format!("http://{addr}/x/a")).await.unwrap_err();
        assert!(matches!(err, DnsError::Transport(_)), "got {err:?}");
    }

    // A lookup service that accepts but never answers must not hang the caller.
    #[tokio::test]
    async fn silent_server_hits_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });

        let timeout = Duration::from_millis(200);
        let client = HttpLookupClient::new(timeout, false).unwrap();

        let started = tokio::time::Instant::now();
        let err = client.fetch(&format!("http://{addr}/x/a")).await.unwrap_err();
        assert!(matches!(err, DnsError::Timeout(t) if t == timeout), "got {err:?}");
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
