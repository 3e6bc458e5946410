//! SOCKS5 proxy whose hostname resolution is delegated to a pluggable resolver.
//!
//! The engine never touches the system resolver: destinations sent as domain
//! names are handed to the [`Resolve`] implementation given at startup
//! (normally [`statdns_dns::StatDnsResolver`]).

pub mod cli;
pub mod config;
mod error;
mod handler;
pub mod socks5;

pub use cli::ProxyArgs;
pub use config::{ProxyConfig, ProxySettings, load_proxy_config, validate_config};
pub use error::{ProxyError, Socks5Error};
pub use handler::{ProxyState, resolve_target};
pub use tokio_util::sync::CancellationToken;

use std::sync::Arc;

use statdns_dns::Resolve;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Bind the configured listen address and serve until `shutdown` fires.
pub async fn run(
    settings: &ProxySettings,
    resolver: Arc<dyn Resolve>,
    shutdown: CancellationToken,
) -> Result<(), ProxyError> {
    let listener = TcpListener::bind(&settings.listen).await?;
    info!(listen = %listener.local_addr()?, "statdns proxy started");
    serve(listener, settings, resolver, shutdown).await
}

/// Accept SOCKS5 connections on `listener`, one task per connection.
pub async fn serve(
    listener: TcpListener,
    settings: &ProxySettings,
    resolver: Arc<dyn Resolve>,
    shutdown: CancellationToken,
) -> Result<(), ProxyError> {
    let state = Arc::new(ProxyState {
        resolver,
        handshake_timeout: settings.handshake_timeout(),
        connect_timeout: settings.connect_timeout(),
        idle_timeout: settings.idle_timeout(),
    });

    loop {
        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((stream, peer)) => {
                        let state = state.clone();
                        tokio::spawn(async move {
                            handler::handle_socks5_conn(stream, peer, state).await;
                        });
                    }
                    Err(e) => {
                        error!(error = %e, "failed to accept connection");
                    }
                }
            }
            _ = shutdown.cancelled() => {
                info!("shutting down proxy");
                break;
            }
        }
    }

    Ok(())
}
