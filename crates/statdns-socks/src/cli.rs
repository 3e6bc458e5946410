//! CLI module for the statdns proxy.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use statdns_core::{PROJECT_NAME, VERSION, init_tracing};
use statdns_dns::StatDnsResolver;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::{ProxyConfig, load_proxy_config, validate_config};

/// Proxy CLI arguments.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "statdns",
    version,
    about = "SOCKS5 proxy resolving hostnames through a remote HTTP DNS service"
)]
pub struct ProxyArgs {
    /// Config file path (toml/json/jsonc). Defaults apply when omitted.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override SOCKS5 listen address.
    #[arg(short, long)]
    pub listen: Option<String>,

    /// Override lookup service base URL.
    #[arg(long)]
    pub lookup_url: Option<String>,

    /// Override lookup request timeout in seconds.
    #[arg(long)]
    pub lookup_timeout: Option<u64>,

    /// Log level override.
    #[arg(long)]
    pub log_level: Option<String>,
}

impl ProxyArgs {
    /// Apply command-line overrides on top of file configuration.
    pub fn apply(&self, config: &mut ProxyConfig) {
        if let Some(listen) = &self.listen {
            config.proxy.listen = listen.clone();
        }
        if let Some(url) = &self.lookup_url {
            config.dns.base_url = url.clone();
        }
        if let Some(secs) = self.lookup_timeout {
            config.dns.timeout_secs = secs;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = Some(level.clone());
        }
    }
}

/// Run the proxy with the given CLI arguments.
pub async fn run(args: ProxyArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => load_proxy_config(path)?,
        None => ProxyConfig::default(),
    };
    args.apply(&mut config);
    validate_config(&config)?;

    init_tracing(&config.logging);
    info!(version = VERSION, "{PROJECT_NAME} starting");

    let resolver = StatDnsResolver::new(&config.dns)?;
    info!(
        lookup = %config.dns.base_url,
        timeout_secs = config.dns.timeout_secs,
        "remote resolver configured"
    );

    let shutdown = CancellationToken::new();
    let shutdown_signal = shutdown.clone();

    tokio::spawn(async move {
        shutdown_signal_handler().await;
        info!("shutdown signal received");
        shutdown_signal.cancel();
    });

    crate::run(&config.proxy, Arc::new(resolver), shutdown).await?;
    Ok(())
}

async fn shutdown_signal_handler() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_file_values() {
        let args = ProxyArgs::parse_from([
            "statdns",
            "--listen",
            "127.0.0.1:1080",
            "--lookup-url",
            "http://127.0.0.1:8053",
            "--lookup-timeout",
            "3",
            "--log-level",
            "debug",
        ]);
        let mut config = ProxyConfig::default();
        args.apply(&mut config);

        assert_eq!(config.proxy.listen, "127.0.0.1:1080");
        assert_eq!(config.dns.base_url, "http://127.0.0.1:8053");
        assert_eq!(config.dns.timeout_secs, 3);
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
        assert!(args.config.is_none());
    }

    #[test]
    fn no_flags_keep_defaults() {
        let args = ProxyArgs::parse_from(["statdns"]);
        let mut config = ProxyConfig::default();
        args.apply(&mut config);
        assert_eq!(config.proxy.listen, "127.0.0.1:9001");
    }
}
