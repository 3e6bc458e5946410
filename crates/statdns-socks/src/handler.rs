//! Per-connection SOCKS5 handling: handshake, resolution, connect, relay.

use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use statdns_core::DEFAULT_RELAY_BUFFER_SIZE;
use statdns_core::io::relay_bidirectional;
use statdns_dns::Resolve;
use tokio::net::TcpStream;
use tracing::debug;

use crate::error::{ProxyError, Socks5Error};
use crate::socks5::handshake::{
    self, REPLY_ADDRESS_TYPE_NOT_SUPPORTED, REPLY_COMMAND_NOT_SUPPORTED,
    REPLY_CONNECTION_NOT_ALLOWED, REPLY_CONNECTION_REFUSED, REPLY_GENERAL_FAILURE,
    REPLY_HOST_UNREACHABLE, REPLY_NETWORK_UNREACHABLE, REPLY_SUCCEEDED, REPLY_TTL_EXPIRED,
    Socks5Request, TargetAddr, send_reply, send_reply_unspecified,
};

/// Shared state handed to every connection task.
#[allow(missing_debug_implementations)]
pub struct ProxyState {
    /// Naming strategy for domain destinations.
    pub resolver: Arc<dyn Resolve>,
    pub handshake_timeout: Duration,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
}

/// Handle a single SOCKS5 client connection.
pub async fn handle_socks5_conn(mut stream: TcpStream, peer: SocketAddr, state: Arc<ProxyState>) {
    if let Err(e) = handle_socks5_conn_inner(&mut stream, &state).await {
        debug!(peer = %peer, error = %e, "connection error");
    }
}

async fn handle_socks5_conn_inner(
    stream: &mut TcpStream,
    state: &ProxyState,
) -> Result<(), ProxyError> {
    let request = match tokio::time::timeout(state.handshake_timeout, handshake_phase(stream)).await
    {
        Ok(Ok(request)) => request,
        Ok(Err(Socks5Error::UnsupportedAddressType(atyp))) => {
            let _ = send_reply_unspecified(stream, REPLY_ADDRESS_TYPE_NOT_SUPPORTED).await;
            return Err(Socks5Error::UnsupportedAddressType(atyp).into());
        }
        Ok(Err(Socks5Error::InvalidDomain)) => {
            let _ = send_reply_unspecified(stream, REPLY_HOST_UNREACHABLE).await;
            return Err(Socks5Error::InvalidDomain.into());
        }
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => return Err(Socks5Error::HandshakeTimeout.into()),
    };

    match request.command {
        handshake::CMD_CONNECT => handle_connect(stream, &request, state).await,
        cmd => {
            let _ = send_reply_unspecified(stream, REPLY_COMMAND_NOT_SUPPORTED).await;
            Err(Socks5Error::UnsupportedCommand(cmd).into())
        }
    }
}

async fn handshake_phase(stream: &mut TcpStream) -> Result<Socks5Request, Socks5Error> {
    handshake::negotiate_method(stream).await?;
    handshake::read_request(stream).await
}

/// Handle TCP CONNECT command.
async fn handle_connect(
    stream: &mut TcpStream,
    request: &Socks5Request,
    state: &ProxyState,
) -> Result<(), ProxyError> {
    let addr = match resolve_target(&request.target, state.resolver.as_ref()).await {
        Ok(addr) => addr,
        Err(e) => {
            let _ = send_reply_unspecified(stream, reply_code_for_connect_error(&e)).await;
            return Err(e);
        }
    };

    debug!(target = %request.target, addr = %addr, "CONNECT");

    let outbound = match connect_with_timeout(addr, state.connect_timeout).await {
        Ok(s) => s,
        Err(e) => {
            let _ = send_reply_unspecified(stream, reply_code_for_connect_error(&e)).await;
            return Err(e);
        }
    };

    let bind_addr = outbound.local_addr()?;
    send_reply(stream, REPLY_SUCCEEDED, &bind_addr).await?;

    let stats = relay_bidirectional(
        stream,
        outbound,
        state.idle_timeout,
        DEFAULT_RELAY_BUFFER_SIZE,
    )
    .await?;

    debug!(
        target = %request.target,
        inbound = stats.inbound,
        outbound = stats.outbound,
        "relay finished"
    );
    Ok(())
}

/// Turn a SOCKS5 destination into a socket address.
///
/// Domain names always go through `resolver`, never the system resolver.
pub async fn resolve_target(
    target: &TargetAddr,
    resolver: &dyn Resolve,
) -> Result<SocketAddr, ProxyError> {
    match target {
        TargetAddr::Ip(addr) => Ok(*addr),
        TargetAddr::Domain(host, port) => {
            let ip = resolver.resolve(host).await?;
            Ok(SocketAddr::new(ip, *port))
        }
    }
}

async fn connect_with_timeout(addr: SocketAddr, timeout: Duration) -> Result<TcpStream, ProxyError> {
    let stream = tokio::time::timeout(timeout, TcpStream::connect(addr))
        .await
        .map_err(|_| std::io::Error::new(ErrorKind::TimedOut, "connect timed out"))??;
    let _ = stream.set_nodelay(true);
    Ok(stream)
}

fn reply_code_for_connect_error(error: &ProxyError) -> u8 {
    match error {
        ProxyError::Resolve(_) => REPLY_HOST_UNREACHABLE,
        ProxyError::Io(err) => match err.kind() {
            ErrorKind::ConnectionRefused => REPLY_CONNECTION_REFUSED,
            ErrorKind::NetworkUnreachable => REPLY_NETWORK_UNREACHABLE,
            ErrorKind::HostUnreachable => REPLY_HOST_UNREACHABLE,
            ErrorKind::PermissionDenied => REPLY_CONNECTION_NOT_ALLOWED,
            ErrorKind::TimedOut => REPLY_TTL_EXPIRED,
            ErrorKind::AddrNotAvailable => REPLY_HOST_UNREACHABLE,
            _ => REPLY_GENERAL_FAILURE,
        },
        _ => REPLY_GENERAL_FAILURE,
    }
}
