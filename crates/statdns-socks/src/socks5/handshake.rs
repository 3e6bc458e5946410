//! SOCKS5 handshake: method negotiation, request parsing and replies (RFC 1928).

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::Socks5Error;

const SOCKS5_VERSION: u8 = 0x05;
const METHOD_NO_AUTH: u8 = 0x00;
const METHOD_NO_ACCEPTABLE: u8 = 0xFF;

pub const CMD_CONNECT: u8 = 0x01;

pub const ATYP_IPV4: u8 = 0x01;
pub const ATYP_DOMAIN: u8 = 0x03;
pub const ATYP_IPV6: u8 = 0x04;

/// SOCKS5 reply codes.
pub const REPLY_SUCCEEDED: u8 = 0x00;
pub const REPLY_GENERAL_FAILURE: u8 = 0x01;
pub const REPLY_CONNECTION_NOT_ALLOWED: u8 = 0x02;
pub const REPLY_NETWORK_UNREACHABLE: u8 = 0x03;
pub const REPLY_HOST_UNREACHABLE: u8 = 0x04;
pub const REPLY_CONNECTION_REFUSED: u8 = 0x05;
pub const REPLY_TTL_EXPIRED: u8 = 0x06;
pub const REPLY_COMMAND_NOT_SUPPORTED: u8 = 0x07;
pub const REPLY_ADDRESS_TYPE_NOT_SUPPORTED: u8 = 0x08;

/// Destination named by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetAddr {
    /// IPv4 or IPv6 literal, dialed as is.
    Ip(SocketAddr),
    /// Hostname that must go through the resolver.
    Domain(String, u16),
}

impl fmt::Display for TargetAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ip(addr) => write!(f, "{addr}"),
            Self::Domain(host, port) => write!(f, "{host}:{port}"),
        }
    }
}

/// Parsed SOCKS5 request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Socks5Request {
    pub command: u8,
    pub target: TargetAddr,
}

/// Perform SOCKS5 method negotiation (server side).
///
/// Reads the client's greeting and responds with NO AUTH (0x00).
pub async fn negotiate_method<S>(stream: &mut S) -> Result<(), Socks5Error>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut header = [0u8; 2];
    stream.read_exact(&mut header).await?;

    if header[0] != SOCKS5_VERSION {
        return Err(Socks5Error::InvalidVersion(header[0]));
    }

    let mut methods = vec![0u8; header[1] as usize];
    stream.read_exact(&mut methods).await?;

    if methods.contains(&METHOD_NO_AUTH) {
        stream.write_all(&[SOCKS5_VERSION, METHOD_NO_AUTH]).await?;
        Ok(())
    } else {
        let _ = stream
            .write_all(&[SOCKS5_VERSION, METHOD_NO_ACCEPTABLE])
            .await;
        Err(Socks5Error::NoAcceptableMethods)
    }
}

/// Read the SOCKS5 request after method negotiation.
pub async fn read_request<S>(stream: &mut S) -> Result<Socks5Request, Socks5Error>
where
    S: AsyncRead + Unpin,
{
    // VER CMD RSV ATYP
    let mut header = [0u8; 4];
    stream.read_exact(&mut header).await?;

    if header[0] != SOCKS5_VERSION {
        return Err(Socks5Error::InvalidVersion(header[0]));
    }

    let target = read_target(stream, header[3]).await?;

    Ok(Socks5Request {
        command: header[1],
        target,
    })
}

async fn read_target<S>(stream: &mut S, atyp: u8) -> Result<TargetAddr, Socks5Error>
where
    S: AsyncRead + Unpin,
{
    match atyp {
        ATYP_IPV4 => {
            let mut buf = [0u8; 6];
            stream.read_exact(&mut buf).await?;
            let ip = Ipv4Addr::new(buf[0], buf[1], buf[2], buf[3]);
            let port = u16::from_be_bytes([buf[4], buf[5]]);
            Ok(TargetAddr::Ip(SocketAddr::V4(SocketAddrV4::new(ip, port))))
        }
        ATYP_DOMAIN => {
            let len = stream.read_u8().await? as usize;
            let mut buf = vec![0u8; len + 2];
            stream.read_exact(&mut buf).await?;
            let port = u16::from_be_bytes([buf[len], buf[len + 1]]);
            buf.truncate(len);
            let host = String::from_utf8(buf).map_err(|_| Socks5Error::InvalidDomain)?;
            Ok(TargetAddr::Domain(host, port))
        }
        ATYP_IPV6 => {
            let mut buf = [0u8; 18];
            stream.read_exact(&mut buf).await?;
            let mut octets = [0u8; 16];
            octets.copy_from_slice(&buf[..16]);
            let port = u16::from_be_bytes([buf[16], buf[17]]);
            Ok(TargetAddr::Ip(SocketAddr::V6(SocketAddrV6::new(
                Ipv6Addr::from(octets),
                port,
                0,
                0,
            ))))
        }
        _ => Err(Socks5Error::UnsupportedAddressType(atyp)),
    }
}

/// Send a SOCKS5 reply carrying `bind_addr`.
pub async fn send_reply<S>(stream: &mut S, reply: u8, bind_addr: &SocketAddr) -> std::io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    let mut buf = Vec::with_capacity(22);
    buf.extend_from_slice(&[SOCKS5_VERSION, reply, 0x00]);

    match bind_addr {
        SocketAddr::V4(addr) => {
            buf.push(ATYP_IPV4);
            buf.extend_from_slice(&addr.ip().octets());
        }
        SocketAddr::V6(addr) => {
            buf.push(ATYP_IPV6);
            buf.extend_from_slice(&addr.ip().octets());
        }
    }
    buf.extend_from_slice(&bind_addr.port().to_be_bytes());

    stream.write_all(&buf).await
}

/// Send a SOCKS5 reply with a zeroed bind address (0.0.0.0:0).
pub async fn send_reply_unspecified<S>(stream: &mut S, reply: u8) -> std::io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    send_reply(stream, reply, &SocketAddr::from(([0, 0, 0, 0], 0u16))).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    #[tokio::test]
    async fn negotiate_accepts_no_auth() {
        let (mut client, mut server) = duplex(64);
        client.write_all(&[0x05, 0x02, 0x02, 0x00]).await.unwrap();

        negotiate_method(&mut server).await.unwrap();

        let mut reply = [0u8; 2];
        client.read_exact(&mut reply).await.unwrap();
        assert_eq!(reply, [0x05, 0x00]);
    }

    #[tokio::test]
    async fn negotiate_rejects_auth_only_clients() {
        let (mut client, mut server) = duplex(64);
        client.write_all(&[0x05, 0x01, 0x02]).await.unwrap();

        let err = negotiate_method(&mut server).await.unwrap_err();
        assert!(matches!(err, Socks5Error::NoAcceptableMethods));

        let mut reply = [0u8; 2];
        client.read_exact(&mut reply).await.unwrap();
        assert_eq!(reply, [0x05, 0xFF]);
    }

    #[tokio::test]
    async fn negotiate_rejects_socks4() {
        let (mut client, mut server) = duplex(64);
        client.write_all(&[0x04, 0x01]).await.unwrap();

        let err = negotiate_method(&mut server).await.unwrap_err();
        assert!(matches!(err, Socks5Error::InvalidVersion(0x04)));
    }

    #[tokio::test]
    async fn reads_domain_request() {
        let (mut client, mut server) = duplex(64);
        let mut req = vec![0x05, CMD_CONNECT, 0x00, ATYP_DOMAIN, 11];
        req.extend_from_slice(b"example.com");
        req.extend_from_slice(&443u16.to_be_bytes());
        client.write_all(&req).await.unwrap();

        let request = read_request(&mut server).await.unwrap();
        assert_eq!(request.command, CMD_CONNECT);
        assert_eq!(request.target, TargetAddr::Domain("example.com".into(), 443));
        assert_eq!(request.target.to_string(), "example.com:443");
    }

    #[tokio::test]
    async fn reads_ipv4_and_ipv6_requests() {
        let (mut client, mut server) = duplex(64);
        client
            .write_all(&[0x05, CMD_CONNECT, 0x00, ATYP_IPV4, 10, 0, 0, 1, 0x00, 0x50])
            .await
            .unwrap();
        let request = read_request(&mut server).await.unwrap();
        assert_eq!(request.target, TargetAddr::Ip("10.0.0.1:80".parse().unwrap()));

        let mut req = vec![0x05, CMD_CONNECT, 0x00, ATYP_IPV6];
        req.extend_from_slice(&Ipv6Addr::LOCALHOST.octets());
        req.extend_from_slice(&8080u16.to_be_bytes());
        client.write_all(&req).await.unwrap();
        let request = read_request(&mut server).await.unwrap();
        assert_eq!(request.target, TargetAddr::Ip("[::1]:8080".parse().unwrap()));
    }

    #[tokio::test]
    async fn rejects_unknown_address_type() {
        let (mut client, mut server) = duplex(64);
        client
            .write_all(&[0x05, CMD_CONNECT, 0x00, 0x09])
            .await
            .unwrap();

        let err = read_request(&mut server).await.unwrap_err();
        assert!(matches!(err, Socks5Error::UnsupportedAddressType(0x09)));
    }

    #[tokio::test]
    async fn truncated_address_is_an_io_error() {
        let (mut client, mut server) = duplex(64);
        client
            .write_all(&[0x05, CMD_CONNECT, 0x00, ATYP_IPV4, 10, 0])
            .await
            .unwrap();
        drop(client);

        let err = read_request(&mut server).await.unwrap_err();
        assert!(
            matches!(err, Socks5Error::Io(ref e) if e.kind() == std::io::ErrorKind::UnexpectedEof),
            "got {err:?}"
        );
    }

    #[tokio::test]
    async fn closed_before_greeting_is_an_io_error() {
        let (client, mut server) = duplex(64);
        drop(client);

        let err = negotiate_method(&mut server).await.unwrap_err();
        assert!(matches!(err, Socks5Error::Io(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn rejects_non_utf8_domain() {
        let (mut client, mut server) = duplex(64);
        client
            .write_all(&[0x05, CMD_CONNECT, 0x00, ATYP_DOMAIN, 2, 0xff, 0xfe, 0x00, 0x50])
            .await
            .unwrap();

        let err = read_request(&mut server).await.unwrap_err();
        assert!(matches!(err, Socks5Error::InvalidDomain));
    }

    #[tokio::test]
    async fn reply_encodes_bind_address() {
        let (mut client, mut server) = duplex(64);
        send_reply(&mut server, REPLY_SUCCEEDED, &"192.0.2.1:1080".parse().unwrap())
            .await
            .unwrap();
        send_reply_unspecified(&mut server, REPLY_HOST_UNREACHABLE)
            .await
            .unwrap();

        let mut buf = [0u8; 20];
        client.read_exact(&mut buf).await.unwrap();
        assert_eq!(
            &buf[..10],
            &[0x05, 0x00, 0x00, ATYP_IPV4, 192, 0, 2, 1, 0x04, 0x38]
        );
        assert_eq!(&buf[10..], &[0x05, 0x04, 0x00, ATYP_IPV4, 0, 0, 0, 0, 0, 0]);
    }
}
