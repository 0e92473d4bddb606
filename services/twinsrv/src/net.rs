//! Endpoint parsing and port-fallback binding

use crate::error::{Result, TwinSrvError};
use std::io::ErrorKind;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::warn;

/// Number of successor ports tried when the preferred one is occupied
pub const PORT_FALLBACK_RANGE: u16 = 5;

/// A parsed `host:port/path` endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
    /// Leading-slash path, possibly empty
    pub path: String,
}

/// Split `host:port/path` (an optional `scheme://` prefix is tolerated)
pub fn split_endpoint(endpoint: &str) -> Result<Endpoint> {
    let rest = match endpoint.find("://") {
        Some(idx) => &endpoint[idx + 3..],
        None => endpoint,
    };
    let (hostport, path) = match rest.find('/') {
        Some(idx) => (&rest[..idx], rest[idx..].to_string()),
        None => (rest, String::new()),
    };
    let (host, port_s) = hostport
        .split_once(':')
        .ok_or_else(|| TwinSrvError::Config(format!("Endpoint missing port: {}", endpoint)))?;
    if host.is_empty() {
        return Err(TwinSrvError::Config(format!(
            "Endpoint missing host: {}",
            endpoint
        )));
    }
    let port: u16 = port_s
        .parse()
        .map_err(|_| TwinSrvError::Config(format!("Invalid endpoint port: {}", endpoint)))?;
    Ok(Endpoint {
        host: host.to_string(),
        port,
        path,
    })
}

/// Bind the endpoint, retrying on adjacent ports when the preferred one
/// is occupied.
///
/// Only "address already in use" triggers the fallback; any other bind
/// error is fatal. Fallback attempts rebind to all interfaces and keep
/// the original path. When the preferred port and all five successors
/// are busy the error propagates and the process must exit non-zero.
pub async fn bind_with_fallback(endpoint: &Endpoint) -> Result<(TcpListener, SocketAddr)> {
    match TcpListener::bind((endpoint.host.as_str(), endpoint.port)).await {
        Ok(listener) => {
            let addr = listener.local_addr()?;
            return Ok((listener, addr));
        }
        Err(e) if e.kind() == ErrorKind::AddrInUse => {}
        Err(e) => return Err(e.into()),
    }

    // Widen before adding: near the top of the range successor ports
    // would overflow u16, and candidates past 65535 do not exist.
    for offset in 1..=u32::from(PORT_FALLBACK_RANGE) {
        let candidate = u32::from(endpoint.port) + offset;
        let Ok(next_port) = u16::try_from(candidate) else {
            break;
        };
        warn!("Port {} occupied. Trying 0.0.0.0:{}{} ...", endpoint.port, next_port, endpoint.path);
        match TcpListener::bind(("0.0.0.0", next_port)).await {
            Ok(listener) => {
                let addr = listener.local_addr()?;
                return Ok((listener, addr));
            }
            Err(e) if e.kind() == ErrorKind::AddrInUse => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Err(TwinSrvError::Bind(format!(
        "No free port in {}..={}",
        endpoint.port,
        endpoint.port.saturating_add(PORT_FALLBACK_RANGE)
    )))
}
