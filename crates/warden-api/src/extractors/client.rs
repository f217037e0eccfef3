//! Client address and User-Agent resolution.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{Extensions, HeaderMap, header};

use warden_service::context::ClientInfo;

use crate::state::AppState;

/// Address used when neither proxy headers nor the socket peer are known.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Resolves the client address.
///
/// The socket peer is the client unless it is one of `trusted_proxies`. Only
/// then are forwarding headers read: the right-most `X-Forwarded-For` entry
/// that is not itself a trusted proxy, then `X-Real-IP`.
pub fn resolve_client(
    headers: &HeaderMap,
    extensions: &Extensions,
    trusted_proxies: &[IpAddr],
) -> ClientInfo {
    let peer = extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    let ip_address = match peer {
        Some(peer) if trusted_proxies.contains(&peer) => {
            forwarded_client(headers, trusted_proxies).unwrap_or_else(|| peer.to_string())
        }
        Some(peer) => peer.to_string(),
        None => UNKNOWN_CLIENT.to_string(),
    };

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    ClientInfo::new(ip_address, user_agent)
}

fn forwarded_client(headers: &HeaderMap, trusted_proxies: &[IpAddr]) -> Option<String> {
    let chain: Vec<&str> = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(',').map(str::trim).filter(|e| !e.is_empty()).collect())
        .unwrap_or_default();

    let is_proxy = |entry: &str| {
        entry
            .parse::<IpAddr>()
            .is_ok_and(|ip| trusted_proxies.contains(&ip))
    };

    // Walk back from the hop nearest to us; every trusted proxy appends the
    // address it received from.
    let from_chain = chain
        .iter()
        .rev()
        .find(|entry| !is_proxy(entry))
        .or_else(|| chain.first())
        .map(|entry| entry.to_string());

    from_chain.or_else(|| {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from)
    })
}

/// Client details for the current request. Never rejects.
#[derive(Debug, Clone)]
pub struct Client(pub ClientInfo);

impl FromRequestParts<AppState> for Client {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Client(resolve_client(
            &parts.headers,
            &parts.extensions,
            &state.trusted_proxies,
        )))
    }
}
