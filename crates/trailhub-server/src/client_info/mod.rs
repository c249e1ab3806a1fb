//! Request-derived client metadata
//!
//! Everything here is taken from the connection and headers, never from the
//! request body.

pub mod mac;
pub mod user_agent;

pub use mac::{MacResolver, NoopMacResolver, SystemMacResolver};
pub use user_agent::DeviceProfile;

use axum::http::{header::USER_AGENT, HeaderMap};
use std::net::SocketAddr;

pub const FORWARDED_FOR: &str = "x-forwarded-for";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub address_ip: Option<String>,
    pub address_mac: Option<String>,
    pub device: DeviceProfile,
}

impl ClientInfo {
    #[tracing::instrument(skip(headers, resolver))]
    pub async fn collect(
        headers: &HeaderMap,
        peer: Option<SocketAddr>,
        resolver: &dyn MacResolver,
    ) -> Self {
        let address_ip = client_ip(headers, peer);
        let address_mac = resolver.resolve(address_ip.as_deref()).await;

        let user_agent = headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        Self {
            address_ip,
            address_mac,
            device: DeviceProfile::parse(user_agent),
        }
    }
}

/// Peer address, overridden by the first `X-Forwarded-For` entry
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    let forwarded = headers
        .get(FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    match forwarded {
        Some(ip) => Some(ip.to_string()),
        None => peer.map(|addr| addr.ip().to_string()),
    }
}
