//! Best-effort hardware address lookup
//!
//! Lookup order: the kernel ARP table for the client IP, then the MAC of the
//! default interface, then a UDP datagram to the client IP followed by a second
//! ARP lookup. Any failure simply yields `None`.

use async_trait::async_trait;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::debug;

/// Kernel ARP table on Linux.
pub const DEFAULT_ARP_TABLE: &str = "/proc/net/arp";

/// Interface consulted when the ARP table has no entry.
pub const DEFAULT_INTERFACE: &str = "eth0";

const PROBE_PORT: u16 = 55555;
const EMPTY_MAC: &str = "00:00:00:00:00:00";

#[async_trait]
pub trait MacResolver: Send + Sync {
    async fn resolve(&self, ip: Option<&str>) -> Option<String>;
}

/// Resolves nothing; used when lookups are not wanted
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMacResolver;

#[async_trait]
impl MacResolver for NoopMacResolver {
    async fn resolve(&self, _ip: Option<&str>) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct SystemMacResolver {
    arp_table: PathBuf,
    interface: String,
    arp_timeout: Duration,
}

impl Default for SystemMacResolver {
    fn default() -> Self {
        Self {
            arp_table: PathBuf::from(DEFAULT_ARP_TABLE),
            interface: DEFAULT_INTERFACE.to_string(),
            arp_timeout: Duration::from_millis(200),
        }
    }
}

impl SystemMacResolver {
    pub fn new(arp_table: impl Into<PathBuf>, interface: impl Into<String>) -> Self {
        Self {
            arp_table: arp_table.into(),
            interface: interface.into(),
            ..Default::default()
        }
    }

    async fn from_arp_table(&self, ip: &str) -> Option<String> {
        let contents = tokio::fs::read_to_string(&self.arp_table).await.ok()?;
        parse_arp_table(&contents, ip)
    }

    fn from_interface(&self) -> Option<String> {
        match mac_address::mac_address_by_name(&self.interface) {
            Ok(Some(mac)) => Some(mac.to_string().to_lowercase()),
            Ok(None) => None,
            Err(e) => {
                debug!(interface = %self.interface, error = %e, "Interface MAC lookup failed");
                None
            },
        }
    }

    /// Send an empty datagram so the kernel populates the ARP entry
    async fn prime_arp_cache(&self, ip: IpAddr) {
        let IpAddr::V4(v4) = ip else {
            return;
        };

        let send = async {
            let socket = UdpSocket::bind("0.0.0.0:0").await?;
            socket.send_to(&[], SocketAddr::from((v4, PROBE_PORT))).await?;
            tokio::time::sleep(self.arp_timeout / 2).await;
            Ok::<_, std::io::Error>(())
        };

        if let Ok(Err(e)) = tokio::time::timeout(self.arp_timeout, send).await {
            debug!(%ip, error = %e, "ARP cache priming failed");
        }
    }
}

#[async_trait]
impl MacResolver for SystemMacResolver {
    #[tracing::instrument(skip(self))]
    async fn resolve(&self, ip: Option<&str>) -> Option<String> {
        if let Some(ip) = ip {
            if let Some(mac) = self.from_arp_table(ip).await {
                return Some(mac);
            }
        }

        if let Some(mac) = self.from_interface() {
            return Some(mac);
        }

        let ip = ip?;
        let addr: IpAddr = ip.parse().ok()?;
        self.prime_arp_cache(addr).await;
        self.from_arp_table(ip).await
    }
}

/// Find the hardware address for `ip` in `/proc/net/arp` formatted text
pub fn parse_arp_table(contents: &str, ip: &str) -> Option<String> {
    contents
        .lines()
        .skip(1)
        .map(|line| line.split_whitespace().collect::<Vec<_>>())
        .find(|cols| cols.len() >= 4 && cols[0] == ip)
        .map(|cols| cols[3].to_lowercase())
        .filter(|mac| mac != EMPTY_MAC)
}
