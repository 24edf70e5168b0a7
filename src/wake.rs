//! MAC address parsing and Wake-on-LAN magic packet delivery.
//!
//! A magic packet is six `0xFF` bytes followed by the target MAC
//! repeated sixteen times, sent as a UDP datagram to the subnet
//! broadcast address on port 9. Delivery is fire-and-forget: there is
//! no acknowledgement, and send failures must never abort the wake
//! retry loop, so [`WolNotifier::wake`] logs and swallows them.

use std::net::SocketAddr;
use std::str::FromStr;

use async_trait::async_trait;
use tokio::net::UdpSocket;

/// Default Wake-on-LAN target: limited broadcast, discard port.
pub const DEFAULT_WAKE_ADDR: &str = "255.255.255.255:9";

const MAGIC_HEADER_LEN: usize = 6;
const MAC_REPEATS: usize = 16;

/// A six-octet link-layer address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacAddr([u8; 6]);

impl MacAddr {
    #[must_use]
    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Build the 102-byte magic packet payload for this address.
    #[must_use]
    pub fn magic_packet(&self) -> Vec<u8> {
        let mut packet = Vec::with_capacity(MAGIC_HEADER_LEN + MAC_REPEATS * 6);
        packet.extend_from_slice(&[0xFF; MAGIC_HEADER_LEN]);
        for _ in 0..MAC_REPEATS {
            packet.extend_from_slice(&self.0);
        }
        packet
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMacError(String);

impl std::fmt::Display for ParseMacError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid MAC address '{}'", self.0)
    }
}

impl std::error::Error for ParseMacError {}

impl FromStr for MacAddr {
    type Err = ParseMacError;

    /// Accepts six hex octets separated by `:` or `-`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split([':', '-']).collect();
        if parts.len() != 6 {
            return Err(ParseMacError(s.to_string()));
        }

        let mut octets = [0u8; 6];
        for (i, part) in parts.iter().enumerate() {
            if part.len() != 2 {
                return Err(ParseMacError(s.to_string()));
            }
            octets[i] =
                u8::from_str_radix(part, 16).map_err(|_| ParseMacError(s.to_string()))?;
        }

        Ok(Self(octets))
    }
}

impl std::fmt::Display for MacAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let o = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            o[0], o[1], o[2], o[3], o[4], o[5]
        )
    }
}

/// Seam for the wake side effect, so the retry loop can be tested
/// without broadcasting UDP.
#[async_trait]
pub trait WakeNotifier: Send + Sync {
    /// Send a single wake frame. Must not fail upward.
    async fn wake(&self, mac: &MacAddr);
}

/// Sends magic packets over UDP broadcast.
#[derive(Debug, Clone)]
pub struct WolNotifier {
    target: SocketAddr,
}

impl WolNotifier {
    /// Notifier aimed at the standard broadcast address.
    #[must_use]
    pub fn new() -> Self {
        Self {
            target: DEFAULT_WAKE_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([255, 255, 255, 255], 9))),
        }
    }

    /// Notifier aimed at a specific address (tests, directed broadcast).
    #[must_use]
    pub const fn with_target(target: SocketAddr) -> Self {
        Self { target }
    }
}

impl Default for WolNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WakeNotifier for WolNotifier {
    async fn wake(&self, mac: &MacAddr) {
        tracing::info!(mac = %mac, target = %self.target, "sending wake-on-lan magic packet");

        let packet = mac.magic_packet();
        let result = async {
            let socket = UdpSocket::bind("0.0.0.0:0").await?;
            socket.set_broadcast(true)?;
            socket.send_to(&packet, self.target).await
        }
        .await;

        if let Err(e) = result {
            tracing::warn!(mac = %mac, error = %e, "failed to send wake packet");
        }
    }
}
