//! DNS traffic classification by UDP port.

use crate::config::DEFAULT_DNS_PORT;
use crate::domain::{Ipv4Header, UdpHeader};
use crate::parser::{decode_ethernet, decode_ipv4, decode_udp};

/// What a captured frame turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification<'a> {
    /// UDP to or from the DNS port
    Dns { ip: Ipv4Header<'a>, udp: UdpHeader },
    /// UDP on other ports
    OtherUdp,
    /// IPv4 carrying something other than UDP
    NotUdp,
    /// Not an IPv4 Ethernet frame
    NotIpv4,
    /// Too short for one of the headers
    Truncated,
}

/// Classifies Ethernet frames as DNS traffic.
///
/// Only the port numbers are looked at; the DNS message itself is never parsed.
pub struct DnsDetector {
    port: u16,
}

impl DnsDetector {
    /// Create a detector for port 53.
    pub fn new() -> Self {
        Self {
            port: DEFAULT_DNS_PORT,
        }
    }

    /// Match a different port instead of 53.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns true if either UDP port is the DNS port.
    pub fn is_dns(&self, udp: &UdpHeader) -> bool {
        udp.involves_port(self.port)
    }

    /// Decode the Ethernet/IPv4/UDP headers of `frame` and classify it.
    pub fn classify<'a>(&self, frame: &'a [u8]) -> Classification<'a> {
        let Some(ethernet) = decode_ethernet(frame) else {
            return Classification::Truncated;
        };
        if !ethernet.is_ipv4() {
            return Classification::NotIpv4;
        }

        let Some(ip) = decode_ipv4(ethernet.payload) else {
            return Classification::Truncated;
        };
        if !ip.is_udp() {
            return Classification::NotUdp;
        }

        let Some(udp) = decode_udp(ip.payload) else {
            return Classification::Truncated;
        };

        if self.is_dns(&udp) {
            Classification::Dns { ip, udp }
        } else {
            Classification::OtherUdp
        }
    }
}

impl Default for DnsDetector {
    fn default() -> Self {
        Self::new()
    }
}
