//! Decoded protocol headers.
//!
//! Each header borrows its payload from the capture buffer, so nothing here
//! outlives the read that produced it.

use std::net::Ipv4Addr;

use macaddr::MacAddr6;

/// EtherType for IPv4.
pub const ETHERTYPE_IPV4: u16 = 0x0800;

/// IP protocol number for UDP.
pub const IPPROTO_UDP: u8 = 17;

/// An Ethernet II frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthernetFrame<'a> {
    pub destination: MacAddr6,
    pub source: MacAddr6,
    /// Host-order value of the network-order ethertype field.
    pub ethertype: u16,
    pub payload: &'a [u8],
}

impl EthernetFrame<'_> {
    /// Minimum number of bytes needed to decode the header.
    pub const MIN_LEN: usize = 14;

    pub fn is_ipv4(&self) -> bool {
        self.ethertype == ETHERTYPE_IPV4
    }
}

/// An IPv4 header, options skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Header<'a> {
    /// Raw first byte: version in the high nibble, IHL in the low nibble.
    pub version_ihl: u8,
    pub protocol: u8,
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
    /// Everything after `header_len()` bytes.
    pub payload: &'a [u8],
}

impl Ipv4Header<'_> {
    /// Minimum number of bytes needed to decode the header.
    pub const MIN_LEN: usize = 20;

    pub fn version(&self) -> u8 {
        self.version_ihl >> 4
    }

    /// Header length in bytes, as claimed by the IHL nibble.
    pub fn header_len(&self) -> usize {
        usize::from(self.version_ihl & 0x0F) * 4
    }

    pub fn is_udp(&self) -> bool {
        self.protocol == IPPROTO_UDP
    }
}

/// A UDP header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UdpHeader {
    pub source_port: u16,
    pub destination_port: u16,
    pub length: u16,
    pub checksum: u16,
}

impl UdpHeader {
    /// Minimum number of bytes needed to decode the header.
    pub const MIN_LEN: usize = 8;

    /// Returns true if either port equals `port`.
    pub fn involves_port(&self, port: u16) -> bool {
        self.source_port == port || self.destination_port == port
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ipv4(version_ihl: u8) -> Ipv4Header<'static> {
        Ipv4Header {
            version_ihl,
            protocol: IPPROTO_UDP,
            source: Ipv4Addr::new(10, 0, 0, 1),
            destination: Ipv4Addr::new(10, 0, 0, 2),
            payload: &[],
        }
    }

    #[test]
    fn test_ipv4_version_and_header_len() {
        let header = ipv4(0x45);
        assert_eq!(header.version(), 4);
        assert_eq!(header.header_len(), 20);

        let header = ipv4(0x4f);
        assert_eq!(header.header_len(), 60);
    }

    #[test]
    fn test_udp_involves_port() {
        let udp = UdpHeader {
            source_port: 53,
            destination_port: 40000,
            length: 8,
            checksum: 0,
        };
        assert!(udp.involves_port(53));
        assert!(udp.involves_port(40000));
        assert!(!udp.involves_port(5353));
    }
}
