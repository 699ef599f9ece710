//! Domain events for DNS traffic monitoring.

use std::net::Ipv4Addr;
use std::time::Duration;

use super::{CaptureRecord, Ipv4Header, UdpHeader};

/// A UDP datagram to or from the DNS port observed on the wire.
///
/// This is the primary domain event that our system produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsQueryEvent {
    /// Running count of DNS packets seen since the monitor started, from 1
    pub sequence: u64,
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
    pub source_port: u16,
    pub destination_port: u16,
    /// Capture time from the kernel envelope, relative to the Unix epoch
    pub captured_at: Duration,
}

impl DnsQueryEvent {
    /// Build an event from the headers of a classified packet.
    pub fn new(sequence: u64, record: &CaptureRecord, ip: &Ipv4Header<'_>, udp: &UdpHeader) -> Self {
        Self {
            sequence,
            source: ip.source,
            destination: ip.destination,
            source_port: udp.source_port,
            destination_port: udp.destination_port,
            captured_at: record.timestamp(),
        }
    }

    /// True when the packet was sent by the server side (source port is `dns_port`).
    pub fn is_response(&self, dns_port: u16) -> bool {
        self.source_port == dns_port
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_copies_addresses_and_ports() {
        let record = CaptureRecord {
            ts_sec: 10,
            ts_usec: 5,
            captured_len: 42,
            original_len: 42,
            header_len: 18,
        };
        let ip = Ipv4Header {
            version_ihl: 0x45,
            protocol: 17,
            source: Ipv4Addr::new(192, 168, 1, 10),
            destination: Ipv4Addr::new(1, 1, 1, 1),
            payload: &[],
        };
        let udp = UdpHeader {
            source_port: 51000,
            destination_port: 53,
            length: 8,
            checksum: 0,
        };

        let event = DnsQueryEvent::new(7, &record, &ip, &udp);

        assert_eq!(event.sequence, 7);
        assert_eq!(event.source, Ipv4Addr::new(192, 168, 1, 10));
        assert_eq!(event.destination, Ipv4Addr::new(1, 1, 1, 1));
        assert_eq!(event.source_port, 51000);
        assert_eq!(event.destination_port, 53);
        assert_eq!(event.captured_at, Duration::new(10, 5_000));
        assert!(!event.is_response(53));
    }
}
