//! Ethernet, IPv4 and UDP header decoders.
//!
//! Each decoder returns `None` when the input is too short for its header.
//! Field values are taken as-is: checksums, TTLs and length fields are not
//! validated.

use macaddr::MacAddr6;
use pnet::packet::ethernet::EthernetPacket;
use pnet::packet::ipv4::Ipv4Packet;
use pnet::packet::udp::UdpPacket;

use crate::domain::{EthernetFrame, Ipv4Header, UdpHeader};

/// Decode an Ethernet II header. The payload is everything after byte 14.
pub fn decode_ethernet(data: &[u8]) -> Option<EthernetFrame<'_>> {
    let packet = EthernetPacket::new(data)?;

    Some(EthernetFrame {
        destination: MacAddr6::from(packet.get_destination().octets()),
        source: MacAddr6::from(packet.get_source().octets()),
        ethertype: packet.get_ethertype().0,
        payload: data.get(EthernetFrame::MIN_LEN..)?,
    })
}

/// Decode an IPv4 header.
///
/// The payload starts at IHL * 4 and runs to the end of `data`; the total
/// length field is ignored. An IHL pointing past the end of `data` yields `None`.
pub fn decode_ipv4(data: &[u8]) -> Option<Ipv4Header<'_>> {
    let packet = Ipv4Packet::new(data)?;
    let version_ihl = (packet.get_version() << 4) | packet.get_header_length();
    let header_len = usize::from(packet.get_header_length()) * 4;

    Some(Ipv4Header {
        version_ihl,
        protocol: packet.get_next_level_protocol().0,
        source: packet.get_source(),
        destination: packet.get_destination(),
        payload: data.get(header_len..)?,
    })
}

/// Decode a UDP header.
pub fn decode_udp(data: &[u8]) -> Option<UdpHeader> {
    let packet = UdpPacket::new(data)?;

    Some(UdpHeader {
        source_port: packet.get_source(),
        destination_port: packet.get_destination(),
        length: packet.get_length(),
        checksum: packet.get_checksum(),
    })
}
