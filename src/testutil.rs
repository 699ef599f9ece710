//! Builders for synthetic frames and capture buffers used across unit tests.

/// Envelope header length used by most fixtures (18 bytes padded to 20).
pub const HEADER_LEN: u16 = 20;

/// Build an Ethernet/IPv4/UDP frame with a 20-byte IP header and no UDP payload.
pub fn udp_frame(
    ethertype: u16,
    protocol: u8,
    src: [u8; 4],
    dst: [u8; 4],
    src_port: u16,
    dst_port: u16,
) -> Vec<u8> {
    let mut frame = Vec::with_capacity(42);
    // Destination MAC, source MAC, EtherType
    frame.extend_from_slice(&[0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
    frame.extend_from_slice(&[0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb]);
    frame.extend_from_slice(&ethertype.to_be_bytes());

    // Version 4, IHL 5
    frame.push(0x45);
    frame.push(0);
    frame.extend_from_slice(&28u16.to_be_bytes());
    // Identification, flags, fragment offset
    frame.extend_from_slice(&[0, 1, 0, 0]);
    frame.push(64);
    frame.push(protocol);
    frame.extend_from_slice(&[0, 0]);
    frame.extend_from_slice(&src);
    frame.extend_from_slice(&dst);

    frame.extend_from_slice(&src_port.to_be_bytes());
    frame.extend_from_slice(&dst_port.to_be_bytes());
    frame.extend_from_slice(&8u16.to_be_bytes());
    frame.extend_from_slice(&[0, 0]);
    frame
}

/// Append a capture envelope followed by `frame`, padded to a 4-byte boundary.
pub fn push_record(buf: &mut Vec<u8>, header_len: u16, frame: &[u8]) {
    let start = buf.len();
    buf.extend_from_slice(&1_700_000_000u32.to_ne_bytes());
    buf.extend_from_slice(&42u32.to_ne_bytes());
    buf.extend_from_slice(&(frame.len() as u32).to_ne_bytes());
    buf.extend_from_slice(&(frame.len() as u32).to_ne_bytes());
    buf.extend_from_slice(&header_len.to_ne_bytes());
    buf.resize(start + usize::from(header_len), 0);
    buf.extend_from_slice(frame);
    while buf.len() % 4 != 0 {
        buf.push(0);
    }
}

/// A read buffer holding one record per frame.
pub fn capture_buffer(frames: &[Vec<u8>]) -> Vec<u8> {
    let mut buf = Vec::new();
    for frame in frames {
        push_record(&mut buf, HEADER_LEN, frame);
    }
    buf
}
