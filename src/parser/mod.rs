//! Wire decoding module.
//!
//! Turns capture buffers into records and records into protocol headers (SRP).
//! Nothing here does I/O or keeps state between calls.

mod headers;
mod record_reader;

pub use headers::{decode_ethernet, decode_ipv4, decode_udp};
pub use record_reader::{next_offset, next_record, packet_bytes, RecordView, Records};
