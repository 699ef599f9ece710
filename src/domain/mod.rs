//! Domain models for DNS traffic monitoring.
//!
//! These types describe the capture envelope, the stacked link/network/transport
//! headers and the events we emit. They are independent of how bytes are
//! read off the device or decoded.

mod events;
mod headers;
mod record;

pub use events::DnsQueryEvent;
pub use headers::{EthernetFrame, Ipv4Header, UdpHeader};
pub use record::CaptureRecord;
