//! dnspeek - passive DNS traffic counter on a BSD packet filter device.
//!
//! Frames are read from `/dev/bpfN`, decoded down to UDP and counted
//! when either port is 53. The pipeline, leaf first:
//!
//! - [`parser`]: Ethernet/IPv4/UDP decoders and the capture record walker
//! - [`capture`]: the device manager and the [`capture::CaptureSource`] seam
//! - [`detector`]: port-based DNS classification
//! - [`monitor`]: the capture loop
//! - [`reporter`]: where emitted events go

pub mod capture;
pub mod config;
pub mod detector;
pub mod domain;
pub mod error;
pub mod monitor;
pub mod parser;
pub mod reporter;

#[cfg(test)]
mod testutil;

pub use config::Config;
pub use domain::{CaptureRecord, DnsQueryEvent, EthernetFrame, Ipv4Header, UdpHeader};
pub use error::{CaptureError, ConfigError};
pub use monitor::{CaptureStats, DnsMonitor};
