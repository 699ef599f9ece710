//! Packet capture abstraction.
//!
//! This module defines the `CaptureSource` trait (DIP) and provides a
//! BPF character-device implementation. The capture loop only depends on
//! the trait, so tests can replay scripted reads.

#[cfg(unix)]
mod bpf_device;

#[cfg(unix)]
pub use bpf_device::{BpfDevice, DeviceManager, PendingDevice};

use crate::error::CaptureError;

/// Result of one attempt to read from a capture source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// This many bytes of capture records were written to the buffer.
    Data(usize),
    /// Nothing arrived before the wait interval elapsed.
    Idle,
}

/// Trait for capture sources (Dependency Inversion Principle).
///
/// A source hands out raw read buffers holding zero or more capture
/// records. It must return `ReadOutcome::Idle` periodically when no traffic
/// arrives so the caller can notice a shutdown request.
pub trait CaptureSource: Send {
    /// Read the next batch of capture records into `buf`.
    ///
    /// An error is fatal; the caller stops reading.
    fn read_batch(&mut self, buf: &mut [u8]) -> Result<ReadOutcome, CaptureError>;

    /// Size of the buffer a single read needs.
    fn buffer_len(&self) -> usize;

    /// Get the name of the interface being captured.
    fn interface_name(&self) -> &str;
}

/// List all network interfaces, one summary line each.
pub fn list_interfaces() -> Vec<String> {
    pnet::datalink::interfaces()
        .into_iter()
        .map(|iface| {
            let status = if iface.is_up() { "UP" } else { "DOWN" };
            let ips: Vec<_> = iface.ips.iter().map(|ip| ip.to_string()).collect();
            format!(
                "{}: {} [{}]",
                iface.name,
                status,
                if ips.is_empty() {
                    "no IP".to_string()
                } else {
                    ips.join(", ")
                }
            )
        })
        .collect()
}
