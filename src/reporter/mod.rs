//! Reporting module for DNS traffic events.
//!
//! This module defines the `EventReporter` trait (ISP, DIP) and provides
//! a console implementation.

mod console_reporter;

pub use console_reporter::ConsoleReporter;

use crate::domain::DnsQueryEvent;
use crate::monitor::CaptureStats;

/// Trait for reporting DNS events (Interface Segregation Principle).
///
/// This trait only handles output, not filtering or counting. The
/// capture loop calls `report` once per classified packet, in order.
pub trait EventReporter: Send {
    /// Report a DNS event.
    fn report(&self, event: &DnsQueryEvent);

    /// Called when the capture loop starts.
    fn on_start(&self, interface: &str);

    /// Called when the capture loop stops, cleanly or not.
    fn on_stop(&self, stats: &CaptureStats);
}
