//! DNS detection module.
//!
//! This module decides whether a captured frame is DNS traffic, separate
//! from reading the device or reporting results (SRP).

mod dns_detector;

pub use dns_detector::{Classification, DnsDetector};
