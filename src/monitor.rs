//! The capture loop: read, walk records, classify, report.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::capture::{CaptureSource, ReadOutcome};
use crate::detector::{Classification, DnsDetector};
use crate::domain::DnsQueryEvent;
use crate::error::CaptureError;
use crate::parser::Records;
use crate::reporter::EventReporter;

/// Counters kept by the capture loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureStats {
    /// Reads that returned data
    pub reads: u64,
    /// Capture records visited
    pub records: u64,
    pub dns_packets: u64,
    pub other_udp: u64,
    pub not_udp: u64,
    pub not_ipv4: u64,
    /// Records too short for a header
    pub truncated: u64,
}

impl CaptureStats {
    /// Records that were not DNS.
    pub fn skipped(&self) -> u64 {
        self.other_udp + self.not_udp + self.not_ipv4 + self.truncated
    }
}

/// Watches a capture source for DNS traffic.
///
/// Owns the source, the running count and the reporter for as long as it runs.
/// The loop keeps going until the running flag is cleared or a read fails.
pub struct DnsMonitor<C, R> {
    capture: C,
    reporter: R,
    detector: DnsDetector,
    running: Arc<AtomicBool>,
    stats: CaptureStats,
}

impl<C: CaptureSource, R: EventReporter> DnsMonitor<C, R> {
    /// Create a monitor matching port 53.
    pub fn new(capture: C, reporter: R) -> Self {
        Self {
            capture,
            reporter,
            detector: DnsDetector::new(),
            running: Arc::new(AtomicBool::new(true)),
            stats: CaptureStats::default(),
        }
    }

    pub fn with_detector(mut self, detector: DnsDetector) -> Self {
        self.detector = detector;
        self
    }

    /// Share an externally owned running flag, e.g. one cleared by a signal handler.
    pub fn with_running(mut self, running: Arc<AtomicBool>) -> Self {
        self.running = running;
        self
    }

    /// Handle for requesting shutdown from another thread.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn stats(&self) -> &CaptureStats {
        &self.stats
    }

    /// Number of DNS packets seen so far.
    pub fn dns_count(&self) -> u64 {
        self.stats.dns_packets
    }

    /// Run until shutdown is requested or the source fails.
    ///
    /// Returns the final counters on a clean shutdown.
    pub fn run(&mut self) -> Result<CaptureStats, CaptureError> {
        let mut buf = vec![0u8; self.capture.buffer_len()];

        tracing::info!(
            "Capturing on {} (read buffer {} bytes, port {})",
            self.capture.interface_name(),
            buf.len(),
            self.detector.port()
        );
        self.reporter.on_start(self.capture.interface_name());

        let result = loop {
            if !self.running.load(Ordering::SeqCst) {
                tracing::info!("Shutdown requested");
                break Ok(());
            }

            match self.capture.read_batch(&mut buf) {
                Ok(ReadOutcome::Data(n)) => {
                    self.stats.reads += 1;
                    let n = n.min(buf.len());
                    self.process_buffer(&buf[..n]);
                }
                Ok(ReadOutcome::Idle) => continue,
                Err(e) => {
                    tracing::error!("Capture stopped: {}", e);
                    break Err(e);
                }
            }
        };

        tracing::info!(
            "Capture finished: {} reads, {} records, {} DNS, {} skipped ({} truncated)",
            self.stats.reads,
            self.stats.records,
            self.stats.dns_packets,
            self.stats.skipped(),
            self.stats.truncated
        );
        self.reporter.on_stop(&self.stats);

        result.map(|()| self.stats)
    }

    /// Walk every record in one read buffer, reporting DNS packets.
    ///
    /// Returns the number of events emitted.
    pub fn process_buffer(&mut self, buffer: &[u8]) -> usize {
        let mut emitted = 0;

        for view in Records::new(buffer) {
            self.stats.records += 1;

            match self.detector.classify(view.packet) {
                Classification::Dns { ip, udp } => {
                    self.stats.dns_packets += 1;
                    let event = DnsQueryEvent::new(self.stats.dns_packets, &view.record, &ip, &udp);
                    self.reporter.report(&event);
                    emitted += 1;
                }
                Classification::OtherUdp => self.stats.other_udp += 1,
                Classification::NotUdp => self.stats.not_udp += 1,
                Classification::NotIpv4 => self.stats.not_ipv4 += 1,
                Classification::Truncated => {
                    tracing::debug!(
                        "Skipping truncated frame at offset {} ({} bytes)",
                        view.offset,
                        view.packet.len()
                    );
                    self.stats.truncated += 1;
                }
            }
        }

        emitted
    }
}
