//! Console-based event reporter.

use std::io::{self, Write};

use crate::domain::DnsQueryEvent;
use crate::monitor::CaptureStats;
use crate::reporter::EventReporter;

/// Reports DNS events to stdout, one line per packet.
pub struct ConsoleReporter {
    /// Whether to show ports and capture time
    verbose: bool,
}

impl ConsoleReporter {
    /// Create a new console reporter.
    pub fn new() -> Self {
        Self { verbose: false }
    }

    /// Enable or disable verbose output.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn format_event(&self, event: &DnsQueryEvent) -> String {
        let mut output = format!(
            "DNS query #{} {} -> {}",
            event.sequence, event.source, event.destination
        );

        if self.verbose {
            output.push_str(&format!(
                " | ports {} -> {} | t={}.{:06}",
                event.source_port,
                event.destination_port,
                event.captured_at.as_secs(),
                event.captured_at.subsec_micros()
            ));
        }

        output
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl EventReporter for ConsoleReporter {
    fn report(&self, event: &DnsQueryEvent) {
        let output = self.format_event(event);
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{}", output);
    }

    fn on_start(&self, interface: &str) {
        println!("Listening on {} for DNS traffic...", interface);
        println!("Press Ctrl+C to stop.\n");
    }

    fn on_stop(&self, stats: &CaptureStats) {
        println!(
            "\nStopped. {} DNS packets in {} records ({} reads).",
            stats.dns_packets, stats.records, stats.reads
        );
    }
}
