//! dnspeek - count DNS traffic on a BSD packet filter device.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dnspeek::capture;
use dnspeek::Config;

#[derive(Parser)]
#[command(name = "dnspeek")]
#[command(about = "Count UDP/53 traffic seen on a network interface")]
struct Cli {
    /// Interface to capture on (default: en0)
    #[arg(short, long)]
    interface: Option<String>,

    /// UDP port treated as DNS
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory holding the bpfN device nodes
    #[arg(long)]
    device_dir: Option<PathBuf>,

    /// Path to a key = value config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Debug logging, and ports/timestamps in the output
    #[arg(short, long)]
    verbose: bool,

    /// List network interfaces and exit
    #[arg(long)]
    list_interfaces: bool,
}

impl Cli {
    fn load_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref()).context("failed to load configuration")?;

        if let Some(interface) = &self.interface {
            config.interface = interface.clone();
        }
        if let Some(port) = self.port {
            config.dns_port = port;
        }
        if let Some(dir) = &self.device_dir {
            config.device_dir = dir.clone();
        }
        if self.verbose {
            config.log_filter = "debug".to_string();
        }

        Ok(config)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.list_interfaces {
        for line in capture::list_interfaces() {
            println!("{}", line);
        }
        return ExitCode::SUCCESS;
    }

    let config = match cli.load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(&config, cli.verbose) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(unix)]
fn run(config: &Config, verbose: bool) -> Result<()> {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use dnspeek::capture::DeviceManager;
    use dnspeek::detector::DnsDetector;
    use dnspeek::reporter::ConsoleReporter;
    use dnspeek::DnsMonitor;

    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = Arc::clone(&running);
    ctrlc::set_handler(move || {
        handler_flag.store(false, Ordering::SeqCst);
    })
    .context("failed to install signal handler")?;

    let device = DeviceManager::from_config(config)
        .acquire(&config.interface)
        .with_context(|| format!("failed to start capture on {}", config.interface))?;

    let reporter = ConsoleReporter::new().with_verbose(verbose);
    let mut monitor = DnsMonitor::new(device, reporter)
        .with_detector(DnsDetector::new().with_port(config.dns_port))
        .with_running(running);

    monitor.run().context("capture failed")?;
    Ok(())
}

#[cfg(not(unix))]
fn run(_config: &Config, _verbose: bool) -> Result<()> {
    anyhow::bail!("a BSD packet filter device is only available on Unix systems")
}
