use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/dnspeek.conf";
pub const DEFAULT_INTERFACE: &str = "en0";
pub const DEFAULT_DEVICE_DIR: &str = "/dev";
pub const DEFAULT_DEVICE_PREFIX: &str = "bpf";
pub const DEFAULT_MAX_DEVICES: usize = 255;
pub const DEFAULT_DNS_PORT: u16 = 53;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Runtime settings. Precedence: defaults < config file < environment < CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub interface: String,
    pub device_dir: PathBuf,
    pub device_prefix: String,
    pub max_devices: usize,
    pub dns_port: u16,
    /// How long one readiness wait lasts before the shutdown flag is checked
    pub poll_interval: Duration,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interface: DEFAULT_INTERFACE.to_string(),
            device_dir: PathBuf::from(DEFAULT_DEVICE_DIR),
            device_prefix: DEFAULT_DEVICE_PREFIX.to_string(),
            max_devices: DEFAULT_MAX_DEVICES,
            dns_port: DEFAULT_DNS_PORT,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Load the configuration.
    ///
    /// With `path` set the file must exist. Without it, `DNSPEEK_CONFIG` or
    /// [`DEFAULT_CONFIG_PATH`] is read if present. Environment overrides are
    /// applied last.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        let (config_path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (
                std::env::var("DNSPEEK_CONFIG")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH)),
                false,
            ),
        };

        if required || config_path.exists() {
            let content = std::fs::read_to_string(&config_path).map_err(|source| {
                ConfigError::Io {
                    path: config_path.clone(),
                    source,
                }
            })?;
            config.apply_file(&content)?;
            tracing::debug!("Loaded configuration from {}", config_path.display());
        }

        config.apply_env(|key| std::env::var(key).ok())?;

        Ok(config)
    }

    /// Apply `key = value` lines. Blank lines, `#` comments and unknown keys are ignored.
    pub fn apply_file(&mut self, content: &str) -> Result<(), ConfigError> {
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                self.set(key.trim(), value.trim())?;
            }
        }
        Ok(())
    }

    /// Apply `DNSPEEK_*` overrides through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("DNSPEEK_INTERFACE") {
            self.interface = val;
        }
        if let Some(val) = lookup("DNSPEEK_DEVICE_DIR") {
            self.device_dir = PathBuf::from(val);
        }
        if let Some(val) = lookup("DNSPEEK_PORT") {
            self.dns_port = parse_value("DNSPEEK_PORT", &val)?;
        }
        Ok(())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "interface" => self.interface = value.to_string(),
            "device_dir" => self.device_dir = PathBuf::from(value),
            "device_prefix" => self.device_prefix = value.to_string(),
            "max_devices" => self.max_devices = parse_value(key, value)?,
            "dns_port" => self.dns_port = parse_value(key, value)?,
            "poll_interval_ms" => {
                self.poll_interval = Duration::from_millis(parse_value(key, value)?);
            }
            "log_filter" => self.log_filter = value.to_string(),
            _ => tracing::debug!("Ignoring unknown config key '{}'", key),
        }
        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
