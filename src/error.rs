use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors raised by the capture device and the capture loop.
///
/// Header truncation is not represented here: decoders return `None`
/// and the loop skips the record.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("no usable capture device under {} ({reason})", dir.display())]
    DeviceUnavailable { dir: PathBuf, reason: String },

    #[error("invalid interface name '{0}': must be 1 to 15 bytes")]
    InvalidInterface(String),

    #[error("{operation} failed on {}: {source}", device.display())]
    Configuration {
        operation: &'static str,
        device: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("read from capture device failed: {0}")]
    ReadFailure(#[source] io::Error),
}

/// Errors produced while loading the runtime configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
