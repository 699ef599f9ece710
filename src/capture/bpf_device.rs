//! BSD packet filter (`/dev/bpfN`) capture device.

use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{CaptureSource, ReadOutcome};
use crate::config::{
    Config, DEFAULT_DEVICE_DIR, DEFAULT_DEVICE_PREFIX, DEFAULT_MAX_DEVICES,
    DEFAULT_POLL_INTERVAL_MS,
};
use crate::error::CaptureError;

/// Length of the interface name field, NUL terminator included.
const IFNAMSIZ: usize = 16;

// ioctl request codes from <net/bpf.h>
/// _IOW('B', 108, struct ifreq)
const BIOCSETIF: u64 = 0x8020_426c;
/// _IOW('B', 112, u_int)
const BIOCIMMEDIATE: u64 = 0x8004_4270;
/// _IOR('B', 102, u_int)
const BIOCGBLEN: u64 = 0x4004_4266;

/// Interface request passed to BIOCSETIF.
#[repr(C)]
#[derive(Clone, Copy)]
struct IfReq {
    name: [u8; IFNAMSIZ],
    family: u16,
    pad: [u8; 14],
}

const _: () = assert!(std::mem::size_of::<IfReq>() == 32);

impl IfReq {
    fn new(interface: &str) -> Result<Self, CaptureError> {
        let bytes = interface.as_bytes();
        if bytes.is_empty() || bytes.len() >= IFNAMSIZ || bytes.contains(&0) {
            return Err(CaptureError::InvalidInterface(interface.to_string()));
        }

        let mut name = [0u8; IFNAMSIZ];
        name[..bytes.len()].copy_from_slice(bytes);

        Ok(Self {
            name,
            family: libc::AF_INET as u16,
            pad: [0; 14],
        })
    }
}

impl std::fmt::Debug for IfReq {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(IFNAMSIZ);
        f.debug_struct("IfReq")
            .field("name", &String::from_utf8_lossy(&self.name[..end]))
            .field("family", &self.family)
            .finish()
    }
}

/// Finds and opens a free capture device.
///
/// Device nodes are probed as `<dir>/<prefix>0`, `<prefix>1`, ... in order.
/// Probing stops at the first missing node: nodes are assumed to be
/// allocated contiguously from index 0.
#[derive(Debug, Clone)]
pub struct DeviceManager {
    device_dir: PathBuf,
    prefix: String,
    max_devices: usize,
    poll_interval: Duration,
}

impl DeviceManager {
    /// Create a manager probing `/dev/bpf0` through `/dev/bpf254`.
    pub fn new() -> Self {
        Self {
            device_dir: PathBuf::from(DEFAULT_DEVICE_DIR),
            prefix: DEFAULT_DEVICE_PREFIX.to_string(),
            max_devices: DEFAULT_MAX_DEVICES,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    /// Create a manager from the runtime configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new()
            .with_device_dir(&config.device_dir)
            .with_prefix(&config.device_prefix)
            .with_max_devices(config.max_devices)
            .with_poll_interval(config.poll_interval)
    }

    pub fn with_device_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.device_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    pub fn with_max_devices(mut self, max_devices: usize) -> Self {
        self.max_devices = max_devices;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Path of the device node with the given index.
    pub fn device_path(&self, index: usize) -> PathBuf {
        self.device_dir.join(format!("{}{}", self.prefix, index))
    }

    /// Open the first free device node.
    ///
    /// A node that exists but cannot be opened (busy, permission denied) is
    /// skipped. A node that does not exist ends the search.
    pub fn open(&self, interface: &str) -> Result<PendingDevice, CaptureError> {
        let ifreq = IfReq::new(interface)?;

        for index in 0..self.max_devices {
            let path = self.device_path(index);

            match OpenOptions::new().read(true).write(true).open(&path) {
                Ok(file) => {
                    tracing::info!("Opened capture device {}", path.display());
                    return Ok(PendingDevice {
                        file,
                        path,
                        index,
                        interface: interface.to_string(),
                        ifreq,
                        poll_interval: self.poll_interval,
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    return Err(CaptureError::DeviceUnavailable {
                        dir: self.device_dir.clone(),
                        reason: format!("{} does not exist", path.display()),
                    });
                }
                Err(e) => {
                    tracing::debug!("Skipping {}: {}", path.display(), e);
                }
            }
        }

        Err(CaptureError::DeviceUnavailable {
            dir: self.device_dir.clone(),
            reason: format!("all {} devices busy or inaccessible", self.max_devices),
        })
    }

    /// Open and configure a device bound to `interface`.
    pub fn acquire(&self, interface: &str) -> Result<BpfDevice, CaptureError> {
        self.open(interface)?.configure()
    }
}

impl Default for DeviceManager {
    fn default() -> Self {
        Self::new()
    }
}

/// An opened device that has not been bound to an interface yet.
///
/// Only [`PendingDevice::configure`] turns it into something readable.
#[derive(Debug)]
pub struct PendingDevice {
    file: File,
    path: PathBuf,
    index: usize,
    interface: String,
    ifreq: IfReq,
    poll_interval: Duration,
}

impl PendingDevice {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Bind to the interface, enable immediate mode and fetch the buffer length.
    ///
    /// Any failing step aborts; the device is closed on error.
    pub fn configure(self) -> Result<BpfDevice, CaptureError> {
        let fd = self.file.as_raw_fd();

        let mut ifreq = self.ifreq;
        control(fd, BIOCSETIF, &mut ifreq).map_err(|e| self.config_error("BIOCSETIF", e))?;
        tracing::debug!("Bound {} to {}", self.path.display(), self.interface);

        let mut immediate: libc::c_uint = 1;
        control(fd, BIOCIMMEDIATE, &mut immediate)
            .map_err(|e| self.config_error("BIOCIMMEDIATE", e))?;

        let mut buffer_len: libc::c_uint = 0;
        control(fd, BIOCGBLEN, &mut buffer_len).map_err(|e| self.config_error("BIOCGBLEN", e))?;
        if buffer_len == 0 {
            return Err(self.config_error(
                "BIOCGBLEN",
                io::Error::new(io::ErrorKind::InvalidData, "kernel reported a zero buffer length"),
            ));
        }

        tracing::info!(
            "Capture device {} bound to {} (buffer {} bytes)",
            self.path.display(),
            self.interface,
            buffer_len
        );

        Ok(BpfDevice {
            file: self.file,
            path: self.path,
            interface: self.interface,
            buffer_len: buffer_len as usize,
            poll_interval: self.poll_interval,
        })
    }

    fn config_error(&self, operation: &'static str, source: io::Error) -> CaptureError {
        CaptureError::Configuration {
            operation,
            device: self.path.clone(),
            source,
        }
    }
}

/// A configured capture device, ready to read.
///
/// The descriptor is closed when the device is dropped.
#[derive(Debug)]
pub struct BpfDevice {
    file: File,
    path: PathBuf,
    interface: String,
    buffer_len: usize,
    poll_interval: Duration,
}

impl BpfDevice {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Wait up to `poll_interval` for the descriptor to become readable.
    fn wait_readable(&self) -> Result<bool, CaptureError> {
        let mut pfd = libc::pollfd {
            fd: self.file.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        };
        let timeout = self.poll_interval.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;

        let rc = unsafe { libc::poll(&mut pfd, 1, timeout) };
        match rc {
            -1 => {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    Ok(false)
                } else {
                    Err(CaptureError::ReadFailure(err))
                }
            }
            0 => Ok(false),
            _ => Ok(true),
        }
    }
}

impl CaptureSource for BpfDevice {
    fn read_batch(&mut self, buf: &mut [u8]) -> Result<ReadOutcome, CaptureError> {
        if !self.wait_readable()? {
            return Ok(ReadOutcome::Idle);
        }

        let len = self.buffer_len.min(buf.len());
        match self.file.read(&mut buf[..len]) {
            Ok(n) => Ok(ReadOutcome::Data(n)),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(ReadOutcome::Idle),
            Err(e) => Err(CaptureError::ReadFailure(e)),
        }
    }

    fn buffer_len(&self) -> usize {
        self.buffer_len
    }

    fn interface_name(&self) -> &str {
        &self.interface
    }
}

/// Issue an ioctl whose argument is a pointer to `arg`.
fn control<T>(fd: RawFd, request: u64, arg: &mut T) -> io::Result<()> {
    let rc = unsafe { libc::ioctl(fd, request as _, arg as *mut T) };
    if rc == -1 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use std::os::fd::OwnedFd;
    use std::os::unix::net::UnixStream;
    use tempfile::TempDir;

    fn manager(dir: &TempDir) -> DeviceManager {
        DeviceManager::new().with_device_dir(dir.path())
    }

    fn device_from(file: File, buffer_len: usize) -> BpfDevice {
        BpfDevice {
            file,
            path: PathBuf::from("/dev/bpf-test"),
            interface: "en0".to_string(),
            buffer_len,
            poll_interval: Duration::from_millis(20),
        }
    }

    #[test]
    fn test_device_path() {
        let manager = DeviceManager::new();
        assert_eq!(manager.device_path(0), PathBuf::from("/dev/bpf0"));
        assert_eq!(manager.device_path(12), PathBuf::from("/dev/bpf12"));
    }

    #[test]
    fn test_open_missing_first_node() {
        let dir = TempDir::new().unwrap();

        let result = manager(&dir).open("en0");
        assert!(matches!(result, Err(CaptureError::DeviceUnavailable { .. })));
    }

    #[test]
    fn test_open_first_available() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bpf0"), b"").unwrap();
        fs::write(dir.path().join("bpf1"), b"").unwrap();

        let pending = manager(&dir).open("en0").unwrap();
        assert_eq!(pending.index(), 0);
        assert_eq!(pending.path(), dir.path().join("bpf0"));
    }

    #[test]
    fn test_open_skips_unopenable_node() {
        let dir = TempDir::new().unwrap();
        // A directory exists but cannot be opened for writing
        fs::create_dir(dir.path().join("bpf0")).unwrap();
        fs::write(dir.path().join("bpf1"), b"").unwrap();

        let pending = manager(&dir).open("en0").unwrap();
        assert_eq!(pending.index(), 1);
    }

    #[test]
    fn test_open_stops_at_gap() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("bpf0")).unwrap();
        // bpf1 missing, bpf2 never probed
        fs::write(dir.path().join("bpf2"), b"").unwrap();

        let result = manager(&dir).open("en0");
        assert!(matches!(result, Err(CaptureError::DeviceUnavailable { .. })));
    }

    #[test]
    fn test_open_all_busy() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("bpf0")).unwrap();
        fs::create_dir(dir.path().join("bpf1")).unwrap();

        let result = manager(&dir).with_max_devices(2).open("en0");
        match result {
            Err(CaptureError::DeviceUnavailable { reason, .. }) => {
                assert!(reason.contains("busy"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_open_rejects_bad_interface_name() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bpf0"), b"").unwrap();

        let manager = manager(&dir);
        assert!(matches!(
            manager.open(""),
            Err(CaptureError::InvalidInterface(_))
        ));
        assert!(matches!(
            manager.open("averyveryverylongname0"),
            Err(CaptureError::InvalidInterface(_))
        ));
    }

    #[test]
    fn test_configure_fails_on_non_device() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bpf0"), b"").unwrap();

        let result = manager(&dir).acquire("en0");
        match result {
            Err(CaptureError::Configuration { operation, .. }) => {
                assert_eq!(operation, "BIOCSETIF");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_ifreq_layout() {
        let ifreq = IfReq::new("en0").unwrap();
        assert_eq!(&ifreq.name[..4], b"en0\0");
        assert_eq!(ifreq.family, libc::AF_INET as u16);

        assert!(IfReq::new("fifteen-chars-x").is_ok());
        assert!(IfReq::new("sixteen-chars-xx").is_err());
    }

    #[test]
    fn test_read_batch_returns_data() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("capture");
        fs::write(&path, [1u8, 2, 3, 4, 5, 6]).unwrap();

        let mut device = device_from(File::open(&path).unwrap(), 4);
        let mut buf = vec![0u8; 4];

        assert_eq!(device.read_batch(&mut buf).unwrap(), ReadOutcome::Data(4));
        assert_eq!(buf, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_read_batch_idle_without_traffic() {
        let (local, mut remote) = UnixStream::pair().unwrap();
        let mut device = device_from(File::from(OwnedFd::from(local)), 64);
        let mut buf = vec![0u8; 64];

        assert_eq!(device.read_batch(&mut buf).unwrap(), ReadOutcome::Idle);

        remote.write_all(b"abc").unwrap();
        assert_eq!(device.read_batch(&mut buf).unwrap(), ReadOutcome::Data(3));
        assert_eq!(&buf[..3], b"abc");
    }
}
