//! The per-packet envelope the kernel packet filter writes into its read buffer.

use std::time::Duration;

/// Header the kernel prepends to every captured frame in a read buffer.
///
/// All fields are in host byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRecord {
    pub ts_sec: u32,
    pub ts_usec: u32,
    /// Bytes of the frame actually stored in the buffer.
    pub captured_len: u32,
    /// Bytes of the frame as seen on the wire.
    pub original_len: u32,
    /// Distance from the start of the envelope to the frame.
    pub header_len: u16,
}

impl CaptureRecord {
    /// Size of the fixed fields: two timestamps, two lengths, one u16.
    pub const ENVELOPE_LEN: usize = 18;

    /// Capture time as an offset from the Unix epoch.
    pub fn timestamp(&self) -> Duration {
        Duration::new(u64::from(self.ts_sec), self.ts_usec.saturating_mul(1_000))
    }

    /// Whether the stored bytes are fewer than the wire bytes (snaplen cut).
    pub fn is_truncated(&self) -> bool {
        self.captured_len < self.original_len
    }

    /// Bytes from the start of this envelope to the start of the next one.
    ///
    /// Records are padded so that every envelope starts on a 4-byte boundary.
    pub fn aligned_len(&self) -> usize {
        word_align(usize::from(self.header_len) + self.captured_len as usize)
    }
}

/// Rounds `len` up to the next multiple of 4.
pub(crate) fn word_align(len: usize) -> usize {
    len.saturating_add(3) & !3
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(header_len: u16, captured_len: u32) -> CaptureRecord {
        CaptureRecord {
            ts_sec: 1_700_000_000,
            ts_usec: 250_000,
            captured_len,
            original_len: captured_len,
            header_len,
        }
    }

    #[test]
    fn test_word_align() {
        assert_eq!(word_align(0), 0);
        assert_eq!(word_align(1), 4);
        assert_eq!(word_align(4), 4);
        assert_eq!(word_align(61), 64);
        assert_eq!(word_align(62), 64);
        assert_eq!(word_align(64), 64);
    }

    #[test]
    fn test_aligned_len_is_smallest_multiple_of_four() {
        for header_len in 1u16..40 {
            for captured_len in 0u32..80 {
                let total = usize::from(header_len) + captured_len as usize;
                let aligned = record(header_len, captured_len).aligned_len();
                assert_eq!(aligned % 4, 0);
                assert!(aligned >= total);
                assert!(aligned < total + 4);
            }
        }
    }

    #[test]
    fn test_timestamp() {
        let ts = record(18, 60).timestamp();
        assert_eq!(ts.as_secs(), 1_700_000_000);
        assert_eq!(ts.subsec_micros(), 250_000);
    }

    #[test]
    fn test_is_truncated() {
        let mut r = record(18, 60);
        assert!(!r.is_truncated());
        r.original_len = 1514;
        assert!(r.is_truncated());
    }
}
