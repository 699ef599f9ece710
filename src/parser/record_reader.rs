//! Walks the capture records packed into a single device read.
//!
//! Buffer layout, one entry per captured frame:
//!
//! ```text
//! offset ──► +-------------------------+
//!            | envelope (18 bytes)     |  ts_sec, ts_usec, caplen, datalen: u32
//!            |                         |  hdrlen: u16       (host byte order)
//!            +-------------------------+ ◄── offset + hdrlen
//!            | frame (caplen bytes)    |
//!            +-------------------------+
//!            | padding to 4 bytes      |
//!            +-------------------------+ ◄── offset + align4(hdrlen + caplen)
//! ```

use crate::domain::CaptureRecord;

/// Decode the envelope at `offset`.
///
/// Returns `None` at the end of the buffer, and also when fewer than
/// [`CaptureRecord::ENVELOPE_LEN`] bytes remain.
pub fn next_record(buffer: &[u8], offset: usize) -> Option<CaptureRecord> {
    let end = offset.checked_add(CaptureRecord::ENVELOPE_LEN)?;
    let env = buffer.get(offset..end)?;

    Some(CaptureRecord {
        ts_sec: u32::from_ne_bytes([env[0], env[1], env[2], env[3]]),
        ts_usec: u32::from_ne_bytes([env[4], env[5], env[6], env[7]]),
        captured_len: u32::from_ne_bytes([env[8], env[9], env[10], env[11]]),
        original_len: u32::from_ne_bytes([env[12], env[13], env[14], env[15]]),
        header_len: u16::from_ne_bytes([env[16], env[17]]),
    })
}

/// Offset of the envelope following the record at `offset`.
pub fn next_offset(offset: usize, record: &CaptureRecord) -> usize {
    offset.saturating_add(record.aligned_len())
}

/// The captured frame of the record at `offset`.
///
/// A frame claiming more bytes than the buffer holds is cut at the buffer end.
pub fn packet_bytes<'a>(buffer: &'a [u8], offset: usize, record: &CaptureRecord) -> &'a [u8] {
    let start = offset
        .saturating_add(usize::from(record.header_len))
        .min(buffer.len());
    let end = start
        .saturating_add(record.captured_len as usize)
        .min(buffer.len());
    &buffer[start..end]
}

/// One record and the frame it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordView<'a> {
    /// Offset of the envelope within the read buffer
    pub offset: usize,
    pub record: CaptureRecord,
    pub packet: &'a [u8],
}

/// Iterator over all records in a read buffer, in order.
pub struct Records<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> Records<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    /// Offset of the next envelope to decode.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = RecordView<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.buffer.len() {
            return None;
        }

        let Some(record) = next_record(self.buffer, self.offset) else {
            tracing::debug!(
                "Truncated capture envelope at offset {} of {}",
                self.offset,
                self.buffer.len()
            );
            self.offset = self.buffer.len();
            return None;
        };

        // A zero header length would never advance past this envelope
        if record.header_len == 0 {
            tracing::debug!("Zero header length at offset {}, dropping rest of read", self.offset);
            self.offset = self.buffer.len();
            return None;
        }

        let view = RecordView {
            offset: self.offset,
            record,
            packet: packet_bytes(self.buffer, self.offset, &record),
        };
        self.offset = next_offset(self.offset, &record);

        Some(view)
    }
}
