//! Record framing and tokenization
//!
//! Every record in a run log, header or data, is framed the same way:
//!
//! ```text
//! +-----------+--------+------------------+
//! | type: u16 | len:u16| payload[len]     |
//! +-----------+--------+------------------+
//! ```
//!
//! The tokenizer knows nothing about type codes beyond their class; unknown
//! codes are passed through so newer firmware records do not break older
//! decoders.

use super::Cursor;
use crate::{LogError, Result};

/// Size of the type code + length prefix of every record.
pub const RECORD_HEADER_SIZE: usize = 4;

/// Explicit end-of-header marker.
pub const END_OF_HEADER: u16 = 0x0000;
/// Format version and unit system.
pub const CONFIG_FORMAT: u16 = 0x0001;
/// Session start and run number.
pub const CONFIG_SESSION: u16 = 0x0002;
/// Speed sensor id and wheel circumference.
pub const CONFIG_SPEED_SENSOR: u16 = 0x0003;
/// Power sensor id and torque offset.
pub const CONFIG_POWER_SENSOR: u16 = 0x0004;
/// Rider and bike mass.
pub const CONFIG_RIDER: u16 = 0x0005;
/// Air density, rolling resistance and yaw offset calibration.
pub const CONFIG_CALIBRATION: u16 = 0x0006;
/// Firmware version and device name.
pub const CONFIG_DEVICE: u16 = 0x0007;

/// Speed data record.
pub const DATA_SPEED: u16 = 0x0010;
/// Power data record.
pub const DATA_POWER: u16 = 0x0011;
/// Aerodynamic sensor data record.
pub const DATA_AERO: u16 = 0x0012;

/// Class of a record, decided by its type code alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordClass {
    EndOfHeader,
    Configuration,
    Data,
}

impl RecordClass {
    pub fn of(type_code: u16) -> Self {
        match type_code {
            END_OF_HEADER => RecordClass::EndOfHeader,
            0x0001..=0x000F => RecordClass::Configuration,
            _ => RecordClass::Data,
        }
    }
}

/// One framed record borrowed from the file bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRecord<'a> {
    pub type_code: u16,
    pub payload: &'a [u8],
    /// Byte offset of the record header in the file
    pub offset: usize,
}

impl<'a> RawRecord<'a> {
    pub fn class(&self) -> RecordClass {
        RecordClass::of(self.type_code)
    }

    /// Offset of the first payload byte.
    pub fn payload_offset(&self) -> usize {
        self.offset + RECORD_HEADER_SIZE
    }

    /// Offset of the record following this one.
    pub fn end(&self) -> usize {
        self.payload_offset() + self.payload.len()
    }

    /// Cursor over the payload reporting absolute file offsets.
    pub fn payload_cursor(&self) -> Cursor<'a> {
        Cursor::with_origin(self.payload, self.payload_offset())
    }
}

/// Read the record at the cursor.
///
/// Returns `Ok(None)` on a clean end of input at a record boundary. A header
/// cut short fails with `TruncatedInput`; a payload running past the end of
/// input fails with `MalformedRecord`. On failure the cursor is left at the
/// record start.
pub fn read_record<'a>(cursor: &mut Cursor<'a>) -> Result<Option<RawRecord<'a>>> {
    if cursor.is_empty() {
        return Ok(None);
    }

    let start = cursor.position();
    let offset = cursor.offset();

    let header = cursor.read_bytes(RECORD_HEADER_SIZE)?;
    let type_code = u16::from_le_bytes([header[0], header[1]]);
    let declared = u16::from_le_bytes([header[2], header[3]]) as usize;

    if declared > cursor.remaining() {
        let available = cursor.remaining();
        cursor.seek(start)?;
        return Err(LogError::MalformedRecord { offset, type_code, declared, available });
    }

    let payload = cursor.read_bytes(declared)?;
    Ok(Some(RawRecord { type_code, payload, offset }))
}

/// Lazy, single-pass sequence of records.
///
/// The sequence ends at a clean record boundary and is fused after the
/// first error.
#[derive(Debug, Clone)]
pub struct RecordTokenizer<'a> {
    cursor: Cursor<'a>,
    done: bool,
}

impl<'a> RecordTokenizer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { cursor: Cursor::new(data), done: false }
    }

    /// Tokenizer starting at a record boundary inside `data`.
    pub fn starting_at(data: &'a [u8], position: usize) -> Result<Self> {
        let mut cursor = Cursor::new(data);
        cursor.seek(position)?;
        Ok(Self { cursor, done: false })
    }

    /// Offset of the next record to be read.
    pub fn position(&self) -> usize {
        self.cursor.position()
    }
}

impl<'a> Iterator for RecordTokenizer<'a> {
    type Item = Result<RawRecord<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match read_record(&mut self.cursor) {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl std::iter::FusedIterator for RecordTokenizer<'_> {}
