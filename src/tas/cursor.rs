//! Bounds-checked little-endian reader over in-memory bytes

use crate::{LogError, Result};

/// Reader over a byte slice that tracks its position.
///
/// Offsets reported in errors are absolute: a cursor over a record payload
/// is created with the payload's file offset as its origin.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    position: usize,
    origin: usize,
}

macro_rules! read_le {
    ($name:ident, $t:ty) => {
        #[doc = concat!("Read a little-endian `", stringify!($t), "`.")]
        pub fn $name(&mut self) -> Result<$t> {
            Ok(<$t>::from_le_bytes(self.take::<{ size_of::<$t>() }>()?))
        }
    };
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_origin(data, 0)
    }

    /// Cursor whose reported offsets start at `origin`.
    pub fn with_origin(data: &'a [u8], origin: usize) -> Self {
        Self { data, position: 0, origin }
    }

    /// Position relative to the start of the slice.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Absolute offset of the next byte.
    pub fn offset(&self) -> usize {
        self.origin + self.position
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Move to a position relative to the start of the slice.
    ///
    /// Seeking to the very end is allowed; past it is truncation.
    pub fn seek(&mut self, position: usize) -> Result<()> {
        if position > self.data.len() {
            return Err(LogError::TruncatedInput {
                offset: self.origin + self.data.len(),
                needed: position - self.data.len(),
                available: 0,
            });
        }
        self.position = position;
        Ok(())
    }

    /// Borrow the next `n` bytes and advance past them.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let bytes = self
            .data
            .get(self.position..self.position.saturating_add(n))
            .ok_or_else(|| self.truncated(n))?;
        self.position += n;
        Ok(bytes)
    }

    read_le!(read_u8, u8);
    read_le!(read_i8, i8);
    read_le!(read_u16, u16);
    read_le!(read_i16, i16);
    read_le!(read_u32, u32);
    read_le!(read_i32, i32);
    read_le!(read_f32, f32);
    read_le!(read_f64, f64);

    /// Take an exact number of bytes, advancing the position.
    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0; N];
        buf.copy_from_slice(self.read_bytes(N)?);
        Ok(buf)
    }

    fn truncated(&self, needed: usize) -> LogError {
        LogError::TruncatedInput { offset: self.offset(), needed, available: self.remaining() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn reads_advance_by_width() {
        let mut data = Vec::new();
        data.push(0x7F);
        data.extend_from_slice(&0xBEEFu16.to_le_bytes());
        data.extend_from_slice(&0xDEADBEEFu32.to_le_bytes());
        data.extend_from_slice(&1.5f32.to_le_bytes());
        data.extend_from_slice(&(-2.25f64).to_le_bytes());

        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.read_u8().unwrap(), 0x7F);
        assert_eq!(cursor.position(), 1);
        assert_eq!(cursor.read_u16().unwrap(), 0xBEEF);
        assert_eq!(cursor.position(), 3);
        assert_eq!(cursor.read_u32().unwrap(), 0xDEADBEEF);
        assert_eq!(cursor.read_f32().unwrap(), 1.5);
        assert_eq!(cursor.read_f64().unwrap(), -2.25);
        assert!(cursor.is_empty());
    }

    #[test]
    fn truncated_read_reports_offset_and_keeps_position() {
        let data = [1u8, 2, 3];
        let mut cursor = Cursor::with_origin(&data, 100);
        cursor.read_u8().unwrap();

        match cursor.read_u32() {
            Err(LogError::TruncatedInput { offset, needed, available }) => {
                assert_eq!(offset, 101);
                assert_eq!(needed, 4);
                assert_eq!(available, 2);
            }
            other => panic!("Expected TruncatedInput, got {:?}", other),
        }
        assert_eq!(cursor.position(), 1);
        assert_eq!(cursor.read_u16().unwrap(), u16::from_le_bytes([2, 3]));
    }

    #[test]
    fn seek_within_and_past_end() {
        let data = [0u8; 8];
        let mut cursor = Cursor::new(&data);
        cursor.seek(8).unwrap();
        assert_eq!(cursor.remaining(), 0);
        cursor.seek(2).unwrap();
        assert_eq!(cursor.remaining(), 6);
        assert!(matches!(cursor.seek(9), Err(LogError::TruncatedInput { offset: 8, .. })));
    }

    #[test]
    fn read_bytes_borrows_from_source() {
        let data = b"abcdef";
        let mut cursor = Cursor::new(data);
        cursor.seek(1).unwrap();
        assert_eq!(cursor.read_bytes(3).unwrap(), b"bcd");
        assert!(cursor.read_bytes(usize::MAX).is_err());
        assert_eq!(cursor.offset(), 4);
    }

    proptest! {
        #[test]
        fn prop_reads_never_pass_the_end(
            data in prop::collection::vec(any::<u8>(), 0..32),
            widths in prop::collection::vec(prop::sample::select(vec![1usize, 2, 4, 8]), 0..16)
        ) {
            let mut cursor = Cursor::new(&data);
            for width in widths {
                let before = cursor.position();
                let result = match width {
                    1 => cursor.read_u8().map(|_| ()),
                    2 => cursor.read_u16().map(|_| ()),
                    4 => cursor.read_u32().map(|_| ()),
                    _ => cursor.read_f64().map(|_| ()),
                };
                if before + width <= data.len() {
                    prop_assert!(result.is_ok());
                    prop_assert_eq!(cursor.position(), before + width);
                } else {
                    prop_assert!(result.is_err());
                    prop_assert_eq!(cursor.position(), before);
                }
            }
        }
    }
}
