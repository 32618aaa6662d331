//! Raw storage types of fixed-point payload fields

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::tas::Cursor;

/// Storage type of a field inside a record payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
    F64,
}

impl FieldType {
    /// Returns the size in bytes of this storage type.
    pub const fn size(&self) -> usize {
        match self {
            FieldType::U8 | FieldType::I8 => 1,
            FieldType::U16 | FieldType::I16 => 2,
            FieldType::U32 | FieldType::I32 | FieldType::F32 => 4,
            FieldType::F64 => 8,
        }
    }

    /// Whether values of this type are unsigned integers (usable as timestamps).
    pub const fn is_unsigned(&self) -> bool {
        matches!(self, FieldType::U8 | FieldType::U16 | FieldType::U32)
    }

    /// Read one raw value at the cursor and widen it to `f64`.
    pub fn read(&self, cursor: &mut Cursor<'_>) -> Result<f64> {
        Ok(match self {
            FieldType::U8 => cursor.read_u8()? as f64,
            FieldType::I8 => cursor.read_i8()? as f64,
            FieldType::U16 => cursor.read_u16()? as f64,
            FieldType::I16 => cursor.read_i16()? as f64,
            FieldType::U32 => cursor.read_u32()? as f64,
            FieldType::I32 => cursor.read_i32()? as f64,
            FieldType::F32 => cursor.read_f32()? as f64,
            FieldType::F64 => cursor.read_f64()?,
        })
    }

    /// Read one unsigned integer at the cursor.
    ///
    /// Returns `None` for signed and floating point types.
    pub fn read_unsigned(&self, cursor: &mut Cursor<'_>) -> Result<Option<u64>> {
        Ok(match self {
            FieldType::U8 => Some(cursor.read_u8()? as u64),
            FieldType::U16 => Some(cursor.read_u16()? as u64),
            FieldType::U32 => Some(cursor.read_u32()? as u64),
            _ => None,
        })
    }
}
