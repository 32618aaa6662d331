//! Data record decoding

use super::record::RawRecord;
use crate::layout::VersionLayout;
use crate::types::{Sample, Units};
use crate::{LogError, Result};

/// Decode one data record with the layouts of the session's format version.
///
/// Returns `Ok(None)` for type codes the version has no layout for. A payload
/// whose length differs from the layout is a `MalformedSample`.
pub fn decode_sample(
    record: &RawRecord<'_>,
    layout: &VersionLayout,
    units: Units,
) -> Result<Option<Sample>> {
    let Some(record_layout) = layout.record(record.type_code) else {
        return Ok(None);
    };

    if record.payload.len() != record_layout.length {
        return Err(LogError::MalformedSample {
            offset: record.offset,
            type_code: record.type_code,
            expected: record_layout.length,
            found: record.payload.len(),
        });
    }

    let mut cursor = record.payload_cursor();

    cursor.seek(record_layout.timestamp.byte_offset)?;
    let timestamp = record_layout.timestamp.field_type.read_unsigned(&mut cursor)?.ok_or_else(
        || LogError::layout(format!("record {:#06x} has a signed timestamp", record.type_code)),
    )?;

    let mut values = Vec::with_capacity(record_layout.channels.len());
    for channel in &record_layout.channels {
        cursor.seek(channel.byte_offset)?;
        let raw = channel.field_type.read(&mut cursor)?;
        values.push((channel.name.clone(), channel.convert(raw, units)));
    }

    Ok(Some(Sample::new(record.offset, record.type_code, timestamp, values)))
}
