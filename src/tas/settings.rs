//! Settings decoding from configuration records
//!
//! Each recognized configuration type code has a fixed payload layout:
//!
//! ```text
//! 0x0001 FORMAT        u16 format_version | u16 units
//! 0x0002 SESSION       u32 start (unix s) | u16 run_number | u16 pad
//! 0x0003 SPEED_SENSOR  u16 sensor_id | u16 pad | f32 wheel circumference (m)
//! 0x0004 POWER_SENSOR  u16 sensor_id | u16 pad | f32 torque offset
//! 0x0005 RIDER         f32 rider mass (kg) | f32 bike mass (kg)
//! 0x0006 CALIBRATION   f32 air density | f32 rolling resistance | f32 yaw offset
//! 0x0007 DEVICE        u16 firmware | u16 pad | device name (UTF-8)
//! ```
//!
//! Trailing payload bytes are ignored so newer firmware can extend a record.

use chrono::{DateTime, Utc};
use tracing::{debug, trace, warn};

use super::record::{
    CONFIG_CALIBRATION, CONFIG_DEVICE, CONFIG_FORMAT, CONFIG_POWER_SENSOR, CONFIG_RIDER,
    CONFIG_SESSION, CONFIG_SPEED_SENSOR, RawRecord, RecordClass, read_record,
};
use super::Cursor;
use crate::types::{SettingField, SettingValue, Settings, Units};
use crate::{LogError, Result};

/// Settings plus the position where the data region begins.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderRegion {
    pub settings: Settings,
    /// Offset of the first record after the header region
    pub data_start: usize,
}

/// Decode every configuration record of a record sequence into settings.
///
/// Records outside the configuration class and unrecognized configuration
/// codes are skipped. Later records overwrite earlier values.
pub fn decode_settings<'a, I>(records: I) -> Result<Settings>
where
    I: IntoIterator<Item = RawRecord<'a>>,
{
    let mut settings = Settings::default();
    for record in records {
        if record.class() == RecordClass::Configuration {
            apply_record(&mut settings, &record)?;
        }
    }
    Ok(settings)
}

/// Scan the leading configuration records of a run log.
///
/// The scan stops at an end-of-header marker (consumed), at the first data
/// record (not consumed) or at the end of input. A framing error also stops
/// the scan: the settings decoded so far are kept and the data region starts
/// at the broken record, so channel sequences report the same failure.
pub fn scan_header(data: &[u8]) -> Result<HeaderRegion> {
    let mut cursor = Cursor::new(data);
    let mut settings = Settings::default();

    let data_start = loop {
        let start = cursor.position();
        let record = match read_record(&mut cursor) {
            Ok(Some(record)) => record,
            Ok(None) => break start,
            Err(err) => {
                warn!("Header region ends at a broken record: {}", err);
                break start;
            }
        };

        match record.class() {
            RecordClass::Configuration => apply_record(&mut settings, &record)?,
            RecordClass::EndOfHeader => break record.end(),
            RecordClass::Data => break start,
        }
    };

    debug!("Decoded {} settings fields, data region starts at {:#x}", settings.len(), data_start);
    Ok(HeaderRegion { settings, data_start })
}

fn apply_record(settings: &mut Settings, record: &RawRecord<'_>) -> Result<()> {
    let mut c = record.payload_cursor();

    match record.type_code {
        CONFIG_FORMAT => {
            let version = c.read_u16()?;
            let units = c.read_u16()?;
            if version == 0 {
                return Err(LogError::invalid_setting(
                    SettingField::FormatVersion,
                    "format version 0 is reserved",
                ));
            }
            let units = Units::from_code(units).ok_or_else(|| {
                let reason = format!("unknown unit code {}", units);
                LogError::invalid_setting(SettingField::Units, reason)
            })?;
            settings.insert(SettingField::FormatVersion, SettingValue::Integer(version.into()));
            settings.insert(SettingField::Units, SettingValue::Units(units));
        }
        CONFIG_SESSION => {
            let start = c.read_u32()?;
            let run_number = c.read_u16()?;
            let start_time: DateTime<Utc> = DateTime::from_timestamp(start.into(), 0)
                .ok_or_else(|| {
                    LogError::invalid_setting(
                        SettingField::SessionStart,
                        format!("{} is not a valid timestamp", start),
                    )
                })?;
            settings.insert(SettingField::SessionStart, SettingValue::Integer(start.into()));
            settings.insert(
                SettingField::StartDate,
                SettingValue::Text(start_time.format("%Y-%m-%d").to_string()),
            );
            settings.insert(
                SettingField::StartTime,
                SettingValue::Text(start_time.format("%H:%M:%S").to_string()),
            );
            settings.insert(SettingField::RunNumber, SettingValue::Integer(run_number.into()));
        }
        CONFIG_SPEED_SENSOR => {
            let sensor_id = c.read_u16()?;
            c.read_u16()?;
            let circumference = positive(SettingField::WheelCircumference, c.read_f32()?)?;
            settings.insert(SettingField::SpeedSensorId, SettingValue::Integer(sensor_id.into()));
            settings.insert(SettingField::WheelCircumference, SettingValue::Float(circumference));
        }
        CONFIG_POWER_SENSOR => {
            let sensor_id = c.read_u16()?;
            c.read_u16()?;
            let offset = finite(SettingField::PowerOffset, c.read_f32()?)?;
            settings.insert(SettingField::PowerSensorId, SettingValue::Integer(sensor_id.into()));
            settings.insert(SettingField::PowerOffset, SettingValue::Float(offset));
        }
        CONFIG_RIDER => {
            let rider = positive(SettingField::RiderMass, c.read_f32()?)?;
            let bike = positive(SettingField::BikeMass, c.read_f32()?)?;
            settings.insert(SettingField::RiderMass, SettingValue::Float(rider));
            settings.insert(SettingField::BikeMass, SettingValue::Float(bike));
        }
        CONFIG_CALIBRATION => {
            let density = positive(SettingField::AirDensity, c.read_f32()?)?;
            let crr = finite(SettingField::RollingResistance, c.read_f32()?)?;
            if crr < 0.0 {
                return Err(LogError::invalid_setting(
                    SettingField::RollingResistance,
                    format!("{} is negative", crr),
                ));
            }
            let yaw_offset = finite(SettingField::YawOffset, c.read_f32()?)?;
            settings.insert(SettingField::AirDensity, SettingValue::Float(density));
            settings.insert(SettingField::RollingResistance, SettingValue::Float(crr));
            settings.insert(SettingField::YawOffset, SettingValue::Float(yaw_offset));
        }
        CONFIG_DEVICE => {
            let firmware = c.read_u16()?;
            c.read_u16()?;
            let rest = c.remaining();
            let name = c.read_bytes(rest)?;
            settings.insert(SettingField::FirmwareVersion, SettingValue::Integer(firmware.into()));
            settings.insert(SettingField::DeviceName, SettingValue::Text(device_name(name)));
        }
        other => {
            trace!(
                "Skipping unrecognized configuration record {:#06x} at {:#x}",
                other, record.offset
            );
        }
    }

    Ok(())
}

fn finite(field: SettingField, value: f32) -> Result<f64> {
    if !value.is_finite() {
        return Err(LogError::invalid_setting(field, format!("{} is not finite", value)));
    }
    Ok(value as f64)
}

fn positive(field: SettingField, value: f32) -> Result<f64> {
    let value = finite(field, value)?;
    if value <= 0.0 {
        return Err(LogError::invalid_setting(field, format!("{} is not positive", value)));
    }
    Ok(value)
}

/// NUL-terminated, lossily decoded device name.
fn device_name(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).trim().to_string()
}
