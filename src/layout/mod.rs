//! Versioned data record layouts.
//!
//! A [`LayoutTable`] maps a format version to the layouts of the data
//! records that version writes. Each [`RecordLayout`] fixes the payload
//! length, where the timestamp lives, and how every channel converts from
//! raw device units (`physical = raw * scale + offset`).
//!
//! The built-in table covers the firmware versions known to this crate.
//! Tables are plain serde data, so newer firmware can be supported by
//! loading a YAML table instead of changing code:
//!
//! ```rust
//! use tas_runlog::layout::LayoutTable;
//!
//! let yaml = r#"
//! versions:
//!   4:
//!     records:
//!       16:
//!         length: 8
//!         timestamp: { byte_offset: 0, field_type: u32 }
//!         channels:
//!           - { name: speed, unit: m/s, byte_offset: 4, field_type: u16, scale: 0.005, speed_like: true }
//! "#;
//!
//! let table = LayoutTable::from_yaml(yaml).unwrap();
//! assert!(table.version(4).is_some());
//! assert!(table.version(2).is_none());
//! ```

mod builtin;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, LazyLock};
use tracing::debug;

use crate::types::FieldType;
use crate::{LogError, Result};

pub use builtin::MPH_TO_MPS;

static BUILTIN: LazyLock<Arc<LayoutTable>> = LazyLock::new(|| Arc::new(builtin::table()));

/// Layouts for every supported format version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutTable {
    pub versions: BTreeMap<u16, VersionLayout>,
}

impl LayoutTable {
    /// Shared built-in table.
    pub fn builtin() -> Arc<LayoutTable> {
        Arc::clone(&BUILTIN)
    }

    /// Parse and validate a table from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let table: LayoutTable = serde_yaml_ng::from_str(yaml)
            .map_err(|e| LogError::layout(format!("YAML parsing failed: {}", e)))?;
        table.validate()?;
        debug!("Loaded layout table with {} versions", table.versions.len());
        Ok(table)
    }

    /// Serialize the table to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml_ng::to_string(self)
            .map_err(|e| LogError::layout(format!("YAML serialization failed: {}", e)))
    }

    pub fn version(&self, version: u16) -> Option<&VersionLayout> {
        self.versions.get(&version)
    }

    /// Add or replace the layouts of one version.
    pub fn insert(&mut self, version: u16, layout: VersionLayout) -> Result<()> {
        layout.validate(version)?;
        self.versions.insert(version, layout);
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        for (version, layout) in &self.versions {
            if *version == 0 {
                return Err(LogError::layout("format version 0 cannot have a layout"));
            }
            layout.validate(*version)?;
        }
        Ok(())
    }
}

/// Data record layouts of one format version, keyed by type code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionLayout {
    pub records: BTreeMap<u16, RecordLayout>,
}

impl VersionLayout {
    pub fn record(&self, type_code: u16) -> Option<&RecordLayout> {
        self.records.get(&type_code)
    }

    /// Names of every channel this version can produce, sorted and deduplicated.
    pub fn channel_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .records
            .values()
            .flat_map(|record| record.channels.iter().map(|c| c.name.as_ref()))
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Whether any record of this version carries the channel.
    pub fn has_channel(&self, name: &str) -> bool {
        self.records.values().any(|record| record.channel(name).is_some())
    }

    fn validate(&self, version: u16) -> Result<()> {
        for (type_code, record) in &self.records {
            if crate::tas::RecordClass::of(*type_code) != crate::tas::RecordClass::Data {
                return Err(LogError::layout(format!(
                    "version {}: type code {:#06x} is not a data record code",
                    version, type_code
                )));
            }
            record.validate().map_err(|details| {
                LogError::layout(format!(
                    "version {} record {:#06x}: {}",
                    version, type_code, details
                ))
            })?;
        }
        Ok(())
    }
}

/// Layout of one data record payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordLayout {
    /// Exact payload length in bytes
    pub length: usize,
    pub timestamp: TimestampField,
    pub channels: Vec<ChannelField>,
}

impl RecordLayout {
    pub fn channel(&self, name: &str) -> Option<&ChannelField> {
        self.channels.iter().find(|channel| channel.name.as_ref() == name)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if !self.timestamp.field_type.is_unsigned() {
            return Err(format!(
                "timestamp must be an unsigned integer, got {:?}",
                self.timestamp.field_type
            ));
        }
        if !fits(self.timestamp.byte_offset, self.timestamp.field_type, self.length) {
            return Err(format!("timestamp does not fit in {} bytes", self.length));
        }

        let mut seen = HashSet::new();
        for channel in &self.channels {
            if channel.name.is_empty() {
                return Err("channel name is empty".to_string());
            }
            if !seen.insert(channel.name.as_ref()) {
                return Err(format!("channel '{}' defined twice", channel.name));
            }
            if !fits(channel.byte_offset, channel.field_type, self.length) {
                return Err(format!(
                    "channel '{}' at offset {} does not fit in {} bytes",
                    channel.name, channel.byte_offset, self.length
                ));
            }
            if !channel.scale.is_finite() || !channel.offset.is_finite() {
                return Err(format!("channel '{}' has a non-finite conversion", channel.name));
            }
        }
        Ok(())
    }
}

fn fits(byte_offset: usize, field_type: FieldType, length: usize) -> bool {
    byte_offset.checked_add(field_type.size()).is_some_and(|end| end <= length)
}

/// Location of the sample timestamp (milliseconds since session start).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimestampField {
    pub byte_offset: usize,
    pub field_type: FieldType,
}

/// A channel stored as a fixed-point field of a data record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelField {
    pub name: Arc<str>,
    /// Physical unit of the converted value
    pub unit: String,
    pub byte_offset: usize,
    pub field_type: FieldType,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub offset: f64,
    /// Recorded in mph when the dashboard runs in imperial units
    #[serde(default)]
    pub speed_like: bool,
}

fn default_scale() -> f64 {
    1.0
}

impl ChannelField {
    /// Convert a raw field value to physical units.
    pub fn convert(&self, raw: f64, units: crate::types::Units) -> f64 {
        let value = raw * self.scale + self.offset;
        match units {
            crate::types::Units::Imperial if self.speed_like => value * MPH_TO_MPS,
            _ => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels;
    use crate::tas::record::{DATA_AERO, DATA_POWER, DATA_SPEED};
    use crate::types::Units;

    #[test]
    fn builtin_table_is_valid() {
        let table = LayoutTable::builtin();
        table.validate().unwrap();
        assert_eq!(table.versions.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn builtin_version_channels() {
        let table = LayoutTable::builtin();
        assert_eq!(table.version(1).unwrap().channel_names(), vec!["power", "speed"]);

        let v2 = table.version(2).unwrap();
        assert!(v2.has_channel(channels::CG_SPEED));
        assert!(!v2.has_channel(channels::TEMPERATURE));
        assert_eq!(v2.record(DATA_SPEED).unwrap().length, 8);
        assert_eq!(v2.record(DATA_AERO).unwrap().length, 12);

        let v3 = table.version(3).unwrap();
        assert!(v3.has_channel(channels::TEMPERATURE));
        assert!(v3.has_channel(channels::POWER_EVENT_TIME));
        assert_eq!(v3.record(DATA_POWER).unwrap().length, 12);
    }

    #[test]
    fn conversion_applies_scale_offset_and_units() {
        let v3 = LayoutTable::builtin();
        let aero = v3.version(3).unwrap().record(DATA_AERO).unwrap();

        let temperature = aero.channel(channels::TEMPERATURE).unwrap();
        assert_eq!(temperature.convert(130.0, Units::Metric), 25.0);
        assert_eq!(temperature.convert(130.0, Units::Imperial), 25.0);

        let cg = aero.channel(channels::CG_SPEED).unwrap();
        assert_eq!(cg.convert(1000.0, Units::Metric), 10.0);
        assert!((cg.convert(1000.0, Units::Imperial) - 4.4704).abs() < 1e-12);
    }

    #[test]
    fn yaml_round_trip_preserves_table() {
        let table = LayoutTable::builtin();
        let yaml = table.to_yaml().unwrap();
        let parsed = LayoutTable::from_yaml(&yaml).unwrap();
        assert_eq!(&parsed, table.as_ref());
    }

    #[test]
    fn rejects_field_outside_record() {
        let yaml = r#"
versions:
  2:
    records:
      16:
        length: 6
        timestamp: { byte_offset: 0, field_type: u32 }
        channels:
          - { name: speed, unit: m/s, byte_offset: 4, field_type: u32 }
"#;
        let err = LayoutTable::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, LogError::Layout { .. }));
        assert!(err.to_string().contains("does not fit"));
    }

    #[test]
    fn rejects_offsets_that_overflow() {
        let channel = r#"
versions:
  2:
    records:
      16:
        length: 8
        timestamp: { byte_offset: 0, field_type: u32 }
        channels:
          - { name: speed, unit: m/s, byte_offset: 18446744073709551615, field_type: u16 }
"#;
        let err = LayoutTable::from_yaml(channel).unwrap_err();
        assert!(matches!(err, LogError::Layout { .. }));
        assert!(err.to_string().contains("does not fit"));

        let timestamp = r#"
versions:
  2:
    records:
      16:
        length: 8
        timestamp: { byte_offset: 18446744073709551614, field_type: u32 }
        channels: []
"#;
        assert!(LayoutTable::from_yaml(timestamp).is_err());
    }

    #[test]
    fn rejects_signed_timestamp_and_duplicate_channels() {
        let signed = r#"
versions:
  2:
    records:
      16:
        length: 8
        timestamp: { byte_offset: 0, field_type: i32 }
        channels: []
"#;
        assert!(LayoutTable::from_yaml(signed).is_err());

        let duplicate = r#"
versions:
  2:
    records:
      16:
        length: 8
        timestamp: { byte_offset: 0, field_type: u32 }
        channels:
          - { name: speed, unit: m/s, byte_offset: 4, field_type: u16 }
          - { name: speed, unit: m/s, byte_offset: 6, field_type: u16 }
"#;
        let err = LayoutTable::from_yaml(duplicate).unwrap_err();
        assert!(err.to_string().contains("defined twice"));
    }

    #[test]
    fn rejects_configuration_codes_and_version_zero() {
        let config_code = r#"
versions:
  2:
    records:
      1:
        length: 4
        timestamp: { byte_offset: 0, field_type: u32 }
        channels: []
"#;
        assert!(LayoutTable::from_yaml(config_code).is_err());

        let version_zero = r#"
versions:
  0:
    records: {}
"#;
        assert!(LayoutTable::from_yaml(version_zero).is_err());
    }

    #[test]
    fn insert_validates_layout() {
        let mut table = LayoutTable::default();
        let bad = VersionLayout {
            records: BTreeMap::from([(
                DATA_SPEED,
                RecordLayout {
                    length: 2,
                    timestamp: TimestampField { byte_offset: 0, field_type: FieldType::U32 },
                    channels: vec![],
                },
            )]),
        };
        assert!(table.insert(7, bad).is_err());
        assert!(table.version(7).is_none());
    }
}
