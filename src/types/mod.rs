//! Core types for decoded run log data.
//!
//! This module holds the values the decoder hands to consumers:
//! - [`Settings`] is the immutable header map, keyed by the closed [`SettingField`] set
//! - [`Sample`] is one decoded data record with values already in physical units
//! - [`Reading`] pairs a single channel value with its timestamp
//! - [`FieldType`] describes how a raw payload field is stored
//!
//! ## Usage Example
//!
//! ```rust
//! use tas_runlog::types::{FieldType, SettingField};
//! use tas_runlog::tas::Cursor;
//!
//! let payload = 500u16.to_le_bytes();
//! let mut cursor = Cursor::new(&payload);
//! let raw = FieldType::U16.read(&mut cursor).unwrap();
//! assert_eq!(raw * 0.02, 10.0);
//!
//! assert_eq!(SettingField::from_name("format_version"), Some(SettingField::FormatVersion));
//! ```

mod field_type;
mod sample;
mod settings;

pub use field_type::FieldType;
pub use sample::{Reading, Sample};
pub use settings::{SettingField, SettingValue, Settings, Units};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tas::Cursor;

    use proptest::prelude::*;

    fn arb_field_type() -> impl Strategy<Value = FieldType> {
        prop::sample::select(vec![
            FieldType::U8,
            FieldType::I8,
            FieldType::U16,
            FieldType::I16,
            FieldType::U32,
            FieldType::I32,
            FieldType::F32,
            FieldType::F64,
        ])
    }

    proptest! {
        #[test]
        fn prop_field_type_read_consumes_its_size(
            field_type in arb_field_type(),
            bytes in prop::collection::vec(any::<u8>(), 8..16)
        ) {
            let mut cursor = Cursor::new(&bytes);
            let _ = field_type.read(&mut cursor);
            prop_assert_eq!(cursor.position(), field_type.size());
        }

        #[test]
        fn prop_u16_field_reads_little_endian(value in any::<u16>()) {
            let bytes = value.to_le_bytes();
            let mut cursor = Cursor::new(&bytes);
            prop_assert_eq!(FieldType::U16.read(&mut cursor).unwrap(), value as f64);
        }

        #[test]
        fn prop_i16_field_keeps_sign(value in any::<i16>()) {
            let bytes = value.to_le_bytes();
            let mut cursor = Cursor::new(&bytes);
            prop_assert_eq!(FieldType::I16.read(&mut cursor).unwrap(), value as f64);
        }

        #[test]
        fn prop_setting_names_round_trip(index in 0..SettingField::ALL.len()) {
            let field = SettingField::ALL[index];
            prop_assert_eq!(SettingField::from_name(field.as_str()), Some(field));
        }
    }

    #[test]
    fn field_type_size_returns_correct_values() {
        assert_eq!(FieldType::U8.size(), 1);
        assert_eq!(FieldType::I8.size(), 1);
        assert_eq!(FieldType::U16.size(), 2);
        assert_eq!(FieldType::I16.size(), 2);
        assert_eq!(FieldType::U32.size(), 4);
        assert_eq!(FieldType::I32.size(), 4);
        assert_eq!(FieldType::F32.size(), 4);
        assert_eq!(FieldType::F64.size(), 8);
    }

    #[test]
    fn only_unsigned_integers_read_as_timestamps() {
        let bytes = 1000u32.to_le_bytes();
        let mut cursor = Cursor::new(&bytes);
        assert_eq!(FieldType::U32.read_unsigned(&mut cursor).unwrap(), Some(1000));

        let mut cursor = Cursor::new(&bytes);
        assert_eq!(FieldType::F32.read_unsigned(&mut cursor).unwrap(), None);
        assert!(!FieldType::I32.is_unsigned());
    }

    #[test]
    fn units_codes() {
        assert_eq!(Units::from_code(0), Some(Units::Metric));
        assert_eq!(Units::from_code(1), Some(Units::Imperial));
        assert_eq!(Units::from_code(2), None);
    }

    #[test]
    fn settings_typed_accessors() {
        let mut settings = Settings::default();
        assert!(settings.is_empty());
        assert_eq!(settings.units(), Units::Metric);

        settings.insert(SettingField::FormatVersion, SettingValue::Integer(2));
        settings.insert(SettingField::Units, SettingValue::Units(Units::Imperial));
        settings.insert(SettingField::WheelCircumference, SettingValue::Float(2.096));
        settings.insert(SettingField::SessionStart, SettingValue::Integer(1_700_000_000));

        assert_eq!(settings.format_version(), Some(2));
        assert_eq!(settings.units(), Units::Imperial);
        assert_eq!(settings.wheel_circumference(), Some(2.096));
        assert_eq!(settings.get_by_name("format_version"), Some(&SettingValue::Integer(2)));
        assert_eq!(settings.get_by_name("no_such_field"), None);
        assert_eq!(settings.session_start().map(|t| t.timestamp()), Some(1_700_000_000));
        assert_eq!(settings.len(), 4);
    }

    #[test]
    fn settings_serialize_by_field_name() {
        let mut settings = Settings::default();
        settings.insert(SettingField::FormatVersion, SettingValue::Integer(3));
        settings.insert(SettingField::Units, SettingValue::Units(Units::Metric));
        settings.insert(SettingField::DeviceName, SettingValue::Text("TAS".into()));

        let yaml = serde_yaml_ng::to_string(&settings).unwrap();
        assert!(yaml.contains("format_version: 3"));
        assert!(yaml.contains("units: metric"));

        let parsed: Settings = serde_yaml_ng::from_str(&yaml).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn settings_text_fields_keep_unit_names() {
        let mut settings = Settings::default();
        settings.insert(SettingField::Units, SettingValue::Units(Units::Imperial));
        settings.insert(SettingField::DeviceName, SettingValue::Text("metric".into()));

        let yaml = serde_yaml_ng::to_string(&settings).unwrap();
        let parsed: Settings = serde_yaml_ng::from_str(&yaml).unwrap();
        assert_eq!(parsed, settings);
        assert_eq!(parsed.device_name(), Some("metric"));
        assert_eq!(parsed.units(), Units::Imperial);

        assert!(serde_yaml_ng::from_str::<Settings>("units: 3").is_err());
    }

    #[test]
    fn samples_and_readings_serialize() {
        let sample = Sample::new(24, 0x10, 1500, vec![("speed".into(), 10.0)]);
        let yaml = serde_yaml_ng::to_string(&sample).unwrap();
        let parsed: Sample = serde_yaml_ng::from_str(&yaml).unwrap();
        assert_eq!(parsed, sample);

        let reading = Reading { timestamp: 1500, value: 10.0 };
        let parsed: Reading =
            serde_yaml_ng::from_str(&serde_yaml_ng::to_string(&reading).unwrap()).unwrap();
        assert_eq!(parsed, reading);
    }

    #[test]
    fn sample_wall_clock_uses_session_start() {
        let mut settings = Settings::default();
        let sample = Sample::new(0, 0x10, 1500, vec![("speed".into(), 10.0)]);
        assert_eq!(sample.wall_clock(&settings), None);

        settings.insert(SettingField::SessionStart, SettingValue::Integer(1_700_000_000));
        let time = sample.wall_clock(&settings).unwrap();
        assert_eq!(time.timestamp_millis(), 1_700_000_001_500);
        assert_eq!(sample.get("speed"), Some(10.0));
        assert_eq!(sample.get("power"), None);
    }
}
