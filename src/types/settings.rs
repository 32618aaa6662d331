//! Decoded session settings

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Closed set of settings fields a run log header can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingField {
    FormatVersion,
    Units,
    SessionStart,
    StartDate,
    StartTime,
    RunNumber,
    SpeedSensorId,
    WheelCircumference,
    PowerSensorId,
    PowerOffset,
    RiderMass,
    BikeMass,
    AirDensity,
    RollingResistance,
    YawOffset,
    FirmwareVersion,
    DeviceName,
}

impl SettingField {
    /// Every recognized field, in map order.
    pub const ALL: [SettingField; 17] = [
        SettingField::FormatVersion,
        SettingField::Units,
        SettingField::SessionStart,
        SettingField::StartDate,
        SettingField::StartTime,
        SettingField::RunNumber,
        SettingField::SpeedSensorId,
        SettingField::WheelCircumference,
        SettingField::PowerSensorId,
        SettingField::PowerOffset,
        SettingField::RiderMass,
        SettingField::BikeMass,
        SettingField::AirDensity,
        SettingField::RollingResistance,
        SettingField::YawOffset,
        SettingField::FirmwareVersion,
        SettingField::DeviceName,
    ];

    /// Field name as exposed to consumers.
    pub const fn as_str(&self) -> &'static str {
        match self {
            SettingField::FormatVersion => "format_version",
            SettingField::Units => "units",
            SettingField::SessionStart => "session_start",
            SettingField::StartDate => "start_date",
            SettingField::StartTime => "start_time",
            SettingField::RunNumber => "run_number",
            SettingField::SpeedSensorId => "speed_sensor_id",
            SettingField::WheelCircumference => "wheel_circumference",
            SettingField::PowerSensorId => "power_sensor_id",
            SettingField::PowerOffset => "power_offset",
            SettingField::RiderMass => "rider_mass",
            SettingField::BikeMass => "bike_mass",
            SettingField::AirDensity => "air_density",
            SettingField::RollingResistance => "rolling_resistance",
            SettingField::YawOffset => "yaw_offset",
            SettingField::FirmwareVersion => "firmware_version",
            SettingField::DeviceName => "device_name",
        }
    }

    /// Look a field up by its exposed name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == name)
    }
}

impl fmt::Display for SettingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit system the dashboard recorded speed-like channels in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    /// Decode the raw header code, if it names a known unit system.
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(Units::Metric),
            1 => Some(Units::Imperial),
            _ => None,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }
}

/// A single decoded settings value.
///
/// Deserialized on its own, the strings `metric` and `imperial` read as
/// [`SettingValue::Units`]; inside [`Settings`] the field decides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Integer(i64),
    Float(f64),
    Units(Units),
    Text(String),
}

impl SettingValue {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            SettingValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            SettingValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SettingValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

/// Immutable settings resolved from a run log header.
///
/// Built once per session; later header records overwrite earlier values
/// for the same field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Settings {
    fields: BTreeMap<SettingField, SettingValue>,
}

impl Settings {
    pub(crate) fn insert(&mut self, field: SettingField, value: SettingValue) {
        self.fields.insert(field, value);
    }

    pub fn get(&self, field: SettingField) -> Option<&SettingValue> {
        self.fields.get(&field)
    }

    /// Lookup by exposed field name, e.g. `"wheel_circumference"`.
    pub fn get_by_name(&self, name: &str) -> Option<&SettingValue> {
        SettingField::from_name(name).and_then(|field| self.get(field))
    }

    pub fn contains(&self, field: SettingField) -> bool {
        self.fields.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SettingField, &SettingValue)> {
        self.fields.iter().map(|(field, value)| (*field, value))
    }

    /// Format version selecting the data record layout.
    pub fn format_version(&self) -> Option<u16> {
        self.integer(SettingField::FormatVersion).and_then(|v| u16::try_from(v).ok())
    }

    /// Declared unit system; metric when the header is silent.
    pub fn units(&self) -> Units {
        match self.get(SettingField::Units) {
            Some(SettingValue::Units(units)) => *units,
            _ => Units::Metric,
        }
    }

    /// Session start in UTC.
    pub fn session_start(&self) -> Option<DateTime<Utc>> {
        self.integer(SettingField::SessionStart).and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    pub fn run_number(&self) -> Option<i64> {
        self.integer(SettingField::RunNumber)
    }

    /// Wheel circumference in meters.
    pub fn wheel_circumference(&self) -> Option<f64> {
        self.float(SettingField::WheelCircumference)
    }

    /// Air density in kg/m³.
    pub fn air_density(&self) -> Option<f64> {
        self.float(SettingField::AirDensity)
    }

    pub fn device_name(&self) -> Option<&str> {
        self.get(SettingField::DeviceName).and_then(SettingValue::as_text)
    }

    fn integer(&self, field: SettingField) -> Option<i64> {
        self.get(field).and_then(SettingValue::as_integer)
    }

    fn float(&self, field: SettingField) -> Option<f64> {
        self.get(field).and_then(SettingValue::as_float)
    }
}

impl<'de> Deserialize<'de> for Settings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<SettingField, SettingValue>::deserialize(deserializer)?;
        let mut fields = BTreeMap::new();
        for (field, value) in raw {
            let value = match (field, value) {
                (SettingField::Units, value @ SettingValue::Units(_)) => value,
                (SettingField::Units, other) => {
                    return Err(de::Error::custom(format!("invalid units value {:?}", other)));
                }
                (_, SettingValue::Units(units)) => SettingValue::Text(units.as_str().to_string()),
                (_, value) => value,
            };
            fields.insert(field, value);
        }
        Ok(Settings { fields })
    }
}
