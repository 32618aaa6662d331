//! Layouts of the firmware versions known to this crate

use std::collections::BTreeMap;

use super::{ChannelField, LayoutTable, RecordLayout, TimestampField, VersionLayout};
use crate::channels;
use crate::tas::record::{DATA_AERO, DATA_POWER, DATA_SPEED};
use crate::types::FieldType;

/// Miles per hour to meters per second.
pub const MPH_TO_MPS: f64 = 0.44704;

const TIMESTAMP: TimestampField = TimestampField { byte_offset: 0, field_type: FieldType::U32 };

pub(super) fn table() -> LayoutTable {
    LayoutTable { versions: BTreeMap::from([(1, version_1()), (2, version_2()), (3, version_3())]) }
}

/// Legacy firmware: one combined record.
fn version_1() -> VersionLayout {
    VersionLayout {
        records: BTreeMap::from([(
            DATA_SPEED,
            record(
                8,
                vec![
                    speed(channels::SPEED, 4, FieldType::U16, 0.01),
                    channel(channels::POWER, "W", 6, FieldType::U16, 1.0, 0.0),
                ],
            ),
        )]),
    }
}

fn version_2() -> VersionLayout {
    VersionLayout {
        records: BTreeMap::from([
            (DATA_SPEED, record(8, vec![speed(channels::SPEED, 4, FieldType::U16, 0.02)])),
            (
                DATA_POWER,
                record(
                    8,
                    vec![
                        channel(channels::POWER, "W", 4, FieldType::U16, 1.0, 0.0),
                        channel(channels::CADENCE, "rpm", 6, FieldType::U16, 1.0, 0.0),
                    ],
                ),
            ),
            (
                DATA_AERO,
                record(
                    12,
                    vec![
                        channel(channels::YAW, "deg", 4, FieldType::I16, 0.1, 0.0),
                        channel(channels::AIR_DENSITY, "kg/m^3", 6, FieldType::U16, 0.0001, 0.0),
                        speed(channels::CG_SPEED, 8, FieldType::U16, 0.02),
                    ],
                ),
            ),
        ]),
    }
}

/// Adds wheel and crank event timing and air temperature.
fn version_3() -> VersionLayout {
    VersionLayout {
        records: BTreeMap::from([
            (
                DATA_SPEED,
                record(
                    12,
                    vec![
                        speed(channels::SPEED, 4, FieldType::U16, 0.01),
                        channel(channels::WHEEL_REVOLUTIONS, "rev", 6, FieldType::U16, 1.0, 0.0),
                        channel(
                            channels::WHEEL_EVENT_TIME,
                            "s",
                            8,
                            FieldType::U32,
                            1.0 / 1024.0,
                            0.0,
                        ),
                    ],
                ),
            ),
            (
                DATA_POWER,
                record(
                    12,
                    vec![
                        channel(channels::POWER, "W", 4, FieldType::U16, 1.0, 0.0),
                        channel(channels::CADENCE, "rpm", 6, FieldType::U8, 1.0, 0.0),
                        channel(channels::POWER_EVENT_COUNT, "", 8, FieldType::U16, 1.0, 0.0),
                        channel(channels::POWER_EVENT_TIME, "s", 10, FieldType::U16, 0.0005, 0.0),
                    ],
                ),
            ),
            (
                DATA_AERO,
                record(
                    12,
                    vec![
                        channel(channels::YAW, "deg", 4, FieldType::I16, 0.01, 0.0),
                        channel(channels::AIR_DENSITY, "kg/m^3", 6, FieldType::U16, 0.0001, 0.0),
                        speed(channels::CG_SPEED, 8, FieldType::U16, 0.01),
                        channel(channels::TEMPERATURE, "degC", 10, FieldType::U8, 0.5, -40.0),
                    ],
                ),
            ),
        ]),
    }
}

fn record(length: usize, channels: Vec<ChannelField>) -> RecordLayout {
    RecordLayout { length, timestamp: TIMESTAMP, channels }
}

fn channel(
    name: &str,
    unit: &str,
    byte_offset: usize,
    field_type: FieldType,
    scale: f64,
    offset: f64,
) -> ChannelField {
    ChannelField {
        name: name.into(),
        unit: unit.to_string(),
        byte_offset,
        field_type,
        scale,
        offset,
        speed_like: false,
    }
}

fn speed(name: &str, byte_offset: usize, field_type: FieldType, scale: f64) -> ChannelField {
    ChannelField { speed_like: true, ..channel(name, "m/s", byte_offset, field_type, scale, 0.0) }
}
