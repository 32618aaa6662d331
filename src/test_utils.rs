//! Test utilities for building synthetic run logs
//!
//! Real dashboard captures are not redistributable, so tests and benches
//! assemble byte-exact logs with [`RunLogBuilder`] instead.

#![cfg(any(test, feature = "benchmark"))]

use crate::tas::record::{
    CONFIG_CALIBRATION, CONFIG_DEVICE, CONFIG_FORMAT, CONFIG_POWER_SENSOR, CONFIG_RIDER,
    CONFIG_SESSION, CONFIG_SPEED_SENSOR, DATA_AERO, DATA_POWER, DATA_SPEED, END_OF_HEADER,
};

/// Builder producing the bytes of a run log, record by record.
#[derive(Debug, Clone, Default)]
pub struct RunLogBuilder {
    bytes: Vec<u8>,
}

impl RunLogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an arbitrary framed record.
    ///
    /// # Panics
    ///
    /// Panics if the payload does not fit a `u16` length.
    pub fn record(mut self, type_code: u16, payload: &[u8]) -> Self {
        let length = u16::try_from(payload.len()).expect("payload longer than u16::MAX");
        self.bytes.extend_from_slice(&type_code.to_le_bytes());
        self.bytes.extend_from_slice(&length.to_le_bytes());
        self.bytes.extend_from_slice(payload);
        self
    }

    pub fn format(self, version: u16, units: u16) -> Self {
        let payload = concat(&[&version.to_le_bytes(), &units.to_le_bytes()]);
        self.record(CONFIG_FORMAT, &payload)
    }

    pub fn session(self, start: u32, run_number: u16) -> Self {
        let payload = concat(&[&start.to_le_bytes(), &run_number.to_le_bytes(), &[0, 0]]);
        self.record(CONFIG_SESSION, &payload)
    }

    pub fn speed_sensor(self, sensor_id: u16, circumference: f32) -> Self {
        let payload = concat(&[&sensor_id.to_le_bytes(), &[0, 0], &circumference.to_le_bytes()]);
        self.record(CONFIG_SPEED_SENSOR, &payload)
    }

    pub fn power_sensor(self, sensor_id: u16, offset: f32) -> Self {
        let payload = concat(&[&sensor_id.to_le_bytes(), &[0, 0], &offset.to_le_bytes()]);
        self.record(CONFIG_POWER_SENSOR, &payload)
    }

    pub fn rider(self, rider_mass: f32, bike_mass: f32) -> Self {
        let payload = concat(&[&rider_mass.to_le_bytes(), &bike_mass.to_le_bytes()]);
        self.record(CONFIG_RIDER, &payload)
    }

    pub fn calibration(self, air_density: f32, rolling_resistance: f32, yaw_offset: f32) -> Self {
        let payload = concat(&[
            &air_density.to_le_bytes(),
            &rolling_resistance.to_le_bytes(),
            &yaw_offset.to_le_bytes(),
        ]);
        self.record(CONFIG_CALIBRATION, &payload)
    }

    pub fn device(self, firmware_version: u16, name: &str) -> Self {
        let payload = concat(&[&firmware_version.to_le_bytes(), &[0, 0], name.as_bytes(), &[0]]);
        self.record(CONFIG_DEVICE, &payload)
    }

    pub fn end_of_header(self) -> Self {
        self.record(END_OF_HEADER, &[])
    }

    /// Append a data record: timestamp followed by the remaining payload bytes.
    pub fn sample(self, type_code: u16, timestamp: u32, rest: &[u8]) -> Self {
        let payload = concat(&[&timestamp.to_le_bytes(), rest]);
        self.record(type_code, &payload)
    }

    /// Version 1 combined speed/power record.
    pub fn v1_sample(self, timestamp: u32, speed_raw: u16, power_raw: u16) -> Self {
        let rest = concat(&[&speed_raw.to_le_bytes(), &power_raw.to_le_bytes()]);
        self.sample(DATA_SPEED, timestamp, &rest)
    }

    /// Version 2 speed record.
    pub fn v2_speed(self, timestamp: u32, speed_raw: u16) -> Self {
        let rest = concat(&[&speed_raw.to_le_bytes(), &[0, 0]]);
        self.sample(DATA_SPEED, timestamp, &rest)
    }

    /// Version 2 power record.
    pub fn v2_power(self, timestamp: u32, power_raw: u16, cadence_raw: u16) -> Self {
        let rest = concat(&[&power_raw.to_le_bytes(), &cadence_raw.to_le_bytes()]);
        self.sample(DATA_POWER, timestamp, &rest)
    }

    /// Version 2 aero record.
    pub fn v2_aero(self, timestamp: u32, yaw_raw: i16, density_raw: u16, cg_raw: u16) -> Self {
        let rest = concat(&[
            &yaw_raw.to_le_bytes(),
            &density_raw.to_le_bytes(),
            &cg_raw.to_le_bytes(),
            &[0, 0],
        ]);
        self.sample(DATA_AERO, timestamp, &rest)
    }

    /// Version 3 speed record.
    pub fn v3_speed(self, timestamp: u32, speed_raw: u16, revolutions: u16, event: u32) -> Self {
        let rest =
            concat(&[&speed_raw.to_le_bytes(), &revolutions.to_le_bytes(), &event.to_le_bytes()]);
        self.sample(DATA_SPEED, timestamp, &rest)
    }

    /// Version 3 power record.
    pub fn v3_power(
        self,
        timestamp: u32,
        power_raw: u16,
        cadence_raw: u8,
        event_count: u16,
        event_time: u16,
    ) -> Self {
        let rest = concat(&[
            &power_raw.to_le_bytes(),
            &[cadence_raw, 0],
            &event_count.to_le_bytes(),
            &event_time.to_le_bytes(),
        ]);
        self.sample(DATA_POWER, timestamp, &rest)
    }

    /// Version 3 aero record.
    pub fn v3_aero(
        self,
        timestamp: u32,
        yaw_raw: i16,
        density_raw: u16,
        cg_raw: u16,
        temperature_raw: u8,
    ) -> Self {
        let rest = concat(&[
            &yaw_raw.to_le_bytes(),
            &density_raw.to_le_bytes(),
            &cg_raw.to_le_bytes(),
            &[temperature_raw, 0],
        ]);
        self.sample(DATA_AERO, timestamp, &rest)
    }

    /// Current length of the log in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

/// A complete version 3 log with `records` rounds of speed, power and aero samples.
pub fn synthetic_v3_log(records: usize) -> Vec<u8> {
    let mut builder = RunLogBuilder::new()
        .format(3, 0)
        .session(1_700_000_000, 12)
        .speed_sensor(4711, 2.096)
        .power_sensor(815, 0.0)
        .calibration(1.204, 0.004, 0.0)
        .device(302, "TAS Dash")
        .end_of_header();

    for i in 0..records {
        let t = (i as u32) * 250;
        let wave = (i % 200) as u16;
        builder = builder
            .v3_speed(t, 1000 + wave, i as u16, (i as u32) * 256)
            .v3_power(t + 10, 200 + wave, 90, i as u16, (i as u16).wrapping_mul(2000))
            .v3_aero(t + 20, (wave as i16) - 100, 12040, 990 + wave, 130);
    }

    builder.build()
}

fn concat(parts: &[&[u8]]) -> Vec<u8> {
    parts.iter().flat_map(|part| part.iter().copied()).collect()
}
