//! Shared helpers for integration tests

#![allow(dead_code)]

use std::sync::Once;

static INIT: Once = Once::new();

/// Install a test-writer subscriber once; filter with `RUST_LOG`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Frame one record.
///
/// # Panics
///
/// Panics if the payload does not fit a `u16` length.
pub fn record(type_code: u16, payload: &[u8]) -> Vec<u8> {
    let length = u16::try_from(payload.len()).expect("payload longer than u16::MAX");
    let mut bytes = Vec::with_capacity(4 + payload.len());
    bytes.extend_from_slice(&type_code.to_le_bytes());
    bytes.extend_from_slice(&length.to_le_bytes());
    bytes.extend_from_slice(payload);
    bytes
}

pub fn format(version: u16, units: u16) -> Vec<u8> {
    let mut payload = version.to_le_bytes().to_vec();
    payload.extend_from_slice(&units.to_le_bytes());
    record(0x0001, &payload)
}

pub fn session(start: u32, run_number: u16) -> Vec<u8> {
    let mut payload = start.to_le_bytes().to_vec();
    payload.extend_from_slice(&run_number.to_le_bytes());
    payload.extend_from_slice(&[0, 0]);
    record(0x0002, &payload)
}

/// Data record: `u32` timestamp followed by `rest`.
pub fn data(type_code: u16, timestamp: u32, rest: &[u8]) -> Vec<u8> {
    let mut payload = timestamp.to_le_bytes().to_vec();
    payload.extend_from_slice(rest);
    record(type_code, &payload)
}

/// Version 2 speed record.
pub fn v2_speed(timestamp: u32, raw: u16) -> Vec<u8> {
    let mut rest = raw.to_le_bytes().to_vec();
    rest.extend_from_slice(&[0, 0]);
    data(0x0010, timestamp, &rest)
}

/// Version 2 power record.
pub fn v2_power(timestamp: u32, power: u16, cadence: u16) -> Vec<u8> {
    let mut rest = power.to_le_bytes().to_vec();
    rest.extend_from_slice(&cadence.to_le_bytes());
    data(0x0011, timestamp, &rest)
}

pub fn log(records: &[Vec<u8>]) -> Vec<u8> {
    records.concat()
}
