//! Decoded samples and channel readings

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::Settings;

/// One decoded data record: a timestamp plus values in physical units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Byte offset of the record this sample was decoded from
    pub offset: usize,
    /// Data record type code
    pub type_code: u16,
    /// Milliseconds since session start
    pub timestamp: u64,
    values: Vec<(Arc<str>, f64)>,
}

impl Sample {
    pub(crate) fn new(
        offset: usize,
        type_code: u16,
        timestamp: u64,
        values: Vec<(Arc<str>, f64)>,
    ) -> Self {
        Self { offset, type_code, timestamp, values }
    }

    /// Value of a channel, if this sample carries it.
    pub fn get(&self, channel: &str) -> Option<f64> {
        self.values.iter().find(|(name, _)| name.as_ref() == channel).map(|(_, value)| *value)
    }

    pub fn contains(&self, channel: &str) -> bool {
        self.get(channel).is_some()
    }

    /// Channel names and values in layout order.
    pub fn values(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(name, value)| (name.as_ref(), *value))
    }

    /// Absolute time of this sample when the session start is known.
    pub fn wall_clock(&self, settings: &Settings) -> Option<DateTime<Utc>> {
        let start = settings.session_start()?;
        let elapsed = TimeDelta::try_milliseconds(i64::try_from(self.timestamp).ok()?)?;
        start.checked_add_signed(elapsed)
    }
}

/// A single channel value paired with its sample timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Milliseconds since session start
    pub timestamp: u64,
    /// Value in the channel's physical unit
    pub value: f64,
}
