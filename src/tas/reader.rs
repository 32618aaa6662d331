//! Run log session
//!
//! [`DashboardRunLog`] owns the file bytes and the settings resolved from the
//! header region. Every accessor returns a fresh, independent lazy sequence
//! that starts at the remembered data-region offset.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use tas_runlog::DashboardRunLog;
//!
//! fn print_speed() -> tas_runlog::Result<()> {
//!     let log = DashboardRunLog::open("run_012.tas")?;
//!     println!("Format version {:?}", log.settings().format_version());
//!
//!     for reading in log.readings("speed") {
//!         let reading = reading?;
//!         println!("{:>8} ms  {:.2} m/s", reading.timestamp, reading.value);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Performance Notes
//!
//! - The file is read into memory once at construction
//! - Sequences decode one record per step and cache nothing
//! - Sequences share the bytes through an `Arc`, so creating one is O(1)

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use super::sequence::{
    ChannelValues, EventReadings, LatestReadings, Readings, Samples, Timestamps,
};
use super::settings::scan_header;
use crate::channels;
use crate::layout::LayoutTable;
use crate::types::Settings;
use crate::{LogError, Result};

/// A decoded dashboard run log.
#[derive(Debug, Clone)]
pub struct DashboardRunLog {
    data: Arc<[u8]>,
    path: PathBuf,
    settings: Arc<Settings>,
    layouts: Arc<LayoutTable>,
    data_start: usize,
}

impl DashboardRunLog {
    /// Open a run log file with the built-in layouts.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_layouts(path, LayoutTable::builtin())
    }

    /// Open a run log file with a custom layout table.
    pub fn open_with_layouts<P: AsRef<Path>>(path: P, layouts: Arc<LayoutTable>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = fs::read(&path).map_err(|e| LogError::file_error(path.clone(), e))?;
        Self::from_bytes_with_path(data, path, layouts)
    }

    /// Decode an in-memory run log with the built-in layouts.
    pub fn from_bytes(data: impl Into<Arc<[u8]>>) -> Result<Self> {
        Self::with_layouts(data, LayoutTable::builtin())
    }

    /// Decode an in-memory run log with a custom layout table.
    pub fn with_layouts(data: impl Into<Arc<[u8]>>, layouts: Arc<LayoutTable>) -> Result<Self> {
        Self::from_bytes_with_path(data, PathBuf::from("<memory>"), layouts)
    }

    fn from_bytes_with_path(
        data: impl Into<Arc<[u8]>>,
        path: PathBuf,
        layouts: Arc<LayoutTable>,
    ) -> Result<Self> {
        let data = data.into();
        let header = scan_header(&data)?;

        debug!(
            "Opened run log {} ({} bytes, format version {:?}, data at {:#x})",
            path.display(),
            data.len(),
            header.settings.format_version(),
            header.data_start
        );

        Ok(Self {
            data,
            path,
            settings: Arc::new(header.settings),
            layouts,
            data_start: header.data_start,
        })
    }

    /// Settings resolved from the header region.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Offset of the first record of the data region.
    pub fn data_start(&self) -> usize {
        self.data_start
    }

    /// Source path, `<memory>` for in-memory logs.
    pub fn file_path(&self) -> &Path {
        &self.path
    }

    /// File size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn layouts(&self) -> &LayoutTable {
        &self.layouts
    }

    /// Channels the declared format version can produce.
    ///
    /// Empty when the version is missing or has no layout.
    pub fn available_channels(&self) -> Vec<&str> {
        self.settings
            .format_version()
            .and_then(|version| self.layouts.version(version))
            .map(|layout| layout.channel_names())
            .unwrap_or_default()
    }

    /// Every decodable sample of the data region.
    pub fn samples(&self) -> Samples {
        self.samples_at(self.data_start)
    }

    /// Samples starting at a record boundary, e.g. the position of a
    /// sequence that stopped at a bad record.
    pub fn samples_from(&self, offset: usize) -> Samples {
        self.samples_at(offset)
    }

    /// Timestamps (ms since session start) of every decoded sample.
    pub fn timestamps(&self) -> Timestamps {
        Timestamps::new(self.samples())
    }

    /// Values of a channel by name, in physical units.
    ///
    /// Unknown channel names yield an empty sequence.
    pub fn channel(&self, name: &str) -> ChannelValues {
        ChannelValues::new(self.samples(), name)
    }

    /// Timestamp/value pairs of a channel.
    pub fn readings(&self, name: &str) -> Readings {
        Readings::new(self.samples(), name)
    }

    /// Readings of `channel` taken only when the `counter` channel reports a
    /// new sensor event.
    pub fn event_readings(&self, channel: &str, counter: &str) -> EventReadings {
        EventReadings::new(self.samples(), channel, counter)
    }

    /// Readings of `channel` keeping only the last value per timestamp.
    pub fn latest_readings(&self, channel: &str) -> LatestReadings {
        LatestReadings::new(self.readings(channel))
    }

    /// Wheel speed readings at new wheel events only.
    pub fn speed_updates(&self) -> EventReadings {
        self.event_readings(channels::SPEED, channels::WHEEL_EVENT_TIME)
    }

    /// Power readings at new crank events only.
    pub fn power_updates(&self) -> EventReadings {
        self.event_readings(channels::POWER, channels::POWER_EVENT_COUNT)
    }

    /// Center of gravity speed, last value per timestamp.
    pub fn cg_speed_latest(&self) -> LatestReadings {
        self.latest_readings(channels::CG_SPEED)
    }

    /// Wheel speed in m/s.
    pub fn speed(&self) -> ChannelValues {
        self.channel(channels::SPEED)
    }

    /// Center of gravity speed in m/s.
    pub fn cg_speed(&self) -> ChannelValues {
        self.channel(channels::CG_SPEED)
    }

    /// Power in W.
    pub fn power(&self) -> ChannelValues {
        self.channel(channels::POWER)
    }

    /// Cadence in rpm.
    pub fn cadence(&self) -> ChannelValues {
        self.channel(channels::CADENCE)
    }

    /// Yaw angle in degrees.
    pub fn yaw(&self) -> ChannelValues {
        self.channel(channels::YAW)
    }

    /// Air density in kg/m³.
    pub fn air_density(&self) -> ChannelValues {
        self.channel(channels::AIR_DENSITY)
    }

    /// Air temperature in °C.
    pub fn temperature(&self) -> ChannelValues {
        self.channel(channels::TEMPERATURE)
    }

    fn samples_at(&self, offset: usize) -> Samples {
        Samples::new(
            Arc::clone(&self.data),
            Arc::clone(&self.settings),
            Arc::clone(&self.layouts),
            offset,
        )
    }
}
