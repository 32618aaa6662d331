//! Decoder for TAS (Track Aero System) dashboard run logs.
//!
//! A run log interleaves a settings block describing the session and the
//! device with a time-ordered stream of sensor samples. This crate decodes
//! the settings eagerly and exposes every channel as a lazy, restartable
//! sequence of values in physical (SI) units.
//!
//! # Features
//!
//! - **Robust**: truncated files, unknown record types and firmware
//!   differences are reported precisely or skipped, never guessed at
//! - **Versioned layouts**: data record layouts are a serde table, so new
//!   firmware can be supported from YAML
//! - **Bounded memory**: sequences decode one record per step
//!
//! # Quick Start
//!
//! ```rust
//! use tas_runlog::DashboardRunLog;
//!
//! // FORMAT v2 (metric) followed by one speed record: t=1000 ms, raw=500
//! let bytes = vec![
//!     0x01, 0x00, 0x04, 0x00, 0x02, 0x00, 0x00, 0x00,
//!     0x10, 0x00, 0x08, 0x00, 0xE8, 0x03, 0x00, 0x00, 0xF4, 0x01, 0x00, 0x00,
//! ];
//!
//! let log = DashboardRunLog::from_bytes(bytes)?;
//! assert_eq!(log.settings().format_version(), Some(2));
//!
//! let speed = log.speed().collect::<tas_runlog::Result<Vec<f64>>>()?;
//! let timestamps = log.timestamps().collect::<tas_runlog::Result<Vec<u64>>>()?;
//! assert_eq!(speed, vec![10.0]);
//! assert_eq!(timestamps, vec![1000]);
//! # Ok::<(), tas_runlog::LogError>(())
//! ```

// Core types and error handling
pub mod channels;
mod error;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Decoding
pub mod layout;
pub mod tas;

// Core exports
pub use error::*;
pub use types::*;

pub use layout::LayoutTable;
pub use tas::{
    ChannelValues, DashboardRunLog, EventReadings, LatestReadings, Readings, Samples, Timestamps,
};
