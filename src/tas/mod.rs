//! TAS dashboard run log decoding
//!
//! A run log is a flat sequence of framed records. Leading configuration
//! records describe the session and are decoded eagerly into
//! [`Settings`](crate::Settings); the data records that follow are decoded
//! lazily into samples, one record per step.
//!
//! The layers can be used on their own:
//!
//! ```rust
//! use tas_runlog::tas::{RecordTokenizer, decode_settings};
//!
//! // FORMAT record: version 2, metric units
//! let bytes = [0x01, 0x00, 0x04, 0x00, 0x02, 0x00, 0x00, 0x00];
//! let records = RecordTokenizer::new(&bytes).collect::<tas_runlog::Result<Vec<_>>>()?;
//! let settings = decode_settings(records)?;
//! assert_eq!(settings.format_version(), Some(2));
//! # Ok::<(), tas_runlog::LogError>(())
//! ```

mod cursor;
pub mod reader;
pub mod record;
mod sample;
pub mod sequence;
mod settings;

pub use cursor::Cursor;
pub use reader::DashboardRunLog;
pub use record::{RawRecord, RecordClass, RecordTokenizer, read_record};
pub use sample::decode_sample;
pub use sequence::{
    ChannelValues, EventReadings, LatestReadings, Readings, Samples, Timestamps,
};
pub use settings::{HeaderRegion, decode_settings, scan_header};
