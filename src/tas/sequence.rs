//! Lazy sample sequences over a run log's data region
//!
//! Every sequence owns a handle to the immutable file bytes and its own
//! position, so any number of sequences over one session can be driven
//! independently, including from separate threads. Each `next` call
//! tokenizes and decodes at most the records up to the next yielded value;
//! nothing is cached between calls.

use std::iter::FusedIterator;
use std::sync::Arc;
use tracing::{debug, trace, warn};

use super::record::{RecordClass, read_record};
use super::sample::decode_sample;
use super::Cursor;
use crate::layout::LayoutTable;
use crate::types::{Reading, Sample, Settings};
use crate::{LogError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Format version not looked at yet
    Pending,
    Decoding(u16),
    /// No version declared; any data record is an error
    Unversioned,
    Done,
}

/// Sequence of every decodable [`Sample`] in the data region.
///
/// Ends at the end of input. The first error ends the sequence; values
/// yielded before it stay valid.
#[derive(Debug, Clone)]
pub struct Samples {
    data: Arc<[u8]>,
    settings: Arc<Settings>,
    layouts: Arc<LayoutTable>,
    position: usize,
    last_timestamp: Option<u64>,
    state: State,
}

impl Samples {
    pub(crate) fn new(
        data: Arc<[u8]>,
        settings: Arc<Settings>,
        layouts: Arc<LayoutTable>,
        position: usize,
    ) -> Self {
        Self { data, settings, layouts, position, last_timestamp: None, state: State::Pending }
    }

    /// Offset of the next record to be read.
    ///
    /// After a `MalformedSample` this is the record following the bad one;
    /// after a framing error it is the start of the broken record.
    pub fn position(&self) -> usize {
        self.position
    }

    fn resolve_version(&mut self) -> Option<Result<Sample>> {
        match self.settings.format_version() {
            Some(version) if self.layouts.version(version).is_some() => {
                debug!("Decoding samples with format version {} layouts", version);
                self.state = State::Decoding(version);
                None
            }
            Some(version) => {
                debug!("No layout for format version {}", version);
                self.state = State::Done;
                Some(Err(LogError::UnsupportedFormatVersion { version: Some(version) }))
            }
            None => {
                self.state = State::Unversioned;
                None
            }
        }
    }
}

impl Iterator for Samples {
    type Item = Result<Sample>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.state {
            State::Done => return None,
            State::Pending => {
                if let Some(failure) = self.resolve_version() {
                    return Some(failure);
                }
            }
            State::Decoding(_) | State::Unversioned => {}
        }

        let mut cursor = Cursor::new(&self.data);
        if let Err(err) = cursor.seek(self.position) {
            self.state = State::Done;
            return Some(Err(err));
        }

        loop {
            let version = match self.state {
                State::Done | State::Pending => return None,
                State::Decoding(version) => Some(version),
                State::Unversioned => None,
            };

            let record = match read_record(&mut cursor) {
                Ok(Some(record)) => record,
                Ok(None) => {
                    self.state = State::Done;
                    return None;
                }
                Err(err) => {
                    self.state = State::Done;
                    return Some(Err(err));
                }
            };
            self.position = record.end();

            if record.class() != RecordClass::Data {
                trace!(
                    "Skipping non-data record {:#06x} at {:#x}",
                    record.type_code, record.offset
                );
                continue;
            }

            let Some(version) = version else {
                self.state = State::Done;
                return Some(Err(LogError::UnsupportedFormatVersion { version: None }));
            };
            let Some(layout) = self.layouts.version(version) else {
                self.state = State::Done;
                return Some(Err(LogError::UnsupportedFormatVersion { version: Some(version) }));
            };

            match decode_sample(&record, layout, self.settings.units()) {
                Ok(Some(sample)) => {
                    if let Some(last) = self.last_timestamp
                        && sample.timestamp < last
                    {
                        warn!(
                            "Timestamp goes backwards at {:#x}: {} ms after {} ms",
                            sample.offset, sample.timestamp, last
                        );
                    }
                    self.last_timestamp = Some(sample.timestamp);
                    return Some(Ok(sample));
                }
                Ok(None) => {
                    trace!(
                        "No version {} layout for record {:#06x} at {:#x}",
                        version, record.type_code, record.offset
                    );
                }
                Err(err) => {
                    self.state = State::Done;
                    return Some(Err(err));
                }
            }
        }
    }
}

impl FusedIterator for Samples {}

/// Values of one channel, skipping samples that do not carry it.
#[derive(Debug, Clone)]
pub struct ChannelValues {
    readings: Readings,
}

impl ChannelValues {
    pub(crate) fn new(samples: Samples, channel: &str) -> Self {
        Self { readings: Readings::new(samples, channel) }
    }

    /// Offset of the next record to be read.
    pub fn position(&self) -> usize {
        self.readings.position()
    }
}

impl Iterator for ChannelValues {
    type Item = Result<f64>;

    fn next(&mut self) -> Option<Self::Item> {
        self.readings.next().map(|reading| reading.map(|r| r.value))
    }
}

impl FusedIterator for ChannelValues {}

/// Timestamped values of one channel.
#[derive(Debug, Clone)]
pub struct Readings {
    samples: Samples,
    channel: Arc<str>,
}

impl Readings {
    pub(crate) fn new(samples: Samples, channel: &str) -> Self {
        Self { samples, channel: channel.into() }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Offset of the next record to be read.
    pub fn position(&self) -> usize {
        self.samples.position()
    }
}

impl Iterator for Readings {
    type Item = Result<Reading>;

    fn next(&mut self) -> Option<Self::Item> {
        for sample in self.samples.by_ref() {
            match sample {
                Ok(sample) => {
                    if let Some(value) = sample.get(&self.channel) {
                        return Some(Ok(Reading { timestamp: sample.timestamp, value }));
                    }
                }
                Err(err) => return Some(Err(err)),
            }
        }
        None
    }
}

impl FusedIterator for Readings {}

/// Timestamps of every decoded sample, in file order.
#[derive(Debug, Clone)]
pub struct Timestamps {
    samples: Samples,
}

impl Timestamps {
    pub(crate) fn new(samples: Samples) -> Self {
        Self { samples }
    }

    /// Offset of the next record to be read.
    pub fn position(&self) -> usize {
        self.samples.position()
    }
}

impl Iterator for Timestamps {
    type Item = Result<u64>;

    fn next(&mut self) -> Option<Self::Item> {
        self.samples.next().map(|sample| sample.map(|s| s.timestamp))
    }
}

impl FusedIterator for Timestamps {}

/// Readings taken only when the sensor reported a new event.
///
/// ANT+ sensors keep broadcasting their last value between events, so a
/// reading is yielded only when the sample's event counter is non-zero and
/// differs from the previous one. Samples without the counter channel
/// (older firmware) are passed through.
#[derive(Debug, Clone)]
pub struct EventReadings {
    samples: Samples,
    channel: Arc<str>,
    counter: Arc<str>,
    last_counter: Option<f64>,
}

impl EventReadings {
    pub(crate) fn new(samples: Samples, channel: &str, counter: &str) -> Self {
        Self { samples, channel: channel.into(), counter: counter.into(), last_counter: None }
    }

    /// Offset of the next record to be read.
    pub fn position(&self) -> usize {
        self.samples.position()
    }
}

impl Iterator for EventReadings {
    type Item = Result<Reading>;

    fn next(&mut self) -> Option<Self::Item> {
        for sample in self.samples.by_ref() {
            let sample = match sample {
                Ok(sample) => sample,
                Err(err) => return Some(Err(err)),
            };
            let Some(value) = sample.get(&self.channel) else {
                continue;
            };
            match sample.get(&self.counter) {
                Some(counter) if counter == 0.0 || self.last_counter == Some(counter) => {
                    trace!("Repeated {} broadcast at {} ms", self.channel, sample.timestamp);
                }
                counter => {
                    self.last_counter = counter.or(self.last_counter);
                    return Some(Ok(Reading { timestamp: sample.timestamp, value }));
                }
            }
        }
        None
    }
}

impl FusedIterator for EventReadings {}

/// Readings of one channel with runs sharing a timestamp reduced to the
/// last value of the run.
#[derive(Debug)]
pub struct LatestReadings {
    readings: Readings,
    pending: Option<Reading>,
    failure: Option<LogError>,
}

impl LatestReadings {
    pub(crate) fn new(readings: Readings) -> Self {
        Self { readings, pending: None, failure: None }
    }
}

impl Iterator for LatestReadings {
    type Item = Result<Reading>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.failure.take() {
            return Some(Err(err));
        }

        loop {
            match self.readings.next() {
                Some(Ok(reading)) => match self.pending.replace(reading) {
                    Some(previous) if previous.timestamp != reading.timestamp => {
                        return Some(Ok(previous));
                    }
                    _ => {}
                },
                Some(Err(err)) => {
                    return match self.pending.take() {
                        Some(previous) => {
                            self.failure = Some(err);
                            Some(Ok(previous))
                        }
                        None => Some(Err(err)),
                    };
                }
                None => return self.pending.take().map(Ok),
            }
        }
    }
}

impl FusedIterator for LatestReadings {}
