//! Error types for run log decoding.
//!
//! Every failure carries enough context to locate it in the file: byte
//! offsets for structural problems, the offending field for settings, and
//! the declared version for layout lookups.
//!
//! ## Error Categories
//!
//! - **Structural Errors**: truncated reads and records overrunning the file
//! - **Settings Errors**: header fields holding out-of-domain values
//! - **Layout Errors**: unknown format versions, mismatched sample lengths,
//!   invalid layout tables
//! - **File Errors**: problems acquiring the bytes from disk
//!
//! ## Resuming After a Failure
//!
//! Structural and sample errors end the sequence that raised them, but the
//! session stays usable. The failure offset can be used to resume:
//!
//! ```rust
//! use tas_runlog::LogError;
//!
//! let error = LogError::MalformedSample { offset: 64, type_code: 0x10, expected: 8, found: 6 };
//! assert_eq!(error.offset(), Some(64));
//! assert!(!error.is_fatal_to_session());
//! for suggestion in error.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

use crate::types::SettingField;

/// Result type alias for run log operations.
pub type Result<T, E = LogError> = std::result::Result<T, E>;

/// Main error type for run log decoding.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LogError {
    #[error("Truncated input at offset {offset:#x}: need {needed} bytes, {available} available")]
    TruncatedInput { offset: usize, needed: usize, available: usize },

    #[error(
        "Malformed record {type_code:#06x} at offset {offset:#x}: declared {declared} payload bytes, {available} available"
    )]
    MalformedRecord { offset: usize, type_code: u16, declared: usize, available: usize },

    #[error("Invalid settings value for '{field}': {reason}")]
    InvalidSettingsValue { field: SettingField, reason: String },

    #[error("Unsupported format version: {}", display_version(.version))]
    UnsupportedFormatVersion { version: Option<u16> },

    #[error(
        "Malformed sample {type_code:#06x} at offset {offset:#x}: expected {expected} payload bytes, found {found}"
    )]
    MalformedSample { offset: usize, type_code: u16, expected: usize, found: usize },

    #[error("Run log file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid layout table: {details}")]
    Layout { details: String },
}

fn display_version(version: &Option<u16>) -> String {
    match version {
        Some(version) => version.to_string(),
        None => "none declared".to_string(),
    }
}

impl LogError {
    /// Byte offset in the file where decoding failed, when known.
    pub fn offset(&self) -> Option<usize> {
        match self {
            LogError::TruncatedInput { offset, .. }
            | LogError::MalformedRecord { offset, .. }
            | LogError::MalformedSample { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    /// Returns whether no channel of the session can be decoded after this error.
    ///
    /// Structural and sample errors only end the sequence that raised them;
    /// earlier values and the settings remain valid.
    pub fn is_fatal_to_session(&self) -> bool {
        match self {
            LogError::TruncatedInput { .. } => false,
            LogError::MalformedRecord { .. } => false,
            LogError::MalformedSample { .. } => false,
            LogError::InvalidSettingsValue { .. } => true,
            LogError::UnsupportedFormatVersion { .. } => true,
            LogError::File { .. } => true,
            LogError::Layout { .. } => true,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            LogError::TruncatedInput { .. } => vec![
                "Check whether the log was copied completely from the dashboard",
                "Use the values yielded before the failure",
            ],
            LogError::MalformedRecord { .. } => vec![
                "Check whether the log was copied completely from the dashboard",
                "Use the values yielded before the failure",
                "Verify the file is a TAS dashboard run log",
            ],
            LogError::InvalidSettingsValue { .. } => vec![
                "Verify the file is a TAS dashboard run log",
                "Check the device configuration that produced the log",
            ],
            LogError::UnsupportedFormatVersion { .. } => vec![
                "Add a layout for this firmware version to the layout table",
                "Load a layout table matching the device firmware",
                "Settings remain readable without a layout",
            ],
            LogError::MalformedSample { .. } => vec![
                "Check the layout table against the device firmware",
                "Resume decoding after the failing record offset",
            ],
            LogError::File { .. } => {
                vec!["Check file exists and is readable", "Check file permissions"]
            }
            LogError::Layout { .. } => vec![
                "Check the layout table syntax",
                "Ensure every field fits inside its record length",
            ],
        }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        LogError::File { path, source }
    }

    /// Helper constructor for out-of-domain settings values.
    pub fn invalid_setting(field: SettingField, reason: impl Into<String>) -> Self {
        LogError::InvalidSettingsValue { field, reason: reason.into() }
    }

    /// Helper constructor for layout table errors.
    pub fn layout(details: impl Into<String>) -> Self {
        LogError::Layout { details: details.into() }
    }
}

impl From<std::io::Error> for LogError {
    fn from(err: std::io::Error) -> Self {
        LogError::File { path: PathBuf::from("<unknown>"), source: err }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn error_messages_carry_their_context(
                offset in 0usize..0x10000usize,
                type_code in any::<u16>(),
                declared in 0usize..0x10000usize,
                available in 0usize..0x10000usize,
                reason in "[a-z ]{1,20}",
            ) {
                let record = LogError::MalformedRecord { offset, type_code, declared, available };
                let msg = record.to_string();
                let hex_offset = format!("{:#x}", offset);
                prop_assert!(msg.contains(&hex_offset), "missing offset in {}", msg);
                prop_assert!(msg.contains(&declared.to_string()), "missing declared in {}", msg);
                prop_assert!(msg.contains(&available.to_string()), "missing available in {}", msg);

                let setting = LogError::invalid_setting(SettingField::AirDensity, reason.clone());
                let msg = setting.to_string();
                prop_assert!(msg.contains("air_density"), "missing field in {}", msg);
                prop_assert!(msg.contains(&reason), "missing reason in {}", msg);
            }

            #[test]
            fn structural_errors_report_offsets(offset in any::<usize>(), n in 0usize..64) {
                let truncated = LogError::TruncatedInput { offset, needed: n + 1, available: n };
                prop_assert_eq!(truncated.offset(), Some(offset));
                prop_assert!(!truncated.is_fatal_to_session());

                let sample = LogError::MalformedSample {
                    offset,
                    type_code: 0x10,
                    expected: n,
                    found: n + 1,
                };
                prop_assert_eq!(sample.offset(), Some(offset));
            }
        }
    }

    #[test]
    fn unsupported_version_message() {
        let known = LogError::UnsupportedFormatVersion { version: Some(99) };
        assert!(known.to_string().contains("99"));
        let missing = LogError::UnsupportedFormatVersion { version: None };
        assert!(missing.to_string().contains("none declared"));
        assert!(missing.is_fatal_to_session());
        assert_eq!(missing.offset(), None);
    }

    #[test]
    fn error_traits_validation() {
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<LogError>();

        let error = LogError::layout("test");
        let _: &dyn std::error::Error = &error;
    }

    #[test]
    fn recovery_suggestions_are_descriptive() {
        let errors = [
            LogError::TruncatedInput { offset: 0, needed: 4, available: 1 },
            LogError::UnsupportedFormatVersion { version: Some(7) },
            LogError::layout("bad"),
        ];
        for error in &errors {
            let suggestions = error.recovery_suggestions();
            assert!(!suggestions.is_empty());
            assert!(suggestions.iter().all(|s| s.len() > 5));
        }
    }

    #[test]
    fn from_io_error_keeps_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test file");
        let err: LogError = io_err.into();
        match err {
            LogError::File { source, .. } => assert_eq!(source.to_string(), "test file"),
            other => panic!("Expected File error variant, got {:?}", other),
        }
    }
}
