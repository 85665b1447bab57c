// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Crate-wide error type for the Fudge wire codec.

use std::fmt;

/// Error produced while building, encoding, decoding, or converting a
/// Fudge message.
///
/// The six variants correspond to the six error kinds of the wire
/// contract: malformed bytes on the wire, values that cannot be
/// represented on the wire, unregistered value types, failed typed
/// conversions, illegal reader/writer state transitions, and I/O
/// failures from the underlying byte source or sink.
#[derive(Debug)]
pub enum FudgeError {
    /// The byte stream violates the wire format: inconsistent prefix,
    /// truncated field, size overflow, unknown fixed-width type id, or
    /// an envelope whose declared `totalSize` does not match its bytes.
    MalformedFrame { reason: String },
    /// A value could not be encoded because its declared size exceeds
    /// `i32::MAX`, its name exceeds 255 UTF-8 bytes, or its ordinal is
    /// out of `i16` range.
    EncodingOverflow { reason: String },
    /// No wire type is registered for the value being written.
    UnknownType { reason: String },
    /// A typed accessor could not adapt the stored value to the
    /// requested type.
    ConversionFailure { reason: String },
    /// A reader or writer was used outside its legal state, e.g.
    /// `write_field` before `write_envelope_header`, or a mutation on
    /// an immutable message.
    StateViolation { reason: String },
    /// The underlying byte source or sink failed.
    IoFailure(std::io::Error),
}

impl fmt::Display for FudgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FudgeError::MalformedFrame { reason } => write!(f, "malformed frame: {reason}"),
            FudgeError::EncodingOverflow { reason } => write!(f, "encoding overflow: {reason}"),
            FudgeError::UnknownType { reason } => write!(f, "unknown type: {reason}"),
            FudgeError::ConversionFailure { reason } => write!(f, "conversion failure: {reason}"),
            FudgeError::StateViolation { reason } => write!(f, "state violation: {reason}"),
            FudgeError::IoFailure(err) => write!(f, "io failure: {err}"),
        }
    }
}

impl std::error::Error for FudgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FudgeError::IoFailure(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for FudgeError {
    fn from(err: std::io::Error) -> Self {
        FudgeError::IoFailure(err)
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, FudgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_variants_are_human_readable() {
        let err = FudgeError::MalformedFrame {
            reason: "truncated field".into(),
        };
        assert_eq!(format!("{err}"), "malformed frame: truncated field");

        let err = FudgeError::EncodingOverflow {
            reason: "name too long".into(),
        };
        assert_eq!(format!("{err}"), "encoding overflow: name too long");
    }

    #[test]
    fn io_failure_reports_source() {
        use std::error::Error as _;
        let io_err = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        let err: FudgeError = io_err.into();
        assert!(err.source().is_some());
    }
}
