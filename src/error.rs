// Copyright 2024 rct-proto contributors.
// This software may be modified and distributed under the terms
// of the BSD license. See the LICENSE file for details.

//! Error taxonomy for the frame and value codecs.
//!
//! Each failure domain gets its own flat enum with a hand-written
//! [`fmt::Display`] and a blanket [`std::error::Error`] impl, rather than one
//! crate-wide error type: a `DecodeError` never needs to carry the fields a
//! `FrameBuildError` needs, and keeping them apart means a caller's `match`
//! can't accidentally conflate "this value codec call failed" with "this
//! receive state machine is now dead".

use std::error;
use std::fmt;

/// Failure raised by [`crate::receive::ReceiveFrame`] while consuming bytes.
///
/// Unlike the other error kinds here, a receive error is terminal: once
/// raised, the [`crate::receive::ReceiveFrame`] that raised it must be
/// discarded and replaced with a fresh one.
#[derive(Debug, Clone, PartialEq)]
pub enum ReceiveError {
    /// The command byte did not match any known [`crate::command::Command`],
    /// or was the reserved `EXTENSION` code.
    InvalidCommand { byte: u8, consumed: usize },
    /// The CRC-16 trailing the frame did not match the computed value.
    CRCMismatch {
        expected: u16,
        actual: u16,
        consumed: usize,
    },
    /// The state machine wrote past the length the frame itself declared.
    /// This only happens if the length field was corrupt.
    FrameLengthExceeded { consumed: usize },
}

impl ReceiveError {
    /// Number of raw bytes (pre-escape) the state machine had consumed from
    /// its caller's buffer at the point the error was raised.
    pub fn consumed(&self) -> usize {
        match self {
            ReceiveError::InvalidCommand { consumed, .. } => *consumed,
            ReceiveError::CRCMismatch { consumed, .. } => *consumed,
            ReceiveError::FrameLengthExceeded { consumed } => *consumed,
        }
    }
}

impl fmt::Display for ReceiveError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ReceiveError::InvalidCommand { byte, .. } => {
                write!(f, "invalid command byte 0x{:02X}", byte)
            }
            ReceiveError::CRCMismatch {
                expected, actual, ..
            } => write!(
                f,
                "CRC mismatch: expected 0x{:04X} got 0x{:04X}",
                expected, actual
            ),
            ReceiveError::FrameLengthExceeded { .. } => {
                write!(f, "frame length exceeded the declared payload length")
            }
        }
    }
}

impl error::Error for ReceiveError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        None
    }
}

/// Failure raised by the value codec's `decode` side.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// The byte slice handed to `decode` was the wrong length for the
    /// requested [`crate::types::DataType`].
    WrongLength {
        data_type: &'static str,
        expected: &'static str,
        got: usize,
    },
    /// A STRING payload contained bytes that are not valid ASCII.
    InvalidAscii,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DecodeError::WrongLength {
                data_type,
                expected,
                got,
            } => write!(
                f,
                "cannot decode {}: expected {} bytes, got {}",
                data_type, expected, got
            ),
            DecodeError::InvalidAscii => write!(f, "string payload is not valid ASCII"),
        }
    }
}

impl error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        None
    }
}

/// Failure raised by the value codec's `encode` side.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodeError {
    /// The value handed to `encode` cannot be represented for the requested
    /// [`crate::types::DataType`] (e.g. a non-ASCII string, or a full
    /// aggregate handed to an encoder that only supports the request-stamp
    /// form).
    Unrepresentable {
        data_type: &'static str,
        reason: &'static str,
    },
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EncodeError::Unrepresentable { data_type, reason } => {
                write!(f, "cannot encode {}: {}", data_type, reason)
            }
        }
    }
}

impl error::Error for EncodeError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        None
    }
}

/// Failure raised by [`crate::registry::Registry`] lookups and construction.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupError {
    /// No [`crate::registry::ObjectInfo`] is registered under this id.
    UnknownId(u32),
    /// No [`crate::registry::ObjectInfo`] is registered under this name.
    UnknownName(String),
    /// Construction-time failure: two entries shared the same `object_id`.
    DuplicateId(u32),
    /// Construction-time failure: two entries shared the same `name`.
    DuplicateName(String),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LookupError::UnknownId(id) => write!(f, "no object registered for id 0x{:08X}", id),
            LookupError::UnknownName(name) => {
                write!(f, "no object registered for name {:?}", name)
            }
            LookupError::DuplicateId(id) => {
                write!(f, "duplicate object_id 0x{:08X} in registry build", id)
            }
            LookupError::DuplicateName(name) => {
                write!(f, "duplicate name {:?} in registry build", name)
            }
        }
    }
}

impl error::Error for LookupError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        None
    }
}

/// Failure raised by [`crate::frame::build_frame`] when its inputs are
/// inconsistent.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameBuildError {
    /// `command` is plant (bit `0x40` set) but no `address` was supplied.
    MissingAddress,
    /// `command` is not plant but an `address` was supplied anyway.
    UnexpectedAddress,
    /// `command` was `EXTENSION` or another value not valid to emit.
    InvalidCommand,
    /// The assembled length field does not fit the command's length width
    /// (255 for short commands, 65535 for long commands).
    LengthOverflow { length: usize, max: usize },
}

impl fmt::Display for FrameBuildError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FrameBuildError::MissingAddress => write!(f, "plant command requires an address"),
            FrameBuildError::UnexpectedAddress => {
                write!(f, "non-plant command must not carry an address")
            }
            FrameBuildError::InvalidCommand => {
                write!(f, "command is not valid to emit from the send-frame builder")
            }
            FrameBuildError::LengthOverflow { length, max } => write!(
                f,
                "length field {} exceeds the maximum {} for this command's length width",
                length, max
            ),
        }
    }
}

impl error::Error for FrameBuildError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receive_error_reports_consumed() {
        let e = ReceiveError::InvalidCommand {
            byte: 0xFF,
            consumed: 2,
        };
        assert_eq!(e.consumed(), 2);

        let e = ReceiveError::CRCMismatch {
            expected: 1,
            actual: 2,
            consumed: 14,
        };
        assert_eq!(e.consumed(), 14);
    }

    #[test]
    fn display_impls_are_non_empty() {
        assert!(!ReceiveError::FrameLengthExceeded { consumed: 0 }
            .to_string()
            .is_empty());
        assert!(!DecodeError::InvalidAscii.to_string().is_empty());
        assert!(!LookupError::UnknownId(1).to_string().is_empty());
        assert!(!FrameBuildError::MissingAddress.to_string().is_empty());
    }
}
