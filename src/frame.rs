// Copyright 2024 rct-proto contributors.
// This software may be modified and distributed under the terms
// of the BSD license. See the LICENSE file for details.

//! The logical frame shape and the outbound send-frame builder.

use crate::command::Command;
use crate::crc;
use crate::error::FrameBuildError;
use crate::escape;
use byteorder::{BigEndian, ByteOrder};

/// The maximum length-field value a short (1-byte length) command can carry.
pub const MAX_SHORT_LENGTH: usize = 0xFF;
/// The maximum length-field value a long (2-byte length) command can carry.
pub const MAX_LONG_LENGTH: usize = 0xFFFF;

/// A logical frame: the decoded shape of a received message, returned by
/// [`crate::receive::ReceiveFrame::frame`] once a frame completes.
/// `address` is `0` unless `command.is_plant()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub command: Command,
    pub id: u32,
    pub address: u32,
    pub payload: Vec<u8>,
}

/// Build a complete outbound byte sequence — the physical wire form,
/// including the leading `START` and escape stuffing — for one request.
///
/// `address` must be `Some` iff `command.is_plant()`; `EXTENSION` (and the
/// internal `None` sentinel) are never valid to build.
pub fn build_frame(
    command: Command,
    id: u32,
    payload: &[u8],
    address: Option<u32>,
) -> Result<Vec<u8>, FrameBuildError> {
    if command == Command::Extension || command == Command::None {
        return Err(FrameBuildError::InvalidCommand);
    }
    match (command.is_plant(), address) {
        (true, None) => return Err(FrameBuildError::MissingAddress),
        (false, Some(_)) => return Err(FrameBuildError::UnexpectedAddress),
        _ => {}
    }

    let mut length = 4 + payload.len();
    if command.is_plant() {
        length += 4;
    }

    let max = if command.is_long() {
        MAX_LONG_LENGTH
    } else {
        MAX_SHORT_LENGTH
    };
    if length > max {
        return Err(FrameBuildError::LengthOverflow { length, max });
    }

    let mut logical = Vec::with_capacity(1 + 2 + 4 + 4 + payload.len() + 2);
    logical.push(command.to_byte());
    if command.is_long() {
        let mut buf = [0u8; 2];
        BigEndian::write_u16(&mut buf, length as u16);
        logical.extend_from_slice(&buf);
    } else {
        logical.push(length as u8);
    }
    if let Some(addr) = address {
        let mut buf = [0u8; 4];
        BigEndian::write_u32(&mut buf, addr);
        logical.extend_from_slice(&buf);
    }
    let mut oid_buf = [0u8; 4];
    BigEndian::write_u32(&mut oid_buf, id);
    logical.extend_from_slice(&oid_buf);
    logical.extend_from_slice(payload);

    let checksum = crc::crc16(&logical);
    let mut crc_buf = [0u8; 2];
    BigEndian::write_u16(&mut crc_buf, checksum);
    logical.extend_from_slice(&crc_buf);

    Ok(escape::encode(&logical))
}
