// Copyright 2024 rct-proto contributors.
// This software may be modified and distributed under the terms
// of the BSD license. See the LICENSE file for details.

//! The streaming receive-frame state machine.
//!
//! A buffered "wait for the whole frame, then parse" design is not an
//! option here: real devices truncate responses at valid CRC boundaries
//! when pre-empted by a concurrent request, and the only way to bound the
//! damage from that is per-byte visibility into how far a frame actually
//! got before it died. [`ReceiveFrame`] is fed raw bytes as they arrive and
//! tracks its own progress; it never buffers more than one frame's worth of
//! state and never blocks.

use crate::command::Command;
use crate::crc;
use crate::error::ReceiveError;
use crate::escape;
use crate::frame::Frame;
use byteorder::{BigEndian, ByteOrder};

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    AwaitStart,
    AwaitCommand,
    AwaitLength,
    AwaitAddress,
    AwaitOid,
    AwaitPayload,
    AwaitCrc,
    Complete,
    Failed,
}

/// Incrementally parses one logical frame out of a raw byte stream.
///
/// Construct empty, call [`consume`](ReceiveFrame::consume) as bytes arrive,
/// and check [`complete`](ReceiveFrame::complete)/[`error`](ReceiveFrame::error)
/// after each call. Once either is set the instance is terminal: discard it
/// and construct a fresh one for the next frame.
#[derive(Debug, Clone)]
pub struct ReceiveFrame {
    permissive: bool,
    state: State,
    decoder: escape::Decoder,

    command: Command,
    length_field: Vec<u8>,
    payload_len: usize,
    address_field: Vec<u8>,
    address: u32,
    oid_field: Vec<u8>,
    id: u32,
    data: Vec<u8>,
    /// Logical content from the command byte through the end of payload,
    /// accumulated to verify against the trailing CRC.
    logical: Vec<u8>,
    crc_field: Vec<u8>,

    raw_consumed: usize,
    error: Option<ReceiveError>,
    crc_mismatch: bool,
}

impl Default for ReceiveFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl ReceiveFrame {
    /// Construct an empty state machine in strict mode: a CRC mismatch is a
    /// terminal [`ReceiveError::CRCMismatch`].
    pub fn new() -> ReceiveFrame {
        ReceiveFrame {
            permissive: false,
            state: State::AwaitStart,
            decoder: escape::Decoder::new(),
            command: Command::None,
            length_field: Vec::new(),
            payload_len: 0,
            address_field: Vec::new(),
            address: 0,
            oid_field: Vec::new(),
            id: 0,
            data: Vec::new(),
            logical: Vec::new(),
            crc_field: Vec::new(),
            raw_consumed: 0,
            error: None,
            crc_mismatch: false,
        }
    }

    /// Construct an empty state machine in permissive mode: a CRC mismatch
    /// still surfaces a completed frame (with [`crc_mismatch`](Self::crc_mismatch)
    /// set), for debugging a device that is sending corrupt frames.
    pub fn new_permissive() -> ReceiveFrame {
        let mut rf = ReceiveFrame::new();
        rf.permissive = true;
        rf
    }

    /// Feed raw bytes. Returns how many bytes were consumed, which may be
    /// fewer than `bytes.len()` if the frame reached a terminal state
    /// partway through. Once terminal, further calls consume nothing.
    pub fn consume(&mut self, bytes: &[u8]) -> usize {
        let mut consumed = 0;
        for &raw in bytes {
            if self.is_terminal() {
                break;
            }
            consumed += 1;
            self.raw_consumed += 1;
            self.consume_one(raw);
        }
        consumed
    }

    /// True once a frame has been fully received (CRC verified, or
    /// permissive mode papering over a mismatch).
    pub fn complete(&self) -> bool {
        self.state == State::Complete
    }

    /// The terminal error, if the state machine failed.
    pub fn error(&self) -> Option<&ReceiveError> {
        self.error.as_ref()
    }

    /// `true` if the frame completed but its CRC did not match — only
    /// possible in permissive mode, since strict mode raises
    /// [`ReceiveError::CRCMismatch`] instead of completing.
    pub fn crc_mismatch(&self) -> bool {
        self.crc_mismatch
    }

    /// The command byte, once observed. `Command::None` (the unset
    /// sentinel) before then.
    pub fn command(&self) -> Command {
        self.command
    }

    /// The OID, once observed. `0` (the unset sentinel) before then.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// The plant address, once observed; `0` for non-plant commands or
    /// before the address field has been read.
    pub fn address(&self) -> u32 {
        self.address
    }

    /// The payload bytes accumulated so far. Empty before the payload field
    /// is reached, and possibly partial mid-stream; only meaningful once
    /// [`complete`](Self::complete) is `true`.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The fully assembled logical frame, once [`complete`](Self::complete)
    /// is `true`. `None` while the frame is still in progress or failed.
    pub fn frame(&self) -> Option<Frame> {
        if !self.complete() {
            return None;
        }
        Some(Frame {
            command: self.command,
            id: self.id,
            address: self.address,
            payload: self.data.clone(),
        })
    }

    fn is_terminal(&self) -> bool {
        matches!(self.state, State::Complete | State::Failed)
    }

    fn fail(&mut self, err: ReceiveError) {
        self.error = Some(err);
        self.state = State::Failed;
    }

    fn total_consumed(&self) -> usize {
        self.raw_consumed
    }

    fn consume_one(&mut self, raw: u8) {
        if self.state == State::AwaitStart {
            if raw == escape::START {
                self.state = State::AwaitCommand;
            }
            return;
        }

        let logical = match self.decoder.feed(raw) {
            Some(b) => b,
            None => return, // escape pending, wait for its successor
        };

        match self.state {
            State::AwaitStart => unreachable!(),
            State::AwaitCommand => self.on_command(logical),
            State::AwaitLength => self.on_length(logical),
            State::AwaitAddress => self.on_address(logical),
            State::AwaitOid => self.on_oid(logical),
            State::AwaitPayload => self.on_payload(logical),
            State::AwaitCrc => self.on_crc(logical),
            State::Complete | State::Failed => {}
        }
    }

    fn on_command(&mut self, byte: u8) {
        match Command::from_byte(byte) {
            Some(cmd) if cmd != Command::None && cmd != Command::Extension => {
                self.command = cmd;
                self.logical.push(byte);
                self.state = State::AwaitLength;
            }
            _ => {
                self.fail(ReceiveError::InvalidCommand {
                    byte,
                    consumed: self.total_consumed(),
                });
            }
        }
    }

    fn on_length(&mut self, byte: u8) {
        self.logical.push(byte);
        self.length_field.push(byte);

        let want = if self.command.is_long() { 2 } else { 1 };
        if self.length_field.len() < want {
            return;
        }

        let length = if want == 2 {
            BigEndian::read_u16(&self.length_field) as usize
        } else {
            self.length_field[0] as usize
        };

        let min = if self.command.is_plant() { 8 } else { 4 };
        if length < min {
            self.fail(ReceiveError::FrameLengthExceeded {
                consumed: self.total_consumed(),
            });
            return;
        }
        self.payload_len = length - min;

        self.state = if self.command.is_plant() {
            State::AwaitAddress
        } else {
            State::AwaitOid
        };
    }

    fn on_address(&mut self, byte: u8) {
        self.logical.push(byte);
        self.address_field.push(byte);
        if self.address_field.len() == 4 {
            self.address = BigEndian::read_u32(&self.address_field);
            self.state = State::AwaitOid;
        }
    }

    fn on_oid(&mut self, byte: u8) {
        self.logical.push(byte);
        self.oid_field.push(byte);
        if self.oid_field.len() == 4 {
            self.id = BigEndian::read_u32(&self.oid_field);
            self.state = if self.payload_len == 0 {
                State::AwaitCrc
            } else {
                State::AwaitPayload
            };
        }
    }

    fn on_payload(&mut self, byte: u8) {
        if self.data.len() >= self.payload_len {
            self.fail(ReceiveError::FrameLengthExceeded {
                consumed: self.total_consumed(),
            });
            return;
        }
        self.logical.push(byte);
        self.data.push(byte);
        if self.data.len() == self.payload_len {
            self.state = State::AwaitCrc;
        }
    }

    fn on_crc(&mut self, byte: u8) {
        self.crc_field.push(byte);
        if self.crc_field.len() < 2 {
            return;
        }
        let received = BigEndian::read_u16(&self.crc_field);
        let computed = crc::crc16(&self.logical);
        if received == computed {
            self.state = State::Complete;
        } else if self.permissive {
            self.crc_mismatch = true;
            self.state = State::Complete;
        } else {
            self.fail(ReceiveError::CRCMismatch {
                expected: computed,
                actual: received,
                consumed: self.total_consumed(),
            });
        }
    }
}
