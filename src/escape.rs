// Copyright 2024 rct-proto contributors.
// This software may be modified and distributed under the terms
// of the BSD license. See the LICENSE file for details.

//! The byte-stuffing convention that frames messages on the wire.
//!
//! `START` (`0x2B`, `+`) marks the beginning of a frame; `ESCAPE` (`0x2D`,
//! `-`) stuffs any logical occurrence of `START` or `ESCAPE` inside the frame
//! body so a receiver scanning for the next `START` can't be fooled by frame
//! content.

/// Marks the start of a frame.
pub const START: u8 = 0x2B;
/// Escapes a literal `START`/`ESCAPE` byte inside a frame body.
pub const ESCAPE: u8 = 0x2D;

#[inline]
fn needs_escape(b: u8) -> bool {
    b == START || b == ESCAPE
}

/// Encode `logical` (command through CRC, in wire order) as a full physical
/// frame: a leading unescaped `START`, followed by each logical byte,
/// escaped where required.
pub fn encode(logical: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(logical.len() + 2);
    out.push(START);
    for &b in logical {
        if needs_escape(b) {
            out.push(ESCAPE);
        }
        out.push(b);
    }
    out
}

/// Incremental escape decoder used by [`crate::receive::ReceiveFrame`].
///
/// Bytes are fed one at a time. An `ESCAPE` byte is swallowed and makes the
/// decoder remember that the *next* byte, whatever it is, is a verbatim
/// logical byte rather than another escape or a fresh `START`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Decoder {
    escaped: bool,
}

impl Decoder {
    pub fn new() -> Self {
        Decoder { escaped: false }
    }

    /// Feed one raw byte. Returns `Some(logical_byte)` once a logical byte
    /// has been produced, or `None` if `raw` was an `ESCAPE` token and the
    /// decoder is now waiting for the byte it escapes.
    pub fn feed(&mut self, raw: u8) -> Option<u8> {
        if self.escaped {
            self.escaped = false;
            return Some(raw);
        }
        if raw == ESCAPE {
            self.escaped = true;
            return None;
        }
        Some(raw)
    }

    /// True if the decoder has consumed a trailing `ESCAPE` and is waiting
    /// for its successor byte.
    pub fn is_pending(&self) -> bool {
        self.escaped
    }
}
