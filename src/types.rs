// Copyright 2024 rct-proto contributors.
// This software may be modified and distributed under the terms
// of the BSD license. See the LICENSE file for details.

//! The closed set of payload types and the bidirectional codec between them
//! and their big-endian wire form.
//!
//! Each wire type is read and written through `byteorder::BigEndian`, and
//! carried as a variant of one closed [`Value`] enum rather than a family of
//! trait objects, since there is no bit-offset addressing to abstract over
//! here — just a tag (the [`DataType`]) naming which variant is in play.

use crate::error::{DecodeError, EncodeError};
use byteorder::{BigEndian, ByteOrder};

/// The closed set of payload types a [`crate::registry::ObjectInfo`] can
/// name as its request or response type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Bool,
    Uint8,
    Int8,
    Uint16,
    Int16,
    Uint32,
    Int32,
    Enum,
    Float,
    String,
    TimeSeries,
    EventTable,
    Unknown,
}

impl DataType {
    /// A short, stable name for this type, used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            DataType::Bool => "BOOL",
            DataType::Uint8 => "UINT8",
            DataType::Int8 => "INT8",
            DataType::Uint16 => "UINT16",
            DataType::Int16 => "INT16",
            DataType::Uint32 => "UINT32",
            DataType::Int32 => "INT32",
            DataType::Enum => "ENUM",
            DataType::Float => "FLOAT",
            DataType::String => "STRING",
            DataType::TimeSeries => "TIMESERIES",
            DataType::EventTable => "EVENT_TABLE",
            DataType::Unknown => "UNKNOWN",
        }
    }

    /// The fixed wire size of this type, or `None` if it is variable-length
    /// (`STRING`, `TIMESERIES`, `EVENT_TABLE`, `UNKNOWN`).
    pub fn fixed_size(self) -> Option<usize> {
        match self {
            DataType::Bool | DataType::Uint8 | DataType::Int8 | DataType::Enum => Some(1),
            DataType::Uint16 | DataType::Int16 => Some(2),
            DataType::Uint32 | DataType::Int32 | DataType::Float => Some(4),
            DataType::String | DataType::TimeSeries | DataType::EventTable | DataType::Unknown => {
                None
            }
        }
    }
}

/// One `(timestamp, value)` sample inside a [`TimeSeries`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp: u32,
    pub value: f32,
}

/// A decoded TIMESERIES payload: the request timestamp that produced it,
/// followed by zero or more `(timestamp, value)` samples.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub request_timestamp: u32,
    pub samples: Vec<Sample>,
}

/// One 5-tuple record inside an [`EventTable`].
///
/// `type_marker`'s low byte is the event kind; see [`EventKind`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventRecord {
    pub type_marker: u32,
    pub element2: u32,
    pub element3: u32,
    pub element4: u32,
    pub element5: u32,
}

impl EventRecord {
    pub fn kind(&self) -> EventKind {
        EventKind::from_byte((self.type_marker & 0xFF) as u8)
    }
}

/// A decoded EVENT_TABLE payload: the request timestamp that produced it,
/// followed by zero or more 5-element event records.
#[derive(Debug, Clone, PartialEq)]
pub struct EventTable {
    pub request_timestamp: u32,
    pub events: Vec<EventRecord>,
}

/// The known event-kind markers (low byte of an [`EventRecord`]'s
/// `type_marker`). Any other byte is preserved verbatim as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    SwOnUminL1,
    SwOnUmaxL1,
    SwOnFmaxL1,
    SwOnUminL2,
    SwOnUmaxL2,
    SwOnUminL3,
    SwOnUmaxL3,
    Surge,
    NoGrid,
    PhasePos,
    BatOvervoltage,
    CanTimeout,
    BatIntern,
    PrmChange,
    Reset,
    Update,
    FrtOvervoltage,
    FrtUndervoltage,
    Unknown(u8),
}

impl EventKind {
    pub fn from_byte(byte: u8) -> EventKind {
        match byte {
            0x4F => EventKind::SwOnUminL1,
            0x50 => EventKind::SwOnUmaxL1,
            0x52 => EventKind::SwOnFmaxL1,
            0x53 => EventKind::SwOnUminL2,
            0x54 => EventKind::SwOnUmaxL2,
            0x57 => EventKind::SwOnUminL3,
            0x58 => EventKind::SwOnUmaxL3,
            0x59 => EventKind::Surge,
            0x5A => EventKind::NoGrid,
            0x61 => EventKind::PhasePos,
            0x64 => EventKind::BatOvervoltage,
            0x6B => EventKind::CanTimeout,
            0x72 => EventKind::BatIntern,
            0x73 => EventKind::PrmChange,
            0x76 => EventKind::Reset,
            0x77 => EventKind::Update,
            0x78 => EventKind::FrtOvervoltage,
            0x79 => EventKind::FrtUndervoltage,
            other => EventKind::Unknown(other),
        }
    }
}

/// A typed payload value: one variant per [`DataType`], plus the two
/// aggregates and the opaque passthrough.
///
/// `TimestampRequest` is the only value [`encode`] accepts for
/// `TIMESERIES`/`EVENT_TABLE` — writing a timestamp is how a caller triggers
/// the device to produce one of these aggregates; the device is the only
/// party that ever emits the full aggregate form.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Uint8(u8),
    Int8(i8),
    Uint16(u16),
    Int16(i16),
    Uint32(u32),
    Int32(i32),
    Enum(u8),
    Float(f32),
    String(String),
    TimestampRequest(u32),
    TimeSeries(TimeSeries),
    EventTable(EventTable),
    Unknown(Vec<u8>),
}

/// Encode a typed value to its wire bytes.
pub fn encode(value: &Value) -> Result<Vec<u8>, EncodeError> {
    match value {
        Value::Bool(b) => Ok(vec![if *b { 0x01 } else { 0x00 }]),
        Value::Uint8(v) => Ok(vec![*v]),
        Value::Int8(v) => Ok(vec![*v as u8]),
        Value::Uint16(v) => {
            let mut buf = [0u8; 2];
            BigEndian::write_u16(&mut buf, *v);
            Ok(buf.to_vec())
        }
        Value::Int16(v) => {
            let mut buf = [0u8; 2];
            BigEndian::write_i16(&mut buf, *v);
            Ok(buf.to_vec())
        }
        Value::Uint32(v) => {
            let mut buf = [0u8; 4];
            BigEndian::write_u32(&mut buf, *v);
            Ok(buf.to_vec())
        }
        Value::Int32(v) => {
            let mut buf = [0u8; 4];
            BigEndian::write_i32(&mut buf, *v);
            Ok(buf.to_vec())
        }
        Value::Enum(v) => Ok(vec![*v]),
        Value::Float(v) => {
            let mut buf = [0u8; 4];
            BigEndian::write_f32(&mut buf, *v);
            Ok(buf.to_vec())
        }
        Value::String(s) => {
            if !s.is_ascii() {
                return Err(EncodeError::Unrepresentable {
                    data_type: DataType::String.name(),
                    reason: "string contains non-ASCII characters",
                });
            }
            let mut buf = s.as_bytes().to_vec();
            buf.push(0x00);
            Ok(buf)
        }
        Value::TimestampRequest(ts) => {
            let mut buf = [0u8; 4];
            BigEndian::write_u32(&mut buf, *ts);
            Ok(buf.to_vec())
        }
        Value::TimeSeries(_) => Err(EncodeError::Unrepresentable {
            data_type: DataType::TimeSeries.name(),
            reason: "encoding a full time-series table is not supported, only a request timestamp",
        }),
        Value::EventTable(_) => Err(EncodeError::Unrepresentable {
            data_type: DataType::EventTable.name(),
            reason: "encoding a full event table is not supported, only a request timestamp",
        }),
        Value::Unknown(bytes) => Ok(bytes.clone()),
    }
}

/// Decode `bytes` as `data_type`.
pub fn decode(data_type: DataType, bytes: &[u8]) -> Result<Value, DecodeError> {
    match data_type {
        DataType::Bool => {
            expect_fixed_len(data_type, bytes)?;
            Ok(Value::Bool(bytes[0] != 0))
        }
        DataType::Uint8 => {
            expect_fixed_len(data_type, bytes)?;
            Ok(Value::Uint8(bytes[0]))
        }
        DataType::Int8 => {
            expect_fixed_len(data_type, bytes)?;
            Ok(Value::Int8(bytes[0] as i8))
        }
        DataType::Uint16 => {
            expect_fixed_len(data_type, bytes)?;
            Ok(Value::Uint16(BigEndian::read_u16(bytes)))
        }
        DataType::Int16 => {
            expect_fixed_len(data_type, bytes)?;
            Ok(Value::Int16(BigEndian::read_i16(bytes)))
        }
        DataType::Uint32 => {
            expect_fixed_len(data_type, bytes)?;
            Ok(Value::Uint32(BigEndian::read_u32(bytes)))
        }
        DataType::Int32 => {
            expect_fixed_len(data_type, bytes)?;
            Ok(Value::Int32(BigEndian::read_i32(bytes)))
        }
        DataType::Enum => {
            expect_fixed_len(data_type, bytes)?;
            Ok(Value::Enum(bytes[0]))
        }
        DataType::Float => {
            expect_fixed_len(data_type, bytes)?;
            Ok(Value::Float(BigEndian::read_f32(bytes)))
        }
        DataType::String => {
            let end = bytes.iter().position(|&b| b == 0x00).unwrap_or(bytes.len());
            if !bytes[..end].is_ascii() {
                return Err(DecodeError::InvalidAscii);
            }
            // ASCII bytes are valid UTF-8 one-to-one, so this never fails in
            // practice, but we still propagate rather than unwrap.
            let s = std::str::from_utf8(&bytes[..end])
                .map_err(|_| DecodeError::InvalidAscii)?
                .to_string();
            Ok(Value::String(s))
        }
        DataType::TimeSeries => decode_time_series(bytes).map(Value::TimeSeries),
        DataType::EventTable => decode_event_table(bytes).map(Value::EventTable),
        DataType::Unknown => Ok(Value::Unknown(bytes.to_vec())),
    }
}

/// Check `bytes` against `data_type`'s [`DataType::fixed_size`]. Only called
/// for the fixed-size scalar types above; `String`/`TimeSeries`/
/// `EventTable`/`Unknown` have their own length rules.
fn expect_fixed_len(data_type: DataType, bytes: &[u8]) -> Result<(), DecodeError> {
    let want = data_type
        .fixed_size()
        .unwrap_or_else(|| panic!("{} has no fixed size", data_type.name()));
    if bytes.len() != want {
        return Err(DecodeError::WrongLength {
            data_type: data_type.name(),
            expected: size_label(want),
            got: bytes.len(),
        });
    }
    Ok(())
}

/// `fixed_size`'s possible results, as the `&'static str` labels
/// `DecodeError::WrongLength` carries.
fn size_label(want: usize) -> &'static str {
    match want {
        1 => "1",
        2 => "2",
        4 => "4",
        _ => "a different length",
    }
}

fn decode_time_series(bytes: &[u8]) -> Result<TimeSeries, DecodeError> {
    if bytes.len() % 4 != 0 {
        return Err(DecodeError::WrongLength {
            data_type: DataType::TimeSeries.name(),
            expected: "a multiple of 4",
            got: bytes.len(),
        });
    }
    let words = bytes.len() / 4;
    if words == 0 || words % 2 == 0 {
        return Err(DecodeError::WrongLength {
            data_type: DataType::TimeSeries.name(),
            expected: "4 * (2n + 1) bytes",
            got: bytes.len(),
        });
    }
    let request_timestamp = BigEndian::read_u32(&bytes[0..4]);
    let mut samples = Vec::with_capacity((words - 1) / 2);
    let mut offset = 4;
    while offset < bytes.len() {
        let timestamp = BigEndian::read_u32(&bytes[offset..offset + 4]);
        let value = BigEndian::read_f32(&bytes[offset + 4..offset + 8]);
        samples.push(Sample { timestamp, value });
        offset += 8;
    }
    Ok(TimeSeries {
        request_timestamp,
        samples,
    })
}

fn decode_event_table(bytes: &[u8]) -> Result<EventTable, DecodeError> {
    if bytes.len() % 4 != 0 {
        return Err(DecodeError::WrongLength {
            data_type: DataType::EventTable.name(),
            expected: "a multiple of 4",
            got: bytes.len(),
        });
    }
    let words = bytes.len() / 4;
    if words == 0 || (words - 1) % 5 != 0 {
        return Err(DecodeError::WrongLength {
            data_type: DataType::EventTable.name(),
            expected: "4 * (5n + 1) bytes",
            got: bytes.len(),
        });
    }
    let request_timestamp = BigEndian::read_u32(&bytes[0..4]);
    let mut events = Vec::with_capacity((words - 1) / 5);
    let mut offset = 4;
    while offset < bytes.len() {
        let word = |i: usize| BigEndian::read_u32(&bytes[offset + i * 4..offset + i * 4 + 4]);
        events.push(EventRecord {
            type_marker: word(0),
            element2: word(1),
            element3: word(2),
            element4: word(3),
            element5: word(4),
        });
        offset += 20;
    }
    Ok(EventTable {
        request_timestamp,
        events,
    })
}
