// Copyright 2024 rct-proto contributors.
// This software may be modified and distributed under the terms
// of the BSD license. See the LICENSE file for details.

//! A sans-I/O codec for the RCT solar-inverter serial-over-TCP protocol.
//!
//! This crate owns the frame and value codecs only: encoding outbound
//! request frames, incrementally decoding inbound response frames from a
//! byte stream, converting typed payloads between wire and host
//! representations, and looking up OID metadata in a [`registry::Registry`].
//! It does not open sockets, retry, or authenticate — the wire protocol has
//! none of that, and a caller with a `TcpStream` drives [`receive::ReceiveFrame`]
//! with whatever bytes `read()` hands back.
//!
//! # Examples
//!
//! Build a read request and feed a response back through the receiver:
//!
//! ```
//! use rct_proto::{command::Command, frame, receive::ReceiveFrame, types};
//!
//! let request = frame::build_frame(Command::Read, 0x959930BF, &[], None).unwrap();
//! assert_eq!(request, vec![0x2B, 0x01, 0x04, 0x95, 0x99, 0x30, 0xBF, 0x0D, 0x65]);
//!
//! let response = [0x2B, 0x05, 0x08, 0x95, 0x99, 0x30, 0xBF, 0x3E, 0x97, 0xB1, 0x91, 0x9C, 0x86];
//! let mut rf = ReceiveFrame::new();
//! rf.consume(&response);
//! assert!(rf.complete());
//!
//! match types::decode(types::DataType::Float, rf.data()).unwrap() {
//!     types::Value::Float(v) => assert!((v - 0.2961).abs() < 0.001),
//!     other => panic!("unexpected {:?}", other),
//! }
//! ```
pub mod command;
pub mod crc;
pub mod error;
pub mod escape;
pub mod frame;
pub mod receive;
pub mod registry;
pub mod types;
