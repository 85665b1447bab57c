// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! A self-describing, hierarchical, binary message codec.
//!
//! Fudge messages are an ordered sequence of named and/or ordinal-keyed
//! fields, wrapped in an 8-byte envelope. Unlike a schema-first codec,
//! a Fudge message carries enough information in its own bytes (a type
//! id and an optional name/ordinal per field) to be decoded without
//! out-of-band knowledge of its shape; an optional *taxonomy* lets a
//! stream substitute a field's name for a compact ordinal on the wire
//! and recover the name again on read.
//!
//! # Quick start
//!
//! ```
//! use fudge::context::Context;
//! use fudge::field::FieldValue;
//! use fudge::message::eager::FudgeMsg;
//! use fudge::message::MutableMessage;
//! use fudge::reader::StreamElement;
//! use fudge::size::calculate_envelope_size;
//!
//! let ctx = Context::new();
//!
//! let mut msg = FudgeMsg::new();
//! msg.add(Some("name".into()), None, FieldValue::String("ACME".into())).unwrap();
//! msg.add(Some("price".into()), None, FieldValue::Double(123.45)).unwrap();
//!
//! let total_size = calculate_envelope_size(None, &msg).unwrap() as i32;
//! let mut bytes = Vec::new();
//! let mut writer = ctx.new_writer(&mut bytes);
//! writer.write_envelope_header(0, 0, 0, total_size).unwrap();
//! for field in msg.iter() {
//!     writer.write_field(field.name.as_deref(), field.ordinal, &field.value).unwrap();
//! }
//!
//! let mut reader = ctx.new_reader(&bytes[..]);
//! assert!(matches!(reader.next().unwrap(), Some(StreamElement::MessageEnvelope(_))));
//! match reader.next().unwrap() {
//!     Some(StreamElement::SimpleField(field)) => assert_eq!(field.name.as_deref(), Some("name")),
//!     other => panic!("unexpected element: {other:?}"),
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//!  FudgeMsg / EncodedFudgeMsg  (message::eager / message::encoded)
//!            |  dyn Message
//!            v
//!    size::calculate_*           reader::StreamReader
//!    (byte-length prediction)    writer::StreamWriter
//!            |                         |
//!            +----------+--------------+
//!                       v
//!              wire::types::WireType   (read/write per field)
//!              wire::prefix            (1-byte field header)
//!                       |
//!              dictionary / taxonomy   (value <-> wire type, name <-> ordinal)
//!                       |
//!                  context::Context    (process-scoped binding)
//! ```
//!
//! # Key types
//!
//! | Type | Role |
//! |---|---|
//! | [`context::Context`] | Binds a [`dictionary::TypeDictionary`] and [`taxonomy::TaxonomyResolver`] for a process |
//! | [`message::eager::FudgeMsg`] | Mutable, fully in-memory message |
//! | [`message::encoded::EncodedFudgeMsg`] | Immutable, lazily-decoded message backed by received bytes |
//! | [`reader::StreamReader`] | Pull-style decoder over a [`std::io::Read`] |
//! | [`writer::StreamWriter`] | Push-style encoder over a [`std::io::Write`], budget-enforced |
//! | [`error::FudgeError`] | The crate's single error type |

pub mod context;
pub mod dictionary;
pub mod envelope;
pub mod error;
pub mod field;
pub mod message;
pub mod reader;
pub mod size;
pub mod taxonomy;
pub mod wire;
pub mod writer;

pub use context::Context;
pub use dictionary::{get_value, FieldSelector, TypeDictionary};
pub use envelope::Envelope;
pub use error::{FudgeError, Result};
pub use field::{Field, FieldValue};
pub use message::eager::FudgeMsg;
pub use message::{Message, MutableMessage};
pub use reader::{StreamElement, StreamReader};
pub use writer::StreamWriter;
