// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Field values and the immutable `Field` tuple (data model section 3).

use crate::message::MessageValue;

/// A calendar date, encoded on the wire as a fixed 4-byte value
/// (2-byte signed year, 1-byte month, 1-byte day). Calendar validation
/// beyond this crate's scope (leap years, month lengths, time zones)
/// is left to the application; the codec only needs a stable, fixed
/// width in/out representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FudgeDate {
    pub year: i16,
    pub month: u8,
    pub day: u8,
}

/// A time-of-day, encoded on the wire as a fixed 8-byte value: 4-byte
/// seconds since midnight plus 4-byte nanosecond remainder. No time
/// zone or accuracy indicator is carried; see `DESIGN.md`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FudgeTime {
    pub seconds_since_midnight: u32,
    pub nanos: u32,
}

/// A combined date and time, encoded as the 4-byte date followed by
/// the 8-byte time (12 bytes fixed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FudgeDateTime {
    pub date: FudgeDate,
    pub time: FudgeTime,
}

/// The in-memory representation of a field's value, one variant per
/// built-in wire type plus an `Unknown` catch-all for type ids this
/// reader does not recognize.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Indicator,
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    ByteArray(Vec<u8>),
    ShortArray(Vec<i16>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
    Float(f32),
    Double(f64),
    FloatArray(Vec<f32>),
    DoubleArray(Vec<f64>),
    String(String),
    /// Fixed-width byte array at one of the canonical sizes (4, 8, 16,
    /// 20, 32, 64, 128, 256, 512); `bytes.len()` equals that size.
    FixedByteArray(Vec<u8>),
    Date(FudgeDate),
    Time(FudgeTime),
    DateTime(FudgeDateTime),
    Message(MessageValue),
    /// A value read under a type id this process does not recognize.
    /// Variable-width unknown values are captured verbatim; fixed-width
    /// unknown values are a reader error (section 4.7) and never reach
    /// this variant.
    Unknown { type_id: u8, data: Vec<u8> },
}

/// An immutable {type, value, name?, ordinal?} tuple (data model
/// section 3). Equality compares all four components.
///
/// `wire_type` is normally derived from `value`'s variant (its
/// "primary" wire type); `wire_type_override` lets a caller pin a
/// different registered wire type for the same value shape, e.g.
/// writing a 16-byte buffer as `FixedByteArray(16)` rather than the
/// variable-width `ByteArray` its value would otherwise imply.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub value: FieldValue,
    pub name: Option<String>,
    pub ordinal: Option<i16>,
    pub wire_type_override: Option<crate::wire::WireType>,
}

impl Field {
    pub fn new(name: Option<String>, ordinal: Option<i16>, value: FieldValue) -> Self {
        Field {
            value,
            name,
            ordinal,
            wire_type_override: None,
        }
    }

    pub fn with_wire_type(
        name: Option<String>,
        ordinal: Option<i16>,
        wire_type: crate::wire::WireType,
        value: FieldValue,
    ) -> Self {
        Field {
            value,
            name,
            ordinal,
            wire_type_override: Some(wire_type),
        }
    }
}
