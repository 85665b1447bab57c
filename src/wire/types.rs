// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The built-in wire type registry (wire format section 4.2 / section 6).
//!
//! Each [`WireType`] variant is a tagged alternative rather than an open
//! trait hierarchy: read/write dispatch is a `match`, and an unknown
//! type id observed on the wire is carried as the `Unknown` variant
//! instead of failing closed, per section 4.7.

use std::io::{Read, Write};

use crate::error::{FudgeError, Result};
use crate::field::{FieldValue, FudgeDate, FudgeDateTime, FudgeTime};

// Built-in type ids. Ordering and values are part of the wire contract
// and must never change once assigned (spec section 6).
pub const INDICATOR: u8 = 0;
pub const BOOLEAN: u8 = 1;
pub const BYTE: u8 = 2;
pub const SHORT: u8 = 3;
pub const INT: u8 = 4;
pub const LONG: u8 = 5;
pub const BYTE_ARRAY: u8 = 6;
pub const SHORT_ARRAY: u8 = 7;
pub const INT_ARRAY: u8 = 8;
pub const LONG_ARRAY: u8 = 9;
pub const FLOAT: u8 = 10;
pub const DOUBLE: u8 = 11;
pub const FLOAT_ARRAY: u8 = 12;
pub const DOUBLE_ARRAY: u8 = 13;
pub const STRING: u8 = 14;
pub const FUDGE_MSG: u8 = 15;
pub const BYTE_ARRAY_4: u8 = 16;
pub const BYTE_ARRAY_8: u8 = 17;
pub const BYTE_ARRAY_16: u8 = 18;
pub const BYTE_ARRAY_20: u8 = 19;
pub const BYTE_ARRAY_32: u8 = 20;
pub const BYTE_ARRAY_64: u8 = 21;
pub const BYTE_ARRAY_128: u8 = 22;
pub const BYTE_ARRAY_256: u8 = 23;
pub const BYTE_ARRAY_512: u8 = 24;
pub const DATE: u8 = 25;
pub const TIME: u8 = 26;
pub const DATETIME: u8 = 27;

/// Canonical fixed byte-array sizes, in ascending id order.
pub const FIXED_BYTE_ARRAY_SIZES: [u16; 9] = [4, 8, 16, 20, 32, 64, 128, 256, 512];

/// A registered wire type: {typeId, fixedSize|variable, read, write}.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    Indicator,
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    ByteArray,
    ShortArray,
    IntArray,
    LongArray,
    Float,
    Double,
    FloatArray,
    DoubleArray,
    String,
    /// Sub-message. Its bytes are a concatenation of fields (section 6),
    /// decoded by the stream reader rather than by `WireType::read`.
    FudgeMsg,
    FixedByteArray(u16),
    Date,
    Time,
    DateTime,
    /// A type id this process does not recognize. `fixed_size` is
    /// `Some` only when observed as fixed-width on the wire (which is
    /// itself a hard decode error per section 4.7 — see `reader.rs`);
    /// in practice only the variable-width shape reaches this variant.
    Unknown { type_id: u8, fixed_size: Option<u32> },
}

impl WireType {
    pub fn id(self) -> u8 {
        match self {
            WireType::Indicator => INDICATOR,
            WireType::Boolean => BOOLEAN,
            WireType::Byte => BYTE,
            WireType::Short => SHORT,
            WireType::Int => INT,
            WireType::Long => LONG,
            WireType::ByteArray => BYTE_ARRAY,
            WireType::ShortArray => SHORT_ARRAY,
            WireType::IntArray => INT_ARRAY,
            WireType::LongArray => LONG_ARRAY,
            WireType::Float => FLOAT,
            WireType::Double => DOUBLE,
            WireType::FloatArray => FLOAT_ARRAY,
            WireType::DoubleArray => DOUBLE_ARRAY,
            WireType::String => STRING,
            WireType::FudgeMsg => FUDGE_MSG,
            WireType::FixedByteArray(size) => fixed_byte_array_id(size).unwrap_or(BYTE_ARRAY_4),
            WireType::Date => DATE,
            WireType::Time => TIME,
            WireType::DateTime => DATETIME,
            WireType::Unknown { type_id, .. } => type_id,
        }
    }

    /// `true` if this type never emits a length prefix.
    pub fn is_fixed_width(self) -> bool {
        self.fixed_size().is_some()
    }

    /// The encoded value size in bytes, or `None` for variable-width
    /// types.
    pub fn fixed_size(self) -> Option<usize> {
        match self {
            WireType::Indicator => Some(0),
            WireType::Boolean | WireType::Byte => Some(1),
            WireType::Short => Some(2),
            WireType::Int | WireType::Float => Some(4),
            WireType::Long | WireType::Double => Some(8),
            WireType::FixedByteArray(size) => Some(size as usize),
            WireType::Date => Some(4),
            WireType::Time => Some(8),
            WireType::DateTime => Some(12),
            WireType::Unknown { fixed_size, .. } => fixed_size.map(|s| s as usize),
            WireType::ByteArray
            | WireType::ShortArray
            | WireType::IntArray
            | WireType::LongArray
            | WireType::FloatArray
            | WireType::DoubleArray
            | WireType::String
            | WireType::FudgeMsg => None,
        }
    }

    /// Look up the built-in type registered for `type_id`, if any.
    pub fn from_id(type_id: u8) -> Option<WireType> {
        Some(match type_id {
            INDICATOR => WireType::Indicator,
            BOOLEAN => WireType::Boolean,
            BYTE => WireType::Byte,
            SHORT => WireType::Short,
            INT => WireType::Int,
            LONG => WireType::Long,
            BYTE_ARRAY => WireType::ByteArray,
            SHORT_ARRAY => WireType::ShortArray,
            INT_ARRAY => WireType::IntArray,
            LONG_ARRAY => WireType::LongArray,
            FLOAT => WireType::Float,
            DOUBLE => WireType::Double,
            FLOAT_ARRAY => WireType::FloatArray,
            DOUBLE_ARRAY => WireType::DoubleArray,
            STRING => WireType::String,
            FUDGE_MSG => WireType::FudgeMsg,
            DATE => WireType::Date,
            TIME => WireType::Time,
            DATETIME => WireType::DateTime,
            id @ BYTE_ARRAY_4..=BYTE_ARRAY_512 => {
                WireType::FixedByteArray(fixed_byte_array_size(id)?)
            }
            _ => return None,
        })
    }

    /// Encoded byte length of `value` under this wire type. Fixed-width
    /// types return their constant size; variable-width types compute
    /// it from the value itself.
    pub fn size_of_value(self, value: &FieldValue) -> Result<usize> {
        if let Some(fixed) = self.fixed_size() {
            return Ok(fixed);
        }
        match (self, value) {
            (WireType::ByteArray, FieldValue::ByteArray(v)) => Ok(v.len()),
            (WireType::ShortArray, FieldValue::ShortArray(v)) => Ok(v.len() * 2),
            (WireType::IntArray, FieldValue::IntArray(v)) => Ok(v.len() * 4),
            (WireType::LongArray, FieldValue::LongArray(v)) => Ok(v.len() * 8),
            (WireType::FloatArray, FieldValue::FloatArray(v)) => Ok(v.len() * 4),
            (WireType::DoubleArray, FieldValue::DoubleArray(v)) => Ok(v.len() * 8),
            (WireType::String, FieldValue::String(s)) => Ok(s.as_bytes().len()),
            (WireType::Unknown { .. }, FieldValue::Unknown { data, .. }) => Ok(data.len()),
            _ => Err(FudgeError::StateViolation {
                reason: "value does not match its wire type".into(),
            }),
        }
    }

    /// Read a primitive value of `declared_size` bytes from `input`.
    /// `FudgeMsg` is never read through this path; the stream reader
    /// handles sub-messages directly.
    pub fn read(self, input: &mut dyn Read, declared_size: usize) -> Result<FieldValue> {
        match self {
            WireType::Indicator => Ok(FieldValue::Indicator),
            WireType::Boolean => Ok(FieldValue::Boolean(read_u8(input)? != 0)),
            WireType::Byte => Ok(FieldValue::Byte(read_u8(input)? as i8)),
            WireType::Short => Ok(FieldValue::Short(read_i16(input)?)),
            WireType::Int => Ok(FieldValue::Int(read_i32(input)?)),
            WireType::Long => Ok(FieldValue::Long(read_i64(input)?)),
            WireType::Float => Ok(FieldValue::Float(f32::from_bits(read_u32(input)?))),
            WireType::Double => Ok(FieldValue::Double(f64::from_bits(read_u64(input)?))),
            WireType::ByteArray => Ok(FieldValue::ByteArray(read_bytes(input, declared_size)?)),
            WireType::ShortArray => {
                Ok(FieldValue::ShortArray(read_array(input, declared_size, 2, |r| {
                    read_i16(r)
                })?))
            }
            WireType::IntArray => {
                Ok(FieldValue::IntArray(read_array(input, declared_size, 4, |r| {
                    read_i32(r)
                })?))
            }
            WireType::LongArray => {
                Ok(FieldValue::LongArray(read_array(input, declared_size, 8, |r| {
                    read_i64(r)
                })?))
            }
            WireType::FloatArray => Ok(FieldValue::FloatArray(read_array(
                input,
                declared_size,
                4,
                |r| Ok(f32::from_bits(read_u32(r)?)),
            )?)),
            WireType::DoubleArray => Ok(FieldValue::DoubleArray(read_array(
                input,
                declared_size,
                8,
                |r| Ok(f64::from_bits(read_u64(r)?)),
            )?)),
            WireType::String => {
                let bytes = read_bytes(input, declared_size)?;
                String::from_utf8(bytes)
                    .map(FieldValue::String)
                    .map_err(|_| FudgeError::MalformedFrame {
                        reason: "string field is not valid UTF-8".into(),
                    })
            }
            WireType::FixedByteArray(size) => {
                Ok(FieldValue::FixedByteArray(read_bytes(input, size as usize)?))
            }
            WireType::Date => Ok(FieldValue::Date(FudgeDate {
                year: read_i16(input)?,
                month: read_u8(input)?,
                day: read_u8(input)?,
            })),
            WireType::Time => Ok(FieldValue::Time(FudgeTime {
                seconds_since_midnight: read_u32(input)?,
                nanos: read_u32(input)?,
            })),
            WireType::DateTime => {
                let date = FudgeDate {
                    year: read_i16(input)?,
                    month: read_u8(input)?,
                    day: read_u8(input)?,
                };
                let time = FudgeTime {
                    seconds_since_midnight: read_u32(input)?,
                    nanos: read_u32(input)?,
                };
                Ok(FieldValue::DateTime(FudgeDateTime { date, time }))
            }
            WireType::FudgeMsg => Err(FudgeError::StateViolation {
                reason: "sub-message values are read via the stream reader, not WireType::read"
                    .into(),
            }),
            WireType::Unknown { type_id, .. } => Ok(FieldValue::Unknown {
                type_id,
                data: read_bytes(input, declared_size)?,
            }),
        }
    }

    /// Write the value bytes (not the prefix, type id, name, ordinal,
    /// or size prefix) for this wire type.
    pub fn write(self, output: &mut dyn Write, value: &FieldValue) -> Result<()> {
        match (self, value) {
            (WireType::Indicator, FieldValue::Indicator) => Ok(()),
            (WireType::Boolean, FieldValue::Boolean(b)) => write_u8(output, u8::from(*b)),
            (WireType::Byte, FieldValue::Byte(b)) => write_u8(output, *b as u8),
            (WireType::Short, FieldValue::Short(s)) => write_i16(output, *s),
            (WireType::Int, FieldValue::Int(i)) => write_i32(output, *i),
            (WireType::Long, FieldValue::Long(l)) => write_i64(output, *l),
            (WireType::Float, FieldValue::Float(f)) => write_u32(output, f.to_bits()),
            (WireType::Double, FieldValue::Double(d)) => write_u64(output, d.to_bits()),
            (WireType::ByteArray, FieldValue::ByteArray(v)) => output.write_all(v).map_err(Into::into),
            (WireType::ShortArray, FieldValue::ShortArray(v)) => {
                v.iter().try_for_each(|x| write_i16(output, *x))
            }
            (WireType::IntArray, FieldValue::IntArray(v)) => {
                v.iter().try_for_each(|x| write_i32(output, *x))
            }
            (WireType::LongArray, FieldValue::LongArray(v)) => {
                v.iter().try_for_each(|x| write_i64(output, *x))
            }
            (WireType::FloatArray, FieldValue::FloatArray(v)) => {
                v.iter().try_for_each(|x| write_u32(output, x.to_bits()))
            }
            (WireType::DoubleArray, FieldValue::DoubleArray(v)) => {
                v.iter().try_for_each(|x| write_u64(output, x.to_bits()))
            }
            (WireType::String, FieldValue::String(s)) => {
                output.write_all(s.as_bytes()).map_err(Into::into)
            }
            (WireType::FixedByteArray(size), FieldValue::FixedByteArray(v)) => {
                if v.len() != size as usize {
                    return Err(FudgeError::StateViolation {
                        reason: "fixed byte array length does not match its wire type".into(),
                    });
                }
                output.write_all(v).map_err(Into::into)
            }
            (WireType::Date, FieldValue::Date(d)) => {
                write_i16(output, d.year)?;
                write_u8(output, d.month)?;
                write_u8(output, d.day)
            }
            (WireType::Time, FieldValue::Time(t)) => {
                write_u32(output, t.seconds_since_midnight)?;
                write_u32(output, t.nanos)
            }
            (WireType::DateTime, FieldValue::DateTime(dt)) => {
                write_i16(output, dt.date.year)?;
                write_u8(output, dt.date.month)?;
                write_u8(output, dt.date.day)?;
                write_u32(output, dt.time.seconds_since_midnight)?;
                write_u32(output, dt.time.nanos)
            }
            (WireType::FudgeMsg, _) => Err(FudgeError::StateViolation {
                reason: "sub-message values are written via the stream writer, not WireType::write"
                    .into(),
            }),
            (WireType::Unknown { .. }, FieldValue::Unknown { data, .. }) => {
                output.write_all(data).map_err(Into::into)
            }
            _ => Err(FudgeError::StateViolation {
                reason: "value does not match its wire type".into(),
            }),
        }
    }
}

fn fixed_byte_array_id(size: u16) -> Option<u8> {
    FIXED_BYTE_ARRAY_SIZES
        .iter()
        .position(|&s| s == size)
        .map(|idx| BYTE_ARRAY_4 + idx as u8)
}

fn fixed_byte_array_size(type_id: u8) -> Option<u16> {
    let idx = (type_id - BYTE_ARRAY_4) as usize;
    FIXED_BYTE_ARRAY_SIZES.get(idx).copied()
}

fn read_array<T>(
    input: &mut dyn Read,
    declared_size: usize,
    element_width: usize,
    mut read_one: impl FnMut(&mut dyn Read) -> Result<T>,
) -> Result<Vec<T>> {
    if declared_size % element_width != 0 {
        return Err(FudgeError::MalformedFrame {
            reason: "array size is not a multiple of its element width".into(),
        });
    }
    let count = declared_size / element_width;
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        out.push(read_one(input)?);
    }
    Ok(out)
}

pub(crate) fn read_bytes(input: &mut dyn Read, len: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    input.read_exact(&mut buf).map_err(|err| {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            FudgeError::MalformedFrame {
                reason: "truncated field".into(),
            }
        } else {
            FudgeError::IoFailure(err)
        }
    })?;
    Ok(buf)
}

pub(crate) fn read_u8(input: &mut dyn Read) -> Result<u8> {
    Ok(read_bytes(input, 1)?[0])
}

pub(crate) fn read_i16(input: &mut dyn Read) -> Result<i16> {
    let b = read_bytes(input, 2)?;
    Ok(i16::from_be_bytes([b[0], b[1]]))
}

pub(crate) fn read_u16(input: &mut dyn Read) -> Result<u16> {
    let b = read_bytes(input, 2)?;
    Ok(u16::from_be_bytes([b[0], b[1]]))
}

pub(crate) fn read_u32(input: &mut dyn Read) -> Result<u32> {
    let b = read_bytes(input, 4)?;
    Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

pub(crate) fn read_i32(input: &mut dyn Read) -> Result<i32> {
    Ok(read_u32(input)? as i32)
}

pub(crate) fn read_u64(input: &mut dyn Read) -> Result<u64> {
    let b = read_bytes(input, 8)?;
    Ok(u64::from_be_bytes([
        b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
    ]))
}

pub(crate) fn read_i64(input: &mut dyn Read) -> Result<i64> {
    Ok(read_u64(input)? as i64)
}

pub(crate) fn write_u8(output: &mut dyn Write, value: u8) -> Result<()> {
    output.write_all(&[value]).map_err(Into::into)
}

pub(crate) fn write_i16(output: &mut dyn Write, value: i16) -> Result<()> {
    output.write_all(&value.to_be_bytes()).map_err(Into::into)
}

pub(crate) fn write_u32(output: &mut dyn Write, value: u32) -> Result<()> {
    output.write_all(&value.to_be_bytes()).map_err(Into::into)
}

fn write_i32(output: &mut dyn Write, value: i32) -> Result<()> {
    write_u32(output, value as u32)
}

fn write_u64(output: &mut dyn Write, value: u64) -> Result<()> {
    output.write_all(&value.to_be_bytes()).map_err(Into::into)
}

fn write_i64(output: &mut dyn Write, value: i64) -> Result<()> {
    write_u64(output, value as u64)
}
