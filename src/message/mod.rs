// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Message container abstraction: an ordered field list with two
//! realizations, an eager [`eager::FudgeMsg`] and a lazy
//! [`encoded::EncodedFudgeMsg`] (wire format section 4.6 / 4.8).

pub mod eager;
pub mod encoded;

use crate::field::Field;

/// A read-only view over an ordered field sequence, implemented by
/// both the eager and encoded-backed containers.
///
/// Kept free of generic methods so it stays `dyn`-safe: the size
/// calculator and stream writer operate over `&dyn Message` without
/// caring which realization backs it.
pub trait Message {
    fn num_fields(&self) -> usize;
    fn is_empty(&self) -> bool;
    fn get_by_index(&self, index: usize) -> Option<Field>;
    fn get_by_name(&self, name: &str) -> Option<Field>;
    fn get_all_by_name(&self, name: &str) -> Vec<Field>;
    fn get_by_ordinal(&self, ordinal: i16) -> Option<Field>;
    fn iter(&self) -> Box<dyn Iterator<Item = Field> + '_>;

    /// `Some(len)` when this container already knows its exact encoded
    /// byte length (the encoded-backed container shortcuts the size
    /// calculator's field-by-field sum, section 4.5).
    fn precomputed_encoded_len(&self) -> Option<usize> {
        None
    }
}

/// Build/mutate interface, implemented only by [`eager::FudgeMsg`].
/// The encoded-backed container is immutable and has no counterpart.
pub trait MutableMessage {
    fn add(&mut self, name: Option<String>, ordinal: Option<i16>, value: crate::field::FieldValue) -> crate::error::Result<()>;
    /// Add a field under an explicitly chosen wire type rather than
    /// `value`'s primary one, e.g. encoding a 16-byte buffer as
    /// `FixedByteArray(16)` instead of the variable-width `ByteArray`.
    fn add_typed(
        &mut self,
        name: Option<String>,
        ordinal: Option<i16>,
        wire_type: crate::wire::WireType,
        value: crate::field::FieldValue,
    ) -> crate::error::Result<()>;
    fn remove_by_name(&mut self, name: &str);
    fn remove_by_ordinal(&mut self, ordinal: i16);
    fn add_sub_message(
        &mut self,
        name: Option<String>,
        ordinal: Option<i16>,
        sub: eager::FudgeMsg,
    ) -> crate::error::Result<()>;
    fn ensure_sub_message(
        &mut self,
        name: Option<String>,
        ordinal: Option<i16>,
    ) -> &mut eager::FudgeMsg;
    fn clear(&mut self);
}

/// The value of a field whose wire type is sub-message: either an
/// eagerly-built message or a lazily-decoded, encoded-backed one.
/// Equality and iteration compare/traverse the decoded field
/// sequence regardless of which realization is behind it.
#[derive(Clone)]
pub enum MessageValue {
    Eager(eager::FudgeMsg),
    Encoded(encoded::EncodedFudgeMsg),
}

impl std::fmt::Debug for MessageValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageValue::Eager(m) => f.debug_tuple("Eager").field(m).finish(),
            MessageValue::Encoded(m) => f.debug_tuple("Encoded").field(m).finish(),
        }
    }
}

impl PartialEq for MessageValue {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Message for MessageValue {
    fn num_fields(&self) -> usize {
        match self {
            MessageValue::Eager(m) => m.num_fields(),
            MessageValue::Encoded(m) => m.num_fields(),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            MessageValue::Eager(m) => m.is_empty(),
            MessageValue::Encoded(m) => m.is_empty(),
        }
    }

    fn get_by_index(&self, index: usize) -> Option<Field> {
        match self {
            MessageValue::Eager(m) => m.get_by_index(index),
            MessageValue::Encoded(m) => m.get_by_index(index),
        }
    }

    fn get_by_name(&self, name: &str) -> Option<Field> {
        match self {
            MessageValue::Eager(m) => m.get_by_name(name),
            MessageValue::Encoded(m) => m.get_by_name(name),
        }
    }

    fn get_all_by_name(&self, name: &str) -> Vec<Field> {
        match self {
            MessageValue::Eager(m) => m.get_all_by_name(name),
            MessageValue::Encoded(m) => m.get_all_by_name(name),
        }
    }

    fn get_by_ordinal(&self, ordinal: i16) -> Option<Field> {
        match self {
            MessageValue::Eager(m) => m.get_by_ordinal(ordinal),
            MessageValue::Encoded(m) => m.get_by_ordinal(ordinal),
        }
    }

    fn iter(&self) -> Box<dyn Iterator<Item = Field> + '_> {
        match self {
            MessageValue::Eager(m) => m.iter(),
            MessageValue::Encoded(m) => m.iter(),
        }
    }

    fn precomputed_encoded_len(&self) -> Option<usize> {
        match self {
            MessageValue::Eager(m) => m.precomputed_encoded_len(),
            MessageValue::Encoded(m) => m.precomputed_encoded_len(),
        }
    }
}
