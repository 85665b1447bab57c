// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Size calculator: predicts exact encoded byte length without
//! producing bytes (wire format section 4.5).

use crate::error::{FudgeError, Result};
use crate::field::{Field, FieldValue};
use crate::message::Message;
use crate::taxonomy::Taxonomy;
use crate::wire::{SizeCode, WireType};

const ENVELOPE_HEADER_SIZE: usize = 8;

/// Resolve the effective (name, ordinal) a field will carry on the
/// wire once taxonomy substitution is applied: if both are present
/// the explicit ordinal is trusted outright (section 4.6); otherwise a
/// name that the taxonomy maps to an ordinal is substituted away.
pub fn effective_identifiers(
    name: Option<&str>,
    ordinal: Option<i16>,
    taxonomy: Option<&dyn Taxonomy>,
) -> (Option<String>, Option<i16>) {
    // An explicit ordinal always wins outright; the taxonomy is not
    // consulted for this field at all, and any explicit name is kept
    // as-is rather than dropped (resolved Open Question, section 9).
    if ordinal.is_some() {
        return (name.map(str::to_owned), ordinal);
    }
    // Only a name with no explicit ordinal can be substituted away.
    if let (Some(name), Some(taxonomy)) = (name, taxonomy) {
        if let Some(resolved) = taxonomy.get_field_ordinal(name) {
            return (None, Some(resolved));
        }
    }
    (name.map(str::to_owned), ordinal)
}

/// `calculateFieldSize`: the exact encoded byte length of one field.
pub fn calculate_field_size(
    taxonomy: Option<&dyn Taxonomy>,
    name: Option<&str>,
    ordinal: Option<i16>,
    wire_type: WireType,
    value: &FieldValue,
) -> Result<usize> {
    let (effective_name, effective_ordinal) = effective_identifiers(name, ordinal, taxonomy);

    let mut size = 2usize; // prefix byte + type id byte
    if effective_ordinal.is_some() {
        size += 2;
    }
    if let Some(name) = &effective_name {
        let name_len = name.as_bytes().len();
        if name_len > 255 {
            return Err(FudgeError::EncodingOverflow {
                reason: format!("field name is {name_len} bytes, exceeds 255"),
            });
        }
        size += 1 + name_len;
    }

    if let Some(fixed) = wire_type.fixed_size() {
        size += fixed;
    } else {
        let value_size = match wire_type {
            WireType::FudgeMsg => match value {
                FieldValue::Message(msg) => calculate_message_size(taxonomy, msg)?,
                _ => {
                    return Err(FudgeError::StateViolation {
                        reason: "sub-message wire type requires a Message value".into(),
                    })
                }
            },
            other => other.size_of_value(value)?,
        };
        if value_size > i32::MAX as usize {
            return Err(FudgeError::EncodingOverflow {
                reason: format!("value size {value_size} exceeds i32::MAX"),
            });
        }
        let size_code = SizeCode::smallest_for(value_size);
        size += size_code.prefix_len() + value_size;
    }

    Ok(size)
}

/// `calculateFieldSize` directly from a [`Field`], inferring its
/// primary wire type.
pub fn calculate_field_size_for(taxonomy: Option<&dyn Taxonomy>, field: &Field) -> Result<usize> {
    let wire_type =
        crate::dictionary::effective_wire_type(field).ok_or_else(|| FudgeError::UnknownType {
            reason: "no wire type registered for this value".into(),
        })?;
    calculate_field_size(
        taxonomy,
        field.name.as_deref(),
        field.ordinal,
        wire_type,
        &field.value,
    )
}

/// `calculateMessageSize`: sum of field sizes. If `message` is an
/// encoded-backed container, its pre-computed length is returned
/// verbatim instead of summing (section 4.5).
pub fn calculate_message_size(
    taxonomy: Option<&dyn Taxonomy>,
    message: &dyn Message,
) -> Result<usize> {
    if let Some(encoded_len) = message.precomputed_encoded_len() {
        return Ok(encoded_len);
    }
    let mut total = 0usize;
    for field in message.iter() {
        total += calculate_field_size_for(taxonomy, &field)?;
    }
    Ok(total)
}

/// `calculateMessageEnvelopeSize`: message size plus the 8-byte
/// envelope header.
pub fn calculate_envelope_size(taxonomy: Option<&dyn Taxonomy>, message: &dyn Message) -> Result<usize> {
    Ok(ENVELOPE_HEADER_SIZE + calculate_message_size(taxonomy, message)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::eager::FudgeMsg;
    use crate::message::MutableMessage;
    use crate::taxonomy::MapTaxonomy;

    #[test]
    fn s2_envelope_roundtrip_size() {
        let mut msg = FudgeMsg::new();
        msg.add(Some("b".into()), None, FieldValue::Boolean(true))
            .unwrap();
        let size = calculate_envelope_size(None, &msg).unwrap();
        assert_eq!(size, 14);
    }

    #[test]
    fn s3_indicator_field_size() {
        let size =
            calculate_field_size(None, None, Some(5), WireType::Indicator, &FieldValue::Indicator)
                .unwrap();
        assert_eq!(size, 4);
    }

    #[test]
    fn s4_taxonomy_substitution_drops_name_adds_ordinal() {
        let taxonomy = MapTaxonomy::from_pairs([("x".to_string(), 7)]);
        let size = calculate_field_size(
            Some(&taxonomy),
            Some("x"),
            None,
            WireType::Int,
            &FieldValue::Int(42),
        )
        .unwrap();
        // prefix + type + ordinal(2) + value(4), name dropped
        assert_eq!(size, 2 + 2 + 4);
    }

    #[test]
    fn name_over_255_bytes_overflows() {
        let long_name = "x".repeat(256);
        let err = calculate_field_size(
            None,
            Some(&long_name),
            None,
            WireType::Boolean,
            &FieldValue::Boolean(true),
        )
        .unwrap_err();
        assert!(matches!(err, FudgeError::EncodingOverflow { .. }));
    }
}
