// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Eager, mutable message container.

use crate::dictionary::primary_wire_type;
use crate::error::{FudgeError, Result};
use crate::field::{Field, FieldValue};
use crate::message::{Message, MessageValue, MutableMessage};
use crate::wire::WireType;

/// An ordered, mutable field list. Fully built in memory; duplicates by
/// name or ordinal are permitted and insertion order is preserved
/// (data model section 3).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FudgeMsg {
    fields: Vec<Field>,
}

impl FudgeMsg {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fields(fields: Vec<Field>) -> Self {
        FudgeMsg { fields }
    }
}

impl Message for FudgeMsg {
    fn num_fields(&self) -> usize {
        self.fields.len()
    }

    fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn get_by_index(&self, index: usize) -> Option<Field> {
        self.fields.get(index).cloned()
    }

    fn get_by_name(&self, name: &str) -> Option<Field> {
        self.fields.iter().find(|f| f.name.as_deref() == Some(name)).cloned()
    }

    fn get_all_by_name(&self, name: &str) -> Vec<Field> {
        self.fields
            .iter()
            .filter(|f| f.name.as_deref() == Some(name))
            .cloned()
            .collect()
    }

    fn get_by_ordinal(&self, ordinal: i16) -> Option<Field> {
        self.fields.iter().find(|f| f.ordinal == Some(ordinal)).cloned()
    }

    fn iter(&self) -> Box<dyn Iterator<Item = Field> + '_> {
        Box::new(self.fields.iter().cloned())
    }
}

fn validate_name(name: &Option<String>) -> Result<()> {
    if let Some(name) = name {
        if name.as_bytes().len() > 255 {
            return Err(FudgeError::EncodingOverflow {
                reason: format!("field name is {} bytes, exceeds 255", name.as_bytes().len()),
            });
        }
    }
    Ok(())
}

impl MutableMessage for FudgeMsg {
    fn add(&mut self, name: Option<String>, ordinal: Option<i16>, value: FieldValue) -> Result<()> {
        validate_name(&name)?;
        if primary_wire_type(&value).is_none() {
            return Err(FudgeError::UnknownType {
                reason: "no wire type registered for this value".into(),
            });
        }
        self.fields.push(Field::new(name, ordinal, value));
        Ok(())
    }

    fn add_typed(
        &mut self,
        name: Option<String>,
        ordinal: Option<i16>,
        wire_type: WireType,
        value: FieldValue,
    ) -> Result<()> {
        validate_name(&name)?;
        match (wire_type, &value) {
            (WireType::FudgeMsg, FieldValue::Message(_)) => {}
            _ => {
                // Reuse WireType::write's own shape check (variant match,
                // fixed byte array length) against a throwaway sink rather
                // than duplicating it here.
                wire_type
                    .write(&mut Vec::new(), &value)
                    .map_err(|_| FudgeError::ConversionFailure {
                        reason: format!("value does not fit the requested wire type {wire_type:?}"),
                    })?;
            }
        }
        self.fields.push(Field::with_wire_type(name, ordinal, wire_type, value));
        Ok(())
    }

    fn remove_by_name(&mut self, name: &str) {
        self.fields.retain(|f| f.name.as_deref() != Some(name));
    }

    fn remove_by_ordinal(&mut self, ordinal: i16) {
        self.fields.retain(|f| f.ordinal != Some(ordinal));
    }

    fn add_sub_message(
        &mut self,
        name: Option<String>,
        ordinal: Option<i16>,
        sub: FudgeMsg,
    ) -> Result<()> {
        validate_name(&name)?;
        self.fields
            .push(Field::new(name, ordinal, FieldValue::Message(MessageValue::Eager(sub))));
        Ok(())
    }

    fn ensure_sub_message(&mut self, name: Option<String>, ordinal: Option<i16>) -> &mut FudgeMsg {
        let existing = self.fields.iter().position(|f| {
            f.name == name
                && f.ordinal == ordinal
                && matches!(f.value, FieldValue::Message(MessageValue::Eager(_)))
        });
        let index = existing.unwrap_or_else(|| {
            self.fields.push(Field::new(
                name,
                ordinal,
                FieldValue::Message(MessageValue::Eager(FudgeMsg::new())),
            ));
            self.fields.len() - 1
        });
        match &mut self.fields[index].value {
            FieldValue::Message(MessageValue::Eager(sub)) => sub,
            _ => unreachable!("index was just verified to hold an eager sub-message"),
        }
    }

    fn clear(&mut self) {
        self.fields.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s6_duplicate_names_preserve_insertion_order() {
        let mut msg = FudgeMsg::new();
        msg.add(Some("boolean".into()), None, FieldValue::Boolean(true)).unwrap();
        msg.add(Some("boolean".into()), None, FieldValue::Boolean(false)).unwrap();

        assert_eq!(
            msg.get_by_name("boolean").unwrap().value,
            FieldValue::Boolean(true)
        );
        let all = msg.get_all_by_name("boolean");
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].value, FieldValue::Boolean(true));
        assert_eq!(all[1].value, FieldValue::Boolean(false));
    }

    #[test]
    fn name_over_255_bytes_is_rejected() {
        let mut msg = FudgeMsg::new();
        let long_name = "n".repeat(256);
        let err = msg.add(Some(long_name), None, FieldValue::Int(1)).unwrap_err();
        assert!(matches!(err, FudgeError::EncodingOverflow { .. }));
    }

    #[test]
    fn ensure_sub_message_creates_then_reuses() {
        let mut msg = FudgeMsg::new();
        msg.ensure_sub_message(Some("child".into()), None)
            .add(Some("a".into()), None, FieldValue::Int(1))
            .unwrap();
        msg.ensure_sub_message(Some("child".into()), None)
            .add(Some("b".into()), None, FieldValue::Int(2))
            .unwrap();

        assert_eq!(msg.num_fields(), 1);
        let child = msg.get_by_name("child").unwrap();
        match child.value {
            FieldValue::Message(MessageValue::Eager(sub)) => assert_eq!(sub.num_fields(), 2),
            _ => panic!("expected eager sub-message"),
        }
    }

    #[test]
    fn add_typed_overrides_the_value_s_primary_wire_type() {
        let mut msg = FudgeMsg::new();
        msg.add_typed(
            Some("id".into()),
            None,
            WireType::FixedByteArray(16),
            FieldValue::FixedByteArray(vec![0u8; 16]),
        )
        .unwrap();

        let field = msg.get_by_name("id").unwrap();
        assert_eq!(field.wire_type_override, Some(WireType::FixedByteArray(16)));
    }

    #[test]
    fn add_typed_rejects_a_value_that_does_not_fit_the_requested_type() {
        let mut msg = FudgeMsg::new();
        let err = msg
            .add_typed(
                Some("id".into()),
                None,
                WireType::FixedByteArray(16),
                FieldValue::FixedByteArray(vec![0u8; 4]),
            )
            .unwrap_err();
        assert!(matches!(err, FudgeError::ConversionFailure { .. }));
    }

    #[test]
    fn remove_by_name_drops_matching_fields() {
        let mut msg = FudgeMsg::new();
        msg.add(Some("a".into()), None, FieldValue::Int(1)).unwrap();
        msg.add(Some("b".into()), None, FieldValue::Int(2)).unwrap();
        msg.remove_by_name("a");
        assert_eq!(msg.num_fields(), 1);
        assert!(msg.get_by_name("a").is_none());
    }
}
