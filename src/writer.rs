// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Stream writer: Idle -> InEnvelope -> Done state machine over a
//! declared byte budget (wire format section 4.7).

use std::io::Write;
use std::sync::Arc;

use crate::dictionary::primary_wire_type;
use crate::error::{FudgeError, Result};
use crate::field::FieldValue;
use crate::message::Message;
use crate::size::{calculate_field_size, effective_identifiers};
use crate::taxonomy::{Taxonomy, TaxonomyResolver};
use crate::wire::prefix::{self, SizeCode};
use crate::wire::types as wire_types;
use crate::wire::WireType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    Idle,
    InEnvelope,
    Done,
}

/// Push-style writer over one envelope and its fields. Enforces the
/// declared `totalSize` as a hard byte budget: a field whose encoding
/// would overrun it is rejected with [`FudgeError::EncodingOverflow`]
/// before any of its bytes reach the sink (section 4.7).
pub struct StreamWriter<W> {
    sink: W,
    state: WriterState,
    remaining: i64,
    taxonomy: Option<Arc<dyn Taxonomy>>,
    resolver: Arc<dyn TaxonomyResolver>,
}

impl<W: Write> StreamWriter<W> {
    pub(crate) fn new(sink: W, resolver: Arc<dyn TaxonomyResolver>) -> Self {
        StreamWriter {
            sink,
            state: WriterState::Idle,
            remaining: 0,
            taxonomy: None,
            resolver,
        }
    }

    /// Attach a taxonomy directly, bypassing the resolver. Must be
    /// called before [`Self::write_envelope_header`]; a subsequent
    /// call to that method still resolves and overwrites it using the
    /// given `taxonomy_id` unless the resolver has nothing registered
    /// for that id, in which case this explicit taxonomy is kept.
    pub fn with_taxonomy(mut self, taxonomy: Arc<dyn Taxonomy>) -> Self {
        self.taxonomy = Some(taxonomy);
        self
    }

    /// Write the 8-byte envelope header and transition to
    /// `InEnvelope`. `total_size` must be the exact encoded byte count
    /// of the envelope (header included), typically produced by
    /// [`crate::size::calculate_envelope_size`].
    pub fn write_envelope_header(
        &mut self,
        processing_directives: u8,
        schema_version: u8,
        taxonomy_id: i16,
        total_size: i32,
    ) -> Result<()> {
        if self.state != WriterState::Idle {
            return Err(FudgeError::StateViolation {
                reason: "write_envelope_header called outside the Idle state".into(),
            });
        }
        let message_len = i64::from(total_size) - 8;
        if message_len < 0 {
            return Err(FudgeError::EncodingOverflow {
                reason: "declared totalSize is smaller than the 8-byte envelope header".into(),
            });
        }
        wire_types::write_u8(&mut self.sink, processing_directives)?;
        wire_types::write_u8(&mut self.sink, schema_version)?;
        wire_types::write_i16(&mut self.sink, taxonomy_id)?;
        wire_types::write_u32(&mut self.sink, total_size as u32)?;
        if let Some(resolved) = self.resolver.resolve(taxonomy_id) {
            self.taxonomy = Some(resolved);
        } else if taxonomy_id != 0 {
            log::debug!("[writer] no taxonomy registered for taxonomy_id={taxonomy_id}");
        }
        self.remaining = message_len;
        self.state = WriterState::InEnvelope;
        log::debug!("[writer] Idle -> InEnvelope, budget={message_len} bytes");
        Ok(())
    }

    /// Write one field. Rejects (without writing any bytes for this
    /// field) if no wire type is registered for `value`, if the field
    /// would overrun the declared budget, or if called outside
    /// `InEnvelope`.
    pub fn write_field(&mut self, name: Option<&str>, ordinal: Option<i16>, value: &FieldValue) -> Result<()> {
        if self.state != WriterState::InEnvelope {
            return Err(FudgeError::StateViolation {
                reason: "write_field called outside the InEnvelope state".into(),
            });
        }
        let wire_type = primary_wire_type(value).ok_or_else(|| FudgeError::UnknownType {
            reason: "no wire type registered for this value".into(),
        })?;

        let field_size =
            calculate_field_size(self.taxonomy.as_deref(), name, ordinal, wire_type, value)?;
        if field_size as i64 > self.remaining {
            log::debug!(
                "[writer] field of {field_size} bytes would overrun {} remaining, rejecting before writing any bytes",
                self.remaining
            );
            return Err(FudgeError::EncodingOverflow {
                reason: format!(
                    "field of {field_size} bytes would overrun the {} remaining in the declared budget",
                    self.remaining
                ),
            });
        }

        self.write_field_unchecked(name, ordinal, wire_type, value)?;
        self.remaining -= field_size as i64;
        Ok(())
    }

    /// Write one field under an explicitly chosen wire type rather
    /// than `value`'s primary one, mirroring
    /// [`crate::message::MutableMessage::add_typed`].
    pub fn write_field_typed(
        &mut self,
        name: Option<&str>,
        ordinal: Option<i16>,
        wire_type: WireType,
        value: &FieldValue,
    ) -> Result<()> {
        if self.state != WriterState::InEnvelope {
            return Err(FudgeError::StateViolation {
                reason: "write_field_typed called outside the InEnvelope state".into(),
            });
        }
        let field_size =
            calculate_field_size(self.taxonomy.as_deref(), name, ordinal, wire_type, value)?;
        if field_size as i64 > self.remaining {
            return Err(FudgeError::EncodingOverflow {
                reason: format!(
                    "field of {field_size} bytes would overrun the {} remaining in the declared budget",
                    self.remaining
                ),
            });
        }
        self.write_field_unchecked(name, ordinal, wire_type, value)?;
        self.remaining -= field_size as i64;
        Ok(())
    }

    fn write_field_unchecked(
        &mut self,
        name: Option<&str>,
        ordinal: Option<i16>,
        wire_type: WireType,
        value: &FieldValue,
    ) -> Result<()> {
        let (effective_name, effective_ordinal) =
            effective_identifiers(name, ordinal, self.taxonomy.as_deref());

        let fixed_width = wire_type.is_fixed_width();
        let value_size = if fixed_width {
            0 // unused; fixed-width types never emit a size prefix
        } else {
            match (wire_type, value) {
                (WireType::FudgeMsg, FieldValue::Message(msg)) => {
                    crate::size::calculate_message_size(self.taxonomy.as_deref(), msg)?
                }
                _ => wire_type.size_of_value(value)?,
            }
        };
        let size_code = if fixed_width {
            SizeCode::Fixed
        } else {
            SizeCode::smallest_for(value_size)
        };

        let prefix_byte = prefix::compose_with_code(
            fixed_width,
            size_code,
            effective_ordinal.is_some(),
            effective_name.is_some(),
        );
        wire_types::write_u8(&mut self.sink, prefix_byte)?;
        wire_types::write_u8(&mut self.sink, wire_type.id())?;

        if let Some(ordinal) = effective_ordinal {
            wire_types::write_i16(&mut self.sink, ordinal)?;
        }
        if let Some(name) = &effective_name {
            let bytes = name.as_bytes();
            wire_types::write_u8(&mut self.sink, bytes.len() as u8)?;
            self.sink.write_all(bytes)?;
        }

        if !fixed_width {
            match size_code {
                SizeCode::Fixed => unreachable!("fixed_width is false"),
                SizeCode::One => wire_types::write_u8(&mut self.sink, value_size as u8)?,
                SizeCode::Two => wire_types::write_i16(&mut self.sink, value_size as i16)?,
                SizeCode::Four => wire_types::write_u32(&mut self.sink, value_size as u32)?,
            }
        }

        match (wire_type, value) {
            (WireType::FudgeMsg, FieldValue::Message(msg)) => {
                for field in msg.iter() {
                    self.write_sub_field(&field)?;
                }
            }
            _ => wire_type.write(&mut self.sink, value)?,
        }
        Ok(())
    }

    /// Write a nested field without touching `remaining`: the parent
    /// sub-message field already reserved its total size (including
    /// all descendants) against the budget in [`Self::write_field`].
    fn write_sub_field(&mut self, field: &crate::field::Field) -> Result<()> {
        let wire_type =
            crate::dictionary::effective_wire_type(field).ok_or_else(|| FudgeError::UnknownType {
                reason: "no wire type registered for this value".into(),
            })?;
        self.write_field_unchecked(field.name.as_deref(), field.ordinal, wire_type, &field.value)
    }

    /// Transition to `Done`. No further fields may be written.
    pub fn finish(mut self) -> Result<W> {
        self.state = WriterState::Done;
        Ok(self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::message::eager::FudgeMsg;
    use crate::message::MutableMessage;
    use crate::taxonomy::MapTaxonomy;

    fn null_resolver() -> Arc<dyn TaxonomyResolver> {
        Arc::new(crate::taxonomy::NullTaxonomyResolver)
    }

    #[test]
    fn write_field_before_envelope_is_a_state_violation() {
        let mut buf = Vec::new();
        let mut writer = StreamWriter::new(&mut buf, null_resolver());
        let err = writer.write_field(Some("a"), None, &FieldValue::Boolean(true)).unwrap_err();
        assert!(matches!(err, FudgeError::StateViolation { .. }));
    }

    #[test]
    fn overflowing_field_writes_no_bytes() {
        let mut buf = Vec::new();
        let mut writer = StreamWriter::new(&mut buf, null_resolver());
        writer.write_envelope_header(0, 0, 0, 8 + 4).unwrap();
        // An Int field needs 6 bytes (prefix + type + value); this fits.
        // A Long field needs 10 and should overflow the 4-byte budget.
        let before_len = buf.len();
        let err = writer.write_field(None, None, &FieldValue::Long(1)).unwrap_err();
        assert!(matches!(err, FudgeError::EncodingOverflow { .. }));
        assert_eq!(buf.len(), before_len);
    }

    #[test]
    fn write_field_typed_overrides_the_wire_type_id_on_the_wire() {
        let mut buf = Vec::new();
        let mut writer = StreamWriter::new(&mut buf, null_resolver());
        let value = FieldValue::FixedByteArray(vec![0u8; 16]);
        // prefix(1) + type(1) + value(16) + header(8)
        writer.write_envelope_header(0, 0, 0, 8 + 2 + 16).unwrap();
        writer
            .write_field_typed(None, None, WireType::FixedByteArray(16), &value)
            .unwrap();
        assert_eq!(buf[9], WireType::FixedByteArray(16).id());
        assert_eq!(buf.len(), 8 + 2 + 16);
    }

    #[test]
    fn s2_boolean_field_round_trip_bytes() {
        let ctx = Context::new();
        let mut msg = FudgeMsg::new();
        msg.add(Some("b".into()), None, FieldValue::Boolean(true)).unwrap();
        let size = crate::size::calculate_envelope_size(None, &msg).unwrap();

        let mut buf = Vec::new();
        let mut writer = ctx.new_writer(&mut buf);
        writer.write_envelope_header(0, 0, 0, size as i32).unwrap();
        for field in msg.iter() {
            writer.write_field(field.name.as_deref(), field.ordinal, &field.value).unwrap();
        }
        assert_eq!(buf.len(), size);

        let mut reader = ctx.new_reader(&buf[..]);
        reader.next().unwrap();
        match reader.next().unwrap() {
            Some(crate::reader::StreamElement::SimpleField(field)) => {
                assert_eq!(field.name.as_deref(), Some("b"));
                assert_eq!(field.value, FieldValue::Boolean(true));
            }
            other => panic!("expected a simple field, got {other:?}"),
        }
    }

    #[test]
    fn s4_taxonomy_substitutes_name_for_ordinal_on_write() {
        let taxonomy: Arc<dyn Taxonomy> = Arc::new(MapTaxonomy::from_pairs([("x".to_string(), 7)]));
        let mut buf = Vec::new();
        let mut writer = StreamWriter::new(&mut buf, null_resolver()).with_taxonomy(Arc::clone(&taxonomy));
        writer.write_envelope_header(0, 0, 9, 8 + 2 + 2 + 4).unwrap();
        writer.write_field(Some("x"), None, &FieldValue::Int(42)).unwrap();

        let prefix = prefix::decompose(buf[8]);
        assert!(prefix.has_ordinal);
        assert!(!prefix.has_name);
    }

    #[test]
    fn nested_sub_message_round_trips() {
        let ctx = Context::new();
        let mut inner = FudgeMsg::new();
        inner.add(Some("a".into()), None, FieldValue::Int(1)).unwrap();
        let mut outer = FudgeMsg::new();
        outer.add_sub_message(Some("child".into()), None, inner).unwrap();

        let size = crate::size::calculate_envelope_size(None, &outer).unwrap();
        let mut buf = Vec::new();
        let mut writer = ctx.new_writer(&mut buf);
        writer.write_envelope_header(0, 0, 0, size as i32).unwrap();
        for field in outer.iter() {
            writer.write_field(field.name.as_deref(), field.ordinal, &field.value).unwrap();
        }
        assert_eq!(buf.len(), size);

        let mut reader = ctx.new_reader(&buf[..]);
        reader.next().unwrap();
        assert!(matches!(
            reader.next().unwrap(),
            Some(crate::reader::StreamElement::SubMessageFieldStart { .. })
        ));
        match reader.next().unwrap() {
            Some(crate::reader::StreamElement::SimpleField(field)) => {
                assert_eq!(field.value, FieldValue::Int(1));
            }
            other => panic!("expected nested field, got {other:?}"),
        }
        assert!(matches!(
            reader.next().unwrap(),
            Some(crate::reader::StreamElement::SubMessageFieldEnd)
        ));
    }
}
