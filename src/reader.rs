// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Stream reader: a pull-style state machine over an envelope and its
//! nested fields (wire format section 4.7).

use std::io::Read;

use crate::envelope::Envelope;
use crate::error::{FudgeError, Result};
use crate::field::{Field, FieldValue};
use crate::taxonomy::Taxonomy;
use crate::wire::prefix::{self, SizeCode};
use crate::wire::types as wire_types;
use crate::wire::WireType;

/// One element of the reader's pull sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamElement {
    MessageEnvelope(Envelope),
    SimpleField(Field),
    SubMessageFieldStart { name: Option<String>, ordinal: Option<i16> },
    SubMessageFieldEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderState {
    Initial,
    InMessage,
    Done,
}

/// Remaining undecoded byte budget for one nesting level. The root
/// frame tracks the outer message; each sub-message field pushes a
/// new frame initialized to its declared payload size.
struct Frame {
    remaining: i64,
    is_root: bool,
}

/// The header of one field, decoded up to (but not including) its
/// value bytes for a sub-message, or fully decoded for anything else.
pub(crate) struct FieldHeader {
    pub name: Option<String>,
    pub ordinal: Option<i16>,
    pub wire_type: WireType,
    pub declared_size: usize,
    pub header_len: usize,
}

/// Shared by [`StreamReader`] and the encoded-backed lazy container:
/// read one field's prefix, type id, optional ordinal, optional name,
/// and (for variable-width types) its size prefix.
pub(crate) fn read_field_header<R: Read>(source: &mut R) -> Result<FieldHeader> {
    let prefix_byte = wire_types::read_u8(source)?;
    let prefix = prefix::decompose(prefix_byte);
    prefix::validate(prefix)?;

    let type_id = wire_types::read_u8(source)?;
    let mut header_len = 2usize;

    let ordinal = if prefix.has_ordinal {
        header_len += 2;
        Some(wire_types::read_i16(source)?)
    } else {
        None
    };

    let name = if prefix.has_name {
        let len = wire_types::read_u8(source)? as usize;
        header_len += 1 + len;
        let bytes = wire_types::read_bytes(source, len)?;
        Some(String::from_utf8(bytes).map_err(|_| FudgeError::MalformedFrame {
            reason: "field name is not valid UTF-8".into(),
        })?)
    } else {
        None
    };

    let wire_type = match WireType::from_id(type_id) {
        Some(wire_type) => wire_type,
        None => {
            if prefix.fixed_width {
                return Err(FudgeError::MalformedFrame {
                    reason: format!("unknown fixed-width type id {type_id}"),
                });
            }
            WireType::Unknown {
                type_id,
                fixed_size: None,
            }
        }
    };

    let declared_size = if prefix.fixed_width {
        wire_type.fixed_size().ok_or_else(|| FudgeError::MalformedFrame {
            reason: "fixed-width prefix bit set for a variable-width type".into(),
        })?
    } else {
        let width = match prefix.size_code {
            SizeCode::Fixed => {
                return Err(FudgeError::MalformedFrame {
                    reason: "variable-width field is missing a size code".into(),
                })
            }
            other => other.prefix_len(),
        };
        header_len += width;
        (match width {
            1 => wire_types::read_u8(source)? as u32,
            2 => wire_types::read_u16(source)? as u32,
            _ => wire_types::read_u32(source)?,
        }) as usize
    };

    Ok(FieldHeader {
        name,
        ordinal,
        wire_type,
        declared_size,
        header_len,
    })
}

/// Apply taxonomy resolution to a decoded (name, ordinal) pair: if
/// only one of the two was present on the wire and the active
/// taxonomy resolves the counterpart, fill it in (section 4.4, S4).
pub(crate) fn apply_taxonomy(
    name: Option<String>,
    ordinal: Option<i16>,
    taxonomy: Option<&dyn Taxonomy>,
) -> (Option<String>, Option<i16>) {
    let taxonomy = match taxonomy {
        Some(t) => t,
        None => return (name, ordinal),
    };
    match (&name, ordinal) {
        (None, Some(ord)) => (taxonomy.get_field_name(ord).map(str::to_owned), Some(ord)),
        (Some(n), None) => (Some(n.clone()), taxonomy.get_field_ordinal(n)),
        _ => (name, ordinal),
    }
}

/// Pull-style reader over one envelope and its fields.
pub struct StreamReader<R> {
    source: R,
    state: ReaderState,
    frames: Vec<Frame>,
    taxonomy: Option<std::sync::Arc<dyn Taxonomy>>,
    resolver: std::sync::Arc<dyn crate::taxonomy::TaxonomyResolver>,
}

impl<R: Read> StreamReader<R> {
    pub(crate) fn new(source: R, resolver: std::sync::Arc<dyn crate::taxonomy::TaxonomyResolver>) -> Self {
        StreamReader {
            source,
            state: ReaderState::Initial,
            frames: Vec::new(),
            taxonomy: None,
            resolver,
        }
    }

    /// Advance the reader by one element.
    pub fn next(&mut self) -> Result<Option<StreamElement>> {
        match self.state {
            ReaderState::Done => Ok(None),
            ReaderState::Initial => self.read_envelope(),
            ReaderState::InMessage => self.read_next_in_message(),
        }
    }

    fn read_envelope(&mut self) -> Result<Option<StreamElement>> {
        let processing_directives = wire_types::read_u8(&mut self.source)?;
        let schema_version = wire_types::read_u8(&mut self.source)?;
        let taxonomy_id = wire_types::read_i16(&mut self.source)?;
        let total_size = wire_types::read_i32(&mut self.source)?;
        let envelope = Envelope::new(processing_directives, schema_version, taxonomy_id, total_size);

        if envelope.message_byte_len() < 0 {
            return Err(FudgeError::MalformedFrame {
                reason: "envelope totalSize is smaller than the header".into(),
            });
        }

        self.taxonomy = self.resolver.resolve(taxonomy_id);
        if self.taxonomy.is_none() && taxonomy_id != 0 {
            log::debug!("[reader] no taxonomy registered for taxonomy_id={taxonomy_id}");
        }
        self.frames.push(Frame {
            remaining: envelope.message_byte_len(),
            is_root: true,
        });
        self.state = ReaderState::InMessage;
        log::debug!(
            "[reader] Initial -> InMessage, message_byte_len={}",
            envelope.message_byte_len()
        );
        Ok(Some(StreamElement::MessageEnvelope(envelope)))
    }

    fn read_next_in_message(&mut self) -> Result<Option<StreamElement>> {
        loop {
            let frame = match self.frames.last() {
                Some(frame) => frame,
                None => {
                    self.state = ReaderState::Done;
                    return Ok(None);
                }
            };

            if frame.remaining == 0 {
                let frame = self.frames.pop().expect("checked Some above");
                if frame.is_root {
                    self.state = ReaderState::Done;
                    return Ok(None);
                }
                return Ok(Some(StreamElement::SubMessageFieldEnd));
            }

            if frame.remaining < 0 {
                return Err(FudgeError::MalformedFrame {
                    reason: "frame overran its declared size".into(),
                });
            }

            let header = read_field_header(&mut self.source)?;
            let (name, ordinal) = apply_taxonomy(header.name, header.ordinal, self.taxonomy.as_deref());

            if matches!(header.wire_type, WireType::FudgeMsg) {
                let consumed = header.header_len as i64 + header.declared_size as i64;
                self.charge_current_frame(consumed)?;
                self.frames.push(Frame {
                    remaining: header.declared_size as i64,
                    is_root: false,
                });
                return Ok(Some(StreamElement::SubMessageFieldStart { name, ordinal }));
            }

            let value = header.wire_type.read(&mut self.source, header.declared_size)?;
            let consumed = header.header_len as i64 + header.declared_size as i64;
            self.charge_current_frame(consumed)?;
            return Ok(Some(StreamElement::SimpleField(Field::new(name, ordinal, value))));
        }
    }

    fn charge_current_frame(&mut self, consumed: i64) -> Result<()> {
        let frame = self.frames.last_mut().expect("caller holds an active frame");
        frame.remaining -= consumed;
        if frame.remaining < 0 {
            return Err(FudgeError::MalformedFrame {
                reason: "field overran its enclosing frame".into(),
            });
        }
        Ok(())
    }

    /// Skip the sub-message currently open (the most recent
    /// `SubMessageFieldStart`), returning its raw, undecoded bytes.
    /// The reader is left positioned at the next sibling field.
    pub fn skip_message_field(&mut self) -> Result<Vec<u8>> {
        let frame = self.frames.pop().ok_or_else(|| FudgeError::StateViolation {
            reason: "skip_message_field called with no open sub-message".into(),
        })?;
        if frame.is_root {
            self.frames.push(frame);
            return Err(FudgeError::StateViolation {
                reason: "skip_message_field called at the root envelope level".into(),
            });
        }
        let mut buf = vec![0u8; frame.remaining.max(0) as usize];
        self.source.read_exact(&mut buf).map_err(|err| {
            if err.kind() == std::io::ErrorKind::UnexpectedEof {
                FudgeError::MalformedFrame {
                    reason: "truncated sub-message".into(),
                }
            } else {
                FudgeError::IoFailure(err)
            }
        })?;
        Ok(buf)
    }

    /// The active taxonomy resolved from the envelope's taxonomy id,
    /// if any. Used to decode nested sub-messages read out-of-band
    /// (e.g. via [`Self::skip_message_field`]) under the same taxonomy.
    pub fn active_taxonomy(&self) -> Option<std::sync::Arc<dyn Taxonomy>> {
        self.taxonomy.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::message::eager::FudgeMsg;
    use crate::message::{Message, MutableMessage};
    use crate::taxonomy::{MapTaxonomy, MapTaxonomyResolver};

    fn encode(msg: &FudgeMsg, taxonomy_id: i16, ctx: &Context) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut writer = ctx.new_writer(&mut out);
            let size = crate::size::calculate_envelope_size(None, msg).unwrap();
            writer
                .write_envelope_header(0, 0, taxonomy_id, size as i32)
                .unwrap();
            for field in msg.iter() {
                writer
                    .write_field(field.name.as_deref(), field.ordinal, &field.value)
                    .unwrap();
            }
        }
        out
    }

    #[test]
    fn s5_skip_then_reread_matches_eager_traversal() {
        let ctx = Context::new();
        let mut inner = FudgeMsg::new();
        inner.add(None, Some(1), FieldValue::Int(1)).unwrap();
        inner.add(None, Some(2), FieldValue::Int(2)).unwrap();

        let mut outer = FudgeMsg::new();
        outer.add_sub_message(Some("child".into()), None, inner.clone()).unwrap();
        outer.add(Some("after".into()), None, FieldValue::Boolean(true)).unwrap();

        let bytes = encode(&outer, 0, &ctx);
        let mut reader = ctx.new_reader(&bytes[..]);

        assert!(matches!(reader.next().unwrap(), Some(StreamElement::MessageEnvelope(_))));
        assert!(matches!(
            reader.next().unwrap(),
            Some(StreamElement::SubMessageFieldStart { .. })
        ));
        let skipped = reader.skip_message_field().unwrap();

        // The sibling field decodes correctly after the skip.
        match reader.next().unwrap() {
            Some(StreamElement::SimpleField(field)) => {
                assert_eq!(field.name.as_deref(), Some("after"));
                assert_eq!(field.value, FieldValue::Boolean(true));
            }
            other => panic!("expected sibling field, got {other:?}"),
        }
        assert!(matches!(reader.next().unwrap(), None));

        // The skipped bytes decode, independently, to the same two fields.
        let mut inner_reader_source = &skipped[..];
        let mut fields = Vec::new();
        loop {
            let header = match read_field_header(&mut inner_reader_source) {
                Ok(header) => header,
                Err(_) => break,
            };
            let value = header.wire_type.read(&mut inner_reader_source, header.declared_size).unwrap();
            fields.push(Field::new(header.name, header.ordinal, value));
            if fields.len() == 2 {
                break;
            }
        }
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].value, FieldValue::Int(1));
        assert_eq!(fields[1].value, FieldValue::Int(2));
    }

    #[test]
    fn s4_reader_resolves_name_from_taxonomy_ordinal() {
        let mut resolver = MapTaxonomyResolver::new();
        resolver.register(
            9,
            std::sync::Arc::new(MapTaxonomy::from_pairs([("x".to_string(), 7)])),
        );
        let ctx = Context::builder().taxonomy_resolver(resolver).build();

        let mut msg = FudgeMsg::new();
        msg.add(Some("x".into()), None, FieldValue::Int(42)).unwrap();
        let bytes = encode(&msg, 9, &ctx);

        let mut reader = ctx.new_reader(&bytes[..]);
        reader.next().unwrap();
        match reader.next().unwrap() {
            Some(StreamElement::SimpleField(field)) => {
                assert_eq!(field.ordinal, Some(7));
                assert_eq!(field.name.as_deref(), Some("x"));
            }
            other => panic!("expected a simple field, got {other:?}"),
        }
    }

    #[test]
    fn unknown_fixed_width_type_is_an_error() {
        // prefix: fixed_width=true, no ordinal/name -> 0x80; type id 250 unregistered.
        let bytes = [0x80u8, 250];
        let header = read_field_header(&mut &bytes[..]);
        assert!(matches!(header, Err(FudgeError::MalformedFrame { .. })));
    }
}
