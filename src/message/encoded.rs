// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Lazy, immutable, encoded-backed message container (wire format
//! section 4.8).

use std::cell::RefCell;
use std::io::Cursor;
use std::sync::Arc;

use bytes::Bytes;

use crate::field::{Field, FieldValue};
use crate::message::{Message, MessageValue};
use crate::reader::{apply_taxonomy, read_field_header};
use crate::taxonomy::Taxonomy;
use crate::wire::WireType;

/// A message backed directly by a slice of previously-received bytes.
/// Fields are decoded one at a time, on demand, and cached; the
/// underlying [`Bytes`] is never copied except where a field's value
/// itself requires materializing (section 4.8).
#[derive(Clone)]
pub struct EncodedFudgeMsg {
    bytes: Bytes,
    taxonomy: Option<Arc<dyn Taxonomy>>,
    decoded: RefCell<Vec<Field>>,
    cursor: RefCell<usize>,
    exhausted: RefCell<bool>,
}

impl EncodedFudgeMsg {
    /// Wrap `bytes` as a lazily-decoded message. `bytes` must span
    /// exactly one message's field sequence (no envelope header).
    pub fn new(bytes: Bytes, taxonomy: Option<Arc<dyn Taxonomy>>) -> Self {
        EncodedFudgeMsg {
            bytes,
            taxonomy,
            decoded: RefCell::new(Vec::new()),
            cursor: RefCell::new(0),
            exhausted: RefCell::new(false),
        }
    }

    /// The raw, undecoded bytes backing this message. Cloning a
    /// [`Bytes`] is a refcount bump, not a copy.
    pub fn get_fudge_encoded(&self) -> Bytes {
        self.bytes.clone()
    }

    /// Decode fields one at a time until `decoded` holds at least
    /// `want` entries, or the backing bytes are exhausted.
    fn decode_until(&self, want: usize) -> crate::error::Result<()> {
        loop {
            if self.decoded.borrow().len() >= want || *self.exhausted.borrow() {
                return Ok(());
            }
            let pos = *self.cursor.borrow();
            if pos >= self.bytes.len() {
                *self.exhausted.borrow_mut() = true;
                return Ok(());
            }

            let slice = &self.bytes[pos..];
            let mut cursor = Cursor::new(slice);
            let header = read_field_header(&mut cursor)?;
            let header_len = cursor.position() as usize;
            let (name, ordinal) = apply_taxonomy(header.name, header.ordinal, self.taxonomy.as_deref());

            let total_len = header_len + header.declared_size;
            let value = if matches!(header.wire_type, WireType::FudgeMsg) {
                let start = pos + header_len;
                let end = start + header.declared_size;
                let sub_bytes = self.bytes.slice(start..end);
                FieldValue::Message(MessageValue::Encoded(EncodedFudgeMsg::new(
                    sub_bytes,
                    self.taxonomy.clone(),
                )))
            } else {
                let mut value_cursor = Cursor::new(&slice[header_len..total_len]);
                header.wire_type.read(&mut value_cursor, header.declared_size)?
            };

            *self.cursor.borrow_mut() = pos + total_len;
            self.decoded.borrow_mut().push(Field::new(name, ordinal, value));
        }
    }

    fn decode_all(&self) -> crate::error::Result<()> {
        self.decode_until(usize::MAX)
    }
}

impl std::fmt::Debug for EncodedFudgeMsg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedFudgeMsg")
            .field("byte_len", &self.bytes.len())
            .field("decoded_so_far", &self.decoded.borrow().len())
            .finish()
    }
}

impl Message for EncodedFudgeMsg {
    fn num_fields(&self) -> usize {
        self.decode_all().expect("encoded message is malformed");
        self.decoded.borrow().len()
    }

    fn is_empty(&self) -> bool {
        if !self.decoded.borrow().is_empty() {
            return false;
        }
        self.decode_until(1).expect("encoded message is malformed");
        self.decoded.borrow().is_empty()
    }

    fn get_by_index(&self, index: usize) -> Option<Field> {
        self.decode_until(index + 1).expect("encoded message is malformed");
        self.decoded.borrow().get(index).cloned()
    }

    fn get_by_name(&self, name: &str) -> Option<Field> {
        loop {
            if let Some(field) = self.decoded.borrow().iter().find(|f| f.name.as_deref() == Some(name)) {
                return Some(field.clone());
            }
            if *self.exhausted.borrow() {
                return None;
            }
            let next_len = self.decoded.borrow().len() + 1;
            self.decode_until(next_len).expect("encoded message is malformed");
        }
    }

    fn get_all_by_name(&self, name: &str) -> Vec<Field> {
        self.decode_all().expect("encoded message is malformed");
        self.decoded
            .borrow()
            .iter()
            .filter(|f| f.name.as_deref() == Some(name))
            .cloned()
            .collect()
    }

    fn get_by_ordinal(&self, ordinal: i16) -> Option<Field> {
        loop {
            if let Some(field) = self.decoded.borrow().iter().find(|f| f.ordinal == Some(ordinal)) {
                return Some(field.clone());
            }
            if *self.exhausted.borrow() {
                return None;
            }
            let next_len = self.decoded.borrow().len() + 1;
            self.decode_until(next_len).expect("encoded message is malformed");
        }
    }

    fn iter(&self) -> Box<dyn Iterator<Item = Field> + '_> {
        self.decode_all().expect("encoded message is malformed");
        Box::new(self.decoded.borrow().clone().into_iter())
    }

    fn precomputed_encoded_len(&self) -> Option<usize> {
        Some(self.bytes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::message::eager::FudgeMsg;
    use crate::message::MutableMessage;

    fn encode_fields(msg: &FudgeMsg, ctx: &Context) -> Vec<u8> {
        let mut out = Vec::new();
        let mut writer = ctx.new_writer(&mut out);
        for field in msg.iter() {
            writer.write_field(field.name.as_deref(), field.ordinal, &field.value).unwrap();
        }
        out
    }

    #[test]
    fn lazy_container_matches_eager_decode() {
        let ctx = Context::new();
        let mut inner = FudgeMsg::new();
        inner.add(Some("a".into()), None, FieldValue::Int(1)).unwrap();

        let mut msg = FudgeMsg::new();
        msg.add(Some("x".into()), None, FieldValue::Int(7)).unwrap();
        msg.add_sub_message(Some("child".into()), None, inner).unwrap();
        msg.add(Some("y".into()), None, FieldValue::String("hi".into())).unwrap();

        let bytes = encode_fields(&msg, &ctx);
        let encoded = EncodedFudgeMsg::new(Bytes::from(bytes), None);

        let eager_fields: Vec<Field> = msg.iter().collect();
        let lazy_fields: Vec<Field> = encoded.iter().collect();
        assert_eq!(eager_fields.len(), lazy_fields.len());
        assert_eq!(eager_fields[0].value, lazy_fields[0].value);
        assert_eq!(eager_fields[2].value, lazy_fields[2].value);
        match &lazy_fields[1].value {
            FieldValue::Message(MessageValue::Encoded(sub)) => {
                assert_eq!(sub.num_fields(), 1);
                assert_eq!(sub.get_by_name("a").unwrap().value, FieldValue::Int(1));
            }
            other => panic!("expected encoded sub-message, got {other:?}"),
        }
    }

    #[test]
    fn get_by_name_stops_decoding_early() {
        let ctx = Context::new();
        let mut msg = FudgeMsg::new();
        msg.add(Some("a".into()), None, FieldValue::Int(1)).unwrap();
        msg.add(Some("b".into()), None, FieldValue::Int(2)).unwrap();
        msg.add(Some("c".into()), None, FieldValue::Int(3)).unwrap();

        let bytes = encode_fields(&msg, &ctx);
        let encoded = EncodedFudgeMsg::new(Bytes::from(bytes), None);

        let found = encoded.get_by_name("a").unwrap();
        assert_eq!(found.value, FieldValue::Int(1));
        assert_eq!(encoded.decoded.borrow().len(), 1);
    }

    #[test]
    fn precomputed_len_shortcuts_size_calculation() {
        let encoded = EncodedFudgeMsg::new(Bytes::from_static(&[1, 2, 3, 4]), None);
        assert_eq!(encoded.precomputed_encoded_len(), Some(4));
        let size = crate::size::calculate_message_size(None, &encoded).unwrap();
        assert_eq!(size, 4);
    }
}
