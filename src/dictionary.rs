// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type dictionary: value -> primary wire type, plus secondary-type
//! adapters (wire format section 4.3).

use std::any::{Any, TypeId};
use std::collections::HashMap;

use crate::error::{FudgeError, Result};
use crate::field::{Field, FieldValue};
use crate::wire::WireType;

/// Maps a runtime value to its primary (wire-native) [`WireType`].
///
/// Every [`FieldValue`] variant other than `Unknown` has exactly one
/// primary wire type; `Unknown` carries its own observed type id.
pub fn primary_wire_type(value: &FieldValue) -> Option<WireType> {
    Some(match value {
        FieldValue::Indicator => WireType::Indicator,
        FieldValue::Boolean(_) => WireType::Boolean,
        FieldValue::Byte(_) => WireType::Byte,
        FieldValue::Short(_) => WireType::Short,
        FieldValue::Int(_) => WireType::Int,
        FieldValue::Long(_) => WireType::Long,
        FieldValue::ByteArray(_) => WireType::ByteArray,
        FieldValue::ShortArray(_) => WireType::ShortArray,
        FieldValue::IntArray(_) => WireType::IntArray,
        FieldValue::LongArray(_) => WireType::LongArray,
        FieldValue::Float(_) => WireType::Float,
        FieldValue::Double(_) => WireType::Double,
        FieldValue::FloatArray(_) => WireType::FloatArray,
        FieldValue::DoubleArray(_) => WireType::DoubleArray,
        FieldValue::String(_) => WireType::String,
        FieldValue::FixedByteArray(v) => WireType::FixedByteArray(v.len() as u16),
        FieldValue::Date(_) => WireType::Date,
        FieldValue::Time(_) => WireType::Time,
        FieldValue::DateTime(_) => WireType::DateTime,
        FieldValue::Message(_) => WireType::FudgeMsg,
        FieldValue::Unknown { type_id, .. } => WireType::Unknown {
            type_id: *type_id,
            fixed_size: None,
        },
    })
}

/// The wire type a field is actually encoded under: its explicit
/// `wire_type_override` if set (from `MutableMessage::add_typed`),
/// otherwise its value's primary wire type.
pub fn effective_wire_type(field: &Field) -> Option<WireType> {
    field.wire_type_override.or_else(|| primary_wire_type(&field.value))
}

/// A secondary value type: a pure adapter to/from a primary
/// [`FieldValue`]. Implementors register themselves with
/// [`TypeDictionary::register_secondary`] to become accessible through
/// [`TypeDictionary::convert`].
pub trait SecondaryType: Any + Sized {
    /// The primary wire type this secondary type rides on.
    fn primary_type() -> WireType;
    /// Adapt `self` into its primary wire representation.
    fn to_primary(&self) -> FieldValue;
    /// Adapt a primary value back into this secondary type, or `None`
    /// if the primary value is not shaped the way this type expects.
    fn from_primary(value: &FieldValue) -> Option<Self>;
}

struct SecondaryAdapter {
    primary: WireType,
    name: &'static str,
    from_primary: Box<dyn Fn(&FieldValue) -> Option<Box<dyn Any>> + Send + Sync>,
}

/// Registered secondary-type adapters, keyed by the Rust [`TypeId`] of
/// the secondary type. Registration is additive; a class resolves to
/// the most recently registered matching adapter (section 4.3).
#[derive(Default)]
pub struct TypeDictionary {
    secondary: HashMap<TypeId, SecondaryAdapter>,
}

impl TypeDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` as a secondary type. Re-registering the same `T`
    /// replaces the previous adapter.
    pub fn register_secondary<T: SecondaryType + 'static>(&mut self) {
        self.secondary.insert(
            TypeId::of::<T>(),
            SecondaryAdapter {
                primary: T::primary_type(),
                name: std::any::type_name::<T>(),
                from_primary: Box::new(|value| T::from_primary(value).map(|v| Box::new(v) as Box<dyn Any>)),
            },
        );
    }

    /// `true` if `field`'s stored value can be converted to `T`,
    /// either because it is already `T`'s primary representation in
    /// disguise or because a registered secondary adapter accepts it.
    pub fn can_convert<T: SecondaryType + 'static>(&self, field: &Field) -> bool {
        self.secondary
            .get(&TypeId::of::<T>())
            .map(|adapter| (adapter.from_primary)(&field.value).is_some())
            .unwrap_or(false)
    }

    /// Convert `field`'s value to `T` via its registered secondary
    /// adapter. Returns [`FudgeError::ConversionFailure`] if `T` has no
    /// registered adapter or the adapter rejects the stored value;
    /// per section 7 this is a caller-input error, not a panic.
    pub fn convert<T: SecondaryType + 'static>(&self, field: &Field) -> Result<T> {
        let adapter = self
            .secondary
            .get(&TypeId::of::<T>())
            .ok_or_else(|| FudgeError::ConversionFailure {
                reason: format!("no secondary type registered for {}", std::any::type_name::<T>()),
            })?;
        let boxed = (adapter.from_primary)(&field.value).ok_or_else(|| {
            FudgeError::ConversionFailure {
                reason: format!(
                    "value of primary type {:?} cannot convert to {}",
                    adapter.primary, adapter.name
                ),
            }
        })?;
        boxed
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| FudgeError::ConversionFailure {
                reason: "secondary adapter produced the wrong concrete type".into(),
            })
    }
}

/// Which way to look a field up before converting it, for
/// [`get_value`].
pub enum FieldSelector<'a> {
    Name(&'a str),
    Ordinal(i16),
}

/// The consumer API's typed getter (spec.md section 6's
/// `getValue(targetClass, name|ordinal)`): find a field by name or
/// ordinal and adapt it to `T` via `dictionary`. Per section 7, a
/// missing field or a failed conversion both surface as `None` rather
/// than an error — only `TypeDictionary::convert`'s explicit `Result`
/// API distinguishes the two.
pub fn get_value<T: SecondaryType + 'static>(
    message: &dyn crate::message::Message,
    dictionary: &TypeDictionary,
    selector: FieldSelector,
) -> Option<T> {
    let field = match selector {
        FieldSelector::Name(name) => message.get_by_name(name),
        FieldSelector::Ordinal(ordinal) => message.get_by_ordinal(ordinal),
    }?;
    dictionary.convert(&field).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Celsius(f64);

    impl SecondaryType for Celsius {
        fn primary_type() -> WireType {
            WireType::Double
        }

        fn to_primary(&self) -> FieldValue {
            FieldValue::Double(self.0)
        }

        fn from_primary(value: &FieldValue) -> Option<Self> {
            match value {
                FieldValue::Double(d) => Some(Celsius(*d)),
                _ => None,
            }
        }
    }

    #[test]
    fn primary_wire_type_covers_every_value_variant() {
        assert_eq!(primary_wire_type(&FieldValue::Indicator), Some(WireType::Indicator));
        assert_eq!(primary_wire_type(&FieldValue::Int(1)), Some(WireType::Int));
        assert_eq!(
            primary_wire_type(&FieldValue::FixedByteArray(vec![0; 16])),
            Some(WireType::FixedByteArray(16))
        );
    }

    #[test]
    fn secondary_type_round_trips_through_dictionary() {
        let mut dict = TypeDictionary::new();
        dict.register_secondary::<Celsius>();

        let field = Field::new(None, None, FieldValue::Double(21.5));
        assert!(dict.can_convert::<Celsius>(&field));
        let value: Celsius = dict.convert(&field).unwrap();
        assert_eq!(value, Celsius(21.5));
    }

    #[test]
    fn unregistered_secondary_type_fails_conversion() {
        let dict = TypeDictionary::new();
        let field = Field::new(None, None, FieldValue::Double(1.0));
        assert!(!dict.can_convert::<Celsius>(&field));
        assert!(dict.convert::<Celsius>(&field).is_err());
    }

    #[test]
    fn mismatched_primary_value_fails_conversion() {
        let mut dict = TypeDictionary::new();
        dict.register_secondary::<Celsius>();
        let field = Field::new(None, None, FieldValue::String("nope".into()));
        assert!(dict.convert::<Celsius>(&field).is_err());
    }

    #[test]
    fn get_value_finds_and_converts_a_field_by_name_or_ordinal() {
        use crate::message::eager::FudgeMsg;
        use crate::message::MutableMessage;

        let mut dict = TypeDictionary::new();
        dict.register_secondary::<Celsius>();

        let mut msg = FudgeMsg::new();
        msg.add(Some("temp".into()), Some(7), FieldValue::Double(21.5)).unwrap();

        let by_name: Option<Celsius> = get_value(&msg, &dict, FieldSelector::Name("temp"));
        assert_eq!(by_name, Some(Celsius(21.5)));

        let by_ordinal: Option<Celsius> = get_value(&msg, &dict, FieldSelector::Ordinal(7));
        assert_eq!(by_ordinal, Some(Celsius(21.5)));
    }

    #[test]
    fn get_value_returns_none_for_missing_field_or_failed_conversion() {
        use crate::message::eager::FudgeMsg;
        use crate::message::MutableMessage;

        let mut dict = TypeDictionary::new();
        dict.register_secondary::<Celsius>();

        let mut msg = FudgeMsg::new();
        msg.add(Some("name".into()), None, FieldValue::String("nope".into())).unwrap();

        let missing: Option<Celsius> = get_value(&msg, &dict, FieldSelector::Name("absent"));
        assert_eq!(missing, None);

        let wrong_shape: Option<Celsius> = get_value(&msg, &dict, FieldSelector::Name("name"));
        assert_eq!(wrong_shape, None);
    }
}
