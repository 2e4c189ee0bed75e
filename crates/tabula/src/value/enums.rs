//! Enum values: tagged unions of constant and wrapper variants.
//!
//! Every enum carries an implicit *unknown* variant with tag 0 that is
//! also the enum's default; decoding a tag the local schema does not
//! know resolves to unknown instead of failing.

use std::sync::Arc;

use crate::descriptor::{EnumDescriptor, VariantDescriptor};
use crate::error::Error;
use crate::value::value::Value;

/// An enum value: a variant tag plus, for wrapper variants, the payload.
///
/// Tag 0 is the unknown variant and never carries a payload. Constant
/// variants of the same tag are structurally interchangeable.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub tag: u32,
    pub payload: Option<Value>,
}

impl EnumValue {
    /// The unknown variant, which is also every enum's default value.
    pub fn unknown() -> Self {
        Self {
            tag: 0,
            payload: None,
        }
    }

    pub fn tag(&self) -> u32 {
        self.tag
    }

    pub fn is_unknown(&self) -> bool {
        self.tag == 0
    }

    /// Returns the payload, failing with [`Error::WrongVariant`] when
    /// this value does not hold the requested variant (or the variant
    /// is a constant and has nothing to return).
    pub fn payload_of(&self, requested_tag: u32) -> Result<&Value, Error> {
        if self.tag != requested_tag {
            return Err(Error::WrongVariant {
                requested: requested_tag,
                actual: self.tag,
            });
        }
        self.payload.as_ref().ok_or(Error::WrongVariant {
            requested: requested_tag,
            actual: self.tag,
        })
    }

    /// Exhaustive visitor dispatch, resolved by this value's tag against
    /// the enum's descriptor. Tags the descriptor does not declare route
    /// to `on_unknown`, like the unknown variant itself.
    pub fn accept<V: EnumVisitor>(&self, desc: &EnumDescriptor, visitor: &mut V) -> V::Output {
        if self.tag == 0 {
            return visitor.on_unknown();
        }
        match desc.variant_by_tag(self.tag) {
            Some(variant) => match (&variant.payload, &self.payload) {
                (Some(_), Some(payload)) => visitor.on_wrapper(variant, payload),
                (None, None) => visitor.on_constant(variant),
                // payload presence disagrees with the descriptor: schema drift
                _ => visitor.on_unknown(),
            },
            None => visitor.on_unknown(),
        }
    }
}

/// Capability-set visitor over an enum's variants.
///
/// One callback per variant shape plus one for unknown; `accept`
/// guarantees exactly one of them runs per dispatch. Generated bindings
/// layer per-variant typed visitors on top of this reflective trait.
pub trait EnumVisitor {
    type Output;

    fn on_constant(&mut self, variant: &VariantDescriptor) -> Self::Output;
    fn on_wrapper(&mut self, variant: &VariantDescriptor, payload: &Value) -> Self::Output;
    fn on_unknown(&mut self) -> Self::Output;
}

impl EnumDescriptor {
    /// The unknown variant value (tag 0, no payload).
    pub fn unknown(&self) -> Value {
        Value::Enum(Arc::new(EnumValue::unknown()))
    }

    /// Constructs a constant variant by name.
    pub fn constant(&self, name: &str) -> Result<Value, Error> {
        let variant = self
            .variant_by_name(name)
            .ok_or_else(|| Error::NoSuchVariant(name.to_string()))?;
        if variant.payload.is_some() {
            return Err(Error::TypeMismatch {
                expected: format!("constant variant `{name}`"),
                found: "wrapper variant".to_string(),
            });
        }
        Ok(Value::Enum(Arc::new(EnumValue {
            tag: variant.tag,
            payload: None,
        })))
    }

    /// Constructs a wrapper variant by name, type-checking the payload.
    pub fn wrap(&self, name: &str, payload: Value) -> Result<Value, Error> {
        let variant = self
            .variant_by_name(name)
            .ok_or_else(|| Error::NoSuchVariant(name.to_string()))?;
        let payload_ty = variant.payload.as_ref().ok_or_else(|| Error::TypeMismatch {
            expected: format!("wrapper variant `{name}`"),
            found: "constant variant".to_string(),
        })?;
        payload.check(payload_ty)?;
        Ok(Value::Enum(Arc::new(EnumValue {
            tag: variant.tag,
            payload: Some(payload),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{FieldDescriptor, StructDescriptor, TypeDescriptor};

    fn status() -> Arc<EnumDescriptor> {
        let trial = TypeDescriptor::Struct(
            StructDescriptor::new(
                "Trial",
                vec![FieldDescriptor::new("start_time", TypeDescriptor::timestamp())],
            )
            .unwrap(),
        );
        EnumDescriptor::new(
            "Status",
            vec![
                VariantDescriptor::constant("free", 1),
                VariantDescriptor::constant("premium", 2),
                VariantDescriptor::wrapper("trial", 3, trial),
            ],
        )
        .unwrap()
    }

    fn trial_payload() -> Value {
        Value::struct_of(vec![Value::timestamp(1000)])
    }

    struct InfoText;

    impl EnumVisitor for InfoText {
        type Output = String;

        fn on_constant(&mut self, variant: &VariantDescriptor) -> String {
            format!("{} user", variant.name)
        }

        fn on_wrapper(&mut self, variant: &VariantDescriptor, payload: &Value) -> String {
            let millis = payload.as_struct().unwrap().field(0).unwrap();
            format!("{} since {:?}", variant.name, millis.as_timestamp().unwrap())
        }

        fn on_unknown(&mut self) -> String {
            "unknown status".to_string()
        }
    }

    #[test]
    fn constant_and_wrap_carry_the_declared_tag() {
        let desc = status();
        let free = desc.constant("free").unwrap();
        assert_eq!(free.as_enum().unwrap().tag(), 1);
        let trial = desc.wrap("trial", trial_payload()).unwrap();
        assert_eq!(trial.as_enum().unwrap().tag(), 3);
    }

    #[test]
    fn wrap_rejects_bad_payload_and_constant_names() {
        let desc = status();
        assert!(matches!(
            desc.wrap("free", trial_payload()),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(
            desc.wrap("nope", trial_payload()),
            Err(Error::NoSuchVariant(_))
        ));
        assert!(matches!(
            desc.wrap("trial", Value::Int32(5)),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn payload_accessor_on_wrong_variant_fails() {
        let desc = status();
        let free = desc.constant("free").unwrap();
        let ev = free.as_enum().unwrap();
        assert_eq!(
            ev.payload_of(3),
            Err(Error::WrongVariant {
                requested: 3,
                actual: 1
            })
        );
        let trial = desc.wrap("trial", trial_payload()).unwrap();
        assert_eq!(
            trial.as_enum().unwrap().payload_of(3).unwrap(),
            &trial_payload()
        );
    }

    #[test]
    fn tag_switch_and_visitor_agree() {
        let desc = status();
        let values = vec![
            desc.unknown(),
            desc.constant("free").unwrap(),
            desc.constant("premium").unwrap(),
            desc.wrap("trial", trial_payload()).unwrap(),
        ];
        for value in values {
            let ev = value.as_enum().unwrap();
            let by_visitor = ev.accept(&desc, &mut InfoText);
            let by_tag = match ev.tag() {
                0 => "unknown status".to_string(),
                1 => "free user".to_string(),
                2 => "premium user".to_string(),
                3 => {
                    let payload = ev.payload_of(3).unwrap();
                    let millis = payload.as_struct().unwrap().field(0).unwrap();
                    format!("trial since {:?}", millis.as_timestamp().unwrap())
                }
                _ => unreachable!(),
            };
            assert_eq!(by_visitor, by_tag);
        }
    }

    #[test]
    fn undeclared_tag_routes_to_unknown() {
        let desc = status();
        let ev = EnumValue {
            tag: 99,
            payload: None,
        };
        assert_eq!(ev.accept(&desc, &mut InfoText), "unknown status");
    }

    #[test]
    fn default_enum_is_unknown() {
        let desc = status();
        let default = Value::default_of(&TypeDescriptor::Enum(desc.clone()));
        assert_eq!(default, desc.unknown());
        assert!(default.as_enum().unwrap().is_unknown());
    }
}
