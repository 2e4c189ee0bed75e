//! Generic reflective traversal: rebuild a value tree through its
//! descriptor without per-type code.
//!
//! The traversal is an interpreter over the four descriptor kinds:
//! structs are rebuilt field by field, enum wrapper payloads are
//! descended, list elements are rebuilt, and primitive leaves are
//! offered to the caller's transform. It is purely functional: the
//! input is never mutated and untouched subtrees are shared with the
//! result (`Arc` reuse), so rewriting one leaf of a large value costs
//! only the path to it.

use std::sync::Arc;

use crate::descriptor::{PrimitiveType, TypeDescriptor};
use crate::error::Error;
use crate::value::{EnumValue, ListValue, Value};

/// Rebuilds `value`, offering every primitive leaf to `transform`.
///
/// `transform` returns `Some(replacement)` to substitute a leaf or
/// `None` to keep it. Replacements are type-checked against the leaf's
/// descriptor.
pub fn transform_leaves(
    value: &Value,
    desc: &TypeDescriptor,
    transform: &mut dyn FnMut(PrimitiveType, &Value) -> Option<Value>,
) -> Result<Value, Error> {
    Ok(walk(value, desc, transform)?.unwrap_or_else(|| value.clone()))
}

/// Rewrites every string reachable in `value`.
pub fn map_strings(
    value: &Value,
    desc: &TypeDescriptor,
    mut f: impl FnMut(&str) -> String,
) -> Result<Value, Error> {
    transform_leaves(value, desc, &mut |p, leaf| match (p, leaf) {
        (PrimitiveType::String, Value::Str(s)) => Some(Value::str(f(s))),
        _ => None,
    })
}

/// Returns `None` when the subtree is unchanged, so parents can keep
/// sharing the original.
fn walk(
    value: &Value,
    desc: &TypeDescriptor,
    transform: &mut dyn FnMut(PrimitiveType, &Value) -> Option<Value>,
) -> Result<Option<Value>, Error> {
    match (value, desc) {
        (_, TypeDescriptor::Primitive(p)) => match transform(*p, value) {
            Some(replacement) => {
                replacement.check(desc)?;
                Ok(Some(replacement))
            }
            None => Ok(None),
        },
        (Value::Struct(sv), TypeDescriptor::Struct(sd)) => {
            if sv.fields.len() != sd.fields.len() {
                return Err(mismatch(desc, value));
            }
            let mut replaced: Vec<Option<Value>> = Vec::with_capacity(sv.fields.len());
            let mut changed = false;
            for (field, fd) in sv.fields.iter().zip(sd.fields.iter()) {
                let r = walk(field, &fd.ty, transform)?;
                changed |= r.is_some();
                replaced.push(r);
            }
            if !changed {
                return Ok(None);
            }
            let fields = sv
                .fields
                .iter()
                .zip(replaced)
                .map(|(original, r)| r.unwrap_or_else(|| original.clone()))
                .collect();
            Ok(Some(Value::struct_of(fields)))
        }
        (Value::Enum(ev), TypeDescriptor::Enum(ed)) => {
            let Some(payload) = &ev.payload else {
                return Ok(None);
            };
            let Some(payload_ty) = ed.variant_by_tag(ev.tag).and_then(|v| v.payload.as_ref())
            else {
                return Ok(None);
            };
            Ok(walk(payload, payload_ty, transform)?.map(|payload| {
                Value::Enum(Arc::new(EnumValue {
                    tag: ev.tag,
                    payload: Some(payload),
                }))
            }))
        }
        (Value::List(lv), TypeDescriptor::List(ld)) => {
            let mut replaced: Vec<Option<Value>> = Vec::with_capacity(lv.len());
            let mut changed = false;
            for element in lv.iter() {
                let r = walk(element, &ld.element, transform)?;
                changed |= r.is_some();
                replaced.push(r);
            }
            if !changed {
                return Ok(None);
            }
            let elements: Vec<Value> = lv
                .iter()
                .zip(replaced)
                .map(|(original, r)| r.unwrap_or_else(|| original.clone()))
                .collect();
            Ok(Some(Value::List(match lv.key_path() {
                Some(path) => ListValue::keyed(elements, path.clone()),
                None => ListValue::new(elements),
            })))
        }
        _ => Err(mismatch(desc, value)),
    }
}

fn mismatch(desc: &TypeDescriptor, value: &Value) -> Error {
    Error::TypeMismatch {
        expected: desc.kind_str().to_string(),
        found: value.kind_str().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{
        EnumDescriptor, FieldDescriptor, StructDescriptor, VariantDescriptor,
    };

    fn user() -> TypeDescriptor {
        let pet = TypeDescriptor::Struct(
            StructDescriptor::new(
                "Pet",
                vec![
                    FieldDescriptor::new("name", TypeDescriptor::string()),
                    FieldDescriptor::new("height_in_meters", TypeDescriptor::float32()),
                ],
            )
            .unwrap(),
        );
        let status = TypeDescriptor::Enum(
            EnumDescriptor::new(
                "Status",
                vec![
                    VariantDescriptor::constant("free", 1),
                    VariantDescriptor::wrapper("note", 2, TypeDescriptor::string()),
                ],
            )
            .unwrap(),
        );
        TypeDescriptor::Struct(
            StructDescriptor::new(
                "User",
                vec![
                    FieldDescriptor::new("name", TypeDescriptor::string()),
                    FieldDescriptor::new("pets", TypeDescriptor::list(pet)),
                    FieldDescriptor::new("status", status),
                ],
            )
            .unwrap(),
        )
    }

    fn tarzan() -> Value {
        Value::struct_of(vec![
            Value::str("Tarzan"),
            Value::list_of(vec![Value::struct_of(vec![
                Value::str("Cheeta"),
                Value::Float32(1.67),
            ])]),
            Value::Enum(Arc::new(EnumValue {
                tag: 2,
                payload: Some(Value::str("king of the jungle")),
            })),
        ])
    }

    #[test]
    fn uppercases_every_reachable_string() {
        let desc = user();
        let value = tarzan();
        let shouted = map_strings(&value, &desc, |s| s.to_uppercase()).unwrap();
        let sv = shouted.as_struct().unwrap();
        assert_eq!(sv.field(0), Some(&Value::str("TARZAN")));
        let pet = sv.field(1).unwrap().as_list().unwrap().get(0).unwrap();
        assert_eq!(pet.as_struct().unwrap().field(0), Some(&Value::str("CHEETA")));
        // non-string leaves untouched
        assert_eq!(
            pet.as_struct().unwrap().field(1),
            Some(&Value::Float32(1.67))
        );
        // enum wrapper payload descended
        assert_eq!(
            shouted.as_struct().unwrap().field(2).unwrap().as_enum().unwrap().payload,
            Some(Value::str("KING OF THE JUNGLE"))
        );
        // input untouched
        assert_eq!(value.as_struct().unwrap().field(0), Some(&Value::str("Tarzan")));
    }

    #[test]
    fn unchanged_subtrees_are_shared() {
        let desc = user();
        let value = tarzan();
        // rewrite only the top-level name
        let mut first = true;
        let renamed = transform_leaves(&value, &desc, &mut |p, _leaf| {
            if p == PrimitiveType::String && first {
                first = false;
                Some(Value::str("Jane"))
            } else {
                None
            }
        })
        .unwrap();
        let original_pets = value.as_struct().unwrap().field(1).unwrap();
        let renamed_pets = renamed.as_struct().unwrap().field(1).unwrap();
        assert!(renamed_pets
            .as_list()
            .unwrap()
            .ptr_eq(original_pets.as_list().unwrap()));
    }

    #[test]
    fn identity_transform_returns_shared_value() {
        let desc = user();
        let value = tarzan();
        let same = transform_leaves(&value, &desc, &mut |_, _| None).unwrap();
        let (Value::Struct(a), Value::Struct(b)) = (&value, &same) else {
            panic!("expected structs");
        };
        assert!(Arc::ptr_eq(a, b));
    }

    #[test]
    fn replacement_of_wrong_type_is_rejected() {
        let desc = TypeDescriptor::string();
        let err = transform_leaves(&Value::str("x"), &desc, &mut |_, _| {
            Some(Value::Int32(1))
        })
        .unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn keyed_lists_keep_their_key_after_rebuild() {
        let element = TypeDescriptor::Struct(
            StructDescriptor::new(
                "Entry",
                vec![FieldDescriptor::new("id", TypeDescriptor::string())],
            )
            .unwrap(),
        );
        let desc = TypeDescriptor::keyed_list(element, "id").unwrap();
        let value = Value::List(ListValue::keyed(
            vec![Value::struct_of(vec![Value::str("a")])],
            Arc::from(vec![0usize]),
        ));
        let upper = map_strings(&value, &desc, |s| s.to_uppercase()).unwrap();
        let list = upper.as_list().unwrap();
        assert_eq!(
            list.find_by_key("A"),
            Some(&Value::struct_of(vec![Value::str("A")]))
        );
    }
}
