//! Canonical JSON form of type descriptors.
//!
//! Descriptors serialize to a self-describing JSON document so schema
//! metadata can be persisted or transmitted and used by a process that
//! has no generated bindings for the described types. The document is
//! the sole reflective interface: parsing it back yields a descriptor
//! that drives every generic operation.

use serde_json::{json, Map, Value as JsonValue};

use crate::descriptor::{
    EnumDescriptor, FieldDescriptor, ListDescriptor, PrimitiveType, StructDescriptor,
    TypeDescriptor, VariantDescriptor,
};
use crate::error::Error;

/// Serializes a descriptor to its canonical JSON value.
///
/// Shared nodes of a DAG serialize inline (duplicated); cyclic
/// references are not representable.
pub fn to_json(desc: &TypeDescriptor) -> JsonValue {
    match desc {
        TypeDescriptor::Primitive(p) => json!({
            "kind": "primitive",
            "primitive": p.as_str(),
        }),
        TypeDescriptor::Struct(sd) => {
            let fields: Vec<JsonValue> = sd
                .fields
                .iter()
                .map(|f| {
                    let mut obj = Map::new();
                    obj.insert("name".into(), json!(f.name));
                    if !f.former_names.is_empty() {
                        obj.insert("former_names".into(), json!(f.former_names));
                    }
                    obj.insert("type".into(), to_json(&f.ty));
                    JsonValue::Object(obj)
                })
                .collect();
            json!({
                "kind": "struct",
                "name": sd.name,
                "fields": fields,
            })
        }
        TypeDescriptor::Enum(ed) => {
            let variants: Vec<JsonValue> = ed
                .variants
                .iter()
                .map(|v| {
                    let mut obj = Map::new();
                    obj.insert("name".into(), json!(v.name));
                    obj.insert("tag".into(), json!(v.tag));
                    if let Some(payload) = &v.payload {
                        obj.insert("type".into(), to_json(payload));
                    }
                    JsonValue::Object(obj)
                })
                .collect();
            json!({
                "kind": "enum",
                "name": ed.name,
                "variants": variants,
            })
        }
        TypeDescriptor::List(ld) => {
            let mut obj = Map::new();
            obj.insert("kind".into(), json!("list"));
            obj.insert("element".into(), to_json(&ld.element));
            if let Some(key) = &ld.key {
                obj.insert("key".into(), json!(key.names.join(".")));
            }
            JsonValue::Object(obj)
        }
    }
}

/// Serializes a descriptor to canonical JSON text.
pub fn to_json_code(desc: &TypeDescriptor) -> String {
    to_json(desc).to_string()
}

/// Parses a descriptor from its canonical JSON value.
pub fn parse_from_json(json: &JsonValue) -> Result<TypeDescriptor, Error> {
    let obj = json
        .as_object()
        .ok_or_else(|| bad("descriptor node must be a JSON object"))?;
    let kind = obj
        .get("kind")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| bad("descriptor node is missing string `kind`"))?;
    match kind {
        "primitive" => {
            let tag = obj
                .get("primitive")
                .and_then(JsonValue::as_str)
                .ok_or_else(|| bad("primitive node is missing `primitive`"))?;
            let p = PrimitiveType::from_str(tag)
                .ok_or_else(|| bad(&format!("unknown primitive `{tag}`")))?;
            Ok(TypeDescriptor::Primitive(p))
        }
        "struct" => {
            let name = required_str(obj, "name", "struct")?;
            let fields = obj
                .get("fields")
                .and_then(JsonValue::as_array)
                .ok_or_else(|| bad("struct node is missing array `fields`"))?
                .iter()
                .map(parse_field)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(TypeDescriptor::Struct(StructDescriptor::new(name, fields)?))
        }
        "enum" => {
            let name = required_str(obj, "name", "enum")?;
            let variants = obj
                .get("variants")
                .and_then(JsonValue::as_array)
                .ok_or_else(|| bad("enum node is missing array `variants`"))?
                .iter()
                .map(parse_variant)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(TypeDescriptor::Enum(EnumDescriptor::new(name, variants)?))
        }
        "list" => {
            let element = parse_from_json(
                obj.get("element")
                    .ok_or_else(|| bad("list node is missing `element`"))?,
            )?;
            match obj.get("key") {
                None => Ok(TypeDescriptor::List(ListDescriptor::new(element))),
                Some(key) => {
                    let key = key
                        .as_str()
                        .ok_or_else(|| bad("list `key` must be a string"))?;
                    Ok(TypeDescriptor::List(ListDescriptor::keyed(element, key)?))
                }
            }
        }
        other => Err(bad(&format!("unknown descriptor kind `{other}`"))),
    }
}

/// Parses a descriptor from canonical JSON text.
pub fn parse_from_json_code(code: &str) -> Result<TypeDescriptor, Error> {
    let json: JsonValue =
        serde_json::from_str(code).map_err(|e| bad(&format!("invalid JSON: {e}")))?;
    parse_from_json(&json)
}

fn parse_field(json: &JsonValue) -> Result<FieldDescriptor, Error> {
    let obj = json
        .as_object()
        .ok_or_else(|| bad("field node must be a JSON object"))?;
    let name = required_str(obj, "name", "field")?;
    let ty = parse_from_json(
        obj.get("type")
            .ok_or_else(|| bad("field node is missing `type`"))?,
    )?;
    let mut field = FieldDescriptor::new(name, ty);
    if let Some(former) = obj.get("former_names") {
        let former = former
            .as_array()
            .ok_or_else(|| bad("`former_names` must be an array"))?;
        for n in former {
            let n = n
                .as_str()
                .ok_or_else(|| bad("`former_names` entries must be strings"))?;
            field = field.renamed_from(n);
        }
    }
    Ok(field)
}

fn parse_variant(json: &JsonValue) -> Result<VariantDescriptor, Error> {
    let obj = json
        .as_object()
        .ok_or_else(|| bad("variant node must be a JSON object"))?;
    let name = required_str(obj, "name", "variant")?;
    let tag = obj
        .get("tag")
        .and_then(JsonValue::as_u64)
        .ok_or_else(|| bad("variant node is missing integer `tag`"))?;
    let tag = u32::try_from(tag).map_err(|_| bad("variant tag exceeds u32"))?;
    Ok(match obj.get("type") {
        Some(payload) => VariantDescriptor::wrapper(name, tag, parse_from_json(payload)?),
        None => VariantDescriptor::constant(name, tag),
    })
}

fn required_str(
    obj: &Map<String, JsonValue>,
    key: &str,
    node: &str,
) -> Result<String, Error> {
    obj.get(key)
        .and_then(JsonValue::as_str)
        .map(str::to_string)
        .ok_or_else(|| bad(&format!("{node} node is missing string `{key}`")))
}

fn bad(msg: &str) -> Error {
    Error::BadDescriptor(msg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_registry() -> TypeDescriptor {
        let user = TypeDescriptor::Struct(
            StructDescriptor::new(
                "User",
                vec![
                    FieldDescriptor::new("user_id", TypeDescriptor::int32()),
                    FieldDescriptor::new("name", TypeDescriptor::string())
                        .renamed_from("full_name"),
                    FieldDescriptor::new(
                        "status",
                        TypeDescriptor::Enum(
                            EnumDescriptor::new(
                                "Status",
                                vec![
                                    VariantDescriptor::constant("free", 1),
                                    VariantDescriptor::wrapper(
                                        "trial",
                                        2,
                                        TypeDescriptor::timestamp(),
                                    ),
                                ],
                            )
                            .unwrap(),
                        ),
                    ),
                ],
            )
            .unwrap(),
        );
        TypeDescriptor::Struct(
            StructDescriptor::new(
                "UserRegistry",
                vec![FieldDescriptor::new(
                    "users",
                    TypeDescriptor::keyed_list(user, "user_id").unwrap(),
                )],
            )
            .unwrap(),
        )
    }

    #[test]
    fn canonical_json_round_trips() {
        let desc = user_registry();
        let code = to_json_code(&desc);
        let parsed = parse_from_json_code(&code).unwrap();
        assert_eq!(parsed, desc);
    }

    #[test]
    fn primitive_form_is_stable() {
        assert_eq!(
            to_json(&TypeDescriptor::int32()),
            serde_json::json!({"kind": "primitive", "primitive": "int32"})
        );
    }

    #[test]
    fn former_names_are_omitted_when_empty() {
        let desc = TypeDescriptor::Struct(
            StructDescriptor::new(
                "Pair",
                vec![FieldDescriptor::new("a", TypeDescriptor::int32())],
            )
            .unwrap(),
        );
        let json = to_json(&desc);
        assert!(json["fields"][0].get("former_names").is_none());
    }

    #[test]
    fn keyed_list_key_survives_round_trip() {
        let desc = user_registry();
        let parsed = parse_from_json(&to_json(&desc)).unwrap();
        let TypeDescriptor::Struct(sd) = parsed else {
            panic!("expected struct");
        };
        let TypeDescriptor::List(ld) = &sd.fields[0].ty else {
            panic!("expected list");
        };
        let key = ld.key.as_ref().unwrap();
        assert_eq!(key.names, vec!["user_id"]);
        assert_eq!(&*key.path, &[0]);
    }

    #[test]
    fn malformed_documents_are_rejected() {
        for code in [
            "[]",
            r#"{"kind": "mystery"}"#,
            r#"{"kind": "struct", "name": "X"}"#,
            r#"{"kind": "enum", "name": "E", "variants": [{"name": "v", "tag": 0}]}"#,
        ] {
            assert!(matches!(
                parse_from_json_code(code),
                Err(Error::BadDescriptor(_))
            ));
        }
    }
}
