//! JSON codecs: dense (positional) and readable (name-keyed) flavors.
//!
//! Encoding picks a flavor; decoding is flavor-blind. Each node's JSON
//! shape identifies its flavor (arrays and bare numbers are dense,
//! objects and strings are readable), so one decode entry point accepts
//! both flavors, even mixed within a document.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Map, Value as JsonValue};

use crate::codec::JsonFlavor;
use crate::descriptor::{PrimitiveType, TypeDescriptor};
use crate::error::{Error, WireError};
use crate::value::{EnumValue, ListValue, Timestamp, Value};

/// Largest integer JSON numbers can carry exactly (2^53 - 1).
/// Wider int64 and timestamp values encode as decimal strings.
const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_991;

/// Encodes values to one JSON flavor.
pub struct JsonEncoder {
    pub flavor: JsonFlavor,
}

impl JsonEncoder {
    pub fn new(flavor: JsonFlavor) -> Self {
        Self { flavor }
    }

    /// Encodes one value to a JSON tree.
    pub fn encode(&self, value: &Value, desc: &TypeDescriptor) -> Result<JsonValue, Error> {
        match (value, desc) {
            (Value::Bool(b), TypeDescriptor::Primitive(PrimitiveType::Bool)) => Ok(json!(b)),
            (Value::Int32(v), TypeDescriptor::Primitive(PrimitiveType::Int32)) => Ok(json!(v)),
            (Value::Int64(v), TypeDescriptor::Primitive(PrimitiveType::Int64)) => {
                Ok(encode_i64(*v))
            }
            (Value::Float32(v), TypeDescriptor::Primitive(PrimitiveType::Float32)) => {
                Ok(encode_f64(*v as f64))
            }
            (Value::Float64(v), TypeDescriptor::Primitive(PrimitiveType::Float64)) => {
                Ok(encode_f64(*v))
            }
            (Value::Str(s), TypeDescriptor::Primitive(PrimitiveType::String)) => {
                Ok(json!(&**s))
            }
            (Value::Bytes(b), TypeDescriptor::Primitive(PrimitiveType::Bytes)) => {
                Ok(json!(BASE64.encode(b)))
            }
            (Value::Timestamp(t), TypeDescriptor::Primitive(PrimitiveType::Timestamp)) => {
                Ok(match self.flavor {
                    JsonFlavor::Dense => encode_i64(t.unix_millis),
                    JsonFlavor::Readable => {
                        let mut obj = Map::new();
                        obj.insert("unix_millis".into(), encode_i64(t.unix_millis));
                        if let Some(formatted) = t.to_rfc3339() {
                            obj.insert("formatted".into(), json!(formatted));
                        }
                        JsonValue::Object(obj)
                    }
                })
            }
            (Value::Struct(sv), TypeDescriptor::Struct(sd)) => {
                if sv.fields.len() != sd.fields.len() {
                    return Err(mismatch(desc, value));
                }
                match self.flavor {
                    JsonFlavor::Dense => {
                        let fields = sv
                            .fields
                            .iter()
                            .zip(sd.fields.iter())
                            .map(|(field, fd)| self.encode(field, &fd.ty))
                            .collect::<Result<Vec<_>, _>>()?;
                        Ok(JsonValue::Array(fields))
                    }
                    JsonFlavor::Readable => {
                        let mut obj = Map::new();
                        for (field, fd) in sv.fields.iter().zip(sd.fields.iter()) {
                            // default-valued fields are omitted; decode
                            // restores them as absent-equals-default
                            if *field == Value::default_of(&fd.ty) {
                                continue;
                            }
                            obj.insert(fd.name.clone(), self.encode(field, &fd.ty)?);
                        }
                        Ok(JsonValue::Object(obj))
                    }
                }
            }
            (Value::Enum(ev), TypeDescriptor::Enum(ed)) => match self.flavor {
                JsonFlavor::Dense => match &ev.payload {
                    None => Ok(json!([ev.tag])),
                    Some(payload) => {
                        let variant =
                            ed.variant_by_tag(ev.tag).ok_or_else(|| mismatch(desc, value))?;
                        let payload_ty =
                            variant.payload.as_ref().ok_or_else(|| mismatch(desc, value))?;
                        Ok(json!([ev.tag, self.encode(payload, payload_ty)?]))
                    }
                },
                JsonFlavor::Readable => match ed.variant_by_tag(ev.tag) {
                    None => Ok(json!({"kind": "?"})),
                    Some(variant) => match (&variant.payload, &ev.payload) {
                        (None, None) => Ok(json!({"kind": variant.name})),
                        (Some(payload_ty), Some(payload)) => Ok(json!({
                            "kind": variant.name,
                            "value": self.encode(payload, payload_ty)?,
                        })),
                        _ => Err(mismatch(desc, value)),
                    },
                },
            },
            (Value::List(lv), TypeDescriptor::List(ld)) => {
                let elements = lv
                    .iter()
                    .map(|element| self.encode(element, &ld.element))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(JsonValue::Array(elements))
            }
            _ => Err(mismatch(desc, value)),
        }
    }

    /// Encodes one value to JSON text.
    pub fn encode_code(&self, value: &Value, desc: &TypeDescriptor) -> Result<String, Error> {
        Ok(self.encode(value, desc)?.to_string())
    }
}

fn encode_i64(v: i64) -> JsonValue {
    if (-MAX_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(&v) {
        json!(v)
    } else {
        json!(v.to_string())
    }
}

fn encode_f64(v: f64) -> JsonValue {
    if v.is_finite() {
        json!(v)
    } else if v.is_nan() {
        json!("NaN")
    } else if v > 0.0 {
        json!("Infinity")
    } else {
        json!("-Infinity")
    }
}

fn mismatch(desc: &TypeDescriptor, value: &Value) -> Error {
    Error::TypeMismatch {
        expected: desc.kind_str().to_string(),
        found: value.kind_str().to_string(),
    }
}

/// Decodes values from either JSON flavor without a flavor flag.
pub struct JsonDecoder;

impl Default for JsonDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decodes one value from a JSON tree.
    pub fn decode(&self, json: &JsonValue, desc: &TypeDescriptor) -> Result<Value, WireError> {
        match desc {
            TypeDescriptor::Primitive(p) => self.decode_primitive(json, *p),
            TypeDescriptor::Struct(sd) => match json {
                JsonValue::Array(fields) => {
                    if fields.len() > sd.fields.len() {
                        return Err(WireError::WrongArity {
                            expected: sd.fields.len(),
                            found: fields.len(),
                        });
                    }
                    let mut out = Vec::with_capacity(sd.fields.len());
                    for (field, fd) in fields.iter().zip(sd.fields.iter()) {
                        out.push(self.decode(field, &fd.ty)?);
                    }
                    for fd in &sd.fields[fields.len()..] {
                        out.push(Value::default_of(&fd.ty));
                    }
                    Ok(Value::struct_of(out))
                }
                JsonValue::Object(obj) => {
                    // keys not in any field's name set are ignored for
                    // forward compatibility
                    let mut out = Vec::with_capacity(sd.fields.len());
                    for fd in &sd.fields {
                        let entry = obj.get(&fd.name).or_else(|| {
                            fd.former_names.iter().find_map(|n| obj.get(n))
                        });
                        out.push(match entry {
                            Some(v) => self.decode(v, &fd.ty)?,
                            None => Value::default_of(&fd.ty),
                        });
                    }
                    Ok(Value::struct_of(out))
                }
                other => Err(shape("array or object", other)),
            },
            TypeDescriptor::Enum(ed) => {
                let (tag, payload_json): (u32, Option<&JsonValue>) = match json {
                    JsonValue::Array(parts) => match parts.as_slice() {
                        [tag] => (decode_tag(tag)?, None),
                        [tag, payload] => (decode_tag(tag)?, Some(payload)),
                        _ => return Err(shape("enum array of arity 1 or 2", json)),
                    },
                    JsonValue::Number(_) => (decode_tag(json)?, None),
                    JsonValue::String(name) => {
                        return Ok(self.decode_enum_by_name(ed, name, None)?);
                    }
                    JsonValue::Object(obj) => {
                        let kind = obj
                            .get("kind")
                            .and_then(JsonValue::as_str)
                            .ok_or_else(|| shape("enum object with string `kind`", json))?;
                        return Ok(self.decode_enum_by_name(ed, kind, obj.get("value"))?);
                    }
                    other => return Err(shape("enum encoding", other)),
                };
                let known = ed
                    .variant_by_tag(tag)
                    .filter(|v| v.payload.is_some() == payload_json.is_some());
                match known {
                    Some(variant) => match (&variant.payload, payload_json) {
                        (Some(payload_ty), Some(payload)) => {
                            let payload = self.decode(payload, payload_ty)?;
                            Ok(Value::Enum(std::sync::Arc::new(EnumValue {
                                tag,
                                payload: Some(payload),
                            })))
                        }
                        _ => Ok(Value::Enum(std::sync::Arc::new(EnumValue {
                            tag,
                            payload: None,
                        }))),
                    },
                    None => Ok(Value::Enum(std::sync::Arc::new(EnumValue::unknown()))),
                }
            }
            TypeDescriptor::List(ld) => {
                let elements = json
                    .as_array()
                    .ok_or_else(|| shape("array", json))?
                    .iter()
                    .map(|element| self.decode(element, &ld.element))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::List(match &ld.key {
                    Some(key) => ListValue::keyed(elements, key.path.clone()),
                    None => ListValue::new(elements),
                }))
            }
        }
    }

    /// Decodes one value from JSON text.
    pub fn decode_code(&self, code: &str, desc: &TypeDescriptor) -> Result<Value, WireError> {
        let json: JsonValue = serde_json::from_str(code)?;
        self.decode(&json, desc)
    }

    fn decode_enum_by_name(
        &self,
        ed: &crate::descriptor::EnumDescriptor,
        name: &str,
        payload: Option<&JsonValue>,
    ) -> Result<Value, WireError> {
        if name == "?" {
            return Ok(Value::Enum(std::sync::Arc::new(EnumValue::unknown())));
        }
        match ed.variant_by_name(name) {
            Some(variant) => match (&variant.payload, payload) {
                (None, _) => Ok(Value::Enum(std::sync::Arc::new(EnumValue {
                    tag: variant.tag,
                    payload: None,
                }))),
                (Some(payload_ty), Some(payload)) => {
                    let payload = self.decode(payload, payload_ty)?;
                    Ok(Value::Enum(std::sync::Arc::new(EnumValue {
                        tag: variant.tag,
                        payload: Some(payload),
                    })))
                }
                // a wrapper without a payload is schema drift
                (Some(_), None) => Ok(Value::Enum(std::sync::Arc::new(EnumValue::unknown()))),
            },
            // an unrecognized variant name is forward-compatible unknown
            None => Ok(Value::Enum(std::sync::Arc::new(EnumValue::unknown()))),
        }
    }

    fn decode_primitive(
        &self,
        json: &JsonValue,
        p: PrimitiveType,
    ) -> Result<Value, WireError> {
        Ok(match p {
            PrimitiveType::Bool => Value::Bool(json.as_bool().ok_or_else(|| shape("bool", json))?),
            PrimitiveType::Int32 => {
                let v = json.as_i64().ok_or_else(|| shape("int32 number", json))?;
                Value::Int32(i32::try_from(v).map_err(|_| WireError::IntOutOfRange)?)
            }
            PrimitiveType::Int64 => Value::Int64(decode_i64(json)?),
            PrimitiveType::Float32 => Value::Float32(decode_f64(json)? as f32),
            PrimitiveType::Float64 => Value::Float64(decode_f64(json)?),
            PrimitiveType::String => {
                Value::str(json.as_str().ok_or_else(|| shape("string", json))?)
            }
            PrimitiveType::Bytes => {
                let s = json.as_str().ok_or_else(|| shape("base64 string", json))?;
                Value::bytes(BASE64.decode(s)?)
            }
            PrimitiveType::Timestamp => match json {
                JsonValue::Object(obj) => {
                    let millis = obj
                        .get("unix_millis")
                        .ok_or_else(|| shape("timestamp object with `unix_millis`", json))?;
                    Value::Timestamp(Timestamp::from_unix_millis(decode_i64(millis)?))
                }
                _ => Value::Timestamp(Timestamp::from_unix_millis(decode_i64(json)?)),
            },
        })
    }
}

fn decode_tag(json: &JsonValue) -> Result<u32, WireError> {
    let tag = json
        .as_u64()
        .ok_or_else(|| shape("non-negative integer tag", json))?;
    u32::try_from(tag).map_err(|_| WireError::IntOutOfRange)
}

fn decode_i64(json: &JsonValue) -> Result<i64, WireError> {
    match json {
        JsonValue::Number(_) => json.as_i64().ok_or(WireError::IntOutOfRange),
        JsonValue::String(s) => s.parse::<i64>().map_err(|_| WireError::IntOutOfRange),
        other => Err(shape("integer number or decimal string", other)),
    }
}

fn decode_f64(json: &JsonValue) -> Result<f64, WireError> {
    match json {
        JsonValue::Number(_) => json.as_f64().ok_or(WireError::IntOutOfRange),
        JsonValue::String(s) => match s.as_str() {
            "NaN" => Ok(f64::NAN),
            "Infinity" => Ok(f64::INFINITY),
            "-Infinity" => Ok(f64::NEG_INFINITY),
            _ => Err(shape("number or non-finite string", json)),
        },
        other => Err(shape("number", other)),
    }
}

fn json_kind(json: &JsonValue) -> &'static str {
    match json {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

fn shape(expected: &'static str, found: &JsonValue) -> WireError {
    WireError::UnexpectedShape {
        expected,
        found: json_kind(found),
    }
}
