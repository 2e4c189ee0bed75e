//! The in-memory value model.
//!
//! Every schema value is a [`Value`]. Aggregates (structs, enums, lists,
//! strings, byte sequences) live behind shared pointers, so a completed
//! value is deeply immutable and cheap to clone, and identical subtrees
//! can be shared across values.

use std::sync::Arc;

use crate::descriptor::{PrimitiveType, TypeDescriptor};
use crate::error::Error;
use crate::value::enums::EnumValue;
use crate::value::list::ListValue;
use crate::value::timestamp::Timestamp;

/// A schema value: primitive, struct, enum, or list.
///
/// Values compare structurally: two values of the same schema type are
/// equal iff every reachable field, variant, and element is equal.
/// Float comparison follows IEEE `==` (NaN is outside the contract).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Str(Arc<str>),
    Bytes(Arc<[u8]>),
    Timestamp(Timestamp),
    Struct(Arc<StructValue>),
    Enum(Arc<EnumValue>),
    List(ListValue),
}

/// An immutable struct value: its fields in declaration order.
///
/// Field names live on the type descriptor, not the value; the value is
/// purely positional, which is what makes the binary and dense JSON
/// encodings rename-safe.
#[derive(Debug, Clone, PartialEq)]
pub struct StructValue {
    pub fields: Box<[Value]>,
}

impl StructValue {
    pub fn field(&self, index: usize) -> Option<&Value> {
        self.fields.get(index)
    }
}

impl Value {
    pub fn str(s: impl Into<Arc<str>>) -> Self {
        Value::Str(s.into())
    }

    pub fn bytes(b: impl Into<Arc<[u8]>>) -> Self {
        Value::Bytes(b.into())
    }

    pub fn timestamp(unix_millis: i64) -> Self {
        Value::Timestamp(Timestamp::from_unix_millis(unix_millis))
    }

    pub fn struct_of(fields: Vec<Value>) -> Self {
        Value::Struct(Arc::new(StructValue {
            fields: fields.into_boxed_slice(),
        }))
    }

    pub fn list_of(elements: Vec<Value>) -> Self {
        Value::List(ListValue::new(elements))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::Float32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Value::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumValue> {
        match self {
            Value::Enum(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListValue> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    /// The shape name of this value, for error messages.
    pub fn kind_str(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int32(_) => "int32",
            Value::Int64(_) => "int64",
            Value::Float32(_) => "float32",
            Value::Float64(_) => "float64",
            Value::Str(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Timestamp(_) => "timestamp",
            Value::Struct(_) => "struct",
            Value::Enum(_) => "enum",
            Value::List(_) => "list",
        }
    }

    /// The type's zero value: 0, "", false, empty bytes/list, epoch
    /// timestamp, the unknown enum variant, structs all-default
    /// recursively.
    ///
    /// Defaulting is a fixed point: the default of a type is unchanged
    /// by defaulting any of its unset parts again.
    pub fn default_of(desc: &TypeDescriptor) -> Value {
        match desc {
            TypeDescriptor::Primitive(p) => match p {
                PrimitiveType::Bool => Value::Bool(false),
                PrimitiveType::Int32 => Value::Int32(0),
                PrimitiveType::Int64 => Value::Int64(0),
                PrimitiveType::Float32 => Value::Float32(0.0),
                PrimitiveType::Float64 => Value::Float64(0.0),
                PrimitiveType::String => Value::str(""),
                PrimitiveType::Bytes => Value::bytes(&[] as &[u8]),
                PrimitiveType::Timestamp => Value::Timestamp(Timestamp::EPOCH),
            },
            TypeDescriptor::Struct(sd) => Value::struct_of(
                sd.fields
                    .iter()
                    .map(|f| Value::default_of(&f.ty))
                    .collect(),
            ),
            TypeDescriptor::Enum(_) => Value::Enum(Arc::new(EnumValue::unknown())),
            TypeDescriptor::List(ld) => Value::List(match &ld.key {
                Some(key) => ListValue::keyed(Vec::new(), key.path.clone()),
                None => ListValue::new(Vec::new()),
            }),
        }
    }

    /// Checks that this value conforms to the declared type, recursively.
    pub fn check(&self, desc: &TypeDescriptor) -> Result<(), Error> {
        match (self, desc) {
            (Value::Bool(_), TypeDescriptor::Primitive(PrimitiveType::Bool))
            | (Value::Int32(_), TypeDescriptor::Primitive(PrimitiveType::Int32))
            | (Value::Int64(_), TypeDescriptor::Primitive(PrimitiveType::Int64))
            | (Value::Float32(_), TypeDescriptor::Primitive(PrimitiveType::Float32))
            | (Value::Float64(_), TypeDescriptor::Primitive(PrimitiveType::Float64))
            | (Value::Str(_), TypeDescriptor::Primitive(PrimitiveType::String))
            | (Value::Bytes(_), TypeDescriptor::Primitive(PrimitiveType::Bytes))
            | (Value::Timestamp(_), TypeDescriptor::Primitive(PrimitiveType::Timestamp)) => Ok(()),
            (Value::Struct(sv), TypeDescriptor::Struct(sd)) => {
                if sv.fields.len() != sd.fields.len() {
                    return Err(Error::TypeMismatch {
                        expected: format!("struct `{}` with {} fields", sd.name, sd.fields.len()),
                        found: format!("struct with {} fields", sv.fields.len()),
                    });
                }
                for (value, field) in sv.fields.iter().zip(sd.fields.iter()) {
                    value.check(&field.ty)?;
                }
                Ok(())
            }
            (Value::Enum(ev), TypeDescriptor::Enum(ed)) => {
                if ev.tag == 0 {
                    return match &ev.payload {
                        None => Ok(()),
                        Some(_) => Err(Error::TypeMismatch {
                            expected: "unknown variant without payload".to_string(),
                            found: "unknown variant with payload".to_string(),
                        }),
                    };
                }
                let variant = ed.variant_by_tag(ev.tag).ok_or_else(|| Error::TypeMismatch {
                    expected: format!("a variant of enum `{}`", ed.name),
                    found: format!("tag {}", ev.tag),
                })?;
                match (&variant.payload, &ev.payload) {
                    (None, None) => Ok(()),
                    (Some(ty), Some(payload)) => payload.check(ty),
                    _ => Err(Error::TypeMismatch {
                        expected: format!("variant `{}` payload shape", variant.name),
                        found: "mismatched payload presence".to_string(),
                    }),
                }
            }
            (Value::List(lv), TypeDescriptor::List(ld)) => {
                for element in lv.iter() {
                    element.check(&ld.element)?;
                }
                Ok(())
            }
            _ => Err(Error::TypeMismatch {
                expected: desc.kind_str().to_string(),
                found: self.kind_str().to_string(),
            }),
        }
    }
}
