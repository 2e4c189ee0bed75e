//! Binary codec: positional, descriptor-driven encoding.
//!
//! Structs are a varint field count followed by the field encodings in
//! declaration order; nothing on the wire carries a name, which is what
//! makes the format rename-safe. All integers are LEB128 varints
//! (zigzag for signed values); strings, byte sequences, and enum
//! wrapper payloads are length-prefixed.

use tabula_buffers::{Reader, Writer};

use crate::descriptor::{PrimitiveType, TypeDescriptor};
use crate::error::{Error, WireError};
use crate::value::{EnumValue, ListValue, Value};

/// Encodes values to the binary wire format.
pub struct BinaryEncoder {
    pub writer: Writer,
}

impl Default for BinaryEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl BinaryEncoder {
    pub fn new() -> Self {
        Self {
            writer: Writer::new(),
        }
    }

    /// Encodes one value and returns the wire bytes.
    pub fn encode(&mut self, value: &Value, desc: &TypeDescriptor) -> Result<Vec<u8>, Error> {
        self.writer.reset();
        self.write_value(value, desc)?;
        Ok(self.writer.flush())
    }

    fn write_value(&mut self, value: &Value, desc: &TypeDescriptor) -> Result<(), Error> {
        match (value, desc) {
            (Value::Bool(b), TypeDescriptor::Primitive(PrimitiveType::Bool)) => {
                self.writer.u8(*b as u8);
            }
            (Value::Int32(v), TypeDescriptor::Primitive(PrimitiveType::Int32)) => {
                self.writer.var_i64(*v as i64);
            }
            (Value::Int64(v), TypeDescriptor::Primitive(PrimitiveType::Int64)) => {
                self.writer.var_i64(*v);
            }
            (Value::Float32(v), TypeDescriptor::Primitive(PrimitiveType::Float32)) => {
                self.writer.f32(*v);
            }
            (Value::Float64(v), TypeDescriptor::Primitive(PrimitiveType::Float64)) => {
                self.writer.f64(*v);
            }
            (Value::Str(s), TypeDescriptor::Primitive(PrimitiveType::String)) => {
                self.writer.utf8(s);
            }
            (Value::Bytes(b), TypeDescriptor::Primitive(PrimitiveType::Bytes)) => {
                self.writer.bin(b);
            }
            (Value::Timestamp(t), TypeDescriptor::Primitive(PrimitiveType::Timestamp)) => {
                self.writer.var_i64(t.unix_millis);
            }
            (Value::Struct(sv), TypeDescriptor::Struct(sd)) => {
                if sv.fields.len() != sd.fields.len() {
                    return Err(mismatch(desc, value));
                }
                self.writer.var_u64(sv.fields.len() as u64);
                for (field, fd) in sv.fields.iter().zip(sd.fields.iter()) {
                    self.write_value(field, &fd.ty)?;
                }
            }
            (Value::Enum(ev), TypeDescriptor::Enum(ed)) => {
                match &ev.payload {
                    None => {
                        self.writer.var_u64((ev.tag as u64) << 1);
                    }
                    Some(payload) => {
                        let variant =
                            ed.variant_by_tag(ev.tag).ok_or_else(|| mismatch(desc, value))?;
                        let payload_ty =
                            variant.payload.as_ref().ok_or_else(|| mismatch(desc, value))?;
                        let mut sub = BinaryEncoder::new();
                        sub.write_value(payload, payload_ty)?;
                        let bytes = sub.writer.flush();
                        self.writer.var_u64(((ev.tag as u64) << 1) | 1);
                        self.writer.bin(&bytes);
                    }
                }
            }
            (Value::List(lv), TypeDescriptor::List(ld)) => {
                self.writer.var_u64(lv.len() as u64);
                for element in lv.iter() {
                    self.write_value(element, &ld.element)?;
                }
            }
            _ => return Err(mismatch(desc, value)),
        }
        Ok(())
    }
}

fn mismatch(desc: &TypeDescriptor, value: &Value) -> Error {
    Error::TypeMismatch {
        expected: desc.kind_str().to_string(),
        found: value.kind_str().to_string(),
    }
}

/// Decodes values from the binary wire format.
///
/// Decoding validates structural well-formedness only; an unrecognized
/// enum tag resolves to the unknown variant (its payload bytes are
/// skipped via the length prefix and discarded), never to an error.
pub struct BinaryDecoder;

impl Default for BinaryDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl BinaryDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decodes one value; trailing bytes are malformed.
    pub fn decode(&self, bytes: &[u8], desc: &TypeDescriptor) -> Result<Value, WireError> {
        let mut reader = Reader::new(bytes);
        let value = self.read_value(&mut reader, desc)?;
        if reader.size() > 0 {
            return Err(WireError::TrailingBytes);
        }
        Ok(value)
    }

    fn read_value(&self, r: &mut Reader, desc: &TypeDescriptor) -> Result<Value, WireError> {
        Ok(match desc {
            TypeDescriptor::Primitive(p) => match p {
                PrimitiveType::Bool => match r.u8()? {
                    0 => Value::Bool(false),
                    1 => Value::Bool(true),
                    other => return Err(WireError::InvalidBool(other)),
                },
                PrimitiveType::Int32 => {
                    let v = r.var_i64()?;
                    Value::Int32(i32::try_from(v).map_err(|_| WireError::IntOutOfRange)?)
                }
                PrimitiveType::Int64 => Value::Int64(r.var_i64()?),
                PrimitiveType::Float32 => Value::Float32(r.f32()?),
                PrimitiveType::Float64 => Value::Float64(r.f64()?),
                PrimitiveType::String => Value::str(r.utf8()?),
                PrimitiveType::Bytes => Value::bytes(r.bin()?),
                PrimitiveType::Timestamp => Value::timestamp(r.var_i64()?),
            },
            TypeDescriptor::Struct(sd) => {
                let count = r.var_u64()? as usize;
                if count > sd.fields.len() {
                    return Err(WireError::WrongArity {
                        expected: sd.fields.len(),
                        found: count,
                    });
                }
                let mut fields = Vec::with_capacity(sd.fields.len());
                for fd in &sd.fields[..count] {
                    fields.push(self.read_value(r, &fd.ty)?);
                }
                // a shorter count means the writer had an older schema;
                // the remaining fields take their defaults
                for fd in &sd.fields[count..] {
                    fields.push(Value::default_of(&fd.ty));
                }
                Value::struct_of(fields)
            }
            TypeDescriptor::Enum(ed) => {
                let head = r.var_u64()?;
                let has_payload = head & 1 == 1;
                let tag =
                    u32::try_from(head >> 1).map_err(|_| WireError::IntOutOfRange)?;
                let known = ed
                    .variant_by_tag(tag)
                    .filter(|v| v.payload.is_some() == has_payload);
                match known {
                    Some(variant) => match &variant.payload {
                        Some(payload_ty) => {
                            let bytes = r.bin()?;
                            let mut sub = Reader::new(bytes);
                            let payload = self.read_value(&mut sub, payload_ty)?;
                            if sub.size() > 0 {
                                return Err(WireError::TrailingBytes);
                            }
                            Value::Enum(std::sync::Arc::new(EnumValue {
                                tag,
                                payload: Some(payload),
                            }))
                        }
                        None => Value::Enum(std::sync::Arc::new(EnumValue { tag, payload: None })),
                    },
                    None => {
                        if has_payload {
                            r.bin()?;
                        }
                        Value::Enum(std::sync::Arc::new(EnumValue::unknown()))
                    }
                }
            }
            TypeDescriptor::List(ld) => {
                let count = r.var_u64()? as usize;
                if count > r.size() {
                    // every element occupies at least one byte
                    return Err(WireError::UnexpectedEof);
                }
                let mut elements = Vec::with_capacity(count);
                for _ in 0..count {
                    elements.push(self.read_value(r, &ld.element)?);
                }
                Value::List(match &ld.key {
                    Some(key) => ListValue::keyed(elements, key.path.clone()),
                    None => ListValue::new(elements),
                })
            }
        })
    }
}
