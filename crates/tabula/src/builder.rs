//! Builders: the only construction path for struct values.
//!
//! A builder is stateful and **not** safe for concurrent use by
//! multiple threads on the same instance; that is a documented caller
//! responsibility, not an internal lock. The product of `build()` is a
//! deeply immutable [`Value`] that is freely shareable.

use std::sync::Arc;

use crate::descriptor::{StructDescriptor, TypeDescriptor};
use crate::error::Error;
use crate::value::{ListValue, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Every field must be set before `build()`.
    Full,
    /// Unset fields default.
    Partial,
}

/// Assembles an immutable struct value against a struct descriptor.
///
/// Setter invocation order is irrelevant; field order comes from the
/// descriptor's declaration order. Setters accept the current field
/// name or any recognized former name.
pub struct StructBuilder {
    desc: Arc<StructDescriptor>,
    fields: Vec<Option<Value>>,
    mode: Mode,
}

impl StructBuilder {
    /// A full builder: `build()` fails with
    /// [`Error::MissingRequiredField`] unless every field was set.
    pub fn full(desc: Arc<StructDescriptor>) -> Self {
        Self::with_mode(desc, Mode::Full)
    }

    /// A partial builder: unset fields receive their type's default.
    pub fn partial(desc: Arc<StructDescriptor>) -> Self {
        Self::with_mode(desc, Mode::Partial)
    }

    /// A copy builder: a partial builder seeded with `value`'s fields,
    /// for building a modified copy without restating untouched fields.
    /// Every seeded field is checked against its declared type.
    pub fn from_value(desc: Arc<StructDescriptor>, value: &Value) -> Result<Self, Error> {
        let sv = value.as_struct().ok_or_else(|| Error::TypeMismatch {
            expected: format!("struct `{}`", desc.name),
            found: value.kind_str().to_string(),
        })?;
        if sv.fields.len() != desc.fields.len() {
            return Err(Error::TypeMismatch {
                expected: format!("struct `{}` with {} fields", desc.name, desc.fields.len()),
                found: format!("struct with {} fields", sv.fields.len()),
            });
        }
        for (value, field) in sv.fields.iter().zip(desc.fields.iter()) {
            value.check(&field.ty)?;
        }
        let mut builder = Self::with_mode(desc, Mode::Partial);
        for (slot, field) in builder.fields.iter_mut().zip(sv.fields.iter()) {
            *slot = Some(field.clone());
        }
        Ok(builder)
    }

    fn with_mode(desc: Arc<StructDescriptor>, mode: Mode) -> Self {
        let fields = vec![None; desc.fields.len()];
        Self { desc, fields, mode }
    }

    /// Sets a field, validating the name and the value's type.
    ///
    /// A `Value::List` passed here is already frozen and is reused
    /// without copying (its storage stays identity-shared), modulo
    /// re-attaching the field's declared key when it differs.
    pub fn set(&mut self, name: &str, value: Value) -> Result<&mut Self, Error> {
        let index = self
            .desc
            .field_index(name)
            .ok_or_else(|| Error::NoSuchField(name.to_string()))?;
        let field = &self.desc.fields[index];
        value.check(&field.ty)?;
        let value = match (&value, &field.ty) {
            (Value::List(lv), TypeDescriptor::List(ld)) => {
                Value::List(lv.with_key_path(ld.key.as_ref().map(|k| k.path.clone())))
            }
            _ => value,
        };
        self.fields[index] = Some(value);
        Ok(self)
    }

    /// Sets a list field from a caller-owned vector, performing the one
    /// defensive freeze (the vector is moved into immutable storage).
    pub fn set_elements(&mut self, name: &str, elements: Vec<Value>) -> Result<&mut Self, Error> {
        let index = self
            .desc
            .field_index(name)
            .ok_or_else(|| Error::NoSuchField(name.to_string()))?;
        let TypeDescriptor::List(ld) = &self.desc.fields[index].ty else {
            return Err(Error::TypeMismatch {
                expected: self.desc.fields[index].ty.kind_str().to_string(),
                found: "list".to_string(),
            });
        };
        for element in &elements {
            element.check(&ld.element)?;
        }
        let list = match &ld.key {
            Some(key) => ListValue::keyed(elements, key.path.clone()),
            None => ListValue::new(elements),
        };
        self.fields[index] = Some(Value::List(list));
        Ok(self)
    }

    /// Produces the immutable struct value.
    pub fn build(&mut self) -> Result<Value, Error> {
        let mut fields = Vec::with_capacity(self.desc.fields.len());
        for (slot, field) in self.fields.iter().zip(self.desc.fields.iter()) {
            match slot {
                Some(value) => fields.push(value.clone()),
                None => match self.mode {
                    Mode::Full => {
                        return Err(Error::MissingRequiredField(field.name.clone()));
                    }
                    Mode::Partial => fields.push(Value::default_of(&field.ty)),
                },
            }
        }
        Ok(Value::struct_of(fields))
    }
}
