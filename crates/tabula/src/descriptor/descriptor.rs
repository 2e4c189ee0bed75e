//! Descriptor node types.

use std::sync::Arc;

use crate::error::Error;

/// Tag identifying one of the schema primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    Bool,
    Int32,
    Int64,
    Float32,
    Float64,
    String,
    Bytes,
    Timestamp,
}

impl PrimitiveType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Timestamp => "timestamp",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "bool" => Self::Bool,
            "int32" => Self::Int32,
            "int64" => Self::Int64,
            "float32" => Self::Float32,
            "float64" => Self::Float64,
            "string" => Self::String,
            "bytes" => Self::Bytes,
            "timestamp" => Self::Timestamp,
            _ => return None,
        })
    }

    /// Whether a leaf of this type may serve as a keyed-list key.
    pub fn is_keyable(self) -> bool {
        matches!(
            self,
            Self::Bool | Self::Int32 | Self::Int64 | Self::String | Self::Timestamp
        )
    }
}

/// Runtime metadata for one schema type.
///
/// Descriptors form a tree, or a DAG when types share subtypes (the
/// `Arc` nodes make sharing free). They never form cycles.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    Primitive(PrimitiveType),
    Struct(Arc<StructDescriptor>),
    Enum(Arc<EnumDescriptor>),
    List(Arc<ListDescriptor>),
}

impl TypeDescriptor {
    pub fn bool() -> Self {
        Self::Primitive(PrimitiveType::Bool)
    }

    pub fn int32() -> Self {
        Self::Primitive(PrimitiveType::Int32)
    }

    pub fn int64() -> Self {
        Self::Primitive(PrimitiveType::Int64)
    }

    pub fn float32() -> Self {
        Self::Primitive(PrimitiveType::Float32)
    }

    pub fn float64() -> Self {
        Self::Primitive(PrimitiveType::Float64)
    }

    pub fn string() -> Self {
        Self::Primitive(PrimitiveType::String)
    }

    pub fn bytes() -> Self {
        Self::Primitive(PrimitiveType::Bytes)
    }

    pub fn timestamp() -> Self {
        Self::Primitive(PrimitiveType::Timestamp)
    }

    pub fn list(element: TypeDescriptor) -> Self {
        Self::List(ListDescriptor::new(element))
    }

    pub fn keyed_list(element: TypeDescriptor, key: &str) -> Result<Self, Error> {
        Ok(Self::List(ListDescriptor::keyed(element, key)?))
    }

    /// The shape name of this descriptor, for error messages.
    pub fn kind_str(&self) -> &'static str {
        match self {
            Self::Primitive(p) => p.as_str(),
            Self::Struct(_) => "struct",
            Self::Enum(_) => "enum",
            Self::List(_) => "list",
        }
    }
}

/// A struct field: current name, recognized former names, declared type.
///
/// The former names make renames wire-safe in readable JSON: binary and
/// dense JSON never carry names, and readable decode accepts the
/// current name or any former name.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub former_names: Vec<String>,
    pub ty: TypeDescriptor,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            former_names: Vec::new(),
            ty,
        }
    }

    /// Records a name this field was previously declared under.
    pub fn renamed_from(mut self, former: impl Into<String>) -> Self {
        self.former_names.push(former.into());
        self
    }
}

/// A struct type: named, typed fields in declaration order.
///
/// Declaration order is part of the type's identity and fixes the
/// positional wire order in every format.
#[derive(Debug, Clone, PartialEq)]
pub struct StructDescriptor {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
}

impl StructDescriptor {
    /// Validates and freezes a struct descriptor.
    ///
    /// Every current and former name must be unique across the struct,
    /// so readable-JSON decode is unambiguous.
    pub fn new(
        name: impl Into<String>,
        fields: Vec<FieldDescriptor>,
    ) -> Result<Arc<Self>, Error> {
        let name = name.into();
        let mut seen: Vec<&str> = Vec::new();
        for field in &fields {
            for n in std::iter::once(field.name.as_str())
                .chain(field.former_names.iter().map(String::as_str))
            {
                if seen.contains(&n) {
                    return Err(Error::BadDescriptor(format!(
                        "struct `{name}`: duplicate field name `{n}`"
                    )));
                }
                seen.push(n);
            }
        }
        Ok(Arc::new(Self { name, fields }))
    }

    /// Resolves a field by current name, falling back to former names.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        if let Some(i) = self.fields.iter().position(|f| f.name == name) {
            return Some(i);
        }
        self.fields
            .iter()
            .position(|f| f.former_names.iter().any(|n| n == name))
    }
}

/// An enum variant: name, nonzero tag, optional payload type.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantDescriptor {
    pub name: String,
    pub tag: u32,
    pub payload: Option<TypeDescriptor>,
}

impl VariantDescriptor {
    pub fn constant(name: impl Into<String>, tag: u32) -> Self {
        Self {
            name: name.into(),
            tag,
            payload: None,
        }
    }

    pub fn wrapper(name: impl Into<String>, tag: u32, payload: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            tag,
            payload: Some(payload),
        }
    }
}

/// An enum type: declared variants, plus the implicit unknown variant.
///
/// Tag 0 is reserved for unknown and cannot be declared; `"?"` is the
/// unknown variant's readable-JSON spelling and is likewise reserved.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDescriptor {
    pub name: String,
    pub variants: Vec<VariantDescriptor>,
}

impl EnumDescriptor {
    pub fn new(
        name: impl Into<String>,
        variants: Vec<VariantDescriptor>,
    ) -> Result<Arc<Self>, Error> {
        let name = name.into();
        for (i, variant) in variants.iter().enumerate() {
            if variant.tag == 0 {
                return Err(Error::BadDescriptor(format!(
                    "enum `{name}`: tag 0 is reserved for unknown (variant `{}`)",
                    variant.name
                )));
            }
            if variant.name == "?" {
                return Err(Error::BadDescriptor(format!(
                    "enum `{name}`: variant name `?` is reserved for unknown"
                )));
            }
            for other in &variants[..i] {
                if other.tag == variant.tag {
                    return Err(Error::BadDescriptor(format!(
                        "enum `{name}`: duplicate tag {}",
                        variant.tag
                    )));
                }
                if other.name == variant.name {
                    return Err(Error::BadDescriptor(format!(
                        "enum `{name}`: duplicate variant name `{}`",
                        variant.name
                    )));
                }
            }
        }
        Ok(Arc::new(Self { name, variants }))
    }

    pub fn variant_by_tag(&self, tag: u32) -> Option<&VariantDescriptor> {
        self.variants.iter().find(|v| v.tag == tag)
    }

    pub fn variant_by_name(&self, name: &str) -> Option<&VariantDescriptor> {
        self.variants.iter().find(|v| v.name == name)
    }
}

/// The declared key of a keyed list: the schema's dotted field names
/// plus the field-index chain they resolve to.
#[derive(Debug, Clone, PartialEq)]
pub struct ListKey {
    pub names: Vec<String>,
    pub path: Arc<[usize]>,
}

/// A list type: uniform element type, optionally keyed.
#[derive(Debug, Clone, PartialEq)]
pub struct ListDescriptor {
    pub element: TypeDescriptor,
    pub key: Option<ListKey>,
}

impl ListDescriptor {
    pub fn new(element: TypeDescriptor) -> Arc<Self> {
        Arc::new(Self { element, key: None })
    }

    /// A keyed list. `key` is a dotted chain of struct field names
    /// (e.g. `"user_id"` or `"user.id"`) projecting an element to a
    /// keyable primitive leaf.
    pub fn keyed(element: TypeDescriptor, key: &str) -> Result<Arc<Self>, Error> {
        let names: Vec<String> = key.split('.').map(str::to_string).collect();
        let mut path = Vec::with_capacity(names.len());
        let mut current = element.clone();
        for name in &names {
            let TypeDescriptor::Struct(sd) = current else {
                return Err(Error::BadDescriptor(format!(
                    "list key `{key}`: `{name}` does not project into a struct"
                )));
            };
            let index = sd
                .fields
                .iter()
                .position(|f| &f.name == name)
                .ok_or_else(|| {
                    Error::BadDescriptor(format!(
                        "list key `{key}`: struct `{}` has no field `{name}`",
                        sd.name
                    ))
                })?;
            path.push(index);
            current = sd.fields[index].ty.clone();
        }
        match current {
            TypeDescriptor::Primitive(p) if p.is_keyable() => {}
            other => {
                return Err(Error::BadDescriptor(format!(
                    "list key `{key}`: leaf type `{}` is not keyable",
                    other.kind_str()
                )))
            }
        }
        Ok(Arc::new(Self {
            element,
            key: Some(ListKey {
                names,
                path: Arc::from(path),
            }),
        }))
    }
}
