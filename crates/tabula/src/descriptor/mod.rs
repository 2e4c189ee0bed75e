//! Type descriptors: runtime, serializable schema metadata.
//!
//! A descriptor describes one schema type well enough to drive generic
//! construction, encoding, decoding, and traversal without per-type
//! code. Descriptors are created once (typically at startup), are
//! immutable, and may be shared freely across threads.

#[allow(clippy::module_inception)]
mod descriptor;
pub mod json;

pub use descriptor::{
    EnumDescriptor, FieldDescriptor, ListDescriptor, ListKey, PrimitiveType, StructDescriptor,
    TypeDescriptor, VariantDescriptor,
};
