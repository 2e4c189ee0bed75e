//! tabula — schema-driven immutable values, builders, and wire codecs.
//!
//! A schema type is described once as a [`TypeDescriptor`]; everything
//! else is generic over it. Builders assemble deeply immutable
//! [`Value`]s against the descriptor's field list, the [`Serializer`]
//! reads and writes the binary format and two JSON flavors from the
//! same descriptor, and [`transform_leaves`] walks arbitrary values
//! reflectively. No generated per-type code is required: a descriptor
//! parsed from its own canonical JSON form drives every operation.
//!
//! # Example
//!
//! ```
//! use tabula::{
//!     FieldDescriptor, JsonFlavor, Serializer, StructBuilder, StructDescriptor,
//!     TypeDescriptor, Value,
//! };
//!
//! let pair = StructDescriptor::new(
//!     "Pair",
//!     vec![
//!         FieldDescriptor::new("a", TypeDescriptor::int32()),
//!         FieldDescriptor::new("b", TypeDescriptor::string()),
//!     ],
//! )
//! .unwrap();
//!
//! let value = StructBuilder::full(pair.clone())
//!     .set("a", Value::Int32(7))
//!     .unwrap()
//!     .set("b", Value::str("x"))
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! let serializer = Serializer::new(TypeDescriptor::Struct(pair));
//! assert_eq!(
//!     serializer.to_json_code(&value, JsonFlavor::Dense).unwrap(),
//!     r#"[7,"x"]"#
//! );
//! let decoded = serializer
//!     .from_json_code(r#"{"a": 7, "b": "x"}"#)
//!     .unwrap();
//! assert_eq!(decoded, value);
//! ```

pub mod builder;
pub mod codec;
pub mod descriptor;
pub mod error;
pub mod transform;
pub mod value;

pub use builder::StructBuilder;
pub use codec::{BinaryDecoder, BinaryEncoder, JsonDecoder, JsonEncoder, JsonFlavor, Serializer};
pub use descriptor::{
    EnumDescriptor, FieldDescriptor, ListDescriptor, PrimitiveType, StructDescriptor,
    TypeDescriptor, VariantDescriptor,
};
pub use error::{Error, WireError};
pub use transform::{map_strings, transform_leaves};
pub use value::{EnumValue, EnumVisitor, IndexKey, ListValue, StructValue, Timestamp, Value};
