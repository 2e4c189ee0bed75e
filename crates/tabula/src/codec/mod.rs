//! Codecs: one semantic model, three wire formats.
//!
//! [`Serializer`] binds a type descriptor to the binary codec and both
//! JSON flavors. Dense JSON is positional and rename-safe, the flavor
//! to pick when the value will be deserialized in the future; readable
//! JSON is name-keyed, for humans. Decoding JSON needs no flavor flag.

pub mod binary;
pub mod json;

pub use binary::{BinaryDecoder, BinaryEncoder};
pub use json::{JsonDecoder, JsonEncoder};

use serde_json::Value as JsonValue;

use crate::descriptor::TypeDescriptor;
use crate::error::{Error, WireError};
use crate::value::Value;

/// Which JSON flavor to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFlavor {
    /// Positional arrays; compact and rename-safe.
    #[default]
    Dense,
    /// Name-keyed objects; for debugging and logging.
    Readable,
}

/// Serializes and deserializes values of one schema type.
///
/// A serializer is stateless apart from its descriptor and is safe to
/// share across threads.
#[derive(Debug, Clone)]
pub struct Serializer {
    desc: TypeDescriptor,
}

impl Serializer {
    pub fn new(desc: TypeDescriptor) -> Self {
        Self { desc }
    }

    pub fn type_descriptor(&self) -> &TypeDescriptor {
        &self.desc
    }

    /// The described type's default value.
    pub fn default_value(&self) -> Value {
        Value::default_of(&self.desc)
    }

    pub fn to_bytes(&self, value: &Value) -> Result<Vec<u8>, Error> {
        BinaryEncoder::new().encode(value, &self.desc)
    }

    pub fn from_bytes(&self, bytes: &[u8]) -> Result<Value, WireError> {
        BinaryDecoder::new().decode(bytes, &self.desc)
    }

    pub fn to_json(&self, value: &Value, flavor: JsonFlavor) -> Result<JsonValue, Error> {
        JsonEncoder::new(flavor).encode(value, &self.desc)
    }

    pub fn to_json_code(&self, value: &Value, flavor: JsonFlavor) -> Result<String, Error> {
        JsonEncoder::new(flavor).encode_code(value, &self.desc)
    }

    /// Decodes either JSON flavor; the shape of each node selects it.
    pub fn from_json(&self, json: &JsonValue) -> Result<Value, WireError> {
        JsonDecoder::new().decode(json, &self.desc)
    }

    pub fn from_json_code(&self, code: &str) -> Result<Value, WireError> {
        JsonDecoder::new().decode_code(code, &self.desc)
    }
}
