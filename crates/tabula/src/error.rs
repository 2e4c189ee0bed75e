//! Error types for value construction, access, and wire decoding.

use tabula_buffers::BufferError;
use thiserror::Error;

/// Errors raised while constructing or accessing values.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// A full builder's `build()` was invoked with this field unset.
    #[error("missing required field `{0}`")]
    MissingRequiredField(String),
    /// A payload accessor was invoked on an enum value of a different variant.
    #[error("wrong variant: requested tag {requested}, value holds tag {actual}")]
    WrongVariant { requested: u32, actual: u32 },
    /// No field with this name (current or former) exists on the struct.
    #[error("no field named `{0}`")]
    NoSuchField(String),
    /// No variant with this name exists on the enum.
    #[error("no variant named `{0}`")]
    NoSuchVariant(String),
    /// A value does not match the declared type it was supplied for.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
    /// A type descriptor is ill-formed (reserved tag, duplicate name, bad JSON).
    #[error("bad type descriptor: {0}")]
    BadDescriptor(String),
}

/// Errors raised while decoding wire data (binary or either JSON flavor).
///
/// Every variant is a malformed-wire-data condition: the input is
/// structurally invalid for the target type and no partial value is
/// returned. Unrecognized enum tags and unrecognized readable-JSON
/// object keys are deliberately *not* represented here; both resolve
/// silently for forward compatibility.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("trailing bytes after value")]
    TrailingBytes,
    #[error("invalid UTF-8")]
    InvalidUtf8,
    #[error("varint overflow")]
    VarintOverflow,
    #[error("integer out of range for declared type")]
    IntOutOfRange,
    #[error("wrong arity: type declares {expected} fields, input has {found}")]
    WrongArity { expected: usize, found: usize },
    #[error("unexpected shape: expected {expected}, found {found}")]
    UnexpectedShape {
        expected: &'static str,
        found: &'static str,
    },
    #[error("invalid boolean byte {0:#04x}")]
    InvalidBool(u8),
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<BufferError> for WireError {
    fn from(err: BufferError) -> Self {
        match err {
            BufferError::EndOfBuffer => WireError::UnexpectedEof,
            BufferError::InvalidUtf8 => WireError::InvalidUtf8,
            BufferError::VarintOverflow => WireError::VarintOverflow,
        }
    }
}
