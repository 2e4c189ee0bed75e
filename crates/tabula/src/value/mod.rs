//! The value model: deeply immutable schema values.

pub mod enums;
pub mod list;
pub mod timestamp;
#[allow(clippy::module_inception)]
pub mod value;

pub use enums::{EnumValue, EnumVisitor};
pub use list::{IndexKey, ListValue};
pub use timestamp::Timestamp;
pub use value::{StructValue, Value};
