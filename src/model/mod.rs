pub mod json;
pub mod types;

pub use json::{JsonKind, JsonValue};
pub use types::*;
