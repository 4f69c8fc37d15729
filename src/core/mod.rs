pub mod error;
pub mod value;

pub use error::{BaseError, Result};
pub use value::{Value, ValueMap, deep_clone_map};
