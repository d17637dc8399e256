//! Error types for comment-wall
//!
//! Malformed persisted data is never an error: the store logs it and starts
//! from an empty collection. Everything else funnels through [`Error`].

use thiserror::Error;

/// Form fields that must be non-empty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Author,
    Text,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Author => "author",
            Field::Text => "text",
        }
    }
}

/// The main error type for comment-wall operations
#[derive(Error, Debug)]
pub enum Error {
    /// A required field was empty after trimming
    #[error("missing required field: {}", field.as_str())]
    MissingField { field: Field },

    /// The key-value backend refused a read or write
    #[error("storage error: {0}")]
    Storage(String),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for validation failures the user can fix by editing the form
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::MissingField { .. })
    }
}

/// A specialized Result type for comment-wall operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for Error {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        Error::Storage(format!("{:?}", value))
    }
}
