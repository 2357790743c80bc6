//! Error types for the cache engine
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for conditional cache operations.
///
/// None of these are fatal: they are returned to the caller of `add`,
/// `replace` or `increment` and leave the store untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// A live entry already occupies the key
    #[error("Key already exists: {0}")]
    KeyExists(String),

    /// Key is absent or its entry has expired
    #[error("Key not found or expired: {0}")]
    KeyNotFound(String),

    /// Stored value is not the incrementable integer kind
    #[error("Unsupported value type for increment on {key}: {kind}")]
    UnsupportedType { key: String, kind: &'static str },
}

// == Result Type Alias ==
/// Convenience Result type for the cache engine.
pub type Result<T> = std::result::Result<T, CacheError>;
