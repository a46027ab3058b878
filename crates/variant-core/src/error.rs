//! Error types for variant construction, access, and tree building.

use thiserror::Error;

/// Errors that can occur when constructing, reading, or building values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VariantError {
    /// Checked access asked for a type that is not the active alternative.
    #[error("type mismatch: expected `{expected}`, active alternative is `{found}`")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// Integer index access on a value whose active alternative is not an array.
    #[error("not an array: active alternative is `{found}`")]
    NotArray { found: &'static str },

    /// Key access on a value whose active alternative is not an object.
    #[error("not an object: active alternative is `{found}`")]
    NotObject { found: &'static str },

    /// Checked array access past the end.
    #[error("index {index} out of range for array of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Checked object access for an absent key. The key is rendered with `Debug`.
    #[error("key not found: {key}")]
    KeyNotFound { key: String },

    /// No alternative of the set can be constructed from the given input,
    /// or the set itself is invalid (empty, duplicated, no default).
    #[error("cannot construct `{set}` from `{input}`: {reason}")]
    ConstructionUnsupported {
        set: &'static str,
        input: &'static str,
        reason: &'static str,
    },

    /// A type was used as an alternative of a set that does not declare it.
    #[error("`{type_name}` is not an alternative of `{set}`")]
    NotAnAlternative {
        type_name: &'static str,
        set: &'static str,
    },

    /// `View::get` was asked for a type with no default while the view held no such value.
    #[error("bad view access: no `{requested}` here and the type has no default")]
    BadViewAccess { requested: &'static str },

    /// Nesting went deeper than the configured limit.
    #[error("recursion depth exceeded (limit {limit})")]
    RecursionDepthExceeded { limit: usize },

    /// A `TreeBuilder` step was issued out of order.
    #[error("invalid build step: {0}")]
    InvalidBuildStep(&'static str),
}

/// Convenience alias used throughout variant-core.
pub type Result<T> = std::result::Result<T, VariantError>;
