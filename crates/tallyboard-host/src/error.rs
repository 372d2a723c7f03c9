//! Error types for the host layer.
//!
//! These describe failures while talking to the host's internals: a type
//! that can't be instantiated, a write that doesn't fit the field, and so on.

/// Errors raised by a [`Host`](crate::Host) implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// The type has no constructor that can be called without arguments.
    #[error("type {0} has no accessible no-arg constructor")]
    NoSuchConstructor(String),

    /// The host exposes no primitive for allocating uninitialized instances.
    #[error("host does not expose a raw allocation primitive")]
    NoRawAllocator,

    /// The type is not known to the host.
    #[error("unknown type {0}")]
    UnknownType(String),

    /// A field index outside the object's field list was written or read.
    #[error("type {type_name} has no field at index {index}")]
    NoSuchField { type_name: String, index: usize },

    /// The value written doesn't match the field's declared type.
    ///
    /// Writing a component into a plain text field is the classic case:
    /// it means the positional layout was misread for this host release.
    #[error("field {field} of {type_name} expects {expected}, got {actual}")]
    TypeMismatch {
        type_name: String,
        field: String,
        expected: String,
        actual: String,
    },

    /// Static fields belong to the type, not to instances.
    #[error("field {field} of {type_name} is static")]
    StaticField { type_name: String, field: String },
}
