//! Error types for Steel Moth core.

/// Errors returned by document store operations.
///
/// These are caller contract violations: they are surfaced immediately and
/// leave the store unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A record with this id already exists.
    #[error("Record '{0}' already exists")]
    DuplicateKey(String),
    /// No record with this id exists.
    #[error("Unknown record '{0}'")]
    UnknownKey(String),
    /// The requested parent record does not exist.
    #[error("Parent record '{0}' does not exist")]
    MissingParent(String),
    /// A positional insert index lies past the end of the parent's children.
    #[error("Index {index} is out of range for parent '{parent}' with {len} children")]
    InvalidIndex {
        /// The parent record id.
        parent: String,
        /// The requested position.
        index: usize,
        /// The parent's child count at the time of the call.
        len: usize,
    },
    /// The root record cannot be deleted.
    #[error("The root record cannot be deleted")]
    RootDeletion,
}

/// An element refused an attribute value.
///
/// This is an expected runtime condition: views convert it into a `false`
/// result and never let it escape a notification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid value '{value}' for attribute '{name}': {reason}")]
pub struct AttributeRejected {
    /// The attribute name.
    pub name: String,
    /// The rejected value.
    pub value: String,
    /// Why the element rejected it.
    pub reason: String,
}

impl AttributeRejected {
    /// Create a rejection.
    pub fn new(name: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// A specialized Result type for document store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
