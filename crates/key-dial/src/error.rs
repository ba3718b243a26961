//! Error types for key path operations.

use thiserror::Error;

use crate::value::Value;

/// Result type alias for key path operations.
pub type Result<T> = std::result::Result<T, KeyDialError>;

/// Errors a caller can get back from a [`KeyPath`](crate::KeyPath).
///
/// Missing keys and incompatible intermediate values never surface here:
/// reads fall back to a default and writes restructure the document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KeyDialError {
    /// The root handed to a key path is not a map, sequence or record.
    #[error("cannot bind to a {found}: root must be a map, sequence or record")]
    InvalidContainer {
        /// Type name of the rejected root.
        found: &'static str,
    },

    /// `try_read` found nothing at the path.
    #[error("no value at key path {path}")]
    KeyNotFound {
        /// The keys that failed to resolve, as a sequence.
        path: Value,
    },

    /// A key list replacement was not a sequence.
    #[error("key list must be a sequence, got {found}")]
    InvalidKeyList {
        /// Type name of the rejected value.
        found: &'static str,
    },
}

impl KeyDialError {
    #[inline]
    pub(crate) fn invalid_container(root: &Value) -> Self {
        KeyDialError::InvalidContainer {
            found: root.type_name(),
        }
    }

    #[inline]
    pub(crate) fn key_not_found(keys: &[Value]) -> Self {
        KeyDialError::KeyNotFound {
            path: Value::Seq(keys.to_vec()),
        }
    }

    #[inline]
    pub(crate) fn invalid_key_list(keys: &Value) -> Self {
        KeyDialError::InvalidKeyList {
            found: keys.type_name(),
        }
    }
}
