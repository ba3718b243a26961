//! Deep key-path access and auto-vivifying mutation for nested data.
//!
//! A [`KeyPath`] is dialled one key at a time into a document of maps,
//! sequences and records, then read from or written to in a single pass.
//! Reads never fail and never mutate: a missing key or a leaf met half-way
//! yields a default. Writes always succeed: missing levels are created and
//! incompatible ones are restructured until the path fits.
//!
//! # Example
//!
//! ```
//! use key_dial::{keys, Doc, KeyPath, Value};
//! use serde_json::json;
//!
//! let doc = Doc::from(json!({"a": [0, 1]}));
//! let path = KeyPath::bind(doc.clone()).unwrap().with_keys(keys!["a", -1]);
//! assert_eq!(path.read(), Value::Int(1));
//!
//! // A string key turns the sequence into a map keyed by index.
//! let path = KeyPath::bind(doc.clone()).unwrap().with_keys(keys!["a", "b", 2]);
//! path.write("x");
//!
//! let root = doc.snapshot();
//! assert_eq!(root.dig(&keys!["a", 0]), Some(&Value::Int(0)));
//! assert_eq!(root.dig(&keys!["a", "b"]), Some(&Value::from(json!([null, null, "x"]))));
//! ```

pub mod coerce;
pub mod container;
mod doc;
mod error;
mod key_path;
mod record;
mod value;
mod vivify;

pub use coerce::{convert, Target};
pub use container::{key_index, Class, Container, NotSettable};
pub use doc::Doc;
pub use error::{KeyDialError, Result};
pub use key_path::KeyPath;
pub use record::{Record, Shape};
pub use value::{Map, Value};

/// Build a key list, converting each key into a [`Value`].
///
/// ```
/// use key_dial::{keys, Value};
///
/// let k = keys!["a", 1, -2];
/// assert_eq!(k, vec![Value::from("a"), Value::Int(1), Value::Int(-2)]);
/// assert!(keys![].is_empty());
/// ```
#[macro_export]
macro_rules! keys {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($key:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($key)),+]
    };
}
