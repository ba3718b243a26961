//! [`KeyPath`]: a reusable list of keys bound to a shared root.
//!
//! Building a path never touches the document. Only the terminal operations
//! (`exists`, `read*`, `write`, `append`, `insist*`) walk it, in one pass over
//! the current key list and the current state of the root.

use std::cell::RefMut;
use std::fmt;
use std::ops::{Add, Sub};
use std::rc::Rc;

use tracing::debug;

use crate::coerce::Target;
use crate::doc::Doc;
use crate::error::{KeyDialError, Result};
use crate::value::Value;
use crate::vivify;

/// Fallback produced by reads that do not resolve.
#[derive(Clone)]
enum Fallback {
    Value(Value),
    Lazy(Rc<dyn Fn() -> Value>),
}

impl Fallback {
    fn produce(&self) -> Value {
        match self {
            Fallback::Value(v) => v.clone(),
            Fallback::Lazy(f) => f(),
        }
    }
}

impl fmt::Debug for Fallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fallback::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Fallback::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

/// A path of keys into a nested map / sequence / record structure.
///
/// # Example
///
/// ```
/// use key_dial::{keys, Doc, KeyPath, Value};
/// use serde_json::json;
///
/// let doc = Doc::from(json!({"a": {"b": {"c": true}}}));
/// let mut path = KeyPath::bind(doc.clone()).unwrap();
///
/// path.append_keys(keys!["a", "b", "c"]);
/// assert_eq!(path.read(), Value::from(true));
///
/// path.retract_key().append_key("f");
/// path.write("v");
/// assert_eq!(doc.snapshot(), Value::from(json!({"a": {"b": {"c": true, "f": "v"}}})));
/// ```
#[derive(Debug, Clone)]
pub struct KeyPath {
    doc: Doc,
    keys: Vec<Value>,
    default: Option<Fallback>,
}

impl Default for KeyPath {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyPath {
    /// An unbound path over a fresh, empty map.
    pub fn new() -> Self {
        Self {
            doc: Doc::empty(),
            keys: Vec::new(),
            default: None,
        }
    }

    /// An unbound path holding `keys`.
    pub fn from_keys<I>(keys: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let mut path = Self::new();
        path.append_keys(keys);
        path
    }

    /// A path over `doc`.
    ///
    /// A `Null` root is replaced in place by an empty map.
    ///
    /// # Errors
    ///
    /// [`KeyDialError::InvalidContainer`] if the root is any other leaf value.
    pub fn bind(doc: impl Into<Doc>) -> Result<Self> {
        let doc = checked_root(doc.into())?;
        Ok(Self {
            doc,
            keys: Vec::new(),
            default: None,
        })
    }

    /// Builder form of [`KeyPath::append_keys`].
    pub fn with_keys<I>(mut self, keys: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.append_keys(keys);
        self
    }

    /// Builder form of [`KeyPath::set_default`].
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.set_default(default);
        self
    }

    /// Point this path at another root, keeping its keys.
    ///
    /// # Errors
    ///
    /// [`KeyDialError::InvalidContainer`] if the root is a non-null leaf; the
    /// current binding is kept in that case.
    pub fn rebind(&mut self, doc: impl Into<Doc>) -> Result<&mut Self> {
        self.doc = checked_root(doc.into())?;
        Ok(self)
    }

    /// The bound root. This is the caller's document, not a copy.
    #[inline]
    pub fn doc(&self) -> &Doc {
        &self.doc
    }

    /// Keys dialled so far.
    #[inline]
    pub fn keys(&self) -> &[Value] {
        &self.keys
    }

    /// Replace the whole key list.
    ///
    /// # Errors
    ///
    /// [`KeyDialError::InvalidKeyList`] unless `keys` is a sequence.
    pub fn set_keys(&mut self, keys: impl Into<Value>) -> Result<&mut Self> {
        match keys.into() {
            Value::Seq(keys) => {
                self.keys = keys;
                Ok(self)
            }
            other => Err(KeyDialError::invalid_key_list(&other)),
        }
    }

    // ── Dialling ──────────────────────────────────────────────────────────

    /// Add one key, one level deeper.
    pub fn append_key(&mut self, key: impl Into<Value>) -> &mut Self {
        self.keys.push(key.into());
        self
    }

    /// Add several keys in order.
    pub fn append_keys<I>(&mut self, keys: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.keys.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Splice in another path's keys.
    pub fn append_path(&mut self, other: &KeyPath) -> &mut Self {
        self.keys.extend_from_slice(&other.keys);
        self
    }

    /// Remove the last key, if any.
    pub fn retract_key(&mut self) -> &mut Self {
        self.keys.pop();
        self
    }

    /// Remove every occurrence of each given key. With no keys given, removes
    /// the last key instead.
    pub fn retract_keys<I>(&mut self, keys: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let remove: Vec<Value> = keys.into_iter().map(Into::into).collect();
        if remove.is_empty() {
            return self.retract_key();
        }
        self.keys.retain(|k| !remove.contains(k));
        self
    }

    // ── Defaults ──────────────────────────────────────────────────────────

    /// Value returned by [`KeyPath::read`] when the path does not resolve.
    pub fn set_default(&mut self, default: impl Into<Value>) -> &mut Self {
        self.default = Some(Fallback::Value(default.into()));
        self
    }

    /// Like [`KeyPath::set_default`], but computed on each failed read.
    pub fn set_default_with<F>(&mut self, default: F) -> &mut Self
    where
        F: Fn() -> Value + 'static,
    {
        self.default = Some(Fallback::Lazy(Rc::new(default)));
        self
    }

    /// Drop any configured default.
    pub fn clear_default(&mut self) -> &mut Self {
        self.default = None;
        self
    }

    /// The current default, `Null` if none is configured.
    pub fn default_value(&self) -> Value {
        self.default
            .as_ref()
            .map_or(Value::Null, Fallback::produce)
    }

    // ── Reading ───────────────────────────────────────────────────────────

    fn resolve(&self) -> Option<Value> {
        self.doc.borrow().dig(&self.keys).cloned()
    }

    /// Whether every key resolves. Never mutates the document.
    pub fn exists(&self) -> bool {
        self.doc.borrow().dig(&self.keys).is_some()
    }

    /// Like [`KeyPath::exists`], and on success hands the resolved value to
    /// `on_found`.
    ///
    /// The document is not borrowed while `on_found` runs, so the callback
    /// may write through this or any other path.
    pub fn exists_then<F>(&self, on_found: F) -> bool
    where
        F: FnOnce(&Value),
    {
        match self.resolve() {
            Some(value) => {
                on_found(&value);
                true
            }
            None => false,
        }
    }

    /// The value at the path, or the configured default.
    ///
    /// A leaf met half-way is a failed lookup, not an error.
    pub fn read(&self) -> Value {
        self.resolve().unwrap_or_else(|| self.default_value())
    }

    /// The value at the path, or `default`.
    pub fn read_or(&self, default: impl Into<Value>) -> Value {
        self.resolve().unwrap_or_else(|| default.into())
    }

    /// The value at the path, or the result of `default`, called only when
    /// the path does not resolve.
    pub fn read_or_else<F>(&self, default: F) -> Value
    where
        F: FnOnce() -> Value,
    {
        self.resolve().unwrap_or_else(default)
    }

    /// The value at the path, or the configured default.
    ///
    /// # Errors
    ///
    /// [`KeyDialError::KeyNotFound`] if the path does not resolve and no
    /// default is configured.
    pub fn try_read(&self) -> Result<Value> {
        match (self.resolve(), &self.default) {
            (Some(value), _) => Ok(value),
            (None, Some(fallback)) => Ok(fallback.produce()),
            (None, None) => Err(KeyDialError::key_not_found(&self.keys)),
        }
    }

    // ── Writing ───────────────────────────────────────────────────────────

    /// Store `value` at the path, creating missing levels and restructuring
    /// incompatible ones. Returns the value stored.
    ///
    /// Restructuring is destructive: a leaf on the way becomes a sequence or
    /// map holding it, a sequence given a non-numeric key becomes a map, a
    /// record given an unknown field is redefined with that field.
    ///
    /// # Panics
    ///
    /// Panics if the document is already borrowed, or if an index on the path
    /// needs a sequence or record too large to allocate (an index near
    /// `i64::MAX` or `i64::MIN`).
    pub fn write(&self, value: impl Into<Value>) -> Value {
        let value = value.into();
        vivify::write(&mut self.doc.borrow_mut(), &self.keys, value.clone());
        value
    }

    /// Treat the location as a growable list and add `value` to its end.
    ///
    /// The next key is the current size of a container found there, `0` if
    /// nothing is there, or `1` if a leaf is there (the leaf becomes element
    /// `0`). Returns the value stored.
    ///
    /// # Panics
    ///
    /// Panics if the document is already borrowed, or if an index on the path
    /// needs a sequence or record too large to allocate (an index near
    /// `i64::MAX` or `i64::MIN`).
    pub fn append(&self, value: impl Into<Value>) -> Value {
        let next = {
            let root = self.doc.borrow();
            vivify::next_append_key(root.dig(&self.keys))
        };
        let mut keys = self.keys.clone();
        keys.push(next);
        let value = value.into();
        vivify::write(&mut self.doc.borrow_mut(), &keys, value.clone());
        value
    }

    /// The value at the path, creating an empty map there if nothing exists.
    ///
    /// # Panics
    ///
    /// Panics if the document is already borrowed, or if an index on the path
    /// needs a sequence or record too large to allocate (an index near
    /// `i64::MAX` or `i64::MIN`).
    pub fn insist(&self) -> Value {
        self.insist_mut(None).clone()
    }

    /// The value at the path as `target`: converted in place if it exists
    /// with another kind, created empty if it does not.
    ///
    /// # Panics
    ///
    /// Panics if the document is already borrowed, or if an index on the path
    /// needs a sequence or record too large to allocate (an index near
    /// `i64::MAX` or `i64::MIN`).
    pub fn insist_as(&self, target: &Target) -> Value {
        self.insist_mut(Some(target)).clone()
    }

    /// Like [`KeyPath::insist_as`], but a missing value is built from
    /// `initial` converted to `target`.
    ///
    /// # Panics
    ///
    /// Panics if the document is already borrowed, or if an index on the path
    /// needs a sequence or record too large to allocate (an index near
    /// `i64::MAX` or `i64::MIN`).
    pub fn insist_or(&self, target: &Target, initial: impl Into<Value>) -> Value {
        let keys = &self.keys;
        let initial = initial.into();
        let mut root = self.doc.borrow_mut();
        vivify::insist(&mut root, keys, Some(target), Some(initial)).clone()
    }

    /// Find-or-create the value at the path and borrow it mutably inside the
    /// document, for in-place edits.
    ///
    /// # Panics
    ///
    /// Panics if the document is already borrowed, or if an index on the path
    /// needs a sequence or record too large to allocate.
    pub fn insist_mut(&self, target: Option<&Target>) -> RefMut<'_, Value> {
        let keys = &self.keys;
        RefMut::map(self.doc.borrow_mut(), |root| {
            vivify::insist(root, keys, target, None)
        })
    }
}

fn checked_root(doc: Doc) -> Result<Doc> {
    let rejected = {
        let root = doc.borrow();
        match &*root {
            Value::Null => None,
            v if v.is_container() => None,
            v => Some(KeyDialError::invalid_container(v)),
        }
    };
    if let Some(err) = rejected {
        debug!(error = %err, "rejected key path root");
        return Err(err);
    }
    if doc.borrow().is_null() {
        doc.replace(Value::empty_map());
    }
    Ok(doc)
}

impl<K: Into<Value>> Add<K> for KeyPath {
    type Output = KeyPath;

    fn add(mut self, key: K) -> KeyPath {
        self.append_key(key);
        self
    }
}

impl<K: Into<Value>> Sub<K> for KeyPath {
    type Output = KeyPath;

    /// Removes every occurrence of `key`.
    fn sub(mut self, key: K) -> KeyPath {
        self.retract_keys([key.into()]);
        self
    }
}

impl Value {
    /// Move this value into a new [`Doc`] and bind a path over it.
    ///
    /// # Errors
    ///
    /// [`KeyDialError::InvalidContainer`] if the value is a non-null leaf.
    pub fn dial<I>(self, keys: I) -> Result<KeyPath>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Ok(KeyPath::bind(self)?.with_keys(keys))
    }
}
