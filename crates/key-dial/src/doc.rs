//! Shared root document.
//!
//! `Doc` wraps an `Rc<RefCell<Value>>` so that a [`KeyPath`](crate::KeyPath)
//! works on the caller's container rather than a copy: clones of a `Doc`
//! share one root, writes through the path are visible to every holder, and
//! edits made elsewhere are visible to a path built earlier.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use crate::value::Value;

/// Shared, single-threaded handle to a root value.
#[derive(Clone, Default)]
pub struct Doc(Rc<RefCell<Value>>);

impl Doc {
    /// Wrap `value` in a new document.
    pub fn new(value: impl Into<Value>) -> Self {
        Self(Rc::new(RefCell::new(value.into())))
    }

    /// An empty map document.
    pub fn empty() -> Self {
        Self::new(Value::empty_map())
    }

    /// Borrow the root value.
    ///
    /// # Panics
    ///
    /// Panics if the root is currently mutably borrowed.
    #[inline]
    pub fn borrow(&self) -> Ref<'_, Value> {
        self.0.borrow()
    }

    /// Mutably borrow the root value.
    ///
    /// # Panics
    ///
    /// Panics if the root is currently borrowed.
    #[inline]
    pub fn borrow_mut(&self) -> RefMut<'_, Value> {
        self.0.borrow_mut()
    }

    /// Clone the current root value.
    pub fn snapshot(&self) -> Value {
        self.borrow().clone()
    }

    /// Replace the root value, returning the previous one.
    pub fn replace(&self, value: Value) -> Value {
        self.0.replace(value)
    }

    /// Whether both handles point at the same root.
    #[inline]
    pub fn ptr_eq(&self, other: &Doc) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl From<Value> for Doc {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

impl From<serde_json::Value> for Doc {
    fn from(value: serde_json::Value) -> Self {
        Self::new(Value::from(value))
    }
}

impl fmt::Debug for Doc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(value) => f.debug_tuple("Doc").field(&*value).finish(),
            Err(_) => f.debug_tuple("Doc").field(&"<borrowed>").finish(),
        }
    }
}
