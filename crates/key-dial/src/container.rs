//! Uniform keyed access over maps, sequences and records.
//!
//! Every [`Value`] is classified once per access into a [`Class`]; the
//! [`Container`] operations then branch on that tag. Leaf values are
//! [`Class::Opaque`]: they hold no keys and cannot be set into.

use thiserror::Error;

use crate::record::Record;
use crate::value::{Map, Value};

/// Structural classification of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Class {
    /// Arbitrary keys, insertion ordered.
    Map,
    /// Integer-indexed, negative indices count from the end.
    Sequence,
    /// Fixed named fields, also addressable by position.
    Record,
    /// A leaf value.
    Opaque,
}

impl Value {
    /// Classify this value.
    ///
    /// ```
    /// use key_dial::{Class, Value};
    ///
    /// assert_eq!(Value::empty_map().class(), Class::Map);
    /// assert_eq!(Value::from(5).class(), Class::Opaque);
    /// ```
    pub fn class(&self) -> Class {
        match self {
            Value::Map(_) => Class::Map,
            Value::Seq(_) => Class::Sequence,
            Value::Record(_) => Class::Record,
            Value::Null
            | Value::Bool(_)
            | Value::Int(_)
            | Value::Float(_)
            | Value::Str(_) => Class::Opaque,
        }
    }

    /// Whether this value is a map, sequence or record.
    #[inline]
    pub fn is_container(&self) -> bool {
        self.class() != Class::Opaque
    }

    /// Look up a nested value without mutating anything.
    ///
    /// Returns `None` as soon as any level is missing or is not a container.
    ///
    /// ```
    /// use key_dial::{keys, Value};
    /// use serde_json::json;
    ///
    /// let doc = Value::from(json!({"a": {"b": [10, 20]}}));
    /// assert_eq!(doc.dig(&keys!["a", "b", -1]), Some(&Value::from(20)));
    /// assert_eq!(doc.dig(&keys!["a", "x"]), None);
    /// ```
    pub fn dig(&self, keys: &[Value]) -> Option<&Value> {
        let mut current = self;
        for key in keys {
            current = current.get(key)?;
        }
        Some(current)
    }

    /// Mutable counterpart of [`Value::dig`].
    pub fn dig_mut(&mut self, keys: &[Value]) -> Option<&mut Value> {
        let mut current = self;
        for key in keys {
            current = current.get_mut(key)?;
        }
        Some(current)
    }
}

/// Integer position a key addresses: integers as-is, finite floats truncated
/// toward zero. Any other key is not numeric.
pub fn key_index(key: &Value) -> Option<i64> {
    match key {
        Value::Int(i) => Some(*i),
        Value::Float(f) if f.is_finite() => Some(f.trunc() as i64),
        _ => None,
    }
}

/// Resolve a possibly negative index against a length.
///
/// `-1` is the last element; a negative index is valid while its magnitude
/// does not exceed `len`.
pub(crate) fn resolve_index(index: i64, len: usize) -> Option<usize> {
    if index >= 0 {
        let i = usize::try_from(index).ok()?;
        (i < len).then_some(i)
    } else {
        let back = usize::try_from(index.unsigned_abs()).ok()?;
        (back <= len).then(|| len - back)
    }
}

/// Length a sequence (or record) must reach before `index` is addressable.
pub(crate) fn required_len(index: i64) -> usize {
    if index >= 0 {
        usize::try_from(index).map_or(usize::MAX, |i| i.saturating_add(1))
    } else {
        usize::try_from(index.unsigned_abs()).unwrap_or(usize::MAX)
    }
}

/// The key cannot be set on this container without restructuring it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot set key {key} on a {class:?} in place")]
pub struct NotSettable {
    pub key: Value,
    pub class: Class,
}

/// The capability set shared by every keyed container.
pub trait Container {
    /// Whether `key` currently addresses a value.
    fn has(&self, key: &Value) -> bool {
        self.get(key).is_some()
    }

    /// The value at `key`; `None` is the missing marker.
    fn get(&self, key: &Value) -> Option<&Value>;

    fn get_mut(&mut self, key: &Value) -> Option<&mut Value>;

    /// Store `value` at `key` in place.
    fn set(&mut self, key: Value, value: Value) -> Result<(), NotSettable>;

    fn size(&self) -> usize;

    /// Keys in iteration order.
    fn all_keys(&self) -> Vec<Value>;
}

impl Container for Map {
    fn has(&self, key: &Value) -> bool {
        self.contains_key(key)
    }

    fn get(&self, key: &Value) -> Option<&Value> {
        indexmap::IndexMap::get(self, key)
    }

    fn get_mut(&mut self, key: &Value) -> Option<&mut Value> {
        indexmap::IndexMap::get_mut(self, key)
    }

    fn set(&mut self, key: Value, value: Value) -> Result<(), NotSettable> {
        self.insert(key, value);
        Ok(())
    }

    fn size(&self) -> usize {
        self.len()
    }

    fn all_keys(&self) -> Vec<Value> {
        self.keys().cloned().collect()
    }
}

impl Container for Vec<Value> {
    fn get(&self, key: &Value) -> Option<&Value> {
        let i = resolve_index(key_index(key)?, self.len())?;
        self.as_slice().get(i)
    }

    fn get_mut(&mut self, key: &Value) -> Option<&mut Value> {
        let i = resolve_index(key_index(key)?, self.len())?;
        self.as_mut_slice().get_mut(i)
    }

    /// Indices past the end grow the sequence, filling the gap with `Null`.
    fn set(&mut self, key: Value, value: Value) -> Result<(), NotSettable> {
        let not_settable = |key| NotSettable {
            key,
            class: Class::Sequence,
        };
        let Some(index) = key_index(&key) else {
            return Err(not_settable(key));
        };
        let slot = match resolve_index(index, self.len()) {
            Some(i) => i,
            None if index >= 0 => {
                let needed = required_len(index);
                self.resize(needed, Value::Null);
                needed - 1
            }
            None => return Err(not_settable(key)),
        };
        self[slot] = value;
        Ok(())
    }

    fn size(&self) -> usize {
        self.len()
    }

    fn all_keys(&self) -> Vec<Value> {
        (0..self.len()).map(Value::from).collect()
    }
}

impl Container for Record {
    fn get(&self, key: &Value) -> Option<&Value> {
        match key {
            Value::Str(name) => Record::get(self, name),
            other => self.at(key_index(other)?),
        }
    }

    fn get_mut(&mut self, key: &Value) -> Option<&mut Value> {
        match key {
            Value::Str(name) => Record::get_mut(self, name),
            other => self.at_mut(key_index(other)?),
        }
    }

    fn set(&mut self, key: Value, value: Value) -> Result<(), NotSettable> {
        match Container::get_mut(self, &key) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(NotSettable {
                key,
                class: Class::Record,
            }),
        }
    }

    fn size(&self) -> usize {
        self.len()
    }

    fn all_keys(&self) -> Vec<Value> {
        self.members().iter().map(|m| Value::from(m.as_str())).collect()
    }
}

impl Container for Value {
    fn has(&self, key: &Value) -> bool {
        match self {
            Value::Map(map) => map.has(key),
            Value::Seq(items) => items.has(key),
            Value::Record(record) => record.has(key),
            _ => false,
        }
    }

    fn get(&self, key: &Value) -> Option<&Value> {
        match self {
            Value::Map(map) => Container::get(map, key),
            Value::Seq(items) => Container::get(items, key),
            Value::Record(record) => Container::get(record, key),
            _ => None,
        }
    }

    fn get_mut(&mut self, key: &Value) -> Option<&mut Value> {
        match self {
            Value::Map(map) => Container::get_mut(map, key),
            Value::Seq(items) => Container::get_mut(items, key),
            Value::Record(record) => Container::get_mut(record, key),
            _ => None,
        }
    }

    fn set(&mut self, key: Value, value: Value) -> Result<(), NotSettable> {
        match self {
            Value::Map(map) => map.set(key, value),
            Value::Seq(items) => items.set(key, value),
            Value::Record(record) => record.set(key, value),
            _ => Err(NotSettable {
                key,
                class: Class::Opaque,
            }),
        }
    }

    /// Leaf values count as a single element.
    fn size(&self) -> usize {
        match self {
            Value::Map(map) => map.len(),
            Value::Seq(items) => items.len(),
            Value::Record(record) => record.len(),
            _ => 1,
        }
    }

    fn all_keys(&self) -> Vec<Value> {
        match self {
            Value::Map(map) => map.all_keys(),
            Value::Seq(items) => items.all_keys(),
            Value::Record(record) => record.all_keys(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys;

    #[test]
    fn test_resolve_index() {
        assert_eq!(resolve_index(0, 2), Some(0));
        assert_eq!(resolve_index(1, 2), Some(1));
        assert_eq!(resolve_index(2, 2), None);
        assert_eq!(resolve_index(-1, 2), Some(1));
        assert_eq!(resolve_index(-2, 2), Some(0));
        assert_eq!(resolve_index(-3, 2), None);
        assert_eq!(resolve_index(-1, 0), None);
    }

    #[test]
    fn test_key_index_truncates_floats() {
        assert_eq!(key_index(&Value::Float(1.7)), Some(1));
        assert_eq!(key_index(&Value::Float(-1.5)), Some(-1));
        assert_eq!(key_index(&Value::Float(f64::NAN)), None);
        assert_eq!(key_index(&Value::from("1")), None);
    }

    #[test]
    fn test_sequence_access() {
        let mut seq = Value::seq([0, 1]);
        assert!(seq.has(&Value::Int(-2)));
        assert!(!seq.has(&Value::Int(-3)));
        assert!(!seq.has(&Value::from("a")));
        assert_eq!(seq.get(&Value::Float(1.2)), Some(&Value::Int(1)));
        seq.set(Value::Int(4), Value::from("x")).unwrap();
        assert_eq!(seq, Value::seq([0.into(), 1.into(), Value::Null, Value::Null, "x".into()]));
        assert!(seq.set(Value::Int(-9), Value::Null).is_err());
        assert_eq!(seq.all_keys(), keys![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_map_access() {
        let mut map = Value::map([("a", 1)]);
        assert!(map.has(&Value::from("a")));
        assert!(!map.has(&Value::Int(0)));
        map.set(Value::Int(0), Value::from("zero")).unwrap();
        assert_eq!(map.all_keys(), keys!["a", 0]);
        assert_eq!(map.size(), 2);
    }

    #[test]
    fn test_record_access() {
        let mut rec = Value::from(Record::from_pairs([("g", Value::from("hello"))]));
        assert!(rec.has(&Value::from("g")));
        assert!(rec.has(&Value::Int(0)));
        assert!(rec.has(&Value::Int(-1)));
        assert!(!rec.has(&Value::Int(1)));
        assert!(!rec.has(&Value::from("h")));
        rec.set(Value::Int(0), Value::from("bye")).unwrap();
        assert_eq!(rec.get(&Value::from("g")), Some(&Value::from("bye")));
        let err = rec.set(Value::from("h"), Value::Null).unwrap_err();
        assert_eq!(err.class, Class::Record);
        assert_eq!(rec.all_keys(), keys!["g"]);
    }

    #[test]
    fn test_opaque_access() {
        let mut leaf = Value::from("text");
        assert!(!leaf.has(&Value::Int(0)));
        assert_eq!(leaf.get(&Value::Int(0)), None);
        assert_eq!(leaf.size(), 1);
        assert!(leaf.all_keys().is_empty());
        let err = leaf.set(Value::Int(0), Value::Null).unwrap_err();
        assert_eq!(err.class, Class::Opaque);
    }

    #[test]
    fn test_dig() {
        let doc = Value::map([(
            "a",
            Value::map([("b", Value::seq([1, 2]))]),
        )]);
        assert_eq!(doc.dig(&keys!["a", "b", 0]), Some(&Value::Int(1)));
        assert_eq!(doc.dig(&keys!["a", "b", 0, 1]), None);
        assert_eq!(doc.dig(&[]), Some(&doc));
    }
}
