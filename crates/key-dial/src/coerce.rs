//! Structural coercion between maps, sequences and records.
//!
//! Every conversion here is total: any value converts to any target. Lossy
//! cases (keys with no field-name form, surplus values) drop data rather than
//! fail, and a conversion that leaves no usable record field yields
//! [`Record::empty`].

use std::sync::Arc;

use tracing::trace;

use crate::record::{Record, Shape};
use crate::value::{Map, Value};

/// The kind a value is converted into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Map,
    Sequence,
    /// A record: anonymous (`None`) or of a specific shape.
    Record(Option<Arc<Shape>>),
}

impl Target {
    /// Any record shape.
    #[inline]
    pub fn record() -> Self {
        Target::Record(None)
    }

    /// Records of exactly `shape`.
    #[inline]
    pub fn shaped(shape: &Arc<Shape>) -> Self {
        Target::Record(Some(Arc::clone(shape)))
    }

    /// Whether `value` already has this kind (and shape, if one is given).
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (Target::Map, Value::Map(_)) => true,
            (Target::Sequence, Value::Seq(_)) => true,
            (Target::Record(None), Value::Record(_)) => true,
            (Target::Record(Some(shape)), Value::Record(r)) => r.is_instance_of(shape),
            _ => false,
        }
    }

    /// A fresh, empty instance: `{}`, `[]`, the Empty Record, or a record of
    /// the shape with every field `Null`.
    pub fn instantiate(&self) -> Value {
        match self {
            Target::Map => Value::empty_map(),
            Target::Sequence => Value::empty_seq(),
            Target::Record(None) => Value::Record(Record::empty()),
            Target::Record(Some(shape)) => Value::Record(shape.instantiate()),
        }
    }
}

impl Value {
    /// Convert this value into `target`. See [`convert`].
    #[inline]
    pub fn to(self, target: &Target) -> Value {
        convert(self, target)
    }
}

/// Convert `value` into `target`.
///
/// A value that already matches the target is returned unchanged.
///
/// ```
/// use key_dial::coerce::{convert, Target};
/// use key_dial::Value;
///
/// let seq = Value::seq([Value::seq(["a", "b"]), Value::from("x")]);
/// let map = convert(seq, &Target::Map);
/// assert_eq!(map, Value::map([(Value::from("a"), Value::from("b")), (Value::from(1), Value::from("x"))]));
/// ```
pub fn convert(value: Value, target: &Target) -> Value {
    match target {
        Target::Map => Value::Map(to_map(value)),
        Target::Sequence => Value::Seq(to_seq(value)),
        Target::Record(shape) => Value::Record(to_record(value, shape.as_ref())),
    }
}

/// Convert any value into a map.
///
/// - a map is returned as is;
/// - a sequence maps each index to its element, except that a two-element
///   sequence element is unpacked as a `key: value` pair and an empty one
///   becomes `index: null`;
/// - a record maps field names to values;
/// - a leaf becomes `{0: value}`.
pub fn to_map(value: Value) -> Map {
    match value {
        Value::Map(map) => map,
        Value::Seq(items) => {
            let mut map = Map::with_capacity(items.len());
            for (i, item) in items.into_iter().enumerate() {
                match item {
                    Value::Seq(pair) if pair.len() == 2 => {
                        let mut pair = pair.into_iter();
                        let key = pair.next().unwrap_or_default();
                        let val = pair.next().unwrap_or_default();
                        map.insert(key, val);
                    }
                    Value::Seq(pair) if pair.is_empty() => {
                        map.insert(Value::from(i), Value::Null);
                    }
                    other => {
                        map.insert(Value::from(i), other);
                    }
                }
            }
            map
        }
        Value::Record(record) => record
            .into_pairs()
            .map(|(k, v)| (Value::Str(k), v))
            .collect(),
        leaf => {
            let mut map = Map::with_capacity(1);
            map.insert(Value::Int(0), leaf);
            map
        }
    }
}

/// Plain `index: element` map, with no pair unpacking.
pub fn indexed_map(items: Vec<Value>) -> Map {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| (Value::from(i), item))
        .collect()
}

/// Convert any value into a sequence.
///
/// Maps and records become `[key, value]` pairs in order; a leaf becomes a
/// one-element sequence.
pub fn to_seq(value: Value) -> Vec<Value> {
    match value {
        Value::Seq(items) => items,
        Value::Map(map) => map
            .into_iter()
            .map(|(k, v)| Value::Seq(vec![k, v]))
            .collect(),
        Value::Record(record) => record
            .into_pairs()
            .map(|(k, v)| Value::Seq(vec![Value::Str(k), v]))
            .collect(),
        leaf => vec![leaf],
    }
}

/// Field-name form of a key: strings as is, anything else in its display
/// form. `Null` and the empty string have none.
fn field_name(key: &Value) -> Option<String> {
    match key {
        Value::Null => None,
        Value::Str(s) if s.is_empty() => None,
        other => Some(other.key_text()),
    }
}

/// Convert any value into a record.
///
/// With no `shape`, field names come from the source's keys (map keys, or
/// stringified sequence positions). Keys with no field-name form are dropped,
/// as are later keys whose name repeats an earlier one (`7` after `"7"`): the
/// conversion keeps the fields it can name rather than falling back to the
/// Empty Record. A record source is returned as is, and a source with no
/// usable field gives the Empty Record.
///
/// With a `shape`, each declared field takes the source's value under that
/// name (sequences fill fields positionally, a leaf fills the first field)
/// and `Null` otherwise. A record already of that shape is returned as is.
pub fn to_record(value: Value, shape: Option<&Arc<Shape>>) -> Record {
    match shape {
        None => to_anonymous_record(value),
        Some(shape) => to_shaped_record(value, shape),
    }
}

fn to_anonymous_record(value: Value) -> Record {
    let pairs: Vec<(Value, Value)> = match value {
        Value::Record(record) => return record,
        Value::Map(map) => map.into_iter().collect(),
        Value::Seq(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, v)| (Value::from(i), v))
            .collect(),
        _ => return Record::empty(),
    };
    let mut fields: Vec<String> = Vec::with_capacity(pairs.len());
    let mut values = Vec::with_capacity(pairs.len());
    for (key, val) in pairs {
        match field_name(&key) {
            Some(name) if !fields.contains(&name) => {
                fields.push(name);
                values.push(val);
            }
            _ => trace!(key = %key, "dropping key with no usable field name"),
        }
    }
    if fields.is_empty() {
        return Record::empty();
    }
    Record::new(Shape::anonymous(fields), values)
}

fn to_shaped_record(value: Value, shape: &Arc<Shape>) -> Record {
    let shape = Arc::clone(shape);
    match value {
        Value::Record(record) if record.is_instance_of(&shape) => record,
        Value::Record(record) => {
            let values = shape
                .fields()
                .iter()
                .map(|f| record.get(f).cloned().unwrap_or_default())
                .collect();
            Record::new(shape, values)
        }
        Value::Map(mut map) => {
            let values = shape
                .fields()
                .iter()
                .map(|f| take_field(&mut map, f))
                .collect();
            Record::new(shape, values)
        }
        Value::Seq(items) => Record::new(shape, items),
        Value::Null => shape.instantiate(),
        leaf => Record::new(shape, vec![leaf]),
    }
}

/// Value stored under `field` in a map: an exact string key first, then any
/// key whose text form equals the field name.
fn take_field(map: &mut Map, field: &str) -> Value {
    if let Some(v) = map.shift_remove(&Value::from(field)) {
        return v;
    }
    map.iter()
        .position(|(k, _)| k.key_text() == field)
        .and_then(|i| map.shift_remove_index(i))
        .map(|(_, v)| v)
        .unwrap_or_default()
}
