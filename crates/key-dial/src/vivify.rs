//! Auto-vivification: walking a key path for writing.
//!
//! Each level is first made compatible with the key about to be used on it
//! (leaves are wrapped, records redefined, sequences grown or turned into
//! maps), then the child under that key is created if it is absent. The walk
//! holds `&mut` borrows into the parent, so a container replaced during repair
//! is spliced back into its parent in place and the root is never detached.
//!
//! A `Null` child counts as absent: it is replaced by a fresh placeholder
//! rather than wrapped.

use tracing::{debug, trace};

use crate::coerce::{convert, indexed_map, to_map, Target};
use crate::container::{key_index, required_len, resolve_index};
use crate::value::{Map, Value};

/// Make `container` able to hold `key`.
fn repair(container: &mut Value, key: &Value) {
    if container.is_null() {
        *container = placeholder(key);
    }
    let index = key_index(key);
    let from = container.type_name();
    let replacement = match container {
        Value::Map(_) => return,
        Value::Seq(items) => match index {
            Some(i) => {
                grow_seq(items, i);
                return;
            }
            None => Value::Map(indexed_map(std::mem::take(items))),
        },
        Value::Record(record) => match (key, index) {
            (Value::Str(name), _) => {
                if record.shape().position(name).is_some() {
                    return;
                }
                Value::Record(record.with_field(name.clone()))
            }
            (_, Some(i)) => match record.grown_to_fit(i) {
                Some(grown) => Value::Record(grown),
                None => return,
            },
            (_, None) => Value::Map(to_map(Value::Record(record.clone()))),
        },
        _ => {
            let old = std::mem::take(container);
            match index {
                Some(i) => {
                    let len = usize::try_from(i.unsigned_abs())
                        .map_or(usize::MAX, |n| n.saturating_add(1));
                    let mut items = vec![old];
                    items.resize(len, Value::Null);
                    Value::Seq(items)
                }
                None => {
                    let mut map = Map::with_capacity(1);
                    map.insert(Value::Int(0), old);
                    Value::Map(map)
                }
            }
        }
    };
    debug!(key = %key, from, to = replacement.type_name(), "restructured container for key");
    *container = replacement;
}

/// Grow a sequence until `index` is addressable: trailing `Null`s for
/// positions past the end, leading `Null`s for negative positions before the
/// start.
fn grow_seq(items: &mut Vec<Value>, index: i64) {
    let needed = required_len(index);
    if items.len() >= needed {
        return;
    }
    if index >= 0 {
        items.resize(needed, Value::Null);
    } else {
        let extra = needed - items.len();
        debug!(index, extra, "prepending nulls to sequence");
        items.splice(0..0, std::iter::repeat(Value::Null).take(extra));
    }
}

/// Empty container suited to receive `next_key`.
fn placeholder(next_key: &Value) -> Value {
    match key_index(next_key) {
        Some(i) if i < 0 => Value::Seq(vec![Value::Null; required_len(i)]),
        Some(_) => Value::empty_seq(),
        None => Value::empty_map(),
    }
}

/// Position of `key` inside an already repaired sequence or record.
fn position(container: &Value, key: &Value) -> Option<usize> {
    match container {
        Value::Seq(items) => resolve_index(key_index(key)?, items.len()),
        Value::Record(record) => match key {
            Value::Str(name) => record.shape().position(name),
            other => resolve_index(key_index(other)?, record.len()),
        },
        _ => None,
    }
}

fn force_map(value: &mut Value) -> &mut Map {
    if !matches!(value, Value::Map(_)) {
        let old = std::mem::take(value);
        *value = Value::Map(to_map(old));
    }
    match value {
        Value::Map(map) => map,
        _ => unreachable!("value was just replaced by a map"),
    }
}

/// Repair `container` for `key` and return the slot under `key`, creating it
/// as `Null` if needed.
fn slot<'a>(container: &'a mut Value, key: &Value) -> &'a mut Value {
    repair(container, key);
    let pos = position(container, key);
    match (container, pos) {
        (Value::Seq(items), Some(i)) => &mut items[i],
        (Value::Record(record), Some(i)) => &mut record.values_mut()[i],
        (other, _) => force_map(other).entry(key.clone()).or_insert(Value::Null),
    }
}

/// Walk every key but the last, creating missing levels, and return the
/// container that will hold the last key.
fn descend<'a>(root: &'a mut Value, keys: &[Value]) -> &'a mut Value {
    let mut current = root;
    for pair in keys.windows(2) {
        let (key, next) = (&pair[0], &pair[1]);
        let child = slot(current, key);
        if child.is_null() {
            *child = placeholder(next);
            trace!(key = %key, next = %next, "created placeholder");
        }
        current = child;
    }
    current
}

/// Store `value` at `keys`, creating and restructuring containers on the way.
///
/// An empty key list replaces the root; a leaf root replacement is wrapped as
/// `{0: value}` so the root stays a container.
pub(crate) fn write(root: &mut Value, keys: &[Value], value: Value) {
    let Some(last) = keys.last() else {
        *root = if value.is_container() {
            value
        } else {
            Value::Map(to_map(value))
        };
        return;
    };
    let parent = descend(root, keys);
    *slot(parent, last) = value;
}

/// Find or create the value at `keys`.
///
/// An absent (or `Null`) value is created from `initial` converted to
/// `target`, from a fresh `target` instance, from `initial` alone, or as an
/// empty map, in that order of preference. An existing value that does not
/// match `target` is converted in place.
pub(crate) fn insist<'a>(
    root: &'a mut Value,
    keys: &[Value],
    target: Option<&Target>,
    initial: Option<Value>,
) -> &'a mut Value {
    let here = match keys.last() {
        Some(last) => slot(descend(root, keys), last),
        None => root,
    };
    if here.is_null() {
        *here = match (target, initial) {
            (Some(target), Some(initial)) => convert(initial, target),
            (Some(target), None) => target.instantiate(),
            (None, Some(initial)) => initial,
            (None, None) => Value::empty_map(),
        };
    } else if let Some(target) = target.filter(|t| !t.matches(here)) {
        debug!(from = here.type_name(), to = ?target, "coercing value in place");
        let old = std::mem::take(here);
        *here = convert(old, target);
    }
    here
}

/// Key under which `append` stores its value, given what is currently at the
/// location.
pub(crate) fn next_append_key(current: Option<&Value>) -> Value {
    match current {
        None | Some(Value::Null) => Value::Int(0),
        Some(Value::Map(map)) => Value::from(map.len()),
        Some(Value::Seq(items)) => Value::from(items.len()),
        Some(Value::Record(record)) => Value::from(record.len()),
        Some(_) => Value::Int(1),
    }
}
