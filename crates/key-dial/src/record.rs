//! Fixed-field records and the shapes that describe them.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use crate::container::resolve_index;
use crate::value::Value;

/// The layout of a record: an ordered list of field names, optionally named.
///
/// A named shape is a "specific" shape; coercing into it keeps only its
/// declared fields. Unnamed shapes are produced for anonymous records.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape {
    name: Option<String>,
    fields: Vec<String>,
}

impl Shape {
    /// Declare a named shape.
    ///
    /// ```
    /// use key_dial::Shape;
    ///
    /// let point = Shape::named("Point", ["x", "y"]);
    /// assert_eq!(point.fields(), ["x", "y"]);
    /// assert_eq!(point.name(), Some("Point"));
    /// ```
    pub fn named<I, S>(name: impl Into<String>, fields: I) -> Arc<Shape>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Shape {
            name: Some(name.into()),
            fields: fields.into_iter().map(Into::into).collect(),
        })
    }

    /// Declare an anonymous shape.
    pub fn anonymous<I, S>(fields: I) -> Arc<Shape>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Shape {
            name: None,
            fields: fields.into_iter().map(Into::into).collect(),
        })
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Position of a field, if declared.
    pub fn position(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == field)
    }

    /// A record of this shape with every field `Null`.
    pub fn instantiate(self: &Arc<Self>) -> Record {
        Record::new(Arc::clone(self), Vec::new())
    }
}

fn fresh_field_name(position: usize, taken: &mut Vec<String>) -> String {
    let mut name = position.to_string();
    while taken.contains(&name) {
        name.push('_');
    }
    taken.push(name.clone());
    name
}

fn empty_shape() -> &'static Arc<Shape> {
    static EMPTY: OnceLock<Arc<Shape>> = OnceLock::new();
    EMPTY.get_or_init(|| Shape::anonymous(["0"]))
}

/// A record: a [`Shape`] plus one value per declared field.
#[derive(Debug, Clone)]
pub struct Record {
    shape: Arc<Shape>,
    values: Vec<Value>,
}

impl Record {
    /// Build a record, padding missing trailing values with `Null` and
    /// dropping values beyond the shape's field count.
    pub fn new(shape: Arc<Shape>, mut values: Vec<Value>) -> Self {
        values.resize(shape.len(), Value::Null);
        Self { shape, values }
    }

    /// Anonymous record from field/value pairs.
    ///
    /// ```
    /// use key_dial::{Record, Value};
    ///
    /// let r = Record::from_pairs([("g", Value::from("hello"))]);
    /// assert_eq!(r.get("g"), Some(&Value::from("hello")));
    /// ```
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        let (fields, values): (Vec<String>, Vec<Value>) =
            pairs.into_iter().map(|(k, v)| (k.into(), v)).unzip();
        Self::new(Shape::anonymous(fields), values)
    }

    /// The canonical Empty Record: one field `"0"` holding `Null`.
    ///
    /// All empty records share one shape instance.
    pub fn empty() -> Self {
        Self::new(Arc::clone(empty_shape()), Vec::new())
    }

    /// Whether this is the canonical Empty Record.
    pub fn is_empty_record(&self) -> bool {
        Arc::ptr_eq(&self.shape, empty_shape()) && self.values.iter().all(Value::is_null)
    }

    #[inline]
    pub fn shape(&self) -> &Arc<Shape> {
        &self.shape
    }

    /// Whether this record has `shape`: same name and fields.
    pub fn is_instance_of(&self, shape: &Shape) -> bool {
        *self.shape == *shape
    }

    /// Field names in declaration order.
    #[inline]
    pub fn members(&self) -> &[String] {
        self.shape.fields()
    }

    #[inline]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    #[inline]
    pub(crate) fn values_mut(&mut self) -> &mut [Value] {
        &mut self.values
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.shape.position(field).and_then(|i| self.values.get(i))
    }

    pub fn get_mut(&mut self, field: &str) -> Option<&mut Value> {
        let i = self.shape.position(field)?;
        self.values.get_mut(i)
    }

    /// Positional access; negative positions count from the end.
    pub fn at(&self, position: i64) -> Option<&Value> {
        resolve_index(position, self.values.len()).and_then(|i| self.values.get(i))
    }

    pub fn at_mut(&mut self, position: i64) -> Option<&mut Value> {
        let i = resolve_index(position, self.values.len())?;
        self.values.get_mut(i)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.shape
            .fields()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    pub fn into_pairs(self) -> impl Iterator<Item = (String, Value)> {
        let fields = self.shape.fields().to_vec();
        fields.into_iter().zip(self.values)
    }

    /// A copy of this record redefined with one more trailing field.
    pub(crate) fn with_field(&self, name: String) -> Record {
        let mut fields = self.shape.fields().to_vec();
        fields.push(name);
        let mut values = self.values.clone();
        values.push(Value::Null);
        Record::new(Shape::anonymous(fields), values)
    }

    /// A copy of this record redefined so that `position` is addressable, or
    /// `None` if it already is.
    ///
    /// Non-negative positions append fields named after their positions;
    /// negative positions prepend `Null`-filled fields named `"0"`, `"1"`, ….
    /// A synthesized name that collides with a declared field gets `_`
    /// suffixes until it is unique.
    pub(crate) fn grown_to_fit(&self, position: i64) -> Option<Record> {
        let len = self.len();
        if resolve_index(position, len).is_some() {
            return None;
        }
        let mut taken: Vec<String> = self.shape.fields().to_vec();
        let (fields, values) = if position >= 0 {
            let needed = usize::try_from(position).ok()?.checked_add(1)?;
            let added: Vec<String> = (len..needed).map(|p| fresh_field_name(p, &mut taken)).collect();
            let mut fields = self.shape.fields().to_vec();
            fields.extend(added);
            let mut values = self.values.clone();
            values.resize(needed, Value::Null);
            (fields, values)
        } else {
            let needed = usize::try_from(position.unsigned_abs()).ok()?;
            let extra = needed - len;
            let mut fields: Vec<String> = (0..extra).map(|p| fresh_field_name(p, &mut taken)).collect();
            fields.extend(self.shape.fields().iter().cloned());
            let mut values = vec![Value::Null; extra];
            values.extend(self.values.iter().cloned());
            (fields, values)
        };
        Some(Record::new(Shape::anonymous(fields), values))
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        (Arc::ptr_eq(&self.shape, &other.shape) || self.shape == other.shape)
            && self.values == other.values
    }
}

impl Eq for Record {}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.shape.hash(state);
        self.values.hash(state);
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.shape.name().unwrap_or("Record"))?;
        f.write_str(" {")?;
        for (i, (field, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, " {field}: {value}")?;
        }
        f.write_str(" }")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        Record::from_pairs([("g", Value::from("hello"))])
    }

    #[test]
    fn test_new_pads_and_truncates() {
        let shape = Shape::named("Test", ["a", "b", "c"]);
        let r = Record::new(Arc::clone(&shape), vec![Value::Int(1)]);
        assert_eq!(r.values(), [Value::Int(1), Value::Null, Value::Null]);
        let r = Record::new(shape, vec![1.into(), 2.into(), 3.into(), 4.into()]);
        assert_eq!(r.len(), 3);
    }

    #[test]
    fn test_positional_access() {
        let r = Record::from_pairs([("a", Value::Int(1)), ("b", Value::Int(2))]);
        assert_eq!(r.at(0), Some(&Value::Int(1)));
        assert_eq!(r.at(-1), Some(&Value::Int(2)));
        assert_eq!(r.at(-2), Some(&Value::Int(1)));
        assert_eq!(r.at(-3), None);
        assert_eq!(r.at(2), None);
    }

    #[test]
    fn test_empty_record_is_canonical() {
        let a = Record::empty();
        let b = Record::empty();
        assert!(a.is_empty_record());
        assert!(Arc::ptr_eq(a.shape(), b.shape()));
        assert_eq!(a.members(), ["0"]);
        assert_eq!(a.values(), [Value::Null]);
        assert!(!Record::from_pairs([("0", Value::Null)]).is_empty_record());
    }

    #[test]
    fn test_grow_forward() {
        let r = sample().grown_to_fit(2).unwrap();
        assert_eq!(r.members(), ["g", "1", "2"]);
        assert_eq!(r.values(), [Value::from("hello"), Value::Null, Value::Null]);
        assert!(r.shape().name().is_none());
    }

    #[test]
    fn test_grow_backward() {
        let r = sample().grown_to_fit(-4).unwrap();
        assert_eq!(r.members(), ["0", "1", "2", "g"]);
        assert_eq!(
            r.values(),
            [Value::Null, Value::Null, Value::Null, Value::from("hello")]
        );
    }

    #[test]
    fn test_grow_not_needed() {
        assert!(sample().grown_to_fit(0).is_none());
        assert!(sample().grown_to_fit(-1).is_none());
    }

    #[test]
    fn test_grow_name_collision_gets_suffix() {
        let r = Record::from_pairs([("0", Value::from("x"))]);
        let grown = r.grown_to_fit(-2).unwrap();
        assert_eq!(grown.members(), ["0_", "0"]);

        let r = Record::from_pairs([("1", Value::from("x"))]);
        let grown = r.grown_to_fit(1).unwrap();
        assert_eq!(grown.members(), ["1", "1_"]);
    }

    #[test]
    fn test_with_field() {
        let r = sample().with_field("h".to_string());
        assert_eq!(r.members(), ["g", "h"]);
        assert_eq!(r.values(), [Value::from("hello"), Value::Null]);
    }

    #[test]
    fn test_display() {
        let shape = Shape::named("Point", ["x", "y"]);
        let r = Record::new(shape, vec![1.into(), 2.into()]);
        assert_eq!(r.to_string(), "Point { x: 1, y: 2 }");
    }
}
