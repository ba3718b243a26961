use key_dial::{keys, Doc, KeyDialError, KeyPath, Record, Value};
use serde_json::json;

fn fixture() -> Value {
    let mut root = Value::from(json!({
        "a": {"b": {"c": true}, "d": 5},
        "e": [0, 1]
    }));
    if let Some(map) = root.as_map_mut() {
        map.insert(
            Value::from("f"),
            Value::Record(Record::from_pairs([("g", Value::from("hello"))])),
        );
    }
    root
}

fn dial(doc: &Doc, keys: Vec<Value>) -> KeyPath {
    KeyPath::bind(doc.clone()).expect("bind fixture").with_keys(keys)
}

#[test]
fn dig_existing_keys_matrix() {
    let root = fixture();
    let cases: Vec<(Vec<Value>, Value)> = vec![
        (keys!["a", "b", "c"], Value::Bool(true)),
        (keys!["e", 1], Value::Int(1)),
        (keys!["e", -2], Value::Int(0)),
        (keys!["e", 1.9], Value::Int(1)),
        (keys!["f", "g"], Value::from("hello")),
        (keys!["f", 0], Value::from("hello")),
        (keys!["a", "d"], Value::Int(5)),
    ];
    for (path, expected) in cases {
        assert_eq!(root.dig(&path), Some(&expected), "path {path:?}");
    }
}

#[test]
fn dig_missing_or_leaf_matrix() {
    let root = fixture();
    let cases = [
        keys!["a", "x", "c"],
        keys!["e", "x", "c"],
        keys!["f", "x", "c"],
        keys!["a", "d", "c"],
        keys!["e", 1, 1],
        keys!["f", "g", 1],
        keys!["e", 2],
        keys!["e", -3],
        keys!["f", 1],
    ];
    for path in cases {
        assert_eq!(root.dig(&path), None, "path {path:?}");
    }
}

#[test]
fn read_does_not_mutate() {
    let doc = Doc::new(fixture());
    let before = doc.snapshot();
    for path in [keys!["a", "d", "c"], keys!["e", -9], keys!["f", "x", 3]] {
        let path = dial(&doc, path);
        assert_eq!(path.read(), Value::Null);
        assert!(!path.exists());
    }
    assert_eq!(doc.snapshot(), before);
}

#[test]
fn read_returns_default_matrix() {
    let doc = Doc::new(fixture());
    for keys in [keys!["a", "x", "c"], keys!["e", "x", "c"], keys!["f", "x", "c"]] {
        let path = dial(&doc, keys);
        assert_eq!(path.read_or("test"), Value::from("test"));
        assert_eq!(path.clone().with_default("test").read(), Value::from("test"));
        assert_eq!(path.read_or_else(|| Value::from(7)), Value::Int(7));
    }
}

#[test]
fn read_present_null_is_not_default() {
    let doc = Doc::from(json!({"a": null}));
    let path = dial(&doc, keys!["a"]).with_default(1);
    assert!(path.exists());
    assert_eq!(path.read(), Value::Null);
    assert_eq!(path.try_read(), Ok(Value::Null));
}

#[test]
fn exists_then_matrix() {
    let doc = Doc::new(fixture());

    let mut seen = None;
    assert!(dial(&doc, keys!["a", "d"]).exists_then(|v| seen = Some(v.clone())));
    assert_eq!(seen, Some(Value::Int(5)));

    let mut ran = false;
    assert!(!dial(&doc, keys!["a", "x"]).exists_then(|_| ran = true));
    assert!(!ran);
}

#[test]
fn try_read_matrix() {
    let doc = Doc::new(fixture());
    assert_eq!(dial(&doc, keys!["f", "g"]).try_read(), Ok(Value::from("hello")));

    let err = dial(&doc, keys!["a", "x"]).try_read().unwrap_err();
    assert_eq!(
        err,
        KeyDialError::KeyNotFound {
            path: Value::seq(["a", "x"])
        }
    );
    assert_eq!(err.to_string(), r#"no value at key path ["a", "x"]"#);

    let mut path = dial(&doc, keys!["a", "x"]);
    path.set_default_with(|| Value::from("lazy"));
    assert_eq!(path.try_read(), Ok(Value::from("lazy")));
    path.clear_default();
    assert!(path.try_read().is_err());
}

#[test]
fn empty_path_reads_root() {
    let doc = Doc::new(fixture());
    let path = KeyPath::bind(doc.clone()).unwrap();
    assert!(path.exists());
    assert_eq!(path.read(), doc.snapshot());
}
