use key_dial::{keys, Doc, KeyDialError, KeyPath, Record, Value};
use serde_json::json;

fn fixture() -> Doc {
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
    Doc::new(root)
}

#[test]
fn unbound_path_starts_on_empty_map() {
    let path = KeyPath::from_keys(keys!["a", "b"]);
    assert_eq!(path.doc().snapshot(), Value::empty_map());
    assert_eq!(path.keys(), keys!["a", "b"]);
    assert_eq!(KeyPath::new().keys(), keys![]);
}

#[test]
fn keys_can_be_dialled_before_binding() {
    let mut path = KeyPath::from_keys(keys!["f", "g"]);
    assert_eq!(path.read(), Value::Null);
    path.rebind(fixture()).unwrap();
    assert_eq!(path.read(), Value::from("hello"));
}

#[test]
fn bind_rejects_leaf_roots_matrix() {
    let cases = [
        (Value::Bool(true), "bool"),
        (Value::Int(1), "int"),
        (Value::Float(0.5), "float"),
        (Value::from("s"), "string"),
    ];
    for (root, found) in cases {
        let err = KeyPath::bind(root).unwrap_err();
        assert_eq!(err, KeyDialError::InvalidContainer { found });
    }
    for root in [Value::empty_map(), Value::empty_seq(), Value::Record(Record::empty())] {
        assert!(KeyPath::bind(root).is_ok());
    }
}

#[test]
fn path_works_on_the_bound_document_not_a_copy() {
    let doc = fixture();
    let path = KeyPath::bind(doc.clone())
        .unwrap()
        .with_keys(keys!["a", "d", "c"]);
    assert!(path.doc().ptr_eq(&doc));

    // Dial a missing key, then set it directly on the document.
    let path = KeyPath::bind(doc.clone())
        .unwrap()
        .with_keys(keys!["a", "b", "d"]);
    assert_eq!(path.read(), Value::Null);
    doc.borrow_mut()
        .dig_mut(&keys!["a", "b"])
        .and_then(Value::as_map_mut)
        .unwrap()
        .insert(Value::from("d"), Value::Int(10));
    assert_eq!(path.read(), Value::Int(10));

    // And the reverse: edit through the path's handle.
    if let Some(v) = path.doc().borrow_mut().dig_mut(&keys!["a", "b", "d"]) {
        *v = Value::Int(20);
    }
    assert_eq!(doc.snapshot().dig(&keys!["a", "b", "d"]), Some(&Value::Int(20)));
}

#[test]
fn clones_share_the_document() {
    let doc = fixture();
    let a = KeyPath::bind(doc).unwrap().with_keys(keys!["a", "n"]);
    let b = a.clone();
    a.write(1);
    assert_eq!(b.read(), Value::Int(1));
}

#[test]
fn add_and_sub_matrix() {
    let doc = fixture();
    let base = || KeyPath::bind(doc.clone()).unwrap();

    let path = base().with_keys(keys!["a", "b"]) + "c";
    assert_eq!(path.read(), Value::Bool(true));

    let path = base().with_keys(keys!["a", "d", "x"]) - "x";
    assert_eq!(path.read(), Value::Int(5));

    let path = base().with_keys(keys!["a", "x", "b", "c"]) - "x";
    assert_eq!(path.read(), Value::Bool(true));

    let path = base() + "e" + -1;
    assert_eq!(path.read(), Value::Int(1));
}

#[test]
fn retract_matrix() {
    let doc = fixture();

    let mut path = KeyPath::bind(doc.clone())
        .unwrap()
        .with_keys(keys!["a", "d", "x"]);
    path.retract_key();
    assert_eq!(path.read(), Value::Int(5));

    let mut path = KeyPath::bind(doc.clone())
        .unwrap()
        .with_keys(keys!["a", "x", "e", "x", "y", 1]);
    path.retract_keys(keys!["a", "x", "y"]);
    assert_eq!(path.keys(), keys!["e", 1]);
    assert_eq!(path.read(), Value::Int(1));

    let mut empty = KeyPath::new();
    empty.retract_key().retract_keys(keys![]);
    assert!(empty.keys().is_empty());
}

#[test]
fn append_path_splices_keys() {
    let tail = KeyPath::from_keys(keys!["b", "c"]);
    let mut path = KeyPath::bind(fixture()).unwrap();
    path.append_key("a").append_path(&tail);
    assert_eq!(path.keys().len(), 3);
    assert_eq!(path.read(), Value::Bool(true));
}

#[test]
fn set_keys_matrix() {
    let mut path = KeyPath::bind(fixture()).unwrap();
    path.set_keys(Value::seq(["e", "0"])).unwrap();
    assert_eq!(path.read(), Value::Null);
    path.set_keys(keys!["e", 0]).unwrap();
    assert_eq!(path.read(), Value::Int(0));

    for (bad, found) in [
        (Value::from("e"), "string"),
        (Value::map([("e", 0)]), "map"),
        (Value::Null, "null"),
    ] {
        assert_eq!(
            path.set_keys(bad).unwrap_err(),
            KeyDialError::InvalidKeyList { found }
        );
    }
    assert_eq!(path.keys(), keys!["e", 0]);
}

#[test]
fn dial_on_value_matrix() {
    let path = Value::from(json!({"a": {"b": [1, 2, 3]}}))
        .dial(keys!["a", "b", -1])
        .unwrap();
    assert_eq!(path.read(), Value::Int(3));

    let path = Value::Null.dial(keys!["x"]).unwrap();
    path.write("y");
    assert_eq!(path.doc().snapshot(), Value::map([("x", "y")]));

    assert_eq!(
        Value::from(2.5).dial(keys!["x"]).unwrap_err(),
        KeyDialError::InvalidContainer { found: "float" }
    );
}
