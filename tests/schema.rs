//! End-to-end tests over composite schemas.

use binschema::{
    array, boolean, buffer, enumeration, object, path, string, uint16, uint32, uint8, Length,
    Value,
};

/// A header-plus-payload layout in the shape of a small network packet:
/// fixed magic, version enum, big-endian fields, and a length-prefixed body.
fn packet() -> binschema::Schema {
    object([
        ("magic", buffer(2)),
        ("version", enumeration(uint8(), ["V1", "V2"])),
        ("flags", boolean()),
        ("sequence", uint32().be()),
        ("body_len", uint16()),
        ("body", buffer(Length::from(path!["body_len"]))),
    ])
}

fn sample() -> Value {
    Value::object([
        ("magic", Value::Bytes(vec![0xCA, 0xFE])),
        ("version", Value::from("V2")),
        ("flags", Value::Bool(true)),
        ("sequence", Value::Int(0x01020304)),
        ("body_len", Value::Int(3)),
        ("body", Value::Bytes(vec![9, 8, 7])),
    ])
}

#[test]
fn test_packet_layout() {
    let bytes = packet().to_buffer(sample()).unwrap();
    assert_eq!(
        bytes,
        vec![0xCA, 0xFE, 1, 1, 1, 2, 3, 4, 3, 0, 9, 8, 7]
    );
}

#[test]
fn test_packet_roundtrip() {
    let bytes = packet().to_buffer(sample()).unwrap();
    assert_eq!(packet().from_buffer(&bytes).unwrap(), sample());
}

#[test]
fn test_concatenated_records() {
    let record = object([("id", uint8()), ("name", string(Length::NullTerminated))]);
    let a = Value::object([("id", Value::Int(1)), ("name", Value::from("ada"))]);
    let b = Value::object([("id", Value::Int(2)), ("name", Value::from("bob"))]);
    let mut stream = record.to_buffer(a.clone()).unwrap();
    let first_len = stream.len();
    stream.extend(record.to_buffer(b.clone()).unwrap());
    assert_eq!(record.from_buffer(&stream).unwrap(), a);
    assert_eq!(record.from_buffer_at(&stream, first_len).unwrap(), b);
}

#[test]
fn test_parent_reference_across_nesting() {
    // Elements of a nested array size themselves from a field of the
    // enclosing object, reached through the parent sentinel.
    let schema = object([
        ("width", uint8()),
        (
            "rows",
            array(string(Length::from(path!["^", "width"])), Length::Fill),
        ),
    ]);
    let value = Value::object([
        ("width", Value::Int(2)),
        (
            "rows",
            Value::Array(vec![Value::from("ab"), Value::from("cd")]),
        ),
    ]);
    let bytes = schema.to_buffer(value.clone()).unwrap();
    assert_eq!(bytes, vec![2, b'a', b'b', b'c', b'd']);
    assert_eq!(schema.from_buffer(&bytes).unwrap(), value);
}

#[test]
fn test_root_reference() {
    let schema = object([
        ("len", uint8()),
        (
            "nested",
            object([
                ("pad", uint8()),
                ("data", buffer(Length::from(path!["~", "len"]))),
            ]),
        ),
    ]);
    let value = Value::object([
        ("len", Value::Int(2)),
        (
            "nested",
            Value::object([
                ("pad", Value::Int(0)),
                ("data", Value::Bytes(vec![5, 6])),
            ]),
        ),
    ]);
    let bytes = schema.to_buffer(value.clone()).unwrap();
    assert_eq!(bytes, vec![2, 0, 5, 6]);
    assert_eq!(schema.from_buffer(&bytes).unwrap(), value);
}

#[test]
fn test_forward_reference_fails_both_directions() {
    let schema = object([
        ("a", array(uint8(), Length::from(path!["b"]))),
        ("b", uint8()),
    ]);
    let expected = "Failed to resolve .b on { a, b } from element a, \
                    you can only reference keys defined before the current one.";
    let value = Value::object([
        ("a", Value::Array(vec![Value::Int(1)])),
        ("b", Value::Int(1)),
    ]);
    let err = schema.to_buffer(value).unwrap_err();
    assert_eq!(err.to_string(), expected);
    let err = schema.from_buffer(&[1, 1]).unwrap_err();
    assert_eq!(err.to_string(), expected);
}

#[test]
fn test_invalid_length_reference() {
    let schema = object([("len", string(Length::NullTerminated)), ("data", buffer(Length::from(path!["len"])))]);
    let value = Value::object([
        ("len", Value::from("two")),
        ("data", Value::Bytes(vec![1, 2])),
    ]);
    let err = schema.to_buffer(value).unwrap_err();
    assert_eq!(err.to_string(), "Invalid length two resolved from .len");
}

#[test]
fn test_error_carries_location() {
    let schema = packet();
    // Truncate inside the body.
    let bytes = packet().to_buffer(sample()).unwrap();
    let err = schema.from_buffer(&bytes[..bytes.len() - 1]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Not enough space to decode object key body, missing 1 byte(s)"
    );
    assert_eq!(err.path(), ".body");
    assert_eq!(err.offset(), 10);
}
