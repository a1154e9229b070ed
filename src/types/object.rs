//! Ordered object nodes, the workhorse container.
//!
//! Fields are laid out strictly in declaration order. While decoding, the
//! fields read so far are kept in a partial value that later siblings can
//! reach through path resolution, which is the mechanism behind
//! length-prefixed layouts (`{ len: uint8, data: buffer(path!["len"]) }`).

use std::collections::BTreeMap;

use crate::codec::{Kind, Schema, Size};
use crate::context::{Container, Context, Segment};
use crate::error::Error;
use crate::value::Value;

/// An ordered set of named fields. Order is declaration order, never key
/// order, so the wire layout matches the declaration top to bottom.
#[derive(Debug, Clone)]
pub(crate) struct Object {
    pub(crate) fields: Vec<(String, Schema)>,
}

impl Object {
    pub(crate) fn size(&self, value: Option<&Value>, ctx: &Context) -> Result<Size, Error> {
        let map = match value {
            Some(Value::Object(map)) => Some(map),
            Some(other) => return Err(ctx.error(format!("Invalid value {other} for an object"))),
            None => None,
        };
        let mut total = 0;
        for (key, field) in &self.fields {
            let window = ctx.buffer.map(|b| &b[total.min(b.len())..]);
            let field_ctx = ctx.child(
                Segment::Key(key.clone()),
                Container::Object(&self.fields),
                value,
                window,
                ctx.offset + total,
            );
            let field_value = map.and_then(|m| m.get(key));
            match field.size(field_value, &field_ctx)? {
                Size::Bytes(n) => total += n,
                Size::Unknown => return Ok(Size::Unknown),
            }
        }
        Ok(Size::Bytes(total))
    }

    pub(crate) fn decode(&self, data: &[u8], ctx: &Context) -> Result<Value, Error> {
        let mut partial = Value::Object(BTreeMap::new());
        let mut offset = 0;
        for (key, field) in &self.fields {
            let window = data.get(offset..).unwrap_or(&[]);
            let field_ctx = ctx.child(
                Segment::Key(key.clone()),
                Container::Object(&self.fields),
                Some(&partial),
                Some(window),
                ctx.offset + offset,
            );
            let step = match field.size(None, &field_ctx)? {
                Size::Bytes(n) => {
                    if n > window.len() {
                        return Err(field_ctx.error(format!(
                            "Not enough space to decode object key {key}, missing {} byte(s)",
                            n - window.len()
                        )));
                    }
                    n
                }
                // A field that cannot bound itself takes everything left.
                Size::Unknown => window.len(),
            };
            let decoded = field.decode(&window[..step], &field_ctx)?;
            drop(field_ctx);
            if let Value::Object(map) = &mut partial {
                map.insert(key.clone(), decoded);
            }
            offset += step;
        }
        Ok(partial)
    }

    pub(crate) fn encode(&self, value: &Value, data: &mut [u8], ctx: &Context) -> Result<(), Error> {
        let Value::Object(map) = value else {
            return Err(ctx.error(format!("Invalid value {value} for an object")));
        };
        let mut offset = 0;
        for (key, field) in &self.fields {
            // An absent or undefined entry is only legal for zero-width
            // marker fields; keys outside the declaration are ignored.
            let field_value = map.get(key).filter(|v| !matches!(v, Value::Undefined));
            let field_ctx = ctx.child(
                Segment::Key(key.clone()),
                Container::Object(&self.fields),
                Some(value),
                None,
                ctx.offset + offset,
            );
            let field_value = match field_value {
                Some(v) => v,
                None if field.is_undefined() => continue,
                None => {
                    return Err(field_ctx.error(format!("Missing value for field {key}")));
                }
            };
            let step = match field.size(Some(field_value), &field_ctx)? {
                Size::Bytes(n) => n,
                Size::Unknown => {
                    return Err(field_ctx.error("Failed to determine encoded size"));
                }
            };
            let window = data
                .get_mut(offset..offset + step)
                .ok_or_else(|| {
                    field_ctx.error(format!("Not enough space to encode object key {key}"))
                })?;
            field.encode(field_value, window, &field_ctx)?;
            offset += step;
        }
        Ok(())
    }

    pub(crate) fn after_decode(&self, value: Value, ctx: &Context) -> Result<Value, Error> {
        let Value::Object(mut map) = value else {
            return Ok(value);
        };
        let snapshot = Value::Object(map.clone());
        let mut out = BTreeMap::new();
        for (key, field) in &self.fields {
            let Some(field_value) = map.remove(key) else {
                continue;
            };
            let field_ctx = ctx.child(
                Segment::Key(key.clone()),
                Container::Object(&self.fields),
                Some(&snapshot),
                None,
                ctx.offset,
            );
            out.insert(key.clone(), field.after_decode(field_value, &field_ctx)?);
        }
        Ok(Value::Object(out))
    }

    pub(crate) fn before_encode(&self, value: Value, ctx: &Context) -> Result<Value, Error> {
        let Value::Object(mut map) = value else {
            return Err(ctx.error(format!("Invalid value {value} for an object")));
        };
        let snapshot = Value::Object(map.clone());
        let mut out = BTreeMap::new();
        for (key, field) in &self.fields {
            let Some(field_value) = map.remove(key) else {
                continue;
            };
            let field_ctx = ctx.child(
                Segment::Key(key.clone()),
                Container::Object(&self.fields),
                Some(&snapshot),
                None,
                ctx.offset,
            );
            out.insert(key.clone(), field.before_encode(field_value, &field_ctx)?);
        }
        Ok(Value::Object(out))
    }
}

/// An ordered object node. Field order is the declaration order of `fields`
/// and fixes the wire layout.
pub fn object<K: Into<String>, I: IntoIterator<Item = (K, Schema)>>(fields: I) -> Schema {
    Schema::new(Kind::Object(Object {
        fields: fields
            .into_iter()
            .map(|(key, schema)| (key.into(), schema))
            .collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;
    use crate::types::{array, boolean, float, string, uint16, uint8, undefined};
    use crate::Length;

    fn person() -> Schema {
        object([
            ("age", uint8()),
            ("alive", boolean()),
            ("name", string(Length::NullTerminated)),
        ])
    }

    #[test]
    fn test_roundtrip() {
        let schema = person();
        let value = Value::object([
            ("age", Value::Int(35)),
            ("alive", Value::Bool(true)),
            ("name", Value::from("ada")),
        ]);
        let bytes = schema.to_buffer(value.clone()).unwrap();
        assert_eq!(bytes, vec![35, 1, b'a', b'd', b'a', 0]);
        assert_eq!(schema.from_buffer(&bytes).unwrap(), value);
    }

    #[test]
    fn test_declaration_order_fixes_layout() {
        // Insertion into the value map in any order encodes identically.
        let schema = object([("a", uint8()), ("b", uint8())]);
        let value = Value::object([("b", Value::Int(2)), ("a", Value::Int(1))]);
        assert_eq!(schema.to_buffer(value).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_missing_field() {
        let schema = object([("a", uint8()), ("b", uint8())]);
        let value = Value::object([("a", Value::Int(1))]);
        let err = schema.to_buffer(value).unwrap_err();
        assert_eq!(err.to_string(), "Missing value for field b");
    }

    #[test]
    fn test_extra_keys_ignored() {
        let schema = object([("a", uint8())]);
        let value = Value::object([("a", Value::Int(1)), ("zz", Value::Int(9))]);
        assert_eq!(schema.to_buffer(value).unwrap(), vec![1]);
    }

    #[test]
    fn test_undefined_field_may_be_absent() {
        let schema = object([("a", uint8()), ("marker", undefined())]);
        let value = Value::object([("a", Value::Int(1))]);
        assert_eq!(schema.to_buffer(value.clone()).unwrap(), vec![1]);
        let decoded = schema.from_buffer(&[1]).unwrap();
        assert_eq!(
            decoded,
            Value::object([("a", Value::Int(1)), ("marker", Value::Undefined)])
        );
    }

    #[test]
    fn test_not_enough_space_names_key() {
        let schema = object([("a", uint8()), ("c", float())]);
        let err = schema.from_buffer(&[1]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Not enough space to decode object key c, missing 4 byte(s)"
        );
    }

    #[test]
    fn test_fill_field_not_last() {
        // A fill field that is not last absorbs everything remaining, so
        // the field after it starves.
        let schema = object([("head", string(Length::Fill)), ("tail", uint8())]);
        let err = schema.from_buffer(&[b'h', b'i', 7]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Not enough space to decode object key tail, missing 1 byte(s)"
        );
    }

    #[test]
    fn test_first_fill_field_takes_everything() {
        let schema = object([
            ("head", string(Length::Fill)),
            ("rest", string(Length::Fill)),
        ]);
        let decoded = schema.from_buffer(b"abc").unwrap();
        assert_eq!(
            decoded,
            Value::object([("head", Value::from("abc")), ("rest", Value::from(""))])
        );
    }

    #[test]
    fn test_length_prefixed_layout() {
        let schema = object([
            ("len", uint8()),
            ("items", array(uint16(), Length::from(path!["len"]))),
        ]);
        let value = Value::object([
            ("len", Value::Int(2)),
            (
                "items",
                Value::Array(vec![Value::Int(1), Value::Int(2)]),
            ),
        ]);
        let bytes = schema.to_buffer(value.clone()).unwrap();
        assert_eq!(bytes, vec![2, 1, 0, 2, 0]);
        assert_eq!(schema.from_buffer(&bytes).unwrap(), value);
    }

    #[test]
    fn test_nested_objects() {
        let schema = object([
            ("outer", uint8()),
            ("inner", object([("x", uint8()), ("y", uint8())])),
        ]);
        let value = Value::object([
            ("outer", Value::Int(1)),
            (
                "inner",
                Value::object([("x", Value::Int(2)), ("y", Value::Int(3))]),
            ),
        ]);
        let bytes = schema.to_buffer(value.clone()).unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
        assert_eq!(schema.from_buffer(&bytes).unwrap(), value);
    }

    #[test]
    fn test_invalid_value() {
        let err = person().to_buffer(Value::Int(1)).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value 1 for an object");
    }

    #[test]
    fn test_error_offset_points_at_failing_field() {
        let schema = object([("a", uint16()), ("b", boolean())]);
        let err = schema.from_buffer(&[1, 0, 9]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value 9 for a boolean");
        assert_eq!(err.offset(), 2);
        assert_eq!(err.path(), ".b");
    }
}
