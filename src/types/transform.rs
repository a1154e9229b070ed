//! User transform nodes.
//!
//! A transform wraps any node with a pair of callbacks mapping between the
//! structural value (what the bytes say) and the logical value (what the
//! caller works with). Structurally the wrapper is invisible: size, decode,
//! and encode all pass straight through to the inner node. Transforms nest;
//! decode-side callbacks run innermost first and encode-side callbacks run
//! outermost first, so a stacked pipeline always unwinds in reverse.

use crate::codec::{Schema, TransformFn};
use crate::context::Context;
use crate::error::Error;
use crate::value::Value;

pub(crate) struct Transform {
    pub(crate) inner: Schema,
    pub(crate) after_decode: TransformFn,
    pub(crate) before_encode: TransformFn,
}

impl Clone for Transform {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            after_decode: self.after_decode.clone(),
            before_encode: self.before_encode.clone(),
        }
    }
}

/// Runs one user callback. A library [`Error`] returned by the callback
/// passes through untouched so resolution failures keep their path and
/// offset; anything else is wrapped.
pub(crate) fn run_transform(
    callback: &TransformFn,
    value: Value,
    ctx: &Context,
) -> Result<Value, Error> {
    match callback(value, ctx) {
        Ok(mapped) => Ok(mapped),
        Err(raw) => match raw.downcast::<Error>() {
            Ok(err) => Err(*err),
            Err(other) => Err(ctx.error(format!("Failed to transform: {other}"))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;
    use crate::types::{object, string, uint8, uint32};
    use crate::Length;

    #[test]
    fn test_roundtrip_mapping() {
        let schema = uint32().transform(
            |v, _| Ok(Value::from(format!("{v} minutes"))),
            |v, _| match v.as_str().and_then(|s| s.strip_suffix(" minutes")) {
                Some(n) => Ok(Value::Int(n.parse::<i128>()?)),
                None => Err("expected a minutes string".into()),
            },
        );
        let bytes = schema.to_buffer(Value::from("90 minutes")).unwrap();
        assert_eq!(bytes, vec![90, 0, 0, 0]);
        assert_eq!(
            schema.from_buffer(&bytes).unwrap(),
            Value::from("90 minutes")
        );
    }

    #[test]
    fn test_error_wrapping() {
        let schema = uint8().transform(
            |_, _| Err("boom".into()),
            |v, _| Ok(v),
        );
        let err = schema.from_buffer(&[1]).unwrap_err();
        assert_eq!(err.to_string(), "Failed to transform: boom");
    }

    #[test]
    fn test_library_error_passes_through() {
        // A resolution error raised inside a callback keeps its own
        // message instead of getting the transform prefix.
        let schema = object([
            ("a", uint8()),
            (
                "b",
                uint8().transform(
                    |v, ctx| {
                        ctx.resolve(&path!["missing"])?;
                        Ok(v)
                    },
                    |v, _| Ok(v),
                ),
            ),
        ]);
        let err = schema.from_buffer(&[1, 2]).unwrap_err();
        assert!(err.to_string().contains("key not found"), "{err}");
    }

    #[test]
    fn test_nested_transforms_unwind_in_reverse() {
        let schema = uint8()
            .transform(
                |v, _| Ok(Value::Int(v.as_int().unwrap_or(0) + 1)),
                |v, _| Ok(Value::Int(v.as_int().unwrap_or(0) - 1)),
            )
            .transform(
                |v, _| Ok(Value::Int(v.as_int().unwrap_or(0) * 10)),
                |v, _| Ok(Value::Int(v.as_int().unwrap_or(0) / 10)),
            );
        // decode: (5 + 1) * 10; encode reverses it.
        assert_eq!(schema.from_buffer(&[5]).unwrap(), Value::Int(60));
        assert_eq!(schema.to_buffer(Value::Int(60)).unwrap(), vec![5]);
    }

    #[test]
    fn test_sibling_resolution_in_callback() {
        // A transform on a later field can read an earlier field's decoded
        // value through the context.
        let schema = object([
            ("scale", uint8()),
            (
                "value",
                uint8().transform(
                    |v, ctx| {
                        let scale = ctx.resolve(&path!["scale"])?.as_int().unwrap_or(1);
                        Ok(Value::Int(v.as_int().unwrap_or(0) * scale))
                    },
                    |v, ctx| {
                        let scale = ctx.resolve(&path!["scale"])?.as_int().unwrap_or(1);
                        Ok(Value::Int(v.as_int().unwrap_or(0) / scale))
                    },
                ),
            ),
        ]);
        let decoded = schema.from_buffer(&[4, 3]).unwrap();
        assert_eq!(
            decoded,
            Value::object([("scale", Value::Int(4)), ("value", Value::Int(12))])
        );
        let bytes = schema.to_buffer(decoded).unwrap();
        assert_eq!(bytes, vec![4, 3]);
    }

    // Sibling transforms currently run in declaration order, but the order
    // of side effects across siblings is not part of the contract; callbacks
    // must only depend on their input value and resolved (structural)
    // sibling values.
    #[test]
    fn test_sibling_transforms_all_run() {
        use std::sync::atomic::{AtomicU32, Ordering};
        use std::sync::Arc;

        let hits = Arc::new(AtomicU32::new(0));
        let (h1, h2) = (hits.clone(), hits.clone());
        let schema = object([
            (
                "a",
                uint8().transform(
                    move |v, _| {
                        h1.fetch_add(1, Ordering::Relaxed);
                        Ok(v)
                    },
                    |v, _| Ok(v),
                ),
            ),
            (
                "b",
                uint8().transform(
                    move |v, _| {
                        h2.fetch_add(1, Ordering::Relaxed);
                        Ok(v)
                    },
                    |v, _| Ok(v),
                ),
            ),
        ]);
        schema.from_buffer(&[1, 2]).unwrap();
        assert_eq!(hits.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_transform_on_string() {
        let schema = string(Length::NullTerminated).transform(
            |v, _| Ok(Value::from(v.to_string().to_uppercase())),
            |v, _| Ok(Value::from(v.to_string().to_lowercase())),
        );
        let bytes = schema.to_buffer(Value::from("HELLO")).unwrap();
        assert_eq!(bytes, b"hello\0".to_vec());
        assert_eq!(schema.from_buffer(&bytes).unwrap(), Value::from("HELLO"));
    }
}
