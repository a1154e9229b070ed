//! Homogeneous array nodes.
//!
//! Elements are laid out back to back with no count prefix or separators.
//! On the decode side the span is carved element by element: each element's
//! size is computed against the bytes remaining in the array's span, which
//! is what lets variable-size elements (null-terminated strings, nested
//! path-sized regions) pack without any framing.

use crate::codec::{Kind, Schema, Size};
use crate::config::Length;
use crate::context::{Container, Context, Segment};
use crate::error::Error;
use crate::value::Value;

/// An array of a single element schema. The length policy counts elements;
/// with [`Schema::bytes`] a literal length counts bits of the whole span
/// instead.
#[derive(Debug, Clone)]
pub(crate) struct Array {
    pub(crate) schema: Schema,
    pub(crate) length: Length,
    pub(crate) in_bytes: bool,
}

impl Array {
    pub(crate) fn size(&self, value: Option<&Value>, ctx: &Context) -> Result<Size, Error> {
        let own_count = match value {
            Some(Value::Array(items)) => Some(items.len()),
            Some(other) => return Err(ctx.error(format!("Invalid value {other} for an array"))),
            None => None,
        };
        match &self.length {
            Length::Literal(n) if self.in_bytes => Ok(Size::Bytes(n / 8)),
            Length::Literal(n) => self.span_of(*n, value, ctx),
            Length::Path(path) => {
                let count = Length::resolve_count(path, ctx)?;
                self.span_of(count, value, ctx)
            }
            Length::Fill | Length::NullTerminated => match own_count {
                Some(count) => self.span_of(count, value, ctx),
                None => match ctx.buffer {
                    Some(b) => Ok(Size::Bytes(b.len())),
                    None => Ok(Size::Unknown),
                },
            },
        }
    }

    /// Sums `count` element sizes. With a value in hand each element sizes
    /// against its own entry; without one the elements are probed against
    /// the buffer, advancing a window as each size resolves.
    fn span_of(
        &self,
        count: usize,
        value: Option<&Value>,
        ctx: &Context,
    ) -> Result<Size, Error> {
        let items = match value {
            Some(Value::Array(items)) => Some(items.as_slice()),
            _ => None,
        };
        let mut total = 0;
        for i in 0..count {
            let element = items.and_then(|items| items.get(i));
            let window = ctx.buffer.map(|b| &b[total.min(b.len())..]);
            let elem_ctx = ctx.child(
                Segment::Index(i),
                Container::Array,
                value,
                window,
                ctx.offset + total,
            );
            match self.schema.size(element, &elem_ctx)? {
                Size::Bytes(n) => total += n,
                Size::Unknown => return Ok(Size::Unknown),
            }
        }
        Ok(Size::Bytes(total))
    }

    pub(crate) fn decode(&self, data: &[u8], ctx: &Context) -> Result<Value, Error> {
        let span = match self.size(None, ctx)? {
            Size::Bytes(n) => n,
            Size::Unknown => data.len(),
        };
        // Short data is not capped here: elements fail with their own
        // not-enough-space errors at the exact index that overruns.
        let end = span.min(data.len());
        let mut items = Value::Array(Vec::new());
        let mut offset = 0;
        let mut index = 0;
        while offset < span {
            let window = data.get(offset..end).unwrap_or(&[]);
            let elem_ctx = ctx.child(
                Segment::Index(index),
                Container::Array,
                Some(&items),
                Some(window),
                ctx.offset + offset,
            );
            let step = match self.schema.size(None, &elem_ctx)? {
                Size::Bytes(n) => n,
                Size::Unknown => span - offset,
            };
            let element = self.schema.decode(window, &elem_ctx)?;
            drop(elem_ctx);
            if let Value::Array(v) = &mut items {
                v.push(element);
            }
            index += 1;
            if step == 0 {
                break;
            }
            offset += step;
        }
        Ok(items)
    }

    pub(crate) fn encode(&self, value: &Value, data: &mut [u8], ctx: &Context) -> Result<(), Error> {
        let Value::Array(items) = value else {
            return Err(ctx.error(format!("Invalid value {value} for an array")));
        };
        let span = data.len();
        let mut offset = 0;
        for (i, element) in items.iter().enumerate() {
            let elem_ctx = ctx.child(
                Segment::Index(i),
                Container::Array,
                Some(value),
                None,
                ctx.offset + offset,
            );
            let step = match self.schema.size(Some(element), &elem_ctx)? {
                Size::Bytes(n) => n,
                Size::Unknown => {
                    return Err(elem_ctx.error("Failed to determine encoded size"))
                }
            };
            if offset + step > span {
                return Err(ctx.error(format!(
                    "Array length {} is larger than expected length",
                    items.len()
                )));
            }
            self.schema
                .encode(element, &mut data[offset..offset + step], &elem_ctx)?;
            offset += step;
        }
        if offset < span {
            return Err(ctx.error(format!(
                "Array length {} is smaller than expected length",
                items.len()
            )));
        }
        Ok(())
    }

    pub(crate) fn after_decode(&self, value: Value, ctx: &Context) -> Result<Value, Error> {
        let Value::Array(items) = value else {
            return Ok(value);
        };
        let snapshot = Value::Array(items.clone());
        let mut out = Vec::with_capacity(items.len());
        for (i, element) in items.into_iter().enumerate() {
            let elem_ctx = ctx.child(
                Segment::Index(i),
                Container::Array,
                Some(&snapshot),
                None,
                ctx.offset,
            );
            out.push(self.schema.after_decode(element, &elem_ctx)?);
        }
        Ok(Value::Array(out))
    }

    pub(crate) fn before_encode(&self, value: Value, ctx: &Context) -> Result<Value, Error> {
        let Value::Array(items) = value else {
            return Err(ctx.error(format!("Invalid value {value} for an array")));
        };
        let snapshot = Value::Array(items.clone());
        let mut out = Vec::with_capacity(items.len());
        for (i, element) in items.into_iter().enumerate() {
            let elem_ctx = ctx.child(
                Segment::Index(i),
                Container::Array,
                Some(&snapshot),
                None,
                ctx.offset,
            );
            out.push(self.schema.before_encode(element, &elem_ctx)?);
        }
        Ok(Value::Array(out))
    }
}

/// An array node of `schema` elements. The length counts elements: a
/// literal count, [`Length::Fill`] to pack the remaining span, or a path to
/// a sibling carrying the count.
pub fn array(schema: Schema, length: impl Into<Length>) -> Schema {
    Schema::new(Kind::Array(Box::new(Array {
        schema,
        length: length.into(),
        in_bytes: false,
    })))
}
