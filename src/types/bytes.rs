//! Raw byte buffer nodes: opaque octets copied verbatim.

use crate::codec::{Kind, Schema, Size};
use crate::config::Length;
use crate::context::Context;
use crate::error::Error;
use crate::value::Value;

/// An opaque byte region with a literal, fill, or path-resolved length.
/// Unlike [`super::string::Str`], content is never validated or terminated.
#[derive(Debug, Clone)]
pub(crate) struct Buffer {
    pub(crate) length: Length,
    pub(crate) in_bytes: bool,
}

impl Buffer {
    pub(crate) fn size(&self, value: Option<&Value>, ctx: &Context) -> Result<Size, Error> {
        match &self.length {
            Length::Literal(n) => Ok(Size::Bytes(if self.in_bytes { n / 8 } else { *n })),
            Length::Path(path) => Length::resolve_count(path, ctx).map(Size::Bytes),
            Length::Fill | Length::NullTerminated => match value {
                Some(Value::Bytes(b)) => Ok(Size::Bytes(b.len())),
                Some(other) => Err(ctx.error(format!("Invalid value {other} for a buffer"))),
                None => match ctx.buffer {
                    Some(b) => Ok(Size::Bytes(b.len())),
                    None => Ok(Size::Unknown),
                },
            },
        }
    }

    pub(crate) fn decode(&self, data: &[u8], ctx: &Context) -> Result<Value, Error> {
        let span = match self.size(None, ctx)? {
            Size::Bytes(n) => n,
            Size::Unknown => data.len(),
        };
        if data.len() < span {
            return Err(ctx.error(format!(
                "Not enough space to decode {span}-byte buffer, missing {} byte(s)",
                span - data.len()
            )));
        }
        Ok(Value::Bytes(data[..span].to_vec()))
    }

    pub(crate) fn encode(&self, value: &Value, data: &mut [u8], ctx: &Context) -> Result<(), Error> {
        let Value::Bytes(b) = value else {
            return Err(ctx.error(format!("Invalid value {value} for a buffer")));
        };
        if b.len() != data.len() {
            return Err(ctx.error(format!(
                "Buffer length {} does not match expected length {}",
                b.len(),
                data.len()
            )));
        }
        data.copy_from_slice(b);
        Ok(())
    }
}

/// An opaque byte buffer node. The length is a byte count, [`Length::Fill`],
/// or a path to a sibling carrying the count.
pub fn buffer(length: impl Into<Length>) -> Schema {
    Schema::new(Kind::Buffer(Buffer {
        length: length.into(),
        in_bytes: false,
    }))
}
