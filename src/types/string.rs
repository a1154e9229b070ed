//! UTF-8 string nodes with literal, fill, null-terminated, or
//! path-resolved lengths.

use crate::codec::{Kind, Schema, Size};
use crate::config::Length;
use crate::context::Context;
use crate::error::Error;
use crate::value::Value;

/// A UTF-8 string occupying a span determined by its length policy. No
/// length prefix is ever written; a dynamic length must be recoverable from
/// the policy itself (terminator, enclosing span, or a sibling field).
#[derive(Debug, Clone)]
pub(crate) struct Str {
    pub(crate) length: Length,
    pub(crate) in_bytes: bool,
}

impl Str {
    pub(crate) fn size(&self, value: Option<&Value>, ctx: &Context) -> Result<Size, Error> {
        match &self.length {
            Length::Literal(n) => Ok(Size::Bytes(if self.in_bytes { n / 8 } else { *n })),
            Length::Path(path) => Length::resolve_count(path, ctx).map(Size::Bytes),
            Length::Fill => match value {
                Some(Value::String(s)) => Ok(Size::Bytes(s.len())),
                Some(other) => Err(ctx.error(format!("Invalid value {other} for a string"))),
                None => match ctx.buffer {
                    Some(b) => Ok(Size::Bytes(b.len())),
                    None => Ok(Size::Unknown),
                },
            },
            Length::NullTerminated => match value {
                Some(Value::String(s)) => {
                    let bytes = s.as_bytes();
                    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
                    Ok(Size::Bytes(end + 1))
                }
                Some(other) => Err(ctx.error(format!("Invalid value {other} for a string"))),
                None => match ctx.buffer {
                    // A buffer without a terminator sizes one byte past its
                    // end, which surfaces as a not-enough-space error.
                    Some(buf) => {
                        let end = buf.iter().position(|&x| x == 0).unwrap_or(buf.len());
                        Ok(Size::Bytes(end + 1))
                    }
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
                "Not enough space to decode {span}-byte string, missing {} byte(s)",
                span - data.len()
            )));
        }
        let raw = &data[..span];
        let content = match self.length {
            Length::NullTerminated => &raw[..span - 1],
            _ => raw,
        };
        match std::str::from_utf8(content) {
            Ok(s) => Ok(Value::String(s.to_string())),
            Err(_) => Err(ctx.error(format!("Invalid UTF-8 in {span}-byte string"))),
        }
    }

    pub(crate) fn encode(&self, value: &Value, data: &mut [u8], ctx: &Context) -> Result<(), Error> {
        let Value::String(s) = value else {
            return Err(ctx.error(format!("Invalid value {value} for a string")));
        };
        let bytes = s.as_bytes();
        match self.length {
            Length::NullTerminated => {
                // Content past an interior terminator can never be read
                // back, so it is dropped rather than written.
                let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
                data[..end].copy_from_slice(&bytes[..end]);
                data[end] = 0;
            }
            _ => {
                let span = data.len();
                if bytes.len() != span {
                    return Err(ctx.error(format!(
                        "String \"{s}\" wrong length to encode into {span} bits"
                    )));
                }
                data.copy_from_slice(bytes);
            }
        }
        Ok(())
    }
}

/// A UTF-8 string node. The length is a byte count, [`Length::Fill`],
/// [`Length::NullTerminated`], or a path to a sibling carrying the count.
pub fn string(length: impl Into<Length>) -> Schema {
    Schema::new(Kind::Str(Str {
        length: length.into(),
        in_bytes: false,
    }))
}
