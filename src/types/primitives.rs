//! Fixed-size primitive nodes: booleans, multi-byte integers, floats, and
//! the zero-width undefined marker.
//!
//! Integer nodes of one, two, and four bytes share the [`Number`] codec;
//! eight-byte integers always go through the dedicated [`Int64`] codec so
//! the full `u64`/`i64` ranges round-trip exactly.

use bytes::{Buf, BufMut};

use crate::codec::{Kind, Schema, Size};
use crate::context::Context;
use crate::error::Error;
use crate::value::Value;

/// A single-byte boolean: `0` is false, `1` is true, anything else is a
/// decode error.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Bool;

impl Bool {
    pub(crate) fn size(&self) -> Result<Size, Error> {
        Ok(Size::Bytes(1))
    }

    pub(crate) fn decode(&self, data: &[u8], ctx: &Context) -> Result<Value, Error> {
        match data.first() {
            None => Err(ctx.error("Not enough space to decode boolean, missing 1 byte(s)")),
            Some(0) => Ok(Value::Bool(false)),
            Some(1) => Ok(Value::Bool(true)),
            Some(v) => Err(ctx.error(format!("Invalid value {v} for a boolean"))),
        }
    }

    pub(crate) fn encode(&self, value: &Value, data: &mut [u8], ctx: &Context) -> Result<(), Error> {
        match value {
            Value::Bool(v) => {
                data[0] = u8::from(*v);
                Ok(())
            }
            other => Err(ctx.error(format!("Invalid value {other} for a boolean"))),
        }
    }
}

/// An integer or float of one, two, or four bytes. Little-endian unless
/// flipped with [`Schema::be`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct Number {
    pub(crate) bytes: usize,
    pub(crate) signed: bool,
    pub(crate) floating: bool,
    pub(crate) big_endian: bool,
}

impl Number {
    fn bits(&self) -> usize {
        self.bytes * 8
    }

    pub(crate) fn size(&self) -> Result<Size, Error> {
        Ok(Size::Bytes(self.bytes))
    }

    pub(crate) fn decode(&self, data: &[u8], ctx: &Context) -> Result<Value, Error> {
        if data.len() < self.bytes {
            return Err(ctx.error(format!(
                "Not enough space to decode {}-byte number, missing {} byte(s)",
                self.bytes,
                self.bytes - data.len()
            )));
        }
        let mut buf = &data[..self.bytes];
        if self.floating {
            let v = match (self.bytes, self.big_endian) {
                (4, false) => buf.get_f32_le() as f64,
                (4, true) => buf.get_f32() as f64,
                (_, false) => buf.get_f64_le(),
                (_, true) => buf.get_f64(),
            };
            return Ok(Value::Float(v));
        }
        let v = match (self.signed, self.big_endian) {
            (true, false) => buf.get_int_le(self.bytes) as i128,
            (true, true) => buf.get_int(self.bytes) as i128,
            (false, false) => buf.get_uint_le(self.bytes) as i128,
            (false, true) => buf.get_uint(self.bytes) as i128,
        };
        Ok(Value::Int(v))
    }

    pub(crate) fn encode(&self, value: &Value, data: &mut [u8], ctx: &Context) -> Result<(), Error> {
        if self.floating {
            return self.encode_float(value, data, ctx);
        }
        let int = integer_operand(value, self.bits(), ctx)?;
        let bits = self.bits();
        let (min, max) = if self.signed {
            (-(1i128 << (bits - 1)), (1i128 << (bits - 1)) - 1)
        } else {
            (0, (1i128 << bits) - 1)
        };
        if int < min || int > max {
            return Err(ctx.error(format!(
                "Value {int} is out of range for {bits}-bit {} integer",
                if self.signed { "signed" } else { "unsigned" }
            )));
        }
        let mut out = &mut data[..self.bytes];
        match (self.signed, self.big_endian) {
            (true, false) => out.put_int_le(int as i64, self.bytes),
            (true, true) => out.put_int(int as i64, self.bytes),
            (false, false) => out.put_uint_le(int as u64, self.bytes),
            (false, true) => out.put_uint(int as u64, self.bytes),
        }
        Ok(())
    }

    fn encode_float(&self, value: &Value, data: &mut [u8], ctx: &Context) -> Result<(), Error> {
        let bits = self.bits();
        let v = match value {
            Value::Float(v) => *v,
            Value::Int(v) => *v as f64,
            other => {
                return Err(ctx.error(format!(
                    "Invalid value {other} for a {bits}-bit floating point number"
                )))
            }
        };
        check_finite(v, bits, ctx)?;
        if self.bytes == 4 && v.abs() > f32::MAX as f64 {
            return Err(ctx.error(format!(
                "Value {v} is out of range for 32-bit floating point number"
            )));
        }
        let mut out = &mut data[..self.bytes];
        match (self.bytes, self.big_endian) {
            (4, false) => out.put_f32_le(v as f32),
            (4, true) => out.put_f32(v as f32),
            (_, false) => out.put_f64_le(v),
            (_, true) => out.put_f64(v),
        }
        Ok(())
    }
}

/// An eight-byte integer covering the full `i64`/`u64` range.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Int64 {
    pub(crate) signed: bool,
    pub(crate) big_endian: bool,
}

impl Int64 {
    pub(crate) fn size(&self) -> Result<Size, Error> {
        Ok(Size::Bytes(8))
    }

    pub(crate) fn decode(&self, data: &[u8], ctx: &Context) -> Result<Value, Error> {
        if data.len() < 8 {
            return Err(ctx.error(format!(
                "Not enough space to decode 8-byte number, missing {} byte(s)",
                8 - data.len()
            )));
        }
        let mut buf = &data[..8];
        let v = match (self.signed, self.big_endian) {
            (true, false) => buf.get_i64_le() as i128,
            (true, true) => buf.get_i64() as i128,
            (false, false) => buf.get_u64_le() as i128,
            (false, true) => buf.get_u64() as i128,
        };
        Ok(Value::Int(v))
    }

    pub(crate) fn encode(&self, value: &Value, data: &mut [u8], ctx: &Context) -> Result<(), Error> {
        let int = integer_operand(value, 64, ctx)?;
        let (min, max) = if self.signed {
            (i64::MIN as i128, i64::MAX as i128)
        } else {
            (0, u64::MAX as i128)
        };
        if int < min || int > max {
            return Err(ctx.error(format!(
                "Value {int} is out of range for 64-bit {} integer",
                if self.signed { "signed" } else { "unsigned" }
            )));
        }
        let mut out = &mut data[..8];
        match (self.signed, self.big_endian) {
            (true, false) => out.put_i64_le(int as i64),
            (true, true) => out.put_i64(int as i64),
            (false, false) => out.put_u64_le(int as u64),
            (false, true) => out.put_u64(int as u64),
        }
        Ok(())
    }
}

/// A zero-width marker: occupies no bytes and always decodes to
/// [`Value::Undefined`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct Undefined;

impl Undefined {
    pub(crate) fn size(&self) -> Result<Size, Error> {
        Ok(Size::Bytes(0))
    }

    pub(crate) fn decode(&self) -> Result<Value, Error> {
        Ok(Value::Undefined)
    }

    pub(crate) fn encode(&self) -> Result<(), Error> {
        Ok(())
    }
}

/// Validates a value destined for an integer slot and returns it widened.
/// Floats are accepted when they carry an exact integral value.
fn integer_operand(value: &Value, bits: usize, ctx: &Context) -> Result<i128, Error> {
    match value {
        Value::Int(v) => Ok(*v),
        Value::Float(v) => {
            check_finite(*v, bits, ctx)?;
            if v.fract() != 0.0 {
                return Err(ctx.error(format!("Non-integer value {v} for {bits}-bit integer")));
            }
            Ok(*v as i128)
        }
        other => Err(ctx.error(format!("Non-integer value {other} for {bits}-bit integer"))),
    }
}

fn check_finite(v: f64, bits: usize, ctx: &Context) -> Result<(), Error> {
    if v.is_nan() {
        return Err(ctx.error(format!("Can't encode NaN as a {bits}-bit number")));
    }
    if v.is_infinite() {
        return Err(ctx.error(format!(
            "Can't encode non-finite value {v} as a {bits}-bit number"
        )));
    }
    Ok(())
}

/// A single-byte boolean.
pub fn boolean() -> Schema {
    Schema::new(Kind::Bool(Bool))
}

macro_rules! integer_factory {
    ($(($name:ident, $bytes:expr, $signed:expr, $doc:expr)),* $(,)?) => {
        $(
            #[doc = $doc]
            pub fn $name() -> Schema {
                Schema::new(Kind::Number(Number {
                    bytes: $bytes,
                    signed: $signed,
                    floating: false,
                    big_endian: false,
                }))
            }
        )*
    };
}

integer_factory!(
    (int8, 1, true, "A signed 8-bit integer."),
    (uint8, 1, false, "An unsigned 8-bit integer."),
    (int16, 2, true, "A signed 16-bit integer, little-endian by default."),
    (uint16, 2, false, "An unsigned 16-bit integer, little-endian by default."),
    (int32, 4, true, "A signed 32-bit integer, little-endian by default."),
    (uint32, 4, false, "An unsigned 32-bit integer, little-endian by default."),
);

/// A signed 64-bit integer, little-endian by default.
pub fn int64() -> Schema {
    Schema::new(Kind::Int64(Int64 {
        signed: true,
        big_endian: false,
    }))
}

/// An unsigned 64-bit integer, little-endian by default.
pub fn uint64() -> Schema {
    Schema::new(Kind::Int64(Int64 {
        signed: false,
        big_endian: false,
    }))
}

/// A 32-bit IEEE 754 float, little-endian by default.
pub fn float() -> Schema {
    Schema::new(Kind::Number(Number {
        bytes: 4,
        signed: true,
        floating: true,
        big_endian: false,
    }))
}

/// A 64-bit IEEE 754 float, little-endian by default.
pub fn double() -> Schema {
    Schema::new(Kind::Number(Number {
        bytes: 8,
        signed: true,
        floating: true,
        big_endian: false,
    }))
}

/// A zero-width marker that decodes to [`Value::Undefined`] and writes
/// nothing.
pub fn undefined() -> Schema {
    Schema::new(Kind::Undefined(Undefined))
}
