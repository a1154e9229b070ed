//! The schema node type and its codec operations.
//!
//! A [`Schema`] is an immutable description of a binary shape: a closed set
//! of node kinds, each implementing the same four-phase contract (size,
//! structural decode, structural encode, value transform). The phases have
//! to agree on byte offsets while working from different information — size
//! may have a value, a buffer, both, or neither; decode has only bytes;
//! encode has only a value — which is why all of them receive the same
//! [`Context`] and why size returns a distinguished [`Size::Unknown`] rather
//! than a sentinel byte count.

use std::fmt;
use std::sync::Arc;

use crate::context::Context;
use crate::error::Error;
use crate::types::array::Array;
use crate::types::bytes::Buffer;
use crate::types::enumeration::Enumeration;
use crate::types::object::Object;
use crate::types::primitives::{Bool, Int64, Number, Undefined};
use crate::types::string::Str;
use crate::types::transform::{run_transform, Transform};
use crate::value::Value;

/// The byte length of a node, or `Unknown` when neither a concrete value nor
/// a buffer position lets the node determine it (e.g. a `fill` field sized
/// with no value and no buffer in scope).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Size {
    Bytes(usize),
    Unknown,
}

/// The result type of a user transform callback. Returning a library
/// [`Error`] propagates it unchanged; any other error is rewrapped with a
/// `Failed to transform: ` prefix.
pub type TransformResult = Result<Value, Box<dyn std::error::Error + Send + Sync>>;

/// A user transform callback: receives the value being mapped and the
/// context of the node, which exposes [`Context::resolve`].
pub(crate) type TransformFn = Arc<dyn Fn(Value, &Context<'_>) -> TransformResult + Send + Sync>;

/// One node kind per schema variety. Closed: adding a kind means extending
/// every dispatch arm below.
#[derive(Clone)]
pub(crate) enum Kind {
    Bool(Bool),
    Number(Number),
    Int64(Int64),
    Str(Str),
    Buffer(Buffer),
    Array(Box<Array>),
    Object(Object),
    Enum(Enumeration),
    Transform(Box<Transform>),
    Undefined(Undefined),
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Bool(_) => write!(f, "Bool"),
            Kind::Number(n) => write!(f, "Number({n:?})"),
            Kind::Int64(n) => write!(f, "Int64({n:?})"),
            Kind::Str(s) => write!(f, "Str({s:?})"),
            Kind::Buffer(b) => write!(f, "Buffer({b:?})"),
            Kind::Array(a) => write!(f, "Array({a:?})"),
            Kind::Object(o) => write!(f, "Object({o:?})"),
            Kind::Enum(e) => write!(f, "Enum({e:?})"),
            Kind::Transform(t) => write!(f, "Transform({:?})", t.inner),
            Kind::Undefined(_) => write!(f, "Undefined"),
        }
    }
}

/// A declarative description of a binary shape plus its codec behavior.
///
/// Constructed once through the factory functions ([`crate::object`],
/// [`crate::uint8`], …), then reused across any number of
/// [`Schema::to_buffer`] / [`Schema::from_buffer`] calls; nodes hold no
/// per-call state.
#[derive(Debug, Clone)]
pub struct Schema {
    pub(crate) kind: Kind,
}

impl Schema {
    pub(crate) fn new(kind: Kind) -> Self {
        Self { kind }
    }

    /// Computes the node's byte length. `value` is the node's own candidate
    /// value when one is known; `ctx` carries the buffer view on the decode
    /// side and the enclosing container's partial value for resolution.
    pub(crate) fn size(&self, value: Option<&Value>, ctx: &Context) -> Result<Size, Error> {
        match &self.kind {
            Kind::Bool(n) => n.size(),
            Kind::Number(n) => n.size(),
            Kind::Int64(n) => n.size(),
            Kind::Str(n) => n.size(value, ctx),
            Kind::Buffer(n) => n.size(value, ctx),
            Kind::Array(n) => n.size(value, ctx),
            Kind::Object(n) => n.size(value, ctx),
            Kind::Enum(n) => n.size(),
            Kind::Transform(n) => n.inner.size(value, ctx),
            Kind::Undefined(n) => n.size(),
        }
    }

    /// Reads the node's structural value from the front of `data`, which
    /// holds every byte available to the node (its container caps the slice
    /// at the container's own span). Never reads past the node's size.
    pub(crate) fn decode(&self, data: &[u8], ctx: &Context) -> Result<Value, Error> {
        match &self.kind {
            Kind::Bool(n) => n.decode(data, ctx),
            Kind::Number(n) => n.decode(data, ctx),
            Kind::Int64(n) => n.decode(data, ctx),
            Kind::Str(n) => n.decode(data, ctx),
            Kind::Buffer(n) => n.decode(data, ctx),
            Kind::Array(n) => n.decode(data, ctx),
            Kind::Object(n) => n.decode(data, ctx),
            Kind::Enum(n) => n.decode(data, ctx),
            Kind::Transform(n) => n.inner.decode(data, ctx),
            Kind::Undefined(n) => n.decode(),
        }
    }

    /// Writes the node's structural value into `data`, which is sliced to
    /// exactly the node's computed size.
    pub(crate) fn encode(&self, value: &Value, data: &mut [u8], ctx: &Context) -> Result<(), Error> {
        match &self.kind {
            Kind::Bool(n) => n.encode(value, data, ctx),
            Kind::Number(n) => n.encode(value, data, ctx),
            Kind::Int64(n) => n.encode(value, data, ctx),
            Kind::Str(n) => n.encode(value, data, ctx),
            Kind::Buffer(n) => n.encode(value, data, ctx),
            Kind::Array(n) => n.encode(value, data, ctx),
            Kind::Object(n) => n.encode(value, data, ctx),
            Kind::Enum(n) => n.encode(value, data, ctx),
            Kind::Transform(n) => n.inner.encode(value, data, ctx),
            Kind::Undefined(n) => n.encode(),
        }
    }

    /// Maps the structural value to the logical value after decode. Identity
    /// for nodes without an intrinsic or user transform.
    pub(crate) fn after_decode(&self, value: Value, ctx: &Context) -> Result<Value, Error> {
        match &self.kind {
            Kind::Array(n) => n.after_decode(value, ctx),
            Kind::Object(n) => n.after_decode(value, ctx),
            Kind::Enum(n) => n.after_decode(value, ctx),
            Kind::Transform(n) => {
                let value = n.inner.after_decode(value, ctx)?;
                run_transform(&n.after_decode, value, ctx)
            }
            _ => Ok(value),
        }
    }

    /// Maps the logical value to the structural value before encode.
    pub(crate) fn before_encode(&self, value: Value, ctx: &Context) -> Result<Value, Error> {
        match &self.kind {
            Kind::Array(n) => n.before_encode(value, ctx),
            Kind::Object(n) => n.before_encode(value, ctx),
            Kind::Enum(n) => n.before_encode(value, ctx),
            Kind::Transform(n) => {
                let value = run_transform(&n.before_encode, value, ctx)?;
                n.inner.before_encode(value, ctx)
            }
            _ => Ok(value),
        }
    }

    pub(crate) fn is_undefined(&self) -> bool {
        matches!(self.kind, Kind::Undefined(_))
    }

    /// Encodes a logical value into its byte representation.
    ///
    /// Runs `before_encode` to obtain the structural value, sizes it,
    /// allocates a buffer of exactly that size, and encodes every node into
    /// its byte region.
    ///
    /// ```
    /// use binschema::uint16;
    ///
    /// let bytes = uint16().to_buffer(43981u16).unwrap();
    /// assert_eq!(bytes, vec![205, 171]);
    /// ```
    pub fn to_buffer(&self, value: impl Into<Value>) -> Result<Vec<u8>, Error> {
        let ctx = Context::root(None, 0);
        let value = self.before_encode(value.into(), &ctx)?;
        let size = match self.size(Some(&value), &ctx)? {
            Size::Bytes(n) => n,
            Size::Unknown => return Err(ctx.error("Failed to determine encoded size")),
        };
        let mut buffer = vec![0u8; size];
        self.encode(&value, &mut buffer, &ctx)?;
        Ok(buffer)
    }

    /// Decodes a logical value from the start of `data`.
    pub fn from_buffer(&self, data: &[u8]) -> Result<Value, Error> {
        self.from_buffer_at(data, 0)
    }

    /// Decodes a logical value from `data` starting at `offset`, letting one
    /// buffer host multiple concatenated records.
    pub fn from_buffer_at(&self, data: &[u8], offset: usize) -> Result<Value, Error> {
        let remaining = data.get(offset..).unwrap_or(&[]);
        let ctx = Context::root(Some(remaining), offset);
        let value = self.decode(remaining, &ctx)?;
        self.after_decode(value, &ctx)
    }

    /// Switches a numeric node to big-endian byte order.
    ///
    /// # Panics
    ///
    /// Panics when called on a non-numeric node.
    pub fn be(mut self) -> Self {
        match &mut self.kind {
            Kind::Number(n) => n.big_endian = true,
            Kind::Int64(n) => n.big_endian = true,
            _ => panic!("be() is only supported on numeric types."),
        }
        self
    }

    /// Reinterprets a literal length as a bit count (divided by eight to get
    /// bytes).
    ///
    /// # Panics
    ///
    /// Panics at configuration time when the length is dynamic or not
    /// divisible by eight, or when called on a fixed-size node.
    pub fn bytes(mut self) -> Self {
        match &mut self.kind {
            Kind::Str(n) => {
                if !n.length.supports_bytes() {
                    panic!("Can't set bytes on dynamic length string.");
                }
                check_divisible(&n.length);
                n.in_bytes = true;
            }
            Kind::Buffer(n) => {
                if !n.length.supports_bytes() {
                    panic!("Can't set bytes on dynamic length buffer.");
                }
                check_divisible(&n.length);
                n.in_bytes = true;
            }
            Kind::Array(n) => {
                if !n.length.supports_bytes() {
                    panic!("Can't set bytes on dynamic length array.");
                }
                check_divisible(&n.length);
                n.in_bytes = true;
            }
            _ => panic!("bytes() is only supported on string, buffer, and array types."),
        }
        self
    }

    /// Wraps this node with a bidirectional user mapping applied after
    /// structural decode and before structural encode. The wrapper is
    /// structurally transparent: size, decode, and encode delegate to the
    /// inner node unchanged.
    ///
    /// ```
    /// use binschema::{int32, Value};
    ///
    /// let minutes = int32().transform(
    ///     |v, _| Ok(Value::from(format!("{v} minutes"))),
    ///     |v, _| {
    ///         let n: i64 = v.to_string().split(' ').next().unwrap().parse()?;
    ///         Ok(Value::from(n))
    ///     },
    /// );
    /// let bytes = minutes.to_buffer(Value::from("42 minutes")).unwrap();
    /// assert_eq!(bytes, vec![42, 0, 0, 0]);
    /// ```
    pub fn transform<A, B>(self, after_decode: A, before_encode: B) -> Self
    where
        A: Fn(Value, &Context<'_>) -> TransformResult + Send + Sync + 'static,
        B: Fn(Value, &Context<'_>) -> TransformResult + Send + Sync + 'static,
    {
        Schema::new(Kind::Transform(Box::new(Transform {
            inner: self,
            after_decode: Arc::new(after_decode),
            before_encode: Arc::new(before_encode),
        })))
    }

    /// The symbolic options of an enumeration node, `None` for other kinds.
    pub fn options(&self) -> Option<&[String]> {
        match &self.kind {
            Kind::Enum(n) => Some(&n.options),
            _ => None,
        }
    }
}

fn check_divisible(length: &crate::config::Length) {
    if let crate::config::Length::Literal(n) = length {
        if n % 8 != 0 {
            panic!("Byte size {n} is not divisible by 8.");
        }
    }
}
