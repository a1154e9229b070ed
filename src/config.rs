//! Length policies for variable-length schema nodes.

use crate::context::{format_path, Context, Segment};
use crate::error::Error;
use crate::value::Value;

/// The declared length of a string, buffer, or array node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Length {
    /// A literal element count (or, after `.bytes()`, a bit count divided by
    /// eight to get bytes).
    Literal(usize),
    /// Consume exactly the remaining bytes of the buffer on decode, or
    /// exactly the runtime length of the provided value on encode.
    Fill,
    /// Strings only: the value's content up to its first NUL plus one
    /// terminator byte; scan-to-first-zero-byte on decode.
    NullTerminated,
    /// Resolved from another, earlier-defined field at size-computation time.
    Path(Vec<Segment>),
}

// Accepting every integer width keeps bare literals working at call sites
// (an unsuffixed literal falls back to i32).
macro_rules! impl_length_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Length {
                fn from(v: $t) -> Self {
                    match usize::try_from(v) {
                        Ok(v) => Length::Literal(v),
                        Err(_) => panic!("Invalid length {v}."),
                    }
                }
            }
        )*
    };
}

impl_length_from_int!(u8, u16, u32, u64, usize, i8, i16, i32, i64);

impl From<Vec<Segment>> for Length {
    fn from(v: Vec<Segment>) -> Self {
        Length::Path(v)
    }
}

impl Length {
    /// Whether `.bytes()` may reinterpret this length. Only dynamic policies
    /// are rejected; a path-resolved length is accepted (and the toggle has
    /// no effect on it, matching the length arithmetic in the codecs).
    pub(crate) fn supports_bytes(&self) -> bool {
        !matches!(self, Length::Fill | Length::NullTerminated)
    }

    /// Resolves a path-declared length to a concrete element count.
    pub(crate) fn resolve_count(path: &[Segment], ctx: &Context) -> Result<usize, Error> {
        let resolved = ctx.resolve(path)?;
        match resolved {
            Value::Int(n) if n >= 0 => Ok(n as usize),
            other => Err(ctx.error(format!(
                "Invalid length {other} resolved from {}",
                format_path(path)
            ))),
        }
    }
}
