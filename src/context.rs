//! The per-call context threaded through recursive codec calls.
//!
//! Every recursive size/decode/encode/transform call receives a fresh
//! [`Context`] describing where in the document tree the call is happening:
//! the path from the root, the absolute byte offset, the remaining bytes (on
//! the decode side), and the enclosing container's partially-known value.
//! Contexts form a borrowed, stack-scoped chain: each one borrows its parent
//! and never outlives the call that created it.

use std::fmt;

use crate::codec::Schema;
use crate::error::Error;
use crate::resolve;
use crate::value::Value;

/// One step of a path: an object key, an array index, or one of the two
/// ascension sentinels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// An object field name.
    Key(String),
    /// An array element position.
    Index(usize),
    /// Ascend one level to the enclosing container.
    Parent,
    /// Ascend to the document root.
    Root,
}

impl From<&str> for Segment {
    fn from(s: &str) -> Self {
        match s {
            "^" => Segment::Parent,
            "~" => Segment::Root,
            _ => Segment::Key(s.to_owned()),
        }
    }
}

impl From<String> for Segment {
    fn from(s: String) -> Self {
        Segment::from(s.as_str())
    }
}

// Accepting every integer width keeps bare index literals working inside
// `path!` (an unsuffixed literal falls back to i32).
macro_rules! impl_segment_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Segment {
                fn from(i: $t) -> Self {
                    match usize::try_from(i) {
                        Ok(i) => Segment::Index(i),
                        Err(_) => panic!("Invalid index {i}."),
                    }
                }
            }
        )*
    };
}

impl_segment_from_int!(u8, u16, u32, u64, usize, i8, i16, i32, i64);

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(k) => write!(f, "{k}"),
            Segment::Index(i) => write!(f, "{i}"),
            Segment::Parent => write!(f, "^"),
            Segment::Root => write!(f, "~"),
        }
    }
}

/// Builds a `Vec<Segment>` from mixed keys and indices.
///
/// `"^"` and `"~"` map to the parent and root sentinels.
///
/// ```
/// use binschema::{path, Segment};
///
/// let p = path!["^", "items", 0];
/// assert_eq!(p[0], Segment::Parent);
/// assert_eq!(p[2], Segment::Index(0));
/// ```
#[macro_export]
macro_rules! path {
    ($($segment:expr),* $(,)?) => {
        vec![$($crate::Segment::from($segment)),*]
    };
}

/// Formats a path the way error messages render it: keys as `.key`, indices
/// as `[i]`, the parent sentinel as `.^`, the root sentinel as `.~`.
pub(crate) fn format_path(path: &[Segment]) -> String {
    let mut out = String::new();
    for segment in path {
        match segment {
            Segment::Key(k) => {
                out.push('.');
                out.push_str(k);
            }
            Segment::Index(i) => {
                out.push('[');
                out.push_str(&i.to_string());
                out.push(']');
            }
            Segment::Parent => out.push_str(".^"),
            Segment::Root => out.push_str(".~"),
        }
    }
    out
}

/// The definition of the container enclosing a node, used by path resolution
/// to enforce the definition-order invariant.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Container<'a> {
    /// The node is the document root; resolution cannot start here.
    None,
    /// An ordered object shape.
    Object(&'a [(String, Schema)]),
    /// An array of a single element schema.
    Array,
}

/// The ephemeral state of one recursive codec call.
///
/// Transform callbacks receive a `&Context` and may call
/// [`Context::resolve`] to read already-known sibling values.
#[derive(Debug)]
pub struct Context<'a> {
    pub(crate) path: Vec<Segment>,
    pub(crate) parent: Option<&'a Context<'a>>,
    pub(crate) container: Container<'a>,
    /// The enclosing container's (partially) known value. During decode this
    /// is repopulated between sibling calls so later fields can see earlier
    /// fields' decoded values.
    pub(crate) value: Option<&'a Value>,
    /// Remaining bytes from this node's start, present on the decode side.
    pub(crate) buffer: Option<&'a [u8]>,
    /// Absolute byte offset from the start of the top-level buffer.
    pub(crate) offset: usize,
}

impl<'a> Context<'a> {
    /// The context of a top-level `to_buffer`/`from_buffer` call.
    pub(crate) fn root(buffer: Option<&'a [u8]>, offset: usize) -> Self {
        Self {
            path: Vec::new(),
            parent: None,
            container: Container::None,
            value: None,
            buffer,
            offset,
        }
    }

    /// Derives the context for a child node. The child's parent link points
    /// at `self`, mirroring the chain the document tree forms.
    pub(crate) fn child<'b>(
        &'b self,
        segment: Segment,
        container: Container<'b>,
        value: Option<&'b Value>,
        buffer: Option<&'b [u8]>,
        offset: usize,
    ) -> Context<'b> {
        let mut path = self.path.clone();
        path.push(segment);
        Context {
            path,
            parent: Some(self),
            container,
            value,
            buffer,
            offset,
        }
    }

    /// The path of the node being processed, from the document root.
    pub fn path(&self) -> &[Segment] {
        &self.path
    }

    /// The absolute byte offset of the node being processed.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The enclosing container's value, as far as it is known at this point
    /// of the operation.
    pub fn value(&self) -> Option<&Value> {
        self.value
    }

    /// Resolves a path against this context (see the crate docs for the
    /// resolution rules). An empty path yields the enclosing container's
    /// value.
    pub fn resolve(&self, path: &[Segment]) -> Result<Value, Error> {
        resolve::resolve(path, self)
    }

    /// Builds an [`Error`] carrying a snapshot of this context.
    pub(crate) fn error(&self, message: impl Into<String>) -> Error {
        Error::new(message, format_path(&self.path), self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_from() {
        assert_eq!(Segment::from("name"), Segment::Key("name".into()));
        assert_eq!(Segment::from("^"), Segment::Parent);
        assert_eq!(Segment::from("~"), Segment::Root);
        assert_eq!(Segment::from(3), Segment::Index(3));
    }

    #[test]
    fn test_format_path() {
        let p = path!["a", "b", 0, "^", "c"];
        assert_eq!(format_path(&p), ".a.b[0].^.c");
        assert_eq!(format_path(&path![1, 3]), "[1][3]");
        assert_eq!(format_path(&[]), "");
    }
}
