//! Factory functions for every schema node kind.
//!
//! Each factory returns a plain [`crate::Schema`]; composition is by value
//! (an array takes its element schema, an object takes its field schemas),
//! so a declaration reads top-down like the wire layout it describes.

pub(crate) mod array;
pub(crate) mod bytes;
pub(crate) mod enumeration;
pub(crate) mod object;
pub(crate) mod primitives;
pub(crate) mod string;
pub(crate) mod transform;

pub use array::array;
pub use bytes::buffer;
pub use enumeration::enumeration;
pub use object::object;
pub use primitives::{
    boolean, double, float, int16, int32, int64, int8, uint16, uint32, uint64, uint8, undefined,
};
pub use string::string;
