//! Schema-driven binary serialization.
//!
//! # Overview
//!
//! A binary codec built around runtime schema declarations: a schema is a
//! composable tree of typed nodes, and a single declaration drives encode,
//! decode, and size computation. Layouts are raw, with no framing, tags, or
//! length prefixes beyond what the schema itself declares, which makes the
//! library a fit for fixed wire formats, file headers, and embedded
//! protocols whose byte layout is dictated from outside.
//!
//! # Supported Nodes
//!
//! - Primitives: booleans, signed/unsigned integers of 1, 2, 4, and 8
//!   bytes, 32/64-bit floats, and a zero-width `undefined` marker
//! - Strings and raw byte buffers with literal, fill, null-terminated, or
//!   path-resolved lengths
//! - Homogeneous arrays, ordered objects, and enumerations over an integer
//!   backing
//! - User transforms mapping between wire values and logical values
//!
//! Dynamic lengths are never written to the wire implicitly: a length
//! lives in another field and is referenced by path, so the encoded bytes
//! match the external format byte for byte.
//!
//! # Example
//!
//! ```
//! use binschema::{array, object, path, string, uint8, Length, Value};
//!
//! let schema = object([
//!     ("count", uint8()),
//!     ("names", array(string(Length::NullTerminated), Length::from(path!["count"]))),
//! ]);
//!
//! let value = Value::object([
//!     ("count", Value::Int(2)),
//!     ("names", Value::Array(vec![Value::from("ada"), Value::from("bob")])),
//! ]);
//!
//! let bytes = schema.to_buffer(value.clone()).unwrap();
//! assert_eq!(bytes, b"\x02ada\0bob\0".to_vec());
//! assert_eq!(schema.from_buffer(&bytes).unwrap(), value);
//! ```
//!
//! # Transforms
//!
//! ```
//! use binschema::{uint16, Value};
//!
//! // Wire: centimeters. Logical: meters.
//! let height = uint16().transform(
//!     |v, _| Ok(Value::Float(v.as_int().unwrap_or(0) as f64 / 100.0)),
//!     |v, _| Ok(Value::Int((v.as_float().unwrap_or(0.0) * 100.0).round() as i128)),
//! );
//! let bytes = height.to_buffer(Value::Float(1.84)).unwrap();
//! assert_eq!(height.from_buffer(&bytes).unwrap(), Value::Float(1.84));
//! ```

pub mod codec;
mod config;
mod context;
mod error;
mod resolve;
mod types;
mod value;

pub use codec::{Schema, TransformResult};
pub use config::Length;
pub use context::{Context, Segment};
pub use error::Error;
pub use types::{
    array, boolean, buffer, double, enumeration, float, int16, int32, int64, int8, object, string,
    uint16, uint32, uint64, uint8, undefined,
};
pub use value::Value;
