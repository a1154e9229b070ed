//! Enumeration nodes: a small integer on the wire, a symbolic option name
//! in the logical value.

use crate::codec::{Kind, Schema, Size};
use crate::context::Context;
use crate::error::Error;
use crate::types::primitives::Number;
use crate::value::Value;

/// An enumeration backed by an integer node. The wire value is the option
/// index; the logical value is the option string.
#[derive(Debug, Clone)]
pub(crate) struct Enumeration {
    pub(crate) backing: Number,
    pub(crate) options: Vec<String>,
}

impl Enumeration {
    pub(crate) fn size(&self) -> Result<Size, Error> {
        self.backing.size()
    }

    pub(crate) fn decode(&self, data: &[u8], ctx: &Context) -> Result<Value, Error> {
        self.backing.decode(data, ctx)
    }

    pub(crate) fn encode(&self, value: &Value, data: &mut [u8], ctx: &Context) -> Result<(), Error> {
        self.backing.encode(value, data, ctx)
    }

    pub(crate) fn after_decode(&self, value: Value, ctx: &Context) -> Result<Value, Error> {
        let index = value.as_int().unwrap_or(-1);
        let option = usize::try_from(index)
            .ok()
            .and_then(|i| self.options.get(i));
        match option {
            Some(name) => Ok(Value::String(name.clone())),
            None => Err(ctx.error(format!(
                "Invalid index \"{index}\" for enum \"[{}]\"",
                self.options.join(",")
            ))),
        }
    }

    pub(crate) fn before_encode(&self, value: Value, ctx: &Context) -> Result<Value, Error> {
        let index = value
            .as_str()
            .and_then(|s| self.options.iter().position(|o| o == s));
        match index {
            Some(i) => Ok(Value::Int(i as i128)),
            None => Err(ctx.error(format!(
                "Invalid value \"{value}\" for enum \"[{}]\"",
                self.options.join(",")
            ))),
        }
    }
}

/// An enumeration node over `backing`, which must be an integer node of one,
/// two, or four bytes.
///
/// The option list caps at the square of the backing width in bits (64
/// options for one byte), keeping the index comfortably inside the narrowest
/// backing while leaving room to grow a wire format without resizing it.
///
/// # Panics
///
/// Panics at configuration time when `backing` is not an integer node, when
/// `options` is empty, or when it exceeds the cap.
pub fn enumeration<S: Into<String>, I: IntoIterator<Item = S>>(
    backing: Schema,
    options: I,
) -> Schema {
    let backing = match backing.kind {
        Kind::Number(n) if !n.floating => n,
        _ => panic!("Enums can only be created with integer types."),
    };
    let options: Vec<String> = options.into_iter().map(Into::into).collect();
    if options.is_empty() {
        panic!("Enum options must have at least one option.");
    }
    let bits = backing.bytes * 8;
    if options.len() > bits * bits {
        panic!(
            "Too many options ({}) for {} byte underlying type.",
            options.len(),
            backing.bytes
        );
    }
    Schema::new(Kind::Enum(Enumeration { backing, options }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{float, int64, uint16, uint8};

    fn color() -> Schema {
        enumeration(uint8(), ["RED", "GREEN", "BLUE"])
    }

    #[test]
    fn test_roundtrip() {
        let schema = color();
        let bytes = schema.to_buffer(Value::from("GREEN")).unwrap();
        assert_eq!(bytes, vec![1]);
        assert_eq!(schema.from_buffer(&bytes).unwrap(), Value::from("GREEN"));
    }

    #[test]
    fn test_invalid_index() {
        let err = color().from_buffer(&[7]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid index \"7\" for enum \"[RED,GREEN,BLUE]\""
        );
    }

    #[test]
    fn test_invalid_value() {
        let err = color().to_buffer(Value::from("PURPLE")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value \"PURPLE\" for enum \"[RED,GREEN,BLUE]\""
        );
    }

    #[test]
    fn test_non_string_value() {
        let err = color().to_buffer(Value::Int(1)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value \"1\" for enum \"[RED,GREEN,BLUE]\""
        );
    }

    #[test]
    fn test_wide_backing() {
        let options: Vec<String> = (0..100).map(|i| format!("OPT{i}")).collect();
        let schema = enumeration(uint16(), options);
        let bytes = schema.to_buffer(Value::from("OPT99")).unwrap();
        assert_eq!(bytes, vec![99, 0]);
        assert_eq!(schema.from_buffer(&bytes).unwrap(), Value::from("OPT99"));
    }

    #[test]
    fn test_options_accessor() {
        assert_eq!(
            color().options(),
            Some(&["RED".to_string(), "GREEN".to_string(), "BLUE".to_string()][..])
        );
        assert_eq!(uint8().options(), None);
    }

    #[test]
    #[should_panic(expected = "Enums can only be created with integer types.")]
    fn test_float_backing_rejected() {
        let _ = enumeration(float(), ["A"]);
    }

    #[test]
    #[should_panic(expected = "Enums can only be created with integer types.")]
    fn test_int64_backing_rejected() {
        let _ = enumeration(int64(), ["A"]);
    }

    #[test]
    #[should_panic(expected = "Enum options must have at least one option.")]
    fn test_empty_options_rejected() {
        let _ = enumeration(uint8(), Vec::<String>::new());
    }

    // The cap is the square of the backing width in bits (64 for one byte),
    // deliberately well under the 256 indices the byte could carry.
    #[test]
    #[should_panic(expected = "Too many options (65) for 1 byte underlying type.")]
    fn test_too_many_options_rejected() {
        let options: Vec<String> = (0..65).map(|i| format!("O{i}")).collect();
        let _ = enumeration(uint8(), options);
    }
}
