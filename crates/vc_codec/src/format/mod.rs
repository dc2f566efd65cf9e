//! The surface a wire format implements.
//!
//! A format supplies one [`Encoder`] and one [`Decoder`]. Codecs drive them
//! with primitive values and with object, array and type-tag framing; the
//! core never depends on a concrete format.
//!
//! [`tokens`] is an in-memory format used for testing the core in isolation.

use alloc::string::String;

use crate::{CodecError, Position};

// -----------------------------------------------------------------------------
// Modules

mod primitive;

pub mod tokens;

// -----------------------------------------------------------------------------
// Exports

pub use primitive::{Primitive, PrimitiveKind, PrimitiveOps};

// -----------------------------------------------------------------------------
// Capabilities

/// What a format can represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Type tags can be recorded next to a value.
    ///
    /// Without them, trait-object values can only use the default subtype.
    pub dynamic_types: bool,
    /// Map keys must be strings.
    pub string_keys_only: bool,
    /// Objects must carry exactly the declared fields.
    pub exact_fields: bool,
}

impl Capabilities {
    /// Tags supported, any key type, lenient field sets.
    pub const DEFAULT: Self = Self {
        dynamic_types: true,
        string_keys_only: false,
        exact_fields: false,
    };
}

impl Default for Capabilities {
    #[inline]
    fn default() -> Self {
        Self::DEFAULT
    }
}

// -----------------------------------------------------------------------------
// Encoder

/// Write side of a format.
///
/// Calls arrive in document order. An object is `begin_object`, then
/// `encode_field` followed by one value per field, then `end_object`. An
/// array is `begin_array`, its values, then `end_array`. A type tag is
/// announced with `encode_dynamic_type` immediately before the value it
/// describes.
pub trait Encoder {
    fn capabilities(&self) -> Capabilities;

    fn encode_primitive(&mut self, value: Primitive<'_>) -> Result<(), CodecError>;

    fn encode_null(&mut self) -> Result<(), CodecError>;

    /// Records the type name of the next value.
    fn encode_dynamic_type(&mut self, name: &str) -> Result<(), CodecError>;

    /// Starts an object with `len` fields.
    fn begin_object(&mut self, len: usize) -> Result<(), CodecError>;

    fn encode_field(&mut self, name: &str) -> Result<(), CodecError>;

    fn end_object(&mut self) -> Result<(), CodecError>;

    /// Starts an array of `len` values.
    fn begin_array(&mut self, len: usize) -> Result<(), CodecError>;

    fn end_array(&mut self) -> Result<(), CodecError>;
}

// -----------------------------------------------------------------------------
// Decoder

/// Read side of a format.
///
/// Mirrors [`Encoder`]. Every value is consumed by exactly one of
/// `decode_primitive`, a successful `decode_null`, `begin_object`,
/// `begin_array` or `skip_value`. A type tag, if present, is consumed by
/// `decode_dynamic_type` before its value.
pub trait Decoder {
    fn capabilities(&self) -> Capabilities;

    /// Reads a primitive of exactly `kind`.
    fn decode_primitive(&mut self, kind: PrimitiveKind) -> Result<Primitive<'static>, CodecError>;

    /// Consumes the next value if it is null.
    fn decode_null(&mut self) -> Result<bool, CodecError>;

    /// Consumes the type tag of the next value, if it has one.
    fn decode_dynamic_type(&mut self) -> Result<Option<String>, CodecError>;

    fn begin_object(&mut self) -> Result<(), CodecError>;

    /// Returns the next field name, or `None` at the end of the object.
    fn next_field(&mut self) -> Result<Option<String>, CodecError>;

    fn end_object(&mut self) -> Result<(), CodecError>;

    /// Starts an array and returns its length if the format stores it.
    fn begin_array(&mut self) -> Result<Option<usize>, CodecError>;

    /// Returns `true` if another element follows.
    fn has_next_element(&mut self) -> Result<bool, CodecError>;

    fn end_array(&mut self) -> Result<(), CodecError>;

    /// Consumes the next value, whatever it is.
    fn skip_value(&mut self) -> Result<(), CodecError>;

    /// Where the decoder currently is, for error reports.
    #[inline]
    fn position(&self) -> Option<Position> {
        None
    }
}
