//! Leading byte of every encoded value.

pub(crate) const NULL: u8 = 0x00;
pub(crate) const BOOL: u8 = 0x01;
pub(crate) const I8: u8 = 0x02;
pub(crate) const I16: u8 = 0x03;
pub(crate) const I32: u8 = 0x04;
pub(crate) const I64: u8 = 0x05;
pub(crate) const U8: u8 = 0x06;
pub(crate) const U16: u8 = 0x07;
pub(crate) const U32: u8 = 0x08;
pub(crate) const U64: u8 = 0x09;
pub(crate) const F32: u8 = 0x0A;
pub(crate) const F64: u8 = 0x0B;
pub(crate) const CHAR: u8 = 0x0C;
/// `u32` byte length, then UTF-8.
pub(crate) const STR: u8 = 0x0D;
/// `u32` field count, then `(name, value)` pairs. Names carry no marker.
pub(crate) const OBJECT: u8 = 0x0E;
/// `u32` element count, then the elements.
pub(crate) const ARRAY: u8 = 0x0F;
/// A type name, then the tagged value.
pub(crate) const TYPE: u8 = 0x10;

pub(crate) fn name(marker: u8) -> &'static str {
    match marker {
        NULL => "null",
        BOOL => "bool",
        I8 => "i8",
        I16 => "i16",
        I32 => "i32",
        I64 => "i64",
        U8 => "u8",
        U16 => "u16",
        U32 => "u32",
        U64 => "u64",
        F32 => "f32",
        F64 => "f64",
        CHAR => "char",
        STR => "string",
        OBJECT => "object",
        ARRAY => "array",
        TYPE => "type tag",
        _ => "unknown marker",
    }
}

/// Payload size of a fixed-width value.
pub(crate) fn fixed_width(marker: u8) -> Option<usize> {
    Some(match marker {
        NULL => 0,
        BOOL | I8 | U8 => 1,
        I16 | U16 => 2,
        I32 | U32 | F32 | CHAR => 4,
        I64 | U64 | F64 => 8,
        _ => return None,
    })
}
