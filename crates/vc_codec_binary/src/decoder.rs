use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use bytes::{Buf, Bytes};
use vc_codec::format::{Capabilities, Decoder, Primitive, PrimitiveKind};
use vc_codec::{CodecError, Position};

use crate::{CAPABILITIES, marker};

struct Frame {
    object: bool,
    remaining: u32,
}

enum Skip {
    Values(u32),
    Fields(u32),
}

/// Reads values written by [`BinaryEncoder`](crate::BinaryEncoder).
///
/// Every read is bounds checked; truncated input fails with the offset
/// where more bytes were expected.
pub struct BinaryDecoder {
    buf: Bytes,
    total: usize,
    frames: Vec<Frame>,
}

impl BinaryDecoder {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        let buf = bytes.into();
        Self {
            total: buf.len(),
            buf,
            frames: Vec::new(),
        }
    }

    /// Returns `true` once the input is fully consumed.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.frames.is_empty() && !self.buf.has_remaining()
    }

    #[inline]
    fn offset(&self) -> usize {
        self.total - self.buf.remaining()
    }

    fn need(&self, len: usize, expected: &str) -> Result<(), CodecError> {
        if self.buf.remaining() < len {
            return Err(CodecError::malformed(expected, "end of input", self.position()));
        }
        Ok(())
    }

    fn read_marker(&mut self, expected: &str) -> Result<u8, CodecError> {
        self.need(1, expected)?;
        Ok(self.buf.get_u8())
    }

    fn peek_marker(&self, expected: &str) -> Result<u8, CodecError> {
        self.need(1, expected)?;
        Ok(self.buf[0])
    }

    fn read_len(&mut self) -> Result<u32, CodecError> {
        self.need(4, "a length")?;
        Ok(self.buf.get_u32_le())
    }

    fn advance(&mut self, len: usize, expected: &str) -> Result<(), CodecError> {
        self.need(len, expected)?;
        self.buf.advance(len);
        Ok(())
    }

    fn read_str(&mut self) -> Result<String, CodecError> {
        let len = self.read_len()? as usize;
        self.need(len, "string bytes")?;
        let at = self.position();
        let bytes = self.buf.split_to(len);
        match core::str::from_utf8(&bytes) {
            Ok(s) => Ok(s.into()),
            Err(_) => Err(CodecError::malformed("UTF-8 text", "invalid bytes", at)),
        }
    }

    fn unexpected(&self, expected: &str, found: u8, start: usize) -> CodecError {
        CodecError::malformed(expected, marker::name(found), Some(Position::Offset(start)))
    }

    /// Reads the payload of a primitive whose marker was consumed.
    fn read_payload(&mut self, found: u8, expected: &str, start: usize) -> Result<Primitive<'static>, CodecError> {
        if found == marker::STR {
            return self.read_str().map(Primitive::from);
        }
        let width = match marker::fixed_width(found) {
            Some(width) if found != marker::NULL => width,
            _ => return Err(self.unexpected(expected, found, start)),
        };
        self.need(width, expected)?;
        let buf = &mut self.buf;
        Ok(match found {
            marker::BOOL => match buf.get_u8() {
                0 => Primitive::Bool(false),
                1 => Primitive::Bool(true),
                other => {
                    return Err(CodecError::malformed(
                        "bool",
                        format!("byte {other:#04x}"),
                        Some(Position::Offset(start)),
                    ));
                }
            },
            marker::I8 => Primitive::I8(buf.get_i8()),
            marker::I16 => Primitive::I16(buf.get_i16_le()),
            marker::I32 => Primitive::I32(buf.get_i32_le()),
            marker::I64 => Primitive::I64(buf.get_i64_le()),
            marker::U8 => Primitive::U8(buf.get_u8()),
            marker::U16 => Primitive::U16(buf.get_u16_le()),
            marker::U32 => Primitive::U32(buf.get_u32_le()),
            marker::U64 => Primitive::U64(buf.get_u64_le()),
            marker::F32 => Primitive::F32(buf.get_f32_le()),
            marker::F64 => Primitive::F64(buf.get_f64_le()),
            _ => {
                let code = buf.get_u32_le();
                match char::from_u32(code) {
                    Some(c) => Primitive::Char(c),
                    None => {
                        return Err(CodecError::malformed(
                            "char",
                            format!("code point {code:#x}"),
                            Some(Position::Offset(start)),
                        ));
                    }
                }
            }
        })
    }

    fn begin(&mut self, object: bool) -> Result<u32, CodecError> {
        let (expected, wanted) = match object {
            true => ("object", marker::OBJECT),
            false => ("array", marker::ARRAY),
        };
        let start = self.offset();
        let found = self.read_marker(expected)?;
        if found != wanted {
            return Err(self.unexpected(expected, found, start));
        }
        let remaining = self.read_len()?;
        self.frames.push(Frame { object, remaining });
        Ok(remaining)
    }

    fn end(&mut self, object: bool) -> Result<(), CodecError> {
        let expected = match object {
            true => "end of object",
            false => "end of array",
        };
        match self.frames.pop() {
            Some(frame) if frame.object == object && frame.remaining == 0 => Ok(()),
            Some(frame) if frame.object == object => Err(CodecError::malformed(
                expected,
                format!("{} more entries", frame.remaining),
                self.position(),
            )),
            _ => Err(CodecError::custom(format!("unbalanced {expected}"))),
        }
    }
}

impl Decoder for BinaryDecoder {
    #[inline]
    fn capabilities(&self) -> Capabilities {
        CAPABILITIES
    }

    fn decode_primitive(&mut self, kind: PrimitiveKind) -> Result<Primitive<'static>, CodecError> {
        let start = self.offset();
        let found = self.read_marker(kind.name())?;
        let value = self.read_payload(found, kind.name(), start)?;
        if value.kind() == kind {
            return Ok(value);
        }
        let converted = match value {
            Primitive::F32(v) => Primitive::float(kind, f64::from(v)),
            Primitive::F64(v) => Primitive::float(kind, v),
            _ if kind.is_integer() => value.as_i128().and_then(|v| Primitive::integer(kind, v)),
            _ => None,
        };
        converted.ok_or_else(|| {
            CodecError::malformed(
                kind.name(),
                format!("{} {value}", value.kind()),
                Some(Position::Offset(start)),
            )
        })
    }

    fn decode_null(&mut self) -> Result<bool, CodecError> {
        if self.peek_marker("a value")? == marker::NULL {
            self.buf.advance(1);
            return Ok(true);
        }
        Ok(false)
    }

    fn decode_dynamic_type(&mut self) -> Result<Option<String>, CodecError> {
        if self.peek_marker("a value")? == marker::TYPE {
            self.buf.advance(1);
            return self.read_str().map(Some);
        }
        Ok(None)
    }

    #[inline]
    fn begin_object(&mut self) -> Result<(), CodecError> {
        self.begin(true).map(|_| ())
    }

    fn next_field(&mut self) -> Result<Option<String>, CodecError> {
        match self.frames.last_mut() {
            Some(frame) if frame.object => {
                if frame.remaining == 0 {
                    return Ok(None);
                }
                frame.remaining -= 1;
            }
            _ => return Err(CodecError::custom("field requested outside of an object")),
        }
        self.read_str().map(Some)
    }

    #[inline]
    fn end_object(&mut self) -> Result<(), CodecError> {
        self.end(true)
    }

    #[inline]
    fn begin_array(&mut self) -> Result<Option<usize>, CodecError> {
        self.begin(false).map(|len| Some(len as usize))
    }

    fn has_next_element(&mut self) -> Result<bool, CodecError> {
        match self.frames.last_mut() {
            Some(frame) if !frame.object => {
                if frame.remaining == 0 {
                    return Ok(false);
                }
                frame.remaining -= 1;
                Ok(true)
            }
            _ => Err(CodecError::custom("element requested outside of an array")),
        }
    }

    #[inline]
    fn end_array(&mut self) -> Result<(), CodecError> {
        self.end(false)
    }

    fn skip_value(&mut self) -> Result<(), CodecError> {
        let mut pending: Vec<Skip> = Vec::new();
        loop {
            let start = self.offset();
            match self.read_marker("a value")? {
                marker::TYPE => {
                    self.read_str()?;
                    continue;
                }
                marker::OBJECT => pending.push(Skip::Fields(self.read_len()?)),
                marker::ARRAY => pending.push(Skip::Values(self.read_len()?)),
                marker::STR => {
                    let len = self.read_len()? as usize;
                    self.advance(len, "string bytes")?;
                }
                found => match marker::fixed_width(found) {
                    Some(width) => self.advance(width, marker::name(found))?,
                    None => return Err(self.unexpected("a value", found, start)),
                },
            }

            loop {
                match pending.last_mut() {
                    None => return Ok(()),
                    Some(Skip::Values(0) | Skip::Fields(0)) => {
                        pending.pop();
                    }
                    Some(Skip::Values(n)) => {
                        *n -= 1;
                        break;
                    }
                    Some(Skip::Fields(n)) => {
                        *n -= 1;
                        self.read_str()?;
                        break;
                    }
                }
            }
        }
    }

    #[inline]
    fn position(&self) -> Option<Position> {
        Some(Position::Offset(self.offset()))
    }
}
