use alloc::format;
use alloc::vec::Vec;

use bytes::{BufMut, Bytes, BytesMut};
use vc_codec::CodecError;
use vc_codec::format::{Capabilities, Encoder, Primitive};

use crate::{CAPABILITIES, marker};

struct Frame {
    object: bool,
    declared: usize,
    written: usize,
}

/// Writes values as a tagged little-endian byte stream.
#[derive(Default)]
pub struct BinaryEncoder {
    buf: BytesMut,
    frames: Vec<Frame>,
}

impl BinaryEncoder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the encoded bytes.
    pub fn finish(self) -> Result<Bytes, CodecError> {
        if !self.frames.is_empty() {
            return Err(CodecError::custom("unterminated object or array"));
        }
        Ok(self.buf.freeze())
    }

    fn put_len(&mut self, len: usize) -> Result<(), CodecError> {
        let len = u32::try_from(len)
            .map_err(|_| CodecError::custom(format!("length {len} does not fit in 32 bits")))?;
        self.buf.put_u32_le(len);
        Ok(())
    }

    fn put_str(&mut self, s: &str) -> Result<(), CodecError> {
        self.put_len(s.len())?;
        self.buf.put_slice(s.as_bytes());
        Ok(())
    }

    /// Counts a value written directly into an array.
    fn count_value(&mut self) {
        if let Some(frame) = self.frames.last_mut()
            && !frame.object
        {
            frame.written += 1;
        }
    }

    fn begin(&mut self, marker: u8, object: bool, len: usize) -> Result<(), CodecError> {
        self.count_value();
        self.buf.put_u8(marker);
        self.put_len(len)?;
        self.frames.push(Frame {
            object,
            declared: len,
            written: 0,
        });
        Ok(())
    }

    fn end(&mut self, object: bool) -> Result<(), CodecError> {
        match self.frames.pop() {
            Some(frame) if frame.object == object && frame.written == frame.declared => Ok(()),
            Some(frame) if frame.object == object => Err(CodecError::custom(format!(
                "declared {} entries but wrote {}",
                frame.declared, frame.written
            ))),
            _ => Err(CodecError::custom("unbalanced end of object or array")),
        }
    }
}

impl Encoder for BinaryEncoder {
    #[inline]
    fn capabilities(&self) -> Capabilities {
        CAPABILITIES
    }

    fn encode_primitive(&mut self, value: Primitive<'_>) -> Result<(), CodecError> {
        self.count_value();
        let buf = &mut self.buf;
        match value {
            Primitive::Bool(v) => {
                buf.put_u8(marker::BOOL);
                buf.put_u8(v.into());
            }
            Primitive::I8(v) => {
                buf.put_u8(marker::I8);
                buf.put_i8(v);
            }
            Primitive::I16(v) => {
                buf.put_u8(marker::I16);
                buf.put_i16_le(v);
            }
            Primitive::I32(v) => {
                buf.put_u8(marker::I32);
                buf.put_i32_le(v);
            }
            Primitive::I64(v) => {
                buf.put_u8(marker::I64);
                buf.put_i64_le(v);
            }
            Primitive::U8(v) => {
                buf.put_u8(marker::U8);
                buf.put_u8(v);
            }
            Primitive::U16(v) => {
                buf.put_u8(marker::U16);
                buf.put_u16_le(v);
            }
            Primitive::U32(v) => {
                buf.put_u8(marker::U32);
                buf.put_u32_le(v);
            }
            Primitive::U64(v) => {
                buf.put_u8(marker::U64);
                buf.put_u64_le(v);
            }
            Primitive::F32(v) => {
                buf.put_u8(marker::F32);
                buf.put_f32_le(v);
            }
            Primitive::F64(v) => {
                buf.put_u8(marker::F64);
                buf.put_f64_le(v);
            }
            Primitive::Char(v) => {
                buf.put_u8(marker::CHAR);
                buf.put_u32_le(v.into());
            }
            Primitive::Str(v) => {
                buf.put_u8(marker::STR);
                self.put_str(&v)?;
            }
        }
        Ok(())
    }

    fn encode_null(&mut self) -> Result<(), CodecError> {
        self.count_value();
        self.buf.put_u8(marker::NULL);
        Ok(())
    }

    fn encode_dynamic_type(&mut self, name: &str) -> Result<(), CodecError> {
        // The tagged value that follows is counted.
        self.buf.put_u8(marker::TYPE);
        self.put_str(name)
    }

    #[inline]
    fn begin_object(&mut self, len: usize) -> Result<(), CodecError> {
        self.begin(marker::OBJECT, true, len)
    }

    fn encode_field(&mut self, name: &str) -> Result<(), CodecError> {
        match self.frames.last_mut() {
            Some(frame) if frame.object => frame.written += 1,
            _ => return Err(CodecError::custom("field name outside of an object")),
        }
        self.put_str(name)
    }

    #[inline]
    fn end_object(&mut self) -> Result<(), CodecError> {
        self.end(true)
    }

    #[inline]
    fn begin_array(&mut self, len: usize) -> Result<(), CodecError> {
        self.begin(marker::ARRAY, false, len)
    }

    #[inline]
    fn end_array(&mut self) -> Result<(), CodecError> {
        self.end(false)
    }
}
