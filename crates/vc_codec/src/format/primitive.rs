use alloc::borrow::Cow;
use alloc::format;
use alloc::string::String;
use core::fmt;

use super::{Decoder, Encoder};
use crate::CodecError;

// -----------------------------------------------------------------------------
// PrimitiveKind

/// The values every format encodes natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Char,
    Str,
}

impl PrimitiveKind {
    /// Returns `true` for the integer kinds.
    #[inline]
    pub const fn is_integer(self) -> bool {
        use PrimitiveKind::*;
        matches!(self, I8 | I16 | I32 | I64 | U8 | U16 | U32 | U64)
    }

    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, PrimitiveKind::F32 | PrimitiveKind::F64)
    }

    pub const fn name(self) -> &'static str {
        use PrimitiveKind::*;
        match self {
            Bool => "bool",
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
            Char => "char",
            Str => "string",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// -----------------------------------------------------------------------------
// Primitive

/// One primitive value.
///
/// Strings borrow while encoding and are owned once decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive<'a> {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Char(char),
    Str(Cow<'a, str>),
}

impl<'a> Primitive<'a> {
    pub const fn kind(&self) -> PrimitiveKind {
        match self {
            Primitive::Bool(_) => PrimitiveKind::Bool,
            Primitive::I8(_) => PrimitiveKind::I8,
            Primitive::I16(_) => PrimitiveKind::I16,
            Primitive::I32(_) => PrimitiveKind::I32,
            Primitive::I64(_) => PrimitiveKind::I64,
            Primitive::U8(_) => PrimitiveKind::U8,
            Primitive::U16(_) => PrimitiveKind::U16,
            Primitive::U32(_) => PrimitiveKind::U32,
            Primitive::U64(_) => PrimitiveKind::U64,
            Primitive::F32(_) => PrimitiveKind::F32,
            Primitive::F64(_) => PrimitiveKind::F64,
            Primitive::Char(_) => PrimitiveKind::Char,
            Primitive::Str(_) => PrimitiveKind::Str,
        }
    }

    pub fn into_owned(self) -> Primitive<'static> {
        match self {
            Primitive::Bool(v) => Primitive::Bool(v),
            Primitive::I8(v) => Primitive::I8(v),
            Primitive::I16(v) => Primitive::I16(v),
            Primitive::I32(v) => Primitive::I32(v),
            Primitive::I64(v) => Primitive::I64(v),
            Primitive::U8(v) => Primitive::U8(v),
            Primitive::U16(v) => Primitive::U16(v),
            Primitive::U32(v) => Primitive::U32(v),
            Primitive::U64(v) => Primitive::U64(v),
            Primitive::F32(v) => Primitive::F32(v),
            Primitive::F64(v) => Primitive::F64(v),
            Primitive::Char(v) => Primitive::Char(v),
            Primitive::Str(v) => Primitive::Str(Cow::Owned(v.into_owned())),
        }
    }

    /// The integer value, if this is an integer.
    pub fn as_i128(&self) -> Option<i128> {
        Some(match *self {
            Primitive::I8(v) => v as i128,
            Primitive::I16(v) => v as i128,
            Primitive::I32(v) => v as i128,
            Primitive::I64(v) => v as i128,
            Primitive::U8(v) => v as i128,
            Primitive::U16(v) => v as i128,
            Primitive::U32(v) => v as i128,
            Primitive::U64(v) => v as i128,
            _ => return None,
        })
    }

    /// Builds an integer of `kind`, or `None` if `value` is out of range.
    ///
    /// Formats with a single number type use this to produce the exact kind
    /// a codec asked for.
    ///
    /// ```
    /// use vc_codec::format::{Primitive, PrimitiveKind};
    ///
    /// assert_eq!(Primitive::integer(PrimitiveKind::U8, 200), Some(Primitive::U8(200)));
    /// assert_eq!(Primitive::integer(PrimitiveKind::I8, 200), None);
    /// assert_eq!(Primitive::integer(PrimitiveKind::Str, 1), None);
    /// ```
    pub fn integer(kind: PrimitiveKind, value: i128) -> Option<Primitive<'static>> {
        Some(match kind {
            PrimitiveKind::I8 => Primitive::I8(i8::try_from(value).ok()?),
            PrimitiveKind::I16 => Primitive::I16(i16::try_from(value).ok()?),
            PrimitiveKind::I32 => Primitive::I32(i32::try_from(value).ok()?),
            PrimitiveKind::I64 => Primitive::I64(i64::try_from(value).ok()?),
            PrimitiveKind::U8 => Primitive::U8(u8::try_from(value).ok()?),
            PrimitiveKind::U16 => Primitive::U16(u16::try_from(value).ok()?),
            PrimitiveKind::U32 => Primitive::U32(u32::try_from(value).ok()?),
            PrimitiveKind::U64 => Primitive::U64(u64::try_from(value).ok()?),
            _ => return None,
        })
    }

    /// Builds a float of `kind`, or `None` if `kind` is not a float kind.
    pub fn float(kind: PrimitiveKind, value: f64) -> Option<Primitive<'static>> {
        match kind {
            PrimitiveKind::F32 => Some(Primitive::F32(value as f32)),
            PrimitiveKind::F64 => Some(Primitive::F64(value)),
            _ => None,
        }
    }
}

impl fmt::Display for Primitive<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Bool(v) => write!(f, "{v}"),
            Primitive::I8(v) => write!(f, "{v}"),
            Primitive::I16(v) => write!(f, "{v}"),
            Primitive::I32(v) => write!(f, "{v}"),
            Primitive::I64(v) => write!(f, "{v}"),
            Primitive::U8(v) => write!(f, "{v}"),
            Primitive::U16(v) => write!(f, "{v}"),
            Primitive::U32(v) => write!(f, "{v}"),
            Primitive::U64(v) => write!(f, "{v}"),
            Primitive::F32(v) => write!(f, "{v}"),
            Primitive::F64(v) => write!(f, "{v}"),
            Primitive::Char(v) => write!(f, "{v:?}"),
            Primitive::Str(v) => write!(f, "{v:?}"),
        }
    }
}

macro_rules! impl_from_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Primitive<'_> {
                #[inline]
                fn from(value: $ty) -> Self {
                    Primitive::$variant(value)
                }
            }
        )*
    };
}

impl_from_value! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    char => Char,
}

impl<'a> From<&'a str> for Primitive<'a> {
    #[inline]
    fn from(value: &'a str) -> Self {
        Primitive::Str(Cow::Borrowed(value))
    }
}

impl From<String> for Primitive<'_> {
    #[inline]
    fn from(value: String) -> Self {
        Primitive::Str(Cow::Owned(value))
    }
}

// -----------------------------------------------------------------------------
// PrimitiveOps

/// Conversions between a type and its primitive representation.
///
/// Returned by [`Describe::primitive`](crate::Describe::primitive).
pub struct PrimitiveOps<T> {
    pub kind: PrimitiveKind,
    pub write: fn(&T) -> Primitive<'_>,
    /// Returns `None` if the primitive is not a valid `T`.
    pub read: fn(Primitive<'static>) -> Option<T>,
}

impl<T> PrimitiveOps<T> {
    /// Writes `value` as one primitive.
    #[inline]
    pub fn encode(&self, value: &T, out: &mut dyn Encoder) -> Result<(), CodecError> {
        out.encode_primitive((self.write)(value))
    }

    /// Reads one primitive of this kind and converts it.
    pub fn decode(&self, input: &mut dyn Decoder) -> Result<T, CodecError> {
        let value = input.decode_primitive(self.kind)?;
        let kind = value.kind();
        (self.read)(value).ok_or_else(|| {
            CodecError::malformed(
                format!("a valid {}", core::any::type_name::<T>()),
                format!("an unrepresentable {kind}"),
                input.position(),
            )
        })
    }
}

impl<T> Clone for PrimitiveOps<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PrimitiveOps<T> {}

impl<T> fmt::Debug for PrimitiveOps<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrimitiveOps")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
