use alloc::borrow::Cow;
use alloc::string::String;
use alloc::sync::Arc;

use crate::format::{Decoder, Encoder, Primitive, PrimitiveKind, PrimitiveOps};
use crate::registry::Derivation;
use crate::{Codec, CodecCore, CodecError, Describe};

// -----------------------------------------------------------------------------
// PrimitiveCodec

/// Codec of a type with a primitive representation.
pub struct PrimitiveCodec<T> {
    ops: PrimitiveOps<T>,
}

impl<T> PrimitiveCodec<T> {
    #[inline]
    pub const fn new(ops: PrimitiveOps<T>) -> Self {
        Self { ops }
    }
}

impl<T: 'static> Codec<T> for PrimitiveCodec<T> {
    #[inline]
    fn encode(&self, _: &CodecCore, value: &T, out: &mut dyn Encoder) -> Result<(), CodecError> {
        self.ops.encode(value, out)
    }

    #[inline]
    fn decode(&self, _: &CodecCore, input: &mut dyn Decoder) -> Result<T, CodecError> {
        self.ops.decode(input)
    }
}

// -----------------------------------------------------------------------------
// Describe impls

/// Implements [`Describe`] through [`Describe::primitive`].
macro_rules! impl_via_ops {
    ($($ty:ty => $ops:expr),* $(,)?) => {
        $(
            impl Describe for $ty {
                #[inline]
                fn derive(_: &mut Derivation<'_>) -> Result<Arc<dyn Codec<Self>>, CodecError> {
                    Ok(Arc::new(PrimitiveCodec::new($ops)))
                }

                #[inline]
                fn primitive() -> Option<PrimitiveOps<Self>> {
                    Some($ops)
                }
            }
        )*
    };
}

macro_rules! impl_primitive {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        impl_via_ops! {
            $(
                $ty => PrimitiveOps {
                    kind: PrimitiveKind::$kind,
                    write: |v| Primitive::$kind(*v),
                    read: |p| match p {
                        Primitive::$kind(v) => Some(v),
                        _ => None,
                    },
                },
            )*
        }
    };
}

impl_primitive! {
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

impl_via_ops! {
    String => PrimitiveOps {
        kind: PrimitiveKind::Str,
        write: |v: &String| Primitive::Str(Cow::Borrowed(v.as_str())),
        read: |p| match p {
            Primitive::Str(v) => Some(v.into_owned()),
            _ => None,
        },
    },
    usize => PrimitiveOps {
        kind: PrimitiveKind::U64,
        write: |v| Primitive::U64(*v as u64),
        read: |p| match p {
            Primitive::U64(v) => usize::try_from(v).ok(),
            _ => None,
        },
    },
    isize => PrimitiveOps {
        kind: PrimitiveKind::I64,
        write: |v| Primitive::I64(*v as i64),
        read: |p| match p {
            Primitive::I64(v) => isize::try_from(v).ok(),
            _ => None,
        },
    },
}
