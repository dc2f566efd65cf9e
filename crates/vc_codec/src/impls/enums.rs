use alloc::format;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::type_name;

use crate::format::{Decoder, Encoder, Primitive, PrimitiveKind};
use crate::{At, Codec, CodecCore, CodecError};

/// Codec of a fieldless enum, encoded as the name of its variant.
///
/// `#[derive(Describe)]` uses it for enums without data.
///
/// ```
/// use vc_codec::format::tokens::{Token, TokenEncoder};
/// use vc_codec::{CodecCore, Describe};
///
/// #[derive(Describe)]
/// enum Level {
///     Low,
///     #[codec(rename = "hi")]
///     High,
/// }
///
/// let mut out = TokenEncoder::new();
/// CodecCore::new().encode(&Level::High, &mut out).unwrap();
/// assert_eq!(out.tokens(), [Token::value("hi")]);
/// ```
pub struct EnumCodec<T> {
    names: Vec<&'static str>,
    index: fn(&T) -> usize,
    from_index: fn(usize) -> Option<T>,
}

impl<T: 'static> EnumCodec<T> {
    /// `names[i]` is the name of the variant `index` maps to `i`.
    pub fn derive(
        names: &[&'static str],
        index: fn(&T) -> usize,
        from_index: fn(usize) -> Option<T>,
    ) -> Result<Arc<dyn Codec<T>>, CodecError> {
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(CodecError::Unsupported {
                    ty: type_name::<T>(),
                    reason: format!("variant name `{name}` is used twice"),
                });
            }
        }
        Ok(Arc::new(Self {
            names: names.to_vec(),
            index,
            from_index,
        }))
    }
}

impl<T: 'static> Codec<T> for EnumCodec<T> {
    fn encode(&self, _: &CodecCore, value: &T, out: &mut dyn Encoder) -> Result<(), CodecError> {
        let name = self
            .names
            .get((self.index)(value))
            .ok_or(CodecError::TypeMismatch {
                expected: type_name::<T>(),
            })?;
        out.encode_primitive(Primitive::from(*name))
    }

    fn decode(&self, _: &CodecCore, input: &mut dyn Decoder) -> Result<T, CodecError> {
        let Primitive::Str(name) = input.decode_primitive(PrimitiveKind::Str)? else {
            return Err(CodecError::malformed("a variant name", "another primitive", input.position()));
        };
        self.names
            .iter()
            .position(|n| *n == name)
            .and_then(self.from_index)
            .ok_or_else(|| CodecError::InvalidVariant {
                ty: type_name::<T>(),
                name: name.into_owned(),
                at: At(input.position()),
            })
    }
}
