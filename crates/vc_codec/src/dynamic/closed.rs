use alloc::boxed::Box;
use alloc::format;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::format::{Decoder, Encoder};
use crate::registry::Derivation;
use crate::{At, Codec, CodecCore, CodecError, CodecHandle, Describe};

// -----------------------------------------------------------------------------
// Variant access

trait VariantAccess<T>: Send + Sync {
    fn encode(&self, core: &CodecCore, value: &T, out: &mut dyn Encoder) -> Result<(), CodecError>;

    fn decode(&self, core: &CodecCore, input: &mut dyn Decoder) -> Result<T, CodecError>;
}

struct UnitVariant<T> {
    make: fn() -> T,
}

impl<T: 'static> VariantAccess<T> for UnitVariant<T> {
    #[inline]
    fn encode(&self, _: &CodecCore, _: &T, out: &mut dyn Encoder) -> Result<(), CodecError> {
        out.encode_null()
    }

    fn decode(&self, _: &CodecCore, input: &mut dyn Decoder) -> Result<T, CodecError> {
        if input.decode_null()? {
            Ok((self.make)())
        } else {
            Err(CodecError::malformed("null", "a value", input.position()))
        }
    }
}

struct NewtypeVariant<T, F> {
    codec: CodecHandle<F>,
    wrap: fn(F) -> T,
    peel: fn(&T) -> Option<&F>,
}

impl<T: 'static, F: Describe> VariantAccess<T> for NewtypeVariant<T, F> {
    fn encode(&self, core: &CodecCore, value: &T, out: &mut dyn Encoder) -> Result<(), CodecError> {
        let inner = (self.peel)(value).ok_or(CodecError::TypeMismatch {
            expected: core::any::type_name::<F>(),
        })?;
        self.codec.encode(core, inner, out)
    }

    #[inline]
    fn decode(&self, core: &CodecCore, input: &mut dyn Decoder) -> Result<T, CodecError> {
        self.codec.decode(core, input).map(self.wrap)
    }
}

struct Variant<T> {
    name: &'static str,
    access: Box<dyn VariantAccess<T>>,
}

// -----------------------------------------------------------------------------
// VariantCodec

/// Codec of an enum whose variants carry at most one value.
///
/// A value is encoded as an object with a single field named after its
/// variant. Unit variants hold null.
pub struct VariantCodec<T> {
    variants: Vec<Variant<T>>,
    index: fn(&T) -> usize,
}

impl<T: 'static> Codec<T> for VariantCodec<T> {
    fn encode(&self, core: &CodecCore, value: &T, out: &mut dyn Encoder) -> Result<(), CodecError> {
        let variant = self
            .variants
            .get((self.index)(value))
            .ok_or(CodecError::TypeMismatch {
                expected: core::any::type_name::<T>(),
            })?;

        out.begin_object(1)?;
        out.encode_field(variant.name)?;
        variant.access.encode(core, value, out)?;
        out.end_object()
    }

    fn decode(&self, core: &CodecCore, input: &mut dyn Decoder) -> Result<T, CodecError> {
        let ty = core::any::type_name::<T>();

        input.begin_object()?;
        let Some(name) = input.next_field()? else {
            return Err(CodecError::malformed(
                format!("a variant of `{ty}`"),
                "an empty object",
                input.position(),
            ));
        };
        let Some(variant) = self.variants.iter().find(|v| v.name == name) else {
            return Err(CodecError::InvalidVariant {
                ty,
                name,
                at: At(input.position()),
            });
        };

        let value = variant.access.decode(core, input)?;
        if let Some(extra) = input.next_field()? {
            return Err(CodecError::malformed(
                "a single variant",
                format!("field `{extra}`"),
                input.position(),
            ));
        }
        input.end_object()?;
        Ok(value)
    }
}

// -----------------------------------------------------------------------------
// VariantsBuilder

/// Collects the variants of an enum during derivation.
///
/// Variants must be added in the order `index` numbers them.
pub struct VariantsBuilder<'a, 'c, T> {
    cx: &'a mut Derivation<'c>,
    variants: Vec<Variant<T>>,
    index: fn(&T) -> usize,
}

impl<'a, 'c, T: 'static> VariantsBuilder<'a, 'c, T> {
    #[inline]
    pub fn new(cx: &'a mut Derivation<'c>, index: fn(&T) -> usize) -> Self {
        Self {
            cx,
            variants: Vec::new(),
            index,
        }
    }

    pub fn unit(&mut self, name: &'static str, make: fn() -> T) -> &mut Self {
        self.variants.push(Variant {
            name,
            access: Box::new(UnitVariant { make }),
        });
        self
    }

    pub fn newtype<F: Describe>(
        &mut self,
        name: &'static str,
        wrap: fn(F) -> T,
        peel: fn(&T) -> Option<&F>,
    ) -> Result<&mut Self, CodecError> {
        let codec = self.cx.handle::<F>()?;
        self.variants.push(Variant {
            name,
            access: Box::new(NewtypeVariant { codec, wrap, peel }),
        });
        Ok(self)
    }

    pub fn finish(self) -> Result<Arc<dyn Codec<T>>, CodecError> {
        for (index, variant) in self.variants.iter().enumerate() {
            if self.variants[..index].iter().any(|v| v.name == variant.name) {
                return Err(CodecError::Unsupported {
                    ty: core::any::type_name::<T>(),
                    reason: format!("variant name `{}` is used twice", variant.name),
                });
            }
        }
        Ok(Arc::new(VariantCodec {
            variants: self.variants,
            index: self.index,
        }))
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;

    use crate::format::tokens::{Token, TokenDecoder, TokenEncoder};
    use crate::{CodecCore, CodecError, Describe};

    #[derive(Describe, Debug, PartialEq)]
    enum Command {
        Stop,
        Move(i32),
        #[codec(rename = "say")]
        Speak(String),
        Batch(Vec<Command>),
    }

    #[test]
    fn round_trip() {
        let core = CodecCore::new();
        let command = Command::Batch(vec![
            Command::Move(3),
            Command::Speak("hi".into()),
            Command::Stop,
        ]);

        let mut out = TokenEncoder::new();
        core.encode(&command, &mut out).unwrap();
        let tokens = out.into_tokens();
        assert_eq!(&tokens[..3], &[Token::Object(1), Token::field("Batch"), Token::Array(3)]);
        assert!(tokens.contains(&Token::field("say")));

        let decoded = core.decode::<Command>(&mut TokenDecoder::new(tokens)).unwrap();
        assert_eq!(decoded, command);
    }

    #[test]
    fn rejects_bad_input() {
        let core = CodecCore::new();

        let tokens = vec![Token::Object(1), Token::field("Jump"), Token::Null, Token::EndObject];
        let err = core.decode::<Command>(&mut TokenDecoder::new(tokens)).unwrap_err();
        assert!(matches!(err, CodecError::InvalidVariant { .. }));

        let tokens = vec![
            Token::Object(2),
            Token::field("Stop"),
            Token::Null,
            Token::field("Move"),
            Token::value(1),
            Token::EndObject,
        ];
        let err = core.decode::<Command>(&mut TokenDecoder::new(tokens)).unwrap_err();
        assert!(matches!(err, CodecError::Malformed { .. }));

        let tokens = vec![Token::Object(1), Token::field("Stop"), Token::value(1), Token::EndObject];
        assert!(core.decode::<Command>(&mut TokenDecoder::new(tokens)).is_err());
    }
}
