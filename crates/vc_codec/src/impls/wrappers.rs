use alloc::boxed::Box;
use alloc::sync::Arc;

use crate::format::{Decoder, Encoder};
use crate::registry::Derivation;
use crate::{Codec, CodecCore, CodecError, CodecHandle, Describe};

// -----------------------------------------------------------------------------
// Option

/// `None` is null; `Some` is the inner value.
///
/// The inner type must not be nullable itself, see [`Describe::nullable`].
pub struct OptionCodec<T> {
    inner: CodecHandle<T>,
}

impl<T: Describe> Codec<Option<T>> for OptionCodec<T> {
    fn encode(&self, core: &CodecCore, value: &Option<T>, out: &mut dyn Encoder) -> Result<(), CodecError> {
        match value {
            Some(value) => self.inner.encode(core, value, out),
            None => out.encode_null(),
        }
    }

    fn decode(&self, core: &CodecCore, input: &mut dyn Decoder) -> Result<Option<T>, CodecError> {
        if input.decode_null()? {
            return Ok(None);
        }
        self.inner.decode(core, input).map(Some)
    }
}

impl<T: Describe> Describe for Option<T> {
    fn derive(cx: &mut Derivation<'_>) -> Result<Arc<dyn Codec<Self>>, CodecError> {
        if T::nullable() {
            return Err(CodecError::Unsupported {
                ty: core::any::type_name::<Self>(),
                reason: "`None` and a present null value would encode the same".into(),
            });
        }
        Ok(Arc::new(OptionCodec { inner: cx.handle::<T>()? }))
    }

    #[inline]
    fn nullable() -> bool {
        true
    }
}

// -----------------------------------------------------------------------------
// Box

/// A box is encoded as its contents.
///
/// Boxing is how a type refers to itself; the inner handle may be a
/// forward reference.
pub struct BoxCodec<T> {
    inner: CodecHandle<T>,
}

impl<T: Describe> Codec<Box<T>> for BoxCodec<T> {
    #[inline]
    fn encode(&self, core: &CodecCore, value: &Box<T>, out: &mut dyn Encoder) -> Result<(), CodecError> {
        self.inner.encode(core, value, out)
    }

    #[inline]
    fn decode(&self, core: &CodecCore, input: &mut dyn Decoder) -> Result<Box<T>, CodecError> {
        self.inner.decode(core, input).map(Box::new)
    }
}

impl<T: Describe> Describe for Box<T> {
    fn derive(cx: &mut Derivation<'_>) -> Result<Arc<dyn Codec<Self>>, CodecError> {
        Ok(Arc::new(BoxCodec { inner: cx.handle::<T>()? }))
    }

    #[inline]
    fn nullable() -> bool {
        T::nullable()
    }
}
