use alloc::sync::Arc;

use super::accumulator::ResultAccumulator;
use super::meta::ObjectMeta;
use crate::format::{Decoder, Encoder};
use crate::{At, Codec, CodecCore, CodecError};

// -----------------------------------------------------------------------------
// ObjectCodec

/// Codec of a type described by an [`ObjectMeta`].
pub struct ObjectCodec<T> {
    meta: Arc<ObjectMeta<T>>,
}

impl<T> ObjectCodec<T> {
    #[inline]
    pub fn new(meta: Arc<ObjectMeta<T>>) -> Self {
        Self { meta }
    }
}

impl<T: 'static> Codec<T> for ObjectCodec<T> {
    fn encode(&self, core: &CodecCore, value: &T, out: &mut dyn Encoder) -> Result<(), CodecError> {
        out.begin_object(self.meta.encoded_len())?;
        self.meta.encode_fields(core, value, out)?;
        out.end_object()
    }

    fn decode(&self, core: &CodecCore, input: &mut dyn Decoder) -> Result<T, CodecError> {
        let config = core.config();
        let ty = self.meta.ty().path();

        input.begin_object()?;
        let mut accumulator = ResultAccumulator::new(Arc::clone(&self.meta));
        while let Some(name) = input.next_field()? {
            if accumulator.accept(core, &name, input)? {
                continue;
            }
            if config.fail_on_unrecognised_fields {
                return Err(CodecError::UnrecognisedField {
                    ty,
                    field: name,
                    at: At(input.position()),
                });
            }
            log::trace!("skipping unknown field `{name}` of `{ty}`");
            input.skip_value()?;
        }

        if config.require_exact_fields || input.capabilities().exact_fields {
            let missing = accumulator.missing();
            if !missing.is_empty() {
                return Err(CodecError::FieldSetMismatch {
                    ty,
                    missing,
                    at: At(input.position()),
                });
            }
        }
        input.end_object()?;

        accumulator.construct()
    }

    #[inline]
    fn object_meta(&self) -> Option<&Arc<ObjectMeta<T>>> {
        Some(&self.meta)
    }
}
