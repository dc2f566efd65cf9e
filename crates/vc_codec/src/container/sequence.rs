use core::marker::PhantomData;

use super::{SequenceLike, SequenceProxy};
use crate::format::{Decoder, Encoder, PrimitiveOps};
use crate::{Codec, CodecCore, CodecError, CodecHandle};

// -----------------------------------------------------------------------------
// Shared loop

fn decode_items<C: SequenceLike>(
    core: &CodecCore,
    input: &mut dyn Decoder,
    mut item: impl FnMut(&mut dyn Decoder) -> Result<C::Item, CodecError>,
) -> Result<C, CodecError> {
    let reported = input.begin_array()?;
    let mut proxy = C::proxy(core.config().capacity_hint(reported));
    while input.has_next_element()? {
        let value = item(input)?;
        proxy.push(value).map_err(|e| e.locate(input.position()))?;
    }
    input.end_array()?;
    proxy.construct().map_err(|e| e.locate(input.position()))
}

// -----------------------------------------------------------------------------
// SequenceCodec

/// Codec of a sequence whose items have their own codec.
pub struct SequenceCodec<C: SequenceLike> {
    item: CodecHandle<C::Item>,
    _marker: PhantomData<fn() -> C>,
}

impl<C: SequenceLike> SequenceCodec<C> {
    #[inline]
    pub fn new(item: CodecHandle<C::Item>) -> Self {
        Self {
            item,
            _marker: PhantomData,
        }
    }
}

impl<C: SequenceLike> Codec<C> for SequenceCodec<C> {
    fn encode(&self, core: &CodecCore, value: &C, out: &mut dyn Encoder) -> Result<(), CodecError> {
        let codec = self.item.get(core)?;
        out.begin_array(value.len())?;
        for item in value.items() {
            codec.encode(core, item, out)?;
        }
        out.end_array()
    }

    fn decode(&self, core: &CodecCore, input: &mut dyn Decoder) -> Result<C, CodecError> {
        let codec = self.item.get(core)?;
        decode_items(core, input, |input| codec.decode(core, input))
    }
}

// -----------------------------------------------------------------------------
// PrimitiveArrayCodec

/// Codec of a sequence of primitives, read and written without item codecs.
pub struct PrimitiveArrayCodec<C: SequenceLike> {
    ops: PrimitiveOps<C::Item>,
}

impl<C: SequenceLike> PrimitiveArrayCodec<C> {
    #[inline]
    pub fn new(ops: PrimitiveOps<C::Item>) -> Self {
        Self { ops }
    }
}

impl<C: SequenceLike> Codec<C> for PrimitiveArrayCodec<C> {
    fn encode(&self, _: &CodecCore, value: &C, out: &mut dyn Encoder) -> Result<(), CodecError> {
        out.begin_array(value.len())?;
        for item in value.items() {
            self.ops.encode(item, out)?;
        }
        out.end_array()
    }

    #[inline]
    fn decode(&self, core: &CodecCore, input: &mut dyn Decoder) -> Result<C, CodecError> {
        decode_items(core, input, |input| self.ops.decode(input))
    }
}
