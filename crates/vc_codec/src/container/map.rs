use alloc::string::String;
use alloc::vec::Vec;
use core::any::{Any, type_name};
use core::marker::PhantomData;

use super::{MapLike, MapProxy};
use crate::format::{Decoder, Encoder};
use crate::{At, Codec, CodecCore, CodecError, CodecHandle};

/// Moves `value` into `B` if both are the same type.
fn cast<A: Any, B: Any>(value: A) -> Option<B> {
    let mut slot = Some(value);
    (&mut slot as &mut dyn Any)
        .downcast_mut::<Option<B>>()
        .and_then(Option::take)
}

// -----------------------------------------------------------------------------
// StringMapCodec

/// Codec of a map keyed by `String`, encoded as an object with one field
/// per entry.
pub struct StringMapCodec<M: MapLike> {
    value: CodecHandle<M::Value>,
    _marker: PhantomData<fn() -> M>,
}

impl<M: MapLike> StringMapCodec<M> {
    /// Only meaningful when the key type of `M` is `String`; other key
    /// types fail on first use.
    #[inline]
    pub fn new(value: CodecHandle<M::Value>) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }
}

impl<M: MapLike> Codec<M> for StringMapCodec<M> {
    fn encode(&self, core: &CodecCore, map: &M, out: &mut dyn Encoder) -> Result<(), CodecError> {
        let codec = self.value.get(core)?;
        out.begin_object(map.len())?;
        for (key, value) in map.entries() {
            let key = (key as &dyn Any)
                .downcast_ref::<String>()
                .ok_or(CodecError::TypeMismatch { expected: "String" })?;
            out.encode_field(key)?;
            codec.encode(core, value, out)?;
        }
        out.end_object()
    }

    fn decode(&self, core: &CodecCore, input: &mut dyn Decoder) -> Result<M, CodecError> {
        let codec = self.value.get(core)?;
        input.begin_object()?;
        let mut proxy = M::proxy(core.config().default_array_size);
        while let Some(name) = input.next_field()? {
            let key = cast::<String, M::Key>(name).ok_or(CodecError::TypeMismatch {
                expected: type_name::<M::Key>(),
            })?;
            let value = codec.decode(core, input)?;
            proxy.insert(key, value).map_err(|e| e.locate(input.position()))?;
        }
        input.end_object()?;
        Ok(proxy.construct())
    }
}

// -----------------------------------------------------------------------------
// EntryMapCodec

/// Codec of a map with arbitrary keys, encoded as an array of entry objects.
///
/// Entry field names come from [`Config::map_key_field`] and
/// [`Config::map_value_field`](crate::Config::map_value_field).
///
/// [`Config::map_key_field`]: crate::Config::map_key_field
pub struct EntryMapCodec<M: MapLike> {
    key: CodecHandle<M::Key>,
    value: CodecHandle<M::Value>,
    _marker: PhantomData<fn() -> M>,
}

impl<M: MapLike> EntryMapCodec<M> {
    #[inline]
    pub fn new(key: CodecHandle<M::Key>, value: CodecHandle<M::Value>) -> Self {
        Self {
            key,
            value,
            _marker: PhantomData,
        }
    }

    #[inline]
    fn check_keys(string_keys_only: bool) -> Result<(), CodecError> {
        if string_keys_only {
            Err(CodecError::UnsupportedMapKey {
                key: type_name::<M::Key>(),
            })
        } else {
            Ok(())
        }
    }
}

impl<M: MapLike> Codec<M> for EntryMapCodec<M> {
    fn encode(&self, core: &CodecCore, map: &M, out: &mut dyn Encoder) -> Result<(), CodecError> {
        Self::check_keys(out.capabilities().string_keys_only)?;
        let (key_codec, value_codec) = (self.key.get(core)?, self.value.get(core)?);
        let config = core.config();

        out.begin_array(map.len())?;
        for (key, value) in map.entries() {
            out.begin_object(2)?;
            out.encode_field(&config.map_key_field)?;
            key_codec.encode(core, key, out)?;
            out.encode_field(&config.map_value_field)?;
            value_codec.encode(core, value, out)?;
            out.end_object()?;
        }
        out.end_array()
    }

    fn decode(&self, core: &CodecCore, input: &mut dyn Decoder) -> Result<M, CodecError> {
        Self::check_keys(input.capabilities().string_keys_only)?;
        let (key_codec, value_codec) = (self.key.get(core)?, self.value.get(core)?);
        let config = core.config();
        let ty = type_name::<M>();

        let reported = input.begin_array()?;
        let mut proxy = M::proxy(config.capacity_hint(reported));
        while input.has_next_element()? {
            input.begin_object()?;
            let mut key = None;
            let mut value = None;
            while let Some(name) = input.next_field()? {
                let seen = if name == config.map_key_field {
                    key.is_some()
                } else if name == config.map_value_field {
                    value.is_some()
                } else if config.fail_on_unrecognised_fields {
                    return Err(CodecError::UnrecognisedField {
                        ty,
                        field: name,
                        at: At(input.position()),
                    });
                } else {
                    input.skip_value()?;
                    continue;
                };
                if seen {
                    return Err(CodecError::DuplicateField {
                        ty,
                        field: name,
                        at: At(input.position()),
                    });
                }
                if name == config.map_key_field {
                    key = Some(key_codec.decode(core, input)?);
                } else {
                    value = Some(value_codec.decode(core, input)?);
                }
            }
            let (key, value) = match (key, value) {
                (Some(key), Some(value)) => (key, value),
                (key, value) => {
                    let mut missing = Vec::new();
                    if key.is_none() {
                        missing.push(config.map_key_field.clone());
                    }
                    if value.is_none() {
                        missing.push(config.map_value_field.clone());
                    }
                    return Err(CodecError::FieldSetMismatch {
                        ty,
                        missing,
                        at: At(input.position()),
                    });
                }
            };
            input.end_object()?;
            proxy.insert(key, value).map_err(|e| e.locate(input.position()))?;
        }
        input.end_array()?;
        Ok(proxy.construct())
    }
}
