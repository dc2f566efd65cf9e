use alloc::sync::Arc;
use core::fmt;
use std::sync::OnceLock;

use crate::format::{Decoder, Encoder};
use crate::object::ObjectMeta;
use crate::{CodecCore, CodecError, Describe};

// -----------------------------------------------------------------------------
// Codec

/// Encodes and decodes values of one type through any format.
///
/// Codecs are built once per [`CodecCore`] and shared between threads. All
/// per-call state lives on the stack of `encode`/`decode`.
pub trait Codec<T>: Send + Sync + 'static {
    fn encode(&self, core: &CodecCore, value: &T, out: &mut dyn Encoder)
    -> Result<(), CodecError>;

    fn decode(&self, core: &CodecCore, input: &mut dyn Decoder) -> Result<T, CodecError>;

    /// The field layout, for codecs of object types.
    ///
    /// Used to encode a parent object inline.
    #[inline]
    fn object_meta(&self) -> Option<&Arc<ObjectMeta<T>>> {
        None
    }
}

// -----------------------------------------------------------------------------
// CodecHandle

/// A reference from one codec to the codec of a nested type.
///
/// A type that is still being derived when it is referenced again (a
/// recursive type) cannot hand out its codec yet. The handle then defers
/// the lookup to first use and memoises the result.
pub struct CodecHandle<T> {
    inner: Inner<T>,
}

enum Inner<T> {
    Ready(Arc<dyn Codec<T>>),
    Deferred(OnceLock<Arc<dyn Codec<T>>>),
}

impl<T> CodecHandle<T> {
    #[inline]
    pub fn ready(codec: Arc<dyn Codec<T>>) -> Self {
        Self {
            inner: Inner::Ready(codec),
        }
    }

    #[inline]
    pub fn deferred() -> Self {
        Self {
            inner: Inner::Deferred(OnceLock::new()),
        }
    }

    /// Returns `true` if the handle has not resolved its codec yet.
    #[inline]
    pub fn is_pending(&self) -> bool {
        match &self.inner {
            Inner::Ready(_) => false,
            Inner::Deferred(cell) => cell.get().is_none(),
        }
    }
}

impl<T: Describe> CodecHandle<T> {
    /// Returns the codec, resolving a deferred handle through `core`.
    pub fn get(&self, core: &CodecCore) -> Result<&dyn Codec<T>, CodecError> {
        match &self.inner {
            Inner::Ready(codec) => Ok(&**codec),
            Inner::Deferred(cell) => {
                if let Some(codec) = cell.get() {
                    return Ok(&**codec);
                }
                let codec = core.get_codec::<T>()?;
                log::trace!("resolved forward reference to `{}`", core::any::type_name::<T>());
                Ok(&**cell.get_or_init(|| codec))
            }
        }
    }

    #[inline]
    pub fn encode(&self, core: &CodecCore, value: &T, out: &mut dyn Encoder) -> Result<(), CodecError> {
        self.get(core)?.encode(core, value, out)
    }

    #[inline]
    pub fn decode(&self, core: &CodecCore, input: &mut dyn Decoder) -> Result<T, CodecError> {
        self.get(core)?.decode(core, input)
    }
}

impl<T> fmt::Debug for CodecHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.inner {
            Inner::Ready(_) => "ready",
            Inner::Deferred(cell) if cell.get().is_some() => "resolved",
            Inner::Deferred(_) => "deferred",
        };
        f.debug_tuple("CodecHandle")
            .field(&core::any::type_name::<T>())
            .field(&state)
            .finish()
    }
}
