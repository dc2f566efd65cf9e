use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::{Any, TypeId};

use crate::{Codec, CodecCore, CodecError, CodecHandle, Config, Describe, TypeDesc};

// -----------------------------------------------------------------------------
// Derivation

/// State of one derivation request.
///
/// Passed to [`Describe::derive`]. Tracks the types whose derivation is in
/// progress on this call stack, so a type that refers back to itself gets a
/// deferred [`CodecHandle`] instead of recursing forever.
///
/// Codecs derived along the way are staged and only published to the core
/// once the outermost request succeeds. A failed request leaves the cache
/// as it was.
pub struct Derivation<'a> {
    core: &'a CodecCore,
    in_progress: Vec<TypeDesc>,
    staged: Vec<(TypeId, Box<dyn Any + Send + Sync>)>,
}

impl<'a> Derivation<'a> {
    #[inline]
    pub(crate) fn new(core: &'a CodecCore) -> Self {
        Self {
            core,
            in_progress: Vec::new(),
            staged: Vec::new(),
        }
    }

    #[inline(always)]
    pub fn core(&self) -> &'a CodecCore {
        self.core
    }

    #[inline(always)]
    pub fn config(&self) -> &'a Config {
        self.core.config()
    }

    /// Returns `true` if `T` is being derived further up the call stack.
    #[inline]
    pub fn is_in_progress<T: 'static>(&self) -> bool {
        let ty = TypeDesc::of::<T>();
        self.in_progress.contains(&ty)
    }

    /// Returns a handle to the codec of `T`.
    ///
    /// The handle is deferred if `T` is in progress, ready otherwise.
    pub fn handle<T: Describe>(&mut self) -> Result<CodecHandle<T>, CodecError> {
        if self.is_in_progress::<T>() {
            log::trace!("forward reference to `{}`", core::any::type_name::<T>());
            return Ok(CodecHandle::deferred());
        }
        self.resolve::<T>().map(CodecHandle::ready)
    }

    /// Returns the codec of `T`, deriving it if needed.
    ///
    /// Fails if `T` is in progress; use [`Derivation::handle`] for
    /// references that may be recursive.
    pub fn resolve<T: Describe>(&mut self) -> Result<Arc<dyn Codec<T>>, CodecError> {
        if let Some(codec) = self.core.cached::<T>() {
            return Ok(codec);
        }
        if let Some(codec) = self.find_staged::<T>() {
            return Ok(codec);
        }

        let ty = TypeDesc::of::<T>();
        if self.in_progress.contains(&ty) {
            return Err(CodecError::Unsupported {
                ty: ty.path(),
                reason: "the type contains itself without indirection".into(),
            });
        }

        let mark = self.staged.len();
        self.in_progress.push(ty);
        let derived = T::derive(self);
        self.in_progress.pop();

        let codec = match derived {
            Ok(codec) => codec,
            Err(err) => {
                // Anything derived below a failed type may hold a forward
                // reference to it.
                self.staged.truncate(mark);
                return Err(err);
            }
        };
        log::debug!("derived codec for `{ty}`");

        if !self.in_progress.is_empty() {
            self.staged.push((ty.id(), Box::new(Arc::clone(&codec))));
            return Ok(codec);
        }

        for (id, entry) in self.staged.drain(..) {
            self.core.publish_erased(id, entry);
        }
        Ok(self.core.publish(codec))
    }

    fn find_staged<T: 'static>(&self) -> Option<Arc<dyn Codec<T>>> {
        let id = TypeId::of::<T>();
        self.staged
            .iter()
            .find(|(staged, _)| *staged == id)
            .and_then(|(_, entry)| entry.downcast_ref::<Arc<dyn Codec<T>>>())
            .cloned()
    }
}
