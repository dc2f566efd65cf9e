use alloc::boxed::Box;
use alloc::sync::Arc;
use core::any::{Any, TypeId};
use core::fmt;

use parking_lot::RwLock;

use crate::dynamic::Hierarchy;
use crate::format::{Decoder, Encoder};
use crate::hash::TypeIdMap;
use crate::object::Constructors;
use crate::registry::{CoreBuilder, Derivation};
use crate::{Codec, CodecError, Config, Describe};

type ErasedMap = TypeIdMap<Box<dyn Any + Send + Sync>>;

// -----------------------------------------------------------------------------
// CodecCore

/// A configured, lazily populated set of codecs.
///
/// The cache maps each type to an `Arc<dyn Codec<T>>`. Derivation runs
/// without holding the cache lock; publishing a result takes the write lock
/// and keeps whichever codec arrived first, so concurrent first requests
/// for one type may derive it twice but every caller ends up with the same
/// instance.
///
/// Cores are independent: two cores with different configurations never
/// share codecs.
pub struct CodecCore {
    config: Config,
    codecs: RwLock<ErasedMap>,
    constructors: ErasedMap,
    hierarchies: ErasedMap,
}

impl CodecCore {
    /// Creates a core with the default [`Config`] and no registrations.
    #[inline]
    pub fn new() -> Self {
        Self::from_parts(Config::default(), TypeIdMap::new(), TypeIdMap::new())
    }

    /// Starts configuring a core.
    #[inline]
    pub fn builder() -> CoreBuilder {
        CoreBuilder::new()
    }

    pub(crate) fn from_parts(
        config: Config,
        constructors: ErasedMap,
        hierarchies: ErasedMap,
    ) -> Self {
        Self {
            config,
            codecs: RwLock::new(TypeIdMap::new()),
            constructors,
            hierarchies,
        }
    }

    #[inline(always)]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the codec of `T`, deriving and caching it on first use.
    pub fn get_codec<T: Describe>(&self) -> Result<Arc<dyn Codec<T>>, CodecError> {
        if let Some(codec) = self.cached::<T>() {
            return Ok(codec);
        }
        Derivation::new(self).resolve::<T>()
    }

    /// Encodes `value` as a `T`.
    #[inline]
    pub fn encode<T: Describe>(&self, value: &T, out: &mut dyn Encoder) -> Result<(), CodecError> {
        self.get_codec::<T>()?.encode(self, value, out)
    }

    /// Decodes a `T`.
    ///
    /// On error nothing of the partially decoded value survives.
    #[inline]
    pub fn decode<T: Describe>(&self, input: &mut dyn Decoder) -> Result<T, CodecError> {
        self.get_codec::<T>()?.decode(self, input)
    }

    /// Returns `true` if the codec of `T` is cached.
    #[inline]
    pub fn contains<T: 'static>(&self) -> bool {
        self.codecs.read().contains(&TypeId::of::<T>())
    }

    /// Number of cached codecs.
    #[inline]
    pub fn len(&self) -> usize {
        self.codecs.read().len()
    }

    pub(crate) fn cached<T: 'static>(&self) -> Option<Arc<dyn Codec<T>>> {
        self.codecs
            .read()
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.downcast_ref::<Arc<dyn Codec<T>>>())
            .cloned()
    }

    /// Stores a derived codec unless another thread was faster.
    ///
    /// Returns the codec that ends up in the cache.
    pub(crate) fn publish<T: 'static>(&self, codec: Arc<dyn Codec<T>>) -> Arc<dyn Codec<T>> {
        let mut codecs = self.codecs.write();
        let entry = codecs.get_or_insert_with(TypeId::of::<T>(), || Box::new(Arc::clone(&codec)));

        match entry.downcast_ref::<Arc<dyn Codec<T>>>() {
            Some(published) => {
                if !Arc::ptr_eq(published, &codec) {
                    log::debug!(
                        "codec for `{}` was published concurrently, discarding ours",
                        core::any::type_name::<T>()
                    );
                }
                Arc::clone(published)
            }
            None => codec,
        }
    }

    /// Stores a codec staged by a successful derivation, keeping any entry
    /// that is already there.
    pub(crate) fn publish_erased(&self, id: TypeId, entry: Box<dyn Any + Send + Sync>) {
        self.codecs.write().get_or_insert_with(id, || entry);
    }

    pub(crate) fn constructors<T: 'static>(&self) -> Option<&Constructors<T>> {
        self.constructors
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.downcast_ref::<Constructors<T>>())
    }

    /// Subtypes registered for the trait object `B`.
    #[inline]
    pub fn hierarchy<B: ?Sized + 'static>(&self) -> Option<&Hierarchy<B>> {
        self.hierarchies
            .get(&TypeId::of::<Box<B>>())
            .and_then(|entry| entry.downcast_ref::<Hierarchy<B>>())
    }
}

impl Default for CodecCore {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CodecCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecCore")
            .field("config", &self.config)
            .field("codecs", &self.len())
            .field("constructors", &self.constructors.len())
            .field("hierarchies", &self.hierarchies.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::sync::Arc;
    use alloc::vec::Vec;
    use std::thread;

    use crate::format::tokens::{TokenDecoder, TokenEncoder};
    use crate::{CodecCore, CodecError, Describe};

    #[derive(Describe, Default, Debug, PartialEq, Clone)]
    #[codec(default)]
    struct Leaf {
        name: String,
        weight: u32,
    }

    #[derive(Describe, Default, Debug, PartialEq, Clone)]
    #[codec(default)]
    struct Tree {
        leaves: Vec<Leaf>,
        children: Vec<Tree>,
    }

    #[test]
    fn codecs_are_cached() {
        let core = CodecCore::new();
        assert!(!core.contains::<Leaf>());

        let first = core.get_codec::<Leaf>().unwrap();
        assert!(core.contains::<Leaf>());
        assert!(core.contains::<String>());
        assert!(core.contains::<u32>());

        let second = core.get_codec::<Leaf>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn cores_are_independent() {
        let a = CodecCore::new();
        let b = CodecCore::new();
        let _ = a.get_codec::<Leaf>().unwrap();
        assert!(!b.contains::<Leaf>());
    }

    #[test]
    fn concurrent_first_access() {
        let core = CodecCore::new();

        let codecs: Vec<_> = thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| core.get_codec::<Tree>().unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let canonical = core.get_codec::<Tree>().unwrap();
        for codec in &codecs {
            assert!(Arc::ptr_eq(codec, &canonical));
        }

        let tree = Tree {
            leaves: vec![Leaf { name: "a".into(), weight: 1 }],
            children: vec![Tree::default()],
        };
        let outputs: Vec<_> = codecs
            .iter()
            .map(|codec| {
                let mut out = TokenEncoder::new();
                codec.encode(&core, &tree, &mut out).unwrap();
                out.into_tokens()
            })
            .collect();
        assert!(outputs.windows(2).all(|pair| pair[0] == pair[1]));

        let mut input = TokenDecoder::new(outputs[0].clone());
        assert_eq!(core.decode::<Tree>(&mut input).unwrap(), tree);
    }

    #[derive(Describe)]
    struct Unbuildable {
        children: Vec<Unbuildable>,
        id: u32,
    }

    #[derive(Describe, Default)]
    #[codec(default)]
    struct Holder {
        name: String,
        items: Vec<Unbuildable>,
    }

    #[test]
    fn failed_derivation_is_not_cached() {
        let core = CodecCore::new();
        let err = core.get_codec::<Unbuildable>().err().unwrap();
        assert!(matches!(err, CodecError::NoConstructor { .. }));
        assert!(core.get_codec::<Vec<Unbuildable>>().is_err());
        assert!(core.get_codec::<Holder>().is_err());
        assert!(!core.contains::<Vec<Unbuildable>>());
        assert!(!core.contains::<String>());
        assert_eq!(core.len(), 0);

        let reversed = CodecCore::new();
        assert!(reversed.get_codec::<Holder>().is_err());
        assert!(reversed.get_codec::<Vec<Unbuildable>>().is_err());
        assert!(reversed.get_codec::<Unbuildable>().is_err());
        assert_eq!(reversed.len(), 0);

        // Unrelated codecs derived afterwards are still cached.
        reversed.get_codec::<Leaf>().unwrap();
        assert!(reversed.contains::<String>());
    }
}
