use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use core::any::{Any, TypeId};
use core::fmt;

use crate::dynamic::{Dynamic, HierarchyDraft, PendingHierarchy};
use crate::hash::TypeIdMap;
use crate::object::{Args, Constructors, FieldBuilder, FieldMap, builder_fn};
use crate::{CodecCore, CodecError, Config, Describe};

// -----------------------------------------------------------------------------
// CoreBuilder

/// Configures a [`CodecCore`].
///
/// Everything registered here is frozen by [`CoreBuilder::build`].
///
/// ```
/// use vc_codec::{CodecCore, Config, Describe, FieldNaming};
/// use vc_codec::object::Args;
///
/// #[derive(Describe, Debug, PartialEq)]
/// struct Money {
///     amount: i64,
///     currency: String,
/// }
///
/// let core = CodecCore::builder()
///     .config(Config::default().with_field_naming(FieldNaming::CamelCase))
///     .positional_constructor(|args: &mut Args| {
///         Ok(Money { amount: args.next()?, currency: args.next()? })
///     })
///     .build()
///     .unwrap();
///
/// assert!(core.get_codec::<Money>().is_ok());
/// ```
pub struct CoreBuilder {
    config: Config,
    constructors: TypeIdMap<Box<dyn Any + Send + Sync>>,
    hierarchies: TypeIdMap<Box<dyn PendingHierarchy>>,
}

impl CoreBuilder {
    #[inline]
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            constructors: TypeIdMap::new(),
            hierarchies: TypeIdMap::new(),
        }
    }

    /// Replaces the configuration.
    #[inline]
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Edits the configuration in place.
    #[inline]
    pub fn configure(mut self, f: impl FnOnce(&mut Config)) -> Self {
        f(&mut self.config);
        self
    }

    /// Builds `T` from its decoded fields looked up by declared name.
    ///
    /// Takes precedence over every other construction strategy of `T`.
    pub fn named_constructor<T: Describe>(
        mut self,
        f: impl Fn(&mut FieldMap) -> Result<T, CodecError> + Send + Sync + 'static,
    ) -> Self {
        self.update_constructors::<T>(|c| c.named = Some(Arc::new(f)));
        self
    }

    /// Builds `T` from its decoded fields in declaration order.
    ///
    /// A parent field comes first.
    pub fn positional_constructor<T: Describe>(
        mut self,
        f: impl Fn(&mut Args) -> Result<T, CodecError> + Send + Sync + 'static,
    ) -> Self {
        self.update_constructors::<T>(|c| c.positional = Some(Arc::new(f)));
        self
    }

    /// Builds `T` by feeding the decoded fields to a fresh `B`.
    pub fn builder_constructor<T: Describe, B: FieldBuilder<T>>(mut self) -> Self {
        self.update_constructors::<T>(|c| c.builder = Some(builder_fn::<T, B>()));
        self
    }

    /// Registers `S` as an implementation of the trait object `B`.
    ///
    /// Its tag name follows [`Config::type_naming`].
    pub fn subtype<B, S>(mut self, upcast: fn(S) -> Box<B>) -> Self
    where
        B: ?Sized + Dynamic,
        S: Describe,
    {
        self.update_hierarchy::<B>(|h| h.add::<S>(None, upcast));
        self
    }

    /// Registers `S` as an implementation of `B` under an explicit tag name.
    pub fn subtype_named<B, S>(mut self, name: impl Into<String>, upcast: fn(S) -> Box<B>) -> Self
    where
        B: ?Sized + Dynamic,
        S: Describe,
    {
        let name = name.into();
        self.update_hierarchy::<B>(|h| h.add::<S>(Some(name), upcast));
        self
    }

    /// Registers `S` as the implementation of `B` used for untagged values.
    ///
    /// Values of `S` are encoded without a tag.
    pub fn default_subtype<B, S>(mut self, upcast: fn(S) -> Box<B>) -> Self
    where
        B: ?Sized + Dynamic,
        S: Describe,
    {
        self.update_hierarchy::<B>(|h| {
            h.add::<S>(None, upcast);
            h.set_default::<S>();
        });
        self
    }

    /// Validates the registrations and freezes them into a core.
    pub fn build(self) -> Result<CodecCore, CodecError> {
        let Self {
            config,
            constructors,
            mut hierarchies,
        } = self;

        config.validate()?;

        let mut finished = TypeIdMap::new();
        for (type_id, draft) in hierarchies.drain() {
            finished.insert(type_id, draft.finish(&config)?);
        }

        log::debug!(
            "built codec core with {} constructor sets and {} hierarchies",
            constructors.len(),
            finished.len()
        );
        Ok(CodecCore::from_parts(config, constructors, finished))
    }

    fn update_constructors<T: 'static>(&mut self, f: impl FnOnce(&mut Constructors<T>)) {
        let entry = self
            .constructors
            .get_or_insert_with(TypeId::of::<T>(), || Box::new(Constructors::<T>::default()));
        if let Some(constructors) = entry.downcast_mut::<Constructors<T>>() {
            f(constructors);
        }
    }

    fn update_hierarchy<B: ?Sized + Dynamic>(&mut self, f: impl FnOnce(&mut HierarchyDraft<B>)) {
        let entry = self
            .hierarchies
            .get_or_insert_with(TypeId::of::<Box<B>>(), || Box::new(HierarchyDraft::<B>::new()));
        let entry: &mut dyn Any = &mut **entry;
        if let Some(draft) = entry.downcast_mut::<HierarchyDraft<B>>() {
            f(draft);
        }
    }
}

impl Default for CoreBuilder {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CoreBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoreBuilder")
            .field("config", &self.config)
            .field("constructors", &self.constructors.len())
            .field("hierarchies", &self.hierarchies.len())
            .finish()
    }
}
