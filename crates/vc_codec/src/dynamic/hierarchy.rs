use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;

use super::Dynamic;
use crate::format::{Decoder, Encoder};
use crate::hash::HashMap;
use crate::{CodecCore, CodecError, Config, Describe, TypeDesc};

type EncodeFn<B> = fn(&CodecCore, &B, &mut dyn Encoder) -> Result<(), CodecError>;
type DecodeFn<B> =
    Arc<dyn Fn(&CodecCore, &mut dyn Decoder) -> Result<Box<B>, CodecError> + Send + Sync>;

// -----------------------------------------------------------------------------
// Subtype

/// One registered implementation of a trait object.
pub(crate) struct Subtype<B: ?Sized> {
    pub ty: TypeDesc,
    pub name: String,
    pub encode: EncodeFn<B>,
    pub decode: DecodeFn<B>,
}

fn encode_as<B, S>(core: &CodecCore, value: &B, out: &mut dyn Encoder) -> Result<(), CodecError>
where
    B: ?Sized + Dynamic,
    S: Describe,
{
    let value = value
        .as_any()
        .downcast_ref::<S>()
        .ok_or(CodecError::TypeMismatch {
            expected: core::any::type_name::<S>(),
        })?;
    core.get_codec::<S>()?.encode(core, value, out)
}

#[inline]
fn decode_fn<B, F>(f: F) -> DecodeFn<B>
where
    B: ?Sized,
    F: Fn(&CodecCore, &mut dyn Decoder) -> Result<Box<B>, CodecError> + Send + Sync + 'static,
{
    Arc::new(f)
}

// -----------------------------------------------------------------------------
// Hierarchy

/// The registered implementations of the trait object `B`.
///
/// Indexed by runtime type for encoding and by tag name for decoding.
pub struct Hierarchy<B: ?Sized> {
    subtypes: Vec<Subtype<B>>,
    by_type: HashMap<TypeId, usize>,
    by_name: HashMap<String, usize>,
    default: Option<usize>,
}

impl<B: ?Sized + 'static> Hierarchy<B> {
    #[inline]
    pub(crate) fn by_type(&self, type_id: TypeId) -> Option<(usize, &Subtype<B>)> {
        let index = *self.by_type.get(&type_id)?;
        Some((index, &self.subtypes[index]))
    }

    #[inline]
    pub(crate) fn by_name(&self, name: &str) -> Option<&Subtype<B>> {
        self.by_name.get(name).map(|&index| &self.subtypes[index])
    }

    #[inline]
    pub(crate) fn default_index(&self) -> Option<usize> {
        self.default
    }

    #[inline]
    pub(crate) fn default_subtype(&self) -> Option<&Subtype<B>> {
        self.default.map(|index| &self.subtypes[index])
    }

    /// Tag names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.subtypes.iter().map(|s| s.name.as_str())
    }

    /// The subtype decoded from untagged values, if any.
    #[inline]
    pub fn default_type(&self) -> Option<TypeDesc> {
        self.default_subtype().map(|s| s.ty)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.subtypes.len()
    }
}

impl<B: ?Sized> fmt::Debug for Hierarchy<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.subtypes.iter().map(|s| (&s.name, s.ty)))
            .finish()
    }
}

// -----------------------------------------------------------------------------
// HierarchyDraft

struct DraftEntry<B: ?Sized> {
    ty: TypeDesc,
    alias: Option<String>,
    encode: EncodeFn<B>,
    decode: DecodeFn<B>,
}

/// Subtypes registered on a builder; names are assigned once the
/// configuration is final.
pub(crate) struct HierarchyDraft<B: ?Sized> {
    entries: Vec<DraftEntry<B>>,
    default: Option<TypeId>,
}

impl<B: ?Sized + Dynamic> HierarchyDraft<B> {
    #[inline]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            default: None,
        }
    }

    /// Adds `S`, replacing an earlier registration of the same type.
    pub fn add<S: Describe>(&mut self, alias: Option<String>, upcast: fn(S) -> Box<B>) {
        let ty = TypeDesc::of::<S>();
        let entry = DraftEntry {
            ty,
            alias,
            encode: encode_as::<B, S>,
            decode: decode_fn(move |core, input| {
                core.get_codec::<S>()?.decode(core, input).map(upcast)
            }),
        };

        match self.entries.iter_mut().find(|e| e.ty == ty) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    #[inline]
    pub fn set_default<S: Describe>(&mut self) {
        self.default = Some(TypeId::of::<S>());
    }
}

/// A type-erased [`HierarchyDraft`].
pub(crate) trait PendingHierarchy: Any + Send + Sync {
    fn finish(self: Box<Self>, config: &Config) -> Result<Box<dyn Any + Send + Sync>, CodecError>;
}

impl<B: ?Sized + Dynamic> PendingHierarchy for HierarchyDraft<B> {
    fn finish(self: Box<Self>, config: &Config) -> Result<Box<dyn Any + Send + Sync>, CodecError> {
        let Self { entries, default } = *self;
        let mut hierarchy = Hierarchy::<B> {
            subtypes: Vec::with_capacity(entries.len()),
            by_type: HashMap::default(),
            by_name: HashMap::default(),
            default: None,
        };

        for entry in entries {
            let name = match entry.alias {
                Some(alias) => alias,
                None => config.type_naming.apply(entry.ty.path()),
            };
            if let Some(&other) = hierarchy.by_name.get(&name) {
                return Err(CodecError::DuplicateTypeName {
                    name,
                    first: hierarchy.subtypes[other].ty.path(),
                    second: entry.ty.path(),
                });
            }

            let index = hierarchy.subtypes.len();
            hierarchy.by_type.insert(entry.ty.id(), index);
            hierarchy.by_name.insert(name.clone(), index);
            if default == Some(entry.ty.id()) {
                hierarchy.default = Some(index);
            }
            hierarchy.subtypes.push(Subtype {
                ty: entry.ty,
                name,
                encode: entry.encode,
                decode: entry.decode,
            });
        }

        log::debug!(
            "registered {} subtypes of `{}`",
            hierarchy.len(),
            core::any::type_name::<B>()
        );
        Ok(Box::new(hierarchy))
    }
}
