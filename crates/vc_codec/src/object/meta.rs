use alloc::borrow::ToOwned;
use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use super::accumulator::{Accumulate, ResultAccumulator};
use super::codec::ObjectCodec;
use super::construct::{Construction, FieldValue, Staged};
use crate::format::{Decoder, Encoder};
use crate::hash::HashMap;
use crate::registry::Derivation;
use crate::{Codec, CodecCore, CodecError, CodecHandle, Describe, TypeDesc};

// -----------------------------------------------------------------------------
// Field access

/// Typed access to one field of `T`, erased over the field type.
pub(crate) trait FieldAccess<T>: Send + Sync {
    fn encode(&self, core: &CodecCore, this: &T, out: &mut dyn Encoder) -> Result<(), CodecError>;

    fn decode(&self, core: &CodecCore, input: &mut dyn Decoder) -> Result<FieldValue, CodecError>;

    fn assign(&self, this: &mut T, value: FieldValue) -> Result<(), CodecError>;
}

struct Accessor<T, F> {
    codec: CodecHandle<F>,
    get: fn(&T) -> &F,
    set: fn(&mut T, F),
}

impl<T: 'static, F: Describe> FieldAccess<T> for Accessor<T, F> {
    #[inline]
    fn encode(&self, core: &CodecCore, this: &T, out: &mut dyn Encoder) -> Result<(), CodecError> {
        self.codec.encode(core, (self.get)(this), out)
    }

    #[inline]
    fn decode(&self, core: &CodecCore, input: &mut dyn Decoder) -> Result<FieldValue, CodecError> {
        self.codec.decode(core, input).map(FieldValue::new)
    }

    #[inline]
    fn assign(&self, this: &mut T, value: FieldValue) -> Result<(), CodecError> {
        (self.set)(this, value.take::<F>()?);
        Ok(())
    }
}

/// Access to the parent object embedded in `T`.
pub(crate) trait ParentAccess<T>: Send + Sync {
    fn encoded_len(&self) -> usize;

    fn encode_fields(&self, core: &CodecCore, this: &T, out: &mut dyn Encoder) -> Result<(), CodecError>;

    /// External names of the parent's fields.
    fn names(&self) -> Vec<String>;

    fn start(&self) -> Box<dyn Accumulate>;

    fn assign(&self, this: &mut T, value: FieldValue) -> Result<(), CodecError>;
}

struct ParentAccessor<T, P> {
    meta: Arc<ObjectMeta<P>>,
    get: fn(&T) -> &P,
    set: fn(&mut T, P),
}

impl<T: 'static, P: 'static> ParentAccess<T> for ParentAccessor<T, P> {
    #[inline]
    fn encoded_len(&self) -> usize {
        self.meta.encoded_len()
    }

    #[inline]
    fn encode_fields(&self, core: &CodecCore, this: &T, out: &mut dyn Encoder) -> Result<(), CodecError> {
        self.meta.encode_fields(core, (self.get)(this), out)
    }

    #[inline]
    fn names(&self) -> Vec<String> {
        self.meta.field_names().map(ToOwned::to_owned).collect()
    }

    #[inline]
    fn start(&self) -> Box<dyn Accumulate> {
        Box::new(ResultAccumulator::new(Arc::clone(&self.meta)))
    }

    #[inline]
    fn assign(&self, this: &mut T, value: FieldValue) -> Result<(), CodecError> {
        (self.set)(this, value.take::<P>()?);
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Field

/// One encoded field of an object type.
pub struct Field<T> {
    name: String,
    declared: &'static str,
    pub(crate) access: Box<dyn FieldAccess<T>>,
}

impl<T> Field<T> {
    /// The name used in encoded data.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name in the Rust declaration.
    #[inline]
    pub fn declared(&self) -> &'static str {
        self.declared
    }
}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("declared", &self.declared)
            .finish_non_exhaustive()
    }
}

pub(crate) struct Parent<T> {
    pub declared: &'static str,
    pub access: Box<dyn ParentAccess<T>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Route {
    Field(usize),
    Parent,
}

// -----------------------------------------------------------------------------
// ObjectMeta

/// Field layout and construction strategy of an object type.
///
/// Fields of an embedded parent come first and keep the parent's names.
/// Own fields whose names collide with them are prefixed with
/// [`Config::shadow_marker`](crate::Config::shadow_marker).
pub struct ObjectMeta<T> {
    ty: TypeDesc,
    pub(crate) fields: Vec<Field<T>>,
    pub(crate) parent: Option<Parent<T>>,
    pub(crate) routes: HashMap<String, Route>,
    pub(crate) construction: Construction<T>,
}

impl<T: 'static> ObjectMeta<T> {
    #[inline(always)]
    pub fn ty(&self) -> TypeDesc {
        self.ty
    }

    /// Own fields in declaration order, without the parent.
    #[inline]
    pub fn fields(&self) -> &[Field<T>] {
        &self.fields
    }

    /// Declared name of the parent field, if there is one.
    #[inline]
    pub fn parent(&self) -> Option<&'static str> {
        self.parent.as_ref().map(|p| p.declared)
    }

    /// Name of the construction strategy.
    #[inline]
    pub fn construction(&self) -> &'static str {
        self.construction.name()
    }

    /// Number of fields written per object, parent fields included.
    pub fn encoded_len(&self) -> usize {
        let parent = self.parent.as_ref().map_or(0, |p| p.access.encoded_len());
        parent + self.fields.len()
    }

    /// External names in encoding order, parent fields included.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        let parent = match &self.parent {
            Some(parent) => parent.access.names(),
            None => Vec::new(),
        };
        let mut names: Vec<&str> = Vec::with_capacity(parent.len() + self.fields.len());
        for name in &parent {
            if let Some((key, _)) = self.routes.get_key_value(name.as_str()) {
                names.push(key.as_str());
            }
        }
        names.extend(self.fields.iter().map(Field::name));
        names.into_iter()
    }

    /// Writes every field name and value, without object framing.
    pub fn encode_fields(&self, core: &CodecCore, this: &T, out: &mut dyn Encoder) -> Result<(), CodecError> {
        if let Some(parent) = &self.parent {
            parent.access.encode_fields(core, this, out)?;
        }
        for field in &self.fields {
            out.encode_field(&field.name)?;
            field.access.encode(core, this, out)?;
        }
        Ok(())
    }

    #[inline]
    pub(crate) fn route(&self, name: &str) -> Option<Route> {
        self.routes.get(name).copied()
    }

    /// Pairs declared names with decoded values, parent first.
    pub(crate) fn stage(&self, parent: Option<FieldValue>, slots: Vec<Option<FieldValue>>) -> Staged {
        let mut staged = Vec::with_capacity(slots.len() + 1);
        if let Some(p) = &self.parent {
            staged.push((p.declared, parent));
        }
        staged.extend(self.fields.iter().map(Field::declared).zip(slots));
        staged
    }
}

impl<T> fmt::Debug for ObjectMeta<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectMeta")
            .field("ty", &self.ty)
            .field("fields", &self.fields)
            .field("parent", &self.parent.as_ref().map(|p| p.declared))
            .field("construction", &self.construction.name())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// ObjectBuilder

struct PendingField<T> {
    declared: &'static str,
    rename: Option<&'static str>,
    access: Box<dyn FieldAccess<T>>,
}

/// Describes an object type during derivation.
///
/// This is what `#[derive(Describe)]` expands to for structs with named
/// fields; hand-written [`Describe`] impls use it the same way.
///
/// ```
/// use std::sync::Arc;
/// use vc_codec::object::ObjectBuilder;
/// use vc_codec::registry::Derivation;
/// use vc_codec::{Codec, CodecCore, CodecError, Describe};
///
/// #[derive(Default)]
/// struct Version {
///     major: u16,
///     minor: u16,
/// }
///
/// impl Describe for Version {
///     fn derive(cx: &mut Derivation<'_>) -> Result<Arc<dyn Codec<Self>>, CodecError> {
///         let mut object = ObjectBuilder::<Self>::with_default(cx, Version::default);
///         object.field::<u16>("major", None, |v| &v.major, |v, x| v.major = x)?;
///         object.field::<u16>("minor", Some("rev"), |v| &v.minor, |v, x| v.minor = x)?;
///         object.finish()
///     }
/// }
///
/// let core = CodecCore::new();
/// let codec = core.get_codec::<Version>().unwrap();
/// let names: Vec<_> = codec.object_meta().unwrap().field_names().collect();
/// assert_eq!(names, ["major", "rev"]);
/// ```
pub struct ObjectBuilder<'a, 'c, T> {
    cx: &'a mut Derivation<'c>,
    fields: Vec<PendingField<T>>,
    parent: Option<Parent<T>>,
    construction: Construction<T>,
}

impl<'a, 'c, T: 'static> ObjectBuilder<'a, 'c, T> {
    /// Starts an object built by a constructor registered on the core.
    ///
    /// Fails with [`CodecError::NoConstructor`] before any field is
    /// derived if `T` has none.
    #[inline]
    pub fn new(cx: &'a mut Derivation<'c>) -> Result<Self, CodecError> {
        let construction = Construction::select(cx.core().constructors::<T>(), None)
            .ok_or(CodecError::NoConstructor { ty: core::any::type_name::<T>() })?;
        Ok(Self::from_parts(cx, construction))
    }

    /// Starts an object that falls back to mutating `make()` when no
    /// constructor of `T` is registered on the core.
    #[inline]
    pub fn with_default(cx: &'a mut Derivation<'c>, make: fn() -> T) -> Self {
        let construction = match Construction::select(cx.core().constructors::<T>(), None) {
            Some(registered) => registered,
            None => Construction::Mutation(make),
        };
        Self::from_parts(cx, construction)
    }

    #[inline]
    fn from_parts(cx: &'a mut Derivation<'c>, construction: Construction<T>) -> Self {
        Self {
            cx,
            fields: Vec::new(),
            parent: None,
            construction,
        }
    }

    /// Adds a field.
    ///
    /// Its external name is `rename` if given, otherwise `declared` under
    /// the configured [`FieldNaming`](crate::FieldNaming).
    pub fn field<F: Describe>(
        &mut self,
        declared: &'static str,
        rename: Option<&'static str>,
        get: fn(&T) -> &F,
        set: fn(&mut T, F),
    ) -> Result<&mut Self, CodecError> {
        let codec = self.cx.handle::<F>()?;
        self.fields.push(PendingField {
            declared,
            rename,
            access: Box::new(Accessor { codec, get, set }),
        });
        Ok(self)
    }

    /// Adds the parent object, whose fields are encoded inline.
    ///
    /// `P` must be an object type that does not contain `T`. At most one
    /// parent is allowed.
    pub fn parent<P: Describe>(
        &mut self,
        declared: &'static str,
        get: fn(&T) -> &P,
        set: fn(&mut T, P),
    ) -> Result<&mut Self, CodecError> {
        let ty = core::any::type_name::<T>();
        let parent = core::any::type_name::<P>();

        if self.parent.is_some() {
            return Err(CodecError::InvalidParent {
                ty,
                reason: "only one field can be the parent".into(),
            });
        }
        if self.cx.is_in_progress::<P>() {
            return Err(CodecError::InvalidParent {
                ty,
                reason: format!("`{parent}` contains `{ty}`"),
            });
        }

        let codec = self.cx.resolve::<P>()?;
        let Some(meta) = codec.object_meta() else {
            return Err(CodecError::InvalidParent {
                ty,
                reason: format!("`{parent}` is not an object type"),
            });
        };

        self.parent = Some(Parent {
            declared,
            access: Box::new(ParentAccessor {
                meta: Arc::clone(meta),
                get,
                set,
            }),
        });
        Ok(self)
    }

    /// Assigns external names and builds the codec.
    pub fn finish(self) -> Result<Arc<dyn Codec<T>>, CodecError> {
        let ty = TypeDesc::of::<T>();
        let config = self.cx.config();
        let construction = self.construction;

        let mut routes = HashMap::default();
        if let Some(parent) = &self.parent {
            for name in parent.access.names() {
                routes.insert(name, Route::Parent);
            }
        }

        let mut fields = Vec::with_capacity(self.fields.len());
        for pending in self.fields {
            let mut name = match pending.rename {
                Some(rename) => rename.to_owned(),
                None => config.field_naming.apply(pending.declared),
            };
            while routes.contains_key(&name) {
                name.insert(0, config.shadow_marker);
            }
            routes.insert(name.clone(), Route::Field(fields.len()));
            fields.push(Field {
                name,
                declared: pending.declared,
                access: pending.access,
            });
        }

        let meta = ObjectMeta {
            ty,
            fields,
            parent: self.parent,
            routes,
            construction,
        };
        log::trace!(
            "object layout of `{ty}`: {} fields, {} construction",
            meta.encoded_len(),
            meta.construction()
        );
        Ok(Arc::new(ObjectCodec::new(Arc::new(meta))))
    }
}
