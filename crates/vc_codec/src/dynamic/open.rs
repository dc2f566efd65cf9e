use alloc::boxed::Box;
use alloc::sync::Arc;
use core::any::Any;
use core::marker::PhantomData;

use crate::format::{Decoder, Encoder};
use crate::registry::Derivation;
use crate::{At, Codec, CodecCore, CodecError, TypeDesc, TypeNaming};

// -----------------------------------------------------------------------------
// Dynamic

/// Runtime type access for trait objects.
///
/// Implemented for every sized `'static` type. A trait that should be usable
/// as `Box<dyn Trait>` in encoded data declares it as a supertrait and is
/// announced with [`dynamic_type!`](crate::dynamic_type).
pub trait Dynamic: Any {
    fn as_any(&self) -> &dyn Any;

    /// The concrete type behind a trait object.
    fn runtime_type(&self) -> TypeDesc;
}

impl<T: Any> Dynamic for T {
    #[inline(always)]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline(always)]
    fn runtime_type(&self) -> TypeDesc {
        TypeDesc::of::<T>()
    }
}

/// Implements [`Describe`](crate::Describe) for `Box<dyn Trait>`.
///
/// The trait must have [`Dynamic`] as a supertrait. Implementations are
/// registered on the [`CoreBuilder`](crate::CoreBuilder).
///
/// ```
/// use vc_codec::dynamic::Dynamic;
/// use vc_codec::dynamic_type;
///
/// trait Animal: Dynamic {}
/// trait Plant: Dynamic {}
///
/// dynamic_type!(dyn Animal, dyn Plant);
/// ```
#[macro_export]
macro_rules! dynamic_type {
    ($($base:ty),+ $(,)?) => {
        $(
            impl $crate::Describe for $crate::__macro_exports::Box<$base> {
                fn derive(
                    cx: &mut $crate::registry::Derivation<'_>,
                ) -> $crate::__macro_exports::Result<
                    $crate::__macro_exports::Arc<dyn $crate::Codec<Self>>,
                    $crate::CodecError,
                > {
                    $crate::dynamic::DynamicCodec::<$base>::derive(cx)
                }
            }
        )+
    };
}

// -----------------------------------------------------------------------------
// DynamicCodec

/// Codec of `Box<B>` for a trait object `B`.
///
/// Encoding compares the exact runtime type with the default subtype. A
/// match is written untagged; anything else is written as a type tag
/// followed by the value, encoded by the codec of its runtime type.
///
/// Decoding reads the tag if there is one, checks the named type against
/// the allowed packages and delegates to its codec. An untagged value is
/// decoded as the default subtype, or rejected if there is none.
pub struct DynamicCodec<B: ?Sized> {
    _marker: PhantomData<fn() -> Box<B>>,
}

impl<B: ?Sized + Dynamic> DynamicCodec<B> {
    /// Fails if no subtype of `B` is registered.
    pub fn derive(cx: &mut Derivation<'_>) -> Result<Arc<dyn Codec<Box<B>>>, CodecError> {
        if cx.core().hierarchy::<B>().is_none() {
            return Err(CodecError::NoSubtypes {
                base: core::any::type_name::<B>(),
            });
        }
        Ok(Arc::new(Self {
            _marker: PhantomData,
        }))
    }
}

impl<B: ?Sized + Dynamic> Codec<Box<B>> for DynamicCodec<B> {
    fn encode(&self, core: &CodecCore, value: &Box<B>, out: &mut dyn Encoder) -> Result<(), CodecError> {
        let base = core::any::type_name::<B>();
        let value: &B = value;
        let runtime = value.runtime_type();

        let subtype = core
            .hierarchy::<B>()
            .and_then(|hierarchy| {
                let (index, subtype) = hierarchy.by_type(runtime.id())?;
                Some((hierarchy.default_index() == Some(index), subtype))
            });
        let Some((is_default, subtype)) = subtype else {
            return Err(CodecError::UnregisteredSubtype {
                base,
                ty: runtime.path(),
            });
        };

        if !is_default {
            if !core.config().dynamic_types {
                return Err(CodecError::DynamicTypesDisabled {
                    base,
                    ty: runtime.path(),
                });
            }
            if !out.capabilities().dynamic_types {
                return Err(CodecError::DynamicTypesUnsupported {
                    base,
                    ty: runtime.path(),
                });
            }
            out.encode_dynamic_type(&subtype.name)?;
        }

        (subtype.encode)(core, value, out)
    }

    fn decode(&self, core: &CodecCore, input: &mut dyn Decoder) -> Result<Box<B>, CodecError> {
        let base = core::any::type_name::<B>();
        let Some(hierarchy) = core.hierarchy::<B>() else {
            return Err(CodecError::NoSubtypes { base });
        };
        let config = core.config();

        let subtype = match input.decode_dynamic_type()? {
            Some(name) => match hierarchy.by_name(&name) {
                Some(subtype) => {
                    if !config.is_allowed(subtype.ty.path()) {
                        return Err(CodecError::DisallowedType {
                            name,
                            ty: subtype.ty.path(),
                            at: At(input.position()),
                        });
                    }
                    subtype
                }
                None if config.type_naming == TypeNaming::Path && !config.is_allowed(&name) => {
                    return Err(CodecError::DisallowedType {
                        name,
                        ty: "<unregistered>",
                        at: At(input.position()),
                    });
                }
                None => {
                    return Err(CodecError::UnknownTypeName {
                        base,
                        name,
                        at: At(input.position()),
                    });
                }
            },
            None => match hierarchy.default_subtype() {
                Some(subtype) => subtype,
                None => {
                    return Err(CodecError::MissingTypeTag {
                        base,
                        at: At(input.position()),
                    });
                }
            },
        };

        (subtype.decode)(core, input)
    }
}

// -----------------------------------------------------------------------------
// Tests
