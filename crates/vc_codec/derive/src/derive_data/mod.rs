//! Parsed form of the derive input.

// -----------------------------------------------------------------------------
// Modules

mod attributes;
mod codec_enum;
mod codec_struct;

// -----------------------------------------------------------------------------
// Internal API

pub(crate) use attributes::{FieldAttributes, TypeAttributes};
pub(crate) use codec_enum::CodecEnum;
pub(crate) use codec_struct::{CodecStruct, StructShape};

use syn::{Data, DeriveInput, GenericParam, Generics, Ident, Path};

// -----------------------------------------------------------------------------
// CodecDerive

/// Type-level information shared by structs and enums.
pub(crate) struct CodecMeta<'a> {
    pub ident: &'a Ident,
    pub generics: &'a Generics,
    pub attrs: TypeAttributes,
    pub vc_codec_path: Path,
}

pub(crate) enum CodecDerive<'a> {
    Struct(CodecStruct<'a>),
    Enum(CodecEnum<'a>),
}

impl<'a> CodecDerive<'a> {
    pub fn from_input(input: &'a DeriveInput) -> syn::Result<Self> {
        if let Some(GenericParam::Lifetime(param)) = input
            .generics
            .params
            .iter()
            .find(|p| matches!(p, GenericParam::Lifetime(_)))
        {
            return Err(syn::Error::new_spanned(
                param,
                "`Describe` types must be `'static` and cannot have lifetime parameters",
            ));
        }

        let meta = CodecMeta {
            ident: &input.ident,
            generics: &input.generics,
            attrs: TypeAttributes::parse(&input.attrs)?,
            vc_codec_path: crate::path::vc_codec(),
        };

        match &input.data {
            Data::Struct(data) => CodecStruct::new(meta, data).map(Self::Struct),
            Data::Enum(data) => CodecEnum::new(meta, data, input).map(Self::Enum),
            Data::Union(data) => Err(syn::Error::new(
                data.union_token.span,
                "`Describe` cannot be derived for unions",
            )),
        }
    }
}
