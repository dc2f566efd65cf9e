//! Code generation.

// -----------------------------------------------------------------------------
// Modules

mod enums;
mod object;

// -----------------------------------------------------------------------------
// Internal API

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Generics, parse_quote};

use crate::derive_data::{CodecDerive, CodecMeta};

pub(crate) fn impl_describe(derive: &CodecDerive) -> TokenStream {
    let (meta, body) = match derive {
        CodecDerive::Struct(data) => (&data.meta, object::derive_body(data)),
        CodecDerive::Enum(data) => (&data.meta, enums::derive_body(data)),
    };

    let vc_codec_path = &meta.vc_codec_path;
    let describe_ = crate::path::describe_(vc_codec_path);
    let derivation_ = crate::path::derivation_(vc_codec_path);
    let exports_ = crate::path::macro_exports_(vc_codec_path);

    let ident = meta.ident;
    let generics = bounded_generics(meta);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    quote! {
        impl #impl_generics #describe_ for #ident #ty_generics #where_clause {
            fn derive(
                cx: &mut #derivation_<'_>,
            ) -> #exports_::Result<
                #exports_::Arc<dyn #vc_codec_path::Codec<Self>>,
                #vc_codec_path::CodecError,
            > {
                #body
            }
        }
    }
}

/// The type's generics with a `Describe` bound on every type parameter.
fn bounded_generics(meta: &CodecMeta) -> Generics {
    let describe_ = crate::path::describe_(&meta.vc_codec_path);
    let mut generics = meta.generics.clone();
    let params: Vec<_> = generics.type_params().map(|p| p.ident.clone()).collect();
    let where_clause = generics.make_where_clause();
    for ident in params {
        where_clause.predicates.push(parse_quote!(#ident: #describe_));
    }
    generics
}
