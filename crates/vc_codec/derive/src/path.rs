//! Paths into `vc_codec` used by generated code.

use proc_macro2::TokenStream;
use quote::quote;

/// Get the access path of the `vc_codec` crate from the caller's manifest.
///
/// A caller that depends on the `vc_serial` facade gets `::vc_serial::codec`.
/// Reading the manifest is not cheap; call this once per derive.
pub(crate) fn vc_codec() -> syn::Path {
    vc_macro_utils::Manifest::shared(|manifest| manifest.get_crate_path("vc_codec"))
}

#[inline(always)]
pub(crate) fn macro_exports_(vc_codec_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_codec_path::__macro_exports
    }
}

#[inline(always)]
pub(crate) fn describe_(vc_codec_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_codec_path::Describe
    }
}

#[inline(always)]
pub(crate) fn derivation_(vc_codec_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_codec_path::registry::Derivation
    }
}

#[inline(always)]
pub(crate) fn object_builder_(vc_codec_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_codec_path::object::ObjectBuilder
    }
}

#[inline(always)]
pub(crate) fn variants_builder_(vc_codec_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_codec_path::dynamic::VariantsBuilder
    }
}

#[inline(always)]
pub(crate) fn enum_codec_(vc_codec_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_codec_path::impls::EnumCodec
    }
}
