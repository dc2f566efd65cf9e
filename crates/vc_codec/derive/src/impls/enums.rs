use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::CodecEnum;

/// Body of `Describe::derive` for an enum.
pub(super) fn derive_body(data: &CodecEnum) -> TokenStream {
    if data.is_fieldless() {
        fieldless_body(data)
    } else {
        variants_body(data)
    }
}

/// Similar to following:
///
/// ```ignore
/// _path_::impls::EnumCodec::<Self>::derive(
///     &["Low", "High"],
///     |value| match value { Self::Low => 0, Self::High => 1 },
///     |index| match index { 0 => Some(Self::Low), 1 => Some(Self::High), _ => None },
/// )
/// ```
fn fieldless_body(data: &CodecEnum) -> TokenStream {
    let vc_codec_path = &data.meta.vc_codec_path;
    let enum_codec_ = crate::path::enum_codec_(vc_codec_path);
    let exports_ = crate::path::macro_exports_(vc_codec_path);

    let names = data.variants.iter().map(|v| v.name());
    let to_index = data.variants.iter().enumerate().map(|(index, v)| {
        let ident = v.ident;
        quote!(Self::#ident => #index)
    });
    let from_index = data.variants.iter().enumerate().map(|(index, v)| {
        let ident = v.ident;
        quote!(#index => #exports_::Option::Some(Self::#ident))
    });

    quote! {
        let _ = cx;
        #enum_codec_::<Self>::derive(
            &[#(#names),*],
            |value| match value { #(#to_index,)* },
            |index| match index {
                #(#from_index,)*
                _ => #exports_::Option::None,
            },
        )
    }
}

/// Similar to following:
///
/// ```ignore
/// let mut variants = _path_::dynamic::VariantsBuilder::<Self>::new(
///     cx,
///     |value| match value { Self::Stop => 0, Self::Move(..) => 1 },
/// );
/// variants.unit("Stop", || Self::Stop);
/// variants.newtype::<i32>("Move", Self::Move, |value| match value {
///     Self::Move(inner) => Some(inner),
///     _ => None,
/// })?;
/// variants.finish()
/// ```
fn variants_body(data: &CodecEnum) -> TokenStream {
    let vc_codec_path = &data.meta.vc_codec_path;
    let variants_builder_ = crate::path::variants_builder_(vc_codec_path);
    let exports_ = crate::path::macro_exports_(vc_codec_path);

    let to_index = data.variants.iter().enumerate().map(|(index, v)| {
        let ident = v.ident;
        match v.inner {
            Some(_) => quote!(Self::#ident(..) => #index),
            None => quote!(Self::#ident => #index),
        }
    });

    let adds = data.variants.iter().map(|v| {
        let ident = v.ident;
        let name = v.name();
        match v.inner {
            None => quote! {
                variants.unit(#name, || Self::#ident);
            },
            Some(ty) => quote! {
                variants.newtype::<#ty>(
                    #name,
                    Self::#ident,
                    |value| match value {
                        Self::#ident(inner) => #exports_::Option::Some(inner),
                        #[allow(unreachable_patterns)]
                        _ => #exports_::Option::None,
                    },
                )?;
            },
        }
    });

    quote! {
        let mut variants = #variants_builder_::<Self>::new(
            cx,
            |value| match value { #(#to_index,)* },
        );
        #(#adds)*
        variants.finish()
    }
}
