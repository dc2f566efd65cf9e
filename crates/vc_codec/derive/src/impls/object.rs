use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::{CodecStruct, StructShape};

/// Body of `Describe::derive` for a struct.
///
/// Similar to following:
///
/// ```ignore
/// let mut object = _path_::object::ObjectBuilder::<Self>::with_default(cx, <Self as Default>::default);
/// object.parent::<Entity>("entity", |this| &this.entity, |this, value| this.entity = value)?;
/// object.field::<String>("name", None, |this| &this.name, |this, value| this.name = value)?;
/// object.finish()
/// ```
pub(super) fn derive_body(data: &CodecStruct) -> TokenStream {
    let vc_codec_path = &data.meta.vc_codec_path;
    let object_builder_ = crate::path::object_builder_(vc_codec_path);
    let exports_ = crate::path::macro_exports_(vc_codec_path);

    let fields = data.active_fields().map(|field| {
        let ident = field.ident;
        let ty = field.ty;
        let declared = field.declared_name();

        if field.attrs.parent.is_some() {
            return quote! {
                object.parent::<#ty>(
                    #declared,
                    |this| &this.#ident,
                    |this, value| this.#ident = value,
                )?;
            };
        }

        let rename = match &field.attrs.rename {
            Some(lit) => quote!(#exports_::Option::Some(#lit)),
            None => quote!(#exports_::Option::None),
        };
        quote! {
            object.field::<#ty>(
                #declared,
                #rename,
                |this| &this.#ident,
                |this, value| this.#ident = value,
            )?;
        }
    });

    let constructor = match data.shape {
        StructShape::Unit => Some(quote!(|| Self)),
        StructShape::EmptyBraced => Some(quote!(|| Self {})),
        StructShape::Named => data
            .meta
            .attrs
            .default
            .map(|_| quote!(<Self as ::core::default::Default>::default)),
    };
    let object = match constructor {
        Some(make) => quote!(#object_builder_::<Self>::with_default(cx, #make)),
        None => quote!(#object_builder_::<Self>::new(cx)?),
    };

    quote! {
        let mut object = #object;
        #(#fields)*
        object.finish()
    }
}
