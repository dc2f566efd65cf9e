use proc_macro2::Span;
use syn::{Attribute, LitStr};

use crate::CODEC_ATTRIBUTE_NAME;

/// Attributes on the type itself.
#[derive(Default, Debug)]
pub(crate) struct TypeAttributes {
    /// `#[codec(default)]`
    pub default: Option<Span>,
}

/// Attributes on a field or a variant.
#[derive(Default, Debug)]
pub(crate) struct FieldAttributes {
    /// `#[codec(rename = "...")]`
    pub rename: Option<LitStr>,
    /// `#[codec(skip)]`
    pub skip: Option<Span>,
    /// `#[codec(parent)]`
    pub parent: Option<Span>,
}

/// Runs `on_item` for every item inside `#[codec(...)]` attributes.
fn for_each_item(
    attrs: &[Attribute],
    mut on_item: impl FnMut(syn::meta::ParseNestedMeta) -> syn::Result<()>,
) -> syn::Result<()> {
    for attr in attrs {
        if attr.path().is_ident(CODEC_ATTRIBUTE_NAME) {
            attr.parse_nested_meta(&mut on_item)?;
        }
    }
    Ok(())
}

fn set_once<T>(slot: &mut Option<T>, value: T, meta: &syn::meta::ParseNestedMeta) -> syn::Result<()> {
    if slot.is_some() {
        return Err(meta.error("duplicate codec attribute"));
    }
    *slot = Some(value);
    Ok(())
}

impl TypeAttributes {
    pub fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        for_each_item(attrs, |meta| {
            if meta.path.is_ident("default") {
                set_once(&mut this.default, meta.path.require_ident()?.span(), &meta)
            } else {
                Err(meta.error("unknown type attribute, expected `default`"))
            }
        })?;
        Ok(this)
    }
}

impl FieldAttributes {
    pub fn parse_field(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        for_each_item(attrs, |meta| {
            if meta.path.is_ident("rename") {
                let lit: LitStr = meta.value()?.parse()?;
                set_once(&mut this.rename, lit, &meta)
            } else if meta.path.is_ident("skip") {
                set_once(&mut this.skip, meta.path.require_ident()?.span(), &meta)
            } else if meta.path.is_ident("parent") {
                set_once(&mut this.parent, meta.path.require_ident()?.span(), &meta)
            } else {
                Err(meta.error("unknown field attribute, expected `rename`, `skip` or `parent`"))
            }
        })?;

        if let (Some(skip), Some(_)) = (this.skip, this.parent) {
            return Err(syn::Error::new(skip, "a parent field cannot be skipped"));
        }
        if let (Some(parent), Some(_)) = (this.parent, &this.rename) {
            return Err(syn::Error::new(parent, "parent fields are inlined and have no name to rename"));
        }
        Ok(this)
    }

    pub fn parse_variant(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        for_each_item(attrs, |meta| {
            if meta.path.is_ident("rename") {
                let lit: LitStr = meta.value()?.parse()?;
                set_once(&mut this.rename, lit, &meta)
            } else {
                Err(meta.error("unknown variant attribute, expected `rename`"))
            }
        })?;
        Ok(this)
    }
}
