use syn::{DataEnum, DeriveInput, Fields, Ident, Type, Variant};

use super::{CodecMeta, FieldAttributes};

/// A variant that is either a unit or wraps a single value.
pub(crate) struct EnumVariant<'a> {
    pub ident: &'a Ident,
    /// Type of the wrapped value, `None` for unit variants.
    pub inner: Option<&'a Type>,
    pub attrs: FieldAttributes,
}

pub(crate) struct CodecEnum<'a> {
    pub meta: CodecMeta<'a>,
    pub variants: Vec<EnumVariant<'a>>,
}

impl<'a> CodecEnum<'a> {
    pub fn new(meta: CodecMeta<'a>, data: &'a DataEnum, input: &DeriveInput) -> syn::Result<Self> {
        if data.variants.is_empty() {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "`Describe` cannot be derived for enums without variants",
            ));
        }
        if let Some(span) = meta.attrs.default {
            return Err(syn::Error::new(span, "`default` only applies to structs"));
        }

        let variants = data
            .variants
            .iter()
            .map(EnumVariant::new)
            .collect::<syn::Result<Vec<_>>>()?;
        Ok(Self { meta, variants })
    }

    /// `true` if no variant carries data.
    pub fn is_fieldless(&self) -> bool {
        self.variants.iter().all(|v| v.inner.is_none())
    }
}

impl<'a> EnumVariant<'a> {
    fn new(variant: &'a Variant) -> syn::Result<Self> {
        let inner = match &variant.fields {
            Fields::Unit => None,
            Fields::Unnamed(fields) if fields.unnamed.len() == 1 => Some(&fields.unnamed[0].ty),
            Fields::Unnamed(fields) => {
                return Err(syn::Error::new_spanned(
                    fields,
                    "variants can wrap at most one value, group the values in a struct",
                ));
            }
            Fields::Named(fields) => {
                return Err(syn::Error::new_spanned(
                    fields,
                    "struct variants are not supported, wrap a struct in a tuple variant",
                ));
            }
        };

        Ok(Self {
            ident: &variant.ident,
            inner,
            attrs: FieldAttributes::parse_variant(&variant.attrs)?,
        })
    }

    /// External name of the variant.
    pub fn name(&self) -> String {
        match &self.attrs.rename {
            Some(lit) => lit.value(),
            None => self.ident.to_string(),
        }
    }
}
