use syn::{DataStruct, Field, Fields, Ident, Type};

use super::{CodecMeta, FieldAttributes};

/// How a struct is written in source.
pub(crate) enum StructShape {
    Named,
    /// `struct T {}`
    EmptyBraced,
    /// `struct T;`
    Unit,
}

pub(crate) struct StructField<'a> {
    pub ident: &'a Ident,
    pub ty: &'a Type,
    pub attrs: FieldAttributes,
}

pub(crate) struct CodecStruct<'a> {
    pub meta: CodecMeta<'a>,
    pub shape: StructShape,
    pub fields: Vec<StructField<'a>>,
}

impl<'a> CodecStruct<'a> {
    pub fn new(meta: CodecMeta<'a>, data: &'a DataStruct) -> syn::Result<Self> {
        let (shape, fields) = match &data.fields {
            Fields::Named(named) if named.named.is_empty() => (StructShape::EmptyBraced, Vec::new()),
            Fields::Named(named) => {
                let fields = named
                    .named
                    .iter()
                    .map(StructField::new)
                    .collect::<syn::Result<Vec<_>>>()?;
                (StructShape::Named, fields)
            }
            Fields::Unit => (StructShape::Unit, Vec::new()),
            Fields::Unnamed(unnamed) => {
                return Err(syn::Error::new_spanned(
                    unnamed,
                    "`Describe` cannot be derived for tuple structs, use named fields",
                ));
            }
        };

        let mut parents = fields.iter().filter_map(|f| f.attrs.parent);
        if let (Some(_), Some(second)) = (parents.next(), parents.next()) {
            return Err(syn::Error::new(second, "a struct can have only one parent field"));
        }

        Ok(Self { meta, shape, fields })
    }

    /// Fields that take part in encoding.
    pub fn active_fields(&self) -> impl Iterator<Item = &StructField<'a>> {
        self.fields.iter().filter(|field| field.attrs.skip.is_none())
    }
}

impl<'a> StructField<'a> {
    fn new(field: &'a Field) -> syn::Result<Self> {
        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
        Ok(Self {
            ident,
            ty: &field.ty,
            attrs: FieldAttributes::parse_field(&field.attrs)?,
        })
    }

    /// The declared name, without a raw identifier prefix.
    pub fn declared_name(&self) -> String {
        let name = self.ident.to_string();
        match name.strip_prefix("r#") {
            Some(stripped) => stripped.to_owned(),
            None => name,
        }
    }
}
