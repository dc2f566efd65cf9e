//! Derive macro of [`vc_codec`](https://docs.rs/vc_codec).
//!
//! See [`Describe`].
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

static CODEC_ATTRIBUTE_NAME: &str = "codec";

// -----------------------------------------------------------------------------
// Modules

mod derive_data;
mod impls;
mod path;

// -----------------------------------------------------------------------------
// Macros

/// # Codec Derivation
///
/// `#[derive(Describe)]` implements `vc_codec::Describe`, which tells a
/// `CodecCore` how to build the codec of a type.
///
/// ## Structs
///
/// Structs with named fields become objects. Every field type must
/// implement `Describe` itself.
///
/// ```rust, ignore
/// #[derive(Describe, Default)]
/// #[codec(default)]
/// struct Player {
///     #[codec(parent)]
///     entity: Entity,
///     #[codec(rename = "displayName")]
///     name: String,
///     #[codec(skip)]
///     session: u64,
/// }
/// ```
///
/// Type attributes:
///
/// - `default`: decode by mutating `Default::default()`. Without it the
///   type needs a constructor registered on the core. Unit structs get it
///   implicitly.
///
/// Field attributes:
///
/// - `rename = "..."`: the external name, bypassing the configured field naming.
/// - `skip`: neither encoded nor decoded.
/// - `parent`: the field is an object whose fields are encoded inline.
///   At most one per struct.
///
/// Tuple structs are not supported.
///
/// ## Enums
///
/// Fieldless enums are encoded as the variant name. Enums whose variants
/// are unit or carry a single unnamed value are encoded as a single-entry
/// object `{ Variant: value }`, with null for unit variants.
///
/// Variant attributes:
///
/// - `rename = "..."`: the external variant name.
///
/// ## Generics
///
/// Every type parameter gets a `Describe` bound. Lifetime parameters are
/// rejected since described types are `'static`.
#[proc_macro_derive(Describe, attributes(codec))]
pub fn derive_describe(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    let derive = match derive_data::CodecDerive::from_input(&ast) {
        Ok(derive) => derive,
        Err(err) => return err.into_compile_error().into(),
    };

    impls::impl_describe(&derive).into()
}
