#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Extern Self

// The derive macro emits `::vc_codec::...` paths, doc tests and the crate's own
// unit tests must resolve them too.
extern crate self as vc_codec;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod codec;
mod config;
mod describe;
mod error;
mod hash;

pub mod container;
pub mod dynamic;
pub mod format;
pub mod impls;
pub mod object;
pub mod registry;

// -----------------------------------------------------------------------------
// Top-Level exports

pub mod __macro_exports;

pub use codec::{Codec, CodecHandle};
pub use config::{Config, FieldNaming, TypeNaming};
pub use describe::{Describe, TypeDesc, short_name};
pub use error::{At, CodecError, ErrorKind, Position};
pub use registry::{CodecCore, CoreBuilder};

pub use vc_codec_derive as derive;

/// Derives [`Describe`] for named structs and enums.
///
/// See the crate documentation for the accepted `#[codec(...)]` attributes.
pub use vc_codec_derive::Describe;
