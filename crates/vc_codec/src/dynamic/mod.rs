//! Values whose runtime type is not fixed by their declaration.
//!
//! Open hierarchies are trait objects: a field of type `Box<dyn Shape>` may
//! hold any registered implementation of `Shape`. The [`DynamicCodec`]
//! records the runtime type as a tag whenever it differs from the default
//! subtype and resolves the tag back to a codec on decode, subject to
//! [`Config::allowed_packages`](crate::Config::allowed_packages).
//!
//! Closed hierarchies are enums with data; [`VariantCodec`] encodes them
//! as a single-entry object keyed by the variant name.
//!
//! ```
//! use core::fmt::Debug;
//! use vc_codec::dynamic::Dynamic;
//! use vc_codec::format::tokens::{Token, TokenDecoder, TokenEncoder};
//! use vc_codec::{CodecCore, Describe, dynamic_type};
//!
//! trait Shape: Dynamic + Debug {
//!     fn area(&self) -> f64;
//! }
//!
//! dynamic_type!(dyn Shape);
//!
//! #[derive(Describe, Debug, Default)]
//! #[codec(default)]
//! struct Square {
//!     side: f64,
//! }
//!
//! impl Shape for Square {
//!     fn area(&self) -> f64 {
//!         self.side * self.side
//!     }
//! }
//!
//! let core = CodecCore::builder()
//!     .subtype_named::<dyn Shape, Square>("square", |s| Box::new(s))
//!     .build()
//!     .unwrap();
//!
//! let shape: Box<dyn Shape> = Box::new(Square { side: 2.0 });
//! let mut out = TokenEncoder::new();
//! core.encode(&shape, &mut out).unwrap();
//! assert_eq!(out.tokens()[0], Token::tag("square"));
//!
//! let mut input = TokenDecoder::new(out.into_tokens());
//! let decoded = core.decode::<Box<dyn Shape>>(&mut input).unwrap();
//! assert_eq!(decoded.area(), 4.0);
//! ```

// -----------------------------------------------------------------------------
// Modules

mod closed;
mod hierarchy;
mod open;

// -----------------------------------------------------------------------------
// Exports

pub use closed::{VariantCodec, VariantsBuilder};
pub use hierarchy::Hierarchy;
pub use open::{Dynamic, DynamicCodec};

pub(crate) use hierarchy::{HierarchyDraft, PendingHierarchy};
