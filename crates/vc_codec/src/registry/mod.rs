//! The codec registry.
//!
//! A [`CodecCore`] owns a [`Config`](crate::Config), the constructors and
//! subtype hierarchies registered through its [`CoreBuilder`], and a cache
//! holding one codec per type. Codecs are derived on first request and
//! shared by every later call, from any thread.
//!
//! ```
//! use std::sync::Arc;
//! use vc_codec::CodecCore;
//!
//! let core = CodecCore::new();
//! let first = core.get_codec::<Vec<String>>().unwrap();
//! let second = core.get_codec::<Vec<String>>().unwrap();
//! assert!(Arc::ptr_eq(&first, &second));
//! ```

// -----------------------------------------------------------------------------
// Modules

mod builder;
mod codec_core;
mod derivation;

// -----------------------------------------------------------------------------
// Exports

pub use builder::CoreBuilder;
pub use codec_core::CodecCore;
pub use derivation::Derivation;
