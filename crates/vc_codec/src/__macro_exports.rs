//! Items referenced by generated code. Not a public API.

pub use alloc::sync::Arc;
pub use core::option::Option;
pub use core::result::Result;
pub use alloc::boxed::Box;
