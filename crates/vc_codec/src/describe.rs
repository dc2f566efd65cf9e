use alloc::string::String;
use alloc::sync::Arc;
use core::any::{Any, TypeId};
use core::fmt;

use crate::format::PrimitiveOps;
use crate::registry::Derivation;
use crate::{Codec, CodecError};

// -----------------------------------------------------------------------------
// Describe

/// A type whose codec can be derived by a [`CodecCore`](crate::CodecCore).
///
/// [`Describe::derive`] runs at most once per core and type in the common
/// case; its result is cached. Implementations resolve the codecs of
/// nested types through the [`Derivation`] so recursive types terminate.
///
/// Usually implemented with `#[derive(Describe)]`:
///
/// ```
/// use vc_codec::{CodecCore, Describe};
/// use vc_codec::format::tokens::{TokenDecoder, TokenEncoder};
///
/// #[derive(Describe, Default, Debug, PartialEq)]
/// #[codec(default)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// let core = CodecCore::new();
/// let mut out = TokenEncoder::new();
/// core.encode(&Point { x: 1, y: 2 }, &mut out).unwrap();
///
/// let mut input = TokenDecoder::new(out.into_tokens());
/// assert_eq!(core.decode::<Point>(&mut input).unwrap(), Point { x: 1, y: 2 });
/// ```
pub trait Describe: Any + Sized {
    /// Builds the codec of `Self`.
    fn derive(cx: &mut Derivation<'_>) -> Result<Arc<dyn Codec<Self>>, CodecError>;

    /// Primitive operations, for types the formats encode natively.
    ///
    /// Sequences of such types use a single primitive-array codec instead
    /// of one codec call per element.
    #[inline]
    fn primitive() -> Option<PrimitiveOps<Self>> {
        None
    }

    /// Returns `true` if some values of `Self` are encoded as null.
    ///
    /// `Option<T>` uses null for `None`, so it cannot wrap such a type.
    #[inline]
    fn nullable() -> bool {
        false
    }
}

// -----------------------------------------------------------------------------
// TypeDesc

/// Identity and name of a type.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeDesc {
    id: TypeId,
    path: &'static str,
}

impl TypeDesc {
    #[inline]
    pub fn of<T: Any + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            path: core::any::type_name::<T>(),
        }
    }

    #[inline(always)]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// The full type path, e.g. `alloc::vec::Vec<app::User>`.
    #[inline(always)]
    pub const fn path(&self) -> &'static str {
        self.path
    }

    /// The path with every module prefix stripped, e.g. `Vec<User>`.
    #[inline]
    pub fn short_name(&self) -> String {
        short_name(self.path)
    }
}

impl fmt::Debug for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path)
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path)
    }
}

/// Strips module prefixes from every segment of a type path.
///
/// ```
/// use vc_codec::short_name;
///
/// assert_eq!(short_name("alloc::vec::Vec<app::User>"), "Vec<User>");
/// assert_eq!(short_name("(u8, core::option::Option<i32>)"), "(u8, Option<i32>)");
/// assert_eq!(short_name("alloc::boxed::Box<dyn app::Shape>"), "Box<dyn Shape>");
/// ```
pub fn short_name(path: &str) -> String {
    #[inline]
    fn last_segment(segment: &str) -> &str {
        match segment.rfind("::") {
            Some(index) => &segment[index + 2..],
            None => segment,
        }
    }

    let mut out = String::with_capacity(path.len());
    let mut start = 0;
    for (index, c) in path.char_indices() {
        if matches!(c, '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | ';' | '&' | '*') {
            out.push_str(last_segment(&path[start..index]));
            out.push(c);
            start = index + c.len_utf8();
        }
    }
    out.push_str(last_segment(&path[start..]));
    out
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{TypeDesc, short_name};

    struct Local;

    #[test]
    fn type_desc() {
        let desc = TypeDesc::of::<Local>();
        assert!(desc.path().ends_with("::Local"));
        assert_eq!(desc.short_name(), "Local");
        assert_ne!(desc, TypeDesc::of::<u8>());
    }

    #[test]
    fn short_names() {
        assert_eq!(short_name("u8"), "u8");
        assert_eq!(short_name("[a::B; 3]"), "[B; 3]");
        assert_eq!(short_name("&a::b::C"), "&C");
        assert_eq!(
            short_name("std::collections::hash::map::HashMap<alloc::string::String, x::Y>"),
            "HashMap<String, Y>"
        );
    }
}
