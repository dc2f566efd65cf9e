use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use thiserror::Error;

// -----------------------------------------------------------------------------
// Position

/// A location inside the input of a decoder.
///
/// The variant depends on the format: tree formats report a path,
/// byte streams an offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Position {
    /// A path such as `$.items[2].name`.
    Path(String),
    /// A byte offset.
    Offset(usize),
    /// An index into a token stream.
    Token(usize),
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Path(path) => f.write_str(path),
            Position::Offset(offset) => write!(f, "byte {offset}"),
            Position::Token(index) => write!(f, "token {index}"),
        }
    }
}

/// An optional [`Position`], displayed as ` at <position>` or nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct At(pub Option<Position>);

impl fmt::Display for At {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(position) => write!(f, " at {position}"),
            None => Ok(()),
        }
    }
}

impl From<Option<Position>> for At {
    #[inline]
    fn from(value: Option<Position>) -> Self {
        Self(value)
    }
}

// -----------------------------------------------------------------------------
// ErrorKind

/// Coarse classification of a [`CodecError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The types or the core are set up in a way that can never work.
    ///
    /// Retrying with other input gives the same result.
    Configuration,
    /// The input is not a valid representation of the requested type.
    Data,
    /// The input asked for a type outside the allowed packages.
    Security,
}

// -----------------------------------------------------------------------------
// CodecError

/// Error returned by every encode, decode and derivation operation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CodecError {
    // Configuration -----------------------------------------------------------
    #[error("`{ty}` has no construction strategy, register a constructor or derive it with `#[codec(default)]`")]
    NoConstructor { ty: &'static str },

    #[error("`{ty}` is not supported: {reason}")]
    Unsupported { ty: &'static str, reason: String },

    #[error("no subtypes of `{base}` are registered")]
    NoSubtypes { base: &'static str },

    #[error("runtime type `{ty}` is not a registered subtype of `{base}`")]
    UnregisteredSubtype { base: &'static str, ty: &'static str },

    #[error("type name `{name}` does not denote a subtype of `{base}`{at}")]
    UnknownTypeName {
        base: &'static str,
        name: String,
        at: At,
    },

    #[error("`{ty}` needs a type tag as a value of `{base}`, but dynamic types are disabled")]
    DynamicTypesDisabled { base: &'static str, ty: &'static str },

    #[error("the format cannot record the runtime type `{ty}` of a `{base}` value")]
    DynamicTypesUnsupported { base: &'static str, ty: &'static str },

    #[error("map key type `{key}` cannot be represented by this format")]
    UnsupportedMapKey { key: &'static str },

    #[error("type name `{name}` is claimed by both `{first}` and `{second}`")]
    DuplicateTypeName {
        name: String,
        first: &'static str,
        second: &'static str,
    },

    #[error("invalid parent for `{ty}`: {reason}")]
    InvalidParent { ty: &'static str, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("expected a value of type `{expected}`")]
    TypeMismatch { expected: &'static str },

    // Security ----------------------------------------------------------------
    #[error("type `{ty}` named by tag `{name}` is outside the allowed packages{at}")]
    DisallowedType {
        name: String,
        ty: &'static str,
        at: At,
    },

    // Data --------------------------------------------------------------------
    #[error("field `{field}` of `{ty}` appears more than once{at}")]
    DuplicateField {
        ty: &'static str,
        field: String,
        at: At,
    },

    #[error("`{ty}` has no field named `{field}`{at}")]
    UnrecognisedField {
        ty: &'static str,
        field: String,
        at: At,
    },

    #[error("`{ty}` is missing fields {missing:?}{at}")]
    FieldSetMismatch {
        ty: &'static str,
        missing: Vec<String>,
        at: At,
    },

    #[error("no value for field `{field}` of `{ty}`")]
    MissingField { ty: &'static str, field: &'static str },

    #[error("a value of `{base}` has no type tag and no default subtype{at}")]
    MissingTypeTag { base: &'static str, at: At },

    #[error("`{name}` is not a variant of `{ty}`{at}")]
    InvalidVariant {
        ty: &'static str,
        name: String,
        at: At,
    },

    #[error("duplicate entry in `{ty}`{at}")]
    DuplicateKey { ty: &'static str, at: At },

    #[error("expected {expected}, found {found}{at}")]
    Malformed {
        expected: String,
        found: String,
        at: At,
    },

    #[error("`{ty}` expects {expected} elements, found {found}{at}")]
    LengthMismatch {
        ty: &'static str,
        expected: usize,
        found: usize,
        at: At,
    },

    #[error("{0}")]
    Custom(String),

    #[error("{0}")]
    Format(#[source] Box<dyn core::error::Error + Send + Sync>),
}

impl CodecError {
    /// Classifies the error.
    ///
    /// ```
    /// use vc_codec::{CodecError, ErrorKind};
    ///
    /// let err = CodecError::NoConstructor { ty: "demo::Point" };
    /// assert_eq!(err.kind(), ErrorKind::Configuration);
    /// ```
    pub fn kind(&self) -> ErrorKind {
        use CodecError::*;

        match self {
            NoConstructor { .. }
            | Unsupported { .. }
            | NoSubtypes { .. }
            | UnregisteredSubtype { .. }
            | UnknownTypeName { .. }
            | DynamicTypesDisabled { .. }
            | DynamicTypesUnsupported { .. }
            | UnsupportedMapKey { .. }
            | DuplicateTypeName { .. }
            | InvalidParent { .. }
            | InvalidConfig(_)
            | TypeMismatch { .. } => ErrorKind::Configuration,
            DisallowedType { .. } => ErrorKind::Security,
            DuplicateField { .. }
            | UnrecognisedField { .. }
            | FieldSetMismatch { .. }
            | MissingField { .. }
            | MissingTypeTag { .. }
            | InvalidVariant { .. }
            | DuplicateKey { .. }
            | Malformed { .. }
            | LengthMismatch { .. }
            | Custom(_)
            | Format(_) => ErrorKind::Data,
        }
    }

    /// Creates a data error with a free-form message.
    ///
    /// Intended for user constructors that reject a decoded value.
    #[inline]
    pub fn custom(message: impl fmt::Display) -> Self {
        Self::Custom(alloc::format!("{message}"))
    }

    /// Creates a [`CodecError::Malformed`].
    #[inline]
    pub fn malformed(
        expected: impl Into<String>,
        found: impl Into<String>,
        at: Option<Position>,
    ) -> Self {
        Self::Malformed {
            expected: expected.into(),
            found: found.into(),
            at: At(at),
        }
    }

    /// Fills in `position` if this error was raised without one.
    ///
    /// Container proxies report duplicates and length errors without
    /// knowing where the decoder is; their codecs locate them afterwards.
    pub fn locate(mut self, position: Option<Position>) -> Self {
        use CodecError::*;
        match &mut self {
            UnknownTypeName { at, .. }
            | DisallowedType { at, .. }
            | DuplicateField { at, .. }
            | UnrecognisedField { at, .. }
            | FieldSetMismatch { at, .. }
            | MissingTypeTag { at, .. }
            | InvalidVariant { at, .. }
            | DuplicateKey { at, .. }
            | Malformed { at, .. }
            | LengthMismatch { at, .. } => {
                if at.0.is_none() {
                    at.0 = position;
                }
            }
            _ => {}
        }
        self
    }

    /// Wraps an error raised by a format backend.
    #[inline]
    pub fn format(err: impl core::error::Error + Send + Sync + 'static) -> Self {
        Self::Format(Box::new(err))
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::{At, CodecError, ErrorKind, Position};

    #[test]
    fn position_display() {
        let at = At(Some(Position::Path("$.a[1]".into())));
        assert_eq!(at.to_string(), " at $.a[1]");
        assert_eq!(At(None).to_string(), "");
        assert_eq!(Position::Offset(12).to_string(), "byte 12");
    }

    #[test]
    fn kinds() {
        let err = CodecError::DisallowedType {
            name: "evil::Payload".into(),
            ty: "evil::Payload",
            at: At(None),
        };
        assert_eq!(err.kind(), ErrorKind::Security);

        let err = CodecError::malformed("bool", "string", Some(Position::Token(3)));
        assert_eq!(err.kind(), ErrorKind::Data);
        assert_eq!(err.to_string(), "expected bool, found string at token 3");

        let err = CodecError::UnsupportedMapKey { key: "u32" };
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
