use alloc::boxed::Box;
use alloc::format;
use alloc::sync::Arc;
use alloc::vec::{self, Vec};
use core::any::Any;
use core::fmt;

use crate::CodecError;

// -----------------------------------------------------------------------------
// FieldValue

/// One decoded field value whose type is known to the constructor.
pub struct FieldValue(Box<dyn Any>);

impl FieldValue {
    #[inline]
    pub(crate) fn new<F: Any>(value: F) -> Self {
        Self(Box::new(value))
    }

    /// Returns `true` if the value is an `F`.
    #[inline]
    pub fn is<F: Any>(&self) -> bool {
        self.0.is::<F>()
    }

    /// Extracts the value as an `F`.
    pub fn take<F: Any>(self) -> Result<F, CodecError> {
        match self.0.downcast::<F>() {
            Ok(value) => Ok(*value),
            Err(_) => Err(CodecError::TypeMismatch {
                expected: core::any::type_name::<F>(),
            }),
        }
    }
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FieldValue(..)")
    }
}

/// Declared field names with their decoded values, parent first, then the
/// remaining fields in declaration order. Absent fields hold `None`.
pub(crate) type Staged = Vec<(&'static str, Option<FieldValue>)>;

// -----------------------------------------------------------------------------
// FieldMap

/// Decoded fields by declared name, handed to a named constructor.
pub struct FieldMap {
    ty: &'static str,
    values: Staged,
}

impl FieldMap {
    #[inline]
    pub(crate) fn new(ty: &'static str, values: Staged) -> Self {
        Self { ty, values }
    }

    /// Takes the value of a field; fails if it was not decoded.
    pub fn take<F: Any>(&mut self, name: &str) -> Result<F, CodecError> {
        match self.take_opt(name)? {
            Some(value) => Ok(value),
            None => Err(CodecError::MissingField {
                ty: self.ty,
                field: self.declared(name)?,
            }),
        }
    }

    /// Takes the value of a field if it was decoded.
    pub fn take_opt<F: Any>(&mut self, name: &str) -> Result<Option<F>, CodecError> {
        let ty = self.ty;
        let slot = self
            .values
            .iter_mut()
            .find(|(declared, _)| *declared == name)
            .ok_or_else(|| unknown_field(ty, name))?;
        slot.1.take().map(FieldValue::take).transpose()
    }

    /// Takes the value of a field, or `F::default()` if it was not decoded.
    #[inline]
    pub fn take_or_default<F: Any + Default>(&mut self, name: &str) -> Result<F, CodecError> {
        self.take_opt(name).map(Option::unwrap_or_default)
    }

    /// Returns `true` if the field was decoded and not yet taken.
    pub fn contains(&self, name: &str) -> bool {
        self.values
            .iter()
            .any(|(declared, value)| *declared == name && value.is_some())
    }

    fn declared(&self, name: &str) -> Result<&'static str, CodecError> {
        self.values
            .iter()
            .map(|(declared, _)| *declared)
            .find(|declared| *declared == name)
            .ok_or_else(|| unknown_field(self.ty, name))
    }
}

impl fmt::Debug for FieldMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldMap")
            .field("ty", &self.ty)
            .field("fields", &self.values.iter().map(|(n, _)| n).collect::<Vec<_>>())
            .finish()
    }
}

fn unknown_field(ty: &'static str, name: &str) -> CodecError {
    CodecError::Unsupported {
        ty,
        reason: format!("the constructor asked for `{name}`, which is not a field"),
    }
}

// -----------------------------------------------------------------------------
// Args

/// Decoded fields in declaration order, handed to a positional constructor.
///
/// A parent field comes first.
pub struct Args {
    ty: &'static str,
    values: vec::IntoIter<(&'static str, Option<FieldValue>)>,
}

impl Args {
    #[inline]
    pub(crate) fn new(ty: &'static str, values: Staged) -> Self {
        Self {
            ty,
            values: values.into_iter(),
        }
    }

    /// Takes the next argument; fails if its field was not decoded.
    pub fn next<F: Any>(&mut self) -> Result<F, CodecError> {
        let (field, value) = self.next_slot()?;
        match value {
            Some(value) => value.take(),
            None => Err(CodecError::MissingField { ty: self.ty, field }),
        }
    }

    /// Takes the next argument if its field was decoded.
    pub fn next_opt<F: Any>(&mut self) -> Result<Option<F>, CodecError> {
        let (_, value) = self.next_slot()?;
        value.map(FieldValue::take).transpose()
    }

    /// Takes the next argument, or `F::default()` if its field was not decoded.
    #[inline]
    pub fn next_or_default<F: Any + Default>(&mut self) -> Result<F, CodecError> {
        self.next_opt().map(Option::unwrap_or_default)
    }

    /// Number of arguments not taken yet.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.values.len()
    }

    fn next_slot(&mut self) -> Result<(&'static str, Option<FieldValue>), CodecError> {
        self.values.next().ok_or_else(|| CodecError::Unsupported {
            ty: self.ty,
            reason: "the constructor takes more arguments than there are fields".into(),
        })
    }
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args")
            .field("ty", &self.ty)
            .field("remaining", &self.remaining())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// FieldBuilder

/// A builder that receives decoded fields one at a time.
///
/// Registered with [`CoreBuilder::builder_constructor`](crate::CoreBuilder::builder_constructor).
/// Only decoded fields are passed, by declared name, parent first.
pub trait FieldBuilder<T>: Default + 'static {
    fn set_field(&mut self, name: &'static str, value: FieldValue) -> Result<(), CodecError>;

    fn build(self) -> Result<T, CodecError>;
}

fn build_with<T, B: FieldBuilder<T>>(values: Staged) -> Result<T, CodecError> {
    let mut builder = B::default();
    for (name, value) in values {
        if let Some(value) = value {
            builder.set_field(name, value)?;
        }
    }
    builder.build()
}

#[inline]
pub(crate) fn builder_fn<T, B: FieldBuilder<T>>() -> BuilderFn<T> {
    build_with::<T, B>
}

// -----------------------------------------------------------------------------
// Constructors

pub(crate) type NamedFn<T> = Arc<dyn Fn(&mut FieldMap) -> Result<T, CodecError> + Send + Sync>;
pub(crate) type PositionalFn<T> = Arc<dyn Fn(&mut Args) -> Result<T, CodecError> + Send + Sync>;
pub(crate) type BuilderFn<T> = fn(Staged) -> Result<T, CodecError>;

/// Construction strategies registered for one type.
pub(crate) struct Constructors<T> {
    pub named: Option<NamedFn<T>>,
    pub positional: Option<PositionalFn<T>>,
    pub builder: Option<BuilderFn<T>>,
}

impl<T> Default for Constructors<T> {
    #[inline]
    fn default() -> Self {
        Self {
            named: None,
            positional: None,
            builder: None,
        }
    }
}

// -----------------------------------------------------------------------------
// Construction

/// The strategy an object codec builds its values with.
pub(crate) enum Construction<T> {
    Named(NamedFn<T>),
    Positional(PositionalFn<T>),
    Builder(BuilderFn<T>),
    /// Start from a default value and assign the decoded fields.
    Mutation(fn() -> T),
}

impl<T> Construction<T> {
    /// Picks the first available strategy: named, positional, builder,
    /// then mutation of a default value.
    pub fn select(registered: Option<&Constructors<T>>, default: Option<fn() -> T>) -> Option<Self> {
        if let Some(registered) = registered {
            if let Some(named) = &registered.named {
                return Some(Construction::Named(Arc::clone(named)));
            }
            if let Some(positional) = &registered.positional {
                return Some(Construction::Positional(Arc::clone(positional)));
            }
            if let Some(builder) = registered.builder {
                return Some(Construction::Builder(builder));
            }
        }
        default.map(Construction::Mutation)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Construction::Named(_) => "named",
            Construction::Positional(_) => "positional",
            Construction::Builder(_) => "builder",
            Construction::Mutation(_) => "mutation",
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
