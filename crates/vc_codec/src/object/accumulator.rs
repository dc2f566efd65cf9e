use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use fixedbitset::FixedBitSet;

use super::construct::{Args, Construction, FieldMap, FieldValue};
use super::meta::{ObjectMeta, Route};
use crate::format::Decoder;
use crate::{At, CodecCore, CodecError};

// -----------------------------------------------------------------------------
// Accumulate

/// A [`ResultAccumulator`] with its target type erased.
///
/// Lets an object accumulate the fields of its parent without knowing
/// the parent's type.
pub trait Accumulate {
    /// Decodes the value of the field `name` if the object has such a field.
    ///
    /// Returns `false`, leaving the value unread, for unknown names.
    fn accept(&mut self, core: &CodecCore, name: &str, input: &mut dyn Decoder) -> Result<bool, CodecError>;

    /// Appends the external names of the fields not seen yet.
    fn collect_missing(&self, out: &mut Vec<String>);

    /// Builds the value.
    fn construct_value(self: Box<Self>) -> Result<FieldValue, CodecError>;
}

// -----------------------------------------------------------------------------
// ResultAccumulator

/// Staging area for the fields of one object being decoded.
///
/// Created per decoded object and consumed by [`ResultAccumulator::construct`].
/// Dropping it discards everything decoded so far.
pub struct ResultAccumulator<T> {
    meta: Arc<ObjectMeta<T>>,
    slots: Vec<Option<FieldValue>>,
    seen: FixedBitSet,
    parent: Option<Box<dyn Accumulate>>,
}

impl<T: 'static> ResultAccumulator<T> {
    pub fn new(meta: Arc<ObjectMeta<T>>) -> Self {
        let len = meta.fields.len();
        let parent = meta.parent.as_ref().map(|p| p.access.start());

        let mut slots = Vec::with_capacity(len);
        slots.resize_with(len, || None);

        Self {
            meta,
            slots,
            seen: FixedBitSet::with_capacity(len),
            parent,
        }
    }

    /// Decodes the value of the field `name`.
    ///
    /// A name seen twice is an error in every configuration.
    pub fn accept(&mut self, core: &CodecCore, name: &str, input: &mut dyn Decoder) -> Result<bool, CodecError> {
        match self.meta.route(name) {
            None => Ok(false),
            Some(Route::Parent) => match &mut self.parent {
                Some(parent) => parent.accept(core, name, input),
                None => Ok(false),
            },
            Some(Route::Field(index)) => {
                if self.seen.put(index) {
                    return Err(CodecError::DuplicateField {
                        ty: self.meta.ty().path(),
                        field: name.to_string(),
                        at: At(input.position()),
                    });
                }
                let value = self.meta.fields[index].access.decode(core, input)?;
                self.slots[index] = Some(value);
                Ok(true)
            }
        }
    }

    /// External names of the fields not seen yet, parent fields first.
    pub fn missing(&self) -> Vec<String> {
        let mut missing = Vec::new();
        self.collect_missing(&mut missing);
        missing
    }

    /// Builds the value with the type's construction strategy.
    pub fn construct(self) -> Result<T, CodecError> {
        let Self {
            meta, slots, parent, ..
        } = self;

        let parent = match parent {
            Some(parent) => Some(parent.construct_value()?),
            None => None,
        };

        let ty = meta.ty().path();
        match &meta.construction {
            Construction::Mutation(make) => {
                let mut this = make();
                if let (Some(link), Some(value)) = (&meta.parent, parent) {
                    link.access.assign(&mut this, value)?;
                }
                for (field, slot) in meta.fields.iter().zip(slots) {
                    if let Some(value) = slot {
                        field.access.assign(&mut this, value)?;
                    }
                }
                Ok(this)
            }
            Construction::Named(f) => f(&mut FieldMap::new(ty, meta.stage(parent, slots))),
            Construction::Positional(f) => f(&mut Args::new(ty, meta.stage(parent, slots))),
            Construction::Builder(f) => f(meta.stage(parent, slots)),
        }
    }
}

impl<T: 'static> Accumulate for ResultAccumulator<T> {
    #[inline]
    fn accept(&mut self, core: &CodecCore, name: &str, input: &mut dyn Decoder) -> Result<bool, CodecError> {
        ResultAccumulator::accept(self, core, name, input)
    }

    fn collect_missing(&self, out: &mut Vec<String>) {
        if let Some(parent) = &self.parent {
            parent.collect_missing(out);
        }
        for (index, field) in self.meta.fields.iter().enumerate() {
            if !self.seen.contains(index) {
                out.push(field.name().to_string());
            }
        }
    }

    #[inline]
    fn construct_value(self: Box<Self>) -> Result<FieldValue, CodecError> {
        (*self).construct().map(FieldValue::new)
    }
}

impl<T: 'static> fmt::Debug for ResultAccumulator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultAccumulator")
            .field("ty", &self.meta.ty())
            .field("seen", &self.seen.ones().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
