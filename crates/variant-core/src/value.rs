//! `Value<S>`: a discriminant plus a pointer-width slot.
//!
//! The discriminant indexes the alternative set `S`; the slot holds the
//! payload inline or boxed according to the alternative's storage class. All
//! lifecycle operations (clone, assign, drop, compare, format) are looked up
//! by discriminant through `S::ops`, a `match` generated per set.

use std::any::{self, Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::mem::{self, ManuallyDrop};

use crate::alternative::{Alternative, StorageClass};
use crate::error::{Result, VariantError};
use crate::input::{Input, IntoInput};
use crate::registry::{try_registry, Descriptor};
use crate::slot::{built, AltOps, Slot};

pub(crate) mod sealed {
    pub trait Sealed {}
}

/// A closed, ordered list of alternative types.
///
/// Implemented for tuples `(T0,)` through `(T0, ..., T11)` of [`Alternative`]
/// types, and for the tree set [`Tree`](crate::container::Tree). Position in
/// the tuple is the alternative's discriminant.
pub trait AlternativeSet: sealed::Sealed + Sized + 'static {
    /// Number of alternatives.
    const LEN: usize;

    #[doc(hidden)]
    fn ops(tag: u8) -> AltOps;

    #[doc(hidden)]
    fn describe(out: &mut Vec<Descriptor>);
}

/// A value holding exactly one alternative of `S`.
pub struct Value<S: AlternativeSet> {
    tag: u8,
    slot: Slot,
    _set: PhantomData<S>,
}

/// Registration caps sets at 256 alternatives, so every index fits a `u8`.
#[allow(clippy::cast_possible_truncation)]
fn tag_of(index: usize) -> u8 {
    debug_assert!(index <= usize::from(u8::MAX));
    index as u8
}

impl<S: AlternativeSet> Value<S> {
    pub(crate) fn from_parts(tag: u8, slot: Slot) -> Self {
        Value {
            tag,
            slot,
            _set: PhantomData,
        }
    }

    fn ops(&self) -> AltOps {
        S::ops(self.tag)
    }

    /// Construct from `input`, choosing the alternative with the type selector.
    pub fn try_new(input: impl IntoInput) -> Result<Self> {
        Self::try_with_args(input, Vec::new())
    }

    /// Construct from `input`.
    ///
    /// # Panics
    ///
    /// Panics when no alternative is constructible from the input.
    pub fn new(input: impl IntoInput) -> Self {
        match Self::try_new(input) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }

    /// Construct from `input` plus extra constructor arguments, such as
    /// `(text, count)` for a `String` prefix.
    pub fn try_with_args(input: impl IntoInput, args: Vec<Input>) -> Result<Self> {
        let registry = try_registry::<S>()?;
        let input = input.into_input();
        let tag = tag_of(registry.select(&input, &args)?);
        let input_name = input.shape().type_name;
        let slot = built((S::ops(tag).build)(input, args), registry.set_name(), input_name)?;
        Ok(Self::from_parts(tag, slot))
    }

    /// The first default-constructible alternative, default-constructed.
    pub fn try_default() -> Result<Self> {
        let registry = try_registry::<S>()?;
        let tag = tag_of(registry.default_index());
        let slot = built((S::ops(tag).default)(), registry.set_name(), "<default>")?;
        Ok(Self::from_parts(tag, slot))
    }

    /// Construct holding `value` as the alternative of type `T`, bypassing the selector.
    pub fn from_alternative<T: Alternative>(value: T) -> Result<Self> {
        let tag = tag_of(Self::tag_for::<T>()?);
        debug_assert!(S::ops(tag).is::<T>());
        Ok(Self::from_parts(tag, Slot::store(value)))
    }

    fn tag_for<T: 'static>() -> Result<usize> {
        try_registry::<S>()?
            .index_of(TypeId::of::<T>())
            .ok_or(VariantError::NotAnAlternative {
                type_name: any::type_name::<T>(),
                set: any::type_name::<S>(),
            })
    }

    /// Discriminant of `T` in this set, if it is an alternative.
    ///
    /// `None` for every `T` when the set itself is invalid.
    pub fn index_of<T: 'static>() -> Option<usize> {
        try_registry::<S>().ok()?.index_of(TypeId::of::<T>())
    }

    pub fn discriminant(&self) -> usize {
        usize::from(self.tag)
    }

    /// Type name of the active alternative.
    pub fn type_name(&self) -> &'static str {
        (self.ops().type_name)()
    }

    pub fn storage(&self) -> StorageClass {
        self.ops().storage
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.ops().is::<T>()
    }

    /// Checked access to the payload as `T`.
    pub fn get<T: Alternative>(&self) -> Result<&T> {
        let ops = self.ops();
        if ops.is::<T>() {
            // SAFETY: the active alternative is `T`.
            Ok(unsafe { self.slot.get::<T>() })
        } else {
            Err(ops.mismatch::<T>())
        }
    }

    pub fn get_mut<T: Alternative>(&mut self) -> Result<&mut T> {
        let ops = self.ops();
        if ops.is::<T>() {
            // SAFETY: the active alternative is `T`.
            Ok(unsafe { self.slot.get_mut::<T>() })
        } else {
            Err(ops.mismatch::<T>())
        }
    }

    /// Unchecked-style access for callers that already know the discriminant.
    ///
    /// # Panics
    ///
    /// Panics with the [`VariantError::TypeMismatch`] text if `T` is not active.
    pub fn raw<T: Alternative>(&self) -> &T {
        match self.get() {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }

    /// # Panics
    ///
    /// Panics if `T` is not the active alternative.
    pub fn raw_mut<T: Alternative>(&mut self) -> &mut T {
        match self.get_mut() {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }

    /// Move the payload out, or hand the value back if `T` is not active.
    pub fn into_inner<T: Alternative>(self) -> std::result::Result<T, Self> {
        if !self.is::<T>() {
            return Err(self);
        }
        let mut this = ManuallyDrop::new(self);
        // SAFETY: the active alternative is `T`, and `this` is never dropped.
        Ok(unsafe { this.slot.take::<T>() })
    }

    /// Make `T` the active alternative holding `value`.
    ///
    /// Assigns in place when `T` is already active, otherwise destroys the old
    /// payload first.
    pub fn set<T: Alternative>(&mut self, value: T) -> Result<&mut T> {
        if self.is::<T>() {
            // SAFETY: the active alternative is `T`.
            let slot = unsafe { self.slot.get_mut::<T>() };
            *slot = value;
            return Ok(slot);
        }
        *self = Self::from_alternative(value)?;
        // SAFETY: `from_alternative` stored a `T`.
        Ok(unsafe { self.slot.get_mut::<T>() })
    }

    /// Move-assign: reuses the payload storage when both sides hold the same alternative.
    pub fn assign(&mut self, other: Self) {
        if self.tag == other.tag {
            let other = ManuallyDrop::new(other);
            // SAFETY: both slots hold the alternative named by `tag`; the
            // source payload is consumed and `other` is never dropped.
            unsafe { (self.ops().move_assign)(&mut self.slot, other.slot) }
        } else {
            *self = other;
        }
    }

    /// Move the value out, leaving the default alternative behind.
    pub fn take(&mut self) -> Self {
        mem::take(self)
    }

    pub fn as_any(&self) -> &dyn Any {
        // SAFETY: the slot holds the alternative named by `tag`.
        unsafe { (self.ops().as_any)(&self.slot) }
    }

    pub(crate) fn tag(&self) -> u8 {
        self.tag
    }

    pub(crate) fn slot(&self) -> &Slot {
        &self.slot
    }

    pub(crate) fn slot_mut(&mut self) -> &mut Slot {
        &mut self.slot
    }
}

impl<S: AlternativeSet> Drop for Value<S> {
    fn drop(&mut self) {
        // SAFETY: the slot holds the alternative named by `tag` and is not used again.
        unsafe { (self.ops().drop)(&mut self.slot) }
    }
}

impl<S: AlternativeSet> Default for Value<S> {
    /// # Panics
    ///
    /// Panics if `S` is not a valid alternative set.
    fn default() -> Self {
        match Self::try_default() {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<S: AlternativeSet> Clone for Value<S> {
    fn clone(&self) -> Self {
        // SAFETY: the slot holds the alternative named by `tag`.
        let slot = unsafe { (self.ops().clone)(&self.slot) };
        Self::from_parts(self.tag, slot)
    }

    fn clone_from(&mut self, source: &Self) {
        if self.tag == source.tag {
            // SAFETY: both slots hold the alternative named by `tag`.
            unsafe { (self.ops().clone_assign)(&mut self.slot, &source.slot) }
        } else {
            *self = source.clone();
        }
    }
}

impl<S: AlternativeSet> PartialEq for Value<S> {
    fn eq(&self, other: &Self) -> bool {
        // SAFETY: equal tags mean both slots hold the same alternative.
        self.tag == other.tag && unsafe { (self.ops().eq)(&self.slot, &other.slot) }
    }
}

impl<S: AlternativeSet> fmt::Debug for Value<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // SAFETY: the slot holds the alternative named by `tag`.
        unsafe { (self.ops().fmt)(&self.slot, f) }
    }
}
