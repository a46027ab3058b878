//! Pointer-width payload slot and the per-alternative operation table.
//!
//! A [`Slot`] holds either an inline payload (types no larger or more aligned
//! than a pointer, and not self-referential) or a pointer obtained from
//! `Box::into_raw`. Which of the two applies is a property of the type alone,
//! [`Layout::<T>::INLINE`], so every accessor below is monomorphised for one
//! storage class and carries no runtime flag.
//!
//! [`AltOps`] bundles the type-erased operations a `Value` needs for one
//! alternative. Sets hand them out by discriminant, see `AlternativeSet::ops`.

use std::any::{self, Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::mem::{self, MaybeUninit};

use crate::alternative::{Alternative, StorageClass};
use crate::error::{Result, VariantError};
use crate::input::Input;

/// Raw storage for one payload. Uninitialised until an alternative is written.
#[doc(hidden)]
#[derive(Clone, Copy)]
pub struct Slot(MaybeUninit<*mut ()>);

/// Compile-time storage classification of `T`.
pub(crate) struct Layout<T>(PhantomData<T>);

impl<T: Alternative> Layout<T> {
    pub(crate) const INLINE: bool = !T::SELF_REFERENTIAL
        && mem::size_of::<T>() <= mem::size_of::<Slot>()
        && mem::align_of::<T>() <= mem::align_of::<Slot>();

    pub(crate) const STORAGE: StorageClass = if Self::INLINE {
        StorageClass::Inline
    } else {
        StorageClass::Boxed
    };
}

impl Slot {
    pub(crate) const fn uninit() -> Self {
        Slot(MaybeUninit::uninit())
    }

    /// Move `value` into a fresh slot.
    pub(crate) fn store<T: Alternative>(value: T) -> Self {
        if Layout::<T>::INLINE {
            let mut slot = Slot::uninit();
            // SAFETY: `T` fits the slot in both size and alignment.
            unsafe { slot.0.as_mut_ptr().cast::<T>().write(value) }
            slot
        } else {
            Slot(MaybeUninit::new(Box::into_raw(Box::new(value)).cast()))
        }
    }

    /// # Safety
    /// The slot must hold an initialised `T`.
    pub(crate) unsafe fn get<T: Alternative>(&self) -> &T {
        if Layout::<T>::INLINE {
            unsafe { &*self.0.as_ptr().cast::<T>() }
        } else {
            unsafe { &*self.0.assume_init().cast::<T>() }
        }
    }

    /// # Safety
    /// The slot must hold an initialised `T`.
    pub(crate) unsafe fn get_mut<T: Alternative>(&mut self) -> &mut T {
        if Layout::<T>::INLINE {
            unsafe { &mut *self.0.as_mut_ptr().cast::<T>() }
        } else {
            unsafe { &mut *self.0.assume_init().cast::<T>() }
        }
    }

    /// Move the payload out, leaving the slot logically uninitialised.
    ///
    /// # Safety
    /// The slot must hold an initialised `T`, and must not be read or dropped
    /// again until something is stored in it.
    pub(crate) unsafe fn take<T: Alternative>(&mut self) -> T {
        if Layout::<T>::INLINE {
            unsafe { self.0.as_ptr().cast::<T>().read() }
        } else {
            unsafe { *Box::from_raw(self.0.assume_init().cast::<T>()) }
        }
    }

    /// # Safety
    /// The slot must hold an initialised `T`; afterwards it is uninitialised.
    pub(crate) unsafe fn drop_in_place<T: Alternative>(&mut self) {
        if Layout::<T>::INLINE {
            unsafe { self.0.as_mut_ptr().cast::<T>().drop_in_place() }
        } else {
            drop(unsafe { Box::from_raw(self.0.assume_init().cast::<T>()) });
        }
    }
}

/// Type-erased operations for one alternative.
#[doc(hidden)]
#[derive(Clone, Copy)]
pub struct AltOps {
    pub(crate) type_id: fn() -> TypeId,
    pub(crate) type_name: fn() -> &'static str,
    pub(crate) storage: StorageClass,
    pub(crate) build: fn(Input, Vec<Input>) -> Option<Slot>,
    pub(crate) default: fn() -> Option<Slot>,
    pub(crate) clone: unsafe fn(&Slot) -> Slot,
    pub(crate) clone_assign: unsafe fn(&mut Slot, &Slot),
    pub(crate) move_assign: unsafe fn(&mut Slot, Slot),
    pub(crate) drop: unsafe fn(&mut Slot),
    pub(crate) eq: unsafe fn(&Slot, &Slot) -> bool,
    pub(crate) fmt: unsafe fn(&Slot, &mut fmt::Formatter<'_>) -> fmt::Result,
    pub(crate) as_any: unsafe fn(&Slot) -> &dyn Any,
}

impl AltOps {
    pub(crate) fn of<T: Alternative>() -> Self {
        AltOps {
            type_id: TypeId::of::<T>,
            type_name: any::type_name::<T>,
            storage: Layout::<T>::STORAGE,
            build: build::<T>,
            default: default::<T>,
            clone: clone::<T>,
            clone_assign: clone_assign::<T>,
            move_assign: move_assign::<T>,
            drop: drop_slot::<T>,
            eq: eq::<T>,
            fmt: fmt_slot::<T>,
            as_any: as_any::<T>,
        }
    }

    pub(crate) fn is<T: 'static>(&self) -> bool {
        (self.type_id)() == TypeId::of::<T>()
    }

    pub(crate) fn mismatch<T>(&self) -> VariantError {
        VariantError::TypeMismatch {
            expected: any::type_name::<T>(),
            found: (self.type_name)(),
        }
    }
}

fn build<T: Alternative>(input: Input, args: Vec<Input>) -> Option<Slot> {
    T::from_input(input, args).map(Slot::store)
}

fn default<T: Alternative>() -> Option<Slot> {
    T::default_value().map(Slot::store)
}

unsafe fn clone<T: Alternative>(src: &Slot) -> Slot {
    Slot::store(unsafe { src.get::<T>() }.clone())
}

unsafe fn clone_assign<T: Alternative>(dst: &mut Slot, src: &Slot) {
    unsafe { dst.get_mut::<T>().clone_from(src.get::<T>()) }
}

unsafe fn move_assign<T: Alternative>(dst: &mut Slot, mut src: Slot) {
    // Boxed payloads are moved into the existing allocation; only the source box is freed.
    let value = unsafe { src.take::<T>() };
    *unsafe { dst.get_mut::<T>() } = value;
}

unsafe fn drop_slot<T: Alternative>(slot: &mut Slot) {
    unsafe { slot.drop_in_place::<T>() }
}

unsafe fn eq<T: Alternative>(a: &Slot, b: &Slot) -> bool {
    unsafe { a.get::<T>() == b.get::<T>() }
}

unsafe fn fmt_slot<T: Alternative>(slot: &Slot, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Debug::fmt(unsafe { slot.get::<T>() }, f)
}

unsafe fn as_any<T: Alternative>(slot: &Slot) -> &dyn Any {
    unsafe { slot.get::<T>() }
}

/// Validate a slot-level result, mapping a refused conversion to an error.
pub(crate) fn built(slot: Option<Slot>, set: &'static str, input: &'static str) -> Result<Slot> {
    slot.ok_or(VariantError::ConstructionUnsupported {
        set,
        input,
        reason: "the selected alternative rejected the value",
    })
}
