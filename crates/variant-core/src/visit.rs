//! Visitor dispatch.
//!
//! [`apply`] jumps straight to the handler of the active alternative: every
//! alternative set implements [`Dispatch`] as one `match` over the
//! discriminant, so dispatch cost does not grow with the number of
//! alternatives. A visitor is any type implementing [`Visit<T>`] for every
//! alternative `T` of the set; [`Handlers`] builds one from closures instead.
//!
//! ```
//! use variant_core::{apply, Null, Value, Visit, Visitor};
//!
//! struct Describe;
//! impl Visitor for Describe {
//!     type Output = String;
//! }
//! impl Visit<Null> for Describe {
//!     fn visit(&mut self, _: &Null, _: ()) -> String {
//!         "null".into()
//!     }
//! }
//! impl Visit<i64> for Describe {
//!     fn visit(&mut self, n: &i64, _: ()) -> String {
//!         format!("int {n}")
//!     }
//! }
//!
//! let v = Value::<(Null, i64)>::new(7i64);
//! assert_eq!(apply(&v, &mut Describe), "int 7");
//! ```

use std::any;

use crate::alternative::Alternative;
use crate::error::{Result, VariantError};
use crate::slot::Slot;
use crate::value::{AlternativeSet, Value};

/// Common output type of a visitor.
pub trait Visitor {
    type Output;
}

/// Handler for alternative `T`, with extra arguments `A` forwarded by the caller.
pub trait Visit<T, A = ()>: Visitor {
    fn visit(&mut self, value: &T, args: A) -> Self::Output;
}

/// Mutable counterpart of [`Visit`].
pub trait VisitMut<T, A = ()>: Visitor {
    fn visit_mut(&mut self, value: &mut T, args: A) -> Self::Output;
}

/// Alternative sets whose every alternative `V` can visit.
pub trait Dispatch<V: Visitor, A = ()>: AlternativeSet {
    /// # Safety
    /// `slot` must hold the alternative with discriminant `tag`.
    #[doc(hidden)]
    unsafe fn dispatch(tag: u8, slot: &Slot, visitor: &mut V, args: A) -> V::Output;
}

pub trait DispatchMut<V: Visitor, A = ()>: AlternativeSet {
    /// # Safety
    /// `slot` must hold the alternative with discriminant `tag`.
    #[doc(hidden)]
    unsafe fn dispatch_mut(tag: u8, slot: &mut Slot, visitor: &mut V, args: A) -> V::Output;
}

/// Call the visitor's handler for the active alternative.
pub fn apply<S, V>(value: &Value<S>, visitor: &mut V) -> V::Output
where
    S: Dispatch<V>,
    V: Visitor,
{
    apply_with(value, visitor, ())
}

/// [`apply`] with extra arguments forwarded to the handler.
pub fn apply_with<S, V, A>(value: &Value<S>, visitor: &mut V, args: A) -> V::Output
where
    S: Dispatch<V, A>,
    V: Visitor,
{
    // SAFETY: a value's slot always holds the alternative named by its tag.
    unsafe { S::dispatch(value.tag(), value.slot(), visitor, args) }
}

/// Call the visitor's mutable handler for the active alternative.
pub fn apply_mut<S, V>(value: &mut Value<S>, visitor: &mut V) -> V::Output
where
    S: DispatchMut<V>,
    V: Visitor,
{
    apply_mut_with(value, visitor, ())
}

pub fn apply_mut_with<S, V, A>(value: &mut Value<S>, visitor: &mut V, args: A) -> V::Output
where
    S: DispatchMut<V, A>,
    V: Visitor,
{
    let tag = value.tag();
    // SAFETY: the handler gets `&mut T` only and cannot change the discriminant.
    unsafe { S::dispatch_mut(tag, value.slot_mut(), visitor, args) }
}

impl<S: AlternativeSet> Value<S> {
    /// Method form of [`apply`].
    pub fn visit<V: Visitor>(&self, visitor: &mut V) -> V::Output
    where
        S: Dispatch<V>,
    {
        apply(self, visitor)
    }

    /// Method form of [`apply_mut`].
    pub fn visit_mut<V: Visitor>(&mut self, visitor: &mut V) -> V::Output
    where
        S: DispatchMut<V>,
    {
        apply_mut(self, visitor)
    }
}

type Handler<'h, S, R> = Box<dyn FnMut(&Value<S>) -> R + 'h>;

/// A visitor assembled from independent closures, one per alternative.
///
/// Handlers live in a table indexed by discriminant. Alternatives without a
/// handler fall back to [`Handlers::otherwise`], or produce `None`.
pub struct Handlers<'h, S: AlternativeSet, R> {
    table: Vec<Option<Handler<'h, S, R>>>,
    fallback: Option<Handler<'h, S, R>>,
}

impl<'h, S: AlternativeSet, R> Handlers<'h, S, R> {
    pub fn new() -> Self {
        Handlers {
            table: (0..S::LEN).map(|_| None).collect(),
            fallback: None,
        }
    }

    /// Register the handler for alternative `T`, replacing any previous one.
    pub fn try_on<T: Alternative>(mut self, mut handler: impl FnMut(&T) -> R + 'h) -> Result<Self> {
        let index = Value::<S>::index_of::<T>().ok_or(VariantError::NotAnAlternative {
            type_name: any::type_name::<T>(),
            set: any::type_name::<S>(),
        })?;
        self.table[index] = Some(Box::new(move |value: &Value<S>| handler(value.raw::<T>())));
        Ok(self)
    }

    /// # Panics
    ///
    /// Panics if `T` is not an alternative of `S`.
    pub fn on<T: Alternative>(self, handler: impl FnMut(&T) -> R + 'h) -> Self {
        match self.try_on(handler) {
            Ok(handlers) => handlers,
            Err(err) => panic!("{err}"),
        }
    }

    /// Handler for every alternative without a dedicated one.
    pub fn otherwise(mut self, handler: impl FnMut(&Value<S>) -> R + 'h) -> Self {
        self.fallback = Some(Box::new(handler));
        self
    }

    pub fn apply(&mut self, value: &Value<S>) -> Option<R> {
        match &mut self.table[value.discriminant()] {
            Some(handler) => Some(handler(value)),
            None => self.fallback.as_mut().map(|handler| handler(value)),
        }
    }
}

impl<S: AlternativeSet, R> Default for Handlers<'_, S, R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alternative::Null;

    type Small = Value<(Null, bool, u32, String)>;

    struct Name;

    impl Visitor for Name {
        type Output = &'static str;
    }

    impl<T> Visit<T> for Name {
        fn visit(&mut self, _: &T, _: ()) -> &'static str {
            any::type_name::<T>()
        }
    }

    #[test]
    fn dispatch_reaches_the_active_alternative() {
        assert_eq!(apply(&Small::new(3u32), &mut Name), "u32");
        assert_eq!(Small::new("s").visit(&mut Name), any::type_name::<String>());
        assert_eq!(apply(&Small::default(), &mut Name), any::type_name::<Null>());
    }

    #[test]
    fn extra_arguments_reach_the_handler() {
        struct Add;
        impl Visitor for Add {
            type Output = u32;
        }
        impl Visit<Null, u32> for Add {
            fn visit(&mut self, _: &Null, n: u32) -> u32 {
                n
            }
        }
        impl Visit<bool, u32> for Add {
            fn visit(&mut self, b: &bool, n: u32) -> u32 {
                n + u32::from(*b)
            }
        }
        impl Visit<u32, u32> for Add {
            fn visit(&mut self, v: &u32, n: u32) -> u32 {
                v + n
            }
        }
        impl Visit<String, u32> for Add {
            fn visit(&mut self, s: &String, n: u32) -> u32 {
                n + s.len() as u32
            }
        }
        assert_eq!(apply_with(&Small::new(40u32), &mut Add, 2), 42);
        assert_eq!(apply_with(&Small::new("abc"), &mut Add, 1), 4);
    }

    #[test]
    fn mutable_dispatch_edits_in_place() {
        struct Double;
        impl Visitor for Double {
            type Output = ();
        }
        impl VisitMut<Null> for Double {
            fn visit_mut(&mut self, _: &mut Null, _: ()) {}
        }
        impl VisitMut<bool> for Double {
            fn visit_mut(&mut self, b: &mut bool, _: ()) {
                *b = !*b;
            }
        }
        impl VisitMut<u32> for Double {
            fn visit_mut(&mut self, n: &mut u32, _: ()) {
                *n *= 2;
            }
        }
        impl VisitMut<String> for Double {
            fn visit_mut(&mut self, s: &mut String, _: ()) {
                *s = s.repeat(2);
            }
        }
        let mut v = Small::new(21u32);
        v.visit_mut(&mut Double);
        assert_eq!(v.get::<u32>(), Ok(&42));
        let mut v = Small::new("ab");
        apply_mut(&mut v, &mut Double);
        assert_eq!(v.get::<String>().unwrap(), "abab");
    }

    #[test]
    fn handlers_use_the_discriminant_table() {
        let mut handlers = Handlers::<(Null, bool, u32, String), String>::new()
            .on(|n: &u32| format!("u32 {n}"))
            .otherwise(|v| format!("other {}", v.discriminant()));
        let seen: Vec<_> = [Small::new(5u32), Small::new(true)]
            .iter()
            .filter_map(|v| handlers.apply(v))
            .collect();
        assert_eq!(seen, ["u32 5", "other 1"]);
    }

    #[test]
    fn handlers_without_fallback_skip_unhandled() {
        let mut handlers = Handlers::<(Null, bool, u32, String), usize>::new().on(|s: &String| s.len());
        assert_eq!(handlers.apply(&Small::new("four")), Some(4));
        assert_eq!(handlers.apply(&Small::new(false)), None);
    }

    #[test]
    fn handlers_reject_foreign_types() {
        let err = Handlers::<(Null, bool, u32, String), ()>::new()
            .try_on(|_: &i8| ())
            .err();
        assert!(matches!(err, Some(VariantError::NotAnAlternative { .. })));
    }
}
