//! Type-erased constructor inputs.
//!
//! Every value handed to `Value::new` is first lowered into an [`Input`]: its
//! static type identity, a coarse [`InputClass`] used by the selector, and the
//! payload itself. Built-in scalars carry their payload in a canonical form
//! (`i64`/`u64`/`f64`/`String`); anything else travels as an opaque
//! `Box<dyn Any>` that only an alternative of exactly that type can accept.

use std::any::{self, Any, TypeId};

use crate::alternative::Null;

/// Coarse classification of an input, the unit the selector ranks on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputClass {
    /// `Null`, `()` or `None`.
    Null,
    /// A boolean literal.
    Bool,
    /// An integer of the given signedness and width in bits.
    Int { signed: bool, bits: u32 },
    /// A float of the given width in bits.
    Float { bits: u32 },
    /// A single `char`.
    Char,
    /// `&str` or `String`.
    Text,
    /// Any other type; only constructible into itself.
    Opaque,
}

impl InputClass {
    pub fn is_integral(self) -> bool {
        matches!(self, InputClass::Int { .. })
    }
}

/// Static description of an input: what the selector sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputShape {
    pub type_id: TypeId,
    pub type_name: &'static str,
    pub class: InputClass,
}

impl InputShape {
    /// Shape of the Rust type `T` under the given class.
    pub fn of<T: ?Sized + 'static>(class: InputClass) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: any::type_name::<T>(),
            class,
        }
    }
}

/// Canonical payload carried by an [`Input`].
#[derive(Debug)]
pub enum Payload {
    Null,
    Bool(bool),
    Signed(i64),
    Unsigned(u64),
    Float(f64),
    Char(char),
    Text(String),
    Opaque(Box<dyn Any>),
}

/// A constructor argument: shape plus payload.
#[derive(Debug)]
pub struct Input {
    shape: InputShape,
    payload: Payload,
}

impl Input {
    fn scalar<T: ?Sized + 'static>(class: InputClass, payload: Payload) -> Self {
        Self {
            shape: InputShape::of::<T>(class),
            payload,
        }
    }

    /// Wrap an arbitrary value so that only an alternative of type `T` accepts it.
    pub fn exact<T: 'static>(value: T) -> Self {
        Self::scalar::<T>(InputClass::Opaque, Payload::Opaque(Box::new(value)))
    }

    pub fn shape(&self) -> &InputShape {
        &self.shape
    }

    pub fn class(&self) -> InputClass {
        self.shape.class
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn into_payload(self) -> Payload {
        self.payload
    }

    /// Recover an opaque payload of type `T`, handing the input back on mismatch.
    pub fn downcast<T: 'static>(self) -> std::result::Result<T, Self> {
        match self.payload {
            Payload::Opaque(boxed) => match boxed.downcast::<T>() {
                Ok(value) => Ok(*value),
                Err(boxed) => Err(Self {
                    shape: self.shape,
                    payload: Payload::Opaque(boxed),
                }),
            },
            payload => Err(Self {
                shape: self.shape,
                payload,
            }),
        }
    }

    /// Interpret the payload as a non-negative count (used by extra arguments).
    pub fn as_count(&self) -> Option<usize> {
        match self.payload {
            Payload::Unsigned(n) => usize::try_from(n).ok(),
            Payload::Signed(n) => usize::try_from(n).ok(),
            _ => None,
        }
    }
}

/// Conversion into a type-erased constructor [`Input`].
///
/// Implemented for the built-in scalars, string types, `Null`, `()` and
/// `Option<T>`. User types implement it with [`Input::exact`].
pub trait IntoInput {
    fn into_input(self) -> Input;
}

impl IntoInput for Input {
    fn into_input(self) -> Input {
        self
    }
}

impl IntoInput for Null {
    fn into_input(self) -> Input {
        Input::scalar::<Null>(InputClass::Null, Payload::Null)
    }
}

impl IntoInput for () {
    fn into_input(self) -> Input {
        Input::scalar::<()>(InputClass::Null, Payload::Null)
    }
}

impl<T: IntoInput> IntoInput for Option<T> {
    fn into_input(self) -> Input {
        match self {
            Some(value) => value.into_input(),
            None => Input::scalar::<Option<()>>(InputClass::Null, Payload::Null),
        }
    }
}

impl IntoInput for bool {
    fn into_input(self) -> Input {
        Input::scalar::<bool>(InputClass::Bool, Payload::Bool(self))
    }
}

macro_rules! signed_input {
    ($($t:ty),*) => {$(
        impl IntoInput for $t {
            fn into_input(self) -> Input {
                Input::scalar::<$t>(
                    InputClass::Int { signed: true, bits: <$t>::BITS },
                    Payload::Signed(i64::from(self)),
                )
            }
        }
    )*};
}

macro_rules! unsigned_input {
    ($($t:ty),*) => {$(
        impl IntoInput for $t {
            fn into_input(self) -> Input {
                Input::scalar::<$t>(
                    InputClass::Int { signed: false, bits: <$t>::BITS },
                    Payload::Unsigned(u64::from(self)),
                )
            }
        }
    )*};
}

signed_input!(i8, i16, i32, i64);
unsigned_input!(u8, u16, u32, u64);

impl IntoInput for isize {
    fn into_input(self) -> Input {
        // isize is at most 64 bits on every supported target.
        Input::scalar::<isize>(
            InputClass::Int {
                signed: true,
                bits: isize::BITS,
            },
            Payload::Signed(self as i64),
        )
    }
}

impl IntoInput for usize {
    fn into_input(self) -> Input {
        Input::scalar::<usize>(
            InputClass::Int {
                signed: false,
                bits: usize::BITS,
            },
            Payload::Unsigned(self as u64),
        )
    }
}

impl IntoInput for f32 {
    fn into_input(self) -> Input {
        Input::scalar::<f32>(InputClass::Float { bits: 32 }, Payload::Float(f64::from(self)))
    }
}

impl IntoInput for f64 {
    fn into_input(self) -> Input {
        Input::scalar::<f64>(InputClass::Float { bits: 64 }, Payload::Float(self))
    }
}

impl IntoInput for char {
    fn into_input(self) -> Input {
        Input::scalar::<char>(InputClass::Char, Payload::Char(self))
    }
}

impl IntoInput for &str {
    fn into_input(self) -> Input {
        Input::scalar::<&'static str>(InputClass::Text, Payload::Text(self.to_owned()))
    }
}

impl IntoInput for String {
    fn into_input(self) -> Input {
        Input::scalar::<String>(InputClass::Text, Payload::Text(self))
    }
}

impl IntoInput for Box<str> {
    fn into_input(self) -> Input {
        Input::scalar::<Box<str>>(InputClass::Text, Payload::Text(self.into_string()))
    }
}

/// Shapes of every built-in input type; the registry precomputes a ranking for each.
pub(crate) fn builtin_shapes() -> Vec<InputShape> {
    vec![
        InputShape::of::<Null>(InputClass::Null),
        InputShape::of::<()>(InputClass::Null),
        InputShape::of::<Option<()>>(InputClass::Null),
        InputShape::of::<bool>(InputClass::Bool),
        InputShape::of::<i8>(InputClass::Int { signed: true, bits: 8 }),
        InputShape::of::<i16>(InputClass::Int { signed: true, bits: 16 }),
        InputShape::of::<i32>(InputClass::Int { signed: true, bits: 32 }),
        InputShape::of::<i64>(InputClass::Int { signed: true, bits: 64 }),
        InputShape::of::<isize>(InputClass::Int {
            signed: true,
            bits: isize::BITS,
        }),
        InputShape::of::<u8>(InputClass::Int { signed: false, bits: 8 }),
        InputShape::of::<u16>(InputClass::Int { signed: false, bits: 16 }),
        InputShape::of::<u32>(InputClass::Int { signed: false, bits: 32 }),
        InputShape::of::<u64>(InputClass::Int { signed: false, bits: 64 }),
        InputShape::of::<usize>(InputClass::Int {
            signed: false,
            bits: usize::BITS,
        }),
        InputShape::of::<f32>(InputClass::Float { bits: 32 }),
        InputShape::of::<f64>(InputClass::Float { bits: 64 }),
        InputShape::of::<char>(InputClass::Char),
        InputShape::of::<&'static str>(InputClass::Text),
        InputShape::of::<String>(InputClass::Text),
        InputShape::of::<Box<str>>(InputClass::Text),
    ]
}
