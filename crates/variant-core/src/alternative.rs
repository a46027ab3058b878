//! The `Alternative` trait: what a type must declare to join an alternative set.
//!
//! An alternative describes itself to the registry through an [`AltKind`]
//! (which drives the type selector's precedence rules), a self-reference bit
//! (which forces boxed storage), an optional default, and a pair of
//! construction hooks: `accepts` answers "is this input class constructible"
//! once at registration time, `from_input` performs the conversion per call.

use std::any::TypeId;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::input::{Input, InputClass, InputShape, Payload};

/// The unit alternative, standing for JSON `null`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Null;

impl fmt::Display for Null {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("null")
    }
}

impl Serialize for Null {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_unit()
    }
}

/// Selector-facing category of an alternative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AltKind {
    Null,
    Bool,
    Int { signed: bool, bits: u32 },
    Float { bits: u32 },
    Char,
    Text,
    /// An ordered sequence (the tree's `Array`).
    Sequence,
    /// A keyed mapping (the tree's `Object`).
    Mapping,
    /// Anything else; constructible only from an input of its own type.
    Opaque,
}

impl AltKind {
    pub fn is_integral(self) -> bool {
        matches!(self, AltKind::Int { .. })
    }

    pub fn is_float(self) -> bool {
        matches!(self, AltKind::Float { .. })
    }

    /// Whether an integer payload fits this kind without narrowing.
    pub(crate) fn holds(self, payload: &Payload) -> bool {
        let value = match *payload {
            Payload::Signed(v) => i128::from(v),
            Payload::Unsigned(v) => i128::from(v),
            _ => return false,
        };
        match self {
            AltKind::Int { signed: true, bits } => {
                let max = (1i128 << (bits - 1)) - 1;
                (-max - 1..=max).contains(&value)
            }
            AltKind::Int {
                signed: false,
                bits,
            } => (0..=(1i128 << bits) - 1).contains(&value),
            AltKind::Float { .. } => true,
            _ => false,
        }
    }

    /// Default constructibility predicate for the kind.
    ///
    /// Conversions follow Rust's lossless `From` impls, with two widenings:
    /// integer inputs are range-checked per value instead of per type, and
    /// integers may become floats as the selector's last resort.
    fn accepts(self, own: TypeId, input: &InputShape, args: &[InputShape]) -> bool {
        if !args.is_empty() {
            return self == AltKind::Text
                && matches!(input.class, InputClass::Text | InputClass::Char)
                && args.len() == 1
                && args[0].class.is_integral();
        }
        match (self, input.class) {
            (AltKind::Null, InputClass::Null) => true,
            (AltKind::Bool, InputClass::Bool) => true,
            (AltKind::Int { .. }, InputClass::Bool | InputClass::Int { .. }) => true,
            (AltKind::Float { .. }, InputClass::Bool | InputClass::Int { .. }) => true,
            (AltKind::Float { bits }, InputClass::Float { bits: from }) => from <= bits,
            (AltKind::Char, InputClass::Char) => true,
            (AltKind::Text, InputClass::Text | InputClass::Char) => true,
            _ => input.type_id == own,
        }
    }
}

/// Where an alternative's payload lives inside a `Value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageClass {
    /// Directly in the pointer-width slot.
    Inline,
    /// Behind an owned heap allocation whose pointer sits in the slot.
    Boxed,
}

/// A type that can be one of the alternatives of a `Value`.
pub trait Alternative: Clone + PartialEq + fmt::Debug + 'static {
    /// Category consulted by the type selector.
    const KIND: AltKind = AltKind::Opaque;

    /// Set for types that contain the value type itself (the tree's `Array`
    /// and `Object`). Such alternatives are always boxed.
    const SELF_REFERENTIAL: bool = false;

    /// Whether [`Alternative::default_value`] returns `Some`. Registration reads
    /// this instead of constructing a default.
    const HAS_DEFAULT: bool = false;

    /// The value used by `Default` when this is the first default-constructible alternative.
    fn default_value() -> Option<Self> {
        None
    }

    /// Whether `(input, args)` can construct this type. Evaluated at registration.
    fn accepts(input: &InputShape, args: &[InputShape]) -> bool {
        Self::KIND.accepts(TypeId::of::<Self>(), input, args)
    }

    /// Convert an input accepted by [`Alternative::accepts`].
    fn from_input(input: Input, args: Vec<Input>) -> Option<Self> {
        if !args.is_empty() {
            return None;
        }
        input.downcast::<Self>().ok()
    }
}

impl Alternative for Null {
    const KIND: AltKind = AltKind::Null;
    const HAS_DEFAULT: bool = true;

    fn default_value() -> Option<Self> {
        Some(Null)
    }

    fn from_input(input: Input, args: Vec<Input>) -> Option<Self> {
        match input.payload() {
            Payload::Null if args.is_empty() => Some(Null),
            _ => None,
        }
    }
}

impl Alternative for bool {
    const KIND: AltKind = AltKind::Bool;
    const HAS_DEFAULT: bool = true;

    fn default_value() -> Option<Self> {
        Some(false)
    }

    fn from_input(input: Input, args: Vec<Input>) -> Option<Self> {
        match *input.payload() {
            Payload::Bool(b) if args.is_empty() => Some(b),
            _ => None,
        }
    }
}

macro_rules! int_alternative {
    ($($t:ty => $signed:expr),* $(,)?) => {$(
        impl Alternative for $t {
            const KIND: AltKind = AltKind::Int { signed: $signed, bits: <$t>::BITS };
            const HAS_DEFAULT: bool = true;

            fn default_value() -> Option<Self> {
                Some(0)
            }

            fn from_input(input: Input, args: Vec<Input>) -> Option<Self> {
                if !args.is_empty() {
                    return None;
                }
                match *input.payload() {
                    Payload::Bool(b) => Some(<$t>::from(b)),
                    Payload::Signed(v) => <$t>::try_from(v).ok(),
                    Payload::Unsigned(v) => <$t>::try_from(v).ok(),
                    _ => None,
                }
            }
        }
    )*};
}

int_alternative! {
    i8 => true, i16 => true, i32 => true, i64 => true, isize => true,
    u8 => false, u16 => false, u32 => false, u64 => false, usize => false,
}

macro_rules! float_alternative {
    ($($t:ty => $bits:expr),* $(,)?) => {$(
        impl Alternative for $t {
            const KIND: AltKind = AltKind::Float { bits: $bits };
            const HAS_DEFAULT: bool = true;

            fn default_value() -> Option<Self> {
                Some(0.0)
            }

            #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
            fn from_input(input: Input, args: Vec<Input>) -> Option<Self> {
                if !args.is_empty() {
                    return None;
                }
                match *input.payload() {
                    Payload::Bool(b) => Some(<$t>::from(b)),
                    Payload::Signed(v) => Some(v as $t),
                    Payload::Unsigned(v) => Some(v as $t),
                    // Narrower floats were widened to f64 losslessly; this undoes it.
                    Payload::Float(v) => Some(v as $t),
                    _ => None,
                }
            }
        }
    )*};
}

float_alternative! { f32 => 32, f64 => 64 }

impl Alternative for char {
    const KIND: AltKind = AltKind::Char;

    fn from_input(input: Input, args: Vec<Input>) -> Option<Self> {
        match *input.payload() {
            Payload::Char(c) if args.is_empty() => Some(c),
            _ => None,
        }
    }
}

impl Alternative for String {
    const KIND: AltKind = AltKind::Text;
    const HAS_DEFAULT: bool = true;

    fn default_value() -> Option<Self> {
        Some(String::new())
    }

    /// `(text)` and `(char)` convert directly; `(text, n)` keeps the first `n`
    /// characters and `(char, n)` repeats the character `n` times.
    fn from_input(input: Input, args: Vec<Input>) -> Option<Self> {
        let count = match args.as_slice() {
            [] => None,
            [n] => Some(n.as_count()?),
            _ => return None,
        };
        match (input.into_payload(), count) {
            (Payload::Text(s), None) => Some(s),
            (Payload::Text(s), Some(n)) => Some(s.chars().take(n).collect()),
            (Payload::Char(c), None) => Some(c.to_string()),
            (Payload::Char(c), Some(n)) => Some(std::iter::repeat_n(c, n).collect()),
            _ => None,
        }
    }
}
