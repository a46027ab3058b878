//! serde support.
//!
//! Values serialize as their active payload. Containers deserialize from any
//! self-describing format: scalars go through the type selector exactly like
//! `Value::new`, sequences become arrays and maps become objects.
//!
//! Note that `serde_json` hands non-negative integers over as `u64` and
//! negative ones as `i64`, so the integral selection rules see those types.

use std::fmt;
use std::marker::PhantomData;

use indexmap::IndexMap;
use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess};
use serde::ser::{Serialize, Serializer};
use serde::Deserialize;

use crate::alternative::Null;
use crate::builder::BuildLimits;
use crate::container::{Array, Container, Key, Object, Tree};
use crate::error::VariantError;
use crate::input::IntoInput;
use crate::slot::Slot;
use crate::value::{AlternativeSet, Value};

/// Alternative sets whose every alternative is `Serialize`.
pub trait SerializeSet: AlternativeSet {
    /// # Safety
    /// `slot` must hold the alternative with discriminant `tag`.
    #[doc(hidden)]
    unsafe fn serialize_slot<Ser: Serializer>(tag: u8, slot: &Slot, serializer: Ser) -> Result<Ser::Ok, Ser::Error>;
}

impl<S: SerializeSet> Serialize for Value<S> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        // SAFETY: a value's slot always holds the alternative named by its tag.
        unsafe { S::serialize_slot(self.tag(), self.slot(), serializer) }
    }
}

impl<S: SerializeSet, K: Key + Serialize> SerializeSet for Tree<S, K> {
    unsafe fn serialize_slot<Ser: Serializer>(tag: u8, slot: &Slot, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        match usize::from(tag).checked_sub(S::LEN) {
            None => unsafe { S::serialize_slot(tag, slot, serializer) },
            Some(0) => serializer.collect_seq(unsafe { slot.get::<Array<S, K>>() }),
            Some(_) => serializer.collect_map(unsafe { slot.get::<Object<S, K>>() }),
        }
    }
}

/// Deserialization seed for containers with explicit [`BuildLimits`].
///
/// `Container`'s `Deserialize` impl uses `BuildLimits::default()`.
pub struct TreeSeed<S, K = String> {
    depth: usize,
    limit: usize,
    _tree: PhantomData<fn() -> (S, K)>,
}

impl<S, K> Clone for TreeSeed<S, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, K> Copy for TreeSeed<S, K> {}

impl<S, K> TreeSeed<S, K> {
    pub fn new(limits: BuildLimits) -> Self {
        TreeSeed {
            depth: 0,
            limit: limits.max_depth,
            _tree: PhantomData,
        }
    }

    fn child<E: de::Error>(self) -> Result<Self, E> {
        if self.depth >= self.limit {
            return Err(E::custom(VariantError::RecursionDepthExceeded { limit: self.limit }));
        }
        Ok(TreeSeed {
            depth: self.depth + 1,
            ..self
        })
    }
}

impl<'de, S: AlternativeSet, K: Key + From<String>> DeserializeSeed<'de> for TreeSeed<S, K> {
    type Value = Container<S, K>;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }
}

fn scalar<S: AlternativeSet, K: Key, E: de::Error>(input: impl IntoInput) -> Result<Container<S, K>, E> {
    Value::try_new(input).map_err(E::custom)
}

impl<'de, S: AlternativeSet, K: Key + From<String>> de::Visitor<'de> for TreeSeed<S, K> {
    type Value = Container<S, K>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a scalar, sequence or map")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        scalar(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        scalar(v)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        scalar(v)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        scalar(v)
    }

    fn visit_char<E: de::Error>(self, v: char) -> Result<Self::Value, E> {
        scalar(v)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        scalar(v)
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        scalar(v)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        scalar(Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        scalar(Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let child = self.child()?;
        let mut array = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(1024));
        while let Some(element) = seq.next_element_seed(child)? {
            array.push(element);
        }
        Value::try_array(array).map_err(de::Error::custom)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let child = self.child()?;
        let mut object = IndexMap::with_capacity(map.size_hint().unwrap_or(0).min(1024));
        while let Some(key) = map.next_key::<String>()? {
            let value = map.next_value_seed(child)?;
            object.insert(K::from(key), value);
        }
        Value::try_object(object).map_err(de::Error::custom)
    }
}

impl<'de, S: AlternativeSet, K: Key + From<String>> Deserialize<'de> for Value<Tree<S, K>> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        TreeSeed::new(BuildLimits::default()).deserialize(deserializer)
    }
}
