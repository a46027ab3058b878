//! Recursive tree values.
//!
//! A [`Container`] is a [`Value`] over the set `S` extended with two
//! alternatives that refer back to the container type: [`Array`] (a `Vec`) and
//! [`Object`] (an insertion-ordered `IndexMap`). Both are self-referential and
//! therefore always boxed, so a container stays two words wide however deep
//! the tree is.
//!
//! Key access comes in two policies:
//!
//! - [`Container::entry`] and `container[key]` in a mutable place upsert a null
//!   entry, turning a non-object into an empty object first;
//! - [`Container::field`] and `container[key]` in a read place never mutate and
//!   fail with [`VariantError::KeyNotFound`] or [`VariantError::NotObject`].

use std::any::TypeId;
use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

use indexmap::IndexMap;

use crate::alternative::{AltKind, Alternative, Null};
use crate::error::{Result, VariantError};
use crate::input::{Input, InputShape, IntoInput};
use crate::registry::{try_registry, Descriptor};
use crate::slot::{AltOps, Slot};
use crate::value::{sealed::Sealed, AlternativeSet, Value};
use crate::view::View;
use crate::visit::{Dispatch, DispatchMut, Visit, VisitMut};

/// Object key types.
pub trait Key: Clone + Eq + Hash + fmt::Debug + 'static {}

impl<T: Clone + Eq + Hash + fmt::Debug + 'static> Key for T {}

/// The alternative set of a tree: `S` followed by `Array` and `Object`.
pub struct Tree<S, K = String>(PhantomData<(S, K)>);

/// A tree value over the scalar alternatives `S`, with object keys `K`.
pub type Container<S, K = String> = Value<Tree<S, K>>;

/// Ordered sequence of child containers.
pub type Array<S, K = String> = Vec<Container<S, K>>;

/// Insertion-ordered mapping of child containers. Equality ignores order.
pub type Object<S, K = String> = IndexMap<K, Container<S, K>>;

impl<S, K> Sealed for Tree<S, K> {}

impl<S: AlternativeSet, K: Key> AlternativeSet for Tree<S, K> {
    const LEN: usize = S::LEN + 2;

    fn ops(tag: u8) -> AltOps {
        match usize::from(tag).checked_sub(S::LEN) {
            None => S::ops(tag),
            Some(0) => AltOps::of::<Array<S, K>>(),
            Some(_) => AltOps::of::<Object<S, K>>(),
        }
    }

    fn describe(out: &mut Vec<Descriptor>) {
        S::describe(out);
        out.push(Descriptor::of::<Array<S, K>>());
        out.push(Descriptor::of::<Object<S, K>>());
    }
}

impl<S: AlternativeSet, K: Key> Alternative for Vec<Container<S, K>> {
    const KIND: AltKind = AltKind::Sequence;
    const SELF_REFERENTIAL: bool = true;
    const HAS_DEFAULT: bool = true;

    fn default_value() -> Option<Self> {
        Some(Vec::new())
    }

    /// An array itself, or `(count, fill)` for `count` copies of a container.
    fn accepts(input: &InputShape, args: &[InputShape]) -> bool {
        match args {
            [] => input.type_id == TypeId::of::<Self>(),
            [fill] => input.class.is_integral() && fill.type_id == TypeId::of::<Container<S, K>>(),
            _ => false,
        }
    }

    fn from_input(input: Input, mut args: Vec<Input>) -> Option<Self> {
        match (args.pop(), args.is_empty()) {
            (None, _) => input.downcast().ok(),
            (Some(fill), true) => {
                let count = input.as_count()?;
                let fill = fill.downcast::<Container<S, K>>().ok()?;
                Some(vec![fill; count])
            }
            (Some(_), false) => None,
        }
    }
}

impl<S: AlternativeSet, K: Key> Alternative for IndexMap<K, Container<S, K>> {
    const KIND: AltKind = AltKind::Mapping;
    const SELF_REFERENTIAL: bool = true;
    const HAS_DEFAULT: bool = true;

    fn default_value() -> Option<Self> {
        Some(IndexMap::new())
    }
}

impl<S: AlternativeSet, K: Key> IntoInput for Vec<Container<S, K>> {
    fn into_input(self) -> Input {
        Input::exact(self)
    }
}

impl<S: AlternativeSet, K: Key> IntoInput for IndexMap<K, Container<S, K>> {
    fn into_input(self) -> Input {
        Input::exact(self)
    }
}

impl<S, K, V, A> Dispatch<V, A> for Tree<S, K>
where
    S: Dispatch<V, A>,
    K: Key,
    V: Visit<Array<S, K>, A> + Visit<Object<S, K>, A>,
{
    unsafe fn dispatch(tag: u8, slot: &Slot, visitor: &mut V, args: A) -> V::Output {
        match usize::from(tag).checked_sub(S::LEN) {
            None => unsafe { S::dispatch(tag, slot, visitor, args) },
            Some(0) => {
                <V as Visit<Array<S, K>, A>>::visit(visitor, unsafe { slot.get::<Array<S, K>>() }, args)
            }
            Some(_) => {
                <V as Visit<Object<S, K>, A>>::visit(visitor, unsafe { slot.get::<Object<S, K>>() }, args)
            }
        }
    }
}

impl<S, K, V, A> DispatchMut<V, A> for Tree<S, K>
where
    S: DispatchMut<V, A>,
    K: Key,
    V: VisitMut<Array<S, K>, A> + VisitMut<Object<S, K>, A>,
{
    unsafe fn dispatch_mut(tag: u8, slot: &mut Slot, visitor: &mut V, args: A) -> V::Output {
        match usize::from(tag).checked_sub(S::LEN) {
            None => unsafe { S::dispatch_mut(tag, slot, visitor, args) },
            Some(0) => <V as VisitMut<Array<S, K>, A>>::visit_mut(
                visitor,
                unsafe { slot.get_mut::<Array<S, K>>() },
                args,
            ),
            Some(_) => <V as VisitMut<Object<S, K>, A>>::visit_mut(
                visitor,
                unsafe { slot.get_mut::<Object<S, K>>() },
                args,
            ),
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
impl<S: AlternativeSet, K: Key> Value<Tree<S, K>> {
    const ARRAY_TAG: u8 = S::LEN as u8;
    const OBJECT_TAG: u8 = S::LEN as u8 + 1;

    fn collection<T: Alternative>(tag: u8, payload: T) -> Result<Self> {
        try_registry::<Tree<S, K>>()?;
        Ok(Value::from_parts(tag, Slot::store(payload)))
    }

    /// An array of the given elements. Fails when the tree set is invalid.
    pub fn try_array<I: IntoIterator<Item = Self>>(items: I) -> Result<Self> {
        let items: Array<S, K> = items.into_iter().collect();
        Self::collection(Self::ARRAY_TAG, items)
    }

    /// An object of the given entries; later duplicates replace earlier ones.
    pub fn try_object<I: IntoIterator<Item = (K, Self)>>(entries: I) -> Result<Self> {
        let entries: Object<S, K> = entries.into_iter().collect();
        Self::collection(Self::OBJECT_TAG, entries)
    }

    /// # Panics
    ///
    /// Panics when the tree set is invalid (see [`try_registry`]).
    pub fn array<I: IntoIterator<Item = Self>>(items: I) -> Self {
        match Self::try_array(items) {
            Ok(array) => array,
            Err(err) => panic!("{err}"),
        }
    }

    /// # Panics
    ///
    /// Panics when the tree set is invalid (see [`try_registry`]).
    pub fn object<I: IntoIterator<Item = (K, Self)>>(entries: I) -> Self {
        match Self::try_object(entries) {
            Ok(object) => object,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn is_array(&self) -> bool {
        self.tag() == Self::ARRAY_TAG
    }

    pub fn is_object(&self) -> bool {
        self.tag() == Self::OBJECT_TAG
    }

    pub fn is_null(&self) -> bool {
        self.is::<Null>()
    }

    pub fn get_array(&self) -> Result<&Array<S, K>> {
        self.get()
    }

    pub fn get_array_mut(&mut self) -> Result<&mut Array<S, K>> {
        self.get_mut()
    }

    pub fn get_object(&self) -> Result<&Object<S, K>> {
        self.get()
    }

    pub fn get_object_mut(&mut self) -> Result<&mut Object<S, K>> {
        self.get_mut()
    }

    fn not_array(&self) -> VariantError {
        VariantError::NotArray {
            found: self.type_name(),
        }
    }

    fn not_object(&self) -> VariantError {
        VariantError::NotObject {
            found: self.type_name(),
        }
    }

    /// Checked element access.
    pub fn at(&self, index: usize) -> Result<&Self> {
        let array = self.get_array().map_err(|_| self.not_array())?;
        array.get(index).ok_or(VariantError::IndexOutOfRange {
            index,
            len: array.len(),
        })
    }

    pub fn at_mut(&mut self, index: usize) -> Result<&mut Self> {
        let found = self.type_name();
        let array = self
            .get_array_mut()
            .map_err(|_| VariantError::NotArray { found })?;
        let len = array.len();
        array
            .get_mut(index)
            .ok_or(VariantError::IndexOutOfRange { index, len })
    }

    /// Read-only key access. Never inserts.
    pub fn field<Q>(&self, key: &Q) -> Result<&Self>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq + fmt::Debug,
    {
        let object = self.get_object().map_err(|_| self.not_object())?;
        object.get(key).ok_or_else(|| VariantError::KeyNotFound {
            key: format!("{key:?}"),
        })
    }

    /// Upserting key access: inserts a null entry if `key` is absent, and
    /// replaces a non-object with an empty object first.
    ///
    /// Sets without [`Null`] get their default alternative instead.
    pub fn entry(&mut self, key: impl Into<K>) -> &mut Self {
        self.force_object().entry(key.into()).or_insert_with(Self::vacant)
    }

    fn vacant() -> Self {
        Self::from_alternative(Null).unwrap_or_default()
    }

    /// Switch to an empty array unless already an array.
    pub fn force_array(&mut self) -> &mut Array<S, K> {
        if !self.is_array() {
            *self = Self::array(None);
        }
        self.raw_mut()
    }

    /// Switch to an empty object unless already an object.
    pub fn force_object(&mut self) -> &mut Object<S, K> {
        if !self.is_object() {
            *self = Self::object(None);
        }
        self.raw_mut()
    }

    /// Append, turning a non-array into an empty array first.
    pub fn push(&mut self, value: Self) {
        self.force_array().push(value);
    }

    /// Insert, turning a non-object into an empty object first. Returns the replaced entry.
    pub fn insert(&mut self, key: impl Into<K>, value: Self) -> Option<Self> {
        self.force_object().insert(key.into(), value)
    }

    /// Element count of an array or object; zero for scalars.
    pub fn len(&self) -> usize {
        if let Ok(array) = self.get_array() {
            array.len()
        } else if let Ok(object) = self.get_object() {
            object.len()
        } else {
            0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Nesting depth: 0 for scalars, one more than the deepest child for collections.
    pub fn depth(&self) -> usize {
        if let Ok(array) = self.get_array() {
            1 + array.iter().map(Self::depth).max().unwrap_or(0)
        } else if let Ok(object) = self.get_object() {
            1 + object.values().map(Self::depth).max().unwrap_or(0)
        } else {
            0
        }
    }

    /// A non-failing read cursor at this node.
    pub fn view(&self) -> View<'_, S, K> {
        View::new(self)
    }
}

impl<S: AlternativeSet, K: Key> From<Array<S, K>> for Value<Tree<S, K>> {
    fn from(items: Array<S, K>) -> Self {
        Value::array(items)
    }
}

impl<S: AlternativeSet, K: Key> From<Object<S, K>> for Value<Tree<S, K>> {
    fn from(entries: Object<S, K>) -> Self {
        Value::object(entries)
    }
}

impl<S: AlternativeSet, K: Key> FromIterator<Value<Tree<S, K>>> for Value<Tree<S, K>> {
    fn from_iter<I: IntoIterator<Item = Self>>(iter: I) -> Self {
        Value::array(iter)
    }
}

impl<S: AlternativeSet, K: Key> FromIterator<(K, Value<Tree<S, K>>)> for Value<Tree<S, K>> {
    fn from_iter<I: IntoIterator<Item = (K, Self)>>(iter: I) -> Self {
        Value::object(iter)
    }
}

mod locate {
    pub trait Sealed {}
}

/// Index types for containers: `usize` for arrays, `&Q` for object keys.
pub trait Locate<S: AlternativeSet, K: Key>: locate::Sealed {
    #[doc(hidden)]
    fn find<'c>(&self, container: &'c Container<S, K>) -> Result<(Option<&'c K>, &'c Container<S, K>)>;
}

/// Index types usable in a mutable place. Keys upsert, so they must convert
/// into an owned `K`.
pub trait LocateMut<S: AlternativeSet, K: Key>: Locate<S, K> {
    #[doc(hidden)]
    fn find_or_insert<'c>(&self, container: &'c mut Container<S, K>) -> Result<&'c mut Container<S, K>>;
}

impl locate::Sealed for usize {}

impl<S: AlternativeSet, K: Key> Locate<S, K> for usize {
    fn find<'c>(&self, container: &'c Container<S, K>) -> Result<(Option<&'c K>, &'c Container<S, K>)> {
        container.at(*self).map(|child| (None, child))
    }
}

impl<S: AlternativeSet, K: Key> LocateMut<S, K> for usize {
    fn find_or_insert<'c>(&self, container: &'c mut Container<S, K>) -> Result<&'c mut Container<S, K>> {
        container.at_mut(*self)
    }
}

impl<Q: ?Sized> locate::Sealed for &Q {}

impl<S, K, Q> Locate<S, K> for &Q
where
    S: AlternativeSet,
    K: Key + Borrow<Q>,
    Q: ?Sized + Hash + Eq + fmt::Debug,
{
    fn find<'c>(&self, container: &'c Container<S, K>) -> Result<(Option<&'c K>, &'c Container<S, K>)> {
        let object = container.get_object().map_err(|_| container.not_object())?;
        object
            .get_key_value(*self)
            .map(|(key, child)| (Some(key), child))
            .ok_or_else(|| VariantError::KeyNotFound {
                key: format!("{:?}", *self),
            })
    }
}

impl<S, K, Q> LocateMut<S, K> for &Q
where
    S: AlternativeSet,
    K: Key + Borrow<Q> + From<Q::Owned>,
    Q: ?Sized + Hash + Eq + fmt::Debug + ToOwned,
{
    fn find_or_insert<'c>(&self, container: &'c mut Container<S, K>) -> Result<&'c mut Container<S, K>> {
        Ok(container.entry(K::from(<Q as ToOwned>::to_owned(*self))))
    }
}

impl<S: AlternativeSet, K: Key, I: Locate<S, K>> Index<I> for Value<Tree<S, K>> {
    type Output = Self;

    /// # Panics
    ///
    /// Panics on a non-array, an out-of-range index, a non-object or a missing key.
    fn index(&self, index: I) -> &Self {
        match index.find(self) {
            Ok((_, child)) => child,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<S: AlternativeSet, K: Key, I: LocateMut<S, K>> IndexMut<I> for Value<Tree<S, K>> {
    /// Keys upsert; indices panic like [`Index`].
    fn index_mut(&mut self, index: I) -> &mut Self {
        match index.find_or_insert(self) {
            Ok(child) => child,
            Err(err) => panic!("{err}"),
        }
    }
}
