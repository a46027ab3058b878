//! Non-failing read cursors over container trees.
//!
//! A [`View`] borrows a node (or nothing). Navigating through a missing key,
//! an out-of-range index or a node of the wrong shape yields the empty view
//! instead of an error, so deep lookups need no intermediate checks:
//!
//! ```
//! use variant_core::{Container, Null};
//!
//! type Json = Container<(Null, bool, i64, f64, String)>;
//!
//! let doc = Json::object([("port".to_owned(), Json::new(8080i64))]);
//! let view = doc.view();
//! assert_eq!(view.at("port").get_or(0i64), 8080);
//! assert_eq!(view.at("tls").at("cert").get_or(String::from("none")), "none");
//! assert!(view.at("tls").is_empty());
//! ```

use std::any;
use std::fmt;
use std::slice;

use crate::alternative::Alternative;
use crate::container::{Container, Key, Locate};
use crate::error::{Result, VariantError};
use crate::value::AlternativeSet;

/// Borrowed, possibly empty cursor into a container tree.
pub struct View<'a, S: AlternativeSet, K: Key = String> {
    key: Option<&'a K>,
    target: Option<&'a Container<S, K>>,
}

impl<S: AlternativeSet, K: Key> Clone for View<'_, S, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: AlternativeSet, K: Key> Copy for View<'_, S, K> {}

impl<S: AlternativeSet, K: Key> fmt::Debug for View<'_, S, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("key", &self.key)
            .field("target", &self.target)
            .finish()
    }
}

impl<S: AlternativeSet, K: Key> Default for View<'_, S, K> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'a, S: AlternativeSet, K: Key> View<'a, S, K> {
    pub fn new(target: &'a Container<S, K>) -> Self {
        View {
            key: None,
            target: Some(target),
        }
    }

    /// A view over nothing; every read returns its default.
    pub fn empty() -> Self {
        View {
            key: None,
            target: None,
        }
    }

    /// Step to a child by index or key. Never fails.
    pub fn at<I: Locate<S, K>>(&self, location: I) -> Self {
        match self.target.map(|target| location.find(target)) {
            Some(Ok((key, target))) => View {
                key,
                target: Some(target),
            },
            _ => Self::empty(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.target.is_none()
    }

    /// The object key this view was reached through, when iterating an object.
    pub fn key(&self) -> Option<&'a K> {
        self.key
    }

    pub fn container(&self) -> Option<&'a Container<S, K>> {
        self.target
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.target.is_some_and(|target| target.is::<T>())
    }

    pub fn get_ref<T: Alternative>(&self) -> Option<&'a T> {
        self.target?.get().ok()
    }

    /// The payload as `T`, or `default` when absent or of another type.
    pub fn get_or<T: Alternative>(&self, default: T) -> T {
        self.get_ref().cloned().unwrap_or(default)
    }

    /// The payload as `T`, falling back to `T`'s default value.
    pub fn get<T: Alternative>(&self) -> Result<T> {
        if let Some(value) = self.get_ref::<T>() {
            return Ok(value.clone());
        }
        T::default_value().ok_or(VariantError::BadViewAccess {
            requested: any::type_name::<T>(),
        })
    }

    /// Number of children; zero for scalars and the empty view.
    pub fn len(&self) -> usize {
        self.target.map_or(0, |target| target.len())
    }

    /// Children of an array, or entries of an object with their keys.
    pub fn iter(&self) -> Iter<'a, S, K> {
        let inner = match self.target {
            Some(target) => match (target.get_array(), target.get_object()) {
                (Ok(array), _) => Inner::Array(array.iter()),
                (_, Ok(object)) => Inner::Object(object.iter()),
                _ => Inner::Empty,
            },
            None => Inner::Empty,
        };
        Iter { inner }
    }
}

impl<'a, S: AlternativeSet, K: Key> IntoIterator for View<'a, S, K> {
    type Item = View<'a, S, K>;
    type IntoIter = Iter<'a, S, K>;

    fn into_iter(self) -> Iter<'a, S, K> {
        self.iter()
    }
}

enum Inner<'a, S: AlternativeSet, K: Key> {
    Empty,
    Array(slice::Iter<'a, Container<S, K>>),
    Object(indexmap::map::Iter<'a, K, Container<S, K>>),
}

/// Iterator over the children of a view, yielding views.
pub struct Iter<'a, S: AlternativeSet, K: Key = String> {
    inner: Inner<'a, S, K>,
}

impl<'a, S: AlternativeSet, K: Key> Iterator for Iter<'a, S, K> {
    type Item = View<'a, S, K>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            Inner::Empty => None,
            Inner::Array(iter) => iter.next().map(View::new),
            Inner::Object(iter) => iter.next().map(|(key, target)| View {
                key: Some(key),
                target: Some(target),
            }),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.inner {
            Inner::Empty => (0, Some(0)),
            Inner::Array(iter) => iter.size_hint(),
            Inner::Object(iter) => iter.size_hint(),
        }
    }
}

impl<S: AlternativeSet, K: Key> ExactSizeIterator for Iter<'_, S, K> {}
