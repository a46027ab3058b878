//! # variant-core
//!
//! A tagged union over a closed, ordered set of alternative types, and a
//! recursive tree value built on top of it.
//!
//! A [`Value<S>`] is two words: a discriminant and a pointer-width slot.
//! Alternatives that fit the slot live inline; larger ones, and the
//! self-referential tree alternatives, live behind an owned box. Which
//! alternative an input constructs is decided by a deterministic type
//! selector that is ranked once per set at registration.
//!
//! ## Quick start
//!
//! ```rust
//! use variant_core::{Container, Null, Value};
//!
//! type Scalar = Value<(Null, bool, i32, u32, f64, String)>;
//!
//! assert!(Scalar::new(true).is::<bool>());
//! assert!(Scalar::new(5).is::<i32>());
//! assert!(Scalar::new(5u32).is::<u32>());
//! assert!(Scalar::new("abc").is::<String>());
//!
//! type Json = Container<(Null, bool, i64, f64, String)>;
//!
//! let mut doc = Json::default();
//! doc["name"] = Json::new("variant");
//! doc["tags"].push(Json::new("union"));
//! assert_eq!(doc["tags"][0].get::<String>().unwrap(), "union");
//! assert!(doc.view().at("missing").at(3).is_empty());
//! ```
//!
//! ## Modules
//!
//! - [`value`] — `Value<S>` and the `AlternativeSet` trait
//! - [`alternative`] — the `Alternative` trait and the built-in scalar alternatives
//! - [`input`] — type-erased constructor inputs
//! - [`select`] — the type selector's ranking policy
//! - [`registry`] — per-set metadata, registered once per process
//! - [`container`] — recursive `Container` trees with `Array` and `Object`
//! - [`view`] — non-failing read cursors
//! - [`visit`] — discriminant-indexed visitor dispatch
//! - [`builder`] — incremental `TreeBuilder`
//! - [`error`] — `VariantError`

#![deny(unsafe_op_in_unsafe_fn)]

pub mod alternative;
pub mod builder;
pub mod container;
pub mod error;
pub mod input;
pub mod registry;
pub mod select;
mod serde_impl;
mod set;
mod slot;
pub mod value;
pub mod view;
pub mod visit;

pub use alternative::{AltKind, Alternative, Null, StorageClass};
pub use builder::{BuildLimits, TreeBuilder};
pub use container::{Array, Container, Key, Locate, LocateMut, Object, Tree};
pub use error::{Result, VariantError};
pub use input::{Input, InputClass, InputShape, IntoInput};
pub use registry::{registry, try_registry, Descriptor, TypeRegistry};
pub use select::Ranking;
pub use serde_impl::{SerializeSet, TreeSeed};
pub use value::{AlternativeSet, Value};
pub use view::View;
pub use visit::{apply, apply_mut, apply_mut_with, apply_with, Dispatch, DispatchMut, Handlers, Visit, VisitMut, Visitor};
