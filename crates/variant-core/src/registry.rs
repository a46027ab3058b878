//! Type registry: metadata about an alternative set, built once per set.
//!
//! Registration validates the set (non-empty, no duplicate types, at least one
//! default-constructible alternative), classifies every alternative as inline
//! or boxed, and precomputes the selector ranking for every built-in input
//! type. Registries live for the rest of the process and are shared by all
//! values of the set.

use std::any::{self, TypeId};
use std::borrow::Cow;
use std::collections::HashMap;
use std::mem;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use tracing::{debug, trace, warn};

use crate::alternative::{AltKind, Alternative, StorageClass};
use crate::error::{Result, VariantError};
use crate::input::{builtin_shapes, Input, InputShape};
use crate::select::{self, Ranking};
use crate::slot::Layout;
use crate::value::AlternativeSet;

/// Registration-time description of one alternative.
#[derive(Debug, Clone, Copy)]
pub struct Descriptor {
    pub name: &'static str,
    pub type_id: TypeId,
    pub kind: AltKind,
    pub size: usize,
    pub align: usize,
    pub storage: StorageClass,
    pub self_referential: bool,
    pub has_default: bool,
    pub(crate) accepts: fn(&InputShape, &[InputShape]) -> bool,
}

impl Descriptor {
    pub fn of<T: Alternative>() -> Self {
        Descriptor {
            name: any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
            kind: T::KIND,
            size: mem::size_of::<T>(),
            align: mem::align_of::<T>(),
            storage: Layout::<T>::STORAGE,
            self_referential: T::SELF_REFERENTIAL,
            has_default: T::HAS_DEFAULT,
            accepts: T::accepts,
        }
    }
}

/// Everything known about one registered alternative set.
#[derive(Debug)]
pub struct TypeRegistry {
    set_name: &'static str,
    alternatives: Vec<Descriptor>,
    by_type: HashMap<TypeId, usize>,
    rankings: HashMap<TypeId, Ranking>,
    default_index: usize,
}

impl TypeRegistry {
    fn build<S: AlternativeSet>() -> Result<Self> {
        let set_name = any::type_name::<S>();
        let reject = |reason| VariantError::ConstructionUnsupported {
            set: set_name,
            input: "<registration>",
            reason,
        };

        let mut alternatives = Vec::with_capacity(S::LEN);
        S::describe(&mut alternatives);
        if alternatives.is_empty() {
            return Err(reject("the alternative set is empty"));
        }
        if alternatives.len() > usize::from(u8::MAX) + 1 {
            return Err(reject("more than 256 alternatives"));
        }

        let mut by_type = HashMap::with_capacity(alternatives.len());
        for (index, alt) in alternatives.iter().enumerate() {
            if by_type.insert(alt.type_id, index).is_some() {
                return Err(reject("an alternative type is listed twice"));
            }
        }

        let default_index = alternatives
            .iter()
            .position(|alt| alt.has_default)
            .ok_or_else(|| reject("no alternative is default-constructible"))?;

        let rankings = builtin_shapes()
            .into_iter()
            .map(|shape| (shape.type_id, select::rank(&alternatives, &shape, &[])))
            .collect();

        debug!(
            set = set_name,
            alternatives = alternatives.len(),
            default_index,
            "registered alternative set"
        );
        for (index, alt) in alternatives.iter().enumerate() {
            trace!(index, name = alt.name, storage = ?alt.storage, size = alt.size, "alternative");
        }

        Ok(TypeRegistry {
            set_name,
            alternatives,
            by_type,
            rankings,
            default_index,
        })
    }

    /// Type name of the set, used in diagnostics.
    pub fn set_name(&self) -> &'static str {
        self.set_name
    }

    /// Alternatives in declaration order.
    pub fn alternatives(&self) -> &[Descriptor] {
        &self.alternatives
    }

    pub fn len(&self) -> usize {
        self.alternatives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }

    /// Discriminant of the alternative with the given type.
    pub fn index_of(&self, type_id: TypeId) -> Option<usize> {
        self.by_type.get(&type_id).copied()
    }

    /// Discriminant chosen by `Default` (the first default-constructible alternative).
    pub fn default_index(&self) -> usize {
        self.default_index
    }

    pub fn storage(&self, index: usize) -> Option<StorageClass> {
        self.alternatives.get(index).map(|alt| alt.storage)
    }

    /// The ranking for `(input, args)`, from the precomputed table when possible.
    pub fn ranking(&self, input: &InputShape, args: &[InputShape]) -> Cow<'_, Ranking> {
        if args.is_empty() {
            if let Some(ranking) = self.rankings.get(&input.type_id) {
                return Cow::Borrowed(ranking);
            }
            if let Some(index) = self.index_of(input.type_id) {
                if (self.alternatives[index].accepts)(input, args) {
                    return Cow::Owned(Ranking::Exact(index));
                }
            }
        }
        Cow::Owned(select::rank(&self.alternatives, input, args))
    }

    /// Run the selector for a concrete input without constructing anything.
    pub fn select(&self, input: &Input, args: &[Input]) -> Result<usize> {
        let shapes: Vec<InputShape> = args.iter().map(|arg| *arg.shape()).collect();
        let ranking = self.ranking(input.shape(), &shapes);
        select::resolve(&ranking, &self.alternatives, input).ok_or_else(|| {
            VariantError::ConstructionUnsupported {
                set: self.set_name,
                input: input.shape().type_name,
                reason: if ranking.is_supported() {
                    "no alternative can hold the value"
                } else {
                    "no alternative is constructible from this input"
                },
            }
        })
    }

    /// Check at startup that every listed input shape is constructible.
    pub fn ensure_supports(&self, shapes: &[InputShape]) -> Result<()> {
        for shape in shapes {
            if !self.ranking(shape, &[]).is_supported() {
                return Err(VariantError::ConstructionUnsupported {
                    set: self.set_name,
                    input: shape.type_name,
                    reason: "no alternative is constructible from this input",
                });
            }
        }
        Ok(())
    }
}

type RegistryMap = HashMap<TypeId, &'static TypeRegistry>;

static REGISTRIES: OnceLock<Mutex<RegistryMap>> = OnceLock::new();

fn registries() -> MutexGuard<'static, RegistryMap> {
    REGISTRIES
        .get_or_init(Mutex::default)
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Registry for `S`, registering the set on first use.
///
/// The set is built without holding the global lock, so alternatives may use
/// values of other sets. When two threads race, the first insert wins and the
/// other build is discarded.
pub fn try_registry<S: AlternativeSet>() -> Result<&'static TypeRegistry> {
    if let Some(registry) = registries().get(&TypeId::of::<S>()).copied() {
        return Ok(registry);
    }
    let built = TypeRegistry::build::<S>().inspect_err(|err| {
        warn!(set = any::type_name::<S>(), %err, "rejected alternative set");
    })?;
    let mut map = registries();
    let registry = *map
        .entry(TypeId::of::<S>())
        .or_insert_with(|| -> &'static TypeRegistry { Box::leak(Box::new(built)) });
    Ok(registry)
}

/// Registry for `S`.
///
/// # Panics
///
/// Panics when the set is invalid (see [`try_registry`]).
pub fn registry<S: AlternativeSet>() -> &'static TypeRegistry {
    match try_registry::<S>() {
        Ok(registry) => registry,
        Err(err) => panic!("invalid alternative set: {err}"),
    }
}
