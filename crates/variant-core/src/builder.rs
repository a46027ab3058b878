//! Incremental tree construction.
//!
//! [`TreeBuilder`] assembles a container node by node, the way an event-driven
//! parser would: open an array or object, emit keys and values, close it. Each
//! step is checked, and nesting is bounded by [`BuildLimits`].
//!
//! ```
//! use variant_core::{Container, Null, TreeBuilder};
//!
//! type Json = Container<(Null, bool, i64, String)>;
//!
//! let mut builder = TreeBuilder::<(Null, bool, i64, String)>::new();
//! builder
//!     .start_object()?
//!     .key("ids")?
//!     .start_array()?
//!     .value(1i64)?
//!     .value(2i64)?
//!     .end()?
//!     .end()?;
//! let tree: Json = builder.finish()?;
//! assert_eq!(tree["ids"][1].get::<i64>(), Ok(&2));
//! # Ok::<(), variant_core::VariantError>(())
//! ```

use tracing::trace;

use crate::container::{Container, Key};
use crate::error::{Result, VariantError};
use crate::input::IntoInput;
use crate::value::{AlternativeSet, Value};

/// Limits applied while building trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildLimits {
    /// Maximum number of nested arrays and objects.
    pub max_depth: usize,
}

impl BuildLimits {
    /// Same nesting limit as `serde_json`.
    pub const DEFAULT_MAX_DEPTH: usize = 128;

    pub fn with_max_depth(max_depth: usize) -> Self {
        BuildLimits { max_depth }
    }
}

impl Default for BuildLimits {
    fn default() -> Self {
        BuildLimits {
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Debug)]
struct Frame<S: AlternativeSet, K: Key> {
    node: Container<S, K>,
    /// Key waiting for its value (objects only).
    pending: Option<K>,
}

/// Step-by-step builder for a [`Container`].
#[derive(Debug)]
pub struct TreeBuilder<S: AlternativeSet, K: Key = String> {
    stack: Vec<Frame<S, K>>,
    root: Option<Container<S, K>>,
    limits: BuildLimits,
}

impl<S: AlternativeSet, K: Key> Default for TreeBuilder<S, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: AlternativeSet, K: Key> TreeBuilder<S, K> {
    pub fn new() -> Self {
        Self::with_limits(BuildLimits::default())
    }

    pub fn with_limits(limits: BuildLimits) -> Self {
        TreeBuilder {
            stack: Vec::new(),
            root: None,
            limits,
        }
    }

    /// Number of currently open arrays and objects.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn start_array(&mut self) -> Result<&mut Self> {
        self.open(Value::try_array(None)?)
    }

    pub fn start_object(&mut self) -> Result<&mut Self> {
        self.open(Value::try_object(None)?)
    }

    /// Set the key for the next member of the innermost object.
    pub fn key(&mut self, key: impl Into<K>) -> Result<&mut Self> {
        match self.stack.last_mut() {
            Some(frame) if frame.node.is_object() => {
                if frame.pending.is_some() {
                    return Err(VariantError::InvalidBuildStep("a key is already waiting for its value"));
                }
                frame.pending = Some(key.into());
            }
            _ => return Err(VariantError::InvalidBuildStep("keys are only valid inside an object")),
        }
        Ok(self)
    }

    /// Add a scalar, choosing its alternative with the type selector.
    pub fn value(&mut self, input: impl IntoInput) -> Result<&mut Self> {
        self.ready_for_value()?;
        let node = Value::try_new(input)?;
        self.attach(node);
        Ok(self)
    }

    /// Add an already built subtree.
    pub fn node(&mut self, node: Container<S, K>) -> Result<&mut Self> {
        self.ready_for_value()?;
        self.attach(node);
        Ok(self)
    }

    /// Close the innermost array or object.
    pub fn end(&mut self) -> Result<&mut Self> {
        if self.stack.last().is_some_and(|frame| frame.pending.is_some()) {
            return Err(VariantError::InvalidBuildStep("an object key has no value"));
        }
        let Some(frame) = self.stack.pop() else {
            return Err(VariantError::InvalidBuildStep("no open array or object to end"));
        };
        trace!(depth = self.stack.len(), len = frame.node.len(), "closed frame");
        self.attach(frame.node);
        Ok(self)
    }

    /// The finished tree.
    pub fn finish(self) -> Result<Container<S, K>> {
        if !self.stack.is_empty() {
            return Err(VariantError::InvalidBuildStep("an array or object is still open"));
        }
        self.root
            .ok_or(VariantError::InvalidBuildStep("nothing was built"))
    }

    fn open(&mut self, node: Container<S, K>) -> Result<&mut Self> {
        if self.stack.len() >= self.limits.max_depth {
            return Err(VariantError::RecursionDepthExceeded {
                limit: self.limits.max_depth,
            });
        }
        self.ready_for_value()?;
        trace!(depth = self.stack.len() + 1, object = node.is_object(), "opened frame");
        self.stack.push(Frame { node, pending: None });
        Ok(self)
    }

    fn ready_for_value(&self) -> Result<()> {
        match self.stack.last() {
            None if self.root.is_some() => Err(VariantError::InvalidBuildStep("the tree is already complete")),
            Some(frame) if frame.node.is_object() && frame.pending.is_none() => {
                Err(VariantError::InvalidBuildStep("an object member needs a key first"))
            }
            _ => Ok(()),
        }
    }

    fn attach(&mut self, node: Container<S, K>) {
        match self.stack.last_mut() {
            None => self.root = Some(node),
            Some(frame) => match frame.pending.take() {
                Some(key) => {
                    frame.node.insert(key, node);
                }
                None => frame.node.push(node),
            },
        }
    }
}
