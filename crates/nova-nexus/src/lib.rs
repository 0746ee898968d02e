#![forbid(unsafe_code)]
//! Registry of initializers that generated types run from their static initializer.
//!
//! A code generator registers an initializer under the generated type's name, the identity of
//! the context that defines the type and an id it chose. The generated static initializer then
//! calls [`Nexus::initialize`] with the same id, which hands the initializer over exactly once.

use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use thiserror::Error;

/// Identity of the context (class loader) that defines a type.
///
/// Types without a context (the bootstrap context) use `None` wherever a context is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(pub u64);

/// A type that finished loading and is running its static initializer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadedType {
    name: String,
    context: Option<ContextId>,
}

impl LoadedType {
    pub fn new(name: impl Into<String>, context: Option<ContextId>) -> Self {
        Self {
            name: name.into(),
            context,
        }
    }

    /// Binary name (`com.example.Foo$Bar`).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn context(&self) -> Option<ContextId> {
        self.context
    }
}

pub type InitializerError = Box<dyn StdError + Send + Sync>;

/// Work to run once a generated type is loaded.
pub trait LoadedTypeInitializer: Send + Sync {
    fn on_load(&self, ty: &LoadedType) -> Result<(), InitializerError>;
}

impl<F> LoadedTypeInitializer for F
where
    F: Fn(&LoadedType) -> Result<(), InitializerError> + Send + Sync,
{
    fn on_load(&self, ty: &LoadedType) -> Result<(), InitializerError> {
        self(ty)
    }
}

#[derive(Debug, Error)]
pub enum NexusError {
    #[error("initializer {id} for `{name}` failed: {source}")]
    Initializer {
        name: String,
        id: i32,
        #[source]
        source: InitializerError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct NexusKey {
    name: String,
    context: Option<ContextId>,
    id: i32,
}

/// Thread-safe map from `(name, context, id)` to a pending initializer.
#[derive(Default)]
pub struct Nexus {
    pending: Mutex<HashMap<NexusKey, Arc<dyn LoadedTypeInitializer>>>,
}

impl Nexus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide registry.
    pub fn global() -> &'static Nexus {
        static GLOBAL: OnceLock<Nexus> = OnceLock::new();
        GLOBAL.get_or_init(Nexus::new)
    }

    /// Registers `initializer` for the type `name` defined by `context`.
    ///
    /// A second registration under the same key replaces the first.
    pub fn register(
        &self,
        name: impl Into<String>,
        context: Option<ContextId>,
        id: i32,
        initializer: Arc<dyn LoadedTypeInitializer>,
    ) {
        let key = NexusKey {
            name: name.into(),
            context,
            id,
        };
        let mut pending = self.pending.lock();
        if pending.contains_key(&key) {
            tracing::warn!(
                target: "nova.nexus",
                name = %key.name,
                context = ?key.context,
                id,
                "initializer registered twice; keeping the newer one"
            );
        }
        pending.insert(key, initializer);
    }

    /// Removes the initializer registered for `ty` under `id` and runs it.
    ///
    /// Does nothing when no initializer is pending, including when an earlier call already
    /// consumed it. The hook runs outside the registry lock.
    pub fn initialize(&self, ty: &LoadedType, id: i32) -> Result<(), NexusError> {
        let key = NexusKey {
            name: ty.name.clone(),
            context: ty.context,
            id,
        };
        let Some(initializer) = self.pending.lock().remove(&key) else {
            tracing::trace!(target: "nova.nexus", name = %ty.name, id, "no pending initializer");
            return Ok(());
        };
        initializer
            .on_load(ty)
            .map_err(|source| NexusError::Initializer {
                name: key.name,
                id,
                source,
            })
    }

    /// Number of initializers still pending.
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}

impl fmt::Debug for Nexus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Nexus").field("pending", &self.len()).finish()
    }
}
