//! Registry entry types.

use std::fmt;
use std::sync::Arc;

use crate::key::Key;

/// Zero-argument factory producing a new, exclusively owned instance.
///
/// Factories are shared values: the registry clones the `Arc` out of its map
/// and invokes it after releasing the lock.
pub type Factory<T> = Arc<dyn Fn() -> Box<T> + Send + Sync>;

/// Which discovery path put an entry into the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "kebab-case"))]
pub enum Origin {
    /// A direct `register` call
    Manual,
    /// A hand-enumerated table
    Explicit,
    /// A table emitted by the build script
    Generated,
    /// A table collected by the linker
    Linked,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Origin::Manual => "manual",
            Origin::Explicit => "explicit",
            Origin::Generated => "generated",
            Origin::Linked => "linked",
        })
    }
}

/// One key and the factory registered under it.
///
/// The registry owns entries. The factory owns no instance; every call builds
/// a fresh one.
pub struct RegistryEntry<T: ?Sized> {
    pub(crate) key: Key,
    pub(crate) factory: Factory<T>,
    pub(crate) origin: Origin,
}

impl<T: ?Sized> RegistryEntry<T> {
    pub(crate) fn new(key: Key, factory: Factory<T>, origin: Origin) -> Self {
        Self { key, factory, origin }
    }

    /// The key this entry was registered under.
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Which discovery path registered this entry.
    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Builds a new instance.
    pub fn create(&self) -> Box<T> {
        (self.factory)()
    }
}

impl<T: ?Sized> Clone for RegistryEntry<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            factory: self.factory.clone(),
            origin: self.origin,
        }
    }
}

impl<T: ?Sized> fmt::Debug for RegistryEntry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("key", &self.key)
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}
