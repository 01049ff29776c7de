//! Hand-enumerated discovery.
//!
//! Every kind is listed once, in one place. Nothing is generated and nothing
//! depends on the linker, so this backend works on every target. The price is
//! that adding a kind means editing [`builtin`] as well as writing the kind.

use std::fmt;
use std::sync::Arc;

use crate::key::Key;
use crate::kinds::{self, Object};
use crate::registration::{Factory, Origin};
use crate::registry::FactoryRegistry;

use super::{DiscoveryBackend, DiscoveryReport};

pub const BACKEND_NAME: &str = "explicit";

/// A group of kinds that registers itself into an [`ExplicitBackend`].
///
/// # Example
///
/// ```rust
/// use ferrous_registry::discovery::{DiscoveryBackend, ExplicitBackend, KindModule};
/// use ferrous_registry::FactoryRegistry;
///
/// trait Codec: Send {
///     fn id(&self) -> u8;
/// }
///
/// struct Plain;
/// impl Codec for Plain {
///     fn id(&self) -> u8 { 0 }
/// }
///
/// struct Gzip;
/// impl Codec for Gzip {
///     fn id(&self) -> u8 { 1 }
/// }
///
/// struct CodecModule;
///
/// impl KindModule<dyn Codec> for CodecModule {
///     fn register_kinds(self, backend: ExplicitBackend<dyn Codec>) -> ExplicitBackend<dyn Codec> {
///         backend
///             .with("plain", || Box::new(Plain))
///             .with("gzip", || Box::new(Gzip))
///     }
/// }
///
/// let registry: FactoryRegistry<dyn Codec> = FactoryRegistry::new();
/// let report = ExplicitBackend::new().with_module(CodecModule).populate(&registry);
///
/// assert!(report.is_clean());
/// assert_eq!(registry.resolve("gzip").unwrap().id(), 1);
/// ```
pub trait KindModule<T: ?Sized> {
    /// Adds this module's kinds to `backend`.
    fn register_kinds(self, backend: ExplicitBackend<T>) -> ExplicitBackend<T>;
}

/// Ordered list of key/factory pairs written out by hand.
pub struct ExplicitBackend<T: ?Sized> {
    entries: Vec<(Key, Factory<T>)>,
}

impl<T: ?Sized> ExplicitBackend<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends one kind.
    pub fn with<K, F>(mut self, key: K, factory: F) -> Self
    where
        K: Into<Key>,
        F: Fn() -> Box<T> + Send + Sync + 'static,
    {
        self.entries.push((key.into(), Arc::new(factory)));
        self
    }

    /// Appends every kind of `module`.
    pub fn with_module<M: KindModule<T>>(self, module: M) -> Self {
        module.register_kinds(self)
    }

    /// Keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &Key> + '_ {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: ?Sized> Default for ExplicitBackend<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for ExplicitBackend<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExplicitBackend")
            .field("keys", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<T: ?Sized> DiscoveryBackend<T> for ExplicitBackend<T> {
    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    fn populate(&self, registry: &FactoryRegistry<T>) -> DiscoveryReport {
        let mut report = DiscoveryReport::new(BACKEND_NAME);
        for (key, factory) in &self.entries {
            let outcome = registry.register_factory(key.clone(), factory.clone(), Origin::Explicit);
            report.record(key.clone(), outcome);
        }
        tracing::debug!(
            backend = BACKEND_NAME,
            registered = report.registered.len(),
            conflicts = report.conflicts.len(),
            "kind list applied"
        );
        report
    }
}

/// The built-in kinds, listed by hand.
pub fn builtin() -> ExplicitBackend<dyn Object> {
    ExplicitBackend::new().with_module(kinds::BuiltinKinds)
}
