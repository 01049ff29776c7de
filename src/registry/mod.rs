//! Factory registry: a name-to-factory directory.
//!
//! Registration and resolution are decoupled. Any component may register at
//! any point of its own startup, in any order, from any thread; the registry
//! is simply whatever has been registered so far when `resolve` runs.
//!
//! The map sits behind a short-lived lock. Factories are always invoked after
//! the lock is released, so a slow constructor never blocks registration or
//! resolution of other keys.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use ahash::RandomState;
use parking_lot::RwLock;

use crate::error::{ConflictError, NotFoundError};
use crate::key::Key;
use crate::observer::{panic_message, Observers, RegistryObserver};
use crate::registration::{Factory, Origin, RegistryEntry};

pub mod global;
pub use global::global;

/// Thread-safe directory mapping string keys to zero-argument factories.
///
/// `T` is the interface every factory produces, usually a trait object such
/// as `dyn Object`. Each `resolve` builds a fresh, exclusively owned
/// `Box<T>`; the registry keeps no reference to what it hands out.
///
/// Duplicate keys are rejected with [`ConflictError`] and the first
/// registration wins. Overwriting would make the result depend on which
/// component happened to initialize last.
///
/// # Examples
///
/// ```
/// use ferrous_registry::FactoryRegistry;
///
/// trait Shape: Send {
///     fn area(&self) -> f64;
/// }
///
/// struct Square(f64);
/// impl Shape for Square {
///     fn area(&self) -> f64 { self.0 * self.0 }
/// }
///
/// struct Circle(f64);
/// impl Shape for Circle {
///     fn area(&self) -> f64 { 3.0 * self.0 * self.0 }
/// }
///
/// let shapes: FactoryRegistry<dyn Shape> = FactoryRegistry::new();
/// shapes.register("circle", || Box::new(Circle(1.0))).unwrap();
/// shapes.register("square", || Box::new(Square(2.0))).unwrap();
///
/// assert_eq!(shapes.resolve("square").unwrap().area(), 4.0);
/// assert_eq!(shapes.resolve("circle").unwrap().area(), 3.0);
/// assert!(shapes.resolve("triangle").is_err());
/// ```
pub struct FactoryRegistry<T: ?Sized> {
    entries: RwLock<HashMap<Key, RegistryEntry<T>, RandomState>>,
    observers: Observers,
}

impl<T: ?Sized> FactoryRegistry<T> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::with_hasher(RandomState::new())),
            observers: Observers::new(),
        }
    }

    /// Registers `factory` under `key`.
    ///
    /// Fails with [`ConflictError`] if `key` is already present; the existing
    /// entry is left untouched.
    pub fn register<K, F>(&self, key: K, factory: F) -> Result<(), ConflictError>
    where
        K: Into<Key>,
        F: Fn() -> Box<T> + Send + Sync + 'static,
    {
        self.register_factory(key, Arc::new(factory), Origin::Manual)
    }

    /// Registers `factory` under `key`, recording which discovery path did it.
    pub fn register_with_origin<K, F>(
        &self,
        key: K,
        factory: F,
        origin: Origin,
    ) -> Result<(), ConflictError>
    where
        K: Into<Key>,
        F: Fn() -> Box<T> + Send + Sync + 'static,
    {
        self.register_factory(key, Arc::new(factory), origin)
    }

    /// Registers an already shared factory.
    pub fn register_factory<K: Into<Key>>(
        &self,
        key: K,
        factory: Factory<T>,
        origin: Origin,
    ) -> Result<(), ConflictError> {
        let key = key.into();
        let inserted = {
            let mut entries = self.entries.write();
            match entries.entry(key.clone()) {
                Entry::Occupied(_) => false,
                Entry::Vacant(slot) => {
                    slot.insert(RegistryEntry::new(key.clone(), factory, origin));
                    true
                }
            }
        };

        let observers = self.observers.snapshot();
        if inserted {
            tracing::trace!(%key, %origin, "kind registered");
            for observer in observers.iter() {
                observer.registered(&key, origin);
            }
            Ok(())
        } else {
            tracing::warn!(%key, %origin, "duplicate registration rejected");
            for observer in observers.iter() {
                observer.conflict(&key);
            }
            Err(ConflictError { key })
        }
    }

    /// Registers `factory` unless `key` is taken. Returns whether it was inserted.
    pub fn try_register<K, F>(&self, key: K, factory: F) -> bool
    where
        K: Into<Key>,
        F: Fn() -> Box<T> + Send + Sync + 'static,
    {
        self.register(key, factory).is_ok()
    }

    /// Builds a new instance of the kind registered under `key`.
    ///
    /// The factory runs outside the registry lock. If it panics, observers
    /// are told and the panic continues to the caller; the registry itself
    /// stays usable.
    pub fn resolve(&self, key: &str) -> Result<Box<T>, NotFoundError> {
        let entry = self.entry(key)?;
        let key = entry.key;
        let factory = entry.factory;

        let observers = self.observers.snapshot();
        for observer in observers.iter() {
            observer.resolving(&key);
        }

        let start = Instant::now();
        let instance = match panic::catch_unwind(AssertUnwindSafe(|| factory())) {
            Ok(instance) => instance,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(%key, panic = %message, "factory panicked");
                for observer in observers.iter() {
                    observer.factory_panic(&key, &message);
                }
                panic::resume_unwind(payload);
            }
        };
        let duration = start.elapsed();

        tracing::trace!(%key, ?duration, "kind resolved");
        for observer in observers.iter() {
            observer.resolved(&key, duration);
        }
        Ok(instance)
    }

    /// Returns the factory registered under `key` without invoking it.
    pub fn factory(&self, key: &str) -> Result<Factory<T>, NotFoundError> {
        self.entry(key).map(|entry| entry.factory)
    }

    /// Returns a copy of the entry registered under `key`.
    pub fn entry(&self, key: &str) -> Result<RegistryEntry<T>, NotFoundError> {
        let (found, registered) = {
            let entries = self.entries.read();
            (entries.get(key).cloned(), entries.len())
        };
        match found {
            Some(entry) => Ok(entry),
            None => {
                let key = Key::from(key);
                tracing::warn!(%key, registered, "kind not found; its component has not registered");
                for observer in self.observers.snapshot().iter() {
                    observer.not_found(&key);
                }
                Err(NotFoundError { key })
            }
        }
    }

    /// Whether `key` has been registered.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    /// All registered keys, in no particular order.
    pub fn keys(&self) -> Vec<Key> {
        self.entries.read().keys().cloned().collect()
    }

    /// All registered keys, sorted.
    pub fn keys_sorted(&self) -> Vec<Key> {
        let mut keys = self.keys();
        keys.sort();
        keys
    }

    /// Which discovery path registered `key`, if anyone did.
    pub fn origin_of(&self, key: &str) -> Option<Origin> {
        self.entries.read().get(key).map(RegistryEntry::origin)
    }

    /// Number of registered keys.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the keys in `expected` that nobody registered.
    ///
    /// Each missing key is logged at `warn`, so a stale generated table or a
    /// component left out of the link shows up by name instead of only as a
    /// later `NotFoundError`.
    pub fn expect_keys<I, K>(&self, expected: I) -> Vec<Key>
    where
        I: IntoIterator<Item = K>,
        K: Into<Key>,
    {
        let entries = self.entries.read();
        let missing: Vec<Key> = expected
            .into_iter()
            .map(Into::into)
            .filter(|key: &Key| !entries.contains_key(key.as_str()))
            .collect();
        drop(entries);

        for key in &missing {
            tracing::warn!(%key, "expected kind was never registered");
        }
        missing
    }

    /// Attaches an observer to every later registration and resolution.
    pub fn add_observer(&self, observer: Arc<dyn RegistryObserver>) -> &Self {
        self.observers.add(observer);
        self
    }
}

impl<T: ?Sized> Default for FactoryRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for FactoryRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryRegistry")
            .field("interface", &std::any::type_name::<T>())
            .field("keys", &self.keys_sorted())
            .field("observers", &self.observers.len())
            .finish()
    }
}
