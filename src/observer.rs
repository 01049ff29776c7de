//! Diagnostic observers for registry events.
//!
//! Observers receive every registration and resolution a registry performs.
//! The registry logs through `tracing` on its own; observers exist for callers
//! that want the events in their own form (counters, audit trails, test
//! probes).

use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use crate::key::Key;
use crate::registration::Origin;

/// Hooks invoked by a [`FactoryRegistry`](crate::FactoryRegistry).
///
/// Every method has an empty default, so implementors only override what they
/// need. Calls happen synchronously on the registering or resolving thread
/// and never while the registry's map lock is held.
///
/// # Examples
///
/// ```
/// use ferrous_registry::{FactoryRegistry, Key, RegistryObserver};
/// use std::sync::{Arc, Mutex};
///
/// #[derive(Default)]
/// struct Misses(Mutex<Vec<String>>);
///
/// impl RegistryObserver for Misses {
///     fn not_found(&self, key: &Key) {
///         self.0.lock().unwrap().push(key.to_string());
///     }
/// }
///
/// let misses = Arc::new(Misses::default());
/// let registry: FactoryRegistry<u8> = FactoryRegistry::new();
/// registry.add_observer(misses.clone());
///
/// assert!(registry.resolve("absent").is_err());
/// assert_eq!(*misses.0.lock().unwrap(), vec!["absent".to_string()]);
/// ```
pub trait RegistryObserver: Send + Sync {
    /// A key was inserted.
    fn registered(&self, _key: &Key, _origin: Origin) {}

    /// A registration was rejected because the key already existed.
    fn conflict(&self, _key: &Key) {}

    /// A factory is about to run.
    fn resolving(&self, _key: &Key) {}

    /// A factory returned. `duration` covers the factory call only.
    fn resolved(&self, _key: &Key, _duration: Duration) {}

    /// A key was resolved that nobody registered.
    fn not_found(&self, _key: &Key) {}

    /// A factory panicked. The panic resumes after this call.
    fn factory_panic(&self, _key: &Key, _message: &str) {}
}

/// Copy-on-write list of observers.
///
/// Readers clone the inner `Arc` and iterate without holding the lock.
pub(crate) struct Observers {
    list: RwLock<Arc<[Arc<dyn RegistryObserver>]>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self {
            list: RwLock::new(Arc::from(Vec::new())),
        }
    }

    pub(crate) fn add(&self, observer: Arc<dyn RegistryObserver>) {
        let mut list = self.list.write();
        let mut next: Vec<_> = list.iter().cloned().collect();
        next.push(observer);
        *list = Arc::from(next);
    }

    pub(crate) fn snapshot(&self) -> Arc<[Arc<dyn RegistryObserver>]> {
        self.list.read().clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.list.read().len()
    }
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Observer that forwards every event to `tracing`.
///
/// The registry already emits its own events; this observer is useful when
/// a caller wants a second, prefixed stream (for example per subsystem).
pub struct LoggingObserver {
    prefix: String,
}

impl LoggingObserver {
    /// Creates a logging observer with the default prefix.
    pub fn new() -> Self {
        Self {
            prefix: "[ferrous-registry]".to_string(),
        }
    }

    /// Creates a logging observer with a custom prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryObserver for LoggingObserver {
    fn registered(&self, key: &Key, origin: Origin) {
        tracing::info!(%key, %origin, "{} registered", self.prefix);
    }

    fn conflict(&self, key: &Key) {
        tracing::warn!(%key, "{} duplicate registration rejected", self.prefix);
    }

    fn resolving(&self, key: &Key) {
        tracing::debug!(%key, "{} resolving", self.prefix);
    }

    fn resolved(&self, key: &Key, duration: Duration) {
        tracing::debug!(%key, ?duration, "{} resolved", self.prefix);
    }

    fn not_found(&self, key: &Key) {
        tracing::warn!(%key, "{} not found", self.prefix);
    }

    fn factory_panic(&self, key: &Key, message: &str) {
        tracing::error!(%key, panic = message, "{} factory panicked", self.prefix);
    }
}

/// Observer that counts events.
///
/// # Examples
///
/// ```
/// use ferrous_registry::{FactoryRegistry, MetricsObserver};
/// use std::sync::Arc;
///
/// let metrics = Arc::new(MetricsObserver::new());
/// let registry: FactoryRegistry<u32> = FactoryRegistry::new();
/// registry.add_observer(metrics.clone());
///
/// registry.register("one", || Box::new(1)).unwrap();
/// let _ = registry.register("one", || Box::new(2));
/// let _ = registry.resolve("one");
/// let _ = registry.resolve("two");
///
/// assert_eq!(metrics.registration_count(), 1);
/// assert_eq!(metrics.conflict_count(), 1);
/// assert_eq!(metrics.resolution_count(), 1);
/// assert_eq!(metrics.miss_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MetricsObserver {
    registrations: AtomicU64,
    conflicts: AtomicU64,
    resolutions: AtomicU64,
    misses: AtomicU64,
    panics: AtomicU64,
    total_resolution_nanos: AtomicU64,
}

impl MetricsObserver {
    /// Creates an observer with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registration_count(&self) -> u64 {
        self.registrations.load(Ordering::Relaxed)
    }

    pub fn conflict_count(&self) -> u64 {
        self.conflicts.load(Ordering::Relaxed)
    }

    /// Number of factory calls that returned.
    pub fn resolution_count(&self) -> u64 {
        self.resolutions.load(Ordering::Relaxed)
    }

    pub fn miss_count(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn panic_count(&self) -> u64 {
        self.panics.load(Ordering::Relaxed)
    }

    /// Total time spent inside factories.
    pub fn total_resolution_time(&self) -> Duration {
        Duration::from_nanos(self.total_resolution_nanos.load(Ordering::Relaxed))
    }

    /// Average time per factory call, if any completed.
    pub fn average_resolution_time(&self) -> Option<Duration> {
        let count = self.resolution_count();
        if count == 0 {
            None
        } else {
            let total = self.total_resolution_nanos.load(Ordering::Relaxed);
            Some(Duration::from_nanos(total / count))
        }
    }
}

impl RegistryObserver for MetricsObserver {
    fn registered(&self, _key: &Key, _origin: Origin) {
        self.registrations.fetch_add(1, Ordering::Relaxed);
    }

    fn conflict(&self, _key: &Key) {
        self.conflicts.fetch_add(1, Ordering::Relaxed);
    }

    fn resolved(&self, _key: &Key, duration: Duration) {
        self.resolutions.fetch_add(1, Ordering::Relaxed);
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.total_resolution_nanos.fetch_add(nanos, Ordering::Relaxed);
    }

    fn not_found(&self, _key: &Key) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    fn factory_panic(&self, _key: &Key, _message: &str) {
        self.panics.fetch_add(1, Ordering::Relaxed);
    }
}
