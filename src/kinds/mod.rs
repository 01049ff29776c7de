//! The `Object` interface and its built-in kinds.
//!
//! Each kind lives in its own module and declares itself there; nothing in
//! this file lists them for the generated or linked backends. The
//! process-wide registry returned by [`kinds()`] is built on first use by
//! whichever discovery backend this build selected.

use crate::config::RegistryConfig;
use std::convert::Infallible;

use crate::discovery::{self, ExplicitBackend, KindModule};
use crate::error::InitError;
use crate::key::Key;
use crate::registry::FactoryRegistry;
use crate::singleton::SingletonCell;

pub mod object1;
pub mod object2;

pub use object1::Object1;
pub use object2::Object2;

/// A unit of work built by a registry factory.
///
/// Instances are exclusively owned by whoever resolved them and may be moved
/// to another thread, for example through a [`WorkQueue`](crate::WorkQueue).
pub trait Object: Send {
    /// Registry key this instance was built under.
    fn kind(&self) -> &'static str;

    /// Processes one input.
    fn handle(&mut self, input: &str) -> String;

    /// Number of inputs this instance has processed.
    fn handled(&self) -> usize;
}

pub type ObjectRegistry = FactoryRegistry<dyn Object>;

static KINDS: SingletonCell<ObjectRegistry> = SingletonCell::new(build_kinds);

/// The process-wide `Object` registry.
///
/// The first call runs the selected discovery backend and then checks the
/// keys named in `FERROUS_REGISTRY_EXPECTED_KINDS`. Every expected key that
/// no backend registered is logged as a warning. Queue settings are not read
/// here, so a bad queue configuration never affects the registry.
///
/// ```rust
/// use ferrous_registry::kinds;
///
/// let registry = kinds().unwrap();
/// let mut object = registry.resolve("Object1").unwrap();
/// assert_eq!(object.handle("hi"), "HI");
/// ```
pub fn kinds() -> Result<&'static ObjectRegistry, InitError> {
    KINDS.get()
}

fn build_kinds() -> Result<ObjectRegistry, Infallible> {
    let expected = RegistryConfig::expected_kinds_from_env();
    let registry = ObjectRegistry::new();

    let report = discovery::selected_backend().populate(&registry);
    tracing::info!(
        backend = report.backend,
        kinds = registry.len(),
        conflicts = report.conflicts.len(),
        "kind registry ready"
    );

    let missing: Vec<Key> = registry.expect_keys(expected);
    if !missing.is_empty() {
        tracing::warn!(missing = missing.len(), "kind registry is missing expected kinds");
    }
    Ok(registry)
}

/// The built-in kinds as a [`KindModule`], for the explicit backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinKinds;

impl KindModule<dyn Object> for BuiltinKinds {
    fn register_kinds(self, backend: ExplicitBackend<dyn Object>) -> ExplicitBackend<dyn Object> {
        backend
            .with(object1::NAME, object1::create)
            .with(object2::NAME, object2::create)
    }
}
