//! Build-time discovery of registry kinds.
//!
//! Components never call each other to get registered. Instead one of three
//! backends fills the registry from a table, and the backend is chosen when
//! the crate is compiled:
//!
//! | Feature | Backend | Table comes from |
//! |---|---|---|
//! | *(none)* | [`GeneratedBackend`] | `build.rs` scanning `src/kinds` for `registry_kind!` markers |
//! | `explicit-only` | [`ExplicitBackend`] | one hand-written list, [`explicit::builtin`] |
//! | `link-collected` | `LinkedBackend` | entries placed by `link_kind!` and gathered by the linker |
//!
//! `link-collected` takes effect only on targets where link-time collection
//! is supported; elsewhere the build script falls back to the generated table
//! and says so with a cargo warning. Whatever the backend, the result is the
//! same registry, and [`DiscoveryReport`] records what happened.

use std::fmt;

use crate::error::ConflictError;
use crate::key::Key;
use crate::kinds::Object;
use crate::registration::Origin;
use crate::registry::FactoryRegistry;

pub mod explicit;
pub mod generated;
#[cfg(linked_table)]
pub mod linked;
pub mod scan;

pub use explicit::{ExplicitBackend, KindModule};
pub use generated::GeneratedBackend;
#[cfg(linked_table)]
pub use linked::LinkedBackend;

/// One row of a static kind table.
#[derive(Clone, Copy)]
pub struct KindEntry {
    /// Registry key
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Builds a fresh instance
    pub factory: fn() -> Box<dyn Object>,
}

impl fmt::Debug for KindEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KindEntry")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// What a backend did to a registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// Name of the backend that ran
    pub backend: &'static str,
    /// Keys inserted, in table order
    pub registered: Vec<Key>,
    /// Keys that were already present and kept their first factory
    pub conflicts: Vec<ConflictError>,
}

impl DiscoveryReport {
    pub fn new(backend: &'static str) -> Self {
        Self {
            backend,
            ..Self::default()
        }
    }

    /// True when every entry was inserted.
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Records the outcome of one registration.
    pub fn record(&mut self, key: Key, outcome: Result<(), ConflictError>) {
        match outcome {
            Ok(()) => self.registered.push(key),
            Err(conflict) => self.conflicts.push(conflict),
        }
    }
}

/// A source of kind registrations.
///
/// Implementations must only register; they never resolve and never hold on
/// to the registry.
pub trait DiscoveryBackend<T: ?Sized> {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Registers every kind this backend knows about.
    fn populate(&self, registry: &FactoryRegistry<T>) -> DiscoveryReport;
}

/// Registers every row of `table`, tagging entries with `origin`.
pub fn populate_from_table(
    registry: &FactoryRegistry<dyn Object>,
    backend: &'static str,
    table: &[KindEntry],
    origin: Origin,
) -> DiscoveryReport {
    let mut report = DiscoveryReport::new(backend);
    for entry in table {
        let key = Key::from(entry.name);
        let outcome = registry.register_with_origin(key.clone(), entry.factory, origin);
        report.record(key, outcome);
    }
    tracing::debug!(
        backend,
        registered = report.registered.len(),
        conflicts = report.conflicts.len(),
        "kind table applied"
    );
    report
}

/// Name of the backend compiled into this build.
pub const SELECTED_BACKEND: &str = if cfg!(linked_table) {
    "linked"
} else if cfg!(feature = "explicit-only") {
    explicit::BACKEND_NAME
} else {
    generated::BACKEND_NAME
};

/// The backend compiled into this build.
#[cfg(linked_table)]
pub fn selected_backend() -> Box<dyn DiscoveryBackend<dyn Object>> {
    Box::new(LinkedBackend::new())
}

/// The backend compiled into this build.
#[cfg(all(not(linked_table), feature = "explicit-only"))]
pub fn selected_backend() -> Box<dyn DiscoveryBackend<dyn Object>> {
    Box::new(explicit::builtin())
}

/// The backend compiled into this build.
#[cfg(all(not(linked_table), not(feature = "explicit-only")))]
pub fn selected_backend() -> Box<dyn DiscoveryBackend<dyn Object>> {
    Box::new(GeneratedBackend::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::{object1, object2};

    #[test]
    fn test_table_population_reports_conflicts() {
        let registry: FactoryRegistry<dyn Object> = FactoryRegistry::new();
        registry.register("Object2", object2::create).unwrap();

        let table = [
            KindEntry {
                name: "Object1",
                description: "",
                factory: object1::create,
            },
            KindEntry {
                name: "Object2",
                description: "",
                factory: object1::create,
            },
        ];
        let report = populate_from_table(&registry, "test", &table, Origin::Generated);

        assert_eq!(report.backend, "test");
        assert_eq!(report.registered, vec![Key::from("Object1")]);
        assert_eq!(report.conflicts.len(), 1);
        assert!(!report.is_clean());
        // The earlier manual registration kept its factory.
        assert_eq!(registry.resolve("Object2").unwrap().kind(), "Object2");
        assert_eq!(registry.origin_of("Object1"), Some(Origin::Generated));
    }

    #[test]
    fn test_selected_backend_matches_name() {
        assert_eq!(selected_backend().name(), SELECTED_BACKEND);
    }
}
