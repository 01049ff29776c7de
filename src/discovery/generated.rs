//! Discovery from the table the build script generates.
//!
//! `build.rs` scans the kind sources for `registry_kind!` markers and writes
//! `GENERATED_KINDS` into `OUT_DIR`. The table is rebuilt whenever a scanned
//! file changes, so it cannot go stale between builds; a kind whose marker is
//! missing or malformed is reported as a cargo warning at build time.

use crate::kinds::Object;
use crate::registration::Origin;
use crate::registry::FactoryRegistry;

use super::{populate_from_table, DiscoveryBackend, DiscoveryReport, KindEntry};

include!(concat!(env!("OUT_DIR"), "/generated_kinds.rs"));

pub const BACKEND_NAME: &str = "generated";

/// Registers the rows of a static, build-generated table.
#[derive(Debug, Clone, Copy)]
pub struct GeneratedBackend {
    table: &'static [KindEntry],
}

impl GeneratedBackend {
    /// Backend over the table generated for this build.
    pub fn new() -> Self {
        Self {
            table: GENERATED_KINDS,
        }
    }

    /// Backend over another static table with the same layout.
    pub fn with_table(table: &'static [KindEntry]) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'static [KindEntry] {
        self.table
    }
}

impl Default for GeneratedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DiscoveryBackend<dyn Object> for GeneratedBackend {
    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    fn populate(&self, registry: &FactoryRegistry<dyn Object>) -> DiscoveryReport {
        populate_from_table(registry, BACKEND_NAME, self.table, Origin::Generated)
    }
}
