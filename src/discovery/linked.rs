//! Discovery from entries collected by the linker.
//!
//! Each kind places a [`KindEntry`] into [`LINKED_KINDS`] with
//! [`link_kind!`](crate::link_kind). The linker gathers every entry of every
//! linked object file into one contiguous slice, so no central list exists
//! and no build step has to run. Only compiled on targets that support it.

use crate::kinds::Object;
use crate::registration::Origin;
use crate::registry::FactoryRegistry;

use super::{populate_from_table, DiscoveryBackend, DiscoveryReport, KindEntry};

pub const BACKEND_NAME: &str = "linked";

// Entries are contributed by `link_kind!`.
#[linkme::distributed_slice]
pub static LINKED_KINDS: [KindEntry] = [..];

/// Registers every entry the linker collected.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkedBackend;

impl LinkedBackend {
    pub fn new() -> Self {
        Self
    }

    pub fn table(&self) -> &'static [KindEntry] {
        LINKED_KINDS.static_slice()
    }
}

impl DiscoveryBackend<dyn Object> for LinkedBackend {
    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    fn populate(&self, registry: &FactoryRegistry<dyn Object>) -> DiscoveryReport {
        populate_from_table(registry, BACKEND_NAME, self.table(), Origin::Linked)
    }
}
