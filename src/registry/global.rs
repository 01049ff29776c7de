//! Process-wide registries, one per interface type.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use ahash::RandomState;
use once_cell::sync::Lazy;
use parking_lot::RwLock;

use super::FactoryRegistry;

type GlobalMap = HashMap<TypeId, &'static (dyn Any + Send + Sync), RandomState>;

// Registries are leaked on creation: they live until process exit and are
// never torn down, so `&'static` handles stay valid everywhere.
static GLOBALS: Lazy<RwLock<GlobalMap>> =
    Lazy::new(|| RwLock::new(HashMap::with_hasher(RandomState::new())));

/// Returns the process-wide registry for interface `T`.
///
/// The registry is created on first access from whichever thread gets there
/// first. Load order of the calling components does not matter: the first
/// caller creates it, everyone else sees the same instance.
///
/// # Examples
///
/// ```
/// use ferrous_registry::registry::global;
///
/// trait Codec: Send {
///     fn id(&self) -> u8;
/// }
///
/// struct Identity;
/// impl Codec for Identity {
///     fn id(&self) -> u8 { 0 }
/// }
///
/// global::<dyn Codec>().register("identity", || Box::new(Identity)).unwrap();
///
/// // Any other call site sees the same registry.
/// assert_eq!(global::<dyn Codec>().resolve("identity").unwrap().id(), 0);
/// assert!(std::ptr::eq(global::<dyn Codec>(), global::<dyn Codec>()));
/// ```
pub fn global<T: ?Sized + 'static>() -> &'static FactoryRegistry<T> {
    let id = TypeId::of::<T>();

    if let Some(existing) = GLOBALS.read().get(&id).copied() {
        return downcast(existing);
    }

    let mut map = GLOBALS.write();
    let slot = map.entry(id).or_insert_with(|| {
        tracing::debug!(interface = std::any::type_name::<T>(), "creating process-wide registry");
        let leaked: &'static FactoryRegistry<T> = Box::leak(Box::new(FactoryRegistry::new()));
        leaked as &'static (dyn Any + Send + Sync)
    });
    downcast(*slot)
}

fn downcast<T: ?Sized + 'static>(any: &'static (dyn Any + Send + Sync)) -> &'static FactoryRegistry<T> {
    any.downcast_ref::<FactoryRegistry<T>>()
        .expect("process-wide registry stored under a foreign TypeId")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    struct GlobalProbe;

    #[test]
    fn test_distinct_interfaces_get_distinct_registries() {
        let a = global::<u16>() as *const FactoryRegistry<u16> as *const ();
        let b = global::<u64>() as *const FactoryRegistry<u64> as *const ();
        assert_ne!(a, b);
    }

    #[test]
    fn test_concurrent_first_access_yields_one_registry() {
        let handles: Vec<_> = (0..8)
            .map(|_| thread::spawn(|| global::<GlobalProbe>() as *const _ as usize))
            .collect();
        let addresses: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(addresses.windows(2).all(|w| w[0] == w[1]));
    }
}
