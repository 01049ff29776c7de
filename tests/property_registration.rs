//! Property-based tests for registration order and duplicate handling.

use ferrous_registry::FactoryRegistry;
use proptest::prelude::*;
use std::collections::HashMap;

proptest! {
    // Whatever order keys arrive in, each resolves to its own factory.
    #[test]
    fn registration_order_is_irrelevant(order in Just((0..12usize).collect::<Vec<_>>()).prop_shuffle()) {
        let registry: FactoryRegistry<usize> = FactoryRegistry::new();
        for id in &order {
            let value = *id;
            registry.register(format!("kind-{}", id), move || Box::new(value)).unwrap();
        }

        prop_assert_eq!(registry.len(), order.len());
        for id in 0..12usize {
            prop_assert_eq!(*registry.resolve(&format!("kind-{}", id)).unwrap(), id);
        }
    }
}

proptest! {
    // Duplicates are rejected and the first value for a key stays resolvable.
    #[test]
    fn first_registration_wins(ops in prop::collection::vec((0u8..6, any::<u32>()), 1..40)) {
        let registry: FactoryRegistry<u32> = FactoryRegistry::new();
        let mut first: HashMap<u8, u32> = HashMap::new();
        let mut conflicts = 0usize;

        for (key, value) in &ops {
            let value = *value;
            let result = registry.register(key.to_string(), move || Box::new(value));
            if first.contains_key(key) {
                prop_assert!(result.is_err());
                conflicts += 1;
            } else {
                prop_assert!(result.is_ok());
                first.insert(*key, value);
            }
        }

        prop_assert_eq!(registry.len(), first.len());
        prop_assert_eq!(conflicts, ops.len() - first.len());
        for (key, value) in &first {
            prop_assert_eq!(*registry.resolve(&key.to_string()).unwrap(), *value);
        }
    }
}

proptest! {
    // Unregistered keys never resolve, whatever else is present.
    #[test]
    fn unknown_keys_are_not_found(
        present in prop::collection::hash_set("[a-z]{1,6}", 0..10),
        probe in "[A-Z]{1,6}",
    ) {
        let registry: FactoryRegistry<u8> = FactoryRegistry::new();
        for key in &present {
            registry.register(key.as_str(), || Box::new(0)).unwrap();
        }
        let err = registry.resolve(&probe).unwrap_err();
        prop_assert_eq!(err.key.as_str(), probe.as_str());
    }
}
