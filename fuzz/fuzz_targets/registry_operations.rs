#![no_main]

use ferrous_registry::FactoryRegistry;
use libfuzzer_sys::fuzz_target;
use std::collections::HashMap;

// Each byte pair is one operation on a small key space: register or resolve.
fuzz_target!(|data: &[u8]| {
    let registry: FactoryRegistry<u8> = FactoryRegistry::new();
    let mut model: HashMap<String, u8> = HashMap::new();

    for op in data.chunks_exact(2) {
        let key = format!("k{}", op[0] % 16);
        let value = op[1];

        if op[0] & 0x80 == 0 {
            let result = registry.register(key.clone(), move || Box::new(value));
            match model.get(&key) {
                Some(_) => assert!(result.is_err()),
                None => {
                    assert!(result.is_ok());
                    model.insert(key, value);
                }
            }
        } else {
            match (registry.resolve(&key), model.get(&key)) {
                (Ok(instance), Some(expected)) => assert_eq!(*instance, *expected),
                (Err(err), None) => assert_eq!(err.key.as_str(), key),
                (result, expected) => panic!("registry and model disagree: {:?} vs {:?}", result.is_ok(), expected),
            }
        }
    }

    assert_eq!(registry.len(), model.len());
});
