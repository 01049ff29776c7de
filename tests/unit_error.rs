//! Unit tests for the error types and RegistryResult.

use ferrous_registry::{
    ConfigError, ConflictError, FactoryRegistry, InitError, Key, NotFoundError, PushError,
    QueueClosedError, RegistryError, RegistryResult,
};
use std::error::Error;

#[test]
fn test_error_display_conflict() {
    let error = ConflictError { key: Key::from("Object1") };
    assert_eq!(error.to_string(), "Kind already registered: Object1");
}

#[test]
fn test_error_display_not_found() {
    let error = NotFoundError { key: Key::from("Object3") };
    let display_str = format!("{}", error);
    assert_eq!(display_str, "Kind not found: Object3");
    assert!(display_str.contains("Object3"));
}

#[test]
fn test_error_display_init() {
    let failed = InitError::failed::<u32>("disk full");
    assert_eq!(failed.type_name(), "u32");
    assert_eq!(failed.to_string(), "Initialization of u32 failed: disk full");

    let panicked = InitError::Panicked {
        type_name: "u32",
        message: "boom".to_string(),
    };
    assert!(panicked.to_string().contains("panicked"));
    assert!(panicked.to_string().contains("boom"));
    assert_ne!(failed, panicked);
}

#[test]
fn test_push_error_returns_item() {
    let closed = PushError::Closed(String::from("job"));
    assert!(closed.is_closed());
    assert_eq!(closed.to_string(), "Work queue is closed");
    assert_eq!(format!("{:?}", closed), "Closed(..)");
    assert_eq!(closed.into_inner(), "job");

    let full = PushError::Full(3);
    assert!(!full.is_closed());
    assert_eq!(QueueClosedError::from(full), QueueClosedError);
}

#[test]
fn test_config_error_display() {
    assert_eq!(
        ConfigError::ZeroCapacity.to_string(),
        "Queue capacity must be greater than 0"
    );
    let invalid = ConfigError::InvalidValue {
        name: "FERROUS_REGISTRY_BACKPRESSURE",
        value: "drop".to_string(),
    };
    assert_eq!(
        invalid.to_string(),
        "Invalid value for FERROUS_REGISTRY_BACKPRESSURE: \"drop\""
    );
}

#[test]
fn test_registry_error_is_transparent() {
    let inner = NotFoundError { key: Key::from("x") };
    let error: RegistryError = inner.clone().into();
    assert_eq!(error.to_string(), inner.to_string());
    assert!(error.source().is_none());
    assert_eq!(error, RegistryError::NotFound(inner));
}

#[test]
fn test_question_mark_conversion() {
    fn build(registry: &FactoryRegistry<u8>) -> RegistryResult<u8> {
        registry.register("one", || Box::new(1))?;
        registry.register("one", || Box::new(2))?;
        Ok(0)
    }

    let registry = FactoryRegistry::new();
    match build(&registry) {
        Err(RegistryError::Conflict(err)) => assert_eq!(err.key, "one"),
        other => panic!("unexpected result: {:?}", other),
    }
}
