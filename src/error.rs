//! Error types for the registry, singleton cells and work queues.
//!
//! Every primitive in this crate reports failure as an explicit value. None of
//! these errors terminate the process; only the top-level caller decides
//! whether an error is fatal.

use std::fmt;

use thiserror::Error;

use crate::key::Key;

/// A key was registered twice.
///
/// The second registration is rejected and the first stays resolvable.
///
/// # Examples
///
/// ```rust
/// use ferrous_registry::{ConflictError, FactoryRegistry};
///
/// let registry: FactoryRegistry<String> = FactoryRegistry::new();
/// registry.register("greeting", || Box::new("hello".to_string())).unwrap();
///
/// let err: ConflictError = registry
///     .register("greeting", || Box::new("bonjour".to_string()))
///     .unwrap_err();
/// assert_eq!(err.to_string(), "Kind already registered: greeting");
/// assert_eq!(*registry.resolve("greeting").unwrap(), "hello");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Kind already registered: {key}")]
pub struct ConflictError {
    /// The key that was already present
    pub key: Key,
}

/// A key was resolved before anyone registered it.
///
/// Always recoverable. A key that shows up here but is registered later is a
/// bug in the caller's startup order, not in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Kind not found: {key}")]
pub struct NotFoundError {
    /// The key that was requested
    pub key: Key,
}

/// A singleton initializer failed.
///
/// Cells keep this error once it happened, so every later `get()` reports the
/// same failure without running the initializer again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitError {
    /// The initializer returned an error
    #[error("Initialization of {type_name} failed: {message}")]
    Failed {
        /// Type name of the value the cell holds
        type_name: &'static str,
        /// Message produced by the initializer
        message: String,
    },
    /// The initializer panicked
    #[error("Initialization of {type_name} panicked: {message}")]
    Panicked {
        /// Type name of the value the cell holds
        type_name: &'static str,
        /// Panic payload, if it was a string
        message: String,
    },
}

impl InitError {
    /// Creates a `Failed` error for a cell holding `T`.
    pub fn failed<T: ?Sized>(message: impl fmt::Display) -> Self {
        InitError::Failed {
            type_name: std::any::type_name::<T>(),
            message: message.to_string(),
        }
    }

    /// Type name of the value whose construction failed.
    pub fn type_name(&self) -> &'static str {
        match self {
            InitError::Failed { type_name, .. } | InitError::Panicked { type_name, .. } => type_name,
        }
    }
}

/// An operation was attempted on a closed queue.
///
/// Signals shutdown. `pop` only returns this once every item pushed before
/// `close()` has been delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Error)]
#[error("Work queue is closed")]
pub struct QueueClosedError;

/// A push was refused. The item is handed back to the producer.
#[derive(Clone, PartialEq, Eq, Error)]
pub enum PushError<T> {
    /// The queue was closed before the item could be accepted
    #[error("Work queue is closed")]
    Closed(T),
    /// The queue was full and its backpressure policy rejects
    #[error("Work queue is full")]
    Full(T),
}

impl<T> PushError<T> {
    /// Recovers the item that was not pushed.
    pub fn into_inner(self) -> T {
        match self {
            PushError::Closed(item) | PushError::Full(item) => item,
        }
    }

    /// Whether the push failed because the queue was closed.
    pub fn is_closed(&self) -> bool {
        matches!(self, PushError::Closed(_))
    }
}

// Manual impl so `T` does not need to be `Debug`.
impl<T> fmt::Debug for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushError::Closed(_) => f.write_str("Closed(..)"),
            PushError::Full(_) => f.write_str("Full(..)"),
        }
    }
}

impl<T> From<PushError<T>> for QueueClosedError {
    fn from(_: PushError<T>) -> Self {
        QueueClosedError
    }
}

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A queue capacity of zero can never accept an item
    #[error("Queue capacity must be greater than 0")]
    ZeroCapacity,
    /// An environment variable or field held an unparsable value
    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue {
        /// Variable or field name
        name: &'static str,
        /// The rejected value
        value: String,
    },
    /// JSON configuration could not be parsed
    #[cfg(feature = "config")]
    #[error("Invalid configuration document: {0}")]
    Parse(String),
}

/// Any error produced by this crate.
///
/// # Examples
///
/// ```rust
/// use ferrous_registry::{FactoryRegistry, RegistryError, RegistryResult};
///
/// fn lookup(registry: &FactoryRegistry<u32>) -> RegistryResult<u32> {
///     Ok(*registry.resolve("answer")?)
/// }
///
/// let registry = FactoryRegistry::new();
/// match lookup(&registry) {
///     Err(RegistryError::NotFound(err)) => assert_eq!(err.key.as_str(), "answer"),
///     other => panic!("unexpected: {:?}", other),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Conflict(#[from] ConflictError),
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
    #[error(transparent)]
    Init(#[from] InitError),
    #[error(transparent)]
    QueueClosed(#[from] QueueClosedError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
