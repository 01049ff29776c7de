//! # ferrous-registry
//!
//! Order-independent, thread-safe factory registry for Rust.
//!
//! Independently compiled components register named factories for a shared
//! interface, and consumers resolve instances by name. Nothing depends on the
//! order in which components start: every piece of shared state is built on
//! first use, never at load time.
//!
//! ## Features
//!
//! - **Factory registry**: string keys to zero-argument factories, duplicates rejected
//! - **Build-time discovery**: generated, hand-enumerated or link-time collected kind tables
//! - **Lazy singletons**: exactly-once construction with sticky failure
//! - **Work queues**: bounded MPMC FIFO with blocking or rejecting backpressure
//! - **Observability**: `tracing` logs plus pluggable observers
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_registry::FactoryRegistry;
//!
//! trait Greeter: Send {
//!     fn greet(&self, name: &str) -> String;
//! }
//!
//! struct English;
//! impl Greeter for English {
//!     fn greet(&self, name: &str) -> String { format!("Hello, {}", name) }
//! }
//!
//! struct French;
//! impl Greeter for French {
//!     fn greet(&self, name: &str) -> String { format!("Bonjour, {}", name) }
//! }
//!
//! let greeters: FactoryRegistry<dyn Greeter> = FactoryRegistry::new();
//!
//! // Registration order is irrelevant to resolution.
//! greeters.register("fr", || Box::new(French)).unwrap();
//! greeters.register("en", || Box::new(English)).unwrap();
//!
//! assert_eq!(greeters.resolve("en").unwrap().greet("Ada"), "Hello, Ada");
//! assert_eq!(greeters.resolve("fr").unwrap().greet("Ada"), "Bonjour, Ada");
//!
//! // First registration wins.
//! assert!(greeters.register("en", || Box::new(French)).is_err());
//! ```
//!
//! ## Built-in Kinds
//!
//! ```rust
//! use ferrous_registry::kinds;
//!
//! let registry = kinds().unwrap();
//! let mut upper = registry.resolve("Object1").unwrap();
//! let mut reverse = registry.resolve("Object2").unwrap();
//!
//! assert_eq!(upper.handle("abc"), "ABC");
//! assert_eq!(reverse.handle("abc"), "cba");
//! ```
//!
//! ## Handing Work Between Threads
//!
//! ```rust
//! use ferrous_registry::{kinds, WorkQueue};
//! use std::sync::Arc;
//! use std::thread;
//!
//! let queue = Arc::new(WorkQueue::new(4));
//!
//! let consumer = {
//!     let queue = queue.clone();
//!     thread::spawn(move || {
//!         queue
//!             .drain()
//!             .map(|mut object: Box<dyn kinds::Object>| object.handle("ok"))
//!             .collect::<Vec<_>>()
//!     })
//! };
//!
//! for key in ["Object1", "Object2"] {
//!     let object = kinds().unwrap().resolve(key).unwrap();
//!     assert!(queue.push(object).is_ok());
//! }
//! queue.close();
//!
//! assert_eq!(consumer.join().unwrap(), vec!["OK", "ko"]);
//! ```

#[macro_use]
mod macros;

pub mod config;
pub mod discovery;
pub mod error;
pub mod key;
pub mod kinds;
pub mod observer;
pub mod queue;
pub mod registry;
pub mod singleton;

mod registration;

pub use config::RegistryConfig;
pub use discovery::{DiscoveryBackend, DiscoveryReport, ExplicitBackend, GeneratedBackend, KindEntry, KindModule};
#[cfg(linked_table)]
pub use discovery::LinkedBackend;
pub use error::{
    ConfigError, ConflictError, InitError, NotFoundError, PushError, QueueClosedError, RegistryError,
    RegistryResult,
};
pub use key::Key;
pub use kinds::{kinds, Object, Object1, Object2};
pub use observer::{LoggingObserver, MetricsObserver, RegistryObserver};
pub use queue::{Backpressure, Drain, WorkQueue};
pub use registration::{Factory, Origin, RegistryEntry};
pub use registry::FactoryRegistry;
pub use singleton::{CellState, SingletonCell};

#[doc(hidden)]
pub mod __private {
    #[cfg(linked_table)]
    pub use linkme;
}
