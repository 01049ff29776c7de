//! Lazily constructed, exactly-once singleton cells.
//!
//! A [`SingletonCell`] builds its value on first *use*, never at load time, so
//! it does not care in which order independently compiled components start
//! up. Construction runs at most once: concurrent callers block until the
//! constructing thread finishes and then all observe the same outcome.
//!
//! # Failure policy
//!
//! Failure is sticky. If the initializer returns an error or panics, the cell
//! moves to [`CellState::Failed`] and every later `get()` reports the same
//! [`InitError`] without running the initializer again. A broken dependency
//! keeps failing loudly instead of half-recovering on some call.
//!
//! # Teardown policy
//!
//! [`SingletonCell::teardown`] takes `&mut self`. Holding the only mutable
//! borrow proves that no thread is inside `get()` and that no reference handed
//! out by `get()` is still alive, so teardown can never race construction or
//! invalidate a caller's reference. A cell stored in a `static` cannot be
//! borrowed mutably and is therefore never torn down; its value lives until
//! process exit and is leaked then. Values that must be shared past a teardown
//! should be stored as `Arc<T>` so callers keep their own reference count.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};

use once_cell::sync::OnceCell;

use crate::error::InitError;
use crate::observer::panic_message;

const UNINITIALIZED: u8 = 0;
const INITIALIZING: u8 = 1;
const READY: u8 = 2;
const FAILED: u8 = 3;

/// Lifecycle of a [`SingletonCell`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    /// Nobody has called `get()` yet (or the cell was torn down)
    Uninitialized,
    /// One thread is running the initializer; others wait
    Initializing,
    /// The value exists and is shared by all callers
    Ready,
    /// The initializer failed; the failure is reported on every `get()`
    Failed,
}

/// Holds at most one instance of `T`, built on first use.
///
/// `F` is the initializer. It returns `Result<T, E>`; any `E: Display` is
/// recorded as [`InitError::Failed`].
///
/// The initializer must not call `get()` on its own cell; that deadlocks.
///
/// # Examples
///
/// ```
/// use ferrous_registry::{CellState, SingletonCell};
/// use std::convert::Infallible;
///
/// struct Settings {
///     workers: usize,
/// }
///
/// static SETTINGS: SingletonCell<Settings> =
///     SingletonCell::new(|| Ok::<_, Infallible>(Settings { workers: 4 }));
///
/// assert_eq!(SETTINGS.state(), CellState::Uninitialized);
/// assert_eq!(SETTINGS.get().unwrap().workers, 4);
/// assert_eq!(SETTINGS.state(), CellState::Ready);
/// ```
///
/// A failing initializer stays failed:
///
/// ```
/// use ferrous_registry::{CellState, SingletonCell};
///
/// let cell: SingletonCell<u32, _> = SingletonCell::new(|| Err::<u32, _>("database offline"));
///
/// let first = cell.get().unwrap_err();
/// let second = cell.get().unwrap_err();
/// assert_eq!(first, second);
/// assert_eq!(cell.state(), CellState::Failed);
/// assert!(first.to_string().contains("database offline"));
/// ```
pub struct SingletonCell<T, F = fn() -> Result<T, std::convert::Infallible>> {
    value: OnceCell<Result<T, InitError>>,
    state: AtomicU8,
    init: F,
}

impl<T, F> SingletonCell<T, F> {
    /// Creates an empty cell that will run `init` on first use.
    pub const fn new(init: F) -> Self {
        Self {
            value: OnceCell::new(),
            state: AtomicU8::new(UNINITIALIZED),
            init,
        }
    }

    /// Current lifecycle state. Never blocks.
    pub fn state(&self) -> CellState {
        match self.state.load(Ordering::Acquire) {
            UNINITIALIZED => CellState::Uninitialized,
            INITIALIZING => CellState::Initializing,
            READY => CellState::Ready,
            _ => CellState::Failed,
        }
    }

    /// Returns the value if it is already built. Never blocks, never constructs.
    pub fn try_get(&self) -> Option<&T> {
        self.value.get().and_then(|slot| slot.as_ref().ok())
    }

    /// Whether the value has been built successfully.
    pub fn is_ready(&self) -> bool {
        self.state() == CellState::Ready
    }

    /// Destroys the value (or forgets a failure) and returns the cell to
    /// [`CellState::Uninitialized`]. The next `get()` constructs again.
    ///
    /// Returns the value if one was built.
    pub fn teardown(&mut self) -> Option<T> {
        let previous = self.value.take();
        *self.state.get_mut() = UNINITIALIZED;
        if previous.is_some() {
            tracing::debug!(type_name = std::any::type_name::<T>(), "singleton torn down");
        }
        previous.and_then(Result::ok)
    }
}

impl<T, F, E> SingletonCell<T, F>
where
    F: Fn() -> Result<T, E>,
    E: fmt::Display,
{
    /// Returns the shared value, constructing it on the first call.
    ///
    /// Concurrent first callers block until the single constructing thread is
    /// done, then all receive the same value or the same error.
    pub fn get(&self) -> Result<&T, InitError> {
        let mut constructed = false;
        let slot = self.value.get_or_init(|| {
            constructed = true;
            self.construct()
        });
        // The outcome is only published once the slot holds it, so `Ready`
        // always implies `try_get()` sees the value.
        if constructed {
            let state = if slot.is_ok() { READY } else { FAILED };
            self.state.store(state, Ordering::Release);
        }
        slot.as_ref().map_err(Clone::clone)
    }

    fn construct(&self) -> Result<T, InitError> {
        let type_name = std::any::type_name::<T>();
        self.state.store(INITIALIZING, Ordering::Release);
        tracing::debug!(type_name, "constructing singleton");

        let outcome = match panic::catch_unwind(AssertUnwindSafe(|| (self.init)())) {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(InitError::Failed {
                type_name,
                message: err.to_string(),
            }),
            Err(payload) => Err(InitError::Panicked {
                type_name,
                message: panic_message(payload.as_ref()),
            }),
        };

        if let Err(err) = &outcome {
            tracing::error!(type_name, error = %err, "singleton initialization failed");
        }
        outcome
    }
}

impl<T: fmt::Debug, F> fmt::Debug for SingletonCell<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingletonCell")
            .field("state", &self.state())
            .field("value", &self.try_get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_constructs_on_first_use_only() {
        let calls = AtomicUsize::new(0);
        let cell = SingletonCell::new(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, Infallible>(String::from("ready"))
        });
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(cell.try_get(), None);

        assert_eq!(cell.get().unwrap(), "ready");
        assert_eq!(cell.get().unwrap(), "ready");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cell.try_get().map(String::as_str), Some("ready"));
    }

    #[test]
    fn test_panic_becomes_sticky_error() {
        let calls = AtomicUsize::new(0);
        let cell: SingletonCell<u8, _> = SingletonCell::new(|| -> Result<u8, Infallible> {
            calls.fetch_add(1, Ordering::SeqCst);
            panic!("exploded")
        });

        let err = cell.get().unwrap_err();
        assert!(matches!(err, InitError::Panicked { ref message, .. } if message == "exploded"));
        assert_eq!(cell.get().unwrap_err(), err);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cell.state(), CellState::Failed);
    }

    #[test]
    fn test_teardown_allows_rebuild() {
        let calls = AtomicUsize::new(0);
        let mut cell = SingletonCell::new(|| Ok::<_, Infallible>(calls.fetch_add(1, Ordering::SeqCst)));

        assert_eq!(*cell.get().unwrap(), 0);
        assert_eq!(cell.teardown(), Some(0));
        assert_eq!(cell.state(), CellState::Uninitialized);
        assert_eq!(*cell.get().unwrap(), 1);
    }

    #[test]
    fn test_teardown_forgets_failure() {
        let mut cell: SingletonCell<u8, _> = SingletonCell::new(|| Err::<u8, _>("nope"));
        assert!(cell.get().is_err());
        assert_eq!(cell.teardown(), None);
        assert_eq!(cell.state(), CellState::Uninitialized);
    }
}
