//! Lazy singleton cells under concurrent first use.

use crossbeam_utils::thread;
use ferrous_registry::{CellState, InitError, SingletonCell};
use serial_test::serial;
use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::time::Duration;

const THREADS: usize = 16;

struct Connection {
    id: usize,
}

#[test]
fn test_concurrent_first_use_constructs_once() {
    let constructions = AtomicUsize::new(0);
    let cell = SingletonCell::new(|| {
        let id = constructions.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(10));
        Ok::<_, Infallible>(Connection { id })
    });
    let barrier = Barrier::new(THREADS);

    let addresses: Vec<usize> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|_| {
                    barrier.wait();
                    let connection = cell.get().unwrap();
                    assert_eq!(connection.id, 0);
                    connection as *const Connection as usize
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
    .unwrap();

    assert_eq!(constructions.load(Ordering::SeqCst), 1);
    assert!(addresses.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(cell.state(), CellState::Ready);
}

#[test]
fn test_concurrent_failure_is_sticky() {
    let attempts = AtomicUsize::new(0);
    let cell: SingletonCell<Connection, _> = SingletonCell::new(|| {
        attempts.fetch_add(1, Ordering::SeqCst);
        Err::<Connection, _>("connection refused")
    });
    let barrier = Barrier::new(THREADS);

    let errors: Vec<InitError> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|_| {
                    barrier.wait();
                    cell.get().err().unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
    .unwrap();

    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    assert!(errors.iter().all(|err| err == &errors[0]));
    assert!(matches!(errors[0], InitError::Failed { ref message, .. } if message == "connection refused"));
    assert_eq!(cell.state(), CellState::Failed);
    assert!(cell.try_get().is_none());
}

#[test]
fn test_state_is_initializing_while_constructing() {
    let entered = Barrier::new(2);
    let release = Barrier::new(2);
    let cell = SingletonCell::new(|| {
        entered.wait();
        release.wait();
        Ok::<_, Infallible>(Connection { id: 9 })
    });

    thread::scope(|s| {
        let getter = s.spawn(|_| cell.get().map(|c| c.id).unwrap());
        entered.wait();
        assert_eq!(cell.state(), CellState::Initializing);
        assert!(cell.try_get().is_none());
        release.wait();
        assert_eq!(getter.join().unwrap(), 9);
    })
    .unwrap();

    assert_eq!(cell.state(), CellState::Ready);
}

#[test]
fn test_ready_state_implies_value_is_visible() {
    for _ in 0..50 {
        let cell = SingletonCell::new(|| {
            std::thread::sleep(Duration::from_micros(200));
            Ok::<_, Infallible>(Connection { id: 3 })
        });

        thread::scope(|s| {
            let watcher = s.spawn(|_| {
                while !cell.is_ready() {
                    std::hint::spin_loop();
                }
                cell.try_get().map(|c: &Connection| c.id)
            });
            assert_eq!(cell.get().unwrap().id, 3);
            assert_eq!(watcher.join().unwrap(), Some(3));
        })
        .unwrap();
    }
}

#[test]
fn test_teardown_then_rebuild() {
    let built = Arc::new(AtomicUsize::new(0));
    let counter = built.clone();
    let mut cell = SingletonCell::new(move || Ok::<_, Infallible>(counter.fetch_add(1, Ordering::SeqCst)));

    assert_eq!(*cell.get().unwrap(), 0);
    assert_eq!(cell.teardown(), Some(0));
    assert_eq!(cell.state(), CellState::Uninitialized);
    assert_eq!(*cell.get().unwrap(), 1);
    assert_eq!(built.load(Ordering::SeqCst), 2);
}

static SHARED: SingletonCell<Vec<&'static str>> =
    SingletonCell::new(|| Ok(vec!["alpha", "beta"]));

#[test]
#[serial]
fn test_static_cell_is_built_on_first_use() {
    let first = SHARED.get().unwrap();
    let second = SHARED.get().unwrap();
    assert!(std::ptr::eq(first, second));
    assert_eq!(first, &vec!["alpha", "beta"]);
    assert!(SHARED.is_ready());
}
