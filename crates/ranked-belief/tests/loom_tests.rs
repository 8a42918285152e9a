//! Loom-based concurrency tests for the promise state machine.
//!
//! Run with: `cargo test --features loom --test loom_tests --release`
//!
//! Loom exhaustively explores all possible thread interleavings to find
//! concurrency bugs that might only occur under specific scheduling.

#![cfg(feature = "loom")]

use loom::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use loom::sync::{Arc, Condvar, Mutex};
use loom::thread;
use std::cell::UnsafeCell;

const UNFORCED: u8 = 0;
const RUNNING: u8 = 1;
const DONE: u8 = 2;

/// Simplified promise cell for loom testing.
///
/// We test the core force protocol in isolation (CAS-elected runner,
/// outcome slot published before DONE, waiters parking on a condvar)
/// with the thunk reduced to a counter increment so the state space stays
/// manageable for loom's exhaustive search.
struct LoomPromise {
    state: AtomicU8,
    slot: UnsafeCell<Option<u64>>,
    runs: AtomicUsize,
    lock: Mutex<()>,
    cv: Condvar,
}

unsafe impl Send for LoomPromise {}
unsafe impl Sync for LoomPromise {}

impl LoomPromise {
    fn new() -> Self {
        Self {
            state: AtomicU8::new(UNFORCED),
            slot: UnsafeCell::new(None),
            runs: AtomicUsize::new(0),
            lock: Mutex::new(()),
            cv: Condvar::new(),
        }
    }

    fn force(&self) -> u64 {
        if self.state.load(Ordering::Acquire) != DONE {
            match self
                .state
                .compare_exchange(UNFORCED, RUNNING, Ordering::Acquire, Ordering::Acquire)
            {
                Ok(_) => {
                    // The runner: evaluate once, publish under the lock.
                    self.runs.fetch_add(1, Ordering::SeqCst);
                    // SAFETY: the CAS winner is the only writer.
                    unsafe { *self.slot.get() = Some(42) };
                    let guard = self.lock.lock().unwrap();
                    self.state.store(DONE, Ordering::Release);
                    drop(guard);
                    self.cv.notify_all();
                }
                Err(observed) if observed == DONE => {}
                Err(_) => {
                    let mut guard = self.lock.lock().unwrap();
                    while self.state.load(Ordering::Acquire) != DONE {
                        guard = self.cv.wait(guard).unwrap();
                    }
                }
            }
        }
        // SAFETY: DONE observed with Acquire; the slot was written before
        // the Release store and is never written again.
        unsafe { (*self.slot.get()).expect("forced promise without an outcome") }
    }
}

#[test]
fn loom_concurrent_forces_evaluate_once() {
    loom::model(|| {
        let promise = Arc::new(LoomPromise::new());

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let promise = Arc::clone(&promise);
                thread::spawn(move || promise.force())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 42);
        }
        assert_eq!(promise.runs.load(Ordering::SeqCst), 1);
    });
}

#[test]
fn loom_force_after_completion_is_a_pure_read() {
    loom::model(|| {
        let promise = Arc::new(LoomPromise::new());
        assert_eq!(promise.force(), 42);

        let reader = {
            let promise = Arc::clone(&promise);
            thread::spawn(move || promise.force())
        };
        assert_eq!(promise.force(), 42);
        assert_eq!(reader.join().unwrap(), 42);
        assert_eq!(promise.runs.load(Ordering::SeqCst), 1);
    });
}
