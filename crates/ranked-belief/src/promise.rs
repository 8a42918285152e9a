use crate::backoff::Backoff;
use crate::error::RankingError;
use std::any::Any;
use std::cell::UnsafeCell;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Condvar, Mutex, PoisonError};

// =============================================================================
// STATE MACHINE & SYNCHRONIZATION STRATEGY
// =============================================================================
//
// A promise moves through exactly one of two paths:
//
//   UNFORCED --CAS--> RUNNING --store--> DONE        (thunk evaluated once)
//   DONE at construction                             (`Promise::ready`)
//
// ## Slot ownership
//
// The two `UnsafeCell` slots are accessed without locks because the state
// machine gives each of them a single writer:
// - `thunk`: written at construction, taken exactly once by the thread that
//   wins the UNFORCED -> RUNNING compare-exchange.
// - `outcome`: written exactly once by the RUNNING thread, strictly before
//   the Release store of DONE. After DONE it is never written again, so any
//   number of readers may hold shared references into it.
//
// ## Memory ordering protocol
//
// The runner publishes with `state.store(DONE, Release)`; every reader first
// observes DONE with an Acquire load, which makes the outcome write visible.
// The DONE store happens while holding `lock`, so a waiter that checked the
// state under the same lock cannot miss the wakeup that follows.
//
// ## Waiting
//
// Losers of the force race spin briefly (short thunks finish in nanoseconds)
// and then park on the condvar. There is no cancellation: a consumer that
// loses interest drops its reference; an in-flight thunk simply completes
// unobserved.
//
// =============================================================================

/// Deferred computation stored in an unforced promise.
type Thunk<T> = Box<dyn FnOnce() -> Result<T, RankingError> + Send>;

const UNFORCED: u8 = 0;
const RUNNING: u8 = 1;
const DONE: u8 = 2;

/// One-shot, thread-safe memoized deferred computation.
///
/// Forcing evaluates the thunk at most once across all threads; every
/// caller then observes the identical cached outcome. A thunk that fails,
/// by returning an error or by panicking, caches the failure, and every
/// later force returns the same error again. This keeps a ranking
/// referentially transparent: it yields the same values and the same
/// failures no matter which thread walks it, or how often.
///
/// Promises are not clonable; shared access goes through the reference
/// count of the element that owns them.
pub struct Promise<T: 'static> {
    state: AtomicU8,
    /// Present only while UNFORCED; taken by the CAS winner.
    thunk: UnsafeCell<Option<Thunk<T>>>,
    /// Written once by the RUNNING thread before DONE is published.
    outcome: UnsafeCell<Option<Result<T, RankingError>>>,
    /// Parking lot for waiters that lose the force race.
    lock: Mutex<()>,
    cv: Condvar,
}

// SAFETY: the state machine above gives every UnsafeCell slot a single
// writer, and the Release/Acquire pair on `state` publishes the outcome
// before any shared read. The thunk is `Send`, so it may run on whichever
// thread wins the race.
unsafe impl<T: Send> Send for Promise<T> {}
unsafe impl<T: Send + Sync> Sync for Promise<T> {}

impl<T> Promise<T> {
    /// Creates an unforced promise around a deferred computation.
    pub fn new<F>(thunk: F) -> Self
    where
        F: FnOnce() -> Result<T, RankingError> + Send + 'static,
    {
        Self {
            state: AtomicU8::new(UNFORCED),
            thunk: UnsafeCell::new(Some(Box::new(thunk))),
            outcome: UnsafeCell::new(None),
            lock: Mutex::new(()),
            cv: Condvar::new(),
        }
    }

    /// Creates a promise that starts in the forced state.
    pub fn ready(value: T) -> Self {
        Self {
            state: AtomicU8::new(DONE),
            thunk: UnsafeCell::new(None),
            outcome: UnsafeCell::new(Some(Ok(value))),
            lock: Mutex::new(()),
            cv: Condvar::new(),
        }
    }

    /// Whether the promise has already been forced.
    ///
    /// Useful for laziness assertions; never blocks.
    #[inline]
    pub fn is_forced(&self) -> bool {
        self.state.load(Ordering::Acquire) == DONE
    }

    /// Forces the promise.
    ///
    /// The first caller across all threads evaluates the thunk; concurrent
    /// callers block until that evaluation completes. Every caller then
    /// sees the same outcome: a shared reference to the cached value, or a
    /// clone of the cached error.
    pub fn force(&self) -> Result<&T, RankingError> {
        if self.state.load(Ordering::Acquire) != DONE {
            self.run_or_wait();
        }
        // SAFETY: DONE was observed with Acquire ordering, so the outcome
        // write by the runner is visible, and the slot is never written
        // again.
        match unsafe { (*self.outcome.get()).as_ref() } {
            Some(Ok(value)) => Ok(value),
            Some(Err(err)) => Err(err.clone()),
            None => Err(RankingError::Internal(
                "promise reached the done state without an outcome",
            )),
        }
    }

    fn run_or_wait(&self) {
        match self
            .state
            .compare_exchange(UNFORCED, RUNNING, Ordering::Acquire, Ordering::Acquire)
        {
            Ok(_) => self.run(),
            Err(observed) if observed == DONE => {}
            Err(_) => self.wait(),
        }
    }

    fn run(&self) {
        // SAFETY: winning the CAS grants exclusive access to the thunk slot.
        let thunk = unsafe { (*self.thunk.get()).take() };
        let outcome = match thunk {
            Some(thunk) => evaluate(thunk),
            None => Err(RankingError::Internal("unforced promise without a thunk")),
        };
        // SAFETY: only the RUNNING thread writes the outcome slot, before
        // DONE is published below.
        unsafe { *self.outcome.get() = Some(outcome) };

        // Publish under the lock so a parked waiter cannot check the state
        // and then miss the notification.
        let guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.state.store(DONE, Ordering::Release);
        drop(guard);
        self.cv.notify_all();
    }

    fn wait(&self) {
        let mut backoff = Backoff::new();
        while !backoff.should_park() {
            if self.state.load(Ordering::Acquire) == DONE {
                return;
            }
            backoff.snooze();
        }
        let mut guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        while self.state.load(Ordering::Acquire) != DONE {
            guard = self
                .cv
                .wait(guard)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

fn evaluate<T>(thunk: Thunk<T>) -> Result<T, RankingError> {
    match catch_unwind(AssertUnwindSafe(thunk)) {
        Ok(outcome) => outcome,
        Err(payload) => Err(RankingError::Callback {
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "callback panicked".to_string()
    }
}

impl<T: fmt::Debug> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_forced() {
            // SAFETY: DONE observed with Acquire; the slot is read-only now.
            match unsafe { (*self.outcome.get()).as_ref() } {
                Some(Ok(value)) => write!(f, "Promise({value:?})"),
                Some(Err(err)) => write!(f, "Promise(<failed: {err}>)"),
                None => f.write_str("Promise(<corrupt>)"),
            }
        } else {
            f.write_str("Promise(<pending>)")
        }
    }
}
