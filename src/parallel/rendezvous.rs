//! Reusable N-party barrier
//!
//! `Rendezvous::new(n)` creates a barrier for `n` participants. Each call to
//! `wait` blocks until `n` calls are waiting, then releases all of them at
//! once; exactly one of those calls is told it was the releaser. The barrier
//! resets itself and can be reused for the next round immediately. Resources
//! are released on drop.
//!
//! `abandon` breaks the barrier for good: current and future waiters return
//! at once. A participant that is unwinding uses it so the others are not
//! left waiting for an arrival that will never come.

use std::sync::{Condvar, Mutex, PoisonError};

use crate::error::{NbodyError, Result};

#[derive(Debug)]
pub struct Rendezvous {
    state: Mutex<State>,
    cvar: Condvar,
    trip_count: usize,
}

#[derive(Debug)]
struct State {
    count: usize,     // arrivals in the current generation
    generation: u64,  // bumped every time the barrier trips
    abandoned: bool,  // set once, never cleared
}

/// Outcome of [`Rendezvous::wait`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RendezvousResult(bool);

impl RendezvousResult {
    /// True for exactly one participant per trip: the one whose arrival
    /// released the others
    pub fn is_releaser(&self) -> bool {
        self.0
    }
}

impl Rendezvous {
    pub fn new(trip_count: usize) -> Result<Self> {
        if trip_count == 0 {
            return Err(NbodyError::validation("rendezvous trip count must be positive"));
        }
        Ok(Self {
            state: Mutex::new(State {
                count: 0,
                generation: 0,
                abandoned: false,
            }),
            cvar: Condvar::new(),
            trip_count,
        })
    }

    pub fn trip_count(&self) -> usize {
        self.trip_count
    }

    /// Block until `trip_count` participants have arrived
    pub fn wait(&self) -> RendezvousResult {
        // a panicking participant cannot leave State half-updated
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.abandoned {
            return RendezvousResult(false);
        }
        let generation = state.generation;
        state.count += 1;

        if state.count >= self.trip_count {
            state.count = 0;
            state.generation = state.generation.wrapping_add(1);
            self.cvar.notify_all();
            return RendezvousResult(true);
        }

        // loop guards against spurious wakeups
        while state.generation == generation && !state.abandoned {
            state = self.cvar.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
        RendezvousResult(false)
    }

    /// Release every waiter now and make all later `wait` calls return
    /// immediately
    pub fn abandon(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.abandoned = true;
        self.cvar.notify_all();
    }

    pub fn is_abandoned(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .abandoned
    }
}
