//! # Step Gate
//!
//! Pauses the worker thread at every guarded scanner call until the observer
//! lets it continue.
//!
//! ## State Machine
//!
//! ```text
//! Idle ──pause_and_publish──▶ AwaitingRelease ──release──▶ Released ──worker resumes──▶ Idle
//! ```
//!
//! * `release()` only acts on `AwaitingRelease`. In any other state it does
//!   nothing, so releases never carry over to a pause that has not started yet
//!   and two releases before the worker wakes count once.
//! * `cancel()` is sticky. A waiting worker wakes with
//!   [`StepError::SessionCancelled`] and every later pause fails the same way
//!   without blocking.
//! * The wait has no timeout; a human decides when to continue.
//! * An observer that panics inside `on_snapshot` leaves the gate `Idle`.
//!
//! All state sits behind one [`Mutex`] with one [`Condvar`]. The observer side
//! only ever takes the lock briefly and never waits on the condvar.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::{observer::Observer, snapshot::SessionSnapshot, StepError, StepResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum GateState {
    Idle,
    AwaitingRelease,
    Released,
}

#[derive(Debug)]
struct GateInner {
    state: GateState,
    cancelled: bool,
    pauses: u64,
}

#[derive(Debug)]
pub struct StepGate {
    inner: Mutex<GateInner>,
    condvar: Condvar,
}

impl Default for StepGate {
    fn default() -> Self {
        Self::new()
    }
}

impl StepGate {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(GateInner {
                state: GateState::Idle,
                cancelled: false,
                pauses: 0,
            }),
            condvar: Condvar::new(),
        }
    }

    /// Publishes `snapshot` to `observer` and blocks until released or cancelled.
    ///
    /// The gate is already `AwaitingRelease` when the observer receives the
    /// snapshot, so a release issued from inside `on_snapshot` is honoured.
    pub fn pause_and_publish<O: Observer + ?Sized>(
        &self,
        snapshot: SessionSnapshot,
        observer: &O,
    ) -> StepResult<()> {
        let step = snapshot.step;
        {
            let mut inner = self
                .condvar
                .wait_while(self.lock(), |inner| {
                    inner.state != GateState::Idle && !inner.cancelled
                })
                .unwrap_or_else(PoisonError::into_inner);
            if inner.cancelled {
                debug!(step, "pause rejected, session cancelled");
                return Err(StepError::SessionCancelled);
            }
            inner.state = GateState::AwaitingRelease;
            inner.pauses += 1;
        }

        debug!(step, "publishing snapshot");
        {
            let _unwind = ResetOnUnwind { gate: self, step };
            observer.on_snapshot(snapshot);
        }

        let mut inner = self
            .condvar
            .wait_while(self.lock(), |inner| {
                inner.state == GateState::AwaitingRelease && !inner.cancelled
            })
            .unwrap_or_else(PoisonError::into_inner);
        inner.state = GateState::Idle;
        // Wake anyone queued behind this pause.
        self.condvar.notify_all();
        if inner.cancelled {
            warn!(step, "pause aborted by cancel");
            return Err(StepError::SessionCancelled);
        }
        debug!(step, "resumed");
        Ok(())
    }

    /// Lets the outstanding pause continue. Returns whether a pause was released.
    pub fn release(&self) -> bool {
        let mut inner = self.lock();
        if inner.state != GateState::AwaitingRelease || inner.cancelled {
            debug!(state = %inner.state, "release ignored");
            return false;
        }
        inner.state = GateState::Released;
        self.condvar.notify_all();
        debug!("released");
        true
    }

    pub fn cancel(&self) {
        let mut inner = self.lock();
        if !inner.cancelled {
            inner.cancelled = true;
            debug!(state = %inner.state, "cancelled");
        }
        self.condvar.notify_all();
    }

    pub fn state(&self) -> GateState {
        self.lock().state
    }

    pub fn is_cancelled(&self) -> bool {
        self.lock().cancelled
    }

    /// Number of snapshots published so far.
    pub fn pause_count(&self) -> u64 {
        self.lock().pauses
    }

    fn lock(&self) -> MutexGuard<'_, GateInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Puts the gate back to `Idle` if the observer panics while a pause is published.
struct ResetOnUnwind<'a> {
    gate: &'a StepGate,
    step: u64,
}

impl Drop for ResetOnUnwind<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            warn!(step = self.step, "observer panicked, gate reset");
            self.gate.lock().state = GateState::Idle;
            self.gate.condvar.notify_all();
        }
    }
}
