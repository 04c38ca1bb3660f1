//! # Observer Port
//!
//! The display side of a session. It receives one [`SessionSnapshot`] per pause
//! through [`Observer::on_snapshot`] and answers through an [`ObserverHandle`]
//! with `release()` or `cancel()`. Neither side of this port blocks the
//! observer.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tokio::sync::mpsc;
use tracing::warn;

use crate::{
    gate::{GateState, StepGate},
    snapshot::SessionSnapshot,
};

/// Receives snapshots at every pause.
///
/// `on_snapshot` runs on the worker thread while the gate is waiting for a
/// release; it must return quickly and must not wait for the release itself.
pub trait Observer: Send + Sync {
    fn on_snapshot(&self, snapshot: SessionSnapshot);

    /// Whether snapshots should carry token spans.
    fn wants_highlighting(&self) -> bool {
        false
    }
}

impl<F> Observer for F
where
    F: Fn(SessionSnapshot) + Send + Sync,
{
    fn on_snapshot(&self, snapshot: SessionSnapshot) {
        self(snapshot)
    }
}

/// Signals from the display into a running session. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ObserverHandle {
    gate: Arc<StepGate>,
}

impl ObserverHandle {
    pub(crate) fn new(gate: Arc<StepGate>) -> Self {
        Self { gate }
    }

    /// Permits the pending step. Does nothing when no step is pending.
    pub fn release(&self) -> bool {
        self.gate.release()
    }

    /// Ends the session; the pending and all later steps fail.
    pub fn cancel(&self) {
        self.gate.cancel()
    }

    pub fn is_cancelled(&self) -> bool {
        self.gate.is_cancelled()
    }

    pub fn state(&self) -> GateState {
        self.gate.state()
    }

    pub fn pause_count(&self) -> u64 {
        self.gate.pause_count()
    }
}

/// Forwards snapshots over an unbounded channel to an async display task.
///
/// Clones share the highlighting toggle, so the display can keep one clone and
/// flip highlighting while the session owns another.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    sender: mpsc::UnboundedSender<SessionSnapshot>,
    highlight: Arc<AtomicBool>,
}

impl ChannelObserver {
    pub fn new(highlight: bool) -> (Self, mpsc::UnboundedReceiver<SessionSnapshot>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                sender,
                highlight: Arc::new(AtomicBool::new(highlight)),
            },
            receiver,
        )
    }

    pub fn set_highlighting(&self, enabled: bool) {
        self.highlight.store(enabled, Ordering::Release);
    }
}

impl Observer for ChannelObserver {
    fn on_snapshot(&self, snapshot: SessionSnapshot) {
        let step = snapshot.step;
        if self.sender.send(snapshot).is_err() {
            warn!(step, "snapshot dropped, display receiver is closed");
        }
    }

    fn wants_highlighting(&self) -> bool {
        self.highlight.load(Ordering::Acquire)
    }
}
