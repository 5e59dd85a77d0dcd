//! Send/close coordination for a single subscriber queue
//!
//! Every broadcast send holds a [`SendPermit`] for its whole duration.
//! Closing a queue first stops admitting permits, then waits until the
//! ones already handed out are released. Only then may the queue's sender
//! be dropped, so no send ever targets a closed queue.
//!
//! ```text
//!   broadcast task                     unsubscribe / close
//!   ──────────────                     ───────────────────
//!   in_flight += 1                     closing = true
//!   closing? ── yes ─► in_flight -= 1  in_flight == 0? ── no ─► wait(drained)
//!      │ no                                  │ yes
//!   send_timeout(..)                       drop sender
//!   in_flight -= 1 ─► notify(drained)
//! ```

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::sync::Notify;

/// In-flight send counter plus wakeup for a single queue
#[derive(Debug, Default)]
pub(crate) struct SendGate {
    in_flight: AtomicUsize,
    closing: AtomicBool,
    drained: Notify,
}

impl SendGate {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register a send. Returns `None` once the gate is shutting.
    ///
    /// The counter is bumped before `closing` is checked; `shut` does the
    /// reverse. With sequentially consistent ordering at least one side
    /// observes the other.
    pub(crate) fn enter(&self) -> Option<SendPermit<'_>> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);

        if self.closing.load(Ordering::SeqCst) {
            self.release();
            return None;
        }

        Some(SendPermit { gate: self })
    }

    /// Stop admitting sends and wait until every outstanding permit is dropped
    pub(crate) async fn shut(&self) {
        self.closing.store(true, Ordering::SeqCst);

        loop {
            let notified = self.drained.notified();
            tokio::pin!(notified);
            // Register interest before checking so a release in between is not lost
            notified.as_mut().enable();

            if self.in_flight.load(Ordering::SeqCst) == 0 {
                return;
            }

            notified.await;
        }
    }

    /// Number of sends currently holding a permit
    pub(crate) fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    fn release(&self) {
        if self.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.drained.notify_waiters();
        }
    }
}

/// Proof that a send is in flight; released on drop on every path,
/// including task abort.
#[derive(Debug)]
pub(crate) struct SendPermit<'a> {
    gate: &'a SendGate,
}

impl Drop for SendPermit<'_> {
    fn drop(&mut self) {
        self.gate.release();
    }
}
