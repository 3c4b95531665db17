//! Single callback context for completion callbacks.
//!
//! Requests run concurrently, but every completion for one client is pushed
//! onto one queue and run by one task, so callbacks never overlap.

use crate::types::Outcome;
use log::{debug, warn};
use std::panic::{catch_unwind, AssertUnwindSafe};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

/// Completion invoked with the outcome of one call.
pub type Callback = Box<dyn FnOnce(Outcome) + Send + 'static>;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Serializing executor for completion callbacks.
#[derive(Debug, Clone)]
pub struct CallbackContext {
    tx: mpsc::UnboundedSender<Job>,
}

impl CallbackContext {
    /// Start the draining task on `runtime`.
    pub fn spawn(runtime: &Handle) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();
        runtime.spawn(async move {
            while let Some(job) = rx.recv().await {
                run_guarded(job);
            }
            debug!("ZelloWork callback context stopped");
        });
        Self { tx }
    }

    /// Queue `callback(outcome)`. If the context is gone the callback runs
    /// inline so it is still delivered exactly once.
    pub fn deliver(&self, outcome: Outcome, callback: Callback) {
        let job: Job = Box::new(move || callback(outcome));
        if let Err(mpsc::error::SendError(job)) = self.tx.send(job) {
            warn!("ZelloWork callback context closed; delivering inline");
            run_guarded(job);
        }
    }
}

/// A panicking callback is logged and dropped; the queue keeps draining.
fn run_guarded(job: Job) {
    if catch_unwind(AssertUnwindSafe(job)).is_err() {
        warn!("ZelloWork callback panicked; continuing with the next one");
    }
}
