//! Deferred command queue
//!
//! Thread-safe FIFO of deferred actions drained only by the thread that owns
//! the UI. Any thread may post; draining happens when the owner calls
//! [`DeferredCommandQueue::flush`], which it schedules in response to the
//! injected [`FlushScheduler`].

use crate::error::CommandError;
use parking_lot::Mutex;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use tracing::{debug, error};

/// A queued action; invoked exactly once by a flush.
pub type DeferredCommand = Box<dyn FnOnce() -> Result<(), CommandError> + Send + 'static>;

/// Strategy used by the queue to ask its owner for a flush.
///
/// Called on the empty to non-empty transition only, from whichever thread
/// posted. Implementations must not block; they schedule a later call to
/// `flush` on the owning thread (idle callback, timer, explicit pump).
pub trait FlushScheduler: Send + Sync {
    fn request_flush(&self);
}

impl<F> FlushScheduler for F
where
    F: Fn() + Send + Sync,
{
    fn request_flush(&self) {
        self()
    }
}

/// Scheduler that signals a channel; the owning loop blocks on the receiver.
#[derive(Clone)]
pub struct FlushSignal {
    sender: Sender<()>,
}

impl FlushSignal {
    pub fn new_pair() -> (Self, Receiver<()>) {
        let (sender, receiver) = channel();
        (Self { sender }, receiver)
    }
}

impl FlushScheduler for FlushSignal {
    fn request_flush(&self) {
        if self.sender.send(()).is_err() {
            debug!("Flush receiver dropped, flush request ignored");
        }
    }
}

/// Outcome of one flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Commands invoked in this flush, including failed ones.
    pub executed: usize,
    /// Commands that returned an error or panicked.
    pub failed: usize,
}

pub struct DeferredCommandQueue {
    pending: Mutex<Vec<DeferredCommand>>,
    scheduler: Arc<dyn FlushScheduler>,
}

impl DeferredCommandQueue {
    pub fn new<S>(scheduler: S) -> Self
    where
        S: FlushScheduler + 'static,
    {
        Self::with_shared_scheduler(Arc::new(scheduler))
    }

    pub fn with_shared_scheduler(scheduler: Arc<dyn FlushScheduler>) -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
            scheduler,
        }
    }

    /// Enqueue a command. Never waits on running commands.
    pub fn post<F>(&self, command: F)
    where
        F: FnOnce() -> Result<(), CommandError> + Send + 'static,
    {
        let was_empty = {
            let mut pending = self.pending.lock();
            let was_empty = pending.is_empty();
            pending.push(Box::new(command));
            was_empty
        };

        if was_empty {
            self.scheduler.request_flush();
        }
    }

    /// Run every command queued so far, in post order.
    ///
    /// Commands posted while this flush runs are left for the next flush.
    pub fn flush(&self) -> FlushReport {
        let batch = std::mem::take(&mut *self.pending.lock());
        let mut report = FlushReport::default();

        for (position, command) in batch.into_iter().enumerate() {
            report.executed += 1;
            let failure = match catch_unwind(AssertUnwindSafe(command)) {
                Ok(Ok(())) => None,
                Ok(Err(err)) => Some(err),
                Err(payload) => Some(CommandError::Panicked(panic_message(payload.as_ref()))),
            };
            if let Some(err) = failure {
                report.failed += 1;
                error!(position, error = %err, "Deferred command failed");
            }
        }

        if report.executed > 0 {
            debug!(
                executed = report.executed,
                failed = report.failed,
                "Flushed deferred commands"
            );
        }
        report
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
