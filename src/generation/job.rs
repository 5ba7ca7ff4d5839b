//! Generation jobs and the active-job counter that `sync_threads` waits on.

use crate::generation::epoch::Epoch;
use crate::selection::{SelectionSnapshot, Style};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Inputs of one generation, captured when it is requested.
#[derive(Debug)]
pub struct GenerationJob {
    pub epoch: Epoch,
    pub snapshot: SelectionSnapshot,
    pub style: Style,
}

/// Number of workers that have not yet posted or abandoned.
#[derive(Debug, Default)]
pub(crate) struct ActiveJobs {
    count: Mutex<usize>,
    idle: Condvar,
}

impl ActiveJobs {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a job; the count drops again when the guard is dropped.
    pub(crate) fn begin(self: &Arc<Self>) -> JobGuard {
        *self.count.lock() += 1;
        JobGuard {
            jobs: Arc::clone(self),
        }
    }

    pub(crate) fn count(&self) -> usize {
        *self.count.lock()
    }

    pub(crate) fn wait_idle(&self) {
        let mut count = self.count.lock();
        while *count > 0 {
            self.idle.wait(&mut count);
        }
    }

    /// Returns false if jobs were still active when the timeout elapsed.
    pub(crate) fn wait_idle_for(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut count = self.count.lock();
        while *count > 0 {
            if self.idle.wait_until(&mut count, deadline).timed_out() {
                return *count == 0;
            }
        }
        true
    }

    fn finish(&self) {
        let mut count = self.count.lock();
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.idle.notify_all();
        }
    }
}

/// Held by a worker for its whole run, including unwinding.
pub(crate) struct JobGuard {
    jobs: Arc<ActiveJobs>,
}

impl Drop for JobGuard {
    fn drop(&mut self) {
        self.jobs.finish();
    }
}
