//! Presentation: the UI-thread side of a generation, run from inside a flush.

use crate::generation::epoch::{Epoch, LiveEpoch};
use crate::generation::events::{OrchestratorId, PropertiesCreated, PropertiesCreatedNotifier};
use crate::sheet::ControlSet;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info};

/// Receiver of finished sheets: the widget tree of the property panel.
///
/// Only ever called from inside `DeferredCommandQueue::flush`, after the
/// sheet has been recorded as presented. The presenter holds no lock a sink
/// can reach except the sink itself, so `apply` may read the presented
/// result but must not flush the queue again.
pub trait SheetSink: Send {
    fn apply(&mut self, controls: &ControlSet);
}

impl<F> SheetSink for F
where
    F: FnMut(&ControlSet) + Send,
{
    fn apply(&mut self, controls: &ControlSet) {
        self(controls)
    }
}

/// Sink for hosts that only observe notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl SheetSink for NullSink {
    fn apply(&mut self, _controls: &ControlSet) {}
}

/// The sheet currently shown and the epoch it belongs to.
#[derive(Debug, Clone)]
pub struct PresentedResult {
    pub epoch: Epoch,
    pub controls: Arc<ControlSet>,
    pub presented_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentOutcome {
    Presented,
    Stale,
}

pub(crate) struct Presenter {
    orchestrator: OrchestratorId,
    live_epoch: LiveEpoch,
    sink: Mutex<Box<dyn SheetSink>>,
    presented: Mutex<Option<PresentedResult>>,
    notifier: PropertiesCreatedNotifier,
}

impl Presenter {
    pub(crate) fn new(
        orchestrator: OrchestratorId,
        live_epoch: LiveEpoch,
        sink: Box<dyn SheetSink>,
    ) -> Self {
        Self {
            orchestrator,
            live_epoch,
            sink: Mutex::new(sink),
            presented: Mutex::new(None),
            notifier: PropertiesCreatedNotifier::default(),
        }
    }

    pub(crate) fn notifier(&self) -> &PropertiesCreatedNotifier {
        &self.notifier
    }

    pub(crate) fn presented(&self) -> Option<PresentedResult> {
        self.presented.lock().clone()
    }

    /// Apply a finished sheet unless a newer generation was requested since.
    pub(crate) fn present(&self, epoch: Epoch, controls: ControlSet) -> PresentOutcome {
        let live = self.live_epoch.current();
        if live != epoch {
            debug!(
                orchestrator = %self.orchestrator,
                epoch = %epoch,
                live = %live,
                "Discarding stale property sheet"
            );
            return PresentOutcome::Stale;
        }

        let controls = Arc::new(controls);
        let presented_at = Utc::now();
        *self.presented.lock() = Some(PresentedResult {
            epoch,
            controls: Arc::clone(&controls),
            presented_at,
        });
        self.sink.lock().apply(&controls);

        info!(
            orchestrator = %self.orchestrator,
            epoch = %epoch,
            fields = controls.len(),
            "Presented property sheet"
        );
        self.notifier.notify(&PropertiesCreated {
            orchestrator: self.orchestrator,
            epoch,
            controls,
            presented_at,
        });
        PresentOutcome::Presented
    }
}
