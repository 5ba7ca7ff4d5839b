//! Generation orchestrator
//!
//! Owns the live epoch and the pending selection and style. Each
//! `create_properties` call captures them into a [`GenerationJob`] and hands
//! it to a fresh worker thread. Workers abandon as soon as they observe a
//! newer epoch; results that still arrive late are dropped by the presenter's
//! final check, so only the most recent generation ever reaches the sheet.

use crate::dispatch::DeferredCommandQueue;
use crate::error::SheetError;
use crate::generation::epoch::{Epoch, LiveEpoch};
use crate::generation::events::{OrchestratorId, PropertiesCreated, SubscriptionId};
use crate::generation::job::{ActiveJobs, GenerationJob};
use crate::generation::presenter::{PresentedResult, Presenter, SheetSink};
use crate::generation::worker::{generate_properties, ControlBuilder, WorkerContext, WorkerOutcome};
use crate::selection::{Handle, SelectionSnapshot, Style};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Orchestrator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Style used until `set_style` is called
    #[serde(default)]
    pub default_style: Style,

    /// Worker threads are named `<prefix>-<epoch>`
    #[serde(default = "default_worker_name_prefix")]
    pub worker_name_prefix: String,

    /// Re-check the epoch between buckets, not only before building and posting
    #[serde(default = "default_true")]
    pub checkpoint_between_buckets: bool,
}

fn default_worker_name_prefix() -> String {
    "propsheet-gen".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            default_style: Style::default(),
            worker_name_prefix: default_worker_name_prefix(),
            checkpoint_between_buckets: default_true(),
        }
    }
}

impl OrchestratorConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.worker_name_prefix.trim().is_empty() {
            return Err("Worker name prefix cannot be empty".to_string());
        }
        if self.worker_name_prefix.contains('\0') {
            return Err("Worker name prefix cannot contain NUL bytes".to_string());
        }
        Ok(())
    }
}

/// Schedules property-sheet generation for the current selection.
///
/// Lives on the UI thread. Setters only record input; generation starts
/// with [`create_properties`](Self::create_properties).
pub struct GenerationOrchestrator {
    id: OrchestratorId,
    config: OrchestratorConfig,
    live_epoch: LiveEpoch,
    selection: Vec<Handle>,
    style: Style,
    dirty: bool,
    queue: Arc<DeferredCommandQueue>,
    builder: Arc<dyn ControlBuilder>,
    presenter: Arc<Presenter>,
    active: Arc<ActiveJobs>,
}

impl GenerationOrchestrator {
    pub fn new<S>(
        builder: Arc<dyn ControlBuilder>,
        queue: Arc<DeferredCommandQueue>,
        sink: S,
    ) -> Self
    where
        S: SheetSink + 'static,
    {
        Self::with_config(builder, queue, sink, OrchestratorConfig::default())
    }

    pub fn with_config<S>(
        builder: Arc<dyn ControlBuilder>,
        queue: Arc<DeferredCommandQueue>,
        sink: S,
        config: OrchestratorConfig,
    ) -> Self
    where
        S: SheetSink + 'static,
    {
        let id = OrchestratorId::next();
        let live_epoch = LiveEpoch::new();
        let presenter = Arc::new(Presenter::new(id, live_epoch.clone(), Box::new(sink)));
        Self {
            id,
            style: config.default_style,
            config,
            live_epoch,
            selection: Vec::new(),
            dirty: false,
            queue,
            builder,
            presenter,
            active: ActiveJobs::new(),
        }
    }

    pub fn set_selection<I>(&mut self, selection: I)
    where
        I: IntoIterator<Item = Handle>,
    {
        self.selection = selection.into_iter().collect();
        self.dirty = true;
    }

    pub fn set_style(&mut self, style: Style) {
        self.style = style;
        self.dirty = true;
    }

    /// Start generating a sheet for the pending selection and style.
    ///
    /// Returns the new epoch, or `None` if nothing changed since the last
    /// request. Never waits for the worker.
    pub fn create_properties(&mut self) -> Result<Option<Epoch>, SheetError> {
        if !self.dirty {
            return Ok(None);
        }

        let epoch = self.live_epoch.advance();
        let job = GenerationJob {
            epoch,
            snapshot: SelectionSnapshot::capture(&self.selection),
            style: self.style,
        };
        let guard = self.active.begin();
        let ctx = WorkerContext {
            live_epoch: self.live_epoch.clone(),
            builder: Arc::clone(&self.builder),
            queue: Arc::clone(&self.queue),
            presenter: Arc::clone(&self.presenter),
            checkpoint_between_buckets: self.config.checkpoint_between_buckets,
        };

        debug!(
            orchestrator = %self.id,
            epoch = %epoch,
            objects = job.snapshot.len(),
            style = %job.style,
            "Requested property generation"
        );

        // A failed spawn drops the closure, and with it the job guard.
        thread::Builder::new()
            .name(format!("{}-{}", self.config.worker_name_prefix, epoch))
            .spawn(move || {
                let _guard = guard;
                match generate_properties(job, &ctx) {
                    WorkerOutcome::Posted { fields } => {
                        debug!(epoch = %epoch, fields, "Posted property sheet");
                    }
                    WorkerOutcome::Stale(checkpoint) => {
                        debug!(epoch = %epoch, ?checkpoint, "Abandoned stale generation");
                    }
                    WorkerOutcome::Failed(err) => {
                        warn!(epoch = %epoch, error = %err, "Property generation failed");
                    }
                }
            })
            .map_err(SheetError::WorkerSpawn)?;

        self.dirty = false;
        Ok(Some(epoch))
    }

    /// True while any worker has neither posted nor abandoned.
    pub fn is_active(&self) -> bool {
        self.active.count() > 0
    }

    /// Block until every worker has posted or abandoned.
    ///
    /// Posted sheets may still sit in the queue; flush it to apply them.
    pub fn sync_threads(&self) {
        self.active.wait_idle();
    }

    /// Like [`sync_threads`](Self::sync_threads) with an upper bound.
    /// Returns false if workers were still running when it elapsed.
    pub fn sync_threads_for(&self, timeout: Duration) -> bool {
        self.active.wait_idle_for(timeout)
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&PropertiesCreated) + Send + Sync + 'static,
    {
        self.presenter.notifier().subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.presenter.notifier().unsubscribe(id)
    }

    pub fn presented(&self) -> Option<PresentedResult> {
        self.presenter.presented()
    }

    pub fn id(&self) -> OrchestratorId {
        self.id
    }

    pub fn live_epoch(&self) -> Epoch {
        self.live_epoch.current()
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn selection(&self) -> &[Handle] {
        &self.selection
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn queue(&self) -> &Arc<DeferredCommandQueue> {
        &self.queue
    }
}

impl Drop for GenerationOrchestrator {
    fn drop(&mut self) {
        // Anything still queued or in flight becomes stale.
        self.live_epoch.advance();
    }
}
