//! Worker side of a generation: bucket, build, merge, and post if still current.

use crate::dispatch::queue::{panic_message, DeferredCommandQueue};
use crate::error::GenerationError;
use crate::generation::epoch::LiveEpoch;
use crate::generation::job::GenerationJob;
use crate::generation::presenter::Presenter;
use crate::selection::Handle;
use crate::sheet::{bucket, ControlSet, TypeBucketKey};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, warn};

/// Builds the controls for one bucket of same-typed objects.
///
/// Called from worker threads. Implementations read the bound objects and
/// decide per field whether their values agree.
pub trait ControlBuilder: Send + Sync {
    fn build_controls(
        &self,
        key: &TypeBucketKey,
        handles: &[Handle],
    ) -> Result<ControlSet, GenerationError>;
}

/// Where a stale job noticed it was superseded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    BeforeBuild,
    BetweenBuckets,
    BeforePost,
}

#[derive(Debug)]
pub enum WorkerOutcome {
    Posted { fields: usize },
    Stale(Checkpoint),
    Failed(GenerationError),
}

/// Everything a worker shares with the orchestrator.
#[derive(Clone)]
pub(crate) struct WorkerContext {
    pub(crate) live_epoch: LiveEpoch,
    pub(crate) builder: Arc<dyn ControlBuilder>,
    pub(crate) queue: Arc<DeferredCommandQueue>,
    pub(crate) presenter: Arc<Presenter>,
    pub(crate) checkpoint_between_buckets: bool,
}

pub(crate) fn generate_properties(job: GenerationJob, ctx: &WorkerContext) -> WorkerOutcome {
    let GenerationJob {
        epoch,
        snapshot,
        style,
    } = job;

    if !ctx.live_epoch.is_current(epoch) {
        return WorkerOutcome::Stale(Checkpoint::BeforeBuild);
    }

    let buckets = bucket(&snapshot);
    debug!(
        epoch = %epoch,
        objects = snapshot.len(),
        buckets = buckets.len(),
        style = %style,
        "Generating property sheet"
    );

    let mut sets = Vec::with_capacity(buckets.len());
    for (index, (key, handles)) in buckets.iter().enumerate() {
        if index > 0 && ctx.checkpoint_between_buckets && !ctx.live_epoch.is_current(epoch) {
            return WorkerOutcome::Stale(Checkpoint::BetweenBuckets);
        }
        match build_bucket(ctx.builder.as_ref(), key, handles) {
            Ok(set) => sets.push(set),
            Err(err) => return WorkerOutcome::Failed(err),
        }
    }

    let controls = ControlSet::merge(sets, style);

    if !ctx.live_epoch.is_current(epoch) {
        return WorkerOutcome::Stale(Checkpoint::BeforePost);
    }

    let fields = controls.len();
    let presenter = Arc::clone(&ctx.presenter);
    ctx.queue.post(move || {
        presenter.present(epoch, controls);
        Ok(())
    });
    WorkerOutcome::Posted { fields }
}

fn build_bucket(
    builder: &dyn ControlBuilder,
    key: &TypeBucketKey,
    handles: &[Handle],
) -> Result<ControlSet, GenerationError> {
    match catch_unwind(AssertUnwindSafe(|| builder.build_controls(key, handles))) {
        Ok(result) => result,
        Err(payload) => {
            warn!(
                bucket = %key,
                panic = %panic_message(payload.as_ref()),
                "Control builder panicked"
            );
            Err(GenerationError::BuilderPanicked(key.to_string()))
        }
    }
}
