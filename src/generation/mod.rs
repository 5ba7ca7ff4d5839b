//! Generation domain: epochs, jobs, workers, presentation and notification.
//! The orchestrator drives it; the sheet domain supplies bucketing and merging.

pub mod epoch;
pub mod events;
pub mod job;
pub mod orchestrator;
pub mod presenter;
pub mod worker;

pub use epoch::{Epoch, LiveEpoch};
pub use events::{OrchestratorId, PropertiesCreated, SubscriptionId};
pub use job::GenerationJob;
pub use orchestrator::{GenerationOrchestrator, OrchestratorConfig};
pub use presenter::{NullSink, PresentOutcome, PresentedResult, SheetSink};
pub use worker::{Checkpoint, ControlBuilder, WorkerOutcome};
