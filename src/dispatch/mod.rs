//! Dispatch domain: the deferred command queue that carries work back onto the
//! UI-owning thread.

pub mod queue;

pub use queue::{DeferredCommand, DeferredCommandQueue, FlushReport, FlushScheduler, FlushSignal};
