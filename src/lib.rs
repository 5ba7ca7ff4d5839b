//! Propsheet: background property-sheet generation for object editors
//!
//! Builds the property sheet for the current selection off the UI thread.
//! Requests are versioned by epoch so superseded work is abandoned, and
//! finished sheets come back to the UI thread through a deferred command
//! queue that only the UI thread drains.

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod generation;
pub mod logging;
pub mod schema;
pub mod selection;
pub mod sheet;
