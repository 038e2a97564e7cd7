//! The commit-to-draft pipeline.
//!
//! # Module Structure
//!
//! - [`types`] - Configuration and results: `PipelineConfig`, `SyncOutcome`, `PipelineSnapshot`
//! - [`progress`] - Progress reporting: `SyncProgress`, `ProgressCallback`, `emit()`
//! - [`orchestrator`] - `SyncOrchestrator`: sync cycles, promotion, dismissal
//! - [`scheduler`] - Periodic triggering: `Scheduler`, `Ticker`, `run_auto_sync()`
//!
//! # Example
//!
//! ```ignore
//! use devlog::sync::{PipelineConfig, SyncOrchestrator, TokioScheduler, spawn_auto_sync};
//!
//! let orchestrator = Arc::new(SyncOrchestrator::open(client, store, config, settings).await?);
//! let outcome = orchestrator.trigger_sync().await;
//! let handle = spawn_auto_sync(Arc::clone(&orchestrator), TokioScheduler, shutdown_rx);
//! ```

pub mod orchestrator;
mod progress;
pub mod scheduler;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use orchestrator::SyncOrchestrator;
pub use progress::{ProgressCallback, SyncProgress, emit};
pub use scheduler::{
    IntervalTicker, ManualScheduler, ManualTicker, ManualTrigger, Scheduler, Ticker,
    TokioScheduler, run_auto_sync, spawn_auto_sync,
};
pub use types::{
    DEFAULT_FETCH_TIMEOUT, PipelineConfig, PipelineSnapshot, SyncOutcome, SyncReport,
};
