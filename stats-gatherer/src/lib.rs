//! # WordPress.org Support Stats Gatherer
//!
//! Logs into the support forums, scrapes aggregate counters from four admin pages and appends a timestamped
//! row to an append-only CSV log.
//!
//! ## Architecture
//!
//! - **`session`**: cookie-carrying HTTP session, one per collection cycle
//! - **`extract`**: per-page counter extraction strategies
//! - **`snapshot`**: assembles the fixed 17-column row
//! - **`stats_log`**: durable, whole-row appends to the CSV log
//! - **`scheduler`**: initial run plus cadence-driven repetition, cancellable
//! - **`pipeline`**: `StatsJob`, tying one cycle together

#[macro_use]
extern crate tracing;

pub mod endpoints;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod scheduler;
pub mod session;
pub mod snapshot;
pub mod stats_log;

pub use endpoints::Endpoints;
pub use error::CollectError;
pub use extract::{
    CounterBundle,
    ExtractionStrategy,
    Extractors,
    PageKind,
    PatternExtractor,
};
pub use pipeline::StatsJob;
pub use scheduler::{
    Scheduler,
    TickOutcome,
};
pub use session::{
    PageFetcher,
    Session,
};
pub use snapshot::SnapshotRecord;
pub use stats_log::StatsLog;
