//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Event sources (any thread/task)
//!     → queue.rs (UrlSink::submit, unbounded FIFO, never blocks)
//!     → dispatcher.rs (single worker)
//!         → Router::decide
//!         → Launcher::open / Launcher::fallback (one at a time)
//!     → outcome.rs (per-URL result, exit code)
//! ```
//!
//! # Design Decisions
//! - Exactly one consumer, so browser launches never race for a profile
//! - Two modes: long-running `run` and one-shot `run_once`
//! - A failed launch is logged and counted; the loop keeps going

pub mod dispatcher;
pub mod outcome;
pub mod queue;

pub use dispatcher::Dispatcher;
pub use outcome::{DispatchReport, ExitStatus, OneShotOutcome, Processed};
pub use queue::{PendingUrl, UrlSink};
