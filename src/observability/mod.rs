//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!
//! Consumers:
//!     → stderr
//!     → optional log file
//! ```
//!
//! # Design Decisions
//! - Every routed URL carries a dispatch ID span for correlation
//! - One info line per routing decision, one error line per failed launch

pub mod logging;
