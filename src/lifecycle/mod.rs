//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Compile rules → Build router/launcher
//!
//! Single instance (instance.rs):
//!     Acquire pid file → (AlreadyRunning → forward & exit 0)
//!     → run dispatcher → release on drop
//!
//! Shutdown (shutdown.rs):
//!     Signal received → stop sources → stop dispatcher → release pid file
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config and rules first, then the pid file, then sources
//! - No URL is accepted before the rule set exists

pub mod instance;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use instance::{InstanceError, InstanceGuard};
pub use shutdown::Shutdown;
pub use startup::{Prepared, StartupError};
