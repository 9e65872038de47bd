//! URL event sources.
//!
//! # Data Flow
//! ```text
//! Command line    → args.rs   ┐
//! stdin lines     → lines.rs  ├→ UrlSink::submit → dispatcher queue
//! Unix socket     → socket.rs ┘
//!
//! Second instance:
//!     InstanceGuard::acquire → AlreadyRunning
//!     → socket::forward (hand URLs to the listener) → exit 0
//! ```
//!
//! # Design Decisions
//! - `start` returns promptly; long-lived sources own a thread or task
//! - Sources only enqueue, they never route or launch
//! - A source drops its sink when it runs dry, so the dispatcher can tell
//!   when every producer is gone

pub mod args;
pub mod lines;
#[cfg(unix)]
pub mod socket;

use crate::dispatch::UrlSink;

pub use args::ArgsSource;
pub use lines::LineSource;
#[cfg(unix)]
pub use socket::{forward, SocketSource};

/// Something that delivers URLs from outside the process.
pub trait UrlEventSource: Send {
    /// Short label recorded on every URL this source delivers.
    fn name(&self) -> &'static str;

    /// Begin delivering URLs into `sink`.
    fn start(self: Box<Self>, sink: UrlSink) -> std::io::Result<()>;
}

/// Start every source with its own clone of `sink`.
pub fn start_all(sources: Vec<Box<dyn UrlEventSource>>, sink: &UrlSink) -> std::io::Result<()> {
    for source in sources {
        let name = source.name();
        source.start(sink.clone())?;
        tracing::debug!(source = name, "URL source started");
    }
    Ok(())
}
