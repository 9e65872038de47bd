//! Inbound URL queue.
//!
//! # Responsibilities
//! - Wrap raw URL strings from event sources into `PendingUrl`s
//! - Push them onto the dispatcher queue without blocking the caller
//!
//! # Design Decisions
//! - Unbounded FIFO: event sources must never wait on routing or launching
//! - `UrlSink` is the only producer handle; it can be cloned into any thread

use tokio::sync::mpsc;
use uuid::Uuid;

/// A URL waiting for the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUrl {
    /// Correlates every log line for this URL.
    pub id: Uuid,
    pub url: String,
    /// Name of the event source that delivered it.
    pub source: &'static str,
}

impl PendingUrl {
    pub fn new(url: impl Into<String>, source: &'static str) -> Self {
        Self {
            id: Uuid::new_v4(),
            url: url.into(),
            source,
        }
    }
}

/// Producer handle for the dispatcher queue.
#[derive(Debug, Clone)]
pub struct UrlSink {
    tx: mpsc::UnboundedSender<PendingUrl>,
}

impl UrlSink {
    pub(crate) fn new(tx: mpsc::UnboundedSender<PendingUrl>) -> Self {
        Self { tx }
    }

    /// Queue `url` for routing. Never blocks.
    ///
    /// Surrounding whitespace is trimmed and blank input is dropped.
    /// Returns whether the URL was queued.
    pub fn submit(&self, url: impl AsRef<str>, source: &'static str) -> bool {
        let url = url.as_ref().trim();
        if url.is_empty() {
            tracing::debug!(source, "Ignoring blank URL");
            return false;
        }

        let pending = PendingUrl::new(url, source);
        let id = pending.id;
        match self.tx.send(pending) {
            Ok(()) => {
                tracing::debug!(%id, source, url, "URL queued");
                true
            }
            Err(_) => {
                tracing::warn!(source, url, "Dispatcher stopped, dropping URL");
                false
            }
        }
    }

    /// True once the dispatcher has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
