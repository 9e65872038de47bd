//! The dispatch worker.
//!
//! # Responsibilities
//! - Drain the inbound queue strictly in arrival order
//! - Route each URL and launch (or fall back) one at a time
//! - Report failures per URL without stopping the loop
//!
//! # Design Decisions
//! - One consumer; each launch is awaited before the next URL is taken
//! - Launches run on the blocking pool so the runtime stays responsive
//! - Shutdown and the one-shot timeout only cancel waiting, never a launch

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::Instrument;

use crate::dispatch::outcome::{DispatchReport, OneShotOutcome, Processed};
use crate::dispatch::queue::{PendingUrl, UrlSink};
use crate::launcher::Launcher;
use crate::lifecycle::Shutdown;
use crate::routing::Router;

/// Serializes routing and launching for every queued URL.
pub struct Dispatcher {
    router: Router,
    launcher: Arc<Launcher>,
    rx: mpsc::UnboundedReceiver<PendingUrl>,
}

impl Dispatcher {
    /// Create the dispatcher and the producer handle for its queue.
    ///
    /// Taking a `Router` means the rules are compiled before any event
    /// source can be handed the sink.
    pub fn new(router: Router, launcher: Launcher) -> (Self, UrlSink) {
        let (tx, rx) = mpsc::unbounded_channel();
        let dispatcher = Self {
            router,
            launcher: Arc::new(launcher),
            rx,
        };
        (dispatcher, UrlSink::new(tx))
    }

    /// Process URLs until shutdown or until every sink is dropped.
    pub async fn run(mut self, shutdown: Shutdown) -> DispatchReport {
        let mut report = DispatchReport::default();
        let stop = shutdown.wait();
        tokio::pin!(stop);

        loop {
            tokio::select! {
                biased;
                _ = &mut stop => {
                    tracing::info!("Dispatcher received shutdown signal");
                    break;
                }
                next = self.rx.recv() => match next {
                    Some(pending) => report.record(self.process(pending).await),
                    None => {
                        tracing::info!("All URL sources closed");
                        break;
                    }
                },
            }
        }

        tracing::info!(
            delivered = report.delivered,
            skipped = report.skipped,
            failed = report.failed,
            "Dispatcher stopped"
        );
        report
    }

    /// Wait up to `timeout` for one URL and process it.
    pub async fn run_once(mut self, timeout: Duration) -> OneShotOutcome {
        let pending = match tokio::time::timeout(timeout, self.rx.recv()).await {
            Ok(Some(pending)) => pending,
            Ok(None) => {
                tracing::info!("URL sources closed before any URL arrived");
                return OneShotOutcome::TimedOut;
            }
            Err(_) => {
                tracing::info!(timeout_secs = timeout.as_secs_f64(), "No URL received before timeout");
                return OneShotOutcome::TimedOut;
            }
        };

        let outcome = OneShotOutcome::from(self.process(pending).await);

        let mut ignored = 0;
        while self.rx.try_recv().is_ok() {
            ignored += 1;
        }
        if ignored > 0 {
            tracing::warn!(ignored, "One-shot mode handles a single URL; ignoring the rest");
        }

        outcome
    }

    fn process(&self, pending: PendingUrl) -> impl Future<Output = Processed> + Send + 'static {
        let span = tracing::info_span!("dispatch", id = %pending.id, source = pending.source);
        let router = self.router.clone();
        let launcher = self.launcher.clone();

        async move {
            let decision = router.decide(&pending.url);
            tracing::info!(url = %pending.url, %decision, "Routing");

            let url = pending.url;
            let launch = tokio::task::spawn_blocking(move || match decision.profile {
                Some(profile) => launcher.open(&profile, &url).map(|()| Processed::Launched),
                None => launcher.fallback(&url).map(|used| {
                    if used {
                        Processed::FellBack
                    } else {
                        Processed::Skipped
                    }
                }),
            });

            match launch.await {
                Ok(Ok(processed)) => processed,
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "Failed to open URL");
                    Processed::Failed
                }
                Err(e) => {
                    tracing::error!(error = %e, "Launch task aborted");
                    Processed::Failed
                }
            }
        }
        .instrument(span)
    }
}
