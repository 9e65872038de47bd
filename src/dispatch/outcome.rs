//! Results of dispatching and the exit codes they map to.

use std::fmt;

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitStatus {
    /// URL delivered, nothing to do, or another instance is running.
    Success = 0,
    /// No URL arrived within the one-shot timeout.
    NoUrl = 1,
    /// Configuration, rule or pid file problem.
    ConfigError = 2,
    /// At least one launch failed.
    LaunchFailed = 3,
}

impl From<ExitStatus> for std::process::ExitCode {
    fn from(status: ExitStatus) -> Self {
        std::process::ExitCode::from(status as u8)
    }
}

/// What happened to a single URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Processed {
    /// Browser started with the chosen profile.
    Launched,
    /// No rule matched; handed to the fallback browser.
    FellBack,
    /// No rule matched and no fallback is configured.
    Skipped,
    /// Launch failed; already logged.
    Failed,
}

/// Tally of a long-running dispatch loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl DispatchReport {
    pub fn record(&mut self, processed: Processed) {
        match processed {
            Processed::Launched | Processed::FellBack => self.delivered += 1,
            Processed::Skipped => self.skipped += 1,
            Processed::Failed => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.delivered + self.skipped + self.failed
    }

    pub fn exit_status(&self) -> ExitStatus {
        if self.failed > 0 {
            ExitStatus::LaunchFailed
        } else {
            ExitStatus::Success
        }
    }
}

impl fmt::Display for DispatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} delivered, {} left to the system, {} failed",
            self.delivered, self.skipped, self.failed
        )
    }
}

/// Result of one-shot mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OneShotOutcome {
    Delivered,
    NoInterference,
    TimedOut,
    LaunchFailed,
}

impl OneShotOutcome {
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            OneShotOutcome::Delivered | OneShotOutcome::NoInterference => ExitStatus::Success,
            OneShotOutcome::TimedOut => ExitStatus::NoUrl,
            OneShotOutcome::LaunchFailed => ExitStatus::LaunchFailed,
        }
    }
}

impl From<Processed> for OneShotOutcome {
    fn from(processed: Processed) -> Self {
        match processed {
            Processed::Launched | Processed::FellBack => OneShotOutcome::Delivered,
            Processed::Skipped => OneShotOutcome::NoInterference,
            Processed::Failed => OneShotOutcome::LaunchFailed,
        }
    }
}
