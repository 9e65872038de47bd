//! Shared utilities for integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use profile_router::config::{LaunchStyle, RuleConfig, UnknownUrlStrategy};
use profile_router::dispatch::{Dispatcher, UrlSink};
use profile_router::launcher::{LaunchError, Launcher, ProcessSpawner};
use profile_router::routing::{RuleSet, Router};

/// One recorded launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launch {
    pub program: String,
    pub args: Vec<String>,
}

impl Launch {
    pub fn url(&self) -> &str {
        self.args.last().map(String::as_str).unwrap_or_default()
    }

    #[allow(dead_code)]
    pub fn profile(&self) -> Option<&str> {
        self.args
            .iter()
            .find_map(|a| a.strip_prefix("--profile-directory="))
    }
}

/// Spawner that records launches instead of starting processes.
///
/// Tracks how many launches are in flight at once and can be told to fail
/// or to take a while.
#[derive(Debug, Default)]
pub struct MockSpawner {
    launches: Mutex<Vec<Launch>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Option<Duration>,
    fail_when_contains: Option<String>,
}

impl MockSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    #[allow(dead_code)]
    pub fn failing_on(mut self, needle: &str) -> Self {
        self.fail_when_contains = Some(needle.to_string());
        self
    }

    pub fn launches(&self) -> Vec<Launch> {
        self.launches.lock().unwrap().clone()
    }

    #[allow(dead_code)]
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl ProcessSpawner for MockSpawner {
    fn spawn(&self, program: &str, args: &[String]) -> Result<(), LaunchError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        let launch = Launch {
            program: program.to_string(),
            args: args.to_vec(),
        };
        let failed = self
            .fail_when_contains
            .as_deref()
            .is_some_and(|needle| launch.url().contains(needle));
        self.launches.lock().unwrap().push(launch);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if failed {
            Err(LaunchError::ExitStatus {
                program: program.to_string(),
                status: "exit status: 1".to_string(),
                stderr: "simulated failure".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

/// Dispatcher over `rules` that launches through `spawner`.
#[allow(dead_code)]
pub fn dispatcher(
    rules: &[(&str, &str)],
    strategy: UnknownUrlStrategy,
    spawner: Arc<MockSpawner>,
) -> (Dispatcher, UrlSink) {
    let rules: Vec<RuleConfig> = rules.iter().map(|(p, d)| RuleConfig::new(*p, *d)).collect();
    let rule_set = RuleSet::compile(&rules, "Default", strategy).unwrap();
    let launcher = Launcher::new("chrome", LaunchStyle::Direct, spawner);
    Dispatcher::new(Router::new(rule_set), launcher)
}
