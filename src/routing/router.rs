//! Routing decisions.
//!
//! # Responsibilities
//! - Look up the first matching rule for a URL
//! - Apply the unknown-URL strategy when nothing matches
//! - Return an explicit "no interference" decision instead of a silent default
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Router is a cheap handle over `Arc<RuleSet>`

use std::fmt;
use std::sync::Arc;

use crate::config::UnknownUrlStrategy;
use crate::routing::matcher::RuleSet;

/// Where a URL should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingDecision {
    /// `None` leaves the URL to the system. `Some("")` launches the browser
    /// without selecting a profile.
    pub profile: Option<String>,
}

impl RoutingDecision {
    pub fn launch(profile: impl Into<String>) -> Self {
        Self {
            profile: Some(profile.into()),
        }
    }

    pub fn no_interference() -> Self {
        Self { profile: None }
    }

    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }
}

impl fmt::Display for RoutingDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.profile {
            Some(profile) => write!(f, "profile-directory={:?}", profile),
            None => write!(f, "no interference"),
        }
    }
}

/// Decide the destination for `url`.
pub fn decide(url: &str, rules: &RuleSet) -> RoutingDecision {
    if let Some(profile) = rules.matches(url) {
        return RoutingDecision::launch(profile);
    }

    match rules.strategy() {
        UnknownUrlStrategy::UseDefaultProfile => RoutingDecision::launch(rules.default_profile()),
        UnknownUrlStrategy::UseSystemDefaultBrowser => RoutingDecision::no_interference(),
    }
}

/// Shared routing context handed to the dispatcher.
#[derive(Debug, Clone)]
pub struct Router {
    rules: Arc<RuleSet>,
}

impl Router {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules: Arc::new(rules),
        }
    }

    pub fn decide(&self, url: &str) -> RoutingDecision {
        decide(url, &self.rules)
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }
}
