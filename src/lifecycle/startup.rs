//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Compile the rule set
//! - Build the routing and launching context handed to the dispatcher
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Nothing here touches the pid file or starts event sources; the caller
//!   does that only once this has succeeded

use std::path::Path;

use thiserror::Error;

use crate::config::{load_config, ConfigError, RouterConfig};
use crate::launcher::Launcher;
use crate::routing::{InvalidRule, RuleSet, Router};

/// Fatal startup failure.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Rule(#[from] InvalidRule),
}

/// Everything the dispatcher needs, built from one configuration.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub config: RouterConfig,
    pub router: Router,
    pub launcher: Launcher,
}

/// Load the configuration at `path` and prepare the runtime context.
pub fn load(path: &Path) -> Result<Prepared, StartupError> {
    let config = load_config(path)?;
    Ok(prepare(config)?)
}

/// Compile rules and build the context from an already loaded configuration.
pub fn prepare(config: RouterConfig) -> Result<Prepared, InvalidRule> {
    let rules = RuleSet::compile(
        &config.rules,
        config.default_profile_directory.clone(),
        config.strategy_for_unknown_urls,
    )?;
    let launcher = Launcher::from_config(&config);

    Ok(Prepared {
        router: Router::new(rules),
        launcher,
        config,
    })
}
