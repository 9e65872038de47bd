//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, known log levels)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Rule patterns are checked by `RuleSet::compile`, which knows regex syntax

use thiserror::Error;

use crate::config::schema::RouterConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("chrome_app_path must not be empty")]
    EmptyAppPath,

    #[error("unknown log_level {0:?} (expected one of trace, debug, info, warn, error)")]
    UnknownLogLevel(String),

    #[error("oneshot_timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("fallback_browser is set but blank")]
    BlankFallback,
}

/// Check a loaded configuration.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.chrome_app_path.trim().is_empty() {
        errors.push(ValidationError::EmptyAppPath);
    }

    let level = config.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(config.log_level.clone()));
    }

    if config.oneshot_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if matches!(&config.fallback_browser, Some(cmd) if cmd.trim().is_empty()) {
        errors.push(ValidationError::BlankFallback);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
