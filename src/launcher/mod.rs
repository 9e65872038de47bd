//! Browser launching.
//!
//! # Responsibilities
//! - Normalize bare-text input into something the browser accepts
//! - Build the browser command line for the selected profile
//! - Hand unmatched URLs to an optional fallback browser
//!
//! # Design Decisions
//! - Spawning goes through `ProcessSpawner` so tests never start a browser
//! - `open -na` is waited on since it exits at once; a browser started
//!   directly is detached after a short startup check
//! - No retries: a failed launch is reported once and forgotten
//! - The URL is always the final argument

pub mod process;

use std::sync::Arc;

use thiserror::Error;
use url::Url;

use crate::config::{LaunchStyle, RouterConfig};

pub use process::{CommandSpawner, ProcessSpawner};

/// Failure to start the browser.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    ExitStatus {
        program: String,
        status: String,
        stderr: String,
    },
}

/// Launches the configured browser.
#[derive(Debug, Clone)]
pub struct Launcher {
    app_path: String,
    style: LaunchStyle,
    fallback: Option<String>,
    spawner: Arc<dyn ProcessSpawner>,
}

impl Launcher {
    pub fn new(app_path: impl Into<String>, style: LaunchStyle, spawner: Arc<dyn ProcessSpawner>) -> Self {
        Self {
            app_path: app_path.into(),
            style,
            fallback: None,
            spawner,
        }
    }

    /// Launcher that spawns real processes according to `config`.
    pub fn from_config(config: &RouterConfig) -> Self {
        Self::new(
            config.chrome_app_path.clone(),
            config.launch_style,
            Arc::new(CommandSpawner),
        )
        .with_fallback(config.fallback_browser.clone())
    }

    pub fn with_fallback(mut self, fallback: Option<String>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Open `url` in the browser using `profile`.
    ///
    /// An empty profile launches the browser without a profile argument.
    pub fn open(&self, profile: &str, url: &str) -> Result<(), LaunchError> {
        let (program, args) = self.command(profile, url);
        match self.style {
            LaunchStyle::Open => self.spawner.spawn(&program, &args),
            LaunchStyle::Direct => self.spawner.start(&program, &args),
        }
    }

    /// Hand `url` to the fallback browser, if one is configured.
    ///
    /// Returns `Ok(false)` when there is nothing to do.
    pub fn fallback(&self, url: &str) -> Result<bool, LaunchError> {
        let Some(program) = &self.fallback else {
            return Ok(false);
        };
        self.spawner.start(program, &[normalize_url(url)])?;
        Ok(true)
    }

    /// Program and arguments for launching `url` with `profile`.
    pub fn command(&self, profile: &str, url: &str) -> (String, Vec<String>) {
        let mut args = Vec::new();
        let program = match self.style {
            LaunchStyle::Open => {
                args.push("-na".to_string());
                args.push(self.app_path.clone());
                args.push("--args".to_string());
                "open".to_string()
            }
            LaunchStyle::Direct => {
                args.push("--new-window".to_string());
                self.app_path.clone()
            }
        };

        if !profile.is_empty() {
            args.push(format!("--profile-directory={}", profile));
        }
        args.push(normalize_url(url));

        (program, args)
    }
}

/// Prefix `http://` onto bare text that has no scheme.
///
/// Anything that parses as an absolute URL, or already starts with `http`,
/// is passed through untouched.
pub fn normalize_url(url: &str) -> String {
    if Url::parse(url).is_ok() || url.starts_with("http") {
        url.to_string()
    } else {
        format!("http://{}", url)
    }
}
