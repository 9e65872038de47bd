//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the profile router.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Browser application to launch (app bundle on macOS, binary elsewhere).
    pub chrome_app_path: String,

    /// Profile used when no rule matches and the strategy asks for it.
    pub default_profile_directory: String,

    /// What to do with URLs that match no rule.
    pub strategy_for_unknown_urls: UnknownUrlStrategy,

    /// Ordered routing rules. First match wins.
    pub rules: Vec<RuleConfig>,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Optional file that receives a copy of every log line.
    pub log_file: Option<PathBuf>,

    /// Pid file marking the active listener.
    pub pid_file: PathBuf,

    /// Socket the listener accepts forwarded URLs on.
    pub socket_path: PathBuf,

    /// How the browser command line is assembled.
    pub launch_style: LaunchStyle,

    /// Command handed unmatched URLs when the strategy defers to the system.
    pub fallback_browser: Option<String>,

    /// How long `open` waits for a URL before giving up.
    pub oneshot_timeout_secs: u64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            chrome_app_path: default_app_path().to_string(),
            default_profile_directory: DEFAULT_PROFILE.to_string(),
            strategy_for_unknown_urls: UnknownUrlStrategy::default(),
            rules: Vec::new(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_file: None,
            pid_file: std::env::temp_dir().join("profile-router.pid"),
            socket_path: std::env::temp_dir().join("profile-router.sock"),
            launch_style: LaunchStyle::default(),
            fallback_browser: None,
            oneshot_timeout_secs: 4,
        }
    }
}

impl RouterConfig {
    /// Replace empty strings with their defaults.
    ///
    /// Config files written by hand often carry `""` for "use the default",
    /// which serde would otherwise accept verbatim.
    pub fn apply_defaults(&mut self) {
        if self.chrome_app_path.is_empty() {
            self.chrome_app_path = default_app_path().to_string();
        }
        if self.default_profile_directory.is_empty() {
            self.default_profile_directory = DEFAULT_PROFILE.to_string();
        }
        if self.log_level.is_empty() {
            self.log_level = DEFAULT_LOG_LEVEL.to_string();
        }
    }
}

const DEFAULT_PROFILE: &str = "Default";
const DEFAULT_LOG_LEVEL: &str = "info";

fn default_app_path() -> &'static str {
    if cfg!(target_os = "macos") {
        "/Applications/Google Chrome.app"
    } else {
        "google-chrome"
    }
}

/// A single pattern-to-profile mapping.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RuleConfig {
    /// Regular expression searched anywhere in the URL.
    pub pattern: String,

    /// Browser profile directory the URL is opened in.
    pub profile_directory: String,
}

impl RuleConfig {
    pub fn new(pattern: impl Into<String>, profile_directory: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            profile_directory: profile_directory.into(),
        }
    }
}

/// Policy for URLs that match no rule.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownUrlStrategy {
    /// Leave the URL alone and let the system handle it. An empty string
    /// selects this too.
    #[default]
    #[serde(rename = "use-browser-default", alias = "use-system-default-browser", alias = "")]
    UseSystemDefaultBrowser,

    /// Open the URL with `default_profile_directory`.
    UseDefaultProfile,
}

/// Browser command line layout.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LaunchStyle {
    /// `open -na <app> --args ...` (macOS).
    Open,

    /// `<app> --new-window ...`
    Direct,
}

impl Default for LaunchStyle {
    fn default() -> Self {
        if cfg!(target_os = "macos") {
            LaunchStyle::Open
        } else {
            LaunchStyle::Direct
        }
    }
}
