//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (JSON/TOML)
//!     → loader.rs (parse & deserialize, fill defaults)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated, immutable)
//!     → rules compiled into a RuleSet, shared via Arc
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{default_config_path, load_config, ConfigError};
pub use schema::RouterConfig;
pub use schema::RuleConfig;
pub use schema::{LaunchStyle, UnknownUrlStrategy};
