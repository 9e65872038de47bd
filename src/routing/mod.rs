//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming URL
//!     → router.rs (decide)
//!     → matcher.rs (first rule whose pattern occurs in the URL)
//!     → Return: profile to launch, or no interference
//!
//! Rule Compilation (at startup):
//!     RuleConfig[]
//!     → Check required fields
//!     → Compile regexes, keeping source order
//!     → Freeze as immutable RuleSet
//! ```
//!
//! # Design Decisions
//! - Rules compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same rule
//! - First match wins (ordered as configured)

pub mod matcher;
pub mod router;

pub use matcher::{CompiledRule, InvalidRule, RuleSet};
pub use router::{decide, Router, RoutingDecision};
