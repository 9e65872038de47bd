//! Rule compilation and URL matching.
//!
//! # Responsibilities
//! - Compile configured pattern/profile pairs into regexes
//! - Reject empty fields and invalid patterns, naming the rule index
//! - Find the first rule whose pattern occurs anywhere in a URL
//!
//! # Design Decisions
//! - Source order is preserved; first match wins
//! - Unanchored search (`Regex::is_match`); anchoring is left to the pattern
//! - Immutable after construction (thread-safe without locks)

use regex::Regex;
use thiserror::Error;

use crate::config::{RuleConfig, UnknownUrlStrategy};

/// A rule that could not be compiled.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("rule {index} invalid: {reason}")]
pub struct InvalidRule {
    /// Zero-based position of the rule in the configuration.
    pub index: usize,
    pub reason: String,
}

/// A single compiled rule.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    matcher: Regex,
    profile_directory: String,
}

impl CompiledRule {
    /// Returns true if the pattern occurs anywhere in `url`.
    pub fn matches(&self, url: &str) -> bool {
        self.matcher.is_match(url)
    }

    pub fn pattern(&self) -> &str {
        self.matcher.as_str()
    }

    pub fn profile_directory(&self) -> &str {
        &self.profile_directory
    }
}

/// Ordered, compiled routing rules plus the policy for unmatched URLs.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
    default_profile: String,
    strategy: UnknownUrlStrategy,
}

impl RuleSet {
    /// Compile `rules` in order.
    ///
    /// Fails on the first rule with an empty pattern, an empty profile
    /// directory, or a pattern the regex engine rejects.
    pub fn compile(
        rules: &[RuleConfig],
        default_profile: impl Into<String>,
        strategy: UnknownUrlStrategy,
    ) -> Result<Self, InvalidRule> {
        let mut compiled = Vec::with_capacity(rules.len());

        for (index, rule) in rules.iter().enumerate() {
            if rule.pattern.is_empty() || rule.profile_directory.is_empty() {
                return Err(InvalidRule {
                    index,
                    reason: "pattern and profile_directory are required".to_string(),
                });
            }

            let matcher = Regex::new(&rule.pattern).map_err(|e| InvalidRule {
                index,
                reason: format!("compile regexp: {}", e),
            })?;

            compiled.push(CompiledRule {
                matcher,
                profile_directory: rule.profile_directory.clone(),
            });
        }

        Ok(Self {
            rules: compiled,
            default_profile: default_profile.into(),
            strategy,
        })
    }

    /// Profile of the first rule matching `url`, if any.
    pub fn matches(&self, url: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.matches(url))
            .map(|rule| rule.profile_directory())
    }

    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn default_profile(&self) -> &str {
        &self.default_profile
    }

    pub fn strategy(&self) -> UnknownUrlStrategy {
        self.strategy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(rules: &[(&str, &str)]) -> Result<RuleSet, InvalidRule> {
        let rules: Vec<RuleConfig> = rules.iter().map(|(p, d)| RuleConfig::new(*p, *d)).collect();
        RuleSet::compile(&rules, "Default", UnknownUrlStrategy::UseDefaultProfile)
    }

    #[test]
    fn test_first_match_wins() {
        let set = compile(&[("a", "P1"), (".*", "P2")]).unwrap();
        assert_eq!(set.matches("a.com"), Some("P1"));
        assert_eq!(set.matches("b.com"), Some("P2"));
    }

    #[test]
    fn test_unanchored_search() {
        let set = compile(&[("github\\.com/acme", "Work")]).unwrap();
        assert_eq!(set.matches("https://github.com/acme/repo"), Some("Work"));
        assert_eq!(set.matches("https://github.com/other"), None);
    }

    #[test]
    fn test_explicit_anchor_is_respected() {
        let set = compile(&[("^https://mail\\.", "Mail")]).unwrap();
        assert_eq!(set.matches("https://mail.example.com"), Some("Mail"));
        assert_eq!(set.matches("https://example.com/?next=https://mail.x"), None);
    }

    #[test]
    fn test_empty_rule_list_matches_nothing() {
        let set = compile(&[]).unwrap();
        assert!(set.is_empty());
        assert_eq!(set.matches("https://example.com"), None);
    }

    #[test]
    fn test_rejects_empty_pattern() {
        let err = compile(&[("ok", "P1"), ("", "P2")]).unwrap_err();
        assert_eq!(err.index, 1);
    }

    #[test]
    fn test_rejects_empty_profile() {
        let err = compile(&[("ok", "")]).unwrap_err();
        assert_eq!(err.index, 0);
        assert!(err.to_string().starts_with("rule 0 invalid"));
    }

    #[test]
    fn test_rejects_bad_regex() {
        let err = compile(&[("a", "P1"), ("b", "P2"), ("(unclosed", "P3")]).unwrap_err();
        assert_eq!(err.index, 2);
        assert!(err.reason.contains("compile regexp"));
    }

    #[test]
    fn test_preserves_source_order() {
        let set = compile(&[("one", "A"), ("two", "B"), ("three", "C")]).unwrap();
        let patterns: Vec<&str> = set.rules().iter().map(|r| r.pattern()).collect();
        assert_eq!(patterns, vec!["one", "two", "three"]);
        assert_eq!(set.len(), 3);
    }
}
