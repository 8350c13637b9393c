//! Whitelist/blacklist rule configuration and compiled matchers.

use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const RULE_MODE_KEY: &str = "key";
const RULE_MODE_PATTERN: &str = "pattern";

/// One whitelist or blacklist entry as supplied by configuration.
///
/// `mode` selects the matcher: `"key"` compares the literal value,
/// `"pattern"` compiles the value as a regular expression. A rule without a
/// TTL inherits the coordinator's default.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct RuleConfig {
    #[serde(rename = "match_mode")]
    pub mode: String,
    #[serde(rename = "match_value")]
    pub value: String,
    #[serde(default)]
    pub ttl: Option<Duration>,
}

#[derive(Clone, Debug)]
enum Matcher {
    Exact(String),
    Pattern(Regex),
}

/// A compiled rule: matcher plus resolved TTL. Immutable after construction
/// and safe to read without locking.
#[derive(Clone, Debug)]
pub(crate) struct CacheRule {
    matcher: Matcher,
    ttl: Duration,
}

impl CacheRule {
    pub(crate) fn ttl(&self) -> Duration {
        self.ttl
    }

    fn matches(&self, key: &str) -> bool {
        match &self.matcher {
            Matcher::Exact(value) => value == key,
            Matcher::Pattern(pattern) => pattern.is_match(key),
        }
    }
}

/// Compiles `rules` in declaration order, resolving missing TTLs against
/// `default_ttl`. The first unknown mode or bad pattern aborts compilation.
pub(crate) fn compile_rules(rules: &[RuleConfig], default_ttl: Duration) -> Result<Vec<CacheRule>> {
    let mut compiled = Vec::with_capacity(rules.len());
    for rule in rules {
        let matcher = match rule.mode.as_str() {
            RULE_MODE_KEY => Matcher::Exact(rule.value.clone()),
            RULE_MODE_PATTERN => {
                let pattern = Regex::new(&rule.value).map_err(|source| Error::BadPattern {
                    pattern: rule.value.clone(),
                    source,
                })?;
                Matcher::Pattern(pattern)
            }
            other => return Err(Error::BadRuleMode(other.to_owned())),
        };
        compiled.push(CacheRule {
            matcher,
            ttl: rule.ttl.unwrap_or(default_ttl),
        });
    }
    Ok(compiled)
}

/// First rule in declaration order matching `key`, if any.
pub(crate) fn find_match<'a>(rules: &'a [CacheRule], key: &str) -> Option<&'a CacheRule> {
    rules.iter().find(|rule| rule.matches(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT_TTL: Duration = Duration::from_millis(100);

    fn key_rule(value: &str, ttl: Option<Duration>) -> RuleConfig {
        RuleConfig {
            mode: RULE_MODE_KEY.to_owned(),
            value: value.to_owned(),
            ttl,
        }
    }

    fn pattern_rule(value: &str, ttl: Option<Duration>) -> RuleConfig {
        RuleConfig {
            mode: RULE_MODE_PATTERN.to_owned(),
            value: value.to_owned(),
            ttl,
        }
    }

    #[test]
    fn exact_rule_matches_only_the_literal_key() {
        let rules = compile_rules(&[key_rule("user:1", None)], DEFAULT_TTL).unwrap();
        assert!(find_match(&rules, "user:1").is_some());
        assert!(find_match(&rules, "user:10").is_none());
        assert!(find_match(&rules, "user").is_none());
    }

    #[test]
    fn pattern_rule_matches_by_regex() {
        let rules = compile_rules(&[pattern_rule("^1[0-9]{2}", None)], DEFAULT_TTL).unwrap();
        assert!(find_match(&rules, "100").is_some());
        assert!(find_match(&rules, "1999").is_some());
        assert!(find_match(&rules, "99").is_none());
    }

    #[test]
    fn first_matching_rule_wins() {
        let rules = compile_rules(
            &[
                pattern_rule("^a", Some(Duration::from_secs(1))),
                pattern_rule("ab", Some(Duration::from_secs(2))),
            ],
            DEFAULT_TTL,
        )
        .unwrap();
        let hit = find_match(&rules, "abc").unwrap();
        assert_eq!(hit.ttl(), Duration::from_secs(1));
    }

    #[test]
    fn missing_ttl_inherits_the_default() {
        let rules = compile_rules(
            &[key_rule("a", None), key_rule("b", Some(Duration::from_secs(5)))],
            DEFAULT_TTL,
        )
        .unwrap();
        assert_eq!(rules[0].ttl(), DEFAULT_TTL);
        assert_eq!(rules[1].ttl(), Duration::from_secs(5));
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let err = compile_rules(
            &[RuleConfig {
                mode: "glob".to_owned(),
                value: "*".to_owned(),
                ttl: None,
            }],
            DEFAULT_TTL,
        )
        .unwrap_err();
        assert!(matches!(err, Error::BadRuleMode(mode) if mode == "glob"));
    }

    #[test]
    fn bad_pattern_is_rejected() {
        let err = compile_rules(&[pattern_rule("[", None)], DEFAULT_TTL).unwrap_err();
        assert!(matches!(err, Error::BadPattern { pattern, .. } if pattern == "["));
    }
}
