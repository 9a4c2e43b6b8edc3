//! Ordered pattern→generator rule engine.
//!
//! A [`RuleSet`] holds rules in declaration order. The first rule whose
//! pattern matches *and* whose generator succeeds produces the result.
//! A generator error is treated exactly like a non-match, so a rule can
//! decline an input its pattern was too loose to reject. When every rule
//! declines, the set's fallback builds a result that keeps the original
//! expression for manual follow-up.

pub mod action;
pub mod locator;
pub mod step;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Marker embedded in every fallback output. Scan generated files for it to
/// find units that still need a human.
pub const MANUAL_SENTINEL: &str = "PW-MANUAL";

/// How a unit was converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// Converted to a user-facing locator or action (role, label, text...).
    Semantic,
    /// Converted to a structural equivalent (css, navigation, waits...).
    Structural,
    /// No rule applied; the original expression is carried through.
    Fallback,
}

impl Classification {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Semantic => "semantic",
            Self::Structural => "structural",
            Self::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons a generator declines a match.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    #[error("capture group '{0}' missing")]
    MissingCapture(&'static str),
    #[error("no parameter at position {0}")]
    MissingParam(usize),
    #[error("no ARIA role for <{0}>")]
    UnknownRole(String),
    #[error("'{0}' is not a known element")]
    UnknownElement(String),
    #[error("unsupported value: {0}")]
    Unsupported(String),
}

/// The outcome of translating one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation<T> {
    pub output: T,
    pub classification: Classification,
    /// Name of the rule that produced the output, `None` for fallbacks.
    pub rule: Option<&'static str>,
    /// The raw expression that was translated.
    pub source: String,
}

impl<T> Translation<T> {
    pub fn is_fallback(&self) -> bool {
        self.classification == Classification::Fallback
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Translation<U> {
        Translation {
            output: f(self.output),
            classification: self.classification,
            rule: self.rule,
            source: self.source,
        }
    }
}

/// Generator half of a rule. Implemented by one enum per rule domain.
pub trait Generate {
    type Output;

    fn generate(
        &self,
        caps: &Captures<'_>,
        input: &str,
        params: &[String],
    ) -> Result<Self::Output, GenerateError>;
}

pub struct Rule<G> {
    pub name: &'static str,
    pub pattern: Regex,
    pub classification: Classification,
    pub generator: G,
}

impl<G> Rule<G> {
    /// Build a rule from a pattern known at compile time.
    ///
    /// # Panics
    /// Panics if `pattern` is not a valid regex. Rule tables are static, so
    /// this surfaces in the unit tests rather than at run time.
    pub fn new(
        name: &'static str,
        pattern: &str,
        classification: Classification,
        generator: G,
    ) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern)
                .unwrap_or_else(|e| panic!("invalid pattern for rule '{name}': {e}")),
            classification,
            generator,
        }
    }
}

pub struct RuleSet<G: Generate> {
    rules: Vec<Rule<G>>,
    fallback: fn(&str) -> G::Output,
}

impl<G: Generate> RuleSet<G> {
    pub fn new(rules: Vec<Rule<G>>, fallback: fn(&str) -> G::Output) -> Self {
        Self { rules, fallback }
    }

    /// Translate one expression. Always returns exactly one result.
    pub fn translate(&self, input: &str, params: &[String]) -> Translation<G::Output> {
        for rule in &self.rules {
            let Some(caps) = rule.pattern.captures(input) else {
                continue;
            };
            match rule.generator.generate(&caps, input, params) {
                Ok(output) => {
                    return Translation {
                        output,
                        classification: rule.classification,
                        rule: Some(rule.name),
                        source: input.to_owned(),
                    }
                }
                Err(e) => {
                    log::debug!("[rules] '{}' declined {input:?}: {e}", rule.name);
                }
            }
        }

        Translation {
            output: (self.fallback)(input),
            classification: Classification::Fallback,
            rule: None,
            source: input.to_owned(),
        }
    }
}

/// Regex fragment for a single- or double-quoted XPath/Java literal, with the
/// content captured in `<name>_s` or `<name>_d`.
pub(crate) fn quoted(name: &str) -> String {
    format!(r#"(?:'(?P<{name}_s>[^']*)'|"(?P<{name}_d>[^"]*)")"#)
}

/// Read back a literal captured by [`quoted`].
pub(crate) fn quoted_value<'a>(
    caps: &Captures<'a>,
    name: &'static str,
) -> Result<&'a str, GenerateError> {
    let single = format!("{name}_s");
    let double = format!("{name}_d");
    caps.name(&single)
        .or_else(|| caps.name(&double))
        .map(|m| m.as_str())
        .ok_or(GenerateError::MissingCapture(name))
}

pub(crate) fn capture<'a>(
    caps: &Captures<'a>,
    name: &'static str,
) -> Result<&'a str, GenerateError> {
    caps.name(name)
        .map(|m| m.as_str())
        .ok_or(GenerateError::MissingCapture(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    enum Echo {
        Upper,
        Refuse,
        Lower,
    }

    impl Generate for Echo {
        type Output = String;

        fn generate(
            &self,
            caps: &Captures<'_>,
            _input: &str,
            _params: &[String],
        ) -> Result<String, GenerateError> {
            let word = capture(caps, "w")?;
            match self {
                Echo::Upper => Ok(word.to_uppercase()),
                Echo::Lower => Ok(word.to_lowercase()),
                Echo::Refuse => Err(GenerateError::Unsupported(word.to_owned())),
            }
        }
    }

    fn fallback(input: &str) -> String {
        format!("{MANUAL_SENTINEL}[test]: {input}")
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let set = RuleSet::new(
            vec![
                Rule::new("upper", r"^say (?P<w>\w+)$", Classification::Semantic, Echo::Upper),
                Rule::new("lower", r"^say (?P<w>\w+)$", Classification::Structural, Echo::Lower),
            ],
            fallback,
        );
        let t = set.translate("say Hello", &[]);
        assert_eq!(t.output, "HELLO");
        assert_eq!(t.rule, Some("upper"));
        assert_eq!(t.classification, Classification::Semantic);
    }

    #[test]
    fn test_generator_error_falls_through() {
        let set = RuleSet::new(
            vec![
                Rule::new("refuse", r"^say (?P<w>\w+)$", Classification::Semantic, Echo::Refuse),
                Rule::new("lower", r"^say (?P<w>\w+)$", Classification::Structural, Echo::Lower),
            ],
            fallback,
        );
        let t = set.translate("say Hello", &[]);
        assert_eq!(t.output, "hello");
        assert_eq!(t.rule, Some("lower"));
    }

    #[test]
    fn test_all_rules_decline_yields_fallback() {
        let set = RuleSet::new(
            vec![Rule::new(
                "refuse",
                r"^say (?P<w>\w+)$",
                Classification::Semantic,
                Echo::Refuse,
            )],
            fallback,
        );
        let t = set.translate("say Hello", &[]);
        assert!(t.is_fallback());
        assert_eq!(t.rule, None);
        assert_eq!(t.source, "say Hello");
        assert_eq!(t.output, "PW-MANUAL[test]: say Hello");
    }

    #[test]
    fn test_translation_is_deterministic() {
        let set = RuleSet::new(
            vec![Rule::new("upper", r"(?P<w>\w+)", Classification::Semantic, Echo::Upper)],
            fallback,
        );
        let first = set.translate("abc def", &[]);
        for _ in 0..10 {
            assert_eq!(set.translate("abc def", &[]), first);
        }
    }

    #[test]
    fn test_quoted_value_accepts_both_quote_styles() {
        let re = Regex::new(&format!("^v={}$", quoted("v"))).unwrap();
        let caps = re.captures("v='a\"b'").unwrap();
        assert_eq!(quoted_value(&caps, "v").unwrap(), "a\"b");
        let caps = re.captures("v=\"it's\"").unwrap();
        assert_eq!(quoted_value(&caps, "v").unwrap(), "it's");
    }

    #[test]
    fn test_classification_serializes_lowercase() {
        let json = serde_json::to_string(&Classification::Fallback).unwrap();
        assert_eq!(json, "\"fallback\"");
    }
}
