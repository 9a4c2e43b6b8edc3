//! Idempotent placeholder rewriter.
//!
//! Generated skeletons carry one placeholder per unit:
//!
//! ```text
//! // PW-PENDING[locator:signIn]: xpath=//button[text()='Sign in']
//! // PW-PENDING[action]: signIn.click()
//! // PW-PENDING[step:name]: user clicks on {string} button
//! ```
//!
//! [`rewrite`] replaces each placeholder line with its translation and leaves
//! every other byte alone. Translations never contain the pending marker, so
//! running it again changes nothing.

use crate::report::UnitKind;
use crate::rules::action::action_rules;
use crate::rules::locator::{normalize, translate_locator};
use crate::rules::step::step_rules;
use crate::rules::{Translation, MANUAL_SENTINEL};
use regex::Regex;
use std::sync::LazyLock;

pub const PENDING_SENTINEL: &str = "PW-PENDING";

static PLACEHOLDER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<indent>[ \t]*)// PW-PENDING\[(?P<kind>[\w-]+)(?::(?P<args>[^\]]*))?\]: ?(?P<payload>.*)$",
    )
    .unwrap()
});

static ELEMENT_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*readonly (?P<name>\w+): Locator;").unwrap());

/// A pending unit in generated code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    /// Locator for the named element field, assigned in the constructor.
    Locator { field: String },
    /// Statement of a page method; element names come from the class.
    Action,
    /// Body of a step definition with the given parameter names.
    Step { params: Vec<String> },
}

impl Placeholder {
    fn parse(kind: &str, args: Option<&str>) -> Option<Self> {
        match (kind, args) {
            ("locator", Some(field)) if !field.trim().is_empty() => Some(Self::Locator {
                field: field.trim().to_owned(),
            }),
            ("action", None) => Some(Self::Action),
            ("step", args) => Some(Self::Step {
                params: args
                    .map(|a| {
                        a.split(',')
                            .map(str::trim)
                            .filter(|p| !p.is_empty())
                            .map(str::to_owned)
                            .collect()
                    })
                    .unwrap_or_default(),
            }),
            _ => None,
        }
    }

    pub fn unit_kind(&self) -> UnitKind {
        match self {
            Self::Locator { .. } => UnitKind::Locator,
            Self::Action => UnitKind::Action,
            Self::Step { .. } => UnitKind::Step,
        }
    }

    /// The placeholder comment for `payload` (without indentation).
    pub fn marker(&self, payload: &str) -> String {
        let payload = payload.replace(['\r', '\n'], " ");
        match self {
            Self::Locator { field } => format!("// {PENDING_SENTINEL}[locator:{field}]: {payload}"),
            Self::Action => format!("// {PENDING_SENTINEL}[action]: {payload}"),
            Self::Step { params } if params.is_empty() => {
                format!("// {PENDING_SENTINEL}[step]: {payload}")
            }
            Self::Step { params } => {
                format!("// {PENDING_SENTINEL}[step:{}]: {payload}", params.join(","))
            }
        }
    }

    /// Translate `payload` and render the replacement line (without indentation).
    pub fn render(&self, payload: &str, elements: &[String]) -> Translation<String> {
        match self {
            Self::Locator { field } => translate_locator(&normalize(payload)).map(|selector| {
                format!("this.{field} = {};", selector.render("this.page"))
            }),
            Self::Action => action_rules().translate(payload.trim(), elements),
            Self::Step { params } => step_rules().translate(payload.trim(), params),
        }
    }
}

/// One placeholder that was replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteUnit {
    pub kind: UnitKind,
    /// 1-based line number.
    pub line: usize,
    pub translation: Translation<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteOutcome {
    pub text: String,
    pub units: Vec<RewriteUnit>,
    /// Lines holding placeholders of unknown kind, left untouched.
    pub skipped: Vec<usize>,
}

impl RewriteOutcome {
    pub fn changed(&self) -> bool {
        !self.units.is_empty()
    }
}

/// Element field names declared in a generated page class.
pub fn declared_elements(text: &str) -> Vec<String> {
    ELEMENT_DECL
        .captures_iter(text)
        .map(|c| c["name"].to_owned())
        .collect()
}

/// Replace every placeholder line in `text`.
pub fn rewrite(text: &str) -> RewriteOutcome {
    let mut outcome = RewriteOutcome {
        text: String::with_capacity(text.len()),
        ..RewriteOutcome::default()
    };
    if !text.contains(PENDING_SENTINEL) {
        outcome.text.push_str(text);
        return outcome;
    }

    let elements = declared_elements(text);

    for (index, raw) in text.split_inclusive('\n').enumerate() {
        let content = raw.trim_end_matches(['\n', '\r']);
        let ending = &raw[content.len()..];

        let Some(caps) = PLACEHOLDER_LINE.captures(content) else {
            outcome.text.push_str(raw);
            continue;
        };
        let Some(placeholder) =
            Placeholder::parse(&caps["kind"], caps.name("args").map(|m| m.as_str()))
        else {
            log::warn!(
                "[rewrite] unknown placeholder kind '{}' on line {}",
                &caps["kind"],
                index + 1
            );
            outcome.skipped.push(index + 1);
            outcome.text.push_str(raw);
            continue;
        };

        let payload = &caps["payload"];
        let mut translation = placeholder.render(payload, &elements);
        if translation.is_fallback() && matches!(placeholder, Placeholder::Locator { .. }) {
            translation.output = format!(
                "{} // {MANUAL_SENTINEL}[locator]: {}",
                translation.output,
                payload.trim()
            );
        }

        outcome.text.push_str(&caps["indent"]);
        outcome.text.push_str(&translation.output);
        outcome.text.push_str(ending);
        outcome.units.push(RewriteUnit {
            kind: placeholder.unit_kind(),
            line: index + 1,
            translation,
        });
    }

    outcome
}
