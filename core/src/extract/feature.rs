//! Gherkin feature-file conversion.
//!
//! Lines are copied through unchanged except step lines and QAF data-file
//! `Examples:` lines. `And`, `But` and `*` take the keyword of the last
//! `Given`/`When`/`Then` in the current scope.

use crate::rules::{Classification, Translation, MANUAL_SENTINEL};
use regex::Regex;
use std::sync::LazyLock;

static QAF_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{(?P<name>[A-Za-z_][\w.\-]*)\}").unwrap());

const SCOPE_HEADERS: &[&str] = &[
    "Feature:",
    "Background:",
    "Scenario:",
    "Scenario Outline:",
    "Scenario Template:",
    "Example:",
    "Rule:",
];

const PRIMARY: &[&str] = &["Given", "When", "Then"];
const CONTINUATION: &[&str] = &["And", "But", "*"];

/// One converted feature-file line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureUnit {
    /// 1-based line number in the converted file.
    pub line: usize,
    pub translation: Translation<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureOutput {
    pub text: String,
    pub units: Vec<FeatureUnit>,
}

enum Line<'a> {
    ScopeHeader,
    DocStringFence,
    QafExamples(&'a str),
    Step { keyword: &'a str, rest: &'a str },
    Other,
}

fn classify(trimmed: &str) -> Line<'_> {
    if trimmed.starts_with("\"\"\"") || trimmed.starts_with("```") {
        return Line::DocStringFence;
    }
    if SCOPE_HEADERS.iter().any(|h| trimmed.starts_with(h)) {
        return Line::ScopeHeader;
    }
    if let Some(rest) = trimmed.strip_prefix("Examples:") {
        let rest = rest.trim();
        if rest.starts_with('{') {
            return Line::QafExamples(rest);
        }
        return Line::Other;
    }
    for &keyword in PRIMARY.iter().chain(CONTINUATION) {
        if let Some(rest) = trimmed.strip_prefix(keyword) {
            if rest.starts_with(' ') || rest.is_empty() {
                return Line::Step {
                    keyword,
                    rest: rest.trim_start(),
                };
            }
        }
    }
    Line::Other
}

/// Rewrite QAF `${name}` parameters to Gherkin `<name>`.
pub fn qaf_params_to_gherkin(text: &str) -> String {
    QAF_PARAM.replace_all(text, "<$name>").into_owned()
}

/// Convert a feature file. Every step line and every QAF data-file
/// `Examples:` line produces exactly one unit.
pub fn convert_feature(src: &str) -> FeatureOutput {
    let mut out = FeatureOutput {
        text: String::with_capacity(src.len()),
        units: Vec::new(),
    };
    let mut current: Option<&'static str> = None;
    let mut in_doc_string = false;
    let mut line = 0usize;

    for raw in src.split_inclusive('\n') {
        line += 1;
        let content = raw.trim_end_matches(['\n', '\r']);
        let ending = &raw[content.len()..];
        let trimmed = content.trim_start();
        let indent = &content[..content.len() - trimmed.len()];

        if in_doc_string {
            if matches!(classify(trimmed), Line::DocStringFence) {
                in_doc_string = false;
            }
            out.text.push_str(raw);
            continue;
        }

        match classify(trimmed) {
            Line::DocStringFence => {
                in_doc_string = true;
                out.text.push_str(raw);
            }
            Line::ScopeHeader => {
                current = None;
                out.text.push_str(raw);
            }
            Line::Other => out.text.push_str(raw),
            Line::QafExamples(data) => {
                let comment = format!("# {MANUAL_SENTINEL}[feature]: Examples: {data}");
                let newline = if ending.is_empty() { "\n" } else { ending };
                out.text.push_str(&format!(
                    "{indent}{comment}{newline}{indent}Examples:{ending}"
                ));
                out.units.push(FeatureUnit {
                    line,
                    translation: Translation {
                        output: comment,
                        classification: Classification::Fallback,
                        rule: None,
                        source: trimmed.to_owned(),
                    },
                });
                line += 1;
            }
            Line::Step { keyword, rest } => {
                let translation = resolve_step(keyword, rest, trimmed, &mut current);
                if translation.is_fallback() {
                    out.text.push_str(raw);
                } else {
                    out.text
                        .push_str(&format!("{indent}{}{ending}", translation.output));
                }
                out.units.push(FeatureUnit { line, translation });
            }
        }
    }

    out
}

fn resolve_step(
    keyword: &str,
    rest: &str,
    trimmed: &str,
    current: &mut Option<&'static str>,
) -> Translation<String> {
    let text = qaf_params_to_gherkin(rest);

    if let Some(&primary) = PRIMARY.iter().find(|k| **k == keyword) {
        *current = Some(primary);
        return Translation {
            output: format!("{primary} {text}"),
            classification: Classification::Structural,
            rule: Some("keyword"),
            source: trimmed.to_owned(),
        };
    }

    match current {
        Some(primary) => Translation {
            output: format!("{primary} {text}"),
            classification: Classification::Structural,
            rule: Some("inherit-keyword"),
            source: trimmed.to_owned(),
        },
        None => {
            log::debug!("[feature] no keyword in scope for {trimmed:?}");
            Translation {
                output: trimmed.to_owned(),
                classification: Classification::Fallback,
                rule: None,
                source: trimmed.to_owned(),
            }
        }
    }
}
