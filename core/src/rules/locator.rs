//! Selenium/QAF locator → Playwright locator rules.
//!
//! Every locator is first normalized to a `strategy=value` string (the form
//! QAF locator repositories already use), then run through [`locator_rules`].
//! XPath rules only accept single-step expressions with one predicate; deeper
//! paths are left to the fallback, which keeps the expression verbatim as a
//! Playwright `xpath=` selector.

use super::{
    capture, quoted, quoted_value, Classification, Generate, GenerateError, Rule, RuleSet,
    Translation,
};
use crate::generate::ts::{quote, Arg};
use regex::Captures;
use std::sync::LazyLock;

/// Target-side locator, rendered as a Playwright `page.getBy*` / `locator` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Role {
        role: String,
        name: Option<Arg>,
        exact: bool,
    },
    Text {
        text: Arg,
        exact: bool,
    },
    Label(Arg),
    Placeholder(Arg),
    AltText(Arg),
    Title(Arg),
    TestId(Arg),
    Css(String),
    Nth {
        base: Box<Selector>,
        index: usize,
    },
    /// A selector string passed to `locator()` unchanged.
    Raw(String),
}

impl Selector {
    /// Render as a TypeScript expression on `receiver` (e.g. `this.page`).
    pub fn render(&self, receiver: &str) -> String {
        match self {
            Self::Role { role, name, exact } => match name {
                Some(name) if *exact => format!(
                    "{receiver}.getByRole({}, {{ name: {}, exact: true }})",
                    quote(role),
                    name.to_ts()
                ),
                Some(name) => format!(
                    "{receiver}.getByRole({}, {{ name: {} }})",
                    quote(role),
                    name.to_ts()
                ),
                None => format!("{receiver}.getByRole({})", quote(role)),
            },
            Self::Text { text, exact: true } => {
                format!("{receiver}.getByText({}, {{ exact: true }})", text.to_ts())
            }
            Self::Text { text, exact: false } => {
                format!("{receiver}.getByText({})", text.to_ts())
            }
            Self::Label(arg) => format!("{receiver}.getByLabel({})", arg.to_ts()),
            Self::Placeholder(arg) => format!("{receiver}.getByPlaceholder({})", arg.to_ts()),
            Self::AltText(arg) => format!("{receiver}.getByAltText({})", arg.to_ts()),
            Self::Title(arg) => format!("{receiver}.getByTitle({})", arg.to_ts()),
            Self::TestId(arg) => format!("{receiver}.getByTestId({})", arg.to_ts()),
            Self::Css(css) => format!("{receiver}.locator({})", quote(css)),
            Self::Nth { base, index } => format!("{}.nth({index})", base.render(receiver)),
            Self::Raw(raw) => format!("{receiver}.locator({})", quote(raw)),
        }
    }

    /// Short human-readable form, used in reports and `translate` output.
    pub fn describe(&self) -> String {
        match self {
            Self::Role { role, name, exact } => match name {
                Some(name) if *exact => format!("{role}, name={}, exact", name.describe()),
                Some(name) => format!("{role}, name={}", name.describe()),
                None => role.clone(),
            },
            Self::Text { text, exact } => {
                let suffix = if *exact { ", exact" } else { "" };
                format!("text={}{suffix}", text.describe())
            }
            Self::Label(arg) => format!("label={}", arg.describe()),
            Self::Placeholder(arg) => format!("placeholder={}", arg.describe()),
            Self::AltText(arg) => format!("alt={}", arg.describe()),
            Self::Title(arg) => format!("title={}", arg.describe()),
            Self::TestId(arg) => format!("testid={}", arg.describe()),
            Self::Css(css) => format!("css={css}"),
            Self::Nth { base, index } => format!("{} >> nth={index}", base.describe()),
            Self::Raw(raw) => raw.clone(),
        }
    }
}

/// Normalize any supported locator notation to `strategy=value`.
///
/// Accepts QAF `strategy=value` strings, QAF JSON locators
/// (`{"locator": "...", "desc": "..."}`) and bare XPath. Unknown notations are
/// returned trimmed and unchanged; no rule will match them.
pub fn normalize(raw: &str) -> String {
    let raw = raw.trim();

    if raw.starts_with('{') {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(raw) {
            let inner = match value.get("locator") {
                Some(serde_json::Value::String(s)) => Some(s.as_str()),
                Some(serde_json::Value::Array(items)) => items.first().and_then(|v| v.as_str()),
                _ => None,
            };
            if let Some(inner) = inner {
                return normalize(inner);
            }
        }
        return raw.to_owned();
    }

    if raw.starts_with('/') || raw.starts_with('(') {
        return format!("xpath={raw}");
    }

    if let Some((prefix, value)) = raw.split_once('=') {
        if let Some(strategy) = canonical_strategy(prefix) {
            return format!("{strategy}={}", value.trim());
        }
    }

    raw.to_owned()
}

/// Build the normalized form from a Selenium strategy name (`By.xpath`,
/// `@FindBy(css = ...)`, `How.LINK_TEXT`...) and its value.
pub fn from_strategy(strategy: &str, value: &str) -> String {
    match canonical_strategy(strategy) {
        Some("xpath") | None if value.starts_with('/') || value.starts_with('(') => {
            format!("xpath={value}")
        }
        Some(strategy) => format!("{strategy}={value}"),
        // QAF `locator = "..."` holds a full locator (or a repository key).
        None => normalize(value),
    }
}

/// `true` when `expr` is already in `strategy=value` form with a known strategy.
pub fn is_normalized(expr: &str) -> bool {
    expr.split_once('=')
        .is_some_and(|(prefix, _)| canonical_strategy(prefix) == Some(prefix))
}

fn canonical_strategy(name: &str) -> Option<&'static str> {
    let key: String = name
        .trim()
        .chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect();
    match key.as_str() {
        "xpath" => Some("xpath"),
        "css" | "cssselector" => Some("css"),
        "id" | "idorname" => Some("id"),
        "name" => Some("name"),
        "link" | "linktext" => Some("link"),
        "partiallink" | "partiallinktext" => Some("partialLink"),
        "class" | "classname" => Some("className"),
        "tag" | "tagname" => Some("tagName"),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy)]
pub enum LocatorGen {
    TestId,
    RoleByText,
    TextExact,
    TextContains,
    Placeholder,
    AriaLabel,
    AltText,
    Title,
    IdAttribute,
    Attribute,
    Positional,
    Id,
    Name,
    Css,
    LinkText,
    PartialLinkText,
    ClassName,
    TagName,
}

impl Generate for LocatorGen {
    type Output = Selector;

    fn generate(
        &self,
        caps: &Captures<'_>,
        _input: &str,
        _params: &[String],
    ) -> Result<Selector, GenerateError> {
        let selector = match self {
            Self::TestId => Selector::TestId(Arg::literal(quoted_value(caps, "v")?)),
            Self::RoleByText => Selector::Role {
                role: role_for_tag(capture(caps, "tag")?)?.to_owned(),
                name: Some(Arg::literal(quoted_value(caps, "v")?)),
                exact: false,
            },
            Self::TextExact => Selector::Text {
                text: Arg::literal(quoted_value(caps, "v")?),
                exact: true,
            },
            Self::TextContains => Selector::Text {
                text: Arg::literal(quoted_value(caps, "v")?),
                exact: false,
            },
            Self::Placeholder => Selector::Placeholder(Arg::literal(quoted_value(caps, "v")?)),
            Self::AriaLabel => Selector::Label(Arg::literal(quoted_value(caps, "v")?)),
            Self::AltText => Selector::AltText(Arg::literal(quoted_value(caps, "v")?)),
            Self::Title => Selector::Title(Arg::literal(quoted_value(caps, "v")?)),
            Self::IdAttribute => {
                Selector::Css(id_selector(capture(caps, "tag")?, quoted_value(caps, "v")?))
            }
            Self::Attribute => {
                let tag = capture(caps, "tag")?;
                let attr = capture(caps, "attr")?;
                let value = quoted_value(caps, "v")?;
                Selector::Css(attribute_selector(tag, attr, value))
            }
            Self::Positional => {
                let position: usize = capture(caps, "n")?
                    .parse()
                    .map_err(|_| GenerateError::Unsupported("position".to_owned()))?;
                // XPath positions are 1-based.
                let index = position
                    .checked_sub(1)
                    .ok_or_else(|| GenerateError::Unsupported("position 0".to_owned()))?;
                let inner = capture(caps, "inner")?;
                let base = locator_rules().translate(&format!("xpath={inner}"), &[]);
                if base.is_fallback() {
                    return Err(GenerateError::Unsupported(inner.to_owned()));
                }
                Selector::Nth {
                    base: Box::new(base.output),
                    index,
                }
            }
            Self::Id => Selector::Css(id_selector("*", capture(caps, "v")?)),
            Self::Name => Selector::Css(attribute_selector("*", "name", capture(caps, "v")?)),
            Self::Css => Selector::Css(capture(caps, "v")?.to_owned()),
            Self::LinkText => Selector::Role {
                role: "link".to_owned(),
                name: Some(Arg::literal(capture(caps, "v")?)),
                exact: true,
            },
            Self::PartialLinkText => Selector::Role {
                role: "link".to_owned(),
                name: Some(Arg::literal(capture(caps, "v")?)),
                exact: false,
            },
            Self::ClassName => Selector::Css(format!(".{}", capture(caps, "v")?)),
            Self::TagName => Selector::Css(capture(caps, "v")?.to_owned()),
        };
        Ok(selector)
    }
}

/// Implicit ARIA role of an HTML element, for elements where the visible text
/// is also the accessible name.
fn role_for_tag(tag: &str) -> Result<&'static str, GenerateError> {
    let role = match tag.to_ascii_lowercase().as_str() {
        "button" => "button",
        "a" => "link",
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => "heading",
        "li" => "listitem",
        "option" => "option",
        "td" => "cell",
        "th" => "columnheader",
        "tr" => "row",
        "summary" => "group",
        _ => return Err(GenerateError::UnknownRole(tag.to_owned())),
    };
    Ok(role)
}

fn is_css_ident(value: &str) -> bool {
    let mut chars = value.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn css_tag(tag: &str) -> &str {
    if tag == "*" {
        ""
    } else {
        tag
    }
}

fn css_string(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn id_selector(tag: &str, id: &str) -> String {
    if is_css_ident(id) {
        format!("{}#{id}", css_tag(tag))
    } else {
        attribute_selector(tag, "id", id)
    }
}

fn attribute_selector(tag: &str, attr: &str, value: &str) -> String {
    if attr == "class" && is_css_ident(value) {
        return format!("{}.{value}", css_tag(tag));
    }
    format!("{}[{attr}={}]", css_tag(tag), css_string(value))
}

static LOCATOR_RULES: LazyLock<RuleSet<LocatorGen>> = LazyLock::new(|| {
    use Classification::{Semantic, Structural};
    use LocatorGen as G;

    let q = quoted("v");
    let tag = r"(?P<tag>[A-Za-z][\w-]*|\*)";
    let text_fn = r"(?:text\(\)|normalize-space\(\)|normalize-space\(text\(\)\)|normalize-space\(\.\)|\.)";

    RuleSet::new(
        vec![
            Rule::new(
                "test-id",
                &format!(r"^xpath=//{tag}\[@data-testid\s*=\s*{q}\]$"),
                Semantic,
                G::TestId,
            ),
            Rule::new(
                "role-by-text",
                &format!(r"^xpath=//{tag}\[{text_fn}\s*=\s*{q}\]$"),
                Semantic,
                G::RoleByText,
            ),
            Rule::new(
                "role-contains-text",
                &format!(r"^xpath=//{tag}\[contains\(\s*{text_fn}\s*,\s*{q}\s*\)\]$"),
                Semantic,
                G::RoleByText,
            ),
            Rule::new(
                "text-exact",
                &format!(r"^xpath=//{tag}\[{text_fn}\s*=\s*{q}\]$"),
                Semantic,
                G::TextExact,
            ),
            Rule::new(
                "text-contains",
                &format!(r"^xpath=//{tag}\[contains\(\s*{text_fn}\s*,\s*{q}\s*\)\]$"),
                Semantic,
                G::TextContains,
            ),
            Rule::new(
                "placeholder",
                &format!(r"^xpath=//(?:input|textarea|\*)\[@placeholder\s*=\s*{q}\]$"),
                Semantic,
                G::Placeholder,
            ),
            Rule::new(
                "aria-label",
                &format!(r"^xpath=//{tag}\[@aria-label\s*=\s*{q}\]$"),
                Semantic,
                G::AriaLabel,
            ),
            Rule::new(
                "alt-text",
                &format!(r"^xpath=//(?:img|area|\*)\[@alt\s*=\s*{q}\]$"),
                Semantic,
                G::AltText,
            ),
            Rule::new(
                "title",
                &format!(r"^xpath=//{tag}\[@title\s*=\s*{q}\]$"),
                Semantic,
                G::Title,
            ),
            Rule::new(
                "id-attribute",
                &format!(r"^xpath=//{tag}\[@id\s*=\s*{q}\]$"),
                Structural,
                G::IdAttribute,
            ),
            Rule::new(
                "attribute",
                &format!(r"^xpath=//{tag}\[@(?P<attr>[\w:-]+)\s*=\s*{q}\]$"),
                Structural,
                G::Attribute,
            ),
            Rule::new(
                "positional",
                r"^xpath=\((?P<inner>//.+)\)\[(?P<n>\d+)\]$",
                Structural,
                G::Positional,
            ),
            Rule::new("id", r"^id=(?P<v>.+)$", Structural, G::Id),
            Rule::new("name", r"^name=(?P<v>.+)$", Structural, G::Name),
            Rule::new("css", r"^css=(?P<v>.+)$", Structural, G::Css),
            Rule::new("link-text", r"^link=(?P<v>.+)$", Semantic, G::LinkText),
            Rule::new(
                "partial-link-text",
                r"^partialLink=(?P<v>.+)$",
                Semantic,
                G::PartialLinkText,
            ),
            Rule::new("class-name", r"^className=(?P<v>[\w-]+)$", Structural, G::ClassName),
            Rule::new("tag-name", r"^tagName=(?P<v>[\w-]+)$", Structural, G::TagName),
        ],
        |input| Selector::Raw(input.to_owned()),
    )
});

pub fn locator_rules() -> &'static RuleSet<LocatorGen> {
    &LOCATOR_RULES
}

/// Normalize and translate one locator expression.
pub fn translate_locator(raw: &str) -> Translation<Selector> {
    locator_rules().translate(&normalize(raw), &[])
}
