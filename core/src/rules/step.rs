//! Step sentence → Playwright step body rules.
//!
//! Sentences are matched in Cucumber-expression form. A capture that is a
//! parameter placeholder (`{string}`, `{int}`...) resolves to the step
//! function's parameter at the same position; anything else is a literal.

use super::{Classification, Generate, GenerateError, Rule, RuleSet, MANUAL_SENTINEL};
use crate::generate::ts::Arg;
use crate::rules::locator::Selector;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{(?:string|int|float|word|double|long|byte|short|bigdecimal|biginteger)?\}")
        .unwrap()
});

static QUOTED_GROUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""\([^()]*\)""#).unwrap());
static INT_GROUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(-?\\d\+\)").unwrap());
static ANY_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((?:\.\*|\.\+|\[[^\]]*\][*+])\)").unwrap());
static NAMED_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{(\w*)\}").unwrap());
static QUOTED_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"["']\{(\w*)\}["']"#).unwrap());

const CUCUMBER_TYPES: &[&str] = &[
    "", "string", "int", "float", "word", "double", "long", "byte", "short", "bigdecimal",
    "biginteger",
];

/// Convert a QAF or Cucumber-regex step description to a Cucumber expression.
///
/// `user enters "([^"]*)" in (\d+) fields` → `user enters {string} in {int} fields`,
/// `user clicks on "{0}" button` → `user clicks on {string} button`. Unquoted
/// QAF placeholders become `{}` since feature arguments are not quoted.
pub fn to_cucumber_expression(description: &str) -> String {
    let text = description.trim();
    let text = text.strip_prefix('^').unwrap_or(text);
    let text = text.strip_suffix('$').unwrap_or(text);

    let text = QUOTED_GROUP.replace_all(text, "{string}");
    let text = INT_GROUP.replace_all(&text, "{int}");
    let text = ANY_GROUP.replace_all(&text, "{}");
    let text = QUOTED_PLACEHOLDER.replace_all(&text, "{$1}");
    let text = NAMED_PLACEHOLDER.replace_all(&text, |caps: &Captures<'_>| {
        let name = &caps[1];
        if CUCUMBER_TYPES.contains(&name) {
            caps[0].to_owned()
        } else {
            "{}".to_owned()
        }
    });
    text.into_owned()
}

/// Narrow anonymous `{}` placeholders to `{int}` or `{float}` when the Java
/// parameter at the same position is numeric.
pub fn with_param_types(expression: &str, java_types: &[String]) -> String {
    let mut index = 0usize;
    PLACEHOLDER
        .replace_all(expression, |caps: &Captures<'_>| {
            let ty = java_types.get(index).map(|t| t.trim());
            index += 1;
            match (&caps[0], ty) {
                (
                    "{}",
                    Some("int" | "Integer" | "long" | "Long" | "short" | "Short" | "byte" | "Byte"),
                ) => "{int}".to_owned(),
                ("{}", Some("float" | "Float" | "double" | "Double")) => "{float}".to_owned(),
                (other, _) => other.to_owned(),
            }
        })
        .into_owned()
}

/// Placeholders of a Cucumber expression, in order.
pub fn placeholders(expression: &str) -> Vec<&str> {
    PLACEHOLDER.find_iter(expression).map(|m| m.as_str()).collect()
}

/// Count the parameter placeholders in a Cucumber expression.
pub fn placeholder_count(expression: &str) -> usize {
    PLACEHOLDER.find_iter(expression).count()
}

#[derive(Debug, Clone, Copy)]
pub enum StepGen {
    ClickRole(&'static str),
    ClickText,
    Check,
    Fill,
    Select,
    Goto,
    ExpectText { visible: bool },
    ExpectTitle,
    WaitSeconds,
}

impl Generate for StepGen {
    type Output = String;

    fn generate(
        &self,
        caps: &Captures<'_>,
        input: &str,
        params: &[String],
    ) -> Result<String, GenerateError> {
        let arg = |name: &'static str| step_arg(caps, name, input, params);

        let out = match self {
            Self::ClickRole(role) => {
                let locator = Selector::Role {
                    role: (*role).to_owned(),
                    name: Some(arg("name")?),
                    exact: false,
                };
                format!("await {}.click();", locator.render("page"))
            }
            Self::ClickText => {
                let locator = Selector::Text {
                    text: arg("name")?,
                    exact: false,
                };
                format!("await {}.click();", locator.render("page"))
            }
            Self::Check => {
                let locator = Selector::Role {
                    role: "checkbox".to_owned(),
                    name: Some(arg("name")?),
                    exact: false,
                };
                format!("await {}.check();", locator.render("page"))
            }
            Self::Fill => format!(
                "await {}.fill({});",
                Selector::Label(arg("field")?).render("page"),
                arg("value")?.to_ts()
            ),
            Self::Select => format!(
                "await {}.selectOption({});",
                Selector::Label(arg("field")?).render("page"),
                arg("option")?.to_ts()
            ),
            Self::Goto => {
                let url = arg("url")?;
                if let Arg::Literal(ref value) = url {
                    if !(value.starts_with("http") || value.starts_with('/')) {
                        return Err(GenerateError::Unsupported(value.clone()));
                    }
                }
                format!("await page.goto({});", url.to_ts())
            }
            Self::ExpectText { visible } => {
                let locator = Selector::Text {
                    text: arg("text")?,
                    exact: false,
                };
                let assertion = if *visible { "toBeVisible" } else { "toBeHidden" };
                format!("await expect({}).{assertion}();", locator.render("page"))
            }
            Self::ExpectTitle => format!("await expect(page).toHaveTitle({});", arg("title")?.to_ts()),
            Self::WaitSeconds => match arg("n")? {
                Arg::Param(name) => format!("await page.waitForTimeout({name} * 1000);"),
                Arg::Literal(seconds) => {
                    let seconds: u64 = seconds
                        .parse()
                        .map_err(|_| GenerateError::Unsupported(seconds.clone()))?;
                    let millis = seconds
                        .checked_mul(1000)
                        .ok_or_else(|| GenerateError::Unsupported(seconds.to_string()))?;
                    format!("await page.waitForTimeout({millis});")
                }
            },
        };
        Ok(out)
    }
}

/// Resolve a capture to a literal or to the positional step parameter.
fn step_arg(
    caps: &Captures<'_>,
    name: &'static str,
    input: &str,
    params: &[String],
) -> Result<Arg, GenerateError> {
    let m = caps.name(name).ok_or(GenerateError::MissingCapture(name))?;
    let text = m.as_str().trim();

    if PLACEHOLDER.is_match(text) {
        if !PLACEHOLDER.find(text).is_some_and(|p| p.as_str() == text) {
            // A placeholder mixed with literal words can't become one argument.
            return Err(GenerateError::Unsupported(text.to_owned()));
        }
        let index = placeholder_count(&input[..m.start()]);
        let param = params.get(index).ok_or(GenerateError::MissingParam(index))?;
        return Ok(Arg::param(param.clone()));
    }

    Ok(Arg::literal(strip_quotes(text)))
}

fn strip_quotes(text: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = text
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    text
}

static STEP_RULES: LazyLock<RuleSet<StepGen>> = LazyLock::new(|| {
    use Classification::{Semantic, Structural};
    use StepGen as G;

    let who = r"(?i)^(?:(?:the )?user |I |we )?";

    RuleSet::new(
        vec![
            Rule::new(
                "expect-text-hidden",
                &format!(
                    r"{who}(?:should not see|does not see|should not be able to see) (?:the )?(?:text |message )?(?P<text>.+)$"
                ),
                Semantic,
                G::ExpectText { visible: false },
            ),
            Rule::new(
                "click-button",
                &format!(r"{who}(?:clicks?|taps?|press(?:es)?) (?:on )?(?:the )?(?P<name>.+?) button$"),
                Semantic,
                G::ClickRole("button"),
            ),
            Rule::new(
                "click-link",
                &format!(r"{who}(?:clicks?|taps?) (?:on )?(?:the )?(?P<name>.+?) link$"),
                Semantic,
                G::ClickRole("link"),
            ),
            Rule::new(
                "check-checkbox",
                &format!(r"{who}(?:checks?|ticks?|selects?) (?:the )?(?P<name>.+?) checkbox$"),
                Semantic,
                G::Check,
            ),
            Rule::new(
                "fill-field",
                &format!(
                    r"{who}(?:enters?|types?|fills? in|inputs?) (?P<value>.+?) (?:in|into|as|for) (?:the )?(?P<field>.+?)(?: field| textbox| input| box)?$"
                ),
                Semantic,
                G::Fill,
            ),
            Rule::new(
                "select-option",
                &format!(
                    r"{who}selects? (?P<option>.+?) (?:from|in) (?:the )?(?P<field>.+?)(?: dropdown| list| select)?$"
                ),
                Semantic,
                G::Select,
            ),
            Rule::new(
                "goto",
                &format!(
                    r"{who}(?:navigates? to|goes to|go to|opens?|visits?|launches?|(?:is|am|are) on) (?:the )?(?P<url>.+)$"
                ),
                Structural,
                G::Goto,
            ),
            Rule::new(
                "expect-text",
                &format!(r"{who}(?:should )?(?:see|sees) (?:the )?(?:text |message )?(?P<text>.+)$"),
                Semantic,
                G::ExpectText { visible: true },
            ),
            Rule::new(
                "expect-title",
                r"(?i)^(?:the )?(?:page )?title should (?:be|equal|contain) (?P<title>.+)$",
                Structural,
                G::ExpectTitle,
            ),
            Rule::new(
                "wait-seconds",
                &format!(r"{who}waits? (?:for )?(?P<n>\d+|\{{int\}}) seconds?$"),
                Structural,
                G::WaitSeconds,
            ),
            Rule::new(
                "click-text",
                &format!(r"{who}(?:clicks?|taps?) (?:on )?(?:the )?(?P<name>.+)$"),
                Semantic,
                G::ClickText,
            ),
        ],
        |input| format!("// {MANUAL_SENTINEL}[step]: {input}"),
    )
});

pub fn step_rules() -> &'static RuleSet<StepGen> {
    &STEP_RULES
}
