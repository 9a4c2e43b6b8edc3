//! Java page-method statement → Playwright action rules.
//!
//! Input is a single statement with whitespace collapsed and the trailing `;`
//! removed. Params are the element field names declared on the page class;
//! element rules decline receivers that are not in that list.

use super::{capture, Classification, Generate, GenerateError, Rule, RuleSet, MANUAL_SENTINEL};
use crate::rules::locator::{from_strategy, translate_locator};
use regex::Captures;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy)]
pub enum ActionGen {
    Click,
    DoubleClick,
    Hover,
    PressKey,
    Fill,
    Clear,
    Submit,
    /// Value-returning element call, rendered with the Playwright method name.
    Query(&'static str),
    SelectLabel,
    SelectValue,
    SelectIndex,
    WaitFor,
    ExpectVisible,
    ExpectHidden,
    ExpectText,
    Goto,
    Reload,
    Back,
    Sleep,
    FindElementOp,
    ReturnPage,
    Log,
}

impl Generate for ActionGen {
    type Output = String;

    fn generate(
        &self,
        caps: &Captures<'_>,
        _input: &str,
        params: &[String],
    ) -> Result<String, GenerateError> {
        let out = match self {
            Self::Click => format!("await this.{}.click();", element(caps, params)?),
            Self::DoubleClick => format!("await this.{}.dblclick();", element(caps, params)?),
            Self::Hover => format!("await this.{}.hover();", element(caps, params)?),
            Self::PressKey => {
                let el = element(caps, params)?;
                let key = playwright_key(capture(caps, "key")?)?;
                format!("await this.{el}.press('{key}');")
            }
            Self::Fill => {
                let el = element(caps, params)?;
                let args = capture(caps, "args")?;
                if args.contains("Keys.") {
                    return Err(GenerateError::Unsupported(args.to_owned()));
                }
                format!("await this.{el}.fill({args});")
            }
            Self::Clear => format!("await this.{}.clear();", element(caps, params)?),
            Self::Submit => format!("await this.{}.press('Enter');", element(caps, params)?),
            Self::Query(method) => {
                let el = element(caps, params)?;
                let lhs = assignment_target(caps.name("lhs").map(|m| m.as_str()));
                let args = caps.name("args").map_or("", |m| m.as_str());
                format!("{lhs}await this.{el}.{method}({args});")
            }
            Self::SelectLabel => format!(
                "await this.{}.selectOption({{ label: {} }});",
                element(caps, params)?,
                capture(caps, "args")?
            ),
            Self::SelectValue => format!(
                "await this.{}.selectOption({});",
                element(caps, params)?,
                capture(caps, "args")?
            ),
            Self::SelectIndex => format!(
                "await this.{}.selectOption({{ index: {} }});",
                element(caps, params)?,
                capture(caps, "args")?
            ),
            Self::WaitFor => {
                let el = element(caps, params)?;
                let state = match capture(caps, "op")? {
                    "waitForVisible" => "visible",
                    "waitForNotVisible" => "hidden",
                    "waitForPresent" => "attached",
                    "waitForNotPresent" => "detached",
                    other => return Err(GenerateError::Unsupported(other.to_owned())),
                };
                match caps.name("args").map(|m| m.as_str().trim()) {
                    Some(timeout) if !timeout.is_empty() => format!(
                        "await this.{el}.waitFor({{ state: '{state}', timeout: {timeout} }});"
                    ),
                    _ => format!("await this.{el}.waitFor({{ state: '{state}' }});"),
                }
            }
            Self::ExpectVisible => {
                format!("await expect(this.{}).toBeVisible();", element(caps, params)?)
            }
            Self::ExpectHidden => {
                format!("await expect(this.{}).toBeHidden();", element(caps, params)?)
            }
            Self::ExpectText => {
                let args = capture(caps, "args")?;
                if args.contains("StringMatcher") {
                    return Err(GenerateError::Unsupported(args.to_owned()));
                }
                format!(
                    "await expect(this.{}).toHaveText({args});",
                    element(caps, params)?
                )
            }
            Self::Goto => format!("await this.page.goto({});", capture(caps, "args")?),
            Self::Reload => "await this.page.reload();".to_owned(),
            Self::Back => "await this.page.goBack();".to_owned(),
            Self::Sleep => format!("await this.page.waitForTimeout({});", capture(caps, "args")?),
            Self::FindElementOp => {
                let value = unescape_java(capture(caps, "lit")?);
                let locator = translate_locator(&from_strategy(capture(caps, "by")?, &value));
                if locator.is_fallback() {
                    return Err(GenerateError::Unsupported(locator.source));
                }
                let target = locator.output.render("this.page");
                match capture(caps, "op")? {
                    "click" => format!("await {target}.click();"),
                    "clear" => format!("await {target}.clear();"),
                    "sendKeys" => format!("await {target}.fill({});", capture(caps, "args")?),
                    other => return Err(GenerateError::Unsupported(other.to_owned())),
                }
            }
            Self::ReturnPage => format!("return new {}(this.page);", capture(caps, "cls")?),
            Self::Log => format!("console.log({});", capture(caps, "args")?),
        };
        Ok(out)
    }
}

fn element<'a>(caps: &Captures<'a>, params: &[String]) -> Result<&'a str, GenerateError> {
    let el = capture(caps, "el")?;
    if params.iter().any(|p| p == el) {
        Ok(el)
    } else {
        Err(GenerateError::UnknownElement(el.to_owned()))
    }
}

/// Render the left-hand side of a value-returning statement.
fn assignment_target(lhs: Option<&str>) -> String {
    let Some(lhs) = lhs.map(str::trim) else {
        return String::new();
    };
    if lhs == "return" {
        return "return ".to_owned();
    }
    // `Type name =` declares, `name =` assigns.
    let target = lhs.trim_end_matches('=').trim();
    match target.rsplit_once(' ') {
        Some((_, name)) => format!("const {name} = "),
        None => format!("{target} = "),
    }
}

fn playwright_key(java: &str) -> Result<&'static str, GenerateError> {
    let key = match java {
        "ENTER" | "RETURN" => "Enter",
        "TAB" => "Tab",
        "ESCAPE" => "Escape",
        "BACK_SPACE" => "Backspace",
        "DELETE" => "Delete",
        "SPACE" => "Space",
        "ARROW_DOWN" | "DOWN" => "ArrowDown",
        "ARROW_UP" | "UP" => "ArrowUp",
        "ARROW_LEFT" | "LEFT" => "ArrowLeft",
        "ARROW_RIGHT" | "RIGHT" => "ArrowRight",
        "HOME" => "Home",
        "END" => "End",
        other => return Err(GenerateError::Unsupported(format!("Keys.{other}"))),
    };
    Ok(key)
}

/// Strip the quotes from a Java string literal and resolve its escapes.
pub(crate) fn unescape_java(literal: &str) -> String {
    let inner = literal
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(literal);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

static ACTION_RULES: LazyLock<RuleSet<ActionGen>> = LazyLock::new(|| {
    use ActionGen as G;
    use Classification::{Semantic, Structural};

    let el = r"(?:this\.)?(?P<el>\w+)";
    let lhs = r"(?P<lhs>return |(?:final )?[\w<>\[\]]+ \w+ = |\w+ = )?";
    let driver = r"(?:this\.)?(?:driver|getDriver\(\))";

    RuleSet::new(
        vec![
            Rule::new("click", &format!(r"^{el}\.click\(\)$"), Semantic, G::Click),
            Rule::new(
                "double-click",
                &format!(r"^{el}\.doubleClick\(\)$"),
                Semantic,
                G::DoubleClick,
            ),
            Rule::new("hover", &format!(r"^{el}\.mouseOver\(\)$"), Semantic, G::Hover),
            Rule::new(
                "press-key",
                &format!(r"^{el}\.sendKeys\(Keys\.(?P<key>\w+)\)$"),
                Semantic,
                G::PressKey,
            ),
            Rule::new("fill", &format!(r"^{el}\.sendKeys\((?P<args>.+)\)$"), Semantic, G::Fill),
            Rule::new("clear", &format!(r"^{el}\.clear\(\)$"), Semantic, G::Clear),
            Rule::new("submit", &format!(r"^{el}\.submit\(\)$"), Semantic, G::Submit),
            Rule::new(
                "get-text",
                &format!(r"^{lhs}{el}\.getText\(\)$"),
                Semantic,
                G::Query("innerText"),
            ),
            Rule::new(
                "get-attribute",
                &format!(r"^{lhs}{el}\.getAttribute\((?P<args>.+)\)$"),
                Semantic,
                G::Query("getAttribute"),
            ),
            Rule::new(
                "is-visible",
                &format!(r"^{lhs}{el}\.(?:isDisplayed|isPresent|isVisible)\(\)$"),
                Semantic,
                G::Query("isVisible"),
            ),
            Rule::new(
                "is-enabled",
                &format!(r"^{lhs}{el}\.isEnabled\(\)$"),
                Semantic,
                G::Query("isEnabled"),
            ),
            Rule::new(
                "is-selected",
                &format!(r"^{lhs}{el}\.isSelected\(\)$"),
                Semantic,
                G::Query("isChecked"),
            ),
            Rule::new(
                "select-label",
                &format!(r"^new Select\({el}\)\.selectByVisibleText\((?P<args>.+)\)$"),
                Semantic,
                G::SelectLabel,
            ),
            Rule::new(
                "select-value",
                &format!(r"^new Select\({el}\)\.selectByValue\((?P<args>.+)\)$"),
                Semantic,
                G::SelectValue,
            ),
            Rule::new(
                "select-index",
                &format!(r"^new Select\({el}\)\.selectByIndex\((?P<args>.+)\)$"),
                Structural,
                G::SelectIndex,
            ),
            Rule::new(
                "wait-for",
                &format!(r"^{el}\.(?P<op>waitFor\w+)\((?P<args>[^()]*)\)$"),
                Structural,
                G::WaitFor,
            ),
            Rule::new(
                "expect-visible",
                &format!(r"^{el}\.(?:verify|assert)(?:Visible|Present)\([^()]*\)$"),
                Semantic,
                G::ExpectVisible,
            ),
            Rule::new(
                "expect-hidden",
                &format!(r"^{el}\.(?:verify|assert)Not(?:Visible|Present)\([^()]*\)$"),
                Semantic,
                G::ExpectHidden,
            ),
            Rule::new(
                "expect-text",
                &format!(r"^{el}\.(?:verify|assert)Text\((?P<args>.+)\)$"),
                Semantic,
                G::ExpectText,
            ),
            Rule::new(
                "goto",
                &format!(r"^{driver}\.(?:get|navigate\(\)\.to)\((?P<args>.+)\)$"),
                Structural,
                G::Goto,
            ),
            Rule::new(
                "reload",
                &format!(r"^{driver}\.navigate\(\)\.refresh\(\)$"),
                Structural,
                G::Reload,
            ),
            Rule::new(
                "back",
                &format!(r"^{driver}\.navigate\(\)\.back\(\)$"),
                Structural,
                G::Back,
            ),
            Rule::new(
                "sleep",
                r"^(?:Thread\.sleep|(?:QAFTestBase\.)?pause)\((?P<args>.+)\)$",
                Structural,
                G::Sleep,
            ),
            Rule::new(
                "find-element",
                &format!(
                    r#"^{driver}\.findElement\(By\.(?P<by>\w+)\((?P<lit>"(?:[^"\\]|\\.)*")\)\)\.(?P<op>click|clear|sendKeys)\((?P<args>.*)\)$"#
                ),
                Structural,
                G::FindElementOp,
            ),
            Rule::new(
                "return-page",
                r"^return new (?P<cls>[A-Z]\w*)\([^()]*\)$",
                Structural,
                G::ReturnPage,
            ),
            Rule::new(
                "log",
                r"^(?:Reporter|log|logger|LOGGER|LOG)\.(?:log|info|debug)\((?P<args>.+)\)$",
                Structural,
                G::Log,
            ),
        ],
        |input| format!("// {MANUAL_SENTINEL}[action]: {input}"),
    )
});

pub fn action_rules() -> &'static RuleSet<ActionGen> {
    &ACTION_RULES
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elements() -> Vec<String> {
        vec!["username".to_owned(), "loginButton".to_owned(), "country".to_owned()]
    }

    fn translate(stmt: &str) -> String {
        action_rules().translate(stmt, &elements()).output
    }

    #[test]
    fn test_element_actions() {
        assert_eq!(translate("loginButton.click()"), "await this.loginButton.click();");
        assert_eq!(
            translate("this.username.sendKeys(user)"),
            "await this.username.fill(user);"
        );
        assert_eq!(
            translate("username.sendKeys(Keys.ENTER)"),
            "await this.username.press('Enter');"
        );
        assert_eq!(translate("username.clear()"), "await this.username.clear();");
    }

    #[test]
    fn test_value_returning_statements() {
        assert_eq!(
            translate("return username.getText()"),
            "return await this.username.innerText();"
        );
        assert_eq!(
            translate("String value = username.getAttribute(\"value\")"),
            "const value = await this.username.getAttribute(\"value\");"
        );
        assert_eq!(
            translate("return loginButton.isDisplayed()"),
            "return await this.loginButton.isVisible();"
        );
    }

    #[test]
    fn test_unknown_element_falls_back() {
        let t = action_rules().translate("somethingElse.click()", &elements());
        assert!(t.is_fallback());
        assert_eq!(t.output, "// PW-MANUAL[action]: somethingElse.click()");
    }

    #[test]
    fn test_unmapped_key_falls_back() {
        // press-key declines, fill declines on Keys.*, nothing else matches.
        let t = action_rules().translate("username.sendKeys(Keys.F5)", &elements());
        assert!(t.is_fallback());
    }

    #[test]
    fn test_select_and_waits() {
        assert_eq!(
            translate("new Select(country).selectByVisibleText(name)"),
            "await this.country.selectOption({ label: name });"
        );
        assert_eq!(
            translate("loginButton.waitForVisible()"),
            "await this.loginButton.waitFor({ state: 'visible' });"
        );
        assert_eq!(
            translate("loginButton.waitForNotVisible(5000)"),
            "await this.loginButton.waitFor({ state: 'hidden', timeout: 5000 });"
        );
        assert_eq!(
            translate("loginButton.verifyPresent()"),
            "await expect(this.loginButton).toBeVisible();"
        );
    }

    #[test]
    fn test_page_level_actions() {
        assert_eq!(
            translate("driver.get(\"https://example.com\")"),
            "await this.page.goto(\"https://example.com\");"
        );
        assert_eq!(translate("Thread.sleep(2000)"), "await this.page.waitForTimeout(2000);");
        assert_eq!(translate("return new HomePage()"), "return new HomePage(this.page);");
    }

    #[test]
    fn test_inline_find_element() {
        let t = action_rules().translate(
            "driver.findElement(By.xpath(\"//button[text()='Go']\")).click()",
            &[],
        );
        assert_eq!(t.rule, Some("find-element"));
        assert_eq!(
            t.output,
            "await this.page.getByRole('button', { name: 'Go' }).click();"
        );
    }

    #[test]
    fn test_unescape_java() {
        assert_eq!(unescape_java(r#""a\"b""#), "a\"b");
        assert_eq!(unescape_java(r#""x\\y""#), "x\\y");
    }
}
