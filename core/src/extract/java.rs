//! Java page-class and step-definition unit extraction.

use super::braces::{mask_comments, member_boundaries, scan_block, scan_delimited, split_statements};
use crate::rules::action::unescape_java;
use crate::rules::locator::{from_strategy, is_normalized};
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static CLASS_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:class|enum|interface)\s+(?P<name>[A-Za-z_]\w*)").unwrap());

static METHOD_SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(?:@[\w.]+(?:\([^()]*\))?\s+)*(?P<mods>(?:(?:public|protected|private|static|final|synchronized|abstract|default)\s+)*)(?:<[\w\s,.?&]*(?:<[\w\s,.?&]*>[\w\s,.?&]*)*>\s+)?(?P<ret>[\w.<>\[\],? ]+?)\s+(?P<name>[A-Za-z_]\w*)\s*\((?P<params>(?:[^()]|\([^()]*\))*)\)\s*(?:throws\s+[\w.,\s]+?)?\s*\{",
    )
    .unwrap()
});

static FIND_BY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"@FindBy\s*\((?P<args>(?:[^()]|\([^()]*\))*)\)\s*(?:(?:public|protected|private|static|final)\s+)*(?P<ty>[\w.<>]+)\s+(?P<name>[A-Za-z_]\w*)\s*;",
    )
    .unwrap()
});

static BY_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:(?:public|protected|private|static|final)\s+)*By\s+(?P<name>[A-Za-z_]\w*)\s*=\s*By\.(?P<by>\w+)\(\s*(?P<lit>"(?:[^"\\]|\\.)*")\s*\)\s*;"#,
    )
    .unwrap()
});

static QAF_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:QAFWebElement|QAFExtendedWebElement|WebElement)\s+(?P<name>[A-Za-z_]\w*)\s*=\s*new\s+QAFExtendedWebElement\(\s*(?P<lit>"(?:[^"\\]|\\.)*")\s*\)\s*;"#,
    )
    .unwrap()
});

static PARAM_ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@[\w.]+(?:\s*\([^()]*\))?").unwrap());

static ANNOTATION_ARG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?P<key>\w+)\s*=\s*(?P<val>"(?:[^"\\]|\\.)*"|[\w.]+)"#).unwrap()
});

static STRING_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""(?:[^"\\]|\\.)*""#).unwrap());

static STEP_ANNOTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@(?P<kw>QAFTestStep|Given|When|Then|And|But|Step)\s*\(").unwrap()
});

const NOT_METHOD_NAMES: &[&str] = &[
    "if", "for", "while", "switch", "catch", "synchronized", "return", "new", "else", "try",
];

const MODIFIERS: &[&str] = &[
    "public",
    "protected",
    "private",
    "static",
    "final",
    "synchronized",
    "abstract",
    "default",
];

/// Where an element's locator comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocatorSource {
    /// A locator expression in `strategy=value` form.
    Expression(String),
    /// A QAF locator-repository key to be resolved.
    Key(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementField {
    pub name: String,
    pub locator: LocatorSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaParam {
    pub ty: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaMethod {
    pub name: String,
    pub return_type: String,
    pub params: Vec<JavaParam>,
    /// Raw annotation text preceding the signature.
    pub annotations: String,
    pub body: String,
    /// `false` when the source ended inside the body.
    pub closed: bool,
    pub is_constructor: bool,
}

impl JavaMethod {
    pub fn statements(&self) -> Vec<String> {
        split_statements(&self.body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaClass {
    pub name: String,
    pub elements: Vec<ElementField>,
    pub methods: Vec<JavaMethod>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKeyword {
    Given,
    When,
    Then,
    /// QAF steps and `@And`/`@But` carry no keyword of their own.
    Any,
}

impl StepKeyword {
    /// Name of the `playwright-bdd` function that registers this step.
    pub fn bdd_function(self) -> &'static str {
        match self {
            Self::Given => "Given",
            Self::When => "When",
            Self::Then => "Then",
            Self::Any => "Step",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDecl {
    pub keyword: StepKeyword,
    /// Description as written in the annotation (QAF or Cucumber regex).
    pub description: String,
    pub method: JavaMethod,
}

/// Extract the first class declared in `src`, with its element fields and
/// methods. Returns `None` when no class declaration is present.
pub fn parse_class(src: &str) -> Option<JavaClass> {
    let masked = mask_comments(src);
    let name = CLASS_DECL.captures(&masked)?["name"].to_owned();

    let (methods, bodies) = parse_methods(src, &masked);
    let elements = parse_elements(&masked, &bodies);

    Some(JavaClass {
        name,
        elements,
        methods,
    })
}

/// Find every top-level method. Also returns the byte ranges of their bodies
/// so field scanning can skip local variables.
fn parse_methods(src: &str, masked: &str) -> (Vec<JavaMethod>, Vec<Range<usize>>) {
    let boundaries = member_boundaries(masked);
    let mut methods = Vec::new();
    let mut ranges = Vec::new();
    let mut cursor = 0usize;

    for caps in METHOD_SIGNATURE.captures_iter(masked) {
        let (Some(whole), Some(mods)) = (caps.get(0), caps.name("mods")) else {
            continue;
        };
        if whole.start() < cursor {
            continue;
        }
        let name = &caps["name"];
        let ret = caps["ret"].trim();
        if NOT_METHOD_NAMES.contains(&name)
            || NOT_METHOD_NAMES.contains(&ret)
            || strip_generics(ret).contains(char::is_whitespace)
        {
            continue;
        }
        // With no return type the last modifier lands in `ret`.
        let is_constructor = MODIFIERS.contains(&ret);

        let block = scan_block(masked, whole.end() - 1);
        cursor = block.end();

        let member_start = boundaries
            .iter()
            .rev()
            .find(|&&b| b < whole.start())
            .map_or(0, |b| b + 1);

        methods.push(JavaMethod {
            name: name.to_owned(),
            return_type: if is_constructor {
                String::new()
            } else {
                ret.to_owned()
            },
            params: parse_params(&caps["params"]),
            annotations: masked[member_start..mods.start()].trim().to_owned(),
            body: src[block.body.clone()].to_owned(),
            closed: block.closed,
            is_constructor,
        });
        ranges.push(block.body);
    }

    (methods, ranges)
}

fn strip_generics(ty: &str) -> String {
    let mut depth = 0usize;
    ty.chars()
        .filter(|&c| {
            match c {
                '<' => depth += 1,
                '>' => {
                    depth = depth.saturating_sub(1);
                    return false;
                }
                _ => {}
            }
            depth == 0
        })
        .collect()
}

fn parse_params(params: &str) -> Vec<JavaParam> {
    let params = PARAM_ANNOTATION.replace_all(params, " ");
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();

    let push = |raw: &str, out: &mut Vec<JavaParam>| {
        let words: Vec<&str> = raw
            .split_whitespace()
            .filter(|w| *w != "final")
            .collect();
        if let Some((name, ty)) = words.split_last() {
            if !ty.is_empty() {
                out.push(JavaParam {
                    ty: ty.join(" "),
                    name: (*name).to_owned(),
                });
            }
        }
    };

    for c in params.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth -= 1,
            ',' if depth == 0 => {
                push(&current, &mut out);
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    push(&current, &mut out);
    out
}

fn inside(ranges: &[Range<usize>], offset: usize) -> bool {
    ranges.iter().any(|r| r.contains(&offset))
}

fn parse_elements(masked: &str, method_bodies: &[Range<usize>]) -> Vec<ElementField> {
    let mut found: Vec<(usize, ElementField)> = Vec::new();

    for caps in FIND_BY.captures_iter(masked) {
        let start = caps.get(0).map_or(0, |m| m.start());
        if inside(method_bodies, start) {
            continue;
        }
        if let Some(locator) = find_by_locator(&caps["args"]) {
            found.push((
                start,
                ElementField {
                    name: caps["name"].to_owned(),
                    locator,
                },
            ));
        }
    }

    for caps in BY_FIELD.captures_iter(masked) {
        let start = caps.get(0).map_or(0, |m| m.start());
        if inside(method_bodies, start) {
            continue;
        }
        let value = unescape_java(&caps["lit"]);
        found.push((
            start,
            ElementField {
                name: caps["name"].to_owned(),
                locator: LocatorSource::Expression(from_strategy(&caps["by"], &value)),
            },
        ));
    }

    for caps in QAF_FIELD.captures_iter(masked) {
        let start = caps.get(0).map_or(0, |m| m.start());
        if inside(method_bodies, start) {
            continue;
        }
        found.push((
            start,
            ElementField {
                name: caps["name"].to_owned(),
                locator: qaf_locator(&unescape_java(&caps["lit"])),
            },
        ));
    }

    found.sort_by_key(|(start, _)| *start);
    found.into_iter().map(|(_, field)| field).collect()
}

/// Interpret `@FindBy(...)` arguments: `xpath = "..."`, `how = How.ID, using = "..."`
/// or QAF's `locator = "..."`.
fn find_by_locator(args: &str) -> Option<LocatorSource> {
    let mut how: Option<String> = None;
    let mut using: Option<String> = None;

    for caps in ANNOTATION_ARG.captures_iter(args) {
        let key = &caps["key"];
        let raw = &caps["val"];
        let value = if raw.starts_with('"') {
            unescape_java(raw)
        } else {
            raw.to_owned()
        };
        match key {
            "how" => how = value.rsplit('.').next().map(str::to_owned),
            "using" => using = Some(value),
            "locator" => return Some(qaf_locator(&value)),
            _ if raw.starts_with('"') => {
                return Some(LocatorSource::Expression(from_strategy(key, &value)));
            }
            _ => {}
        }
    }

    match (how, using) {
        (Some(how), Some(using)) => Some(LocatorSource::Expression(from_strategy(&how, &using))),
        _ => None,
    }
}

/// QAF accepts a locator expression or a repository key in the same place.
fn qaf_locator(value: &str) -> LocatorSource {
    let expr = from_strategy("locator", value);
    if is_normalized(&expr) {
        LocatorSource::Expression(expr)
    } else {
        LocatorSource::Key(value.trim().to_owned())
    }
}

/// Extract step declarations (`@QAFTestStep`, `@Given`, ...) from a class.
pub fn parse_steps(src: &str) -> Vec<StepDecl> {
    let masked = mask_comments(src);
    let (methods, _) = parse_methods(src, &masked);

    methods
        .into_iter()
        .filter_map(|method| {
            let (keyword, description) = step_annotation(&method.annotations)?;
            Some(StepDecl {
                keyword,
                description,
                method,
            })
        })
        .collect()
}

fn step_annotation(annotations: &str) -> Option<(StepKeyword, String)> {
    let caps = STEP_ANNOTATION.captures(annotations)?;
    let whole = caps.get(0)?;
    let open = whole.end() - 1;
    let block = scan_delimited(annotations, open, '(', ')');
    let args = &annotations[block.body];

    let keyword = match &caps["kw"] {
        "Given" => StepKeyword::Given,
        "When" => StepKeyword::When,
        "Then" => StepKeyword::Then,
        _ => StepKeyword::Any,
    };

    let description = ANNOTATION_ARG
        .captures_iter(args)
        .find(|c| matches!(&c["key"], "description" | "value") && c["val"].starts_with('"'))
        .map(|c| unescape_java(&c["val"]))
        .or_else(|| STRING_LITERAL.find(args).map(|m| unescape_java(m.as_str())))?;

    Some((keyword, description))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOGIN_PAGE: &str = r#"
package com.acme.pages;

import org.openqa.selenium.By;

/**
 * Login page. Not a method: void fake() { }
 */
public class LoginPage extends BasePage {

    @FindBy(locator = "login.username")
    private QAFWebElement username;

    @FindBy(xpath = "//button[text()='Sign in']")
    private WebElement signIn;

    @FindBy(how = How.ID, using = "remember")
    private WebElement rememberMe;

    private By errorBanner = By.cssSelector(".alert-error");

    QAFWebElement footer = new QAFExtendedWebElement("id=footer");

    public LoginPage(WebDriver driver) {
        super(driver);
    }

    @Override
    public void login(String user, final String password) {
        username.sendKeys(user);
        if (user.isEmpty()) {
            By local = By.id("x");
        }
        signIn.click();
    }

    public String getError() {
        return errorBanner.getText();
    }
}
"#;

    #[test]
    fn test_parse_class_name_and_elements() {
        let class = parse_class(LOGIN_PAGE).unwrap();
        assert_eq!(class.name, "LoginPage");
        let names: Vec<&str> = class.elements.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["username", "signIn", "rememberMe", "errorBanner", "footer"]
        );
        assert_eq!(
            class.elements[0].locator,
            LocatorSource::Key("login.username".to_owned())
        );
        assert_eq!(
            class.elements[1].locator,
            LocatorSource::Expression("xpath=//button[text()='Sign in']".to_owned())
        );
        assert_eq!(
            class.elements[2].locator,
            LocatorSource::Expression("id=remember".to_owned())
        );
        assert_eq!(
            class.elements[3].locator,
            LocatorSource::Expression("css=.alert-error".to_owned())
        );
        assert_eq!(
            class.elements[4].locator,
            LocatorSource::Expression("id=footer".to_owned())
        );
    }

    #[test]
    fn test_parse_methods() {
        let class = parse_class(LOGIN_PAGE).unwrap();
        let names: Vec<&str> = class.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["LoginPage", "login", "getError"]);

        assert!(class.methods[0].is_constructor);

        let login = &class.methods[1];
        assert!(!login.is_constructor);
        assert_eq!(login.return_type, "void");
        assert_eq!(
            login.params,
            vec![
                JavaParam {
                    ty: "String".to_owned(),
                    name: "user".to_owned()
                },
                JavaParam {
                    ty: "String".to_owned(),
                    name: "password".to_owned()
                },
            ]
        );
        assert!(login.annotations.contains("@Override"));
        assert_eq!(
            login.statements(),
            vec![
                "username.sendKeys(user)",
                "if (user.isEmpty()) { By local = By.id(\"x\"); }",
                "signIn.click()",
            ]
        );
    }

    #[test]
    fn test_truncated_class_terminates() {
        let src = "public class Broken {\n public void a() {\n click();\n if (x) {";
        let class = parse_class(src).unwrap();
        assert_eq!(class.methods.len(), 1);
        assert!(!class.methods[0].closed);
    }

    #[test]
    fn test_no_class() {
        assert!(parse_class("// nothing here\n").is_none());
    }

    #[test]
    fn test_parse_steps() {
        let src = r#"
public class LoginSteps {
    @QAFTestStep(description = "user enters {0} into the {1} field")
    public void enter(String value, String field) {
        new LoginPage().type(field, value);
    }

    @When("^user clicks on \"([^\"]*)\" \\(primary\\)$")
    public void click(String name) { }

    private void helper() { }
}
"#;
        let steps = parse_steps(src);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].keyword, StepKeyword::Any);
        assert_eq!(steps[0].description, "user enters {0} into the {1} field");
        assert_eq!(steps[0].method.params.len(), 2);
        assert_eq!(steps[1].keyword, StepKeyword::When);
        assert_eq!(
            steps[1].description,
            r#"^user clicks on "([^"]*)" \(primary\)$"#
        );
    }

    #[test]
    fn test_annotated_params_and_generic_methods() {
        let src = r#"
public class Mixed {
    @QAFTestStep(description = "user logs in as {0}")
    public void login(@Named("u") String user, @Optional(value = "x") int tries) {
        u.sendKeys(user);
    }

    public <T> T value() {
        return cast(raw);
    }

    public static <K, V extends Comparable<V>> Map<K, V> index(List<V> items) {
        return build(items);
    }

    public void ok() { done(); }
}
"#;
        let class = parse_class(src).unwrap();
        let names: Vec<&str> = class.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["login", "value", "index", "ok"]);

        let login = &class.methods[0];
        assert_eq!(
            login.params,
            vec![
                JavaParam {
                    ty: "String".to_owned(),
                    name: "user".to_owned()
                },
                JavaParam {
                    ty: "int".to_owned(),
                    name: "tries".to_owned()
                },
            ]
        );
        assert_eq!(login.statements(), vec!["u.sendKeys(user)"]);
        assert_eq!(class.methods[1].return_type, "T");
        assert_eq!(class.methods[2].return_type, "Map<K, V>");

        let steps = parse_steps(src);
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].method.name, "login");
    }

    #[test]
    fn test_parse_params_with_generics() {
        let params = parse_params("Map<String, String> data, int count");
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].ty, "Map<String, String>");
        assert_eq!(params[1].name, "count");
    }
}
