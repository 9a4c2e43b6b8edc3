//! End-to-end conversion of a small QAF project on a temp directory.

use pwmigrate::config::{Config, ConfigError, DEFAULT_CONFIG_FILE};
use pwmigrate::convert::{self, Options};
use pwmigrate::error::AppError;
use pwmigrate::report::{AssetKind, FileStatus, UnitKind};
use std::fs;
use regex::Regex;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const LOGIN_PAGE: &str = r#"package com.acme.pages;

public class LoginPage extends WebDriverBaseTestPage<WebDriverTestPage> {
    @FindBy(locator = "login.username")
    private QAFWebElement username;

    @FindBy(xpath = "//button[text()='Sign in']")
    private QAFWebElement signIn;

    @FindBy(xpath = "//div[@class='x']/span[2]/a")
    private QAFWebElement help;

    @Override
    protected void openPage(PageLocator locator, Object... args) {
        driver.get("/login");
    }

    public void login(String user) {
        username.sendKeys(user);
        signIn.click();
        help.getCssValue("color");
    }
}
"#;

const LOGIN_STEPS: &str = r#"package com.acme.steps;

public class LoginSteps {
    @QAFTestStep(description = "user clicks on the {0} button")
    public void clickButton(String name) {
        new LoginPage().click(name);
    }

    @QAFTestStep(description = "user does something unusual")
    public void unusual() { }
}
"#;

const LOGIN_FEATURE: &str = "Feature: Login

  Scenario: Sign in
    Given user opens the login page
    When user enters ${username} into the username field
    And user clicks on the Save button
    Then user should see Welcome
";

const CONFIG: &str = r#"// test project
{
    "sourceRoot": "legacy",
    "targetRoot": "out",
    "pages": { "source": "pages", "target": "pages" },
    "steps": { "source": "steps", "target": "steps" },
    "features": { "source": "features", "target": "features" },
    "locators": ["locators"],
    "exclude": ["**/Base*.java"]
}
"#;

fn write(path: &Path, text: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn project() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(&root.join("legacy/pages/com/acme/LoginPage.java"), LOGIN_PAGE);
    write(
        &root.join("legacy/pages/com/acme/BasePage.java"),
        "public class BasePage {}\n",
    );
    write(&root.join("legacy/pages/Broken.java"), "// not a class\n");
    write(&root.join("legacy/steps/LoginSteps.java"), LOGIN_STEPS);
    write(&root.join("legacy/features/Login.feature"), LOGIN_FEATURE);
    write(
        &root.join("legacy/locators/login.properties"),
        "login.username=id=username\n",
    );
    let config = root.join(DEFAULT_CONFIG_FILE);
    write(&config, CONFIG);
    (dir, config)
}

#[test]
fn test_full_run_writes_targets_and_report() {
    let (dir, config_path) = project();
    let config = Config::load(&config_path).unwrap();
    let report = convert::run_all(&config, Options::default());
    convert::write_report(&config, &report, Options::default()).unwrap();

    let out = dir.path().join("out");
    let page = fs::read_to_string(out.join("pages/com/acme/login-page.ts")).unwrap();
    assert!(page.contains("export class LoginPage {"));
    assert!(page.contains("this.username = this.page.locator('#username');"));
    assert!(page.contains("this.signIn = this.page.getByRole('button', { name: 'Sign in' });"));
    assert!(page.contains("// PW-MANUAL[locator]: xpath=//div[@class='x']/span[2]/a"));
    assert!(page.contains("await this.page.goto(\"/login\");"));
    assert!(page.contains("await this.username.fill(user);"));
    assert!(page.contains("// PW-MANUAL[action]: help.getCssValue(\"color\")"));
    assert!(!page.contains("PW-PENDING"));

    let steps = fs::read_to_string(out.join("steps/login-steps.ts")).unwrap();
    assert!(steps.contains("Step('user clicks on the {} button', async ({ page }, name: string) => {"));
    assert!(steps.contains("await page.getByRole('button', { name: name }).click();"));
    assert!(steps.contains("// PW-MANUAL[step]: user does something unusual"));

    let feature = fs::read_to_string(out.join("features/login.feature")).unwrap();
    assert!(feature.contains("    When user enters <username> into the username field\n"));
    assert!(feature.contains("    When user clicks on the Save button\n"));

    assert!(!out.join("pages/com/acme/base-page.ts").exists());
    assert_eq!(report.count(FileStatus::Skipped), 1);
    assert_eq!(report.count(FileStatus::Failed), 1);
    assert_eq!(report.count(FileStatus::Created), 3);

    let failed = report
        .files
        .iter()
        .find(|f| f.status == FileStatus::Failed)
        .unwrap();
    assert_eq!(failed.asset, AssetKind::Page);
    assert!(failed.error.as_deref().unwrap().contains("no class declaration"));

    let manual: Vec<_> = report.manual_items().map(|(_, m)| m.kind).collect();
    assert!(manual.contains(&UnitKind::Locator));
    assert!(manual.contains(&UnitKind::Action));
    assert!(manual.contains(&UnitKind::Step));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("pwmigrate-report.json")).unwrap())
            .unwrap();
    assert_eq!(json["statuses"]["created"], 3);
    assert_eq!(
        json["totals"]["fallback"].as_u64().unwrap() as usize,
        report.totals.fallback
    );
}

#[test]
fn test_second_run_changes_nothing() {
    let (dir, config_path) = project();
    let config = Config::load(&config_path).unwrap();
    convert::run_all(&config, Options::default());

    let page_path = dir.path().join("out/pages/com/acme/login-page.ts");
    let first = fs::read_to_string(&page_path).unwrap();

    let report = convert::run_all(&config, Options::default());
    assert_eq!(fs::read_to_string(&page_path).unwrap(), first);
    assert_eq!(report.count(FileStatus::Created), 0);
    assert_eq!(report.count(FileStatus::Updated), 0);
    assert_eq!(report.count(FileStatus::Unchanged), 3);
}

#[test]
fn test_existing_target_placeholders_are_rewritten() {
    let (dir, config_path) = project();
    let config = Config::load(&config_path).unwrap();
    let target = dir.path().join("out/pages/com/acme/login-page.ts");
    write(
        &target,
        "export class LoginPage {\n  readonly go: Locator;\n  constructor(page: Page) {\n    // PW-PENDING[locator:go]: css=button.go\n  }\n}\n",
    );

    let report = convert::run_pages(&config, Options::default());
    assert_eq!(report.count(FileStatus::Updated), 1);
    let text = fs::read_to_string(&target).unwrap();
    assert!(text.contains("    this.go = this.page.locator('button.go');\n"));
}

#[test]
fn test_dry_run_writes_nothing() {
    let (dir, config_path) = project();
    let config = Config::load(&config_path).unwrap();
    let options = Options { dry_run: true };
    let report = convert::run_all(&config, options);
    convert::write_report(&config, &report, options).unwrap();

    assert_eq!(report.count(FileStatus::Created), 3);
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_rewrite_paths_on_directory() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("nested/search-steps.ts");
    write(
        &file,
        "import { createBdd } from 'playwright-bdd';\nconst { When } = createBdd();\nWhen('user waits for 2 seconds', async ({ page }) => {\n  // PW-PENDING[step]: user waits for 2 seconds\n});\n",
    );
    write(&dir.path().join("nested/notes.md"), "// PW-PENDING[action]: x.click()\n");

    let report = convert::rewrite_paths(&[dir.path().to_path_buf()], Options::default());
    assert_eq!(report.files.len(), 1);
    assert_eq!(report.files[0].asset, AssetKind::Steps);
    assert_eq!(report.files[0].status, FileStatus::Updated);
    assert!(fs::read_to_string(&file)
        .unwrap()
        .contains("  await page.waitForTimeout(2000);\n"));
}

#[test]
fn test_missing_source_root_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join(DEFAULT_CONFIG_FILE);
    write(&config_path, r#"{ "sourceRoot": "missing", "targetRoot": "out" }"#);

    let err = Config::load(&config_path).unwrap_err();
    assert!(matches!(err, ConfigError::SourceRootMissing(_)));
    let app: AppError = err.into();
    assert!(app.is_fatal());
    assert!(!dir.path().join("out").exists());
}

/// Regex equivalent of a Cucumber expression, as playwright-bdd matches it.
fn cucumber_regex(expression: &str) -> Regex {
    let mut pattern = String::from("^");
    let mut rest = expression;
    while let Some(start) = rest.find('{') {
        let end = start + rest[start..].find('}').unwrap();
        pattern.push_str(&regex::escape(&rest[..start]));
        pattern.push_str(match &rest[start..=end] {
            "{int}" => r"(-?\d+)",
            "{float}" => r"(-?\d*\.?\d+)",
            "{string}" => r#"("[^"]*"|'[^']*')"#,
            "{word}" => r"([^\s]+)",
            _ => "(.*)",
        });
        rest = &rest[end + 1..];
    }
    pattern.push_str(&regex::escape(rest));
    pattern.push('$');
    Regex::new(&pattern).unwrap()
}

#[test]
fn test_generated_steps_match_converted_feature_lines() {
    let (dir, config_path) = project();
    let config = Config::load(&config_path).unwrap();
    convert::run_all(&config, Options::default());

    let out = dir.path().join("out");
    let steps = fs::read_to_string(out.join("steps/login-steps.ts")).unwrap();
    let feature = fs::read_to_string(out.join("features/login.feature")).unwrap();

    let expression = Regex::new(r"^Step\('(?P<expr>[^']*)'")
        .unwrap()
        .captures(steps.lines().find(|l| l.contains("clicks on")).unwrap())
        .unwrap()["expr"]
        .to_owned();
    let sentence = feature
        .lines()
        .map(str::trim)
        .find(|l| l.contains("clicks on"))
        .unwrap()
        .split_once(' ')
        .unwrap()
        .1;

    let caps = cucumber_regex(&expression).captures(sentence).unwrap();
    assert_eq!(&caps[1], "Save");
}

#[test]
fn test_unreadable_locator_file_does_not_stop_the_run() {
    let (dir, config_path) = project();
    fs::write(
        dir.path().join("legacy/locators/bad.properties"),
        [0xff, 0xfe, b'=', b'x'],
    )
    .unwrap();
    let config = Config::load(&config_path).unwrap();
    let report = convert::run_all(&config, Options::default());
    convert::write_report(&config, &report, Options::default()).unwrap();

    let out = dir.path().join("out");
    assert!(out.join("features/login.feature").exists());
    assert!(out.join("pwmigrate-report.json").exists());

    let page = fs::read_to_string(out.join("pages/com/acme/login-page.ts")).unwrap();
    assert!(page.contains("this.username = this.page.locator('#username');"));

    let failed: Vec<_> = report
        .files
        .iter()
        .filter(|f| f.status == FileStatus::Failed)
        .map(|f| f.source.as_str())
        .collect();
    assert_eq!(failed, vec!["pages/Broken.java", "locators/bad.properties"]);
}

#[test]
fn test_truncated_method_is_listed_for_follow_up() {
    let (dir, config_path) = project();
    write(
        &dir.path().join("legacy/pages/CutPage.java"),
        "public class CutPage {\n    public void open() {\n        driver.get(\"/cut\");\n",
    );
    let config = Config::load(&config_path).unwrap();
    let report = convert::run_pages(&config, Options::default());

    let file = report
        .files
        .iter()
        .find(|f| f.source == "pages/CutPage.java")
        .unwrap();
    assert_eq!(file.status, FileStatus::Created);
    assert!(file
        .manual
        .iter()
        .any(|m| m.kind == UnitKind::Action && m.source == "CutPage.open: body truncated"));

    let page = fs::read_to_string(dir.path().join("out/pages/cut-page.ts")).unwrap();
    assert!(page.contains("await this.page.goto(\"/cut\");"));
}
