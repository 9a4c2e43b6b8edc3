use super::print_json;
use crate::cli::{OutputFormat, TranslateKind};
use crate::rules::action::action_rules;
use crate::rules::locator::translate_locator;
use crate::rules::step::{step_rules, to_cucumber_expression};
use crate::rules::{Classification, Translation};
use colored::Colorize;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct TranslateOutput {
    input: String,
    output: String,
    classification: Classification,
    #[serde(skip_serializing_if = "Option::is_none")]
    rule: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl TranslateOutput {
    fn new(translation: Translation<String>, description: Option<String>) -> Self {
        Self {
            input: translation.source,
            output: translation.output,
            classification: translation.classification,
            rule: translation.rule,
            description,
        }
    }
}

pub fn run(
    kind: TranslateKind,
    expr: &str,
    params: &[String],
    format: OutputFormat,
) -> Result<(), String> {
    let result = match kind {
        TranslateKind::Locator => {
            let t = translate_locator(expr);
            let description = t.output.describe();
            TranslateOutput::new(t.map(|s| s.render("page")), Some(description))
        }
        TranslateKind::Action => TranslateOutput::new(action_rules().translate(expr, params), None),
        TranslateKind::Step => TranslateOutput::new(
            step_rules().translate(&to_cucumber_expression(expr), params),
            None,
        ),
    };

    if format == OutputFormat::Json {
        return print_json(&result);
    }

    let classification = match result.classification {
        Classification::Semantic => result.classification.as_str().green(),
        Classification::Structural => result.classification.as_str().cyan(),
        Classification::Fallback => result.classification.as_str().yellow(),
    };
    println!("{} {}", label("input:"), result.input);
    println!("{} {}", label("rule:"), result.rule.unwrap_or("-"));
    println!("{} {classification}", label("classification:"));
    if let Some(description) = &result.description {
        println!("{} {description}", label("description:"));
    }
    println!("{} {}", label("output:"), result.output.bold());
    Ok(())
}

fn label(text: &str) -> colored::ColoredString {
    format!("{text:<15}").dimmed()
}
