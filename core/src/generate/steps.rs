use super::ts::{java_type_to_ts, quote};
use super::{Skeleton, INDENT};
use crate::extract::java::{StepDecl, StepKeyword};
use crate::rewrite::Placeholder;
use crate::rules::step::{placeholders, to_cucumber_expression, with_param_types};
use std::fmt::Write;

const KEYWORD_ORDER: [StepKeyword; 4] = [
    StepKeyword::Given,
    StepKeyword::When,
    StepKeyword::Then,
    StepKeyword::Any,
];

/// `playwright-bdd` step-definition skeleton for the steps of one Java class.
pub fn steps_skeleton(class_name: &str, steps: &[StepDecl]) -> Skeleton {
    let used: Vec<&str> = KEYWORD_ORDER
        .iter()
        .filter(|k| steps.iter().any(|s| s.keyword == **k))
        .map(|k| k.bdd_function())
        .collect();

    let mut out = String::new();
    out.push_str("import { expect } from '@playwright/test';\n");
    out.push_str("import { createBdd } from 'playwright-bdd';\n\n");
    if !used.is_empty() {
        let _ = writeln!(out, "const {{ {} }} = createBdd();", used.join(", "));
    }

    let mut truncated = Vec::new();
    for step in steps {
        out.push('\n');
        if !step.method.closed {
            truncated.push((
                out.matches('\n').count() + 1,
                format!("{class_name}.{}: body truncated", step.method.name),
            ));
        }
        write_step(&mut out, class_name, step);
    }
    Skeleton {
        text: out,
        truncated,
    }
}

fn write_step(out: &mut String, class_name: &str, step: &StepDecl) {
    let params = &step.method.params;
    let types: Vec<String> = params.iter().map(|p| p.ty.clone()).collect();
    let expression = with_param_types(&to_cucumber_expression(&step.description), &types);
    let slots = placeholders(&expression);
    let expected = slots.len();
    if params.len() != expected {
        log::warn!(
            "[steps] {class_name}.{}: {expected} placeholders but {} parameters",
            step.method.name,
            params.len()
        );
    }

    let mut signature = String::from("{ page }");
    for (i, p) in params.iter().enumerate() {
        let _ = write!(signature, ", {}: {}", p.name, param_type(slots.get(i).copied(), &p.ty));
    }
    let names: Vec<String> = params.iter().map(|p| p.name.clone()).collect();

    let _ = writeln!(out, "// {class_name}.{}", step.method.name);
    let _ = writeln!(
        out,
        "{}({}, async ({signature}) => {{",
        step.keyword.bdd_function(),
        quote(&expression)
    );
    let _ = writeln!(
        out,
        "{INDENT}{}",
        Placeholder::Step { params: names }.marker(&expression)
    );
    out.push_str("});\n");
}

/// TypeScript type of a step argument: what the placeholder delivers, or the
/// Java type when the parameter has no placeholder.
fn param_type(placeholder: Option<&str>, java_type: &str) -> &'static str {
    match placeholder {
        Some("{int}" | "{float}" | "{double}" | "{long}" | "{short}" | "{byte}") => "number",
        Some(_) => "string",
        None => java_type_to_ts(java_type),
    }
}
