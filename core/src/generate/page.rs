use super::ts::java_type_to_ts;
use super::{Skeleton, INDENT};
use crate::extract::java::{JavaClass, JavaMethod, LocatorSource};
use crate::locators::LocatorRepository;
use crate::rewrite::Placeholder;
use std::fmt::Write;

/// Playwright page-object skeleton for a Java page class.
///
/// Element fields become `readonly` locators assigned in the constructor;
/// each non-constructor method becomes an `async` method with one action
/// placeholder per statement. Java constructors are not carried over.
/// Methods whose body was cut off are still emitted and listed in
/// [`Skeleton::truncated`].
pub fn page_skeleton(class: &JavaClass, locators: &LocatorRepository) -> Skeleton {
    let mut out = String::new();
    out.push_str("import { expect, type Locator, type Page } from '@playwright/test';\n\n");
    let _ = writeln!(out, "export class {} {{", class.name);
    let _ = writeln!(out, "{INDENT}readonly page: Page;");
    for element in &class.elements {
        let _ = writeln!(out, "{INDENT}readonly {}: Locator;", element.name);
    }
    out.push('\n');

    let _ = writeln!(out, "{INDENT}constructor(page: Page) {{");
    let _ = writeln!(out, "{INDENT}{INDENT}this.page = page;");
    for element in &class.elements {
        let payload = match &element.locator {
            LocatorSource::Expression(expr) => expr.clone(),
            LocatorSource::Key(key) => locators.resolve(key).unwrap_or_else(|| {
                log::debug!("[page] {}: locator key '{key}' not in repository", class.name);
                key.clone()
            }),
        };
        let marker = Placeholder::Locator {
            field: element.name.clone(),
        }
        .marker(&payload);
        let _ = writeln!(out, "{INDENT}{INDENT}{marker}");
    }
    let _ = writeln!(out, "{INDENT}}}");

    let mut truncated = Vec::new();
    for method in class.methods.iter().filter(|m| !m.is_constructor) {
        out.push('\n');
        if !method.closed {
            truncated.push((
                out.matches('\n').count() + 1,
                format!("{}.{}: body truncated", class.name, method.name),
            ));
        }
        write_method(&mut out, method);
    }

    out.push_str("}\n");
    Skeleton {
        text: out,
        truncated,
    }
}

fn write_method(out: &mut String, method: &JavaMethod) {
    let params = method
        .params
        .iter()
        .map(|p| format!("{}: {}", p.name, java_type_to_ts(&p.ty)))
        .collect::<Vec<_>>()
        .join(", ");
    let ret = java_type_to_ts(&method.return_type);

    let _ = writeln!(
        out,
        "{INDENT}async {}({params}): Promise<{ret}> {{",
        method.name
    );
    for statement in method.statements() {
        let _ = writeln!(
            out,
            "{INDENT}{INDENT}{}",
            Placeholder::Action.marker(&statement)
        );
    }
    let _ = writeln!(out, "{INDENT}}}");
}
