//! Small TypeScript rendering helpers shared by the generators and rules.

/// A value passed into generated code: either a literal or a reference to a
/// function parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    Literal(String),
    Param(String),
}

impl Arg {
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }

    pub fn param(name: impl Into<String>) -> Self {
        Self::Param(name.into())
    }

    /// Render as a TypeScript expression.
    pub fn to_ts(&self) -> String {
        match self {
            Self::Literal(value) => quote(value),
            Self::Param(name) => name.clone(),
        }
    }

    /// Plain-text form used in human-readable descriptions.
    pub fn describe(&self) -> String {
        match self {
            Self::Literal(value) => value.clone(),
            Self::Param(name) => format!("<{name}>"),
        }
    }
}

/// Render a single-quoted TypeScript string literal.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Map a Java type to the closest TypeScript type.
pub fn java_type_to_ts(java: &str) -> &'static str {
    let base = java.trim();
    let base = base.split('<').next().unwrap_or(base).trim();
    if base.ends_with("[]") {
        return "unknown[]";
    }
    match base {
        "String" | "char" | "Character" | "CharSequence" => "string",
        "int" | "Integer" | "long" | "Long" | "short" | "Short" | "byte" | "Byte" | "double"
        | "Double" | "float" | "Float" | "BigDecimal" | "BigInteger" | "Number" => "number",
        "boolean" | "Boolean" => "boolean",
        "void" | "Void" => "void",
        "List" | "ArrayList" | "Collection" | "Set" => "unknown[]",
        "Map" | "HashMap" => "Record<string, unknown>",
        _ => "unknown",
    }
}
