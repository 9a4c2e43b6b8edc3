//! Target path mapping: kebab-cased segments mirroring the source tree.

use std::path::{Component, Path, PathBuf};

/// `LoginPage` → `login-page`, `HTTPClient` → `http-client`, `my_steps` → `my-steps`.
pub fn kebab_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == ' ' || c == '-' {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
            continue;
        }
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_lower);
            if boundary && !out.ends_with('-') {
                out.push('-');
            }
        }
        out.extend(c.to_lowercase());
    }

    out.trim_end_matches('-').to_owned()
}

/// Map a source-relative path to its target-relative path: every segment
/// kebab-cased and the extension replaced by `ext`.
pub fn target_relative(rel: &Path, ext: &str) -> PathBuf {
    let mut out = PathBuf::new();
    let components: Vec<Component<'_>> = rel.components().collect();

    for (i, component) in components.iter().enumerate() {
        let Component::Normal(segment) = component else {
            continue;
        };
        let segment = segment.to_string_lossy();
        if i + 1 == components.len() {
            let stem = Path::new(segment.as_ref())
                .file_stem()
                .map_or_else(|| segment.to_string(), |s| s.to_string_lossy().into_owned());
            out.push(format!("{}.{ext}", kebab_case(&stem)));
        } else {
            out.push(kebab_case(&segment));
        }
    }

    out
}
