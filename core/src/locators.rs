//! QAF locator repositories.
//!
//! QAF keeps locators out of page classes in `.properties` / `.loc` files,
//! one `key=locator` entry per line. Page fields then refer to them by key.

use crate::rules::locator::normalize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const EXTENSIONS: &[&str] = &["properties", "loc"];

#[derive(Debug, Clone, Default)]
pub struct LocatorRepository {
    entries: BTreeMap<String, String>,
    /// Files or directories that could not be read, with the reason.
    failures: Vec<(PathBuf, String)>,
}

impl LocatorRepository {
    /// Load every repository file under `paths` (files or directories).
    /// Later files override earlier keys. Unreadable entries are logged,
    /// skipped and kept in [`failures`](Self::failures).
    pub fn load(paths: &[PathBuf]) -> Self {
        let mut repo = Self::default();
        for path in paths {
            if path.is_file() {
                repo.load_file(path);
                continue;
            }
            if !path.exists() {
                log::warn!("[locators] {} does not exist", path.display());
                continue;
            }
            for entry in WalkDir::new(path).sort_by_file_name() {
                match entry {
                    Ok(entry) if entry.file_type().is_file() && is_repository_file(entry.path()) => {
                        repo.load_file(entry.path());
                    }
                    Ok(_) => {}
                    Err(e) => {
                        let failed = e.path().unwrap_or(path.as_path()).to_path_buf();
                        log::warn!("[locators] {}: {e}", failed.display());
                        repo.failures.push((failed, e.to_string()));
                    }
                }
            }
        }
        log::info!("[locators] loaded {} keys", repo.entries.len());
        repo
    }

    fn load_file(&mut self, path: &Path) {
        match fs::read_to_string(path) {
            Ok(text) => {
                let parsed = parse_properties(&text);
                log::debug!("[locators] {}: {} keys", path.display(), parsed.len());
                self.entries.extend(parsed);
            }
            Err(e) => {
                log::warn!("[locators] skipping {}: {e}", path.display());
                self.failures.push((path.to_path_buf(), e.to_string()));
            }
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Normalized locator for `key`, if the repository defines it.
    pub fn resolve(&self, key: &str) -> Option<String> {
        self.entries.get(key.trim()).map(|value| normalize(value))
    }

    pub fn failures(&self) -> &[(PathBuf, String)] {
        &self.failures
    }
}

fn is_repository_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| EXTENSIONS.contains(&e))
}

/// Parse Java `.properties` syntax: `#`/`!` comments, `=` or `:` separators,
/// and trailing-backslash line continuations.
pub fn parse_properties(text: &str) -> Vec<(String, String)> {
    let mut entries = Vec::new();
    let mut logical = String::new();

    for line in text.lines() {
        let line = line.trim_start();
        if logical.is_empty() && (line.is_empty() || line.starts_with('#') || line.starts_with('!')) {
            continue;
        }
        if let Some(head) = line.strip_suffix('\\') {
            logical.push_str(head);
            continue;
        }
        logical.push_str(line);

        if let Some(entry) = split_entry(&logical) {
            entries.push(entry);
        }
        logical.clear();
    }
    if let Some(entry) = split_entry(&logical) {
        entries.push(entry);
    }

    entries
}

fn split_entry(line: &str) -> Option<(String, String)> {
    let sep = line.find(['=', ':'])?;
    let key = line[..sep].trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_owned(), line[sep + 1..].trim().to_owned()))
}
