//! Run configuration (`pwmigrate.json`).
//!
//! JSON with whole-line `//` comments. Roots are relative to the config
//! file's directory; asset directories and locator repositories are relative
//! to their root.

use crate::report::AssetKind;
use glob::Pattern;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "pwmigrate.json";
pub const DEFAULT_REPORT_FILE: &str = "pwmigrate-report.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    Missing(String),
    #[error("source root does not exist: {0}")]
    SourceRootMissing(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid exclude pattern: {0}")]
    Exclude(#[from] glob::PatternError),
}

/// Source and target directory of one asset kind.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Mapping {
    pub source: PathBuf,
    pub target: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    source_root: PathBuf,
    target_root: PathBuf,
    #[serde(default)]
    pages: Option<Mapping>,
    #[serde(default)]
    steps: Option<Mapping>,
    #[serde(default)]
    features: Option<Mapping>,
    #[serde(default)]
    locators: Vec<PathBuf>,
    #[serde(default)]
    exclude: Vec<String>,
    #[serde(default)]
    report: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub source_root: PathBuf,
    pub target_root: PathBuf,
    pub pages: Option<Mapping>,
    pub steps: Option<Mapping>,
    pub features: Option<Mapping>,
    /// Locator repository files or directories, resolved against `source_root`.
    pub locators: Vec<PathBuf>,
    pub exclude: Vec<Pattern>,
    /// Report location, resolved against `target_root`.
    pub report: PathBuf,
}

impl Config {
    /// Load and validate a config file. Fails if the file is missing, is not
    /// valid JSON, or names a source root that does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::Missing(path.display().to_string()));
        }
        let text = fs::read_to_string(path)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let config = Self::parse(&text, base)?;

        if !config.source_root.is_dir() {
            return Err(ConfigError::SourceRootMissing(
                config.source_root.display().to_string(),
            ));
        }
        log::debug!(
            "[config] source={} target={}",
            config.source_root.display(),
            config.target_root.display()
        );
        Ok(config)
    }

    /// Parse config text, resolving relative roots against `base`.
    pub fn parse(text: &str, base: &Path) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(&sanitize(text))?;

        let source_root = base.join(&raw.source_root);
        let target_root = base.join(&raw.target_root);
        let exclude = raw
            .exclude
            .iter()
            .map(|p| Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            locators: raw.locators.iter().map(|l| source_root.join(l)).collect(),
            report: target_root.join(
                raw.report
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_FILE)),
            ),
            source_root,
            target_root,
            pages: raw.pages,
            steps: raw.steps,
            features: raw.features,
            exclude,
        })
    }

    /// Absolute source and target directories for an asset kind, if configured.
    pub fn dirs(&self, kind: AssetKind) -> Option<(PathBuf, PathBuf)> {
        let mapping = match kind {
            AssetKind::Page => self.pages.as_ref(),
            AssetKind::Steps => self.steps.as_ref(),
            AssetKind::Feature => self.features.as_ref(),
        }?;
        Some((
            self.source_root.join(&mapping.source),
            self.target_root.join(&mapping.target),
        ))
    }

    /// Whether a path relative to the asset's source directory is excluded.
    pub fn is_excluded(&self, rel: &Path) -> bool {
        self.exclude.iter().any(|p| p.matches_path(rel))
    }
}

/// Drop whole-line `//` comments so the rest parses as plain JSON.
/// Line count is preserved so parse errors point at the right line.
fn sanitize(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.trim_start().starts_with("//") {
                ""
            } else {
                line
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
