//! Conversion pipelines: walk a source tree, generate skeletons, rewrite
//! placeholders and write targets.
//!
//! Per-file failures are recorded in the report and never stop the run.

use crate::config::Config;
use crate::extract::{feature, java};
use crate::generate::{page_skeleton, steps_skeleton, Skeleton};
use crate::locators::LocatorRepository;
use crate::paths::target_relative;
use crate::report::{AssetKind, ConversionReport, FileReport, FileStatus, UnitKind};
use crate::rewrite::{declared_elements, rewrite};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no class declaration in {0}")]
    NoClass(String),
    #[error("{0} is not valid UTF-8")]
    Utf8(String),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// Convert and report without writing any file.
    pub dry_run: bool,
}

pub fn run_pages(config: &Config, options: Options) -> ConversionReport {
    let locators = LocatorRepository::load(&config.locators);
    let mut report = run_asset(config, AssetKind::Page, options, |path, src| {
        let class = java::parse_class(src).ok_or_else(|| no_class(path))?;
        Ok(page_skeleton(&class, &locators))
    });
    for (path, reason) in locators.failures() {
        report.push(FileReport::failed(
            AssetKind::Page,
            display_path(&config.source_root, path),
            format!("locator repository: {reason}"),
        ));
    }
    report
}

pub fn run_steps(config: &Config, options: Options) -> ConversionReport {
    run_asset(config, AssetKind::Steps, options, |path, src| {
        let class = java::parse_class(src).ok_or_else(|| no_class(path))?;
        let steps = java::parse_steps(src);
        Ok(steps_skeleton(&class.name, &steps))
    })
}

pub fn run_features(config: &Config, options: Options) -> ConversionReport {
    let mut report = ConversionReport::default();
    let Some((source_dir, target_dir)) = asset_dirs(config, AssetKind::Feature) else {
        return report;
    };

    for (path, rel) in source_files(config, &source_dir, AssetKind::Feature, &mut report) {
        let display = display_path(&config.source_root, &path);
        if config.is_excluded(&rel) {
            report.push(FileReport::new(AssetKind::Feature, display, FileStatus::Skipped));
            continue;
        }
        let target = target_dir.join(target_relative(&rel, AssetKind::Feature.target_extension()));

        let file = match convert_feature_file(&path, &target, options) {
            Ok(mut file) => {
                file.source = display;
                file.target = Some(display_path(&config.target_root, &target));
                file
            }
            Err(e) => {
                log::warn!("[convert] {display}: {e}");
                FileReport::failed(AssetKind::Feature, display, e.to_string())
            }
        };
        report.push(file);
    }

    report
}

/// Run every configured asset kind.
pub fn run_all(config: &Config, options: Options) -> ConversionReport {
    let mut report = run_pages(config, options);
    report.merge(run_steps(config, options));
    report.merge(run_features(config, options));
    report
}

/// Rewrite placeholders in existing TypeScript files (or directories of them).
pub fn rewrite_paths(paths: &[PathBuf], options: Options) -> ConversionReport {
    let mut report = ConversionReport::default();

    for root in paths {
        if !root.exists() {
            report.push(FileReport::failed(
                AssetKind::Page,
                root.display().to_string(),
                "no such file or directory",
            ));
            continue;
        }
        let mut files = Vec::new();
        if root.is_file() {
            files.push(root.clone());
        } else {
            for entry in WalkDir::new(root).sort_by_file_name() {
                match entry {
                    Ok(entry) if entry.file_type().is_file() && has_extension(entry.path(), "ts") => {
                        files.push(entry.into_path());
                    }
                    Ok(_) => {}
                    Err(e) => {
                        let failed = e.path().unwrap_or(root.as_path()).display().to_string();
                        log::warn!("[rewrite] {failed}: {e}");
                        report.push(FileReport::failed(AssetKind::Page, failed, e.to_string()));
                    }
                }
            }
        }

        for path in files {
            let display = path.display().to_string();
            let file = match rewrite_file(&path, options) {
                Ok(file) => file,
                Err(e) => {
                    log::warn!("[rewrite] {display}: {e}");
                    FileReport::failed(AssetKind::Page, display, e.to_string())
                }
            };
            report.push(file);
        }
    }

    report
}

/// Write the report to its configured location (skipped on dry runs).
pub fn write_report(
    config: &Config,
    report: &ConversionReport,
    options: Options,
) -> Result<(), ConvertError> {
    if options.dry_run {
        return Ok(());
    }
    write_target(&config.report, &report.to_json()?)?;
    log::info!("[convert] report written to {}", config.report.display());
    Ok(())
}

fn no_class(path: &Path) -> ConvertError {
    ConvertError::NoClass(path.display().to_string())
}

fn asset_dirs(config: &Config, kind: AssetKind) -> Option<(PathBuf, PathBuf)> {
    let Some((source, target)) = config.dirs(kind) else {
        log::info!("[convert] no '{}' mapping configured", kind.as_str());
        return None;
    };
    if !source.is_dir() {
        log::warn!(
            "[convert] {} source directory {} does not exist",
            kind.as_str(),
            source.display()
        );
        return None;
    }
    Some((source, target))
}

/// Files of the asset's extension under `dir`, with their `dir`-relative paths,
/// in file-name order. Entries that cannot be read are recorded as failed.
fn source_files(
    config: &Config,
    dir: &Path,
    kind: AssetKind,
    report: &mut ConversionReport,
) -> Vec<(PathBuf, PathBuf)> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let failed = display_path(&config.source_root, e.path().unwrap_or(dir));
                log::warn!("[convert] {failed}: {e}");
                report.push(FileReport::failed(kind, failed, e.to_string()));
                continue;
            }
        };
        if !entry.file_type().is_file() || !has_extension(entry.path(), kind.source_extension()) {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(dir)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| entry.path().to_path_buf());
        files.push((entry.into_path(), rel));
    }
    files
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().is_some_and(|e| e == ext)
}

fn display_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn read_source(path: &Path) -> Result<String, ConvertError> {
    let bytes = fs::read(path)?;
    String::from_utf8(bytes).map_err(|_| ConvertError::Utf8(path.display().to_string()))
}

fn write_target(path: &Path, text: &str) -> Result<(), ConvertError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, text)?;
    Ok(())
}

/// Shared walk for Java assets: new targets are generated then rewritten;
/// existing targets are only rewritten.
fn run_asset<F>(
    config: &Config,
    kind: AssetKind,
    options: Options,
    generate: F,
) -> ConversionReport
where
    F: Fn(&Path, &str) -> Result<Skeleton, ConvertError>,
{
    let mut report = ConversionReport::default();
    let Some((source_dir, target_dir)) = asset_dirs(config, kind) else {
        return report;
    };

    for (path, rel) in source_files(config, &source_dir, kind, &mut report) {
        let display = display_path(&config.source_root, &path);
        if config.is_excluded(&rel) {
            log::debug!("[convert] excluded {display}");
            report.push(FileReport::new(kind, display, FileStatus::Skipped));
            continue;
        }
        let target = target_dir.join(target_relative(&rel, kind.target_extension()));

        let result = if target.exists() {
            rewrite_file(&target, options)
        } else {
            read_source(&path)
                .and_then(|src| generate(&path, &src))
                .and_then(|skeleton| create_ts(&target, &skeleton, kind, options))
        };

        let file = match result {
            Ok(mut file) => {
                file.asset = kind;
                file.source = display;
                file.target = Some(display_path(&config.target_root, &target));
                file
            }
            Err(e) => {
                log::warn!("[convert] {display}: {e}");
                FileReport::failed(kind, display, e.to_string())
            }
        };
        report.push(file);
    }

    report
}

fn create_ts(
    target: &Path,
    skeleton: &Skeleton,
    kind: AssetKind,
    options: Options,
) -> Result<FileReport, ConvertError> {
    let outcome = rewrite(&skeleton.text);
    let mut file = FileReport::new(kind, String::new(), FileStatus::Created);
    for unit in &outcome.units {
        file.record(unit.kind, unit.line, &unit.translation);
    }
    let method_kind = if kind == AssetKind::Steps {
        UnitKind::Step
    } else {
        UnitKind::Action
    };
    for (line, note) in &skeleton.truncated {
        log::warn!("[convert] {}: {note}", target.display());
        file.flag(method_kind, *line, note.as_str());
    }
    if !options.dry_run {
        write_target(target, &outcome.text)?;
    }
    log::info!("[convert] created {}", target.display());
    Ok(file)
}

fn rewrite_file(path: &Path, options: Options) -> Result<FileReport, ConvertError> {
    let text = read_source(path)?;
    let outcome = rewrite(&text);

    let asset = if declared_elements(&text).is_empty() && text.contains("createBdd(") {
        AssetKind::Steps
    } else {
        AssetKind::Page
    };
    let status = if outcome.changed() {
        FileStatus::Updated
    } else {
        FileStatus::Unchanged
    };

    let mut file = FileReport::new(asset, path.display().to_string(), status);
    for unit in &outcome.units {
        file.record(unit.kind, unit.line, &unit.translation);
    }
    if outcome.changed() && !options.dry_run {
        write_target(path, &outcome.text)?;
        log::info!("[rewrite] updated {}", path.display());
    }
    Ok(file)
}

fn convert_feature_file(
    path: &Path,
    target: &Path,
    options: Options,
) -> Result<FileReport, ConvertError> {
    if target.exists() {
        log::debug!("[convert] {} exists, leaving it alone", target.display());
        return Ok(FileReport::new(
            AssetKind::Feature,
            String::new(),
            FileStatus::Unchanged,
        ));
    }

    let src = read_source(path)?;
    let converted = feature::convert_feature(&src);
    let mut file = FileReport::new(AssetKind::Feature, String::new(), FileStatus::Created);
    for unit in &converted.units {
        file.record(UnitKind::Feature, unit.line, &unit.translation);
    }
    if !options.dry_run {
        write_target(target, &converted.text)?;
    }
    log::info!("[convert] created {}", target.display());
    Ok(file)
}
