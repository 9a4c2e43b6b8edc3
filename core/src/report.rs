//! Conversion report: classification counts per file and for the run,
//! plus every fallback unit that needs manual follow-up.

use crate::rules::{Classification, Translation};
use serde::Serialize;
use std::collections::BTreeMap;

/// The kind of source a file was converted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Page,
    Steps,
    Feature,
}

impl AssetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Steps => "steps",
            Self::Feature => "feature",
        }
    }

    /// Source file extension this asset kind is read from.
    pub fn source_extension(self) -> &'static str {
        match self {
            Self::Page | Self::Steps => "java",
            Self::Feature => "feature",
        }
    }

    /// Extension of the generated file.
    pub fn target_extension(self) -> &'static str {
        match self {
            Self::Page | Self::Steps => "ts",
            Self::Feature => "feature",
        }
    }
}

/// The kind of a single translated unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Locator,
    Action,
    Step,
    Feature,
}

impl UnitKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Locator => "locator",
            Self::Action => "action",
            Self::Step => "step",
            Self::Feature => "feature",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassificationCounts {
    pub semantic: usize,
    pub structural: usize,
    pub fallback: usize,
}

impl ClassificationCounts {
    pub fn record(&mut self, classification: Classification) {
        match classification {
            Classification::Semantic => self.semantic += 1,
            Classification::Structural => self.structural += 1,
            Classification::Fallback => self.fallback += 1,
        }
    }

    pub fn add(&mut self, other: &Self) {
        self.semantic += other.semantic;
        self.structural += other.structural;
        self.fallback += other.fallback;
    }

    pub fn total(&self) -> usize {
        self.semantic + self.structural + self.fallback
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// Target did not exist and was written.
    Created,
    /// Existing target had placeholders replaced.
    Updated,
    /// Existing target needed no change.
    Unchanged,
    /// Excluded by config.
    Skipped,
    Failed,
}

impl FileStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Unchanged => "unchanged",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        }
    }
}

/// A fallback unit left for manual conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManualItem {
    pub kind: UnitKind,
    /// 1-based line in the generated file.
    pub line: usize,
    pub source: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub asset: AssetKind,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub status: FileStatus,
    pub counts: ClassificationCounts,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub manual: Vec<ManualItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    pub fn new(asset: AssetKind, source: impl Into<String>, status: FileStatus) -> Self {
        Self {
            asset,
            source: source.into(),
            target: None,
            status,
            counts: ClassificationCounts::default(),
            manual: Vec::new(),
            error: None,
        }
    }

    pub fn failed(asset: AssetKind, source: impl Into<String>, error: impl Into<String>) -> Self {
        let mut report = Self::new(asset, source, FileStatus::Failed);
        report.error = Some(error.into());
        report
    }

    /// List a unit for follow-up without counting it, e.g. a method whose
    /// source body was cut off.
    pub fn flag(&mut self, kind: UnitKind, line: usize, source: impl Into<String>) {
        self.manual.push(ManualItem {
            kind,
            line,
            source: source.into(),
        });
    }

    /// Count one translated unit; fallbacks are also listed for follow-up.
    pub fn record<T>(&mut self, kind: UnitKind, line: usize, translation: &Translation<T>) {
        self.counts.record(translation.classification);
        if translation.is_fallback() {
            self.manual.push(ManualItem {
                kind,
                line,
                source: translation.source.clone(),
            });
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversionReport {
    pub files: Vec<FileReport>,
    pub totals: ClassificationCounts,
    /// Number of files per status.
    pub statuses: BTreeMap<FileStatus, usize>,
}

impl ConversionReport {
    pub fn push(&mut self, file: FileReport) {
        self.totals.add(&file.counts);
        *self.statuses.entry(file.status).or_default() += 1;
        self.files.push(file);
    }

    pub fn merge(&mut self, other: ConversionReport) {
        for file in other.files {
            self.push(file);
        }
    }

    pub fn count(&self, status: FileStatus) -> usize {
        self.statuses.get(&status).copied().unwrap_or(0)
    }

    pub fn manual_items(&self) -> impl Iterator<Item = (&FileReport, &ManualItem)> {
        self.files
            .iter()
            .flat_map(|f| f.manual.iter().map(move |m| (f, m)))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translation(classification: Classification, source: &str) -> Translation<String> {
        Translation {
            output: String::new(),
            classification,
            rule: None,
            source: source.to_owned(),
        }
    }

    #[test]
    fn test_file_report_records_fallbacks() {
        let mut file = FileReport::new(AssetKind::Page, "LoginPage.java", FileStatus::Created);
        file.record(UnitKind::Locator, 5, &translation(Classification::Semantic, "id=a"));
        file.record(UnitKind::Action, 9, &translation(Classification::Fallback, "x.y()"));
        assert_eq!(file.counts.semantic, 1);
        assert_eq!(file.counts.fallback, 1);
        assert_eq!(
            file.manual,
            vec![ManualItem {
                kind: UnitKind::Action,
                line: 9,
                source: "x.y()".to_owned()
            }]
        );
    }

    #[test]
    fn test_flag_lists_without_counting() {
        let mut file = FileReport::new(AssetKind::Page, "Cut.java", FileStatus::Created);
        file.flag(UnitKind::Action, 10, "Cut.go: body truncated");
        assert_eq!(file.counts.total(), 0);
        assert_eq!(file.manual.len(), 1);
        assert_eq!(file.manual[0].source, "Cut.go: body truncated");
    }

    #[test]
    fn test_report_totals_and_merge() {
        let mut a = ConversionReport::default();
        let mut file = FileReport::new(AssetKind::Page, "A.java", FileStatus::Created);
        file.record(UnitKind::Locator, 1, &translation(Classification::Structural, "css=a"));
        a.push(file);

        let mut b = ConversionReport::default();
        b.push(FileReport::failed(AssetKind::Steps, "B.java", "no class"));

        a.merge(b);
        assert_eq!(a.files.len(), 2);
        assert_eq!(a.totals.total(), 1);
        assert_eq!(a.count(FileStatus::Created), 1);
        assert_eq!(a.count(FileStatus::Failed), 1);
        assert_eq!(a.count(FileStatus::Unchanged), 0);
    }

    #[test]
    fn test_report_json_shape() {
        let mut report = ConversionReport::default();
        let mut file = FileReport::new(AssetKind::Feature, "a.feature", FileStatus::Created);
        file.record(UnitKind::Feature, 2, &translation(Classification::Fallback, "And x"));
        report.push(file);

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["totals"]["fallback"], 1);
        assert_eq!(json["statuses"]["created"], 1);
        assert_eq!(json["files"][0]["asset"], "feature");
        assert_eq!(json["files"][0]["manual"][0]["kind"], "feature");
        assert!(json["files"][0].get("error").is_none());
    }
}
