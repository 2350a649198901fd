use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::class::{FileWithClass, LeakRecord};
use crate::classify::LeakClassifier;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedFile {
    pub file_path: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub files_scanned: usize,
    pub classes_found: usize,
    pub traits_found: usize,
    pub leak_count: usize,
    pub filtered_out: usize,
    pub skipped_declarations: usize,
    pub failed_files: Vec<FailedFile>,
    pub cancelled: bool,
}

#[derive(Debug, Clone, Default)]
pub struct LeakReport {
    pub leaks: Vec<FileWithClass>,
    pub summary: ReportSummary,
}

impl LeakReport {
    pub fn records(&self) -> Vec<LeakRecord> {
        self.leaks.iter().map(FileWithClass::to_record).collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.leaks)
    }

    /// SHA-256 of the JSON payload, stable across runs over unchanged sources.
    pub fn fingerprint(&self) -> serde_json::Result<String> {
        let json = self.to_json()?;
        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        Ok(hex::encode(hasher.finalize()))
    }

    pub fn is_clean(&self) -> bool {
        self.leaks.is_empty()
    }
}

/// Candidates matching any of these are dropped from the report.
#[derive(Debug, Clone, Default)]
pub struct ReportFilters {
    pub skip_types: Vec<String>,
    pub skip_suffixes: Vec<String>,
    pub skip_attributes: Vec<String>,
}

impl ReportFilters {
    pub fn is_skipped(&self, file: &FileWithClass) -> bool {
        self.skip_types
            .iter()
            .any(|t| type_matches(t, file.class_name()))
            || self
                .skip_suffixes
                .iter()
                .any(|s| !s.is_empty() && file.short_name().ends_with(s.as_str()))
            || self.skip_attributes.iter().any(|skip| {
                file.attributes()
                    .iter()
                    .any(|attr| attribute_matches(skip, attr))
            })
    }
}

fn type_matches(pattern: &str, class_name: &str) -> bool {
    let pattern = pattern.trim_start_matches('\\');
    if let Some(prefix) = pattern
        .strip_suffix("\\*")
        .or_else(|| pattern.strip_suffix('\\'))
    {
        return class_name
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('\\'));
    }
    pattern == class_name
}

fn attribute_matches(skip: &str, attribute: &str) -> bool {
    let skip = skip.trim_start_matches('\\');
    let attribute = attribute.trim_start_matches('\\');
    if skip == attribute {
        return true;
    }
    let short = |s: &str| s.rsplit('\\').next().unwrap_or(s).to_string();
    if !skip.contains('\\') || !attribute.contains('\\') {
        return short(skip) == short(attribute);
    }
    false
}

#[derive(Debug, Default)]
pub struct LeakReportBuilder {
    classifier: LeakClassifier,
    filters: ReportFilters,
}

impl LeakReportBuilder {
    pub fn new(classifier: LeakClassifier) -> Self {
        Self {
            classifier,
            filters: ReportFilters::default(),
        }
    }

    pub fn with_filters(mut self, filters: ReportFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn classifier(&self) -> &LeakClassifier {
        &self.classifier
    }

    /// Traits never leak. Classes without parent or interface leak as soon as
    /// any out-of-band signal is present.
    pub fn is_leak_candidate(&self, file: &FileWithClass) -> bool {
        let signals = self.classifier.classify(file);
        if signals.is_trait || signals.has_parent_class_or_interface {
            return false;
        }
        signals.is_serialized || signals.is_entity || !file.attributes().is_empty()
    }

    pub fn build<I>(&self, classes: I) -> LeakReport
    where
        I: IntoIterator<Item = FileWithClass>,
    {
        let mut summary = ReportSummary::default();
        let mut leaks = Vec::new();

        for file in classes {
            summary.classes_found += 1;
            if file.is_trait() {
                summary.traits_found += 1;
            }
            if !self.is_leak_candidate(&file) {
                continue;
            }
            if self.filters.is_skipped(&file) {
                debug!("filtered out leak candidate {}", file.class_name());
                summary.filtered_out += 1;
                continue;
            }
            leaks.push(file);
        }

        let mut keyed: Vec<(String, FileWithClass)> =
            leaks.into_iter().map(|f| (f.display_path(), f)).collect();
        keyed.sort_by(|(a_path, a), (b_path, b)| {
            a_path
                .cmp(b_path)
                .then_with(|| a.class_name().cmp(b.class_name()))
        });
        let leaks: Vec<FileWithClass> = keyed.into_iter().map(|(_, f)| f).collect();

        summary.leak_count = leaks.len();
        LeakReport { leaks, summary }
    }
}
