use anyhow::Result;
use std::path::PathBuf;

use crate::classify::{ENTITY_MARKERS, LeakClassifier, MarkerSet, SERIALIZATION_MARKERS};
use crate::cli::{CheckArgs, Cli};
use crate::report::{LeakReportBuilder, ReportFilters};
use crate::scan::FsSourceProvider;

pub const DEFAULT_EXTENSION: &str = "php";

#[derive(Debug, Clone, Default)]
pub struct AnalysisConfig {
    pub paths: Vec<PathBuf>,
    pub extensions: Vec<String>,
    pub jobs: Option<usize>,
    pub filters: ReportFilters,
    pub extra_serialization_markers: Vec<String>,
    pub extra_entity_markers: Vec<String>,
}

impl AnalysisConfig {
    pub fn from_check_args(cli: &Cli, args: &CheckArgs) -> Result<Self> {
        Ok(Self {
            paths: args.paths.clone(),
            extensions: resolve_extensions(&args.file_extensions),
            jobs: resolve_jobs(cli.jobs)?,
            filters: ReportFilters {
                skip_types: non_empty(&args.skip_types),
                skip_suffixes: non_empty(&args.skip_suffixes),
                skip_attributes: non_empty(&args.skip_attributes),
            },
            extra_serialization_markers: non_empty(&args.serialization_markers),
            extra_entity_markers: non_empty(&args.entity_markers),
        })
    }

    pub fn classifier(&self) -> LeakClassifier {
        LeakClassifier::new(
            MarkerSet::literals(
                SERIALIZATION_MARKERS
                    .iter()
                    .map(|m| m.to_string())
                    .chain(self.extra_serialization_markers.iter().cloned()),
            ),
            MarkerSet::literals(
                ENTITY_MARKERS
                    .iter()
                    .map(|m| m.to_string())
                    .chain(self.extra_entity_markers.iter().cloned()),
            ),
        )
    }

    pub fn report_builder(&self) -> LeakReportBuilder {
        LeakReportBuilder::new(self.classifier()).with_filters(self.filters.clone())
    }

    pub fn source_provider(&self) -> FsSourceProvider {
        if self.extensions.is_empty() {
            FsSourceProvider::default()
        } else {
            FsSourceProvider::new(self.extensions.clone())
        }
    }
}

pub fn resolve_extensions(raw: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for ext in raw {
        let ext = ext.trim().trim_start_matches('.').to_ascii_lowercase();
        if !ext.is_empty() && !out.contains(&ext) {
            out.push(ext);
        }
    }
    if out.is_empty() {
        out.push(DEFAULT_EXTENSION.to_string());
    }
    out
}

pub fn resolve_jobs(jobs: Option<usize>) -> Result<Option<usize>> {
    match jobs {
        Some(0) => anyhow::bail!("--jobs must be at least 1"),
        other => Ok(other),
    }
}

fn non_empty(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}
