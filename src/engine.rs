use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

use crate::class::FileWithClass;
use crate::error::AnalysisError;
use crate::path::display_path;
use crate::report::{FailedFile, LeakReport, LeakReportBuilder};
use crate::scan::SourceProvider;
use crate::structure;

/// Cooperative stop signal shared with the caller of a run.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub enum FileOutcome {
    Analyzed {
        classes: Vec<FileWithClass>,
        skipped_declarations: usize,
    },
    Failed(FailedFile),
    /// Stops the run; files not yet started are not scheduled.
    Fatal(AnalysisError),
    NotScheduled,
}

pub struct Engine<P> {
    provider: P,
    builder: LeakReportBuilder,
    jobs: Option<usize>,
    cancel: CancelFlag,
}

impl<P: SourceProvider> Engine<P> {
    pub fn new(provider: P, builder: LeakReportBuilder) -> Self {
        Self {
            provider,
            builder,
            jobs: None,
            cancel: CancelFlag::default(),
        }
    }

    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn run(&self, roots: &[PathBuf]) -> Result<LeakReport, AnalysisError> {
        let mut files = Vec::new();
        for root in roots {
            if self.cancel.is_cancelled() {
                break;
            }
            match self.provider.list_source_files(root) {
                Ok(found) => files.extend(found),
                Err(err) => {
                    self.cancel.cancel();
                    return Err(err);
                }
            }
        }
        files.sort();
        files.dedup();
        debug!("analyzing {} source file(s)", files.len());

        let outcomes = match self.jobs {
            Some(n) => rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()?
                .install(|| self.analyze_all(&files)),
            None => self.analyze_all(&files),
        };

        let mut classes = Vec::new();
        let mut files_scanned = 0usize;
        let mut skipped = 0usize;
        let mut failed = Vec::new();
        let mut cancelled = false;
        let mut fatal = None;

        for outcome in outcomes {
            match outcome {
                FileOutcome::Analyzed {
                    classes: found,
                    skipped_declarations,
                } => {
                    files_scanned += 1;
                    skipped += skipped_declarations;
                    classes.extend(found);
                }
                FileOutcome::Failed(f) => failed.push(f),
                FileOutcome::Fatal(err) => {
                    fatal.get_or_insert(err);
                }
                FileOutcome::NotScheduled => cancelled = true,
            }
        }
        if let Some(err) = fatal {
            return Err(err);
        }

        let mut report = self.builder.build(classes);
        report.summary.files_scanned = files_scanned;
        report.summary.skipped_declarations = skipped;
        report.summary.failed_files = failed;
        report.summary.cancelled = cancelled || self.cancel.is_cancelled();
        Ok(report)
    }

    fn analyze_all(&self, files: &[PathBuf]) -> Vec<FileOutcome> {
        files
            .par_iter()
            .map(|path| {
                if self.cancel.is_cancelled() {
                    FileOutcome::NotScheduled
                } else {
                    self.analyze_file(path)
                }
            })
            .collect()
    }

    pub fn analyze_file(&self, path: &Path) -> FileOutcome {
        let text = match self.provider.read_file(path) {
            Ok(text) => text,
            Err(err) if !err.is_recoverable() => {
                self.cancel.cancel();
                return FileOutcome::Fatal(err);
            }
            Err(err) => {
                warn!("skipping {}: {err}", display_path(path));
                return FileOutcome::Failed(FailedFile {
                    file_path: display_path(path),
                    reason: err.to_string(),
                });
            }
        };

        let extraction = structure::extract(path, &text);
        let source: Arc<str> = Arc::from(text);
        let classes = extraction
            .declarations
            .into_iter()
            .map(|decl| FileWithClass::from_declaration(path, decl, Arc::clone(&source)))
            .collect();

        FileOutcome::Analyzed {
            classes,
            skipped_declarations: extraction.skipped,
        }
    }
}
