use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use tracing::warn;

use crate::error::AnalysisError;

/// Lists and reads the source files an analysis run consumes.
pub trait SourceProvider: Sync {
    fn list_source_files(&self, root: &Path) -> Result<Vec<PathBuf>, AnalysisError>;

    fn read_file(&self, path: &Path) -> Result<String, AnalysisError>;
}

#[derive(Debug, Clone)]
pub struct FsSourceProvider {
    extensions: Vec<String>,
}

impl FsSourceProvider {
    pub fn new(extensions: Vec<String>) -> Self {
        Self { extensions }
    }

    fn has_source_extension(&self, path: &Path) -> bool {
        path.extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .is_some_and(|e| self.extensions.iter().any(|x| *x == e))
    }
}

impl Default for FsSourceProvider {
    fn default() -> Self {
        Self::new(vec!["php".to_string()])
    }
}

impl SourceProvider for FsSourceProvider {
    fn list_source_files(&self, root: &Path) -> Result<Vec<PathBuf>, AnalysisError> {
        check_root(root)?;

        if root.is_file() {
            return Ok(vec![root.to_path_buf()]);
        }

        let (tx, rx) = mpsc::channel();

        let walker = WalkBuilder::new(root)
            .hidden(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .build_parallel();

        walker.run(|| {
            let tx = tx.clone();
            Box::new(move |entry| {
                match entry {
                    Ok(entry) => {
                        let path = entry.path();
                        if entry.file_type().is_some_and(|t| t.is_file())
                            && self.has_source_extension(path)
                        {
                            let _ = tx.send(path.to_path_buf());
                        }
                    }
                    Err(err) => warn!("skipping unreadable entry: {err}"),
                }
                ignore::WalkState::Continue
            })
        });

        drop(tx);
        let mut files: Vec<PathBuf> = rx.iter().collect();
        files.sort();
        Ok(files)
    }

    fn read_file(&self, path: &Path) -> Result<String, AnalysisError> {
        let bytes =
            std::fs::read(path).map_err(|e| AnalysisError::read(path.to_path_buf(), e))?;
        Ok(String::from_utf8(bytes)
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()))
    }
}

/// Fails with `RootPath` when `root` cannot be stat'ed or, for directories, listed.
pub fn check_root(root: &Path) -> Result<(), AnalysisError> {
    let root_error = |source| AnalysisError::RootPath {
        path: root.to_path_buf(),
        source,
    };
    let meta = std::fs::metadata(root).map_err(root_error)?;
    if meta.is_dir() {
        std::fs::read_dir(root).map_err(root_error)?;
    }
    Ok(())
}
