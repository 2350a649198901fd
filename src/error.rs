use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("root path is not accessible: {}: {source}", path.display())]
    RootPath {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl AnalysisError {
    pub fn read(path: PathBuf, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::FileNotFound { path }
        } else {
            Self::FileRead { path, source }
        }
    }

    /// Per-file errors are recovered by skipping the file.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::FileNotFound { .. } | Self::FileRead { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_maps_not_found_separately() {
        let err = AnalysisError::read(
            PathBuf::from("a.php"),
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, AnalysisError::FileNotFound { .. }));
        assert!(err.is_recoverable());

        let err = AnalysisError::read(
            PathBuf::from("a.php"),
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, AnalysisError::FileRead { .. }));
        assert_eq!(err.to_string(), "failed to read a.php: denied");
    }

    #[test]
    fn root_path_is_fatal() {
        let err = AnalysisError::RootPath {
            path: PathBuf::from("missing"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert!(!err.is_recoverable());
    }
}
