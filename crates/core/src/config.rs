//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the
//! [`Exporter`](crate::Exporter). Nothing in this crate reads environment variables while
//! handling an export request.

use crate::constants::DEFAULT_OUTPUT_DIR;
use crate::{ReportError, ReportResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    output_dir: PathBuf,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// The output directory must already exist; use [`resolve_output_dir`] to create it.
    pub fn new(output_dir: PathBuf) -> ReportResult<Self> {
        if !output_dir.is_dir() {
            return Err(ReportError::InvalidInput(format!(
                "output directory is not a directory: {}",
                output_dir.display()
            )));
        }

        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

/// Resolve the directory that exported artefacts are written into.
///
/// If `override_dir` is provided it is used, otherwise [`DEFAULT_OUTPUT_DIR`] relative to the
/// current working directory. A missing directory is created; a path that exists but is not
/// a directory is rejected.
pub fn resolve_output_dir(override_dir: Option<PathBuf>) -> ReportResult<PathBuf> {
    let dir = override_dir
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

    if dir.exists() {
        if !dir.is_dir() {
            return Err(ReportError::InvalidInput(format!(
                "output path exists but is not a directory: {}",
                dir.display()
            )));
        }
        return Ok(dir);
    }

    std::fs::create_dir_all(&dir).map_err(|source| ReportError::Persistence {
        path: dir.clone(),
        source,
    })?;
    tracing::debug!("created output directory {}", dir.display());

    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_missing_output_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("nested").join("exports");

        let resolved = resolve_output_dir(Some(target.clone())).unwrap();
        assert_eq!(resolved, target);
        assert!(target.is_dir());
        assert!(CoreConfig::new(resolved).is_ok());
    }

    #[test]
    fn rejects_file_as_output_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("not-a-dir");
        std::fs::write(&file, b"x").unwrap();

        let err = resolve_output_dir(Some(file.clone())).unwrap_err();
        assert!(matches!(err, ReportError::InvalidInput(_)));

        let err = CoreConfig::new(file).unwrap_err();
        assert!(matches!(err, ReportError::InvalidInput(_)));
    }
}
