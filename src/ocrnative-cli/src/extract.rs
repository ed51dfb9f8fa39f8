//! Batch extraction over files
//!
//! The pipeline is synchronous, so each file runs on a blocking worker thread.
//! A semaphore caps how many files are recognized at once.

use anyhow::Result;
use ocrnative_engine::{EngineOptions, OcrStatus, PlatformRecognizer, Recognizer};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Outcome for a single file
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    pub path: PathBuf,
    pub status: String,
    pub hresult: Option<String>,
    pub text: Option<String>,
    pub error: Option<String>,
}

impl Extraction {
    pub fn is_success(&self) -> bool {
        self.text.is_some()
    }

    fn finished(path: &Path, status: OcrStatus, text: Option<String>, error: Option<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            status: status.as_str().to_string(),
            hresult: Some(format!("0x{:08X}", status.hresult() as u32)),
            text,
            error,
        }
    }
}

/// Read a file and recognize its text on the current thread
pub fn extract_file(path: &Path, options: &EngineOptions) -> Extraction {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("failed to read {:?}: {}", path, e);
            return Extraction {
                path: path.to_path_buf(),
                status: "read_failed".to_string(),
                hresult: None,
                text: None,
                error: Some(e.to_string()),
            };
        }
    };

    debug!("read {} bytes from {:?}", bytes.len(), path);

    match PlatformRecognizer::new(options.clone()).recognize(&bytes) {
        Ok(units) => Extraction::finished(
            path,
            OcrStatus::Success,
            Some(String::from_utf16_lossy(&units)),
            None,
        ),
        Err(e) => {
            warn!("OCR failed for {:?}: {}", path, e);
            Extraction::finished(path, e.status(), None, Some(e.to_string()))
        }
    }
}

/// Recognize many files concurrently, returning results in input order
pub async fn extract_all(
    paths: Vec<PathBuf>,
    options: EngineOptions,
    jobs: usize,
) -> Result<Vec<Extraction>> {
    let semaphore = Arc::new(Semaphore::new(jobs.max(1)));
    let mut tasks = JoinSet::new();
    let total = paths.len();

    for (index, path) in paths.into_iter().enumerate() {
        let permit = semaphore.clone().acquire_owned().await?;
        let options = options.clone();

        tasks.spawn_blocking(move || {
            let _permit = permit;
            (index, extract_file(&path, &options))
        });
    }

    let mut results = Vec::with_capacity(total);
    while let Some(joined) = tasks.join_next().await {
        results.push(joined?);
    }

    results.sort_by_key(|(index, _)| *index);
    Ok(results.into_iter().map(|(_, extraction)| extraction).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = extract_file(&dir.path().join("missing.png"), &EngineOptions::default());

        assert_eq!(result.status, "read_failed");
        assert!(result.hresult.is_none());
        assert!(!result.is_success());
    }

    #[test]
    fn test_empty_file_is_invalid_argument() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let result = extract_file(file.path(), &EngineOptions::default());

        assert_eq!(result.status, "invalid_argument");
        assert_eq!(result.hresult.as_deref(), Some("0x80070057"));
    }

    #[test]
    fn test_garbage_file_is_generic_failure() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"plain text, not pixels").unwrap();

        let result = extract_file(file.path(), &EngineOptions::default());

        assert!(!result.is_success());
        assert_eq!(result.hresult.as_deref(), Some("0x80004005"));
        assert!(result.error.is_some());
    }

    #[tokio::test]
    async fn test_extract_all_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<PathBuf> = (0..6)
            .map(|i| dir.path().join(format!("frame-{i}.png")))
            .collect();

        let results = extract_all(paths.clone(), EngineOptions::default(), 2)
            .await
            .unwrap();

        let returned: Vec<PathBuf> = results.into_iter().map(|r| r.path).collect();
        assert_eq!(returned, paths);
    }

    #[test]
    fn test_json_shape() {
        let extraction = Extraction::finished(
            Path::new("a.png"),
            OcrStatus::Success,
            Some("hi".to_string()),
            None,
        );
        let value = serde_json::to_value(&extraction).unwrap();

        assert_eq!(value["status"], "success");
        assert_eq!(value["hresult"], "0x00000000");
        assert_eq!(value["text"], "hi");
        assert!(value["error"].is_null());
    }
}
