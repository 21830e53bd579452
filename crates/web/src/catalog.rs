//! Test definition catalog
//!
//! Enumerates the flat tests directory and resolves caller-supplied test
//! names to files inside it. Every resolution goes through
//! [`sanitize_test_name`] first, so a request can never address a path
//! outside the directory.

use std::path::{Path, PathBuf};

use specrunner_common::{Error, Result, RunRequest, TestDefinition};
use tracing::debug;

/// A test file that exists inside the tests directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTest {
    /// Sanitized filename, passed to the test CLI
    pub name: String,
    /// Full path inside the tests directory
    pub path: PathBuf,
}

/// Read-only view of the tests directory
#[derive(Debug, Clone)]
pub struct TestCatalog {
    dir: PathBuf,
    extensions: Vec<String>,
}

impl TestCatalog {
    pub fn new(dir: impl Into<PathBuf>, extensions: Vec<String>) -> Self {
        Self {
            dir: dir.into(),
            extensions,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether a filename carries one of the recognized test suffixes
    pub fn is_test_file(&self, name: &str) -> bool {
        self.extensions
            .iter()
            .any(|ext| !ext.is_empty() && name.len() > ext.len() && name.ends_with(ext.as_str()))
    }

    /// List test definitions. The directory is re-scanned on every call.
    pub async fn list(&self) -> Result<Vec<TestDefinition>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut tests = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if self.is_test_file(&name) {
                tests.push(TestDefinition::new(name));
            }
        }

        tests.sort();
        debug!("Found {} test definition(s) in {}", tests.len(), self.dir.display());
        Ok(tests)
    }

    /// Resolve a run request to an existing file inside the tests directory
    pub async fn resolve(&self, request: &RunRequest) -> Result<ResolvedTest> {
        let name = sanitize_test_name(request.test())?;
        let path = self.dir.join(&name);

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(ResolvedTest { name, path }),
            _ => Err(Error::TestNotFound(name)),
        }
    }
}

/// Reduce a caller-supplied identifier to a bare filename.
///
/// Both `/` and `\` count as separators regardless of platform; everything up
/// to the last separator is dropped.
pub fn sanitize_test_name(raw: &str) -> Result<String> {
    let name = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    if name.is_empty() || name == "." || name == ".." || name.contains('\0') {
        return Err(Error::InvalidRequest(format!("Invalid test name: {:?}", raw)));
    }

    Ok(name.to_string())
}
