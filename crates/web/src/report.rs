//! HTML report location and public URL resolution

use std::path::{Path, PathBuf};

use axum::http::{header, HeaderMap};
use chrono::{DateTime, Utc};
use specrunner_common::{Error, Result};

/// Path prefix the report directory is mounted at
pub const REPORT_MOUNT: &str = "/report";

const REPORT_INDEX: &str = "index.html";

/// The single shared report directory written by the test CLI
#[derive(Debug, Clone)]
pub struct ReportStore {
    dir: PathBuf,
}

/// Metadata of the report currently on disk
#[derive(Debug, Clone)]
pub struct ReportInfo {
    pub updated_at: Option<DateTime<Utc>>,
}

impl ReportStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the report directory if it does not exist yet
    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// The current report, if the test CLI has produced one
    pub async fn latest(&self) -> Result<ReportInfo> {
        let index_path = self.dir.join(REPORT_INDEX);
        match tokio::fs::metadata(&index_path).await {
            Ok(meta) if meta.is_file() => Ok(ReportInfo {
                updated_at: meta.modified().ok().map(DateTime::<Utc>::from),
            }),
            _ => Err(Error::ReportNotFound),
        }
    }
}

/// Externally visible base URL of this service for the current request.
///
/// Honors `X-Forwarded-Proto` / `X-Forwarded-Host` from a reverse proxy, then
/// the `Host` header, then `fallback_host`.
pub fn public_base_url(headers: &HeaderMap, fallback_host: &str) -> String {
    let proto = first_header_value(headers, "x-forwarded-proto").unwrap_or_else(|| "http".to_string());
    let host = first_header_value(headers, "x-forwarded-host")
        .or_else(|| first_header_value(headers, header::HOST.as_str()))
        .unwrap_or_else(|| fallback_host.to_string());
    format!("{}://{}", proto, host)
}

/// Public URL of the mounted report
pub fn report_url(headers: &HeaderMap, fallback_host: &str) -> String {
    format!("{}{}/", public_base_url(headers, fallback_host), REPORT_MOUNT)
}

/// First comma-separated element of a header, trimmed and non-empty
fn first_header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
