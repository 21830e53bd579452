//! Wire types shared by the runner service and its clients

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Maximum length, in characters, of the failure summary attached to a run.
pub const ERROR_SUMMARY_MAX_CHARS: usize = 500;

// ============================================================================
// Test definitions
// ============================================================================

/// A test spec file inside the tests directory, identified by its filename.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestDefinition(String);

impl TestDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TestDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Run requests
// ============================================================================

/// Body of `POST /run` as it arrives on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunRequestBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<String>,
}

/// A validated run request naming exactly one test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    test: String,
}

impl RunRequest {
    /// The test identifier as supplied by the caller (trimmed, not yet sanitized).
    pub fn test(&self) -> &str {
        &self.test
    }
}

impl TryFrom<RunRequestBody> for RunRequest {
    type Error = Error;

    fn try_from(body: RunRequestBody) -> Result<Self> {
        let test = body
            .test
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::InvalidRequest("Missing 'test' field in request body".into()))?;
        Ok(Self { test })
    }
}

// ============================================================================
// Run results
// ============================================================================

/// Outcome of one run, returned once to the caller and then discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub success: bool,
    /// Sanitized filename that was executed
    #[serde(default)]
    pub test: String,
    pub stdout: String,
    pub stderr: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub exit_code: Option<i32>,
    #[serde(default)]
    pub duration_ms: u64,
    /// Set when either stream exceeded the capture limit
    #[serde(default)]
    pub output_truncated: bool,
}

/// Truncate a failure message to [`ERROR_SUMMARY_MAX_CHARS`] characters.
pub fn truncate_summary(message: &str) -> String {
    message.chars().take(ERROR_SUMMARY_MAX_CHARS).collect()
}

// ============================================================================
// Reports
// ============================================================================

/// Response of `GET /api/open-report` when a report exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportLink {
    pub success: bool,
    pub message: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Errors on the wire
// ============================================================================

/// JSON body of every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Response of `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
    pub version: String,
}
