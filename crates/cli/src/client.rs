//! HTTP client for the runner service

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use specrunner_common::{ErrorBody, HealthStatus, ReportLink, RunRequestBody, RunResult, TestDefinition};

/// Client for communicating with a specrunner-web instance
pub struct RunnerClient {
    base_url: String,
    http: reqwest::Client,
}

/// Outcome of asking the service for its report
pub enum ReportStatus {
    Available(ReportLink),
    Missing(ErrorBody),
}

impl RunnerClient {
    /// Create a new client. Requests have no overall timeout because runs
    /// block until the test CLI exits.
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check the service health endpoint
    pub async fn health(&self) -> Result<HealthStatus> {
        let resp = self.http.get(self.url("/api/health")).send().await?;
        Ok(resp.error_for_status()?.json().await?)
    }

    /// List test definitions
    pub async fn list_tests(&self) -> Result<Vec<TestDefinition>> {
        let resp = self.http.get(self.url("/tests")).send().await?;
        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }
        Ok(resp.json().await?)
    }

    /// Run one test and wait for its result
    pub async fn run_test(&self, test: &str) -> Result<RunResult> {
        let body = RunRequestBody {
            test: Some(test.to_string()),
        };
        let resp = self.http.post(self.url("/run")).json(&body).send().await?;
        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }
        resp.json().await.context("invalid run result")
    }

    /// Ask for the latest report URL
    pub async fn open_report(&self) -> Result<ReportStatus> {
        let resp = self.http.get(self.url("/api/open-report")).send().await?;
        match resp.status() {
            StatusCode::OK => Ok(ReportStatus::Available(resp.json().await?)),
            StatusCode::NOT_FOUND => Ok(ReportStatus::Missing(resp.json().await?)),
            _ => Err(api_error(resp).await),
        }
    }
}

async fn api_error(resp: reqwest::Response) -> anyhow::Error {
    let status = resp.status();
    match resp.json::<ErrorBody>().await {
        Ok(body) => anyhow::anyhow!("{} ({})", body.error, status),
        Err(_) => anyhow::anyhow!("request failed with status {}", status),
    }
}
