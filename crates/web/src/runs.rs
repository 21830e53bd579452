//! Run coordination
//!
//! Turns a resolved test into a [`RunResult`]: builds the child environment,
//! limits how many runs share the report directory at once, and summarizes
//! failures.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use specrunner_common::types::truncate_summary;
use specrunner_common::{Error, Result, RunResult};
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::catalog::ResolvedTest;
use crate::executor::{ExecOutput, RunEnv, TestExecutor};

/// Serializes access to the external test CLI
#[derive(Clone)]
pub struct RunCoordinator {
    executor: Arc<dyn TestExecutor>,
    permits: Arc<Semaphore>,
    env: RunEnv,
}

impl RunCoordinator {
    /// `max_concurrent` runs may execute at once; others wait their turn.
    pub fn new(executor: Arc<dyn TestExecutor>, max_concurrent: usize, env: RunEnv) -> Self {
        Self {
            executor,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            env,
        }
    }

    /// Environment for a run writing its report into `report_dir`.
    ///
    /// `CI` is left alone: suites switch retries and workers on it, so it is
    /// only set when `extra` names it.
    pub fn run_env(report_dir: PathBuf, extra: &RunEnv) -> RunEnv {
        let mut env = RunEnv::new();
        env.insert("PLAYWRIGHT_HTML_OPEN".into(), "never".into());
        env.insert(
            "PLAYWRIGHT_HTML_REPORT".into(),
            report_dir.to_string_lossy().to_string(),
        );
        env.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        env
    }

    /// Execute one test and wait for it to finish.
    ///
    /// The run lives in its own task, so dropping the returned future (client
    /// disconnect) leaves the child process running to completion.
    pub async fn run(&self, test: ResolvedTest) -> Result<RunResult> {
        let this = self.clone();
        tokio::spawn(async move { this.run_inner(test).await })
            .await
            .map_err(|e| Error::Internal(format!("run task failed: {}", e)))?
    }

    async fn run_inner(&self, test: ResolvedTest) -> Result<RunResult> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| Error::Internal("run queue closed".into()))?;

        info!("Running test {}", test.name);
        let start = Instant::now();
        let outcome = self.executor.execute(&test.name, &self.env).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let result = match outcome {
            Ok(output) => build_result(&test.name, output, duration_ms),
            Err(err @ Error::Spawn { .. }) => RunResult {
                success: false,
                test: test.name.clone(),
                stdout: String::new(),
                stderr: String::new(),
                error: Some(truncate_summary(&err.to_string())),
                exit_code: None,
                duration_ms,
                output_truncated: false,
            },
            Err(err) => return Err(err),
        };

        if result.success {
            info!("✓ {} ({} ms)", result.test, result.duration_ms);
        } else {
            warn!(
                "✗ {} ({} ms) - {}",
                result.test,
                result.duration_ms,
                result.error.as_deref().unwrap_or("unknown error")
            );
        }

        Ok(result)
    }
}

fn build_result(test: &str, output: ExecOutput, duration_ms: u64) -> RunResult {
    let success = output.success();
    let error = if success {
        None
    } else {
        Some(failure_summary(&output))
    };

    RunResult {
        success,
        test: test.to_string(),
        error,
        exit_code: output.exit_code,
        duration_ms,
        output_truncated: output.truncated,
        stdout: output.stdout,
        stderr: output.stderr,
    }
}

/// Short failure description: stderr, else stdout, else the exit status.
pub fn failure_summary(output: &ExecOutput) -> String {
    let source = [output.stderr.trim(), output.stdout.trim()]
        .into_iter()
        .find(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| match (output.exit_code, output.signal) {
            (Some(code), _) => format!("Process exited with code {}", code),
            (None, Some(signal)) => format!("Process terminated by signal {}", signal),
            (None, None) => "Process terminated abnormally".to_string(),
        });
    truncate_summary(&source)
}
