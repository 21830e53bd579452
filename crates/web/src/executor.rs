//! External test CLI invocation
//!
//! The runner treats the browser test tool as a capability with a single
//! operation, [`TestExecutor::execute`]. [`PlaywrightExecutor`] is the
//! production implementation; tests substitute their own.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use specrunner_common::config::ExecutorConfig;
use specrunner_common::{Error, Result};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::debug;

/// Environment variables passed to one run
pub type RunEnv = BTreeMap<String, String>;

/// Raw outcome of one external process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    /// Exit code, absent when the process was killed by a signal
    pub exit_code: Option<i32>,
    /// Terminating signal on unix
    pub signal: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// Either stream hit the capture limit
    pub truncated: bool,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs one test file through the external test CLI
#[async_trait]
pub trait TestExecutor: Send + Sync {
    /// Execute `test_file` and wait for the process to exit.
    ///
    /// Returns `Err` only if the process could not be started or its output
    /// could not be read; a non-zero exit is a normal `Ok` outcome.
    async fn execute(&self, test_file: &str, env: &RunEnv) -> Result<ExecOutput>;
}

/// Spawns `npx playwright test <file> --project=<project>` (or whatever the
/// configuration names) as a child process.
#[derive(Debug, Clone)]
pub struct PlaywrightExecutor {
    program: String,
    args: Vec<String>,
    project: Option<String>,
    headless: bool,
    workdir: PathBuf,
    max_output_bytes: usize,
}

impl PlaywrightExecutor {
    pub fn new(config: &ExecutorConfig, workdir: impl Into<PathBuf>) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            project: config.project.clone(),
            headless: config.headless,
            workdir: workdir.into(),
            max_output_bytes: config.max_output_bytes,
        }
    }

    /// Full argument list for one test file
    pub fn command_args(&self, test_file: &str) -> Vec<String> {
        let mut args = self.args.clone();
        args.push(test_file.to_string());
        if let Some(project) = &self.project {
            args.push(format!("--project={}", project));
        }
        if !self.headless {
            args.push("--headed".to_string());
        }
        args
    }
}

#[async_trait]
impl TestExecutor for PlaywrightExecutor {
    async fn execute(&self, test_file: &str, env: &RunEnv) -> Result<ExecOutput> {
        let args = self.command_args(test_file);
        debug!("Spawning {} {}", self.program, args.join(" "));

        let mut child = Command::new(&self.program)
            .args(&args)
            .envs(env)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| Error::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Internal("child stdout not captured".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::Internal("child stderr not captured".into()))?;

        let (stdout, stderr, status) = tokio::join!(
            read_bounded(stdout, self.max_output_bytes),
            read_bounded(stderr, self.max_output_bytes),
            child.wait(),
        );
        let (stdout, stdout_truncated) = stdout?;
        let (stderr, stderr_truncated) = stderr?;
        let status = status?;

        Ok(ExecOutput {
            exit_code: status.code(),
            signal: exit_signal(&status),
            stdout,
            stderr,
            truncated: stdout_truncated || stderr_truncated,
        })
    }
}

#[cfg(unix)]
fn exit_signal(status: &std::process::ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: &std::process::ExitStatus) -> Option<i32> {
    None
}

/// Read a stream to the end, keeping at most `limit` bytes.
///
/// Bytes past the limit are drained and dropped so the writer never blocks
/// on a full pipe.
pub async fn read_bounded<R>(mut reader: R, limit: usize) -> std::io::Result<(String, bool)>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    (&mut reader).take(limit as u64).read_to_end(&mut buf).await?;
    let discarded = tokio::io::copy(&mut reader, &mut tokio::io::sink()).await?;
    Ok((String::from_utf8_lossy(&buf).into_owned(), discarded > 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_bounded_under_limit() {
        let (out, truncated) = read_bounded(&b"hello"[..], 16).await.unwrap();
        assert_eq!(out, "hello");
        assert!(!truncated);
    }

    #[tokio::test]
    async fn test_read_bounded_over_limit() {
        let data = vec![b'x'; 100];
        let (out, truncated) = read_bounded(&data[..], 10).await.unwrap();
        assert_eq!(out.len(), 10);
        assert!(truncated);
    }

    #[test]
    fn test_command_args() {
        let exec = PlaywrightExecutor::new(&ExecutorConfig::default(), ".");
        assert_eq!(
            exec.command_args("logout.spec.ts"),
            vec!["playwright", "test", "logout.spec.ts", "--project=chromium"]
        );

        let cfg = ExecutorConfig {
            project: None,
            ..Default::default()
        };
        let exec = PlaywrightExecutor::new(&cfg, ".");
        assert_eq!(exec.command_args("a.spec.ts"), vec!["playwright", "test", "a.spec.ts"]);
    }

    #[test]
    fn test_command_args_headed() {
        let cfg = ExecutorConfig {
            headless: false,
            ..Default::default()
        };
        let exec = PlaywrightExecutor::new(&cfg, ".");
        assert_eq!(
            exec.command_args("a.spec.ts"),
            vec!["playwright", "test", "a.spec.ts", "--project=chromium", "--headed"]
        );
    }

    #[test]
    fn test_exec_output_success() {
        let ok = ExecOutput {
            exit_code: Some(0),
            ..Default::default()
        };
        assert!(ok.success());

        let killed = ExecOutput::default();
        assert!(!killed.success());
    }

    #[cfg(unix)]
    fn shell(script: &str, max_output_bytes: usize) -> PlaywrightExecutor {
        let cfg = ExecutorConfig {
            program: "sh".into(),
            args: vec!["-c".into(), script.into(), "sh".into()],
            project: None,
            max_output_bytes,
            ..Default::default()
        };
        PlaywrightExecutor::new(&cfg, std::env::temp_dir())
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_execute_captures_streams_and_exit_code() {
        let exec = shell("echo \"run $1\"; echo \"$RUN_LABEL\" >&2; exit 3", 1024);
        let mut env = RunEnv::new();
        env.insert("RUN_LABEL".into(), "from-env".into());

        let out = exec.execute("logout.spec.ts", &env).await.unwrap();
        assert_eq!(out.exit_code, Some(3));
        assert!(!out.success());
        assert_eq!(out.stdout.trim(), "run logout.spec.ts");
        assert_eq!(out.stderr.trim(), "from-env");
        assert!(!out.truncated);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_execute_bounds_output() {
        let exec = shell("i=0; while [ $i -lt 200 ]; do echo 0123456789; i=$((i+1)); done", 64);
        let out = exec.execute("a.spec.ts", &RunEnv::new()).await.unwrap();
        assert!(out.success());
        assert_eq!(out.stdout.len(), 64);
        assert!(out.truncated);
    }

    #[tokio::test]
    async fn test_execute_missing_program() {
        let cfg = ExecutorConfig {
            program: "specrunner-definitely-not-installed".into(),
            ..Default::default()
        };
        let exec = PlaywrightExecutor::new(&cfg, std::env::temp_dir());
        let err = exec.execute("a.spec.ts", &RunEnv::new()).await.unwrap_err();
        assert!(matches!(err, Error::Spawn { .. }));
    }
}
