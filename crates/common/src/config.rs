//! Runner configuration

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Default capture limit per output stream (10 MiB)
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

/// Runner configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// HTTP listener
    pub server: ServerConfig,

    /// On-disk locations
    pub paths: PathsConfig,

    /// External test CLI invocation
    pub executor: ExecutorConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Directory layout the runner depends on
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Working directory of the test CLI (project root)
    pub workdir: PathBuf,

    /// Flat directory of test spec files
    pub tests_dir: PathBuf,

    /// Directory the test CLI writes its HTML report into
    pub report_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            workdir: PathBuf::from("."),
            tests_dir: PathBuf::from("tests"),
            report_dir: PathBuf::from("playwright-report"),
        }
    }
}

/// How the external test CLI is invoked
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Program to spawn
    pub program: String,

    /// Arguments placed before the test filename
    pub args: Vec<String>,

    /// Browser project passed as `--project=<name>`; none runs every project
    pub project: Option<String>,

    /// Run browsers headless; `false` passes `--headed` to the test CLI
    pub headless: bool,

    /// Capture limit per output stream
    pub max_output_bytes: usize,

    /// Filename suffixes that mark a file as a runnable test
    pub test_extensions: Vec<String>,

    /// Runs allowed to execute at the same time. With more than one, concurrent
    /// runs overwrite each other's report.
    pub max_concurrent_runs: usize,

    /// Extra environment for the test CLI (target URL, credentials, fixtures)
    pub env: BTreeMap<String, String>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            program: "npx".to_string(),
            args: vec!["playwright".to_string(), "test".to_string()],
            project: Some("chromium".to_string()),
            headless: true,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            test_extensions: [".spec.ts", ".spec.js", ".spec.mjs", ".test.ts", ".test.js", ".test.mjs"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_concurrent_runs: 1,
            env: BTreeMap::new(),
        }
    }
}

impl RunnerConfig {
    /// Load configuration from file, falling back to defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Check invariants the service relies on
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::InvalidConfig("server.port must not be 0".into()));
        }
        if self.executor.program.trim().is_empty() {
            return Err(Error::InvalidConfig("executor.program must not be empty".into()));
        }
        if self.executor.max_concurrent_runs == 0 {
            return Err(Error::InvalidConfig(
                "executor.max_concurrent_runs must be at least 1".into(),
            ));
        }
        if self.executor.max_output_bytes == 0 {
            return Err(Error::InvalidConfig(
                "executor.max_output_bytes must be at least 1".into(),
            ));
        }
        if self.executor.test_extensions.iter().all(|e| e.is_empty()) {
            return Err(Error::InvalidConfig(
                "executor.test_extensions must name at least one suffix".into(),
            ));
        }
        Ok(())
    }

    /// Listen address as `host:port`
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Tests directory, resolved against the working directory
    pub fn tests_dir(&self) -> PathBuf {
        resolve(&self.paths.workdir, &self.paths.tests_dir)
    }

    /// Report directory, resolved against the working directory
    pub fn report_dir(&self) -> PathBuf {
        resolve(&self.paths.workdir, &self.paths.report_dir)
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = RunnerConfig::default();
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.executor.program, "npx");
        assert_eq!(cfg.executor.project.as_deref(), Some("chromium"));
        assert_eq!(cfg.executor.max_concurrent_runs, 1);
        assert_eq!(cfg.executor.max_output_bytes, DEFAULT_MAX_OUTPUT_BYTES);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let cfg = RunnerConfig::from_toml(
            r#"
            [server]
            port = 8080

            [executor.env]
            BASE_URL = "https://app.example.test"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.paths.tests_dir, PathBuf::from("tests"));
        assert_eq!(
            cfg.executor.env.get("BASE_URL").map(String::as_str),
            Some("https://app.example.test")
        );
    }

    #[test]
    fn test_invalid_toml() {
        let err = RunnerConfig::from_toml("[server\nport = 1").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = RunnerConfig::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg.server.port, 3000);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runner.toml");
        std::fs::write(&path, "[executor]\nmax_concurrent_runs = 2\n").unwrap();

        let cfg = RunnerConfig::load(&path).unwrap();
        assert_eq!(cfg.executor.max_concurrent_runs, 2);
    }

    #[test]
    fn test_validate_rejects_zero_permits() {
        let mut cfg = RunnerConfig::default();
        cfg.executor.max_concurrent_runs = 0;
        assert!(matches!(cfg.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_empty_program() {
        let mut cfg = RunnerConfig::default();
        cfg.executor.program = " ".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_relative_dirs_resolve_against_workdir() {
        let mut cfg = RunnerConfig::default();
        cfg.paths.workdir = PathBuf::from("/srv/e2e");
        assert_eq!(cfg.tests_dir(), PathBuf::from("/srv/e2e/tests"));

        cfg.paths.report_dir = PathBuf::from("/var/report");
        assert_eq!(cfg.report_dir(), PathBuf::from("/var/report"));
    }
}
