use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use specrunner_common::RunnerConfig;
use specrunner_web::RunnerServer;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

/// HTTP runner for browser end-to-end tests
#[derive(Parser)]
#[command(name = "specrunner-web")]
#[command(version, about)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "RUNNER_CONFIG", default_value = "specrunner.toml")]
    config: PathBuf,

    /// Listen host
    #[arg(long, env = "HOST")]
    host: Option<String>,

    /// Listen port
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Working directory of the test CLI
    #[arg(long, env = "RUNNER_WORKDIR")]
    workdir: Option<PathBuf>,

    /// Directory holding test spec files
    #[arg(long, env = "RUNNER_TESTS_DIR")]
    tests_dir: Option<PathBuf>,

    /// Directory the HTML report is written to
    #[arg(long, env = "RUNNER_REPORT_DIR")]
    report_dir: Option<PathBuf>,

    /// Runs allowed to execute at once
    #[arg(long, env = "RUNNER_MAX_CONCURRENT_RUNS")]
    max_concurrent_runs: Option<usize>,

    /// Log output format
    #[arg(long, value_enum, default_value = "text")]
    log_format: LogFormat,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<RunnerConfig> {
        let mut cfg = RunnerConfig::load(&self.config)?;

        if let Some(host) = self.host {
            cfg.server.host = host;
        }
        if let Some(port) = self.port {
            cfg.server.port = port;
        }
        if let Some(workdir) = self.workdir {
            cfg.paths.workdir = workdir;
        }
        if let Some(tests_dir) = self.tests_dir {
            cfg.paths.tests_dir = tests_dir;
        }
        if let Some(report_dir) = self.report_dir {
            cfg.paths.report_dir = report_dir;
        }
        if let Some(n) = self.max_concurrent_runs {
            cfg.executor.max_concurrent_runs = n;
        }

        cfg.validate()?;
        Ok(cfg)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match cli.log_format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }

    let cfg = cli.into_config()?;
    let addr: SocketAddr = tokio::net::lookup_host(cfg.listen_addr())
        .await?
        .next()
        .ok_or_else(|| anyhow::anyhow!("cannot resolve listen address {}", cfg.listen_addr()))?;

    info!(
        "Starting specrunner v{} (tests: {}, report: {})",
        env!("CARGO_PKG_VERSION"),
        cfg.tests_dir().display(),
        cfg.report_dir().display()
    );

    RunnerServer::new(&cfg).serve(addr).await
}
