//! specrunner CLI
//!
//! Drives a remote specrunner-web instance: list tests, run one, and find
//! the latest HTML report.

use clap::{Parser, Subcommand};

mod client;
mod commands;
mod output;

use commands::run::RunArgs;

/// specrunner - remote control for the browser test runner
#[derive(Parser)]
#[command(name = "specrunner")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Runner service address
    #[arg(long, env = "SPECRUNNER_SERVER", default_value = "http://127.0.0.1:3000", global = true)]
    server: String,

    /// Output format
    #[arg(long, value_enum, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the runner is up
    Status,

    /// List available test definitions
    List,

    /// Run one test and wait for the result
    Run(RunArgs),

    /// Show the URL of the latest HTML report
    Report,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let client = client::RunnerClient::new(&cli.server)?;
    tracing::debug!("Using runner at {}", client.base_url());

    let ok = match cli.command {
        Commands::Status => match client.health().await {
            Ok(health) => {
                output::print_success(&format!(
                    "{} v{} is running at {}",
                    health.service,
                    health.version,
                    client.base_url()
                ));
                true
            }
            Err(e) => {
                output::print_error(&format!("Runner is not responding at {}: {}", client.base_url(), e));
                false
            }
        },
        Commands::List => {
            commands::tests::execute(&client, cli.format).await?;
            true
        }
        Commands::Run(args) => commands::run::execute(args, &client, cli.format).await?,
        Commands::Report => commands::report::execute(&client, cli.format).await?,
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
