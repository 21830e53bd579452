//! Run command

use std::time::Duration;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use specrunner_common::RunResult;

use crate::client::RunnerClient;
use crate::output::{print_error, print_json, print_success, OutputFormat};

#[derive(Args)]
pub struct RunArgs {
    /// Test file name as listed by `specrunner list`
    pub test: String,

    /// Print the full stdout/stderr of the run
    #[arg(long)]
    pub show_output: bool,
}

/// Returns whether the run succeeded
pub async fn execute(args: RunArgs, client: &RunnerClient, format: OutputFormat) -> Result<bool> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg} [{elapsed}]")?);
    spinner.set_message(format!("Running {}", args.test));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let result = client.run_test(&args.test).await;
    spinner.finish_and_clear();
    let result = result?;

    match format {
        OutputFormat::Json => print_json(&result),
        _ => print_result(&result, args.show_output),
    }
    Ok(result.success)
}

fn print_result(result: &RunResult, show_output: bool) {
    let elapsed = format!("{:.1}s", result.duration_ms as f64 / 1000.0);
    if result.success {
        print_success(&format!("{} passed in {}", result.test.bold(), elapsed));
    } else {
        print_error(&format!("{} failed in {}", result.test.bold(), elapsed));
        if let Some(error) = &result.error {
            eprintln!("{}", error.red());
        }
    }

    if result.output_truncated {
        println!("{}", "(output truncated by the runner)".dimmed());
    }

    if show_output {
        if !result.stdout.is_empty() {
            println!("{}", "── stdout ──".dimmed());
            println!("{}", result.stdout);
        }
        if !result.stderr.is_empty() {
            println!("{}", "── stderr ──".dimmed());
            println!("{}", result.stderr);
        }
    }
}
