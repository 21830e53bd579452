//! Report command

use anyhow::Result;

use crate::client::{ReportStatus, RunnerClient};
use crate::output::{print_error, print_info, print_json, print_success, OutputFormat};

/// Returns whether a report is available
pub async fn execute(client: &RunnerClient, format: OutputFormat) -> Result<bool> {
    match client.open_report().await? {
        ReportStatus::Available(link) => {
            match format {
                OutputFormat::Json => print_json(&link),
                OutputFormat::Plain => println!("{}", link.url),
                OutputFormat::Table => {
                    print_success(&link.message);
                    println!("{}", link.url);
                    if let Some(updated) = link.updated_at {
                        print_info(&format!("Last updated {}", updated.format("%Y-%m-%d %H:%M:%S UTC")));
                    }
                }
            }
            Ok(true)
        }
        ReportStatus::Missing(body) => {
            match format {
                OutputFormat::Json => print_json(&body),
                _ => {
                    print_error(&body.error);
                    if let Some(suggestion) = &body.suggestion {
                        print_info(suggestion);
                    }
                }
            }
            Ok(false)
        }
    }
}
