//! Test listing command

use anyhow::Result;
use serde::Serialize;
use specrunner_common::TestDefinition;

use crate::client::RunnerClient;
use crate::output::{print_list, OutputFormat, TableDisplay};

/// Test definition display wrapper
#[derive(Serialize)]
pub struct TestDisplay {
    pub name: String,
}

impl From<TestDefinition> for TestDisplay {
    fn from(test: TestDefinition) -> Self {
        Self {
            name: test.name().to_string(),
        }
    }
}

impl TableDisplay for TestDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["Test"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.name.clone()]
    }
}

pub async fn execute(client: &RunnerClient, format: OutputFormat) -> Result<()> {
    let tests: Vec<TestDisplay> = client
        .list_tests()
        .await?
        .into_iter()
        .map(TestDisplay::from)
        .collect();

    match format {
        // Same shape the service returns: a bare array of filenames
        OutputFormat::Json => {
            let names: Vec<&str> = tests.iter().map(|t| t.name.as_str()).collect();
            crate::output::print_json(&names);
        }
        _ => print_list(&tests, format),
    }
    Ok(())
}
