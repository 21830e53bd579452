//! specrunner common types
//!
//! Configuration, error taxonomy and wire types shared by the runner
//! service (`specrunner-web`) and its command-line client.

pub mod config;
pub mod error;
pub mod types;

pub use config::RunnerConfig;
pub use error::{Error, Result};
pub use types::{
    ErrorBody, HealthStatus, ReportLink, RunRequest, RunRequestBody, RunResult, TestDefinition,
};
