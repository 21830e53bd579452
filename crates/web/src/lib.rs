//! specrunner web service
//!
//! HTTP control surface for a browser test CLI: lists the test definitions in
//! a directory, runs one on request, and serves the HTML report it produces.

pub mod catalog;
pub mod error;
pub mod executor;
pub mod report;
pub mod runs;
pub mod server;

pub use catalog::{sanitize_test_name, ResolvedTest, TestCatalog};
pub use error::ApiError;
pub use executor::{ExecOutput, PlaywrightExecutor, RunEnv, TestExecutor};
pub use report::ReportStore;
pub use runs::RunCoordinator;
pub use server::RunnerServer;
