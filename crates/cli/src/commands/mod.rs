//! CLI Commands

pub mod report;
pub mod run;
pub mod tests;
