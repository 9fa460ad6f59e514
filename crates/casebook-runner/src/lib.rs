//! # Casebook runner
//!
//! Drives declared test suites through a sequential engine, feeds every
//! lifecycle step to a [`casebook_lib::RunAggregator`], and writes the HTML
//! report. Also carries the runner configuration, log destinations and the
//! console summary tree used by the `casebook` binary.

pub mod case;
pub mod config;
pub mod demo;
pub mod engine;
pub mod logging;
pub mod renderer;
pub mod runner;

pub use case::{CaseError, CaseResult, TestCase, TestSuite};
pub use config::RunnerConfig;
pub use engine::SequentialEngine;
pub use logging::LogTargets;
pub use runner::{ReportRunner, RunReport};
