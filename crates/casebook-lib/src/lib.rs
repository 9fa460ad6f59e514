//! # Casebook
//!
//! Test-run observer and report generator.
//!
//! A test engine drives a [`RunAggregator`] through the [`RunListener`]
//! callbacks. The aggregator reads each case's metadata (explicit
//! [`CaseMeta`] or `key: value` lines in its documentation), records
//! outcomes, timing and captured log output, and classifies failures
//! against a known-exceptions mapping. The finished [`RunSummary`] is then
//! rendered into a self-contained HTML file by [`ReportRenderer`].

pub mod aggregator;
pub mod capture;
pub mod classifier;
pub mod error;
pub mod failure;
pub mod listener;
pub mod metadata;
pub mod record;
pub mod renderer;
pub mod source;
pub mod summary;
pub mod utils;

pub use aggregator::{RunAggregator, RunState};
pub use capture::LogCapture;
pub use classifier::ExceptionClassifier;
pub use error::{ReportError, ReportResult};
pub use failure::{CaseFailure, PANIC_TYPE_ID};
pub use listener::RunListener;
pub use metadata::{CaseMeta, DocParser, DEFAULT_LEVEL};
pub use record::{CaseDescriptor, CaseRecord, CaseStatus, CaseTime};
pub use renderer::{ReportRenderer, CLASS_SET_MARKER, DEFAULT_REPORT_FILENAME, SUMMARY_MARKER};
pub use source::SourceRegistry;
pub use summary::{ClassSetEntry, RunCounts, RunSummary, RunTime, ALL_CLASSES_LABEL};
