//! Lifecycle-driven aggregation of case outcomes
//!
//! [`RunAggregator`] implements [`RunListener`]. It owns the ordered case
//! records, the class list, the outcome counters and the log capture. The
//! engine drives it strictly sequentially: a case runs start to finish before
//! the next one starts, which is what lets a single capture buffer be shared.
//!
//! Callbacks that arrive out of order are logged and ignored, so a record's
//! status moves from `pending` to a terminal value exactly once and the
//! counters never count a case twice.

use crate::capture::LogCapture;
use crate::classifier::ExceptionClassifier;
use crate::failure::CaseFailure;
use crate::listener::RunListener;
use crate::record::{CaseDescriptor, CaseRecord, CaseStatus};
use crate::source::SourceRegistry;
use crate::summary::RunSummary;
use crate::utils::{format_local, round_to, unix_now};
use chrono::{DateTime, Local};
use tracing::subscriber::DefaultGuard;
use tracing::{debug, info, warn};
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// Run-level lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Running,
    Finished,
}

/// Collects a run into a [`RunSummary`].
///
/// While running, the aggregator holds a thread-local subscriber guard, so it
/// must stay on the thread that started the run.
pub struct RunAggregator {
    state: RunState,
    summary: RunSummary,
    classifier: ExceptionClassifier,
    sources: SourceRegistry,
    capture: LogCapture,
    echo: Option<BoxMakeWriter>,
    capture_guard: Option<DefaultGuard>,
    begin: Option<DateTime<Local>>,
    current: Option<usize>,
}

impl Default for RunAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl RunAggregator {
    pub fn new() -> Self {
        Self {
            state: RunState::NotStarted,
            summary: RunSummary::default(),
            classifier: ExceptionClassifier::new(),
            sources: SourceRegistry::new(),
            capture: LogCapture::new(),
            echo: None,
            capture_guard: None,
            begin: None,
            current: None,
        }
    }

    /// Set the run label
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.summary.name = Some(name.into());
        self
    }

    /// Set the known-exceptions classifier
    pub fn with_classifier(mut self, classifier: ExceptionClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Set the case source registry
    pub fn with_sources(mut self, sources: SourceRegistry) -> Self {
        self.sources = sources;
        self
    }

    /// Forward captured events to `writer` as well (console, log file)
    pub fn with_echo(mut self, writer: BoxMakeWriter) -> Self {
        self.echo = Some(writer);
        self
    }

    pub fn sources_mut(&mut self) -> &mut SourceRegistry {
        &mut self.sources
    }

    pub fn capture(&self) -> &LogCapture {
        &self.capture
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    pub fn class_list(&self) -> &[String] {
        &self.summary.class_list
    }

    /// Hand over the summary; an unfinished run keeps whatever was recorded
    pub fn into_summary(self) -> RunSummary {
        if self.state != RunState::Finished {
            warn!(state = ?self.state, "Taking summary of a run that did not finish");
        }
        self.summary
    }

    fn current_record(&mut self, case: &CaseDescriptor, callback: &str) -> Option<&mut CaseRecord> {
        let Some(index) = self.current else {
            warn!(case_id = %case.id, callback, "No case in progress, ignoring callback");
            return None;
        };
        let record = &mut self.summary.details[index];
        if record.id != case.id {
            warn!(
                case_id = %case.id,
                current = %record.id,
                callback,
                "Callback for a case that is not in progress, ignoring"
            );
            return None;
        }
        Some(record)
    }

    fn record_outcome(
        &mut self,
        case: &CaseDescriptor,
        status: CaseStatus,
        reason: Option<String>,
        exc_info: Option<String>,
    ) {
        let Some(record) = self.current_record(case, "outcome") else {
            return;
        };
        if !record.complete(status) {
            warn!(
                case_id = %case.id,
                status = %record.status,
                ignored = %status,
                "Case already has an outcome, ignoring"
            );
            return;
        }
        record.reason = reason;
        record.exc_info = exc_info;

        let counts = &mut self.summary.result;
        match status {
            CaseStatus::Pass => counts.successes += 1,
            CaseStatus::Fail => counts.failures += 1,
            CaseStatus::Skip => counts.skipped += 1,
            CaseStatus::Pending => {}
        }
    }

    fn add_failure(&mut self, case: &CaseDescriptor, err: &CaseFailure) {
        let reason = self.classifier.classify(&err.type_id, &err.message);
        debug!(case_id = %case.id, type_id = %err.type_id, "Recording case failure");
        self.record_outcome(case, CaseStatus::Fail, Some(reason), Some(err.trace.clone()));
    }

    fn ensure_running(&self, case: &CaseDescriptor) -> bool {
        if self.state == RunState::Running {
            return true;
        }
        warn!(case_id = %case.id, state = ?self.state, "Case callback outside a running run, ignoring");
        false
    }
}

impl RunListener for RunAggregator {
    fn on_run_start(&mut self) {
        if self.state != RunState::NotStarted {
            warn!(state = ?self.state, "Run already started, ignoring");
            return;
        }
        self.capture_guard = Some(self.capture.install(self.echo.take()));

        let begin = Local::now();
        self.summary.time.begin_time = Some(format_local(&begin));
        self.begin = Some(begin);
        self.state = RunState::Running;

        info!("Test run started");
    }

    fn on_case_start(&mut self, case: &CaseDescriptor) {
        if !self.ensure_running(case) {
            return;
        }
        if let Some(index) = self.current {
            warn!(
                case_id = %self.summary.details[index].id,
                "Previous case never finished"
            );
        }

        self.capture.clear();
        let record = CaseRecord::start(case, &self.sources);

        if !self.summary.class_list.contains(&record.class_name) {
            self.summary.class_list.push(record.class_name.clone());
        }
        self.summary.details.push(record);
        self.summary.result.test_run += 1;
        self.current = Some(self.summary.details.len() - 1);
    }

    fn on_case_finish(&mut self, case: &CaseDescriptor) {
        if !self.ensure_running(case) {
            return;
        }
        let output = self.capture.take();
        let Some(record) = self.current_record(case, "case_finish") else {
            return;
        };
        record.stop(unix_now());
        record.output = output;
        if record.status == CaseStatus::Pending {
            warn!(case_id = %case.id, "Case finished without an outcome");
        }
        self.current = None;
    }

    fn on_success(&mut self, case: &CaseDescriptor) {
        if self.ensure_running(case) {
            self.record_outcome(case, CaseStatus::Pass, None, None);
        }
    }

    fn on_failure(&mut self, case: &CaseDescriptor, err: &CaseFailure) {
        if self.ensure_running(case) {
            self.add_failure(case, err);
        }
    }

    fn on_error(&mut self, case: &CaseDescriptor, err: &CaseFailure) {
        if self.ensure_running(case) {
            self.add_failure(case, err);
        }
    }

    fn on_skip(&mut self, case: &CaseDescriptor, reason: &str) {
        if self.ensure_running(case) {
            self.record_outcome(case, CaseStatus::Skip, Some(reason.to_string()), None);
        }
    }

    fn on_run_finish(&mut self) {
        if self.state != RunState::Running {
            warn!(state = ?self.state, "Run is not running, ignoring finish");
            return;
        }

        let finish = Local::now();
        let duration = self
            .begin
            .map(|begin| (finish - begin).num_microseconds().unwrap_or(0) as f64 / 1_000_000.0)
            .map(|secs| round_to(secs.max(0.0), 3))
            .unwrap_or(0.0);

        self.summary.time.finish_time = Some(format_local(&finish));
        self.summary.time.duration = Some(duration);
        self.summary.success = self.summary.result.failures == 0;
        self.state = RunState::Finished;

        info!(duration, "Test run finished in {duration} s");
        self.capture_guard = None;
    }
}
