//! Lifecycle callbacks a test engine drives around each case and the whole run.

use crate::failure::CaseFailure;
use crate::record::CaseDescriptor;

/// Lifecycle callbacks a test engine drives around a run.
///
/// Per run the engine calls `on_run_start`, then for every case
/// `on_case_start`, exactly one of `on_success` / `on_failure` / `on_error` /
/// `on_skip`, and `on_case_finish`, and finally `on_run_finish`. Calls are
/// strictly sequential.
pub trait RunListener {
    fn on_run_start(&mut self);

    fn on_case_start(&mut self, case: &CaseDescriptor);

    fn on_success(&mut self, case: &CaseDescriptor);

    /// An assertion inside the case failed
    fn on_failure(&mut self, case: &CaseDescriptor, err: &CaseFailure);

    /// The case body returned or raised an error
    fn on_error(&mut self, case: &CaseDescriptor, err: &CaseFailure);

    fn on_skip(&mut self, case: &CaseDescriptor, reason: &str);

    fn on_case_finish(&mut self, case: &CaseDescriptor);

    fn on_run_finish(&mut self);
}
