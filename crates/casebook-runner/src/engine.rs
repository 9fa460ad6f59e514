//! Sequential test engine.
//!
//! Runs every case of every suite one after another and reports each step to
//! a [`RunListener`]. Panics inside a case body are caught and reported as
//! failures; the panic hook is swapped for the duration of the run so the
//! panic location and backtrace end up in the report instead of on stderr.

use crate::case::{CaseError, TestCase, TestSuite};
use casebook_lib::{CaseFailure, RunListener};
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe, PanicHookInfo};
use std::sync::Arc;
use tracing::{debug, info};

type PanicHook = Arc<dyn Fn(&PanicHookInfo<'_>) + Send + Sync + 'static>;

thread_local! {
    static CAPTURING: Cell<bool> = const { Cell::new(false) };
    static LAST_PANIC: RefCell<Option<PanicSite>> = const { RefCell::new(None) };
}

struct PanicSite {
    location: Option<String>,
    backtrace: Backtrace,
}

/// Outcome of running one case body
enum Outcome {
    Passed,
    Skipped(String),
    Errored(CaseFailure),
    Panicked(CaseFailure),
}

/// Restores the previous panic hook when dropped
struct PanicHookGuard {
    previous: Option<PanicHook>,
}

impl PanicHookGuard {
    fn install() -> Self {
        let previous: PanicHook = Arc::from(panic::take_hook());
        let fallback = Arc::clone(&previous);

        panic::set_hook(Box::new(move |info| {
            if CAPTURING.with(Cell::get) {
                let site = PanicSite {
                    location: info.location().map(|l| l.to_string()),
                    backtrace: Backtrace::capture(),
                };
                LAST_PANIC.with(|last| *last.borrow_mut() = Some(site));
            } else {
                fallback(info);
            }
        }));

        Self {
            previous: Some(previous),
        }
    }
}

impl Drop for PanicHookGuard {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            let _ = panic::take_hook();
            panic::set_hook(Box::new(move |info| previous(info)));
        }
    }
}

/// Engine that runs suites in declaration order on the calling thread
#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialEngine;

impl SequentialEngine {
    pub fn new() -> Self {
        Self
    }

    /// Run all suites, reporting every lifecycle step to `listener`
    pub fn run<L>(&self, suites: &[TestSuite], listener: &mut L)
    where
        L: RunListener + ?Sized,
    {
        let total: usize = suites.iter().map(TestSuite::len).sum();
        info!(suites = suites.len(), cases = total, "Starting test run");

        listener.on_run_start();
        let hook = PanicHookGuard::install();

        for suite in suites {
            for case in &suite.cases {
                let descriptor = suite.descriptor(case);
                debug!(case = %descriptor.id, "Running case");
                listener.on_case_start(&descriptor);

                let outcome = match &case.skip {
                    Some(reason) => Outcome::Skipped(reason.clone()),
                    None => run_isolated(case),
                };
                match outcome {
                    Outcome::Passed => listener.on_success(&descriptor),
                    Outcome::Skipped(reason) => listener.on_skip(&descriptor, &reason),
                    Outcome::Errored(failure) => listener.on_error(&descriptor, &failure),
                    Outcome::Panicked(failure) => listener.on_failure(&descriptor, &failure),
                }

                listener.on_case_finish(&descriptor);
            }
        }

        drop(hook);
        listener.on_run_finish();
    }
}

fn run_isolated(case: &TestCase) -> Outcome {
    CAPTURING.with(|c| c.set(true));
    let result = panic::catch_unwind(AssertUnwindSafe(|| case.run()));
    CAPTURING.with(|c| c.set(false));

    match result {
        Ok(Ok(())) => Outcome::Passed,
        Ok(Err(CaseError::Skip(reason))) => Outcome::Skipped(reason),
        Ok(Err(CaseError::Failed(failure))) => Outcome::Errored(failure),
        Err(payload) => {
            let site = LAST_PANIC.with(|last| last.borrow_mut().take());
            let failure = match &site {
                Some(site) => CaseFailure::from_panic(
                    payload.as_ref(),
                    site.location.as_deref(),
                    Some(&site.backtrace),
                ),
                None => CaseFailure::from_panic(payload.as_ref(), None, None),
            };
            Outcome::Panicked(failure)
        }
    }
}
