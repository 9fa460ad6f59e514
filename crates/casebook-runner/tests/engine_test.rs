//! Tests for the sequential engine

use casebook_lib::{CaseDescriptor, CaseFailure, CaseStatus, RunAggregator, RunListener, PANIC_TYPE_ID};
use casebook_runner::{case, CaseError, SequentialEngine, TestCase, TestSuite};
use serial_test::serial;
use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Listener that records every callback as a line
#[derive(Default)]
struct Recorder {
    events: Vec<String>,
    failures: Vec<CaseFailure>,
}

impl RunListener for Recorder {
    fn on_run_start(&mut self) {
        self.events.push("run_start".to_string());
    }

    fn on_case_start(&mut self, case: &CaseDescriptor) {
        self.events.push(format!("start {}", case.method));
    }

    fn on_success(&mut self, case: &CaseDescriptor) {
        self.events.push(format!("success {}", case.method));
    }

    fn on_failure(&mut self, case: &CaseDescriptor, err: &CaseFailure) {
        self.events.push(format!("failure {}", case.method));
        self.failures.push(err.clone());
    }

    fn on_error(&mut self, case: &CaseDescriptor, err: &CaseFailure) {
        self.events.push(format!("error {}", case.method));
        self.failures.push(err.clone());
    }

    fn on_skip(&mut self, case: &CaseDescriptor, reason: &str) {
        self.events.push(format!("skip {} ({reason})", case.method));
    }

    fn on_case_finish(&mut self, case: &CaseDescriptor) {
        self.events.push(format!("finish {}", case.method));
    }

    fn on_run_finish(&mut self) {
        self.events.push("run_finish".to_string());
    }
}

fn mixed_suite() -> TestSuite {
    TestSuite::new("engine_test", "Mixed")
        .case(TestCase::new("passes", || Ok(())))
        .case(TestCase::new("panics", || {
            assert_eq!(1 + 1, 3, "math is broken");
            Ok(())
        }))
        .case(TestCase::new("errors", || {
            let _: i32 = "nan".parse()?;
            Ok(())
        }))
        .case(TestCase::new("skips_at_runtime", || Err(CaseError::skip("no network"))))
        .case(TestCase::new("declared_skip", || Ok(())).skipped("disabled"))
}

#[test]
#[serial]
fn test_callback_order_and_routing() {
    let mut recorder = Recorder::default();
    SequentialEngine::new().run(&[mixed_suite()], &mut recorder);

    assert_eq!(
        recorder.events,
        vec![
            "run_start",
            "start passes",
            "success passes",
            "finish passes",
            "start panics",
            "failure panics",
            "finish panics",
            "start errors",
            "error errors",
            "finish errors",
            "start skips_at_runtime",
            "skip skips_at_runtime (no network)",
            "finish skips_at_runtime",
            "start declared_skip",
            "skip declared_skip (disabled)",
            "finish declared_skip",
            "run_finish",
        ]
    );
}

#[test]
#[serial]
fn test_panic_and_error_details() {
    let mut recorder = Recorder::default();
    SequentialEngine::new().run(&[mixed_suite()], &mut recorder);

    let panic = &recorder.failures[0];
    assert_eq!(panic.type_id, PANIC_TYPE_ID);
    assert!(panic.message.contains("math is broken"));
    assert!(panic.trace.contains("engine_test.rs"));

    let error = &recorder.failures[1];
    assert!(error.type_id.ends_with("ParseIntError"));
    assert_eq!(error.message, "invalid digit found in string");
}

#[test]
#[serial]
fn test_declared_skip_never_runs_body() {
    let ran = Rc::new(Cell::new(false));
    let flag = Rc::clone(&ran);
    let suite = TestSuite::new("engine_test", "Skips").case(
        TestCase::new("skipped", move || {
            flag.set(true);
            Ok(())
        })
        .skipped("not today"),
    );

    let mut recorder = Recorder::default();
    SequentialEngine::new().run(&[suite], &mut recorder);
    assert!(!ran.get());
}

static OUTER_HOOK_CALLS: AtomicUsize = AtomicUsize::new(0);

#[test]
#[serial]
fn test_panic_hook_is_restored_after_run() {
    OUTER_HOOK_CALLS.store(0, Ordering::SeqCst);
    let original = std::panic::take_hook();
    std::panic::set_hook(Box::new(|_| {
        OUTER_HOOK_CALLS.fetch_add(1, Ordering::SeqCst);
    }));

    let mut recorder = Recorder::default();
    SequentialEngine::new().run(&[mixed_suite()], &mut recorder);
    assert_eq!(OUTER_HOOK_CALLS.load(Ordering::SeqCst), 0);

    let result = std::panic::catch_unwind(|| panic!("outside the engine"));
    assert!(result.is_err());
    assert_eq!(OUTER_HOOK_CALLS.load(Ordering::SeqCst), 1);

    let _ = std::panic::take_hook();
    std::panic::set_hook(original);
}

#[test]
#[serial]
fn test_engine_drives_aggregator() {
    let suites = vec![
        mixed_suite(),
        TestSuite::new("engine_test", "Second")
            .with_doc("title: Second suite")
            .case(case!(test_macro, "title: From macro\ntag: macro", { Ok(()) })),
    ];

    let mut agg = RunAggregator::new();
    SequentialEngine::new().run(&suites, &mut agg);
    let summary = agg.into_summary();

    assert_eq!(summary.result.test_run, 6);
    assert_eq!(summary.result.successes, 2);
    assert_eq!(summary.result.failures, 2);
    assert_eq!(summary.result.skipped, 2);
    assert!(!summary.success);
    assert_eq!(summary.class_list, vec!["Mixed", "Second suite"]);

    let statuses: Vec<_> = summary.details.iter().map(|d| d.status).collect();
    assert_eq!(
        statuses,
        vec![
            CaseStatus::Pass,
            CaseStatus::Fail,
            CaseStatus::Fail,
            CaseStatus::Skip,
            CaseStatus::Skip,
            CaseStatus::Pass,
        ]
    );

    let from_macro = &summary.details[5];
    assert_eq!(from_macro.title, "From macro");
    assert_eq!(from_macro.tags, vec!["macro"]);
}

#[test]
#[serial]
fn test_empty_run() {
    let mut agg = RunAggregator::new();
    SequentialEngine::new().run(&[], &mut agg);

    let summary = agg.into_summary();
    assert_eq!(summary.result.test_run, 0);
    assert!(summary.success);
    assert!(summary.class_list.is_empty());
}
