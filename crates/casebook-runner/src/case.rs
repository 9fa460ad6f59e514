//! Test case and suite declarations consumed by the sequential engine.
//!
//! A case body returns [`CaseResult`]. Any `std::error::Error` converts into
//! [`CaseError`] through `?`, keeping its Rust type name so the report can
//! classify it; a body can also ask to be skipped at runtime.

use casebook_lib::{CaseDescriptor, CaseFailure, CaseMeta, SourceRegistry};
use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;

/// Result type returned by every case body
pub type CaseResult = Result<(), CaseError>;

type CaseBody = Box<dyn Fn() -> CaseResult>;

/// Non-passing outcome returned by a case body
#[derive(Debug)]
pub enum CaseError {
    /// The case asked to be skipped with the given reason
    Skip(String),
    /// The case raised an error
    Failed(CaseFailure),
}

impl CaseError {
    pub fn skip(reason: impl Into<String>) -> Self {
        CaseError::Skip(reason.into())
    }

    /// Error with an explicit type identifier, for failures that are not a Rust error type
    pub fn failed(type_id: impl Into<String>, message: impl Into<String>) -> Self {
        let type_id = type_id.into();
        let message = message.into();
        let mut trace = format!("{type_id}: {message}\n");
        let backtrace = Backtrace::capture();
        if backtrace.status() == BacktraceStatus::Captured {
            trace.push_str(&format!("stack backtrace:\n{backtrace}"));
        }
        CaseError::Failed(CaseFailure::new(type_id, message, trace))
    }

    pub fn failure(&self) -> Option<&CaseFailure> {
        match self {
            CaseError::Failed(failure) => Some(failure),
            CaseError::Skip(_) => None,
        }
    }
}

impl fmt::Display for CaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseError::Skip(reason) => write!(f, "skipped: {reason}"),
            CaseError::Failed(failure) => write!(f, "{}: {}", failure.type_id, failure.message),
        }
    }
}

impl<E> From<E> for CaseError
where
    E: std::error::Error + 'static,
{
    fn from(err: E) -> Self {
        let backtrace = Backtrace::capture();
        CaseError::Failed(CaseFailure::from_error(&err, Some(&backtrace)))
    }
}

/// One registered test case
pub struct TestCase {
    pub method: String,
    pub doc: Option<String>,
    pub meta: Option<CaseMeta>,
    pub source: Option<String>,
    /// Declarative skip: the body is never run
    pub skip: Option<String>,
    body: CaseBody,
}

impl TestCase {
    pub fn new<F>(method: impl Into<String>, body: F) -> Self
    where
        F: Fn() -> CaseResult + 'static,
    {
        Self {
            method: method.into(),
            doc: None,
            meta: None,
            source: None,
            skip: None,
            body: Box::new(body),
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn with_meta(mut self, meta: CaseMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Mark the case as skipped; the engine reports it without running the body
    pub fn skipped(mut self, reason: impl Into<String>) -> Self {
        self.skip = Some(reason.into());
        self
    }

    pub fn run(&self) -> CaseResult {
        (self.body)()
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("method", &self.method)
            .field("doc", &self.doc)
            .field("meta", &self.meta)
            .field("skip", &self.skip)
            .finish_non_exhaustive()
    }
}

/// A group of cases sharing a module and class, run in declaration order
#[derive(Debug)]
pub struct TestSuite {
    pub module: String,
    pub class: String,
    pub doc: Option<String>,
    pub title: Option<String>,
    pub cases: Vec<TestCase>,
}

impl TestSuite {
    pub fn new(module: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            class: class.into(),
            doc: None,
            title: None,
            cases: Vec::new(),
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn case(mut self, case: TestCase) -> Self {
        self.cases.push(case);
        self
    }

    /// Identity and metadata the aggregator sees for one of this suite's cases
    pub fn descriptor(&self, case: &TestCase) -> CaseDescriptor {
        let mut descriptor = CaseDescriptor::new(&self.module, &self.class, &case.method);
        if let Some(doc) = &self.doc {
            descriptor = descriptor.with_class_doc(doc);
        }
        if let Some(title) = &self.title {
            descriptor = descriptor.with_class_title(title);
        }
        if let Some(doc) = &case.doc {
            descriptor = descriptor.with_doc(doc);
        }
        if let Some(meta) = &case.meta {
            descriptor = descriptor.with_meta(meta.clone());
        }
        descriptor
    }

    pub fn register_sources(&self, sources: &mut SourceRegistry) {
        for case in &self.cases {
            if let Some(source) = &case.source {
                sources.register(self.descriptor(case).id, source);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

/// Declare a [`TestCase`] whose source text is captured at compile time.
///
/// ```ignore
/// let case = case!(test_sum, "title: Sum\nlevel: 1", {
///     assert_eq!(1 + 1, 2);
///     Ok(())
/// });
/// ```
#[macro_export]
macro_rules! case {
    ($name:ident, $body:block) => {
        $crate::case::TestCase::new(stringify!($name), || -> $crate::case::CaseResult { $body })
            .with_source(concat!("fn ", stringify!($name), "() ", stringify!($body)))
    };
    ($name:ident, $doc:expr, $body:block) => {
        $crate::case!($name, $body).with_doc($doc)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_mark_keeps_error_type() {
        fn parse() -> CaseResult {
            let _: u32 = "x".parse()?;
            Ok(())
        }

        let err = parse().unwrap_err();
        let failure = err.failure().unwrap();
        assert!(failure.type_id.ends_with("ParseIntError"));
        assert_eq!(failure.message, "invalid digit found in string");
    }

    #[test]
    fn test_descriptor_carries_suite_metadata() {
        let suite = TestSuite::new("payments", "RefundSuite")
            .with_doc("title: Refunds")
            .case(TestCase::new("test_full", || Ok(())).with_doc("title: Full refund"));

        let descriptor = suite.descriptor(&suite.cases[0]);
        assert_eq!(descriptor.id, "payments::RefundSuite::test_full");
        assert_eq!(descriptor.resolve_class_name(), "Refunds");
        assert_eq!(descriptor.resolve_meta().title, "Full refund");
    }
}
