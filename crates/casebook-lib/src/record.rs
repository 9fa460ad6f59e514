//! Per-case record and the descriptor it is built from.

use crate::metadata::{CaseMeta, DocParser};
use crate::source::SourceRegistry;
use crate::utils::{elapsed_secs, unix_now};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Everything the host engine knows about a case before running it
#[derive(Debug, Clone, Default)]
pub struct CaseDescriptor {
    /// Unique identity, e.g. `payments::TransferSuite::test_refund`
    pub id: String,
    /// Owning module identifier
    pub module: String,
    /// Raw class (suite) identifier
    pub class: String,
    /// Documentation attached to the class
    pub class_doc: Option<String>,
    /// Explicit class title, wins over the class doc
    pub class_title: Option<String>,
    /// Method (case) identifier
    pub method: String,
    /// Documentation attached to the method
    pub doc: Option<String>,
    /// Explicit metadata, wins over the method doc
    pub meta: Option<CaseMeta>,
}

impl CaseDescriptor {
    /// Descriptor with identity `module::class::method`
    pub fn new(
        module: impl Into<String>,
        class: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        let module = module.into();
        let class = class.into();
        let method = method.into();
        Self {
            id: format!("{module}::{class}::{method}"),
            module,
            class,
            method,
            ..Default::default()
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn with_class_doc(mut self, doc: impl Into<String>) -> Self {
        self.class_doc = Some(doc.into());
        self
    }

    pub fn with_class_title(mut self, title: impl Into<String>) -> Self {
        self.class_title = Some(title.into());
        self
    }

    pub fn with_meta(mut self, meta: CaseMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Fully-qualified class path, `module::class`
    pub fn class_path(&self) -> String {
        format!("{}::{}", self.module, self.class)
    }

    /// Explicit metadata if attached, parsed documentation otherwise
    pub fn resolve_meta(&self) -> CaseMeta {
        match &self.meta {
            Some(meta) => meta.clone(),
            None => DocParser::parse(self.doc.as_deref()),
        }
    }

    /// Display name of the owning class
    pub fn resolve_class_name(&self) -> String {
        match &self.class_title {
            Some(title) if !title.is_empty() => title.clone(),
            _ => DocParser::class_title(self.class_doc.as_deref(), &self.class),
        }
    }
}

/// Case status; starts `Pending` and moves to exactly one terminal value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    #[default]
    Pending,
    Pass,
    Fail,
    Skip,
}

impl CaseStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, CaseStatus::Pending)
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CaseStatus::Pending => "pending",
            CaseStatus::Pass => "pass",
            CaseStatus::Fail => "fail",
            CaseStatus::Skip => "skip",
        };
        f.write_str(s)
    }
}

/// Case timing in Unix seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseTime {
    pub start_time: f64,
    pub end_time: Option<f64>,
    pub duration: Option<f64>,
}

/// Result record for one executed case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseRecord {
    #[serde(rename = "name")]
    pub title: String,
    #[serde(rename = "casePath")]
    pub id: String,
    pub description: String,
    pub status: CaseStatus,
    pub tags: Vec<String>,
    pub level: u32,
    pub time: CaseTime,
    pub class_name: String,
    pub class_docs: String,
    #[serde(skip)]
    pub class_path: String,
    pub module_name: String,
    #[serde(rename = "code")]
    pub source_code: String,
    pub output: String,
    pub exc_info: Option<String>,
    pub reason: Option<String>,
}

impl CaseRecord {
    /// Build the record for a case that is starting now
    pub fn start(case: &CaseDescriptor, sources: &SourceRegistry) -> Self {
        let meta = case.resolve_meta();
        Self {
            title: meta.title,
            id: case.id.clone(),
            description: meta.description,
            status: CaseStatus::Pending,
            tags: meta.tags,
            level: meta.level,
            time: CaseTime {
                start_time: unix_now(),
                end_time: None,
                duration: None,
            },
            class_name: case.resolve_class_name(),
            class_docs: case.class_doc.clone().unwrap_or_default(),
            class_path: case.class_path(),
            module_name: case.module.clone(),
            source_code: sources.lookup(&case.id),
            output: String::new(),
            exc_info: None,
            reason: None,
        }
    }

    /// Move to a terminal status; returns `false` if one was already set
    pub fn complete(&mut self, status: CaseStatus) -> bool {
        if self.status.is_terminal() || !status.is_terminal() {
            return false;
        }
        self.status = status;
        true
    }

    /// Stamp the end time (never earlier than the start) and duration
    pub fn stop(&mut self, end_time: f64) {
        let end_time = end_time.max(self.time.start_time);
        self.time.end_time = Some(end_time);
        self.time.duration = Some(elapsed_secs(self.time.start_time, end_time));
    }
}
