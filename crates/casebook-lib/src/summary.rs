//! Run summary, the serialized shape consumed by the report viewer.

use crate::record::CaseRecord;
use serde::{Deserialize, Serialize};

/// Label of the class-set entry that matches every class
pub const ALL_CLASSES_LABEL: &str = "<All>";

/// Outcome counters; `successes + failures + skipped == test_run` once every case finished
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunCounts {
    pub test_run: usize,
    pub successes: usize,
    pub failures: usize,
    pub skipped: usize,
}

impl RunCounts {
    pub fn finished(&self) -> usize {
        self.successes + self.failures + self.skipped
    }
}

/// Run boundaries as local human-readable timestamps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunTime {
    pub begin_time: Option<String>,
    pub finish_time: Option<String>,
    pub duration: Option<f64>,
}

/// Aggregate result of one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub name: Option<String>,
    pub success: bool,
    pub result: RunCounts,
    pub time: RunTime,
    /// Case records in execution order
    pub details: Vec<CaseRecord>,
    /// Class names in first-seen order, each once
    pub class_list: Vec<String>,
}

impl RunSummary {
    pub fn new(name: Option<String>) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    /// Class filter entries for the viewer, led by the match-everything entry
    pub fn class_set(&self) -> Vec<ClassSetEntry> {
        class_set(&self.class_list)
    }
}

/// One entry of the viewer's class filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSetEntry {
    pub key: Option<String>,
    pub value: String,
}

/// `[{key: null, value: "<All>"}, {key: c, value: c}, ...]`
pub fn class_set(class_list: &[String]) -> Vec<ClassSetEntry> {
    std::iter::once(ClassSetEntry {
        key: None,
        value: ALL_CLASSES_LABEL.to_string(),
    })
    .chain(class_list.iter().map(|name| ClassSetEntry {
        key: Some(name.clone()),
        value: name.clone(),
    }))
    .collect()
}
