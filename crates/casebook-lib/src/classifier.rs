//! Failure reason classification
//!
//! A known-exceptions mapping translates failure type identifiers (for example
//! `my_crate::db::TimeoutError`) into a human-readable reason. Unknown types
//! keep their raw message. A missing or malformed mapping behaves as
//! pass-through, so classification itself can never fail.

use crate::error::{ReportError, ReportResult};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Resolves a raw failure into the reason displayed in the report
#[derive(Debug, Clone, Default)]
pub struct ExceptionClassifier {
    known: HashMap<String, String>,
}

impl ExceptionClassifier {
    /// Pass-through classifier with no known exceptions
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifier backed by an explicit mapping
    pub fn from_map(known: HashMap<String, String>) -> Self {
        Self { known }
    }

    /// Classifier built from an untyped value.
    ///
    /// Only an object is accepted as a mapping; entries whose value is not a
    /// string are dropped. Anything else yields a pass-through classifier.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(entries) => {
                let mut known = HashMap::with_capacity(entries.len());
                for (type_id, reason) in entries {
                    match reason {
                        Value::String(reason) => {
                            known.insert(type_id, reason);
                        }
                        other => {
                            warn!(type_id = %type_id, value = %other, "Ignoring non-string known exception reason");
                        }
                    }
                }
                Self { known }
            }
            Value::Null => Self::new(),
            other => {
                warn!(value = %other, "Known exceptions mapping is not a key/value store, passing messages through");
                Self::new()
            }
        }
    }

    /// Load a YAML or JSON mapping file.
    ///
    /// An unreadable file is an error. Content that does not parse into a
    /// mapping only produces a warning and a pass-through classifier.
    pub fn from_file(path: &Path) -> ReportResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ReportError::known_exceptions(path, e.to_string()))?;

        let classifier = match serde_yaml::from_str::<Value>(&content) {
            Ok(value) => Self::from_value(value),
            Err(e) => {
                warn!(path = %path.display(), "Malformed known exceptions file, passing messages through: {e}");
                Self::new()
            }
        };

        debug!(
            path = %path.display(),
            entries = classifier.len(),
            "Loaded known exceptions"
        );
        Ok(classifier)
    }

    /// Mapped reason for `type_id`, or `raw_message` unchanged
    pub fn classify(&self, type_id: &str, raw_message: &str) -> String {
        self.known
            .get(type_id)
            .cloned()
            .unwrap_or_else(|| raw_message.to_string())
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}
