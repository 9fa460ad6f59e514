//! Registry of case source text, filled in when cases are registered.

use std::collections::HashMap;
use tracing::warn;

/// Maps a case identity to the literal source shown in the report
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: HashMap<String, String>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the source for `case_id`, replacing any earlier entry
    pub fn register(&mut self, case_id: impl Into<String>, source: impl Into<String>) {
        self.sources.insert(case_id.into(), source.into());
    }

    /// Source for `case_id`, or an empty string (with a warning) when unknown
    pub fn lookup(&self, case_id: &str) -> String {
        match self.sources.get(case_id) {
            Some(source) => source.clone(),
            None => {
                warn!(case_id = %case_id, "Failed to retrieve case source");
                String::new()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
